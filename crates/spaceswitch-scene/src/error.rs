//! Error types for scene queries.

use thiserror::Error;

/// Errors raised by a scene graph while resolving nodes, attributes or matrices.
#[derive(Error, Debug)]
pub enum SceneError {
    /// No node at this path.
    #[error("no object \"{0}\" exists in the scene")]
    NoSuchNode(String),

    /// The node has no attribute of that name.
    #[error("no attribute \"{attribute}\" on \"{node}\"")]
    NoSuchAttribute {
        /// Node path.
        node: String,
        /// Attribute name.
        attribute: String,
    },

    /// The attribute holds text where a number was expected.
    #[error("attribute \"{node}.{attribute}\" is not numeric")]
    NotNumeric {
        /// Node path.
        node: String,
        /// Attribute name.
        attribute: String,
    },

    /// The attribute holds a number where text was expected.
    #[error("attribute \"{node}.{attribute}\" is not a string")]
    NotString {
        /// Node path.
        node: String,
        /// Attribute name.
        attribute: String,
    },

    /// An attribute of that name already exists.
    #[error("attribute \"{node}.{attribute}\" already exists")]
    AttributeExists {
        /// Node path.
        node: String,
        /// Attribute name.
        attribute: String,
    },

    /// A node was created or addressed without a fully-qualified path.
    #[error("\"{0}\" is not a fully-qualified path")]
    ShortPath(String),

    /// A node with that path already exists.
    #[error("object \"{0}\" already exists")]
    DuplicateNode(String),

    /// A matrix on the node could not be inverted.
    #[error("matrix of \"{0}\" is singular")]
    Singular(String),

    /// The node's rotate order attribute is out of range.
    #[error("invalid rotate order {value} on \"{node}\"")]
    InvalidRotateOrder {
        /// Node path.
        node: String,
        /// The stored value.
        value: f64,
    },

    /// A joint-orient driver's locator depends on the joint it drives.
    #[error("\"{locator}\" cannot drive the orient of \"{joint}\": it depends on that joint")]
    DriverCycle {
        /// Driven joint.
        joint: String,
        /// Driver locator.
        locator: String,
    },

    /// Scene document could not be read or written.
    #[error("scene document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
