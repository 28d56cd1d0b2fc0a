//! Error types for space configuration and space operations.

use spaceswitch_scene::SceneError;
use thiserror::Error;

/// A configuration that cannot be loaded against the scene.
///
/// Raised only while parsing or storing a configuration, never by a switch
/// or match operation on an already loaded one.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The JSON is malformed or a required field is missing.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A control or transform was given by short name.
    #[error("use long names only for {what} \"{name}\"")]
    ShortName {
        /// What the name refers to ("control name", "transform").
        what: &'static str,
        /// The offending name.
        name: String,
    },

    /// The control does not exist.
    #[error("no control \"{0}\" exists in the scene")]
    NoSuchControl(String),

    /// A definition has neither a name nor an attribute to derive one from.
    #[error("attributeName and name are both unspecified for space definition {index} of \"{group}\"")]
    UnnamedSpace {
        /// Group name.
        group: &'static str,
        /// Definition index.
        index: usize,
    },

    /// A referenced enable attribute is missing from the control.
    #[error("no attribute \"{attribute}\" on control \"{control}\"")]
    NoSuchAttribute {
        /// Control path.
        control: String,
        /// Attribute name.
        attribute: String,
    },

    /// A referenced locator does not exist.
    #[error("no object \"{0}\" exists in the scene")]
    NoSuchTransform(String),

    /// A referenced locator is not a transform node.
    #[error("object \"{0}\" is not a transform type")]
    NotATransform(String),

    /// A space other than the first in its group has no enable attribute.
    #[error("only the first space in a group may have no attribute (base space); space {index} of \"{group}\" has none")]
    MissingAttribute {
        /// Group name.
        group: &'static str,
        /// Definition index.
        index: usize,
    },

    /// Rotation spaces were declared on a control that is not a joint.
    #[error("rotation spaces require a joint control, \"{0}\" is not a joint")]
    RotationSpacesOnNonJoint(String),

    /// The configuration attribute exists with a non-string type.
    #[error("attribute \"{attribute}\" on \"{control}\" exists but is not of string type")]
    ConfigAttributeNotString {
        /// Control path.
        control: String,
        /// Attribute name.
        attribute: String,
    },

    /// The scene failed to answer a validation query.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Errors from loading spaces or running a space operation.
#[derive(Error, Debug)]
pub enum SpaceError {
    /// Configuration problem.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The scene failed to resolve an attribute or matrix at operation time.
    #[error(transparent)]
    Query(#[from] SceneError),

    /// The operation needs a locator but the space has none.
    #[error("space \"{0}\" has no transform")]
    NoTransform(String),

    /// An intersection entry refers to a member that is no longer present.
    #[error("space handle no longer resolves")]
    UnknownSpace,
}

/// Result type for space operations.
pub type Result<T> = std::result::Result<T, SpaceError>;
