#![warn(missing_docs)]

//! Scene-graph boundary for rig space switching.
//!
//! The switch/match engine never owns scene state. Every attribute read,
//! attribute write, keyframe and matrix query goes through the
//! [`SceneGraph`] trait, which a host application implements over its own
//! node graph. [`MemoryScene`] is a self-contained implementation used by
//! the tests and the command-line tool.
//!
//! Transform channels are ordinary numeric attributes (`translateX`,
//! `rotateY`, `jointOrientZ`, ...) so that keying treats them the same way
//! as space enable attributes.

mod document;
mod error;
mod memory;

pub use document::{AttributeDef, AttributeValueDef, NodeDef, OrientDriverDef, SceneDocument};
pub use error::{Result, SceneError};
pub use memory::{AttributeWrite, Keyframe, MemoryScene, NodeKey};

use serde::{Deserialize, Serialize};
use spaceswitch_math::{RotationOrder, Transform, Vec3};

/// Translate channel attribute names.
pub const TRANSLATE_ATTRIBUTES: [&str; 3] = ["translateX", "translateY", "translateZ"];

/// Rotate channel attribute names (degrees).
pub const ROTATE_ATTRIBUTES: [&str; 3] = ["rotateX", "rotateY", "rotateZ"];

/// Scale channel attribute names.
pub const SCALE_ATTRIBUTES: [&str; 3] = ["scaleX", "scaleY", "scaleZ"];

/// Joint orient attribute names (degrees, always applied in XYZ order).
pub const JOINT_ORIENT_ATTRIBUTES: [&str; 3] = ["jointOrientX", "jointOrientY", "jointOrientZ"];

/// Rotate order attribute name.
pub const ROTATE_ORDER_ATTRIBUTE: &str = "rotateOrder";

/// All nine translate/rotate/scale channels.
pub const TRS_ATTRIBUTES: [&str; 9] = [
    "translateX",
    "translateY",
    "translateZ",
    "rotateX",
    "rotateY",
    "rotateZ",
    "scaleX",
    "scaleY",
    "scaleZ",
];

/// Kind of node as far as space switching cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Plain transform.
    #[default]
    Transform,
    /// Joint: a transform with a joint orient between translate and rotate.
    Joint,
    /// Anything else the host has (shapes, utility nodes, ...).
    Other,
}

/// How a keyframe's tangents are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TangentType {
    /// Host default tangents.
    #[default]
    Auto,
    /// Stepped in and out tangents.
    Step,
}

/// Type of value an attribute stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Numeric (boolean, enum, float, ...).
    Numeric,
    /// String.
    String,
}

/// Operations the space switcher needs from a host scene.
///
/// Every call is synchronous. Paths are fully qualified (`|root|child`).
pub trait SceneGraph {
    /// Whether a node exists at `node`.
    fn exists(&self, node: &str) -> bool;

    /// Type of the node.
    fn node_type(&self, node: &str) -> Result<NodeType>;

    /// Every node whose last path segment is `short_name`.
    fn find_by_short_name(&self, short_name: &str) -> Vec<String>;

    /// Whether `node.attribute` exists.
    fn has_attribute(&self, node: &str, attribute: &str) -> bool;

    /// Kind of value stored in `node.attribute`.
    fn attribute_kind(&self, node: &str, attribute: &str) -> Result<AttributeKind>;

    /// Human-readable name of the attribute.
    fn attribute_nice_name(&self, node: &str, attribute: &str) -> Result<String>;

    /// Whether the attribute is keyable.
    fn is_keyable(&self, node: &str, attribute: &str) -> Result<bool>;

    /// User-defined attributes on the node, in creation order.
    fn user_attributes(&self, node: &str) -> Result<Vec<String>>;

    /// Read a numeric attribute.
    fn get_attribute(&self, node: &str, attribute: &str) -> Result<f64>;

    /// Write a numeric attribute.
    fn set_attribute(&mut self, node: &str, attribute: &str, value: f64) -> Result<()>;

    /// Read a string attribute.
    fn get_string_attribute(&self, node: &str, attribute: &str) -> Result<String>;

    /// Write a string attribute.
    fn set_string_attribute(&mut self, node: &str, attribute: &str, value: &str) -> Result<()>;

    /// Create a user-defined string attribute, hidden from the channel box.
    fn add_string_attribute(&mut self, node: &str, attribute: &str) -> Result<()>;

    /// Key the attribute at its current value.
    fn set_keyframe(&mut self, node: &str, attribute: &str, tangent: TangentType) -> Result<()>;

    /// World matrix of the node.
    fn world_matrix(&self, node: &str) -> Result<Transform>;

    /// Inverse of the parent's world matrix (identity for root nodes).
    fn parent_inverse_matrix(&self, node: &str) -> Result<Transform>;

    /// Replace the current selection.
    fn select(&mut self, nodes: &[String]) -> Result<()>;

    /// The current selection, in selection order.
    fn selection(&self) -> Vec<String>;

    /// Inverse of the world matrix.
    fn world_inverse_matrix(&self, node: &str) -> Result<Transform> {
        self.world_matrix(node)?
            .inverse()
            .ok_or_else(|| SceneError::Singular(node.to_string()))
    }

    /// Local matrix: the world matrix expressed in the parent's frame.
    fn local_matrix(&self, node: &str) -> Result<Transform> {
        Ok(Transform::reparent(
            &self.world_matrix(node)?,
            &self.parent_inverse_matrix(node)?,
        ))
    }

    /// Inverse of the local matrix.
    fn local_inverse_matrix(&self, node: &str) -> Result<Transform> {
        self.local_matrix(node)?
            .inverse()
            .ok_or_else(|| SceneError::Singular(node.to_string()))
    }

    /// Read three numeric attributes as a vector.
    fn get_vec3(&self, node: &str, attributes: &[&str; 3]) -> Result<Vec3> {
        Ok(Vec3::new(
            self.get_attribute(node, attributes[0])?,
            self.get_attribute(node, attributes[1])?,
            self.get_attribute(node, attributes[2])?,
        ))
    }

    /// Write three numeric attributes from a vector.
    fn set_vec3(&mut self, node: &str, attributes: &[&str; 3], value: &Vec3) -> Result<()> {
        for (attribute, v) in attributes.iter().zip(value.iter()) {
            self.set_attribute(node, attribute, *v)?;
        }
        Ok(())
    }

    /// Rotate order declared on the node.
    fn rotate_order(&self, node: &str) -> Result<RotationOrder> {
        let value = self.get_attribute(node, ROTATE_ORDER_ATTRIBUTE)?;
        if value < 0.0 || value.fract() != 0.0 {
            return Err(SceneError::InvalidRotateOrder {
                node: node.to_string(),
                value,
            });
        }
        RotationOrder::from_index(value as usize).ok_or_else(|| SceneError::InvalidRotateOrder {
            node: node.to_string(),
            value,
        })
    }

    /// Joint orient in degrees; zero for non-joints.
    fn joint_orient(&self, node: &str) -> Result<Vec3> {
        match self.node_type(node)? {
            NodeType::Joint => self.get_vec3(node, &JOINT_ORIENT_ATTRIBUTES),
            _ => Ok(Vec3::zeros()),
        }
    }
}

/// Whether `name` is a fully-qualified path rather than a short name.
pub fn is_long_name(name: &str) -> bool {
    name.contains('|')
}

/// Last segment of a path.
pub fn short_name(path: &str) -> &str {
    path.rsplit('|').next().unwrap_or(path)
}
