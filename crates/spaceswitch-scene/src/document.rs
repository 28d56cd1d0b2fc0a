//! JSON description of a [`MemoryScene`].
//!
//! Lets the command-line tool load a scene, run an operation and write the
//! result back out. Nodes are listed parents first.

use serde::{Deserialize, Serialize};
use spaceswitch_math::RotationOrder;

use crate::error::Result;
use crate::memory::{Attribute, AttributeValue, MemoryScene};
use crate::{
    NodeType, SceneGraph, JOINT_ORIENT_ATTRIBUTES, ROTATE_ATTRIBUTES, ROTATE_ORDER_ATTRIBUTE,
    SCALE_ATTRIBUTES, TRANSLATE_ATTRIBUTES,
};

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn keyable_default() -> bool {
    true
}

/// Value of a user-defined attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValueDef {
    /// Numeric value.
    Number(f64),
    /// String value.
    Text(String),
}

/// A user-defined attribute on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    /// Internal name.
    pub name: String,
    /// Display name; derived from `name` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice_name: Option<String>,
    /// Current value.
    pub value: AttributeValueDef,
    /// Whether the attribute can be keyed.
    #[serde(default = "keyable_default")]
    pub keyable: bool,
}

/// One entry of a joint-orient driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientDriverDef {
    /// Enable attribute on the joint; `None` for the fallback entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Locator whose orientation drives the joint.
    pub locator: String,
}

/// A node and its channel values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
    /// Fully-qualified path.
    pub path: String,
    /// Node type.
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    /// Translate channels.
    #[serde(default)]
    pub translate: [f64; 3],
    /// Rotate channels in degrees.
    #[serde(default)]
    pub rotate: [f64; 3],
    /// Scale channels.
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
    /// Rotation order of the rotate channels.
    #[serde(default)]
    pub rotate_order: RotationOrder,
    /// Joint orient in degrees (joints only).
    #[serde(default)]
    pub joint_orient: [f64; 3],
    /// User-defined attributes.
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    /// Joint-orient driver entries (joints only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orient_drivers: Vec<OrientDriverDef>,
}

/// A whole scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Nodes, parents before children.
    pub nodes: Vec<NodeDef>,
}

impl SceneDocument {
    /// Serialize to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl MemoryScene {
    /// Build a scene from its description.
    pub fn from_document(doc: &SceneDocument) -> Result<Self> {
        let mut scene = MemoryScene::new();

        for node in &doc.nodes {
            scene.add_node_of_type(&node.path, node.node_type)?;
            if node.node_type != NodeType::Other {
                scene.set_vec3(&node.path, &TRANSLATE_ATTRIBUTES, &node.translate.into())?;
                scene.set_vec3(&node.path, &ROTATE_ATTRIBUTES, &node.rotate.into())?;
                scene.set_vec3(&node.path, &SCALE_ATTRIBUTES, &node.scale.into())?;
                scene.set_attribute(
                    &node.path,
                    ROTATE_ORDER_ATTRIBUTE,
                    node.rotate_order as usize as f64,
                )?;
            }
            if node.node_type == NodeType::Joint {
                scene.set_vec3(&node.path, &JOINT_ORIENT_ATTRIBUTES, &node.joint_orient.into())?;
            }
            for attribute in &node.attributes {
                match &attribute.value {
                    AttributeValueDef::Number(v) => scene.add_attribute(
                        &node.path,
                        &attribute.name,
                        attribute.nice_name.as_deref(),
                        *v,
                        attribute.keyable,
                    )?,
                    AttributeValueDef::Text(text) => {
                        scene.add_string_attribute(&node.path, &attribute.name)?;
                        scene.set_string_attribute(&node.path, &attribute.name, text)?;
                    }
                }
            }
        }

        for node in doc.nodes.iter().filter(|n| !n.orient_drivers.is_empty()) {
            scene.drive_joint_orient(
                &node.path,
                node.orient_drivers
                    .iter()
                    .map(|d| (d.attribute.clone(), d.locator.clone()))
                    .collect(),
            )?;
        }

        scene.clear_history();
        Ok(scene)
    }

    /// Describe the scene's current state.
    pub fn to_document(&self) -> SceneDocument {
        let nodes = self
            .nodes
            .values()
            .map(|data| {
                let number = |name: &str| match data.attributes.iter().find(|a| a.name == name) {
                    Some(Attribute {
                        value: AttributeValue::Number(v),
                        ..
                    }) => *v,
                    _ => 0.0,
                };
                let triple = |names: &[&str; 3]| [number(names[0]), number(names[1]), number(names[2])];

                NodeDef {
                    path: data.path.clone(),
                    node_type: data.node_type,
                    translate: triple(&TRANSLATE_ATTRIBUTES),
                    rotate: triple(&ROTATE_ATTRIBUTES),
                    scale: if data.node_type == NodeType::Other {
                        unit_scale()
                    } else {
                        triple(&SCALE_ATTRIBUTES)
                    },
                    rotate_order: RotationOrder::from_index(number(ROTATE_ORDER_ATTRIBUTE) as usize)
                        .unwrap_or_default(),
                    joint_orient: triple(&JOINT_ORIENT_ATTRIBUTES),
                    attributes: data
                        .attributes
                        .iter()
                        .filter(|a| a.user_defined)
                        .map(|a| AttributeDef {
                            name: a.name.clone(),
                            nice_name: Some(a.nice_name.clone()),
                            value: match &a.value {
                                AttributeValue::Number(v) => AttributeValueDef::Number(*v),
                                AttributeValue::Text(t) => AttributeValueDef::Text(t.clone()),
                            },
                            keyable: a.keyable,
                        })
                        .collect(),
                    orient_drivers: data
                        .orient_drivers
                        .iter()
                        .map(|d| OrientDriverDef {
                            attribute: d.attribute.clone(),
                            locator: d.locator.clone(),
                        })
                        .collect(),
                }
            })
            .collect();

        SceneDocument { nodes }
    }
}
