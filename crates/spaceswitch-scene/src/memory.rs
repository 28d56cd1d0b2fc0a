//! In-memory scene graph.
//!
//! Nodes live in a slot map keyed by [`NodeKey`], with a path index on the
//! side. Each node stores its channels as attributes and computes its local
//! matrix on demand (`T * R * S`, or `T * JO * R * S` for joints). A joint
//! may have its orient driven by a list of locators gated by enable
//! attributes, which is how rotation spaces behave in a rig.

use std::collections::{HashMap, HashSet};

use slotmap::{new_key_type, SlotMap};
use spaceswitch_math::{degrees, radians, RotationOrder, Transform, Vec3};

use crate::error::{Result, SceneError};
use crate::{
    is_long_name, AttributeKind, NodeType, SceneGraph, TangentType, JOINT_ORIENT_ATTRIBUTES,
    ROTATE_ATTRIBUTES, ROTATE_ORDER_ATTRIBUTE, SCALE_ATTRIBUTES, TRANSLATE_ATTRIBUTES,
};

new_key_type! {
    /// Key for a node in a [`MemoryScene`].
    pub struct NodeKey;
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AttributeValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Attribute {
    pub(crate) name: String,
    pub(crate) nice_name: String,
    pub(crate) value: AttributeValue,
    pub(crate) keyable: bool,
    pub(crate) user_defined: bool,
}

/// One locator in a joint-orient driver, active while `attribute` is non-zero.
/// The entry with no attribute applies when no other entry is active.
#[derive(Debug, Clone)]
pub(crate) struct OrientDriver {
    pub(crate) attribute: Option<String>,
    pub(crate) locator: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) path: String,
    pub(crate) node_type: NodeType,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) orient_drivers: Vec<OrientDriver>,
}

impl NodeData {
    fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }
}

/// A keyframe set through [`SceneGraph::set_keyframe`].
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// Node path.
    pub node: String,
    /// Attribute name.
    pub attribute: String,
    /// Value keyed.
    pub value: f64,
    /// Tangent type used.
    pub tangent: TangentType,
}

/// A numeric attribute write through [`SceneGraph::set_attribute`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeWrite {
    /// Node path.
    pub node: String,
    /// Attribute name.
    pub attribute: String,
    /// Value written.
    pub value: f64,
}

/// A scene graph held entirely in memory.
///
/// Records every numeric attribute write and keyframe so callers can check
/// what an operation touched.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    pub(crate) nodes: SlotMap<NodeKey, NodeData>,
    pub(crate) by_path: HashMap<String, NodeKey>,
    selection: Vec<String>,
    keyframes: Vec<Keyframe>,
    writes: Vec<AttributeWrite>,
}

/// Turn `spaceX` into `Space X`: split on case changes and capitalize.
fn nice_name_of(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for (i, ch) in name.chars().enumerate() {
        if ch == '_' {
            if !out.ends_with(' ') {
                out.push(' ');
            }
            prev_lower = false;
            continue;
        }
        if i > 0 && prev_lower && (ch.is_uppercase() || ch.is_ascii_digit()) {
            out.push(' ');
        }
        if out.is_empty() || out.ends_with(' ') {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        prev_lower = ch.is_lowercase();
    }
    out.trim().to_string()
}

impl MemoryScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(&self, node: &str) -> Result<NodeKey> {
        self.by_path
            .get(node)
            .copied()
            .ok_or_else(|| SceneError::NoSuchNode(node.to_string()))
    }

    fn data(&self, node: &str) -> Result<&NodeData> {
        let key = self.key(node)?;
        Ok(&self.nodes[key])
    }

    fn data_mut(&mut self, node: &str) -> Result<&mut NodeData> {
        let key = self.key(node)?;
        Ok(&mut self.nodes[key])
    }

    fn builtin(name: &str, value: f64) -> Attribute {
        Attribute {
            name: name.to_string(),
            nice_name: nice_name_of(name),
            value: AttributeValue::Number(value),
            keyable: true,
            user_defined: false,
        }
    }

    fn add_node(&mut self, path: &str, node_type: NodeType) -> Result<NodeKey> {
        if !is_long_name(path) || !path.starts_with('|') {
            return Err(SceneError::ShortPath(path.to_string()));
        }
        if self.by_path.contains_key(path) {
            return Err(SceneError::DuplicateNode(path.to_string()));
        }

        let parent_path = &path[..path.rfind('|').unwrap_or(0)];
        let parent = if parent_path.is_empty() {
            None
        } else {
            Some(self.key(parent_path)?)
        };

        let mut attributes = Vec::new();
        if node_type != NodeType::Other {
            for name in TRANSLATE_ATTRIBUTES.iter().chain(ROTATE_ATTRIBUTES.iter()) {
                attributes.push(Self::builtin(name, 0.0));
            }
            for name in SCALE_ATTRIBUTES {
                attributes.push(Self::builtin(name, 1.0));
            }
            let mut order = Self::builtin(ROTATE_ORDER_ATTRIBUTE, 0.0);
            order.keyable = false;
            attributes.push(order);
        }
        if node_type == NodeType::Joint {
            for name in JOINT_ORIENT_ATTRIBUTES {
                let mut orient = Self::builtin(name, 0.0);
                orient.keyable = false;
                attributes.push(orient);
            }
        }

        let key = self.nodes.insert(NodeData {
            path: path.to_string(),
            node_type,
            parent,
            attributes,
            orient_drivers: Vec::new(),
        });
        self.by_path.insert(path.to_string(), key);
        Ok(key)
    }

    /// Add a transform. Its parent must already exist.
    pub fn add_transform(&mut self, path: &str) -> Result<NodeKey> {
        self.add_node(path, NodeType::Transform)
    }

    /// Add a joint. Its parent must already exist.
    pub fn add_joint(&mut self, path: &str) -> Result<NodeKey> {
        self.add_node(path, NodeType::Joint)
    }

    /// Add a node of any type.
    pub fn add_node_of_type(&mut self, path: &str, node_type: NodeType) -> Result<NodeKey> {
        self.add_node(path, node_type)
    }

    /// Add a user-defined numeric attribute. The nice name is derived from
    /// `name` unless given.
    pub fn add_attribute(
        &mut self,
        node: &str,
        name: &str,
        nice_name: Option<&str>,
        value: f64,
        keyable: bool,
    ) -> Result<()> {
        self.insert_attribute(
            node,
            Attribute {
                name: name.to_string(),
                nice_name: nice_name.map_or_else(|| nice_name_of(name), str::to_string),
                value: AttributeValue::Number(value),
                keyable,
                user_defined: true,
            },
        )
    }

    pub(crate) fn insert_attribute(&mut self, node: &str, attribute: Attribute) -> Result<()> {
        let data = self.data_mut(node)?;
        if data.attribute(&attribute.name).is_some() {
            return Err(SceneError::AttributeExists {
                node: node.to_string(),
                attribute: attribute.name,
            });
        }
        data.attributes.push(attribute);
        Ok(())
    }

    /// Drive a joint's orient from locators gated by its own attributes.
    ///
    /// Each entry is `(enable attribute, locator path)`. The last entry whose
    /// attribute is non-zero wins; an entry without an attribute applies when
    /// none is active. The orient is the winning locator's world rotation
    /// expressed in the joint's parent frame.
    pub fn drive_joint_orient(
        &mut self,
        joint: &str,
        drivers: Vec<(Option<String>, String)>,
    ) -> Result<()> {
        let joint_key = self.key(joint)?;
        for (attribute, locator) in &drivers {
            if self.depends_on(self.key(locator)?, joint_key) {
                return Err(SceneError::DriverCycle {
                    joint: joint.to_string(),
                    locator: locator.clone(),
                });
            }
            if let Some(attribute) = attribute {
                if !self.has_attribute(joint, attribute) {
                    return Err(SceneError::NoSuchAttribute {
                        node: joint.to_string(),
                        attribute: attribute.clone(),
                    });
                }
            }
        }
        let data = self.data_mut(joint)?;
        data.orient_drivers = drivers
            .into_iter()
            .map(|(attribute, locator)| OrientDriver { attribute, locator })
            .collect();
        Ok(())
    }

    /// Whether the world matrix of `node` is computed from `target`, through
    /// its parent chain or the locators driving a joint on that chain.
    fn depends_on(&self, node: NodeKey, target: NodeKey) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![node];
        while let Some(key) = pending.pop() {
            if key == target {
                return true;
            }
            if !seen.insert(key) {
                continue;
            }
            let data = &self.nodes[key];
            pending.extend(data.parent);
            pending.extend(
                data.orient_drivers
                    .iter()
                    .filter_map(|d| self.by_path.get(&d.locator).copied()),
            );
        }
        false
    }

    /// Keyframes set so far.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Numeric attribute writes so far.
    pub fn attribute_writes(&self) -> &[AttributeWrite] {
        &self.writes
    }

    /// Forget recorded writes and keyframes.
    pub fn clear_history(&mut self) {
        self.keyframes.clear();
        self.writes.clear();
    }

    /// Paths of all nodes, in creation order.
    pub fn node_paths(&self) -> Vec<String> {
        self.nodes.values().map(|n| n.path.clone()).collect()
    }

    fn number(&self, data: &NodeData, attribute: &str) -> Result<f64> {
        match data.attribute(attribute).map(|a| &a.value) {
            Some(AttributeValue::Number(v)) => Ok(*v),
            Some(AttributeValue::Text(_)) => Err(SceneError::NotNumeric {
                node: data.path.clone(),
                attribute: attribute.to_string(),
            }),
            None => Err(SceneError::NoSuchAttribute {
                node: data.path.clone(),
                attribute: attribute.to_string(),
            }),
        }
    }

    fn stored_vec3(&self, data: &NodeData, attributes: &[&str; 3]) -> Result<Vec3> {
        Ok(Vec3::new(
            self.number(data, attributes[0])?,
            self.number(data, attributes[1])?,
            self.number(data, attributes[2])?,
        ))
    }

    /// The driven orient of a joint, if a driver is active.
    fn driven_orient(&self, key: NodeKey) -> Result<Option<Transform>> {
        let data = &self.nodes[key];
        if data.orient_drivers.is_empty() {
            return Ok(None);
        }

        let mut active = None;
        for driver in &data.orient_drivers {
            match &driver.attribute {
                Some(attribute) => {
                    if self.number(data, attribute)? != 0.0 {
                        active = Some(driver);
                    }
                }
                None => {
                    if active.is_none() {
                        active = Some(driver);
                    }
                }
            }
        }
        let Some(driver) = active else {
            return Ok(None);
        };

        let locator = self.world_of(self.key(&driver.locator)?)?.rotation_part();
        let parent = match data.parent {
            Some(parent) => self.world_of(parent)?.rotation_part(),
            None => Transform::identity(),
        };
        let parent_inverse = parent
            .inverse()
            .ok_or_else(|| SceneError::Singular(data.path.clone()))?;
        Ok(Some(parent_inverse.then(&locator)))
    }

    fn joint_orient_of(&self, key: NodeKey) -> Result<Transform> {
        if let Some(orient) = self.driven_orient(key)? {
            return Ok(orient);
        }
        let data = &self.nodes[key];
        let angles = self.stored_vec3(data, &JOINT_ORIENT_ATTRIBUTES)?;
        Ok(Transform::from_euler(&radians(&angles), RotationOrder::Xyz))
    }

    fn local_of(&self, key: NodeKey) -> Result<Transform> {
        let data = &self.nodes[key];
        if data.node_type == NodeType::Other {
            return Ok(Transform::identity());
        }

        let t = self.stored_vec3(data, &TRANSLATE_ATTRIBUTES)?;
        let r = self.stored_vec3(data, &ROTATE_ATTRIBUTES)?;
        let s = self.stored_vec3(data, &SCALE_ATTRIBUTES)?;
        let order = self.rotate_order(&data.path)?;

        let mut rotation = Transform::from_euler(&radians(&r), order);
        if data.node_type == NodeType::Joint {
            rotation = self.joint_orient_of(key)?.then(&rotation);
        }
        Ok(Transform::translation(t.x, t.y, t.z)
            .then(&rotation)
            .then(&Transform::scale(s.x, s.y, s.z)))
    }

    fn world_of(&self, key: NodeKey) -> Result<Transform> {
        let local = self.local_of(key)?;
        match self.nodes[key].parent {
            Some(parent) => Ok(self.world_of(parent)?.then(&local)),
            None => Ok(local),
        }
    }
}

impl SceneGraph for MemoryScene {
    fn exists(&self, node: &str) -> bool {
        self.by_path.contains_key(node)
    }

    fn node_type(&self, node: &str) -> Result<NodeType> {
        Ok(self.data(node)?.node_type)
    }

    fn find_by_short_name(&self, short_name: &str) -> Vec<String> {
        let suffix = format!("|{short_name}");
        self.nodes
            .values()
            .filter(|n| n.path.ends_with(&suffix))
            .map(|n| n.path.clone())
            .collect()
    }

    fn has_attribute(&self, node: &str, attribute: &str) -> bool {
        self.data(node)
            .map(|d| d.attribute(attribute).is_some())
            .unwrap_or(false)
    }

    fn attribute_kind(&self, node: &str, attribute: &str) -> Result<AttributeKind> {
        let data = self.data(node)?;
        match data.attribute(attribute).map(|a| &a.value) {
            Some(AttributeValue::Number(_)) => Ok(AttributeKind::Numeric),
            Some(AttributeValue::Text(_)) => Ok(AttributeKind::String),
            None => Err(SceneError::NoSuchAttribute {
                node: node.to_string(),
                attribute: attribute.to_string(),
            }),
        }
    }

    fn attribute_nice_name(&self, node: &str, attribute: &str) -> Result<String> {
        self.data(node)?
            .attribute(attribute)
            .map(|a| a.nice_name.clone())
            .ok_or_else(|| SceneError::NoSuchAttribute {
                node: node.to_string(),
                attribute: attribute.to_string(),
            })
    }

    fn is_keyable(&self, node: &str, attribute: &str) -> Result<bool> {
        self.data(node)?
            .attribute(attribute)
            .map(|a| a.keyable)
            .ok_or_else(|| SceneError::NoSuchAttribute {
                node: node.to_string(),
                attribute: attribute.to_string(),
            })
    }

    fn user_attributes(&self, node: &str) -> Result<Vec<String>> {
        Ok(self
            .data(node)?
            .attributes
            .iter()
            .filter(|a| a.user_defined)
            .map(|a| a.name.clone())
            .collect())
    }

    fn get_attribute(&self, node: &str, attribute: &str) -> Result<f64> {
        let key = self.key(node)?;
        let data = &self.nodes[key];
        if let Some(axis) = JOINT_ORIENT_ATTRIBUTES.iter().position(|a| *a == attribute) {
            if data.node_type == NodeType::Joint {
                if let Some(orient) = self.driven_orient(key)? {
                    return Ok(degrees(&orient.to_euler(RotationOrder::Xyz))[axis]);
                }
            }
        }
        self.number(data, attribute)
    }

    fn set_attribute(&mut self, node: &str, attribute: &str, value: f64) -> Result<()> {
        let data = self.data_mut(node)?;
        let path = data.path.clone();
        let slot = data
            .attribute_mut(attribute)
            .ok_or_else(|| SceneError::NoSuchAttribute {
                node: path.clone(),
                attribute: attribute.to_string(),
            })?;
        if let AttributeValue::Text(_) = slot.value {
            return Err(SceneError::NotNumeric {
                node: path,
                attribute: attribute.to_string(),
            });
        }
        slot.value = AttributeValue::Number(value);
        self.writes.push(AttributeWrite {
            node: path,
            attribute: attribute.to_string(),
            value,
        });
        Ok(())
    }

    fn get_string_attribute(&self, node: &str, attribute: &str) -> Result<String> {
        match self.data(node)?.attribute(attribute).map(|a| &a.value) {
            Some(AttributeValue::Text(text)) => Ok(text.clone()),
            Some(AttributeValue::Number(_)) => Err(SceneError::NotString {
                node: node.to_string(),
                attribute: attribute.to_string(),
            }),
            None => Err(SceneError::NoSuchAttribute {
                node: node.to_string(),
                attribute: attribute.to_string(),
            }),
        }
    }

    fn set_string_attribute(&mut self, node: &str, attribute: &str, value: &str) -> Result<()> {
        let slot = self
            .data_mut(node)?
            .attribute_mut(attribute)
            .ok_or_else(|| SceneError::NoSuchAttribute {
                node: node.to_string(),
                attribute: attribute.to_string(),
            })?;
        match &mut slot.value {
            AttributeValue::Text(text) => {
                *text = value.to_string();
                Ok(())
            }
            AttributeValue::Number(_) => Err(SceneError::NotString {
                node: node.to_string(),
                attribute: attribute.to_string(),
            }),
        }
    }

    fn add_string_attribute(&mut self, node: &str, attribute: &str) -> Result<()> {
        self.insert_attribute(
            node,
            Attribute {
                name: attribute.to_string(),
                nice_name: nice_name_of(attribute),
                value: AttributeValue::Text(String::new()),
                keyable: false,
                user_defined: true,
            },
        )
    }

    fn set_keyframe(&mut self, node: &str, attribute: &str, tangent: TangentType) -> Result<()> {
        let value = self.get_attribute(node, attribute)?;
        self.keyframes.push(Keyframe {
            node: node.to_string(),
            attribute: attribute.to_string(),
            value,
            tangent,
        });
        Ok(())
    }

    fn world_matrix(&self, node: &str) -> Result<Transform> {
        self.world_of(self.key(node)?)
    }

    fn parent_inverse_matrix(&self, node: &str) -> Result<Transform> {
        match self.data(node)?.parent {
            Some(parent) => self
                .world_of(parent)?
                .inverse()
                .ok_or_else(|| SceneError::Singular(self.nodes[parent].path.clone())),
            None => Ok(Transform::identity()),
        }
    }

    fn local_matrix(&self, node: &str) -> Result<Transform> {
        self.local_of(self.key(node)?)
    }

    fn select(&mut self, nodes: &[String]) -> Result<()> {
        for node in nodes {
            self.key(node)?;
        }
        self.selection = nodes.to_vec();
        Ok(())
    }

    fn selection(&self) -> Vec<String> {
        self.selection.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rig() -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.add_transform("|rig").unwrap();
        scene.add_transform("|rig|chest").unwrap();
        scene.add_joint("|rig|chest|hand_CTRL").unwrap();
        scene
    }

    #[test]
    fn test_nice_names() {
        assert_eq!(nice_name_of("spaceWorld"), "Space World");
        assert_eq!(nice_name_of("rotSpaceChest"), "Rot Space Chest");
        assert_eq!(nice_name_of("space_aux_2"), "Space Aux 2");
        assert_eq!(nice_name_of("translateX"), "Translate X");
    }

    #[test]
    fn test_paths_must_be_long_and_parented() {
        let mut scene = MemoryScene::new();
        assert!(matches!(scene.add_transform("rig"), Err(SceneError::ShortPath(_))));
        assert!(matches!(
            scene.add_transform("|missing|child"),
            Err(SceneError::NoSuchNode(_))
        ));
        scene.add_transform("|rig").unwrap();
        assert!(matches!(
            scene.add_transform("|rig"),
            Err(SceneError::DuplicateNode(_))
        ));
    }

    #[test]
    fn test_world_matrix_follows_parents() {
        let mut scene = rig();
        scene.set_vec3("|rig", &TRANSLATE_ATTRIBUTES, &Vec3::new(0.0, 2.0, 0.0)).unwrap();
        scene.set_vec3("|rig|chest", &ROTATE_ATTRIBUTES, &Vec3::new(0.0, 0.0, 90.0)).unwrap();
        scene
            .set_vec3("|rig|chest|hand_CTRL", &TRANSLATE_ATTRIBUTES, &Vec3::new(1.0, 0.0, 0.0))
            .unwrap();

        let world = scene.world_matrix("|rig|chest|hand_CTRL").unwrap();
        assert_relative_eq!(world.translation_part(), Vec3::new(0.0, 3.0, 0.0), epsilon = 1e-12);

        let local = SceneGraph::local_matrix(&scene, "|rig|chest|hand_CTRL").unwrap();
        let rebuilt = Transform::reparent(
            &world,
            &scene.parent_inverse_matrix("|rig|chest|hand_CTRL").unwrap(),
        );
        assert!(local.approx_eq(&rebuilt, 1e-12));
    }

    #[test]
    fn test_joint_orient_sits_between_translate_and_rotate() {
        let mut scene = rig();
        let ctrl = "|rig|chest|hand_CTRL";
        scene.set_vec3(ctrl, &JOINT_ORIENT_ATTRIBUTES, &Vec3::new(0.0, 0.0, 90.0)).unwrap();
        scene.set_vec3(ctrl, &ROTATE_ATTRIBUTES, &Vec3::new(0.0, 0.0, -90.0)).unwrap();
        let world = scene.world_matrix(ctrl).unwrap();
        assert!(world.rotation_part().approx_eq(&Transform::identity(), 1e-12));
    }

    #[test]
    fn test_driven_joint_orient() {
        let mut scene = rig();
        let ctrl = "|rig|chest|hand_CTRL";
        scene.add_transform("|rig|world_LOC").unwrap();
        scene.add_transform("|rig|head_LOC").unwrap();
        scene.set_vec3("|rig|head_LOC", &ROTATE_ATTRIBUTES, &Vec3::new(0.0, 45.0, 0.0)).unwrap();
        scene.add_attribute(ctrl, "rotSpaceHead", None, 0.0, true).unwrap();
        scene
            .drive_joint_orient(
                ctrl,
                vec![
                    (None, "|rig|world_LOC".to_string()),
                    (Some("rotSpaceHead".to_string()), "|rig|head_LOC".to_string()),
                ],
            )
            .unwrap();

        assert_relative_eq!(scene.joint_orient(ctrl).unwrap(), Vec3::zeros(), epsilon = 1e-9);
        scene.set_attribute(ctrl, "rotSpaceHead", 1.0).unwrap();
        assert_relative_eq!(
            scene.joint_orient(ctrl).unwrap(),
            Vec3::new(0.0, 45.0, 0.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_driver_below_its_joint_is_rejected() {
        let mut scene = rig();
        let ctrl = "|rig|chest|hand_CTRL";
        scene.add_transform("|rig|chest|hand_CTRL|tip_LOC").unwrap();
        let tip = vec![(None, "|rig|chest|hand_CTRL|tip_LOC".to_string())];
        assert!(matches!(
            scene.drive_joint_orient(ctrl, tip),
            Err(SceneError::DriverCycle { .. })
        ));
        assert!(matches!(
            scene.drive_joint_orient(ctrl, vec![(None, ctrl.to_string())]),
            Err(SceneError::DriverCycle { .. })
        ));
        assert!(scene.world_matrix(ctrl).is_ok());
    }

    #[test]
    fn test_indirect_driver_cycle_is_rejected() {
        let mut scene = rig();
        scene.add_joint("|rig|elbow").unwrap();
        scene.add_transform("|rig|elbow|elbow_LOC").unwrap();
        scene.add_transform("|rig|chest|hand_CTRL|hand_LOC").unwrap();
        let hand = vec![(None, "|rig|chest|hand_CTRL|hand_LOC".to_string())];
        scene.drive_joint_orient("|rig|elbow", hand).unwrap();
        assert!(matches!(
            scene.drive_joint_orient(
                "|rig|chest|hand_CTRL",
                vec![(None, "|rig|elbow|elbow_LOC".to_string())]
            ),
            Err(SceneError::DriverCycle { .. })
        ));
        assert!(scene.world_matrix("|rig|elbow|elbow_LOC").is_ok());
    }

    #[test]
    fn test_writes_and_keys_are_recorded() {
        let mut scene = rig();
        scene.add_attribute("|rig|chest|hand_CTRL", "spaceChest", None, 0.0, true).unwrap();
        scene.set_attribute("|rig|chest|hand_CTRL", "spaceChest", 1.0).unwrap();
        scene
            .set_keyframe("|rig|chest|hand_CTRL", "spaceChest", TangentType::Step)
            .unwrap();
        assert_eq!(scene.attribute_writes().len(), 1);
        assert_eq!(scene.keyframes()[0].value, 1.0);
        assert_eq!(scene.keyframes()[0].tangent, TangentType::Step);
        assert_eq!(
            scene.user_attributes("|rig|chest|hand_CTRL").unwrap(),
            vec!["spaceChest".to_string()]
        );
    }

    #[test]
    fn test_string_attributes() {
        let mut scene = rig();
        scene.add_string_attribute("|rig", "config").unwrap();
        scene.set_string_attribute("|rig", "config", "{}").unwrap();
        assert_eq!(scene.get_string_attribute("|rig", "config").unwrap(), "{}");
        assert_eq!(scene.attribute_kind("|rig", "config").unwrap(), AttributeKind::String);
        assert!(matches!(
            scene.set_attribute("|rig", "config", 1.0),
            Err(SceneError::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_find_by_short_name() {
        let scene = rig();
        assert_eq!(scene.find_by_short_name("chest"), vec!["|rig|chest".to_string()]);
        assert!(scene.find_by_short_name("hip").is_empty());
    }
}
