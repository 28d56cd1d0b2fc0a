//! Keyframe helpers shared by the switch and match operations.

use std::collections::HashMap;

use spaceswitch_math::Tolerance;
use spaceswitch_scene::{SceneGraph, TangentType, ROTATE_ATTRIBUTES, TRS_ATTRIBUTES};
use tracing::debug;

use crate::error::Result;

/// How an operation keys the attributes it writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOptions {
    /// Set a keyframe after each write.
    pub key_enabled: bool,
    /// Write and key an attribute even if it already holds the target value.
    pub force_key_if_already_at_value: bool,
    /// Use stepped tangents on the keys written.
    pub step_tangent_keys: bool,
}

impl KeyOptions {
    /// Options that key every write.
    pub fn keyed() -> Self {
        Self {
            key_enabled: true,
            ..Self::default()
        }
    }

    /// Tangent type for keys written under these options.
    pub fn tangent(&self) -> TangentType {
        if self.step_tangent_keys {
            TangentType::Step
        } else {
            TangentType::Auto
        }
    }
}

/// Attribute values captured before a write, keyed by attribute name.
pub type AttributeValues = HashMap<String, f64>;

/// Snapshot the given attributes of a node.
pub fn attribute_values<S: SceneGraph + ?Sized>(
    scene: &S,
    node: &str,
    attributes: &[&str],
) -> Result<AttributeValues> {
    attributes
        .iter()
        .map(|a| Ok((a.to_string(), scene.get_attribute(node, a)?)))
        .collect()
}

/// Snapshot the nine translate/rotate/scale channels of a node.
pub fn transform_values<S: SceneGraph + ?Sized>(scene: &S, node: &str) -> Result<AttributeValues> {
    attribute_values(scene, node, &TRS_ATTRIBUTES)
}

/// Key one attribute if keying is enabled and its value moved away from
/// `original`. Returns whether a key was set.
pub fn key_attribute<S: SceneGraph + ?Sized>(
    scene: &mut S,
    node: &str,
    attribute: &str,
    options: &KeyOptions,
    original: &AttributeValues,
) -> Result<bool> {
    if !options.key_enabled {
        return Ok(false);
    }
    if !options.force_key_if_already_at_value {
        let current = scene.get_attribute(node, attribute)?;
        let unchanged = original
            .get(attribute)
            .is_some_and(|before| Tolerance::DEFAULT.is_zero(current - before));
        if unchanged {
            return Ok(false);
        }
    }
    if !scene.is_keyable(node, attribute)? {
        debug!(node, attribute, "skipping key on non-keyable attribute");
        return Ok(false);
    }
    scene.set_keyframe(node, attribute, options.tangent())?;
    Ok(true)
}

/// Key each attribute in turn. Returns the number of keys set.
pub fn key_attributes<S: SceneGraph + ?Sized>(
    scene: &mut S,
    node: &str,
    attributes: &[&str],
    options: &KeyOptions,
    original: &AttributeValues,
) -> Result<usize> {
    let mut count = 0;
    for attribute in attributes {
        if key_attribute(scene, node, attribute, options, original)? {
            count += 1;
        }
    }
    Ok(count)
}

/// Key the translate/rotate/scale channels that changed.
pub fn key_transform<S: SceneGraph + ?Sized>(
    scene: &mut S,
    node: &str,
    options: &KeyOptions,
    original: &AttributeValues,
) -> Result<usize> {
    key_attributes(scene, node, &TRS_ATTRIBUTES, options, original)
}

/// Key the rotate channels that changed.
pub fn key_rotation<S: SceneGraph + ?Sized>(
    scene: &mut S,
    node: &str,
    options: &KeyOptions,
    original: &AttributeValues,
) -> Result<usize> {
    key_attributes(scene, node, &ROTATE_ATTRIBUTES, options, original)
}
