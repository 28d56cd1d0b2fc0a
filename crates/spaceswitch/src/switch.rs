//! Switch and match operations on a single space.
//!
//! Switching toggles enable attributes on the control. Matching rewrites a
//! locator's or the control's channels so that a switch causes no visual
//! jump. Rotation spaces act through the control joint's orient, which the
//! host derives from the enable attributes, so the orient a space would
//! produce is read by switching to it temporarily under a [`ProbeGuard`].

use std::ops::{Deref, DerefMut};

use spaceswitch_math::{degrees, radians, RotationOrder, Transform};
use spaceswitch_scene::{
    NodeType, SceneError, SceneGraph, ROTATE_ATTRIBUTES, SCALE_ATTRIBUTES, TRANSLATE_ATTRIBUTES,
};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result, SpaceError};
use crate::keying::{
    attribute_values, key_attribute, key_rotation, key_transform, transform_values, AttributeValues,
    KeyOptions,
};
use crate::model::{GroupKind, Spaces, SpaceView};

/// Write one attribute unless it already holds `value`, keying per `options`.
/// Returns whether a write happened.
fn write_attribute<S: SceneGraph + ?Sized>(
    scene: &mut S,
    control: &str,
    attribute: &str,
    value: f64,
    options: &KeyOptions,
) -> Result<bool> {
    if !options.force_key_if_already_at_value && scene.get_attribute(control, attribute)? == value {
        return Ok(false);
    }
    scene.set_attribute(control, attribute, value)?;
    let keyed = key_attribute(scene, control, attribute, options, &AttributeValues::new())?;
    debug!(control, attribute, value, keyed, "set attribute");
    Ok(true)
}

/// Joint orient of a node as a rotation.
fn orient_of<S: SceneGraph + ?Sized>(scene: &S, node: &str) -> Result<Transform> {
    Ok(Transform::from_euler(
        &radians(&scene.joint_orient(node)?),
        RotationOrder::Xyz,
    ))
}

fn invert(transform: &Transform, node: &str) -> Result<Transform> {
    transform
        .inverse()
        .ok_or_else(|| SpaceError::Query(SceneError::Singular(node.to_string())))
}

/// Write a local matrix into a node's translate, rotate and scale channels.
///
/// Joints keep their orient; the rotate channels absorb the rest.
pub fn set_local<S: SceneGraph + ?Sized>(scene: &mut S, node: &str, local: &Transform) -> Result<()> {
    let parts = local.decompose();
    let mut rotation = parts.rotation;
    if scene.node_type(node)? == NodeType::Joint {
        rotation = invert(&orient_of(scene, node)?, node)?.then(&rotation);
    }
    let order = scene.rotate_order(node)?;

    scene.set_vec3(node, &TRANSLATE_ATTRIBUTES, &parts.translation)?;
    scene.set_vec3(node, &ROTATE_ATTRIBUTES, &degrees(&rotation.to_euler(order)))?;
    scene.set_vec3(node, &SCALE_ATTRIBUTES, &parts.scale)?;
    Ok(())
}

/// Move a node so its world matrix becomes `world`.
pub fn set_world<S: SceneGraph + ?Sized>(scene: &mut S, node: &str, world: &Transform) -> Result<()> {
    let local = Transform::reparent(world, &scene.parent_inverse_matrix(node)?);
    set_local(scene, node, &local)
}

/// Enable attribute values of one control, in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSnapshot {
    control: String,
    values: Vec<(String, f64)>,
}

impl AttributeSnapshot {
    /// Capture every enable attribute of both groups.
    pub fn capture<S: SceneGraph + ?Sized>(scene: &S, spaces: &Spaces) -> Result<Self> {
        let control = spaces.control_name();
        let values = spaces
            .enable_attributes()
            .map(|a| Ok((a.to_string(), scene.get_attribute(control, a)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            control: control.to_string(),
            values,
        })
    }

    /// Write back every value that has changed since capture.
    pub fn restore<S: SceneGraph + ?Sized>(&self, scene: &mut S) -> Result<()> {
        for (attribute, value) in &self.values {
            if scene.get_attribute(&self.control, attribute)? != *value {
                scene.set_attribute(&self.control, attribute, *value)?;
            }
        }
        Ok(())
    }
}

/// Scoped access to a scene whose enable attributes are put back on exit.
///
/// Dereferences to the scene. Call [`ProbeGuard::finish`] to restore and see
/// the outcome; dropping the guard restores as well, logging any failure.
pub struct ProbeGuard<'s, S: SceneGraph + ?Sized> {
    scene: &'s mut S,
    snapshot: AttributeSnapshot,
    restored: bool,
}

impl<'s, S: SceneGraph + ?Sized> ProbeGuard<'s, S> {
    /// Snapshot the enable attributes of `spaces` and hand out the scene.
    pub fn new(scene: &'s mut S, spaces: &Spaces) -> Result<Self> {
        let snapshot = AttributeSnapshot::capture(&*scene, spaces)?;
        Ok(Self {
            scene,
            snapshot,
            restored: false,
        })
    }

    fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        self.snapshot.restore(&mut *self.scene)
    }

    /// Restore the snapshot now.
    pub fn finish(mut self) -> Result<()> {
        self.restore()
    }
}

impl<S: SceneGraph + ?Sized> Deref for ProbeGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.scene
    }
}

impl<S: SceneGraph + ?Sized> DerefMut for ProbeGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.scene
    }
}

impl<S: SceneGraph + ?Sized> Drop for ProbeGuard<'_, S> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(control = %self.snapshot.control, error = %err, "failed to restore space attributes");
        }
    }
}

impl Spaces {
    /// Index of the space currently in effect for a group: the last space
    /// whose attribute is non-zero, or the base space.
    pub fn active_index<S: SceneGraph + ?Sized>(
        &self,
        scene: &S,
        kind: GroupKind,
    ) -> Result<Option<usize>> {
        let Some(group) = self.group(kind) else {
            return Ok(None);
        };
        let mut active = None;
        for (index, space) in group.spaces().iter().enumerate() {
            match space.attribute_name() {
                Some(attribute) => {
                    if scene.get_attribute(self.control_name(), attribute)? != 0.0 {
                        active = Some(index);
                    }
                }
                None => active = active.or(Some(index)),
            }
        }
        Ok(active)
    }
}

impl SpaceView<'_> {
    fn locator(&self) -> Result<&str> {
        self.space()
            .transform_name()
            .ok_or_else(|| SpaceError::NoTransform(self.name().to_string()))
    }

    /// Current value of the enable attribute; `None` for a base space.
    pub fn attribute_value<S: SceneGraph + ?Sized>(&self, scene: &S) -> Result<Option<f64>> {
        self.space()
            .attribute_name()
            .map(|a| scene.get_attribute(self.control_name(), a))
            .transpose()
            .map_err(SpaceError::from)
    }

    /// World matrix of the space's locator.
    pub fn world_matrix<S: SceneGraph + ?Sized>(&self, scene: &S) -> Result<Transform> {
        Ok(scene.world_matrix(self.locator()?)?)
    }

    /// Local matrix of the space's locator.
    pub fn local_matrix<S: SceneGraph + ?Sized>(&self, scene: &S) -> Result<Transform> {
        Ok(scene.local_matrix(self.locator()?)?)
    }

    /// Make this space the active one.
    ///
    /// Every later space in the group is disabled first, then this space's
    /// attribute is enabled. Earlier spaces are left alone since later ones
    /// take precedence over them.
    pub fn switch_to_space<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        options: &KeyOptions,
    ) -> Result<()> {
        let control = self.control_name();
        let group = self.group();

        for (index, sibling) in group.spaces().iter().enumerate().skip(self.index() + 1) {
            let attribute = sibling.attribute_name().ok_or(ConfigError::MissingAttribute {
                group: group.kind().name(),
                index,
            })?;
            write_attribute(scene, control, attribute, 0.0, options)?;
        }
        if let Some(attribute) = self.space().attribute_name() {
            write_attribute(scene, control, attribute, 1.0, options)?;
        }

        debug!(control, group = group.kind().name(), space = self.name(), "switched space");
        Ok(())
    }

    /// Set the enable attribute to `value`. Does nothing for a base space.
    pub fn set_attribute<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        value: f64,
        options: &KeyOptions,
    ) -> Result<()> {
        if let Some(attribute) = self.space().attribute_name() {
            write_attribute(scene, self.control_name(), attribute, value, options)?;
        }
        Ok(())
    }

    /// Joint orient the control would have with this space active.
    ///
    /// Switches temporarily and restores every enable attribute, whether or
    /// not the read succeeds.
    pub fn probe_joint_orient<S: SceneGraph + ?Sized>(&self, scene: &mut S) -> Result<Transform> {
        let mut probe = ProbeGuard::new(scene, self.owner())?;
        self.switch_to_space(&mut *probe, &KeyOptions::default())?;
        let orient = orient_of(&*probe, self.control_name())?;
        probe.finish()?;
        Ok(orient)
    }

    /// Move the locator onto the control so that switching to this space
    /// later leaves the control where it is.
    ///
    /// For a rotation space the locator is then counter-rotated by the
    /// change in joint orient the switch would cause.
    pub fn match_locator_to_control<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        options: &KeyOptions,
    ) -> Result<()> {
        let locator = self.locator()?;
        let control = self.control_name();
        let control_world = scene.world_matrix(control)?;
        let original = transform_values(&*scene, locator)?;
        let orient_before = if self.is_rotation_space() {
            Some(orient_of(&*scene, control)?)
        } else {
            None
        };

        set_world(scene, locator, &control_world)?;

        if let Some(before) = orient_before {
            let after = self.probe_joint_orient(scene)?;
            let delta = invert(&after, control)?.then(&before);
            let local = scene.local_matrix(locator)?.decompose();
            let rotated =
                Transform::from_trs(&local.translation, &local.rotation.then(&delta), &local.scale);
            set_local(scene, locator, &rotated)?;
        }

        let keys = key_transform(scene, locator, options, &original)?;
        info!(control, locator, space = self.name(), keys, "matched locator to control");
        Ok(())
    }

    /// Move this space's locator onto another space's locator.
    pub fn match_locator_to_locator<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        other: &SpaceView<'_>,
        options: &KeyOptions,
    ) -> Result<()> {
        let locator = self.locator()?;
        let source = other.locator()?;
        let target = scene.world_matrix(source)?;
        let original = transform_values(&*scene, locator)?;
        set_world(scene, locator, &target)?;
        let keys = key_transform(scene, locator, options, &original)?;
        info!(locator, source, keys, "matched locator to locator");
        Ok(())
    }

    /// Move the control to where this space would put it, without switching.
    ///
    /// A position space copies the locator's world matrix onto the control.
    /// A rotation space only turns the control's rotate channels by the
    /// difference between the current joint orient and the one the space
    /// would produce.
    pub fn match_control_to_locator<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        options: &KeyOptions,
    ) -> Result<()> {
        let control = self.control_name();

        if self.is_rotation_space() {
            let before = orient_of(&*scene, control)?;
            let after = self.probe_joint_orient(scene)?;
            let delta = invert(&before, control)?.then(&after);

            let order = scene.rotate_order(control)?;
            let original = attribute_values(&*scene, control, &ROTATE_ATTRIBUTES)?;
            let angles = radians(&scene.get_vec3(control, &ROTATE_ATTRIBUTES)?);
            let rotate = Transform::from_euler(&angles, order);
            let rotated = delta.then(&rotate);
            scene.set_vec3(control, &ROTATE_ATTRIBUTES, &degrees(&rotated.to_euler(order)))?;

            let keys = key_rotation(scene, control, options, &original)?;
            info!(control, space = self.name(), keys, "matched control rotation to space");
        } else {
            let locator = self.locator()?;
            let target = scene.world_matrix(locator)?;
            let original = transform_values(&*scene, control)?;
            set_world(scene, control, &target)?;

            let keys = key_transform(scene, control, options, &original)?;
            info!(control, locator, keys, "matched control to locator");
        }
        Ok(())
    }

    /// Select the space's locator.
    pub fn select_transform<S: SceneGraph + ?Sized>(&self, scene: &mut S) -> Result<()> {
        let locator = self.locator()?;
        scene.select(&[locator.to_string()])?;
        Ok(())
    }

    /// Reset the locator's channels to identity.
    pub fn zero_transform<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        options: &KeyOptions,
    ) -> Result<()> {
        let locator = self.locator()?;
        let original = transform_values(&*scene, locator)?;
        zero_channels(scene, locator)?;
        key_transform(scene, locator, options, &original)?;
        Ok(())
    }
}

fn zero_channels<S: SceneGraph + ?Sized>(scene: &mut S, node: &str) -> Result<()> {
    for attribute in TRANSLATE_ATTRIBUTES.iter().chain(ROTATE_ATTRIBUTES.iter()) {
        scene.set_attribute(node, attribute, 0.0)?;
    }
    for attribute in SCALE_ATTRIBUTES {
        scene.set_attribute(node, attribute, 1.0)?;
    }
    Ok(())
}
