//! Reading and writing the configuration attribute on a control.

use spaceswitch_ir::CONFIG_ATTRIBUTE;
use spaceswitch_scene::{AttributeKind, SceneGraph};
use tracing::info;

use crate::error::ConfigError;
use crate::model::Spaces;

/// The configuration JSON stored on a control, if any.
pub fn read_config<S: SceneGraph + ?Sized>(scene: &S, control: &str) -> Option<String> {
    if !scene.has_attribute(control, CONFIG_ATTRIBUTE) {
        return None;
    }
    match scene.attribute_kind(control, CONFIG_ATTRIBUTE) {
        Ok(AttributeKind::String) => scene.get_string_attribute(control, CONFIG_ATTRIBUTE).ok(),
        _ => None,
    }
}

/// Check a configuration against a control without storing it.
pub fn validate<S: SceneGraph + ?Sized>(
    scene: &S,
    control: &str,
    json: &str,
) -> Result<(), ConfigError> {
    Spaces::parse(scene, control, json).map(|_| ())
}

/// Validate a configuration and store it on the control, creating the
/// attribute if needed.
pub fn write_config<S: SceneGraph + ?Sized>(
    scene: &mut S,
    control: &str,
    json: &str,
) -> Result<Spaces, ConfigError> {
    let spaces = Spaces::parse(&*scene, control, json)?;

    if scene.has_attribute(control, CONFIG_ATTRIBUTE) {
        if scene.attribute_kind(control, CONFIG_ATTRIBUTE)? != AttributeKind::String {
            return Err(ConfigError::ConfigAttributeNotString {
                control: control.to_string(),
                attribute: CONFIG_ATTRIBUTE.to_string(),
            });
        }
    } else {
        scene.add_string_attribute(control, CONFIG_ATTRIBUTE)?;
    }
    scene.set_string_attribute(control, CONFIG_ATTRIBUTE, json)?;

    info!(control, "stored space configuration");
    Ok(spaces)
}

impl Spaces {
    /// Load the configuration stored on a control. `None` when the control
    /// carries none.
    pub fn from_control<S: SceneGraph + ?Sized>(
        scene: &S,
        control: &str,
    ) -> Result<Option<Self>, ConfigError> {
        read_config(scene, control)
            .map(|json| Self::parse(scene, control, &json))
            .transpose()
    }
}
