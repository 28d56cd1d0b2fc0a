//! Build a starting configuration from a control's attributes.
//!
//! Attributes whose nice name starts with `Space ` become position spaces,
//! those starting with `Rot Space ` become rotation spaces. Locators are
//! found by naming convention:
//!
//! | Space | Locator short name |
//! |---|---|
//! | `Space Chest` on `hand_CTRL` | `hand_CTRL__space_chest__LOC` |
//! | `Rot Space Head` on `hand_CTRL` | `hand_CTRL_rot__space_head__LOC` |
//! | `Space COG` | `..__space_COG__LOC` |
//! | `Space Aux 3` | `..__space_auxiliary_03__LOC` |
//!
//! The output is not validated; it is meant to be reviewed and then stored
//! with [`crate::write_config`].

use spaceswitch_ir::{GroupConfig, SpaceDefinition, SpacesConfig, SPACES_GROUP};
use spaceswitch_scene::{short_name, SceneGraph};
use tracing::{debug, warn};

use crate::error::Result;

const SPACE_PREFIX: &str = "Space ";
const ROTATION_PREFIX: &str = "Rot ";
const AUX_PREFIX: &str = "Space Aux ";

/// Prefix of locator paths that could not be found.
pub const NOT_FOUND_PREFIX: &str = "|NOT_FOUND|";

/// Generate a configuration for `control` from its user-defined attributes.
pub fn generate<S: SceneGraph + ?Sized>(scene: &S, control: &str) -> Result<SpacesConfig> {
    let mut position = Vec::new();
    let mut rotation = Vec::new();

    for attribute in scene.user_attributes(control)? {
        let nice = scene.attribute_nice_name(control, &attribute)?;
        if nice.starts_with(SPACE_PREFIX) {
            position.push((attribute, nice));
        } else if nice
            .strip_prefix(ROTATION_PREFIX)
            .is_some_and(|rest| rest.starts_with(SPACE_PREFIX))
        {
            rotation.push((attribute, nice));
        }
    }
    debug!(
        control,
        spaces = position.len(),
        rotation_spaces = rotation.len(),
        "found space attributes"
    );

    let mut config = SpacesConfig::new();
    if !position.is_empty() {
        let definitions = position
            .iter()
            .map(|(attribute, nice)| definition(scene, control, attribute, nice, false))
            .collect::<Result<Vec<_>>>()?;
        config.spaces = Some(GroupConfig::new(definitions));
    }
    if !rotation.is_empty() {
        let mut definitions = Vec::with_capacity(rotation.len() + 1);
        if !position.is_empty() {
            definitions.push(SpaceDefinition::named(SPACES_GROUP));
        }
        for (attribute, nice) in &rotation {
            definitions.push(definition(scene, control, attribute, nice, true)?);
        }
        config.rotation_spaces = Some(GroupConfig::new(definitions));
    }
    Ok(config)
}

fn definition<S: SceneGraph + ?Sized>(
    scene: &S,
    control: &str,
    attribute: &str,
    nice: &str,
    rotation: bool,
) -> Result<SpaceDefinition> {
    let locator = find_locator(scene, &locator_short_name(control, nice, rotation));
    let definition = if scene.is_keyable(control, attribute)? {
        SpaceDefinition::default().with_attribute(attribute)
    } else {
        SpaceDefinition::named(nice)
    };
    Ok(definition.with_transform(locator))
}

/// Short name of the locator expected for a space attribute's nice name.
pub fn locator_short_name(control: &str, nice_name: &str, rotation: bool) -> String {
    let part = if rotation {
        nice_name.strip_prefix(ROTATION_PREFIX).unwrap_or(nice_name)
    } else {
        nice_name
    };
    let control = short_name(control);
    if rotation {
        format!("{control}_rot__{}__LOC", name_part(part))
    } else {
        format!("{control}__{}__LOC", name_part(part))
    }
}

fn name_part(nice: &str) -> String {
    if nice == "Space COG" {
        return "space_COG".to_string();
    }
    if let Some(number) = nice
        .strip_prefix(AUX_PREFIX)
        .and_then(|n| n.trim().parse::<u32>().ok())
    {
        return format!("space_auxiliary_{number:02}");
    }
    nice.to_lowercase().replace(' ', "_")
}

fn find_locator<S: SceneGraph + ?Sized>(scene: &S, short: &str) -> String {
    let found = scene.find_by_short_name(short);
    if found.len() > 1 {
        debug!(locator = short, count = found.len(), "several locators match, using the first");
    }
    match found.into_iter().next() {
        Some(path) => path,
        None => {
            warn!(locator = short, "no space locator found");
            format!("{NOT_FOUND_PREFIX}{short}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spaceswitch_scene::MemoryScene;

    #[test]
    fn test_locator_names() {
        assert_eq!(
            locator_short_name("|rig|hand_CTRL", "Space Chest", false),
            "hand_CTRL__space_chest__LOC"
        );
        assert_eq!(
            locator_short_name("|rig|hand_CTRL", "Rot Space Rig Main", true),
            "hand_CTRL_rot__space_rig_main__LOC"
        );
        assert_eq!(
            locator_short_name("|hand_CTRL", "Space COG", false),
            "hand_CTRL__space_COG__LOC"
        );
        assert_eq!(
            locator_short_name("|hand_CTRL", "Rot Space Aux 3", true),
            "hand_CTRL_rot__space_auxiliary_03__LOC"
        );
    }

    #[test]
    fn test_generate_from_attributes() {
        let mut scene = MemoryScene::new();
        scene.add_transform("|rig").unwrap();
        scene.add_joint("|rig|hand_CTRL").unwrap();
        scene.add_transform("|rig|hand_CTRL__space_chest__LOC").unwrap();
        scene.add_transform("|rig|hand_CTRL_rot__space_world__LOC").unwrap();
        let ctrl = "|rig|hand_CTRL";
        scene.add_attribute(ctrl, "spaceWorld", None, 0.0, false).unwrap();
        scene.add_attribute(ctrl, "spaceChest", None, 0.0, true).unwrap();
        scene.add_attribute(ctrl, "rotSpaceWorld", None, 0.0, true).unwrap();
        scene.add_attribute(ctrl, "ikBlend", None, 0.0, true).unwrap();

        let config = generate(&scene, ctrl).unwrap();
        let spaces = config.spaces.unwrap().definitions;
        assert_eq!(spaces.len(), 2);
        assert_eq!(spaces[0].name.as_deref(), Some("Space World"));
        assert_eq!(spaces[0].attribute_name, None);
        assert_eq!(
            spaces[0].transform_name.as_deref(),
            Some("|NOT_FOUND|hand_CTRL__space_world__LOC")
        );
        assert_eq!(spaces[1].attribute_name.as_deref(), Some("spaceChest"));
        assert_eq!(
            spaces[1].transform_name.as_deref(),
            Some("|rig|hand_CTRL__space_chest__LOC")
        );

        let rotation = config.rotation_spaces.unwrap().definitions;
        assert_eq!(rotation[0], SpaceDefinition::named("Spaces"));
        assert_eq!(
            rotation[1].transform_name.as_deref(),
            Some("|rig|hand_CTRL_rot__space_world__LOC")
        );
    }

    #[test]
    fn test_generate_without_space_attributes() {
        let mut scene = MemoryScene::new();
        scene.add_transform("|ctrl").unwrap();
        let config = generate(&scene, "|ctrl").unwrap();
        assert_eq!(config, SpacesConfig::new());
    }
}
