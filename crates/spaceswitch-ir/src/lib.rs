//! Configuration schema for rig space switching.
//!
//! A control carries its space configuration as a JSON string attribute.
//! This crate defines that document: two optional groups, each an ordered
//! list of space definitions. It is purely declarative; checking the
//! definitions against a scene is the job of the `spaceswitch` crate.
//!
//! ```json
//! {
//!   "Spaces": { "Definitions": [ {"name": "World", "transformName": "|rig|world_LOC"} ] },
//!   "Rotation Spaces": { "Definitions": [ ... ] }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Name of the string attribute holding the configuration on a control.
pub const CONFIG_ATTRIBUTE: &str = "ILLMayaSpaceSwitcherConfig";

/// JSON key and display name of the position space group.
pub const SPACES_GROUP: &str = "Spaces";

/// JSON key and display name of the rotation space group.
pub const ROTATION_SPACES_GROUP: &str = "Rotation Spaces";

/// One space definition as written in the configuration.
///
/// Every field is optional in the document; which combinations are legal
/// depends on the definition's position in its group and on the scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceDefinition {
    /// Display name. Derived from the attribute nice name when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Internal (non-nice) name of the enable attribute on the control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
    /// Fully-qualified path of the locator representing the space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_name: Option<String>,
}

impl SpaceDefinition {
    /// Definition with a name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Builder: set the enable attribute.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute_name = Some(attribute.into());
        self
    }

    /// Builder: set the locator path.
    pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
        self.transform_name = Some(transform.into());
        self
    }
}

/// An ordered list of mutually exclusive space definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// The definitions, base space first.
    #[serde(rename = "Definitions")]
    pub definitions: Vec<SpaceDefinition>,
}

impl GroupConfig {
    /// Create a group from its definitions.
    pub fn new(definitions: Vec<SpaceDefinition>) -> Self {
        Self { definitions }
    }
}

/// A control's full space configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacesConfig {
    /// Position spaces.
    #[serde(rename = "Spaces", default, skip_serializing_if = "Option::is_none")]
    pub spaces: Option<GroupConfig>,
    /// Rotation spaces, driving the control joint's orientation offset.
    #[serde(
        rename = "Rotation Spaces",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rotation_spaces: Option<GroupConfig>,
}

impl SpacesConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The starter configuration offered when a control has none yet.
pub fn default_template() -> SpacesConfig {
    SpacesConfig {
        spaces: Some(GroupConfig::new(vec![
            SpaceDefinition::named("Space World")
                .with_transform("|rig|COG_CTRL__space_world__LOC"),
            SpaceDefinition::default()
                .with_attribute("spaceRigMain")
                .with_transform("|rig|COG_CTRL__space_rig_main__LOC"),
        ])),
        rotation_spaces: Some(GroupConfig::new(vec![
            SpaceDefinition::named("Spaces"),
            SpaceDefinition::default()
                .with_attribute("rotSpaceWorld")
                .with_transform("|rig|COG_CTRL_rot__space_world__LOC"),
        ])),
    }
}
