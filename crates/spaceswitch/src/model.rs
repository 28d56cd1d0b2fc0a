//! Space model: spaces, space groups and a control's full configuration.
//!
//! A [`Spaces`] value is built once from JSON, validated eagerly against the
//! scene, and never mutated afterwards. Back-references from a space to its
//! group and control are not stored; a [`SpaceView`] carries them as
//! borrows instead.

use spaceswitch_ir::{
    GroupConfig, SpaceDefinition, SpacesConfig, ROTATION_SPACES_GROUP, SPACES_GROUP,
};
use spaceswitch_scene::{is_long_name, NodeType, SceneGraph};
use tracing::debug;

use crate::error::ConfigError;

/// Which of a control's two groups a space belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Position spaces, switched through the control's parent.
    Spaces,
    /// Rotation spaces, switched through the control joint's orient.
    RotationSpaces,
}

impl GroupKind {
    /// Both kinds, in display order.
    pub const ALL: [GroupKind; 2] = [GroupKind::Spaces, GroupKind::RotationSpaces];

    /// Display name, also the JSON key of the group.
    pub fn name(self) -> &'static str {
        match self {
            GroupKind::Spaces => SPACES_GROUP,
            GroupKind::RotationSpaces => ROTATION_SPACES_GROUP,
        }
    }
}

/// One selectable parent option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Space {
    name: String,
    attribute_name: Option<String>,
    transform_name: Option<String>,
}

impl Space {
    /// Create a space. No scene validation happens here.
    pub fn new(
        name: impl Into<String>,
        attribute_name: Option<String>,
        transform_name: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            attribute_name,
            transform_name,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enable attribute on the control; `None` for a base space.
    pub fn attribute_name(&self) -> Option<&str> {
        self.attribute_name.as_deref()
    }

    /// Locator path.
    pub fn transform_name(&self) -> Option<&str> {
        self.transform_name.as_deref()
    }

    fn from_definition<S: SceneGraph + ?Sized>(
        scene: &S,
        control_name: &str,
        kind: GroupKind,
        index: usize,
        def: &SpaceDefinition,
    ) -> Result<Self, ConfigError> {
        if let Some(attribute) = &def.attribute_name {
            if !scene.has_attribute(control_name, attribute) {
                return Err(ConfigError::NoSuchAttribute {
                    control: control_name.to_string(),
                    attribute: attribute.clone(),
                });
            }
        }

        let name = match (&def.name, &def.attribute_name) {
            (Some(name), _) => name.clone(),
            (None, Some(attribute)) => scene.attribute_nice_name(control_name, attribute)?,
            (None, None) => {
                return Err(ConfigError::UnnamedSpace {
                    group: kind.name(),
                    index,
                })
            }
        };

        if let Some(transform) = &def.transform_name {
            if !is_long_name(transform) {
                return Err(ConfigError::ShortName {
                    what: "transform",
                    name: transform.clone(),
                });
            }
            if !scene.exists(transform) {
                return Err(ConfigError::NoSuchTransform(transform.clone()));
            }
            if scene.node_type(transform)? != NodeType::Transform {
                return Err(ConfigError::NotATransform(transform.clone()));
            }
        }

        Ok(Self {
            name,
            attribute_name: def.attribute_name.clone(),
            transform_name: def.transform_name.clone(),
        })
    }

    fn to_definition(&self) -> SpaceDefinition {
        SpaceDefinition {
            name: Some(self.name.clone()),
            attribute_name: self.attribute_name.clone(),
            transform_name: self.transform_name.clone(),
        }
    }
}

/// An ordered list of mutually exclusive spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceGroup {
    kind: GroupKind,
    spaces: Vec<Space>,
}

impl SpaceGroup {
    /// Create a group. Only the first space may lack an enable attribute.
    pub fn new(kind: GroupKind, spaces: Vec<Space>) -> Result<Self, ConfigError> {
        if let Some(index) = spaces
            .iter()
            .skip(1)
            .position(|s| s.attribute_name.is_none())
        {
            return Err(ConfigError::MissingAttribute {
                group: kind.name(),
                index: index + 1,
            });
        }
        Ok(Self { kind, spaces })
    }

    /// Which group this is.
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// The spaces, base space first.
    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    /// Number of spaces.
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    /// Whether the group has no spaces.
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// Index of the first space with this name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.spaces.iter().position(|s| s.name == name)
    }

    fn from_config<S: SceneGraph + ?Sized>(
        scene: &S,
        control_name: &str,
        kind: GroupKind,
        config: &GroupConfig,
    ) -> Result<Self, ConfigError> {
        let spaces = config
            .definitions
            .iter()
            .enumerate()
            .map(|(index, def)| Space::from_definition(scene, control_name, kind, index, def))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(kind, spaces)
    }

    fn to_config(&self) -> GroupConfig {
        GroupConfig::new(self.spaces.iter().map(Space::to_definition).collect())
    }
}

/// One control's full space configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spaces {
    control_name: String,
    spaces: Option<SpaceGroup>,
    rotation_spaces: Option<SpaceGroup>,
}

impl Spaces {
    /// Assemble from already validated groups.
    pub fn new(
        control_name: impl Into<String>,
        spaces: Option<SpaceGroup>,
        rotation_spaces: Option<SpaceGroup>,
    ) -> Self {
        Self {
            control_name: control_name.into(),
            spaces,
            rotation_spaces,
        }
    }

    /// Parse and validate a configuration JSON string for `control_name`.
    pub fn parse<S: SceneGraph + ?Sized>(
        scene: &S,
        control_name: &str,
        json: &str,
    ) -> Result<Self, ConfigError> {
        let config = SpacesConfig::from_json(json)?;
        Self::from_config(scene, control_name, &config)
    }

    /// Validate a configuration document for `control_name`.
    pub fn from_config<S: SceneGraph + ?Sized>(
        scene: &S,
        control_name: &str,
        config: &SpacesConfig,
    ) -> Result<Self, ConfigError> {
        if !is_long_name(control_name) {
            return Err(ConfigError::ShortName {
                what: "control name",
                name: control_name.to_string(),
            });
        }
        if !scene.exists(control_name) {
            return Err(ConfigError::NoSuchControl(control_name.to_string()));
        }

        let spaces = config
            .spaces
            .as_ref()
            .map(|g| SpaceGroup::from_config(scene, control_name, GroupKind::Spaces, g))
            .transpose()?;
        let rotation_spaces = config
            .rotation_spaces
            .as_ref()
            .map(|g| SpaceGroup::from_config(scene, control_name, GroupKind::RotationSpaces, g))
            .transpose()?;

        if rotation_spaces.is_some() && scene.node_type(control_name)? != NodeType::Joint {
            return Err(ConfigError::RotationSpacesOnNonJoint(control_name.to_string()));
        }

        debug!(
            control = control_name,
            spaces = spaces.as_ref().map_or(0, SpaceGroup::len),
            rotation_spaces = rotation_spaces.as_ref().map_or(0, SpaceGroup::len),
            "loaded space configuration"
        );

        Ok(Self {
            control_name: control_name.to_string(),
            spaces,
            rotation_spaces,
        })
    }

    /// Fully-qualified path of the owning control.
    pub fn control_name(&self) -> &str {
        &self.control_name
    }

    /// Position spaces.
    pub fn spaces(&self) -> Option<&SpaceGroup> {
        self.spaces.as_ref()
    }

    /// Rotation spaces.
    pub fn rotation_spaces(&self) -> Option<&SpaceGroup> {
        self.rotation_spaces.as_ref()
    }

    /// The group of the given kind.
    pub fn group(&self, kind: GroupKind) -> Option<&SpaceGroup> {
        match kind {
            GroupKind::Spaces => self.spaces(),
            GroupKind::RotationSpaces => self.rotation_spaces(),
        }
    }

    /// A handle on one space, with its group and control attached.
    pub fn space(&self, kind: GroupKind, index: usize) -> Option<SpaceView<'_>> {
        let group = self.group(kind)?;
        (index < group.len()).then_some(SpaceView {
            owner: self,
            group,
            index,
        })
    }

    /// A handle on the first space named `name` in the group.
    pub fn space_named(&self, kind: GroupKind, name: &str) -> Option<SpaceView<'_>> {
        let index = self.group(kind)?.index_of(name)?;
        self.space(kind, index)
    }

    /// Every enable attribute across both groups.
    pub fn enable_attributes(&self) -> impl Iterator<Item = &str> {
        GroupKind::ALL
            .into_iter()
            .filter_map(|kind| self.group(kind))
            .flat_map(|g| g.spaces.iter())
            .filter_map(Space::attribute_name)
    }

    /// The configuration document for these spaces.
    pub fn to_config(&self) -> SpacesConfig {
        SpacesConfig {
            spaces: self.spaces.as_ref().map(SpaceGroup::to_config),
            rotation_spaces: self.rotation_spaces.as_ref().map(SpaceGroup::to_config),
        }
    }

    /// The configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(self.to_config().to_json()?)
    }
}

/// A borrowed handle on one space inside a [`Spaces`].
#[derive(Debug, Clone, Copy)]
pub struct SpaceView<'a> {
    owner: &'a Spaces,
    group: &'a SpaceGroup,
    index: usize,
}

impl<'a> SpaceView<'a> {
    /// The space itself.
    pub fn space(&self) -> &'a Space {
        &self.group.spaces[self.index]
    }

    /// The group holding the space.
    pub fn group(&self) -> &'a SpaceGroup {
        self.group
    }

    /// The configuration holding the group.
    pub fn owner(&self) -> &'a Spaces {
        self.owner
    }

    /// Position of the space within its group.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Path of the control the space belongs to.
    pub fn control_name(&self) -> &'a str {
        &self.owner.control_name
    }

    /// Display name.
    pub fn name(&self) -> &'a str {
        &self.space().name
    }

    /// Whether this is a base space (no enable attribute).
    pub fn is_base(&self) -> bool {
        self.space().attribute_name.is_none()
    }

    /// Whether the space belongs to the rotation group.
    pub fn is_rotation_space(&self) -> bool {
        self.group.kind == GroupKind::RotationSpaces
    }
}
