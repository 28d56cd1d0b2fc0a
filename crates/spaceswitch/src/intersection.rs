//! Ordered intersection of the spaces of several selected controls.
//!
//! The first control's order is authoritative. Each later control is
//! aligned against the running result with a single left-to-right greedy
//! pass, so names shared in a different order can drop out even where a
//! longest common subsequence would keep them.
//!
//! Members live in a slot map; aligned entries refer to their spaces by
//! [`SpaceId`] and are resolved back to [`SpaceView`]s on demand.

use slotmap::{new_key_type, SlotMap};
use spaceswitch_scene::SceneGraph;
use tracing::debug;

use crate::error::ConfigError;
use crate::model::{GroupKind, SpaceGroup, SpaceView, Spaces};

new_key_type! {
    /// Key of one member control in an [`Intersection`].
    pub struct SpacesKey;
}

/// Handle on one space of one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpaceId {
    /// Member the space belongs to.
    pub member: SpacesKey,
    /// Group within the member.
    pub kind: GroupKind,
    /// Index within the group.
    pub index: usize,
}

/// One aligned entry: a shared name and the matching space of every member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionSpace {
    name: String,
    members: Vec<SpaceId>,
}

impl IntersectionSpace {
    /// Shared display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One space per member, in selection order.
    pub fn members(&self) -> &[SpaceId] {
        &self.members
    }
}

/// Aligned entries for one group kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionGroup {
    kind: GroupKind,
    spaces: Vec<IntersectionSpace>,
}

impl IntersectionGroup {
    /// Align the groups of several members, in the order given.
    pub fn evaluate(kind: GroupKind, groups: &[(SpacesKey, &SpaceGroup)]) -> Self {
        let Some(((first_key, first), rest)) = groups.split_first() else {
            return Self {
                kind,
                spaces: Vec::new(),
            };
        };

        let mut spaces: Vec<IntersectionSpace> = first
            .spaces()
            .iter()
            .enumerate()
            .map(|(index, space)| IntersectionSpace {
                name: space.name().to_string(),
                members: vec![SpaceId {
                    member: *first_key,
                    kind,
                    index,
                }],
            })
            .collect();

        for (key, group) in rest {
            let candidates = group.spaces();
            let mut entry = 0;
            let mut cursor = 0;

            while entry < spaces.len() {
                if cursor >= candidates.len() {
                    spaces.truncate(entry);
                    break;
                }
                let found = candidates[cursor..]
                    .iter()
                    .position(|c| c.name() == spaces[entry].name);
                match found {
                    Some(offset) => {
                        spaces[entry].members.push(SpaceId {
                            member: *key,
                            kind,
                            index: cursor + offset,
                        });
                        cursor += offset + 1;
                        entry += 1;
                    }
                    None => {
                        spaces.remove(entry);
                    }
                }
            }
        }

        Self { kind, spaces }
    }

    /// Which group kind this is.
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// The aligned entries.
    pub fn spaces(&self) -> &[IntersectionSpace] {
        &self.spaces
    }

    /// Number of aligned entries.
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    /// Whether nothing is shared.
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// The entry with this name.
    pub fn find(&self, name: &str) -> Option<&IntersectionSpace> {
        self.spaces.iter().find(|s| s.name == name)
    }

    /// Names of the aligned entries.
    pub fn names(&self) -> Vec<&str> {
        self.spaces.iter().map(|s| s.name.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
struct Member {
    control_name: String,
    spaces: Option<Spaces>,
}

/// The spaces of a multi-selection and their aligned groups.
#[derive(Debug, Clone, Default)]
pub struct Intersection {
    members: SlotMap<SpacesKey, Member>,
    order: Vec<SpacesKey>,
    spaces: Option<IntersectionGroup>,
    rotation_spaces: Option<IntersectionGroup>,
}

impl Intersection {
    /// An empty intersection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and align the spaces of the given controls, in selection order.
    ///
    /// Loading stops at the first control without a configuration; such a
    /// control empties the intersection. An invalid stored configuration is
    /// returned as an error.
    pub fn from_controls<S: SceneGraph + ?Sized>(
        scene: &S,
        controls: &[String],
    ) -> Result<Self, ConfigError> {
        let mut intersection = Self::new();
        for control in controls {
            match Spaces::from_control(scene, control)? {
                Some(spaces) => {
                    intersection.add_spaces(spaces);
                }
                None => {
                    debug!(control = %control, "control has no space configuration");
                    intersection.add_unconfigured(control);
                    break;
                }
            }
        }
        intersection.evaluate();
        Ok(intersection)
    }

    fn insert(&mut self, control_name: &str, spaces: Option<Spaces>) -> Option<SpacesKey> {
        if self.contains(control_name) {
            return None;
        }
        let key = self.members.insert(Member {
            control_name: control_name.to_string(),
            spaces,
        });
        self.order.push(key);
        Some(key)
    }

    /// Add a control's spaces. Returns `None` if the control is already a
    /// member.
    pub fn add_spaces(&mut self, spaces: Spaces) -> Option<SpacesKey> {
        let control_name = spaces.control_name().to_string();
        self.insert(&control_name, Some(spaces))
    }

    /// Add a control that has no usable configuration.
    pub fn add_unconfigured(&mut self, control_name: &str) -> Option<SpacesKey> {
        self.insert(control_name, None)
    }

    /// Remove a control. Returns whether it was a member.
    pub fn remove_spaces(&mut self, control_name: &str) -> bool {
        let Some(position) = self
            .order
            .iter()
            .position(|k| self.members[*k].control_name == control_name)
        else {
            return false;
        };
        let key = self.order.remove(position);
        self.members.remove(key);
        true
    }

    /// Whether the control is a member.
    pub fn contains(&self, control_name: &str) -> bool {
        self.members.values().any(|m| m.control_name == control_name)
    }

    /// Number of member controls.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether there are no members.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Member control paths, in selection order.
    pub fn control_names(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .map(|k| self.members[*k].control_name.as_str())
    }

    /// Spaces of a member, if it is configured.
    pub fn member(&self, key: SpacesKey) -> Option<&Spaces> {
        self.members.get(key)?.spaces.as_ref()
    }

    /// Recompute both aligned groups from the current members.
    ///
    /// An empty selection or any unconfigured member clears both groups. A
    /// group kind missing from any member clears that group.
    pub fn evaluate(&mut self) {
        self.spaces = None;
        self.rotation_spaces = None;

        let mut configured = Vec::with_capacity(self.order.len());
        for key in &self.order {
            match &self.members[*key].spaces {
                Some(spaces) => configured.push((*key, spaces)),
                None => return,
            }
        }
        if configured.is_empty() {
            return;
        }

        let align = |kind: GroupKind| {
            let groups = configured
                .iter()
                .map(|(key, spaces)| spaces.group(kind).map(|g| (*key, g)))
                .collect::<Option<Vec<_>>>()?;
            Some(IntersectionGroup::evaluate(kind, &groups))
        };
        let spaces = align(GroupKind::Spaces);
        let rotation_spaces = align(GroupKind::RotationSpaces);

        debug!(
            members = configured.len(),
            spaces = spaces.as_ref().map(IntersectionGroup::len),
            rotation_spaces = rotation_spaces.as_ref().map(IntersectionGroup::len),
            "evaluated space intersection"
        );
        self.spaces = spaces;
        self.rotation_spaces = rotation_spaces;
    }

    /// Aligned position spaces.
    pub fn spaces(&self) -> Option<&IntersectionGroup> {
        self.spaces.as_ref()
    }

    /// Aligned rotation spaces.
    pub fn rotation_spaces(&self) -> Option<&IntersectionGroup> {
        self.rotation_spaces.as_ref()
    }

    /// The aligned group of the given kind.
    pub fn group(&self, kind: GroupKind) -> Option<&IntersectionGroup> {
        match kind {
            GroupKind::Spaces => self.spaces(),
            GroupKind::RotationSpaces => self.rotation_spaces(),
        }
    }

    /// Resolve a handle to the space it names.
    pub fn resolve(&self, id: SpaceId) -> Option<SpaceView<'_>> {
        self.member(id.member)?.space(id.kind, id.index)
    }
}
