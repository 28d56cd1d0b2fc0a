//! Operations on an aligned entry, fanned out to every member's space.

use spaceswitch_scene::SceneGraph;
use tracing::{debug, info};

use crate::error::{Result, SpaceError};
use crate::intersection::{Intersection, IntersectionSpace};
use crate::keying::KeyOptions;
use crate::model::{GroupKind, SpaceView};

/// One aligned entry, bound to the intersection that resolves it.
#[derive(Debug, Clone, Copy)]
pub struct IntersectionEntry<'a> {
    intersection: &'a Intersection,
    kind: GroupKind,
    space: &'a IntersectionSpace,
}

impl Intersection {
    /// Every aligned entry of a group, in order.
    pub fn entries(&self, kind: GroupKind) -> Vec<IntersectionEntry<'_>> {
        self.group(kind)
            .map(|group| {
                group
                    .spaces()
                    .iter()
                    .map(|space| IntersectionEntry {
                        intersection: self,
                        kind,
                        space,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The aligned entry with this name.
    pub fn entry(&self, kind: GroupKind, name: &str) -> Option<IntersectionEntry<'_>> {
        let space = self.group(kind)?.find(name)?;
        Some(IntersectionEntry {
            intersection: self,
            kind,
            space,
        })
    }
}

impl<'a> IntersectionEntry<'a> {
    /// Shared display name.
    pub fn name(&self) -> &'a str {
        self.space.name()
    }

    /// Group the entry belongs to.
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// The member spaces behind this entry, in selection order.
    pub fn views(&self) -> Result<Vec<SpaceView<'a>>> {
        self.space
            .members()
            .iter()
            .map(|id| self.intersection.resolve(*id).ok_or(SpaceError::UnknownSpace))
            .collect()
    }

    /// Switch every member to this space.
    pub fn switch_to_space<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        options: &KeyOptions,
    ) -> Result<()> {
        for view in self.views()? {
            view.switch_to_space(scene, options)?;
        }
        info!(space = self.name(), group = self.kind.name(), "switched selection");
        Ok(())
    }

    /// Set every member's enable attribute.
    pub fn set_attribute<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        value: f64,
        options: &KeyOptions,
    ) -> Result<()> {
        for view in self.views()? {
            view.set_attribute(scene, value, options)?;
        }
        Ok(())
    }

    /// Move each member's locator onto its control.
    pub fn match_to_control<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        options: &KeyOptions,
    ) -> Result<()> {
        for view in self.views()? {
            view.match_locator_to_control(scene, options)?;
        }
        Ok(())
    }

    /// Move each member's locator onto the same member's locator for
    /// `target`. Members are only paired within the same group kind.
    pub fn match_to_space<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        target: &IntersectionEntry<'_>,
        options: &KeyOptions,
    ) -> Result<()> {
        if target.kind != self.kind {
            debug!(
                from = self.kind.name(),
                to = target.kind.name(),
                "not matching locators across group kinds"
            );
            return Ok(());
        }
        let targets = target.views()?;
        for view in self.views()? {
            let paired = targets.iter().find(|t| {
                t.control_name() == view.control_name() && t.group().kind() == view.group().kind()
            });
            if let Some(other) = paired {
                view.match_locator_to_locator(scene, other, options)?;
            }
        }
        Ok(())
    }

    /// Move each member's control to where this space would put it.
    pub fn match_control_to_space<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        options: &KeyOptions,
    ) -> Result<()> {
        for view in self.views()? {
            view.match_control_to_locator(scene, options)?;
        }
        Ok(())
    }

    /// Select every member's locator at once. Members without a locator are
    /// left out.
    pub fn select_transform<S: SceneGraph + ?Sized>(&self, scene: &mut S) -> Result<()> {
        let locators: Vec<String> = self
            .views()?
            .iter()
            .filter_map(|view| view.space().transform_name())
            .map(str::to_string)
            .collect();
        scene.select(&locators)?;
        Ok(())
    }

    /// Zero every member's locator.
    pub fn zero_transform<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        options: &KeyOptions,
    ) -> Result<()> {
        for view in self.views()? {
            view.zero_transform(scene, options)?;
        }
        Ok(())
    }
}
