#![warn(missing_docs)]

//! Parent-space switching for rig controls.
//!
//! A control chooses its effective parent ("space") through a set of
//! mutually exclusive enable attributes. This crate loads a control's space
//! configuration, switches between spaces, and matches locators or the
//! control itself so that a switch leaves the control where it was.
//!
//! # Example
//!
//! ```
//! use spaceswitch::{GroupKind, KeyOptions, Spaces};
//! use spaceswitch_scene::{MemoryScene, SceneGraph};
//!
//! let mut scene = MemoryScene::new();
//! scene.add_transform("|rig").unwrap();
//! scene.add_transform("|rig|chest_LOC").unwrap();
//! scene.add_transform("|rig|hand_CTRL").unwrap();
//! scene.add_attribute("|rig|hand_CTRL", "spaceChest", None, 0.0, true).unwrap();
//!
//! let json = r#"{ "Spaces": { "Definitions": [
//!     { "name": "World" },
//!     { "attributeName": "spaceChest", "transformName": "|rig|chest_LOC" }
//! ] } }"#;
//! let spaces = Spaces::parse(&scene, "|rig|hand_CTRL", json).unwrap();
//! let chest = spaces.space_named(GroupKind::Spaces, "Space Chest").unwrap();
//! chest.switch_to_space(&mut scene, &KeyOptions::default()).unwrap();
//! assert_eq!(scene.get_attribute("|rig|hand_CTRL", "spaceChest").unwrap(), 1.0);
//! ```
//!
//! Several selected controls are handled through an [`Intersection`], which
//! aligns their space names and fans each operation out to every member.

pub mod autogen;
mod config_store;
mod error;
mod facade;
mod intersection;
pub mod keying;
mod model;
mod switch;

pub use config_store::{read_config, validate, write_config};
pub use error::{ConfigError, Result, SpaceError};
pub use facade::IntersectionEntry;
pub use intersection::{Intersection, IntersectionGroup, IntersectionSpace, SpaceId, SpacesKey};
pub use keying::KeyOptions;
pub use model::{GroupKind, Space, SpaceGroup, SpaceView, Spaces};
pub use switch::{set_local, set_world, AttributeSnapshot, ProbeGuard};

pub use spaceswitch_ir::{default_template, SpacesConfig, CONFIG_ATTRIBUTE};
