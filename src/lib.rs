//! # Telekinesis - A First-Person Locomotion and Object Manipulation Controller
//!
//! Telekinesis drives a physics-based first-person character over uneven terrain (slopes and
//! stairs), and lets it grab, move, rotate and pin rigid bodies at a distance.
//!
//! Telekinesis does not implement its own physics. Instead, it reads and writes
//! [`TkRigidBody`](crate::data_for_backends::TkRigidBody) proxies that a physics backend syncs with
//! the actual physics engine. Currently the only backend is
//! [bevy-telekinesis-avian3d](https://crates.io/crates/bevy-telekinesis-avian3d).
//!
//! ## Using the controller
//!
//! * Add [`TkControllerPlugin`] with the backend's spatial query parameter, and the backend's own
//!   plugin, both on the same schedule (`FixedUpdate` by default).
//! * Spawn the player with a [`TkLocomotion`](locomotion::TkLocomotion) component (it pulls in
//!   its config, its controls and a `TkRigidBody`) and a
//!   [`TkTelekinesis`](telekinesis::TkTelekinesis) component pointing at the camera entity.
//! * Spawn objects with a [`TkInteractable`](interactable::TkInteractable) component.
//! * Each frame, write the player's input into [`TkLocomotionControls`](locomotion::TkLocomotionControls)
//!   and [`TkTelekinesisControls`](telekinesis::TkTelekinesisControls). Edge-triggered commands
//!   stay latched until the next simulation step consumes them, so it is fine to write them from
//!   `Update`.
//!
//! ## Object classes
//!
//! * [`Standard`](interactable::TkObjectClass::Standard) objects can always be grabbed.
//! * [`Anchorable`](interactable::TkObjectClass::Anchorable) objects behave the same, and are
//!   meant for puzzles where freezing them in place matters.
//! * [`Heavy`](interactable::TkObjectClass::Heavy) objects can only be grabbed while the player has
//!   some other object anchored, and slow the player down while held.
//!
//! Anchoring freezes an object in place. Every player has a single
//! [`TkAnchorSlot`](anchor::TkAnchorSlot), so at most one object is anchored per player.
pub mod anchor;
mod config_error;
mod controller;
pub mod events;
pub mod interactable;
pub mod locomotion;
pub mod sensors;
pub mod telekinesis;
pub mod util;
pub mod view_follow;

pub mod prelude {
    pub use crate::anchor::{TkAnchorConfig, TkAnchorSlot};
    pub use crate::events::{TkInteractionEvent, TkInteractionKind, TkReleaseAnchorRequest};
    pub use crate::interactable::{TkHighlightState, TkInteractable, TkObjectClass};
    pub use crate::locomotion::{
        TkLocomotion, TkLocomotionConfig, TkLocomotionControls, TkLocomotionState,
    };
    pub use crate::telekinesis::{TkTelekinesis, TkTelekinesisConfig, TkTelekinesisControls};
    pub use crate::view_follow::TkViewFollow;
    pub use crate::{TkControllerPlugin, TkPipelineStages, TkSystemSet, TkUserControlsSystemSet};
}

pub use bevy_telekinesis_physics_integration_layer::*;
pub use config_error::TkConfigError;
pub use controller::TkControllerPlugin;

use bevy::prelude::*;

/// The user controls should be applied in this system set.
///
/// It runs after the backend has refreshed the rigid body proxies, and before the locomotion and
/// manipulation logic consumes the controls.
#[derive(SystemSet, Clone, PartialEq, Eq, Debug, Hash)]
pub struct TkUserControlsSystemSet;
