use bevy::prelude::*;

pub mod data_for_backends;
pub mod math;
pub mod spatial_ext;

/// Umbrella system set for [`TkPipelineStages`].
///
/// The physics backends' plugins are responsible for preventing this entire system set from
/// running when the physics backend itself is paused.
#[derive(SystemSet, Clone, PartialEq, Eq, Debug, Hash)]
pub struct TkSystemSet;

/// The various stages of the telekinesis pipeline.
///
/// Everything in here runs once per simulation step, in the order listed.
#[derive(SystemSet, Clone, PartialEq, Eq, Debug, Hash)]
pub enum TkPipelineStages {
    /// Data is read from the physics backend into the [`TkRigidBody`](data_for_backends::TkRigidBody)
    /// proxies.
    Sensors,
    /// Locomotion and manipulation decide how the bodies should move and mutate the proxies.
    Logic,
    /// The proxies are written back into the physics backend.
    Motors,
}
