mod helper;
pub mod telekinesis_playground;

use bevy::prelude::*;

pub use helper::{
    LevelSetupHelper3d, LevelSetupHelper3dEntityCommandsExtension, LevelSetupHelper3dWithMaterial,
};

#[derive(Component)]
pub struct LevelObject;

#[derive(Component)]
pub struct IsPlayer;
