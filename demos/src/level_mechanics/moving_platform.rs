use avian3d::prelude::LinearVelocity;
use bevy::prelude::*;
use bevy_telekinesis::math::{AdjustPrecision, AsF32, Float, Vector3};
use bevy_telekinesis::prelude::*;
use bevy_telekinesis::sensors::TkEnvironmentSensor;
use bevy_telekinesis::spatial_ext::TkLayerMask;
use bevy_telekinesis_avian3d::TkSpatialExtAvian3d;

pub struct MovingPlatformPlugin;

impl Plugin for MovingPlatformPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, move_platforms);
    }
}

/// A kinematic platform that goes back and forth between locations.
///
/// The platform stops while an object held or anchored by the player is right in its way, so
/// that the player can use props to jam it.
#[derive(Component)]
pub struct MovingPlatform {
    pub current_leg: usize,
    pub speed: Float,
    pub half_extents: Vector3,
    /// How far ahead to look for jamming objects.
    pub detection_range: Float,
    pub locations: Vec<Vector3>,
    halted: bool,
}

impl MovingPlatform {
    pub fn new(speed: Float, half_extents: Vector3, locations: &[Vector3]) -> Self {
        Self {
            current_leg: 0,
            speed,
            half_extents,
            detection_range: 0.3,
            locations: locations.to_owned(),
            halted: false,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The location the platform is currently heading to, or `None` if it has no locations.
    pub fn current_target(&self) -> Option<Vector3> {
        let index = self.current_leg.checked_rem(self.locations.len())?;
        self.locations.get(index).copied()
    }

    fn advance_leg(&mut self) {
        if let Some(next) = (self.current_leg + 1).checked_rem(self.locations.len()) {
            self.current_leg = next;
        }
    }
}

fn move_platforms(
    time: Res<Time>,
    spatial_ext: TkSpatialExtAvian3d,
    interactables_query: Query<&'static TkInteractable>,
    mut query: Query<(
        Entity,
        &mut MovingPlatform,
        &GlobalTransform,
        &mut LinearVelocity,
        Option<&Children>,
    )>,
) {
    let frame_duration = time.delta_secs().adjust_precision();
    for (entity, mut moving_platform, transform, mut velocity, children) in query.iter_mut() {
        let Some(target) = moving_platform.current_target() else {
            velocity.0 = Vector3::ZERO;
            continue;
        };
        let current = transform.translation().adjust_precision();
        let vec_to = target - current;
        let Ok(direction) = Dir3::new(vec_to.f32()) else {
            moving_platform.advance_leg();
            continue;
        };

        let sensor = TkEnvironmentSensor::new(&spatial_ext, entity);
        let blocked = sensor.obstacle_blocking(
            current,
            moving_platform.half_extents,
            transform.rotation().adjust_precision(),
            direction,
            moving_platform.detection_range + frame_duration * moving_platform.speed,
            children.map(|children| children.to_vec()).unwrap_or_default(),
            TkLayerMask::ALL,
            &interactables_query,
        );
        if blocked != moving_platform.halted {
            if blocked {
                info!("Platform {entity} is jammed");
            } else {
                info!("Platform {entity} is moving again");
            }
            moving_platform.halted = blocked;
        }
        if blocked {
            velocity.0 = Vector3::ZERO;
            continue;
        }

        velocity.0 = vec_to.normalize_or_zero() * moving_platform.speed;
        if vec_to.length() <= frame_duration * moving_platform.speed {
            moving_platform.advance_leg();
        }
    }
}
