use bevy::prelude::*;

use crate::locomotion::TkLocomotion;
use crate::math::{AdjustPrecision, AsF32, Float};
use crate::util::smooth_damp;

/// Keeps an entity (usually the camera) on a point attached to the player.
///
/// The camera is not parented to the player, because the player's vertical scale changes while
/// crouching. Instead, it snaps to the target every frame - except while the target's
/// [`TkLocomotion`] climbs stairs, where the height follows with a smooth damp so the step
/// nudges don't shake the view.
#[derive(Component, Debug, Clone)]
pub struct TkViewFollow {
    pub target: Entity,
    /// Offset from the target's origin, in world space.
    pub offset: Vec3,
    /// Roughly the time it takes the height to catch up while climbing stairs.
    pub smooth_time: Float,
    vertical_velocity: Float,
}

impl TkViewFollow {
    pub fn new(target: Entity, offset: Vec3) -> Self {
        Self {
            target,
            offset,
            smooth_time: 0.12,
            vertical_velocity: 0.0,
        }
    }

    /// The position to move to, given the target's position.
    pub fn follow(
        &mut self,
        current: Vec3,
        target_position: Vec3,
        climbing_stairs: bool,
        frame_duration: Float,
    ) -> Vec3 {
        let desired = target_position + self.offset;
        if !climbing_stairs {
            self.vertical_velocity = 0.0;
            return desired;
        }
        let y = smooth_damp(
            current.y.adjust_precision(),
            desired.y.adjust_precision(),
            &mut self.vertical_velocity,
            self.smooth_time,
            frame_duration,
        );
        Vec3::new(desired.x, y.f32(), desired.z)
    }
}

pub(crate) fn view_follow_system(
    time: Res<Time>,
    mut query: Query<(&mut Transform, &mut TkViewFollow)>,
    targets_query: Query<(&GlobalTransform, Option<&TkLocomotion>)>,
) {
    let frame_duration = time.delta_secs().adjust_precision();
    for (mut transform, mut view_follow) in query.iter_mut() {
        let Ok((target_transform, locomotion)) = targets_query.get(view_follow.target) else {
            continue;
        };
        let climbing_stairs = locomotion.is_some_and(TkLocomotion::is_climbing_stairs);
        transform.translation = view_follow.follow(
            transform.translation,
            target_transform.translation(),
            climbing_stairs,
            frame_duration,
        );
    }
}
