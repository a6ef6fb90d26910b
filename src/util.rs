use bevy::prelude::*;
use bevy_telekinesis_physics_integration_layer::math::{AdjustPrecision, Float, Vector3};

/// Where the player is looking from, and where it is looking at.
#[derive(Debug, Clone, Copy)]
pub struct TkView {
    pub origin: Vector3,
    pub forward: Dir3,
    pub right: Dir3,
}

impl TkView {
    pub fn from_global_transform(transform: &GlobalTransform) -> Self {
        Self {
            origin: transform.translation().adjust_precision(),
            forward: transform.forward(),
            right: transform.right(),
        }
    }

    pub fn forward_vector(&self) -> Vector3 {
        self.forward.as_vec3().adjust_precision()
    }

    pub fn right_vector(&self) -> Vector3 {
        self.right.as_vec3().adjust_precision()
    }

    /// The point at `distance` straight ahead of the view.
    pub fn point_ahead(&self, distance: Float) -> Vector3 {
        self.origin + self.forward_vector() * distance
    }
}

/// Move `current` toward `target` with a critically damped spring.
///
/// `velocity` is the state of the spring and must be preserved between calls. The result never
/// overshoots `target`.
pub fn smooth_damp(
    current: Float,
    target: Float,
    velocity: &mut Float,
    smooth_time: Float,
    delta: Float,
) -> Float {
    if delta <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * delta;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * delta;
    *velocity = (*velocity - omega * temp) * decay;
    let output = target + (change + temp) * decay;

    if (target - current > 0.0) == (output > target) {
        *velocity = 0.0;
        target
    } else {
        output
    }
}

/// Linear interpolation with the factor clamped to `[0, 1]`.
pub fn lerp_clamped(from: Vector3, to: Vector3, factor: Float) -> Vector3 {
    from.lerp(to, factor.clamp(0.0, 1.0))
}
