use bevy::prelude::*;

use crate::math::Float;
use crate::spatial_ext::TkLayerMask;
use crate::TkConfigError;

/// Tuning of [`TkLocomotion`](super::TkLocomotion).
///
/// Forces are in Newtons and assume the body's mass is around 1.
#[derive(Component, Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct TkLocomotionConfig {
    pub walk_speed: Float,
    pub sprint_speed: Float,
    pub crouch_speed: Float,

    /// Linear damping while grounded.
    pub ground_drag: Float,
    /// Linear damping while airborne.
    pub air_drag: Float,

    /// Upward impulse of a jump.
    pub jump_force: Float,
    /// Seconds after a jump before the next one is allowed. Slope alignment is suppressed for
    /// this duration.
    pub jump_cooldown: Float,

    /// Scales the constant forward push that lets falling players keep some control.
    pub air_multiplier: Float,
    pub air_control_force: Float,
    pub max_air_speed: Float,
    /// Allow speeding up in the air (up to `max_air_speed`) when pushing in the direction of
    /// motion.
    pub allow_air_acceleration: bool,

    /// Vertical scale of the body while crouching.
    pub crouch_y_scale: Float,
    /// Downward impulse applied when starting to crouch, so the shrunken body drops down.
    pub crouch_down_impulse: Float,

    /// Height of the body, used for the ground and slope casts.
    pub height: Float,
    /// How far below the body's bottom the ground may be for it to count as grounded.
    pub ground_check_margin: Float,
    /// How far below the body's bottom the slope cast reaches.
    pub slope_check_margin: Float,
    /// Steepest walkable slope, in degrees.
    pub max_slope_angle: Float,
    pub ground_layers: TkLayerMask,

    /// Height above the body's bottom of the lower step ray.
    pub step_lower_offset: Float,
    /// Height above the body's bottom of the upper step ray. Steps lower than this are climbable.
    pub step_height: Float,
    /// Upward nudge applied in each step where a climbable step is found.
    pub step_smooth: Float,
    pub step_lower_range: Float,
    pub step_upper_range: Float,
    pub stair_layers: TkLayerMask,
}

impl Default for TkLocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 7.0,
            sprint_speed: 10.0,
            crouch_speed: 3.5,
            ground_drag: 5.0,
            air_drag: 1.0,
            jump_force: 12.0,
            jump_cooldown: 0.25,
            air_multiplier: 0.4,
            air_control_force: 8.0,
            max_air_speed: 8.0,
            allow_air_acceleration: true,
            crouch_y_scale: 0.5,
            crouch_down_impulse: 5.0,
            height: 2.0,
            ground_check_margin: 0.2,
            slope_check_margin: 0.3,
            max_slope_angle: 40.0,
            ground_layers: TkLayerMask::ALL,
            step_lower_offset: 0.05,
            step_height: 0.3,
            step_smooth: 0.1,
            step_lower_range: 0.6,
            step_upper_range: 0.6,
            stair_layers: TkLayerMask::ALL,
        }
    }
}

impl TkLocomotionConfig {
    pub fn validate(&self) -> Result<(), TkConfigError> {
        TkConfigError::check_positive("walk_speed", self.walk_speed)?;
        TkConfigError::check_positive("sprint_speed", self.sprint_speed)?;
        TkConfigError::check_positive("crouch_speed", self.crouch_speed)?;
        TkConfigError::check_positive("max_air_speed", self.max_air_speed)?;
        TkConfigError::check_positive("height", self.height)?;
        TkConfigError::check_not_negative("ground_drag", self.ground_drag)?;
        TkConfigError::check_not_negative("air_drag", self.air_drag)?;
        TkConfigError::check_not_negative("jump_force", self.jump_force)?;
        TkConfigError::check_not_negative("jump_cooldown", self.jump_cooldown)?;
        TkConfigError::check_not_negative("air_multiplier", self.air_multiplier)?;
        TkConfigError::check_not_negative("air_control_force", self.air_control_force)?;
        TkConfigError::check_not_negative("crouch_down_impulse", self.crouch_down_impulse)?;
        TkConfigError::check_not_negative("ground_check_margin", self.ground_check_margin)?;
        TkConfigError::check_not_negative("slope_check_margin", self.slope_check_margin)?;
        TkConfigError::check_not_negative("step_smooth", self.step_smooth)?;
        TkConfigError::check_fraction("crouch_y_scale", self.crouch_y_scale)?;
        if !(0.0 < self.max_slope_angle && self.max_slope_angle < 90.0) {
            return Err(TkConfigError::SlopeAngleOutOfRange(self.max_slope_angle));
        }
        Ok(())
    }
}
