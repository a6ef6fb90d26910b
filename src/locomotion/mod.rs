//! Physics-driven first-person walking, sprinting, crouching, jumping and stair climbing.
mod config;

use std::time::Duration;

use bevy::prelude::*;

pub use config::TkLocomotionConfig;

use crate::data_for_backends::TkRigidBody;
use crate::math::{horizontal, project_on_plane, AsF32, Float, Vector3};
use crate::sensors::{horizontal_direction, TkEnvironmentSensor, TkSlopeInfo};
use crate::spatial_ext::{TkLayerMask, TkSpatialExt};

const SLOPE_FORCE_FACTOR: Float = 20.0;
/// Pushes the body down while it moves up a slope, so it does not launch off the top.
const SLOPE_DOWNFORCE: Float = 80.0;
const GROUND_FORCE_FACTOR: Float = 10.0;
const AIR_FORCE_FACTOR: Float = 5.0;

const AIR_CONTROL_MIN_INPUT: Float = 0.1;
/// Above this dot product the input is considered to push in the direction of motion.
const AIR_SAME_DIRECTION_DOT: Float = 0.5;
const AIR_CAPPED_FACTOR: Float = 0.3;
const AIR_TURN_FACTOR: Float = 1.2;

/// The movement mode, recomputed every step from the grounded flag and the input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TkLocomotionState {
    #[default]
    Walking,
    Sprinting,
    Crouching,
    Airborne,
}

/// The player's movement input, in world space.
///
/// Write this every frame. All the fields are levels (held or not held) rather than edges.
#[derive(Component, Debug, Clone)]
pub struct TkLocomotionControls {
    /// Desired direction of motion. Only the horizontal component matters, and its length is
    /// ignored on the ground.
    pub move_direction: Vector3,
    /// Where the player faces. Used for finding stair steps.
    pub forward: Vector3,
    pub jump: bool,
    pub crouch: bool,
    pub sprint: bool,
}

impl Default for TkLocomotionControls {
    fn default() -> Self {
        Self {
            move_direction: Vector3::ZERO,
            forward: Vector3::NEG_Z,
            jump: false,
            crouch: false,
            sprint: false,
        }
    }
}

/// Moves the player's [`TkRigidBody`] according to its [`TkLocomotionControls`].
///
/// Apart from the jump cooldown and the post-jump slope suppression, nothing carries over between
/// steps: the state is recomputed from scratch every step.
#[derive(Component, Debug, Clone)]
#[require(TkLocomotionConfig, TkLocomotionControls, TkRigidBody)]
pub struct TkLocomotion {
    state: TkLocomotionState,
    target_speed: Option<Float>,
    grounded: bool,
    slope: TkSlopeInfo,
    jump_cooldown: Option<Timer>,
    exiting_slope: bool,
    movement_restricted: bool,
    movement_multiplier: Float,
    climbing_stairs: bool,
    crouching: bool,
}

impl Default for TkLocomotion {
    fn default() -> Self {
        Self {
            state: Default::default(),
            target_speed: None,
            grounded: false,
            slope: Default::default(),
            jump_cooldown: None,
            exiting_slope: false,
            movement_restricted: false,
            movement_multiplier: 1.0,
            climbing_stairs: false,
            crouching: false,
        }
    }
}

impl TkLocomotion {
    pub fn state(&self) -> TkLocomotionState {
        self.state
    }

    /// The speed the current state aims for. While airborne this is the speed of the last
    /// grounded state.
    pub fn target_speed(&self) -> Float {
        self.target_speed.unwrap_or(0.0)
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn slope(&self) -> TkSlopeInfo {
        self.slope
    }

    pub fn is_crouching(&self) -> bool {
        self.crouching
    }

    /// A step edge was climbed during the last step.
    pub fn is_climbing_stairs(&self) -> bool {
        self.climbing_stairs
    }

    pub fn is_jump_ready(&self) -> bool {
        self.jump_cooldown.is_none()
    }

    /// The grace window after a jump, during which slope alignment is suppressed.
    pub fn is_exiting_slope(&self) -> bool {
        self.exiting_slope
    }

    pub fn is_movement_restricted(&self) -> bool {
        self.movement_restricted
    }

    pub fn movement_multiplier(&self) -> Float {
        self.movement_multiplier
    }

    /// Slow the player down and forbid sprinting, or lift the restriction.
    ///
    /// Lifting the restriction resets the multiplier to `1.0`, regardless of `multiplier`.
    pub fn set_movement_restriction(&mut self, active: bool, multiplier: Float) {
        if active != self.movement_restricted {
            debug!("Movement restriction {active} (multiplier {multiplier})");
        }
        self.movement_restricted = active;
        self.movement_multiplier = if active { multiplier } else { 1.0 };
    }

    /// Run one simulation step.
    pub fn step(
        &mut self,
        config: &TkLocomotionConfig,
        controls: &TkLocomotionControls,
        body: &mut TkRigidBody,
        sensor: &TkEnvironmentSensor<impl TkSpatialExt>,
        frame_duration: Float,
    ) {
        self.tick_jump_cooldown(frame_duration);

        let origin = body.translation;
        self.grounded = sensor.is_grounded(
            origin,
            config.height,
            config.ground_check_margin,
            config.ground_layers,
        );
        self.slope = sensor.slope_info(
            origin,
            config.height,
            config.slope_check_margin,
            config.max_slope_angle,
            TkLayerMask::ALL,
        );

        self.state = self.select_state(controls);
        let multiplier = self.movement_multiplier;
        let target_speed = *match self.state {
            TkLocomotionState::Crouching => {
                self.target_speed.insert(config.crouch_speed * multiplier)
            }
            TkLocomotionState::Sprinting => {
                self.target_speed.insert(config.sprint_speed * multiplier)
            }
            TkLocomotionState::Walking => self.target_speed.insert(config.walk_speed * multiplier),
            TkLocomotionState::Airborne => self
                .target_speed
                .get_or_insert(config.walk_speed * multiplier),
        };

        if controls.crouch && !self.crouching {
            body.apply_impulse(Vector3::NEG_Y * config.crouch_down_impulse);
        }
        self.crouching = controls.crouch;

        self.climbing_stairs = false;
        if self.grounded && !controls.crouch {
            self.climb_steps(config, controls, body, sensor);
        }

        let align_to_slope = self.slope.is_slope && !self.exiting_slope;
        if align_to_slope {
            let moving_up = 0.0 < body.linvel().y;
            let direction =
                project_on_plane(controls.move_direction, self.slope.normal).normalize_or_zero();
            body.apply_force(direction * target_speed * SLOPE_FORCE_FACTOR, frame_duration);
            if moving_up {
                body.apply_force(Vector3::NEG_Y * SLOPE_DOWNFORCE, frame_duration);
            }
        } else if self.grounded {
            body.apply_force(
                controls.move_direction.normalize_or_zero() * target_speed * GROUND_FORCE_FACTOR,
                frame_duration,
            );
        } else {
            self.apply_air_control(
                config,
                controls.move_direction,
                target_speed,
                body,
                frame_duration,
            );
        }
        body.gravity_enabled = !self.slope.is_slope;

        self.clamp_speed(config, target_speed, align_to_slope, body);

        if controls.jump && self.grounded && self.is_jump_ready() {
            self.jump(config, body);
        }

        body.linear_damping = if self.grounded {
            config.ground_drag
        } else {
            config.air_drag
        };
    }

    fn select_state(&self, controls: &TkLocomotionControls) -> TkLocomotionState {
        if controls.crouch {
            TkLocomotionState::Crouching
        } else if self.grounded && controls.sprint && !self.movement_restricted {
            TkLocomotionState::Sprinting
        } else if self.grounded {
            TkLocomotionState::Walking
        } else {
            TkLocomotionState::Airborne
        }
    }

    fn tick_jump_cooldown(&mut self, frame_duration: Float) {
        let Some(cooldown) = self.jump_cooldown.as_mut() else {
            return;
        };
        cooldown.tick(Duration::from_secs_f32(frame_duration.f32().max(0.0)));
        if cooldown.finished() {
            self.jump_cooldown = None;
            self.exiting_slope = false;
        }
    }

    fn climb_steps(
        &mut self,
        config: &TkLocomotionConfig,
        controls: &TkLocomotionControls,
        body: &mut TkRigidBody,
        sensor: &TkEnvironmentSensor<impl TkSpatialExt>,
    ) {
        let feet = body.translation - Vector3::Y * (0.5 * config.height);
        let found_step = sensor.step_probe(
            feet + Vector3::Y * config.step_lower_offset,
            feet + Vector3::Y * config.step_height,
            horizontal_direction(controls.forward, Dir3::NEG_Z),
            config.step_lower_range,
            config.step_upper_range,
            config.stair_layers,
        );
        if found_step {
            body.nudge(Vector3::Y * config.step_smooth);
            self.climbing_stairs = true;
        }
    }

    fn apply_air_control(
        &self,
        config: &TkLocomotionConfig,
        move_direction: Vector3,
        target_speed: Float,
        body: &mut TkRigidBody,
        frame_duration: Float,
    ) {
        if move_direction.length() < AIR_CONTROL_MIN_INPUT {
            return;
        }
        let desired_direction = move_direction.normalize();
        let horizontal_velocity = horizontal(body.linvel());
        let current_speed = horizontal_velocity.length();
        let control_force = config.air_control_force * self.movement_multiplier;

        let alignment = horizontal_velocity
            .normalize_or_zero()
            .dot(desired_direction);
        if AIR_SAME_DIRECTION_DOT < alignment {
            if config.allow_air_acceleration && current_speed < config.max_air_speed {
                body.apply_force(desired_direction * control_force, frame_duration);
            } else if config.max_air_speed <= current_speed {
                body.apply_force(
                    desired_direction * control_force * AIR_CAPPED_FACTOR,
                    frame_duration,
                );
            }
        } else {
            body.apply_force(
                desired_direction * control_force * AIR_TURN_FACTOR,
                frame_duration,
            );
        }

        body.apply_force(
            desired_direction
                * target_speed
                * AIR_FORCE_FACTOR
                * config.air_multiplier
                * self.movement_multiplier,
            frame_duration,
        );
    }

    fn clamp_speed(
        &self,
        config: &TkLocomotionConfig,
        target_speed: Float,
        align_to_slope: bool,
        body: &mut TkRigidBody,
    ) {
        let velocity = body.linvel();
        if align_to_slope {
            if target_speed < velocity.length() {
                body.set_linvel(velocity.normalize_or_zero() * target_speed);
            }
            return;
        }
        let speed_limit = if self.grounded {
            target_speed
        } else {
            config.max_air_speed
        };
        let flat_velocity = horizontal(velocity);
        if speed_limit < flat_velocity.length() {
            let limited = flat_velocity.normalize_or_zero() * speed_limit;
            body.set_linvel(Vector3::new(limited.x, velocity.y, limited.z));
        }
    }

    fn jump(&mut self, config: &TkLocomotionConfig, body: &mut TkRigidBody) {
        self.exiting_slope = true;
        let velocity = body.linvel();
        body.set_linvel(Vector3::new(velocity.x, 0.0, velocity.z));
        body.apply_impulse(Vector3::Y * config.jump_force);
        self.jump_cooldown = Some(Timer::from_seconds(
            config.jump_cooldown.f32(),
            TimerMode::Once,
        ));
    }
}
