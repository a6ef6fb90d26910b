use crate::math::{Float, Quaternion, Vector3};
use bevy::prelude::*;

/// Allows disabling the controller for a specific entity.
///
/// This can be used to let some other system temporarily take control over a body (a cutscene,
/// for example).
///
/// This component is not mandatory - if omitted, the entity is treated as enabled.
#[derive(Component, Default, Debug, PartialEq, Eq, Clone, Copy)]
pub enum TkToggle {
    /// Do not update the proxy from the physics backend, do not run any logic on it, and do not
    /// write it back.
    Disabled,
    /// Update the proxy and run the logic, but do not write the results back to the physics
    /// backend.
    SenseOnly,
    #[default]
    /// The backend behaves normally - it updates the proxy and writes it back.
    Enabled,
}

/// Writes that cannot be expressed by simply overwriting the backend's state with the proxy's.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TkPendingWrites {
    /// Offset to add to the body's position, accumulated since the last write-back.
    pub translation_offset: Vector3,
    /// Mass to set on the body.
    pub mass: Option<Float>,
}

/// The physically simulated body of the player or of an object.
///
/// The physics backend copies the body's state into this component during
/// [`TkPipelineStages::Sensors`](crate::TkPipelineStages::Sensors), the controller logic mutates
/// it during [`TkPipelineStages::Logic`](crate::TkPipelineStages::Logic), and the backend writes
/// it back during [`TkPipelineStages::Motors`](crate::TkPipelineStages::Motors).
///
/// Kinematic bodies never receive force-based updates: [`apply_force`](Self::apply_force),
/// [`apply_impulse`](Self::apply_impulse) and the velocity setters are ignored while
/// [`is_kinematic`](Self::is_kinematic) is true.
#[derive(Component, Debug, Clone)]
pub struct TkRigidBody {
    pub translation: Vector3,
    pub rotation: Quaternion,
    linvel: Vector3,
    /// Angular velocity as the rotation axis multiplied by the rotation speed in radians per
    /// second.
    angvel: Vector3,
    mass: Float,
    pub linear_damping: Float,
    pub angular_damping: Float,
    kinematic: bool,
    /// When false, the backend must not apply gravity to the body.
    pub gravity_enabled: bool,
    pending: TkPendingWrites,
}

impl Default for TkRigidBody {
    fn default() -> Self {
        Self {
            translation: Vector3::ZERO,
            rotation: Quaternion::IDENTITY,
            linvel: Vector3::ZERO,
            angvel: Vector3::ZERO,
            mass: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            kinematic: false,
            gravity_enabled: true,
            pending: Default::default(),
        }
    }
}

impl TkRigidBody {
    /// Create a dynamic body at the given position with the given mass.
    pub fn new(translation: Vector3, mass: Float) -> Self {
        Self {
            translation,
            mass,
            ..Default::default()
        }
    }

    /// Overwrite the state the backend owns.
    ///
    /// Called by the physics backend when syncing. Does not touch the damping, the gravity flag
    /// or the pending writes.
    pub fn sync_from_backend(
        &mut self,
        translation: Vector3,
        rotation: Quaternion,
        linvel: Vector3,
        angvel: Vector3,
        mass: Float,
        kinematic: bool,
    ) {
        self.translation = translation;
        self.rotation = rotation;
        self.linvel = linvel;
        self.angvel = angvel;
        if self.pending.mass.is_none() {
            self.mass = mass;
        }
        self.kinematic = kinematic;
    }

    pub fn linvel(&self) -> Vector3 {
        self.linvel
    }

    pub fn angvel(&self) -> Vector3 {
        self.angvel
    }

    pub fn mass(&self) -> Float {
        self.mass
    }

    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    pub fn set_linvel(&mut self, linvel: Vector3) {
        if self.kinematic {
            return;
        }
        self.linvel = linvel;
    }

    pub fn set_angvel(&mut self, angvel: Vector3) {
        if self.kinematic {
            return;
        }
        self.angvel = angvel;
    }

    /// Apply a continuous force over a step of `dt` seconds.
    pub fn apply_force(&mut self, force: Vector3, dt: Float) {
        if self.kinematic || self.mass <= 0.0 {
            return;
        }
        self.linvel += force * (dt / self.mass);
    }

    /// Apply an instantaneous impulse.
    pub fn apply_impulse(&mut self, impulse: Vector3) {
        if self.kinematic || self.mass <= 0.0 {
            return;
        }
        self.linvel += impulse / self.mass;
    }

    /// Move the body without going through its velocity.
    pub fn nudge(&mut self, offset: Vector3) {
        self.translation += offset;
        self.pending.translation_offset += offset;
    }

    pub fn set_mass(&mut self, mass: Float) {
        self.mass = mass;
        self.pending.mass = Some(mass);
    }

    /// Freeze (or unfreeze) the body.
    ///
    /// A body that becomes kinematic loses all its velocity.
    pub fn set_kinematic(&mut self, kinematic: bool) {
        if kinematic {
            self.linvel = Vector3::ZERO;
            self.angvel = Vector3::ZERO;
        }
        self.kinematic = kinematic;
    }

    /// Take the writes accumulated since the last call.
    ///
    /// Called by the physics backend when writing the proxy back.
    pub fn take_pending_writes(&mut self) -> TkPendingWrites {
        std::mem::take(&mut self.pending)
    }

    /// Check that none of the values the backend would write are NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite()
            && self.linvel.is_finite()
            && self.angvel.is_finite()
            && self.mass.is_finite()
            && self.linear_damping.is_finite()
            && self.angular_damping.is_finite()
    }
}
