//! # avian3d Integration for bevy-telekinesis
//!
//! In addition to the instructions in bevy-telekinesis's documentation:
//!
//! * Add [`TkAvian3dPlugin`] to the Bevy app, with the same schedule given to
//!   `TkControllerPlugin`.
//! * Use [`TkSpatialExtAvian3d`] as the spatial query parameter of `TkControllerPlugin`.
mod spatial_ext;

use avian3d::prelude::*;
use bevy::ecs::schedule::{InternedScheduleLabel, ScheduleLabel};
use bevy::prelude::*;

use bevy_telekinesis_physics_integration_layer::data_for_backends::{TkRigidBody, TkToggle};
use bevy_telekinesis_physics_integration_layer::math::AsF32;
use bevy_telekinesis_physics_integration_layer::{TkPipelineStages, TkSystemSet};
pub use spatial_ext::TkSpatialExtAvian3d;

pub mod prelude {
    pub use crate::{TkAvian3dPlugin, TkSpatialExtAvian3d};
}

/// Add this plugin to use avian3d as a physics backend.
///
/// This plugin should be used in addition to `TkControllerPlugin`, and both plugins must use the
/// same schedule. Avian runs in `FixedPostUpdate` by default, so the default schedule of this
/// plugin is `FixedUpdate`.
pub struct TkAvian3dPlugin {
    schedule: InternedScheduleLabel,
}

impl TkAvian3dPlugin {
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
        }
    }
}

impl Default for TkAvian3dPlugin {
    fn default() -> Self {
        Self::new(FixedUpdate)
    }
}

impl Plugin for TkAvian3dPlugin {
    fn build(&self, app: &mut App) {
        app.register_required_components::<TkRigidBody, LinearDamping>()
            .register_required_components::<TkRigidBody, AngularDamping>()
            .register_required_components::<TkRigidBody, GravityScale>();
        app.configure_sets(
            self.schedule,
            TkSystemSet.run_if(|physics_time: Res<Time<Physics>>| !physics_time.is_paused()),
        );
        app.add_systems(
            self.schedule,
            update_rigid_body_proxies_system.in_set(TkPipelineStages::Sensors),
        );
        app.add_systems(
            self.schedule,
            write_back_rigid_body_proxies_system.in_set(TkPipelineStages::Motors),
        );
    }
}

#[allow(clippy::type_complexity)]
fn update_rigid_body_proxies_system(
    mut query: Query<(
        &Position,
        &Rotation,
        &LinearVelocity,
        &AngularVelocity,
        &ComputedMass,
        &RigidBody,
        &LinearDamping,
        &AngularDamping,
        &mut TkRigidBody,
        Option<&TkToggle>,
    )>,
) {
    for (
        position,
        rotation,
        linear_velocity,
        angular_velocity,
        computed_mass,
        rigid_body,
        linear_damping,
        angular_damping,
        mut proxy,
        tk_toggle,
    ) in query.iter_mut()
    {
        match tk_toggle.copied().unwrap_or_default() {
            TkToggle::Disabled => continue,
            TkToggle::SenseOnly => {}
            TkToggle::Enabled => {}
        }
        proxy.sync_from_backend(
            position.0,
            rotation.0,
            linear_velocity.0,
            angular_velocity.0,
            computed_mass.value(),
            rigid_body.is_kinematic(),
        );
        proxy.linear_damping = linear_damping.0;
        proxy.angular_damping = angular_damping.0;
    }
}

#[allow(clippy::type_complexity)]
fn write_back_rigid_body_proxies_system(
    mut query: Query<(
        Entity,
        &mut TkRigidBody,
        &mut Position,
        &mut LinearVelocity,
        &mut AngularVelocity,
        &mut RigidBody,
        &mut LinearDamping,
        &mut AngularDamping,
        &mut GravityScale,
        Option<&TkToggle>,
    )>,
    mut commands: Commands,
) {
    for (
        entity,
        mut proxy,
        mut position,
        mut linear_velocity,
        mut angular_velocity,
        mut rigid_body,
        mut linear_damping,
        mut angular_damping,
        mut gravity_scale,
        tk_toggle,
    ) in query.iter_mut()
    {
        match tk_toggle.copied().unwrap_or_default() {
            TkToggle::Disabled | TkToggle::SenseOnly => continue,
            TkToggle::Enabled => {}
        }
        if !proxy.is_finite() {
            warn!("Refusing to write non-finite rigid body proxy of {entity} back to avian3d");
            proxy.take_pending_writes();
            continue;
        }

        let desired_body = if proxy.is_kinematic() {
            RigidBody::Kinematic
        } else {
            RigidBody::Dynamic
        };
        if *rigid_body != desired_body && !rigid_body.is_static() {
            *rigid_body = desired_body;
        }

        let pending = proxy.take_pending_writes();
        if pending.translation_offset != Default::default() {
            position.0 += pending.translation_offset;
        }
        if let Some(mass) = pending.mass {
            commands.entity(entity).insert(Mass(mass.f32()));
        }

        // Unchanged values must not trigger avian's change detection, or sleeping bodies wake up.
        linear_velocity.set_if_neq(LinearVelocity(proxy.linvel()));
        angular_velocity.set_if_neq(AngularVelocity(proxy.angvel()));
        linear_damping.set_if_neq(LinearDamping(proxy.linear_damping));
        angular_damping.set_if_neq(AngularDamping(proxy.angular_damping));
        gravity_scale.set_if_neq(GravityScale(if proxy.gravity_enabled {
            1.0
        } else {
            0.0
        }));
    }
}
