use std::marker::PhantomData;

use bevy::ecs::schedule::{InternedScheduleLabel, ScheduleLabel};
use bevy::ecs::system::{StaticSystemParam, SystemParam, SystemParamItem};
use bevy::prelude::*;

use crate::anchor::{TkAnchorConfig, TkAnchorSlot};
use crate::data_for_backends::{TkRigidBody, TkToggle};
use crate::events::{TkInteractionEvent, TkInteractionKind, TkReleaseAnchorRequest};
use crate::interactable::{TkInteractable, TkInteractableLookup};
use crate::locomotion::{TkLocomotion, TkLocomotionConfig, TkLocomotionControls};
use crate::math::{AdjustPrecision, AsF32, Float};
use crate::sensors::TkEnvironmentSensor;
use crate::spatial_ext::TkSpatialExt;
use crate::telekinesis::{TkTelekinesis, TkTelekinesisConfig, TkTelekinesisControls};
use crate::util::TkView;
use crate::view_follow::view_follow_system;
use crate::{TkPipelineStages, TkSystemSet, TkUserControlsSystemSet};

/// Scroll input smaller than this is ignored.
const SCROLL_DEADZONE: Float = 0.01;

/// The main plugin of the telekinesis controller.
///
/// `S` is the backend's spatial query [`SystemParam`] (e.g. `TkSpatialExtAvian3d`). The plugin
/// must use the same schedule as the backend's plugin. Per-frame work that does not touch
/// velocities (highlighting, crouch scaling, view following) always runs in `Update`.
pub struct TkControllerPlugin<S> {
    schedule: InternedScheduleLabel,
    _phantom: PhantomData<fn() -> S>,
}

impl<S> TkControllerPlugin<S> {
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
            _phantom: PhantomData,
        }
    }
}

impl<S> Default for TkControllerPlugin<S> {
    fn default() -> Self {
        Self::new(FixedUpdate)
    }
}

type ObjectsQuery<'w, 's> =
    Query<'w, 's, (&'static mut TkInteractable, Option<&'static mut TkRigidBody>)>;

impl<S> Plugin for TkControllerPlugin<S>
where
    S: SystemParam + 'static,
    for<'w, 's> SystemParamItem<'w, 's, S>: TkSpatialExt,
{
    fn build(&self, app: &mut App) {
        app.configure_sets(
            self.schedule,
            (
                TkPipelineStages::Sensors,
                TkUserControlsSystemSet,
                TkPipelineStages::Logic,
                TkPipelineStages::Motors,
            )
                .chain()
                .in_set(TkSystemSet),
        );
        app.add_event::<TkInteractionEvent>();
        app.add_event::<TkReleaseAnchorRequest>();
        app.add_systems(
            self.schedule,
            (
                initialize_interactables_system,
                handle_release_anchor_requests_system,
                telekinesis_commands_system::<S>,
                locomotion_system::<S>,
                manipulation_system,
            )
                .chain()
                .in_set(TkPipelineStages::Logic),
        );
        app.add_systems(
            Update,
            (
                highlight_system::<S>,
                crouch_scale_system,
                view_follow_system,
            ),
        );
    }
}

fn is_disabled(toggle: Option<&TkToggle>) -> bool {
    match toggle.copied().unwrap_or_default() {
        TkToggle::Disabled => true,
        TkToggle::SenseOnly | TkToggle::Enabled => false,
    }
}

fn initialize_interactables_system(
    mut query: Query<(&TkInteractable, &mut TkRigidBody), Added<TkInteractable>>,
) {
    for (interactable, mut body) in query.iter_mut() {
        interactable.initialize(body.as_mut());
    }
}

fn handle_release_anchor_requests_system(
    mut requests: EventReader<TkReleaseAnchorRequest>,
    mut slots_query: Query<&mut TkAnchorSlot>,
    mut objects_query: ObjectsQuery,
    mut interaction_events: EventWriter<TkInteractionEvent>,
) {
    for request in requests.read() {
        let Ok(mut slot) = slots_query.get_mut(request.holder) else {
            warn!("Anchor release requested for {}, which has no anchor slot", request.holder);
            continue;
        };
        if let Some(object) = slot.release_anchor(&mut objects_query) {
            interaction_events.write(TkInteractionEvent {
                holder: request.holder,
                object,
                kind: TkInteractionKind::AnchorReleased,
            });
        }
    }
}

#[allow(clippy::type_complexity)]
fn telekinesis_commands_system<S>(
    spatial_ext: StaticSystemParam<S>,
    mut players_query: Query<(
        Entity,
        &mut TkTelekinesis,
        &TkTelekinesisConfig,
        &mut TkTelekinesisControls,
        &mut TkAnchorSlot,
        &TkAnchorConfig,
        Option<&mut TkLocomotion>,
        Option<&TkToggle>,
    )>,
    viewpoints_query: Query<&GlobalTransform>,
    mut objects_query: ObjectsQuery,
    mut interaction_events: EventWriter<TkInteractionEvent>,
) where
    S: SystemParam + 'static,
    for<'w, 's> SystemParamItem<'w, 's, S>: TkSpatialExt,
{
    for (
        holder,
        mut telekinesis,
        config,
        mut controls,
        mut anchor_slot,
        anchor_config,
        mut locomotion,
        tk_toggle,
    ) in players_query.iter_mut()
    {
        if is_disabled(tk_toggle) {
            continue;
        }
        let grab_toggle = controls.take_grab_toggle();
        let anchor = controls.take_anchor();
        let scroll = controls.take_scroll();

        anchor_slot.forget_missing(&objects_query);
        if let Some(held) = telekinesis.held_object() {
            if objects_query.interactable(held).is_none() {
                telekinesis.release_object(&mut objects_query, locomotion.as_deref_mut());
            }
        }

        let sensor = TkEnvironmentSensor::new(&*spatial_ext, holder);
        let view = telekinesis
            .viewpoint
            .and_then(|viewpoint| viewpoints_query.get(viewpoint).ok())
            .map(TkView::from_global_transform);

        if grab_toggle {
            if telekinesis.is_manipulating() {
                if let Some(object) =
                    telekinesis.release_object(&mut objects_query, locomotion.as_deref_mut())
                {
                    interaction_events.write(TkInteractionEvent {
                        holder,
                        object,
                        kind: TkInteractionKind::Released,
                    });
                }
            } else if let Some(view) = view.as_ref() {
                let grabbed = telekinesis.try_grab_object(
                    config,
                    view,
                    &sensor,
                    &anchor_slot,
                    &mut objects_query,
                    locomotion.as_deref_mut(),
                );
                if let Some(object) = telekinesis.held_object().filter(|_| grabbed) {
                    interaction_events.write(TkInteractionEvent {
                        holder,
                        object,
                        kind: TkInteractionKind::Grabbed,
                    });
                }
            }
        }

        if anchor {
            if let Some(view) = view.as_ref() {
                let previous_anchor = anchor_slot.current_anchor();
                let held_before = telekinesis.held_object();
                let anchored = telekinesis.anchor_action(
                    anchor_config,
                    &mut anchor_slot,
                    view,
                    &sensor,
                    &mut objects_query,
                    locomotion.as_deref_mut(),
                );
                if let Some(object) = previous_anchor {
                    interaction_events.write(TkInteractionEvent {
                        holder,
                        object,
                        kind: TkInteractionKind::AnchorReleased,
                    });
                }
                if let Some(object) = anchor_slot.current_anchor().filter(|_| anchored) {
                    if held_before == Some(object) && !telekinesis.is_manipulating() {
                        interaction_events.write(TkInteractionEvent {
                            holder,
                            object,
                            kind: TkInteractionKind::Released,
                        });
                    }
                    interaction_events.write(TkInteractionEvent {
                        holder,
                        object,
                        kind: TkInteractionKind::Anchored,
                    });
                }
            }
        }

        if SCROLL_DEADZONE < scroll.abs() {
            telekinesis.adjust_hold_distance(config, scroll);
        }
        telekinesis.set_rotation_input(controls.rotation_input());
    }
}

#[allow(clippy::type_complexity)]
fn locomotion_system<S>(
    time: Res<Time>,
    spatial_ext: StaticSystemParam<S>,
    mut query: Query<(
        Entity,
        &mut TkLocomotion,
        &TkLocomotionConfig,
        &TkLocomotionControls,
        &mut TkRigidBody,
        Option<&TkToggle>,
    )>,
) where
    S: SystemParam + 'static,
    for<'w, 's> SystemParamItem<'w, 's, S>: TkSpatialExt,
{
    let frame_duration = time.delta_secs().adjust_precision();
    if frame_duration == 0.0 {
        return;
    }
    for (entity, mut locomotion, config, controls, mut body, tk_toggle) in query.iter_mut() {
        if is_disabled(tk_toggle) {
            continue;
        }
        let sensor = TkEnvironmentSensor::new(&*spatial_ext, entity);
        locomotion.step(config, controls, body.as_mut(), &sensor, frame_duration);
    }
}

fn manipulation_system(
    time: Res<Time>,
    players_query: Query<(&TkTelekinesis, &TkTelekinesisConfig, Option<&TkToggle>)>,
    viewpoints_query: Query<&GlobalTransform>,
    mut objects_query: ObjectsQuery,
) {
    let frame_duration = time.delta_secs().adjust_precision();
    if frame_duration == 0.0 {
        return;
    }
    for (telekinesis, config, tk_toggle) in players_query.iter() {
        if is_disabled(tk_toggle) {
            continue;
        }
        let Some(view) = telekinesis
            .viewpoint
            .and_then(|viewpoint| viewpoints_query.get(viewpoint).ok())
            .map(TkView::from_global_transform)
        else {
            continue;
        };
        telekinesis.apply_manipulation(config, &view, &mut objects_query, frame_duration);
    }
}

fn highlight_system<S>(
    spatial_ext: StaticSystemParam<S>,
    mut players_query: Query<(Entity, &mut TkTelekinesis, &TkTelekinesisConfig)>,
    viewpoints_query: Query<&GlobalTransform>,
    mut objects_query: ObjectsQuery,
) where
    S: SystemParam + 'static,
    for<'w, 's> SystemParamItem<'w, 's, S>: TkSpatialExt,
{
    for (holder, mut telekinesis, config) in players_query.iter_mut() {
        let Some(view) = telekinesis
            .viewpoint
            .and_then(|viewpoint| viewpoints_query.get(viewpoint).ok())
            .map(TkView::from_global_transform)
        else {
            continue;
        };
        let sensor = TkEnvironmentSensor::new(&*spatial_ext, holder);
        telekinesis.update_highlight(config, &view, &sensor, &mut objects_query);
    }
}

fn crouch_scale_system(
    mut query: Query<(&TkLocomotion, &TkLocomotionConfig, &mut Transform)>,
) {
    for (locomotion, config, mut transform) in query.iter_mut() {
        let desired = if locomotion.is_crouching() {
            config.crouch_y_scale.f32()
        } else {
            1.0
        };
        if transform.scale.y != desired {
            transform.scale.y = desired;
        }
    }
}
