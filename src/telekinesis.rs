//! Grabbing, holding, rotating and releasing objects at a distance.
use bevy::prelude::*;

use crate::anchor::{TkAnchorConfig, TkAnchorSlot};
use crate::interactable::TkInteractableLookupMut;
use crate::locomotion::TkLocomotion;
use crate::math::{Float, Vector3};
use crate::sensors::TkEnvironmentSensor;
use crate::spatial_ext::{TkLayerMask, TkSpatialExt};
use crate::util::{lerp_clamped, TkView};
use crate::TkConfigError;

/// Rotation inputs weaker than this count as no rotation.
const ROTATION_INPUT_THRESHOLD: Float = 0.1;

#[derive(Component, Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct TkTelekinesisConfig {
    /// How far the view ray looks for objects to grab and highlight.
    pub max_grab_distance: Float,
    pub min_hold_distance: Float,
    pub max_hold_distance: Float,
    /// Hold distance change per scroll unit.
    pub distance_scroll_speed: Float,
    /// Speed cap of the held object when pulled toward the hold point.
    pub max_velocity: Float,
    /// Controls both how fast the pull speeds up with distance, and how fast the object's
    /// velocity blends into the pull.
    pub damping_factor: Float,
    /// Below this distance from the hold point, the object settles instead of being pulled.
    pub settle_distance: Float,
    /// Factor applied to the velocity every step while settling, and to the angular velocity
    /// every step when there is no rotation input.
    pub settle_decay: Float,
    /// Degrees per second.
    pub rotation_speed: Float,
    /// How fast the angular velocity blends into the rotation input.
    pub rotation_blend_rate: Float,
    pub heavy_object_force_multiplier: Float,
    /// Speed multiplier applied to the holder while it holds a heavy object.
    pub movement_slowdown: Float,
    pub interactable_layers: TkLayerMask,
}

impl Default for TkTelekinesisConfig {
    fn default() -> Self {
        Self {
            max_grab_distance: 5.0,
            min_hold_distance: 1.0,
            max_hold_distance: 8.0,
            distance_scroll_speed: 2.0,
            max_velocity: 10.0,
            damping_factor: 5.0,
            settle_distance: 0.1,
            settle_decay: 0.8,
            rotation_speed: 90.0,
            rotation_blend_rate: 5.0,
            heavy_object_force_multiplier: 1.5,
            movement_slowdown: 0.5,
            interactable_layers: TkLayerMask::ALL,
        }
    }
}

impl TkTelekinesisConfig {
    pub fn validate(&self) -> Result<(), TkConfigError> {
        TkConfigError::check_positive("max_grab_distance", self.max_grab_distance)?;
        TkConfigError::check_positive("min_hold_distance", self.min_hold_distance)?;
        TkConfigError::check_positive("max_hold_distance", self.max_hold_distance)?;
        if self.max_hold_distance < self.min_hold_distance {
            return Err(TkConfigError::InvertedHoldRange {
                min: self.min_hold_distance,
                max: self.max_hold_distance,
            });
        }
        TkConfigError::check_not_negative("distance_scroll_speed", self.distance_scroll_speed)?;
        TkConfigError::check_positive("max_velocity", self.max_velocity)?;
        TkConfigError::check_positive("damping_factor", self.damping_factor)?;
        TkConfigError::check_not_negative("settle_distance", self.settle_distance)?;
        TkConfigError::check_fraction("settle_decay", self.settle_decay)?;
        TkConfigError::check_not_negative("rotation_speed", self.rotation_speed)?;
        TkConfigError::check_positive("rotation_blend_rate", self.rotation_blend_rate)?;
        TkConfigError::check_positive(
            "heavy_object_force_multiplier",
            self.heavy_object_force_multiplier,
        )?;
        TkConfigError::check_fraction("movement_slowdown", self.movement_slowdown)?;
        Ok(())
    }

    /// Clamp a hold distance into `[min_hold_distance, max_hold_distance]`.
    ///
    /// Never panics, even with an inverted range (which `validate` rejects). In that case the
    /// maximum wins.
    pub fn clamp_hold_distance(&self, distance: Float) -> Float {
        distance
            .max(self.min_hold_distance)
            .min(self.max_hold_distance)
    }
}

/// The player's telekinesis input.
///
/// The grab toggle and the anchor action are edges: once pressed they stay pressed until the
/// next simulation step handles them. Scrolling accumulates until handled. The rotation inputs
/// are levels.
#[derive(Component, Default, Debug, Clone)]
pub struct TkTelekinesisControls {
    grab_toggle: bool,
    anchor: bool,
    scroll: Float,
    /// Rotate the held object counter-clockwise around the world's up axis (as seen from above).
    pub rotate_left: bool,
    pub rotate_right: bool,
    /// Rotate the held object around the view's right axis, tilting its front upward.
    pub rotate_up: bool,
    pub rotate_down: bool,
}

impl TkTelekinesisControls {
    /// Grab the object under the crosshair, or release the held object.
    pub fn press_grab_toggle(&mut self) {
        self.grab_toggle = true;
    }

    /// Anchor the object under the crosshair, or release the current anchor.
    pub fn press_anchor(&mut self) {
        self.anchor = true;
    }

    /// Move the held object away (positive) or closer (negative).
    pub fn scroll(&mut self, delta: Float) {
        self.scroll += delta;
    }

    pub fn take_grab_toggle(&mut self) -> bool {
        std::mem::take(&mut self.grab_toggle)
    }

    pub fn take_anchor(&mut self) -> bool {
        std::mem::take(&mut self.anchor)
    }

    pub fn take_scroll(&mut self) -> Float {
        std::mem::take(&mut self.scroll)
    }

    pub fn rotation_input(&self) -> TkRotationInput {
        fn axis(positive: bool, negative: bool) -> Float {
            if positive {
                1.0
            } else if negative {
                -1.0
            } else {
                0.0
            }
        }
        TkRotationInput {
            yaw: axis(self.rotate_left, self.rotate_right),
            pitch: axis(self.rotate_up, self.rotate_down),
        }
    }
}

/// Requested rotation of the held object, each axis in `[-1, 1]`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TkRotationInput {
    /// Around the world's up axis.
    pub yaw: Float,
    /// Around the view's right axis.
    pub pitch: Float,
}

impl TkRotationInput {
    pub fn is_active(&self) -> bool {
        ROTATION_INPUT_THRESHOLD < self.yaw.hypot(self.pitch)
    }
}

/// The state of holding an object.
#[derive(Debug, Clone)]
pub struct TkHeldObject {
    pub object: Entity,
    hold_distance: Float,
    rotation_input: TkRotationInput,
}

impl TkHeldObject {
    pub fn hold_distance(&self) -> Float {
        self.hold_distance
    }

    pub fn rotation_input(&self) -> TkRotationInput {
        self.rotation_input
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
enum TkGrabRejection {
    #[error("already holding {0}")]
    AlreadyHolding(Entity),
    #[error("no interactable object under the crosshair")]
    NoTarget,
    #[error("{0} is anchored")]
    Anchored(Entity),
    #[error("{0} can only be manipulated while another object is anchored")]
    NeedsAnchor(Entity),
    #[error("{0} has no rigid body")]
    MissingBody(Entity),
}

/// Grabs objects and pulls them toward a hold point in front of the viewpoint.
///
/// Holding an object is the `Manipulating` state. Not holding anything is the `Idle` state.
#[derive(Component, Debug, Clone)]
#[require(TkTelekinesisConfig, TkTelekinesisControls, TkAnchorSlot)]
pub struct TkTelekinesis {
    /// The entity (usually the camera) whose `GlobalTransform` defines the view ray.
    pub viewpoint: Option<Entity>,
    held: Option<TkHeldObject>,
    highlighted: Option<Entity>,
}

impl TkTelekinesis {
    pub fn new(viewpoint: Entity) -> Self {
        Self {
            viewpoint: Some(viewpoint),
            held: None,
            highlighted: None,
        }
    }

    pub fn is_manipulating(&self) -> bool {
        self.held.is_some()
    }

    pub fn held(&self) -> Option<&TkHeldObject> {
        self.held.as_ref()
    }

    pub fn held_object(&self) -> Option<Entity> {
        Some(self.held.as_ref()?.object)
    }

    pub fn hold_distance(&self) -> Option<Float> {
        Some(self.held.as_ref()?.hold_distance)
    }

    /// The object under the crosshair, as of the last highlight update.
    pub fn highlighted(&self) -> Option<Entity> {
        self.highlighted
    }

    /// Move the highlight to the object under the crosshair.
    ///
    /// The held object keeps its highlight regardless.
    pub fn update_highlight(
        &mut self,
        config: &TkTelekinesisConfig,
        view: &TkView,
        sensor: &TkEnvironmentSensor<impl TkSpatialExt>,
        objects: &mut impl TkInteractableLookupMut,
    ) {
        let target = sensor
            .view_target(
                view.origin,
                view.forward,
                config.max_grab_distance,
                config.interactable_layers,
                &*objects,
            )
            .map(|(entity, _)| entity);
        if target == self.highlighted {
            return;
        }
        let held = self.held_object();
        for (entity, highlighted) in [(self.highlighted, false), (target, true)] {
            let Some(entity) = entity.filter(|entity| Some(*entity) != held) else {
                continue;
            };
            if let Some(object) = objects.object_mut(entity) {
                object.interactable.set_highlight(highlighted);
            }
        }
        self.highlighted = target;
    }

    /// Grab the object under the crosshair.
    ///
    /// Returns `false`, without changing anything, if there is no object that can be grabbed.
    pub fn try_grab_object(
        &mut self,
        config: &TkTelekinesisConfig,
        view: &TkView,
        sensor: &TkEnvironmentSensor<impl TkSpatialExt>,
        anchor_slot: &TkAnchorSlot,
        objects: &mut impl TkInteractableLookupMut,
        locomotion: Option<&mut TkLocomotion>,
    ) -> bool {
        match self.grab(config, view, sensor, anchor_slot, objects, locomotion) {
            Ok(entity) => {
                debug!("Grabbed {entity}");
                true
            }
            Err(rejection) => {
                debug!("Grab rejected: {rejection}");
                false
            }
        }
    }

    fn grab(
        &mut self,
        config: &TkTelekinesisConfig,
        view: &TkView,
        sensor: &TkEnvironmentSensor<impl TkSpatialExt>,
        anchor_slot: &TkAnchorSlot,
        objects: &mut impl TkInteractableLookupMut,
        locomotion: Option<&mut TkLocomotion>,
    ) -> Result<Entity, TkGrabRejection> {
        if let Some(held) = self.held_object() {
            return Err(TkGrabRejection::AlreadyHolding(held));
        }
        let (target, _) = sensor
            .view_target(
                view.origin,
                view.forward,
                config.max_grab_distance,
                config.interactable_layers,
                &*objects,
            )
            .ok_or(TkGrabRejection::NoTarget)?;
        let object = objects
            .object_mut(target)
            .ok_or(TkGrabRejection::NoTarget)?;
        if object.interactable.is_anchored() {
            return Err(TkGrabRejection::Anchored(target));
        }
        if !object
            .interactable
            .can_be_manipulated(anchor_slot.has_active_anchor())
        {
            return Err(TkGrabRejection::NeedsAnchor(target));
        }
        let body = object.body.ok_or(TkGrabRejection::MissingBody(target))?;

        if object.interactable.class.restricts_holder() {
            if let Some(locomotion) = locomotion {
                locomotion.set_movement_restriction(true, config.movement_slowdown);
            }
        }
        let grab_distance = view
            .origin
            .distance(object.interactable.manipulation_center(body));
        object.interactable.set_manipulated(true, Some(body));
        object.interactable.set_highlight(true);
        self.held = Some(TkHeldObject {
            object: target,
            hold_distance: config.clamp_hold_distance(grab_distance),
            rotation_input: Default::default(),
        });
        Ok(target)
    }

    /// Let go of the held object and lift the holder's movement restriction.
    ///
    /// Safe to call when nothing is held. Returns the released entity.
    pub fn release_object(
        &mut self,
        objects: &mut impl TkInteractableLookupMut,
        locomotion: Option<&mut TkLocomotion>,
    ) -> Option<Entity> {
        let released = self.held.take().map(|held| held.object);
        if let Some(entity) = released {
            if let Some(object) = objects.object_mut(entity) {
                object.interactable.set_manipulated(false, object.body);
                object.interactable.set_highlight(self.highlighted == Some(entity));
            }
            debug!("Released {entity}");
        }
        if let Some(locomotion) = locomotion {
            locomotion.set_movement_restriction(false, 1.0);
        }
        released
    }

    /// Toggle the anchor. If the held object is the one that got anchored, release it.
    ///
    /// Returns `true` if an object got anchored.
    #[allow(clippy::too_many_arguments)]
    pub fn anchor_action(
        &mut self,
        anchor_config: &TkAnchorConfig,
        anchor_slot: &mut TkAnchorSlot,
        view: &TkView,
        sensor: &TkEnvironmentSensor<impl TkSpatialExt>,
        objects: &mut impl TkInteractableLookupMut,
        locomotion: Option<&mut TkLocomotion>,
    ) -> bool {
        let anchored = anchor_slot.try_anchor_object(anchor_config, view, sensor, objects);
        let anchored_held_object = self
            .held_object()
            .is_some_and(|held| anchor_slot.current_anchor() == Some(held));
        if anchored && anchored_held_object {
            self.release_object(objects, locomotion);
        }
        anchored
    }

    /// Move the held object closer or further away.
    ///
    /// Does nothing when nothing is held.
    pub fn adjust_hold_distance(&mut self, config: &TkTelekinesisConfig, scroll: Float) {
        let Some(held) = self.held.as_mut() else {
            return;
        };
        held.hold_distance =
            config.clamp_hold_distance(held.hold_distance + scroll * config.distance_scroll_speed);
    }

    /// Record the rotation requested for the next step. Ignored when nothing is held.
    pub fn set_rotation_input(&mut self, rotation_input: TkRotationInput) {
        if let Some(held) = self.held.as_mut() {
            held.rotation_input = rotation_input;
        }
    }

    /// Pull and rotate the held object for one simulation step.
    pub fn apply_manipulation(
        &self,
        config: &TkTelekinesisConfig,
        view: &TkView,
        objects: &mut impl TkInteractableLookupMut,
        frame_duration: Float,
    ) {
        let Some(held) = self.held.as_ref() else {
            return;
        };
        let Some(object) = objects.object_mut(held.object) else {
            return;
        };
        let Some(body) = object.body else {
            return;
        };
        let rotating = held.rotation_input.is_active();

        let target = view.point_ahead(held.hold_distance);
        let offset = target - object.interactable.manipulation_center(body);
        let distance = offset.length();
        if config.settle_distance < distance {
            let desired_velocity =
                offset / distance * (distance * config.damping_factor).min(config.max_velocity);
            let blend = frame_duration
                * config.damping_factor
                * object
                    .interactable
                    .class
                    .force_multiplier(config.heavy_object_force_multiplier);
            body.set_linvel(lerp_clamped(body.linvel(), desired_velocity, blend));
        } else {
            body.set_linvel(body.linvel() * config.settle_decay);
        }

        if rotating {
            let axis = Vector3::Y * held.rotation_input.yaw
                + view.right_vector() * held.rotation_input.pitch;
            let target_angvel = axis * config.rotation_speed.to_radians();
            body.set_angvel(lerp_clamped(
                body.angvel(),
                target_angvel,
                frame_duration * config.rotation_blend_rate,
            ));
        } else {
            body.set_angvel(body.angvel() * config.settle_decay);
        }
    }
}
