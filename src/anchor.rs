use bevy::prelude::*;

use crate::interactable::{TkInteractableLookup, TkInteractableLookupMut};
use crate::math::Float;
use crate::sensors::TkEnvironmentSensor;
use crate::spatial_ext::{TkLayerMask, TkSpatialExt};
use crate::util::TkView;
use crate::TkConfigError;

#[derive(Component, Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct TkAnchorConfig {
    /// How far the anchor reaches along the view ray.
    pub max_anchor_distance: Float,
    pub anchorable_layers: TkLayerMask,
}

impl Default for TkAnchorConfig {
    fn default() -> Self {
        Self {
            max_anchor_distance: 10.0,
            anchorable_layers: TkLayerMask::ALL,
        }
    }
}

impl TkAnchorConfig {
    pub fn validate(&self) -> Result<(), TkConfigError> {
        TkConfigError::check_positive("max_anchor_distance", self.max_anchor_distance)
    }
}

/// The single object a player keeps anchored.
///
/// Anchoring goes through [`try_anchor_object`](Self::try_anchor_object), which releases the
/// current anchor instead of acquiring a new one when the slot is occupied. This keeps at most
/// one object anchored per slot.
#[derive(Component, Default, Debug)]
#[require(TkAnchorConfig)]
pub struct TkAnchorSlot {
    current: Option<Entity>,
}

impl TkAnchorSlot {
    pub fn current_anchor(&self) -> Option<Entity> {
        self.current
    }

    pub fn has_active_anchor(&self) -> bool {
        self.current.is_some()
    }

    /// Toggle the anchor.
    ///
    /// If an object is anchored, release it and return `false`. Otherwise, try to anchor the
    /// object under the crosshair, returning `true` on success.
    pub fn try_anchor_object(
        &mut self,
        config: &TkAnchorConfig,
        view: &TkView,
        sensor: &TkEnvironmentSensor<impl TkSpatialExt>,
        objects: &mut impl TkInteractableLookupMut,
    ) -> bool {
        if self.current.is_some() {
            self.release_anchor(objects);
            return false;
        }

        let Some(target) = self.anchorable_target(config, view, sensor, &*objects) else {
            return false;
        };
        let Some(object) = objects.object_mut(target) else {
            return false;
        };
        if object.interactable.try_anchor(object.body) {
            debug!("Anchored {target}");
            self.current = Some(target);
            true
        } else {
            false
        }
    }

    /// Release the current anchor, if any, and return the released entity.
    pub fn release_anchor(&mut self, objects: &mut impl TkInteractableLookupMut) -> Option<Entity> {
        let released = self.current.take()?;
        if let Some(object) = objects.object_mut(released) {
            object.interactable.release_anchor(object.body);
        }
        debug!("Released anchor {released}");
        Some(released)
    }

    /// Forget the anchor if its object no longer exists.
    pub fn forget_missing(&mut self, objects: &impl TkInteractableLookup) {
        if let Some(current) = self.current {
            if objects.interactable(current).is_none() {
                debug!("Anchored object {current} is gone");
                self.current = None;
            }
        }
    }

    fn anchorable_target(
        &self,
        config: &TkAnchorConfig,
        view: &TkView,
        sensor: &TkEnvironmentSensor<impl TkSpatialExt>,
        objects: &impl TkInteractableLookup,
    ) -> Option<Entity> {
        let (target, _) = sensor.view_target(
            view.origin,
            view.forward,
            config.max_anchor_distance,
            config.anchorable_layers,
            objects,
        )?;
        let interactable = objects.interactable(target)?;
        (interactable.can_be_anchored && !interactable.is_anchored()).then_some(target)
    }
}
