use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::math::{Float, Quaternion, Vector3};

/// A bitmask of physics layers, used to restrict which colliders a query can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TkLayerMask(pub u32);

impl TkLayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    /// A mask with only the given layer set.
    pub const fn layer(index: u32) -> Self {
        Self(1 << index)
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for TkLayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::ops::BitOr for TkLayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Restricts the colliders a [`TkSpatialExt`] query may hit.
#[derive(Debug, Clone, Default)]
pub struct TkQueryFilter {
    pub layers: TkLayerMask,
    pub excluded: HashSet<Entity>,
}

impl TkQueryFilter {
    pub fn new(layers: TkLayerMask) -> Self {
        Self {
            layers,
            excluded: Default::default(),
        }
    }

    pub fn excluding(mut self, entities: impl IntoIterator<Item = Entity>) -> Self {
        self.excluded.extend(entities);
        self
    }
}

/// A collider hit by a ray or by a swept shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TkRayHit {
    /// The entity of the collider that was hit.
    pub entity: Entity,
    /// Distance travelled along the cast direction until the hit.
    pub distance: Float,
    /// The surface normal at the hit point.
    pub normal: Vector3,
}

/// Spatial queries the controller needs from the physics backend.
///
/// Backends implement this on a `SystemParam` wrapping their own query pipeline. The controller
/// logic only ever sees `&impl TkSpatialExt`, which also makes it possible to run it against a
/// hand-made world.
pub trait TkSpatialExt {
    /// Cast a ray and return the nearest hit, if any.
    fn cast_ray(
        &self,
        origin: Vector3,
        direction: Dir3,
        max_distance: Float,
        filter: &TkQueryFilter,
    ) -> Option<TkRayHit>;

    /// Sweep a box along `direction` and return every collider it hits, nearest first.
    fn sweep_box(
        &self,
        origin: Vector3,
        half_extents: Vector3,
        rotation: Quaternion,
        direction: Dir3,
        max_distance: Float,
        filter: &TkQueryFilter,
    ) -> Vec<TkRayHit>;
}
