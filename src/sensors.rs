use bevy::prelude::*;

use crate::interactable::{TkInteractable, TkInteractableLookup};
use crate::math::{angle_between_degrees, AdjustPrecision, AsF32, Float, Quaternion, Vector3};
use crate::spatial_ext::{TkLayerMask, TkQueryFilter, TkSpatialExt};

/// Angles below this are considered flat ground rather than a slope.
const FLAT_ANGLE_EPSILON_DEGREES: Float = 0.01;

/// Result of [`TkEnvironmentSensor::slope_info`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TkSlopeInfo {
    /// The surface under the body is a walkable slope (not flat and not too steep).
    pub is_slope: bool,
    /// The normal of the surface under the body, or `UP` when there is none.
    pub normal: Vector3,
}

impl Default for TkSlopeInfo {
    fn default() -> Self {
        Self {
            is_slope: false,
            normal: Vector3::Y,
        }
    }
}

/// Queries the world around an entity.
///
/// All the queries ignore the owner entity, so the sensor can cast from inside the owner's own
/// collider.
pub struct TkEnvironmentSensor<'a, X: TkSpatialExt> {
    ext: &'a X,
    owner: Entity,
}

impl<'a, X: TkSpatialExt> TkEnvironmentSensor<'a, X> {
    pub fn new(ext: &'a X, owner: Entity) -> Self {
        Self { ext, owner }
    }

    pub fn owner(&self) -> Entity {
        self.owner
    }

    fn filter(&self, layers: TkLayerMask) -> TkQueryFilter {
        TkQueryFilter::new(layers).excluding([self.owner])
    }

    /// Check if there is ground right below a body of the given height.
    pub fn is_grounded(
        &self,
        origin: Vector3,
        height: Float,
        margin: Float,
        ground_layers: TkLayerMask,
    ) -> bool {
        self.ext
            .cast_ray(
                origin,
                Dir3::NEG_Y,
                0.5 * height + margin,
                &self.filter(ground_layers),
            )
            .is_some()
    }

    /// Check if the body stands on a slope it can walk on.
    pub fn slope_info(
        &self,
        origin: Vector3,
        height: Float,
        margin: Float,
        max_slope_angle: Float,
        layers: TkLayerMask,
    ) -> TkSlopeInfo {
        let Some(hit) = self.ext.cast_ray(
            origin,
            Dir3::NEG_Y,
            0.5 * height + margin,
            &self.filter(layers),
        ) else {
            return TkSlopeInfo::default();
        };
        let angle = angle_between_degrees(Vector3::Y, hit.normal);
        TkSlopeInfo {
            is_slope: FLAT_ANGLE_EPSILON_DEGREES < angle && angle < max_slope_angle,
            normal: hit.normal,
        }
    }

    /// Look for a step edge the body can climb.
    ///
    /// Casts straight ahead and 45 degrees to each side, from a lower and an upper origin. A step
    /// is found when, in any of these directions, the lower cast hits and the upper cast does not.
    /// The result does not depend on how many directions found a step.
    pub fn step_probe(
        &self,
        lower_origin: Vector3,
        upper_origin: Vector3,
        forward: Dir3,
        lower_range: Float,
        upper_range: Float,
        stair_layers: TkLayerMask,
    ) -> bool {
        let filter = self.filter(stair_layers);
        let quarter = std::f32::consts::FRAC_PI_4;
        [
            forward,
            Quat::from_rotation_y(quarter) * forward,
            Quat::from_rotation_y(-quarter) * forward,
        ]
        .into_iter()
        .any(|direction| {
            self.ext
                .cast_ray(lower_origin, direction, lower_range, &filter)
                .is_some()
                && self
                    .ext
                    .cast_ray(upper_origin, direction, upper_range, &filter)
                    .is_none()
        })
    }

    /// Check if a box moving along `direction` would run into a held or anchored object.
    ///
    /// Hits on the owner and on `ignored` entities (typically the owner's children) are skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn obstacle_blocking(
        &self,
        cast_origin: Vector3,
        half_extents: Vector3,
        rotation: Quaternion,
        direction: Dir3,
        range: Float,
        ignored: impl IntoIterator<Item = Entity>,
        layers: TkLayerMask,
        interactables: &impl TkInteractableLookup,
    ) -> bool {
        let filter = self.filter(layers).excluding(ignored);
        self.ext
            .sweep_box(
                cast_origin,
                half_extents,
                rotation,
                direction,
                range,
                &filter,
            )
            .into_iter()
            .filter(|hit| hit.distance <= range && !filter.excluded.contains(&hit.entity))
            .any(|hit| {
                interactables
                    .interactable(hit.entity)
                    .is_some_and(TkInteractable::is_controlled)
            })
    }

    /// The nearest entity along a view ray, if it is an interactable object.
    ///
    /// Anything else the ray hits first (a wall, for example) hides the objects behind it.
    pub fn view_target(
        &self,
        origin: Vector3,
        direction: Dir3,
        max_distance: Float,
        layers: TkLayerMask,
        interactables: &impl TkInteractableLookup,
    ) -> Option<(Entity, Float)> {
        let hit = self
            .ext
            .cast_ray(origin, direction, max_distance, &self.filter(layers))?;
        interactables.interactable(hit.entity)?;
        Some((hit.entity, hit.distance))
    }
}

/// Turn a horizontal facing vector into a direction, falling back to `fallback` when it has no
/// horizontal component.
pub fn horizontal_direction(vector: Vector3, fallback: Dir3) -> Dir3 {
    let flat = Vector3::new(vector.x, 0.0, vector.z);
    Dir3::new(flat.f32()).unwrap_or(fallback)
}

/// The precision-adjusted vector of a direction.
pub fn dir_vector(direction: Dir3) -> Vector3 {
    direction.as_vec3().adjust_precision()
}
