use avian3d::prelude::*;
use bevy::{ecs::system::SystemParam, prelude::*};
use bevy_telekinesis_physics_integration_layer::{
    math::{Float, Quaternion, Vector3},
    spatial_ext::{TkQueryFilter, TkRayHit, TkSpatialExt},
};

#[derive(SystemParam)]
pub struct TkSpatialExtAvian3d<'w, 's> {
    spatial_query: SpatialQuery<'w, 's>,
}

fn to_avian_filter(filter: &TkQueryFilter) -> SpatialQueryFilter {
    SpatialQueryFilter::from_mask(LayerMask(filter.layers.0))
        .with_excluded_entities(filter.excluded.iter().copied())
}

impl TkSpatialExt for TkSpatialExtAvian3d<'_, '_> {
    fn cast_ray(
        &self,
        origin: Vector3,
        direction: Dir3,
        max_distance: Float,
        filter: &TkQueryFilter,
    ) -> Option<TkRayHit> {
        let hit = self.spatial_query.cast_ray(
            origin,
            direction,
            max_distance,
            true,
            &to_avian_filter(filter),
        )?;
        Some(TkRayHit {
            entity: hit.entity,
            distance: hit.distance,
            normal: hit.normal,
        })
    }

    fn sweep_box(
        &self,
        origin: Vector3,
        half_extents: Vector3,
        rotation: Quaternion,
        direction: Dir3,
        max_distance: Float,
        filter: &TkQueryFilter,
    ) -> Vec<TkRayHit> {
        let full_extents = 2.0 * half_extents;
        let shape = Collider::cuboid(full_extents.x, full_extents.y, full_extents.z);
        let mut hits: Vec<TkRayHit> = self
            .spatial_query
            .shape_hits(
                &shape,
                origin,
                rotation,
                direction,
                u32::MAX,
                &ShapeCastConfig::from_max_distance(max_distance),
                &to_avian_filter(filter),
            )
            .into_iter()
            .map(|hit| TkRayHit {
                entity: hit.entity,
                distance: hit.distance,
                normal: hit.normal1,
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
