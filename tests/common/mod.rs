#![allow(dead_code)]

use std::collections::HashMap;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_telekinesis::data_for_backends::TkRigidBody;
use bevy_telekinesis::interactable::{
    TkInteractable, TkInteractableLookup, TkInteractableLookupMut, TkObjectMut,
};
use bevy_telekinesis::math::{Float, Quaternion, Vector3};
use bevy_telekinesis::sensors::dir_vector;
use bevy_telekinesis::spatial_ext::{TkLayerMask, TkQueryFilter, TkRayHit, TkSpatialExt};
use bevy_telekinesis::util::TkView;

pub const FRAME: Float = 0.02;
pub const EPSILON: Float = 1e-4;

#[derive(Debug, Clone)]
enum MockShape {
    Cuboid { center: Vector3, half_extents: Vector3 },
    /// Everything below the plane is solid.
    HalfSpace { point: Vector3, normal: Vector3 },
}

#[derive(Debug, Clone)]
struct MockCollider {
    entity: Entity,
    shape: MockShape,
    layers: TkLayerMask,
}

/// A tiny physics-free world of axis-aligned boxes and half-spaces.
///
/// Box sweeps ignore the rotation of the swept box.
#[derive(Resource, Default, Debug)]
pub struct MockWorld {
    colliders: Vec<MockCollider>,
    next_index: u32,
}

impl MockWorld {
    /// Reserve an entity that has no collider.
    pub fn entity(&mut self) -> Entity {
        self.next_index += 1;
        Entity::from_raw(self.next_index)
    }

    pub fn add_cuboid(&mut self, center: Vector3, half_extents: Vector3) -> Entity {
        self.add_cuboid_on_layers(center, half_extents, TkLayerMask::ALL)
    }

    pub fn add_cuboid_on_layers(
        &mut self,
        center: Vector3,
        half_extents: Vector3,
        layers: TkLayerMask,
    ) -> Entity {
        let entity = self.entity();
        self.colliders.push(MockCollider {
            entity,
            shape: MockShape::Cuboid {
                center,
                half_extents,
            },
            layers,
        });
        entity
    }

    /// Give a box collider to an entity that was spawned elsewhere (e.g. in an `App`).
    pub fn attach_cuboid(&mut self, entity: Entity, center: Vector3, half_extents: Vector3) {
        self.colliders.push(MockCollider {
            entity,
            shape: MockShape::Cuboid {
                center,
                half_extents,
            },
            layers: TkLayerMask::ALL,
        });
    }

    /// A floor whose top is at `y = 0`.
    pub fn add_floor(&mut self) -> Entity {
        self.add_cuboid(
            Vector3::new(0.0, -0.5, 0.0),
            Vector3::new(50.0, 0.5, 50.0),
        )
    }

    /// A slope through the origin that rises toward `-Z`.
    pub fn add_slope(&mut self, angle_degrees: Float) -> Entity {
        let angle = angle_degrees.to_radians();
        let entity = self.entity();
        self.colliders.push(MockCollider {
            entity,
            shape: MockShape::HalfSpace {
                point: Vector3::ZERO,
                normal: Vector3::new(0.0, angle.cos(), angle.sin()),
            },
            layers: TkLayerMask::ALL,
        });
        entity
    }

    fn hits(
        &self,
        origin: Vector3,
        direction: Vector3,
        max_distance: Float,
        inflation: Vector3,
        filter: &TkQueryFilter,
    ) -> Vec<TkRayHit> {
        let mut hits: Vec<TkRayHit> = self
            .colliders
            .iter()
            .filter(|collider| {
                collider.layers.intersects(filter.layers)
                    && !filter.excluded.contains(&collider.entity)
            })
            .filter_map(|collider| {
                let (distance, normal) = match &collider.shape {
                    MockShape::Cuboid {
                        center,
                        half_extents,
                    } => ray_vs_box(origin, direction, *center, *half_extents + inflation)?,
                    MockShape::HalfSpace { point, normal } => {
                        let support = (inflation * *normal).abs().dot(Vector3::ONE);
                        ray_vs_half_space(origin, direction, *point + *normal * support, *normal)?
                    }
                };
                (distance <= max_distance).then_some(TkRayHit {
                    entity: collider.entity,
                    distance,
                    normal,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn ray_vs_box(
    origin: Vector3,
    direction: Vector3,
    center: Vector3,
    half_extents: Vector3,
) -> Option<(Float, Vector3)> {
    let min = center - half_extents;
    let max = center + half_extents;
    let mut enter: Float = Float::NEG_INFINITY;
    let mut exit: Float = Float::INFINITY;
    let mut enter_normal = Vector3::ZERO;
    for axis in 0..3 {
        if direction[axis].abs() < 1e-9 {
            if origin[axis] < min[axis] || max[axis] < origin[axis] {
                return None;
            }
            continue;
        }
        let mut near = (min[axis] - origin[axis]) / direction[axis];
        let mut far = (max[axis] - origin[axis]) / direction[axis];
        let mut normal = Vector3::ZERO;
        normal[axis] = -1.0;
        if far < near {
            std::mem::swap(&mut near, &mut far);
            normal[axis] = 1.0;
        }
        if enter < near {
            enter = near;
            enter_normal = normal;
        }
        exit = exit.min(far);
    }
    if exit < enter || exit < 0.0 {
        return None;
    }
    if enter < 0.0 {
        // Started inside.
        return Some((0.0, -direction));
    }
    Some((enter, enter_normal))
}

fn ray_vs_half_space(
    origin: Vector3,
    direction: Vector3,
    point: Vector3,
    normal: Vector3,
) -> Option<(Float, Vector3)> {
    let height = (origin - point).dot(normal);
    if height < 0.0 {
        return Some((0.0, normal));
    }
    let approach = direction.dot(normal);
    if -1e-9 <= approach {
        return None;
    }
    Some((height / -approach, normal))
}

impl TkSpatialExt for MockWorld {
    fn cast_ray(
        &self,
        origin: Vector3,
        direction: Dir3,
        max_distance: Float,
        filter: &TkQueryFilter,
    ) -> Option<TkRayHit> {
        self.hits(
            origin,
            dir_vector(direction),
            max_distance,
            Vector3::ZERO,
            filter,
        )
        .into_iter()
        .next()
    }

    fn sweep_box(
        &self,
        origin: Vector3,
        half_extents: Vector3,
        _rotation: Quaternion,
        direction: Dir3,
        max_distance: Float,
        filter: &TkQueryFilter,
    ) -> Vec<TkRayHit> {
        self.hits(
            origin,
            dir_vector(direction),
            max_distance,
            half_extents,
            filter,
        )
    }
}

/// The [`MockWorld`] resource as a spatial query parameter, for running the plugin in an `App`.
#[derive(SystemParam)]
pub struct MockSpatial<'w> {
    world: Res<'w, MockWorld>,
}

impl TkSpatialExt for MockSpatial<'_> {
    fn cast_ray(
        &self,
        origin: Vector3,
        direction: Dir3,
        max_distance: Float,
        filter: &TkQueryFilter,
    ) -> Option<TkRayHit> {
        self.world.cast_ray(origin, direction, max_distance, filter)
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
        self.world
            .sweep_box(origin, half_extents, rotation, direction, max_distance, filter)
    }
}

/// Interactable objects and their bodies, keyed by the entity of their collider.
#[derive(Default)]
pub struct MockObjects(pub HashMap<Entity, (TkInteractable, Option<TkRigidBody>)>);

impl MockObjects {
    pub fn insert(&mut self, entity: Entity, interactable: TkInteractable, body: TkRigidBody) {
        let mut body = body;
        interactable.initialize(&mut body);
        self.0.insert(entity, (interactable, Some(body)));
    }

    pub fn insert_without_body(&mut self, entity: Entity, interactable: TkInteractable) {
        self.0.insert(entity, (interactable, None));
    }

    pub fn get(&self, entity: Entity) -> &TkInteractable {
        &self.0[&entity].0
    }

    pub fn body(&self, entity: Entity) -> &TkRigidBody {
        self.0[&entity]
            .1
            .as_ref()
            .expect("object should have a body")
    }

    pub fn body_mut(&mut self, entity: Entity) -> &mut TkRigidBody {
        self.0
            .get_mut(&entity)
            .and_then(|(_, body)| body.as_mut())
            .expect("object should have a body")
    }

    pub fn anchored_count(&self) -> usize {
        self.0
            .values()
            .filter(|(interactable, _)| interactable.is_anchored())
            .count()
    }
}

impl TkInteractableLookup for MockObjects {
    fn interactable(&self, entity: Entity) -> Option<&TkInteractable> {
        Some(&self.0.get(&entity)?.0)
    }
}

impl TkInteractableLookupMut for MockObjects {
    fn object_mut(&mut self, entity: Entity) -> Option<TkObjectMut<'_>> {
        let (interactable, body) = self.0.get_mut(&entity)?;
        Some(TkObjectMut {
            interactable,
            body: body.as_mut(),
        })
    }
}

/// A view from `origin` looking along `forward`, with `right` perpendicular to it and to `Y`.
pub fn view(origin: Vector3, forward: Dir3) -> TkView {
    let right = Dir3::new(forward.cross(Vec3::Y)).unwrap_or(Dir3::X);
    TkView {
        origin,
        forward,
        right,
    }
}

/// A cube of side 1 at `center`, with a dynamic body of mass 1.
pub fn spawn_cube(
    world: &mut MockWorld,
    objects: &mut MockObjects,
    center: Vector3,
    interactable: TkInteractable,
) -> Entity {
    let entity = world.add_cuboid(center, Vector3::splat(0.5));
    objects.insert(entity, interactable, TkRigidBody::new(center, 1.0));
    entity
}

pub fn horizontal_speed(velocity: Vector3) -> Float {
    Vector3::new(velocity.x, 0.0, velocity.z).length()
}
