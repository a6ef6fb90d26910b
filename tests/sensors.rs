mod common;

use bevy::prelude::*;
use bevy_telekinesis::interactable::{TkInteractable, TkObjectClass};
use bevy_telekinesis::math::{Quaternion, Vector3};
use bevy_telekinesis::sensors::TkEnvironmentSensor;
use bevy_telekinesis::spatial_ext::TkLayerMask;

use common::{spawn_cube, MockObjects, MockWorld};

#[test]
fn grounded_only_within_margin() {
    let mut world = MockWorld::default();
    world.add_floor();
    let owner = world.entity();
    let sensor = TkEnvironmentSensor::new(&world, owner);

    assert!(sensor.is_grounded(Vector3::new(0.0, 1.1, 0.0), 2.0, 0.2, TkLayerMask::ALL));
    assert!(!sensor.is_grounded(Vector3::new(0.0, 1.3, 0.0), 2.0, 0.2, TkLayerMask::ALL));
    assert!(!sensor.is_grounded(Vector3::new(0.0, 1.0, 0.0), 2.0, 0.2, TkLayerMask::NONE));
}

#[test]
fn sensor_ignores_its_owner() {
    let mut world = MockWorld::default();
    let owner = world.add_cuboid(Vector3::ZERO, Vector3::new(0.5, 1.0, 0.5));
    let sensor = TkEnvironmentSensor::new(&world, owner);

    assert!(!sensor.is_grounded(Vector3::ZERO, 2.0, 0.2, TkLayerMask::ALL));
}

#[test]
fn step_probe_needs_a_low_edge_with_free_space_above() {
    let mut world = MockWorld::default();
    let step = world.add_cuboid(
        Vector3::new(0.0, 0.1, -2.0),
        Vector3::new(0.5, 0.1, 1.5),
    );
    let owner = world.entity();
    let sensor = TkEnvironmentSensor::new(&world, owner);
    let lower = Vector3::new(0.0, 0.05, 0.0);
    let upper = Vector3::new(0.0, 0.3, 0.0);

    assert!(sensor.step_probe(lower, upper, Dir3::NEG_Z, 0.6, 0.6, TkLayerMask::ALL));
    // Too far.
    assert!(!sensor.step_probe(lower, upper, Dir3::NEG_Z, 0.4, 0.4, TkLayerMask::ALL));
    // Facing away.
    assert!(!sensor.step_probe(lower, upper, Dir3::Z, 0.6, 0.6, TkLayerMask::ALL));
    // Not on the stair layers.
    assert!(!sensor.step_probe(
        lower,
        upper,
        Dir3::NEG_Z,
        0.6,
        0.6,
        TkLayerMask::NONE
    ));

    let sensor = TkEnvironmentSensor::new(&world, step);
    assert!(!sensor.step_probe(lower, upper, Dir3::NEG_Z, 0.6, 0.6, TkLayerMask::ALL));
}

#[test]
fn step_probe_looks_diagonally() {
    let mut world = MockWorld::default();
    // Only reachable 45 degrees to the right of `-Z`.
    world.add_cuboid(Vector3::new(1.4, 0.1, -1.4), Vector3::new(1.0, 0.1, 1.0));
    let owner = world.entity();
    let sensor = TkEnvironmentSensor::new(&world, owner);

    assert!(sensor.step_probe(
        Vector3::new(0.0, 0.05, 0.0),
        Vector3::new(0.0, 0.3, 0.0),
        Dir3::NEG_Z,
        1.0,
        1.0,
        TkLayerMask::ALL,
    ));
}

#[test]
fn obstacle_blocking_only_counts_controlled_objects() {
    let mut world = MockWorld::default();
    let mut objects = MockObjects::default();
    let platform = world.add_cuboid(Vector3::ZERO, Vector3::new(1.0, 0.1, 1.0));
    let rider = world.add_cuboid(Vector3::new(0.0, 0.6, 0.0), Vector3::splat(0.5));
    let cube = spawn_cube(
        &mut world,
        &mut objects,
        Vector3::new(3.0, 0.0, 0.0),
        TkInteractable::new(TkObjectClass::Anchorable),
    );
    let sensor = TkEnvironmentSensor::new(&world, platform);
    let blocking = |range, objects: &MockObjects| {
        sensor.obstacle_blocking(
            Vector3::ZERO,
            Vector3::new(1.0, 0.1, 1.0),
            Quaternion::IDENTITY,
            Dir3::X,
            range,
            [rider],
            TkLayerMask::ALL,
            objects,
        )
    };

    assert!(!blocking(2.0, &objects));

    objects.0.get_mut(&cube).unwrap().0.try_anchor(None);
    assert!(blocking(2.0, &objects));
    assert!(!blocking(1.0, &objects));
}

#[test]
fn view_target_is_hidden_behind_walls() {
    let mut world = MockWorld::default();
    let mut objects = MockObjects::default();
    let cube = spawn_cube(
        &mut world,
        &mut objects,
        Vector3::new(0.0, 0.0, -4.0),
        TkInteractable::new(TkObjectClass::Standard),
    );
    let owner = world.entity();

    let sensor = TkEnvironmentSensor::new(&world, owner);
    let (target, distance) = sensor
        .view_target(Vector3::ZERO, Dir3::NEG_Z, 5.0, TkLayerMask::ALL, &objects)
        .unwrap();
    assert_eq!(target, cube);
    assert!((distance - 3.5).abs() < 1e-4);

    world.add_cuboid(Vector3::new(0.0, 0.0, -2.0), Vector3::new(2.0, 2.0, 0.1));
    let sensor = TkEnvironmentSensor::new(&world, owner);
    assert_eq!(
        sensor.view_target(Vector3::ZERO, Dir3::NEG_Z, 5.0, TkLayerMask::ALL, &objects),
        None
    );
}
