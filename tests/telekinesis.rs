mod common;

use bevy::prelude::*;
use bevy_telekinesis::anchor::{TkAnchorConfig, TkAnchorSlot};
use bevy_telekinesis::interactable::{TkHighlightState, TkInteractable, TkObjectClass};
use bevy_telekinesis::locomotion::TkLocomotion;
use bevy_telekinesis::math::Vector3;
use bevy_telekinesis::sensors::TkEnvironmentSensor;
use bevy_telekinesis::telekinesis::{TkRotationInput, TkTelekinesis, TkTelekinesisConfig};

use common::{spawn_cube, view, MockObjects, MockWorld, EPSILON, FRAME};

/// Where the player looks from. The cube in front of it is at distance 3.
const EYE: Vector3 = Vector3::new(0.0, 1.5, 0.0);
const CUBE: Vector3 = Vector3::new(0.0, 1.5, -3.0);

struct Setup {
    world: MockWorld,
    objects: MockObjects,
    player: Entity,
    telekinesis: TkTelekinesis,
    config: TkTelekinesisConfig,
    anchor_slot: TkAnchorSlot,
    locomotion: TkLocomotion,
}

impl Setup {
    fn new() -> Self {
        let mut world = MockWorld::default();
        let player = world.entity();
        let camera = world.entity();
        Self {
            world,
            objects: Default::default(),
            player,
            telekinesis: TkTelekinesis::new(camera),
            config: Default::default(),
            anchor_slot: Default::default(),
            locomotion: Default::default(),
        }
    }

    fn cube(&mut self, center: Vector3, interactable: TkInteractable) -> Entity {
        spawn_cube(&mut self.world, &mut self.objects, center, interactable)
    }

    fn try_grab(&mut self, forward: Dir3) -> bool {
        let sensor = TkEnvironmentSensor::new(&self.world, self.player);
        self.telekinesis.try_grab_object(
            &self.config,
            &view(EYE, forward),
            &sensor,
            &self.anchor_slot,
            &mut self.objects,
            Some(&mut self.locomotion),
        )
    }

    fn release(&mut self) -> Option<Entity> {
        self.telekinesis
            .release_object(&mut self.objects, Some(&mut self.locomotion))
    }

    fn anchor_action(&mut self, forward: Dir3) -> bool {
        let sensor = TkEnvironmentSensor::new(&self.world, self.player);
        self.telekinesis.anchor_action(
            &TkAnchorConfig::default(),
            &mut self.anchor_slot,
            &view(EYE, forward),
            &sensor,
            &mut self.objects,
            Some(&mut self.locomotion),
        )
    }

    fn update_highlight(&mut self, forward: Dir3) {
        let sensor = TkEnvironmentSensor::new(&self.world, self.player);
        self.telekinesis.update_highlight(
            &self.config,
            &view(EYE, forward),
            &sensor,
            &mut self.objects,
        );
    }

    fn manipulate(&mut self) {
        self.telekinesis.apply_manipulation(
            &self.config,
            &view(EYE, Dir3::NEG_Z),
            &mut self.objects,
            FRAME,
        );
    }
}

#[test]
fn grab_standard_object() {
    let mut setup = Setup::new();
    let cube = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Standard));

    assert!(setup.try_grab(Dir3::NEG_Z));
    assert_eq!(setup.telekinesis.held_object(), Some(cube));
    assert!((setup.telekinesis.hold_distance().unwrap() - 3.0).abs() < EPSILON);
    let interactable = setup.objects.get(cube);
    assert!(interactable.is_manipulated());
    assert!(interactable.is_highlighted());
    assert_eq!(setup.objects.body(cube).linear_damping, 0.5);
    assert!(!setup.locomotion.is_movement_restricted());

    // Already holding something.
    assert!(!setup.try_grab(Dir3::NEG_Z));
    assert_eq!(setup.telekinesis.held_object(), Some(cube));

    assert_eq!(setup.release(), Some(cube));
    assert!(!setup.objects.get(cube).is_manipulated());
    assert_eq!(setup.objects.body(cube).linear_damping, 1.0);
}

#[test]
fn grab_nothing() {
    let mut setup = Setup::new();
    setup.cube(CUBE, TkInteractable::new(TkObjectClass::Standard));

    assert!(!setup.try_grab(Dir3::X));
    assert!(!setup.telekinesis.is_manipulating());
}

#[test]
fn objects_out_of_reach_cannot_be_grabbed() {
    let mut setup = Setup::new();
    setup.cube(
        Vector3::new(0.0, 1.5, -7.0),
        TkInteractable::new(TkObjectClass::Standard),
    );

    assert!(!setup.try_grab(Dir3::NEG_Z));
}

#[test]
fn heavy_object_without_anchor_cannot_be_grabbed() {
    let mut setup = Setup::new();
    let heavy = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Heavy));

    assert!(!setup.try_grab(Dir3::NEG_Z));
    assert!(!setup.telekinesis.is_manipulating());
    assert!(!setup.objects.get(heavy).is_manipulated());
    assert!(!setup.locomotion.is_movement_restricted());
}

#[test]
fn heavy_object_with_anchor_restricts_movement() {
    let mut setup = Setup::new();
    let heavy = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Heavy));
    let anchorable = setup.cube(
        Vector3::new(3.0, 1.5, 0.0),
        TkInteractable::new(TkObjectClass::Anchorable),
    );
    assert_eq!(setup.objects.body(heavy).mass(), 10.0);

    assert!(setup.anchor_action(Dir3::X));
    assert_eq!(setup.anchor_slot.current_anchor(), Some(anchorable));

    assert!(setup.try_grab(Dir3::NEG_Z));
    assert_eq!(setup.telekinesis.held_object(), Some(heavy));
    assert!(setup.locomotion.is_movement_restricted());
    assert_eq!(
        setup.locomotion.movement_multiplier(),
        setup.config.movement_slowdown
    );

    setup.release();
    assert!(!setup.locomotion.is_movement_restricted());
    assert_eq!(setup.locomotion.movement_multiplier(), 1.0);
}

#[test]
fn releasing_twice_does_nothing() {
    let mut setup = Setup::new();
    let cube = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Standard));

    assert_eq!(setup.release(), None);
    assert!(setup.try_grab(Dir3::NEG_Z));
    assert_eq!(setup.release(), Some(cube));
    assert_eq!(setup.release(), None);
    assert!(!setup.telekinesis.is_manipulating());
    assert!(!setup.locomotion.is_movement_restricted());
}

#[test]
fn objects_without_a_body_cannot_be_grabbed() {
    let mut setup = Setup::new();
    let bodiless = setup
        .world
        .add_cuboid(CUBE, Vector3::splat(0.5));
    setup
        .objects
        .insert_without_body(bodiless, TkInteractable::new(TkObjectClass::Standard));

    assert!(!setup.try_grab(Dir3::NEG_Z));
    assert!(!setup.objects.get(bodiless).is_manipulated());
}

#[test]
fn anchoring_the_held_object_releases_it() {
    let mut setup = Setup::new();
    let cube = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Anchorable));

    assert!(setup.try_grab(Dir3::NEG_Z));
    assert!(setup.anchor_action(Dir3::NEG_Z));

    assert!(!setup.telekinesis.is_manipulating());
    let interactable = setup.objects.get(cube);
    assert!(interactable.is_anchored());
    assert!(!interactable.is_manipulated());
    assert_eq!(interactable.highlight_state(), TkHighlightState::Anchored);
    assert!(setup.objects.body(cube).is_kinematic());

    // Anchored objects cannot be grabbed.
    assert!(!setup.try_grab(Dir3::NEG_Z));
}

#[test]
fn scrolling_keeps_hold_distance_in_range() {
    let mut setup = Setup::new();
    setup.cube(CUBE, TkInteractable::new(TkObjectClass::Standard));
    assert!(setup.try_grab(Dir3::NEG_Z));

    setup.telekinesis.adjust_hold_distance(&setup.config, 1.0);
    assert!((setup.telekinesis.hold_distance().unwrap() - 5.0).abs() < EPSILON);

    for scroll in [100.0, -3.0, 0.5, -100.0, 2.5, 40.0] {
        setup.telekinesis.adjust_hold_distance(&setup.config, scroll);
        let distance = setup.telekinesis.hold_distance().unwrap();
        assert!(setup.config.min_hold_distance <= distance);
        assert!(distance <= setup.config.max_hold_distance);
    }
    setup.telekinesis.adjust_hold_distance(&setup.config, -100.0);
    assert_eq!(
        setup.telekinesis.hold_distance(),
        Some(setup.config.min_hold_distance)
    );
}

#[test]
fn inverted_hold_range_does_not_crash_grabbing_or_scrolling() {
    let mut setup = Setup::new();
    setup.config.min_hold_distance = 5.0;
    setup.config.max_hold_distance = 1.0;
    assert!(setup.config.validate().is_err());
    let cube = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Standard));

    assert!(setup.try_grab(Dir3::NEG_Z));
    assert_eq!(setup.telekinesis.held_object(), Some(cube));
    assert_eq!(setup.telekinesis.hold_distance(), Some(1.0));

    setup.telekinesis.adjust_hold_distance(&setup.config, 3.0);
    assert_eq!(setup.telekinesis.hold_distance(), Some(1.0));
    setup.telekinesis.adjust_hold_distance(&setup.config, -3.0);
    assert_eq!(setup.telekinesis.hold_distance(), Some(1.0));
}

#[test]
fn held_object_is_pulled_toward_the_hold_point() {
    let mut setup = Setup::new();
    let cube = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Standard));
    assert!(setup.try_grab(Dir3::NEG_Z));

    // Already at the hold point.
    setup.objects.body_mut(cube).set_linvel(Vector3::X);
    setup.manipulate();
    assert!((setup.objects.body(cube).linvel() - Vector3::X * 0.8).length() < EPSILON);

    setup.objects.body_mut(cube).set_linvel(Vector3::ZERO);
    setup.telekinesis.adjust_hold_distance(&setup.config, 1.0);
    setup.manipulate();
    assert!((setup.objects.body(cube).linvel() - Vector3::NEG_Z).length() < EPSILON);
}

#[test]
fn heavy_objects_are_pulled_harder() {
    let mut setup = Setup::new();
    let heavy = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Heavy));
    setup.cube(
        Vector3::new(3.0, 1.5, 0.0),
        TkInteractable::new(TkObjectClass::Anchorable),
    );
    assert!(setup.anchor_action(Dir3::X));
    assert!(setup.try_grab(Dir3::NEG_Z));

    setup.telekinesis.adjust_hold_distance(&setup.config, 1.0);
    setup.manipulate();
    assert!((setup.objects.body(heavy).linvel() - Vector3::NEG_Z * 1.5).length() < EPSILON);
}

#[test]
fn rotation_input_spins_the_held_object() {
    let mut setup = Setup::new();
    let cube = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Standard));
    assert!(setup.try_grab(Dir3::NEG_Z));

    setup.telekinesis.set_rotation_input(TkRotationInput {
        yaw: 1.0,
        pitch: 0.0,
    });
    setup.manipulate();
    let expected = Vector3::Y * 90.0f32.to_radians() * 0.1;
    assert!((setup.objects.body(cube).angvel() - expected).length() < EPSILON);

    setup.telekinesis.set_rotation_input(Default::default());
    setup.manipulate();
    assert!((setup.objects.body(cube).angvel() - expected * 0.8).length() < EPSILON);
}

#[test]
fn kinematic_objects_wake_up_only_once() {
    let mut setup = Setup::new();
    let cube = setup.cube(
        CUBE,
        TkInteractable::new(TkObjectClass::Standard).with_start_kinematic(true),
    );
    assert!(setup.objects.body(cube).is_kinematic());
    assert!(!setup.objects.get(cube).has_awoken());

    assert!(setup.try_grab(Dir3::NEG_Z));
    assert!(!setup.objects.body(cube).is_kinematic());
    assert!(setup.objects.get(cube).has_awoken());
    setup.release();

    setup.objects.body_mut(cube).set_kinematic(true);
    assert!(setup.try_grab(Dir3::NEG_Z));
    assert!(setup.objects.body(cube).is_kinematic());
}

#[test]
fn highlight_follows_the_crosshair() {
    let mut setup = Setup::new();
    let cube = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Standard));

    setup.update_highlight(Dir3::NEG_Z);
    assert_eq!(setup.telekinesis.highlighted(), Some(cube));
    assert_eq!(
        setup.objects.get(cube).highlight_state(),
        TkHighlightState::Highlighted
    );

    setup.update_highlight(Dir3::X);
    assert_eq!(setup.telekinesis.highlighted(), None);
    assert_eq!(
        setup.objects.get(cube).highlight_state(),
        TkHighlightState::Resting
    );
}

#[test]
fn held_object_stays_highlighted() {
    let mut setup = Setup::new();
    let cube = setup.cube(CUBE, TkInteractable::new(TkObjectClass::Standard));

    setup.update_highlight(Dir3::NEG_Z);
    assert!(setup.try_grab(Dir3::NEG_Z));
    setup.update_highlight(Dir3::X);
    assert!(setup.objects.get(cube).is_highlighted());

    setup.release();
    assert!(!setup.objects.get(cube).is_highlighted());
}
