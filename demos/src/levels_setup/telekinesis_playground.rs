use bevy::color::palettes::css;
use bevy::prelude::*;
use bevy_telekinesis::math::Vector3;
use bevy_telekinesis::prelude::*;

use crate::level_mechanics::MovingPlatform;

use super::helper::{LevelSetupHelper3d, LevelSetupHelper3dEntityCommandsExtension};

fn ramp_transform(x: f32, z: f32, length: f32, angle_degrees: f32) -> Transform {
    let angle = angle_degrees.to_radians();
    Transform::from_xyz(x, 0.5 * length * angle.sin(), z)
        .with_rotation(Quat::from_rotation_x(angle))
}

pub fn setup_level(mut helper: LevelSetupHelper3d) {
    helper.spawn_floor(css::WHITE);

    let mut obstacles = helper.with_color(css::GRAY);
    obstacles.spawn_cuboid(
        "Gentle Ramp",
        ramp_transform(-8.0, -8.0, 10.0, 20.0),
        Vector3::new(4.0, 0.2, 10.0),
    );
    obstacles.spawn_cuboid(
        "Steep Ramp",
        ramp_transform(-14.0, -8.0, 10.0, 55.0),
        Vector3::new(4.0, 0.2, 10.0),
    );
    obstacles.spawn_stairs(
        "Stairs",
        Transform::from_xyz(8.0, 0.0, -3.0),
        3.0,
        0.25,
        0.4,
        8,
    );
    obstacles.spawn_cuboid(
        "Shelf",
        Transform::from_xyz(0.0, 1.0, -10.0),
        Vector3::new(3.0, 2.0, 1.0),
    );
    obstacles.spawn_cuboid(
        "Back Wall",
        Transform::from_xyz(0.0, 2.0, -20.0),
        Vector3::new(30.0, 4.0, 0.5),
    );

    for (index, x) in [-0.75, 0.75].into_iter().enumerate() {
        helper.spawn_prop(
            format!("Crate #{index}"),
            Transform::from_xyz(x, 0.5, -4.0),
            Vector3::ONE,
            css::BURLYWOOD,
            TkInteractable::new(TkObjectClass::Standard),
        );
    }
    for (index, (x, z)) in [(-3.0, -5.0), (-4.0, -6.5)].into_iter().enumerate() {
        helper.spawn_prop(
            format!("Anchor Block #{index}"),
            Transform::from_xyz(x, 0.4, z),
            Vector3::splat(0.8),
            css::STEEL_BLUE,
            TkInteractable::new(TkObjectClass::Anchorable),
        );
    }
    helper.spawn_prop(
        "Heavy Crate",
        Transform::from_xyz(3.0, 0.75, -7.0),
        Vector3::splat(1.5),
        css::DARK_RED,
        TkInteractable::new(TkObjectClass::Heavy),
    );
    helper.spawn_prop(
        "Dormant Vase",
        Transform::from_xyz(0.0, 2.4, -10.0),
        Vector3::new(0.4, 0.8, 0.4),
        css::GOLD,
        TkInteractable::new(TkObjectClass::Standard)
            .with_start_kinematic(true)
            .with_can_be_anchored(false)
            .with_manipulation_center(Vector3::new(0.0, 0.2, 0.0)),
    );

    helper
        .with_color(css::DARK_OLIVEGREEN)
        .spawn_cuboid(
            "Moving Platform",
            Transform::from_xyz(-6.0, 0.25, -15.0),
            Vector3::new(3.0, 0.5, 3.0),
        )
        .make_kinematic()
        .insert(MovingPlatform::new(
            2.0,
            Vector3::new(1.5, 0.25, 1.5),
            &[Vector3::new(-6.0, 0.25, -15.0), Vector3::new(6.0, 0.25, -15.0)],
        ));
}
