use avian3d::{prelude as avian, prelude::*};
use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;
use bevy_telekinesis::prelude::*;
use bevy_telekinesis_avian3d::prelude::*;

use tk_demos_crate::app_setup_options::{AppSetupConfiguration, DemoTuning, ScheduleToUse};
use tk_demos_crate::character_control_systems::first_person_control_systems::{
    apply_first_person_controls, apply_mouse_look, grab_cursor, FirstPersonCamera,
};
use tk_demos_crate::level_mechanics::LevelMechanicsPlugin;
use tk_demos_crate::levels_setup::{telekinesis_playground, IsPlayer};
use tk_demos_crate::ui::DemoUi;

fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins);

    let app_setup_configuration = AppSetupConfiguration::from_environment();
    app.insert_resource(app_setup_configuration.clone());
    app.insert_resource(app_setup_configuration.load_tuning());

    let schedule = match app_setup_configuration.schedule_to_use {
        ScheduleToUse::Update => Update.intern(),
        ScheduleToUse::FixedUpdate => FixedUpdate.intern(),
    };

    app.add_plugins(PhysicsDebugPlugin::default());
    match app_setup_configuration.schedule_to_use {
        ScheduleToUse::Update => {
            app.add_plugins(PhysicsPlugins::new(PostUpdate));
        }
        ScheduleToUse::FixedUpdate => {
            app.add_plugins(PhysicsPlugins::new(FixedPostUpdate));
        }
    }
    // The backend's plugin and the controller's plugin must share a schedule, and that schedule
    // must run before the physics step.
    app.add_plugins(TkAvian3dPlugin::new(schedule));
    app.add_plugins(TkControllerPlugin::<TkSpatialExtAvian3d>::new(schedule));

    app.add_plugins(DemoUi);
    app.add_plugins(LevelMechanicsPlugin);
    app.add_systems(
        Startup,
        (
            telekinesis_playground::setup_level,
            setup_lights,
            setup_player,
            grab_cursor,
        ),
    );
    app.add_systems(
        Update,
        (
            apply_mouse_look,
            apply_first_person_controls.in_set(TkUserControlsSystemSet),
        ),
    );
    app.run();
}

fn setup_lights(mut commands: Commands) {
    commands.spawn((PointLight::default(), Transform::from_xyz(5.0, 5.0, 5.0)));

    commands.spawn((
        DirectionalLight {
            illuminance: 4000.0,
            shadows_enabled: true,
            ..Default::default()
        },
        Transform::default().looking_at(-Vec3::Y, Vec3::Z),
    ));
}

fn setup_player(mut commands: Commands, tuning: Res<DemoTuning>) {
    let camera = commands
        .spawn((
            Camera3d::default(),
            FirstPersonCamera::default(),
            Transform::from_xyz(0.0, 1.7, 4.0),
        ))
        .id();

    let mut cmd = commands.spawn((IsPlayer, Name::new("Player")));
    cmd.insert(Transform::from_xyz(0.0, 1.0, 4.0));

    // The player must be a dynamic rigid body that does not tip over.
    cmd.insert(avian::RigidBody::Dynamic);
    cmd.insert(avian::Collider::capsule(0.5, 1.0));
    cmd.insert(LockedAxes::ROTATION_LOCKED);

    // `TkLocomotion` pulls in its controls and the rigid body proxy, and `TkTelekinesis` pulls in
    // the anchor slot. The tuning only needs to replace the default configs.
    cmd.insert((
        TkLocomotion::default(),
        tuning.locomotion.clone(),
        TkTelekinesis::new(camera),
        tuning.telekinesis.clone(),
        tuning.anchor.clone(),
    ));
    let player = cmd.id();

    commands
        .entity(camera)
        .insert(TkViewFollow::new(player, Vec3::Y * 0.7));
}
