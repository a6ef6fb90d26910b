use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use bevy_telekinesis::math::{AdjustPrecision, Float, Vector3};
use bevy_telekinesis::prelude::*;

use crate::levels_setup::IsPlayer;

/// Scroll events measured in pixels are divided by this to get roughly one line per notch.
const PIXELS_PER_SCROLL_LINE: f32 = 100.0;

/// Orientation of the first person camera, driven by the mouse.
#[derive(Component)]
pub struct FirstPersonCamera {
    pub yaw: f32,
    pub pitch: f32,
    /// Radians per pixel of mouse motion.
    pub sensitivity: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: 0.003,
        }
    }
}

impl FirstPersonCamera {
    /// The direction the camera faces, flattened onto the ground.
    pub fn horizontal_forward(&self) -> Vector3 {
        (Quat::from_rotation_y(self.yaw) * Vec3::NEG_Z).adjust_precision()
    }

    pub fn horizontal_right(&self) -> Vector3 {
        (Quat::from_rotation_y(self.yaw) * Vec3::X).adjust_precision()
    }
}

pub fn grab_cursor(mut windows_query: Query<&mut Window, With<PrimaryWindow>>) {
    for mut window in windows_query.iter_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
}

pub fn apply_mouse_look(
    mouse_motion: Res<AccumulatedMouseMotion>,
    mut query: Query<(&mut FirstPersonCamera, &mut Transform)>,
) {
    let delta = mouse_motion.delta;
    for (mut camera, mut transform) in query.iter_mut() {
        if delta != Vec2::ZERO {
            camera.yaw -= delta.x * camera.sensitivity;
            camera.pitch = (camera.pitch - delta.y * camera.sensitivity).clamp(-1.54, 1.54);
        }
        transform.rotation =
            Quat::from_rotation_y(camera.yaw) * Quat::from_rotation_x(camera.pitch);
    }
}

/// Translate the keyboard and the mouse into the controls of the player.
///
/// This runs every frame. The locomotion controls are levels, so the simulation step reads
/// whatever was written last. The grab toggle, the anchor action and the scrolling are latched
/// inside `TkTelekinesisControls` until the next simulation step consumes them, so they are not
/// lost when a frame has no simulation step (or when it has several).
#[allow(clippy::type_complexity)]
pub fn apply_first_person_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    cameras_query: Query<&FirstPersonCamera>,
    mut query: Query<
        (
            Entity,
            &TkTelekinesis,
            &mut TkLocomotionControls,
            &mut TkTelekinesisControls,
        ),
        With<IsPlayer>,
    >,
    mut release_anchor_requests: EventWriter<TkReleaseAnchorRequest>,
) {
    for (player, telekinesis, mut locomotion_controls, mut telekinesis_controls) in
        query.iter_mut()
    {
        // The camera decides where "forward" is. Without it, the player walks along the world
        // axes.
        let camera = telekinesis
            .viewpoint
            .and_then(|viewpoint| cameras_query.get(viewpoint).ok());
        let (forward, right) = match camera {
            Some(camera) => (camera.horizontal_forward(), camera.horizontal_right()),
            None => (Vector3::NEG_Z, Vector3::X),
        };

        let mut direction = Vector3::ZERO;
        if keyboard.any_pressed([KeyCode::ArrowUp, KeyCode::KeyW]) {
            direction += forward;
        }
        if keyboard.any_pressed([KeyCode::ArrowDown, KeyCode::KeyS]) {
            direction -= forward;
        }
        if keyboard.any_pressed([KeyCode::ArrowLeft, KeyCode::KeyA]) {
            direction -= right;
        }
        if keyboard.any_pressed([KeyCode::ArrowRight, KeyCode::KeyD]) {
            direction += right;
        }

        *locomotion_controls = TkLocomotionControls {
            move_direction: direction.clamp_length_max(1.0),
            forward,
            jump: keyboard.pressed(KeyCode::Space),
            crouch: keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
            sprint: keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        };

        if mouse_buttons.just_pressed(MouseButton::Left) {
            telekinesis_controls.press_grab_toggle();
        }
        if mouse_buttons.just_pressed(MouseButton::Right) {
            telekinesis_controls.press_anchor();
        }

        let scroll = match mouse_scroll.unit {
            MouseScrollUnit::Line => mouse_scroll.delta.y,
            MouseScrollUnit::Pixel => mouse_scroll.delta.y / PIXELS_PER_SCROLL_LINE,
        };
        if scroll != 0.0 {
            telekinesis_controls.scroll(scroll as Float);
        }

        telekinesis_controls.rotate_left = keyboard.pressed(KeyCode::KeyQ);
        telekinesis_controls.rotate_right = keyboard.pressed(KeyCode::KeyE);
        telekinesis_controls.rotate_up = keyboard.pressed(KeyCode::KeyR);
        telekinesis_controls.rotate_down = keyboard.pressed(KeyCode::KeyF);

        // Puzzle scripts use this event to release the player's anchor (e.g. when a door closes
        // on it). Here the player can do it directly.
        if keyboard.just_pressed(KeyCode::KeyX) {
            release_anchor_requests.write(TkReleaseAnchorRequest { holder: player });
        }
    }
}
