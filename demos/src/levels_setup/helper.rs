use avian3d::prelude as avian;
use bevy::ecs::system::{EntityCommands, SystemParam};
use bevy::prelude::*;
use bevy_telekinesis::math::{AsF32, Float, Vector3};
use bevy_telekinesis::data_for_backends::TkRigidBody;
use bevy_telekinesis::prelude::*;

use crate::levels_setup::LevelObject;
use crate::ui::HighlightColors;

#[derive(SystemParam, Deref, DerefMut)]
pub struct LevelSetupHelper3d<'w, 's> {
    #[deref]
    pub commands: Commands<'w, 's>,
    pub meshes: ResMut<'w, Assets<Mesh>>,
    pub materials: ResMut<'w, Assets<StandardMaterial>>,
}

impl<'w, 's> LevelSetupHelper3d<'w, 's> {
    pub fn spawn_named(&'_ mut self, name: impl ToString) -> EntityCommands<'_> {
        self.commands
            .spawn((LevelObject, Name::new(name.to_string())))
    }

    pub fn spawn_floor(&'_ mut self, color: impl Into<Color>) -> EntityCommands<'_> {
        let mesh = self
            .meshes
            .add(Plane3d::default().mesh().size(128.0, 128.0));
        let material = self.materials.add(color.into());
        let mut cmd = self.spawn_named("Floor");
        cmd.insert((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            avian::RigidBody::Static,
            avian::Collider::half_space(Vector3::Y),
        ));
        cmd
    }

    pub fn with_color<'a>(
        &'a mut self,
        color: impl Into<Color>,
    ) -> LevelSetupHelper3dWithMaterial<'a, 'w, 's> {
        let material = self.materials.add(color.into());
        LevelSetupHelper3dWithMaterial {
            parent: self,
            material,
        }
    }

    /// A dynamic box that can be grabbed and anchored.
    ///
    /// The [`TkRigidBody`] proxy is what the controller moves, and it is synced with the box's
    /// avian body.
    ///
    /// Each prop gets its own material, so that its highlight does not leak to other props.
    pub fn spawn_prop(
        &'_ mut self,
        name: impl ToString,
        transform: Transform,
        size: Vector3,
        color: impl Into<Color>,
        interactable: TkInteractable,
    ) -> EntityCommands<'_> {
        let color = color.into();
        let mesh = self.meshes.add(Cuboid::from_size(size.f32()));
        let material = self.materials.add(color);
        let mut cmd = self.spawn_named(name);
        cmd.insert((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            transform,
            avian::RigidBody::Dynamic,
            avian::Collider::cuboid(size.x, size.y, size.z),
            interactable,
            TkRigidBody::default(),
            HighlightColors::new(color),
        ));
        cmd
    }
}

pub struct LevelSetupHelper3dWithMaterial<'a, 'w, 's> {
    parent: &'a mut LevelSetupHelper3d<'w, 's>,
    material: Handle<StandardMaterial>,
}

impl LevelSetupHelper3dWithMaterial<'_, '_, '_> {
    pub fn spawn_mesh_without_physics(
        &'_ mut self,
        name: impl ToString,
        transform: Transform,
        mesh: impl Into<Mesh>,
    ) -> EntityCommands<'_> {
        let mesh = self.parent.meshes.add(mesh);
        let mut cmd = self.parent.spawn_named(name);
        cmd.insert((
            Mesh3d(mesh),
            MeshMaterial3d(self.material.clone()),
            transform,
        ));
        cmd
    }

    pub fn spawn_cuboid(
        &'_ mut self,
        name: impl ToString,
        transform: Transform,
        size: Vector3,
    ) -> EntityCommands<'_> {
        let mut cmd =
            self.spawn_mesh_without_physics(name, transform, Cuboid::from_size(size.f32()));
        cmd.insert((
            avian::RigidBody::Static,
            avian::Collider::cuboid(size.x, size.y, size.z),
        ));
        cmd
    }

    /// A flight of stairs going up along `-Z` from `transform`.
    pub fn spawn_stairs(
        &'_ mut self,
        name: impl ToString,
        transform: Transform,
        width: Float,
        step_height: Float,
        step_depth: Float,
        steps: usize,
    ) {
        let name = name.to_string();
        for step in 0..steps {
            let height = step_height * (step + 1) as Float;
            let offset = Vec3::new(
                0.0,
                0.5 * height.f32(),
                -(step_depth * (step as Float + 0.5)).f32(),
            );
            self.spawn_cuboid(
                format!("{name} #{step}"),
                transform * Transform::from_translation(offset),
                Vector3::new(width, height, step_depth),
            );
        }
    }
}

pub trait LevelSetupHelper3dEntityCommandsExtension {
    fn make_kinematic(&mut self) -> &mut Self;
}

impl LevelSetupHelper3dEntityCommandsExtension for EntityCommands<'_> {
    fn make_kinematic(&mut self) -> &mut Self {
        self.insert(avian::RigidBody::Kinematic)
    }
}
