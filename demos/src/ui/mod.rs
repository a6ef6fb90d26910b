use bevy::prelude::*;
use bevy_telekinesis::prelude::*;

use crate::levels_setup::IsPlayer;

pub struct DemoUi;

impl Plugin for DemoUi {
    fn build(&self, app: &mut App) {
        app.init_resource::<LastInteraction>();
        app.add_systems(Startup, setup_hud);
        app.add_systems(
            Update,
            (
                apply_highlight_colors,
                record_interactions,
                update_hud.after(record_interactions),
            ),
        );
    }
}

/// The colors a prop shows for each of its highlight states.
#[derive(Component, Debug, Clone)]
pub struct HighlightColors {
    pub resting: Color,
    pub highlighted: LinearRgba,
    pub anchored: LinearRgba,
}

impl HighlightColors {
    pub fn new(resting: Color) -> Self {
        Self {
            resting,
            highlighted: LinearRgba::rgb(0.4, 0.4, 0.1),
            anchored: LinearRgba::rgb(0.1, 0.3, 0.8),
        }
    }
}

fn apply_highlight_colors(
    query: Query<
        (
            &TkInteractable,
            &HighlightColors,
            &MeshMaterial3d<StandardMaterial>,
        ),
        Changed<TkInteractable>,
    >,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (interactable, colors, material) in query.iter() {
        let Some(material) = materials.get_mut(material.id()) else {
            continue;
        };
        material.base_color = colors.resting;
        material.emissive = match interactable.highlight_state() {
            TkHighlightState::Resting => LinearRgba::BLACK,
            TkHighlightState::Highlighted => colors.highlighted,
            TkHighlightState::Anchored => colors.anchored,
        };
    }
}

#[derive(Resource, Default)]
struct LastInteraction(Option<String>);

fn record_interactions(
    mut reader: EventReader<TkInteractionEvent>,
    names_query: Query<&Name>,
    mut last_interaction: ResMut<LastInteraction>,
) {
    for event in reader.read() {
        let object = names_query
            .get(event.object)
            .map(|name| name.as_str().to_owned())
            .unwrap_or_else(|_| event.object.to_string());
        let description = format!("{:?} {object}", event.kind);
        debug!("{description}");
        last_interaction.0 = Some(description);
    }
}

#[derive(Component)]
struct HudText;

fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(50.0),
            top: Val::Percent(50.0),
            width: Val::Px(6.0),
            height: Val::Px(6.0),
            margin: UiRect::all(Val::Px(-3.0)),
            ..Default::default()
        },
        BackgroundColor(Color::WHITE),
    ));

    commands.spawn((
        HudText,
        Text::default(),
        TextFont {
            font_size: 16.0,
            ..Default::default()
        },
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            top: Val::Px(12.0),
            ..Default::default()
        },
    ));
}

const CONTROLS_HELP: &str = "\
WASD - move, Space - jump, Shift - sprint, Ctrl - crouch
Left click - grab / release, Right click - anchor, X - drop anchor
Scroll - hold distance, Q/E R/F - rotate held object";

fn update_hud(
    players_query: Query<(&TkLocomotion, &TkTelekinesis, &TkAnchorSlot), With<IsPlayer>>,
    names_query: Query<&Name>,
    last_interaction: Res<LastInteraction>,
    mut hud_query: Query<&mut Text, With<HudText>>,
) {
    let Ok(mut text) = hud_query.single_mut() else {
        return;
    };
    let name_of = |entity: Option<Entity>| match entity {
        Some(entity) => names_query
            .get(entity)
            .map(|name| name.as_str().to_owned())
            .unwrap_or_else(|_| entity.to_string()),
        None => "-".to_owned(),
    };

    let mut lines = Vec::new();
    for (locomotion, telekinesis, anchor_slot) in players_query.iter() {
        lines.push(format!(
            "State: {:?}{}",
            locomotion.state(),
            if locomotion.is_movement_restricted() {
                " (restricted)"
            } else {
                ""
            }
        ));
        lines.push(format!(
            "Grounded: {}  Slope: {}  Stairs: {}",
            locomotion.is_grounded(),
            locomotion.slope().is_slope,
            locomotion.is_climbing_stairs(),
        ));
        lines.push(format!("Target speed: {:.1}", locomotion.target_speed()));
        lines.push(format!("Looking at: {}", name_of(telekinesis.highlighted())));
        match telekinesis.hold_distance() {
            Some(distance) => lines.push(format!(
                "Holding: {} at {distance:.1}",
                name_of(telekinesis.held_object())
            )),
            None => lines.push("Holding: -".to_owned()),
        }
        lines.push(format!(
            "Anchored: {}",
            name_of(anchor_slot.current_anchor())
        ));
    }
    lines.push(format!(
        "Last interaction: {}",
        last_interaction.0.as_deref().unwrap_or("-")
    ));
    lines.push(String::new());
    lines.push(CONTROLS_HELP.to_owned());

    text.0 = lines.join("\n");
}
