use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TkInteractionKind {
    Grabbed,
    Released,
    Anchored,
    AnchorReleased,
}

/// Sent whenever a player grabs, releases, anchors or unanchors an object.
///
/// Meant for sound effects and HUD prompts. The controller itself never reads these.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TkInteractionEvent {
    pub holder: Entity,
    pub object: Entity,
    pub kind: TkInteractionKind,
}

/// Ask a player's [`TkAnchorSlot`](crate::anchor::TkAnchorSlot) to release its anchor.
///
/// Used by level scripts (e.g. a door that closes on an anchored prop). Handled during
/// [`TkPipelineStages::Logic`](crate::TkPipelineStages::Logic), before the player's own commands.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TkReleaseAnchorRequest {
    pub holder: Entity,
}
