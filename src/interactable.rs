use bevy::prelude::*;

use crate::data_for_backends::TkRigidBody;
use crate::math::{Float, Vector3};

/// Heavy objects never weigh less than this.
pub const HEAVY_MASS_FLOOR: Float = 10.0;

/// How an object responds to telekinesis. Fixed when the object is created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum TkObjectClass {
    /// Can be freely manipulated.
    #[default]
    Standard,
    /// Can be freely manipulated. Meant for objects whose anchoring matters.
    Anchorable,
    /// Can only be manipulated while the holder has an active anchor, and slows the holder down.
    Heavy,
}

impl TkObjectClass {
    pub fn can_be_manipulated(self, has_anchor_available: bool) -> bool {
        match self {
            Self::Standard | Self::Anchorable => true,
            Self::Heavy => has_anchor_available,
        }
    }

    /// Holding an object of this class restricts the holder's movement.
    pub fn restricts_holder(self) -> bool {
        match self {
            Self::Standard | Self::Anchorable => false,
            Self::Heavy => true,
        }
    }

    /// Scale of the manipulation pull, given the multiplier configured for heavy objects.
    pub fn force_multiplier(self, heavy_multiplier: Float) -> Float {
        match self {
            Self::Standard | Self::Anchorable => 1.0,
            Self::Heavy => heavy_multiplier,
        }
    }
}

/// Linear and angular damping of an object, while held and while resting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TkDampingProfile {
    pub held: Float,
    pub resting: Float,
}

impl Default for TkDampingProfile {
    fn default() -> Self {
        Self {
            held: 0.5,
            resting: 1.0,
        }
    }
}

/// How an object should look, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TkHighlightState {
    Resting,
    Highlighted,
    Anchored,
}

/// An object that can be grabbed and anchored.
///
/// The object's body, if any, is the [`TkRigidBody`] of the same entity. All the mutators take it
/// as an `Option`, and objects without a body still track their flags.
#[derive(Component, Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TkInteractable {
    pub class: TkObjectClass,
    pub can_be_anchored: bool,
    /// Start frozen, and only wake up when first manipulated.
    pub start_kinematic: bool,
    /// Point the manipulation pulls toward the hold point, relative to the body and in its local
    /// space. When `None`, the body's origin is used.
    pub manipulation_center: Option<Vector3>,
    pub damping: TkDampingProfile,
    #[cfg_attr(feature = "serialize", serde(skip))]
    anchored: bool,
    #[cfg_attr(feature = "serialize", serde(skip))]
    manipulated: bool,
    #[cfg_attr(feature = "serialize", serde(skip))]
    highlighted: bool,
    #[cfg_attr(feature = "serialize", serde(skip))]
    has_awoken: bool,
    #[cfg_attr(feature = "serialize", serde(skip))]
    kinematic_before_anchor: bool,
}

impl Default for TkInteractable {
    fn default() -> Self {
        Self::new(TkObjectClass::Standard)
    }
}

/// Decide if setting an object as manipulated should unfreeze it, and update the latch.
///
/// Objects that start kinematic wake up on their first manipulation, and never again.
fn wake_on_manipulation(start_kinematic: bool, has_awoken: &mut bool) -> bool {
    if start_kinematic && !*has_awoken {
        *has_awoken = true;
        true
    } else {
        false
    }
}

impl TkInteractable {
    pub fn new(class: TkObjectClass) -> Self {
        Self {
            class,
            can_be_anchored: true,
            start_kinematic: false,
            manipulation_center: None,
            damping: Default::default(),
            anchored: false,
            manipulated: false,
            highlighted: false,
            has_awoken: false,
            kinematic_before_anchor: false,
        }
    }

    pub fn with_can_be_anchored(mut self, can_be_anchored: bool) -> Self {
        self.can_be_anchored = can_be_anchored;
        self
    }

    pub fn with_start_kinematic(mut self, start_kinematic: bool) -> Self {
        self.start_kinematic = start_kinematic;
        self
    }

    pub fn with_manipulation_center(mut self, offset: Vector3) -> Self {
        self.manipulation_center = Some(offset);
        self
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn is_manipulated(&self) -> bool {
        self.manipulated
    }

    /// The object is anchored or manipulated, i.e. something other than plain physics decides
    /// where it goes.
    pub fn is_controlled(&self) -> bool {
        self.anchored || self.manipulated
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn has_awoken(&self) -> bool {
        self.has_awoken
    }

    pub fn highlight_state(&self) -> TkHighlightState {
        if self.anchored {
            TkHighlightState::Anchored
        } else if self.highlighted {
            TkHighlightState::Highlighted
        } else {
            TkHighlightState::Resting
        }
    }

    pub fn set_highlight(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// The world space point the manipulation pulls toward the hold point.
    pub fn manipulation_center(&self, body: &TkRigidBody) -> Vector3 {
        match self.manipulation_center {
            Some(offset) => body.translation + body.rotation * offset,
            None => body.translation,
        }
    }

    /// Prepare the body when the object enters the world.
    pub fn initialize(&self, body: &mut TkRigidBody) {
        if self.class == TkObjectClass::Heavy && body.mass() < HEAVY_MASS_FLOOR {
            body.set_mass(HEAVY_MASS_FLOOR);
        }
        if self.start_kinematic && !self.has_awoken {
            body.set_kinematic(true);
        }
        body.linear_damping = self.damping.resting;
        body.angular_damping = self.damping.resting;
    }

    pub fn can_be_manipulated(&self, has_anchor_available: bool) -> bool {
        !self.anchored && self.class.can_be_manipulated(has_anchor_available)
    }

    /// Freeze the object in place.
    ///
    /// Fails if the object is already anchored or cannot be anchored at all.
    pub fn try_anchor(&mut self, body: Option<&mut TkRigidBody>) -> bool {
        if !self.can_be_anchored || self.anchored {
            return false;
        }
        self.anchored = true;
        if let Some(body) = body {
            self.kinematic_before_anchor = body.is_kinematic();
            body.set_kinematic(true);
        }
        true
    }

    /// Unfreeze the object, returning its body to the kinematic state it had before anchoring.
    pub fn release_anchor(&mut self, body: Option<&mut TkRigidBody>) {
        if !self.anchored {
            return;
        }
        self.anchored = false;
        if let Some(body) = body {
            body.set_kinematic(self.kinematic_before_anchor);
        }
    }

    /// Mark the object as held or released.
    ///
    /// Anchored objects cannot become manipulated, so setting them as manipulated does nothing.
    pub fn set_manipulated(&mut self, manipulated: bool, body: Option<&mut TkRigidBody>) {
        if manipulated && self.anchored {
            return;
        }
        self.manipulated = manipulated;
        let Some(body) = body else {
            return;
        };
        let damping = if manipulated {
            if wake_on_manipulation(self.start_kinematic, &mut self.has_awoken) {
                body.set_kinematic(false);
            }
            self.damping.held
        } else {
            self.damping.resting
        };
        body.linear_damping = damping;
        body.angular_damping = damping;
    }
}

/// Mutable access to an object and its body.
pub struct TkObjectMut<'a> {
    pub interactable: &'a mut TkInteractable,
    pub body: Option<&'a mut TkRigidBody>,
}

/// Finds interactable objects by entity.
pub trait TkInteractableLookup {
    fn interactable(&self, entity: Entity) -> Option<&TkInteractable>;
}

/// Finds interactable objects by entity, for mutating them.
pub trait TkInteractableLookupMut: TkInteractableLookup {
    fn object_mut(&mut self, entity: Entity) -> Option<TkObjectMut<'_>>;
}

impl TkInteractableLookup for Query<'_, '_, &'static TkInteractable> {
    fn interactable(&self, entity: Entity) -> Option<&TkInteractable> {
        self.get(entity).ok()
    }
}

impl TkInteractableLookup
    for Query<'_, '_, (&'static mut TkInteractable, Option<&'static mut TkRigidBody>)>
{
    fn interactable(&self, entity: Entity) -> Option<&TkInteractable> {
        let (interactable, _) = self.get(entity).ok()?;
        Some(interactable)
    }
}

impl TkInteractableLookupMut
    for Query<'_, '_, (&'static mut TkInteractable, Option<&'static mut TkRigidBody>)>
{
    fn object_mut(&mut self, entity: Entity) -> Option<TkObjectMut<'_>> {
        let (interactable, body) = self.get_mut(entity).ok()?;
        Some(TkObjectMut {
            interactable: interactable.into_inner(),
            body: body.map(Mut::into_inner),
        })
    }
}
