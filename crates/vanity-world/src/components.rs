//! ECS components for auxiliary entities.

use bevy_ecs::prelude::*;
use uuid::Uuid;
use vanity_item::ItemStack;

use crate::location::WorldId;

/// Stable non-owning handle to an auxiliary entity.
///
/// Registries hold these across ticks; the world owns entity lifetime, so a
/// handle must always be re-checked with `is_valid` before use.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuxId(pub u64);

/// What an auxiliary entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxKind {
    /// Item display bound to a player as a rigid passenger.
    ItemDisplay,
    /// Marker armor stand carrying a balloon model on its head.
    ArmorStand,
    /// Invisible leashable mount for the balloon tether.
    LeashAnchor,
    /// A lead item lying on the ground (artifact of a broken leash).
    DroppedLead,
    /// A leash knot attached to a block.
    LeashKnot,
}

impl AuxKind {
    /// Only leash anchors accept a leash holder.
    pub fn leashable(&self) -> bool {
        matches!(self, AuxKind::LeashAnchor)
    }
}

/// Kind component.
#[derive(Component, Debug, Clone, Copy)]
pub struct Kind(pub AuxKind);

/// Position in the world.
#[derive(Component, Debug, Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Which world the entity is in.
#[derive(Component, Debug, Clone, Copy)]
pub struct InWorld(pub WorldId);

/// Body rotation in degrees.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

/// Head pose Euler angles in degrees (armor stands).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Tilt {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Spawn-time entity flags.
#[derive(Component, Debug, Clone, Copy)]
pub struct AuxFlags {
    pub invulnerable: bool,
    pub no_gravity: bool,
    /// Marker entities have no hitbox.
    pub marker: bool,
    pub visible: bool,
    pub silent: bool,
    pub collidable: bool,
}

impl Default for AuxFlags {
    fn default() -> Self {
        Self {
            invulnerable: false,
            no_gravity: false,
            marker: false,
            visible: true,
            silent: false,
            collidable: true,
        }
    }
}

/// Hidden name tag, e.g. for ownership scans.
#[derive(Component, Debug, Clone)]
pub struct NameTag(pub String);

/// The item a display entity renders.
#[derive(Component, Debug, Clone)]
pub struct DisplayItem(pub ItemStack);

/// Render-transform translation applied on top of the entity position
/// (configured per back accessory).
#[derive(Component, Debug, Clone, Copy)]
pub struct DisplayOffset(pub (f32, f32, f32));

/// Rigid passenger relation: this entity rides the given player.
#[derive(Component, Debug, Clone, Copy)]
pub struct RidingOn(pub Uuid);

/// Leash relation: this entity is leashed to the given player.
#[derive(Component, Debug, Clone, Copy)]
pub struct LeashedTo(pub Uuid);
