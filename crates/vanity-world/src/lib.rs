//! World and entity primitives consumed by the cosmetics engine.
//!
//! This crate models the slice of server state the cosmetics subsystem sees:
//! the online-player table (location, armor, inventory, permissions) and a
//! store of auxiliary entities (displays, balloon stands, leash anchors)
//! backed by `bevy_ecs`. State changes are queued as [`WorldEvent`]s for the
//! network layer to broadcast; the engine itself never touches the ECS
//! directly.

pub mod components;
pub mod error;
pub mod events;
pub mod location;
pub mod player;
pub mod world;

pub use components::{AuxId, AuxKind};
pub use error::WorldError;
pub use events::WorldEvent;
pub use location::{Location, WorldId};
pub use player::{ArmorSlot, Player};
pub use world::{AuxInit, ServerWorld};
