//! Events produced by the world, consumed by the network layer.

use uuid::Uuid;

use crate::components::{AuxId, AuxKind};
use crate::location::Location;

/// Outgoing world-state changes the network layer broadcasts to clients.
#[derive(Debug, Clone)]
pub enum WorldEvent {
    AuxSpawned {
        id: AuxId,
        kind: AuxKind,
        location: Location,
    },
    AuxRemoved {
        id: AuxId,
    },
    AuxMoved {
        id: AuxId,
        location: Location,
    },
    AuxRotated {
        id: AuxId,
        yaw: f32,
        pitch: f32,
    },
    AuxTilted {
        id: AuxId,
        tilt: (f32, f32, f32),
    },
    PassengerAdded {
        player: Uuid,
        id: AuxId,
    },
    PassengerRemoved {
        player: Uuid,
        id: AuxId,
    },
    /// A leash was attached (`holder` set) or released (`holder` none).
    LeashChanged {
        id: AuxId,
        holder: Option<Uuid>,
    },
    /// A lead item dropped to the ground when a leashed entity was removed.
    ItemDropped {
        id: AuxId,
        location: Location,
    },
    /// The player's camera overlay changed (hats with overlays).
    CameraOverlay {
        player: Uuid,
        overlay: Option<String>,
    },
}
