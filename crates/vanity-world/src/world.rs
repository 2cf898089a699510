//! The world state: player table plus the auxiliary-entity store.

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use tracing::debug;
use uuid::Uuid;
use vanity_item::ItemStack;

use crate::components::{
    AuxFlags, AuxId, AuxKind, DisplayItem, DisplayOffset, InWorld, Kind, LeashedTo, NameTag,
    Position, RidingOn, Rotation, Tilt,
};
use crate::error::WorldError;
use crate::events::WorldEvent;
use crate::location::{Location, WorldId};
use crate::player::{ArmorSlot, Player};

/// Spawn-time configuration for an auxiliary entity, filled in by the
/// caller's initializer closure.
#[derive(Debug, Default)]
pub struct AuxInit {
    pub flags: AuxFlags,
    pub name_tag: Option<String>,
    pub display_item: Option<ItemStack>,
    pub display_offset: Option<(f32, f32, f32)>,
}

/// The slice of server world state visible to the cosmetics subsystem.
///
/// All mutation happens on the single game-simulation thread; the event
/// queue is drained by the network layer once per tick.
pub struct ServerWorld {
    ecs: World,
    players: HashMap<Uuid, Player>,
    events: Vec<WorldEvent>,
    next_aux: u64,
}

impl Default for ServerWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerWorld {
    pub fn new() -> Self {
        Self {
            ecs: World::new(),
            players: HashMap::new(),
            events: Vec::new(),
            next_aux: 1,
        }
    }

    // ─── Players ────────────────────────────────────────────────────────────

    /// Add an online player. Replaces any stale entry with the same UUID.
    pub fn join_player(&mut self, uuid: Uuid, name: &str, location: Location) {
        self.players.insert(uuid, Player::new(uuid, name, location));
    }

    /// Remove a player from the online table. Any entities still riding them
    /// are dismounted in place.
    pub fn quit_player(&mut self, uuid: Uuid) -> bool {
        let riders = self.riders_of(uuid);
        for id in riders {
            if let Some(entity) = self.find_aux(id) {
                self.ecs.entity_mut(entity).remove::<RidingOn>();
                self.events.push(WorldEvent::PassengerRemoved { player: uuid, id });
            }
        }
        self.players.remove(&uuid).is_some()
    }

    pub fn player(&self, uuid: Uuid) -> Option<&Player> {
        self.players.get(&uuid)
    }

    pub fn player_mut(&mut self, uuid: Uuid) -> Option<&mut Player> {
        self.players.get_mut(&uuid)
    }

    pub fn is_online(&self, uuid: Uuid) -> bool {
        self.players.contains_key(&uuid)
    }

    pub fn online_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Normal movement: translation propagates to rigid passengers, which is
    /// what carries passenger-bound cosmetics along with the player.
    pub fn move_player(&mut self, uuid: Uuid, location: Location) {
        let Some(player) = self.players.get_mut(&uuid) else {
            return;
        };
        player.location = location;
        for id in self.riders_of(uuid) {
            if let Some(entity) = self.find_aux(id) {
                if let Some(mut pos) = self.ecs.get_mut::<Position>(entity) {
                    pos.x = location.x;
                    pos.y = location.y;
                    pos.z = location.z;
                }
                if let Some(mut in_world) = self.ecs.get_mut::<InWorld>(entity) {
                    in_world.0 = location.world;
                }
                self.events.push(WorldEvent::AuxMoved { id, location });
            }
        }
    }

    /// Teleport: passengers are dismounted and left behind, matching vanilla
    /// behavior. The per-tick validation pass is what repairs or recreates
    /// the attachment afterwards.
    pub fn teleport_player(&mut self, uuid: Uuid, location: Location) {
        let Some(player) = self.players.get_mut(&uuid) else {
            return;
        };
        player.location = location;
        for id in self.riders_of(uuid) {
            if let Some(entity) = self.find_aux(id) {
                self.ecs.entity_mut(entity).remove::<RidingOn>();
                self.events.push(WorldEvent::PassengerRemoved { player: uuid, id });
            }
        }
    }

    pub fn set_camera_overlay(&mut self, uuid: Uuid, overlay: Option<String>) {
        if let Some(player) = self.players.get_mut(&uuid) {
            player.camera_overlay = overlay.clone();
            self.events.push(WorldEvent::CameraOverlay { player: uuid, overlay });
        }
    }

    // ─── Auxiliary entities ─────────────────────────────────────────────────

    /// Spawn an auxiliary entity at `location`, configured by `init`.
    pub fn spawn_aux(
        &mut self,
        location: Location,
        kind: AuxKind,
        init: impl FnOnce(&mut AuxInit),
    ) -> AuxId {
        let mut setup = AuxInit::default();
        init(&mut setup);

        let id = AuxId(self.next_aux);
        self.next_aux += 1;

        let entity = self
            .ecs
            .spawn((
                id,
                Kind(kind),
                Position {
                    x: location.x,
                    y: location.y,
                    z: location.z,
                },
                InWorld(location.world),
                Rotation {
                    yaw: location.yaw,
                    pitch: location.pitch,
                },
                Tilt::default(),
                setup.flags,
            ))
            .id();
        if let Some(tag) = setup.name_tag {
            self.ecs.entity_mut(entity).insert(NameTag(tag));
        }
        if let Some(item) = setup.display_item {
            self.ecs.entity_mut(entity).insert(DisplayItem(item));
        }
        if let Some(offset) = setup.display_offset {
            self.ecs.entity_mut(entity).insert(DisplayOffset(offset));
        }

        self.events.push(WorldEvent::AuxSpawned { id, kind, location });
        id
    }

    /// Remove an auxiliary entity. Idempotent.
    ///
    /// Vanilla leash rule: removing a still-leashed entity drops a lead item
    /// at its location. Callers that do not want the artifact must clear the
    /// leash first.
    pub fn remove_aux(&mut self, id: AuxId) -> bool {
        let Some(entity) = self.find_aux(id) else {
            return false;
        };
        let leashed = self.ecs.get::<LeashedTo>(entity).is_some();
        let location = self.location_of(entity);
        self.ecs.despawn(entity);
        self.events.push(WorldEvent::AuxRemoved { id });

        if leashed {
            if let Some(location) = location {
                debug!(?id, "leashed entity removed, dropping lead");
                let drop_id = self.spawn_aux(location, AuxKind::DroppedLead, |init| {
                    init.display_item = Some(ItemStack::plain("LEAD"));
                });
                self.events.push(WorldEvent::ItemDropped {
                    id: drop_id,
                    location,
                });
            }
        }
        true
    }

    /// Whether the handle still refers to a live entity.
    pub fn is_valid(&mut self, id: AuxId) -> bool {
        self.find_aux(id).is_some()
    }

    pub fn aux_kind(&mut self, id: AuxId) -> Option<AuxKind> {
        let entity = self.find_aux(id)?;
        self.ecs.get::<Kind>(entity).map(|k| k.0)
    }

    pub fn aux_location(&mut self, id: AuxId) -> Option<Location> {
        let entity = self.find_aux(id)?;
        self.location_of(entity)
    }

    /// Body rotation `(yaw, pitch)` in degrees.
    pub fn aux_rotation(&mut self, id: AuxId) -> Option<(f32, f32)> {
        let entity = self.find_aux(id)?;
        self.ecs.get::<Rotation>(entity).map(|r| (r.yaw, r.pitch))
    }

    /// Head-pose Euler angles in degrees.
    pub fn aux_tilt(&mut self, id: AuxId) -> Option<(f32, f32, f32)> {
        let entity = self.find_aux(id)?;
        self.ecs.get::<Tilt>(entity).map(|t| (t.x, t.y, t.z))
    }

    /// The hidden name tag of an auxiliary entity, if it has one.
    pub fn aux_name(&mut self, id: AuxId) -> Option<String> {
        let entity = self.find_aux(id)?;
        self.ecs.get::<NameTag>(entity).map(|n| n.0.clone())
    }

    /// The render-transform translation of a display entity, if configured.
    pub fn aux_display_offset(&mut self, id: AuxId) -> Option<(f32, f32, f32)> {
        let entity = self.find_aux(id)?;
        self.ecs.get::<DisplayOffset>(entity).map(|o| o.0)
    }

    pub fn teleport_aux(&mut self, id: AuxId, location: Location) -> bool {
        let Some(entity) = self.find_aux(id) else {
            return false;
        };
        if let Some(mut pos) = self.ecs.get_mut::<Position>(entity) {
            pos.x = location.x;
            pos.y = location.y;
            pos.z = location.z;
        }
        if let Some(mut in_world) = self.ecs.get_mut::<InWorld>(entity) {
            in_world.0 = location.world;
        }
        self.events.push(WorldEvent::AuxMoved { id, location });
        true
    }

    pub fn set_aux_rotation(&mut self, id: AuxId, yaw: f32, pitch: f32) -> bool {
        let Some(entity) = self.find_aux(id) else {
            return false;
        };
        if let Some(mut rot) = self.ecs.get_mut::<Rotation>(entity) {
            rot.yaw = yaw;
            rot.pitch = pitch;
        }
        self.events.push(WorldEvent::AuxRotated { id, yaw, pitch });
        true
    }

    /// Set the head pose of an armor stand (degrees).
    pub fn set_aux_tilt(&mut self, id: AuxId, tilt: (f32, f32, f32)) -> bool {
        let Some(entity) = self.find_aux(id) else {
            return false;
        };
        if let Some(mut t) = self.ecs.get_mut::<Tilt>(entity) {
            t.x = tilt.0;
            t.y = tilt.1;
            t.z = tilt.2;
        }
        self.events.push(WorldEvent::AuxTilted { id, tilt });
        true
    }

    // ─── Passenger relation ─────────────────────────────────────────────────

    pub fn add_passenger(&mut self, player: Uuid, id: AuxId) -> Result<(), WorldError> {
        let location = self
            .players
            .get(&player)
            .ok_or(WorldError::PlayerOffline)?
            .location;
        let entity = self.find_aux(id).ok_or(WorldError::EntityNotFound(id))?;
        self.ecs.entity_mut(entity).insert(RidingOn(player));
        if let Some(mut pos) = self.ecs.get_mut::<Position>(entity) {
            pos.x = location.x;
            pos.y = location.y;
            pos.z = location.z;
        }
        if let Some(mut in_world) = self.ecs.get_mut::<InWorld>(entity) {
            in_world.0 = location.world;
        }
        self.events.push(WorldEvent::PassengerAdded { player, id });
        Ok(())
    }

    pub fn remove_passenger(&mut self, player: Uuid, id: AuxId) {
        if let Some(entity) = self.find_aux(id) {
            if self
                .ecs
                .get::<RidingOn>(entity)
                .is_some_and(|r| r.0 == player)
            {
                self.ecs.entity_mut(entity).remove::<RidingOn>();
                self.events.push(WorldEvent::PassengerRemoved { player, id });
            }
        }
    }

    pub fn is_passenger(&mut self, player: Uuid, id: AuxId) -> bool {
        self.find_aux(id)
            .and_then(|e| self.ecs.get::<RidingOn>(e))
            .is_some_and(|r| r.0 == player)
    }

    /// All auxiliary entities riding the given player.
    pub fn passengers(&mut self, player: Uuid) -> Vec<AuxId> {
        self.riders_of(player)
    }

    // ─── Leash relation ─────────────────────────────────────────────────────

    /// Attach (`Some`) or release (`None`) a leash.
    ///
    /// Attaching fails for invalid entities, offline holders, and kinds that
    /// cannot hold a leash; balloon recovery falls back on this failure path.
    pub fn set_leash(&mut self, id: AuxId, holder: Option<Uuid>) -> Result<(), WorldError> {
        let entity = self.find_aux(id).ok_or(WorldError::EntityNotFound(id))?;
        match holder {
            Some(player) => {
                if !self.players.contains_key(&player) {
                    return Err(WorldError::PlayerOffline);
                }
                let kind = self
                    .ecs
                    .get::<Kind>(entity)
                    .map(|k| k.0)
                    .ok_or(WorldError::EntityNotFound(id))?;
                if !kind.leashable() {
                    return Err(WorldError::NotLeashable(id));
                }
                self.ecs.entity_mut(entity).insert(LeashedTo(player));
                self.events.push(WorldEvent::LeashChanged {
                    id,
                    holder: Some(player),
                });
            }
            None => {
                self.ecs.entity_mut(entity).remove::<LeashedTo>();
                self.events.push(WorldEvent::LeashChanged { id, holder: None });
            }
        }
        Ok(())
    }

    pub fn leash_holder(&mut self, id: AuxId) -> Option<Uuid> {
        let entity = self.find_aux(id)?;
        self.ecs.get::<LeashedTo>(entity).map(|l| l.0)
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    /// Auxiliary entities of the given kinds within `radius` of `center`,
    /// in the same world.
    pub fn nearby_aux(&mut self, center: Location, radius: f32, kinds: &[AuxKind]) -> Vec<AuxId> {
        let radius_sq = radius * radius;
        let mut found = Vec::new();
        let mut query = self
            .ecs
            .query::<(&AuxId, &Kind, &Position, &InWorld)>();
        for (id, kind, pos, in_world) in query.iter(&self.ecs) {
            if in_world.0 != center.world || !kinds.contains(&kind.0) {
                continue;
            }
            let dx = pos.x - center.x;
            let dy = pos.y - center.y;
            let dz = pos.z - center.z;
            if dx * dx + dy * dy + dz * dz <= radius_sq {
                found.push(*id);
            }
        }
        found
    }

    /// All live auxiliary entities of one kind.
    pub fn aux_of_kind(&mut self, kind: AuxKind) -> Vec<AuxId> {
        let mut query = self.ecs.query::<(&AuxId, &Kind)>();
        query
            .iter(&self.ecs)
            .filter(|(_, k)| k.0 == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Count live entities of one kind (test and diagnostics helper).
    pub fn count_kind(&mut self, kind: AuxKind) -> usize {
        let mut query = self.ecs.query::<&Kind>();
        query.iter(&self.ecs).filter(|k| k.0 == kind).count()
    }

    // ─── Bulk invalidation ──────────────────────────────────────────────────

    /// Unload a world: every auxiliary entity in it becomes invalid.
    pub fn unload_world(&mut self, world: WorldId) {
        let doomed: Vec<(Entity, AuxId)> = {
            let mut query = self.ecs.query::<(Entity, &AuxId, &InWorld)>();
            query
                .iter(&self.ecs)
                .filter(|(_, _, w)| w.0 == world)
                .map(|(e, id, _)| (e, *id))
                .collect()
        };
        for (entity, id) in doomed {
            self.ecs.despawn(entity);
            self.events.push(WorldEvent::AuxRemoved { id });
        }
    }

    /// An explosion removes every non-invulnerable auxiliary entity in range.
    pub fn apply_explosion(&mut self, center: Location, radius: f32) {
        let radius_sq = radius * radius;
        let doomed: Vec<AuxId> = {
            let mut query = self
                .ecs
                .query::<(&AuxId, &Position, &InWorld, &AuxFlags)>();
            query
                .iter(&self.ecs)
                .filter(|(_, pos, in_world, flags)| {
                    if in_world.0 != center.world || flags.invulnerable {
                        return false;
                    }
                    let dx = pos.x - center.x;
                    let dy = pos.y - center.y;
                    let dz = pos.z - center.z;
                    dx * dx + dy * dy + dz * dz <= radius_sq
                })
                .map(|(id, _, _, _)| *id)
                .collect()
        };
        for id in doomed {
            self.remove_aux(id);
        }
    }

    /// Drain all pending outgoing events.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Internal ───────────────────────────────────────────────────────────

    fn find_aux(&mut self, id: AuxId) -> Option<Entity> {
        let mut query = self.ecs.query::<(Entity, &AuxId)>();
        for (entity, aux) in query.iter(&self.ecs) {
            if *aux == id {
                return Some(entity);
            }
        }
        None
    }

    fn location_of(&mut self, entity: Entity) -> Option<Location> {
        let pos = *self.ecs.get::<Position>(entity)?;
        let world = self.ecs.get::<InWorld>(entity)?.0;
        let rot = self
            .ecs
            .get::<Rotation>(entity)
            .copied()
            .unwrap_or_default();
        Some(Location {
            world,
            x: pos.x,
            y: pos.y,
            z: pos.z,
            yaw: rot.yaw,
            pitch: rot.pitch,
        })
    }

    fn riders_of(&mut self, player: Uuid) -> Vec<AuxId> {
        let mut query = self.ecs.query::<(&AuxId, &RidingOn)>();
        query
            .iter(&self.ecs)
            .filter(|(_, riding)| riding.0 == player)
            .map(|(id, _)| *id)
            .collect()
    }
}
