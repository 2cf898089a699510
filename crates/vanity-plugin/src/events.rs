//! Event hooks forwarded by the host server.
//!
//! Hooks that return `bool` are cancellation decisions: `true` means the
//! server should cancel the event (used to protect balloon tethers from
//! unleashing, breaking, and damage).

use tracing::warn;
use uuid::Uuid;
use vanity_engine::balloon::STRAY_SWEEP_RADIUS;
use vanity_engine::ArmorEquipment;
use vanity_item::{classify, item_id, CosmeticKind, ItemStack};
use vanity_world::{AuxId, AuxKind, Location, ServerWorld};

use crate::CosmeticsPlugin;

impl CosmeticsPlugin {
    /// Player joined: load their locker and schedule equipment restore once
    /// they have fully loaded.
    pub fn on_join(&mut self, _world: &mut ServerWorld, player: Uuid) {
        self.locker.load_player(&self.data_dir, player);
        self.engine.handle_join(player);
    }

    /// Player disconnecting: attachments are torn down before the server's
    /// own quit handling proceeds, then the locker is saved and evicted.
    pub fn on_quit(&mut self, world: &mut ServerWorld, player: Uuid) {
        self.engine.handle_quit(world, player);
        if let Err(err) = self.locker.save_player(&self.data_dir, player) {
            warn!(%player, %err, "failed to save cosmetic locker on quit");
        }
        self.locker.evict(player);
    }

    /// Right-click with a cosmetic in hand: equip it into its slot.
    /// Returns the chat message to send, if anything happened.
    pub fn on_interact(&mut self, world: &mut ServerWorld, player: Uuid) -> Option<String> {
        let item = world.player(player)?.held_item()?.clone();
        let kind = classify(&item)?;
        let id = item_id(&item)?.to_owned();

        if let Some(node) = self.config.registry.permission_of(&id) {
            let allowed = world.player(player)?.has_permission(node);
            if !allowed {
                return Some(self.config.messages.no_permission());
            }
        }

        let slot = ArmorEquipment::slot_for(kind)?;
        {
            let p = world.player_mut(player)?;
            if let Some(previous) = p.set_armor(slot, Some(item.clone())) {
                p.add_item(previous);
            }
            p.set_held_item(None);
        }

        match kind {
            CosmeticKind::Hat => {
                self.engine
                    .equip_hat(world, &self.config.registry, player, &item);
            }
            CosmeticKind::BackAccessory => {
                self.engine
                    .equip_back_accessory(world, &self.config.registry, player, &item);
            }
            CosmeticKind::Balloon => {
                self.engine
                    .equip_balloon(world, &self.config.registry, player, &item);
            }
            CosmeticKind::Plain => {}
        }

        let shown = if item.name.is_empty() { &id } else { &item.name };
        Some(self.config.messages.equipped(shown))
    }

    /// A cosmetic was clicked out of an armor slot: drop its attachment and
    /// let the inventory action proceed.
    pub fn on_armor_slot_click(
        &mut self,
        world: &mut ServerWorld,
        player: Uuid,
        clicked: &ItemStack,
    ) {
        match classify(clicked) {
            Some(CosmeticKind::BackAccessory) => {
                self.engine.back.detach(world, player);
            }
            Some(CosmeticKind::Balloon) => {
                self.engine.balloon.detach(world, player);
            }
            _ => {}
        }
    }

    /// A player tries to unleash an entity: cancel for balloon anchors and
    /// suppress the lead drop.
    pub fn on_unleash_attempt(&mut self, world: &mut ServerWorld, entity: AuxId) -> bool {
        world
            .aux_name(entity)
            .is_some_and(|name| name.starts_with("anchor:"))
    }

    /// A player right-clicks an entity: cancel for cosmetic entities and for
    /// leash knots serving a balloon tether.
    pub fn on_entity_interact(&mut self, world: &mut ServerWorld, entity: AuxId) -> bool {
        if is_cosmetic_entity(world, entity) {
            return true;
        }
        knot_guards_balloon(world, entity)
    }

    /// A hanging entity breaks: cancel for leash knots serving a balloon.
    pub fn on_hanging_break(&mut self, world: &mut ServerWorld, entity: AuxId) -> bool {
        knot_guards_balloon(world, entity)
    }

    /// An entity takes damage: cancel for all cosmetic entities.
    pub fn on_entity_damage(&mut self, world: &mut ServerWorld, entity: AuxId) -> bool {
        is_cosmetic_entity(world, entity)
    }

    /// An explosion went off: apply it to the world (cosmetics survive via
    /// invulnerability) and sweep leash artifacts around affected players a
    /// tick later, once the debris has settled.
    pub fn on_explosion(&mut self, world: &mut ServerWorld, center: Location, radius: f32) {
        world.apply_explosion(center, radius);
        let affected: Vec<Uuid> = world
            .online_players()
            .filter(|p| {
                p.location.world == center.world
                    && p.location.distance(&center) <= radius + STRAY_SWEEP_RADIUS
            })
            .map(|p| p.uuid)
            .collect();
        for player in affected {
            self.engine.schedule_lead_cleanup(player, 1);
        }
    }
}

/// Whether an entity belongs to the cosmetics subsystem.
fn is_cosmetic_entity(world: &mut ServerWorld, entity: AuxId) -> bool {
    world.aux_name(entity).is_some_and(|name| {
        name.starts_with("back:") || name.starts_with("balloon:") || name.starts_with("anchor:")
    })
}

/// Whether a leash knot sits close enough to a balloon pair to be part of
/// its tether.
fn knot_guards_balloon(world: &mut ServerWorld, entity: AuxId) -> bool {
    if world.aux_kind(entity) != Some(AuxKind::LeashKnot) {
        return false;
    }
    let Some(location) = world.aux_location(entity) else {
        return false;
    };
    let nearby = world.nearby_aux(location, 5.0, &[AuxKind::ArmorStand, AuxKind::LeashAnchor]);
    nearby
        .into_iter()
        .any(|id| is_cosmetic_entity(world, id))
}
