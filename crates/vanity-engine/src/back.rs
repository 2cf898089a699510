//! Back-accessory registry: rigid-follow display entities riding the player.
//!
//! State machine per player is `ABSENT → ATTACHED → ABSENT`; the game's own
//! movement propagation carries translation while the entity is mounted, so
//! the per-tick pass only has to validate, repair the mount, and mirror yaw.

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;
use vanity_item::{classify, item_id, CosmeticKind, DescriptorRegistry, ItemStack};
use vanity_world::{AuxId, AuxKind, Location, ServerWorld};

use crate::equipment::EquipmentSource;
use crate::recovery::{self, AttachmentCheck, RecoveryAction};
use crate::scheduler::{ScheduledTask, TickScheduler};

/// Ticks between teardown and re-attach after a displacement desync.
pub const RECREATE_DELAY_TICKS: u64 = 2;

#[derive(Debug)]
struct BackRecord {
    display: AuxId,
    /// Baseline for teleport/large-jump detection.
    last_location: Location,
}

/// Registry of live back-accessory attachments, keyed by player.
///
/// At most one record per player; records are derived caches of the
/// equipment source-of-truth and reconciled toward it every tick.
#[derive(Debug, Default)]
pub struct BackAccessoryManager {
    active: HashMap<Uuid, BackRecord>,
}

impl BackAccessoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a back accessory, tearing down any existing one first.
    ///
    /// Unknown ids and missing descriptors make this a no-op.
    pub fn attach(
        &mut self,
        world: &mut ServerWorld,
        registry: &DescriptorRegistry,
        player: Uuid,
        item: &ItemStack,
    ) -> bool {
        if classify(item) != Some(CosmeticKind::BackAccessory) {
            return false;
        }
        let Some(id) = item_id(item).map(str::to_owned) else {
            return false;
        };
        let Some(offset) = registry.offset_of(&id) else {
            debug!(%player, %id, "no descriptor for back accessory, ignoring");
            return false;
        };

        self.detach(world, player);

        let Some(location) = world.player(player).map(|p| p.location) else {
            return false;
        };
        let display = world.spawn_aux(location, AuxKind::ItemDisplay, |init| {
            init.flags.invulnerable = true;
            init.flags.no_gravity = true;
            init.flags.collidable = false;
            init.flags.silent = true;
            init.name_tag = Some(format!("back:{player}"));
            init.display_item = Some(item.clone());
            init.display_offset = Some(offset);
        });

        if world.add_passenger(player, display).is_err() {
            world.remove_aux(display);
            return false;
        }

        self.active.insert(
            player,
            BackRecord {
                display,
                last_location: location,
            },
        );
        debug!(%player, %id, "back accessory attached");
        true
    }

    /// Remove the attachment and its entity. Idempotent.
    pub fn detach(&mut self, world: &mut ServerWorld, player: Uuid) -> bool {
        let Some(record) = self.active.remove(&player) else {
            return false;
        };
        world.remove_passenger(player, record.display);
        world.remove_aux(record.display);
        debug!(%player, "back accessory detached");
        true
    }

    pub fn has_attachment(&self, player: Uuid) -> bool {
        self.active.contains_key(&player)
    }

    pub fn tracked(&self) -> usize {
        self.active.len()
    }

    /// Attach from the equipment source-of-truth, if it reports one.
    pub fn restore_if_equipped(
        &mut self,
        world: &mut ServerWorld,
        equipment: &dyn EquipmentSource,
        registry: &DescriptorRegistry,
        player: Uuid,
    ) {
        if let Some(item) = equipment.cosmetic(world, player, CosmeticKind::BackAccessory) {
            self.attach(world, registry, player, &item);
        }
    }

    /// Per-tick validation and steady-state update for all records.
    ///
    /// Iterates a snapshot of the key set, since records are removed by the
    /// logic running here. One player's failure never aborts the pass.
    pub fn tick(
        &mut self,
        world: &mut ServerWorld,
        equipment: &dyn EquipmentSource,
        scheduler: &mut TickScheduler,
        now: u64,
    ) {
        let players: Vec<Uuid> = self.active.keys().copied().collect();
        for player in players {
            let Some((display, last)) = self
                .active
                .get(&player)
                .map(|r| (r.display, r.last_location))
            else {
                continue;
            };

            let current = world.player(player).map(|p| p.location);
            let check = AttachmentCheck {
                entity_valid: world.is_valid(display),
                player_online: world.is_online(player),
                equipment_matches: equipment
                    .cosmetic(world, player, CosmeticKind::BackAccessory)
                    .is_some(),
                displaced: current
                    .map(|c| recovery::displacement_desync(&last, &c))
                    .unwrap_or(false),
            };

            match recovery::evaluate(check) {
                RecoveryAction::Detach => {
                    self.detach(world, player);
                }
                RecoveryAction::DetachAndRecreate => {
                    self.detach(world, player);
                    scheduler.schedule(
                        now,
                        RECREATE_DELAY_TICKS,
                        ScheduledTask::RestoreBackAccessory(player),
                    );
                    debug!(%player, "back accessory displaced, recreate scheduled");
                }
                RecoveryAction::Keep => {
                    let Some(current) = current else { continue };

                    // Structural binding: re-seat a silently dropped mount.
                    if !world.is_passenger(player, display) {
                        if world.add_passenger(player, display).is_err() {
                            warn!(%player, "passenger rebind failed, recreating back accessory");
                            self.detach(world, player);
                            scheduler.schedule(
                                now,
                                RECREATE_DELAY_TICKS,
                                ScheduledTask::RestoreBackAccessory(player),
                            );
                            continue;
                        }
                        debug!(%player, "re-seated dropped passenger link");
                    }

                    // Steady state: yaw follows the player, pitch stays flat.
                    // A vanished entity here counts as a transient failure.
                    if !world.set_aux_rotation(display, current.yaw, 0.0) {
                        self.detach(world, player);
                        scheduler.schedule(
                            now,
                            RECREATE_DELAY_TICKS,
                            ScheduledTask::RestoreBackAccessory(player),
                        );
                        continue;
                    }
                    if let Some(record) = self.active.get_mut(&player) {
                        record.last_location = current;
                    }
                }
            }
        }
    }

    /// Bulk teardown on plugin disable.
    pub fn shutdown(&mut self, world: &mut ServerWorld) {
        let players: Vec<Uuid> = self.active.keys().copied().collect();
        for player in players {
            self.detach(world, player);
        }
    }
}
