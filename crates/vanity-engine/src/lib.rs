//! The per-player attachment and animation engine.
//!
//! Two attachment registries (back accessories and balloons), a hat-overlay
//! tracker, and a cooperative tick scheduler, driven by [`CosmeticsEngine`]
//! once per game tick. Registries are derived caches of the equipment
//! source-of-truth and reconcile toward it every tick; all recovery from
//! entity invalidation, binding desync, and teleports is automatic and
//! per-player isolated.
//!
//! Everything runs on the single game-simulation thread; there is no
//! locking and no parallelism.

pub mod back;
pub mod balloon;
pub mod equipment;
pub mod hat;
pub mod physics;
pub mod recovery;
pub mod scheduler;

use tracing::info;
use uuid::Uuid;
use vanity_item::{DescriptorRegistry, ItemStack};
use vanity_world::ServerWorld;

pub use back::BackAccessoryManager;
pub use balloon::BalloonManager;
pub use equipment::{ArmorEquipment, EquipmentSource};
pub use hat::HatOverlayManager;
pub use physics::BalloonPhysics;
pub use recovery::RecoveryAction;
pub use scheduler::{ScheduledTask, TickScheduler};

/// Ticks after join before equipment restore runs, so the player entity has
/// fully loaded on the client.
pub const JOIN_RESTORE_DELAY_TICKS: u64 = 5;

/// Owns the registries, the hat tracker, and the scheduler, and drives them
/// once per game tick.
///
/// Lifecycle: construct on plugin enable, [`CosmeticsEngine::tick`] every
/// tick, [`CosmeticsEngine::shutdown`] on disable.
#[derive(Default)]
pub struct CosmeticsEngine {
    pub back: BackAccessoryManager,
    pub balloon: BalloonManager,
    pub hats: HatOverlayManager,
    scheduler: TickScheduler,
    tick: u64,
}

impl CosmeticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Attach a back accessory for an explicit equip action.
    pub fn equip_back_accessory(
        &mut self,
        world: &mut ServerWorld,
        registry: &DescriptorRegistry,
        player: Uuid,
        item: &ItemStack,
    ) -> bool {
        self.back.attach(world, registry, player, item)
    }

    /// Attach a balloon for an explicit equip action (anchor links after the
    /// creation delay).
    pub fn equip_balloon(
        &mut self,
        world: &mut ServerWorld,
        registry: &DescriptorRegistry,
        player: Uuid,
        item: &ItemStack,
    ) -> bool {
        let now = self.tick;
        self.balloon
            .attach(world, registry, &mut self.scheduler, now, player, item)
    }

    /// Apply the camera overlay for a hat being equipped.
    pub fn equip_hat(
        &mut self,
        world: &mut ServerWorld,
        registry: &DescriptorRegistry,
        player: Uuid,
        item: &ItemStack,
    ) {
        self.hats.apply(world, registry, player, item);
    }

    /// Schedule login restore of all cosmetics from persisted equipment.
    pub fn handle_join(&mut self, player: Uuid) {
        let now = self.tick;
        self.scheduler.schedule(
            now,
            JOIN_RESTORE_DELAY_TICKS,
            ScheduledTask::RestoreBackAccessory(player),
        );
        self.scheduler
            .schedule(now, JOIN_RESTORE_DELAY_TICKS, ScheduledTask::RestoreBalloon(player));
        self.scheduler.schedule(
            now,
            JOIN_RESTORE_DELAY_TICKS,
            ScheduledTask::RestoreHatOverlay(player),
        );
    }

    /// Tear down everything for a disconnecting player, before the quit
    /// handling completes.
    pub fn handle_quit(&mut self, world: &mut ServerWorld, player: Uuid) {
        self.back.detach(world, player);
        self.balloon.detach(world, player);
        self.hats.remove(world, player);
    }

    /// Schedule a stray-lead cleanup around a player (e.g. after an
    /// explosion broke leashes nearby).
    pub fn schedule_lead_cleanup(&mut self, player: Uuid, delay: u64) {
        let now = self.tick;
        self.scheduler
            .schedule(now, delay, ScheduledTask::CleanupStrayLeads(player));
    }

    /// Run one engine tick: due scheduled tasks first, then the per-tick
    /// validation/animation passes, then the low-cadence balloon sweep.
    pub fn tick(
        &mut self,
        world: &mut ServerWorld,
        equipment: &dyn EquipmentSource,
        registry: &DescriptorRegistry,
    ) {
        self.tick += 1;
        let now = self.tick;

        for task in self.scheduler.due(now) {
            match task {
                ScheduledTask::RestoreBackAccessory(player) => {
                    self.back
                        .restore_if_equipped(world, equipment, registry, player);
                }
                ScheduledTask::RestoreBalloon(player) => {
                    self.balloon.restore_if_equipped(
                        world,
                        equipment,
                        registry,
                        &mut self.scheduler,
                        now,
                        player,
                    );
                }
                ScheduledTask::LinkBalloonAnchor {
                    player,
                    balloon,
                    height_bits,
                } => {
                    self.balloon
                        .link_anchor(world, player, balloon, f32::from_bits(height_bits));
                }
                ScheduledTask::RestoreHatOverlay(player) => {
                    self.hats.restore(world, registry, player);
                }
                ScheduledTask::CleanupStrayLeads(player) => {
                    if let Some(location) = world.player(player).map(|p| p.location) {
                        balloon::cleanup_stray_leads(world, location);
                    }
                }
            }
        }

        self.back.tick(world, equipment, &mut self.scheduler, now);
        self.balloon.tick(world, equipment, &mut self.scheduler, now);
        if now % balloon::SWEEP_INTERVAL_TICKS == 0 {
            self.balloon.sweep(world, &mut self.scheduler, now);
        }
    }

    /// Bulk teardown of every attachment on plugin disable.
    pub fn shutdown(&mut self, world: &mut ServerWorld) {
        let torn_down = self.back.tracked() + self.balloon.tracked();
        self.back.shutdown(world);
        self.balloon.shutdown(world);
        self.hats.shutdown(world);
        self.scheduler.clear();
        info!(torn_down, "cosmetics engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanity_item::CosmeticKind;
    use vanity_world::{ArmorSlot, AuxKind, Location, WorldId};

    const HATS_YAML: &str = "crown:\n  material: PAPER\n  overlay: \"vanity:overlays/crown\"\n";
    const BACKBLING_YAML: &str = "satchel:\n  material: LEATHER\n";
    const BALLOONS_YAML: &str = "red_balloon:\n  material: LEATHER_HORSE_ARMOR\n";

    struct Rig {
        world: ServerWorld,
        registry: DescriptorRegistry,
        engine: CosmeticsEngine,
        player: Uuid,
    }

    impl Rig {
        fn new() -> Self {
            let mut registry = DescriptorRegistry::new();
            registry.load_document(CosmeticKind::Hat, HATS_YAML).unwrap();
            registry
                .load_document(CosmeticKind::BackAccessory, BACKBLING_YAML)
                .unwrap();
            registry
                .load_document(CosmeticKind::Balloon, BALLOONS_YAML)
                .unwrap();
            let mut world = ServerWorld::new();
            let player = Uuid::new_v4();
            world.join_player(
                player,
                "Steve",
                Location::new(WorldId::OVERWORLD, 0.0, 64.0, 0.0),
            );
            Self {
                world,
                registry,
                engine: CosmeticsEngine::new(),
                player,
            }
        }

        fn equip_all_armor(&mut self) {
            for (id, slot) in [
                ("crown", ArmorSlot::Head),
                ("satchel", ArmorSlot::Chest),
                ("red_balloon", ArmorSlot::Legs),
            ] {
                let item = ItemStack::from_descriptor(&self.registry, id).unwrap();
                self.world
                    .player_mut(self.player)
                    .unwrap()
                    .set_armor(slot, Some(item));
            }
        }

        fn run_ticks(&mut self, n: u64) {
            for _ in 0..n {
                self.engine
                    .tick(&mut self.world, &ArmorEquipment, &self.registry);
            }
        }
    }

    #[test]
    fn join_restores_everything_after_delay() {
        let mut rig = Rig::new();
        rig.equip_all_armor();
        rig.engine.handle_join(rig.player);

        // Before the restore delay nothing exists.
        rig.run_ticks(JOIN_RESTORE_DELAY_TICKS - 1);
        assert!(!rig.engine.back.has_attachment(rig.player));

        // Restore tick: back accessory and balloon spawn, hat overlay applies.
        rig.run_ticks(1);
        assert!(rig.engine.back.has_attachment(rig.player));
        assert!(rig.engine.hats.has_overlay(rig.player));
        assert_eq!(rig.world.count_kind(AuxKind::ArmorStand), 1);

        // Balloon record commits after the anchor-link delay.
        rig.run_ticks(balloon::LINK_DELAY_TICKS);
        assert!(rig.engine.balloon.has_attachment(rig.player));
        assert_eq!(rig.world.count_kind(AuxKind::LeashAnchor), 1);
    }

    #[test]
    fn quit_tears_down_before_returning() {
        let mut rig = Rig::new();
        rig.equip_all_armor();
        rig.engine.handle_join(rig.player);
        rig.run_ticks(JOIN_RESTORE_DELAY_TICKS + balloon::LINK_DELAY_TICKS + 1);
        assert!(rig.engine.balloon.has_attachment(rig.player));

        rig.engine.handle_quit(&mut rig.world, rig.player);
        // Everything is gone the moment handle_quit returns.
        assert!(!rig.engine.back.has_attachment(rig.player));
        assert!(!rig.engine.balloon.has_attachment(rig.player));
        assert!(!rig.engine.hats.has_overlay(rig.player));
        assert_eq!(rig.world.count_kind(AuxKind::ItemDisplay), 0);
        assert_eq!(rig.world.count_kind(AuxKind::ArmorStand), 0);
        assert_eq!(rig.world.count_kind(AuxKind::LeashAnchor), 0);
    }

    #[test]
    fn explicit_equip_attaches_immediately() {
        let mut rig = Rig::new();
        let item = ItemStack::from_descriptor(&rig.registry, "satchel").unwrap();
        rig.world
            .player_mut(rig.player)
            .unwrap()
            .set_armor(ArmorSlot::Chest, Some(item.clone()));
        assert!(rig
            .engine
            .equip_back_accessory(&mut rig.world, &rig.registry, rig.player, &item));
        assert!(rig.engine.back.has_attachment(rig.player));
    }

    #[test]
    fn scheduled_lead_cleanup_runs() {
        let mut rig = Rig::new();
        rig.world.spawn_aux(
            Location::new(WorldId::OVERWORLD, 1.0, 64.0, 0.0),
            AuxKind::DroppedLead,
            |_| {},
        );
        rig.engine.schedule_lead_cleanup(rig.player, 2);
        rig.run_ticks(1);
        assert_eq!(rig.world.count_kind(AuxKind::DroppedLead), 1);
        rig.run_ticks(1);
        assert_eq!(rig.world.count_kind(AuxKind::DroppedLead), 0);
    }

    #[test]
    fn unloaded_world_recreates_after_reload() {
        let mut rig = Rig::new();
        rig.equip_all_armor();
        rig.engine.handle_join(rig.player);
        rig.run_ticks(JOIN_RESTORE_DELAY_TICKS + balloon::LINK_DELAY_TICKS + 1);

        // The world unloads under the entities; the next pass notices the
        // invalid handles and recreates from equipment.
        rig.world.unload_world(WorldId::OVERWORLD);
        rig.run_ticks(1);
        assert!(!rig.engine.balloon.has_attachment(rig.player));
        rig.run_ticks(balloon::RECREATE_DELAY_TICKS + balloon::LINK_DELAY_TICKS + 1);
        assert!(rig.engine.balloon.has_attachment(rig.player));
        assert!(rig.engine.back.has_attachment(rig.player));
    }

    #[test]
    fn shutdown_clears_scheduler_and_records() {
        let mut rig = Rig::new();
        rig.equip_all_armor();
        rig.engine.handle_join(rig.player);
        rig.run_ticks(JOIN_RESTORE_DELAY_TICKS);
        rig.engine.shutdown(&mut rig.world);
        assert!(!rig.engine.back.has_attachment(rig.player));
        assert_eq!(rig.world.count_kind(AuxKind::ItemDisplay), 0);
        assert_eq!(rig.world.count_kind(AuxKind::ArmorStand), 0);
        // Pending anchor-link tasks died with the scheduler.
        rig.run_ticks(balloon::LINK_DELAY_TICKS + 2);
        assert_eq!(rig.world.count_kind(AuxKind::LeashAnchor), 0);
    }
}
