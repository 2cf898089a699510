//! Balloon registry: a visible balloon stand plus an invisible leash anchor
//! per player, with spring-follow motion and idle bob/sway animation.
//!
//! Creation is two-stage: the balloon spawns immediately, the anchor spawns
//! and leashes two ticks later. Leashing a freshly spawned entity in the
//! same tick is unreliable — the anchor must exist and complete one world
//! tick before the relation holds.

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;
use vanity_item::{classify, item_id, CosmeticKind, DescriptorRegistry, ItemStack};
use vanity_world::{AuxId, AuxKind, Location, ServerWorld};

use crate::equipment::EquipmentSource;
use crate::physics::BalloonPhysics;
use crate::recovery::{self, AttachmentCheck, RecoveryAction};
use crate::scheduler::{ScheduledTask, TickScheduler};

/// Ticks between balloon spawn and anchor spawn + leash.
pub const LINK_DELAY_TICKS: u64 = 2;
/// Ticks between teardown and re-attach after a displacement desync.
/// Longer than the back-accessory delay: anchor re-binding is the
/// failure-prone part.
pub const RECREATE_DELAY_TICKS: u64 = 3;
/// The anchor sits this far above the balloon.
pub const ANCHOR_OFFSET_Y: f32 = 0.5;
/// Radius of the stray-artifact sweep around the player.
pub const STRAY_SWEEP_RADIUS: f32 = 10.0;
/// Cadence of the secondary silently-dead-entity sweep.
pub const SWEEP_INTERVAL_TICKS: u64 = 100;

#[derive(Debug)]
struct BalloonRecord {
    balloon: AuxId,
    anchor: AuxId,
    /// Float height from the descriptor.
    height: f32,
    /// Baseline for teleport/large-jump detection.
    last_location: Location,
    /// Seconds the player has been stationary.
    idle_time: f32,
    bob_phase: f32,
    sway_phase: f32,
}

/// Registry of live balloon attachments, keyed by player.
///
/// A record exists only once both entities are up and linked; between
/// `attach` and the link task the balloon is an untracked orphan that the
/// link task either adopts or removes.
#[derive(Debug, Default)]
pub struct BalloonManager {
    active: HashMap<Uuid, BalloonRecord>,
    physics: BalloonPhysics,
}

fn balloon_tag(player: Uuid) -> String {
    format!("balloon:{player}")
}

fn anchor_tag(player: Uuid) -> String {
    format!("anchor:{player}")
}

impl BalloonManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// First stage of attachment: tear down existing state, clear artifacts,
    /// spawn the balloon, and schedule the anchor link.
    ///
    /// Unknown ids and missing descriptors make this a no-op.
    pub fn attach(
        &mut self,
        world: &mut ServerWorld,
        registry: &DescriptorRegistry,
        scheduler: &mut TickScheduler,
        now: u64,
        player: Uuid,
        item: &ItemStack,
    ) -> bool {
        if classify(item) != Some(CosmeticKind::Balloon) {
            return false;
        }
        let Some(id) = item_id(item).map(str::to_owned) else {
            return false;
        };
        let Some(height) = registry.descriptor(&id).map(|d| d.height) else {
            debug!(%player, %id, "no descriptor for balloon, ignoring");
            return false;
        };

        self.detach(world, player);

        let Some(location) = world.player(player).map(|p| p.location) else {
            return false;
        };
        cleanup_stray_leads(world, location);
        self.cleanup_orphans(world, player, location);

        let balloon = world.spawn_aux(
            location.offset(0.0, height, 0.0),
            AuxKind::ArmorStand,
            |init| {
                init.flags.invulnerable = true;
                init.flags.no_gravity = true;
                init.flags.marker = true;
                init.flags.visible = false;
                init.flags.silent = true;
                init.flags.collidable = false;
                init.name_tag = Some(balloon_tag(player));
                init.display_item = Some(item.clone());
            },
        );

        scheduler.schedule(
            now,
            LINK_DELAY_TICKS,
            ScheduledTask::link_anchor(player, balloon, height),
        );
        debug!(%player, %id, ?balloon, "balloon spawned, anchor link scheduled");
        true
    }

    /// Second stage: spawn the anchor above the balloon, leash it to the
    /// player, and commit the record with zeroed animation phases.
    pub fn link_anchor(
        &mut self,
        world: &mut ServerWorld,
        player: Uuid,
        balloon: AuxId,
        height: f32,
    ) {
        if !world.is_valid(balloon) {
            debug!(%player, ?balloon, "balloon vanished before anchor link");
            return;
        }
        let Some(player_location) = world.player(player).map(|p| p.location) else {
            world.remove_aux(balloon);
            return;
        };
        cleanup_stray_leads(world, player_location);

        let Some(balloon_location) = world.aux_location(balloon) else {
            return;
        };
        let anchor = world.spawn_aux(
            balloon_location.offset(0.0, ANCHOR_OFFSET_Y, 0.0),
            AuxKind::LeashAnchor,
            |init| {
                init.flags.invulnerable = true;
                init.flags.no_gravity = true;
                init.flags.visible = false;
                init.flags.silent = true;
                init.flags.collidable = false;
                init.name_tag = Some(anchor_tag(player));
            },
        );

        if let Err(err) = world.set_leash(anchor, Some(player)) {
            warn!(%player, %err, "leashing balloon anchor failed");
            world.remove_aux(anchor);
            world.remove_aux(balloon);
            return;
        }

        self.active.insert(
            player,
            BalloonRecord {
                balloon,
                anchor,
                height,
                last_location: player_location,
                idle_time: 0.0,
                bob_phase: 0.0,
                sway_phase: 0.0,
            },
        );
        debug!(%player, ?balloon, ?anchor, "balloon linked");
    }

    /// Remove the attachment, both entities, and nearby leash artifacts.
    /// Idempotent.
    pub fn detach(&mut self, world: &mut ServerWorld, player: Uuid) -> bool {
        let Some(record) = self.active.remove(&player) else {
            return false;
        };
        if let Some(location) = world.player(player).map(|p| p.location) {
            cleanup_stray_leads(world, location);
        }
        if world.is_valid(record.anchor) {
            // Unleash first so removal does not drop a lead item.
            let _ = world.set_leash(record.anchor, None);
            world.remove_aux(record.anchor);
        }
        world.remove_aux(record.balloon);
        debug!(%player, "balloon detached");
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
        scheduler: &mut TickScheduler,
        now: u64,
        player: Uuid,
    ) {
        if let Some(item) = equipment.cosmetic(world, player, CosmeticKind::Balloon) {
            self.attach(world, registry, scheduler, now, player, &item);
        }
    }

    /// Per-tick validation, physics, and animation for all records.
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
            let Some((balloon, anchor, height, last)) = self
                .active
                .get(&player)
                .map(|r| (r.balloon, r.anchor, r.height, r.last_location))
            else {
                continue;
            };

            let current = world.player(player).map(|p| p.location);
            let check = AttachmentCheck {
                entity_valid: world.is_valid(balloon) && world.is_valid(anchor),
                player_online: world.is_online(player),
                equipment_matches: equipment
                    .cosmetic(world, player, CosmeticKind::Balloon)
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
                        ScheduledTask::RestoreBalloon(player),
                    );
                    debug!(%player, "balloon displaced, recreate scheduled");
                }
                RecoveryAction::Keep => {
                    let Some(current) = current else { continue };

                    // Leash integrity: the anchor must be held by its player.
                    if world.leash_holder(anchor) != Some(player) {
                        match world.set_leash(anchor, Some(player)) {
                            Ok(()) => debug!(%player, "rebound balloon leash"),
                            Err(err) => {
                                warn!(%player, %err, "leash rebind failed, recreating balloon");
                                self.detach(world, player);
                                scheduler.schedule(
                                    now,
                                    RECREATE_DELAY_TICKS,
                                    ScheduledTask::RestoreBalloon(player),
                                );
                                continue;
                            }
                        }
                    }

                    if !self.step_motion(world, player, balloon, anchor, height, current) {
                        // Entity vanished mid-update: treat as fatal for this
                        // player's attachment, clean up, recreate later.
                        cleanup_stray_leads(world, current);
                        self.detach(world, player);
                        scheduler.schedule(
                            now,
                            RECREATE_DELAY_TICKS,
                            ScheduledTask::RestoreBalloon(player),
                        );
                    }
                }
            }
        }
    }

    /// Advance the animation state and move both entities.
    /// Returns `false` if either entity disappeared mid-update.
    fn step_motion(
        &mut self,
        world: &mut ServerWorld,
        player: Uuid,
        balloon: AuxId,
        anchor: AuxId,
        height: f32,
        current: Location,
    ) -> bool {
        let Some(balloon_location) = world.aux_location(balloon) else {
            return false;
        };
        let Some(record) = self.active.get_mut(&player) else {
            return false;
        };

        let movement = current.distance(&record.last_location);
        record.idle_time = self.physics.advance_idle(record.idle_time, movement);
        record.bob_phase = self
            .physics
            .advance_phase(record.bob_phase, self.physics.bob_speed);
        record.sway_phase = self
            .physics
            .advance_phase(record.sway_phase, self.physics.sway_speed);
        let idle = self.physics.idle_factor(record.idle_time);
        let (bob_phase, sway_phase) = (record.bob_phase, record.sway_phase);
        record.last_location = current;

        let step = self
            .physics
            .step(&current, &balloon_location, height, idle, bob_phase, sway_phase);
        if step.snapped {
            debug!(%player, "balloon fell too far behind, snapped home");
        }

        if !world.teleport_aux(balloon, step.target) {
            return false;
        }
        world.set_aux_tilt(balloon, step.tilt);
        // The anchor rides just above the balloon, after the balloon moves.
        world.teleport_aux(anchor, step.target.offset(0.0, ANCHOR_OFFSET_Y, 0.0))
    }

    /// Secondary low-cadence sweep for entities that died without the
    /// per-tick pass noticing; recreates from the equipment source-of-truth.
    pub fn sweep(
        &mut self,
        world: &mut ServerWorld,
        scheduler: &mut TickScheduler,
        now: u64,
    ) {
        let players: Vec<Uuid> = self.active.keys().copied().collect();
        for player in players {
            let Some((balloon, anchor)) = self
                .active
                .get(&player)
                .map(|r| (r.balloon, r.anchor))
            else {
                continue;
            };
            if !world.is_valid(balloon) || !world.is_valid(anchor) {
                warn!(%player, "balloon entity died silently, recreating");
                self.detach(world, player);
                scheduler.schedule(
                    now,
                    RECREATE_DELAY_TICKS,
                    ScheduledTask::RestoreBalloon(player),
                );
            }
        }
    }

    /// Bulk teardown on plugin disable.
    ///
    /// Also removes creation-window orphans: balloons spawned whose anchor
    /// link never got to run.
    pub fn shutdown(&mut self, world: &mut ServerWorld) {
        let players: Vec<Uuid> = self.active.keys().copied().collect();
        for player in players {
            self.detach(world, player);
        }
        for kind in [AuxKind::ArmorStand, AuxKind::LeashAnchor] {
            for id in world.aux_of_kind(kind) {
                let ours = world
                    .aux_name(id)
                    .is_some_and(|n| n.starts_with("balloon:") || n.starts_with("anchor:"));
                if ours {
                    let _ = world.set_leash(id, None);
                    world.remove_aux(id);
                }
            }
        }
    }

    /// Remove leftover balloon/anchor entities tagged for this player that
    /// no record owns (e.g. orphans from an interrupted creation).
    fn cleanup_orphans(&mut self, world: &mut ServerWorld, player: Uuid, center: Location) {
        let tags = [balloon_tag(player), anchor_tag(player)];
        let nearby = world.nearby_aux(
            center,
            STRAY_SWEEP_RADIUS,
            &[AuxKind::ArmorStand, AuxKind::LeashAnchor],
        );
        for id in nearby {
            if world
                .aux_name(id)
                .is_some_and(|name| tags.contains(&name))
            {
                let _ = world.set_leash(id, None);
                world.remove_aux(id);
            }
        }
    }

    #[cfg(test)]
    fn record(&self, player: Uuid) -> Option<(AuxId, AuxId, f32)> {
        self.active
            .get(&player)
            .map(|r| (r.balloon, r.anchor, r.idle_time))
    }
}

/// Remove stray lead drops and leash knots around a location, artifacts of
/// the leash mechanic that survive a broken tether.
pub fn cleanup_stray_leads(world: &mut ServerWorld, center: Location) {
    let strays = world.nearby_aux(
        center,
        STRAY_SWEEP_RADIUS,
        &[AuxKind::DroppedLead, AuxKind::LeashKnot],
    );
    if !strays.is_empty() {
        debug!(count = strays.len(), "clearing stray leash artifacts");
    }
    for id in strays {
        world.remove_aux(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::ArmorEquipment;
    use vanity_world::{ArmorSlot, WorldId};

    const BALLOONS_YAML: &str = r#"
red_balloon:
  material: LEATHER_HORSE_ARMOR
  name: "&cRed Balloon"
"#;

    struct Rig {
        world: ServerWorld,
        registry: DescriptorRegistry,
        manager: BalloonManager,
        scheduler: TickScheduler,
        player: Uuid,
        now: u64,
    }

    impl Rig {
        fn new() -> Self {
            let mut registry = DescriptorRegistry::new();
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
                manager: BalloonManager::new(),
                scheduler: TickScheduler::new(),
                player,
                now: 0,
            }
        }

        fn equip(&mut self) -> ItemStack {
            let item = ItemStack::from_descriptor(&self.registry, "red_balloon").unwrap();
            self.world
                .player_mut(self.player)
                .unwrap()
                .set_armor(ArmorSlot::Legs, Some(item.clone()));
            assert!(self.manager.attach(
                &mut self.world,
                &self.registry,
                &mut self.scheduler,
                self.now,
                self.player,
                &item,
            ));
            item
        }

        /// Advance one tick: run due scheduled tasks, then the per-tick pass.
        fn step(&mut self) {
            self.now += 1;
            for task in self.scheduler.due(self.now) {
                match task {
                    ScheduledTask::LinkBalloonAnchor {
                        player,
                        balloon,
                        height_bits,
                    } => self.manager.link_anchor(
                        &mut self.world,
                        player,
                        balloon,
                        f32::from_bits(height_bits),
                    ),
                    ScheduledTask::RestoreBalloon(player) => self.manager.restore_if_equipped(
                        &mut self.world,
                        &ArmorEquipment,
                        &self.registry,
                        &mut self.scheduler,
                        self.now,
                        player,
                    ),
                    _ => {}
                }
            }
            self.manager
                .tick(&mut self.world, &ArmorEquipment, &mut self.scheduler, self.now);
        }

        fn step_until_linked(&mut self) {
            for _ in 0..(LINK_DELAY_TICKS + 1) {
                self.step();
                if self.manager.has_attachment(self.player) {
                    return;
                }
            }
            panic!("balloon never linked");
        }
    }

    #[test]
    fn attach_then_link_creates_pair() {
        let mut rig = Rig::new();
        rig.equip();
        // Balloon up immediately, record only after the link delay.
        assert_eq!(rig.world.count_kind(AuxKind::ArmorStand), 1);
        assert!(!rig.manager.has_attachment(rig.player));

        rig.step_until_linked();
        assert_eq!(rig.world.count_kind(AuxKind::ArmorStand), 1);
        assert_eq!(rig.world.count_kind(AuxKind::LeashAnchor), 1);

        let (balloon, anchor, _) = rig.manager.record(rig.player).unwrap();
        assert_eq!(rig.world.leash_holder(anchor), Some(rig.player));
        let balloon_loc = rig.world.aux_location(balloon).unwrap();
        let anchor_loc = rig.world.aux_location(anchor).unwrap();
        assert!((anchor_loc.y - balloon_loc.y - ANCHOR_OFFSET_Y).abs() < 0.2);
    }

    #[test]
    fn attach_twice_keeps_single_pair() {
        let mut rig = Rig::new();
        let item = rig.equip();
        rig.step_until_linked();
        let (first_balloon, _, _) = rig.manager.record(rig.player).unwrap();

        let now = rig.now;
        assert!(rig.manager.attach(
            &mut rig.world,
            &rig.registry,
            &mut rig.scheduler,
            now,
            rig.player,
            &item,
        ));
        assert!(!rig.world.is_valid(first_balloon));
        rig.step_until_linked();
        assert_eq!(rig.world.count_kind(AuxKind::ArmorStand), 1);
        assert_eq!(rig.world.count_kind(AuxKind::LeashAnchor), 1);
        assert_eq!(rig.manager.tracked(), 1);
    }

    #[test]
    fn link_aborts_when_player_quits() {
        let mut rig = Rig::new();
        rig.equip();
        rig.world.quit_player(rig.player);
        rig.step();
        rig.step();
        assert_eq!(rig.world.count_kind(AuxKind::ArmorStand), 0);
        assert_eq!(rig.world.count_kind(AuxKind::LeashAnchor), 0);
        assert!(!rig.manager.has_attachment(rig.player));
    }

    #[test]
    fn detach_absent_is_noop() {
        let mut rig = Rig::new();
        assert!(!rig.manager.detach(&mut rig.world, rig.player));
    }

    #[test]
    fn equipment_is_truth() {
        let mut rig = Rig::new();
        rig.equip();
        rig.step_until_linked();
        rig.world
            .player_mut(rig.player)
            .unwrap()
            .set_armor(ArmorSlot::Legs, None);
        rig.step();
        assert!(!rig.manager.has_attachment(rig.player));
        assert_eq!(rig.world.count_kind(AuxKind::ArmorStand), 0);
        assert_eq!(rig.world.count_kind(AuxKind::LeashAnchor), 0);
    }

    #[test]
    fn eleven_block_walk_recreates_at_new_location() {
        let mut rig = Rig::new();
        rig.equip();
        rig.step_until_linked();

        // 11 blocks in a straight line in one tick.
        rig.world.move_player(
            rig.player,
            Location::new(WorldId::OVERWORLD, 0.0, 64.0, 11.0),
        );
        rig.step();
        // Torn down this tick.
        assert!(!rig.manager.has_attachment(rig.player));
        assert_eq!(rig.world.count_kind(AuxKind::ArmorStand), 0);
        assert_eq!(rig.world.count_kind(AuxKind::LeashAnchor), 0);

        // Recreate fires RECREATE_DELAY_TICKS later, then the link follows.
        for _ in 0..(RECREATE_DELAY_TICKS + LINK_DELAY_TICKS + 1) {
            rig.step();
        }
        assert!(rig.manager.has_attachment(rig.player));
        let (balloon, anchor, _) = rig.manager.record(rig.player).unwrap();
        assert_eq!(rig.world.leash_holder(anchor), Some(rig.player));
        let loc = rig.world.aux_location(balloon).unwrap();
        assert!((loc.z - 11.0).abs() < 1.0, "balloon should be at the new spot");
    }

    #[test]
    fn world_change_recreates() {
        let mut rig = Rig::new();
        rig.equip();
        rig.step_until_linked();
        rig.world
            .teleport_player(rig.player, Location::new(WorldId(1), 0.0, 64.0, 0.0));
        rig.step();
        assert!(!rig.manager.has_attachment(rig.player));
        assert!(rig.scheduler.pending() > 0);
    }

    #[test]
    fn idle_timer_accumulates_and_resets() {
        let mut rig = Rig::new();
        rig.equip();
        rig.step_until_linked();

        for _ in 0..10 {
            rig.step();
        }
        let (_, _, idle) = rig.manager.record(rig.player).unwrap();
        assert!(idle > 0.0);

        rig.world.move_player(
            rig.player,
            Location::new(WorldId::OVERWORLD, 0.0, 64.0, 2.0),
        );
        rig.step();
        let (_, _, idle) = rig.manager.record(rig.player).unwrap();
        assert_eq!(idle, 0.0);
    }

    #[test]
    fn dropped_leash_is_rebound() {
        let mut rig = Rig::new();
        rig.equip();
        rig.step_until_linked();
        let (_, anchor, _) = rig.manager.record(rig.player).unwrap();
        rig.world.set_leash(anchor, None).unwrap();
        rig.step();
        assert_eq!(rig.world.leash_holder(anchor), Some(rig.player));
        assert!(rig.manager.has_attachment(rig.player));
    }

    #[test]
    fn runaway_balloon_snaps_home() {
        let mut rig = Rig::new();
        rig.equip();
        rig.step_until_linked();
        let (balloon, _, _) = rig.manager.record(rig.player).unwrap();
        rig.world.teleport_aux(
            balloon,
            Location::new(WorldId::OVERWORLD, 8.0, 66.5, 0.0),
        );
        rig.step();
        let loc = rig.world.aux_location(balloon).unwrap();
        let player_loc = rig.world.player(rig.player).unwrap().location;
        assert!(loc.distance(&player_loc) < 3.5, "snap should bring it home");
    }

    #[test]
    fn tilt_mirrors_player_yaw() {
        let mut rig = Rig::new();
        rig.equip();
        rig.step_until_linked();
        let (balloon, _, _) = rig.manager.record(rig.player).unwrap();
        let mut loc = Location::new(WorldId::OVERWORLD, 0.0, 64.0, 1.0);
        loc.yaw = 45.0;
        rig.world.move_player(rig.player, loc);
        rig.step();
        let (_, yaw, _) = rig.world.aux_tilt(balloon).unwrap();
        assert!((yaw - 45.0).abs() < 1e-4);
    }

    #[test]
    fn sweep_recreates_silently_dead_entities() {
        let mut rig = Rig::new();
        rig.equip();
        rig.step_until_linked();
        let (balloon, _, _) = rig.manager.record(rig.player).unwrap();

        rig.world.remove_aux(balloon);
        let now = rig.now;
        rig.manager.sweep(&mut rig.world, &mut rig.scheduler, now);
        assert!(!rig.manager.has_attachment(rig.player));

        for _ in 0..(RECREATE_DELAY_TICKS + LINK_DELAY_TICKS + 1) {
            rig.step();
        }
        assert!(rig.manager.has_attachment(rig.player));
    }

    #[test]
    fn detach_clears_stray_leads_and_leaves_none() {
        let mut rig = Rig::new();
        rig.equip();
        rig.step_until_linked();
        // A stray lead drop near the player, e.g. from an earlier broken leash.
        rig.world.spawn_aux(
            Location::new(WorldId::OVERWORLD, 2.0, 64.0, 0.0),
            AuxKind::DroppedLead,
            |_| {},
        );
        rig.manager.detach(&mut rig.world, rig.player);
        assert_eq!(rig.world.count_kind(AuxKind::DroppedLead), 0);
        assert_eq!(rig.world.count_kind(AuxKind::LeashAnchor), 0);
    }

    #[test]
    fn one_player_failure_is_isolated() {
        let mut rig = Rig::new();
        rig.equip();
        let other = Uuid::new_v4();
        rig.world.join_player(
            other,
            "Alex",
            Location::new(WorldId::OVERWORLD, 20.0, 64.0, 0.0),
        );
        let item = ItemStack::from_descriptor(&rig.registry, "red_balloon").unwrap();
        rig.world
            .player_mut(other)
            .unwrap()
            .set_armor(ArmorSlot::Legs, Some(item.clone()));
        let now = rig.now;
        assert!(rig.manager.attach(
            &mut rig.world,
            &rig.registry,
            &mut rig.scheduler,
            now,
            other,
            &item,
        ));
        rig.step_until_linked();
        assert!(rig.manager.has_attachment(other));

        // Kill the first player's balloon mid-flight.
        let (balloon, _, _) = rig.manager.record(rig.player).unwrap();
        rig.world.remove_aux(balloon);
        rig.step();

        assert!(!rig.manager.has_attachment(rig.player));
        assert!(rig.manager.has_attachment(other));
        let (_, _, idle) = rig.manager.record(other).unwrap();
        assert!(idle > 0.0, "survivor still receives steady-state updates");
    }

    #[test]
    fn shutdown_tears_down_everything() {
        let mut rig = Rig::new();
        rig.equip();
        rig.step_until_linked();
        rig.manager.shutdown(&mut rig.world);
        assert_eq!(rig.manager.tracked(), 0);
        assert_eq!(rig.world.count_kind(AuxKind::ArmorStand), 0);
        assert_eq!(rig.world.count_kind(AuxKind::LeashAnchor), 0);
        assert_eq!(rig.world.count_kind(AuxKind::DroppedLead), 0);
    }
}
