//! Camera-overlay tracking for hats.
//!
//! Hats live in the helmet slot and spawn no auxiliary entity; the only
//! engine state is which overlay each player currently sees, reconciled
//! against the helmet slot on demand.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;
use vanity_item::{classify, item_id, CosmeticKind, DescriptorRegistry, ItemStack};
use vanity_world::ServerWorld;

/// Tracks the active camera overlay per player.
#[derive(Debug, Default)]
pub struct HatOverlayManager {
    active: HashMap<Uuid, String>,
}

impl HatOverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the overlay configured for a hat being equipped. No-op when the
    /// hat has no overlay or the id is unknown.
    pub fn apply(
        &mut self,
        world: &mut ServerWorld,
        registry: &DescriptorRegistry,
        player: Uuid,
        hat: &ItemStack,
    ) {
        if classify(hat) != Some(CosmeticKind::Hat) {
            return;
        }
        let Some(id) = item_id(hat) else {
            return;
        };
        let Some(overlay) = registry
            .descriptor(id)
            .and_then(|d| d.overlay.clone())
            .filter(|o| !o.is_empty())
        else {
            return;
        };
        debug!(%player, %overlay, "applying hat overlay");
        self.active.insert(player, overlay.clone());
        world.set_camera_overlay(player, Some(overlay));
    }

    /// Clear the player's overlay if one is active.
    pub fn remove(&mut self, world: &mut ServerWorld, player: Uuid) {
        if self.active.remove(&player).is_some() {
            debug!(%player, "removing hat overlay");
            world.set_camera_overlay(player, None);
        }
    }

    /// Reconcile the active overlay with whatever sits in the helmet slot.
    pub fn check_and_update(
        &mut self,
        world: &mut ServerWorld,
        registry: &DescriptorRegistry,
        player: Uuid,
    ) {
        let helmet = world
            .player(player)
            .and_then(|p| p.helmet.clone())
            .filter(|h| classify(h) == Some(CosmeticKind::Hat));
        let Some(helmet) = helmet else {
            self.remove(world, player);
            return;
        };

        let configured = item_id(&helmet)
            .and_then(|id| registry.descriptor(id))
            .and_then(|d| d.overlay.clone());
        let active = self.active.get(&player).cloned();

        if configured != active {
            self.remove(world, player);
            if configured.is_some() {
                self.apply(world, registry, player, &helmet);
            }
        }
    }

    /// Re-apply the overlay from the helmet slot (login/world change).
    pub fn restore(
        &mut self,
        world: &mut ServerWorld,
        registry: &DescriptorRegistry,
        player: Uuid,
    ) {
        let helmet = world.player(player).and_then(|p| p.helmet.clone());
        if let Some(helmet) = helmet {
            self.apply(world, registry, player, &helmet);
        }
    }

    pub fn has_overlay(&self, player: Uuid) -> bool {
        self.active.contains_key(&player)
    }

    /// Clear every tracked overlay on plugin disable.
    pub fn shutdown(&mut self, world: &mut ServerWorld) {
        let players: Vec<Uuid> = self.active.keys().copied().collect();
        for player in players {
            self.remove(world, player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanity_world::{ArmorSlot, Location, WorldId};

    const HATS_YAML: &str = r#"
crown:
  material: PAPER
  overlay: "vanity:overlays/crown"
beanie:
  material: PAPER
"#;

    fn setup() -> (ServerWorld, DescriptorRegistry, HatOverlayManager, Uuid) {
        let mut registry = DescriptorRegistry::new();
        registry.load_document(CosmeticKind::Hat, HATS_YAML).unwrap();
        let mut world = ServerWorld::new();
        let player = Uuid::new_v4();
        world.join_player(player, "Steve", Location::new(WorldId::OVERWORLD, 0.0, 64.0, 0.0));
        (world, registry, HatOverlayManager::new(), player)
    }

    #[test]
    fn apply_sets_overlay() {
        let (mut world, registry, mut hats, player) = setup();
        let crown = ItemStack::from_descriptor(&registry, "crown").unwrap();
        hats.apply(&mut world, &registry, player, &crown);
        assert!(hats.has_overlay(player));
        assert_eq!(
            world.player(player).unwrap().camera_overlay.as_deref(),
            Some("vanity:overlays/crown")
        );
    }

    #[test]
    fn hat_without_overlay_is_noop() {
        let (mut world, registry, mut hats, player) = setup();
        let beanie = ItemStack::from_descriptor(&registry, "beanie").unwrap();
        hats.apply(&mut world, &registry, player, &beanie);
        assert!(!hats.has_overlay(player));
    }

    #[test]
    fn removing_helmet_clears_overlay() {
        let (mut world, registry, mut hats, player) = setup();
        let crown = ItemStack::from_descriptor(&registry, "crown").unwrap();
        world
            .player_mut(player)
            .unwrap()
            .set_armor(ArmorSlot::Head, Some(crown.clone()));
        hats.apply(&mut world, &registry, player, &crown);

        world.player_mut(player).unwrap().set_armor(ArmorSlot::Head, None);
        hats.check_and_update(&mut world, &registry, player);
        assert!(!hats.has_overlay(player));
        assert!(world.player(player).unwrap().camera_overlay.is_none());
    }

    #[test]
    fn swapping_hats_swaps_overlay() {
        let (mut world, registry, mut hats, player) = setup();
        let crown = ItemStack::from_descriptor(&registry, "crown").unwrap();
        world
            .player_mut(player)
            .unwrap()
            .set_armor(ArmorSlot::Head, Some(crown.clone()));
        hats.apply(&mut world, &registry, player, &crown);

        // Swap to a hat with no overlay.
        let beanie = ItemStack::from_descriptor(&registry, "beanie").unwrap();
        world
            .player_mut(player)
            .unwrap()
            .set_armor(ArmorSlot::Head, Some(beanie));
        hats.check_and_update(&mut world, &registry, player);
        assert!(!hats.has_overlay(player));
    }

    #[test]
    fn restore_reads_helmet_slot() {
        let (mut world, registry, mut hats, player) = setup();
        let crown = ItemStack::from_descriptor(&registry, "crown").unwrap();
        world
            .player_mut(player)
            .unwrap()
            .set_armor(ArmorSlot::Head, Some(crown));
        hats.restore(&mut world, &registry, player);
        assert!(hats.has_overlay(player));
    }

    #[test]
    fn shutdown_clears_all() {
        let (mut world, registry, mut hats, player) = setup();
        let crown = ItemStack::from_descriptor(&registry, "crown").unwrap();
        hats.apply(&mut world, &registry, player, &crown);
        hats.shutdown(&mut world);
        assert!(!hats.has_overlay(player));
        assert!(world.player(player).unwrap().camera_overlay.is_none());
    }
}
