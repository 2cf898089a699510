//! Online-player table entries.

use std::collections::HashSet;

use uuid::Uuid;
use vanity_item::ItemStack;

use crate::location::Location;

/// Number of main inventory slots.
pub const INVENTORY_SLOTS: usize = 36;

/// Armor slots the cosmetics subsystem cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmorSlot {
    Head,
    Chest,
    Legs,
}

/// An online player as the cosmetics subsystem sees them.
#[derive(Debug)]
pub struct Player {
    pub uuid: Uuid,
    pub name: String,
    pub location: Location,
    pub helmet: Option<ItemStack>,
    pub chestplate: Option<ItemStack>,
    pub leggings: Option<ItemStack>,
    pub inventory: Vec<Option<ItemStack>>,
    /// Hotbar slot currently held (0–8).
    pub held_slot: usize,
    pub permissions: HashSet<String>,
    pub camera_overlay: Option<String>,
}

impl Player {
    pub fn new(uuid: Uuid, name: impl Into<String>, location: Location) -> Self {
        Self {
            uuid,
            name: name.into(),
            location,
            helmet: None,
            chestplate: None,
            leggings: None,
            inventory: vec![None; INVENTORY_SLOTS],
            held_slot: 0,
            permissions: HashSet::new(),
            camera_overlay: None,
        }
    }

    pub fn armor(&self, slot: ArmorSlot) -> Option<&ItemStack> {
        match slot {
            ArmorSlot::Head => self.helmet.as_ref(),
            ArmorSlot::Chest => self.chestplate.as_ref(),
            ArmorSlot::Legs => self.leggings.as_ref(),
        }
    }

    /// Replace an armor slot, returning the previous occupant.
    pub fn set_armor(&mut self, slot: ArmorSlot, item: Option<ItemStack>) -> Option<ItemStack> {
        let target = match slot {
            ArmorSlot::Head => &mut self.helmet,
            ArmorSlot::Chest => &mut self.chestplate,
            ArmorSlot::Legs => &mut self.leggings,
        };
        std::mem::replace(target, item)
    }

    /// Put a stack in the first free inventory slot. Returns `false` if full.
    pub fn add_item(&mut self, item: ItemStack) -> bool {
        for slot in self.inventory.iter_mut() {
            if slot.is_none() {
                *slot = Some(item);
                return true;
            }
        }
        false
    }

    /// Remove the first inventory stack tagged with the given cosmetic id.
    pub fn remove_item_by_id(&mut self, id: &str) -> Option<ItemStack> {
        for slot in self.inventory.iter_mut() {
            if slot
                .as_ref()
                .is_some_and(|item| vanity_item::item_id(item) == Some(id))
            {
                return slot.take();
            }
        }
        None
    }

    pub fn held_item(&self) -> Option<&ItemStack> {
        self.inventory.get(self.held_slot).and_then(|s| s.as_ref())
    }

    pub fn set_held_item(&mut self, item: Option<ItemStack>) {
        if let Some(slot) = self.inventory.get_mut(self.held_slot) {
            *slot = item;
        }
    }

    /// Absent or empty permission nodes are granted to everyone.
    pub fn has_permission(&self, node: &str) -> bool {
        node.is_empty() || self.permissions.contains(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::WorldId;

    fn player() -> Player {
        Player::new(
            Uuid::new_v4(),
            "Steve",
            Location::new(WorldId::OVERWORLD, 0.0, 64.0, 0.0),
        )
    }

    #[test]
    fn armor_swap_returns_previous() {
        let mut p = player();
        assert!(p.set_armor(ArmorSlot::Chest, Some(ItemStack::plain("IRON_CHESTPLATE"))).is_none());
        let prev = p.set_armor(ArmorSlot::Chest, None).unwrap();
        assert_eq!(prev.material, "IRON_CHESTPLATE");
    }

    #[test]
    fn add_item_first_free_slot() {
        let mut p = player();
        p.inventory[0] = Some(ItemStack::plain("DIRT"));
        assert!(p.add_item(ItemStack::plain("STONE")));
        assert_eq!(p.inventory[1].as_ref().unwrap().material, "STONE");
    }

    #[test]
    fn add_item_full_inventory() {
        let mut p = player();
        for slot in p.inventory.iter_mut() {
            *slot = Some(ItemStack::plain("DIRT"));
        }
        assert!(!p.add_item(ItemStack::plain("STONE")));
    }

    #[test]
    fn empty_permission_always_granted() {
        let p = player();
        assert!(p.has_permission(""));
        assert!(!p.has_permission("vanity.balloon.red"));
    }

    #[test]
    fn held_item_tracks_slot() {
        let mut p = player();
        p.held_slot = 2;
        p.inventory[2] = Some(ItemStack::plain("LEAD"));
        assert_eq!(p.held_item().unwrap().material, "LEAD");
    }
}
