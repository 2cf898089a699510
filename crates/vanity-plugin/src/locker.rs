//! Per-player cosmetic storage: a 9-slot UI model with dedicated
//! back-accessory and balloon slots, persisted across sessions.
//!
//! The locker is one of the two interchangeable equipment sources the
//! engine can reconcile against (the other being armor slots).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vanity_engine::EquipmentSource;
use vanity_item::{classify, CosmeticKind, ItemStack};
use vanity_world::ServerWorld;

pub const LOCKER_SLOTS: usize = 9;
pub const BACK_SLOT: usize = 3;
pub const BALLOON_SLOT: usize = 5;

fn placeholder_for(slot: usize) -> ItemStack {
    match slot {
        BACK_SLOT => ItemStack::placeholder_pane("BLUE_STAINED_GLASS_PANE", "Backbling Slot"),
        BALLOON_SLOT => {
            ItemStack::placeholder_pane("LIGHT_BLUE_STAINED_GLASS_PANE", "Balloon Slot")
        }
        _ => ItemStack::placeholder_pane("BLACK_STAINED_GLASS_PANE", ""),
    }
}

fn default_slots() -> Vec<ItemStack> {
    (0..LOCKER_SLOTS).map(placeholder_for).collect()
}

fn slot_for(kind: CosmeticKind) -> Option<usize> {
    match kind {
        CosmeticKind::BackAccessory => Some(BACK_SLOT),
        CosmeticKind::Balloon => Some(BALLOON_SLOT),
        _ => None,
    }
}

/// On-disk shape of one player's locker.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedLocker {
    #[serde(default)]
    back_accessory: Option<ItemStack>,
    #[serde(default)]
    balloon: Option<ItemStack>,
}

/// In-memory lockers for online players.
#[derive(Debug, Default)]
pub struct CosmeticLocker {
    lockers: HashMap<Uuid, Vec<ItemStack>>,
}

impl CosmeticLocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The player's locker contents (created on first access).
    pub fn slots(&mut self, player: Uuid) -> &[ItemStack] {
        self.lockers.entry(player).or_insert_with(default_slots)
    }

    /// The stored cosmetic of the given kind, if the slot holds one.
    pub fn get(&self, player: Uuid, kind: CosmeticKind) -> Option<&ItemStack> {
        let slot = slot_for(kind)?;
        self.lockers
            .get(&player)
            .and_then(|slots| slots.get(slot))
            .filter(|item| !item.placeholder)
    }

    /// Store a cosmetic, returning any previous occupant to the player's
    /// inventory.
    pub fn set(&mut self, world: &mut ServerWorld, player: Uuid, kind: CosmeticKind, item: ItemStack) {
        let Some(slot) = slot_for(kind) else {
            return;
        };
        let slots = self.lockers.entry(player).or_insert_with(default_slots);
        let previous = std::mem::replace(&mut slots[slot], item);
        if !previous.placeholder {
            if let Some(p) = world.player_mut(player) {
                p.add_item(previous);
            }
        }
    }

    /// Clear a slot back to its placeholder, returning the occupant to the
    /// player's inventory.
    pub fn remove(&mut self, world: &mut ServerWorld, player: Uuid, kind: CosmeticKind) {
        let Some(slot) = slot_for(kind) else {
            return;
        };
        let Some(slots) = self.lockers.get_mut(&player) else {
            return;
        };
        let previous = std::mem::replace(&mut slots[slot], placeholder_for(slot));
        if !previous.placeholder {
            if let Some(p) = world.player_mut(player) {
                p.add_item(previous);
            }
        }
    }

    /// Drop the in-memory locker on quit (after saving).
    pub fn evict(&mut self, player: Uuid) {
        self.lockers.remove(&player);
    }

    fn player_file(data_dir: &Path, player: Uuid) -> PathBuf {
        data_dir.join("players").join(format!("{player}.yml"))
    }

    /// Persist a player's locker. An empty locker removes the file.
    pub fn save_player(&self, data_dir: &Path, player: Uuid) -> std::io::Result<()> {
        let saved = SavedLocker {
            back_accessory: self.get(player, CosmeticKind::BackAccessory).cloned(),
            balloon: self.get(player, CosmeticKind::Balloon).cloned(),
        };
        let path = Self::player_file(data_dir, player);
        if saved.back_accessory.is_none() && saved.balloon.is_none() {
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
            return Ok(());
        }
        std::fs::create_dir_all(path.parent().expect("player file has a parent"))?;
        let yaml = serde_yaml::to_string(&saved).map_err(std::io::Error::other)?;
        std::fs::write(&path, yaml)
    }

    /// Load a player's locker from disk. Returns `false` when nothing was
    /// saved or the file is unreadable.
    pub fn load_player(&mut self, data_dir: &Path, player: Uuid) -> bool {
        let path = Self::player_file(data_dir, player);
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return false;
        };
        let Ok(saved) = serde_yaml::from_str::<SavedLocker>(&contents) else {
            return false;
        };
        let slots = self.lockers.entry(player).or_insert_with(default_slots);
        if let Some(item) = saved.back_accessory {
            slots[BACK_SLOT] = item;
        }
        if let Some(item) = saved.balloon {
            slots[BALLOON_SLOT] = item;
        }
        true
    }
}

impl EquipmentSource for CosmeticLocker {
    fn cosmetic(&self, _world: &ServerWorld, player: Uuid, kind: CosmeticKind) -> Option<ItemStack> {
        self.get(player, kind)
            .filter(|item| classify(item) == Some(kind))
            .cloned()
    }
}
