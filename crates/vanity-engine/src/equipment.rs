//! The equipment source-of-truth boundary.
//!
//! "Should an attachment exist" is answered only by the equipment source;
//! registry records are derived caches reconciled toward it every tick.

use uuid::Uuid;
use vanity_item::{classify, CosmeticKind, ItemStack};
use vanity_world::{ArmorSlot, ServerWorld};

/// Where equipped cosmetics live. The registries never care whether this is
/// an armor slot or a storage-UI slot, only that it is queryable.
pub trait EquipmentSource {
    /// The cosmetic currently equipped for `kind`, if any.
    fn cosmetic(&self, world: &ServerWorld, player: Uuid, kind: CosmeticKind) -> Option<ItemStack>;
}

/// Armor-slot-backed equipment: hats in the helmet slot, back accessories in
/// the chestplate slot, balloons in the leggings slot.
#[derive(Debug, Default)]
pub struct ArmorEquipment;

impl ArmorEquipment {
    /// The armor slot a kind occupies, if it occupies one at all.
    pub fn slot_for(kind: CosmeticKind) -> Option<ArmorSlot> {
        match kind {
            CosmeticKind::Hat => Some(ArmorSlot::Head),
            CosmeticKind::BackAccessory => Some(ArmorSlot::Chest),
            CosmeticKind::Balloon => Some(ArmorSlot::Legs),
            CosmeticKind::Plain => None,
        }
    }
}

impl EquipmentSource for ArmorEquipment {
    fn cosmetic(&self, world: &ServerWorld, player: Uuid, kind: CosmeticKind) -> Option<ItemStack> {
        let slot = Self::slot_for(kind)?;
        let item = world.player(player)?.armor(slot)?;
        if classify(item) == Some(kind) {
            Some(item.clone())
        } else {
            None
        }
    }
}
