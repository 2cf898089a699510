//! Runtime item stacks carrying embedded cosmetic tags.
//!
//! The tags travel with the stack wherever it moves (hotbar, armor slot,
//! storage UI), so classification never depends on the slot an item sits in.

use serde::{Deserialize, Serialize};

use crate::descriptor::DescriptorRegistry;
use crate::kind::CosmeticKind;

/// Persistent tags identifying a stack as a cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosmeticTags {
    /// Config id the stack was built from.
    pub item_id: String,
    pub kind: CosmeticKind,
    #[serde(default)]
    pub has_overlay: bool,
    #[serde(default)]
    pub overlay_path: Option<String>,
}

/// An item stack as the cosmetics subsystem sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub item_model: Option<String>,
    /// Cosmetic tags; `None` for plain server items.
    #[serde(default)]
    pub cosmetic: Option<CosmeticTags>,
    /// All tooltip flags hidden (set on every built cosmetic).
    #[serde(default)]
    pub tooltips_hidden: bool,
    /// Armor attribute pinned to zero (armor-material cosmetics only).
    #[serde(default)]
    pub zero_armor: bool,
    /// Marker for storage-UI filler panes.
    #[serde(default)]
    pub placeholder: bool,
}

impl ItemStack {
    /// A plain, untagged stack of the given material.
    pub fn plain(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            name: String::new(),
            lore: Vec::new(),
            item_model: None,
            cosmetic: None,
            tooltips_hidden: false,
            zero_armor: false,
            placeholder: false,
        }
    }

    /// A storage-UI filler pane.
    pub fn placeholder_pane(material: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            name: name.into(),
            lore: Vec::new(),
            item_model: None,
            cosmetic: None,
            tooltips_hidden: false,
            zero_armor: false,
            placeholder: true,
        }
    }

    /// Build a tagged cosmetic stack from a configured descriptor.
    ///
    /// Returns `None` for unknown ids; the caller treats absence as
    /// "do nothing".
    pub fn from_descriptor(registry: &DescriptorRegistry, id: &str) -> Option<Self> {
        let desc = registry.descriptor(id)?;
        Some(Self {
            material: desc.material.clone(),
            name: desc.name.clone(),
            lore: desc.lore.clone(),
            item_model: desc.item_model.clone(),
            cosmetic: Some(CosmeticTags {
                item_id: desc.id.clone(),
                kind: desc.kind,
                has_overlay: desc.has_overlay(),
                overlay_path: desc.overlay.clone(),
            }),
            tooltips_hidden: true,
            zero_armor: is_armor_material(&desc.material),
            placeholder: false,
        })
    }
}

/// Classify a stack by its embedded tags.
pub fn classify(item: &ItemStack) -> Option<CosmeticKind> {
    item.cosmetic.as_ref().map(|t| t.kind)
}

/// The cosmetic id embedded in a stack, if any.
pub fn item_id(item: &ItemStack) -> Option<&str> {
    item.cosmetic.as_ref().map(|t| t.item_id.as_str())
}

/// Whether a stack is a cosmetic of the given kind.
pub fn is_kind(item: &ItemStack, kind: CosmeticKind) -> bool {
    classify(item) == Some(kind)
}

/// Materials that render as armor and need their armor attribute zeroed.
fn is_armor_material(material: &str) -> bool {
    material.contains("LEATHER")
        || material.ends_with("_HELMET")
        || material.ends_with("_CHESTPLATE")
        || material.ends_with("_LEGGINGS")
        || material.ends_with("_BOOTS")
        || material.ends_with("_HORSE_ARMOR")
}
