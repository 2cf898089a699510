//! Configured cosmetic descriptors, loaded from YAML documents.
//!
//! One document per kind (hats, back accessories, balloons), each a mapping
//! of item id to its visual/spatial parameters. Descriptors are immutable
//! after load; a reload builds a fresh registry and swaps it wholesale.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::kind::CosmeticKind;

/// Default balloon float height above the player (blocks).
pub const DEFAULT_BALLOON_HEIGHT: f32 = 2.5;

fn default_offset_y() -> f32 {
    0.4
}

fn default_offset_z() -> f32 {
    0.2
}

fn default_material() -> String {
    "AIR".to_string()
}

/// Back-accessory offset as written in config.
#[derive(Debug, Deserialize)]
struct RawPosition {
    #[serde(default)]
    x: f32,
    #[serde(default = "default_offset_y")]
    y: f32,
    #[serde(default = "default_offset_z")]
    z: f32,
}

impl Default for RawPosition {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: default_offset_y(),
            z: default_offset_z(),
        }
    }
}

/// One descriptor entry as written in config.
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(default = "default_material")]
    material: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    lore: Vec<String>,
    #[serde(default)]
    item_model: Option<String>,
    #[serde(default)]
    permission: Option<String>,
    #[serde(default)]
    overlay: Option<String>,
    #[serde(default)]
    position: Option<RawPosition>,
    #[serde(default)]
    height: Option<f32>,
}

/// A validated cosmetic descriptor for one item id.
#[derive(Debug, Clone)]
pub struct CosmeticDescriptor {
    pub id: String,
    pub kind: CosmeticKind,
    /// Item material name, e.g. `"LEATHER_HORSE_ARMOR"`.
    pub material: String,
    /// Display name (may carry `&` color codes).
    pub name: String,
    pub lore: Vec<String>,
    /// Namespaced model key, e.g. `"vanity:crown"`.
    pub item_model: Option<String>,
    /// Permission node required to equip, if any.
    pub permission: Option<String>,
    /// Camera overlay path (hats only), namespaced.
    pub overlay: Option<String>,
    /// Spatial offset for back accessories.
    pub offset: (f32, f32, f32),
    /// Float height for balloons.
    pub height: f32,
}

impl CosmeticDescriptor {
    pub fn has_overlay(&self) -> bool {
        self.overlay.as_deref().is_some_and(|o| !o.is_empty())
    }
}

/// Registry of all configured descriptors, keyed by item id.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    by_id: HashMap<String, CosmeticDescriptor>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one YAML document of descriptors of the given kind and merge it
    /// into the registry.
    ///
    /// Entries with a malformed material are skipped with a warning; a later
    /// `attach` for such an id is a no-op rather than an error. Returns the
    /// number of descriptors accepted.
    pub fn load_document(
        &mut self,
        kind: CosmeticKind,
        yaml: &str,
    ) -> Result<usize, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(0);
        }
        let raw: HashMap<String, RawDescriptor> = serde_yaml::from_str(yaml)?;
        let mut accepted = 0;
        for (id, entry) in raw {
            if !material_is_valid(&entry.material) {
                warn!(
                    id = %id,
                    material = %entry.material,
                    "skipping descriptor with malformed material"
                );
                continue;
            }
            let position = entry.position.unwrap_or_default();
            self.by_id.insert(
                id.clone(),
                CosmeticDescriptor {
                    id,
                    kind,
                    material: entry.material,
                    name: entry.name,
                    lore: entry.lore,
                    item_model: entry.item_model.as_deref().map(namespaced),
                    permission: entry.permission.filter(|p| !p.is_empty()),
                    overlay: entry
                        .overlay
                        .as_deref()
                        .filter(|o| !o.is_empty())
                        .map(namespaced),
                    offset: (position.x, position.y, position.z),
                    height: entry.height.unwrap_or(DEFAULT_BALLOON_HEIGHT),
                },
            );
            accepted += 1;
        }
        Ok(accepted)
    }

    /// Look up a descriptor by item id.
    pub fn descriptor(&self, id: &str) -> Option<&CosmeticDescriptor> {
        self.by_id.get(id)
    }

    /// The kind configured for an item id.
    pub fn kind_of(&self, id: &str) -> Option<CosmeticKind> {
        self.by_id.get(id).map(|d| d.kind)
    }

    /// The permission node configured for an item id, if any.
    pub fn permission_of(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).and_then(|d| d.permission.as_deref())
    }

    /// The configured spatial offset for an item id.
    pub fn offset_of(&self, id: &str) -> Option<(f32, f32, f32)> {
        self.by_id.get(id).map(|d| d.offset)
    }

    /// All known item ids, sorted (for tab completion).
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.by_id.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Material names are SCREAMING_SNAKE_CASE identifiers.
fn material_is_valid(material: &str) -> bool {
    !material.is_empty()
        && material
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Qualify a key with the `minecraft` namespace when none is given.
fn namespaced(key: &str) -> String {
    if key.contains(':') {
        key.to_string()
    } else {
        format!("minecraft:{key}")
    }
}
