//! Cosmetic item model: kinds, configured descriptors, and tagged item stacks.
//!
//! Classification is based on tags embedded in the item stack itself, not on
//! the slot it occupies, so it survives inventory moves.

pub mod descriptor;
pub mod error;
pub mod item;
pub mod kind;

pub use descriptor::{CosmeticDescriptor, DescriptorRegistry};
pub use error::ConfigError;
pub use item::{classify, item_id, CosmeticTags, ItemStack};
pub use kind::CosmeticKind;
