//! Cosmetic kind identifiers.

/// The closed set of cosmetic kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CosmeticKind {
    /// Worn in the helmet slot; no auxiliary entity, may carry a camera overlay.
    Hat,
    /// Rigid-follow display entity bound as a passenger of the player.
    #[serde(rename = "backbling")]
    BackAccessory,
    /// Spring-tether pair: a visible balloon plus a leashed anchor.
    Balloon,
    /// A giveable item with no attachment behavior.
    #[serde(rename = "item")]
    Plain,
}

impl CosmeticKind {
    /// Config/tag identifier for this kind.
    pub fn identifier(&self) -> &'static str {
        match self {
            CosmeticKind::Hat => "hat",
            CosmeticKind::BackAccessory => "backbling",
            CosmeticKind::Balloon => "balloon",
            CosmeticKind::Plain => "item",
        }
    }

    /// Parse a kind from its identifier (case-insensitive).
    pub fn from_identifier(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "hat" => Some(CosmeticKind::Hat),
            "backbling" => Some(CosmeticKind::BackAccessory),
            "balloon" => Some(CosmeticKind::Balloon),
            "item" => Some(CosmeticKind::Plain),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_roundtrip() {
        for kind in [
            CosmeticKind::Hat,
            CosmeticKind::BackAccessory,
            CosmeticKind::Balloon,
            CosmeticKind::Plain,
        ] {
            assert_eq!(CosmeticKind::from_identifier(kind.identifier()), Some(kind));
        }
    }

    #[test]
    fn from_identifier_case_insensitive() {
        assert_eq!(
            CosmeticKind::from_identifier("BALLOON"),
            Some(CosmeticKind::Balloon)
        );
    }

    #[test]
    fn from_identifier_unknown_none() {
        assert!(CosmeticKind::from_identifier("cape").is_none());
    }
}
