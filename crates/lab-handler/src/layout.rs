//! Declarative deck layouts.
//!
//! A layout file maps slots to catalog labware:
//!
//! ```toml
//! [slots]
//! C1 = { kind = "flex_96_tiprack_200ul", name = "tips" }
//! C2 = { kind = "cos_96_ez_wash", name = "plate" }
//! ```
//!
//! Layouts are data, not code: they can be checked in next to a protocol and
//! validated before any robot command runs.

use lab_core::{LabError, Result};
use lab_resources::catalog;
use lab_resources::deck::slot_location;
use lab_resources::{FlexDeck, Resource};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One slot entry in a layout file.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotEntry {
    /// Catalog labware kind, e.g. `"flex_96_tiprack_200ul"` or `"stf_l"`.
    pub kind: String,
    /// Instance name of the resource on the deck.
    pub name: String,
}

/// A deck layout loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct DeckLayout {
    /// Slot name to labware, sorted for deterministic assignment order.
    #[serde(default)]
    pub slots: BTreeMap<String, SlotEntry>,
}

impl DeckLayout {
    /// Parse a layout from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let layout: Self =
            toml::from_str(text).map_err(|e| LabError::Serialization(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read and parse a layout file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        for (slot, entry) in &self.slots {
            if slot_location(slot).is_none() {
                return Err(LabError::InvalidSlot(slot.clone()));
            }
            // Fail on unknown kinds at load time, not mid-protocol.
            build_labware(&entry.kind, &entry.name)?;
        }
        Ok(())
    }

    /// Build a deck with every slot entry assigned.
    pub fn build(&self) -> Result<FlexDeck> {
        let mut deck = FlexDeck::new();
        for (slot, entry) in &self.slots {
            let resource = build_labware(&entry.kind, &entry.name)?;
            deck.assign_child_at_slot(resource, slot)?;
        }
        Ok(deck)
    }
}

/// Construct catalog labware by kind string.
fn build_labware(kind: &str, name: &str) -> Result<Resource> {
    match kind {
        "flex_96_tiprack_50ul" => catalog::flex_96_tiprack_50ul(name),
        "flex_96_tiprack_200ul" => catalog::flex_96_tiprack_200ul(name),
        "flex_96_tiprack_1000ul" => catalog::flex_96_tiprack_1000ul(name),
        // Hamilton racks declared in a layout start fully loaded with tips.
        "stf_l" => catalog::stf_l(name, true),
        "stf_p" => catalog::stf_p(name, true),
        "st_l" => catalog::st_l(name, true),
        "st_p" => catalog::st_p(name, true),
        "htf_l" => catalog::htf_l(name, true),
        "htf_p" => catalog::htf_p(name, true),
        "ht_l" => catalog::ht_l(name, true),
        "ht_p" => catalog::ht_p(name, true),
        "ltf_l" => catalog::ltf_l(name, true),
        "ltf_p" => catalog::ltf_p(name, true),
        "lt_l" => catalog::lt_l(name, true),
        "lt_p" => catalog::lt_p(name, true),
        "four_ml_tf_l" => catalog::four_ml_tf_l(name, true),
        "four_ml_tf_p" => catalog::four_ml_tf_p(name, true),
        "five_ml_t_l" => catalog::five_ml_t_l(name, true),
        "five_ml_t_p" => catalog::five_ml_t_p(name, true),
        "cos_96_ez_wash" => catalog::cos_96_ez_wash(name),
        "tube_rack_24x1500ul" => catalog::tube_rack_24x1500ul(name),
        _ => Err(LabError::Setup(format!("unknown labware kind '{kind}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const LAYOUT: &str = r#"
        [slots]
        C1 = { kind = "flex_96_tiprack_200ul", name = "tips" }
        C2 = { kind = "cos_96_ez_wash", name = "plate" }
    "#;

    #[test]
    fn test_build_from_toml() {
        let layout = DeckLayout::from_toml_str(LAYOUT).unwrap();
        let deck = layout.build().unwrap();
        assert_eq!(deck.slot_of("tips"), Some("C1"));
        assert_eq!(deck.slot_of("plate"), Some("C2"));
        // The fixed trash is still there.
        assert_eq!(deck.slot_of("trash"), Some("D1"));
    }

    #[test]
    fn test_unknown_kind_rejected_at_load() {
        let text = r#"
            [slots]
            C1 = { kind = "imaginary_rack", name = "tips" }
        "#;
        let err = DeckLayout::from_toml_str(text).unwrap_err();
        assert!(matches!(err, LabError::Setup(msg) if msg.contains("imaginary_rack")));
    }

    #[test]
    fn test_invalid_slot_rejected_at_load() {
        let text = r#"
            [slots]
            E9 = { kind = "cos_96_ez_wash", name = "plate" }
        "#;
        let err = DeckLayout::from_toml_str(text).unwrap_err();
        assert!(matches!(err, LabError::InvalidSlot(s) if s == "E9"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = DeckLayout::from_toml_str("[slots").unwrap_err();
        assert!(matches!(err, LabError::Serialization(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LAYOUT.as_bytes()).unwrap();
        let layout = DeckLayout::from_path(file.path()).unwrap();
        assert_eq!(layout.slots.len(), 2);
    }

    #[test]
    fn test_empty_layout() {
        let layout = DeckLayout::from_toml_str("").unwrap();
        let deck = layout.build().unwrap();
        assert_eq!(deck.slot_of("trash"), Some("D1"));
    }
}
