//! The Opentrons Flex deck.
//!
//! The Flex addresses positions with a 4x4 grid of slots: working slots
//! A1..D3 and the raised staging slots A4..D4 on the right-hand side. The
//! deck is the root of a resource tree; labware is assigned at slots rather
//! than raw coordinates.

use crate::resource::{Resource, ResourceKind};
use lab_core::{Coordinate, LabError, Result};
use serde::{Deserialize, Serialize};

/// Slot names in assignment order, staging slots last.
pub const SLOT_NAMES: [&str; 16] = [
    "A1", "A2", "A3", "B1", "B2", "B3", "C1", "C2", "C3", "D1", "D2", "D3", "D4", "C4", "B4", "A4",
];

/// Slot origin relative to the deck. Staging slots sit 14.51 mm up.
pub fn slot_location(slot: &str) -> Option<Coordinate> {
    let c = match slot {
        "A1" => Coordinate::new(0.0, 0.0, 0.0),
        "A2" => Coordinate::new(132.5, 0.0, 0.0),
        "A3" => Coordinate::new(265.0, 0.0, 0.0),
        "B1" => Coordinate::new(0.0, 90.5, 0.0),
        "B2" => Coordinate::new(132.5, 90.5, 0.0),
        "B3" => Coordinate::new(265.0, 90.5, 0.0),
        "C1" => Coordinate::new(0.0, 181.0, 0.0),
        "C2" => Coordinate::new(132.5, 181.0, 0.0),
        "C3" => Coordinate::new(265.0, 181.0, 0.0),
        "D1" => Coordinate::new(0.0, 271.5, 0.0),
        "D2" => Coordinate::new(132.5, 271.5, 0.0),
        "D3" => Coordinate::new(265.0, 271.5, 0.0),
        "D4" => Coordinate::new(397.5, 271.5, 14.51),
        "C4" => Coordinate::new(397.5, 181.0, 14.51),
        "B4" => Coordinate::new(397.5, 90.5, 14.51),
        "A4" => Coordinate::new(397.5, 0.0, 14.51),
        _ => return None,
    };
    Some(c)
}

/// Whether a slot is one of the raised staging slots.
pub fn is_staging_slot(slot: &str) -> bool {
    matches!(slot, "A4" | "B4" | "C4" | "D4")
}

/// The Flex robot deck with slot-based assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlexDeck {
    root: Resource,
    /// Resource name occupying each slot, indexed like [`SLOT_NAMES`].
    occupancy: Vec<Option<String>>,
}

impl FlexDeck {
    /// Deck with the fixed trash container pre-assigned at D1.
    pub fn new() -> Self {
        let mut deck = Self::without_trash();
        // All robot operations require the target to have a parent, so the
        // trash area lives inside a container resource.
        let mut trash_container = Resource::generic("trash_container", 172.86, 165.86, 82.0);
        let trash = Resource::new("trash", 172.86, 165.86, 82.0, ResourceKind::Trash);
        // Infallible: fresh container, fresh names.
        let _ = trash_container.assign_child(trash, Coordinate::zero());
        let _ = deck.assign_child_at_slot(trash_container, "D1");
        deck
    }

    /// Deck without the fixed trash (e.g. when a waste chute is installed).
    pub fn without_trash() -> Self {
        Self {
            root: Resource::new("deck", 624.3, 565.2, 900.0, ResourceKind::Deck),
            occupancy: vec![None; SLOT_NAMES.len()],
        }
    }

    pub fn root(&self) -> &Resource {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Resource {
        &mut self.root
    }

    fn slot_index(slot: &str) -> Result<usize> {
        SLOT_NAMES
            .iter()
            .position(|s| *s == slot)
            .ok_or_else(|| LabError::InvalidSlot(slot.to_string()))
    }

    /// Assign a resource at a slot.
    pub fn assign_child_at_slot(&mut self, resource: Resource, slot: &str) -> Result<()> {
        let idx = Self::slot_index(slot)?;
        let location = slot_location(slot).ok_or_else(|| LabError::InvalidSlot(slot.to_string()))?;
        if let Some(existing) = &self.occupancy[idx] {
            return Err(LabError::DuplicateResource(existing.clone()));
        }
        let name = resource.name().to_string();
        self.root.assign_child(resource, location)?;
        self.occupancy[idx] = Some(name);
        Ok(())
    }

    /// Remove a slot-level resource from the deck and return it.
    pub fn unassign_child(&mut self, name: &str) -> Result<Resource> {
        let idx = self
            .occupancy
            .iter()
            .position(|o| o.as_deref() == Some(name))
            .ok_or_else(|| LabError::ResourceNotFound(name.to_string()))?;
        let removed = self.root.unassign_child(name)?;
        self.occupancy[idx] = None;
        Ok(removed)
    }

    /// Slot holding the slot-level ancestor of the named resource.
    ///
    /// Resources nested below a slot-level resource (wells in a plate on a
    /// temperature module) resolve to the slot of their ancestor.
    pub fn slot_of(&self, name: &str) -> Option<&'static str> {
        for (idx, occupant) in self.occupancy.iter().enumerate() {
            let Some(occupant) = occupant.as_deref() else {
                continue;
            };
            if occupant == name
                || self
                    .root
                    .get(occupant)
                    .is_some_and(|r| r.contains(name))
            {
                return Some(SLOT_NAMES[idx]);
            }
        }
        None
    }

    /// Resource occupying a slot, if any.
    pub fn resource_at_slot(&self, slot: &str) -> Option<&Resource> {
        let idx = Self::slot_index(slot).ok()?;
        let name = self.occupancy[idx].as_deref()?;
        self.root.get(name)
    }

    /// Look up any resource on the deck by name.
    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.root.get(name)
    }

    /// Mutable lookup by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Resource> {
        self.root.get_mut(name)
    }

    /// Absolute location of a resource relative to the deck origin.
    pub fn absolute_location(&self, name: &str) -> Option<Coordinate> {
        self.root.absolute_location(name)
    }

    /// ASCII rendering of the deck occupancy.
    ///
    /// ```text
    /// Deck: 624.3mm x 565.2mm
    ///
    /// +-----------------+-----------------+-----------------+-----------------+
    /// |                 |                 |                 |                 |
    /// | D1: trash_co... | D2: Empty       | D3: Empty       | D4: Empty       |
    /// ...
    /// ```
    pub fn summary(&self) -> String {
        let cell = |slot: &str| -> String {
            // Names are arbitrary UTF-8; truncate by characters, not bytes.
            let name = match self.resource_at_slot(slot) {
                Some(r) if r.name().chars().count() > 10 => {
                    let head: String = r.name().chars().take(8).collect();
                    format!("{head}...")
                }
                Some(r) => r.name().to_string(),
                None => "Empty".to_string(),
            };
            format!(" {}: {:<11} ", slot, name)
        };

        let divider = "+-----------------+-----------------+-----------------+-----------------+";
        let spacer = "|                 |                 |                 |                 |";

        let mut out = format!("Deck: {}mm x {}mm\n\n", self.root.size_x(), self.root.size_y());
        out.push_str(divider);
        out.push('\n');
        for row in ["D", "C", "B", "A"] {
            out.push_str(spacer);
            out.push('\n');
            out.push('|');
            for col in 1..=4 {
                out.push_str(&cell(&format!("{row}{col}")));
                out.push('|');
            }
            out.push('\n');
            out.push_str(spacer);
            out.push('\n');
            out.push_str(divider);
            out.push('\n');
        }
        out
    }
}

impl Default for FlexDeck {
    fn default() -> Self {
        Self::new()
    }
}
