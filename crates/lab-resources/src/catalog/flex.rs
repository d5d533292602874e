//! Opentrons Flex tip racks.

use crate::grid::GridSpec;
use crate::resource::{Resource, ResourceKind};
use crate::tip::{self, Tip};
use lab_core::Result;

// SBS footprint, A1 at the back-left with 9 mm pitch.
const FLEX_96: GridSpec = GridSpec {
    num_items_x: 12,
    num_items_y: 8,
    dx: 9.9,
    dy: 6.7,
    dz: 0.0,
    item_size_x: 9.0,
    item_size_y: 9.0,
};

fn tiprack(name: &str, size_z: f64, tip: Tip, model: &str) -> Result<Resource> {
    let mut rack = Resource::new(
        name,
        127.76,
        85.48,
        size_z,
        ResourceKind::TipRack {
            num_items_x: FLEX_96.num_items_x,
            num_items_y: FLEX_96.num_items_y,
        },
    )
    .with_model(model);
    rack.attach_grid(FLEX_96, 0.0, || ResourceKind::TipSpot { tip, has_tip: true })?;
    Ok(rack)
}

/// Flex 96 tip rack, 50 uL.
pub fn flex_96_tiprack_50ul(name: &str) -> Result<Resource> {
    tiprack(name, 93.0, tip::flex_50ul_tip(), "opentrons_flex_96_tiprack_50ul")
}

/// Flex 96 tip rack, 200 uL.
pub fn flex_96_tiprack_200ul(name: &str) -> Result<Resource> {
    tiprack(name, 99.0, tip::flex_200ul_tip(), "opentrons_flex_96_tiprack_200ul")
}

/// Flex 96 tip rack, 1000 uL.
pub fn flex_96_tiprack_1000ul(name: &str) -> Result<Resource> {
    tiprack(name, 99.0, tip::flex_1000ul_tip(), "opentrons_flex_96_tiprack_1000ul")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flex_tiprack_200ul() {
        let rack = flex_96_tiprack_200ul("tip_rack_1").unwrap();
        assert_eq!(rack.num_items(), 96);
        assert_eq!(rack.size_x(), 127.76);
        let tip = rack.item("A1").unwrap().tip().unwrap();
        assert_eq!(tip.maximal_volume, 200.0);
        assert_eq!(tip.fitting_depth, 10.5);
    }
}
