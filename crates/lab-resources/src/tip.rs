//! Pipette tip definitions.

use serde::{Deserialize, Serialize};

/// Physical parameters of a pipette tip.
///
/// `fitting_depth` is how far the tip slides onto the pipette cone; robot
/// APIs call this the tip overlap. Lengths in mm, volumes in microliters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    /// Total length of the tip, in mm.
    pub total_length: f64,
    /// Maximum liquid volume, in uL.
    pub maximal_volume: f64,
    /// Overlap between tip and pipette cone, in mm.
    pub fitting_depth: f64,
    /// Whether the tip has an aerosol filter.
    pub has_filter: bool,
}

impl Tip {
    pub fn new(total_length: f64, maximal_volume: f64, fitting_depth: f64, has_filter: bool) -> Self {
        Self {
            total_length,
            maximal_volume,
            fitting_depth,
            has_filter,
        }
    }
}

// =============================================================================
// Hamilton ML STAR tip types
// =============================================================================

/// 10 uL low volume tip, no filter.
pub fn low_volume_tip_no_filter() -> Tip {
    Tip::new(29.9, 10.0, 8.0, false)
}

/// 10 uL low volume tip with filter.
pub fn low_volume_tip_with_filter() -> Tip {
    Tip::new(29.9, 10.0, 8.0, true)
}

/// 300 uL standard volume tip, no filter.
pub fn standard_volume_tip_no_filter() -> Tip {
    Tip::new(59.9, 300.0, 8.0, false)
}

/// 300 uL standard volume tip with filter.
pub fn standard_volume_tip_with_filter() -> Tip {
    Tip::new(59.9, 300.0, 8.0, true)
}

/// 1000 uL high volume tip, no filter.
pub fn high_volume_tip_no_filter() -> Tip {
    Tip::new(95.1, 1000.0, 8.0, false)
}

/// 1000 uL high volume tip with filter.
pub fn high_volume_tip_with_filter() -> Tip {
    Tip::new(95.1, 1000.0, 8.0, true)
}

/// 4 mL tip with filter.
pub fn four_ml_tip_with_filter() -> Tip {
    Tip::new(116.0, 4000.0, 7.55, true)
}

/// 5 mL tip, no filter.
pub fn five_ml_tip() -> Tip {
    Tip::new(116.0, 5000.0, 7.55, false)
}

// =============================================================================
// Opentrons Flex tip types
// =============================================================================

/// Flex 50 uL tip.
pub fn flex_50ul_tip() -> Tip {
    Tip::new(57.9, 50.0, 10.5, false)
}

/// Flex 200 uL tip.
pub fn flex_200ul_tip() -> Tip {
    Tip::new(58.35, 200.0, 10.5, false)
}

/// Flex 1000 uL tip.
pub fn flex_1000ul_tip() -> Tip {
    Tip::new(95.6, 1000.0, 10.5, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_variants_share_geometry() {
        let plain = standard_volume_tip_no_filter();
        let filtered = standard_volume_tip_with_filter();
        assert_eq!(plain.total_length, filtered.total_length);
        assert_eq!(plain.maximal_volume, filtered.maximal_volume);
        assert!(!plain.has_filter);
        assert!(filtered.has_filter);
    }
}
