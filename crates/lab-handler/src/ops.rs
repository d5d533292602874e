//! Resolved liquid-handling operations.
//!
//! The frontend translates user intent ("aspirate 100 uL from A1 of
//! `plate`") into these structs before handing them to a backend. Every
//! operation carries the target's name, its parent labware's name, and the
//! absolute deck location, so backends need no access to the resource tree.

use lab_core::Coordinate;
use lab_resources::Tip;
use serde::{Deserialize, Serialize};

/// Pick up one tip with one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    /// Name of the tip spot.
    pub resource: String,
    /// Name of the tip rack holding the spot.
    pub labware: String,
    /// Absolute location of the spot on the deck.
    pub location: Coordinate,
    /// Optional offset applied by the backend.
    pub offset: Option<Coordinate>,
    /// The tip being picked up.
    pub tip: Tip,
}

/// Drop one tip from one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drop {
    /// Name of the target tip spot, or `"trash"`.
    pub resource: String,
    /// Name of the labware holding the target.
    pub labware: String,
    /// Absolute location of the target.
    pub location: Coordinate,
    pub offset: Option<Coordinate>,
    /// The tip being dropped.
    pub tip: Tip,
}

/// Aspirate liquid with one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspiration {
    /// Name of the well or tube.
    pub resource: String,
    /// Name of the plate or rack holding it.
    pub labware: String,
    /// Absolute location of the container.
    pub location: Coordinate,
    pub offset: Option<Coordinate>,
    /// Volume in uL.
    pub volume: f64,
    /// Flow rate in uL/s; `None` uses the backend default for the pipette.
    pub flow_rate: Option<f64>,
}

/// Dispense liquid with one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispense {
    /// Name of the well or tube.
    pub resource: String,
    /// Name of the plate or rack holding it.
    pub labware: String,
    /// Absolute location of the container.
    pub location: Coordinate,
    pub offset: Option<Coordinate>,
    /// Volume in uL.
    pub volume: f64,
    /// Flow rate in uL/s; `None` uses the backend default for the pipette.
    pub flow_rate: Option<f64>,
    /// Extra plunger push-out volume in uL after the dispense.
    pub push_out: Option<f64>,
}

/// Pick up a full rack of tips with the 96-head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupTipRack {
    /// Name of the tip rack.
    pub resource: String,
    pub location: Coordinate,
}

/// Drop a full rack of tips with the 96-head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTipRack {
    /// Name of the tip rack.
    pub resource: String,
    pub location: Coordinate,
}

/// Aspirate from every well of a plate with the 96-head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspirationPlate {
    /// Name of the plate.
    pub resource: String,
    pub location: Coordinate,
    /// Volume in uL, per well.
    pub volume: f64,
    pub flow_rate: Option<f64>,
}

/// Dispense into every well of a plate with the 96-head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispensePlate {
    /// Name of the plate.
    pub resource: String,
    pub location: Coordinate,
    /// Volume in uL, per well.
    pub volume: f64,
    pub flow_rate: Option<f64>,
}

/// Move a piece of labware to another deck slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Name of the labware being moved.
    pub resource: String,
    /// Destination slot name.
    pub to_slot: String,
    /// Absolute location of the destination slot.
    pub to_location: Coordinate,
    pub pickup_offset: Option<Coordinate>,
    pub drop_offset: Option<Coordinate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_resources::tip::standard_volume_tip_no_filter;

    #[test]
    fn test_ops_serialize() {
        let op = Pickup {
            resource: "tips_A1".into(),
            labware: "tips".into(),
            location: Coordinate::new(9.9, 69.7, 0.0),
            offset: None,
            tip: standard_volume_tip_no_filter(),
        };
        let json = serde_json::to_string(&op).unwrap();
        let back: Pickup = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }
}
