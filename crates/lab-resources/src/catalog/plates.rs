//! Microplates and tube racks.

use crate::grid::GridSpec;
use crate::resource::{Resource, ResourceKind};
use lab_core::{Result, VolumeTracker};

/// Corning Costar 96-well EZ Wash plate (flat bottom, 250 uL wells).
pub fn cos_96_ez_wash(name: &str) -> Result<Resource> {
    let spec = GridSpec {
        num_items_x: 12,
        num_items_y: 8,
        dx: 10.55,
        dy: 7.35,
        dz: 1.0,
        item_size_x: 9.0,
        item_size_y: 9.0,
    };
    let mut plate = Resource::new(
        name,
        127.0,
        86.0,
        14.5,
        ResourceKind::Plate {
            num_items_x: spec.num_items_x,
            num_items_y: spec.num_items_y,
        },
    )
    .with_model("Cos_96_EZWash");
    plate.attach_grid(spec, 10.67, || ResourceKind::Well {
        tracker: VolumeTracker::new(250.0),
    })?;
    Ok(plate)
}

/// 24-position tube rack for 1.5 mL tubes.
pub fn tube_rack_24x1500ul(name: &str) -> Result<Resource> {
    let spec = GridSpec {
        num_items_x: 6,
        num_items_y: 4,
        dx: 9.0,
        dy: 6.0,
        dz: 2.0,
        item_size_x: 19.0,
        item_size_y: 19.0,
    };
    let mut rack = Resource::new(
        name,
        127.0,
        86.0,
        80.0,
        ResourceKind::TubeRack {
            num_items_x: spec.num_items_x,
            num_items_y: spec.num_items_y,
        },
    )
    .with_model("tube_rack_24x1500ul");
    rack.attach_grid(spec, 39.0, || ResourceKind::Tube {
        tracker: VolumeTracker::new(1500.0),
    })?;
    Ok(rack)
}
