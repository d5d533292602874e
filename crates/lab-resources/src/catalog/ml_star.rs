//! Hamilton ML STAR tip racks.
//!
//! Naming follows the vendor catalog: `stf` = standard volume tip with
//! filter, `ht` = high volume tip, `lt` = low volume tip; `_l` landscape,
//! `_p` portrait (landscape rotated 90 degrees).

use crate::grid::GridSpec;
use crate::resource::{Resource, ResourceKind};
use crate::tip::{
    self, Tip,
};
use lab_core::Result;

const RACK_96: GridSpec = GridSpec {
    num_items_x: 12,
    num_items_y: 8,
    dx: 7.2,
    dy: 5.3,
    dz: 0.0, // per-rack dz set below
    item_size_x: 9.0,
    item_size_y: 9.0,
};

const RACK_24: GridSpec = GridSpec {
    num_items_x: 6,
    num_items_y: 4,
    dx: 7.3,
    dy: 5.2,
    dz: -93.2,
    item_size_x: 18.0,
    item_size_y: 18.0,
};

fn rack(
    name: &str,
    size_z: f64,
    spec: GridSpec,
    tip: Tip,
    with_tips: bool,
    model: &str,
) -> Result<Resource> {
    let mut rack = Resource::new(
        name,
        122.4,
        82.6,
        size_z,
        ResourceKind::TipRack {
            num_items_x: spec.num_items_x,
            num_items_y: spec.num_items_y,
        },
    )
    .with_model(model);
    rack.attach_grid(spec, 0.0, || ResourceKind::TipSpot {
        tip,
        has_tip: with_tips,
    })?;
    Ok(rack)
}

/// Rack with 96 300 uL standard volume tips with filter.
pub fn stf_l(name: &str, with_tips: bool) -> Result<Resource> {
    rack(
        name,
        20.0,
        GridSpec { dz: -50.5, ..RACK_96 },
        tip::standard_volume_tip_with_filter(),
        with_tips,
        "STF_L",
    )
}

/// `stf_l` in portrait orientation.
pub fn stf_p(name: &str, with_tips: bool) -> Result<Resource> {
    Ok(stf_l(name, with_tips)?.rotated_90())
}

/// Rack with 96 300 uL standard volume tips.
pub fn st_l(name: &str, with_tips: bool) -> Result<Resource> {
    rack(
        name,
        20.0,
        GridSpec { dz: -50.5, ..RACK_96 },
        tip::standard_volume_tip_no_filter(),
        with_tips,
        "ST_L",
    )
}

/// `st_l` in portrait orientation.
pub fn st_p(name: &str, with_tips: bool) -> Result<Resource> {
    Ok(st_l(name, with_tips)?.rotated_90())
}

/// Rack with 96 1000 uL high volume tips with filter.
pub fn htf_l(name: &str, with_tips: bool) -> Result<Resource> {
    rack(
        name,
        20.0,
        GridSpec { dz: -83.5, ..RACK_96 },
        tip::high_volume_tip_with_filter(),
        with_tips,
        "HTF_L",
    )
}

/// `htf_l` in portrait orientation.
pub fn htf_p(name: &str, with_tips: bool) -> Result<Resource> {
    Ok(htf_l(name, with_tips)?.rotated_90())
}

/// Rack with 96 1000 uL high volume tips.
pub fn ht_l(name: &str, with_tips: bool) -> Result<Resource> {
    rack(
        name,
        20.0,
        GridSpec { dz: -83.5, ..RACK_96 },
        tip::high_volume_tip_no_filter(),
        with_tips,
        "HT_L",
    )
}

/// `ht_l` in portrait orientation.
pub fn ht_p(name: &str, with_tips: bool) -> Result<Resource> {
    Ok(ht_l(name, with_tips)?.rotated_90())
}

/// Rack with 96 10 uL low volume tips with filter.
pub fn ltf_l(name: &str, with_tips: bool) -> Result<Resource> {
    rack(
        name,
        20.0,
        GridSpec { dz: -22.5, ..RACK_96 },
        tip::low_volume_tip_with_filter(),
        with_tips,
        "LTF_L",
    )
}

/// `ltf_l` in portrait orientation.
pub fn ltf_p(name: &str, with_tips: bool) -> Result<Resource> {
    Ok(ltf_l(name, with_tips)?.rotated_90())
}

/// Rack with 96 10 uL low volume tips.
pub fn lt_l(name: &str, with_tips: bool) -> Result<Resource> {
    rack(
        name,
        20.0,
        GridSpec { dz: -22.5, ..RACK_96 },
        tip::low_volume_tip_no_filter(),
        with_tips,
        "LT_L",
    )
}

/// `lt_l` in portrait orientation.
pub fn lt_p(name: &str, with_tips: bool) -> Result<Resource> {
    Ok(lt_l(name, with_tips)?.rotated_90())
}

/// Rack with 24 4 mL tips with filter.
pub fn four_ml_tf_l(name: &str, with_tips: bool) -> Result<Resource> {
    rack(
        name,
        7.0,
        RACK_24,
        tip::four_ml_tip_with_filter(),
        with_tips,
        "FourmlTF_L",
    )
}

/// `four_ml_tf_l` in portrait orientation.
pub fn four_ml_tf_p(name: &str, with_tips: bool) -> Result<Resource> {
    Ok(four_ml_tf_l(name, with_tips)?.rotated_90())
}

/// Rack with 24 5 mL tips.
pub fn five_ml_t_l(name: &str, with_tips: bool) -> Result<Resource> {
    rack(name, 7.0, RACK_24, tip::five_ml_tip(), with_tips, "FivemlT_L")
}

/// `five_ml_t_l` in portrait orientation.
pub fn five_ml_t_p(name: &str, with_tips: bool) -> Result<Resource> {
    Ok(five_ml_t_l(name, with_tips)?.rotated_90())
}
