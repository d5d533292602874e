//! Labware definition documents for the robot's HTTP API.
//!
//! The robot only understands labware it has a definition for, so every
//! assigned resource is converted to a schema-2 labware definition before it
//! is loaded. All children are described as "wells", tip spots included; the
//! robot requires well-like attributes such as `totalLiquidVolume` even on
//! tip racks.

use lab_resources::{Resource, ResourceKind};
use serde_json::{json, Value};

fn display_category(resource: &Resource) -> &'static str {
    match resource.kind() {
        ResourceKind::Plate { .. } => "wellPlate",
        ResourceKind::TipRack { .. } => "tipRack",
        _ => "other",
    }
}

fn well_volume(child: &Resource) -> f64 {
    if let Some(tip) = child.tip() {
        return tip.maximal_volume;
    }
    if let Some(tracker) = child.tracker() {
        return tracker.max_volume();
    }
    child.size_x() * child.size_y() * child.size_z()
}

/// Build a schema-2 labware definition for a resource and its children.
pub fn definition(resource: &Resource) -> Value {
    let category = display_category(resource);
    let is_tiprack = matches!(resource.kind(), ResourceKind::TipRack { .. });

    let well_names: Vec<&str> = resource.children().iter().map(Resource::name).collect();

    // Children are stored column by column; the definition's ordering is a
    // list of columns.
    let ordering: Value = match resource.grid_dims() {
        Some((_, ny)) if ny > 0 => well_names
            .chunks(ny)
            .map(|col| json!(col))
            .collect::<Vec<_>>()
            .into(),
        _ => json!([well_names]),
    };

    let format = match resource.grid_dims() {
        Some((nx, ny)) if nx * ny == 96 => "96Standard",
        Some((nx, ny)) if nx * ny == 384 => "384Standard",
        _ => "irregular",
    };

    let (tip_length, tip_overlap) = resource
        .children()
        .first()
        .and_then(Resource::tip)
        .map_or((0.0, 0.0), |tip| (tip.total_length, tip.fitting_depth));

    let wells: Value = resource
        .children()
        .iter()
        .map(|child| {
            let loc = child.location().unwrap_or_default();
            (
                child.name().to_string(),
                json!({
                    "depth": child.size_z(),
                    "x": loc.x,
                    "y": loc.y,
                    "z": loc.z,
                    "shape": "circular",
                    // The inscribed circle's diameter is the well width.
                    "diameter": child.size_x(),
                    "totalLiquidVolume": well_volume(child),
                }),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into();

    json!({
        "schemaVersion": 2,
        "version": 1,
        "namespace": "lab",
        "metadata": {
            "displayName": resource.name(),
            "displayCategory": category,
            "displayVolumeUnits": "\u{b5}L",
        },
        "brand": {
            "brand": "unknown",
        },
        "parameters": {
            "format": format,
            "isTiprack": is_tiprack,
            "tipLength": tip_length,
            "tipOverlap": tip_overlap,
            "loadName": resource.name(),
            "isMagneticModuleCompatible": false,
        },
        "ordering": ordering,
        "cornerOffsetFromSlot": { "x": 0.0, "y": 0.0, "z": 0.0 },
        "dimensions": {
            "xDimension": resource.size_x(),
            "yDimension": resource.size_y(),
            "zDimension": resource.size_z(),
        },
        "wells": wells,
        "groups": [
            {
                "wells": well_names,
                "metadata": {
                    "displayName": "all wells",
                    "displayCategory": category,
                    "wellBottomShape": "flat",
                },
            }
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_resources::catalog::{cos_96_ez_wash, flex_96_tiprack_200ul, tube_rack_24x1500ul};

    #[test]
    fn test_tip_rack_definition() {
        let rack = flex_96_tiprack_200ul("tips").unwrap();
        let def = definition(&rack);

        assert_eq!(def["parameters"]["format"], "96Standard");
        assert_eq!(def["parameters"]["isTiprack"], true);
        assert_eq!(def["parameters"]["tipLength"], 58.35);
        assert_eq!(def["parameters"]["tipOverlap"], 10.5);
        assert_eq!(def["metadata"]["displayCategory"], "tipRack");
        assert_eq!(def["parameters"]["loadName"], "tips");

        // Column-major ordering: 12 columns of 8.
        let ordering = def["ordering"].as_array().unwrap();
        assert_eq!(ordering.len(), 12);
        assert_eq!(ordering[0].as_array().unwrap().len(), 8);
        assert_eq!(ordering[0][0], "tips_A1");
        assert_eq!(ordering[0][7], "tips_H1");
        assert_eq!(ordering[11][0], "tips_A12");

        // Tip spots report the tip volume.
        assert_eq!(def["wells"]["tips_A1"]["totalLiquidVolume"], 200.0);
    }

    #[test]
    fn test_plate_definition() {
        let plate = cos_96_ez_wash("plate").unwrap();
        let def = definition(&plate);

        assert_eq!(def["metadata"]["displayCategory"], "wellPlate");
        assert_eq!(def["parameters"]["isTiprack"], false);
        assert_eq!(def["parameters"]["tipLength"], 0.0);
        // Wells report the tracker capacity.
        assert_eq!(def["wells"]["plate_A1"]["totalLiquidVolume"], 250.0);
        assert_eq!(def["wells"]["plate_A1"]["shape"], "circular");
    }

    #[test]
    fn test_non_96_format_is_irregular() {
        let rack = tube_rack_24x1500ul("tubes").unwrap();
        let def = definition(&rack);
        assert_eq!(def["parameters"]["format"], "irregular");
        assert_eq!(def["metadata"]["displayCategory"], "other");
    }
}
