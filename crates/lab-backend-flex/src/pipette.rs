//! Mounted pipettes and their volume and flow-rate characteristics.

use std::fmt;

/// Pipette mount position on the gantry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mount {
    Left,
    Right,
}

impl fmt::Display for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mount::Left => write!(f, "left"),
            Mount::Right => write!(f, "right"),
        }
    }
}

/// A pipette loaded into the current run.
#[derive(Debug, Clone)]
pub struct Pipette {
    /// Run-scoped id assigned by the robot.
    pub id: String,
    /// Model name, e.g. `"p1000_single_flex"`.
    pub name: String,
    /// Whether a tip is currently mounted.
    pub has_tip: bool,
}

/// Working volume of a pipette model, in uL.
///
/// The Flex 1000 uL pipettes are listed at 200 uL: with the tips this
/// backend defines they are driven in their 200 uL regime.
pub fn max_volume(name: &str) -> Option<f64> {
    let v = match name {
        "p10_single" | "p10_multi" => 10.0,
        "p20_single_gen2" | "p20_multi_gen2" => 20.0,
        "p50_single" | "p50_multi" => 50.0,
        "p300_single" | "p300_multi" | "p300_single_gen2" | "p300_multi_gen2"
        | "p300_single_gen3" => 300.0,
        "p1000_single" | "p1000_single_gen2" | "p1000_single_gen3" => 1000.0,
        "p1000_single_flex" | "p1000_multi_flex" => 200.0,
        _ => return None,
    };
    Some(v)
}

/// Default aspiration flow rate per pipette model, in uL/s.
///
/// Vendor defaults; see https://archive.ph/ZUN9f.
pub fn default_aspirate_flow_rate(name: &str) -> Option<f64> {
    let v = match name {
        "p10_single" | "p10_multi" => 5.0,
        "p50_single" | "p50_multi" => 25.0,
        "p300_single" | "p300_multi" => 150.0,
        "p1000_single" => 500.0,
        "p20_single_gen2" => 3.78,
        "p20_multi_gen2" => 7.6,
        "p300_single_gen2" => 46.43,
        "p300_multi_gen2" => 94.0,
        "p1000_single_gen2" => 137.35,
        "p1000_single_flex" | "p1000_multi_flex" => 137.35,
        _ => return None,
    };
    Some(v)
}

/// Default dispense flow rate per pipette model, in uL/s.
pub fn default_dispense_flow_rate(name: &str) -> Option<f64> {
    let v = match name {
        "p10_single" | "p10_multi" => 10.0,
        "p50_single" | "p50_multi" => 50.0,
        "p300_single" | "p300_multi" => 300.0,
        "p1000_single" => 1000.0,
        "p20_single_gen2" => 7.56,
        "p20_multi_gen2" => 7.6,
        "p300_single_gen2" => 92.86,
        "p300_multi_gen2" => 94.0,
        "p1000_single_gen2" => 274.7,
        "p1000_single_flex" | "p1000_multi_flex" => 274.7,
        _ => return None,
    };
    Some(v)
}

/// The pipettes mounted on the gantry for the current run.
#[derive(Debug, Clone, Default)]
pub struct PipetteHead {
    pub left: Option<Pipette>,
    pub right: Option<Pipette>,
}

impl PipetteHead {
    pub fn num_channels(&self) -> usize {
        [&self.left, &self.right]
            .into_iter()
            .filter(|p| p.is_some())
            .count()
    }

    pub fn get(&self, mount: Mount) -> Option<&Pipette> {
        match mount {
            Mount::Left => self.left.as_ref(),
            Mount::Right => self.right.as_ref(),
        }
    }

    pub fn get_mut(&mut self, mount: Mount) -> Option<&mut Pipette> {
        match mount {
            Mount::Left => self.left.as_mut(),
            Mount::Right => self.right.as_mut(),
        }
    }

    /// Mount of the pipette with the given run-scoped id.
    pub fn mount_of(&self, pipette_id: &str) -> Option<Mount> {
        if self.left.as_ref().is_some_and(|p| p.id == pipette_id) {
            return Some(Mount::Left);
        }
        if self.right.as_ref().is_some_and(|p| p.id == pipette_id) {
            return Some(Mount::Right);
        }
        None
    }

    /// Select a pipette for a tip pickup or drop.
    ///
    /// The pipette's working volume must match the tip volume exactly and
    /// its tip state must match `with_tip`. The left mount wins ties.
    pub fn select_for_tip(&self, tip_max_volume: f64, with_tip: bool) -> Option<Mount> {
        for (mount, pipette) in [(Mount::Left, &self.left), (Mount::Right, &self.right)] {
            let Some(p) = pipette else { continue };
            if max_volume(&p.name) == Some(tip_max_volume) && p.has_tip == with_tip {
                return Some(mount);
            }
        }
        None
    }

    /// Select a pipette for an aspiration or dispense.
    ///
    /// Only pipettes with a tip mounted and a working volume of at least
    /// `volume` qualify. The left mount wins ties.
    pub fn select_for_liquid(&self, volume: f64) -> Option<Mount> {
        for (mount, pipette) in [(Mount::Left, &self.left), (Mount::Right, &self.right)] {
            let Some(p) = pipette else { continue };
            if p.has_tip && max_volume(&p.name).is_some_and(|v| v >= volume) {
                return Some(mount);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head() -> PipetteHead {
        PipetteHead {
            left: Some(Pipette {
                id: "pip-left".into(),
                name: "p1000_single_flex".into(),
                has_tip: false,
            }),
            right: Some(Pipette {
                id: "pip-right".into(),
                name: "p50_single".into(),
                has_tip: false,
            }),
        }
    }

    #[test]
    fn test_tip_selection_matches_volume_exactly() {
        let head = head();
        assert_eq!(head.select_for_tip(200.0, false), Some(Mount::Left));
        assert_eq!(head.select_for_tip(50.0, false), Some(Mount::Right));
        // No pipette takes a 300 uL tip.
        assert_eq!(head.select_for_tip(300.0, false), None);
        // Nothing has a tip yet.
        assert_eq!(head.select_for_tip(200.0, true), None);
    }

    #[test]
    fn test_liquid_selection_requires_tip() {
        let mut head = head();
        assert_eq!(head.select_for_liquid(100.0), None);

        head.right.as_mut().unwrap().has_tip = true;
        assert_eq!(head.select_for_liquid(30.0), Some(Mount::Right));
        assert_eq!(head.select_for_liquid(100.0), None);

        head.left.as_mut().unwrap().has_tip = true;
        // Left wins when both qualify.
        assert_eq!(head.select_for_liquid(30.0), Some(Mount::Left));
        assert_eq!(head.select_for_liquid(100.0), Some(Mount::Left));
    }

    #[test]
    fn test_num_channels() {
        assert_eq!(head().num_channels(), 2);
        assert_eq!(
            PipetteHead {
                left: None,
                ..head()
            }
            .num_channels(),
            1
        );
        assert_eq!(PipetteHead::default().num_channels(), 0);
    }

    #[test]
    fn test_mount_of() {
        let head = head();
        assert_eq!(head.mount_of("pip-left"), Some(Mount::Left));
        assert_eq!(head.mount_of("pip-right"), Some(Mount::Right));
        assert_eq!(head.mount_of("nope"), None);
    }

    #[test]
    fn test_flow_rate_tables_cover_known_pipettes() {
        for name in ["p1000_single_flex", "p50_single", "p300_single_gen2"] {
            assert!(default_aspirate_flow_rate(name).is_some(), "{name}");
            assert!(default_dispense_flow_rate(name).is_some(), "{name}");
        }
        assert_eq!(default_aspirate_flow_rate("p9000_mega"), None);
    }
}
