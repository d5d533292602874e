//! The resource tree.
//!
//! Everything on a deck is a [`Resource`]: the deck itself, racks and
//! plates, and their wells, tubes, and tip spots. A resource owns its
//! children; there are no parent back-pointers. Code that needs a child's
//! absolute position asks the tree root via [`Resource::absolute_location`].

use crate::grid::{self, GridSpec};
use crate::tip::Tip;
use lab_core::{Coordinate, LabError, Result, VolumeTracker};
use serde::{Deserialize, Serialize};

/// What a resource is, with kind-specific state.
///
/// This replaces a subclass hierarchy: containers carry their grid geometry,
/// liquid containers carry a [`VolumeTracker`], tip spots carry the tip
/// definition and occupancy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceKind {
    /// Plain resource with no special behavior (spacers, dummy containers).
    Generic,
    /// A robot deck; the root of a layout tree.
    Deck,
    /// Tip disposal area.
    Trash,
    /// Microplate holding wells.
    Plate {
        num_items_x: usize,
        num_items_y: usize,
    },
    /// A single well on a plate.
    Well { tracker: VolumeTracker },
    /// Rack holding pipette tips.
    TipRack {
        num_items_x: usize,
        num_items_y: usize,
    },
    /// A single position on a tip rack.
    TipSpot { tip: Tip, has_tip: bool },
    /// Rack holding tubes.
    TubeRack {
        num_items_x: usize,
        num_items_y: usize,
    },
    /// A single tube.
    Tube { tracker: VolumeTracker },
}

/// A node in the labware tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    name: String,
    size_x: f64,
    size_y: f64,
    size_z: f64,
    /// Location relative to the parent, set when assigned.
    location: Option<Coordinate>,
    model: Option<String>,
    kind: ResourceKind,
    children: Vec<Resource>,
}

impl Resource {
    pub fn new(
        name: impl Into<String>,
        size_x: f64,
        size_y: f64,
        size_z: f64,
        kind: ResourceKind,
    ) -> Self {
        Self {
            name: name.into(),
            size_x,
            size_y,
            size_z,
            location: None,
            model: None,
            kind,
            children: Vec::new(),
        }
    }

    /// Plain resource with no special behavior.
    pub fn generic(name: impl Into<String>, size_x: f64, size_y: f64, size_z: f64) -> Self {
        Self::new(name, size_x, size_y, size_z, ResourceKind::Generic)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_x(&self) -> f64 {
        self.size_x
    }

    pub fn size_y(&self) -> f64 {
        self.size_y
    }

    pub fn size_z(&self) -> f64 {
        self.size_z
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.location
    }

    pub fn set_location(&mut self, location: Coordinate) {
        self.location = Some(location);
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ResourceKind {
        &mut self.kind
    }

    pub fn children(&self) -> &[Resource] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Resource] {
        &mut self.children
    }

    pub fn is_deck(&self) -> bool {
        matches!(self.kind, ResourceKind::Deck)
    }

    pub fn is_trash(&self) -> bool {
        matches!(self.kind, ResourceKind::Trash)
    }

    /// Grid dimensions for itemized containers, `None` otherwise.
    pub fn grid_dims(&self) -> Option<(usize, usize)> {
        match self.kind {
            ResourceKind::Plate {
                num_items_x,
                num_items_y,
            }
            | ResourceKind::TipRack {
                num_items_x,
                num_items_y,
            }
            | ResourceKind::TubeRack {
                num_items_x,
                num_items_y,
            } => Some((num_items_x, num_items_y)),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Tree operations
    // -------------------------------------------------------------------------

    /// True if a resource named `name` exists in this subtree (including
    /// this node itself).
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Depth-first lookup by name, including this node.
    pub fn get(&self, name: &str) -> Option<&Resource> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.get(name))
    }

    /// Mutable depth-first lookup by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Resource> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.get_mut(name))
    }

    /// Attach `child` at `location` (relative to this resource).
    ///
    /// Fails if a resource with the child's name (or any of its
    /// descendants' names) already exists in this subtree.
    pub fn assign_child(&mut self, mut child: Resource, location: Coordinate) -> Result<()> {
        let mut names = Vec::new();
        child.collect_names(&mut names);
        for n in &names {
            if self.contains(n) {
                return Err(LabError::DuplicateResource(n.clone()));
            }
        }
        child.location = Some(location);
        tracing::debug!(parent = %self.name, child = %child.name, "resource assigned");
        self.children.push(child);
        Ok(())
    }

    /// Detach and return the direct child named `name`.
    pub fn unassign_child(&mut self, name: &str) -> Result<Resource> {
        let idx = self
            .children
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| LabError::ResourceNotFound(name.to_string()))?;
        tracing::debug!(parent = %self.name, child = name, "resource unassigned");
        Ok(self.children.remove(idx))
    }

    fn collect_names(&self, out: &mut Vec<String>) {
        out.push(self.name.clone());
        for c in &self.children {
            c.collect_names(out);
        }
    }

    /// Location of the named descendant relative to this resource's origin.
    ///
    /// Returns `Coordinate::zero()` for this resource itself. `None` if the
    /// name is unknown or some node on the path has no location.
    pub fn absolute_location(&self, name: &str) -> Option<Coordinate> {
        if self.name == name {
            return Some(Coordinate::zero());
        }
        for c in &self.children {
            if let Some(rel) = c.absolute_location(name) {
                return Some(c.location? + rel);
            }
        }
        None
    }

    // -------------------------------------------------------------------------
    // Itemized access
    // -------------------------------------------------------------------------

    /// Attach a grid of items, one per grid position, named
    /// `{self}_{identifier}` (e.g. `tips_A1`).
    pub fn attach_grid(
        &mut self,
        spec: GridSpec,
        item_size_z: f64,
        make_kind: impl Fn() -> ResourceKind,
    ) -> Result<()> {
        for (id, location) in spec.positions() {
            let item = Resource::new(
                format!("{}_{}", self.name, id),
                spec.item_size_x,
                spec.item_size_y,
                item_size_z,
                make_kind(),
            );
            self.assign_child(item, location)?;
        }
        Ok(())
    }

    /// Total number of items for itemized containers.
    pub fn num_items(&self) -> usize {
        self.grid_dims().map_or(0, |(x, y)| x * y)
    }

    /// Item at identifier `"A1"`.. for itemized containers.
    pub fn item(&self, id: &str) -> Result<&Resource> {
        let (nx, ny) = self
            .grid_dims()
            .ok_or_else(|| LabError::ResourceNotFound(format!("{}:{}", self.name, id)))?;
        let (row, col) = grid::parse_identifier(id)
            .filter(|&(r, c)| r < ny && c < nx)
            .ok_or_else(|| LabError::ResourceNotFound(format!("{}:{}", self.name, id)))?;
        self.children
            .get(col * ny + row)
            .ok_or_else(|| LabError::ResourceNotFound(format!("{}:{}", self.name, id)))
    }

    /// Mutable item access by identifier.
    pub fn item_mut(&mut self, id: &str) -> Result<&mut Resource> {
        let (nx, ny) = self
            .grid_dims()
            .ok_or_else(|| LabError::ResourceNotFound(format!("{}:{}", self.name, id)))?;
        let (row, col) = grid::parse_identifier(id)
            .filter(|&(r, c)| r < ny && c < nx)
            .ok_or_else(|| LabError::ResourceNotFound(format!("{}:{}", self.name, id)))?;
        let name = self.name.clone();
        self.children
            .get_mut(col * ny + row)
            .ok_or_else(|| LabError::ResourceNotFound(format!("{}:{}", name, id)))
    }

    /// Items of one row (`'A'`..) in column order, for itemized containers.
    pub fn row(&self, letter: char) -> Result<Vec<&Resource>> {
        let (nx, ny) = self
            .grid_dims()
            .ok_or_else(|| LabError::ResourceNotFound(format!("{}:{}", self.name, letter)))?;
        if !letter.is_ascii_uppercase() || (letter as u8 - b'A') as usize >= ny {
            return Err(LabError::ResourceNotFound(format!("{}:{}", self.name, letter)));
        }
        let row = (letter as u8 - b'A') as usize;
        Ok((0..nx).filter_map(|col| self.children.get(col * ny + row)).collect())
    }

    /// Items of one column (1-based) in row order, for itemized containers.
    pub fn column(&self, number: usize) -> Result<Vec<&Resource>> {
        let (nx, ny) = self
            .grid_dims()
            .ok_or_else(|| LabError::ResourceNotFound(format!("{}:{}", self.name, number)))?;
        if number == 0 || number > nx {
            return Err(LabError::ResourceNotFound(format!("{}:{}", self.name, number)));
        }
        let col = number - 1;
        Ok(self
            .children
            .iter()
            .skip(col * ny)
            .take(ny)
            .collect())
    }

    // -------------------------------------------------------------------------
    // Tip state
    // -------------------------------------------------------------------------

    /// Tip definition at this spot, if this is a tip spot.
    pub fn tip(&self) -> Option<&Tip> {
        match &self.kind {
            ResourceKind::TipSpot { tip, .. } => Some(tip),
            _ => None,
        }
    }

    /// Whether this tip spot currently holds a tip.
    pub fn has_tip(&self) -> bool {
        matches!(self.kind, ResourceKind::TipSpot { has_tip: true, .. })
    }

    /// Remove the tip from this spot.
    pub fn take_tip(&mut self) -> Result<Tip> {
        match &mut self.kind {
            ResourceKind::TipSpot { tip, has_tip } => {
                if !*has_tip {
                    return Err(LabError::NoTip(self.name.clone()));
                }
                *has_tip = false;
                Ok(*tip)
            }
            _ => Err(LabError::NoTip(self.name.clone())),
        }
    }

    /// Return a tip to this spot.
    pub fn place_tip(&mut self) -> Result<()> {
        match &mut self.kind {
            ResourceKind::TipSpot { has_tip, .. } => {
                if *has_tip {
                    return Err(LabError::HasTip(self.name.clone()));
                }
                *has_tip = true;
                Ok(())
            }
            // Dropping into the trash is always allowed.
            ResourceKind::Trash => Ok(()),
            _ => Err(LabError::HasTip(self.name.clone())),
        }
    }

    /// Volume tracker for wells and tubes.
    pub fn tracker(&self) -> Option<&VolumeTracker> {
        match &self.kind {
            ResourceKind::Well { tracker } | ResourceKind::Tube { tracker } => Some(tracker),
            _ => None,
        }
    }

    /// Mutable volume tracker for wells and tubes.
    pub fn tracker_mut(&mut self) -> Option<&mut VolumeTracker> {
        match &mut self.kind {
            ResourceKind::Well { tracker } | ResourceKind::Tube { tracker } => Some(tracker),
            _ => None,
        }
    }

    /// Enable volume tracking on every well/tube in this subtree.
    pub fn enable_volume_trackers(&mut self) {
        if let Some(t) = self.tracker_mut() {
            t.enable();
        }
        for c in &mut self.children {
            c.enable_volume_trackers();
        }
    }

    /// Disable volume tracking on every well/tube in this subtree.
    pub fn disable_volume_trackers(&mut self) {
        if let Some(t) = self.tracker_mut() {
            t.disable();
        }
        for c in &mut self.children {
            c.disable_volume_trackers();
        }
    }

    // -------------------------------------------------------------------------
    // Rotation
    // -------------------------------------------------------------------------

    /// Rotate this resource 90 degrees (landscape <-> portrait).
    ///
    /// Swaps the footprint and remaps child locations; grid dimensions of
    /// itemized containers are swapped accordingly.
    pub fn rotated_90(mut self) -> Self {
        let old_size_x = self.size_x;
        std::mem::swap(&mut self.size_x, &mut self.size_y);

        if let ResourceKind::Plate {
            num_items_x,
            num_items_y,
        }
        | ResourceKind::TipRack {
            num_items_x,
            num_items_y,
        }
        | ResourceKind::TubeRack {
            num_items_x,
            num_items_y,
        } = &mut self.kind
        {
            std::mem::swap(num_items_x, num_items_y);
        }

        for child in &mut self.children {
            let mut rotated = std::mem::replace(child, Resource::generic("tmp", 0.0, 0.0, 0.0));
            let loc = rotated.location;
            rotated = rotated.rotated_90();
            if let Some(loc) = loc {
                rotated.location = Some(Coordinate::new(
                    loc.y,
                    old_size_x - loc.x - rotated.size_y,
                    loc.z,
                ));
            }
            *child = rotated;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tip::standard_volume_tip_no_filter;

    fn tip_spot(name: &str) -> Resource {
        Resource::new(
            name,
            9.0,
            9.0,
            0.0,
            ResourceKind::TipSpot {
                tip: standard_volume_tip_no_filter(),
                has_tip: true,
            },
        )
    }

    #[test]
    fn test_assign_and_get() {
        let mut root = Resource::generic("root", 100.0, 100.0, 10.0);
        let child = Resource::generic("child", 10.0, 10.0, 5.0);
        root.assign_child(child, Coordinate::new(5.0, 5.0, 0.0)).unwrap();

        assert!(root.contains("child"));
        assert_eq!(root.get("child").unwrap().name(), "child");
        assert!(root.get("other").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut root = Resource::generic("root", 100.0, 100.0, 10.0);
        root.assign_child(Resource::generic("a", 1.0, 1.0, 1.0), Coordinate::zero())
            .unwrap();

        let err = root
            .assign_child(Resource::generic("a", 1.0, 1.0, 1.0), Coordinate::zero())
            .unwrap_err();
        assert!(matches!(err, LabError::DuplicateResource(n) if n == "a"));
    }

    #[test]
    fn test_duplicate_nested_name_rejected() {
        let mut root = Resource::generic("root", 100.0, 100.0, 10.0);
        let mut parent = Resource::generic("parent", 10.0, 10.0, 1.0);
        parent
            .assign_child(Resource::generic("inner", 1.0, 1.0, 1.0), Coordinate::zero())
            .unwrap();
        root.assign_child(parent, Coordinate::zero()).unwrap();

        // A new subtree carrying a nested name that clashes is rejected.
        let mut other = Resource::generic("other", 10.0, 10.0, 1.0);
        other
            .assign_child(Resource::generic("inner", 1.0, 1.0, 1.0), Coordinate::zero())
            .unwrap();
        let err = root.assign_child(other, Coordinate::zero()).unwrap_err();
        assert!(matches!(err, LabError::DuplicateResource(_)));
    }

    #[test]
    fn test_unassign() {
        let mut root = Resource::generic("root", 100.0, 100.0, 10.0);
        root.assign_child(Resource::generic("a", 1.0, 1.0, 1.0), Coordinate::zero())
            .unwrap();

        let removed = root.unassign_child("a").unwrap();
        assert_eq!(removed.name(), "a");
        assert!(!root.contains("a"));
        assert!(matches!(
            root.unassign_child("a"),
            Err(LabError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_absolute_location() {
        let mut root = Resource::generic("root", 500.0, 500.0, 100.0);
        let mut rack = Resource::generic("rack", 100.0, 100.0, 50.0);
        rack.assign_child(
            Resource::generic("item", 9.0, 9.0, 9.0),
            Coordinate::new(7.2, 5.3, -50.5),
        )
        .unwrap();
        root.assign_child(rack, Coordinate::new(100.0, 63.0, 100.0))
            .unwrap();

        assert_eq!(
            root.absolute_location("item").unwrap(),
            Coordinate::new(107.2, 68.3, 49.5)
        );
        assert_eq!(root.absolute_location("root").unwrap(), Coordinate::zero());
        assert!(root.absolute_location("nope").is_none());
    }

    #[test]
    fn test_grid_item_access() {
        let mut rack = Resource::new(
            "tips",
            122.4,
            82.6,
            20.0,
            ResourceKind::TipRack {
                num_items_x: 12,
                num_items_y: 8,
            },
        );
        let spec = GridSpec {
            num_items_x: 12,
            num_items_y: 8,
            dx: 7.2,
            dy: 5.3,
            dz: -50.5,
            item_size_x: 9.0,
            item_size_y: 9.0,
        };
        rack.attach_grid(spec, 0.0, || ResourceKind::TipSpot {
            tip: standard_volume_tip_no_filter(),
            has_tip: true,
        })
        .unwrap();

        assert_eq!(rack.num_items(), 96);
        assert_eq!(rack.item("A1").unwrap().name(), "tips_A1");
        assert_eq!(rack.item("H12").unwrap().name(), "tips_H12");
        assert!(rack.item("I1").is_err());
        assert!(rack.item("A13").is_err());

        // Column-major child ordering.
        assert_eq!(rack.children()[0].name(), "tips_A1");
        assert_eq!(rack.children()[7].name(), "tips_H1");
        assert_eq!(rack.children()[8].name(), "tips_A2");
    }

    #[test]
    fn test_row_and_column_access() {
        let mut rack = Resource::new(
            "tips",
            122.4,
            82.6,
            20.0,
            ResourceKind::TipRack {
                num_items_x: 12,
                num_items_y: 8,
            },
        );
        let spec = GridSpec {
            num_items_x: 12,
            num_items_y: 8,
            dx: 7.2,
            dy: 5.3,
            dz: -50.5,
            item_size_x: 9.0,
            item_size_y: 9.0,
        };
        rack.attach_grid(spec, 0.0, || ResourceKind::TipSpot {
            tip: standard_volume_tip_no_filter(),
            has_tip: true,
        })
        .unwrap();

        let row_a = rack.row('A').unwrap();
        assert_eq!(row_a.len(), 12);
        assert_eq!(row_a[0].name(), "tips_A1");
        assert_eq!(row_a[11].name(), "tips_A12");

        let col_3 = rack.column(3).unwrap();
        assert_eq!(col_3.len(), 8);
        assert_eq!(col_3[0].name(), "tips_A3");
        assert_eq!(col_3[7].name(), "tips_H3");

        assert!(rack.row('I').is_err());
        assert!(rack.column(0).is_err());
        assert!(rack.column(13).is_err());
    }

    #[test]
    fn test_tip_state_transitions() {
        let mut spot = tip_spot("spot");
        assert!(spot.has_tip());

        let tip = spot.take_tip().unwrap();
        assert_eq!(tip.maximal_volume, 300.0);
        assert!(!spot.has_tip());
        assert!(matches!(spot.take_tip(), Err(LabError::NoTip(_))));

        spot.place_tip().unwrap();
        assert!(spot.has_tip());
        assert!(matches!(spot.place_tip(), Err(LabError::HasTip(_))));
    }

    #[test]
    fn test_trash_accepts_tips() {
        let mut trash = Resource::new("trash", 172.86, 165.86, 82.0, ResourceKind::Trash);
        trash.place_tip().unwrap();
        trash.place_tip().unwrap();
    }

    #[test]
    fn test_volume_trackers_toggle_recursively() {
        let mut rack = Resource::new(
            "tubes",
            122.4,
            82.6,
            20.0,
            ResourceKind::TubeRack {
                num_items_x: 6,
                num_items_y: 4,
            },
        );
        let spec = GridSpec {
            num_items_x: 6,
            num_items_y: 4,
            dx: 7.3,
            dy: 5.2,
            dz: 0.0,
            item_size_x: 18.0,
            item_size_y: 18.0,
        };
        rack.attach_grid(spec, 40.0, || ResourceKind::Tube {
            tracker: VolumeTracker::new(1500.0),
        })
        .unwrap();

        rack.disable_volume_trackers();
        assert!(rack.children().iter().all(|t| !t.tracker().unwrap().is_enabled()));
        rack.enable_volume_trackers();
        assert!(rack.children().iter().all(|t| t.tracker().unwrap().is_enabled()));
    }

    #[test]
    fn test_rotated_90_swaps_footprint() {
        let mut rack = Resource::new(
            "tips",
            122.4,
            82.6,
            20.0,
            ResourceKind::TipRack {
                num_items_x: 12,
                num_items_y: 8,
            },
        );
        let spec = GridSpec {
            num_items_x: 12,
            num_items_y: 8,
            dx: 7.2,
            dy: 5.3,
            dz: -50.5,
            item_size_x: 9.0,
            item_size_y: 9.0,
        };
        rack.attach_grid(spec, 0.0, || ResourceKind::TipSpot {
            tip: standard_volume_tip_no_filter(),
            has_tip: true,
        })
        .unwrap();

        let portrait = rack.rotated_90();
        assert_eq!(portrait.size_x(), 82.6);
        assert_eq!(portrait.size_y(), 122.4);
        assert_eq!(portrait.grid_dims(), Some((8, 12)));

        // Children stay within the rotated footprint.
        for child in portrait.children() {
            let loc = child.location().unwrap();
            assert!(loc.x >= 0.0 && loc.x <= portrait.size_x());
            assert!(loc.y >= 0.0 && loc.y <= portrait.size_y());
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut root = Resource::generic("root", 100.0, 100.0, 10.0);
        root.assign_child(tip_spot("spot"), Coordinate::new(1.0, 2.0, 3.0))
            .unwrap();

        let json = serde_json::to_string(&root).unwrap();
        let back: Resource = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("spot").unwrap().location(), Some(Coordinate::new(1.0, 2.0, 3.0)));
        assert!(back.get("spot").unwrap().has_tip());
    }
}
