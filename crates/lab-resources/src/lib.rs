//! Labware resource model.
//!
//! A deck layout is an owned tree of [`Resource`] nodes: the deck owns the
//! racks and plates placed on it, which in turn own their tip spots, wells,
//! or tubes. Each node stores its location relative to its parent; absolute
//! locations are computed by walking down from the root. The tree is plain
//! data (fully serde-serializable) so layouts can be saved, diffed, and
//! shipped to robot backends.
//!
//! Gridded containers (plates, tip racks, tube racks) are built with
//! [`grid::GridSpec`] and addressed with well identifiers (`"A1"`..`"H12"`).
//! Catalog modules provide ready-made definitions for Hamilton ML STAR tip
//! racks and Opentrons Flex labware.

pub mod catalog;
pub mod deck;
pub mod grid;
pub mod resource;
pub mod tip;

pub use deck::FlexDeck;
pub use grid::GridSpec;
pub use resource::{Resource, ResourceKind};
pub use tip::Tip;

pub use lab_core::{Coordinate, LabError, Result, VolumeTracker};
