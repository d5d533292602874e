//! Core types shared across the rust-labware workspace.
//!
//! This crate holds the pieces every other crate depends on: the millimeter
//! [`Coordinate`] used for all labware geometry, the [`VolumeTracker`] that
//! keeps per-container liquid bookkeeping honest, and the workspace error
//! type [`LabError`].

pub mod coordinate;
pub mod error;
pub mod volume;

pub use coordinate::Coordinate;
pub use error::{LabError, Result};
pub use volume::{VolumeError, VolumeTracker};
