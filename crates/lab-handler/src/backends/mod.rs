//! Backends shipped with the frontend crate.
//!
//! Robot-specific backends live in their own crates; only the simulation
//! backend lives here.

pub mod chatterbox;

pub use chatterbox::ChatterboxBackend;
