//! Opentrons Flex backend.
//!
//! Drives a Flex over its HTTP API (port 31950): [`FlexBackend`] implements
//! the liquid-handling backend trait, translating resolved operations into
//! run commands, while [`FlexClient`] wraps the raw endpoints. Labware
//! assigned to the deck is converted to schema-2 definitions and loaded into
//! the run; pipettes are selected per operation by tip volume and tip state.
//!
//! The 96-head operations are not available on this robot and keep the
//! trait's unsupported defaults.

pub mod backend;
pub mod client;
pub mod labware;
pub mod pipette;

pub use backend::FlexBackend;
pub use client::FlexClient;
pub use pipette::{Mount, Pipette, PipetteHead};
