//! Liquid-handling frontend.
//!
//! [`LiquidHandler`] is the user-facing API: it owns the deck layout and a
//! robot backend, resolves well/tip identifiers into fully located
//! operations, and keeps tip and volume state consistent. Backends implement
//! [`LiquidHandlerBackend`] and receive only resolved operations; they never
//! inspect the resource tree themselves.
//!
//! The [`backends::chatterbox`] backend executes nothing and narrates every
//! operation to a sink, which makes it the reference backend for tests and
//! protocol dry runs.

pub mod backend;
pub mod backends;
pub mod handler;
pub mod layout;
pub mod ops;

pub use backend::LiquidHandlerBackend;
pub use handler::LiquidHandler;
pub use layout::DeckLayout;

pub use lab_core::{Coordinate, LabError, Result};
pub use lab_resources::{FlexDeck, Resource, ResourceKind, Tip};
