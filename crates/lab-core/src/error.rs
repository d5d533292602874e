//! Error types for the rust-labware workspace.
//!
//! `LabError` consolidates the failure modes of the resource model, the
//! liquid-handling frontend, and robot backends. Backend crates wrap their
//! transport errors in [`LabError::Backend`] so callers see one type.

use crate::volume::VolumeError;
use thiserror::Error;

/// Convenience alias for results using the workspace error type.
pub type Result<T> = std::result::Result<T, LabError>;

/// Primary error type for liquid-handling operations.
#[derive(Error, Debug)]
pub enum LabError {
    /// A resource with the given name does not exist in the tree.
    ///
    /// Returned by lookups and by unassignment of names never assigned.
    #[error("Resource '{0}' not found")]
    ResourceNotFound(String),

    /// A resource with the same name already exists in the tree.
    ///
    /// Names are unique per tree; pass `replace = true` at the frontend to
    /// swap a resource instead.
    #[error("Resource '{0}' already assigned")]
    DuplicateResource(String),

    /// The named deck slot does not exist on this deck.
    #[error("Invalid deck slot '{0}'")]
    InvalidSlot(String),

    /// No pipette channel matching the requested tip or volume is available.
    ///
    /// Transient when another channel frees up a tip; permanent when the
    /// mounted pipettes simply cannot serve the volume.
    #[error("No pipette channel available: {0}")]
    NoChannel(String),

    /// A tip was expected but not present (empty tip spot, bare channel).
    #[error("No tip at '{0}'")]
    NoTip(String),

    /// A tip is already present where one would be placed.
    #[error("Tip already present at '{0}'")]
    HasTip(String),

    /// Liquid bookkeeping rejected the operation.
    #[error(transparent)]
    Volume(#[from] VolumeError),

    /// The requested operation is not supported by the active backend.
    #[error("Backend does not support operation: {0}")]
    Unsupported(&'static str),

    /// The backend failed to execute an operation.
    ///
    /// Wraps transport and robot-side errors (HTTP failures, robot fault
    /// responses). Retry behavior is backend specific.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Setup or teardown of the handler/backend failed.
    #[error("Setup error: {0}")]
    Setup(String),

    /// Standard I/O failure (layout files, sinks).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing or deserializing labware state failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
