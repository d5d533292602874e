//! Liquid volume bookkeeping for wells and tubes.
//!
//! Every liquid container carries a [`VolumeTracker`] that validates
//! aspirations and dispenses against the current and maximum volume. A
//! tracker can be disabled, in which case every operation is accepted
//! without bookkeeping (useful when the physical state is unknown, e.g.
//! plates loaded mid-run).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by volume bookkeeping.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum VolumeError {
    /// Aspirating more liquid than the container holds.
    #[error("Aspirating {requested} uL but only {available} uL available")]
    TooLittleLiquid { requested: f64, available: f64 },

    /// Dispensing more liquid than the container has room for.
    #[error("Dispensing {requested} uL but only {free} uL free")]
    TooLittleVolume { requested: f64, free: f64 },
}

/// Tracks the liquid volume in a single container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeTracker {
    max_volume: f64,
    current_volume: f64,
    enabled: bool,
}

impl VolumeTracker {
    /// Create an empty tracker with the given capacity in microliters.
    pub fn new(max_volume: f64) -> Self {
        Self {
            max_volume,
            current_volume: 0.0,
            enabled: true,
        }
    }

    pub fn max_volume(&self) -> f64 {
        self.max_volume
    }

    pub fn current_volume(&self) -> f64 {
        self.current_volume
    }

    /// Headroom left in the container, in microliters.
    pub fn free_volume(&self) -> f64 {
        self.max_volume - self.current_volume
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable bookkeeping. Operations are validated again from the current
    /// recorded volume.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disable bookkeeping. All operations are accepted and the recorded
    /// volume is left untouched.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Overwrite the recorded volume, clamped to `[0, max_volume]`.
    pub fn set_volume(&mut self, volume: f64) {
        self.current_volume = volume.clamp(0.0, self.max_volume);
    }

    /// Record removal of `volume` microliters.
    pub fn aspirate(&mut self, volume: f64) -> Result<(), VolumeError> {
        if !self.enabled {
            return Ok(());
        }
        if volume > self.current_volume {
            return Err(VolumeError::TooLittleLiquid {
                requested: volume,
                available: self.current_volume,
            });
        }
        self.current_volume -= volume;
        Ok(())
    }

    /// Record addition of `volume` microliters.
    pub fn dispense(&mut self, volume: f64) -> Result<(), VolumeError> {
        if !self.enabled {
            return Ok(());
        }
        let free = self.free_volume();
        if volume > free {
            return Err(VolumeError::TooLittleVolume {
                requested: volume,
                free,
            });
        }
        self.current_volume += volume;
        Ok(())
    }
}
