//! The robot backend trait.

use crate::ops::{
    Aspiration, AspirationPlate, Dispense, DispensePlate, Drop, DropTipRack, Move, Pickup,
    PickupTipRack,
};
use async_trait::async_trait;
use lab_core::{LabError, Result};
use lab_resources::Resource;

/// Interface every liquid-handling robot backend implements.
///
/// The frontend calls these methods with fully resolved operations; the
/// backend translates them into robot commands. Capabilities a robot lacks
/// keep the default implementations, which return
/// [`LabError::Unsupported`] (96-head operations, labware moves) or are
/// no-ops (`home`, resource callbacks).
#[async_trait]
pub trait LiquidHandlerBackend: Send + Sync {
    /// Prepare the robot for use (open connections, create a run).
    async fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the robot.
    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    /// Number of independent pipetting channels.
    fn num_channels(&self) -> usize;

    /// Called when labware is assigned to the deck.
    ///
    /// `slot` is the deck slot of the resource's slot-level ancestor, when
    /// it is on the deck.
    async fn assigned_resource(&mut self, _resource: &Resource, _slot: Option<&str>) -> Result<()> {
        Ok(())
    }

    /// Called when labware is removed from the deck.
    async fn unassigned_resource(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    /// Pick up tips; `ops[i]` is executed by channel `use_channels[i]`.
    async fn pick_up_tips(&mut self, ops: &[Pickup], use_channels: &[usize]) -> Result<()>;

    /// Drop tips; `ops[i]` is executed by channel `use_channels[i]`.
    async fn drop_tips(&mut self, ops: &[Drop], use_channels: &[usize]) -> Result<()>;

    /// Aspirate liquid; `ops[i]` is executed by channel `use_channels[i]`.
    async fn aspirate(&mut self, ops: &[Aspiration], use_channels: &[usize]) -> Result<()>;

    /// Dispense liquid; `ops[i]` is executed by channel `use_channels[i]`.
    async fn dispense(&mut self, ops: &[Dispense], use_channels: &[usize]) -> Result<()>;

    /// Pick up a full rack of tips with the 96-head.
    async fn pick_up_tips96(&mut self, _op: &PickupTipRack) -> Result<()> {
        Err(LabError::Unsupported("pick_up_tips96"))
    }

    /// Drop a full rack of tips with the 96-head.
    async fn drop_tips96(&mut self, _op: &DropTipRack) -> Result<()> {
        Err(LabError::Unsupported("drop_tips96"))
    }

    /// Aspirate from a whole plate with the 96-head.
    async fn aspirate96(&mut self, _op: &AspirationPlate) -> Result<()> {
        Err(LabError::Unsupported("aspirate96"))
    }

    /// Dispense into a whole plate with the 96-head.
    async fn dispense96(&mut self, _op: &DispensePlate) -> Result<()> {
        Err(LabError::Unsupported("dispense96"))
    }

    /// Move labware to another slot (gripper).
    async fn move_resource(&mut self, _op: &Move) -> Result<()> {
        Err(LabError::Unsupported("move_resource"))
    }

    /// Home the gantry.
    async fn home(&mut self) -> Result<()> {
        Ok(())
    }
}
