//! The chatterbox backend: narrates operations instead of executing them.
//!
//! Useful for protocol dry runs, demos, and tests. One line is written to
//! the sink per backend call; tests capture the sink and assert on the
//! transcript.

use crate::backend::LiquidHandlerBackend;
use crate::ops::{
    Aspiration, AspirationPlate, Dispense, DispensePlate, Drop, DropTipRack, Move, Pickup,
    PickupTipRack,
};
use async_trait::async_trait;
use lab_core::Result;
use lab_resources::Resource;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// A cloneable in-memory sink for capturing chatterbox output in tests.
#[derive(Debug, Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transcript written so far.
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut inner = self.0.lock().unwrap_or_else(|e| e.into_inner());
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Backend that prints every operation to a sink.
pub struct ChatterboxBackend {
    num_channels: usize,
    sink: Box<dyn Write + Send + Sync>,
}

impl ChatterboxBackend {
    /// Chatterbox with the given channel count, writing to stdout.
    pub fn new(num_channels: usize) -> Self {
        Self {
            num_channels,
            sink: Box::new(std::io::stdout()),
        }
    }

    /// Chatterbox writing to a custom sink.
    pub fn with_sink(num_channels: usize, sink: impl Write + Send + Sync + 'static) -> Self {
        Self {
            num_channels,
            sink: Box::new(sink),
        }
    }

    fn say(&mut self, line: &str) -> Result<()> {
        tracing::info!(target: "chatterbox", "{line}");
        writeln!(self.sink, "{line}")?;
        Ok(())
    }
}

impl Default for ChatterboxBackend {
    /// Eight channels, stdout.
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl LiquidHandlerBackend for ChatterboxBackend {
    async fn setup(&mut self) -> Result<()> {
        self.say("Setting up the robot.")
    }

    async fn stop(&mut self) -> Result<()> {
        self.say("Stopping the robot.")
    }

    fn num_channels(&self) -> usize {
        self.num_channels
    }

    async fn assigned_resource(&mut self, resource: &Resource, _slot: Option<&str>) -> Result<()> {
        self.say(&format!(
            "Resource {} was assigned to the robot.",
            resource.name()
        ))
    }

    async fn unassigned_resource(&mut self, name: &str) -> Result<()> {
        self.say(&format!("Resource {name} was unassigned from the robot."))
    }

    async fn pick_up_tips(&mut self, ops: &[Pickup], _use_channels: &[usize]) -> Result<()> {
        let spots: Vec<&str> = ops.iter().map(|o| o.resource.as_str()).collect();
        self.say(&format!("Picking up tips [{}].", spots.join(", ")))
    }

    async fn drop_tips(&mut self, ops: &[Drop], _use_channels: &[usize]) -> Result<()> {
        let spots: Vec<&str> = ops.iter().map(|o| o.resource.as_str()).collect();
        self.say(&format!("Dropping tips [{}].", spots.join(", ")))
    }

    async fn aspirate(&mut self, ops: &[Aspiration], _use_channels: &[usize]) -> Result<()> {
        let parts: Vec<String> = ops
            .iter()
            .map(|o| format!("{} uL from {}", o.volume, o.resource))
            .collect();
        self.say(&format!("Aspirating [{}].", parts.join(", ")))
    }

    async fn dispense(&mut self, ops: &[Dispense], _use_channels: &[usize]) -> Result<()> {
        let parts: Vec<String> = ops
            .iter()
            .map(|o| format!("{} uL into {}", o.volume, o.resource))
            .collect();
        self.say(&format!("Dispensing [{}].", parts.join(", ")))
    }

    async fn pick_up_tips96(&mut self, op: &PickupTipRack) -> Result<()> {
        self.say(&format!("Picking up tips from {}.", op.resource))
    }

    async fn drop_tips96(&mut self, op: &DropTipRack) -> Result<()> {
        self.say(&format!("Dropping tips to {}.", op.resource))
    }

    async fn aspirate96(&mut self, op: &AspirationPlate) -> Result<()> {
        self.say(&format!("Aspirating {} uL from {}.", op.volume, op.resource))
    }

    async fn dispense96(&mut self, op: &DispensePlate) -> Result<()> {
        self.say(&format!("Dispensing {} uL into {}.", op.volume, op.resource))
    }

    async fn move_resource(&mut self, op: &Move) -> Result<()> {
        self.say(&format!("Moving {} to {}.", op.resource, op.to_slot))
    }

    async fn home(&mut self) -> Result<()> {
        self.say("Homing the robot.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_core::Coordinate;
    use lab_resources::tip::standard_volume_tip_no_filter;

    #[tokio::test]
    async fn test_transcript() {
        let sink = SharedSink::new();
        let mut backend = ChatterboxBackend::with_sink(8, sink.clone());

        backend.setup().await.unwrap();
        backend
            .pick_up_tips(
                &[Pickup {
                    resource: "tips_A1".into(),
                    labware: "tips".into(),
                    location: Coordinate::zero(),
                    offset: None,
                    tip: standard_volume_tip_no_filter(),
                }],
                &[0],
            )
            .await
            .unwrap();
        backend.stop().await.unwrap();

        assert_eq!(
            sink.contents(),
            "Setting up the robot.\nPicking up tips [tips_A1].\nStopping the robot.\n"
        );
    }

    #[tokio::test]
    async fn test_default_channel_count() {
        let backend = ChatterboxBackend::default();
        assert_eq!(backend.num_channels(), 8);
    }
}
