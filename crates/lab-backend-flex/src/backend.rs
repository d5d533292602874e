//! The Opentrons Flex backend.

use crate::client::FlexClient;
use crate::labware;
use crate::pipette::{
    default_aspirate_flow_rate, default_dispense_flow_rate, Pipette, PipetteHead,
};
use async_trait::async_trait;
use lab_core::{Coordinate, LabError, Result};
use lab_handler::ops::{Aspiration, Dispense, Drop, Move, Pickup};
use lab_handler::LiquidHandlerBackend;
use lab_resources::deck::is_staging_slot;
use lab_resources::Resource;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Gantry position above the fixed trash in slot D1.
const FIXED_TRASH: Coordinate = Coordinate {
    x: 75.0,
    y: 390.0,
    z: 175.0,
};

/// Z offset added to tip pickups, in mm.
const TIP_PICKUP_Z_OFFSET: f64 = 90.0;
/// Z offset added to tip drops on a rack, in mm.
const TIP_DROP_Z_OFFSET: f64 = 10.0;
/// Z offset subtracted from aspirate and dispense targets, in mm.
const ASP_DISP_Z_OFFSET: f64 = 37.0;

/// From this robot software version on, the deck and fixed trash are
/// addressable areas and must not be loaded as labware.
const DECK_IS_ADDRESSABLE_AREA_VERSION: [u32; 3] = [7, 1, 0];

fn version_at_least(version: &str, wanted: [u32; 3]) -> bool {
    let mut parts = version.split('.').map(|p| p.parse::<u32>().unwrap_or(0));
    let got = [
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    ];
    got >= wanted
}

/// Robot location object for a deck slot.
fn slot_value(slot: &str) -> Value {
    if is_staging_slot(slot) {
        json!({ "addressableAreaName": slot })
    } else {
        json!({ "slotName": slot })
    }
}

/// Backend for the Opentrons Flex, speaking the robot's HTTP API.
///
/// Each mounted pipette is one channel. Operations are executed one channel
/// at a time; batched multi-channel operations are not supported by the
/// robot's command API.
pub struct FlexBackend {
    client: FlexClient,
    head: PipetteHead,
    api_version: Option<String>,
    /// Resource name to run-scoped labware id.
    defined_labware: HashMap<String, String>,
}

impl FlexBackend {
    /// Backend for the robot at `host`, default API port 31950.
    pub fn new(host: &str) -> Self {
        Self::with_port(host, 31950)
    }

    pub fn with_port(host: &str, port: u16) -> Self {
        Self {
            client: FlexClient::new(host, port),
            head: PipetteHead::default(),
            api_version: None,
            defined_labware: HashMap::new(),
        }
    }

    fn trash_is_addressable(&self) -> bool {
        self.api_version
            .as_deref()
            .map_or(true, |v| version_at_least(v, DECK_IS_ADDRESSABLE_AREA_VERSION))
    }

    fn labware_id(&self, name: &str) -> Result<&str> {
        self.defined_labware
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| LabError::Backend(format!("labware '{name}' was never defined")))
    }

    /// The command API drives one pipette per command.
    fn single<'a, T>(ops: &'a [T], use_channels: &[usize], what: &'static str) -> Result<&'a T> {
        if ops.len() == 1 && use_channels == [0] {
            Ok(&ops[0])
        } else {
            Err(LabError::Unsupported(what))
        }
    }
}

#[async_trait]
impl LiquidHandlerBackend for FlexBackend {
    async fn setup(&mut self) -> Result<()> {
        let run_id = self.client.create_run().await?;

        let (left, right) = self.client.attached_pipettes().await?;
        if let Some(name) = left {
            let id = self.client.load_pipette(&name, "left").await?;
            self.head.left = Some(Pipette {
                id,
                name,
                has_tip: false,
            });
        }
        if let Some(name) = right {
            let id = self.client.load_pipette(&name, "right").await?;
            self.head.right = Some(Pipette {
                id,
                name,
                has_tip: false,
            });
        }

        let api_version = self.client.api_version().await?;
        tracing::info!(
            %run_id,
            %api_version,
            channels = self.head.num_channels(),
            "connected to Flex"
        );
        self.api_version = Some(api_version);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.defined_labware.clear();
        Ok(())
    }

    fn num_channels(&self) -> usize {
        self.head.num_channels()
    }

    async fn assigned_resource(&mut self, resource: &Resource, slot: Option<&str>) -> Result<()> {
        if resource.is_deck() {
            return Ok(());
        }
        // The fixed trash is an addressable area on current robot software,
        // not labware.
        if resource.name() == "trash_container" && self.trash_is_addressable() {
            return Ok(());
        }
        let slot = slot.ok_or_else(|| {
            LabError::Backend(format!("resource '{}' is not on the deck", resource.name()))
        })?;

        let definition = labware::definition(resource);
        let uri = self.client.add_labware_definition(&definition).await?;

        let labware_id = resource.name().to_string();
        self.client
            .load_labware(&uri, &labware_id, resource.name(), slot_value(slot))
            .await?;
        self.defined_labware
            .insert(resource.name().to_string(), labware_id);
        Ok(())
    }

    async fn unassigned_resource(&mut self, name: &str) -> Result<()> {
        // Definitions cannot be unloaded through the API; moving the labware
        // off deck is the supported workaround.
        if let Some(labware_id) = self.defined_labware.remove(name) {
            self.client.move_labware_off_deck(&labware_id).await?;
        }
        Ok(())
    }

    async fn pick_up_tips(&mut self, ops: &[Pickup], use_channels: &[usize]) -> Result<()> {
        let op = Self::single(ops, use_channels, "multi-channel tip pickup")?;
        let labware_id = self.labware_id(&op.labware)?.to_string();

        let mount = self
            .head
            .select_for_tip(op.tip.maximal_volume, false)
            .ok_or_else(|| {
                LabError::NoChannel(format!(
                    "no free pipette matching {} uL tips",
                    op.tip.maximal_volume
                ))
            })?;
        let pipette_id = self
            .head
            .get(mount)
            .map(|p| p.id.clone())
            .ok_or_else(|| LabError::NoChannel(format!("no pipette on {mount} mount")))?;

        let mut offset = op.offset.unwrap_or_default();
        offset.z += TIP_PICKUP_Z_OFFSET;

        self.client
            .pick_up_tip(&labware_id, &op.resource, &pipette_id, offset)
            .await?;

        if let Some(p) = self.head.get_mut(mount) {
            p.has_tip = true;
        }
        Ok(())
    }

    async fn drop_tips(&mut self, ops: &[Drop], use_channels: &[usize]) -> Result<()> {
        let op = Self::single(ops, use_channels, "multi-channel tip drop")?;

        let mount = self
            .head
            .select_for_tip(op.tip.maximal_volume, true)
            .ok_or_else(|| {
                LabError::NoChannel(format!(
                    "no pipette holding a {} uL tip",
                    op.tip.maximal_volume
                ))
            })?;
        let pipette_id = self
            .head
            .get(mount)
            .map(|p| p.id.clone())
            .ok_or_else(|| LabError::NoChannel(format!("no pipette on {mount} mount")))?;

        if op.resource == "trash" {
            // The fixed trash has no wells to target; approach it by
            // coordinate and release the tip in place.
            self.client.retract_axis(&format!("{mount}Z")).await?;
            self.client.move_to_coordinates(&pipette_id, FIXED_TRASH).await?;
            self.client
                .move_to_coordinates(
                    &pipette_id,
                    Coordinate {
                        z: FIXED_TRASH.z - 40.0,
                        ..FIXED_TRASH
                    },
                )
                .await?;
            self.client.drop_tip_in_place(&pipette_id).await?;
        } else {
            let labware_id = self.labware_id(&op.labware)?.to_string();
            let mut offset = op.offset.unwrap_or_default();
            offset.z += TIP_DROP_Z_OFFSET;
            self.client
                .drop_tip(&labware_id, &op.resource, &pipette_id, offset)
                .await?;
        }

        if let Some(p) = self.head.get_mut(mount) {
            p.has_tip = false;
        }
        Ok(())
    }

    async fn aspirate(&mut self, ops: &[Aspiration], use_channels: &[usize]) -> Result<()> {
        let op = Self::single(ops, use_channels, "multi-channel aspirate")?;
        let labware_id = self.labware_id(&op.labware)?.to_string();

        let mount = self
            .head
            .select_for_liquid(op.volume)
            .ok_or_else(|| {
                LabError::NoChannel(format!("no pipette with a tip for {} uL", op.volume))
            })?;
        let (pipette_id, pipette_name) = self
            .head
            .get(mount)
            .map(|p| (p.id.clone(), p.name.clone()))
            .ok_or_else(|| LabError::NoChannel(format!("no pipette on {mount} mount")))?;

        let flow_rate = match op.flow_rate {
            Some(rate) => rate,
            None => default_aspirate_flow_rate(&pipette_name).ok_or_else(|| {
                LabError::Backend(format!("no default flow rate for pipette '{pipette_name}'"))
            })?,
        };

        let mut offset = op.offset.unwrap_or_default();
        offset.z -= ASP_DISP_Z_OFFSET;

        // Approach the well first; aspirating straight from a blowout
        // position can collide.
        self.client
            .move_to_well(&labware_id, &op.resource, &pipette_id, offset)
            .await?;
        self.client
            .aspirate(&labware_id, &op.resource, &pipette_id, op.volume, flow_rate, offset)
            .await
    }

    async fn dispense(&mut self, ops: &[Dispense], use_channels: &[usize]) -> Result<()> {
        let op = Self::single(ops, use_channels, "multi-channel dispense")?;
        let labware_id = self.labware_id(&op.labware)?.to_string();

        let mount = self
            .head
            .select_for_liquid(op.volume)
            .ok_or_else(|| {
                LabError::NoChannel(format!("no pipette with a tip for {} uL", op.volume))
            })?;
        let (pipette_id, pipette_name) = self
            .head
            .get(mount)
            .map(|p| (p.id.clone(), p.name.clone()))
            .ok_or_else(|| LabError::NoChannel(format!("no pipette on {mount} mount")))?;

        let flow_rate = match op.flow_rate {
            Some(rate) => rate,
            None => default_dispense_flow_rate(&pipette_name).ok_or_else(|| {
                LabError::Backend(format!("no default flow rate for pipette '{pipette_name}'"))
            })?,
        };

        let mut offset = op.offset.unwrap_or_default();
        offset.z -= ASP_DISP_Z_OFFSET;

        self.client
            .dispense(
                &labware_id,
                &op.resource,
                &pipette_id,
                op.volume,
                flow_rate,
                offset,
                op.push_out.unwrap_or(0.0),
            )
            .await
    }

    async fn move_resource(&mut self, op: &Move) -> Result<()> {
        let labware_id = self.labware_id(&op.resource)?.to_string();
        self.client.home_gripper().await?;
        self.client
            .move_labware(
                &labware_id,
                slot_value(&op.to_slot),
                op.pickup_offset.unwrap_or_default(),
                op.drop_offset.unwrap_or_default(),
            )
            .await
    }

    async fn home(&mut self) -> Result<()> {
        self.client.home().await
    }
}
