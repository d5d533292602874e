//! The liquid-handling frontend.

use crate::backend::LiquidHandlerBackend;
use crate::ops::{
    Aspiration, AspirationPlate, Dispense, DispensePlate, Drop, DropTipRack, Move, Pickup,
    PickupTipRack,
};
use lab_core::{Coordinate, LabError, Result, VolumeError};
use lab_resources::deck::{slot_location, SLOT_NAMES};
use lab_resources::{FlexDeck, Resource, Tip};

/// User-facing liquid handler: a deck plus a robot backend.
///
/// The handler resolves labware/well identifiers into absolute-located
/// operations, enforces tip and volume bookkeeping, and forwards the
/// operations to the backend. State is committed only after the backend
/// reports success, so a failed robot command leaves the model untouched.
pub struct LiquidHandler {
    deck: FlexDeck,
    backend: Box<dyn LiquidHandlerBackend>,
    /// Tip currently mounted on each channel.
    head: Vec<Option<Tip>>,
    is_setup: bool,
}

impl LiquidHandler {
    /// Handler with a fresh Flex deck (fixed trash at D1).
    pub fn new(backend: impl LiquidHandlerBackend + 'static) -> Self {
        Self::with_deck(backend, FlexDeck::new())
    }

    /// Handler with a caller-provided deck.
    pub fn with_deck(backend: impl LiquidHandlerBackend + 'static, deck: FlexDeck) -> Self {
        let head = vec![None; backend.num_channels()];
        Self {
            deck,
            backend: Box::new(backend),
            head,
            is_setup: false,
        }
    }

    pub fn deck(&self) -> &FlexDeck {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut FlexDeck {
        &mut self.deck
    }

    pub fn num_channels(&self) -> usize {
        self.head.len()
    }

    /// Whether the given channel currently holds a tip.
    pub fn channel_has_tip(&self, channel: usize) -> bool {
        self.head.get(channel).is_some_and(Option::is_some)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Set up the backend and replay the current deck assignment to it.
    pub async fn setup(&mut self) -> Result<()> {
        if self.is_setup {
            return Err(LabError::Setup("handler is already set up".into()));
        }
        self.backend.setup().await?;
        // Some backends only learn their channel count during setup.
        self.head.resize(self.backend.num_channels(), None);
        for slot in SLOT_NAMES {
            if let Some(resource) = self.deck.resource_at_slot(slot) {
                self.backend
                    .assigned_resource(resource, Some(slot))
                    .await?;
            }
        }
        self.is_setup = true;
        tracing::info!(channels = self.head.len(), "liquid handler ready");
        Ok(())
    }

    /// Stop the backend. The deck layout is kept.
    pub async fn stop(&mut self) -> Result<()> {
        self.backend.stop().await?;
        self.is_setup = false;
        Ok(())
    }

    fn ensure_setup(&self) -> Result<()> {
        if self.is_setup {
            Ok(())
        } else {
            Err(LabError::Setup("call setup() before running operations".into()))
        }
    }

    // -------------------------------------------------------------------------
    // Resource assignment
    // -------------------------------------------------------------------------

    /// Assign labware at a deck slot.
    ///
    /// With `replace`, an existing resource of the same name is unassigned
    /// first; without it, reusing a name is [`LabError::DuplicateResource`].
    pub async fn assign_resource(
        &mut self,
        resource: Resource,
        slot: &str,
        replace: bool,
    ) -> Result<()> {
        if replace && self.deck.get(resource.name()).is_some() {
            let name = resource.name().to_string();
            self.unassign_resource(&name).await?;
        }
        let name = resource.name().to_string();
        self.deck.assign_child_at_slot(resource, slot)?;
        if self.is_setup {
            if let Some(resource) = self.deck.get(&name) {
                self.backend.assigned_resource(resource, Some(slot)).await?;
            }
        }
        Ok(())
    }

    /// Remove slot-level labware from the deck.
    pub async fn unassign_resource(&mut self, name: &str) -> Result<Resource> {
        let removed = self.deck.unassign_child(name)?;
        if self.is_setup {
            self.backend.unassigned_resource(name).await?;
        }
        Ok(removed)
    }

    /// Look up any resource on the deck by name.
    pub fn get_resource(&self, name: &str) -> Option<&Resource> {
        self.deck.get(name)
    }

    /// Deck occupancy summary.
    ///
    /// Errors until at least one piece of labware besides the trash has
    /// been assigned, which catches protocols run against an empty deck.
    pub fn summary(&self) -> Result<String> {
        let occupied = SLOT_NAMES.iter().any(|slot| {
            self.deck
                .resource_at_slot(slot)
                .is_some_and(|r| r.name() != "trash_container")
        });
        if !occupied {
            return Err(LabError::Setup(
                "no resources assigned; assign labware before asking for a summary".into(),
            ));
        }
        Ok(self.deck.summary())
    }

    // -------------------------------------------------------------------------
    // Tip handling
    // -------------------------------------------------------------------------

    fn resolve_channels(&self, n_ops: usize, use_channels: Option<&[usize]>) -> Result<Vec<usize>> {
        let channels: Vec<usize> = match use_channels {
            Some(chs) => chs.to_vec(),
            None => (0..n_ops).collect(),
        };
        if channels.len() != n_ops {
            return Err(LabError::NoChannel(format!(
                "{} operations but {} channels",
                n_ops,
                channels.len()
            )));
        }
        if let Some(bad) = channels.iter().find(|&&c| c >= self.head.len()) {
            return Err(LabError::NoChannel(format!(
                "channel {bad} out of range (0..{})",
                self.head.len()
            )));
        }
        // A channel can only serve one op per batch.
        for (i, &c) in channels.iter().enumerate() {
            if channels[..i].contains(&c) {
                return Err(LabError::NoChannel(format!("channel {c} used twice")));
            }
        }
        Ok(channels)
    }

    fn located(&self, name: &str) -> Result<Coordinate> {
        self.deck
            .absolute_location(name)
            .ok_or_else(|| LabError::ResourceNotFound(name.to_string()))
    }

    /// Pick up tips from `rack` at the given spot identifiers.
    ///
    /// Channel `use_channels[i]` (default `0..n`) picks up from `spots[i]`.
    pub async fn pick_up_tips(
        &mut self,
        rack: &str,
        spots: &[&str],
        use_channels: Option<&[usize]>,
    ) -> Result<()> {
        self.ensure_setup()?;
        let channels = self.resolve_channels(spots.len(), use_channels)?;

        let mut ops = Vec::with_capacity(spots.len());
        for (&spot, &channel) in spots.iter().zip(&channels) {
            if self.head[channel].is_some() {
                return Err(LabError::HasTip(format!("channel {channel}")));
            }
            let rack_res = self
                .deck
                .get(rack)
                .ok_or_else(|| LabError::ResourceNotFound(rack.to_string()))?;
            let spot_res = rack_res.item(spot)?;
            let tip = *spot_res
                .tip()
                .ok_or_else(|| LabError::NoTip(spot_res.name().to_string()))?;
            if !spot_res.has_tip() {
                return Err(LabError::NoTip(spot_res.name().to_string()));
            }
            ops.push(Pickup {
                resource: spot_res.name().to_string(),
                labware: rack.to_string(),
                location: self.located(spot_res.name())?,
                offset: None,
                tip,
            });
        }

        self.backend.pick_up_tips(&ops, &channels).await?;

        for (op, &channel) in ops.iter().zip(&channels) {
            if let Some(spot) = self.deck.get_mut(&op.resource) {
                let tip = spot.take_tip()?;
                self.head[channel] = Some(tip);
            }
        }
        Ok(())
    }

    /// Return tips to `rack` at the given spot identifiers.
    pub async fn drop_tips(
        &mut self,
        rack: &str,
        spots: &[&str],
        use_channels: Option<&[usize]>,
    ) -> Result<()> {
        self.ensure_setup()?;
        let channels = self.resolve_channels(spots.len(), use_channels)?;

        let mut ops = Vec::with_capacity(spots.len());
        for (&spot, &channel) in spots.iter().zip(&channels) {
            let tip = self.head[channel]
                .ok_or_else(|| LabError::NoTip(format!("channel {channel}")))?;
            let rack_res = self
                .deck
                .get(rack)
                .ok_or_else(|| LabError::ResourceNotFound(rack.to_string()))?;
            let spot_res = rack_res.item(spot)?;
            if spot_res.has_tip() {
                return Err(LabError::HasTip(spot_res.name().to_string()));
            }
            ops.push(Drop {
                resource: spot_res.name().to_string(),
                labware: rack.to_string(),
                location: self.located(spot_res.name())?,
                offset: None,
                tip,
            });
        }

        self.backend.drop_tips(&ops, &channels).await?;

        for (op, &channel) in ops.iter().zip(&channels) {
            if let Some(spot) = self.deck.get_mut(&op.resource) {
                spot.place_tip()?;
            }
            self.head[channel] = None;
        }
        Ok(())
    }

    /// Drop tips into the fixed trash.
    ///
    /// Without explicit channels, every channel currently holding a tip
    /// discards it.
    pub async fn discard_tips(&mut self, use_channels: Option<&[usize]>) -> Result<()> {
        self.ensure_setup()?;
        let channels: Vec<usize> = match use_channels {
            Some(chs) => chs.to_vec(),
            None => (0..self.head.len())
                .filter(|&c| self.head[c].is_some())
                .collect(),
        };
        if channels.is_empty() {
            return Ok(());
        }

        let location = self.located("trash")?;
        let mut ops = Vec::with_capacity(channels.len());
        for &channel in &channels {
            let tip = self.head[channel]
                .ok_or_else(|| LabError::NoTip(format!("channel {channel}")))?;
            ops.push(Drop {
                resource: "trash".to_string(),
                labware: "trash_container".to_string(),
                location,
                offset: None,
                tip,
            });
        }

        self.backend.drop_tips(&ops, &channels).await?;

        for &channel in &channels {
            self.head[channel] = None;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Liquid handling
    // -------------------------------------------------------------------------

    /// Aspirate `volumes[i]` from `labware` well `wells[i]`.
    pub async fn aspirate(
        &mut self,
        labware: &str,
        wells: &[&str],
        volumes: &[f64],
        use_channels: Option<&[usize]>,
        flow_rate: Option<f64>,
    ) -> Result<()> {
        self.ensure_setup()?;
        if wells.len() != volumes.len() {
            return Err(LabError::NoChannel(format!(
                "{} wells but {} volumes",
                wells.len(),
                volumes.len()
            )));
        }
        let channels = self.resolve_channels(wells.len(), use_channels)?;

        let mut ops = Vec::with_capacity(wells.len());
        for ((&well, &volume), &channel) in wells.iter().zip(volumes).zip(&channels) {
            if self.head[channel].is_none() {
                return Err(LabError::NoTip(format!("channel {channel}")));
            }
            let labware_res = self
                .deck
                .get(labware)
                .ok_or_else(|| LabError::ResourceNotFound(labware.to_string()))?;
            let well_res = labware_res.item(well)?;
            if let Some(tracker) = well_res.tracker() {
                if tracker.is_enabled() && volume > tracker.current_volume() {
                    return Err(VolumeError::TooLittleLiquid {
                        requested: volume,
                        available: tracker.current_volume(),
                    }
                    .into());
                }
            }
            ops.push(Aspiration {
                resource: well_res.name().to_string(),
                labware: labware.to_string(),
                location: self.located(well_res.name())?,
                offset: None,
                volume,
                flow_rate,
            });
        }

        self.backend.aspirate(&ops, &channels).await?;

        for op in &ops {
            if let Some(tracker) = self.deck.get_mut(&op.resource).and_then(Resource::tracker_mut)
            {
                tracker.aspirate(op.volume)?;
            }
        }
        Ok(())
    }

    /// Dispense `volumes[i]` into `labware` well `wells[i]`.
    #[allow(clippy::too_many_arguments)]
    pub async fn dispense(
        &mut self,
        labware: &str,
        wells: &[&str],
        volumes: &[f64],
        use_channels: Option<&[usize]>,
        flow_rate: Option<f64>,
        push_out: Option<f64>,
    ) -> Result<()> {
        self.ensure_setup()?;
        if wells.len() != volumes.len() {
            return Err(LabError::NoChannel(format!(
                "{} wells but {} volumes",
                wells.len(),
                volumes.len()
            )));
        }
        let channels = self.resolve_channels(wells.len(), use_channels)?;

        let mut ops = Vec::with_capacity(wells.len());
        for ((&well, &volume), &channel) in wells.iter().zip(volumes).zip(&channels) {
            if self.head[channel].is_none() {
                return Err(LabError::NoTip(format!("channel {channel}")));
            }
            let labware_res = self
                .deck
                .get(labware)
                .ok_or_else(|| LabError::ResourceNotFound(labware.to_string()))?;
            let well_res = labware_res.item(well)?;
            if let Some(tracker) = well_res.tracker() {
                if tracker.is_enabled() && volume > tracker.free_volume() {
                    return Err(VolumeError::TooLittleVolume {
                        requested: volume,
                        free: tracker.free_volume(),
                    }
                    .into());
                }
            }
            ops.push(Dispense {
                resource: well_res.name().to_string(),
                labware: labware.to_string(),
                location: self.located(well_res.name())?,
                offset: None,
                volume,
                flow_rate,
                push_out,
            });
        }

        self.backend.dispense(&ops, &channels).await?;

        for op in &ops {
            if let Some(tracker) = self.deck.get_mut(&op.resource).and_then(Resource::tracker_mut)
            {
                tracker.dispense(op.volume)?;
            }
        }
        Ok(())
    }

    /// Aspirate from one well and dispense into another with channel 0.
    pub async fn transfer(
        &mut self,
        source_labware: &str,
        source_well: &str,
        target_labware: &str,
        target_well: &str,
        volume: f64,
    ) -> Result<()> {
        self.aspirate(source_labware, &[source_well], &[volume], Some(&[0]), None)
            .await?;
        self.dispense(
            target_labware,
            &[target_well],
            &[volume],
            Some(&[0]),
            None,
            None,
        )
        .await
    }

    // -------------------------------------------------------------------------
    // 96-head operations
    // -------------------------------------------------------------------------

    /// Pick up a full rack of tips with the 96-head.
    pub async fn pick_up_tips96(&mut self, rack: &str) -> Result<()> {
        self.ensure_setup()?;
        let op = PickupTipRack {
            resource: rack.to_string(),
            location: self.located(rack)?,
        };
        self.backend.pick_up_tips96(&op).await?;
        if let Some(rack_res) = self.deck.get_mut(rack) {
            for spot in rack_res.children_mut() {
                // Spots already empty are skipped; a partially used rack is
                // a caller decision the 96-head cannot see.
                let _ = spot.take_tip();
            }
        }
        Ok(())
    }

    /// Drop a full rack of tips with the 96-head.
    pub async fn drop_tips96(&mut self, rack: &str) -> Result<()> {
        self.ensure_setup()?;
        let op = DropTipRack {
            resource: rack.to_string(),
            location: self.located(rack)?,
        };
        self.backend.drop_tips96(&op).await?;
        if let Some(rack_res) = self.deck.get_mut(rack) {
            for spot in rack_res.children_mut() {
                let _ = spot.place_tip();
            }
        }
        Ok(())
    }

    /// Aspirate `volume` uL from every well of `plate` with the 96-head.
    ///
    /// Every well is validated before the backend runs, so a single short
    /// well rejects the whole operation without touching any tracker.
    pub async fn aspirate96(&mut self, plate: &str, volume: f64) -> Result<()> {
        self.ensure_setup()?;
        if let Some(plate_res) = self.deck.get(plate) {
            for well in plate_res.children() {
                if let Some(tracker) = well.tracker() {
                    if tracker.is_enabled() && volume > tracker.current_volume() {
                        return Err(VolumeError::TooLittleLiquid {
                            requested: volume,
                            available: tracker.current_volume(),
                        }
                        .into());
                    }
                }
            }
        }
        let op = AspirationPlate {
            resource: plate.to_string(),
            location: self.located(plate)?,
            volume,
            flow_rate: None,
        };
        self.backend.aspirate96(&op).await?;
        if let Some(plate_res) = self.deck.get_mut(plate) {
            for well in plate_res.children_mut() {
                if let Some(tracker) = well.tracker_mut() {
                    tracker.aspirate(volume)?;
                }
            }
        }
        Ok(())
    }

    /// Dispense `volume` uL into every well of `plate` with the 96-head.
    ///
    /// Every well is validated before the backend runs, so a single
    /// near-full well rejects the whole operation without touching any
    /// tracker.
    pub async fn dispense96(&mut self, plate: &str, volume: f64) -> Result<()> {
        self.ensure_setup()?;
        if let Some(plate_res) = self.deck.get(plate) {
            for well in plate_res.children() {
                if let Some(tracker) = well.tracker() {
                    if tracker.is_enabled() && volume > tracker.free_volume() {
                        return Err(VolumeError::TooLittleVolume {
                            requested: volume,
                            free: tracker.free_volume(),
                        }
                        .into());
                    }
                }
            }
        }
        let op = DispensePlate {
            resource: plate.to_string(),
            location: self.located(plate)?,
            volume,
            flow_rate: None,
        };
        self.backend.dispense96(&op).await?;
        if let Some(plate_res) = self.deck.get_mut(plate) {
            for well in plate_res.children_mut() {
                if let Some(tracker) = well.tracker_mut() {
                    tracker.dispense(volume)?;
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Labware moves
    // -------------------------------------------------------------------------

    /// Move slot-level labware to another slot with the gripper.
    pub async fn move_resource(&mut self, name: &str, to_slot: &str) -> Result<()> {
        self.ensure_setup()?;
        let to_location =
            slot_location(to_slot).ok_or_else(|| LabError::InvalidSlot(to_slot.to_string()))?;
        let op = Move {
            resource: name.to_string(),
            to_slot: to_slot.to_string(),
            to_location,
            pickup_offset: None,
            drop_offset: None,
        };
        self.backend.move_resource(&op).await?;
        let resource = self.deck.unassign_child(name)?;
        self.deck.assign_child_at_slot(resource, to_slot)
    }

    /// Home the gantry.
    pub async fn home(&mut self) -> Result<()> {
        self.ensure_setup()?;
        self.backend.home().await
    }
}
