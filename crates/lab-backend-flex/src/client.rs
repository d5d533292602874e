//! Thin client for the Opentrons HTTP API (port 31950).
//!
//! Commands are posted to the current run with `waitUntilComplete=true` and
//! checked for a `succeeded` status, so every method returns only after the
//! robot has finished (or refused) the motion.

use lab_core::{Coordinate, LabError, Result};
use serde_json::{json, Value};

const API_VERSION_HEADER: (&str, &str) = ("Opentrons-Version", "*");

fn http_err(e: reqwest::Error) -> LabError {
    LabError::Backend(e.to_string())
}

/// A labware definition registered with the current run.
#[derive(Debug, Clone)]
pub struct DefinitionUri {
    pub namespace: String,
    pub load_name: String,
    pub version: u32,
}

/// HTTP client bound to one robot, and after [`FlexClient::create_run`], to
/// one run.
#[derive(Debug)]
pub struct FlexClient {
    http: reqwest::Client,
    base: String,
    run_id: Option<String>,
}

impl FlexClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: format!("http://{host}:{port}"),
            run_id: None,
        }
    }

    fn run_id(&self) -> Result<&str> {
        self.run_id
            .as_deref()
            .ok_or_else(|| LabError::Setup("no active run; call setup() first".into()))
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let resp = self
            .http
            .get(format!("{}{path}", self.base))
            .header(API_VERSION_HEADER.0, API_VERSION_HEADER.1)
            .send()
            .await
            .map_err(http_err)?;
        let status = resp.status();
        let body: Value = resp.json().await.map_err(http_err)?;
        if !status.is_success() {
            return Err(LabError::Backend(format!("GET {path} failed ({status}): {body}")));
        }
        Ok(body)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .post(format!("{}{path}", self.base))
            .header(API_VERSION_HEADER.0, API_VERSION_HEADER.1)
            .json(body)
            .send()
            .await
            .map_err(http_err)?;
        let status = resp.status();
        let body: Value = resp.json().await.map_err(http_err)?;
        if !status.is_success() {
            return Err(LabError::Backend(format!("POST {path} failed ({status}): {body}")));
        }
        Ok(body)
    }

    /// Post a command to the current run and wait for it to complete.
    async fn command(&self, command_type: &str, params: Value) -> Result<Value> {
        let run_id = self.run_id()?;
        tracing::debug!(command = command_type, %params, "robot command");
        let body = json!({
            "data": {
                "commandType": command_type,
                "params": params,
                "intent": "setup",
            }
        });
        let path = format!("/runs/{run_id}/commands?waitUntilComplete=true");
        let response = self.post(&path, &body).await?;
        let data = &response["data"];
        if data["status"] == "succeeded" {
            Ok(data.clone())
        } else {
            Err(LabError::Backend(format!(
                "{command_type} failed: {}",
                data["error"]
            )))
        }
    }

    // -------------------------------------------------------------------------
    // Robot-level endpoints
    // -------------------------------------------------------------------------

    /// Robot software version from `/health`.
    pub async fn api_version(&self) -> Result<String> {
        let health = self.get("/health").await?;
        health["api_version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LabError::Backend(format!("malformed /health response: {health}")))
    }

    /// Pipette model names attached at each mount, from `/pipettes`.
    pub async fn attached_pipettes(&self) -> Result<(Option<String>, Option<String>)> {
        let pipettes = self.get("/pipettes").await?;
        let name = |mount: &str| {
            pipettes[mount]["name"]
                .as_str()
                .filter(|n| !n.is_empty())
                .map(str::to_string)
        };
        Ok((name("left"), name("right")))
    }

    /// Home the whole robot.
    pub async fn home(&self) -> Result<()> {
        self.post("/robot/home", &json!({ "target": "robot" })).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Run management
    // -------------------------------------------------------------------------

    /// Create a run and bind this client to it.
    pub async fn create_run(&mut self) -> Result<String> {
        let response = self.post("/runs", &json!({ "data": {} })).await?;
        let run_id = response["data"]["id"]
            .as_str()
            .ok_or_else(|| LabError::Backend(format!("malformed run response: {response}")))?
            .to_string();
        tracing::info!(%run_id, "created robot run");
        self.run_id = Some(run_id.clone());
        Ok(run_id)
    }

    /// Load a pipette into the run, returning its run-scoped id.
    pub async fn load_pipette(&self, name: &str, mount: &str) -> Result<String> {
        let data = self
            .command("loadPipette", json!({ "pipetteName": name, "mount": mount }))
            .await?;
        data["result"]["pipetteId"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LabError::Backend(format!("loadPipette returned no id: {data}")))
    }

    // -------------------------------------------------------------------------
    // Labware
    // -------------------------------------------------------------------------

    /// Register a labware definition with the run.
    pub async fn add_labware_definition(&self, definition: &Value) -> Result<DefinitionUri> {
        let run_id = self.run_id()?;
        let path = format!("/runs/{run_id}/labware_definitions");
        let response = self.post(&path, &json!({ "data": definition })).await?;
        let uri = response["data"]["definitionUri"]
            .as_str()
            .ok_or_else(|| LabError::Backend(format!("malformed definition response: {response}")))?;
        // "namespace/loadName/version"
        let mut parts = uri.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(load_name), Some(version)) => Ok(DefinitionUri {
                namespace: namespace.to_string(),
                load_name: load_name.to_string(),
                version: version
                    .parse()
                    .map_err(|_| LabError::Backend(format!("bad definition version in '{uri}'")))?,
            }),
            _ => Err(LabError::Backend(format!("bad definition uri '{uri}'"))),
        }
    }

    /// Load defined labware at a location.
    ///
    /// `location` is a robot location object, e.g. `{"slotName": "C1"}` or
    /// `{"addressableAreaName": "A4"}`.
    pub async fn load_labware(
        &self,
        uri: &DefinitionUri,
        labware_id: &str,
        display_name: &str,
        location: Value,
    ) -> Result<()> {
        self.command(
            "loadLabware",
            json!({
                "location": location,
                "loadName": uri.load_name,
                "namespace": uri.namespace,
                "version": uri.version,
                "labwareId": labware_id,
                "displayName": display_name,
            }),
        )
        .await?;
        Ok(())
    }

    /// Move labware to a new location with the gripper.
    pub async fn move_labware(
        &self,
        labware_id: &str,
        new_location: Value,
        pickup_offset: Coordinate,
        drop_offset: Coordinate,
    ) -> Result<()> {
        self.command(
            "moveLabware",
            json!({
                "labwareId": labware_id,
                "newLocation": new_location,
                "strategy": "usingGripper",
                "pickUpOffset": { "x": pickup_offset.x, "y": pickup_offset.y, "z": pickup_offset.z },
                "dropOffset": { "x": drop_offset.x, "y": drop_offset.y, "z": drop_offset.z },
            }),
        )
        .await?;
        Ok(())
    }

    /// Move labware off the deck. The API cannot unload a definition, so
    /// removal is modeled as a gripper-less move off deck.
    pub async fn move_labware_off_deck(&self, labware_id: &str) -> Result<()> {
        self.command(
            "moveLabware",
            json!({
                "labwareId": labware_id,
                "newLocation": "offDeck",
                "strategy": "manualMoveWithoutPause",
            }),
        )
        .await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Pipetting commands
    // -------------------------------------------------------------------------

    fn well_location(offset: Coordinate) -> Value {
        json!({
            "origin": "top",
            "offset": { "x": offset.x, "y": offset.y, "z": offset.z },
        })
    }

    pub async fn pick_up_tip(
        &self,
        labware_id: &str,
        well_name: &str,
        pipette_id: &str,
        offset: Coordinate,
    ) -> Result<()> {
        self.command(
            "pickUpTip",
            json!({
                "pipetteId": pipette_id,
                "labwareId": labware_id,
                "wellName": well_name,
                "wellLocation": Self::well_location(offset),
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn drop_tip(
        &self,
        labware_id: &str,
        well_name: &str,
        pipette_id: &str,
        offset: Coordinate,
    ) -> Result<()> {
        self.command(
            "dropTip",
            json!({
                "pipetteId": pipette_id,
                "labwareId": labware_id,
                "wellName": well_name,
                "wellLocation": Self::well_location(offset),
            }),
        )
        .await?;
        Ok(())
    }

    /// Drop the mounted tip at the current gantry position.
    pub async fn drop_tip_in_place(&self, pipette_id: &str) -> Result<()> {
        self.command("dropTipInPlace", json!({ "pipetteId": pipette_id }))
            .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn aspirate(
        &self,
        labware_id: &str,
        well_name: &str,
        pipette_id: &str,
        volume: f64,
        flow_rate: f64,
        offset: Coordinate,
    ) -> Result<()> {
        self.command(
            "aspirate",
            json!({
                "pipetteId": pipette_id,
                "labwareId": labware_id,
                "wellName": well_name,
                "wellLocation": Self::well_location(offset),
                "volume": volume,
                "flowRate": flow_rate,
            }),
        )
        .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn dispense(
        &self,
        labware_id: &str,
        well_name: &str,
        pipette_id: &str,
        volume: f64,
        flow_rate: f64,
        offset: Coordinate,
        push_out: f64,
    ) -> Result<()> {
        self.command(
            "dispense",
            json!({
                "pipetteId": pipette_id,
                "labwareId": labware_id,
                "wellName": well_name,
                "wellLocation": Self::well_location(offset),
                "volume": volume,
                "flowRate": flow_rate,
                "pushOut": push_out,
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn move_to_well(
        &self,
        labware_id: &str,
        well_name: &str,
        pipette_id: &str,
        offset: Coordinate,
    ) -> Result<()> {
        self.command(
            "moveToWell",
            json!({
                "pipetteId": pipette_id,
                "labwareId": labware_id,
                "wellName": well_name,
                "wellLocation": Self::well_location(offset),
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn move_to_coordinates(&self, pipette_id: &str, to: Coordinate) -> Result<()> {
        self.command(
            "moveToCoordinates",
            json!({
                "pipetteId": pipette_id,
                "coordinates": { "x": to.x, "y": to.y, "z": to.z },
            }),
        )
        .await?;
        Ok(())
    }

    /// Retract a gantry axis to its home position, e.g. `"leftZ"`.
    pub async fn retract_axis(&self, axis: &str) -> Result<()> {
        self.command("retractAxis", json!({ "axis": axis })).await?;
        Ok(())
    }

    /// Home the gripper z axis and jaw.
    pub async fn home_gripper(&self) -> Result<()> {
        self.command("home", json!({ "axes": ["extensionZ", "extensionJaw"] }))
            .await?;
        Ok(())
    }
}
