use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::PhysicsConfig;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === State (HTTP body and WebSocket payload) ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
pub struct SphereWire {
    pub id: u32,
    pub position: [f64; 3],
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
pub struct BoundsWire {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
pub struct StateMsg {
    pub spheres: Vec<SphereWire>,
    pub bounds: BoundsWire,
}

// === HTTP request/response bodies ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
pub struct AddSphereRequest {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub radius: f64,
}

impl AddSphereRequest {
    /// Façade-level validation: every number finite, radius positive.
    /// Radii between zero and the physics minimum are accepted and clamped later.
    pub fn validate(&self) -> Result<(), String> {
        if !self.position.iter().all(|v| v.is_finite()) {
            return Err("position must contain three finite numbers".to_string());
        }
        if !self.velocity.iter().all(|v| v.is_finite()) {
            return Err("velocity must contain three finite numbers".to_string());
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err("Radius must be positive.".to_string());
        }
        Ok(())
    }

    /// `validate`, plus the sphere must fit inside `bounds` on every axis.
    pub fn validate_within(&self, bounds: &BoundsWire) -> Result<(), String> {
        self.validate()?;
        let smallest_extent = (0..3)
            .map(|axis| bounds.max[axis] - bounds.min[axis])
            .fold(f64::INFINITY, f64::min);
        if 2.0 * self.radius > smallest_extent {
            return Err(format!(
                "Radius {} does not fit inside the simulation bounds.",
                self.radius
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
pub struct AddSphereResponse {
    pub message: String,
    pub id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
pub struct DeleteSphereRequest {
    pub id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
pub struct ErrorResponse {
    pub error: String,
}

// === WebSocket: Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "state")]
    State(StateMsg),
    #[serde(rename = "sphere_added")]
    SphereAdded { id: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub server_version: String,
    pub config: PhysicsConfig,
}

// === WebSocket: Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../static/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "add_sphere")]
    AddSphere {
        position: [f64; 3],
        velocity: [f64; 3],
        radius: f64,
    },
    #[serde(rename = "delete_sphere")]
    DeleteSphere { id: u32 },
    #[serde(rename = "reset")]
    Reset,
}

// === Conversion helpers ===

/// Round to 4 decimal places (plenty for rendering, keeps JSON small)
#[inline]
pub fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}

/// Round every component of a triple to 4 decimal places
#[inline]
pub fn round4_array(v: [f64; 3]) -> [f64; 3] {
    [round4(v[0]), round4(v[1]), round4(v[2])]
}
