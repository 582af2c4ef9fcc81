//! Conversions between simulation types and wire types.

use crate::simulation::{Snapshot, SphereSnapshot};
use sphere_sim_shared::config::PhysicsConfig;
use sphere_sim_shared::protocol::{
    round4, round4_array, BoundsWire, SphereWire, StateMsg, WelcomeMsg, PROTOCOL_VERSION,
};

pub use sphere_sim_shared::protocol::{
    AddSphereRequest, AddSphereResponse, ClientMsg, DeleteSphereRequest, ErrorResponse,
    MessageResponse, ServerMsg,
};

impl From<&SphereSnapshot> for SphereWire {
    fn from(sphere: &SphereSnapshot) -> Self {
        Self {
            id: sphere.id,
            position: round4_array(sphere.position.to_array()),
            radius: round4(sphere.radius),
        }
    }
}

/// Wire form of a snapshot. Bounds are sent unrounded.
pub fn state_msg(snapshot: &Snapshot) -> StateMsg {
    StateMsg {
        spheres: snapshot.spheres.iter().map(SphereWire::from).collect(),
        bounds: BoundsWire {
            min: snapshot.bounds_min.to_array(),
            max: snapshot.bounds_max.to_array(),
        },
    }
}

pub fn welcome_msg(config: &PhysicsConfig) -> WelcomeMsg {
    WelcomeMsg {
        protocol_version: PROTOCOL_VERSION,
        server_version: env!("CARGO_PKG_VERSION").to_string(),
        config: *config,
    }
}
