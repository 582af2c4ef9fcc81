use crate::vec3::{vec3, Vec3};
use sphere_sim_shared::config::PhysicsConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Simulation steps per second (33 Hz ≈ one step every 30 ms)
    pub tick_rate_hz: u32,
    /// WebSocket state pushes per second
    pub broadcast_rate_hz: u32,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    /// Seed for the random part of the initial configuration
    pub rng_seed: u64,
    /// Random spheres added after the fixed ones on reset
    pub random_spheres: usize,
    /// Directory served as the fallback route (renderer assets)
    pub static_dir: Option<String>,
    pub physics: PhysicsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            tick_rate_hz: 33,
            broadcast_rate_hz: 15,
            bounds_min: vec3(-15.0, -10.0, -15.0),
            bounds_max: vec3(15.0, 10.0, 15.0),
            rng_seed: 42,
            random_spheres: 6,
            static_dir: None,
            physics: PhysicsConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 {
            return Err("tick_rate_hz must be > 0".to_string());
        }
        if self.broadcast_rate_hz == 0 || self.broadcast_rate_hz > self.tick_rate_hz {
            return Err("broadcast_rate_hz must be within 1..=tick_rate_hz".to_string());
        }
        if !self.bounds_min.is_finite() || !self.bounds_max.is_finite() {
            return Err("bounds must be finite".to_string());
        }
        for axis in 0..3 {
            if self.bounds_min.axis(axis) > self.bounds_max.axis(axis) {
                return Err(format!("bounds_min exceeds bounds_max on axis {}", axis));
            }
        }
        self.physics.validate()
    }

    /// Ticks between two WebSocket state pushes
    pub fn broadcast_every_n(&self) -> u64 {
        (self.tick_rate_hz / self.broadcast_rate_hz).max(1) as u64
    }
}
