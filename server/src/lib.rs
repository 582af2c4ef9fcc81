//! Sphere simulation server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod collision;
pub mod config;
pub mod http;
pub mod protocol;
pub mod scenario;
pub mod sim_loop;
pub mod simulation;
pub mod sphere;
pub mod ws;

pub use sphere_sim_shared::vec3;
