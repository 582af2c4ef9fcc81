//! Types shared between the sphere simulation server and its clients.

pub mod config;
pub mod protocol;
pub mod vec3;
