use crate::vec3::{dot, length_sq, Vec3};
use sphere_sim_shared::config::PhysicsConfig;

/// Rigid sphere moving at constant velocity between collisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub id: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    radius: f64,
    mass: f64,
}

impl Sphere {
    /// Create a sphere. Radius is clamped to `min_radius`; mass comes from
    /// the clamped radius and is fixed for the sphere's lifetime.
    pub fn new(
        id: u32,
        position: Vec3,
        velocity: Vec3,
        radius: f64,
        config: &PhysicsConfig,
    ) -> Self {
        let radius = radius.max(config.min_radius);
        Self {
            id,
            position,
            velocity,
            radius,
            mass: config.mass_for_radius(radius),
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f64 {
        1.0 / self.mass
    }

    /// Advance position by `dt` seconds. Velocity is untouched.
    pub fn update(&mut self, dt: f64) {
        debug_assert!(dt >= 0.0, "negative sub-step: {}", dt);
        if dt > 0.0 {
            self.position += self.velocity * dt;
        }
    }

    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * length_sq(self.velocity)
    }

    /// Closing speed along `normal` relative to `other` (negative = approaching).
    pub fn approach_speed(&self, other: &Sphere, normal: Vec3) -> f64 {
        dot(self.velocity - other.velocity, normal)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3::vec3;

    fn config() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    #[test]
    fn radius_below_minimum_is_clamped() {
        let s = Sphere::new(0, Vec3::ZERO, Vec3::ZERO, 0.05, &config());
        assert_eq!(s.radius(), 0.1);
    }

    #[test]
    fn mass_is_derived_from_volume() {
        let s = Sphere::new(0, Vec3::ZERO, Vec3::ZERO, 2.0, &config());
        let expected = 4.0 / 3.0 * std::f64::consts::PI * 8.0;
        assert!((s.mass() - expected).abs() < 1e-9);
        assert!((s.inverse_mass() * s.mass() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tiny_sphere_mass_is_floored() {
        let s = Sphere::new(0, Vec3::ZERO, Vec3::ZERO, 0.1, &config());
        assert_eq!(s.mass(), 0.1);
    }

    #[test]
    fn update_moves_along_velocity() {
        let mut s = Sphere::new(0, vec3(1.0, 2.0, 3.0), vec3(2.0, 0.0, -4.0), 1.0, &config());
        s.update(0.5);
        assert_eq!(s.position, vec3(2.0, 2.0, 1.0));
        assert_eq!(s.velocity, vec3(2.0, 0.0, -4.0));
    }

    #[test]
    fn update_with_zero_dt_is_noop() {
        let mut s = Sphere::new(0, vec3(1.0, 2.0, 3.0), vec3(2.0, 0.0, -4.0), 1.0, &config());
        let before = s.clone();
        s.update(0.0);
        assert_eq!(s, before);
    }

    #[test]
    fn kinetic_energy_and_momentum() {
        let s = Sphere::new(0, Vec3::ZERO, vec3(3.0, 4.0, 0.0), 1.0, &config());
        assert!((s.kinetic_energy() - 0.5 * s.mass() * 25.0).abs() < 1e-9);
        assert!((s.momentum().x - 3.0 * s.mass()).abs() < 1e-9);
    }
}
