/// Sphere-sphere restitution. Pair collisions are perfectly elastic.
pub const RESTITUTION: f64 = 1.0;

/// Mass ceiling. Keeps inverse mass nonzero for arbitrarily large radii.
pub const MAX_MASS: f64 = 1e30;

/// Physics configuration. Every numeric constant of the stepping engine lives here.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../static/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PhysicsConfig {
    /// Number of equal sub-steps per external step
    pub sub_steps: u32,
    /// Fraction of the normal velocity kept after a wall bounce
    pub wall_damping: f64,
    /// Mass per unit volume
    pub density: f64,
    /// Squared center distance at or below which a pair is left unresolved
    pub overlap_epsilon: f64,
    /// Radii below this are clamped up to it
    pub min_radius: f64,
    /// Mass floor, keeps inverse mass bounded
    pub min_mass: f64,
    /// Largest delta a single step will integrate (seconds)
    pub max_step: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            sub_steps: 5,
            wall_damping: 0.9,
            density: 1.0,
            overlap_epsilon: 1e-9,
            min_radius: 0.1,
            min_mass: 0.1,
            max_step: 1.0 / 30.0,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sub_steps == 0 {
            return Err("sub_steps must be >= 1".to_string());
        }
        if !self.wall_damping.is_finite() || !(0.0..=1.0).contains(&self.wall_damping) {
            return Err("wall_damping must be within [0, 1]".to_string());
        }
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err("density must be finite and > 0".to_string());
        }
        if !self.overlap_epsilon.is_finite() || self.overlap_epsilon <= 0.0 {
            return Err("overlap_epsilon must be finite and > 0".to_string());
        }
        if !self.min_radius.is_finite() || self.min_radius <= 0.0 {
            return Err("min_radius must be finite and > 0".to_string());
        }
        if !self.min_mass.is_finite() || self.min_mass <= 0.0 || self.min_mass > MAX_MASS {
            return Err("min_mass must be finite, > 0 and <= MAX_MASS".to_string());
        }
        if !self.max_step.is_finite() || self.max_step <= 0.0 {
            return Err("max_step must be finite and > 0".to_string());
        }
        Ok(())
    }

    /// Mass of a sphere of the given radius, kept within `[min_mass, MAX_MASS]`.
    pub fn mass_for_radius(&self, radius: f64) -> f64 {
        let volume = 4.0 / 3.0 * std::f64::consts::PI * radius.powi(3);
        (self.density * volume).clamp(self.min_mass, MAX_MASS)
    }
}
