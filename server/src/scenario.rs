use crate::vec3::{vec3, Vec3};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Velocity components of random spheres are drawn from `[-RANDOM_SPEED, RANDOM_SPEED]`.
const RANDOM_SPEED: f64 = 8.0;
/// Random spheres keep this distance from every face at spawn.
const SPAWN_MARGIN: f64 = 1.0;
const RANDOM_RADIUS_MIN: f64 = 0.3;
const RANDOM_RADIUS_MAX: f64 = 0.8;

/// One sphere of an initial configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSpec {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f64,
}

impl SphereSpec {
    pub fn new(position: Vec3, velocity: Vec3, radius: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }
}

/// The configuration a simulation starts from and returns to on reset.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    fixed: Vec<SphereSpec>,
    random_count: usize,
    seed: u64,
}

impl Scenario {
    pub fn new(fixed: Vec<SphereSpec>, random_count: usize, seed: u64) -> Self {
        Self {
            fixed,
            random_count,
            seed,
        }
    }

    /// No spheres at all.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0)
    }

    /// Four hand-placed spheres plus `random_count` seeded random ones.
    pub fn standard(random_count: usize, seed: u64) -> Self {
        let fixed = vec![
            SphereSpec::new(vec3(-5.0, 0.0, 0.0), vec3(15.0, 5.0, 2.0), 1.0),
            SphereSpec::new(vec3(5.0, 1.0, -1.0), vec3(-10.0, 2.0, -3.0), 1.5),
            SphereSpec::new(vec3(0.0, -6.0, 2.0), vec3(2.0, 10.0, 0.0), 0.8),
            SphereSpec::new(vec3(0.0, 6.0, -2.0), vec3(-3.0, -12.0, 5.0), 1.2),
        ];
        Self::new(fixed, random_count, seed)
    }

    /// Expand into concrete spheres for the given box. The rng is re-seeded
    /// on every call so the result only depends on the scenario and bounds.
    pub fn build(&self, bounds_min: Vec3, bounds_max: Vec3) -> Vec<SphereSpec> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut specs = self.fixed.clone();
        specs.reserve(self.random_count);

        for _ in 0..self.random_count {
            let position = vec3(
                uniform(&mut rng, bounds_min.x + SPAWN_MARGIN, bounds_max.x - SPAWN_MARGIN),
                uniform(&mut rng, bounds_min.y + SPAWN_MARGIN, bounds_max.y - SPAWN_MARGIN),
                uniform(&mut rng, bounds_min.z + SPAWN_MARGIN, bounds_max.z - SPAWN_MARGIN),
            );
            let velocity = vec3(
                uniform(&mut rng, -RANDOM_SPEED, RANDOM_SPEED),
                uniform(&mut rng, -RANDOM_SPEED, RANDOM_SPEED),
                uniform(&mut rng, -RANDOM_SPEED, RANDOM_SPEED),
            );
            let radius = uniform(&mut rng, RANDOM_RADIUS_MIN, RANDOM_RADIUS_MAX);
            specs.push(SphereSpec::new(position, velocity, radius));
        }

        specs
    }

    pub fn len(&self) -> usize {
        self.fixed.len() + self.random_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Uniform sample in `[lo, hi]`; collapses to the midpoint when the range is empty.
fn uniform(rng: &mut impl Rng, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return (lo + hi) * 0.5;
    }
    rng.gen_range(lo..=hi)
}
