use crate::collision::{resolve_pair, resolve_walls};
use crate::scenario::Scenario;
use crate::sphere::Sphere;
use crate::vec3::Vec3;
use sphere_sim_shared::config::PhysicsConfig;
use std::time::Instant;

/// Read-only view of one sphere for external consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSnapshot {
    pub id: u32,
    pub position: Vec3,
    pub radius: f64,
}

/// Consistent post-step view of the whole simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub spheres: Vec<SphereSnapshot>,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
}

/// Spheres in a fixed axis-aligned box.
///
/// Spheres are kept in insertion order; pairs are resolved in ascending
/// index order `(0,1), (0,2), .. (1,2), ..` so runs are reproducible.
pub struct Simulation {
    spheres: Vec<Sphere>,
    bounds_min: Vec3,
    bounds_max: Vec3,
    config: PhysicsConfig,
    scenario: Scenario,
    next_id: u32,
    last_update: Instant,
}

impl Simulation {
    /// Create a simulation populated with `scenario`.
    pub fn new(bounds_min: Vec3, bounds_max: Vec3, config: PhysicsConfig, scenario: Scenario) -> Self {
        debug_assert!(
            bounds_min.x <= bounds_max.x && bounds_min.y <= bounds_max.y && bounds_min.z <= bounds_max.z,
            "inverted bounds {:?} / {:?}",
            bounds_min,
            bounds_max
        );
        let mut sim = Self {
            spheres: Vec::new(),
            bounds_min,
            bounds_max,
            config,
            scenario,
            next_id: 0,
            last_update: Instant::now(),
        };
        sim.reset();
        sim
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bounds_min, self.bounds_max)
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn sphere(&self, id: u32) -> Option<&Sphere> {
        self.spheres.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    pub fn last_update(&self) -> Instant {
        self.last_update
    }

    /// Advance by the wall-clock time elapsed since the previous step.
    /// A `now` earlier than the last step is ignored and does not rewind the clock.
    pub fn step(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.advance(dt);
        self.last_update = self.last_update.max(now);
    }

    /// Advance by `dt` seconds, capped at `max_step` and split into sub-steps.
    pub fn advance(&mut self, dt: f64) {
        let dt = dt.min(self.config.max_step);
        if dt.is_nan() || dt <= 0.0 {
            return;
        }

        let sub_dt = dt / self.config.sub_steps as f64;
        for _ in 0..self.config.sub_steps {
            self.sub_step(sub_dt);
        }
    }

    fn sub_step(&mut self, sub_dt: f64) {
        for sphere in &mut self.spheres {
            sphere.update(sub_dt);
        }

        for sphere in &mut self.spheres {
            resolve_walls(sphere, self.bounds_min, self.bounds_max, self.config.wall_damping);
        }

        let n = self.spheres.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.spheres.split_at_mut(j);
                resolve_pair(&mut head[i], &mut tail[0], &self.config);
            }
        }

        debug_assert!(
            self.spheres.iter().all(Sphere::is_finite),
            "non-finite sphere state after sub-step"
        );
    }

    /// Add a sphere and return its id. Radius is clamped, never rejected.
    /// No overlap check is made against existing spheres.
    pub fn add_sphere(&mut self, position: Vec3, velocity: Vec3, radius: f64) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.spheres
            .push(Sphere::new(id, position, velocity, radius, &self.config));
        id
    }

    /// Remove the sphere with `id`. Returns false if there was none.
    pub fn remove_sphere_by_id(&mut self, id: u32) -> bool {
        match self.spheres.iter().position(|s| s.id == id) {
            Some(index) => {
                // `remove` keeps the pair order of the remaining spheres
                self.spheres.remove(index);
                true
            }
            None => false,
        }
    }

    /// Restore the initial configuration and restart id assignment.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.spheres.clear();
        self.next_id = 0;
        for spec in self.scenario.build(self.bounds_min, self.bounds_max) {
            self.add_sphere(spec.position, spec.velocity, spec.radius);
        }
        self.last_update = now;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            spheres: self
                .spheres
                .iter()
                .map(|s| SphereSnapshot {
                    id: s.id,
                    position: s.position,
                    radius: s.radius(),
                })
                .collect(),
            bounds_min: self.bounds_min,
            bounds_max: self.bounds_max,
        }
    }

    /// Sum of mass * velocity over all spheres
    pub fn total_momentum(&self) -> Vec3 {
        self.spheres
            .iter()
            .fold(Vec3::ZERO, |acc, s| acc + s.momentum())
    }

    /// Sum of kinetic energy over all spheres
    pub fn kinetic_energy(&self) -> f64 {
        self.spheres.iter().map(Sphere::kinetic_energy).sum()
    }
}
