//! Collision response for spheres in an axis-aligned box.
//!
//! Both resolvers mutate the spheres in place and are free of any other
//! state, so the simulation decides ordering and the tests can drive a
//! single contact in isolation.
//!
//! Walls are handled per axis: a sphere poking through a face is pushed
//! back onto it and its velocity component along that axis is reflected
//! and damped, but only while it still points into the wall.
//!
//! Sphere pairs get two corrections:
//! 1. positional, splitting the overlap by inverse mass so the pair's
//!    center of mass stays put;
//! 2. an impulse along the contact normal, skipped when the spheres are
//!    already separating.

use crate::sphere::Sphere;
use crate::vec3::{length_sq, Vec3};
use sphere_sim_shared::config::{PhysicsConfig, RESTITUTION};

/// Below this inverse-mass sum both bodies are treated as immovable.
const MIN_INV_MASS_SUM: f64 = 1e-9;

/// Outcome of a single pairwise check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairContact {
    /// Not touching.
    Apart,
    /// Centers (nearly) coincide; no normal to resolve along.
    Coincident,
    /// Overlap was corrected. `impulse` is zero when the pair was already separating.
    Resolved { overlap: f64, impulse: f64 },
}

/// Keep `sphere` inside `[min + r, max - r]` on every axis.
/// Returns true if any face was touched.
pub fn resolve_walls(sphere: &mut Sphere, bounds_min: Vec3, bounds_max: Vec3, damping: f64) -> bool {
    let r = sphere.radius();
    let mut hit = false;

    for axis in 0..3 {
        let low = bounds_min.axis(axis) + r;
        let high = bounds_max.axis(axis) - r;
        let pos = sphere.position.axis(axis);
        let vel = sphere.velocity.axis(axis);

        if pos < low {
            *sphere.position.axis_mut(axis) = low;
            if vel < 0.0 {
                *sphere.velocity.axis_mut(axis) = -vel * damping;
            }
            hit = true;
        } else if pos > high {
            *sphere.position.axis_mut(axis) = high;
            if vel > 0.0 {
                *sphere.velocity.axis_mut(axis) = -vel * damping;
            }
            hit = true;
        }
    }

    hit
}

/// Resolve contact between `a` and `b`.
pub fn resolve_pair(a: &mut Sphere, b: &mut Sphere, config: &PhysicsConfig) -> PairContact {
    let delta = a.position - b.position;
    let dist_sq = length_sq(delta);
    let min_dist = a.radius() + b.radius();

    if dist_sq <= config.overlap_epsilon {
        return PairContact::Coincident;
    }
    if dist_sq >= min_dist * min_dist {
        return PairContact::Apart;
    }

    let distance = dist_sq.sqrt();
    let normal = delta * (1.0 / distance);
    let overlap = min_dist - distance;

    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;

    // Two (near) immovable bodies: split the overlap evenly, no impulse
    if inv_sum <= MIN_INV_MASS_SUM {
        a.position += normal * (overlap * 0.5);
        b.position -= normal * (overlap * 0.5);
        return PairContact::Resolved {
            overlap,
            impulse: 0.0,
        };
    }

    a.position += normal * (overlap * inv_a / inv_sum);
    b.position -= normal * (overlap * inv_b / inv_sum);

    let vel_along_normal = a.approach_speed(b, normal);
    if vel_along_normal > 0.0 {
        return PairContact::Resolved {
            overlap,
            impulse: 0.0,
        };
    }

    let j = -(1.0 + RESTITUTION) * vel_along_normal / inv_sum;
    let impulse = normal * j;
    a.velocity += impulse * inv_a;
    b.velocity -= impulse * inv_b;

    PairContact::Resolved {
        overlap,
        impulse: j,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3::{length, vec3};

    fn sphere(id: u32, pos: Vec3, vel: Vec3, radius: f64) -> Sphere {
        Sphere::new(id, pos, vel, radius, &PhysicsConfig::default())
    }

    fn bounds() -> (Vec3, Vec3) {
        (Vec3::splat(-10.0), Vec3::splat(10.0))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "Expected {} to be close to {}",
            actual,
            expected
        );
    }

    #[test]
    fn wall_clamps_and_reflects_with_damping() {
        let (min, max) = bounds();
        let mut s = sphere(0, vec3(9.5, 0.0, 0.0), vec3(5.0, 0.0, 0.0), 1.0);
        assert!(resolve_walls(&mut s, min, max, 0.9));
        assert_close(s.position.x, 9.0);
        assert_close(s.velocity.x, -4.5);
    }

    #[test]
    fn wall_low_side_reflects_positive() {
        let (min, max) = bounds();
        let mut s = sphere(0, vec3(0.0, -9.8, 0.0), vec3(0.0, -2.0, 0.0), 0.5);
        assert!(resolve_walls(&mut s, min, max, 0.9));
        assert_close(s.position.y, -9.5);
        assert_close(s.velocity.y, 1.8);
    }

    #[test]
    fn wall_does_not_flip_velocity_already_leaving() {
        let (min, max) = bounds();
        let mut s = sphere(0, vec3(9.5, 0.0, 0.0), vec3(-3.0, 0.0, 0.0), 1.0);
        assert!(resolve_walls(&mut s, min, max, 0.9));
        assert_close(s.position.x, 9.0);
        assert_close(s.velocity.x, -3.0);
    }

    #[test]
    fn wall_axes_are_independent() {
        let (min, max) = bounds();
        let mut s = sphere(0, vec3(9.5, -9.5, 3.0), vec3(1.0, -1.0, 7.0), 1.0);
        resolve_walls(&mut s, min, max, 0.9);
        assert_eq!(s.position, vec3(9.0, -9.0, 3.0));
        assert_close(s.velocity.x, -0.9);
        assert_close(s.velocity.y, 0.9);
        assert_close(s.velocity.z, 7.0);
    }

    #[test]
    fn wall_inside_box_is_untouched() {
        let (min, max) = bounds();
        let mut s = sphere(0, vec3(1.0, 2.0, 3.0), vec3(1.0, 1.0, 1.0), 1.0);
        let before = s.clone();
        assert!(!resolve_walls(&mut s, min, max, 0.9));
        assert_eq!(s, before);
    }

    #[test]
    fn head_on_equal_masses_exchange_velocities() {
        let mut a = sphere(0, vec3(-0.9, 0.0, 0.0), vec3(2.0, 0.0, 0.0), 1.0);
        let mut b = sphere(1, vec3(0.9, 0.0, 0.0), vec3(-2.0, 0.0, 0.0), 1.0);

        let contact = resolve_pair(&mut a, &mut b, &PhysicsConfig::default());
        match contact {
            PairContact::Resolved { overlap, impulse } => {
                assert_close(overlap, 0.2);
                assert!(impulse > 0.0);
            }
            other => panic!("Expected Resolved, got {:?}", other),
        }

        assert_close(a.velocity.x, -2.0);
        assert_close(b.velocity.x, 2.0);
        assert_close(a.position.x, -1.0);
        assert_close(b.position.x, 1.0);
    }

    #[test]
    fn collision_conserves_momentum() {
        let mut a = sphere(0, vec3(0.0, 0.0, 0.0), vec3(3.0, 1.0, -0.5), 1.5);
        let mut b = sphere(1, vec3(1.2, 0.8, 0.3), vec3(-1.0, 0.0, 2.0), 0.6);
        let before = a.momentum() + b.momentum();

        let contact = resolve_pair(&mut a, &mut b, &PhysicsConfig::default());
        assert!(matches!(contact, PairContact::Resolved { .. }));

        let after = a.momentum() + b.momentum();
        let tolerance = 1e-6 * length(before).max(1.0);
        assert!(length(after - before) < tolerance, "{:?} vs {:?}", before, after);
    }

    #[test]
    fn elastic_collision_conserves_energy() {
        let mut a = sphere(0, vec3(0.0, 0.0, 0.0), vec3(3.0, 1.0, -0.5), 1.5);
        let mut b = sphere(1, vec3(1.2, 0.8, 0.3), vec3(-1.0, 0.0, 2.0), 0.6);
        let before = a.kinetic_energy() + b.kinetic_energy();
        resolve_pair(&mut a, &mut b, &PhysicsConfig::default());
        let after = a.kinetic_energy() + b.kinetic_energy();
        assert!((after - before).abs() < 1e-6 * before);
    }

    #[test]
    fn positional_correction_keeps_center_of_mass() {
        let mut a = sphere(0, vec3(0.0, 0.0, 0.0), Vec3::ZERO, 2.0);
        let mut b = sphere(1, vec3(2.5, 0.0, 0.0), Vec3::ZERO, 1.0);
        let total = a.mass() + b.mass();
        let com_before = (a.position * a.mass() + b.position * b.mass()) * (1.0 / total);

        resolve_pair(&mut a, &mut b, &PhysicsConfig::default());

        let com_after = (a.position * a.mass() + b.position * b.mass()) * (1.0 / total);
        assert!(length(com_after - com_before) < 1e-9);
        assert_close(length(a.position - b.position), 3.0);
        // the light sphere takes most of the correction
        assert!((b.position.x - 2.5).abs() > (a.position.x).abs());
    }

    #[test]
    fn separating_pair_gets_position_fix_only() {
        let mut a = sphere(0, vec3(-0.9, 0.0, 0.0), vec3(-1.0, 0.0, 0.0), 1.0);
        let mut b = sphere(1, vec3(0.9, 0.0, 0.0), vec3(1.0, 0.0, 0.0), 1.0);

        let contact = resolve_pair(&mut a, &mut b, &PhysicsConfig::default());
        assert!(matches!(contact, PairContact::Resolved { impulse, .. } if impulse == 0.0));
        assert_close(a.velocity.x, -1.0);
        assert_close(b.velocity.x, 1.0);
        assert_close(b.position.x - a.position.x, 2.0);
    }

    #[test]
    fn coincident_centers_are_skipped() {
        let mut a = sphere(0, vec3(1.0, 1.0, 1.0), vec3(1.0, 0.0, 0.0), 1.0);
        let mut b = sphere(1, vec3(1.0, 1.0, 1.0), vec3(-1.0, 0.0, 0.0), 1.0);
        let (a0, b0) = (a.clone(), b.clone());

        assert_eq!(
            resolve_pair(&mut a, &mut b, &PhysicsConfig::default()),
            PairContact::Coincident
        );
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn touching_exactly_is_apart() {
        let mut a = sphere(0, vec3(-1.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), 1.0);
        let mut b = sphere(1, vec3(1.0, 0.0, 0.0), vec3(-1.0, 0.0, 0.0), 1.0);
        assert_eq!(
            resolve_pair(&mut a, &mut b, &PhysicsConfig::default()),
            PairContact::Apart
        );
        assert_close(a.velocity.x, 1.0);
    }

    #[test]
    fn immovable_pair_splits_overlap_evenly() {
        let mut a = sphere(0, vec3(-1e11, 0.0, 0.0), vec3(3.0, 0.0, 0.0), 1e12);
        let mut b = sphere(1, vec3(1e11, 0.0, 0.0), vec3(-3.0, 0.0, 0.0), 1e12);
        assert!(a.inverse_mass() + b.inverse_mass() <= MIN_INV_MASS_SUM);

        let contact = resolve_pair(&mut a, &mut b, &PhysicsConfig::default());
        assert_eq!(
            contact,
            PairContact::Resolved {
                overlap: 1.8e12,
                impulse: 0.0
            }
        );
        assert_eq!(a.position.x, -1e12);
        assert_eq!(b.position.x, 1e12);
        assert_eq!(a.velocity.x, 3.0);
        assert_eq!(b.velocity.x, -3.0);
    }

    #[test]
    fn enormous_spheres_stay_finite() {
        let mut a = sphere(0, vec3(-1.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), 1e103);
        let mut b = sphere(1, vec3(1.0, 0.0, 0.0), vec3(-1.0, 0.0, 0.0), 2e103);
        assert!(a.mass().is_finite() && b.mass().is_finite());

        resolve_pair(&mut a, &mut b, &PhysicsConfig::default());
        assert!(a.is_finite(), "{:?}", a);
        assert!(b.is_finite(), "{:?}", b);
        assert!(a.position.x < b.position.x);
    }
}
