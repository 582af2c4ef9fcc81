/// 3D vector utilities for the sphere simulation.
/// Plain value type; every operation returns a new vector.
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Magnitudes at or below this are treated as zero by `normalize`.
const NORMALIZE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same value in every component.
    pub fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Component by axis index (0 = x, 1 = y, 2 = z).
    pub fn axis(self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("axis index out of range: {}", axis),
        }
    }

    /// Mutable component by axis index (0 = x, 1 = y, 2 = z).
    pub fn axis_mut(&mut self, axis: usize) -> &mut f64 {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("axis index out of range: {}", axis),
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Shorthand constructor
pub fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Dot product
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Squared vector length
pub fn length_sq(v: Vec3) -> f64 {
    dot(v, v)
}

/// Vector length
pub fn length(v: Vec3) -> f64 {
    length_sq(v).sqrt()
}

/// Normalize vector to unit length. A (near) zero vector maps to zero.
pub fn normalize(v: Vec3) -> Vec3 {
    let len = length(v);
    if len <= NORMALIZE_EPSILON {
        return Vec3::ZERO;
    }
    scale(v, 1.0 / len)
}

/// Scale vector by scalar
pub fn scale(v: Vec3, s: f64) -> Vec3 {
    Vec3::new(v.x * s, v.y * s, v.z * s)
}

/// Add two vectors
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

/// Subtract vectors (a - b)
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        add(self, rhs)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        sub(self, rhs)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        scale(self, rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        scale(self, -1.0)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = add(*self, rhs);
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Vec3) {
        *self = sub(*self, rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_close(actual: Vec3, expected: Vec3) {
        assert!(
            (actual.x - expected.x).abs() < 1e-6
                && (actual.y - expected.y).abs() < 1e-6
                && (actual.z - expected.z).abs() < 1e-6,
            "Expected {:?} to be close to {:?}",
            actual,
            expected
        );
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "Expected {} to be close to {}",
            actual,
            expected
        );
    }

    #[test]
    fn vec3_creates_vector() {
        let v = vec3(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn dot_orthogonal_is_zero() {
        assert_eq!(dot(vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0)), 0.0);
    }

    #[test]
    fn dot_antiparallel_is_negative() {
        assert_eq!(dot(vec3(2.0, 0.0, 0.0), vec3(-3.0, 0.0, 0.0)), -6.0);
    }

    #[test]
    fn length_of_3_4_0_is_5() {
        assert_eq!(length(vec3(3.0, 4.0, 0.0)), 5.0);
        assert_eq!(length_sq(vec3(3.0, 4.0, 0.0)), 25.0);
    }

    #[test]
    fn normalize_returns_unit_vector() {
        let v = normalize(vec3(3.0, 4.0, 0.0));
        assert_close(length(v), 1.0);
        assert_vec3_close(v, vec3(0.6, 0.8, 0.0));
    }

    #[test]
    fn normalize_zero_returns_zero() {
        let v = normalize(Vec3::ZERO);
        assert_eq!(v, Vec3::ZERO);
        assert!(v.is_finite());
    }

    #[test]
    fn operators_match_free_functions() {
        let a = vec3(1.0, 2.0, 3.0);
        let b = vec3(4.0, 5.0, 6.0);
        assert_vec3_close(a + b, vec3(5.0, 7.0, 9.0));
        assert_vec3_close(b - a, vec3(3.0, 3.0, 3.0));
        assert_vec3_close(a * 2.0, vec3(2.0, 4.0, 6.0));
        assert_vec3_close(-a, vec3(-1.0, -2.0, -3.0));

        let mut c = a;
        c += b;
        c -= a;
        assert_vec3_close(c, b);
    }

    #[test]
    fn axis_access_reads_and_writes_components() {
        let mut v = vec3(1.0, 2.0, 3.0);
        assert_eq!(v.axis(0), 1.0);
        assert_eq!(v.axis(2), 3.0);
        *v.axis_mut(1) = -7.0;
        assert_eq!(v.y, -7.0);
    }

    #[test]
    fn array_conversion_preserves_order() {
        let v = Vec3::from_array([1.5, -2.0, 0.25]);
        assert_eq!(v.to_array(), [1.5, -2.0, 0.25]);
        assert_eq!(Vec3::splat(2.0), vec3(2.0, 2.0, 2.0));
    }

    #[test]
    fn non_finite_is_detected() {
        assert!(vec3(1.0, 2.0, 3.0).is_finite());
        assert!(!vec3(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!vec3(0.0, f64::INFINITY, 0.0).is_finite());
    }
}
