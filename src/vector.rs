//! Pure 2D vector math used throughout the editor.
//!
//! All coordinates live in screen space: the X axis points right and the
//! Y axis points *down*, so "clockwise" here matches what a user sees on
//! the canvas. Angles are always given in degrees; conversion to radians
//! happens internally. Every operation returns a new value.

use serde::{Deserialize, Serialize};

/// A 2D vector (or point) in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    /// Horizontal component, increasing to the right.
    pub x: f64,
    /// Vertical component, increasing downwards.
    pub y: f64,
}

/// Shorthand constructor for a [`Vector`].
pub fn vec2(x: f64, y: f64) -> Vector {
    Vector { x, y }
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    /// Creates a new vector from its components.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Adds another vector to this one.
    pub fn add(self, other: Vector) -> Vector {
        vec2(self.x + other.x, self.y + other.y)
    }

    /// Adds `factor * other` to this vector.
    ///
    /// This mirrors how offset geometry is computed everywhere in the
    /// renderer: a perpendicular vector scaled by a fraction of the bond
    /// length.
    pub fn add_scaled(self, other: Vector, factor: f64) -> Vector {
        vec2(self.x + factor * other.x, self.y + factor * other.y)
    }

    /// Subtracts another vector from this one.
    pub fn subtract(self, other: Vector) -> Vector {
        vec2(self.x - other.x, self.y - other.y)
    }

    /// Dot product of two vectors.
    pub fn dot(self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length of this vector.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the unit vector pointing in the same direction, or `None`
    /// for a zero-length input (the normalized direction is undefined).
    pub fn norm(self) -> Option<Vector> {
        let len = self.length();
        if len == 0.0 {
            return None;
        }
        Some(vec2(self.x / len, self.y / len))
    }

    /// Rotates this vector clockwise by `deg` degrees.
    ///
    /// Clockwise with the Y axis pointing down, i.e. rotating North by 90°
    /// yields East.
    pub fn rotate_cw(self, deg: f64) -> Vector {
        let rads = deg.to_radians();
        let (sin, cos) = rads.sin_cos();
        vec2(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Rotates this vector counter-clockwise by `deg` degrees.
    pub fn rotate_ccw(self, deg: f64) -> Vector {
        let rads = deg.to_radians();
        let (sin, cos) = rads.sin_cos();
        vec2(self.x * cos + self.y * sin, self.y * cos - self.x * sin)
    }

    /// Compares two vectors to `precision` decimal places.
    ///
    /// Fixed-precision decimal rounding tolerates the error accumulated by
    /// repeated rotations; exact float equality would not.
    pub fn compare(self, other: Vector, precision: i32) -> bool {
        compare_floats(self.x, other.x, precision) && compare_floats(self.y, other.y, precision)
    }
}

impl std::ops::Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::add(self, rhs)
    }
}

impl std::ops::Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::subtract(self, rhs)
    }
}

/// Compares two floats to `precision` decimal places.
pub fn compare_floats(a: f64, b: f64, precision: i32) -> bool {
    let factor = 10f64.powi(precision);
    (a * factor).round() == (b * factor).round()
}

/// Checks whether `point` lies within an axis-aligned tolerance box of
/// half-width `tolerance` around `center`.
///
/// Called a "circle" throughout the editor for historical reasons; the
/// box approximation is what hit testing has always used.
pub fn inside_circle(center: Vector, point: Vector, tolerance: f64) -> bool {
    (center.x - point.x).abs() < tolerance && (center.y - point.y).abs() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_add_and_subtract() {
        let v = vec2(1.0, 2.0).add(vec2(3.0, -1.0));
        assert_eq!(v, vec2(4.0, 1.0));
        assert_eq!(v.subtract(vec2(3.0, -1.0)), vec2(1.0, 2.0));
        assert_eq!(vec2(1.0, 1.0) + vec2(2.0, 2.0), vec2(3.0, 3.0));
    }

    #[test]
    fn test_add_scaled() {
        let v = vec2(10.0, 10.0).add_scaled(vec2(0.0, 20.0), 0.5);
        assert_eq!(v, vec2(10.0, 20.0));
    }

    #[test]
    fn test_dot_product() {
        assert_eq!(vec2(1.0, 0.0).dot(vec2(0.0, 1.0)), 0.0);
        assert_eq!(vec2(2.0, 3.0).dot(vec2(4.0, 5.0)), 23.0);
    }

    #[test]
    fn test_norm() {
        let n = vec2(3.0, 4.0).norm().unwrap();
        assert_relative_eq!(n.x, 0.6);
        assert_relative_eq!(n.y, 0.8);
        assert!(Vector::ZERO.norm().is_none());
    }

    #[test]
    fn test_rotate_cw_north_to_east() {
        // North is (0, -1) in screen coordinates; a 90° clockwise turn
        // must point East.
        let east = vec2(0.0, -1.0).rotate_cw(90.0);
        assert_relative_eq!(east.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(east.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_ccw_inverts_cw() {
        let v = vec2(3.5, -7.25);
        let back = v.rotate_cw(37.0).rotate_ccw(37.0);
        assert!(back.compare(v, 9));
    }

    #[test]
    fn test_full_turn_is_identity() {
        let mut v = vec2(0.0, -20.0);
        for _ in 0..24 {
            v = v.rotate_cw(15.0);
        }
        assert!(v.compare(vec2(0.0, -20.0), 5));
    }

    #[test]
    fn test_compare_floats_precision() {
        assert!(compare_floats(1.00001, 1.00002, 4));
        assert!(!compare_floats(1.00001, 1.00002, 6));
    }

    #[test]
    fn test_compare_vectors() {
        assert!(vec2(1.000004, 2.0).compare(vec2(1.000001, 2.0), 5));
        assert!(!vec2(1.0001, 2.0).compare(vec2(1.0002, 2.0), 5));
    }

    #[test]
    fn test_inside_circle() {
        assert!(inside_circle(vec2(10.0, 10.0), vec2(11.0, 9.0), 2.0));
        assert!(!inside_circle(vec2(10.0, 10.0), vec2(13.0, 10.0), 2.0));
    }
}
