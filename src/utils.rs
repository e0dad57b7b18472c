// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Geometry and statistics helpers shared by the feature builders, the form
//! analyzer and the threshold calibrator.
//!
//! Geometry runs in `f64`, matching the offline stage; values are narrowed to
//! `f32` only when a feature vector is assembled.

use crate::landmarks::Landmark;

/// Guard added to norms and divisors so degenerate poses never divide by zero.
pub const EPS: f64 = 1e-6;

/// A 2-D point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Arithmetic mean of two points.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Planar Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let (dx, dy) = (other.x - self.x, other.y - self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<&Landmark> for Point {
    fn from(landmark: &Landmark) -> Self {
        Self::new(f64::from(landmark.x), f64::from(landmark.y))
    }
}

/// Interior angle at vertex `b` of triangle `a`-`b`-`c`, in degrees.
///
/// Each arm's norm is padded by [`EPS`] and the cosine is clamped to
/// `[-1, 1]` before `acos`, so the result is always finite and in `[0, 180]`.
#[must_use]
pub fn angle_deg(a: Point, b: Point, c: Point) -> f64 {
    let (v1x, v1y) = (a.x - b.x, a.y - b.y);
    let (v2x, v2y) = (c.x - b.x, c.y - b.y);

    let dot = v1x * v2x + v1y * v2y;
    let norm1 = (v1x * v1x + v1y * v1y).sqrt() + EPS;
    let norm2 = (v2x * v2x + v2y * v2y).sqrt() + EPS;

    let cos_theta = (dot / (norm1 * norm2)).clamp(-1.0, 1.0);
    cos_theta.acos().to_degrees()
}

/// Percentile of `values` with linear interpolation between closest ranks.
///
/// `q` is in percent (`0.0..=100.0`). Returns `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
