use crate::error::{CompareError, Result};
use crate::types::Vertex;

/// Planar and elevation tolerance of a comparison.
///
/// A NaN `z` tolerance means elevation does not participate in matching,
/// including the decision whether two vertices of one geometry are duplicates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    xy: f64,
    z: f64,
}

impl Tolerance {
    /// Validated tolerance. `xy` must be finite and non-negative; `z` must be
    /// non-negative or NaN.
    pub fn new(xy: f64, z: f64) -> Result<Self> {
        let xy_valid = xy.is_finite() && xy >= 0.0;
        let z_valid = z.is_nan() || (z.is_finite() && z >= 0.0);
        if !xy_valid || !z_valid { return Err(CompareError::InvalidTolerance { xy, z }) }
        Ok(Self { xy, z })
    }

    /// Planar-only tolerance.
    pub fn xy_only(xy: f64) -> Result<Self> { Self::new(xy, f64::NAN) }

    #[inline] pub fn xy(&self) -> f64 { self.xy }

    #[inline] pub fn z(&self) -> f64 { self.z }

    /// Returns true if elevation does not participate in matching.
    #[inline] pub fn ignores_z(&self) -> bool { self.z.is_nan() }

    /// The same planar tolerance with elevation disabled.
    #[inline] pub fn without_z(&self) -> Self { Self { xy: self.xy, z: f64::NAN } }

    /// Both tolerances multiplied by `factor` (expected finite and >= 0).
    #[inline]
    pub(crate) fn scaled(&self, factor: f64) -> Self {
        Self { xy: self.xy * factor, z: self.z * factor }
    }

    /// Elevation test only. Two undefined elevations match; an undefined
    /// elevation never matches a defined one.
    #[inline]
    pub fn matches_z(&self, a: f64, b: f64) -> bool {
        if self.ignores_z() { return true }
        match (a.is_nan(), b.is_nan()) {
            (true, true) => true,
            (false, false) => (a - b).abs() <= self.z,
            _ => false,
        }
    }

    /// Returns true if `a` and `b` are the same point within this tolerance.
    #[inline]
    pub fn matches(&self, a: &Vertex, b: &Vertex) -> bool {
        a.distance_xy_squared(b) <= self.xy * self.xy && self.matches_z(a.z, b.z)
    }
}
