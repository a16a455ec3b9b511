use std::cmp::Ordering;
use std::fmt;

use geo::Coord;

/// A single coordinate of a geometry. `z` is NaN when the elevation is undefined.
///
/// Equality is exact: two undefined elevations are equal.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    #[inline] pub const fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }

    /// A vertex without elevation.
    #[inline] pub const fn xy(x: f64, y: f64) -> Self { Self { x, y, z: f64::NAN } }

    /// Returns true if the elevation is defined.
    #[inline] pub fn has_z(&self) -> bool { !self.z.is_nan() }

    /// Copy of this vertex with the elevation dropped.
    #[inline] pub fn without_z(&self) -> Self { Self::xy(self.x, self.y) }

    /// Squared planar distance to `other`.
    #[inline]
    pub fn distance_xy_squared(&self, other: &Vertex) -> f64 {
        let (dx, dy) = (self.x - other.x, self.y - other.y);
        dx * dx + dy * dy
    }

    /// Bit-identical in x, y and z (NaN z values compare equal, `-0.0 == 0.0`).
    #[inline]
    pub fn is_identical(&self, other: &Vertex) -> bool {
        self.x == other.x && self.y == other.y
            && (self.z == other.z || (self.z.is_nan() && other.z.is_nan()))
    }

    /// Lexicographic order by x, then y, then z (NaN z sorts first).
    /// Consistent with `is_identical`: `-0.0` and `0.0` compare equal.
    pub fn lexicographic_cmp(&self, other: &Vertex) -> Ordering {
        let cmp = |a: f64, b: f64| (a + 0.0).total_cmp(&(b + 0.0));
        cmp(self.x, other.x)
            .then_with(|| cmp(self.y, other.y))
            .then_with(|| match (self.z.is_nan(), other.z.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => cmp(self.z, other.z),
            })
    }

    /// Squared planar distance from this vertex to the segment `from`-`to`,
    /// together with the segment parameter of the closest point in `[0, 1]`.
    pub fn distance_to_segment_squared(&self, from: &Vertex, to: &Vertex) -> (f64, f64) {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let length_squared = dx * dx + dy * dy;
        if length_squared == 0.0 { return (self.distance_xy_squared(from), 0.0) }

        let t = (((self.x - from.x) * dx + (self.y - from.y) * dy) / length_squared).clamp(0.0, 1.0);
        let closest = Vertex::xy(from.x + t * dx, from.y + t * dy);
        (self.distance_xy_squared(&closest), t)
    }
}

impl From<Coord<f64>> for Vertex {
    fn from(coord: Coord<f64>) -> Self { Vertex::xy(coord.x, coord.y) }
}

impl From<(f64, f64)> for Vertex {
    fn from((x, y): (f64, f64)) -> Self { Vertex::xy(x, y) }
}

impl From<(f64, f64, f64)> for Vertex {
    fn from((x, y, z): (f64, f64, f64)) -> Self { Vertex::new(x, y, z) }
}

impl From<Vertex> for Coord<f64> {
    fn from(vertex: Vertex) -> Self { Coord { x: vertex.x, y: vertex.y } }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool { self.is_identical(other) }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_z() { write!(f, "({}, {}, {})", self.x, self.y, self.z) }
        else { write!(f, "({}, {})", self.x, self.y) }
    }
}
