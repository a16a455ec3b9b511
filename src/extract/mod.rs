mod geo_impls;

use std::ops::Range;

use crate::error::{CompareError, Result};
use crate::types::{Geometry, GeometryKind, Vertex};

/// Anything that can produce the ordered vertex sequence of a geometry.
pub trait VertexSource {
    fn extract_vertices(&self) -> Result<VertexSequence>;
}

/// Location of one part inside the flat vertex list of a `VertexSequence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    start: usize,
    len: usize,
    closed: bool,
}

impl PartRange {
    #[inline] pub fn start(&self) -> usize { self.start }
    #[inline] pub fn len(&self) -> usize { self.len }
    #[inline] pub fn is_empty(&self) -> bool { self.len == 0 }
    #[inline] pub fn range(&self) -> Range<usize> { self.start..self.start + self.len }

    /// Returns true for polygon rings (stored with the closing vertex).
    #[inline] pub fn is_closed(&self) -> bool { self.closed }
}

/// The extracted vertices of a geometry: a flat list in traversal order plus
/// the part boundaries. Input order is preserved and nothing is deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexSequence {
    kind: GeometryKind,
    z_aware: bool,
    vertices: Vec<Vertex>,
    parts: Vec<PartRange>,
}

impl VertexSequence {
    #[inline] pub fn kind(&self) -> GeometryKind { self.kind }

    #[inline] pub fn z_aware(&self) -> bool { self.z_aware }

    /// All vertices, flattened in part order.
    #[inline] pub fn vertices(&self) -> &[Vertex] { &self.vertices }

    #[inline] pub fn len(&self) -> usize { self.vertices.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.vertices.is_empty() }

    #[inline] pub fn parts(&self) -> &[PartRange] { &self.parts }

    #[inline] pub fn part_count(&self) -> usize { self.parts.len() }

    /// Vertices of part `part`.
    #[inline] pub fn part(&self, part: usize) -> &[Vertex] { &self.vertices[self.parts[part].range()] }

    /// Flat index of the first vertex of part `part`.
    #[inline] pub fn part_start_index(&self, part: usize) -> usize { self.parts[part].start }

    /// Map a flat index back to `(part, index in part)`.
    pub fn locate(&self, flat: usize) -> (usize, usize) {
        let part = self.parts.partition_point(|range| range.start + range.len <= flat);
        (part, flat - self.parts[part].start)
    }

    /// Iterate `(part index, vertex index in part, vertex)` in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Vertex)> + '_ {
        self.parts.iter().enumerate().flat_map(move |(p, range)| {
            self.vertices[range.range()].iter().enumerate().map(move |(i, &v)| (p, i, v))
        })
    }

    /// Flatten a geometry, validating it for its kind.
    fn from_geometry(geometry: &Geometry) -> Result<Self> {
        let kind = geometry.kind();
        match kind {
            GeometryKind::Point if geometry.part_count() > 1 || geometry.parts().iter().any(|p| p.len() != 1) => {
                return Err(CompareError::UnsupportedGeometryKind(
                    format!("ill-formed point with {} vertices", geometry.vertex_count())
                ))
            }
            GeometryKind::Multipoint if geometry.part_count() > 1 => {
                return Err(CompareError::UnsupportedGeometryKind(
                    format!("ill-formed multipoint with {} parts", geometry.part_count())
                ))
            }
            _ => {}
        }

        let z_aware = geometry.z_aware();
        let mut vertices = Vec::with_capacity(geometry.vertex_count());
        let mut parts = Vec::with_capacity(geometry.part_count());
        for (p, part) in geometry.parts().iter().enumerate() {
            parts.push(PartRange {
                start: vertices.len(),
                len: part.len(),
                closed: kind == GeometryKind::Polygon,
            });
            for (i, vertex) in part.iter().enumerate() {
                if !vertex.x.is_finite() || !vertex.y.is_finite() {
                    return Err(CompareError::NonFiniteCoordinate { part: p, index: i })
                }
                vertices.push(if z_aware { *vertex } else { vertex.without_z() });
            }
        }

        Ok(Self { kind, z_aware, vertices, parts })
    }
}

impl VertexSource for Geometry {
    fn extract_vertices(&self) -> Result<VertexSequence> { VertexSequence::from_geometry(self) }
}

impl<T: VertexSource + ?Sized> VertexSource for &T {
    fn extract_vertices(&self) -> Result<VertexSequence> { (**self).extract_vertices() }
}
