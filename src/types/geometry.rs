use std::fmt;

use crate::types::Vertex;

/// The geometry kinds with a vertex representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Multipoint,
    Polyline,
    Polygon,
}

impl GeometryKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            GeometryKind::Point      => "point",
            GeometryKind::Multipoint => "multipoint",
            GeometryKind::Polyline   => "polyline",
            GeometryKind::Polygon    => "polygon",
        }
    }

    /// Polylines and polygons: kinds made of connected segments.
    #[inline] pub fn is_polycurve(&self) -> bool { matches!(self, GeometryKind::Polyline | GeometryKind::Polygon) }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.to_str()) }
}

/// An immutable geometry value: a kind, ordered parts of ordered vertices,
/// and whether elevations are meaningful.
///
/// Polygon rings are stored closed (the first vertex is repeated as last).
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    kind: GeometryKind,
    parts: Vec<Vec<Vertex>>,
    z_aware: bool,
}

impl Geometry {
    /// Build a geometry from raw parts without any normalization.
    /// Well-formedness is checked when vertices are extracted.
    pub fn from_parts(kind: GeometryKind, parts: Vec<Vec<Vertex>>, z_aware: bool) -> Self {
        Self { kind, parts, z_aware }
    }

    /// An empty geometry of the given kind.
    pub fn empty(kind: GeometryKind) -> Self { Self::from_parts(kind, Vec::new(), false) }

    pub fn point(vertex: impl Into<Vertex>) -> Self {
        Self::with_detected_z(GeometryKind::Point, vec![vec![vertex.into()]])
    }

    pub fn multipoint<V: Into<Vertex>>(points: impl IntoIterator<Item = V>) -> Self {
        let points = points.into_iter().map(Into::into).collect::<Vec<_>>();
        let parts = if points.is_empty() { Vec::new() } else { vec![points] };
        Self::with_detected_z(GeometryKind::Multipoint, parts)
    }

    /// A polyline with a single path.
    pub fn path<V: Into<Vertex>>(vertices: impl IntoIterator<Item = V>) -> Self {
        Self::polyline([vertices])
    }

    pub fn polyline<V, P>(paths: impl IntoIterator<Item = P>) -> Self
    where V: Into<Vertex>, P: IntoIterator<Item = V> {
        let parts = paths.into_iter()
            .map(|path| path.into_iter().map(Into::into).collect::<Vec<_>>())
            .filter(|path| !path.is_empty())
            .collect();
        Self::with_detected_z(GeometryKind::Polyline, parts)
    }

    /// A polygon from rings; open rings are closed by repeating their first vertex.
    pub fn polygon<V, R>(rings: impl IntoIterator<Item = R>) -> Self
    where V: Into<Vertex>, R: IntoIterator<Item = V> {
        let parts = rings.into_iter()
            .map(|ring| {
                let mut ring = ring.into_iter().map(Into::into).collect::<Vec<Vertex>>();
                if let (Some(first), Some(last)) = (ring.first().copied(), ring.last()) {
                    if ring.len() > 1 && !first.is_identical(last) { ring.push(first) }
                }
                ring
            })
            .filter(|ring| !ring.is_empty())
            .collect();
        Self::with_detected_z(GeometryKind::Polygon, parts)
    }

    fn with_detected_z(kind: GeometryKind, parts: Vec<Vec<Vertex>>) -> Self {
        let z_aware = parts.iter().flatten().any(Vertex::has_z);
        Self::from_parts(kind, parts, z_aware)
    }

    /// The same geometry with the z-awareness flag set explicitly.
    pub fn with_z_aware(mut self, z_aware: bool) -> Self {
        self.z_aware = z_aware;
        self
    }

    #[inline] pub fn kind(&self) -> GeometryKind { self.kind }

    #[inline] pub fn parts(&self) -> &[Vec<Vertex>] { &self.parts }

    #[inline] pub fn z_aware(&self) -> bool { self.z_aware }

    #[inline] pub fn part_count(&self) -> usize { self.parts.len() }

    /// Total number of stored vertices, closing ring vertices included.
    #[inline] pub fn vertex_count(&self) -> usize { self.parts.iter().map(Vec::len).sum() }

    #[inline] pub fn is_empty(&self) -> bool { self.vertex_count() == 0 }

    /// A copy moved by `dx`, `dy` in the plane.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            kind: self.kind,
            parts: self.parts.iter()
                .map(|part| part.iter().map(|v| Vertex::new(v.x + dx, v.y + dy, v.z)).collect())
                .collect(),
            z_aware: self.z_aware,
        }
    }
}
