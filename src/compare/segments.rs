use std::collections::BTreeSet;
use std::time::Instant;

use rstar::{RTree, AABB};
use tracing::debug;

use crate::compare::GeometryComparison;
use crate::error::{CompareError, Result};
use crate::geom::SegmentBox;
use crate::types::{GeometryKind, Vertex};

/// A base segment next to a vertex the compare geometry does not contain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDifference {
    pub part: usize,
    /// Index of the segment's first vertex within its part.
    pub index: usize,
    pub from: Vertex,
    pub to: Vertex,
}

impl GeometryComparison {
    /// Returns true if the compare geometry contains `point` in 3D: a vertex
    /// matches it within tolerance, or it lies on the interior of a segment
    /// with its elevation within tolerance of the segment's interpolated z.
    pub fn contains_point(&self, point: &Vertex) -> bool {
        if self.compare_points().neighbors(*point, self.tolerance).next().is_some() { return true }

        let xy = self.tolerance.xy();
        let envelope = AABB::from_corners([point.x - xy, point.y - xy], [point.x + xy, point.y + xy]);
        let vertices = self.compare.vertices();
        self.compare_segments().locate_in_envelope_intersecting(&envelope).any(|segment| {
            let (from, to) = (&vertices[segment.start()], &vertices[segment.start() + 1]);
            let (d2, t) = point.distance_to_segment_squared(from, to);
            d2 <= xy * xy && self.tolerance.matches_z(point.z, from.z + t * (to.z - from.z))
        })
    }

    /// Base segments before and after every base vertex the compare geometry
    /// does not contain, ordered by part and index. Polyline bases only.
    pub fn z_difference_segments(&self) -> Result<Vec<SegmentDifference>> {
        if self.base.kind() != GeometryKind::Polyline {
            return Err(CompareError::UnsupportedGeometryKind(
                format!("segment differences need a polyline base, got {}", self.base.kind())
            ))
        }

        let started = Instant::now();
        let mut segments = BTreeSet::new();
        for (part, index, vertex) in self.base.iter() {
            if self.contains_point(&vertex) { continue }
            if index > 0 { segments.insert((part, index - 1)); }
            if index + 1 < self.base.parts()[part].len() { segments.insert((part, index)); }
        }

        let differences = segments.into_iter()
            .map(|(part, index)| {
                let vertices = self.base.part(part);
                SegmentDifference { part, index, from: vertices[index], to: vertices[index + 1] }
            })
            .collect::<Vec<_>>();

        debug!(
            vertices = self.base.len(),
            segments = differences.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "computed base segment z differences"
        );
        Ok(differences)
    }

    fn compare_segments(&self) -> &RTree<SegmentBox> {
        self.compare_segments.get_or_init(|| {
            let vertices = self.compare.vertices();
            RTree::bulk_load(
                self.compare.parts().iter()
                    .flat_map(|part| {
                        let range = part.range();
                        range.start..range.end.saturating_sub(1).max(range.start)
                    })
                    .map(|i| SegmentBox::new(i, &vertices[i], &vertices[i + 1]))
                    .collect()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Geometry, Tolerance};

    fn tolerance() -> Tolerance { Tolerance::new(0.01, 0.01).unwrap() }

    #[test]
    fn contains_vertices_and_segment_interiors() {
        let base = Geometry::point((0.0, 0.0, 0.0));
        let line = Geometry::path([(0.0, 0.0, 0.0), (10.0, 0.0, 10.0), (10.0, 10.0, 10.0)]);
        let comparison = GeometryComparison::new(&base, &line, tolerance()).unwrap();

        assert!(comparison.contains_point(&Vertex::new(10.0, 0.0, 10.0)));
        assert!(comparison.contains_point(&Vertex::new(5.0, 0.005, 5.0)));
        assert!(!comparison.contains_point(&Vertex::new(5.0, 0.0, 6.0)));
        assert!(!comparison.contains_point(&Vertex::new(5.0, 0.5, 5.0)));
        assert!(comparison.contains_point(&Vertex::new(10.0, 4.0, 10.0)));
    }

    #[test]
    fn multipoint_has_no_segments() {
        let points = Geometry::multipoint([(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
        let comparison = GeometryComparison::new(&points, &points, tolerance()).unwrap();
        assert!(!comparison.contains_point(&Vertex::new(5.0, 0.0, 0.0)));
        assert!(comparison.contains_point(&Vertex::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn z_differences_take_adjacent_segments() {
        let base = Geometry::path([
            (0.0, 0.0, 0.0),
            (10.0, 0.0, 0.0),
            (20.0, 0.0, 5.0),
            (30.0, 0.0, 0.0),
            (40.0, 0.0, 0.0),
        ]);
        let compare = Geometry::path([(0.0, 0.0, 0.0), (40.0, 0.0, 0.0)]);
        let comparison = GeometryComparison::new(&base, &compare, tolerance()).unwrap();

        let segments = comparison.z_difference_segments().unwrap();
        let indices = segments.iter().map(|s| s.index).collect::<Vec<_>>();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(segments[0].from, Vertex::new(10.0, 0.0, 0.0));
        assert_eq!(segments[1].to, Vertex::new(30.0, 0.0, 0.0));
    }

    #[test]
    fn z_differences_need_polyline_base() {
        let polygon = Geometry::polygon([[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]]);
        let comparison = GeometryComparison::new(&polygon, &polygon, tolerance()).unwrap();
        assert!(matches!(
            comparison.z_difference_segments(),
            Err(CompareError::UnsupportedGeometryKind(_)),
        ));
    }
}
