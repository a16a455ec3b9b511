use std::sync::OnceLock;
use std::time::Instant;

use rstar::RTree;
use smallvec::SmallVec;
use tracing::debug;

use crate::compare::duplicates::{group_duplicates, DuplicateGroups};
use crate::compare::matcher::Matcher;
use crate::error::Result;
use crate::extract::{VertexSequence, VertexSource};
use crate::geom::{PointIndex, SegmentBox};
use crate::types::{GeometryKind, Tolerance, Vertex};

/// Which of the two compared geometries a vertex belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Base,
    Compare,
}

/// A vertex without a partner in the other geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexDifference {
    pub side: Side,
    pub part: usize,
    pub index: usize,
    pub vertex: Vertex,
}

/// Flat indices of unmatched vertices on each side.
#[derive(Debug, Clone, Default)]
struct Unmatched {
    base: Vec<usize>,
    compare: Vec<usize>,
}

/// Vertex comparison of a base geometry against a compare geometry.
///
/// Built once per pair and tolerance; every query is read-only and results
/// are cached, so repeated calls are cheap and return the same answer.
#[derive(Debug)]
pub struct GeometryComparison {
    pub(super) base: VertexSequence,
    pub(super) compare: VertexSequence,
    pub(super) tolerance: Tolerance,
    base_points: OnceLock<PointIndex>,
    compare_points: OnceLock<PointIndex>,
    duplicates: [OnceLock<(DuplicateGroups, DuplicateGroups)>; 2],
    unmatched: [OnceLock<Unmatched>; 4],
    pub(super) compare_segments: OnceLock<RTree<SegmentBox>>,
}

impl GeometryComparison {
    /// Extract both geometries and fix the tolerance. Elevation takes part
    /// only if both geometries are z-aware.
    pub fn new(base: &impl VertexSource, compare: &impl VertexSource, tolerance: Tolerance) -> Result<Self> {
        let base = base.extract_vertices()?;
        let compare = compare.extract_vertices()?;
        let tolerance = if base.z_aware() && compare.z_aware() { tolerance } else { tolerance.without_z() };
        Ok(Self {
            base,
            compare,
            tolerance,
            base_points: OnceLock::new(),
            compare_points: OnceLock::new(),
            duplicates: Default::default(),
            unmatched: Default::default(),
            compare_segments: OnceLock::new(),
        })
    }

    #[inline] pub fn base(&self) -> &VertexSequence { &self.base }

    #[inline] pub fn compare(&self) -> &VertexSequence { &self.compare }

    /// The effective tolerance (elevation disabled unless both inputs are z-aware).
    #[inline] pub fn tolerance(&self) -> &Tolerance { &self.tolerance }

    /// Vertices without a tolerant partner. Asymmetric mode reports base
    /// vertices only; symmetric mode appends the unmatched compare vertices.
    ///
    /// With `report_duplicates`, every occurrence counts on its own, so surplus
    /// repeats of a coordinate are reported. Without it, each run of coincident
    /// vertices counts once.
    pub fn different_vertices(&self, symmetric: bool, report_duplicates: bool) -> Vec<Vertex> {
        self.vertex_differences(symmetric, report_duplicates).into_iter().map(|d| d.vertex).collect()
    }

    /// Like `different_vertices`, with the side and position of each vertex.
    pub fn vertex_differences(&self, symmetric: bool, report_duplicates: bool) -> Vec<VertexDifference> {
        self.differences(symmetric, report_duplicates, true)
    }

    /// Differences with the duplicate policy of the geometry kind: repeated
    /// points are reported for multipoints and merged for everything else.
    pub fn default_different_vertices(&self, symmetric: bool) -> Vec<Vertex> {
        let report_duplicates = self.base.kind() == GeometryKind::Multipoint;
        self.different_vertices(symmetric, report_duplicates)
    }

    /// Returns true if the symmetric difference is empty. With
    /// `ignore_duplicates == false`, differing repeat counts make the
    /// geometries differ.
    pub fn have_same_vertices(&self, ignore_duplicates: bool) -> bool {
        self.unmatched(!ignore_duplicates, true).is_empty()
    }

    /// `have_same_vertices` on planar coordinates only.
    pub fn have_same_vertices_2d(&self, ignore_duplicates: bool) -> bool {
        self.unmatched(!ignore_duplicates, false).is_empty()
    }

    pub(super) fn base_points(&self) -> &PointIndex {
        self.base_points.get_or_init(|| PointIndex::new(self.base.vertices(), self.tolerance.xy()))
    }

    pub(super) fn compare_points(&self) -> &PointIndex {
        self.compare_points.get_or_init(|| PointIndex::new(self.compare.vertices(), self.tolerance.xy()))
    }

    fn effective_tolerance(&self, include_z: bool) -> Tolerance {
        if include_z { self.tolerance } else { self.tolerance.without_z() }
    }

    fn duplicates(&self, include_z: bool) -> &(DuplicateGroups, DuplicateGroups) {
        let include_z = include_z && !self.tolerance.ignores_z();
        self.duplicates[include_z as usize].get_or_init(|| {
            let tolerance = self.effective_tolerance(include_z);
            (group_duplicates(self.base_points(), &tolerance), group_duplicates(self.compare_points(), &tolerance))
        })
    }

    fn differences(&self, symmetric: bool, report_duplicates: bool, include_z: bool) -> Vec<VertexDifference> {
        let unmatched = self.unmatched(report_duplicates, include_z);
        let describe = |side: Side, sequence: &VertexSequence, flat: usize| {
            let (part, index) = sequence.locate(flat);
            VertexDifference { side, part, index, vertex: sequence.vertices()[flat] }
        };

        let mut differences = unmatched.base.iter()
            .map(|&flat| describe(Side::Base, &self.base, flat))
            .collect::<Vec<_>>();
        if symmetric {
            differences.extend(unmatched.compare.iter().map(|&flat| describe(Side::Compare, &self.compare, flat)));
        }
        differences
    }

    fn unmatched(&self, report_duplicates: bool, include_z: bool) -> &Unmatched {
        let include_z = include_z && !self.tolerance.ignores_z();
        let slot = (report_duplicates as usize) << 1 | include_z as usize;
        self.unmatched[slot].get_or_init(|| {
            let started = Instant::now();
            let tolerance = self.effective_tolerance(include_z);
            let unmatched = if report_duplicates {
                let matching = Matcher::new(self.compare_points(), self.base.vertices(), tolerance).run();
                Unmatched { base: matching.unmatched_source, compare: matching.unmatched_target }
            } else {
                // Each side counts once per duplicate group: base representatives
                // are matched against the compare locations holding a representative.
                let (base_groups, compare_groups) = self.duplicates(include_z);
                let source = base_groups.representatives().iter()
                    .map(|&i| self.base.vertices()[i])
                    .collect::<Vec<_>>();
                let target = self.compare_points();
                let mut slots = vec![SmallVec::new(); target.location_count()];
                for &rep in compare_groups.representatives() { slots[target.location_of(rep)].push(rep) }

                let matching = Matcher::with_slots(target, &source, tolerance, slots).run();
                Unmatched {
                    base: matching.unmatched_source.iter().map(|&i| base_groups.representatives()[i]).collect(),
                    compare: matching.unmatched_target,
                }
            };
            debug!(
                base = self.base.len(),
                compare = self.compare.len(),
                report_duplicates,
                include_z,
                unmatched_base = unmatched.base.len(),
                unmatched_compare = unmatched.compare.len(),
                elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                "compared vertices"
            );
            unmatched
        })
    }
}

impl Unmatched {
    #[inline] fn is_empty(&self) -> bool { self.base.is_empty() && self.compare.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Geometry;

    fn zig_zag() -> Geometry {
        Geometry::path([(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 10.0)])
    }

    fn tolerance() -> Tolerance { Tolerance::new(0.0125, 0.0125).unwrap() }

    #[test]
    fn clone_has_no_differences() {
        let line = zig_zag();
        let comparison = GeometryComparison::new(&line, &line.clone(), tolerance()).unwrap();
        for symmetric in [false, true] {
            for report in [false, true] {
                assert!(comparison.different_vertices(symmetric, report).is_empty());
            }
        }
        assert!(comparison.have_same_vertices(true));
        assert!(comparison.have_same_vertices(false));
    }

    #[test]
    fn zig_zag_against_simplified() {
        let simplified = Geometry::path([(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 10.0)]);

        let comparison = GeometryComparison::new(&zig_zag(), &simplified, tolerance()).unwrap();
        assert_eq!(comparison.different_vertices(false, true).len(), 2);
        assert_eq!(comparison.different_vertices(true, true).len(), 2);
        assert_eq!(comparison.different_vertices(true, false).len(), 0);

        let differences = comparison.vertex_differences(false, true);
        assert_eq!((differences[0].part, differences[0].index), (0, 3));
        assert_eq!(differences[1].vertex, Vertex::xy(20.0, 0.0));
        assert!(differences.iter().all(|d| d.side == Side::Base));

        let swapped = GeometryComparison::new(&simplified, &zig_zag(), tolerance()).unwrap();
        assert_eq!(swapped.different_vertices(false, true).len(), 0);
        assert_eq!(swapped.different_vertices(true, true).len(), 2);
        assert_eq!(swapped.different_vertices(true, false).len(), 0);
        assert!(swapped.vertex_differences(true, true).iter().all(|d| d.side == Side::Compare));
    }

    #[test]
    fn elevation_only_counts_when_both_are_z_aware() {
        let a = Geometry::path([(0.0, 0.0, 10.0), (10.0, 0.0, 10.0)]);
        let b = Geometry::path([(0.0, 0.0, 10.0), (10.0, 0.0, 12.0)]);

        let comparison = GeometryComparison::new(&a, &b, tolerance()).unwrap();
        assert_eq!(comparison.different_vertices(true, false).len(), 2);
        assert!(!comparison.have_same_vertices(true));
        assert!(comparison.have_same_vertices_2d(true));

        let planar = b.clone().with_z_aware(false);
        let comparison = GeometryComparison::new(&a, &planar, tolerance()).unwrap();
        assert!(comparison.tolerance().ignores_z());
        assert!(comparison.have_same_vertices(true));
    }

    #[test]
    fn default_policy_depends_on_kind() {
        let points = Geometry::multipoint([(0.0, 0.0), (0.0, 0.0), (5.0, 5.0)]);
        let unique = Geometry::multipoint([(0.0, 0.0), (5.0, 5.0)]);
        let comparison = GeometryComparison::new(&points, &unique, tolerance()).unwrap();
        assert_eq!(comparison.default_different_vertices(true).len(), 1);

        let comparison = GeometryComparison::new(&zig_zag(), &Geometry::path([(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 10.0)]), tolerance()).unwrap();
        assert!(comparison.default_different_vertices(true).is_empty());
    }

    #[test]
    fn comparison_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeometryComparison>();
    }
}
