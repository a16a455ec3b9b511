use geo::{Coord, Rect};
use rstar::{RTreeObject, AABB};

use crate::types::Vertex;

/// The bounding box of one segment in an R-tree, identified by the flat index
/// of its start vertex.
#[derive(Debug, Clone)]
pub(crate) struct SegmentBox {
    start: usize, // Flat index of the segment's first vertex
    bbox: Rect<f64>,
}

impl SegmentBox {
    pub(crate) fn new(start: usize, from: &Vertex, to: &Vertex) -> Self {
        Self { start, bbox: Rect::new(Coord::from(*from), Coord::from(*to)) }
    }

    /// Flat index of the segment's first vertex; the segment ends at `start() + 1`.
    #[inline] pub(crate) fn start(&self) -> usize { self.start }

    #[inline] pub(crate) fn bbox(&self) -> &Rect<f64> { &self.bbox }
}

impl RTreeObject for SegmentBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox().min().into(), self.bbox().max().into())
    }
}
