mod bbox;
mod index;

pub(crate) use bbox::SegmentBox;
pub(crate) use index::PointIndex;
