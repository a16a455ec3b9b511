mod comparison;
mod duplicates;
mod matcher;
mod segments;

pub use comparison::{GeometryComparison, Side, VertexDifference};
pub use duplicates::{find_duplicates, DuplicateGroups};
pub use matcher::{match_one_sided, Matching};
pub use segments::SegmentDifference;
