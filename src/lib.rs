#![doc = "Tolerant vertex comparison and congruence testing for vector geometries"]
mod compare;
mod config;
mod congruence;
mod error;
mod extract;
mod geom;
mod types;

#[doc(inline)]
pub use compare::{
    find_duplicates, match_one_sided, DuplicateGroups, GeometryComparison, Matching,
    SegmentDifference, Side, VertexDifference,
};

#[doc(inline)]
pub use congruence::{are_congruent_within_tolerance, weed_part};

#[doc(inline)]
pub use config::ComparisonConfig;

#[doc(inline)]
pub use error::{CompareError, Result};

#[doc(inline)]
pub use extract::{PartRange, VertexSequence, VertexSource};

#[doc(inline)]
pub use types::{Geometry, GeometryKind, Tolerance, Vertex};
