mod geometry;
mod tolerance;
mod vertex;

pub use geometry::{Geometry, GeometryKind};
pub use tolerance::Tolerance;
pub use vertex::Vertex;
