use geo::{Line, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

use crate::error::{CompareError, Result};
use crate::extract::{VertexSequence, VertexSource};
use crate::types::Geometry;

// `geo` types are planar, so everything converted here is not z-aware.

impl From<&Point<f64>> for Geometry {
    fn from(point: &Point<f64>) -> Self { Geometry::point(point.0) }
}

impl From<&Line<f64>> for Geometry {
    fn from(line: &Line<f64>) -> Self { Geometry::path([line.start, line.end]) }
}

impl From<&LineString<f64>> for Geometry {
    fn from(line: &LineString<f64>) -> Self { Geometry::path(line.coords().copied()) }
}

impl From<&MultiLineString<f64>> for Geometry {
    fn from(lines: &MultiLineString<f64>) -> Self {
        Geometry::polyline(lines.iter().map(|line| line.coords().copied()))
    }
}

impl From<&MultiPoint<f64>> for Geometry {
    fn from(points: &MultiPoint<f64>) -> Self { Geometry::multipoint(points.iter().map(|p| p.0)) }
}

impl From<&Polygon<f64>> for Geometry {
    fn from(polygon: &Polygon<f64>) -> Self {
        Geometry::polygon(
            std::iter::once(polygon.exterior()).chain(polygon.interiors())
                .map(|ring| ring.coords().copied())
        )
    }
}

impl From<&MultiPolygon<f64>> for Geometry {
    fn from(polygons: &MultiPolygon<f64>) -> Self {
        Geometry::polygon(
            polygons.iter()
                .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
                .map(|ring| ring.coords().copied())
        )
    }
}

impl TryFrom<&geo::Geometry<f64>> for Geometry {
    type Error = CompareError;

    fn try_from(geometry: &geo::Geometry<f64>) -> Result<Self> {
        Ok(match geometry {
            geo::Geometry::Point(g) => g.into(),
            geo::Geometry::Line(g) => g.into(),
            geo::Geometry::LineString(g) => g.into(),
            geo::Geometry::MultiLineString(g) => g.into(),
            geo::Geometry::MultiPoint(g) => g.into(),
            geo::Geometry::Polygon(g) => g.into(),
            geo::Geometry::MultiPolygon(g) => g.into(),
            geo::Geometry::Rect(_) => return Err(unsupported("rect")),
            geo::Geometry::Triangle(_) => return Err(unsupported("triangle")),
            geo::Geometry::GeometryCollection(_) => return Err(unsupported("geometry collection")),
        })
    }
}

fn unsupported(name: &str) -> CompareError {
    CompareError::UnsupportedGeometryKind(name.to_string())
}

macro_rules! vertex_source_via_geometry {
    ($($ty:ty),* $(,)?) => {
        $(
            impl VertexSource for $ty {
                fn extract_vertices(&self) -> Result<VertexSequence> {
                    Geometry::from(self).extract_vertices()
                }
            }
        )*
    };
}

vertex_source_via_geometry!(
    Point<f64>,
    Line<f64>,
    LineString<f64>,
    MultiLineString<f64>,
    MultiPoint<f64>,
    Polygon<f64>,
    MultiPolygon<f64>,
);

impl VertexSource for geo::Geometry<f64> {
    fn extract_vertices(&self) -> Result<VertexSequence> {
        Geometry::try_from(self)?.extract_vertices()
    }
}
