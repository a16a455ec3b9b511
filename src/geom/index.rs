use ahash::AHashMap;
use smallvec::SmallVec;

use crate::types::{Tolerance, Vertex};

/// A bucket of bit-identical vertices.
#[derive(Debug, Clone)]
pub(crate) struct Location {
    vertex: Vertex,
    members: SmallVec<[usize; 2]>,
}

impl Location {
    /// The shared coordinate of all members.
    #[inline] pub(crate) fn vertex(&self) -> &Vertex { &self.vertex }

    /// Vertex indices in traversal order.
    #[inline] pub(crate) fn members(&self) -> &[usize] { &self.members }
}

/// Exact key of a coordinate: `-0.0` and `0.0` share a key, as do all NaN z values.
fn exact_key(vertex: &Vertex) -> [u64; 3] {
    let bits = |value: f64| if value == 0.0 { 0 } else { value.to_bits() };
    let z = if vertex.z.is_nan() { f64::NAN.to_bits() } else { bits(vertex.z) };
    [bits(vertex.x), bits(vertex.y), z]
}

/// Quantized grid cell of a planar coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Cell {
    x: i64,
    y: i64,
}

impl Cell {
    #[inline]
    fn of(x: f64, y: f64, size: f64) -> Self {
        Self { x: (x / size).floor() as i64, y: (y / size).floor() as i64 }
    }
}

/// Spatial index over a vertex list for queries up to a fixed radius.
///
/// Bit-identical vertices are collapsed into one location, and locations are
/// hashed into grid cells several radii wide, so a query touches at most four
/// cells no matter how long a straight run of vertices is.
#[derive(Debug, Clone)]
pub(crate) struct PointIndex {
    locations: Vec<Location>,
    location_of: Vec<usize>,
    radius: f64,
    cell_size: f64,
    cells: AHashMap<Cell, SmallVec<[usize; 1]>>,
    bounds: [f64; 4], // min x, min y, max x, max y
}

impl PointIndex {
    /// Index `vertices` for `neighbors` queries with a planar tolerance up to `radius`.
    pub(crate) fn new(vertices: &[Vertex], radius: f64) -> Self {
        let mut by_key = AHashMap::with_capacity(vertices.len());
        let mut locations: Vec<Location> = Vec::new();
        let location_of = vertices.iter().enumerate()
            .map(|(i, vertex)| {
                let loc = *by_key.entry(exact_key(vertex)).or_insert_with(|| {
                    locations.push(Location { vertex: *vertex, members: SmallVec::new() });
                    locations.len() - 1
                });
                locations[loc].members.push(i);
                loc
            })
            .collect();

        let mut bounds = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        for location in &locations {
            let Vertex { x, y, .. } = location.vertex;
            bounds = [bounds[0].min(x), bounds[1].min(y), bounds[2].max(x), bounds[3].max(y)];
        }

        // Cells never shrink below what the coordinate magnitude can resolve.
        let extent = bounds.iter().filter(|b| b.is_finite()).fold(0.0f64, |m, b| m.max(b.abs()));
        let cell_size = (4.0 * radius).max(extent * 1e-9).max(f64::MIN_POSITIVE);

        let mut cells: AHashMap<Cell, SmallVec<[usize; 1]>> = AHashMap::with_capacity(locations.len());
        for (loc, location) in locations.iter().enumerate() {
            cells.entry(Cell::of(location.vertex.x, location.vertex.y, cell_size)).or_default().push(loc);
        }

        Self { locations, location_of, radius, cell_size, cells, bounds }
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.location_of.len() }

    #[inline] pub(crate) fn location_count(&self) -> usize { self.locations.len() }

    #[inline] pub(crate) fn location(&self, loc: usize) -> &Location { &self.locations[loc] }

    /// Location holding vertex `index`.
    #[inline] pub(crate) fn location_of(&self, index: usize) -> usize { self.location_of[index] }

    /// Locations whose coordinate matches `query` within `tolerance`, in no particular order.
    pub(crate) fn neighbors(&self, query: Vertex, tolerance: Tolerance) -> impl Iterator<Item = usize> + '_ {
        debug_assert!(tolerance.xy() <= self.radius, "query radius exceeds the indexed radius");

        // Widened by a few ulps so rounding never drops a boundary match.
        let reach = tolerance.xy() * (1.0 + 1e-9) + 4.0 * f64::EPSILON * query.x.abs().max(query.y.abs());
        let [min_x, min_y, max_x, max_y] = self.bounds;
        let inside = query.x + reach >= min_x && query.x - reach <= max_x
            && query.y + reach >= min_y && query.y - reach <= max_y;
        let (lo, hi) = if inside {
            (
                Cell::of(query.x - reach, query.y - reach, self.cell_size),
                Cell::of(query.x + reach, query.y + reach, self.cell_size),
            )
        } else {
            (Cell { x: 1, y: 1 }, Cell { x: 0, y: 0 })
        };

        (lo.x..=hi.x)
            .flat_map(move |x| (lo.y..=hi.y).map(move |y| Cell { x, y }))
            .filter_map(move |cell| self.cells.get(&cell))
            .flatten()
            .copied()
            .filter(move |&loc| tolerance.matches(&query, &self.locations[loc].vertex))
    }

    /// Vertex indices matching `query`, nearest first; ties keep traversal order.
    pub(crate) fn nearest_members(&self, query: &Vertex, tolerance: &Tolerance) -> Vec<usize> {
        let mut found = self.neighbors(*query, *tolerance)
            .flat_map(|loc| {
                let d2 = self.locations[loc].vertex.distance_xy_squared(query);
                self.locations[loc].members.iter().map(move |&i| (d2, i))
            })
            .collect::<Vec<_>>();
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.into_iter().map(|(_, i)| i).collect()
    }
}
