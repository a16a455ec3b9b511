mod weed;

use std::time::Instant;

use tracing::{debug, instrument, trace};

use crate::error::{CompareError, Result};
use crate::extract::{VertexSequence, VertexSource};
use crate::geom::PointIndex;
use crate::types::{Tolerance, Vertex};

pub use weed::weed_part;
use weed::lexicographic_min;

/// A weeded part ready for alignment.
struct WeededPart {
    vertices: Vec<Vertex>,
    closed: bool,
}

/// Returns true if `a` and `b` describe the same polyline or polygon within
/// `tolerance × tolerance_factor`, regardless of vertex density, ring start
/// vertex, traversal direction and part order.
///
/// Both geometries are weeded with the scaled tolerance first, then each part
/// of `a` must align vertex by vertex with a distinct part of `b`. A factor of
/// zero compares exactly, apart from repeated vertices.
#[instrument(skip_all, fields(factor = tolerance_factor))]
pub fn are_congruent_within_tolerance(
    a: &impl VertexSource,
    b: &impl VertexSource,
    tolerance: &Tolerance,
    tolerance_factor: f64,
) -> Result<bool> {
    if !tolerance_factor.is_finite() || tolerance_factor < 0.0 {
        return Err(CompareError::InvalidToleranceFactor(tolerance_factor))
    }

    let (a, b) = (a.extract_vertices()?, b.extract_vertices()?);
    for sequence in [&a, &b] {
        if !sequence.kind().is_polycurve() {
            return Err(CompareError::UnsupportedGeometryKind(
                format!("congruence needs polylines or polygons, got {}", sequence.kind())
            ))
        }
    }
    if a.kind() != b.kind() { return Ok(false) }

    let started = Instant::now();
    let mut tolerance = tolerance.scaled(tolerance_factor);
    if !(a.z_aware() && b.z_aware()) { tolerance = tolerance.without_z() }

    let (parts_a, parts_b) = (weed_all(&a, &tolerance), weed_all(&b, &tolerance));
    let congruent = parts_a.len() == parts_b.len() && pair_parts(&parts_a, &parts_b, &tolerance);

    debug!(
        vertices_a = a.len(),
        vertices_b = b.len(),
        weeded_a = parts_a.iter().map(|p| p.vertices.len()).sum::<usize>(),
        weeded_b = parts_b.iter().map(|p| p.vertices.len()).sum::<usize>(),
        congruent,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "congruence test"
    );
    Ok(congruent)
}

/// Polyline parts that end where they start are weeded and aligned as rings.
fn weed_all(sequence: &VertexSequence, tolerance: &Tolerance) -> Vec<WeededPart> {
    (0..sequence.part_count())
        .map(|p| {
            let vertices = sequence.part(p);
            let closed = sequence.parts()[p].is_closed()
                || (vertices.len() > 1 && vertices[0].is_identical(&vertices[vertices.len() - 1]));
            WeededPart { vertices: weed_part(vertices, closed, tolerance), closed }
        })
        .filter(|part| !part.vertices.is_empty())
        .collect()
}

/// Pair every part of `a` with an unpaired part of `b` it aligns with.
fn pair_parts(a: &[WeededPart], b: &[WeededPart], tolerance: &Tolerance) -> bool {
    let mut flat = Vec::new();
    let mut owner = Vec::new(); // flat index -> (part, index in part)
    for (p, part) in b.iter().enumerate() {
        flat.extend_from_slice(&part.vertices);
        owner.extend((0..part.vertices.len()).map(|i| (p, i)));
    }
    let index = PointIndex::new(&flat, tolerance.xy());
    let mut paired = vec![false; b.len()];

    for (p, part) in a.iter().enumerate() {
        let anchor = if part.closed { lexicographic_min(&part.vertices) } else { 0 };
        let partner = index.nearest_members(&part.vertices[anchor], tolerance).into_iter()
            .map(|i| owner[i])
            .find(|&(q, start)| {
                !paired[q]
                    && b[q].closed == part.closed
                    && b[q].vertices.len() == part.vertices.len()
                    && aligns(part, anchor, &b[q], start, tolerance)
            });

        match partner {
            Some((q, _)) => paired[q] = true,
            None => {
                trace!(part = p, vertices = part.vertices.len(), "no congruent partner");
                return false
            }
        }
    }
    true
}

/// Vertex-wise alignment of `a` starting at `from_a` with `b` starting at `from_b`.
fn aligns(a: &WeededPart, from_a: usize, b: &WeededPart, from_b: usize, tolerance: &Tolerance) -> bool {
    let n = a.vertices.len();
    let at_a = |i: usize| &a.vertices[(from_a + i) % n];

    if a.closed {
        let forward = (0..n).all(|i| tolerance.matches(at_a(i), &b.vertices[(from_b + i) % n]));
        forward || (0..n).all(|i| tolerance.matches(at_a(i), &b.vertices[(from_b + n - i) % n]))
    } else {
        let forward = from_b == 0 && (0..n).all(|i| tolerance.matches(&a.vertices[i], &b.vertices[i]));
        forward || (from_b == n - 1 && (0..n).all(|i| tolerance.matches(&a.vertices[i], &b.vertices[n - 1 - i])))
    }
}
