use std::cmp::Ordering;

use geo::{Coord, LineString, SimplifyIdx};

use crate::types::{Tolerance, Vertex};

/// Reduce a part to its shape-defining vertices.
///
/// Exact consecutive repeats are always removed, as is the closing vertex of
/// a ring. With a positive planar tolerance the part is then simplified with
/// Douglas-Peucker in the plane. Paths keep both endpoints. Rings are split
/// at their lexicographically smallest vertex and the vertex farthest from
/// it, so the result does not depend on where the ring starts.
///
/// When the tolerance has an elevation component, a vertex is only dropped if
/// its z also stays within tolerance of the z interpolated along the chord
/// that replaces it.
pub fn weed_part(vertices: &[Vertex], closed: bool, tolerance: &Tolerance) -> Vec<Vertex> {
    let mut part = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        if part.last().is_some_and(|last: &Vertex| last.is_identical(vertex)) { continue }
        part.push(*vertex);
    }
    if closed {
        while part.len() > 1 && part[0].is_identical(&part[part.len() - 1]) { part.pop(); }
    }

    if tolerance.xy() <= 0.0 { return part }
    if closed { weed_ring(&part, tolerance) } else { weed_path(&part, tolerance) }
}

/// Index of the lexicographically smallest vertex; the first one on ties.
pub(crate) fn lexicographic_min(vertices: &[Vertex]) -> usize {
    vertices.iter().enumerate()
        .min_by(|(i, a), (j, b)| a.lexicographic_cmp(b).then(i.cmp(j)))
        .map_or(0, |(i, _)| i)
}

/// Distance in z between `vertex` and the chord `from`-`to` at its projection.
/// An undefined elevation is infinitely far from a defined one.
fn elevation_deviation(vertex: &Vertex, from: &Vertex, to: &Vertex) -> f64 {
    let (_, t) = vertex.distance_to_segment_squared(from, to);
    let chord_z = from.z + t * (to.z - from.z);
    match (vertex.z.is_nan(), chord_z.is_nan()) {
        (true, true) => 0.0,
        (false, false) => (vertex.z - chord_z).abs(),
        _ => f64::INFINITY,
    }
}

fn simplify_chain(chain: &[Vertex], tolerance: &Tolerance) -> Vec<usize> {
    if chain.len() <= 2 { return (0..chain.len()).collect() }
    let line = chain.iter().map(|&v| Coord::from(v)).collect::<LineString<f64>>();
    let kept = line.simplify_idx(&tolerance.xy());
    if tolerance.ignores_z() { kept } else { keep_elevation_changes(chain, kept, tolerance.z()) }
}

/// Douglas-Peucker on elevation within each gap left by the planar pass:
/// the vertex deviating most beyond `z_tolerance` is restored until none is left.
fn keep_elevation_changes(chain: &[Vertex], kept: Vec<usize>, z_tolerance: f64) -> Vec<usize> {
    let mut stack = kept.windows(2).map(|pair| (pair[0], pair[1])).collect::<Vec<_>>();
    let mut result = kept;
    while let Some((from, to)) = stack.pop() {
        let worst = (from + 1..to)
            .map(|i| (elevation_deviation(&chain[i], &chain[from], &chain[to]), i))
            .filter(|&(deviation, _)| deviation > z_tolerance)
            .max_by(|a, b| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1)));
        if let Some((_, i)) = worst {
            result.push(i);
            stack.push((from, i));
            stack.push((i, to));
        }
    }
    result.sort_unstable();
    result
}

fn weed_path(part: &[Vertex], tolerance: &Tolerance) -> Vec<Vertex> {
    simplify_chain(part, tolerance).into_iter().map(|i| part[i]).collect()
}

fn weed_ring(part: &[Vertex], tolerance: &Tolerance) -> Vec<Vertex> {
    let n = part.len();
    if n < 4 { return part.to_vec() }

    let start = lexicographic_min(part);
    let ring = part[start..].iter().chain(&part[..start]).copied().collect::<Vec<_>>();

    let far = (1..n)
        .max_by(|&i, &j| {
            ring[i].distance_xy_squared(&ring[0]).total_cmp(&ring[j].distance_xy_squared(&ring[0]))
                .then(j.cmp(&i))
        })
        .unwrap_or(1);

    let first = &ring[..=far];
    let second = ring[far..].iter().chain(std::iter::once(&ring[0])).copied().collect::<Vec<_>>();

    let mut weeded = simplify_chain(first, tolerance).into_iter().map(|i| first[i]).collect::<Vec<_>>();
    let kept = simplify_chain(&second, tolerance);
    weeded.extend(kept[1..kept.len() - 1].iter().map(|&i| second[i]));

    // The anchor itself goes if it sits on the chord of its neighbours.
    if weeded.len() > 3 {
        let (prev, next) = (&weeded[weeded.len() - 1], &weeded[1]);
        let (d2, _) = weeded[0].distance_to_segment_squared(prev, next);
        let epsilon = tolerance.xy();
        let flat = d2.partial_cmp(&(epsilon * epsilon)) != Some(Ordering::Greater);
        let level = tolerance.ignores_z() || elevation_deviation(&weeded[0], prev, next) <= tolerance.z();
        if flat && level { weeded.remove(0); }
    }
    weeded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(points: &[(f64, f64)]) -> Vec<Vertex> {
        points.iter().map(|&(x, y)| Vertex::xy(x, y)).collect()
    }

    fn planar(epsilon: f64) -> Tolerance { Tolerance::xy_only(epsilon).unwrap() }

    #[test]
    fn exact_weeding_drops_repeats_and_closure() {
        let ring = xy(&[(0.0, 0.0), (0.0, 1.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        assert_eq!(weed_part(&ring, true, &planar(0.0)), xy(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]));

        let path = xy(&[(0.0, 0.0), (0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(weed_part(&path, false, &planar(0.0)), xy(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]));
    }

    #[test]
    fn path_keeps_endpoints() {
        let path = xy(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(weed_part(&path, false, &planar(0.0125)), xy(&[(0.0, 0.0), (2.0, 2.0)]));

        let bent = xy(&[(0.0, 0.0), (1.1, 0.9), (2.0, 2.0)]);
        assert_eq!(weed_part(&bent, false, &planar(0.0125)).len(), 3);
        assert_eq!(weed_part(&bent, false, &planar(0.25)).len(), 2);
    }

    #[test]
    fn ring_result_is_start_independent() {
        let square = xy(&[
            (0.0, 0.0), (0.0, 0.5), (0.0, 1.0), (0.5, 1.0),
            (1.0, 1.0), (1.0, 0.5), (1.0, 0.0), (0.5, 0.05), (0.0, 0.0),
        ]);
        let expected = xy(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        assert_eq!(weed_part(&square, true, &planar(0.1)), expected);

        let mut rotated = square[3..8].to_vec();
        rotated.extend_from_slice(&square[..4]);
        assert_eq!(weed_part(&rotated, true, &planar(0.1)), expected);
    }

    #[test]
    fn anchor_on_a_straight_side_is_dropped() {
        // The smallest vertex is the midpoint of the left side.
        let ring = xy(&[(0.0, 1.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0), (0.00001, 0.0)]);
        let weeded = weed_part(&ring, true, &planar(0.01));
        assert_eq!(weeded.len(), 4);
        assert!(!weeded.contains(&Vertex::xy(0.0, 1.0)));
    }

    #[test]
    fn small_rings_are_left_alone() {
        let triangle = xy(&[(0.0, 0.0), (0.0, 1.0), (0.001, 0.5), (0.0, 0.0)]);
        assert_eq!(weed_part(&triangle, true, &planar(0.1)).len(), 3);
    }

    #[test]
    fn elevation_changes_survive_weeding() {
        let tolerance = Tolerance::new(0.01, 0.01).unwrap();
        let spiked = vec![Vertex::new(0.0, 0.0, 0.0), Vertex::new(5.0, 0.0, 50.0), Vertex::new(10.0, 0.0, 0.0)];
        assert_eq!(weed_part(&spiked, false, &tolerance).len(), 3);
        assert_eq!(weed_part(&spiked, false, &tolerance.without_z()).len(), 2);

        let flat = vec![Vertex::new(0.0, 0.0, 0.0), Vertex::new(5.0, 0.0, 5.0), Vertex::new(10.0, 0.0, 10.0)];
        assert_eq!(weed_part(&flat, false, &tolerance).len(), 2);
    }

    #[test]
    fn ring_keeps_elevation_spike_on_straight_side() {
        let tolerance = Tolerance::new(0.01, 0.01).unwrap();
        let ring = [(0.0, 0.0, 1.0), (0.0, 5.0, 80.0), (0.0, 10.0, 1.0), (10.0, 10.0, 1.0), (10.0, 0.0, 1.0)]
            .map(Vertex::from);
        let weeded = weed_part(&ring, true, &tolerance);
        assert_eq!(weeded.len(), 5);
        assert!(weeded.contains(&Vertex::new(0.0, 5.0, 80.0)));

        let level = ring.map(|v| Vertex::new(v.x, v.y, 1.0));
        assert_eq!(weed_part(&level, true, &tolerance).len(), 4);
    }
}
