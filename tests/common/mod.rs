// Shared fixtures for the integration tests.
#![allow(dead_code)]

use vertexdiff::{Geometry, Tolerance, Vertex};

pub const LOWER_LEFT_X: f64 = 2_600_000.0;
pub const LOWER_LEFT_Y: f64 = 1_200_000.0;
pub const OUTER_SIDE_LENGTH: f64 = 9000.0;
pub const CONSTANT_Z: f64 = 99.0;

pub fn tolerance(xy: f64, z: f64) -> Tolerance {
    Tolerance::new(xy, z).unwrap()
}

/// Square ring starting at the lower left corner, walking up the left side
/// first (clockwise). Counter-clockwise rings are the reverse.
fn square(x: f64, y: f64, side: f64, points_per_side: usize, clockwise: bool, z: f64) -> Vec<Vertex> {
    let n = points_per_side.max(1);
    let dist = side / n as f64;
    let mut points = vec![Vertex::new(0.0, 0.0, z); 4 * n];
    for i in 0..n {
        let offset = i as f64 * dist;
        points[i] = Vertex::new(x, y + offset, z);
        points[i + n] = Vertex::new(x + offset, y + side, z);
        points[i + 2 * n] = Vertex::new(x + side, y + side - offset, z);
        points[i + 3 * n] = Vertex::new(x + side - offset, y, z);
    }
    if !clockwise { points.reverse() }
    points
}

/// Rotate left by `steps` (right if negative).
fn rotate(points: &mut [Vertex], steps: i64) {
    let len = points.len() as i64;
    if len == 0 { return }
    points.rotate_left(steps.rem_euclid(len) as usize);
}

/// A z-aware square polygon with a grid of square holes. Every ring has
/// about `points_per_part` vertices (plus the closing one) and starts
/// `rotate_steps` vertices after its lower left corner.
pub fn punched_square_polygon(points_per_part: usize, holes: usize, rotate_steps: i64) -> Geometry {
    let holes_in_x_and_y = (holes as f64).sqrt().round_ties_even() as usize;
    let points_per_side = (points_per_part as f64 / 4.0).round_ties_even() as usize;

    let mut outer = square(LOWER_LEFT_X, LOWER_LEFT_Y, OUTER_SIDE_LENGTH, points_per_side, true, CONSTANT_Z);
    rotate(&mut outer, rotate_steps);
    let mut rings = vec![outer];

    let inner_side = OUTER_SIDE_LENGTH / (1 + 2 * holes_in_x_and_y) as f64;
    for i in 0..holes_in_x_and_y {
        let x = LOWER_LEFT_X + (inner_side + 2.0 * i as f64 * inner_side);
        for j in 0..holes_in_x_and_y {
            let y = LOWER_LEFT_Y + (inner_side + 2.0 * j as f64 * inner_side);
            let mut hole = square(x, y, inner_side, points_per_side, false, CONSTANT_Z);
            rotate(&mut hole, rotate_steps);
            rings.push(hole);
        }
    }

    Geometry::polygon(rings)
}

/// A path visiting (10, 0) and (20, 0) twice.
pub fn zig_zag_path() -> Geometry {
    Geometry::path([(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 10.0)])
}

/// `zig_zag_path` with the repeated visits removed.
pub fn simplified_zig_zag_path() -> Geometry {
    Geometry::path([(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 10.0)])
}

/// A z-aware multipoint at elevation 5000.
pub fn multipoint(points: &[(f64, f64)]) -> Geometry {
    Geometry::multipoint(points.iter().map(|&(x, y)| (x, y, 5000.0)))
}

/// The same points with every repeat of an earlier point removed.
pub fn without_repeats(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut unique: Vec<(f64, f64)> = Vec::new();
    for &point in points {
        if !unique.contains(&point) { unique.push(point) }
    }
    unique
}
