//! Surface normal estimation and sediment helpers for droplet erosion.

use glam::{Vec2, Vec3};

use crate::tilemap::Heightfield;

const AXIS_WEIGHT: f32 = 0.15;
const DIAGONAL_WEIGHT: f32 = 0.1;

const AXES: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Height at a cell offset, clamping the neighbour to the grid.
fn height_clamped(heightfield: &Heightfield, x: usize, y: usize, dx: i32, dy: i32) -> f32 {
    let nx = (x as i32 + dx).clamp(0, heightfield.width as i32 - 1) as usize;
    let ny = (y as i32 + dy).clamp(0, heightfield.height as i32 - 1) as usize;
    *heightfield.get(nx, ny)
}

/// Smoothed surface normal at a cell (Y up, grid x -> X, grid y -> Z).
///
/// Blends eight one-sided slope normals: the four axis neighbours weighted
/// 0.15 each and the four diagonals weighted 0.1 each. Each slope normal is
/// normalized before weighting, so the result is not unit length.
pub fn surface_normal(heightfield: &Heightfield, x: usize, y: usize, scale: f32) -> Vec3 {
    let h = *heightfield.get(x, y);
    let mut n = Vec3::ZERO;

    for &(dx, dy) in &AXES {
        // Forward difference toward the neighbour, oriented along +axis
        let diff = scale * (h - height_clamped(heightfield, x, y, dx, dy));
        let estimate = Vec3::new(diff * dx as f32, 1.0, diff * dy as f32);
        n += AXIS_WEIGHT * estimate.normalize();
    }

    let sqrt2 = std::f32::consts::SQRT_2;
    for &(dx, dy) in &DIAGONALS {
        let diff = scale * (h - height_clamped(heightfield, x, y, dx, dy)) / sqrt2;
        let estimate = Vec3::new(diff * dx as f32, sqrt2, diff * dy as f32);
        n += DIAGONAL_WEIGHT * estimate.normalize();
    }

    n
}

/// Horizontal (tangential) part of a Y-up normal as a grid-space vector.
pub fn tangential(normal: Vec3) -> Vec2 {
    Vec2::new(normal.x, normal.z)
}

/// Sediment a droplet can carry moving from `old_height` to `new_height`.
///
/// Uphill moves give a negative raw value, which is clamped to zero.
pub fn sediment_capacity(volume: f32, speed: f32, old_height: f32, new_height: f32) -> f32 {
    (volume * speed * (old_height - new_height)).max(0.0)
}

/// Grid cell containing a position, clamped to the grid.
pub fn cell_of(heightfield: &Heightfield, position: Vec2) -> (usize, usize) {
    let x = (position.x.max(0.0) as usize).min(heightfield.width - 1);
    let y = (position.y.max(0.0) as usize).min(heightfield.height - 1);
    (x, y)
}

/// Whether a position lies in `[0, width) x [0, height)`.
pub fn in_bounds(heightfield: &Heightfield, position: Vec2) -> bool {
    position.x >= 0.0
        && position.y >= 0.0
        && position.x < heightfield.width as f32
        && position.y < heightfield.height as f32
}
