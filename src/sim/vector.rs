//! Vector math helpers
//!
//! The simulation uses `glam::Vec3` as its 3-component vector (add, subtract,
//! scale, normalize, cross and distance all come from glam). Model space has
//! x/y as heightfield cell coordinates and z as elevation.

pub use glam::Vec3;

/// Distance between two points ignoring elevation
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    a.truncate().distance(b.truncate())
}

/// Decompose a wind given as speed + direction (degrees) into a vector
#[inline]
pub fn wind_vector(speed: f32, direction: f32) -> Vec3 {
    let dir = direction.to_radians();
    Vec3::new(speed * dir.cos(), speed * dir.sin(), 0.0)
}

/// Nearest heightfield cell containing a model-space point
#[inline]
pub fn containing_cell(pos: Vec3) -> (i32, i32) {
    (pos.x.round() as i32, pos.y.round() as i32)
}
