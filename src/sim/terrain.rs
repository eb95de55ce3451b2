//! Terrain generation and reshaping
//!
//! Diamond-square fractal generation, circular flattening for tank landing
//! pads, tank placement, and surface normals for the renderer.

use rand::Rng;

use super::heightfield::HeightField;
use super::vector::Vec3;
use crate::consts::{PLACEMENT_ATTEMPTS, PLACEMENT_PASSES};
use crate::error::SimError;

/// Per-level shrink factor of the random displacement
const ROUGHNESS: f32 = 0.5;

/// Returns true if `size` is 2^n + 1 for some n >= 1
pub fn is_valid_board_size(size: usize) -> bool {
    size >= 3 && (size - 1).is_power_of_two()
}

/// Generate a `size` x `size` heightfield with diamond-square
///
/// Corners are seeded uniformly in [min, max]; each subdivision level adds a
/// uniform offset whose amplitude halves with the level. Every result is
/// saturated into [min, max].
pub fn generate<R: Rng>(
    size: usize,
    min_elevation: f32,
    max_elevation: f32,
    scale: f32,
    rng: &mut R,
) -> Result<HeightField, SimError> {
    if !is_valid_board_size(size) {
        return Err(SimError::InvalidBoardSize(size));
    }
    let (lo, hi) = if min_elevation <= max_elevation {
        (min_elevation, max_elevation)
    } else {
        (max_elevation, min_elevation)
    };

    let mut grid = vec![0.0f32; size * size];
    let at = |x: usize, y: usize| y * size + x;
    let draw = |rng: &mut R, amplitude: f32| -> f32 {
        if amplitude > 0.0 {
            rng.random_range(-amplitude..=amplitude)
        } else {
            0.0
        }
    };

    let last = size - 1;
    for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
        grid[at(x, y)] = if hi > lo { rng.random_range(lo..=hi) } else { lo };
    }

    let mut step = last;
    let mut amplitude = (hi - lo) * ROUGHNESS;
    while step > 1 {
        let half = step / 2;

        // Centers of squares: average of the four corners
        for y in (half..size).step_by(step) {
            for x in (half..size).step_by(step) {
                let avg = (grid[at(x - half, y - half)]
                    + grid[at(x + half, y - half)]
                    + grid[at(x - half, y + half)]
                    + grid[at(x + half, y + half)])
                    / 4.0;
                grid[at(x, y)] = (avg + draw(rng, amplitude)).clamp(lo, hi);
            }
        }

        // Edge midpoints: average of the (up to four) diamond neighbors
        for y in (0..size).step_by(half) {
            let x_start = if (y / half) % 2 == 0 { half } else { 0 };
            for x in (x_start..size).step_by(step) {
                let mut sum = 0.0;
                let mut count = 0.0;
                if x >= half {
                    sum += grid[at(x - half, y)];
                    count += 1.0;
                }
                if x + half < size {
                    sum += grid[at(x + half, y)];
                    count += 1.0;
                }
                if y >= half {
                    sum += grid[at(x, y - half)];
                    count += 1.0;
                }
                if y + half < size {
                    sum += grid[at(x, y + half)];
                    count += 1.0;
                }
                grid[at(x, y)] = (sum / count + draw(rng, amplitude)).clamp(lo, hi);
            }
        }

        step = half;
        amplitude *= ROUGHNESS;
    }

    let mut field = HeightField::new(size, size, scale);
    for y in 0..size {
        for x in 0..size {
            field.set(x as i32, y as i32, grid[at(x, y)]);
        }
    }
    log::debug!("Generated {}x{} terrain in [{}, {}]", size, size, lo, hi);
    Ok(field)
}

/// Flatten a disc to the elevation found at its center
///
/// Every cell within `radius` of `(cx, cy)` takes the single reference
/// height sampled before any cell is touched.
pub fn flatten_circle(field: &mut HeightField, cx: i32, cy: i32, radius: f32) {
    let reference = field.get(cx, cy);
    if reference < 0.0 {
        // Center off the board: nothing to anchor to
        return;
    }
    let r = radius.max(0.0).ceil() as i32;
    let min_x = (cx - r).max(0);
    let max_x = (cx + r).min(field.width() as i32 - 1);
    let min_y = (cy - r).max(0);
    let max_y = (cy + r).min(field.height() as i32 - 1);

    for j in min_y..=max_y {
        for i in min_x..=max_x {
            let dx = (i - cx) as f32;
            let dy = (j - cy) as f32;
            if (dx * dx + dy * dy).sqrt() <= radius {
                field.set(i, j, reference);
            }
        }
    }
}

/// Choose horizontal tank positions with a bounded random search
///
/// Each player gets up to `PLACEMENT_ATTEMPTS` draws in
/// [margin, size - margin] that are farther than `min_separation` from every
/// tank already placed. If any player exhausts its draws the whole pass is
/// retried, up to `PLACEMENT_PASSES` times; after that the last pass is used
/// as-is, with the final draw standing in for any unplaced player.
pub fn choose_tank_sites<R: Rng>(
    count: usize,
    board_size: usize,
    margin: f32,
    min_separation: f32,
    rng: &mut R,
) -> Vec<(f32, f32)> {
    let upper = board_size.saturating_sub(1) as f32;
    let (lo, hi) = if margin * 2.0 < upper {
        (margin, upper - margin)
    } else {
        (0.0, upper)
    };
    let sample = |rng: &mut R| -> f32 {
        if hi > lo { rng.random_range(lo..=hi) } else { lo }
    };

    let mut sites = Vec::with_capacity(count);
    for pass in 0..PLACEMENT_PASSES {
        sites.clear();
        let mut complete = true;
        for _ in 0..count {
            let mut candidate = (sample(rng), sample(rng));
            let mut found = false;
            for _ in 0..PLACEMENT_ATTEMPTS {
                let clear = sites.iter().all(|&(x, y): &(f32, f32)| {
                    let dx = x - candidate.0;
                    let dy = y - candidate.1;
                    (dx * dx + dy * dy).sqrt() > min_separation
                });
                if clear {
                    found = true;
                    break;
                }
                candidate = (sample(rng), sample(rng));
            }
            if !found {
                complete = false;
            }
            sites.push(candidate);
        }
        if complete {
            log::debug!("Placed {} tanks on pass {}", count, pass + 1);
            return sites;
        }
    }
    log::warn!(
        "Tank placement gave up after {} passes; using best effort",
        PLACEMENT_PASSES
    );
    sites
}

/// Surface normal from an 8-neighbor (Sobel) finite difference
///
/// Samples outside the board are clamped to the nearest edge cell.
pub fn surface_normal(field: &HeightField, x: i32, y: i32, offset: i32) -> Vec3 {
    let d = offset.max(1);
    let max_x = field.width() as i32 - 1;
    let max_y = field.height() as i32 - 1;
    if max_x < 0 || max_y < 0 {
        return Vec3::Z;
    }
    let h = |i: i32, j: i32| field.get(i.clamp(0, max_x), j.clamp(0, max_y));

    let dzdx = ((h(x + d, y - d) + 2.0 * h(x + d, y) + h(x + d, y + d))
        - (h(x - d, y - d) + 2.0 * h(x - d, y) + h(x - d, y + d)))
        / (8.0 * d as f32);
    let dzdy = ((h(x - d, y + d) + 2.0 * h(x, y + d) + h(x + d, y + d))
        - (h(x - d, y - d) + 2.0 * h(x, y - d) + h(x + d, y - d)))
        / (8.0 * d as f32);

    Vec3::new(-dzdx, -dzdy, 1.0).normalize()
}
