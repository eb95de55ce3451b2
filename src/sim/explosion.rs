//! Explosion-driven terrain deformation
//!
//! An impact defines a sphere. For every cell under it the engine works out a
//! column split into top/middle/bottom bounds, stores those bounds in the
//! heightfield's scratch channels, and derives the new surface from the same
//! column. The stored bounds saturate into `[0, scale]` like every channel,
//! so a sphere reaching below 0 or a mound above the scale is only clipped
//! in the animation snapshots, never in the resulting surface.

use serde::{Deserialize, Serialize};

use super::heightfield::{Channel, HeightField, Material, MaterialGrid, check_dimensions};
use super::vector::Vec3;
use super::weapons::WeaponStyle;
use crate::error::SimError;

/// Per-cell result of intersecting a sphere with a terrain column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub top: f32,
    pub middle: f32,
    pub bottom: f32,
    /// Surface height after the blast
    pub surface: f32,
    /// Whether the surface material becomes disturbed
    pub disturbed: bool,
}

impl Column {
    fn untouched(current: f32) -> Self {
        Self {
            top: current,
            middle: current,
            bottom: current,
            surface: current,
            disturbed: false,
        }
    }
}

/// Remove the part of a column inside `[sphere_bottom, sphere_top]`
///
/// Material above the sphere drops by the overlap; a column ending inside the
/// sphere drops to the sphere bottom; a column below the sphere is untouched.
pub fn carve_column(current: f32, sphere_top: f32, sphere_bottom: f32) -> Column {
    let top = current;
    let middle = current.min(sphere_top);
    let bottom = current.min(sphere_bottom);
    Column {
        top,
        middle,
        bottom,
        surface: current.min(bottom + (top - middle).max(0.0)),
        disturbed: sphere_bottom < current,
    }
}

/// Deposit a mound spanning `[sphere_bottom, sphere_top]` onto a column
pub fn accrete_column(current: f32, sphere_top: f32, sphere_bottom: f32) -> Column {
    if sphere_bottom > current {
        // Whole mound sits on the surface
        Column {
            top: sphere_top,
            middle: sphere_bottom,
            bottom: current,
            surface: current + (sphere_top - sphere_bottom),
            disturbed: true,
        }
    } else if sphere_top > current {
        // Partially buried; surface rises to the mound top
        Column {
            top: sphere_top,
            middle: current,
            bottom: current,
            surface: sphere_top,
            disturbed: true,
        }
    } else if sphere_top <= current {
        Column::untouched(current)
    } else {
        // Unordered comparison (NaN input)
        Column {
            surface: current * 1.1,
            ..Column::untouched(current)
        }
    }
}

/// Animation bounds produced by one explosion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionSnapshots {
    pub top: HeightField,
    pub middle: HeightField,
    pub bottom: HeightField,
    /// Material of the upper (falling or deposited) layer
    pub top_material: MaterialGrid,
    /// Material of the lower (exposed or buried) layer
    pub bottom_material: MaterialGrid,
}

/// Apply an explosion to a board's grids in place
///
/// Fills the `Old`/`Top`/`Middle`/`Bottom` scratch channels of `field` and
/// returns snapshots of them. Styles without terrain effects are a no-op
/// whose snapshots all equal the current surface.
pub fn apply_explosion(
    field: &mut HeightField,
    material: &mut MaterialGrid,
    impact: Vec3,
    radius: f32,
    style: WeaponStyle,
) -> Result<ExplosionSnapshots, SimError> {
    check_dimensions(field, material)?;

    for channel in [Channel::Old, Channel::Top, Channel::Middle, Channel::Bottom] {
        field.copy_channel(Channel::Elevation, channel);
    }
    let mut top_material = material.clone();
    let mut bottom_material = material.clone();

    let column_fn: Option<fn(f32, f32, f32) -> Column> = match style {
        WeaponStyle::Explosive => Some(carve_column),
        WeaponStyle::Generative => Some(accrete_column),
        WeaponStyle::Mud | WeaponStyle::Napalm | WeaponStyle::Mirv => None,
    };

    let mut changed = 0usize;
    if let Some(column_fn) = column_fn {
        let radius = radius.max(0.0);
        let min_x = ((impact.x - radius).floor() as i32).max(0);
        let max_x = ((impact.x + radius).ceil() as i32).min(field.width() as i32 - 1);
        let min_y = ((impact.y - radius).floor() as i32).max(0);
        let max_y = ((impact.y + radius).ceil() as i32).min(field.height() as i32 - 1);

        for j in min_y..=max_y {
            for i in min_x..=max_x {
                let dx = i as f32 - impact.x;
                let dy = j as f32 - impact.y;
                let horiz_sq = dx * dx + dy * dy;
                if horiz_sq > radius * radius {
                    continue;
                }
                let vert = (radius * radius - horiz_sq).sqrt();
                let current = field.get(i, j);
                let column = column_fn(current, impact.z + vert, impact.z - vert);

                field.set_channel(i, j, Channel::Top, column.top);
                field.set_channel(i, j, Channel::Middle, column.middle);
                field.set_channel(i, j, Channel::Bottom, column.bottom);

                // Bounds saturate when stored; the surface uses the exact column
                field.set(i, j, column.surface);

                if column.disturbed {
                    match style {
                        WeaponStyle::Explosive => bottom_material.set(i, j, Material::Disturbed),
                        _ => top_material.set(i, j, Material::Disturbed),
                    }
                }
                changed += 1;
            }
        }
    }

    match style {
        WeaponStyle::Explosive => *material = bottom_material.clone(),
        WeaponStyle::Generative => *material = top_material.clone(),
        WeaponStyle::Mud | WeaponStyle::Napalm | WeaponStyle::Mirv => {}
    }

    log::debug!(
        "{} blast at ({:.1}, {:.1}, {:.1}) r={} touched {} cells",
        style.as_str(),
        impact.x,
        impact.y,
        impact.z,
        radius,
        changed
    );

    Ok(ExplosionSnapshots {
        top: field.snapshot(Channel::Top),
        middle: field.snapshot(Channel::Middle),
        bottom: field.snapshot(Channel::Bottom),
        top_material,
        bottom_material,
    })
}
