//! Terrain grids
//!
//! A `HeightField` stores per-cell scalar channels normalized to [0, 1] and
//! reports them in real units through a fixed scale factor. Only the
//! elevation channel carries simulation meaning; the other channels are
//! scratch space the explosion engine fills so the presentation layer can
//! animate a blast.
//!
//! A `MaterialGrid` is the companion surface-material grid. Both grids of a
//! board always share dimensions.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Value returned for out-of-bounds reads
pub const OUT_OF_BOUNDS: f32 = -1.0;

/// Named per-cell channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Terrain surface height
    Elevation,
    /// Upper bound of the blast column
    Top,
    /// Split point inside the blast column
    Middle,
    /// Lower bound of the blast column
    Bottom,
    /// Surface height before the blast
    Old,
}

impl Channel {
    pub const COUNT: usize = 5;

    #[inline]
    fn index(self) -> usize {
        match self {
            Channel::Elevation => 0,
            Channel::Top => 1,
            Channel::Middle => 2,
            Channel::Bottom => 3,
            Channel::Old => 4,
        }
    }
}

/// A 2D grid of normalized scalar channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    width: usize,
    height: usize,
    /// Real units per normalized 1.0
    scale: f32,
    /// Indexed by `Channel::index`; only elevation is always allocated
    channels: Vec<Option<Vec<f32>>>,
}

impl HeightField {
    /// Create a flat field at elevation 0
    pub fn new(width: usize, height: usize, scale: f32) -> Self {
        let mut channels = vec![None; Channel::COUNT];
        channels[Channel::Elevation.index()] = Some(vec![0.0; width * height]);
        Self {
            width,
            height,
            scale,
            channels,
        }
    }

    /// Create a field with every cell at `elevation` (real units)
    pub fn flat(width: usize, height: usize, scale: f32, elevation: f32) -> Self {
        let mut field = Self::new(width, height, scale);
        field.fill(elevation);
        field
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Elevation at a cell in real units, or `OUT_OF_BOUNDS`
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> f32 {
        self.get_channel(x, y, Channel::Elevation)
    }

    /// Channel value at a cell in real units, or `OUT_OF_BOUNDS`
    ///
    /// Unallocated scratch channels read as 0.
    pub fn get_channel(&self, x: i32, y: i32, channel: Channel) -> f32 {
        let Some(idx) = self.cell_index(x, y) else {
            return OUT_OF_BOUNDS;
        };
        match &self.channels[channel.index()] {
            Some(data) => data[idx] * self.scale,
            None => 0.0,
        }
    }

    /// Set the elevation at a cell (real units)
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: f32) {
        self.set_channel(x, y, Channel::Elevation, value);
    }

    /// Set a channel value at a cell (real units)
    ///
    /// Values saturate into [0, scale]. Out-of-bounds writes are ignored.
    pub fn set_channel(&mut self, x: i32, y: i32, channel: Channel, value: f32) {
        let Some(idx) = self.cell_index(x, y) else {
            return;
        };
        let normalized = self.normalize(value);
        let len = self.width * self.height;
        let data = self.channels[channel.index()].get_or_insert_with(|| vec![0.0; len]);
        data[idx] = normalized;
    }

    #[inline]
    fn normalize(&self, value: f32) -> f32 {
        // f32::max maps NaN to 0
        (value / self.scale).max(0.0).min(1.0)
    }

    /// Set every elevation cell to `value` (real units)
    pub fn fill(&mut self, value: f32) {
        let normalized = self.normalize(value);
        if let Some(data) = &mut self.channels[Channel::Elevation.index()] {
            data.fill(normalized);
        }
    }

    /// Copy one channel into a new single-channel field (as its elevation)
    pub fn snapshot(&self, channel: Channel) -> HeightField {
        let mut out = HeightField::new(self.width, self.height, self.scale);
        if let Some(data) = &self.channels[channel.index()] {
            out.channels[Channel::Elevation.index()] = Some(data.clone());
        }
        out
    }

    /// Overwrite one channel with the contents of another
    pub fn copy_channel(&mut self, from: Channel, to: Channel) {
        if from == to {
            return;
        }
        let len = self.width * self.height;
        let source = self.channels[from.index()]
            .clone()
            .unwrap_or_else(|| vec![0.0; len]);
        self.channels[to.index()] = Some(source);
    }

    /// Drop every scratch channel, keeping only elevation
    pub fn clear_scratch(&mut self) {
        for (i, channel) in self.channels.iter_mut().enumerate() {
            if i != Channel::Elevation.index() {
                *channel = None;
            }
        }
    }

    /// Whether a scratch channel currently holds data
    pub fn has_channel(&self, channel: Channel) -> bool {
        self.channels[channel.index()].is_some()
    }
}

/// Surface material of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Material {
    /// Natural ground cover
    #[default]
    Natural = 0,
    /// Disturbed or excavated soil
    Disturbed = 1,
}

/// Per-cell material index grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialGrid {
    width: usize,
    height: usize,
    cells: Vec<Material>,
}

impl MaterialGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Material::Natural; width * height],
        }
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Resize and reset every cell to natural ground
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![Material::Natural; width * height];
    }

    #[inline]
    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Material at a cell, `None` if out of bounds
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Material> {
        self.cell_index(x, y).map(|idx| self.cells[idx])
    }

    /// Set the material at a cell; out-of-bounds writes are ignored
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, material: Material) {
        if let Some(idx) = self.cell_index(x, y) {
            self.cells[idx] = material;
        }
    }
}

/// Fail fast if a board's grids disagree in size
pub fn check_dimensions(field: &HeightField, material: &MaterialGrid) -> Result<(), SimError> {
    if field.dimensions() != material.dimensions() {
        return Err(SimError::DimensionMismatch {
            field: field.dimensions(),
            material: material.dimensions(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_reads_sentinel() {
        let field = HeightField::flat(10, 10, 512.0, 50.0);
        assert_eq!(field.get(-1, 0), OUT_OF_BOUNDS);
        assert_eq!(field.get(0, 10), OUT_OF_BOUNDS);
        assert_eq!(field.get(10, 3), OUT_OF_BOUNDS);
        assert_eq!(field.get(3, 3), 50.0);
    }

    #[test]
    fn test_out_of_bounds_write_is_noop() {
        let mut field = HeightField::flat(4, 4, 512.0, 10.0);
        let before = field.clone();
        field.set(4, 0, 99.0);
        field.set(-1, -1, 99.0);
        assert_eq!(field, before);
    }

    #[test]
    fn test_negative_writes_clamp_to_zero() {
        let mut field = HeightField::new(4, 4, 512.0);
        field.set(1, 1, -20.0);
        assert_eq!(field.get(1, 1), 0.0);
    }

    #[test]
    fn test_values_saturate_at_scale() {
        let mut field = HeightField::new(4, 4, 512.0);
        field.set(2, 2, 10_000.0);
        assert_eq!(field.get(2, 2), 512.0);
    }

    #[test]
    fn test_scaled_round_trip() {
        let mut field = HeightField::new(4, 4, 512.0);
        field.set(0, 0, 123.25);
        assert_eq!(field.get(0, 0), 123.25);
    }

    #[test]
    fn test_scratch_channels() {
        let mut field = HeightField::flat(4, 4, 512.0, 30.0);
        assert!(!field.has_channel(Channel::Top));
        assert_eq!(field.get_channel(1, 1, Channel::Top), 0.0);

        field.set_channel(1, 1, Channel::Top, 40.0);
        assert!(field.has_channel(Channel::Top));
        assert_eq!(field.get_channel(1, 1, Channel::Top), 40.0);

        let top = field.snapshot(Channel::Top);
        assert_eq!(top.get(1, 1), 40.0);
        assert_eq!(top.get(0, 0), 0.0);

        field.clear_scratch();
        assert!(!field.has_channel(Channel::Top));
        assert_eq!(field.get(1, 1), 30.0);
    }

    #[test]
    fn test_material_resize_resets_cells() {
        let mut material = MaterialGrid::new(4, 4);
        material.set(1, 1, Material::Disturbed);
        material.set_size(9, 9);
        assert_eq!(material.dimensions(), (9, 9));
        assert_eq!(material.get(1, 1), Some(Material::Natural));
        assert!(check_dimensions(&HeightField::new(9, 9, 512.0), &material).is_ok());
    }

    #[test]
    fn test_dimension_mismatch_fails() {
        let field = HeightField::new(4, 4, 512.0);
        let material = MaterialGrid::new(5, 4);
        assert!(matches!(
            check_dimensions(&field, &material),
            Err(SimError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_material_grid_bounds() {
        let mut material = MaterialGrid::new(3, 3);
        assert_eq!(material.get(1, 1), Some(Material::Natural));
        material.set(1, 1, Material::Disturbed);
        material.set(5, 5, Material::Disturbed);
        assert_eq!(material.get(1, 1), Some(Material::Disturbed));
        assert_eq!(material.get(5, 5), None);
    }
}
