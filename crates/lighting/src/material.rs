//! Per-cell material properties consumed by the propagation engine.

use serde::{Deserialize, Serialize};
use tilelight_core::GridSize;

/// Material lookup supplied by the owner of a light map.
///
/// Factors are expected in `[0, 1]`; the engine clamps anything else.
pub trait MaterialStrategy {
    /// Direct light the cell emits when the map is initialized.
    fn initial_light(&self, index: usize) -> u16;

    /// Sunlight the cell emits when the map is initialized.
    fn initial_sunlight(&self, index: usize) -> u16;

    /// Fraction of incoming light passed through the cell.
    fn transmission_factor(&self, index: usize) -> f32;

    /// Fraction of perpendicular incoming light re-emitted as reflection.
    fn reflection_factor(&self, index: usize) -> f32;

    /// Number of cells described, when known. Used to validate grid sizes.
    fn cell_count(&self) -> Option<usize> {
        None
    }
}

impl<M: MaterialStrategy + ?Sized> MaterialStrategy for &M {
    fn initial_light(&self, index: usize) -> u16 {
        (**self).initial_light(index)
    }

    fn initial_sunlight(&self, index: usize) -> u16 {
        (**self).initial_sunlight(index)
    }

    fn transmission_factor(&self, index: usize) -> f32 {
        (**self).transmission_factor(index)
    }

    fn reflection_factor(&self, index: usize) -> f32 {
        (**self).reflection_factor(index)
    }

    fn cell_count(&self) -> Option<usize> {
        (**self).cell_count()
    }
}

/// Material of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialCell {
    /// Fraction of light passed through.
    pub transmission: f32,
    /// Fraction of perpendicular light reflected.
    pub reflection: f32,
    /// Seed light emission.
    pub light: u16,
    /// Seed sunlight emission.
    pub sunlight: u16,
}

impl Default for MaterialCell {
    fn default() -> Self {
        Self::AIR
    }
}

impl MaterialCell {
    /// Fully transparent, non-reflective, dark.
    pub const AIR: MaterialCell = MaterialCell {
        transmission: 1.0,
        reflection: 0.0,
        light: 0,
        sunlight: 0,
    };

    /// Fully opaque, non-reflective.
    pub const SOLID: MaterialCell = MaterialCell {
        transmission: 0.0,
        reflection: 0.0,
        light: 0,
        sunlight: 0,
    };

    /// Copy with a seed light value.
    pub fn with_light(mut self, light: u16) -> Self {
        self.light = light;
        self
    }

    /// Copy with a seed sunlight value.
    pub fn with_sunlight(mut self, sunlight: u16) -> Self {
        self.sunlight = sunlight;
        self
    }
}

/// Dense row-major material table.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMaterials {
    size: GridSize,
    cells: Vec<MaterialCell>,
}

impl TileMaterials {
    /// Every cell set to `cell`.
    pub fn uniform(size: GridSize, cell: MaterialCell) -> Self {
        Self {
            size,
            cells: vec![cell; size.len()],
        }
    }

    /// Build from an existing row-major cell list.
    ///
    /// Returns `None` when `cells` does not match `size`.
    pub fn from_cells(size: GridSize, cells: Vec<MaterialCell>) -> Option<Self> {
        (cells.len() == size.len()).then_some(Self { size, cells })
    }

    /// Grid dimensions.
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Material at `index`.
    pub fn get(&self, index: usize) -> MaterialCell {
        self.cells[index]
    }

    /// Material at `(col, row)`.
    pub fn at(&self, col: usize, row: usize) -> MaterialCell {
        self.cells[self.size.index(col, row)]
    }

    /// Replace the material at `index`.
    pub fn set(&mut self, index: usize, cell: MaterialCell) {
        self.cells[index] = cell;
    }

    /// Replace the material at `(col, row)`.
    pub fn set_at(&mut self, col: usize, row: usize, cell: MaterialCell) {
        let index = self.size.index(col, row);
        self.cells[index] = cell;
    }
}

impl MaterialStrategy for TileMaterials {
    fn initial_light(&self, index: usize) -> u16 {
        self.cells[index].light
    }

    fn initial_sunlight(&self, index: usize) -> u16 {
        self.cells[index].sunlight
    }

    fn transmission_factor(&self, index: usize) -> f32 {
        self.cells[index].transmission
    }

    fn reflection_factor(&self, index: usize) -> f32 {
        self.cells[index].reflection
    }

    fn cell_count(&self) -> Option<usize> {
        Some(self.cells.len())
    }
}
