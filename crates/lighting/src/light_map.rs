//! Tile light map: storage, propagation and sampling behind one owner.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::material::MaterialStrategy;
use crate::propagation::{propagate_all, seed_sources};
use crate::sampling::{LightRenderer, LightSampler, LightWindow};
use crate::storage::LightGrid;
use crate::update::{UpdateStats, WalkQueue};
use tilelight_core::{Direction, GridSize, LightChannel, LightLevel, LightMapError};

/// Summary of a full propagation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationStats {
    /// Cells in the grid.
    pub cells: usize,
    /// Cells seeded with a non-zero light or sunlight value.
    pub seeded: usize,
    /// Wall time of the pass.
    pub elapsed: Duration,
}

/// Light simulation over a fixed `cols x rows` tile grid.
///
/// Construct once per level, call [`TileLightMap::initialize`], then keep it
/// current with [`TileLightMap::update_cell`] as light sources change. Each
/// frame, [`TileLightMap::prepare`] samples the visible window and
/// [`TileLightMap::apply`] pushes the composited result to a renderer.
#[derive(Debug)]
pub struct TileLightMap<M: MaterialStrategy> {
    size: GridSize,
    grid: LightGrid,
    materials: M,
    queue: WalkQueue,
    sampler: LightSampler,
    sunlight_factor: f32,
}

impl<M: MaterialStrategy> TileLightMap<M> {
    /// Allocate an uninitialized light map.
    pub fn new(cols: usize, rows: usize, materials: M) -> Result<Self, LightMapError> {
        let size = GridSize::new(cols, rows)?;
        if let Some(found) = materials.cell_count() {
            if found != size.len() {
                return Err(LightMapError::MaterialSizeMismatch {
                    expected: size.len(),
                    found,
                });
            }
        }
        Ok(Self {
            size,
            grid: LightGrid::new(size.len()),
            materials,
            queue: WalkQueue::new(),
            sampler: LightSampler::new(),
            sunlight_factor: 1.0,
        })
    }

    /// Grid dimensions.
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.size.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.size.rows
    }

    /// Packed light buffers.
    pub fn grid(&self) -> &LightGrid {
        &self.grid
    }

    /// Material strategy.
    pub fn materials(&self) -> &M {
        &self.materials
    }

    /// Mutable material strategy. Call [`TileLightMap::refresh_cell`] for
    /// every edited cell afterwards.
    pub fn materials_mut(&mut self) -> &mut M {
        &mut self.materials
    }

    /// Sampling buffers of the last `prepare`/`apply`.
    pub fn sampler(&self) -> &LightSampler {
        &self.sampler
    }

    /// Global sunlight scale (day/night dimming).
    pub fn sunlight_factor(&self) -> f32 {
        self.sunlight_factor
    }

    /// Set the global sunlight scale; negative values count as zero.
    pub fn set_sunlight_factor(&mut self, factor: f32) {
        self.sunlight_factor = if factor.is_nan() { 0.0 } else { factor.max(0.0) };
    }

    /// Direct light emitted by the cell at `index`.
    pub fn light(&self, index: usize) -> u32 {
        self.grid.light(index)
    }

    /// Sunlight emitted by the cell at `index`.
    pub fn sun_light(&self, index: usize) -> u32 {
        self.grid.sun_light(index)
    }

    /// Light of `level` arriving at `(col, row)` from `direction`.
    pub fn input_at(
        &self,
        level: LightLevel,
        col: usize,
        row: usize,
        direction: Direction,
        channel: LightChannel,
    ) -> u32 {
        self.grid
            .input(level, self.checked_index(col, row), direction, channel)
    }

    /// Reset the buffers and recompute everything from the material seeds.
    pub fn initialize(&mut self) -> PropagationStats {
        let started = Instant::now();
        self.grid.clear();
        seed_sources(&mut self.grid, &self.materials);
        let seeded = (0..self.grid.len())
            .filter(|&index| self.grid.source_word(index) != 0)
            .count();
        propagate_all(&mut self.grid, &self.materials, self.size);
        let stats = PropagationStats {
            cells: self.size.len(),
            seeded,
            elapsed: started.elapsed(),
        };
        debug!(
            size = %self.size,
            seeded,
            elapsed_us = stats.elapsed.as_micros() as u64,
            "initialized tile light map"
        );
        stats
    }

    /// Change one cell's light source and repair everything downstream.
    ///
    /// Panics if `(col, row)` lies outside the grid.
    pub fn update_cell(
        &mut self,
        col: usize,
        row: usize,
        light: i64,
        channel: LightChannel,
    ) -> UpdateStats {
        let index = self.checked_index(col, row);
        self.grid.set_emission(index, channel, light);
        self.queue
            .enqueue_all_directions(LightLevel::Direct, channel, index);
        let stats = self.queue.run(&mut self.grid, &self.materials, self.size);
        trace!(
            col,
            row,
            ?channel,
            walks = stats.walks,
            written = stats.cells_written,
            "updated light cell"
        );
        stats
    }

    /// Re-read the cell's seeds and material, then repair every level.
    ///
    /// Use after the material strategy changed for this cell.
    pub fn refresh_cell(&mut self, col: usize, row: usize) -> UpdateStats {
        let index = self.checked_index(col, row);
        self.grid
            .set_light(index, self.materials.initial_light(index) as i64);
        self.grid
            .set_sun_light(index, self.materials.initial_sunlight(index) as i64);
        for level in LightLevel::ALL {
            for channel in LightChannel::ALL {
                self.queue.enqueue_all_directions(level, channel, index);
            }
        }
        let stats = self.queue.run(&mut self.grid, &self.materials, self.size);
        trace!(
            col,
            row,
            walks = stats.walks,
            written = stats.cells_written,
            "refreshed light cell"
        );
        stats
    }

    /// Sample the window for the next [`TileLightMap::apply`].
    pub fn prepare(&mut self, window: &LightWindow) {
        self.sampler.prepare(
            &self.grid,
            &self.materials,
            self.size,
            self.sunlight_factor,
            window,
        );
    }

    /// Push the composited samples of the last `prepare` to `renderer`.
    pub fn apply<R: LightRenderer + ?Sized>(&mut self, renderer: &mut R) {
        self.sampler.apply(renderer);
    }

    fn checked_index(&self, col: usize, row: usize) -> usize {
        assert!(
            col < self.size.cols && row < self.size.rows,
            "cell ({col}, {row}) outside {} light grid",
            self.size
        );
        self.size.index(col, row)
    }
}
