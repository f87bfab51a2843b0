//! Viewport sampling and delta compositing.
//!
//! The visible window is sampled at [`NODE_FREQUENCY`] light nodes per game
//! cell edge plus one closing node, so a window of `span` game cells yields
//! `2 * span + 1` nodes per axis. Each 2x2 block of nodes becomes one alpha
//! value, and each alpha expands to four texels smoothed against its right
//! and lower neighbours.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attenuation::absorb_light;
use crate::material::MaterialStrategy;
use crate::storage::LightGrid;
use tilelight_core::{
    GridSize, LightChannel, LightLevel, ALPHA_MAX_VALUE, LIGHT_INPUT_MAX_VALUE, NODE_FREQUENCY,
};

/// Sample value of a node outside the light grid.
pub const OUT_OF_GRID_SAMPLE: i32 = -1;

/// Consumer of composited light deltas.
pub trait LightRenderer {
    /// Accumulate `light` (in `[0, 127]`) into texel `index`.
    fn add_light(&mut self, index: usize, light: f32);

    /// Texels per row of the renderer's alpha map.
    fn cols(&self) -> usize;
}

/// Visible window, in game grid cells, and the alpha map it is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightWindow {
    /// Alpha map width in texels.
    pub alpha_map_cols: usize,
    /// Alpha map height in texels.
    pub alpha_map_rows: usize,
    /// First visible game column (may be negative).
    pub game_col_offset: i32,
    /// Visible game columns.
    pub game_col_span: usize,
    /// First visible game row (may be negative).
    pub game_row_offset: i32,
    /// Visible game rows.
    pub game_row_span: usize,
}

impl LightWindow {
    /// Window whose alpha map exactly holds the composited texels.
    pub fn covering(
        game_col_offset: i32,
        game_col_span: usize,
        game_row_offset: i32,
        game_row_span: usize,
    ) -> Self {
        let mut window = Self {
            alpha_map_cols: 0,
            alpha_map_rows: 0,
            game_col_offset,
            game_col_span,
            game_row_offset,
            game_row_span,
        };
        let (cols, rows) = window.texel_dims();
        window.alpha_map_cols = cols;
        window.alpha_map_rows = rows;
        window
    }

    /// Light nodes per axis.
    pub fn node_dims(&self) -> (usize, usize) {
        let freq = NODE_FREQUENCY as usize;
        (
            freq * self.game_col_span + 1,
            freq * self.game_row_span + 1,
        )
    }

    /// Composited texels per axis (four per 2x2 node block).
    pub fn texel_dims(&self) -> (usize, usize) {
        let (cols, rows) = self.node_dims();
        (2 * (cols - 1), 2 * (rows - 1))
    }
}

/// Scratch sample and delta buffers for one light map.
#[derive(Debug, Default)]
pub struct LightSampler {
    window: Option<LightWindow>,
    node_cols: usize,
    node_rows: usize,
    samples: Vec<i32>,
    deltas: Vec<f32>,
    reallocations: usize,
}

impl LightSampler {
    /// Create an empty sampler; buffers are sized by the first `prepare`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Window of the last `prepare`.
    pub fn window(&self) -> Option<LightWindow> {
        self.window
    }

    /// Node buffer dimensions.
    pub fn node_dims(&self) -> (usize, usize) {
        (self.node_cols, self.node_rows)
    }

    /// Samples of the last `prepare`, row-major over nodes.
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Sample at node `(col, row)`.
    pub fn sample(&self, col: usize, row: usize) -> i32 {
        self.samples[row * self.node_cols + col]
    }

    /// Deltas of the last `apply`, row-major over texels.
    pub fn deltas(&self) -> &[f32] {
        &self.deltas
    }

    /// How many times the scratch buffers were resized.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    fn resize(&mut self, window: &LightWindow) {
        let (node_cols, node_rows) = window.node_dims();
        if node_cols == self.node_cols && node_rows == self.node_rows {
            return;
        }
        let (texel_cols, texel_rows) = window.texel_dims();
        debug!(
            node_cols,
            node_rows, texel_cols, texel_rows, "resizing light sample buffers"
        );
        self.node_cols = node_cols;
        self.node_rows = node_rows;
        self.samples = vec![OUT_OF_GRID_SAMPLE; node_cols * node_rows];
        self.deltas = vec![0.0; texel_cols * texel_rows];
        self.reallocations += 1;
    }

    /// Sample accumulated light for every node of `window`.
    pub(crate) fn prepare<M: MaterialStrategy>(
        &mut self,
        grid: &LightGrid,
        materials: &M,
        size: GridSize,
        sunlight_factor: f32,
        window: &LightWindow,
    ) {
        self.resize(window);
        self.window = Some(*window);
        let origin_col = window.game_col_offset as i64 * NODE_FREQUENCY as i64;
        let origin_row = window.game_row_offset as i64 * NODE_FREQUENCY as i64;
        for node_row in 0..self.node_rows {
            for node_col in 0..self.node_cols {
                let col = origin_col + node_col as i64;
                let row = origin_row + node_row as i64;
                let sample = if size.contains(col, row) {
                    let index = size.index(col as usize, row as usize);
                    accumulated_light(grid, materials, index, sunlight_factor)
                } else {
                    OUT_OF_GRID_SAMPLE
                };
                self.samples[node_row * self.node_cols + node_col] = sample;
            }
        }
    }

    /// Composite the prepared samples and push them to `renderer`.
    pub(crate) fn apply<R: LightRenderer + ?Sized>(&mut self, renderer: &mut R) {
        let Some(window) = self.window else {
            return;
        };
        if self.node_cols < 2 || self.node_rows < 2 {
            return;
        }
        let block_cols = self.node_cols - 1;
        let block_rows = self.node_rows - 1;
        let alpha = |bx: usize, by: usize| -> f32 {
            let at = |c: usize, r: usize| self.samples[r * self.node_cols + c];
            let corner = at(bx, by)
                .max(at(bx + 1, by))
                .max(at(bx, by + 1))
                .max(at(bx + 1, by + 1));
            corner.clamp(0, ALPHA_MAX_VALUE) as f32
        };

        let texel_cols = 2 * block_cols;
        let mut deltas = std::mem::take(&mut self.deltas);
        for by in 0..block_rows {
            for bx in 0..block_cols {
                let here = alpha(bx, by);
                let right = if bx + 1 < block_cols { alpha(bx + 1, by) } else { here };
                let below = if by + 1 < block_rows { alpha(bx, by + 1) } else { here };
                let diagonal = if bx + 1 < block_cols && by + 1 < block_rows {
                    alpha(bx + 1, by + 1)
                } else if bx + 1 < block_cols {
                    right
                } else {
                    below
                };
                let x = 2 * bx;
                let y = 2 * by;
                deltas[y * texel_cols + x] = here;
                deltas[y * texel_cols + x + 1] = (here + right) / 2.0;
                deltas[(y + 1) * texel_cols + x] = (here + below) / 2.0;
                deltas[(y + 1) * texel_cols + x + 1] = (here + right + below + diagonal) / 4.0;
            }
        }

        let stride = renderer.cols();
        let max_cols = window.alpha_map_cols.min(texel_cols).min(stride);
        let max_rows = window.alpha_map_rows.min(2 * block_rows);
        for y in 0..max_rows {
            for x in 0..max_cols {
                let value = deltas[y * texel_cols + x];
                if value > 0.0 {
                    renderer.add_light(y * stride + x, value);
                }
            }
        }
        self.deltas = deltas;
    }
}

/// Total light at one cell, as used for sampling.
pub fn accumulated_light<M: MaterialStrategy>(
    grid: &LightGrid,
    materials: &M,
    index: usize,
    sunlight_factor: f32,
) -> i32 {
    let transmission = materials.transmission_factor(index);
    let mut total = grid.light(index);
    for level in LightLevel::ALL {
        total += absorb_light(grid.input_sum(level, index, LightChannel::Light), transmission);
    }

    let mut sun = grid.sun_light(index);
    for level in LightLevel::ALL {
        sun += grid.input_sum(level, index, LightChannel::Sunlight);
    }
    let sun = (sun.min(LIGHT_INPUT_MAX_VALUE) as f32 * sunlight_factor.max(0.0)).round() as u32;
    total += absorb_light(sun, transmission);
    total.min(i32::MAX as u32) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renderer that records every pushed delta.
    #[derive(Default)]
    struct Recorder {
        cols: usize,
        pushed: Vec<(usize, f32)>,
    }

    impl LightRenderer for Recorder {
        fn add_light(&mut self, index: usize, light: f32) {
            self.pushed.push((index, light));
        }

        fn cols(&self) -> usize {
            self.cols
        }
    }

    fn sampler_with(samples: Vec<i32>, node_cols: usize, node_rows: usize) -> LightSampler {
        let window = LightWindow::covering(0, (node_cols - 1) / 2, 0, (node_rows - 1) / 2);
        let mut sampler = LightSampler::new();
        sampler.resize(&window);
        sampler.window = Some(window);
        sampler.samples = samples;
        sampler
    }

    #[test]
    fn window_dimensions() {
        let window = LightWindow::covering(-1, 3, 2, 1);
        assert_eq!(window.node_dims(), (7, 3));
        assert_eq!(window.texel_dims(), (12, 4));
        assert_eq!((window.alpha_map_cols, window.alpha_map_rows), (12, 4));
    }

    #[test]
    fn block_alpha_takes_max_corner_and_smooths() {
        // 3x3 nodes -> 2x2 blocks -> 4x4 texels.
        #[rustfmt::skip]
        let samples = vec![
            10, 0, 0,
            0, 0, 0,
            0, 0, 60,
        ];
        let mut sampler = sampler_with(samples, 3, 3);
        let mut recorder = Recorder {
            cols: 4,
            ..Default::default()
        };
        sampler.apply(&mut recorder);

        let deltas = sampler.deltas();
        // Block alphas: [10, 0; 0, 60].
        assert_eq!(deltas[0], 10.0);
        assert_eq!(deltas[1], 5.0);
        assert_eq!(deltas[4], 5.0);
        assert_eq!(deltas[5], 17.5);
        assert_eq!(deltas[2], 0.0);
        assert_eq!(deltas[10], 60.0);
        // Edge texels reuse their own block.
        assert_eq!(deltas[15], 60.0);
        assert!(recorder.pushed.iter().all(|&(_, v)| v > 0.0));
        assert!(recorder.pushed.contains(&(0, 10.0)));
    }

    #[test]
    fn alpha_is_capped_and_sentinels_ignored() {
        let samples = vec![-1, -1, 500, -1];
        let mut sampler = LightSampler::new();
        let window = LightWindow {
            alpha_map_cols: 2,
            alpha_map_rows: 2,
            game_col_offset: 0,
            game_col_span: 0,
            game_row_offset: 0,
            game_row_span: 0,
        };
        sampler.window = Some(window);
        sampler.node_cols = 2;
        sampler.node_rows = 2;
        sampler.samples = samples;
        sampler.deltas = vec![0.0; 4];
        let mut recorder = Recorder {
            cols: 2,
            ..Default::default()
        };
        sampler.apply(&mut recorder);
        assert_eq!(sampler.deltas(), &[127.0, 127.0, 127.0, 127.0]);
        assert_eq!(recorder.pushed.len(), 4);
    }

    #[test]
    fn apply_clips_to_alpha_map_and_stride() {
        let samples = vec![100; 9];
        let mut sampler = sampler_with(samples, 3, 3);
        if let Some(window) = sampler.window.as_mut() {
            window.alpha_map_cols = 3;
            window.alpha_map_rows = 2;
        }
        let mut recorder = Recorder {
            cols: 10,
            ..Default::default()
        };
        sampler.apply(&mut recorder);
        let indices: Vec<usize> = recorder.pushed.iter().map(|&(i, _)| i).collect();
        assert_eq!(indices, vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn apply_without_prepare_is_noop() {
        let mut sampler = LightSampler::new();
        let mut recorder = Recorder {
            cols: 4,
            ..Default::default()
        };
        sampler.apply(&mut recorder);
        assert!(recorder.pushed.is_empty());
    }
}
