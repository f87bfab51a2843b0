//! Flicker workload: random light changes driven through `update_cell`.

use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use tilelight_core::LightChannel;
use tilelight_lighting::{MaterialCell, TileLightMap, TileMaterials};
use tilelight_render::AlphaOverlay;
use tilelight_testkit::{
    grid_differences, CompositingMetrics, JsonlSink, LightingMetrics, TestResult, UpdateEvent,
};

use crate::level::Level;

/// Source strength used when a level declares no lights.
const FALLBACK_LIGHT: u16 = 200;

#[derive(Debug, Clone, Copy)]
struct Target {
    col: usize,
    row: usize,
    channel: LightChannel,
    base: u16,
}

/// Outcome of a flicker run.
#[derive(Debug)]
pub struct FlickerReport {
    pub lighting: LightingMetrics,
    pub compositing: CompositingMetrics,
    /// Pass when the incrementally repaired grid equals a full recompute.
    pub result: TestResult,
    pub overlay: AlphaOverlay,
}

/// Apply `steps` random source changes and composite one frame after each.
pub fn run_flicker(
    level: &Level,
    steps: u64,
    seed: u64,
    mut events: Option<&mut JsonlSink>,
) -> Result<FlickerReport> {
    let (mut map, init) = level.light_map_with_stats()?;
    let window = level.window();
    let (texel_cols, texel_rows) = window.texel_dims();
    let mut overlay = AlphaOverlay::new(texel_cols, texel_rows)?;
    let targets = targets(level);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut update_time = Duration::ZERO;
    let mut frame_time = Duration::ZERO;
    let mut total_walks = 0;
    let mut cells_written = 0;
    let mut max_cells_written = 0;

    for step in 0..steps {
        let target = targets[rng.gen_range(0..targets.len())];
        let light = (target.base as f32 * rng.gen_range(0.5..=1.0)).round() as i64;

        let started = Instant::now();
        let stats = map.update_cell(target.col, target.row, light, target.channel);
        update_time += started.elapsed();
        total_walks += stats.walks;
        cells_written += stats.cells_written;
        max_cells_written = max_cells_written.max(stats.cells_written);

        if let Some(sink) = events.as_deref_mut() {
            sink.write(&UpdateEvent {
                step,
                col: target.col,
                row: target.row,
                channel: target.channel,
                light,
                walks: stats.walks,
                cells_written: stats.cells_written,
            })?;
        }

        let started = Instant::now();
        overlay.begin_frame();
        map.prepare(&window);
        map.apply(&mut overlay);
        frame_time += started.elapsed();
    }

    let result = verify_against_rebuild(&map)?;
    let size = map.size();
    let (node_cols, node_rows) = window.node_dims();
    let updates = steps as usize;
    let lighting = LightingMetrics {
        grid: [size.cols, size.rows],
        initialize_time_us: init.elapsed.as_secs_f64() * 1e6,
        total_updates: updates,
        total_walks,
        cells_written,
        max_cells_written,
        avg_update_time_us: per_step_us(update_time, updates),
        updates_per_second: if update_time.is_zero() {
            0.0
        } else {
            updates as f64 / update_time.as_secs_f64()
        },
    };
    let compositing = CompositingMetrics {
        frames: updates,
        nodes_per_frame: node_cols * node_rows,
        reallocations: map.sampler().reallocations(),
        avg_frame_time_us: per_step_us(frame_time, updates),
    };
    debug!(steps, total_walks, cells_written, ?result, "flicker run finished");
    Ok(FlickerReport {
        lighting,
        compositing,
        result,
        overlay,
    })
}

fn per_step_us(total: Duration, steps: usize) -> f64 {
    if steps == 0 {
        0.0
    } else {
        total.as_secs_f64() * 1e6 / steps as f64
    }
}

fn targets(level: &Level) -> Vec<Target> {
    if !level.lights.is_empty() {
        return level
            .lights
            .iter()
            .map(|light| Target {
                col: light.col,
                row: light.row,
                channel: light.channel,
                base: light.light,
            })
            .collect();
    }
    let size = level.size();
    (0..size.len())
        .map(|index| {
            let (col, row) = size.coords(index);
            Target {
                col,
                row,
                channel: LightChannel::Light,
                base: FALLBACK_LIGHT,
            }
        })
        .collect()
}

/// Rebuild the map from its current sources and compare every input.
fn verify_against_rebuild(map: &TileLightMap<TileMaterials>) -> Result<TestResult> {
    let size = map.size();
    let mut seeded = map.materials().clone();
    for index in 0..size.len() {
        let cell = seeded.get(index);
        seeded.set(
            index,
            MaterialCell {
                light: map.light(index) as u16,
                sunlight: map.sun_light(index) as u16,
                ..cell
            },
        );
    }
    let mut rebuilt = TileLightMap::new(size.cols, size.rows, seeded)?;
    rebuilt.initialize();
    let diffs = grid_differences(rebuilt.grid(), map.grid(), size);
    if diffs.is_empty() {
        return Ok(TestResult::Pass);
    }
    warn!(
        count = diffs.len(),
        first = %diffs[0],
        "incremental grid diverged from full recompute"
    );
    Ok(TestResult::Fail)
}
