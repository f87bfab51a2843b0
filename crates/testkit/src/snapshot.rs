//! Deterministic snapshot testing utilities.
//!
//! Snapshots are serialized as canonical pretty JSON with object keys sorted.
//! By default, tests compare against the golden file on disk. To update goldens,
//! rerun with `TILELIGHT_UPDATE_SNAPSHOTS=1`.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tilelight_core::{Direction, GridSize, LightChannel, LightLevel};
use tilelight_lighting::LightGrid;

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "TILELIGHT_UPDATE_SNAPSHOTS";

/// Readable dump of a light grid: one row of text per grid row and field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightGridSnapshot {
    /// Grid dimensions.
    pub size: GridSize,
    /// `light` rows.
    pub light: Vec<Vec<u32>>,
    /// `sun_light` rows.
    pub sun_light: Vec<Vec<u32>>,
    /// Light-channel inputs, summed over the four directions, per level.
    pub direct: Vec<Vec<u32>>,
    /// Primary reflection sums.
    pub primary: Vec<Vec<u32>>,
    /// Secondary reflection sums.
    pub secondary: Vec<Vec<u32>>,
    /// Sunlight inputs summed over all levels and directions.
    pub sunlight_inputs: Vec<Vec<u32>>,
}

impl LightGridSnapshot {
    /// Capture `grid` laid out as `size`.
    pub fn capture(grid: &LightGrid, size: GridSize) -> Self {
        let rows = |f: &dyn Fn(usize) -> u32| -> Vec<Vec<u32>> {
            (0..size.rows)
                .map(|row| (0..size.cols).map(|col| f(size.index(col, row))).collect())
                .collect()
        };
        Self {
            size,
            light: rows(&|i| grid.light(i)),
            sun_light: rows(&|i| grid.sun_light(i)),
            direct: rows(&|i| grid.input_sum(LightLevel::Direct, i, LightChannel::Light)),
            primary: rows(&|i| grid.input_sum(LightLevel::Primary, i, LightChannel::Light)),
            secondary: rows(&|i| grid.input_sum(LightLevel::Secondary, i, LightChannel::Light)),
            sunlight_inputs: rows(&|i| {
                LightLevel::ALL
                    .iter()
                    .map(|&level| grid.input_sum(level, i, LightChannel::Sunlight))
                    .sum()
            }),
        }
    }
}

/// Every differing directional input between two grids of the same size.
///
/// Returns human-readable descriptions, empty when the grids agree.
pub fn grid_differences(expected: &LightGrid, actual: &LightGrid, size: GridSize) -> Vec<String> {
    let mut diffs = Vec::new();
    for index in 0..size.len() {
        let (col, row) = size.coords(index);
        if expected.source_word(index) != actual.source_word(index) {
            diffs.push(format!(
                "source at ({col}, {row}): {:#x} != {:#x}",
                expected.source_word(index),
                actual.source_word(index)
            ));
        }
        for level in LightLevel::ALL {
            for direction in Direction::ALL {
                for channel in LightChannel::ALL {
                    let e = expected.input(level, index, direction, channel);
                    let a = actual.input(level, index, direction, channel);
                    if e != a {
                        diffs.push(format!(
                            "{level:?} {channel:?} from {direction:?} at ({col}, {row}): {e} != {a}"
                        ));
                    }
                }
            }
        }
    }
    diffs
}

/// Assert that `value` matches the JSON snapshot stored at `path`.
///
/// If `TILELIGHT_UPDATE_SNAPSHOTS=1` is set, the snapshot file is
/// written/overwritten with the current value instead.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if should_update_snapshots() {
        write_snapshot(path, &actual)?;
        return Ok(());
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "Snapshot missing at {} (run with {}=1 to create/update)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;

    if expected != actual {
        anyhow::bail!(
            "Snapshot mismatch at {} (run with {}=1 to update)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        );
    }

    Ok(())
}

fn should_update_snapshots() -> bool {
    matches!(
        std::env::var(UPDATE_SNAPSHOTS_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes") | Ok("YES")
    )
}

fn write_snapshot(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))
}

/// Serialize `value` as pretty JSON with sorted object keys.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let value = canonicalize_value(value);
    let mut s = serde_json::to_string_pretty(&value).context("Failed to format snapshot JSON")?;
    s.push('\n');
    Ok(s)
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k, canonicalize_value(v));
            }
            Value::Object(out)
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}
