//! Full-grid light propagation.
//!
//! Light of every level travels along rows and columns. The value a cell
//! sends towards its neighbour is a pure function of the cell's own inputs,
//! source and material, so a single sweep per (level, channel, direction) in
//! travel order reaches the fixed point. Direct sweeps must run before
//! primary reflection sweeps, which must run before secondary ones.

use crate::attenuation::{absorb_light, clamp_factor};
use crate::material::MaterialStrategy;
use crate::storage::LightGrid;
use tilelight_core::{Direction, GridSize, LightChannel, LightLevel, LIGHT_INPUT_MAX_VALUE};

/// Cell reached by stepping once in the travel direction of `direction`.
#[inline]
pub(crate) fn neighbor(size: GridSize, index: usize, direction: Direction) -> Option<usize> {
    let (col, row) = size.coords(index);
    let (dc, dr) = direction.travel();
    let col = col as i64 + dc as i64;
    let row = row as i64 + dr as i64;
    size.contains(col, row)
        .then(|| size.index(col as usize, row as usize))
}

/// Light of `level` that leaves the cell travelling away from `direction`.
///
/// The result becomes the `direction` input of the next cell.
pub(crate) fn output<M: MaterialStrategy>(
    grid: &LightGrid,
    materials: &M,
    level: LightLevel,
    channel: LightChannel,
    index: usize,
    direction: Direction,
) -> u32 {
    let transmission = materials.transmission_factor(index);
    let carried = grid.input(level, index, direction, channel);
    let value = match level.previous() {
        None => absorb_light(carried + grid.emission(index, channel), transmission),
        Some(previous) => {
            let [a, b] = direction.perpendicular();
            let perpendicular = grid.input(previous, index, a, channel)
                + grid.input(previous, index, b, channel);
            let reflection = clamp_factor(materials.reflection_factor(index));
            let reflected =
                (reflection * absorb_light(perpendicular, transmission) as f32).round() as u32;
            reflected + absorb_light(carried, transmission)
        }
    };
    value.min(LIGHT_INPUT_MAX_VALUE)
}

/// Seed every cell's source word from the material strategy.
pub(crate) fn seed_sources<M: MaterialStrategy>(grid: &mut LightGrid, materials: &M) {
    for index in 0..grid.len() {
        let light = materials.initial_light(index);
        if light != 0 {
            grid.set_light(index, light as i64);
        }
        let sunlight = materials.initial_sunlight(index);
        if sunlight != 0 {
            grid.set_sun_light(index, sunlight as i64);
        }
    }
}

/// Run one sweep: every line of the grid in the travel order of `direction`.
pub(crate) fn sweep<M: MaterialStrategy>(
    grid: &mut LightGrid,
    materials: &M,
    size: GridSize,
    level: LightLevel,
    channel: LightChannel,
    direction: Direction,
) {
    let (lines, length) = if direction.is_horizontal() {
        (size.rows, size.cols)
    } else {
        (size.cols, size.rows)
    };
    for line in 0..lines {
        for step in 0..length {
            let along = match direction {
                Direction::Left | Direction::Top => step,
                Direction::Right | Direction::Bottom => length - 1 - step,
            };
            let index = if direction.is_horizontal() {
                size.index(along, line)
            } else {
                size.index(line, along)
            };
            if step == 0 {
                grid.set_input(level, index, direction, channel, 0);
            }
            if let Some(next) = neighbor(size, index, direction) {
                let value = output(grid, materials, level, channel, index, direction);
                grid.set_input(level, next, direction, channel, value as i64);
            }
        }
    }
}

/// Recompute every input of every level from the current source words.
pub(crate) fn propagate_all<M: MaterialStrategy>(
    grid: &mut LightGrid,
    materials: &M,
    size: GridSize,
) {
    for level in LightLevel::ALL {
        for channel in LightChannel::ALL {
            for direction in Direction::ALL {
                sweep(grid, materials, size, level, channel, direction);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialCell, TileMaterials};

    fn air(cols: usize, rows: usize) -> (GridSize, TileMaterials) {
        let size = GridSize::new(cols, rows).expect("size");
        (size, TileMaterials::uniform(size, MaterialCell::AIR))
    }

    #[test]
    fn neighbor_stops_at_edges() {
        let size = GridSize::new(3, 3).expect("size");
        assert_eq!(neighbor(size, 0, Direction::Left), Some(1));
        assert_eq!(neighbor(size, 0, Direction::Right), None);
        assert_eq!(neighbor(size, 0, Direction::Bottom), None);
        assert_eq!(neighbor(size, 0, Direction::Top), Some(3));
        assert_eq!(neighbor(size, 8, Direction::Bottom), Some(5));
    }

    #[test]
    fn direct_sweep_attenuates_per_cell() {
        let (size, materials) = air(5, 1);
        let mut grid = LightGrid::new(size.len());
        grid.set_light(0, 10);
        sweep(
            &mut grid,
            &materials,
            size,
            LightLevel::Direct,
            LightChannel::Light,
            Direction::Left,
        );
        let arrived: Vec<u32> = (0..5)
            .map(|i| grid.input(LightLevel::Direct, i, Direction::Left, LightChannel::Light))
            .collect();
        assert_eq!(arrived, vec![0, 9, 8, 7, 6]);
    }

    #[test]
    fn direct_output_caps_at_input_max() {
        let (size, materials) = air(2, 1);
        let mut grid = LightGrid::new(size.len());
        grid.set_light(0, 60_000);
        let value = output(
            &grid,
            &materials,
            LightLevel::Direct,
            LightChannel::Light,
            0,
            Direction::Left,
        );
        assert_eq!(value, LIGHT_INPUT_MAX_VALUE);
    }

    #[test]
    fn reflection_reads_perpendicular_inputs_of_previous_level() {
        let size = GridSize::new(3, 3).expect("size");
        let mirror = MaterialCell {
            transmission: 1.0,
            reflection: 0.5,
            light: 0,
            sunlight: 0,
        };
        let materials = TileMaterials::uniform(size, mirror);
        let mut grid = LightGrid::new(size.len());
        let center = size.index(1, 1);
        grid.set_input(LightLevel::Direct, center, Direction::Top, LightChannel::Light, 41);
        grid.set_input(LightLevel::Direct, center, Direction::Bottom, LightChannel::Light, 0);
        grid.set_input(LightLevel::Direct, center, Direction::Left, LightChannel::Light, 200);

        // Horizontal travel reads top + bottom: round(0.5 * absorb(41)) = 20.
        let horizontal = output(
            &grid,
            &materials,
            LightLevel::Primary,
            LightChannel::Light,
            center,
            Direction::Left,
        );
        assert_eq!(horizontal, 20);

        // Vertical travel reads left + right: round(0.5 * absorb(200)) = 100.
        let vertical = output(
            &grid,
            &materials,
            LightLevel::Primary,
            LightChannel::Light,
            center,
            Direction::Top,
        );
        assert_eq!(vertical, 100);
    }

    #[test]
    fn opaque_cells_block_direct_light() {
        let size = GridSize::new(4, 1).expect("size");
        let mut materials = TileMaterials::uniform(size, MaterialCell::AIR);
        materials.set_at(2, 0, MaterialCell::SOLID);
        let mut grid = LightGrid::new(size.len());
        grid.set_light(0, 50);
        propagate_all(&mut grid, &materials, size);

        let at = |col| grid.input(LightLevel::Direct, col, Direction::Left, LightChannel::Light);
        assert_eq!(at(1), 49);
        assert_eq!(at(2), 48);
        assert_eq!(at(3), 0);
    }
}
