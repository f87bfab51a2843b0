//! Reproducible material layouts for light map tests.

use rand::{rngs::StdRng, Rng, SeedableRng};
use tilelight_core::GridSize;
use tilelight_lighting::{MaterialCell, TileLightMap, TileMaterials};

/// Partially transparent, reflective wall used by the fixtures.
pub const FIXTURE_WALL: MaterialCell = MaterialCell {
    transmission: 0.3,
    reflection: 0.4,
    light: 0,
    sunlight: 0,
};

/// Open air everywhere.
pub fn open_materials(cols: usize, rows: usize) -> TileMaterials {
    TileMaterials::uniform(grid_size(cols, rows), MaterialCell::AIR)
}

/// Air enclosed by a one-cell [`FIXTURE_WALL`] border.
pub fn walled_room(cols: usize, rows: usize) -> TileMaterials {
    let size = grid_size(cols, rows);
    let mut materials = TileMaterials::uniform(size, MaterialCell::AIR);
    for row in 0..rows {
        for col in 0..cols {
            if col == 0 || row == 0 || col + 1 == cols || row + 1 == rows {
                materials.set_at(col, row, FIXTURE_WALL);
            }
        }
    }
    materials
}

/// Random walls, mirrors and light sources drawn from `seed`.
///
/// The top row is open sky emitting sunlight.
pub fn random_materials(cols: usize, rows: usize, seed: u64) -> TileMaterials {
    let size = grid_size(cols, rows);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut materials = TileMaterials::uniform(size, MaterialCell::AIR);
    for row in 0..rows {
        for col in 0..cols {
            let mut cell = if rng.gen_bool(0.25) {
                MaterialCell {
                    transmission: rng.gen_range(0.0..0.8),
                    reflection: rng.gen_range(0.0..0.9),
                    light: 0,
                    sunlight: 0,
                }
            } else {
                MaterialCell {
                    transmission: rng.gen_range(0.85..=1.0),
                    reflection: rng.gen_range(0.0..0.2),
                    light: 0,
                    sunlight: 0,
                }
            };
            if rng.gen_bool(0.08) {
                cell.light = rng.gen_range(1..400);
            }
            if row == 0 {
                cell.sunlight = rng.gen_range(100..300);
            }
            materials.set_at(col, row, cell);
        }
    }
    materials
}

/// Build and initialize a light map over `materials`.
pub fn initialized_map(materials: TileMaterials) -> TileLightMap<TileMaterials> {
    let size = materials.size();
    let mut map = TileLightMap::new(size.cols, size.rows, materials)
        .expect("fixture materials match their grid");
    map.initialize();
    map
}

fn grid_size(cols: usize, rows: usize) -> GridSize {
    GridSize::new(cols, rows).expect("fixture grids are non-empty")
}
