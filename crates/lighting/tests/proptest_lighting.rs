//! Property-based tests for the tile light map.
//!
//! Validates propagation invariants:
//! - Stored values stay within their field ranges
//! - Light strictly decays while it travels through open air
//! - Incremental updates reach the same state as a full recompute
//! - Re-applying an unchanged source does no work
//! - Arbitrary source sequences repair to the rebuilt state

use proptest::prelude::*;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tilelight_lighting::{
    absorb_light, Direction, GridSize, LightChannel, LightGrid, LightLevel, MaterialCell,
    MaterialStrategy, TileLightMap, TileMaterials, LIGHT_INPUT_MAX_VALUE, LIGHT_MAX_VALUE,
};
use tilelight_testkit::{grid_differences, initialized_map, open_materials, random_materials};

fn without_seeds(materials: &TileMaterials) -> TileMaterials {
    let mut dark = materials.clone();
    for index in 0..dark.size().len() {
        let cell = dark.get(index);
        dark.set(
            index,
            MaterialCell {
                light: 0,
                sunlight: 0,
                ..cell
            },
        );
    }
    dark
}

/// Materials whose seeds are the map's current source values.
fn reseeded(map: &TileLightMap<TileMaterials>) -> TileMaterials {
    let mut seeded = map.materials().clone();
    for index in 0..seeded.size().len() {
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
    seeded
}

/// Source values including zero and both out-of-range sides.
fn source_value() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(0i64),
        Just(-10i64),
        Just(70_000i64),
        -10i64..70_000,
        0i64..300,
    ]
}

proptest! {
    /// Property: setters clamp into the field range.
    #[test]
    fn stored_values_are_clamped(source in any::<i64>(), input in any::<i64>()) {
        let mut grid = LightGrid::new(1);
        grid.set_light(0, source);
        grid.set_sun_light(0, source);
        grid.set_input(LightLevel::Secondary, 0, Direction::Bottom, LightChannel::Sunlight, input);

        prop_assert!(grid.light(0) <= LIGHT_MAX_VALUE);
        prop_assert!(grid.sun_light(0) <= LIGHT_MAX_VALUE);
        let stored = grid.input(LightLevel::Secondary, 0, Direction::Bottom, LightChannel::Sunlight);
        prop_assert!(stored <= LIGHT_INPUT_MAX_VALUE);
        prop_assert_eq!(stored, input.clamp(0, LIGHT_INPUT_MAX_VALUE as i64) as u32);
        // Neighbouring fields are untouched.
        prop_assert_eq!(grid.input(LightLevel::Secondary, 0, Direction::Right, LightChannel::Sunlight), 0);
        prop_assert_eq!(grid.input(LightLevel::Primary, 0, Direction::Bottom, LightChannel::Sunlight), 0);
    }

    /// Property: absorption always removes at least one unit of light.
    #[test]
    fn absorption_is_strictly_decreasing(value in 1u32..=LIGHT_MAX_VALUE, factor in 0.0f32..=1.0) {
        prop_assert!(absorb_light(value, factor) < value);
        prop_assert_eq!(absorb_light(0, factor), 0);
    }

    /// Property: light never increases when travelling away from its source.
    #[test]
    fn direct_light_decays_along_open_rows(len in 2usize..40, light in 1u16..2000) {
        let mut materials = open_materials(len, 1);
        materials.set_at(0, 0, MaterialCell::AIR.with_light(light));
        let map = initialized_map(materials);

        let mut previous = u32::MAX;
        for col in 1..len {
            let arrived = map.input_at(LightLevel::Direct, col, 0, Direction::Left, LightChannel::Light);
            prop_assert!(arrived <= LIGHT_INPUT_MAX_VALUE);
            prop_assert!(arrived < previous || arrived == 0, "col {}: {} after {}", col, arrived, previous);
            previous = arrived;
        }
    }

    /// Property: every stored input of a random layout stays in range.
    #[test]
    fn random_layouts_stay_in_range(cols in 1usize..12, rows in 1usize..12, seed in any::<u64>()) {
        let map = initialized_map(random_materials(cols, rows, seed));
        let grid = map.grid();
        for index in 0..map.size().len() {
            for level in LightLevel::ALL {
                for channel in LightChannel::ALL {
                    prop_assert!(grid.input_sum(level, index, channel) <= 4 * LIGHT_INPUT_MAX_VALUE);
                }
            }
        }
    }

    /// Property: seeding cells one at a time reaches the full-recompute state.
    #[test]
    fn incremental_updates_match_initialize(cols in 1usize..10, rows in 1usize..10, seed in any::<u64>()) {
        let materials = random_materials(cols, rows, seed);
        let expected = initialized_map(materials.clone());
        let mut incremental = initialized_map(without_seeds(&materials));

        let mut seeds = Vec::new();
        for index in 0..materials.size().len() {
            let (col, row) = materials.size().coords(index);
            if materials.initial_light(index) != 0 {
                seeds.push((col, row, materials.initial_light(index), LightChannel::Light));
            }
            if materials.initial_sunlight(index) != 0 {
                seeds.push((col, row, materials.initial_sunlight(index), LightChannel::Sunlight));
            }
        }
        seeds.shuffle(&mut StdRng::seed_from_u64(seed ^ 0x5eed));
        for (col, row, light, channel) in seeds {
            incremental.update_cell(col, row, light as i64, channel);
        }

        let diffs = grid_differences(expected.grid(), incremental.grid(), expected.size());
        prop_assert!(diffs.is_empty(), "{} differences, first: {:?}", diffs.len(), diffs.first());
    }

    /// Property: re-applying a cell's current source changes nothing.
    #[test]
    fn unchanged_source_is_noop(cols in 1usize..10, rows in 1usize..10, seed in any::<u64>(), pick in any::<prop::sample::Index>()) {
        let materials = random_materials(cols, rows, seed);
        let index = pick.index(materials.size().len());
        let (col, row) = materials.size().coords(index);
        let light = materials.initial_light(index) as i64;
        let mut map = initialized_map(materials);

        let stats = map.update_cell(col, row, light, LightChannel::Light);
        prop_assert!(stats.is_noop());
        prop_assert_eq!(stats.walks, 4);
    }

    /// Property: refreshing an edited cell matches rebuilding from scratch.
    #[test]
    fn refresh_after_material_edit_matches_rebuild(
        cols in 1usize..10,
        rows in 1usize..10,
        seed in any::<u64>(),
        pick in any::<prop::sample::Index>(),
        transmission in 0.0f32..=1.0,
        reflection in 0.0f32..=1.0,
        light in 0u16..500,
    ) {
        let materials = random_materials(cols, rows, seed);
        let index = pick.index(materials.size().len());
        let (col, row) = materials.size().coords(index);
        let edited_cell = MaterialCell { transmission, reflection, light, sunlight: 0 };

        let mut map = initialized_map(materials.clone());
        map.materials_mut().set(index, edited_cell);
        map.refresh_cell(col, row);

        let mut edited = materials;
        edited.set(index, edited_cell);
        let rebuilt = initialized_map(edited);

        let diffs = grid_differences(rebuilt.grid(), map.grid(), rebuilt.size());
        prop_assert!(diffs.is_empty(), "{} differences, first: {:?}", diffs.len(), diffs.first());
    }
}

#[test]
fn incremental_sunlight_matches_initialize_on_large_grid() {
    let materials = random_materials(48, 32, 1234);
    let expected = initialized_map(materials.clone());
    let mut incremental = initialized_map(without_seeds(&materials));
    let size: GridSize = materials.size();
    for col in 0..size.cols {
        let sunlight = materials.initial_sunlight(col);
        incremental.update_cell(col, 0, sunlight as i64, LightChannel::Sunlight);
    }
    for index in 0..size.len() {
        let light = materials.initial_light(index);
        if light != 0 {
            let (col, row) = size.coords(index);
            incremental.update_cell(col, row, light as i64, LightChannel::Light);
        }
    }
    assert!(grid_differences(expected.grid(), incremental.grid(), size).is_empty());
}

proptest! {
    /// Property: any sequence of source changes (dimming, switching off,
    /// out-of-range writes) repairs to the state a full rebuild produces.
    #[test]
    fn random_update_sequences_match_rebuild(
        cols in 1usize..13,
        rows in 1usize..13,
        seed in any::<u64>(),
        updates in prop::collection::vec(
            (any::<prop::sample::Index>(), source_value(), any::<bool>()),
            1..30,
        ),
    ) {
        let materials = random_materials(cols, rows, seed);
        let size = materials.size();
        let mut map = initialized_map(materials);

        for (pick, value, sunlight) in updates {
            let index = pick.index(size.len());
            let (col, row) = size.coords(index);
            let channel = if sunlight { LightChannel::Sunlight } else { LightChannel::Light };

            map.update_cell(col, row, value, channel);
            let stored = match channel {
                LightChannel::Light => map.light(index),
                LightChannel::Sunlight => map.sun_light(index),
            };
            prop_assert_eq!(stored, value.clamp(0, LIGHT_MAX_VALUE as i64) as u32);

            let again = map.update_cell(col, row, value, channel);
            prop_assert!(again.is_noop(), "repeat of {} at ({}, {}) rewrote {} inputs", value, col, row, again.cells_written);
        }

        let rebuilt = initialized_map(reseeded(&map));
        let diffs = grid_differences(rebuilt.grid(), map.grid(), size);
        prop_assert!(diffs.is_empty(), "{} differences, first: {:?}", diffs.len(), diffs.first());
    }
}
