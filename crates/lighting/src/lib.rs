#![warn(missing_docs)]
//! Incremental tile light propagation.
//!
//! A [`TileLightMap`] stores, for every cell of a fixed grid, a packed source
//! word (light + sunlight) and three packed input words (direct, primary and
//! secondary reflection). Light travels along rows and columns, losing a
//! little at every cell, and reflects off perpendicular surfaces at most
//! twice. A single source change is repaired by walking outward until the
//! stored values stop changing.

mod attenuation;
mod light_map;
mod material;
mod propagation;
mod sampling;
mod storage;
mod update;

pub use attenuation::{absorb_light, clamp_factor};
pub use light_map::{PropagationStats, TileLightMap};
pub use material::{MaterialCell, MaterialStrategy, TileMaterials};
pub use sampling::{
    accumulated_light, LightRenderer, LightSampler, LightWindow, OUT_OF_GRID_SAMPLE,
};
pub use storage::LightGrid;
pub use update::{UpdateStats, WalkQueue};

pub use tilelight_core::{
    Direction, GridSize, LightChannel, LightLevel, LightMapError, ALPHA_MAX_VALUE,
    LIGHT_INPUT_MAX_VALUE, LIGHT_MAX_VALUE,
};
