#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod grid;
pub mod light;

pub use grid::{GridSize, LightMapError};
pub use light::{
    Direction, LightChannel, LightLevel, ALPHA_MAX_VALUE, LIGHT_INPUT_MAX_VALUE, LIGHT_MAX_VALUE,
    NODE_FREQUENCY,
};
