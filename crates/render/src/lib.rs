#![warn(missing_docs)]
//! CPU side of the darkness overlay: an 8-bit light texture fed by
//! [`tilelight_lighting::TileLightMap::apply`], the quad it is drawn on, and
//! PNG export for inspection.

mod overlay;
mod quad;
mod screenshot;

pub use overlay::{AlphaOverlay, RenderError};
pub use quad::{overlay_quad, OverlayVertex};
pub use screenshot::write_png;
