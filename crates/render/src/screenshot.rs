//! PNG export of the darkness overlay.

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ColorType;
use image::ImageEncoder;
use std::path::Path;

use crate::{AlphaOverlay, RenderError};

/// Write the overlay to disk as an RGBA PNG tinted with `color`.
pub fn write_png(path: &Path, overlay: &AlphaOverlay, color: [u8; 3]) -> Result<(), RenderError> {
    let width = overlay.cols() as u32;
    let height = overlay.rows() as u32;
    let rgba = overlay.to_rgba(color);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let encoder = PngEncoder::new_with_quality(file, CompressionType::Fast, FilterType::NoFilter);
    encoder.write_image(&rgba, width, height, ColorType::Rgba8.into())?;
    tracing::debug!(path = %path.display(), width, height, "wrote overlay png");
    Ok(())
}
