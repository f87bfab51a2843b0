//! Alpha texture accumulating composited light.

use thiserror::Error;
use tilelight_lighting::{LightRenderer, ALPHA_MAX_VALUE};

/// Errors raised by the overlay renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Texture dimensions were zero.
    #[error("overlay texture must be at least 1x1 (got {cols}x{rows})")]
    EmptyTexture {
        /// Requested width.
        cols: usize,
        /// Requested height.
        rows: usize,
    },
    /// Encoding the PNG failed.
    #[error("failed to encode overlay png: {0}")]
    Image(#[from] image::ImageError),
    /// Writing the PNG failed.
    #[error("failed to write overlay png: {0}")]
    Io(#[from] std::io::Error),
}

/// 8-bit light texture; darkness is drawn as `255 - light`.
///
/// Several light maps may `apply` into one overlay per frame; their
/// contributions add up and saturate at 255.
#[derive(Debug, Clone)]
pub struct AlphaOverlay {
    cols: usize,
    rows: usize,
    pixels: Vec<u8>,
}

impl AlphaOverlay {
    /// Allocate a fully dark overlay.
    pub fn new(cols: usize, rows: usize) -> Result<Self, RenderError> {
        if cols == 0 || rows == 0 {
            return Err(RenderError::EmptyTexture { cols, rows });
        }
        Ok(Self {
            cols,
            rows,
            pixels: vec![0; cols * rows],
        })
    }

    /// Texture width.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Texture height.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Accumulated light per texel, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Accumulated light at `index`.
    pub fn light(&self, index: usize) -> u8 {
        self.pixels[index]
    }

    /// Overlay opacity at `index`.
    pub fn darkness(&self, index: usize) -> u8 {
        255 - self.pixels[index]
    }

    /// Reset to full darkness before the next frame's `apply` calls.
    pub fn begin_frame(&mut self) {
        self.pixels.fill(0);
    }

    /// Expand to RGBA: `color` with the overlay's darkness as alpha.
    pub fn to_rgba(&self, color: [u8; 3]) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixels.len() * 4);
        for &light in &self.pixels {
            rgba.extend_from_slice(&[color[0], color[1], color[2], 255 - light]);
        }
        rgba
    }

    /// Text rendering of the darkness, one character per texel.
    pub fn to_ascii(&self) -> String {
        const RAMP: &[u8] = b"@%#*+=-:. ";
        let mut out = String::with_capacity((self.cols + 1) * self.rows);
        for row in self.pixels.chunks(self.cols) {
            for &light in row {
                let step = light as usize * (RAMP.len() - 1) / 255;
                out.push(RAMP[step] as char);
            }
            out.push('\n');
        }
        out
    }
}

impl LightRenderer for AlphaOverlay {
    fn add_light(&mut self, index: usize, light: f32) {
        let Some(pixel) = self.pixels.get_mut(index) else {
            return;
        };
        let scaled = light / ALPHA_MAX_VALUE as f32 * 255.0;
        *pixel = (*pixel as f32 + scaled).clamp(0.0, 255.0) as u8;
    }

    fn cols(&self) -> usize {
        self.cols
    }
}
