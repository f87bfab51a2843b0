//! Geometry of the overlay quad.

/// Vertex of the overlay quad, laid out for direct upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    /// Position in game units relative to the window origin.
    pub position: [f32; 2],
    /// Texture coordinates into the alpha texture.
    pub uv: [f32; 2],
}

/// Quad covering `game_col_span x game_row_span` cells of the given size.
///
/// Vertices are ordered top-left, top-right, bottom-right, bottom-left.
pub fn overlay_quad(
    game_cell_width: f32,
    game_cell_height: f32,
    game_col_span: usize,
    game_row_span: usize,
) -> [OverlayVertex; 4] {
    let width = game_cell_width * game_col_span as f32;
    let height = game_cell_height * game_row_span as f32;
    [
        OverlayVertex {
            position: [0.0, 0.0],
            uv: [0.0, 0.0],
        },
        OverlayVertex {
            position: [width, 0.0],
            uv: [1.0, 0.0],
        },
        OverlayVertex {
            position: [width, height],
            uv: [1.0, 1.0],
        },
        OverlayVertex {
            position: [0.0, height],
            uv: [0.0, 1.0],
        },
    ]
}
