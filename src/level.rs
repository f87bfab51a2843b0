//! Level files: a character map, tile materials, light sources and a viewport.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::warn;

use tilelight_core::{GridSize, LightChannel, LightMapError};
use tilelight_lighting::{
    LightWindow, MaterialCell, PropagationStats, TileLightMap, TileMaterials,
};

/// Symbol for open air unless a level overrides it.
pub const DEFAULT_AIR_SYMBOL: char = '.';
/// Symbol for opaque rock unless a level overrides it.
pub const DEFAULT_SOLID_SYMBOL: char = '#';

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("level map has no cells")]
    EmptyMap,
    #[error("map row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("tile symbol {0:?} must be exactly one character")]
    BadSymbol(String),
    #[error("unknown map symbol {symbol:?} at ({col}, {row})")]
    UnknownSymbol { symbol: char, col: usize, row: usize },
    #[error("light at ({col}, {row}) lies outside the {size} map")]
    LightOutOfBounds { col: usize, row: usize, size: GridSize },
    #[error(transparent)]
    Grid(#[from] LightMapError),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Global sunlight scale applied when sampling.
    pub sunlight_factor: f32,
    /// One string per grid row, one symbol per cell.
    pub map: Vec<String>,
    pub tiles: Vec<TileDef>,
    pub lights: Vec<LightDef>,
    /// Visible window; covers the whole map when absent.
    pub viewport: Option<ViewportConfig>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            sunlight_factor: 1.0,
            map: Vec::new(),
            tiles: Vec::new(),
            lights: Vec::new(),
            viewport: None,
        }
    }
}

/// Material bound to a map symbol.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TileDef {
    pub symbol: String,
    #[serde(flatten)]
    pub material: MaterialCell,
}

/// Light source switched on after the map is initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LightDef {
    pub col: usize,
    pub row: usize,
    pub light: u16,
    #[serde(default = "default_channel")]
    pub channel: LightChannel,
}

fn default_channel() -> LightChannel {
    LightChannel::Light
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub col_offset: i32,
    pub col_span: usize,
    pub row_offset: i32,
    pub row_span: usize,
    /// Width of one game cell in world units.
    pub cell_width: f32,
    /// Height of one game cell in world units.
    pub cell_height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            col_offset: 0,
            col_span: 1,
            row_offset: 0,
            row_span: 1,
            cell_width: 16.0,
            cell_height: 16.0,
        }
    }
}

impl LevelConfig {
    /// Load and parse a level file.
    pub fn load_from_path(path: &Path) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, LevelError> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolve symbols into a material table and check every light position.
    pub fn build(&self) -> Result<Level, LevelError> {
        let palette = self.palette()?;
        let rows = self.map.len();
        let cols = self.map.first().map_or(0, |line| line.chars().count());
        if rows == 0 || cols == 0 {
            return Err(LevelError::EmptyMap);
        }
        let size = GridSize::new(cols, rows)?;

        let mut cells = Vec::with_capacity(size.len());
        for (row, line) in self.map.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(LevelError::RaggedRow {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let cell = palette
                    .get(&symbol)
                    .copied()
                    .ok_or(LevelError::UnknownSymbol { symbol, col, row })?;
                cells.push(cell);
            }
        }
        let materials = TileMaterials::from_cells(size, cells).ok_or(LevelError::EmptyMap)?;

        for light in &self.lights {
            if light.col >= cols || light.row >= rows {
                return Err(LevelError::LightOutOfBounds {
                    col: light.col,
                    row: light.row,
                    size,
                });
            }
        }

        let viewport = self.viewport.unwrap_or(ViewportConfig {
            col_span: cols.div_ceil(2),
            row_span: rows.div_ceil(2),
            ..ViewportConfig::default()
        });

        Ok(Level {
            materials,
            lights: self.lights.clone(),
            sunlight_factor: self.sunlight_factor,
            viewport,
        })
    }

    fn palette(&self) -> Result<BTreeMap<char, MaterialCell>, LevelError> {
        let mut palette = BTreeMap::from([
            (DEFAULT_AIR_SYMBOL, MaterialCell::AIR),
            (DEFAULT_SOLID_SYMBOL, MaterialCell::SOLID),
        ]);
        for tile in &self.tiles {
            let mut chars = tile.symbol.chars();
            let (Some(symbol), None) = (chars.next(), chars.next()) else {
                return Err(LevelError::BadSymbol(tile.symbol.clone()));
            };
            let material = tile.material;
            if !(0.0..=1.0).contains(&material.transmission)
                || !(0.0..=1.0).contains(&material.reflection)
            {
                warn!(
                    symbol = %symbol,
                    transmission = material.transmission,
                    reflection = material.reflection,
                    "tile factors outside [0, 1] will be clamped"
                );
            }
            palette.insert(symbol, material);
        }
        Ok(palette)
    }
}

/// A parsed, validated level.
#[derive(Debug, Clone)]
pub struct Level {
    pub materials: TileMaterials,
    pub lights: Vec<LightDef>,
    pub sunlight_factor: f32,
    pub viewport: ViewportConfig,
}

impl Level {
    pub fn size(&self) -> GridSize {
        self.materials.size()
    }

    pub fn window(&self) -> LightWindow {
        LightWindow::covering(
            self.viewport.col_offset,
            self.viewport.col_span,
            self.viewport.row_offset,
            self.viewport.row_span,
        )
    }

    /// Initialize a light map over the level and switch on its lights.
    pub fn light_map(&self) -> Result<TileLightMap<TileMaterials>, LevelError> {
        self.light_map_with_stats().map(|(map, _)| map)
    }

    pub fn light_map_with_stats(
        &self,
    ) -> Result<(TileLightMap<TileMaterials>, PropagationStats), LevelError> {
        let size = self.size();
        let mut map = TileLightMap::new(size.cols, size.rows, self.materials.clone())?;
        map.set_sunlight_factor(self.sunlight_factor);
        let stats = map.initialize();
        for light in &self.lights {
            map.update_cell(light.col, light.row, light.light as i64, light.channel);
        }
        Ok((map, stats))
    }
}
