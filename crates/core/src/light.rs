//! Light channels, propagation levels and cardinal directions.

use serde::{Deserialize, Serialize};

/// Maximum value of a cell's light or sunlight source (16 bits).
pub const LIGHT_MAX_VALUE: u32 = 0xFFFF;

/// Maximum value of a single directional light input (8 bits).
pub const LIGHT_INPUT_MAX_VALUE: u32 = 0xFF;

/// Maximum alpha value a sampled light node contributes to a renderer.
pub const ALPHA_MAX_VALUE: i32 = 127;

/// Light nodes per game cell edge when sampling a viewport.
pub const NODE_FREQUENCY: i32 = 2;

/// Independent light channel carried by every cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightChannel {
    /// Light emitted by torches, lamps and other local sources.
    Light = 0,
    /// Ambient light from the sky, scaled by the global sunlight factor.
    Sunlight = 1,
}

impl LightChannel {
    /// Both channels in storage order.
    pub const ALL: [LightChannel; 2] = [LightChannel::Light, LightChannel::Sunlight];
}

/// How many bounces the light stored in an input word has taken.
///
/// The hierarchy is fixed at two reflections: direct light feeds primary
/// reflection, which feeds secondary reflection, which feeds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightLevel {
    /// Light travelling straight from its source.
    Direct = 0,
    /// Light reflected once off a perpendicular surface.
    Primary = 1,
    /// Light reflected twice.
    Secondary = 2,
}

impl LightLevel {
    /// All levels in propagation order.
    pub const ALL: [LightLevel; 3] = [LightLevel::Direct, LightLevel::Primary, LightLevel::Secondary];

    /// Number of levels (and input words per cell).
    pub const COUNT: usize = 3;

    /// Level whose perpendicular inputs feed this level's reflections.
    #[inline]
    pub fn previous(self) -> Option<LightLevel> {
        match self {
            LightLevel::Direct => None,
            LightLevel::Primary => Some(LightLevel::Direct),
            LightLevel::Secondary => Some(LightLevel::Primary),
        }
    }

    /// Level that reflects this level's light.
    #[inline]
    pub fn next(self) -> Option<LightLevel> {
        match self {
            LightLevel::Direct => Some(LightLevel::Primary),
            LightLevel::Primary => Some(LightLevel::Secondary),
            LightLevel::Secondary => None,
        }
    }
}

/// Cardinal side of a cell that light arrives from.
///
/// `Direction::Left` input is light that came from the left neighbour and is
/// travelling towards increasing columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Arrives from column - 1.
    Left = 0,
    /// Arrives from row - 1.
    Top = 1,
    /// Arrives from column + 1.
    Right = 2,
    /// Arrives from row + 1.
    Bottom = 3,
}

impl Direction {
    /// All directions in storage order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
    ];

    /// The opposite side.
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
        }
    }

    /// The two sides perpendicular to this one.
    #[inline]
    pub fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::Left | Direction::Right => [Direction::Top, Direction::Bottom],
            Direction::Top | Direction::Bottom => [Direction::Left, Direction::Right],
        }
    }

    /// Column/row step taken by light arriving from this side.
    #[inline]
    pub fn travel(self) -> (i32, i32) {
        match self {
            Direction::Left => (1, 0),
            Direction::Top => (0, 1),
            Direction::Right => (-1, 0),
            Direction::Bottom => (0, -1),
        }
    }

    /// True for directions whose light travels along a row.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}
