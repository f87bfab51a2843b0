//! Bit-packed per-cell light storage.
//!
//! Every cell owns one `u32` source word and three `u64` input words.
//!
//! Source word layout:
//!
//! ```text
//!  31            16 15             0
//! +----------------+----------------+
//! |   sun_light    |     light      |
//! +----------------+----------------+
//! ```
//!
//! Input word layout (one word per [`LightLevel`]), eight 8-bit fields at
//! `shift = direction * 16 + channel * 8`:
//!
//! ```text
//!  63   56 55   48 47   40 39   32 31   24 23   16 15    8 7     0
//! +-------+-------+-------+-------+-------+-------+-------+-------+
//! |bot sun|bot lgt|rgt sun|rgt lgt|top sun|top lgt|lft sun|lft lgt|
//! +-------+-------+-------+-------+-------+-------+-------+-------+
//! ```
//!
//! All setters clamp silently so the propagation loops never branch on
//! overflow. An out-of-range index panics.

use tilelight_core::{Direction, LightChannel, LightLevel, LIGHT_INPUT_MAX_VALUE, LIGHT_MAX_VALUE};

const LIGHT_SHIFT: u32 = 0;
const SUN_LIGHT_SHIFT: u32 = 16;
const SOURCE_FIELD_MASK: u32 = 0xFFFF;
const INPUT_FIELD_MASK: u64 = 0xFF;

#[inline]
fn clamp_source(value: i64) -> u32 {
    value.clamp(0, LIGHT_MAX_VALUE as i64) as u32
}

#[inline]
fn clamp_input(value: i64) -> u64 {
    value.clamp(0, LIGHT_INPUT_MAX_VALUE as i64) as u64
}

#[inline]
fn input_shift(direction: Direction, channel: LightChannel) -> u32 {
    direction as u32 * 16 + channel as u32 * 8
}

/// Packed source and input buffers for a fixed number of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightGrid {
    sources: Vec<u32>,
    inputs: [Vec<u64>; LightLevel::COUNT],
}

impl LightGrid {
    /// Allocate zeroed storage for `cells` cells.
    pub fn new(cells: usize) -> Self {
        Self {
            sources: vec![0; cells],
            inputs: [vec![0; cells], vec![0; cells], vec![0; cells]],
        }
    }

    /// Number of cells.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.sources.len()
    }

    /// Zero every source and input word.
    pub fn clear(&mut self) {
        self.sources.fill(0);
        for words in &mut self.inputs {
            words.fill(0);
        }
    }

    /// Raw source word.
    #[inline]
    pub fn source_word(&self, index: usize) -> u32 {
        self.sources[index]
    }

    /// Raw input word of one level.
    #[inline]
    pub fn input_word(&self, level: LightLevel, index: usize) -> u64 {
        self.inputs[level as usize][index]
    }

    /// Direct light emitted by the cell.
    #[inline]
    pub fn light(&self, index: usize) -> u32 {
        (self.sources[index] >> LIGHT_SHIFT) & SOURCE_FIELD_MASK
    }

    /// Sunlight emitted by the cell.
    #[inline]
    pub fn sun_light(&self, index: usize) -> u32 {
        (self.sources[index] >> SUN_LIGHT_SHIFT) & SOURCE_FIELD_MASK
    }

    /// Source value of either channel.
    #[inline]
    pub fn emission(&self, index: usize, channel: LightChannel) -> u32 {
        match channel {
            LightChannel::Light => self.light(index),
            LightChannel::Sunlight => self.sun_light(index),
        }
    }

    /// Store the cell's direct light, clamped to `[0, 65535]`.
    #[inline]
    pub fn set_light(&mut self, index: usize, value: i64) {
        let word = &mut self.sources[index];
        *word = (*word & !(SOURCE_FIELD_MASK << LIGHT_SHIFT)) | (clamp_source(value) << LIGHT_SHIFT);
    }

    /// Store the cell's sunlight, clamped to `[0, 65535]`.
    #[inline]
    pub fn set_sun_light(&mut self, index: usize, value: i64) {
        let word = &mut self.sources[index];
        *word = (*word & !(SOURCE_FIELD_MASK << SUN_LIGHT_SHIFT))
            | (clamp_source(value) << SUN_LIGHT_SHIFT);
    }

    /// Store the source value of either channel.
    #[inline]
    pub fn set_emission(&mut self, index: usize, channel: LightChannel, value: i64) {
        match channel {
            LightChannel::Light => self.set_light(index, value),
            LightChannel::Sunlight => self.set_sun_light(index, value),
        }
    }

    /// Light of `level` arriving at the cell from `direction`.
    #[inline]
    pub fn input(
        &self,
        level: LightLevel,
        index: usize,
        direction: Direction,
        channel: LightChannel,
    ) -> u32 {
        let shift = input_shift(direction, channel);
        ((self.inputs[level as usize][index] >> shift) & INPUT_FIELD_MASK) as u32
    }

    /// Store one directional input, clamped to `[0, 255]`.
    #[inline]
    pub fn set_input(
        &mut self,
        level: LightLevel,
        index: usize,
        direction: Direction,
        channel: LightChannel,
        value: i64,
    ) {
        let shift = input_shift(direction, channel);
        let word = &mut self.inputs[level as usize][index];
        *word = (*word & !(INPUT_FIELD_MASK << shift)) | (clamp_input(value) << shift);
    }

    /// Sum of the four directional inputs of one level and channel.
    #[inline]
    pub fn input_sum(&self, level: LightLevel, index: usize, channel: LightChannel) -> u32 {
        Direction::ALL
            .iter()
            .map(|&dir| self.input(level, index, dir, channel))
            .sum()
    }
}
