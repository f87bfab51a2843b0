//! Light absorption.

/// Clamp a material factor into `[0, 1]`; NaN counts as fully opaque.
#[inline]
pub fn clamp_factor(factor: f32) -> f32 {
    if factor.is_nan() {
        0.0
    } else {
        factor.clamp(0.0, 1.0)
    }
}

/// Attenuate `value` by `factor`.
///
/// The result is strictly smaller than any positive `value`, even for a
/// factor of 1.0, so every walk over the grid reaches a fixed point.
#[inline]
pub fn absorb_light(value: u32, factor: f32) -> u32 {
    let scaled = (value as f32 * clamp_factor(factor)).round() as i64;
    let absorbed = if scaled == value as i64 {
        scaled - 1
    } else {
        scaled
    };
    absorbed.max(0) as u32
}
