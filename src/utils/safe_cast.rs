//! Saturating numeric conversions for pixel, percentage and index math

/// Convert an index or count to f32
///
/// Counts above 2^24 lose precision, which is acceptable for phase and
/// centroid math.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f32(value: usize) -> f32 {
    value as f32
}

/// Clamp and convert f32 to i32 for pixel coordinates
#[must_use]
#[allow(clippy::cast_precision_loss)] // Acceptable for clamping bounds
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f32_to_i32_clamp(value: f32, min: i32, max: i32) -> i32 {
    // Ensure min <= max
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.clamp(min as f32, max as f32);
    (clamped as i32).clamp(min, max)
}

/// Round and saturate f32 into a u8 (alpha values, percentages)
///
/// Non-finite input maps to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamped to the u8 range first
#[allow(clippy::cast_sign_loss)]
pub fn f32_to_u8_clamp(value: f32) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, f32::from(u8::MAX)) as u8
}

/// Saturating conversion of a pixel dimension to usize
#[must_use]
pub fn u32_to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
