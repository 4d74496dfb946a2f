//! Numeric conversion helpers for sxview-gui.
//!
//! Conversions between numeric types with explicit handling of
//! precision loss and bounds checking.

/// Convert usize to f64 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Convert i64 counts to f32 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
pub fn i64_to_f32(value: i64) -> f32 {
    value as f32
}

/// Convert f32 to u8 with clamping to [0, 255].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn f32_to_u8(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 255.0);
    clamped.round() as u8
}

