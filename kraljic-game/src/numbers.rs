//! Numeric helpers centralizing rounding and safe casts for score math.

use num_traits::cast::cast;

/// Round a value to `decimals` decimal places, returning 0.0 for non-finite input.
#[must_use]
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(cast::<u32, i32>(decimals).unwrap_or(i32::MAX));
    (value * factor).round() / factor
}

/// Round to one decimal place (percent-of-optimal precision).
#[must_use]
pub fn round1(value: f64) -> f64 {
    round_to_decimals(value, 1)
}

/// Round to two decimal places (score-total precision).
#[must_use]
pub fn round2(value: f64) -> f64 {
    round_to_decimals(value, 2)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}
