//! Title rating computation.
//!
//! A title's rating is the arithmetic mean of its review scores rounded to
//! the nearest integer, with exact halves rounded away from zero (2.5 -> 3).
//! A title with no reviews has no rating (`None`, serialized as `null`).
//!
//! The mean is computed in integer arithmetic so the result never depends on
//! floating-point representation of values like `x.5`.

/// Compute the rating for a set of review scores.
pub fn average_rating(scores: &[i16]) -> Option<i16> {
    if scores.is_empty() {
        return None;
    }

    let count = scores.len() as i64;
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();

    // round-half-away-from-zero(sum / count) == floor((2*|sum| + count) / (2*count)) * sign
    let magnitude = (2 * sum.abs() + count) / (2 * count);
    let rounded = if sum < 0 { -magnitude } else { magnitude };

    // The mean of i16 values always fits in an i16.
    Some(rounded as i16)
}
