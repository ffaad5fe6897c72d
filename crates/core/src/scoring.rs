//! Review score bounds and input validation.
//!
//! Scores arrive as raw JSON values. Anything that is not a whole number inside
//! `[MIN_SCORE, MAX_SCORE]` is rejected with [`CoreError::OutOfRange`] before
//! it reaches the ledger.

use crate::error::CoreError;

/// Lowest score a review may assign.
pub const MIN_SCORE: i16 = 1;

/// Highest score a review may assign.
pub const MAX_SCORE: i16 = 10;

fn out_of_range(value: impl ToString) -> CoreError {
    CoreError::OutOfRange {
        field: "score",
        value: value.to_string(),
        min: i64::from(MIN_SCORE),
        max: i64::from(MAX_SCORE),
    }
}

/// Validate an integer score and narrow it to the storage type.
pub fn validate_score(value: i64) -> Result<i16, CoreError> {
    if (i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(&value) {
        // Bounds checked above, the cast cannot truncate.
        Ok(value as i16)
    } else {
        Err(out_of_range(value))
    }
}

/// Validate a raw JSON value as a score.
///
/// `8` and `8.0` are both accepted; `7.5`, `"8"`, `null` and `true` are not.
pub fn score_from_json(value: &serde_json::Value) -> Result<i16, CoreError> {
    match value {
        serde_json::Value::Number(number) => score_from_number(number),
        other => Err(out_of_range(other)),
    }
}

fn score_from_number(number: &serde_json::Number) -> Result<i16, CoreError> {
    if let Some(value) = number.as_i64() {
        return validate_score(value);
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.is_finite() => {
            if value < i64::MIN as f64 || value > i64::MAX as f64 {
                return Err(out_of_range(number));
            }
            validate_score(value as i64).map_err(|_| out_of_range(number))
        }
        _ => Err(out_of_range(number)),
    }
}
