use crate::error::{CalibError, Result};

/// Rounds to the nearest integer, ties away from zero.
///
/// Every stage of the truncated-mean routines rounds through here so that the
/// order of rounding stays identical between variants.
pub fn round(value: f64) -> i64 {
    value.round() as i64
}

/// Returns the sample count, or [`CalibError::InvalidInput`] for an empty set.
pub fn ensure_samples<T>(samples: &[T]) -> Result<usize> {
    if samples.is_empty() {
        return Err(CalibError::InvalidInput(
            "at least one sample is required".to_string(),
        ));
    }
    Ok(samples.len())
}
