//! Q16.16 fixed-point values as used by the controller firmware.

use serde::Serialize;

use crate::error::{CalibError, Result};

/// Signed Q16.16 fixed-point number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Fix16(i32);

impl Fix16 {
    pub const ONE: Fix16 = Fix16(0x0001_0000);

    pub const fn from_raw(raw: i32) -> Self {
        Fix16(raw)
    }

    /// Converts a float the same way the firmware's `F16()` literal macro
    /// does: scale by 2^16, round half away from zero.
    ///
    /// # Errors
    ///
    /// Returns [`CalibError::InvalidInput`] if the value is not finite or does
    /// not fit in Q16.16.
    pub fn from_f64(value: f64) -> Result<Self> {
        let scaled = (value * 65536.0).round();
        if !scaled.is_finite() || scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
            return Err(CalibError::InvalidInput(format!(
                "{value} is outside the Q16.16 range"
            )));
        }
        Ok(Fix16(scaled as i32))
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }

    /// `1 / n` as Q16.16, i.e. the firmware's reciprocal table entry.
    /// `0` and `1` both map to [`Fix16::ONE`].
    pub fn reciprocal(n: u8) -> Self {
        if n <= 1 {
            return Fix16::ONE;
        }
        let n = i32::from(n);
        Fix16((65536 + n / 2) / n)
    }
}
