//! Motor speed setpoints for the calibration table.
//!
//! The step is non-linear to balance precision against measurement time:
//! fine steps at low speed, where the motor response is least linear, and
//! coarse ones near full speed.

use crate::error::Result;
use crate::math::fix16::Fix16;

const FINE_LIMIT: f64 = 0.2;
const MEDIUM_LIMIT: f64 = 0.375;
const FINE_STEP: f64 = 1.0 / 64.0;
const MEDIUM_STEP: f64 = 1.0 / 32.0;
const COARSE_STEP: f64 = 1.0 / 10.0;

/// Lazy setpoint sequence from `0.0` up to and including `1.0`.
#[derive(Debug, Clone, Default)]
pub struct Setpoints {
    next: Option<f64>,
    done: bool,
}

impl Setpoints {
    pub fn new() -> Self {
        Self::default()
    }

    fn step_after(value: f64) -> f64 {
        if value < FINE_LIMIT {
            FINE_STEP
        } else if value < MEDIUM_LIMIT {
            MEDIUM_STEP
        } else {
            COARSE_STEP
        }
    }
}

impl Iterator for Setpoints {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.done {
            return None;
        }

        let value = match self.next {
            None => 0.0,
            Some(prev) => (prev + Self::step_after(prev)).min(1.0),
        };

        if value >= 1.0 {
            self.done = true;
        }
        self.next = Some(value);
        Some(value)
    }
}

/// `F16(<value>),` ready to paste into a firmware table.
pub fn format_f16_line(value: f64) -> String {
    format!("F16({value}),")
}

/// Pre-converted Q16.16 literal with the source value as a comment.
pub fn format_raw_line(value: f64) -> Result<String> {
    let fixed = Fix16::from_f64(value)?;
    Ok(format!("{}, // {value}", fixed.raw()))
}
