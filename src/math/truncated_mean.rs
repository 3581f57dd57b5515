//! Truncated mean: average of the samples left after dropping everything
//! farther than `win * sigma` from the mean.
//!
//! Three routines compute it:
//!
//! - [`three_pass`]: mean, then dispersion around the rounded mean, then filter.
//! - [`two_pass`]: mean and dispersion from running sum / sum of squares, then filter.
//! - [`fixed_point`]: the integer-only routine the controller firmware runs.
//!
//! All of them compare squared deviations against a squared threshold, so no
//! square root is needed on the filtering path.

use serde::Serialize;
use tracing::debug;

use crate::error::{CalibError, Result};
use crate::math::fix16::Fix16;
use crate::math::utility::{ensure_samples, round};

/// The firmware's reciprocal table only covers counts up to 16.
pub const FIXED_POINT_MAX_SAMPLES: usize = 16;

/// Outcome of one truncated-mean computation plus the values behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruncatedMean {
    pub mean: i64,
    pub result: i64,
    pub sigma: i64,
    pub band_low: i64,
    pub band_high: i64,
    /// Squared, win-scaled cutoff the filter compared against.
    pub threshold: i64,
    pub win: f64,
    pub used: usize,
    pub total: usize,
}

/// Which routine to run. Used by the CLI to pick and label reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    ThreePass,
    TwoPass,
    FixedPoint,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::ThreePass, Variant::TwoPass, Variant::FixedPoint];

    pub fn label(self) -> &'static str {
        match self {
            Variant::ThreePass => "3 Passes",
            Variant::TwoPass => "2 Passes",
            Variant::FixedPoint => "Fix16",
        }
    }

    pub fn compute(self, samples: &[i64], win: f64) -> Result<TruncatedMean> {
        match self {
            Variant::ThreePass => three_pass(samples, win),
            Variant::TwoPass => two_pass(samples, win),
            Variant::FixedPoint => {
                let samples = to_u16_samples(samples)?;
                fixed_point(&samples, Fix16::from_f64(win)?)
            }
        }
    }
}

/// Mean, then squared deviations from the rounded mean, then the filter.
///
/// # Errors
///
/// Returns [`CalibError::InvalidInput`] for an empty sample set.
pub fn three_pass(samples: &[i64], win: f64) -> Result<TruncatedMean> {
    let total = ensure_samples(samples)?;
    let count = total as f64;

    let mean = round(samples.iter().sum::<i64>() as f64 / count);

    let s_sigma: i64 = samples.iter().map(|&x| (mean - x).pow(2)).sum();
    let threshold = round(s_sigma as f64 * win * win / count);
    let sigma = round((s_sigma as f64 / count).sqrt());

    debug!(total, mean, s_sigma, threshold, sigma, "three-pass dispersion");

    Ok(filter(samples, mean, sigma, threshold, win))
}

/// Mean and variance from one pass over `sum(x)` and `sum(x^2)`, then the
/// filter.
///
/// The variance is measured around the exact mean, whereas [`three_pass`]
/// measures it around the rounded one, which adds `(M - mu)^2 <= 0.25` to
/// the variance. The three-pass threshold can therefore be higher by up to
/// `win^2 / 4` units plus one for rounding, and a sample sitting between the
/// two cutoffs is kept by one routine and dropped by the other. `[0, 1]` with
/// `win = 1.1` is the smallest such input.
///
/// # Errors
///
/// Returns [`CalibError::InvalidInput`] for an empty sample set.
pub fn two_pass(samples: &[i64], win: f64) -> Result<TruncatedMean> {
    let total = ensure_samples(samples)?;
    let count = total as f64;

    let (s, s2) = samples
        .iter()
        .fold((0i64, 0i64), |(s, s2), &x| (s + x, s2 + x * x));
    let mean = round(s as f64 / count);

    let s = s as f64;
    // Cancellation can push an all-equal set slightly below zero.
    let variance = ((s2 as f64 - s * s / count) / count).max(0.0);

    let threshold = round(variance * win * win);
    let sigma = round(variance.sqrt());

    debug!(total, mean, variance, threshold, sigma, "two-pass dispersion");

    Ok(filter(samples, mean, sigma, threshold, win))
}

/// Integer-only truncated mean, bit-for-bit the firmware routine.
///
/// Differs from the float routines in three ways: the mean rounds through a
/// Q16.16 reciprocal, the dispersion is the sample variance (`n - 1`), and
/// `window^2` is approximated with 4 fractional bits.
///
/// # Errors
///
/// Returns [`CalibError::InvalidInput`] for an empty sample set or more than
/// [`FIXED_POINT_MAX_SAMPLES`] samples.
pub fn fixed_point(samples: &[u16], window: Fix16) -> Result<TruncatedMean> {
    let total = ensure_samples(samples)?;
    if total > FIXED_POINT_MAX_SAMPLES {
        return Err(CalibError::InvalidInput(format!(
            "fixed-point mean supports at most {FIXED_POINT_MAX_SAMPLES} samples, got {total}"
        )));
    }
    let count = total as i64;

    let (s, s2) = samples.iter().fold((0i64, 0i64), |(s, s2), &x| {
        let x = i64::from(x);
        (s + x, s2 + x * x)
    });

    let mean = fixed_div_round(s, total);

    let sigma_square = if count > 1 {
        (s2 - s * s / count) / (count - 1)
    } else {
        0
    };

    let w = i64::from(window.raw()) >> 8;
    let threshold = (((w * w) >> 12) * sigma_square) >> 4;

    let mut kept_sum = 0i64;
    let mut used = 0usize;
    for &x in samples {
        let x = i64::from(x);
        if (mean - x).pow(2) < threshold {
            kept_sum += x;
            used += 1;
        }
    }

    let result = if used == 0 {
        mean
    } else {
        fixed_div_round(kept_sum, used)
    };

    let win = window.to_f64();
    let sigma = round((sigma_square as f64).sqrt());

    debug!(total, mean, sigma_square, threshold, used, "fixed-point filter");

    Ok(TruncatedMean {
        mean,
        result,
        sigma,
        band_low: round(mean as f64 - win * sigma as f64),
        band_high: round(mean as f64 + win * sigma as f64),
        threshold,
        win,
        used,
        total,
    })
}

/// Largest possible `three_pass` minus `two_pass` threshold for a given `win`:
/// `win^2 / 4` from measuring around the rounded mean, plus one for rounding.
pub fn max_threshold_gap(win: f64) -> i64 {
    (win * win / 4.0).ceil() as i64 + 1
}

/// Narrows samples to the `u16` range the firmware routine works with.
pub fn to_u16_samples(samples: &[i64]) -> Result<Vec<u16>> {
    samples
        .iter()
        .map(|&x| {
            u16::try_from(x).map_err(|_| {
                CalibError::InvalidInput(format!("sample {x} does not fit in 0..=65535"))
            })
        })
        .collect()
}

/// `round(sum / n)` through the Q16.16 reciprocal table, `n` in `1..=16`.
fn fixed_div_round(sum: i64, n: usize) -> i64 {
    let n = n as u8;
    ((sum + i64::from(n >> 1)) * i64::from(Fix16::reciprocal(n).raw())) >> 16
}

/// Shared last pass: keep samples with `(mean - x)^2 < threshold` and average
/// them, falling back to `mean` when nothing survives.
fn filter(samples: &[i64], mean: i64, sigma: i64, threshold: i64, win: f64) -> TruncatedMean {
    let (kept_sum, used) = samples
        .iter()
        .filter(|&&x| (mean - x).pow(2) < threshold)
        .fold((0i64, 0usize), |(sum, used), &x| (sum + x, used + 1));

    let result = if used == 0 {
        mean
    } else {
        round(kept_sum as f64 / used as f64)
    };

    TruncatedMean {
        mean,
        result,
        sigma,
        band_low: round(mean as f64 - win * sigma as f64),
        band_high: round(mean as f64 + win * sigma as f64),
        threshold,
        win,
        used,
        total: samples.len(),
    }
}
