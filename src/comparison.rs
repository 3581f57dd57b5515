//! Runs several truncated-mean routines over the same readings and checks
//! whether the float routines agree.

use tracing::warn;

use crate::error::{CalibError, Result};
use crate::math::truncated_mean::{TruncatedMean, Variant};

/// Reports of every routine that ran, in the order requested.
#[derive(Debug, Default)]
pub struct Comparison {
    pub reports: Vec<(Variant, TruncatedMean)>,
    /// Routines left out because the readings don't suit them.
    pub skipped: Vec<(Variant, CalibError)>,
}

impl Comparison {
    /// Computes each variant in `variants`.
    ///
    /// With `optional_fixed_point`, a fixed-point failure (more than 16
    /// readings, values outside `u16`) is logged and recorded in `skipped`
    /// instead of failing the whole comparison.
    ///
    /// # Errors
    ///
    /// Returns the first error from a variant that is not skippable.
    pub fn run(
        variants: &[Variant],
        samples: &[i64],
        win: f64,
        optional_fixed_point: bool,
    ) -> Result<Self> {
        let mut comparison = Comparison::default();

        for &variant in variants {
            match variant.compute(samples, win) {
                Ok(report) => comparison.reports.push((variant, report)),
                Err(e) if variant == Variant::FixedPoint && optional_fixed_point => {
                    warn!(error = %e, "Skipping fixed-point routine");
                    comparison.skipped.push((variant, e));
                }
                Err(e) => return Err(e),
            }
        }

        if let Some((three, two)) = comparison.disagreement() {
            warn!(
                three_pass_used = three.used,
                two_pass_used = two.used,
                three_pass_threshold = three.threshold,
                two_pass_threshold = two.threshold,
                "Three-pass and two-pass routines disagree"
            );
        }

        Ok(comparison)
    }

    pub fn report(&self, variant: Variant) -> Option<&TruncatedMean> {
        self.reports
            .iter()
            .find(|(v, _)| *v == variant)
            .map(|(_, report)| report)
    }

    /// Three-pass and two-pass reports when both ran and picked a different
    /// subset or result.
    pub fn disagreement(&self) -> Option<(&TruncatedMean, &TruncatedMean)> {
        let three = self.report(Variant::ThreePass)?;
        let two = self.report(Variant::TwoPass)?;
        (three.used != two.used || three.result != two.result).then_some((three, two))
    }
}
