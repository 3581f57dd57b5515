//! Numeric routines used while calibrating the speed controller.
//!
//! Holds the truncated-mean variants compared by the playground, the
//! Q16.16 helpers they share with the firmware, and the bounded running
//! median used by the calibrators.

pub mod fix16;
pub mod median;
pub mod truncated_mean;
pub mod utility;
