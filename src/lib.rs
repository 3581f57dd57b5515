pub mod comparison;
pub mod config;
pub mod error;
pub mod math;
pub mod output;
pub mod setpoints;
