//! Report formatting and persistence for truncated-mean results.
//!
//! Supports the fixed-layout console report, JSON, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use crate::math::truncated_mean::TruncatedMean;

/// One CSV row: a [`TruncatedMean`] tagged with when and how it was computed.
#[derive(Debug, Serialize)]
pub struct ReportRecord {
    pub timestamp: DateTime<Utc>,
    pub variant: String,
    pub mean: i64,
    pub result: i64,
    pub sigma: i64,
    pub band_low: i64,
    pub band_high: i64,
    pub threshold: i64,
    pub win: f64,
    pub used: usize,
    pub total: usize,
}

impl ReportRecord {
    pub fn new(variant: &str, report: &TruncatedMean) -> Self {
        ReportRecord {
            timestamp: Utc::now(),
            variant: variant.to_string(),
            mean: report.mean,
            result: report.result,
            sigma: report.sigma,
            band_low: report.band_low,
            band_high: report.band_high,
            threshold: report.threshold,
            win: report.win,
            used: report.used,
            total: report.total,
        }
    }
}

/// `Data: a,b,c` header printed before the reports.
pub fn render_data_line(samples: &[i64]) -> String {
    let joined = samples
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("Data: {joined}")
}

/// Renders the console report for one variant, trailing blank line included.
pub fn render_report(label: &str, report: &TruncatedMean) -> String {
    format!(
        "{label}\n\
         \n\
         Mean:   {}\n\
         Result: {}\n\
         Sigma:  {} (allow [{}..{}])\n\
         Win:    {}\n\
         Used:   {} of {}\n",
        report.mean,
        report.result,
        report.sigma,
        report.band_low,
        report.band_high,
        report.win,
        report.used,
        report.total,
    )
}

pub fn print_report(label: &str, report: &TruncatedMean) {
    println!("{}", render_report(label, report));
}

/// Prints a report as pretty-printed JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a [`ReportRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &ReportRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_report() -> TruncatedMean {
        TruncatedMean {
            mean: 1914,
            result: 2052,
            sigma: 787,
            band_low: 1048,
            band_high: 2780,
            threshold: 748608,
            win: 1.1,
            used: 6,
            total: 8,
        }
    }

    #[test]
    fn test_render_data_line() {
        assert_eq!(render_data_line(&[2050, 2, -3]), "Data: 2050,2,-3");
        assert_eq!(render_data_line(&[7]), "Data: 7");
    }

    #[test]
    fn test_render_report_layout() {
        let text = render_report("3 Passes", &sample_report());
        let expected = "3 Passes\n\
                        \n\
                        Mean:   1914\n\
                        Result: 2052\n\
                        Sigma:  787 (allow [1048..2780])\n\
                        Win:    1.1\n\
                        Used:   6 of 8\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample_report()).unwrap();
    }

    #[test]
    fn test_append_record_creates_file() {
        let path = temp_path("speed_calib_tools_test_create.csv");
        let _ = fs::remove_file(&path);

        append_record(&path, &ReportRecord::new("3 Passes", &sample_report())).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("3 Passes"));
        assert!(content.contains("2052"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("speed_calib_tools_test_header.csv");
        let _ = fs::remove_file(&path);

        let record = ReportRecord::new("2 Passes", &sample_report());
        append_record(&path, &record).unwrap();
        append_record(&path, &record).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("timestamp")).count(),
            1
        );

        fs::remove_file(&path).unwrap();
    }
}
