//! CLI entry point for the speed calibration tools.
//!
//! Provides subcommands for comparing truncated-mean routines on a set of
//! motor speed readings, printing the calibration setpoint table, and running
//! the median filter over the same readings.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use speed_calib_tools::{
    comparison::Comparison,
    config::TruncMeanConfig,
    math::median::MedianFilter,
    math::truncated_mean::Variant,
    output::{ReportRecord, append_record, print_json, print_report, render_data_line},
    setpoints::{Setpoints, format_f16_line, format_raw_line},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Capacity of the firmware's median filter.
const DEFAULT_MEDIAN_CAPACITY: usize = 32;

#[derive(Parser)]
#[command(name = "speed_calib_tools")]
#[command(about = "Helpers for motor speed calibration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare truncated-mean routines on a set of readings
    TruncMean(TruncMeanArgs),
    /// Print the calibration setpoint table
    Setpoints {
        /// Line format of the table
        #[arg(short, long, value_enum, default_value_t = SetpointFormat::F16)]
        format: SetpointFormat,
    },
    /// Run the median filter over a set of readings
    Median {
        #[command(flatten)]
        input: SampleArgs,

        /// Number of readings the filter accepts
        #[arg(short, long, default_value_t = DEFAULT_MEDIAN_CAPACITY)]
        capacity: usize,
    },
}

#[derive(Args, Default)]
struct SampleArgs {
    /// JSON config with `samples` and `win` (falls back to CALIB_CONFIG_PATH);
    /// `median` ignores `win`
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Comma-separated readings, overriding the config
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    samples: Option<Vec<i64>>,
}

#[derive(Args, Default)]
struct TruncMeanArgs {
    #[command(flatten)]
    input: SampleArgs,

    /// Sigma multiplier, overriding the config
    #[arg(short, long)]
    win: Option<f64>,

    /// Which routine(s) to run
    #[arg(long, value_enum, default_value_t = VariantArg::Both)]
    variant: VariantArg,

    /// Print reports as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// CSV file to append results to
    #[arg(long, value_name = "FILE")]
    csv: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum VariantArg {
    /// Three-pass and two-pass, as the playground always printed
    #[default]
    Both,
    /// Both float routines plus the firmware fixed-point one
    All,
    ThreePass,
    TwoPass,
    FixedPoint,
}

impl VariantArg {
    fn variants(self) -> Vec<Variant> {
        match self {
            VariantArg::Both => vec![Variant::ThreePass, Variant::TwoPass],
            VariantArg::All => Variant::ALL.to_vec(),
            VariantArg::ThreePass => vec![Variant::ThreePass],
            VariantArg::TwoPass => vec![Variant::TwoPass],
            VariantArg::FixedPoint => vec![Variant::FixedPoint],
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SetpointFormat {
    /// `F16(<value>),`
    F16,
    /// Pre-converted Q16.16 integer
    Raw,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/speed_calib_tools.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("speed_calib_tools.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or_else(|| Commands::TruncMean(TruncMeanArgs::default())) {
        Commands::TruncMean(args) => trunc_mean(args)?,
        Commands::Setpoints { format } => {
            for value in Setpoints::new() {
                let line = match format {
                    SetpointFormat::F16 => format_f16_line(value),
                    SetpointFormat::Raw => format_raw_line(value)?,
                };
                println!("{line}");
            }
        }
        Commands::Median { input, capacity } => median(input, capacity)?,
    }

    Ok(())
}

/// Resolves the config file, applies CLI overrides and validates the result.
fn load_config(input: SampleArgs, win: Option<f64>) -> Result<TruncMeanConfig> {
    let path = input
        .config
        .or_else(|| std::env::var("CALIB_CONFIG_PATH").ok());

    let config = match path {
        Some(path) => {
            info!(path = %path, "Loading config");
            TruncMeanConfig::load(&path)?
        }
        None => TruncMeanConfig::default(),
    }
    .with_overrides(input.samples, win);

    config.validate()?;
    debug!(samples = config.samples.len(), win = config.win, "Config ready");
    Ok(config)
}

/// Runs the selected truncated-mean routines and reports each result.
#[tracing::instrument(skip_all)]
fn trunc_mean(args: TruncMeanArgs) -> Result<()> {
    let config = load_config(args.input, args.win)?;

    let Comparison { reports, .. } = Comparison::run(
        &args.variant.variants(),
        &config.samples,
        config.win,
        args.variant == VariantArg::All,
    )?;

    let records: Vec<ReportRecord> = reports
        .iter()
        .map(|(variant, report)| ReportRecord::new(variant.label(), report))
        .collect();

    if args.json {
        print_json(&records)?;
    } else {
        println!();
        println!("{}", render_data_line(&config.samples));
        println!();
        for (variant, report) in &reports {
            print_report(variant.label(), report);
        }
    }

    if let Some(path) = &args.csv {
        for record in &records {
            append_record(path, record)?;
        }
        info!(path = %path, rows = records.len(), "Results appended");
    }

    Ok(())
}

/// Feeds the readings through a [`MedianFilter`] and prints the median.
#[tracing::instrument(skip(input))]
fn median(input: SampleArgs, capacity: usize) -> Result<()> {
    let config = load_config(input, None)?;

    let mut filter = MedianFilter::new(capacity);
    filter.extend(config.samples.iter().copied());

    let used = filter.len();
    let total = config.samples.len();
    if used < total {
        warn!(used, total, capacity, "Median filter full, readings dropped");
    }

    println!();
    println!("{}", render_data_line(&config.samples));
    println!();
    println!("Median: {}", filter.result());
    println!("Used:   {used} of {total}");
    println!();

    Ok(())
}
