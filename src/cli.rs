use crate::distribution::LatencyUnit;
use crate::series::{SeriesKind, SmoothMode};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fault Trace - normalize delay-injection experiment traces into comparable series
#[derive(Parser, Debug, Clone, Default)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// What to produce from the selected runs
    #[clap(short = 'm', long, value_enum, default_value_t = Mode::Throughput, help_heading = "Core Options")]
    pub mode: Mode,

    /// Directory containing the run files
    #[clap(short = 'd', long, default_value = ".", help_heading = "Core Options")]
    pub dir: PathBuf,

    /// File-match patterns, relative to --dir (defaults depend on --mode)
    #[clap(short = 'p', long = "pattern", help_heading = "Core Options", num_args = 1..)]
    pub patterns: Vec<String>,

    /// Smoothing window in seconds (default: 3 for counts, 5 for latencies)
    #[clap(short = 'w', long)]
    pub window: Option<usize>,

    /// Rolling aggregation (default: mean for counts, median for latencies)
    #[clap(long, value_enum)]
    pub smoothing: Option<SmoothMode>,

    /// Force the fault-start marker to this second instead of detecting it
    #[clap(long)]
    pub fault_start: Option<i64>,

    /// Unit for per-operation latency distributions
    #[clap(long, value_enum, default_value_t = LatencyUnit::Milliseconds)]
    pub unit: LatencyUnit,

    /// Additional file-name prefixes stripped before building run labels
    #[clap(long = "label-prefix")]
    pub label_prefixes: Vec<String>,

    /// Title recorded in the report
    #[clap(long)]
    pub title: Option<String>,

    /// Output file for the report (JSON format)
    #[clap(short = 'o', long)]
    pub output_file: Option<PathBuf>,

    /// Also write logs to this file
    #[clap(long)]
    pub log_file: Option<PathBuf>,

    /// Verbose output
    #[clap(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

/// Pipeline variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Operations per second over time
    #[default]
    Throughput,

    /// Latency over time
    Latency,

    /// Empirical latency CDF per run
    Distribution,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Throughput => write!(f, "Throughput vs Time"),
            Mode::Latency => write!(f, "Latency vs Time"),
            Mode::Distribution => write!(f, "Latency CDF"),
        }
    }
}

impl Mode {
    /// File patterns selected when none are given on the command line
    pub fn default_patterns(self) -> Vec<String> {
        let patterns: &[&str] = match self {
            Mode::Throughput => &[
                "latency_per_sec_*us.csv",
                "throughput_per_sec_*.csv",
                "latency_data_*.csv",
                "latency_x*ms.log",
            ],
            Mode::Latency => &["latency_per_sec_*.csv"],
            Mode::Distribution => &["per_op_latency_*.csv"],
        };
        patterns.iter().map(|p| p.to_string()).collect()
    }

    /// Series kind preferred when a file could be read either way
    pub fn preferred_kind(self) -> SeriesKind {
        match self {
            Mode::Throughput => SeriesKind::Count,
            Mode::Latency | Mode::Distribution => SeriesKind::Metric,
        }
    }

    /// Report title used when none is configured
    pub fn default_title(self) -> String {
        format!("Delay Injection: {}", self)
    }
}

impl Args {
    /// Patterns to expand: the explicit ones, or the mode's defaults
    pub fn effective_patterns(&self) -> Vec<String> {
        if self.patterns.is_empty() {
            self.mode.default_patterns()
        } else {
            self.patterns.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let args = Args::parse_from(["fault-trace"]);
        assert_eq!(args.mode, Mode::Throughput);
        assert_eq!(args.dir, PathBuf::from("."));
        assert_eq!(args.unit, LatencyUnit::Milliseconds);
        assert!(args.window.is_none());
        assert_eq!(args.effective_patterns(), Mode::Throughput.default_patterns());
    }

    #[test]
    fn test_parse_options() {
        let args = Args::parse_from([
            "fault-trace",
            "--mode",
            "latency",
            "-w",
            "7",
            "--smoothing",
            "mean",
            "--fault-start",
            "40",
            "-p",
            "a_*.csv",
            "b_*.csv",
            "--unit",
            "s",
        ]);
        assert_eq!(args.mode, Mode::Latency);
        assert_eq!(args.window, Some(7));
        assert_eq!(args.smoothing, Some(SmoothMode::Mean));
        assert_eq!(args.fault_start, Some(40));
        assert_eq!(args.unit, LatencyUnit::Seconds);
        assert_eq!(args.effective_patterns(), vec!["a_*.csv", "b_*.csv"]);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Throughput.to_string(), "Throughput vs Time");
        assert_eq!(Mode::Distribution.to_string(), "Latency CDF");
        assert_eq!(
            Mode::Latency.default_title(),
            "Delay Injection: Latency vs Time"
        );
    }

    #[test]
    fn test_mode_default_patterns() {
        assert_eq!(
            Mode::Distribution.default_patterns(),
            vec!["per_op_latency_*.csv"]
        );
        assert_eq!(Mode::Throughput.default_patterns().len(), 4);
    }
}
