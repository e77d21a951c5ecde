//! # Fault Trace Library
//!
//! Ingestion and normalization of traces recorded while a filesystem delay
//! injector perturbs a workload. Runs arrive in several ad-hoc encodings; this
//! library turns each into a comparable per-second series or an empirical
//! latency distribution, and estimates when fault injection began.
//!
//! ## Supported Input Shapes
//!
//! - **Per-operation samples**: one latency (seconds) per row, optional `op` index
//! - **Raw timestamped events**: `timestamp_ms` with an optional `phase` tag
//! - **Per-second values**: a time column plus a count or latency column
//! - **Plain logs**: lines of the form `<timestamp_ms>,...`
//!
//! ## Architecture Overview
//!
//! The library is organized into several key modules:
//!
//! - `label`: Canonical `"<value> ms"` run labels from free-form file names
//! - `loader`: Input shape detection and per-shape parsing
//! - `series`: Gap filling, smoothing and time-origin alignment
//! - `distribution`: Empirical CDFs and latency summaries
//! - `fault`: Fault-start consensus across runs
//! - `pipeline`: Configuration and the run aggregator tying it all together
//! - `results`: JSON report output
//! - `cli`, `logging`, `utils`: Binary support
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use fault_trace::{PipelineConfig, RunAggregator};
//!
//! fn main() -> anyhow::Result<()> {
//!     let paths = vec![
//!         "runs/latency_per_sec_100us.csv",
//!         "runs/latency_per_sec_1ms.csv",
//!     ];
//!
//!     let aggregator = RunAggregator::new(PipelineConfig::default())?;
//!     let report = aggregator.aggregate(&paths)?;
//!
//!     for run in &report.runs {
//!         println!("{}: {} seconds", run.label, run.series.len());
//!     }
//!     if let Some(fault) = report.fault_start {
//!         println!("Fault injection began at {}s", fault.second);
//!     }
//!     Ok(())
//! }
//! ```

/// Command-line interface and pipeline mode selection
pub mod cli;

/// Empirical latency distributions
pub mod distribution;

/// Typed ingestion errors
///
/// Separates per-file failures, which the aggregator recovers from by
/// skipping the file, from batch-fatal conditions.
pub mod error;

/// Fault-start estimation
pub mod fault;

/// Run-label normalization
pub mod label;

/// Input shape detection and parsing
///
/// Every supported file encoding is read through one entry point and comes
/// back as the same [`loader::LoadedRun`] type.
pub mod loader;

/// Colorized log output
pub mod logging;

/// Run aggregation
///
/// Holds the explicit [`PipelineConfig`] and the [`RunAggregator`] that drives
/// loading, resampling, smoothing and alignment for a batch of runs:
/// - Per-file failure isolation with one diagnostic per skipped file
/// - Time-origin alignment so every run starts at second 0
/// - Fault-start consensus over all runs that tag their phases
pub mod pipeline;

/// Report output
///
/// Serializes aggregation results with run metadata as JSON for downstream
/// plotting tools.
pub mod results;

/// Per-second series and their transformations
pub mod series;

pub mod utils;

// Re-export key types for convenient library usage

pub use cli::{Args, Mode};
pub use distribution::{ecdf, DistributionSummary, EmpiricalDistribution, LatencyUnit};
pub use error::{IngestError, IngestResult};
pub use fault::{FaultStart, FaultStartEstimator, FaultStartSource};
pub use label::{normalize, RunLabel};
pub use loader::{CsvShape, InputShape, LoadedRun, SeriesLoader};

/// Pipeline entry points
///
/// The aggregator and its configuration are the primary interface for
/// library users; the report types are what the plotting side consumes.
pub use pipeline::{
    AggregateReport, DistributionReport, PipelineConfig, RunAggregator, RunDistribution,
    RunSeries, SkippedFile,
};

pub use results::ResultsManager;
pub use series::{
    resample, smooth, CanonicalSeries, SeriesKind, SmoothMode, SmoothedSeries, MAX_SPAN_SECONDS,
};

/// The current version of the fault trace tool
///
/// Populated from Cargo.toml and recorded in every report for reproducibility.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
///
/// Used whenever the corresponding option is not given explicitly.
pub mod defaults {
    /// Default smoothing window for count series, in seconds
    ///
    /// Three seconds removes per-second jitter in operation counts without
    /// hiding the step change when a delay is injected.
    pub const COUNT_WINDOW: usize = 3;

    /// Default smoothing window for latency series, in seconds
    ///
    /// Latency readings are spikier, so the median runs over a wider window.
    pub const METRIC_WINDOW: usize = 5;

    /// File-name prefixes stripped before run labels are normalized
    ///
    /// Longer prefixes come first so `latency_per_sec_` wins over `latency_`.
    pub fn label_prefixes() -> Vec<String> {
        [
            "per_op_latency_",
            "latency_per_sec_",
            "throughput_per_sec_",
            "latency_data_",
            "latency_",
        ]
        .iter()
        .map(|p| p.to_string())
        .collect()
    }
}
