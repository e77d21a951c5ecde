//! # Run Aggregation Pipeline
//!
//! Drives a batch of run files through the full normalization chain:
//!
//! ```text
//! file ─► SeriesLoader ─► resample ─► smooth ─► shift_to_zero ─► RunSeries
//!                 └──► fault-start candidate ─► FaultStartEstimator
//! ```
//!
//! The distribution variant replaces the time-series chain with an empirical
//! CDF per run.
//!
//! ## Failure Isolation
//!
//! A file that cannot be used (unknown columns, no samples, malformed cells,
//! a time range too wide to fill, unreadable) is skipped with one `warn!`
//! diagnostic and recorded as a [`SkippedFile`]; the remaining files are still
//! processed. Only batch-fatal errors ([`IngestError::is_fatal`]) abort the
//! run.
//!
//! ## Ordering
//!
//! Runs are reported in the order their paths were given. When two files
//! normalize to the same label the later file replaces the earlier one's data
//! at the earlier position.

use crate::cli::{Args, Mode};
use crate::distribution::{ecdf, DistributionSummary, EmpiricalDistribution, LatencyUnit};
use crate::error::{IngestError, IngestResult};
use crate::fault::{FaultStart, FaultStartEstimator};
use crate::label::RunLabel;
use crate::loader::{InputShape, LoaderOptions, RunPayload, SeriesLoader};
use crate::series::{resample, smooth, SeriesKind, SmoothMode, SmoothedSeries, MAX_SPAN_SECONDS};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Explicit configuration for one pipeline invocation
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Which output the pipeline produces
    pub mode: Mode,

    /// Smoothing window override in seconds; `None` uses the per-kind default
    pub window: Option<usize>,

    /// Smoothing aggregation override; `None` uses the per-kind default
    pub smoothing: Option<SmoothMode>,

    /// Fault-start second that replaces the detected consensus
    pub fault_start_override: Option<i64>,

    /// Unit for per-operation latency samples
    pub latency_unit: LatencyUnit,

    /// File-name prefixes stripped before label normalization
    pub label_prefixes: Vec<String>,

    /// Title recorded in the report
    pub title: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Throughput,
            window: None,
            smoothing: None,
            fault_start_override: None,
            latency_unit: LatencyUnit::Milliseconds,
            label_prefixes: crate::defaults::label_prefixes(),
            title: Mode::Throughput.default_title(),
        }
    }
}

impl PipelineConfig {
    /// Build and validate a configuration from parsed command-line arguments.
    ///
    /// Extra `--label-prefix` values are tried before the built-in prefixes.
    pub fn from_args(args: &Args) -> IngestResult<Self> {
        let mut label_prefixes = args.label_prefixes.clone();
        label_prefixes.extend(crate::defaults::label_prefixes());

        let config = Self {
            mode: args.mode,
            window: args.window,
            smoothing: args.smoothing,
            fault_start_override: args.fault_start,
            latency_unit: args.unit,
            label_prefixes,
            title: args
                .title
                .clone()
                .unwrap_or_else(|| args.mode.default_title()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> IngestResult<()> {
        if let Some(window) = self.window {
            crate::utils::validate_window(window)
                .map_err(|e| IngestError::InvalidConfig(e.to_string()))?;
        }
        if self.label_prefixes.iter().any(String::is_empty) {
            return Err(IngestError::InvalidConfig(
                "Label prefixes cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Smoothing window applied to a series of `kind`
    pub fn window_for(&self, kind: SeriesKind) -> usize {
        self.window.unwrap_or_else(|| kind.default_window())
    }

    /// Smoothing aggregation applied to a series of `kind`
    pub fn smoothing_for(&self, kind: SeriesKind) -> SmoothMode {
        self.smoothing.unwrap_or_else(|| kind.default_smoothing())
    }

    /// Loader settings implied by this configuration
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            preferred_kind: self.mode.preferred_kind(),
            latency_unit: self.latency_unit,
            label_prefixes: self.label_prefixes.clone(),
        }
    }
}

/// A file that was left out of the batch, and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// One processed run, aligned to start at second 0
#[derive(Debug, Clone, Serialize)]
pub struct RunSeries {
    pub label: RunLabel,
    pub path: PathBuf,
    pub shape: InputShape,
    #[serde(flatten)]
    pub series: SmoothedSeries,
}

/// Output of the time-series variant
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateReport {
    pub runs: Vec<RunSeries>,
    pub fault_start: Option<FaultStart>,
    /// Per-run fault-start candidates, in input order
    pub candidates: Vec<i64>,
    pub skipped: Vec<SkippedFile>,
}

impl AggregateReport {
    /// Run with the given label, if it was processed
    pub fn get(&self, label: &str) -> Option<&RunSeries> {
        self.runs.iter().find(|run| run.label.as_str() == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.runs.iter().map(|run| run.label.as_str()).collect()
    }
}

/// One run's latency distribution
#[derive(Debug, Clone, Serialize)]
pub struct RunDistribution {
    pub label: RunLabel,
    pub path: PathBuf,
    pub unit: LatencyUnit,
    pub distribution: EmpiricalDistribution,
    pub summary: DistributionSummary,
}

/// Output of the distribution variant
#[derive(Debug, Clone, Default, Serialize)]
pub struct DistributionReport {
    pub runs: Vec<RunDistribution>,
    pub skipped: Vec<SkippedFile>,
}

impl DistributionReport {
    pub fn get(&self, label: &str) -> Option<&RunDistribution> {
        self.runs.iter().find(|run| run.label.as_str() == label)
    }
}

/// Result of [`RunAggregator::run`], shaped by the configured mode
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PipelineOutput {
    Series(AggregateReport),
    Distribution(DistributionReport),
}

impl PipelineOutput {
    pub fn run_count(&self) -> usize {
        match self {
            PipelineOutput::Series(report) => report.runs.len(),
            PipelineOutput::Distribution(report) => report.runs.len(),
        }
    }

    pub fn skipped(&self) -> &[SkippedFile] {
        match self {
            PipelineOutput::Series(report) => &report.skipped,
            PipelineOutput::Distribution(report) => &report.skipped,
        }
    }
}

/// Loads, normalizes and aligns a batch of runs
pub struct RunAggregator {
    config: PipelineConfig,
    loader: SeriesLoader,
}

impl RunAggregator {
    /// Create an aggregator; fails with `InvalidConfig` for unusable settings
    pub fn new(config: PipelineConfig) -> IngestResult<Self> {
        config.validate()?;
        let loader = SeriesLoader::new(config.loader_options());
        Ok(Self { config, loader })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the variant selected by the configured mode
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> IngestResult<PipelineOutput> {
        match self.config.mode {
            Mode::Throughput | Mode::Latency => self.aggregate(paths).map(PipelineOutput::Series),
            Mode::Distribution => self.distributions(paths).map(PipelineOutput::Distribution),
        }
    }

    /// Process every file into an aligned, smoothed series and resolve the
    /// shared fault-start marker.
    pub fn aggregate<P: AsRef<Path>>(&self, paths: &[P]) -> IngestResult<AggregateReport> {
        if paths.is_empty() {
            return Err(IngestError::NoInput);
        }
        info!("Aggregating {} run file(s)", paths.len());

        let mut report = AggregateReport::default();
        for path in paths {
            let path = path.as_ref();
            match self.process_series(path) {
                Ok((run, candidate)) => {
                    report.candidates.extend(candidate);
                    insert_run(&mut report.runs, run, |r| &r.label);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => report.skipped.push(skip(path, &e)),
            }
        }

        report.fault_start =
            FaultStartEstimator::new(self.config.fault_start_override).resolve(&report.candidates);

        info!(
            "Aggregated {} run(s), skipped {}",
            report.runs.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Build the empirical latency distribution of every per-operation file
    pub fn distributions<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> IngestResult<DistributionReport> {
        if paths.is_empty() {
            return Err(IngestError::NoInput);
        }
        info!("Building distributions for {} run file(s)", paths.len());

        let mut report = DistributionReport::default();
        for path in paths {
            let path = path.as_ref();
            match self.process_distribution(path) {
                Ok(run) => insert_run(&mut report.runs, run, |r| &r.label),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => report.skipped.push(skip(path, &e)),
            }
        }

        info!(
            "Built {} distribution(s), skipped {}",
            report.runs.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn process_series(&self, path: &Path) -> IngestResult<(RunSeries, Option<i64>)> {
        let run = self.loader.load(path)?;
        let label = run.label.clone();
        let shape = run.shape;
        let candidate = run.fault_start;

        let sparse = run.into_series();
        if let Some(span) = sparse.span().filter(|&span| span > MAX_SPAN_SECONDS) {
            return Err(IngestError::TimeRange {
                path: path.to_path_buf(),
                span,
                max: MAX_SPAN_SECONDS,
            });
        }
        let series = resample(&sparse).ok_or_else(|| IngestError::EmptyData {
            path: path.to_path_buf(),
        })?;
        let kind = series.kind();
        let smoothed = smooth(
            series,
            self.config.window_for(kind),
            self.config.smoothing_for(kind),
        )?
        .shift_to_zero();

        debug!(
            "{}: {} second(s) as '{}', smoothed with {} over {}s",
            path.display(),
            smoothed.len(),
            label,
            smoothed.mode(),
            smoothed.window()
        );

        Ok((
            RunSeries {
                label,
                path: path.to_path_buf(),
                shape,
                series: smoothed,
            },
            candidate,
        ))
    }

    fn process_distribution(&self, path: &Path) -> IngestResult<RunDistribution> {
        let run = self.loader.load(path)?;
        let RunPayload::Samples(samples) = run.payload else {
            return Err(IngestError::schema(path, &["seconds"]));
        };

        let distribution = ecdf(&samples.latencies);
        let summary = DistributionSummary::from_distribution(&distribution).ok_or_else(|| {
            IngestError::EmptyData {
                path: path.to_path_buf(),
            }
        })?;
        debug!(
            "{}: {} sample(s) as '{}'",
            path.display(),
            distribution.len(),
            run.label
        );

        Ok(RunDistribution {
            label: run.label,
            path: path.to_path_buf(),
            unit: self.config.latency_unit,
            distribution,
            summary,
        })
    }
}

fn skip(path: &Path, error: &IngestError) -> SkippedFile {
    let reason = error.reason();
    warn!("Skip {}: {}", path.display(), reason);
    SkippedFile {
        path: path.to_path_buf(),
        reason,
    }
}

/// Append `run`, or replace the entry that already carries its label
fn insert_run<T>(runs: &mut Vec<T>, run: T, label: impl Fn(&T) -> &RunLabel) {
    match runs.iter().position(|existing| label(existing) == label(&run)) {
        Some(index) => {
            warn!("Duplicate run label '{}': later file replaces earlier", label(&run));
            runs[index] = run;
        }
        None => runs.push(run),
    }
}
