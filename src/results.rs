use crate::cli::Mode;
use crate::distribution::LatencyUnit;
use crate::pipeline::{PipelineConfig, PipelineOutput};
use crate::series::SmoothMode;
use crate::utils::{format_span, format_value};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Run metadata recorded next to the results for reproducibility
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub mode: Mode,
    pub title: String,
    /// Window override, `None` when per-kind defaults were used
    pub window: Option<usize>,
    pub smoothing: Option<SmoothMode>,
    pub latency_unit: LatencyUnit,
    pub total_runs: usize,
    pub skipped_files: usize,
}

impl ReportMetadata {
    pub fn new(config: &PipelineConfig, output: &PipelineOutput) -> Self {
        Self {
            version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            mode: config.mode,
            title: config.title.clone(),
            window: config.window,
            smoothing: config.smoothing,
            latency_unit: config.latency_unit,
            total_runs: output.run_count(),
            skipped_files: output.skipped().len(),
        }
    }
}

/// Final report structure
#[derive(Debug, Serialize)]
pub struct FinalReport<'a> {
    pub metadata: ReportMetadata,
    pub results: &'a PipelineOutput,
}

/// Results manager for report output
pub struct ResultsManager {
    output_file: PathBuf,
}

impl ResultsManager {
    /// Create a new results manager
    pub fn new(output_file: &Path) -> Result<Self> {
        if output_file.as_os_str().is_empty() {
            anyhow::bail!("Output file path cannot be empty");
        }
        Ok(Self {
            output_file: output_file.to_path_buf(),
        })
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Write the report for one pipeline invocation
    pub fn write(&self, config: &PipelineConfig, output: &PipelineOutput) -> Result<()> {
        info!("Writing report");

        let report = FinalReport {
            metadata: ReportMetadata::new(config, output),
            results: output,
        };
        let json = serde_json::to_string_pretty(&report)?;
        debug!("Report is {} bytes", json.len());

        std::fs::write(&self.output_file, json)
            .with_context(|| format!("Failed to write report to {:?}", self.output_file))?;

        info!("Results written to: {:?}", self.output_file);
        Ok(())
    }
}

/// Human-readable summary table of a pipeline invocation
pub fn summary_lines(config: &PipelineConfig, output: &PipelineOutput) -> Vec<String> {
    let mut lines = vec![config.title.clone()];

    match output {
        PipelineOutput::Series(report) => {
            lines.push(format!(
                "{:<12} {:<24} {:<20} {:>10} {:>10}",
                "Run", "Shape", "Span", "Mean", "Peak"
            ));
            for run in &report.runs {
                let values = run.series.values();
                let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
                let peak = run
                    .series
                    .smoothed()
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                let span = match (run.series.seconds().first(), run.series.seconds().last()) {
                    (Some(&first), Some(&last)) => format_span(first, last),
                    _ => "-".to_string(),
                };
                lines.push(format!(
                    "{:<12} {:<24} {:<20} {:>10} {:>10}",
                    run.label.as_str(),
                    run.shape.to_string(),
                    span,
                    format_value(mean),
                    format_value(peak)
                ));
            }
            match report.fault_start {
                Some(fault) => lines.push(format!(
                    "Fault start: {}s ({:?}, {} candidate(s))",
                    fault.second,
                    fault.source,
                    report.candidates.len()
                )),
                None => lines.push("Fault start: not detected".to_string()),
            }
        }
        PipelineOutput::Distribution(report) => {
            lines.push(format!(
                "{:<12} {:>8} {:>10} {:>10} {:>10} {:>10}",
                "Run",
                "Samples",
                format!("P50 ({})", config.latency_unit),
                "P95",
                "P99",
                "Max"
            ));
            for run in &report.runs {
                let p = |q| run.summary.percentile(q).map_or("-".to_string(), format_value);
                lines.push(format!(
                    "{:<12} {:>8} {:>10} {:>10} {:>10} {:>10}",
                    run.label.as_str(),
                    run.summary.count,
                    p(50.0),
                    p(95.0),
                    p(99.0),
                    format_value(run.summary.max)
                ));
            }
        }
    }

    for skipped in output.skipped() {
        lines.push(format!("Skipped {}: {}", skipped.path.display(), skipped.reason));
    }
    lines
}
