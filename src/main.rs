//! # Fault Trace - Main Entry Point
//!
//! Normalizes the traces of a delay-injection experiment into comparable
//! per-run series (or latency distributions) and reports when the fault was
//! injected.
//!
//! ## Flow
//!
//! 1. **Parse arguments** and initialize logging
//! 2. **Build the pipeline configuration**, rejecting unusable settings
//! 3. **Select input files** by expanding the file-match patterns
//! 4. **Run the pipeline** for the selected mode
//! 5. **Report**: print a summary table and optionally write the JSON report
//!
//! ## Error Handling
//!
//! Files that cannot be parsed are skipped with a diagnostic and do not fail
//! the run. An empty input selection or invalid configuration exits non-zero.

use anyhow::{Context, Result};
use clap::Parser;
use fault_trace::{
    cli::Args,
    logging,
    pipeline::{PipelineConfig, RunAggregator},
    results::{summary_lines, ResultsManager},
    utils::collect_inputs,
    IngestError,
};
use tracing::{debug, info};

fn main() -> Result<()> {
    let args = Args::parse();

    // Held until exit so the file appender flushes
    let _log_guard = logging::init(args.verbose, args.log_file.as_deref())?;

    info!("Starting Fault Trace {}", fault_trace::VERSION);
    debug!("Configuration: {:?}", args);

    let config = PipelineConfig::from_args(&args)?;

    let patterns = args.effective_patterns();
    let paths = collect_inputs(&args.dir, &patterns)
        .with_context(|| format!("Failed to select input files in {:?}", args.dir))?;
    if paths.is_empty() {
        return Err(IngestError::NoInput).with_context(|| {
            format!(
                "No files in {:?} match any of: {}",
                args.dir,
                patterns.join(", ")
            )
        });
    }
    info!("Selected {} input file(s)", paths.len());

    let aggregator = RunAggregator::new(config)?;
    let output = aggregator.run(&paths)?;

    for line in summary_lines(aggregator.config(), &output) {
        println!("{}", line);
    }

    if let Some(ref output_file) = args.output_file {
        ResultsManager::new(output_file)?.write(aggregator.config(), &output)?;
    }

    info!("Fault Trace completed");
    Ok(())
}
