//! # Utility Functions and Helper Module
//!
//! Helpers shared by the binary and the pipeline that do not belong to a
//! single component.
//!
//! ## Key Functionality Categories
//!
//! - **Input Selection**: Expanding file-match patterns into an ordered file list
//! - **Validation**: Configuration checks with clear error messages
//! - **Formatting**: Human-readable display of series values and time ranges
//!
//! ## Usage Examples
//!
//! ```rust
//! use fault_trace::utils::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! assert_eq!(format_value(1234.5678), "1234.57");
//! assert_eq!(format_span(0, 59), "0s..59s (60s)");
//!
//! validate_window(3)?; // OK
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Expand file-match patterns relative to `dir` into an ordered file list
///
/// Each pattern is expanded independently and its matches are sorted
/// lexicographically; the per-pattern lists are then concatenated in pattern
/// order. A file matched by more than one pattern is kept at its first
/// position only.
///
/// ## Parameters
/// - `dir`: Directory the patterns are relative to
/// - `patterns`: Glob patterns such as `latency_per_sec_*.csv`
///
/// ## Returns
/// - `Ok(Vec<PathBuf>)`: Matching regular files, possibly empty
/// - `Err(anyhow::Error)`: A pattern is not a valid glob
///
/// ## Empty Results
///
/// An empty list is not an error here. The pipeline decides whether having
/// nothing to process is fatal.
pub fn collect_inputs<S: AsRef<str>>(dir: &Path, patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    // the directory is a literal path, only the patterns may contain wildcards
    let base = PathBuf::from(glob::Pattern::escape(&dir.to_string_lossy()));

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let full = base.join(pattern);
        let full = full.to_string_lossy();

        let mut matches: Vec<PathBuf> = glob::glob(&full)
            .with_context(|| format!("Invalid file pattern: {}", pattern))?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    debug!("Ignoring unreadable match for {}: {}", pattern, e);
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        matches.sort();
        debug!("Pattern {} matched {} file(s)", pattern, matches.len());

        for path in matches {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Validate that a smoothing window is usable
///
/// ## Parameters
/// - `window`: Rolling window size in seconds
///
/// ## Returns
/// - `Ok(())`: Window is valid
/// - `Err(anyhow::Error)`: Window is invalid with descriptive error
///
/// ## Validation Rules
///
/// - **Minimum**: 1 second (a window of one leaves the series unchanged)
/// - **Maximum**: 3600 seconds (longer windows flatten any run to its mean)
pub fn validate_window(window: usize) -> Result<()> {
    if window == 0 {
        anyhow::bail!("Smoothing window cannot be zero");
    }
    if window > 3600 {
        anyhow::bail!("Smoothing window {} is too large (maximum 3600s)", window);
    }
    Ok(())
}

/// Format a series value for terminal output
///
/// Integers print without decimals, everything else with two.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Format an inclusive second range along with its length
pub fn format_span(first: i64, last: i64) -> String {
    format!("{}s..{}s ({}s)", first, last, last - first + 1)
}
