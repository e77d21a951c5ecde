//! Error taxonomy for trace ingestion.
//!
//! Errors fall into two groups. Per-file errors (`Schema`, `EmptyData`,
//! `InvalidValue`, `TimeRange`, `Io`, `Csv`) describe a single run that cannot be used; the
//! run aggregator logs them and moves on to the next file. Batch errors
//! (`NoInput`, `InvalidConfig`) abort the whole pipeline because there is
//! nothing meaningful left to produce.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the ingestion pipeline
pub type IngestResult<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// None of the columns required by any supported input shape were found
    #[error("{}: missing required column(s): {}", .path.display(), .columns.join(", "))]
    Schema { path: PathBuf, columns: Vec<String> },

    /// The file parsed but yielded zero usable samples
    #[error("{}: no usable samples", .path.display())]
    EmptyData { path: PathBuf },

    /// A cell could not be interpreted as the number its column requires
    #[error("{}: line {line}: invalid value {value:?} in column '{column}'", .path.display())]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },

    /// The time axis is too wide to fill second by second
    #[error("{}: time range of {span}s exceeds the {max}s limit", .path.display())]
    TimeRange { path: PathBuf, span: u64, max: u64 },

    /// The selected input file set is empty
    #[error("no input files to process")]
    NoInput,

    /// Pipeline configuration is unusable (e.g. a zero smoothing window)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl IngestError {
    /// Whether this error aborts the whole batch rather than a single file
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestError::NoInput | IngestError::InvalidConfig(_))
    }

    /// Short description of the condition without the file path prefix.
    ///
    /// Used for skip diagnostics where the path is reported separately.
    pub fn reason(&self) -> String {
        match self {
            IngestError::Schema { columns, .. } => {
                format!("missing required column(s): {}", columns.join(", "))
            }
            IngestError::EmptyData { .. } => "no usable samples".to_string(),
            IngestError::InvalidValue {
                line,
                column,
                value,
                ..
            } => format!("line {}: invalid value {:?} in column '{}'", line, value, column),
            IngestError::TimeRange { span, max, .. } => {
                format!("time range of {}s exceeds the {}s limit", span, max)
            }
            IngestError::Io { source, .. } => source.to_string(),
            IngestError::Csv { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }

    pub(crate) fn schema<P: Into<PathBuf>>(path: P, columns: &[&str]) -> Self {
        IngestError::Schema {
            path: path.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}
