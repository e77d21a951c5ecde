//! # Run Label Normalization
//!
//! Experiment runs are identified by tokens embedded in their file names
//! (`per_op_latency_100us.csv`, `latency_x5ms.log`, ...). Different harness
//! versions encode the injected delay in different units, so this module turns
//! the first `<number><unit>` token into a canonical `"<value> ms"` label that
//! compares equal across runs of the same delay.
//!
//! Unrecognized tokens pass through unchanged; normalization never fails.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// Values this close to an integer are rendered without decimals
const INTEGER_TOLERANCE: f64 = 1e-9;

fn unit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(µs|us|ms|s)\b").expect("unit pattern is valid")
    })
}

/// Canonical label identifying one run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunLabel(String);

impl RunLabel {
    /// Build a label from a free-form token, normalizing any delay value in it
    pub fn from_token(token: &str) -> Self {
        RunLabel(normalize(token))
    }

    /// Derive the label for an input file.
    ///
    /// The first prefix in `prefixes` that the file stem starts with is removed
    /// before normalization.
    pub fn from_path(path: &Path, prefixes: &[String]) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let token = prefixes
            .iter()
            .find_map(|prefix| stem.strip_prefix(prefix.as_str()))
            .unwrap_or(stem.as_str());
        Self::from_token(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunLabel {
    fn from(token: &str) -> Self {
        Self::from_token(token)
    }
}

/// Normalize the first `<number><unit>` token of `text` to `"<value> ms"`.
///
/// Supported units are `µs`/`us`, `ms` and `s`, case-insensitive. Text without
/// such a token is returned unchanged, as is a token whose number is the
/// exponent of a scientific literal (`1e-4s`).
///
/// ```rust
/// # use fault_trace::label::normalize;
/// assert_eq!(normalize("100us"), "0.1 ms");
/// assert_eq!(normalize("fs-delay-2s"), "2000 ms");
/// assert_eq!(normalize("baseline"), "baseline");
/// ```
pub fn normalize(text: &str) -> String {
    let Some(caps) = unit_pattern().captures(text) else {
        return text.to_string();
    };
    let (Some(number), Some(unit)) = (caps.get(1), caps.get(2)) else {
        return text.to_string();
    };
    if is_exponent(&text[..number.start()]) {
        return text.to_string();
    }
    let Ok(value) = number.as_str().parse::<f64>() else {
        return text.to_string();
    };

    let ms = match unit.as_str().to_lowercase().as_str() {
        "µs" | "us" => value / 1000.0,
        "ms" => value,
        "s" => value * 1000.0,
        _ => return text.to_string(),
    };

    format!("{} ms", format_ms(ms))
}

/// Render a millisecond value: integers without decimals, otherwise 3
/// decimals below 1 ms and 2 decimals above, with trailing zeros removed.
pub fn format_ms(ms: f64) -> String {
    if (ms - ms.round()).abs() < INTEGER_TOLERANCE {
        return format!("{}", ms.round() as i64);
    }
    let fixed = if ms < 1.0 {
        format!("{:.3}", ms)
    } else {
        format!("{:.2}", ms)
    };
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// True when the text preceding a number ends in a scientific exponent marker
/// such as `1e`, `1e-` or `2.5E+`.
fn is_exponent(before: &str) -> bool {
    let trimmed = before.trim_end_matches(&['+', '-'][..]);
    let mut chars = trimmed.chars().rev();
    match (chars.next(), chars.next()) {
        (Some('e' | 'E'), Some(c)) => c.is_ascii_digit() || c == '.',
        _ => false,
    }
}
