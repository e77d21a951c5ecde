//! Empirical latency distributions.
//!
//! [`ecdf`] is the core builder: sort the samples and assign each the
//! cumulative fraction `rank / n`. [`DistributionSummary`] adds the handful of
//! scalar statistics reported next to each curve.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Percentiles reported in every distribution summary
pub const SUMMARY_PERCENTILES: [f64; 3] = [50.0, 95.0, 99.0];

/// Unit in which per-operation latency samples are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyUnit {
    /// Milliseconds
    #[default]
    #[clap(name = "ms")]
    Milliseconds,
    /// Seconds, as recorded by the harness
    #[clap(name = "s")]
    Seconds,
}

impl LatencyUnit {
    /// Convert a latency recorded in seconds into this unit
    pub fn from_seconds(self, seconds: f64) -> f64 {
        match self {
            LatencyUnit::Milliseconds => seconds * 1000.0,
            LatencyUnit::Seconds => seconds,
        }
    }
}

impl fmt::Display for LatencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatencyUnit::Milliseconds => write!(f, "ms"),
            LatencyUnit::Seconds => write!(f, "s"),
        }
    }
}

/// Sorted samples paired with their cumulative fractions
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EmpiricalDistribution {
    values: Vec<f64>,
    fractions: Vec<f64>,
}

impl EmpiricalDistribution {
    /// Sample values in ascending order, ties preserved
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `i / n` for `i` in `1..=n`
    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fraction of samples at or below `x`
    pub fn fraction_at(&self, x: f64) -> f64 {
        let rank = self.values.partition_point(|&v| v <= x);
        if rank == 0 {
            0.0
        } else {
            self.fractions[rank - 1]
        }
    }
}

/// Build the empirical CDF of `samples`.
///
/// Empty input yields an empty distribution. The last fraction is exactly
/// `1.0` because it is computed as `n / n`.
pub fn ecdf(samples: &[f64]) -> EmpiricalDistribution {
    let mut values = samples.to_vec();
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len() as f64;
    let fractions = (1..=values.len()).map(|rank| rank as f64 / n).collect();
    EmpiricalDistribution { values, fractions }
}

/// Scalar statistics describing one run's latency samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// `(percentile, value)` pairs for [`SUMMARY_PERCENTILES`]
    pub percentiles: Vec<(f64, f64)>,
}

impl DistributionSummary {
    /// Summarize an already sorted distribution; `None` when it is empty
    pub fn from_distribution(dist: &EmpiricalDistribution) -> Option<Self> {
        let values = dist.values();
        let (&min, &max) = (values.first()?, values.last()?);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let percentiles = SUMMARY_PERCENTILES
            .iter()
            .map(|&p| (p, percentile_sorted(values, p)))
            .collect();

        Some(Self {
            count: values.len(),
            min,
            max,
            mean,
            percentiles,
        })
    }

    /// Value recorded for percentile `p`, if it was computed
    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|(q, _)| (q - p).abs() < 0.1)
            .map(|&(_, v)| v)
    }
}

/// Percentile of sorted data with linear interpolation between ranks
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let index = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f64;
        sorted[lower] + weight * (sorted[upper] - sorted[lower])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecdf_sorts_and_ranks() {
        let dist = ecdf(&[3.0, 1.0, 2.0]);
        assert_eq!(dist.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(dist.fractions(), &[1.0 / 3.0, 2.0 / 3.0, 1.0]);
    }

    #[test]
    fn test_ecdf_empty() {
        let dist = ecdf(&[]);
        assert!(dist.values().is_empty());
        assert!(dist.fractions().is_empty());
    }

    #[test]
    fn test_ecdf_last_fraction_is_exactly_one() {
        for n in [1usize, 7, 10, 49, 1000] {
            let samples: Vec<f64> = (0..n).map(|i| (i * 37 % 11) as f64).collect();
            let dist = ecdf(&samples);
            assert_eq!(dist.len(), n);
            assert_eq!(*dist.fractions().last().unwrap(), 1.0);
            assert!(dist.fractions().windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_ecdf_preserves_ties() {
        let dist = ecdf(&[2.0, 1.0, 2.0, 2.0]);
        assert_eq!(dist.values(), &[1.0, 2.0, 2.0, 2.0]);
        assert_eq!(dist.fraction_at(2.0), 1.0);
        assert_eq!(dist.fraction_at(1.5), 0.25);
        assert_eq!(dist.fraction_at(0.5), 0.0);
    }

    #[test]
    fn test_summary() {
        let dist = ecdf(&[5.0, 1.0, 4.0, 2.0, 3.0]);
        let summary = DistributionSummary::from_distribution(&dist).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.mean, 3.0);
        assert_eq!(summary.percentile(50.0), Some(3.0));
        assert_eq!(summary.percentile(95.0), Some(4.8));
        assert!(DistributionSummary::from_distribution(&ecdf(&[])).is_none());
    }

    #[test]
    fn test_latency_unit_conversion() {
        assert_eq!(LatencyUnit::Milliseconds.from_seconds(0.002), 2.0);
        assert_eq!(LatencyUnit::Seconds.from_seconds(0.002), 0.002);
    }
}
