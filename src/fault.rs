//! Fault-start estimation across runs.
//!
//! Each raw-event run that tags its rows with a phase yields a candidate: the
//! second at which its first non-baseline event occurred. Runs of the same
//! experiment start injecting at roughly the same offset, so the candidates
//! are reduced to one marker by taking their (lower) median. An explicit
//! override always wins and is not checked against the detected value.

use serde::Serialize;
use tracing::debug;

/// Where the reported fault-start marker came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultStartSource {
    Override,
    Consensus,
}

/// Resolved fault-start marker, in seconds from the aligned origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaultStart {
    pub second: i64,
    pub source: FaultStartSource,
}

/// Reduces per-run candidates to a single fault-start second
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultStartEstimator {
    override_second: Option<i64>,
}

impl FaultStartEstimator {
    pub fn new(override_second: Option<i64>) -> Self {
        Self { override_second }
    }

    /// Resolve the marker for a set of candidates.
    ///
    /// The result only depends on the candidate multiset, never on its order.
    pub fn resolve(&self, candidates: &[i64]) -> Option<FaultStart> {
        if let Some(second) = self.override_second {
            debug!("Using fault-start override at {}s", second);
            return Some(FaultStart {
                second,
                source: FaultStartSource::Override,
            });
        }

        let second = median_candidate(candidates)?;
        debug!(
            "Fault-start consensus {}s from {} candidate(s)",
            second,
            candidates.len()
        );
        Some(FaultStart {
            second,
            source: FaultStartSource::Consensus,
        })
    }
}

/// Median of the sorted candidates; the lower of the two middle elements when
/// the count is even.
pub fn median_candidate(candidates: &[i64]) -> Option<i64> {
    if candidates.is_empty() {
        return None;
    }
    let mut sorted = candidates.to_vec();
    sorted.sort_unstable();
    sorted.get((sorted.len() - 1) / 2).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_of_odd_count() {
        assert_eq!(median_candidate(&[10, 20, 30]), Some(20));
        assert_eq!(median_candidate(&[30, 10, 20]), Some(20));
    }

    #[test]
    fn test_median_of_even_count() {
        assert_eq!(median_candidate(&[10, 30]), Some(10));
        assert_eq!(median_candidate(&[40, 10, 30, 20]), Some(20));
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(median_candidate(&[]), None);
        assert_eq!(FaultStartEstimator::default().resolve(&[]), None);
    }

    #[test]
    fn test_override_wins() {
        let estimator = FaultStartEstimator::new(Some(40));
        let resolved = estimator.resolve(&[10, 20, 30]).unwrap();
        assert_eq!(resolved.second, 40);
        assert_eq!(resolved.source, FaultStartSource::Override);
        assert_eq!(estimator.resolve(&[]).map(|f| f.second), Some(40));
    }

    #[test]
    fn test_order_independent() {
        let estimator = FaultStartEstimator::default();
        let a = estimator.resolve(&[4, 9, 1, 7, 7]);
        let b = estimator.resolve(&[7, 1, 7, 9, 4]);
        assert_eq!(a, b);
        assert_eq!(a.map(|f| f.source), Some(FaultStartSource::Consensus));
        assert_eq!(a.map(|f| f.second), Some(7));
    }
}
