//! # Per-Second Series
//!
//! Canonical time series and the pure transformations applied to them:
//!
//! - [`resample`]: complete a sparse series over `[min, max]` with no holes
//! - [`smooth`]: centered rolling mean or median with shrinking edge windows
//! - [`CanonicalSeries::shift_to_zero`]: move the time origin to second 0
//!
//! The two [`SeriesKind`]s have different missing-data semantics. A second
//! without activity in a count series is a true zero, while a missing latency
//! reading is unknown and gets interpolated from its neighbours.

use crate::error::{IngestError, IngestResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Longest time axis, in seconds, that [`resample`] will materialize.
///
/// About 115 days; a wider range means the time column mixes units or origins.
pub const MAX_SPAN_SECONDS: u64 = 10_000_000;

/// What the values of a series measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// Events per second; gaps are zero
    Count,
    /// Latency or another sampled metric; gaps are interpolated
    Metric,
}

impl SeriesKind {
    /// Smoothing aggregation used when none is configured
    pub fn default_smoothing(self) -> SmoothMode {
        match self {
            SeriesKind::Count => SmoothMode::Mean,
            SeriesKind::Metric => SmoothMode::Median,
        }
    }

    /// Smoothing window (seconds) used when none is configured
    pub fn default_window(self) -> usize {
        match self {
            SeriesKind::Count => crate::defaults::COUNT_WINDOW,
            SeriesKind::Metric => crate::defaults::METRIC_WINDOW,
        }
    }
}

/// Rolling aggregation applied by [`smooth`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothMode {
    Mean,
    Median,
}

impl fmt::Display for SmoothMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmoothMode::Mean => write!(f, "mean"),
            SmoothMode::Median => write!(f, "median"),
        }
    }
}

/// Sparse integer-second series as produced by the loader.
///
/// A `None` value marks a second that was present in the input but carried no
/// reading (an empty metric cell).
#[derive(Debug, Clone, PartialEq)]
pub struct SparseSeries {
    kind: SeriesKind,
    points: BTreeMap<i64, Option<f64>>,
}

impl SparseSeries {
    pub fn new(kind: SeriesKind) -> Self {
        Self {
            kind,
            points: BTreeMap::new(),
        }
    }

    /// Build a series from `(second, value)` pairs; later duplicates overwrite
    pub fn from_pairs<I>(kind: SeriesKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        let points = pairs.into_iter().map(|(t, v)| (t, Some(v))).collect();
        Self { kind, points }
    }

    pub fn insert(&mut self, second: i64, value: Option<f64>) {
        self.points.insert(second, value);
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether at least one second carries an actual reading
    pub fn has_values(&self) -> bool {
        self.points.values().any(Option::is_some)
    }

    pub fn get(&self, second: i64) -> Option<Option<f64>> {
        self.points.get(&second).copied()
    }

    /// Distance in seconds between the first and last point
    pub fn span(&self) -> Option<u64> {
        let (&first, _) = self.points.first_key_value()?;
        let (&last, _) = self.points.last_key_value()?;
        Some(last.abs_diff(first))
    }
}

/// Complete, gap-free series: one value per second over a contiguous range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalSeries {
    kind: SeriesKind,
    seconds: Vec<i64>,
    values: Vec<f64>,
}

impl CanonicalSeries {
    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub fn seconds(&self) -> &[i64] {
        &self.seconds
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First second of the range, if any
    pub fn origin(&self) -> Option<i64> {
        self.seconds.first().copied()
    }

    /// Value at an absolute second offset
    pub fn value_at(&self, second: i64) -> Option<f64> {
        let origin = self.origin()?;
        let index = usize::try_from(second.checked_sub(origin)?).ok()?;
        self.values.get(index).copied()
    }

    /// Re-base the time axis so the series starts at second 0
    pub fn shift_to_zero(self) -> Self {
        let Some(origin) = self.origin() else {
            return self;
        };
        Self {
            kind: self.kind,
            seconds: self
                .seconds
                .iter()
                .map(|s| s.saturating_sub(origin))
                .collect(),
            values: self.values,
        }
    }

    /// Convert back to sparse form, e.g. to re-run the resampler
    pub fn to_sparse(&self) -> SparseSeries {
        SparseSeries::from_pairs(
            self.kind,
            self.seconds.iter().copied().zip(self.values.iter().copied()),
        )
    }
}

/// A complete series together with its smoothed auxiliary column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothedSeries {
    #[serde(flatten)]
    series: CanonicalSeries,
    smoothed: Vec<f64>,
    window: usize,
    mode: SmoothMode,
}

impl SmoothedSeries {
    pub fn series(&self) -> &CanonicalSeries {
        &self.series
    }

    pub fn seconds(&self) -> &[i64] {
        self.series.seconds()
    }

    pub fn values(&self) -> &[f64] {
        self.series.values()
    }

    pub fn smoothed(&self) -> &[f64] {
        &self.smoothed
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn mode(&self) -> SmoothMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Re-base both columns so the series starts at second 0
    pub fn shift_to_zero(self) -> Self {
        Self {
            series: self.series.shift_to_zero(),
            ..self
        }
    }
}

/// Fill every missing second between the first and last point.
///
/// Counts fill with zero. Metric gaps are linearly interpolated between the
/// nearest known neighbours; gaps touching an edge take the nearest known
/// value. An already complete series comes back unchanged.
///
/// Returns `None` when the series holds no points, (for metrics) no readings
/// at all, or spans more than [`MAX_SPAN_SECONDS`].
pub fn resample(sparse: &SparseSeries) -> Option<CanonicalSeries> {
    if sparse.span()? > MAX_SPAN_SECONDS {
        return None;
    }
    let (&first, _) = sparse.points.first_key_value()?;
    let (&last, _) = sparse.points.last_key_value()?;

    let seconds: Vec<i64> = (first..=last).collect();
    let values = match sparse.kind {
        SeriesKind::Count => seconds
            .iter()
            .map(|s| sparse.points.get(s).copied().flatten().unwrap_or(0.0))
            .collect(),
        SeriesKind::Metric => {
            let known: Vec<(i64, f64)> = sparse
                .points
                .iter()
                .filter_map(|(&s, v)| v.map(|v| (s, v)))
                .collect();
            if known.is_empty() {
                return None;
            }
            interpolate(&known, &seconds)
        }
    };

    Some(CanonicalSeries {
        kind: sparse.kind,
        seconds,
        values,
    })
}

/// Linear interpolation of `known` (sorted by second) onto `seconds`
fn interpolate(known: &[(i64, f64)], seconds: &[i64]) -> Vec<f64> {
    let mut next = 0;
    seconds
        .iter()
        .map(|&s| {
            while next < known.len() && known[next].0 < s {
                next += 1;
            }
            match (next.checked_sub(1).map(|i| known[i]), known.get(next)) {
                (_, Some(&(t, v))) if t == s => v,
                (Some((t0, v0)), Some(&(t1, v1))) => {
                    let weight = (s - t0) as f64 / (t1 - t0) as f64;
                    v0 + weight * (v1 - v0)
                }
                (None, Some(&(_, v))) => v,
                (Some((_, v)), None) => v,
                (None, None) => 0.0,
            }
        })
        .collect()
}

/// Centered rolling aggregation with `min_periods = 1`.
///
/// For window `w` the element at `i` aggregates positions
/// `i - w/2 ..= i + (w-1)/2`, clipped to the series, so edge windows shrink
/// and every position gets a value. The unsmoothed values are kept alongside.
pub fn smooth(
    series: CanonicalSeries,
    window: usize,
    mode: SmoothMode,
) -> IngestResult<SmoothedSeries> {
    crate::utils::validate_window(window)
        .map_err(|e| IngestError::InvalidConfig(e.to_string()))?;

    let values = series.values();
    let before = window / 2;
    let after = (window - 1) / 2;
    let smoothed = (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(before);
            let end = (i + after + 1).min(values.len());
            aggregate(&values[start..end], mode)
        })
        .collect();

    Ok(SmoothedSeries {
        series,
        smoothed,
        window,
        mode,
    })
}

fn aggregate(window: &[f64], mode: SmoothMode) -> f64 {
    match mode {
        SmoothMode::Mean => window.iter().sum::<f64>() / window.len() as f64,
        SmoothMode::Median => {
            let mut sorted = window.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(i64, f64)]) -> SparseSeries {
        SparseSeries::from_pairs(SeriesKind::Count, pairs.iter().copied())
    }

    fn metrics(pairs: &[(i64, f64)]) -> SparseSeries {
        SparseSeries::from_pairs(SeriesKind::Metric, pairs.iter().copied())
    }

    #[test]
    fn test_resample_fills_count_gaps_with_zero() {
        let filled = resample(&counts(&[(0, 5.0), (2, 3.0)])).unwrap();
        assert_eq!(filled.seconds(), &[0, 1, 2]);
        assert_eq!(filled.values(), &[5.0, 0.0, 3.0]);
    }

    #[test]
    fn test_resample_is_idempotent() {
        let once = resample(&counts(&[(3, 1.0), (4, 2.0), (5, 0.0)])).unwrap();
        let twice = resample(&once.to_sparse()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.values(), &[1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_resample_interpolates_metric_gaps() {
        let filled = resample(&metrics(&[(10, 1.0), (14, 5.0)])).unwrap();
        assert_eq!(filled.seconds(), &[10, 11, 12, 13, 14]);
        assert_eq!(filled.values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_resample_extends_metric_edges_with_boundary_values() {
        let mut sparse = SparseSeries::new(SeriesKind::Metric);
        sparse.insert(0, None);
        sparse.insert(1, Some(2.0));
        sparse.insert(3, Some(4.0));
        sparse.insert(4, None);
        let filled = resample(&sparse).unwrap();
        assert_eq!(filled.values(), &[2.0, 2.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn test_resample_without_readings_yields_nothing() {
        assert!(resample(&counts(&[])).is_none());

        let mut sparse = SparseSeries::new(SeriesKind::Metric);
        sparse.insert(0, None);
        assert!(resample(&sparse).is_none());
    }

    #[test]
    fn test_resample_refuses_oversized_span() {
        let sparse = counts(&[(0, 5.0), (i64::MAX, 3.0)]);
        assert_eq!(sparse.span(), Some(i64::MAX as u64));
        assert!(resample(&sparse).is_none());

        let sparse = counts(&[(i64::MIN, 1.0), (i64::MAX, 1.0)]);
        assert_eq!(sparse.span(), Some(u64::MAX));
        assert!(resample(&sparse).is_none());
    }

    #[test]
    fn test_value_at_far_outside_range() {
        let filled = resample(&counts(&[(-5, 1.0), (-4, 2.0)])).unwrap();
        assert_eq!(filled.value_at(-4), Some(2.0));
        assert_eq!(filled.value_at(i64::MAX), None);
        assert_eq!(filled.value_at(i64::MIN), None);
    }

    #[test]
    fn test_shift_to_zero() {
        let shifted = resample(&counts(&[(100, 1.0), (102, 2.0)]))
            .unwrap()
            .shift_to_zero();
        assert_eq!(shifted.seconds(), &[0, 1, 2]);
        assert_eq!(shifted.value_at(2), Some(2.0));
        assert_eq!(shifted.value_at(3), None);
    }

    #[test]
    fn test_smooth_mean_window_three() {
        let series = resample(&counts(&[(0, 3.0), (1, 6.0), (2, 9.0), (3, 0.0)])).unwrap();
        let smoothed = smooth(series, 3, SmoothMode::Mean).unwrap();
        assert_eq!(smoothed.smoothed(), &[4.5, 6.0, 5.0, 4.5]);
        assert_eq!(smoothed.values(), &[3.0, 6.0, 9.0, 0.0]);
    }

    #[test]
    fn test_smooth_edges_always_defined() {
        let single = resample(&counts(&[(7, 2.0)])).unwrap();
        let smoothed = smooth(single, 3, SmoothMode::Mean).unwrap();
        assert_eq!(smoothed.smoothed(), &[2.0]);

        let series = resample(&metrics(&[(0, 1.0), (1, 2.0), (2, 3.0), (3, 4.0), (4, 5.0)])).unwrap();
        let smoothed = smooth(series, 3, SmoothMode::Median).unwrap();
        assert_eq!(smoothed.len(), 5);
        assert!(smoothed.smoothed().iter().all(|v| v.is_finite()));
        assert_eq!(smoothed.smoothed()[0], 1.5);
        assert_eq!(smoothed.smoothed()[4], 4.5);
    }

    #[test]
    fn test_smooth_median_ignores_spike() {
        let series = resample(&metrics(&[(0, 1.0), (1, 1.0), (2, 100.0), (3, 1.0), (4, 1.0)])).unwrap();
        let smoothed = smooth(series, 5, SmoothMode::Median).unwrap();
        assert_eq!(smoothed.smoothed()[2], 1.0);
    }

    #[test]
    fn test_smooth_even_window_leans_left() {
        let series = resample(&counts(&[(0, 1.0), (1, 2.0), (2, 3.0), (3, 4.0)])).unwrap();
        let smoothed = smooth(series, 4, SmoothMode::Mean).unwrap();
        // position 2 covers seconds 0..=3
        assert_eq!(smoothed.smoothed()[2], 2.5);
        // position 0 covers seconds 0..=1
        assert_eq!(smoothed.smoothed()[0], 1.5);
    }

    #[test]
    fn test_smooth_rejects_zero_window() {
        let series = resample(&counts(&[(0, 1.0)])).unwrap();
        assert!(matches!(
            smooth(series, 0, SmoothMode::Mean),
            Err(IngestError::InvalidConfig(_))
        ));
    }
}
