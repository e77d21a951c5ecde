//! # Series Loader
//!
//! Reads one run from disk and converts it into a canonical, still sparse,
//! per-second series. Four input shapes are recognized by file extension and
//! header inspection:
//!
//! | Shape | Recognized by | Produces |
//! |---|---|---|
//! | [`InputShape::PerOperation`] | `seconds` column | per-operation latency samples |
//! | [`InputShape::RawEvents`] | `timestamp_ms` column | per-second counts (or mean latency) + fault-start candidate |
//! | [`InputShape::PerSecond`] | a time column (`t_sec`, `sec`, `time`, `second`) | the per-second values as recorded |
//! | [`InputShape::PlainLog`] | any non-`.csv` file | per-second counts of `<timestamp>,...` lines |
//!
//! Every shape goes through the same entry point, [`SeriesLoader::load`], and
//! comes back as a [`LoadedRun`].

use crate::distribution::LatencyUnit;
use crate::error::{IngestError, IngestResult};
use crate::label::RunLabel;
use crate::series::{SeriesKind, SparseSeries};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Accepted names for the time column of pre-aggregated files, in priority order
pub const TIME_COLUMNS: [&str; 4] = ["t_sec", "sec", "time", "second"];

/// Accepted names for per-second count columns, in priority order
pub const COUNT_COLUMNS: [&str; 3] = ["ops", "throughput", "qps"];

/// Accepted names for per-second latency columns, in priority order
pub const METRIC_COLUMNS: [&str; 5] = ["p50_ms", "median_ms", "latency_ms", "avg_ms", "mean_ms"];

const TIMESTAMP_COLUMN: &str = "timestamp_ms";
const PHASE_COLUMN: &str = "phase";
const LATENCY_COLUMN: &str = "latency_ms";
const SECONDS_COLUMN: &str = "seconds";
const OP_COLUMN: &str = "op";
const BASELINE_PHASE: &str = "baseline";

/// Input encodings understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputShape {
    PerOperation,
    RawEvents,
    PerSecond,
    PlainLog,
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputShape::PerOperation => write!(f, "per-operation samples"),
            InputShape::RawEvents => write!(f, "raw timestamped events"),
            InputShape::PerSecond => write!(f, "per-second values"),
            InputShape::PlainLog => write!(f, "plain timestamp log"),
        }
    }
}

/// Shapes a `.csv` file can have, decided by its header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvShape {
    PerOperation,
    RawEvents,
    PerSecond,
}

impl From<CsvShape> for InputShape {
    fn from(shape: CsvShape) -> Self {
        match shape {
            CsvShape::PerOperation => InputShape::PerOperation,
            CsvShape::RawEvents => InputShape::RawEvents,
            CsvShape::PerSecond => InputShape::PerSecond,
        }
    }
}

/// Per-operation latency samples, in the loader's configured unit
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSamples {
    pub ops: Vec<i64>,
    pub latencies: Vec<f64>,
}

/// What a run's file contained once parsed
#[derive(Debug, Clone, PartialEq)]
pub enum RunPayload {
    /// Values keyed by integer second offset
    Series(SparseSeries),
    /// Individual operation latencies with no time axis
    Samples(OperationSamples),
}

/// One parsed run
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRun {
    pub path: PathBuf,
    pub label: RunLabel,
    pub shape: InputShape,
    pub payload: RunPayload,
    /// Second offset of the first non-baseline event, when phases are tagged
    pub fault_start: Option<i64>,
}

impl LoadedRun {
    /// View the run as a sparse series.
    ///
    /// Per-operation samples become a metric series indexed by operation
    /// number, which is the latency-per-operation view of the run.
    pub fn into_series(self) -> SparseSeries {
        match self.payload {
            RunPayload::Series(series) => series,
            RunPayload::Samples(samples) => SparseSeries::from_pairs(
                SeriesKind::Metric,
                samples.ops.into_iter().zip(samples.latencies),
            ),
        }
    }
}

/// Options that influence how files are interpreted
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Kind preferred when a file could be read either way (per-second value
    /// columns, raw events with latencies)
    pub preferred_kind: SeriesKind,
    /// Unit for per-operation latency samples (recorded in seconds)
    pub latency_unit: LatencyUnit,
    /// File-name prefixes stripped before label normalization
    pub label_prefixes: Vec<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            preferred_kind: SeriesKind::Count,
            latency_unit: LatencyUnit::Milliseconds,
            label_prefixes: crate::defaults::label_prefixes(),
        }
    }
}

/// Loads runs of any supported shape
#[derive(Debug, Clone, Default)]
pub struct SeriesLoader {
    options: LoaderOptions,
}

impl SeriesLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Parse one file into a [`LoadedRun`].
    ///
    /// The whole file is read before anything is returned; a malformed file
    /// produces an error and no partial result.
    pub fn load(&self, path: &Path) -> IngestResult<LoadedRun> {
        let label = RunLabel::from_path(path, &self.options.label_prefixes);

        let (shape, payload, fault_start) = if is_csv(path) {
            let table = Table::read(path)?;
            let shape = detect_csv_shape(path, &table.headers)?;
            debug!("{}: detected {}", path.display(), InputShape::from(shape));
            let (payload, fault_start) = match shape {
                CsvShape::PerOperation => (self.parse_per_operation(path, &table)?, None),
                CsvShape::RawEvents => self.parse_raw_events(path, &table)?,
                CsvShape::PerSecond => (self.parse_per_second(path, &table)?, None),
            };
            (InputShape::from(shape), payload, fault_start)
        } else {
            debug!("{}: reading as {}", path.display(), InputShape::PlainLog);
            (InputShape::PlainLog, parse_plain_log(path)?, None)
        };

        Ok(LoadedRun {
            path: path.to_path_buf(),
            label,
            shape,
            payload,
            fault_start,
        })
    }

    fn parse_per_operation(&self, path: &Path, table: &Table) -> IngestResult<RunPayload> {
        let seconds_col = table.require(path, SECONDS_COLUMN)?;
        let op_col = table.column(OP_COLUMN);

        let mut ops = Vec::new();
        let mut latencies = Vec::new();
        for (index, row) in table.rows.iter().enumerate() {
            let Some(seconds) = row.f64(path, seconds_col, SECONDS_COLUMN)? else {
                continue;
            };
            let op = match op_col {
                Some(col) => row.i64(path, col, OP_COLUMN)?,
                None => None,
            };
            ops.push(op.unwrap_or(index as i64));
            latencies.push(self.options.latency_unit.from_seconds(seconds));
        }

        if latencies.is_empty() {
            return Err(empty_data(path));
        }
        Ok(RunPayload::Samples(OperationSamples { ops, latencies }))
    }

    fn parse_raw_events(
        &self,
        path: &Path,
        table: &Table,
    ) -> IngestResult<(RunPayload, Option<i64>)> {
        let ts_col = table.require(path, TIMESTAMP_COLUMN)?;
        let phase_col = table.column(PHASE_COLUMN);
        let latency_col = match self.options.preferred_kind {
            SeriesKind::Metric => Some(table.require(path, LATENCY_COLUMN)?),
            SeriesKind::Count => None,
        };

        let mut events = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let Some(ts) = row.i64(path, ts_col, TIMESTAMP_COLUMN)? else {
                continue;
            };
            // rows without a phase count as outside the baseline
            let in_fault = phase_col.map_or(false, |col| row.cell(col) != BASELINE_PHASE);
            let latency = match latency_col {
                Some(col) => row.f64(path, col, LATENCY_COLUMN)?,
                None => None,
            };
            events.push((ts, in_fault, latency));
        }

        let Some(t0) = events.iter().map(|&(ts, _, _)| ts).min() else {
            return Err(empty_data(path));
        };
        let second_of = |ts: i64| second_offset(ts, t0);

        let series = match latency_col {
            None => bucket_counts(events.iter().map(|&(ts, _, _)| ts), t0),
            Some(_) => {
                let mut sums: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
                for &(ts, _, latency) in &events {
                    let entry = sums.entry(second_of(ts)).or_insert((0.0, 0));
                    if let Some(value) = latency {
                        entry.0 += value;
                        entry.1 += 1;
                    }
                }
                let mut series = SparseSeries::new(SeriesKind::Metric);
                for (second, (sum, n)) in sums {
                    series.insert(second, (n > 0).then(|| sum / n as f64));
                }
                if !series.has_values() {
                    return Err(empty_data(path));
                }
                series
            }
        };

        let fault_start = if phase_col.is_some() {
            events
                .iter()
                .filter(|&&(_, in_fault, _)| in_fault)
                .map(|&(ts, _, _)| ts)
                .min()
                .map(second_of)
        } else {
            None
        };

        Ok((RunPayload::Series(series), fault_start))
    }

    fn parse_per_second(&self, path: &Path, table: &Table) -> IngestResult<RunPayload> {
        let Some((time_col, time_name)) = table.first_of(&TIME_COLUMNS) else {
            return Err(IngestError::schema(path, &[&TIME_COLUMNS.join("/")]));
        };

        let (value_col, kind) = self.pick_value_column(table).ok_or_else(|| {
            IngestError::schema(
                path,
                &[&COUNT_COLUMNS.join("/"), &METRIC_COLUMNS.join("/")],
            )
        })?;
        let value_name = table.headers.get(value_col).unwrap_or_default().to_string();

        let mut merged: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
        for row in &table.rows {
            let Some(second) = row.i64(path, time_col, time_name)? else {
                continue;
            };
            let value = row.f64(path, value_col, &value_name)?;
            let entry = merged.entry(second).or_insert((0.0, 0));
            match (kind, value) {
                (SeriesKind::Count, v) => {
                    entry.0 += v.unwrap_or(0.0);
                    entry.1 += 1;
                }
                (SeriesKind::Metric, Some(v)) => {
                    entry.0 += v;
                    entry.1 += 1;
                }
                (SeriesKind::Metric, None) => {}
            }
        }

        let mut series = SparseSeries::new(kind);
        for (second, (sum, n)) in merged {
            let value = match kind {
                SeriesKind::Count => Some(sum),
                // duplicate metric readings for one second are averaged
                SeriesKind::Metric => (n > 0).then(|| sum / n as f64),
            };
            series.insert(second, value);
        }

        if !series.has_values() {
            return Err(empty_data(path));
        }
        Ok(RunPayload::Series(series))
    }

    /// Value column and the kind it implies.
    ///
    /// Aliases of the preferred kind are searched first. A file with exactly
    /// two columns falls back to the non-time column, read as the preferred
    /// kind.
    fn pick_value_column(&self, table: &Table) -> Option<(usize, SeriesKind)> {
        let counts = (&COUNT_COLUMNS[..], SeriesKind::Count);
        let metrics = (&METRIC_COLUMNS[..], SeriesKind::Metric);
        let order = match self.options.preferred_kind {
            SeriesKind::Count => [counts, metrics],
            SeriesKind::Metric => [metrics, counts],
        };

        for (aliases, kind) in order {
            if let Some((col, _)) = table.first_of(aliases) {
                return Some((col, kind));
            }
        }

        if table.headers.len() == 2 {
            let (time_col, _) = table.first_of(&TIME_COLUMNS)?;
            return Some((1 - time_col, self.options.preferred_kind));
        }
        None
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
}

fn empty_data(path: &Path) -> IngestError {
    IngestError::EmptyData {
        path: path.to_path_buf(),
    }
}

/// Pick the shape of a CSV file from its header row
pub fn detect_csv_shape(path: &Path, headers: &StringRecord) -> IngestResult<CsvShape> {
    let has = |name: &str| headers.iter().any(|h| h == name);

    if has(TIMESTAMP_COLUMN) {
        Ok(CsvShape::RawEvents)
    } else if has(SECONDS_COLUMN) {
        Ok(CsvShape::PerOperation)
    } else if TIME_COLUMNS.iter().any(|c| has(c)) {
        Ok(CsvShape::PerSecond)
    } else {
        Err(IngestError::schema(
            path,
            &[TIMESTAMP_COLUMN, SECONDS_COLUMN, &TIME_COLUMNS.join("/")],
        ))
    }
}

/// Whole seconds from `t0` to `ts`; `t0` must not be later than `ts`.
///
/// Computed on the unsigned distance so that timestamps at opposite ends of
/// the `i64` range cannot overflow. The result is at most `u64::MAX / 1000`,
/// which always fits in an `i64`.
fn second_offset(ts: i64, t0: i64) -> i64 {
    let seconds = ts.abs_diff(t0) / 1000;
    i64::try_from(seconds).unwrap_or(i64::MAX)
}

/// Count events per second, with seconds measured from `t0`
fn bucket_counts<I>(timestamps: I, t0: i64) -> SparseSeries
where
    I: IntoIterator<Item = i64>,
{
    let mut counts: BTreeMap<i64, f64> = BTreeMap::new();
    for ts in timestamps {
        *counts.entry(second_offset(ts, t0)).or_insert(0.0) += 1.0;
    }
    SparseSeries::from_pairs(SeriesKind::Count, counts)
}

/// Parse a log whose lines start with an integer millisecond timestamp
/// followed by a comma. Other lines are ignored.
fn parse_plain_log(path: &Path) -> IngestResult<RunPayload> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let timestamps: Vec<i64> = content
        .lines()
        .filter(|line| line.contains(','))
        .filter_map(|line| {
            let first = line.split(',').next()?.trim();
            if first.is_empty() || !first.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            first.parse().ok()
        })
        .collect();

    let Some(&t0) = timestamps.iter().min() else {
        return Err(empty_data(path));
    };
    Ok(RunPayload::Series(bucket_counts(timestamps, t0)))
}

/// Fully materialized CSV file
struct Table {
    headers: StringRecord,
    rows: Vec<Row>,
}

struct Row {
    record: StringRecord,
    line: u64,
}

impl Table {
    fn read(path: &Path) -> IngestResult<Self> {
        let csv_err = |source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;

        let headers = reader.headers().map_err(csv_err)?.clone();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let line = record.position().map_or(0, |p| p.line());
            rows.push(Row { record, line });
        }
        Ok(Self { headers, rows })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require(&self, path: &Path, name: &str) -> IngestResult<usize> {
        self.column(name)
            .ok_or_else(|| IngestError::schema(path, &[name]))
    }

    /// First alias present in the header row, with its name
    fn first_of<'a>(&self, aliases: &[&'a str]) -> Option<(usize, &'a str)> {
        aliases
            .iter()
            .find_map(|&alias| self.column(alias).map(|col| (col, alias)))
    }
}

impl Row {
    fn cell(&self, col: usize) -> &str {
        self.record.get(col).unwrap_or("")
    }

    fn invalid(&self, path: &Path, column: &str, value: &str) -> IngestError {
        IngestError::InvalidValue {
            path: path.to_path_buf(),
            line: self.line,
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    /// Float cell; empty and NaN cells read as missing
    fn f64(&self, path: &Path, col: usize, name: &str) -> IngestResult<Option<f64>> {
        let cell = self.cell(col);
        if cell.is_empty() {
            return Ok(None);
        }
        let value: f64 = cell.parse().map_err(|_| self.invalid(path, name, cell))?;
        Ok((!value.is_nan()).then_some(value))
    }

    /// Integer cell; fractional values are truncated, empty cells read as missing
    fn i64(&self, path: &Path, col: usize, name: &str) -> IngestResult<Option<i64>> {
        let cell = self.cell(col);
        if cell.is_empty() {
            return Ok(None);
        }
        if let Ok(value) = cell.parse::<i64>() {
            return Ok(Some(value));
        }
        match cell.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value.trunc() as i64)),
            Ok(_) => Ok(None),
            Err(_) => Err(self.invalid(path, name, cell)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn series_of(run: LoadedRun) -> Vec<(i64, Option<f64>)> {
        let series = run.into_series();
        let resampled = crate::series::resample(&series).unwrap();
        resampled
            .seconds()
            .iter()
            .map(|&s| (s, series.get(s).flatten()))
            .collect()
    }

    #[test]
    fn test_detect_shapes() {
        let path = Path::new("x.csv");
        let detect = |cols: &[&str]| detect_csv_shape(path, &StringRecord::from(cols.to_vec()));
        assert_eq!(detect(&["op", "seconds"]).unwrap(), CsvShape::PerOperation);
        assert_eq!(
            detect(&["timestamp_ms", "latency_ms", "phase"]).unwrap(),
            CsvShape::RawEvents
        );
        assert_eq!(detect(&["sec", "ops"]).unwrap(), CsvShape::PerSecond);
        assert_eq!(detect(&["time", "whatever"]).unwrap(), CsvShape::PerSecond);
        assert_eq!(
            InputShape::from(CsvShape::PerSecond),
            InputShape::PerSecond
        );

        let err = detect(&["a", "b"]).unwrap_err();
        match err {
            IngestError::Schema { columns, .. } => {
                assert!(columns.contains(&"timestamp_ms".to_string()));
                assert!(columns.contains(&"seconds".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_raw_events_bucketing_and_fault_start() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "latency_data_fs-delay-100ms.csv",
            "timestamp_ms,latency_ms,phase\n\
             10000,1.0,baseline\n\
             10500,1.0,baseline\n\
             11200,1.0,baseline\n\
             13999,5.0,fault\n\
             14000,5.0,fault\n",
        );
        let run = SeriesLoader::default().load(&path).unwrap();
        assert_eq!(run.shape, InputShape::RawEvents);
        assert_eq!(run.label.as_str(), "100 ms");
        assert_eq!(run.fault_start, Some(3));
        assert_eq!(
            series_of(run),
            vec![(0, Some(2.0)), (1, Some(1.0)), (2, None), (3, Some(1.0)), (4, Some(1.0))]
        );
    }

    #[test]
    fn test_raw_events_without_phase_have_no_candidate() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "latency_data_a.csv", "timestamp_ms\n5000\n5001\n");
        let run = SeriesLoader::default().load(&path).unwrap();
        assert_eq!(run.fault_start, None);
    }

    #[test]
    fn test_raw_events_all_baseline_have_no_candidate() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "latency_data_d.csv",
            "timestamp_ms,phase\n1000,baseline\n2500,baseline\n4000,baseline\n",
        );
        let run = SeriesLoader::default().load(&path).unwrap();
        assert_eq!(run.fault_start, None);
    }

    #[test]
    fn test_raw_events_empty_phase_counts_as_fault() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "latency_data_e.csv",
            "timestamp_ms,phase\n1000,baseline\n2000,baseline\n3500,\n6000,fault\n",
        );
        let run = SeriesLoader::default().load(&path).unwrap();
        assert_eq!(run.fault_start, Some(2));
    }

    #[test]
    fn test_raw_events_extreme_timestamps_do_not_overflow() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "latency_data_f.csv",
            "timestamp_ms,phase\n-9223372036854775808,baseline\n9223372036854775807,fault\n",
        );
        let run = SeriesLoader::default().load(&path).unwrap();
        let last = (u64::MAX / 1000) as i64;
        assert_eq!(run.fault_start, Some(last));
        let series = run.into_series();
        assert_eq!(series.get(0), Some(Some(1.0)));
        assert_eq!(series.get(last), Some(Some(1.0)));
        assert_eq!(series.span(), Some(u64::MAX / 1000));
    }

    #[test]
    fn test_raw_events_latency_mode() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "latency_data_b.csv",
            "timestamp_ms,latency_ms\n0,2.0\n500,4.0\n1500,9.0\n",
        );
        let loader = SeriesLoader::new(LoaderOptions {
            preferred_kind: SeriesKind::Metric,
            ..Default::default()
        });
        let series = loader.load(&path).unwrap().into_series();
        assert_eq!(series.kind(), SeriesKind::Metric);
        assert_eq!(series.get(0), Some(Some(3.0)));
        assert_eq!(series.get(1), Some(Some(9.0)));

        let no_latency = write(&dir, "latency_data_c.csv", "timestamp_ms\n0\n");
        assert!(matches!(
            loader.load(&no_latency),
            Err(IngestError::Schema { .. })
        ));
    }

    #[test]
    fn test_per_second_aliases_and_fallback() {
        let dir = TempDir::new().unwrap();
        let loader = SeriesLoader::default();

        let aliased = write(&dir, "throughput_per_sec_1ms.csv", "t_sec,qps,extra\n0,10,x\n2,30,y\n");
        let series = loader.load(&aliased).unwrap().into_series();
        assert_eq!(series.kind(), SeriesKind::Count);
        assert_eq!(series.get(2), Some(Some(30.0)));

        let positional = write(&dir, "latency_per_sec_5us.csv", "second,value\n4,1.5\n5,2.5\n");
        let run = loader.load(&positional).unwrap();
        assert_eq!(run.label.as_str(), "0.005 ms");
        let series = run.into_series();
        assert_eq!(series.get(5), Some(Some(2.5)));

        let metric = write(&dir, "latency_per_sec_1s.csv", "sec,p50_ms,ops\n0,1.0,10\n");
        let series = SeriesLoader::new(LoaderOptions {
            preferred_kind: SeriesKind::Metric,
            ..Default::default()
        })
        .load(&metric)
        .unwrap()
        .into_series();
        assert_eq!(series.kind(), SeriesKind::Metric);
        assert_eq!(series.get(0), Some(Some(1.0)));
    }

    #[test]
    fn test_per_second_missing_value_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "latency_per_sec_x.csv", "sec,a,b\n0,1,2\n");
        let err = SeriesLoader::default().load(&path).unwrap_err();
        assert!(err.to_string().contains("ops/throughput/qps"));
    }

    #[test]
    fn test_per_second_duplicates_are_merged() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "c.csv", "sec,ops\n0,1\n0,2\n1,4\n");
        let series = SeriesLoader::default().load(&path).unwrap().into_series();
        assert_eq!(series.get(0), Some(Some(3.0)));
    }

    #[test]
    fn test_per_operation_samples() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "per_op_latency_1000us.csv",
            "op,seconds\n0,0.001\n1,\n2,0.003\n",
        );
        let run = SeriesLoader::default().load(&path).unwrap();
        assert_eq!(run.label.as_str(), "1 ms");
        match &run.payload {
            RunPayload::Samples(samples) => {
                assert_eq!(samples.ops, vec![0, 2]);
                assert_eq!(samples.latencies, vec![1.0, 3.0]);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_cell_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.csv", "sec,ops\n0,1\n1,lots\n");
        match SeriesLoader::default().load(&path).unwrap_err() {
            IngestError::InvalidValue {
                line,
                column,
                value,
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "ops");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_plain_log() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "latency_x100ms.log",
            "header line\n1000,ok\n1999,ok\nabc,skip\n 3000 ,ok\n-5,skip\n",
        );
        let run = SeriesLoader::default().load(&path).unwrap();
        assert_eq!(run.shape, InputShape::PlainLog);
        assert_eq!(run.label.as_str(), "100 ms");
        assert_eq!(run.fault_start, None);
        assert_eq!(
            series_of(run),
            vec![(0, Some(2.0)), (1, None), (2, Some(1.0))]
        );
    }

    #[test]
    fn test_empty_inputs() {
        let dir = TempDir::new().unwrap();
        let log = write(&dir, "empty.log", "no timestamps here\n");
        assert!(matches!(
            SeriesLoader::default().load(&log),
            Err(IngestError::EmptyData { .. })
        ));

        let csv = write(&dir, "empty.csv", "timestamp_ms,phase\n");
        assert!(matches!(
            SeriesLoader::default().load(&csv),
            Err(IngestError::EmptyData { .. })
        ));
    }
}
