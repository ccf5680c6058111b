//! Aggregates over a non-empty [`FilteredView`].
//!
//! Everything here is a pure function of the view and is recomputed from
//! scratch after every filter change.

use std::collections::BTreeMap;
use std::ops::Range;

use super::error::ChartError;
use super::filter::FilteredView;
use super::model::{Value, BILLING_AMOUNT, LENGTH_OF_STAY, MEDICAL_CONDITION, SURVIVED};

// ---------------------------------------------------------------------------
// Column access
// ---------------------------------------------------------------------------

fn column_index(view: &FilteredView, column: &str) -> Result<usize, ChartError> {
    view.table()
        .column_index(column)
        .ok_or_else(|| ChartError::MissingColumn(column.to_string()))
}

/// Non-null numeric values of `column` within the view.
pub fn numeric_values(view: &FilteredView, column: &str) -> Result<Vec<f64>, ChartError> {
    let idx = column_index(view, column)?;
    Ok(view
        .records()
        .filter_map(|r| r.get(idx).as_f64())
        .collect())
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Key metrics
// ---------------------------------------------------------------------------

/// The four headline numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMetrics {
    pub count: usize,
    /// Mean billing; `None` when every billing value is null.
    pub avg_billing: Option<f64>,
    /// Mean stay ignoring nulls; `None` when every stay is null.
    pub avg_length_of_stay: Option<f64>,
    /// Percentage of records whose `Survived` is "yes" (any case).
    pub survival_rate: f64,
}

pub fn key_metrics(view: &FilteredView) -> KeyMetrics {
    let count = view.len();
    let avg_billing = numeric_values(view, BILLING_AMOUNT)
        .ok()
        .and_then(|v| mean(&v));
    let avg_length_of_stay = numeric_values(view, LENGTH_OF_STAY)
        .ok()
        .and_then(|v| mean(&v));

    let survived = view
        .table()
        .column_index(SURVIVED)
        .map_or(0, |idx| {
            view.records()
                .filter(|r| {
                    r.get(idx)
                        .as_str()
                        .is_some_and(|s| s.eq_ignore_ascii_case("yes"))
                })
                .count()
        });
    let survival_rate = if count == 0 {
        0.0
    } else {
        survived as f64 / count as f64 * 100.0
    };

    KeyMetrics {
        count,
        avg_billing,
        avg_length_of_stay,
        survival_rate,
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Mean `Length_of_Stay` per medical condition present in the view, sorted
/// by condition.  A condition whose stays are all null maps to `None`.
pub fn avg_length_of_stay_by_condition(
    view: &FilteredView,
) -> Result<Vec<(String, Option<f64>)>, ChartError> {
    let cond_idx = column_index(view, MEDICAL_CONDITION)?;
    let los_idx = column_index(view, LENGTH_OF_STAY)?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for record in view.records() {
        let Some(condition) = record.get(cond_idx).as_str() else {
            continue;
        };
        let stays = groups.entry(condition.to_string()).or_default();
        if let Some(los) = record.get(los_idx).as_f64() {
            stays.push(los);
        }
    }
    Ok(groups
        .into_iter()
        .map(|(condition, stays)| (condition, mean(&stays)))
        .collect())
}

/// Occurrences of each distinct non-null value of `column`, most frequent
/// first (ties broken by value).
pub fn value_counts(view: &FilteredView, column: &str) -> Result<Vec<(String, usize)>, ChartError> {
    let idx = column_index(view, column)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in view.records() {
        match record.get(idx) {
            Value::Null => {}
            Value::String(s) => *counts.entry(s.clone()).or_insert(0) += 1,
            other => *counts.entry(other.to_string()).or_insert(0) += 1,
        }
    }
    if counts.is_empty() {
        return Err(ChartError::NoValues(column.to_string()));
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(counts)
}

// ---------------------------------------------------------------------------
// Describe
// ---------------------------------------------------------------------------

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub mean: f64,
    /// Sample standard deviation; `None` for a single value.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// `None` if `values` is empty.
    pub fn new(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let std = (sorted.len() > 1).then(|| {
            let ss = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (n - 1.0)).sqrt()
        });
        Some(Self {
            mean,
            std,
            min,
            q25: percentile(sorted, 25.0),
            median: percentile(sorted, 50.0),
            q75: percentile(sorted, 75.0),
            max,
        })
    }
}

/// Percentile with linear interpolation between closest ranks.
/// Returns `NaN` for empty input.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = (sorted.len() - 1) as f64 * pct / 100.0;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// One row of the describe table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    /// Non-null values in the view.
    pub count: usize,
    /// `None` when the column is entirely null within the view.
    pub stats: Option<DescriptiveStats>,
}

/// Summary for every numeric column of the table, in column order.
pub fn describe(view: &FilteredView) -> Vec<ColumnSummary> {
    let table = view.table();
    (0..table.columns.len())
        .filter(|&idx| table.is_numeric_column(idx))
        .map(|idx| {
            let values: Vec<f64> = view.records().filter_map(|r| r.get(idx).as_f64()).collect();
            ColumnSummary {
                column: table.columns[idx].clone(),
                count: values.len(),
                stats: DescriptiveStats::new(&values),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Fixed-width histogram over the data range with a kernel density curve
/// scaled to counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    /// `(x, expected count)` points; empty when the data has no spread.
    pub density: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// Inclusive start, exclusive end (the last bin includes its end).
    pub range: Range<f64>,
    pub count: usize,
}

const DENSITY_POINTS: usize = 100;

impl Histogram {
    /// `None` if `values` is empty or `num_bins` is zero.
    pub fn new(values: &[f64], num_bins: usize) -> Option<Self> {
        if values.is_empty() || num_bins == 0 {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Data concentrated at a single value: one unit-wide bin around it.
        let (start, width, num_bins) = if max - min < f64::EPSILON {
            (min - 0.5, 1.0, 1)
        } else {
            (min, (max - min) / num_bins as f64, num_bins)
        };

        let mut bins: Vec<HistogramBin> = (0..num_bins)
            .map(|i| HistogramBin {
                range: start + i as f64 * width..start + (i + 1) as f64 * width,
                count: 0,
            })
            .collect();
        for &v in values {
            let idx = (((v - start) / width) as usize).min(num_bins - 1);
            bins[idx].count += 1;
        }

        let density = kernel_density(values, min, max)
            .into_iter()
            .map(|[x, d]| [x, d * values.len() as f64 * width])
            .collect();

        Some(Self { bins, density })
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Gaussian KDE with Scott's bandwidth, evaluated across `[min, max]`.
fn kernel_density(values: &[f64], min: f64, max: f64) -> Vec<[f64; 2]> {
    let n = values.len() as f64;
    let Some(std) = DescriptiveStats::new(values).and_then(|s| s.std) else {
        return Vec::new();
    };
    let bandwidth = std * n.powf(-0.2);
    if bandwidth <= 0.0 || max - min < f64::EPSILON {
        return Vec::new();
    }
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let step = (max - min) / (DENSITY_POINTS - 1) as f64;
    (0..DENSITY_POINTS)
        .map(|i| {
            let x = min + i as f64 * step;
            let d = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            [x, d]
        })
        .collect()
}

/// Histogram of a numeric column within the view.
pub fn histogram(view: &FilteredView, column: &str, num_bins: usize) -> Result<Histogram, ChartError> {
    let values = numeric_values(view, column)?;
    Histogram::new(&values, num_bins).ok_or_else(|| ChartError::NoValues(column.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
