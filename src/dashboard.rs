use crate::config::DashboardConfig;
use crate::data::error::ChartError;
use crate::data::filter::FilteredView;
use crate::data::model::{AGE, BILLING_AMOUNT, LENGTH_OF_STAY, READMISSION, SURVIVED};
use crate::data::stats::{self, ColumnSummary, Histogram, KeyMetrics};

/// Columns drawn as distributions, with their chart titles.
pub const DISTRIBUTION_COLUMNS: [(&str, &str); 3] = [
    (AGE, "Age"),
    (BILLING_AMOUNT, "Billing Amount"),
    (LENGTH_OF_STAY, "Length of Stay"),
];

pub type ChartResult<T> = Result<T, ChartError>;

/// One titled distribution chart.
#[derive(Debug, Clone)]
pub struct Distribution {
    pub title: &'static str,
    pub histogram: ChartResult<Histogram>,
}

// ---------------------------------------------------------------------------
// Dashboard – everything rendered for one filter selection
// ---------------------------------------------------------------------------

/// All views derived from one non-empty [`FilteredView`].
///
/// Each chart carries its own `Result`; a failing chart never prevents the
/// others from being computed.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// `(rows, columns)` of the view.
    pub shape: (usize, usize),
    pub columns: Vec<String>,
    /// First rows of the view, already formatted.
    pub preview: Vec<Vec<String>>,
    pub summary: Vec<ColumnSummary>,
    pub metrics: KeyMetrics,
    pub distributions: Vec<Distribution>,
    pub stay_by_condition: ChartResult<Vec<(String, Option<f64>)>>,
    pub survival_counts: ChartResult<Vec<(String, usize)>>,
    pub readmission_counts: ChartResult<Vec<(String, usize)>>,
}

impl Dashboard {
    pub fn compute(view: &FilteredView, config: &DashboardConfig) -> Self {
        let table = view.table();
        let preview = view
            .records()
            .take(config.preview_rows)
            .map(|r| r.values.iter().map(ToString::to_string).collect())
            .collect();

        let distributions = DISTRIBUTION_COLUMNS
            .iter()
            .map(|&(column, title)| Distribution {
                title,
                histogram: stats::histogram(view, column, config.histogram_bins),
            })
            .collect();

        let dashboard = Self {
            shape: (view.len(), table.columns.len()),
            columns: table.columns.clone(),
            preview,
            summary: stats::describe(view),
            metrics: stats::key_metrics(view),
            distributions,
            stay_by_condition: stats::avg_length_of_stay_by_condition(view),
            survival_counts: stats::value_counts(view, SURVIVED),
            readmission_counts: stats::value_counts(view, READMISSION),
        };
        for (name, error) in dashboard.failures() {
            log::warn!("{name} unavailable: {error}");
        }
        dashboard
    }

    /// Every chart that failed, with the chart it belongs to.
    pub fn failures(&self) -> Vec<(&str, &ChartError)> {
        let mut failures: Vec<(&str, &ChartError)> = self
            .distributions
            .iter()
            .filter_map(|d| d.histogram.as_ref().err().map(|e| (d.title, e)))
            .collect();
        if let Err(e) = &self.stay_by_condition {
            failures.push(("Average Length of Stay by Condition", e));
        }
        if let Err(e) = &self.survival_counts {
            failures.push(("Survival Distribution", e));
        }
        if let Err(e) = &self.readmission_counts {
            failures.push(("Readmission Distribution", e));
        }
        failures
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::clean::{clean, CleanOptions};
    use crate::data::filter::{filter, Selection};
    use crate::data::loader::read_csv_from;
    use std::sync::Arc;

    fn dashboard(csv: &str) -> Dashboard {
        let raw = read_csv_from(csv.as_bytes()).unwrap();
        let table = Arc::new(clean(raw, &CleanOptions::default()).unwrap());
        let view = filter(&table, &Selection::all(&table)).unwrap();
        Dashboard::compute(&view, &DashboardConfig::default())
    }

    #[test]
    fn all_views_present() {
        let d = dashboard(
            "Age,Medical Condition,Date of Admission,Discharge Date,Billing Amount,Readmission,Survived\n\
             40,Flu,01-03-2024,05-03-2024,100,No,Yes\n\
             50,Flu,01-03-2024,03-03-2024,200,Yes,Yes\n\
             60,Asthma,01-03-2024,02-03-2024,300,No,Yes\n\
             70,Asthma,01-03-2024,09-03-2024,400,No,No\n",
        );
        assert_eq!(d.shape, (4, 8));
        assert_eq!(d.preview.len(), 4);
        assert_eq!(d.preview[0][2], "2024-03-01");
        assert!(d.failures().is_empty());
        assert_eq!(d.metrics.survival_rate, 75.0);
        assert_eq!(d.survival_counts.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn missing_age_only_fails_its_own_chart() {
        let d = dashboard(
            "Medical Condition,Date of Admission,Discharge Date,Billing Amount,Readmission,Survived\n\
             Flu,01-03-2024,05-03-2024,100,No,Yes\n\
             Asthma,01-03-2024,,200,Yes,No\n",
        );
        let failures = d.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "Age");
        assert_eq!(failures[0].1, &ChartError::MissingColumn(AGE.into()));
        assert!(d.distributions[1].histogram.is_ok());
        assert!(d.distributions[2].histogram.is_ok());
        assert!(d.stay_by_condition.is_ok());
        assert!(d.readmission_counts.is_ok());
    }
}
