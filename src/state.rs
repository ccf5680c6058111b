use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::data::cache::Loader;
use crate::data::error::{DataSourceError, ViewError};
use crate::data::filter::{filter, CategoricalColumn, FilteredView, Selection};
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The filtered view and everything derived from it for one selection.
pub struct Rendered {
    pub view: FilteredView,
    pub dashboard: Dashboard,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Memoized reader; the same source is cleaned once per process.
    pub loader: Loader,

    /// Source of the active table.
    pub source: Option<PathBuf>,

    /// Cleaned table (None until a file is loaded).
    pub table: Option<Arc<Table>>,

    /// Current multi-select state.
    pub selection: Selection,

    /// Result of the last recomputation.
    pub current: Option<Result<Rendered, ViewError>>,

    /// Category colours per filter column, fixed at load time.
    pub colors: BTreeMap<CategoricalColumn, ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            loader: Loader::new(config.clean_options()),
            config,
            source: None,
            table: None,
            selection: Selection::default(),
            current: None,
            colors: BTreeMap::new(),
            status_message: None,
        }
    }

    /// Load (or fetch from cache) `path` and make it the active table.
    /// On failure the previous table stays active.
    pub fn open(&mut self, path: &Path) -> Result<(), DataSourceError> {
        let table = self.loader.load(path)?;
        self.source = Some(path.to_path_buf());
        self.set_table(table);
        Ok(())
    }

    /// Ingest a loaded table: default every filter to all observed values.
    pub fn set_table(&mut self, table: Arc<Table>) {
        self.selection = Selection::all(&table);
        self.colors = CategoricalColumn::ALL
            .iter()
            .map(|&col| (col, ColorMap::new(self.selection.get(col))))
            .collect();
        self.table = Some(table);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the view and all aggregates from scratch.
    pub fn refilter(&mut self) {
        let Some(table) = &self.table else {
            self.current = None;
            return;
        };
        self.current = Some(filter(table, &self.selection).map(|view| {
            let dashboard = Dashboard::compute(&view, &self.config);
            Rendered { view, dashboard }
        }));
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: CategoricalColumn, value: &str) {
        self.selection.toggle(column, value);
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: CategoricalColumn) {
        if let Some(table) = &self.table {
            self.selection.select_all(column, table);
            self.refilter();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: CategoricalColumn) {
        self.selection.select_none(column);
        self.refilter();
    }

    /// The current non-empty view, if any.
    pub fn view(&self) -> Option<&FilteredView> {
        match &self.current {
            Some(Ok(rendered)) => Some(&rendered.view),
            _ => None,
        }
    }

    /// `(rows, columns)` of the current view.  An empty result keeps the
    /// table's column count.
    pub fn shape(&self) -> (usize, usize) {
        let columns = self.table.as_ref().map_or(0, |t| t.columns.len());
        (self.view().map_or(0, FilteredView::len), columns)
    }

    pub fn color_for(&self, column: CategoricalColumn, label: &str) -> Option<eframe::egui::Color32> {
        self.colors.get(&column).map(|map| map.color_for(label))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture() -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").expect("temp file");
        writeln!(
            file,
            "Age,Medical Condition,Date of Admission,Discharge Date,Billing Amount,Readmission,Survived\n\
             40,Flu,01-03-2024,05-03-2024,100,No,Yes\n\
             50,Asthma,01-03-2024,03-03-2024,200,Yes,No\n\
             60,Flu,02-03-2024,03-03-2024,300,No,Yes"
        )
        .unwrap();
        file
    }

    #[test]
    fn open_applies_default_selection() {
        let file = fixture();
        let mut state = AppState::new(DashboardConfig::default());
        state.open(file.path()).unwrap();
        assert_eq!(state.view().map(FilteredView::len), Some(3));
        assert!(state.color_for(CategoricalColumn::Survived, "Yes").is_some());
    }

    #[test]
    fn deselecting_everything_reports_empty_result() {
        let file = fixture();
        let mut state = AppState::new(DashboardConfig::default());
        state.open(file.path()).unwrap();

        state.select_none(CategoricalColumn::Readmission);
        assert!(matches!(state.current, Some(Err(ViewError::EmptyResult))));
        assert!(state.view().is_none());
        // Seven source columns plus the derived Length_of_Stay.
        assert_eq!(state.shape(), (0, 8));

        state.toggle_filter_value(CategoricalColumn::Readmission, "Yes");
        assert_eq!(state.view().map(FilteredView::len), Some(1));

        state.select_all(CategoricalColumn::Readmission);
        assert_eq!(state.view().map(FilteredView::len), Some(3));
    }

    #[test]
    fn failed_open_keeps_previous_table() {
        let file = fixture();
        let mut state = AppState::new(DashboardConfig::default());
        state.open(file.path()).unwrap();
        assert!(state.open(Path::new("/missing/data.csv")).is_err());
        assert_eq!(state.table.as_ref().map(|t| t.len()), Some(3));
    }
}
