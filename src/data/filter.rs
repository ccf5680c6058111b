use std::collections::BTreeSet;
use std::sync::Arc;

use super::error::ViewError;
use super::model::{Record, Table, MEDICAL_CONDITION, READMISSION, SURVIVED};

// ---------------------------------------------------------------------------
// Filterable columns
// ---------------------------------------------------------------------------

/// The three categorical columns a user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoricalColumn {
    MedicalCondition,
    Readmission,
    Survived,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 3] = [
        CategoricalColumn::MedicalCondition,
        CategoricalColumn::Readmission,
        CategoricalColumn::Survived,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalColumn::MedicalCondition => MEDICAL_CONDITION,
            CategoricalColumn::Readmission => READMISSION,
            CategoricalColumn::Survived => SURVIVED,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoricalColumn::MedicalCondition => "Medical Condition",
            CategoricalColumn::Readmission => "Readmission",
            CategoricalColumn::Survived => "Survived",
        }
    }
}

// ---------------------------------------------------------------------------
// Selection: which values are allowed per column
// ---------------------------------------------------------------------------

/// Allowed values for each categorical column.  An empty set admits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub conditions: BTreeSet<String>,
    pub readmissions: BTreeSet<String>,
    pub survivals: BTreeSet<String>,
}

impl Selection {
    pub fn new(
        conditions: BTreeSet<String>,
        readmissions: BTreeSet<String>,
        survivals: BTreeSet<String>,
    ) -> Self {
        Self {
            conditions,
            readmissions,
            survivals,
        }
    }

    /// Every distinct non-null value observed in the table (the default).
    pub fn all(table: &Table) -> Self {
        Self::new(
            table.distinct_strings(MEDICAL_CONDITION),
            table.distinct_strings(READMISSION),
            table.distinct_strings(SURVIVED),
        )
    }

    pub fn get(&self, column: CategoricalColumn) -> &BTreeSet<String> {
        match column {
            CategoricalColumn::MedicalCondition => &self.conditions,
            CategoricalColumn::Readmission => &self.readmissions,
            CategoricalColumn::Survived => &self.survivals,
        }
    }

    pub fn get_mut(&mut self, column: CategoricalColumn) -> &mut BTreeSet<String> {
        match column {
            CategoricalColumn::MedicalCondition => &mut self.conditions,
            CategoricalColumn::Readmission => &mut self.readmissions,
            CategoricalColumn::Survived => &mut self.survivals,
        }
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle(&mut self, column: CategoricalColumn, value: &str) {
        let selected = self.get_mut(column);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Select every observed value of a column.
    pub fn select_all(&mut self, column: CategoricalColumn, table: &Table) {
        *self.get_mut(column) = table.distinct_strings(column.column_name());
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: CategoricalColumn) {
        self.get_mut(column).clear();
    }
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// A read-only subset of a table: indices of the records that passed.
#[derive(Debug, Clone)]
pub struct FilteredView {
    table: Arc<Table>,
    indices: Vec<usize>,
}

impl FilteredView {
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Indices into [`FilteredView::table`], in table order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> + '_ {
        self.indices.iter().map(|&i| &self.table.records[i])
    }

    /// Apply `selection` again on top of this view.
    pub fn refine(&self, selection: &Selection) -> Result<FilteredView, ViewError> {
        build_view(Arc::clone(&self.table), self.indices.iter().copied(), selection)
    }
}

/// Return the records that pass all three column filters.
///
/// A record passes when, for every categorical column, its value is a
/// non-null string contained in the selected set.  Nulls never match and an
/// empty set admits nothing.  Zero matches is [`ViewError::EmptyResult`].
pub fn filter(table: &Arc<Table>, selection: &Selection) -> Result<FilteredView, ViewError> {
    build_view(Arc::clone(table), 0..table.len(), selection)
}

fn build_view(
    table: Arc<Table>,
    candidates: impl Iterator<Item = usize>,
    selection: &Selection,
) -> Result<FilteredView, ViewError> {
    let checks: Vec<(Option<usize>, &BTreeSet<String>)> = CategoricalColumn::ALL
        .iter()
        .map(|&col| (table.column_index(col.column_name()), selection.get(col)))
        .collect();

    let indices: Vec<usize> = candidates
        .filter(|&i| {
            let record = &table.records[i];
            checks.iter().all(|(idx, selected)| {
                idx.and_then(|idx| record.get(idx).as_str())
                    .is_some_and(|v| selected.contains(v))
            })
        })
        .collect();

    if indices.is_empty() {
        return Err(ViewError::EmptyResult);
    }
    Ok(FilteredView { table, indices })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
