use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Well-known column names (post-rename)
// ---------------------------------------------------------------------------

pub const MEDICAL_CONDITION: &str = "Medical_Condition";
pub const READMISSION: &str = "Readmission";
pub const SURVIVED: &str = "Survived";
pub const DATE_OF_ADMISSION: &str = "Date_of_Admission";
pub const DISCHARGE_DATE: &str = "Discharge_Date";
pub const BILLING_AMOUNT: &str = "Billing_Amount";
pub const LENGTH_OF_STAY: &str = "Length_of_Stay";
pub const AGE: &str = "Age";

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Records are deduplicated through `HashSet` and values kept in `BTreeSet`,
/// so `Value` must be `Eq + Hash + Ord`.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord/Hash: floats compare by total order and hash by bits --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Null => {}
        }
    }
}

/// Display form used by the preview table and the CSV export.
/// Nulls render as an empty string, dates as ISO `YYYY-MM-DD`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Null => Ok(()),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interpret the value as an `f64` for numeric aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one patient encounter
// ---------------------------------------------------------------------------

/// One row of the table: one value per column, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Record { values }
    }

    pub fn get(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Table – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// The full cleaned dataset with a column-name index.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column names in source order (derived columns appended).
    pub columns: Vec<String>,
    /// All records.
    pub records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Table {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Table {
            columns,
            records,
            index,
        }
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted set of distinct non-null string values of a column.
    pub fn distinct_strings(&self, column: &str) -> BTreeSet<String> {
        let Some(idx) = self.column_index(column) else {
            return BTreeSet::new();
        };
        self.records
            .iter()
            .filter_map(|r| r.get(idx).as_str())
            .map(str::to_string)
            .collect()
    }

    /// Whether a column holds at least one numeric value and nothing but
    /// numbers and nulls.
    pub fn is_numeric_column(&self, index: usize) -> bool {
        let mut seen_number = false;
        for record in &self.records {
            match record.get(index) {
                Value::Integer(_) | Value::Float(_) => seen_number = true,
                Value::Null => {}
                _ => return false,
            }
        }
        seen_number
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["Survived".into(), "Age".into()],
            vec![
                Record::new(vec![Value::String("Yes".into()), Value::Integer(40)]),
                Record::new(vec![Value::String("No".into()), Value::Float(51.5)]),
                Record::new(vec![Value::Null, Value::Null]),
                Record::new(vec![Value::String("Yes".into()), Value::Integer(33)]),
            ],
        )
    }

    #[test]
    fn distinct_strings_skip_nulls() {
        let t = table();
        let vals: Vec<String> = t.distinct_strings("Survived").into_iter().collect();
        assert_eq!(vals, vec!["No".to_string(), "Yes".to_string()]);
        assert!(t.distinct_strings("Missing").is_empty());
    }

    #[test]
    fn numeric_column_detection() {
        let t = table();
        assert!(t.is_numeric_column(1));
        assert!(!t.is_numeric_column(0));
    }

    #[test]
    fn values_order_across_types() {
        let mut vals = vec![
            Value::String("b".into()),
            Value::Float(1.5),
            Value::Null,
            Value::Integer(3),
        ];
        vals.sort();
        assert_eq!(vals[0], Value::Null);
        assert_eq!(vals[1], Value::Integer(3));
        assert_eq!(vals[3], Value::String("b".into()));
    }

    #[test]
    fn equality_agrees_with_hash() {
        use std::collections::HashSet;

        let nan = Value::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(Value::Float(-0.0), Value::Float(0.0));

        let set: HashSet<Value> = [Value::Float(-0.0), Value::Float(0.0), nan.clone(), nan]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn display_formats_for_export() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(Value::Date(d).to_string(), "2024-03-01");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Float(12.5).to_string(), "12.5");
    }
}
