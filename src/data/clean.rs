use std::collections::HashSet;

use chrono::NaiveDate;

use super::error::DataSourceError;
use super::loader::RawTable;
use super::model::{
    Record, Table, Value, BILLING_AMOUNT, DATE_OF_ADMISSION, DISCHARGE_DATE, LENGTH_OF_STAY,
    MEDICAL_CONDITION, READMISSION, SURVIVED,
};

/// Columns every source must provide after renaming.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    MEDICAL_CONDITION,
    READMISSION,
    SURVIVED,
    DATE_OF_ADMISSION,
    DISCHARGE_DATE,
    BILLING_AMOUNT,
];

/// Categorical columns trimmed and title-cased at load time.
pub const CATEGORICAL_COLUMNS: [&str; 3] = [MEDICAL_CONDITION, READMISSION, SURVIVED];

/// Knobs for the cleaning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOptions {
    /// chrono pattern for the two date columns.
    pub date_format: String,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            date_format: "%d-%m-%Y".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Turn a raw table into the cleaned [`Table`].
///
/// Steps, in order:
/// 1. spaces in column names → underscores
/// 2. drop exact-duplicate rows
/// 3. parse the admission/discharge dates (unparseable → null)
/// 4. round billing to 2 places, clamp negatives to 0
/// 5. derive `Length_of_Stay` in days
/// 6. trim + title-case the categorical columns
/// 7. drop rows that steps 3–6 made identical
pub fn clean(raw: RawTable, options: &CleanOptions) -> Result<Table, DataSourceError> {
    let mut columns: Vec<String> = raw.columns.iter().map(|c| rename_column(c)).collect();

    let position = |columns: &[String], name: &str| -> Result<usize, DataSourceError> {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DataSourceError::MissingColumn(name.to_string()))
    };
    for name in REQUIRED_COLUMNS {
        position(&columns, name)?;
    }
    let admission_idx = position(&columns, DATE_OF_ADMISSION)?;
    let discharge_idx = position(&columns, DISCHARGE_DATE)?;
    let billing_idx = position(&columns, BILLING_AMOUNT)?;
    let categorical_idx: Vec<usize> = CATEGORICAL_COLUMNS
        .iter()
        .map(|name| position(&columns, name))
        .collect::<Result<_, _>>()?;

    let total = raw.rows.len();
    let mut rows = dedup_rows(raw.rows);
    let raw_duplicates = total - rows.len();

    let mut unparsed_dates = 0usize;
    for row in &mut rows {
        for idx in [admission_idx, discharge_idx] {
            let parsed = parse_date(&row[idx], &options.date_format);
            if parsed.is_null() && !row[idx].is_null() {
                unparsed_dates += 1;
            }
            row[idx] = parsed;
        }
        row[billing_idx] = clean_billing(&row[billing_idx]);
    }

    // Replace an existing Length_of_Stay column or append a new one.
    let los_idx = match columns.iter().position(|c| c == LENGTH_OF_STAY) {
        Some(idx) => idx,
        None => {
            columns.push(LENGTH_OF_STAY.to_string());
            for row in &mut rows {
                row.push(Value::Null);
            }
            columns.len() - 1
        }
    };
    for row in &mut rows {
        row[los_idx] = length_of_stay(&row[admission_idx], &row[discharge_idx]);
        for &idx in &categorical_idx {
            row[idx] = normalize_category(&row[idx]);
        }
    }

    let before = rows.len();
    let rows = dedup_rows(rows);
    let merged = before - rows.len();

    if unparsed_dates > 0 {
        log::warn!("{unparsed_dates} date cell(s) did not match '{}' and were set to null", options.date_format);
    }
    log::info!(
        "Cleaned {} rows x {} columns ({raw_duplicates} exact duplicates dropped, {merged} merged after normalisation)",
        rows.len(),
        columns.len()
    );

    Ok(Table::new(columns, rows.into_iter().map(Record::new).collect()))
}

// ---------------------------------------------------------------------------
// Column transforms
// ---------------------------------------------------------------------------

pub fn rename_column(name: &str) -> String {
    name.replace(' ', "_")
}

/// Remove exact-duplicate rows, keeping the first occurrence and the
/// original order.
pub fn dedup_rows(rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect()
}

/// Parse a date cell.  Text that does not match `format` becomes null;
/// values already typed as dates pass through.
pub fn parse_date(value: &Value, format: &str) -> Value {
    match value {
        Value::Date(d) => Value::Date(*d),
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), format)
            .map(Value::Date)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Round to 2 decimal places (half away from zero on the decimal
/// representation) and clamp negatives to 0.  Text cells are parsed
/// individually; anything unparseable → null.
pub fn clean_billing(value: &Value) -> Value {
    let amount = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    };
    match amount {
        Some(v) if v.is_finite() => {
            let rounded = round_to_cents(v);
            // `<=` also folds -0.0 into 0.0.
            Value::Float(if rounded <= 0.0 { 0.0 } else { rounded })
        }
        _ => Value::Null,
    }
}

/// Scale via the shortest decimal text of `v` so that values such as
/// `1.005` round up the way they read instead of by their binary value.
fn round_to_cents(v: f64) -> f64 {
    let scaled: f64 = format!("{v}e2").parse().unwrap_or(v * 100.0);
    scaled.round() / 100.0
}

/// Whole days from admission to discharge; null unless both are dates.
/// Negative stays are kept as-is.
pub fn length_of_stay(admission: &Value, discharge: &Value) -> Value {
    match (admission.as_date(), discharge.as_date()) {
        (Some(a), Some(d)) => Value::Integer((d - a).num_days()),
        _ => Value::Null,
    }
}

/// Trim and title-case a categorical cell.  Non-string values are
/// stringified first; null stays null.
pub fn normalize_category(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) => Value::String(title_case(s.trim())),
        other => Value::String(title_case(other.to_string().trim())),
    }
}

/// Upper-case the first letter of every alphabetic run and lower-case the
/// rest: `"heart DISEASE"` → `"Heart Disease"`, `"o'neil"` → `"O'Neil"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv_from;

    const HEADER: &str =
        "Patient ID,Age,Medical Condition,Date of Admission,Discharge Date,Billing Amount,Readmission,Survived";

    fn cleaned(body: &str) -> Table {
        let raw = read_csv_from(format!("{HEADER}\n{body}").as_bytes()).unwrap();
        clean(raw, &CleanOptions::default()).unwrap()
    }

    fn column(table: &Table, name: &str) -> Vec<Value> {
        let idx = table.column_index(name).unwrap();
        table.records.iter().map(|r| r.get(idx).clone()).collect()
    }

    #[test]
    fn renames_columns_with_underscores() {
        let t = cleaned("1,40,Flu,01-03-2024,05-03-2024,10,No,Yes");
        assert_eq!(
            t.columns,
            vec![
                "Patient_ID",
                "Age",
                "Medical_Condition",
                "Date_of_Admission",
                "Discharge_Date",
                "Billing_Amount",
                "Readmission",
                "Survived",
                "Length_of_Stay",
            ]
        );
    }

    #[test]
    fn negative_billing_is_clamped_to_zero() {
        let t = cleaned(
            "1,40,Flu,01-03-2024,05-03-2024,-50.456,No,Yes\n\
             2,41,Flu,01-03-2024,05-03-2024,1234.567,No,Yes\n\
             3,42,Flu,01-03-2024,05-03-2024,1.005,No,Yes",
        );
        let billing = column(&t, BILLING_AMOUNT);
        assert_eq!(billing[0], Value::Float(0.0));
        assert_eq!(billing[1], Value::Float(1234.57));
        assert_eq!(billing[2], Value::Float(1.01));
        assert!(billing.iter().all(|v| v.as_f64().is_some_and(|b| b >= 0.0)));
    }

    #[test]
    fn text_billing_column_keeps_numeric_cells() {
        let t = cleaned(
            "1,40,Flu,01-03-2024,05-03-2024,100.456,No,Yes\n\
             2,41,Flu,01-03-2024,05-03-2024,N/A,No,Yes\n\
             3,42,Flu,01-03-2024,05-03-2024, -20 ,No,Yes",
        );
        let billing = column(&t, BILLING_AMOUNT);
        assert_eq!(billing[0], Value::Float(100.46));
        assert_eq!(billing[1], Value::Null);
        assert_eq!(billing[2], Value::Float(0.0));
    }

    #[test]
    fn tiny_negative_billing_becomes_positive_zero() {
        let value = clean_billing(&Value::Float(-0.004));
        assert_eq!(value, Value::Float(0.0));
        assert!(value.as_f64().is_some_and(|v| v.is_sign_positive()));
        assert_eq!(value.to_string(), "0");

        // Identical once -0.004 is clamped, so only one row survives.
        let t = cleaned(
            "1,40,Flu,01-03-2024,05-03-2024,-0.004,No,Yes\n\
             1,40,Flu,01-03-2024,05-03-2024,0,No,Yes",
        );
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn length_of_stay_from_dates() {
        let t = cleaned(
            "1,40,Flu,01-03-2024,05-03-2024,10,No,Yes\n\
             2,40,Flu,10-03-2024,05-03-2024,10,No,Yes\n\
             3,40,Flu,2024/03/01,05-03-2024,10,No,Yes\n\
             4,40,Flu,01-03-2024,,10,No,Yes",
        );
        let los = column(&t, LENGTH_OF_STAY);
        assert_eq!(los[0], Value::Integer(4));
        assert_eq!(los[1], Value::Integer(-5));
        assert_eq!(los[2], Value::Null);
        assert_eq!(los[3], Value::Null);

        let admission = column(&t, DATE_OF_ADMISSION);
        let discharge = column(&t, DISCHARGE_DATE);
        for ((a, d), l) in admission.iter().zip(&discharge).zip(&los) {
            match (a.as_date(), d.as_date()) {
                (Some(a), Some(d)) => assert_eq!(*l, Value::Integer((d - a).num_days())),
                _ => assert!(l.is_null()),
            }
        }
    }

    #[test]
    fn categorical_columns_are_trimmed_and_title_cased() {
        let t = cleaned(
            "1,40,  heart DISEASE ,01-03-2024,05-03-2024,10, no,YES \n\
             2,40,Flu,01-03-2024,05-03-2024,10,,yes",
        );
        assert_eq!(column(&t, MEDICAL_CONDITION)[0], Value::String("Heart Disease".into()));
        assert_eq!(column(&t, READMISSION)[0], Value::String("No".into()));
        assert_eq!(column(&t, READMISSION)[1], Value::Null);
        for name in CATEGORICAL_COLUMNS {
            for value in column(&t, name) {
                if let Some(s) = value.as_str() {
                    assert_eq!(s, s.trim());
                    assert_eq!(s, title_case(s));
                }
            }
        }
    }

    #[test]
    fn duplicates_are_dropped() {
        let t = cleaned(
            "1,40,Flu,01-03-2024,05-03-2024,10,No,Yes\n\
             1,40,Flu,01-03-2024,05-03-2024,10,No,Yes\n\
             1,40,flu ,01-03-2024,05-03-2024,10,No,Yes\n\
             2,40,Flu,01-03-2024,05-03-2024,10,No,Yes",
        );
        assert_eq!(t.len(), 2);
        let unique: HashSet<&Record> = t.records.iter().collect();
        assert_eq!(unique.len(), t.len());
    }

    #[test]
    fn dedup_is_idempotent() {
        let rows = vec![
            vec![Value::Integer(1), Value::String("a".into())],
            vec![Value::Integer(1), Value::String("a".into())],
            vec![Value::Integer(2), Value::Null],
        ];
        let once = dedup_rows(rows);
        let twice = dedup_rows(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn missing_required_column_fails() {
        let raw = read_csv_from("Medical Condition,Survived\nFlu,Yes\n".as_bytes()).unwrap();
        let err = clean(raw, &CleanOptions::default()).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn(c) if c == READMISSION));
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("heart DISEASE"), "Heart Disease");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("type-2 diabetes"), "Type-2 Diabetes");
        assert_eq!(title_case(""), "");
    }
}
