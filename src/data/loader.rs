use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::error::ArrowError;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::DataSourceError;
use super::model::Value;

// ---------------------------------------------------------------------------
// RawTable – file contents before cleaning
// ---------------------------------------------------------------------------

/// Column names exactly as they appear in the source, plus typed rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read a source file into a [`RawTable`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-delimited with a header row, schema inferred
/// * `.parquet` / `.pq` – any flat Arrow schema
pub fn read_raw(path: &Path) -> Result<RawTable, DataSourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => read_csv(path),
        "parquet" | "pq" => read_parquet(path),
        other => Err(DataSourceError::UnsupportedFormat(other.to_string())),
    }
}

fn open(path: &Path) -> Result<File, DataSourceError> {
    File::open(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable, DataSourceError> {
    read_csv_from(open(path)?)
}

/// Parse CSV text.  Short rows are padded with nulls and long rows truncated
/// to the header width; empty cells are null.
pub fn read_csv_from<R: std::io::Read>(input: R) -> Result<RawTable, DataSourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() || columns.iter().all(String::is_empty) {
        return Err(DataSourceError::NoHeader);
    }

    let mut text_rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().take(columns.len()).map(str::to_string).collect();
        row.resize(columns.len(), String::new());
        text_rows.push(row);
    }

    let kinds: Vec<CellKind> = (0..columns.len())
        .map(|col| infer_kind(text_rows.iter().map(|row| row[col].as_str())))
        .collect();

    let rows = text_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| kind.convert(cell))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

/// Column type inferred from every non-empty cell of a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl CellKind {
    fn convert(self, cell: String) -> Value {
        if cell.is_empty() {
            return Value::Null;
        }
        // The column-wide inference already guarantees these parses succeed.
        match self {
            CellKind::Integer => cell.parse().map(Value::Integer).unwrap_or(Value::String(cell)),
            CellKind::Float => cell.parse().map(Value::Float).unwrap_or(Value::String(cell)),
            CellKind::Bool => Value::Bool(cell.eq_ignore_ascii_case("true")),
            CellKind::Text => Value::String(cell),
        }
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> CellKind {
    let (mut all_int, mut all_float, mut all_bool) = (true, true, true);
    let mut any = false;
    for cell in cells.filter(|c| !c.is_empty()) {
        any = true;
        all_int &= cell.parse::<i64>().is_ok();
        all_float &= cell.parse::<f64>().is_ok();
        all_bool &= cell.eq_ignore_ascii_case("true") || cell.eq_ignore_ascii_case("false");
        if !(all_int || all_float || all_bool) {
            return CellKind::Text;
        }
    }
    match (any, all_int, all_float, all_bool) {
        (false, ..) => CellKind::Text,
        (_, true, _, _) => CellKind::Integer,
        (_, _, true, _) => CellKind::Float,
        (_, _, _, true) => CellKind::Bool,
        _ => CellKind::Text,
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file with a flat schema.  Every column becomes a raw
/// column; works with files written by Pandas, Polars and Spark.
fn read_parquet(path: &Path) -> Result<RawTable, DataSourceError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    if columns.is_empty() {
        return Err(DataSourceError::NoHeader);
    }
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let batch_columns = batch
            .columns()
            .iter()
            .map(normalize_column)
            .collect::<Result<Vec<_>, _>>()?;
        for row in 0..batch.num_rows() {
            rows.push(batch_columns.iter().map(|col| extract_value(col, row)).collect());
        }
    }

    Ok(RawTable { columns, rows })
}

/// Cast a column onto one of the types [`extract_value`] reads:
/// * narrow and unsigned integers → `Int64`
/// * half floats and decimals → `Float64`
/// * timestamps and `Date64` → `Date32` (time of day dropped)
/// * dictionaries → their value type
/// * anything else → its display text
fn normalize_column(col: &ArrayRef) -> Result<ArrayRef, ArrowError> {
    let target = match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean
        | DataType::Date32
        | DataType::Null => return Ok(col.clone()),
        DataType::Int8
        | DataType::Int16
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16 | DataType::Decimal128(..) | DataType::Decimal256(..) => DataType::Float64,
        DataType::Timestamp(..) | DataType::Date64 => DataType::Date32,
        DataType::Utf8View => DataType::Utf8,
        DataType::Dictionary(_, values) => {
            let decoded = cast(col, values)?;
            return normalize_column(&decoded);
        }
        _ => return render_as_text(col),
    };
    cast(col, &target)
}

fn render_as_text(col: &ArrayRef) -> Result<ArrayRef, ArrowError> {
    let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())?;
    let text: StringArray = (0..col.len())
        .map(|row| col.is_valid(row).then(|| formatter.value(row).to_string()))
        .collect();
    Ok(Arc::new(text))
}

/// Extract a single cell from a normalized Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map_or(Value::Null, Value::Date),
        // normalize_column leaves no other types.
        _ => Value::Null,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn infers_column_types_from_content() {
        let csv = "Age,Billing Amount,Survived,Flag,Date of Admission\n\
                   40,100.5,yes,true,01-03-2024\n\
                   ,-3,No,FALSE,\n";
        let raw = read_csv_from(csv.as_bytes()).unwrap();
        assert_eq!(raw.columns[1], "Billing Amount");
        assert_eq!(raw.rows[0][0], Value::Integer(40));
        assert_eq!(raw.rows[1][0], Value::Null);
        assert_eq!(raw.rows[1][1], Value::Float(-3.0));
        assert_eq!(raw.rows[0][2], Value::String("yes".into()));
        assert_eq!(raw.rows[1][3], Value::Bool(false));
        assert_eq!(raw.rows[0][4], Value::String("01-03-2024".into()));
        assert_eq!(raw.rows[1][4], Value::Null);
    }

    #[test]
    fn ragged_rows_are_padded() {
        let raw = read_csv_from("a,b,c\n1,2\n3,4,5,6\n".as_bytes()).unwrap();
        assert_eq!(raw.rows[0], vec![Value::Integer(1), Value::Integer(2), Value::Null]);
        assert_eq!(raw.rows[1].len(), 3);
    }

    #[test]
    fn empty_source_has_no_header() {
        let err = read_csv_from("".as_bytes()).unwrap_err();
        assert!(matches!(err, DataSourceError::NoHeader));
    }

    #[test]
    fn reads_csv_from_disk() {
        let mut file = NamedTempFile::with_suffix(".csv").expect("temp file");
        writeln!(file, "Name,Age").unwrap();
        writeln!(file, "Asha,31").unwrap();
        let raw = read_raw(file.path()).unwrap();
        assert_eq!(raw.columns, vec!["Name".to_string(), "Age".to_string()]);
        assert_eq!(raw.rows.len(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_raw(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataSourceError::Io { .. }));
    }

    fn write_parquet(columns: Vec<(&str, ArrayRef)>) -> NamedTempFile {
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let batch = RecordBatch::try_from_iter(columns).unwrap();
        let file = NamedTempFile::with_suffix(".parquet").expect("temp file");
        let handle = file.as_file().try_clone().unwrap();
        let mut writer = ArrowWriter::try_new(handle, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    fn days_since_epoch(date: NaiveDate) -> i32 {
        (date - NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as i32
    }

    #[test]
    fn reads_core_parquet_types() {
        use arrow::array::{Date32Array, Float64Array, Int64Array};

        let admitted = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let file = write_parquet(vec![
            ("Medical Condition", Arc::new(StringArray::from(vec![Some("Flu"), None])) as ArrayRef),
            ("Patient ID", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
            ("Billing Amount", Arc::new(Float64Array::from(vec![Some(10.5), None])) as ArrayRef),
            (
                "Date of Admission",
                Arc::new(Date32Array::from(vec![Some(days_since_epoch(admitted)), None])) as ArrayRef,
            ),
        ]);

        let raw = read_raw(file.path()).unwrap();
        assert_eq!(
            raw.columns,
            vec!["Medical Condition", "Patient ID", "Billing Amount", "Date of Admission"]
        );
        assert_eq!(
            raw.rows,
            vec![
                vec![
                    Value::String("Flu".into()),
                    Value::Integer(1),
                    Value::Float(10.5),
                    Value::Date(admitted),
                ],
                vec![Value::Null, Value::Integer(2), Value::Null, Value::Null],
            ]
        );
    }

    #[test]
    fn reads_pandas_style_parquet_types() {
        use arrow::array::{
            BinaryArray, Decimal128Array, DictionaryArray, Int16Array, TimestampMillisecondArray,
            UInt32Array,
        };

        let admitted = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let millis = admitted.and_hms_opt(13, 30, 0).unwrap().and_utc().timestamp_millis();
        let conditions: DictionaryArray<Int32Type> = vec!["Asthma", "Cancer"].into_iter().collect();
        let decimals = Decimal128Array::from(vec![12345_i128, -50])
            .with_precision_and_scale(10, 2)
            .unwrap();

        let file = write_parquet(vec![
            ("Age", Arc::new(Int16Array::from(vec![40, 41])) as ArrayRef),
            ("Medical Condition", Arc::new(conditions) as ArrayRef),
            (
                "Date of Admission",
                Arc::new(TimestampMillisecondArray::from(vec![Some(millis), None])) as ArrayRef,
            ),
            ("Visits", Arc::new(UInt32Array::from(vec![7, 8])) as ArrayRef),
            ("Billing Amount", Arc::new(decimals) as ArrayRef),
            ("Tag", Arc::new(BinaryArray::from(vec![b"\x01\xff".as_ref(), b"".as_ref()])) as ArrayRef),
        ]);

        let raw = read_raw(file.path()).unwrap();
        assert_eq!(
            raw.rows[0],
            vec![
                Value::Integer(40),
                Value::String("Asthma".into()),
                Value::Date(admitted),
                Value::Integer(7),
                Value::Float(123.45),
                Value::String("01ff".into()),
            ]
        );
        assert_eq!(raw.rows[1][1], Value::String("Cancer".into()));
        assert_eq!(raw.rows[1][2], Value::Null);
        assert_eq!(raw.rows[1][4], Value::Float(-0.5));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = read_raw(Path::new("data.xlsx")).unwrap_err();
        assert!(matches!(err, DataSourceError::UnsupportedFormat(ext) if ext == "xlsx"));
    }
}
