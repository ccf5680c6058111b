use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::data::filter::FilteredView;

/// Write the view as comma-delimited UTF-8 text with a header row.
/// Nulls are empty fields and dates are ISO `YYYY-MM-DD`.
pub fn write_csv<W: Write>(view: &FilteredView, writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&view.table().columns)?;
    for record in view.records() {
        out.write_record(record.values.iter().map(ToString::to_string))?;
    }
    out.flush()?;
    Ok(())
}

/// The export as bytes, ready for a download.
pub fn to_csv_bytes(view: &FilteredView) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    Ok(buf)
}

/// Export the view to a file on disk.
pub fn save_csv(view: &FilteredView, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(view).context("serialising filtered view")?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} records to {}", view.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::data::clean::{clean, CleanOptions};
    use crate::data::filter::{filter, Selection};
    use crate::data::loader::read_csv_from;

    const SOURCE: &str =
        "Age,Medical Condition,Date of Admission,Discharge Date,Billing Amount,Readmission,Survived\n\
         40,flu,01-03-2024,05-03-2024,-5,No,Yes\n\
         50,Asthma,bad date,03-03-2024,200.5,Yes,No\n";

    #[test]
    fn export_reflects_current_selection() {
        let table = Arc::new(clean(read_csv_from(SOURCE.as_bytes()).unwrap(), &CleanOptions::default()).unwrap());
        let mut selection = Selection::all(&table);
        selection.conditions.remove("Asthma");
        let view = filter(&table, &selection).unwrap();

        let text = String::from_utf8(to_csv_bytes(&view).unwrap()).unwrap();
        assert_eq!(
            text,
            "Age,Medical_Condition,Date_of_Admission,Discharge_Date,Billing_Amount,Readmission,Survived,Length_of_Stay\n\
             40,Flu,2024-03-01,2024-03-05,0,No,Yes,4\n"
        );
    }

    #[test]
    fn nulls_export_as_empty_fields() {
        let table = Arc::new(clean(read_csv_from(SOURCE.as_bytes()).unwrap(), &CleanOptions::default()).unwrap());
        let view = filter(&table, &Selection::all(&table)).unwrap();
        let text = String::from_utf8(to_csv_bytes(&view).unwrap()).unwrap();
        assert!(text.lines().any(|l| l == "50,Asthma,,2024-03-03,200.5,Yes,No,"));

        // The export reads back into an equivalent table.
        let reread = read_csv_from(text.as_bytes()).unwrap();
        assert_eq!(reread.rows.len(), view.len());
    }
}
