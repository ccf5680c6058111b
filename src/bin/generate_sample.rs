use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

/// One generated encounter, as the text that lands in the file.
#[derive(Clone)]
struct Row {
    patient_id: i64,
    age: i64,
    gender: String,
    condition: String,
    admission: String,
    discharge: String,
    billing: f64,
    readmission: String,
    survived: String,
}

const HEADER: [&str; 9] = [
    "Patient ID",
    "Age",
    "Gender",
    "Medical Condition",
    "Date of Admission",
    "Discharge Date",
    "Billing Amount",
    "Readmission",
    "Survived",
];

const CONDITIONS: [&str; 6] = ["Diabetes", "Hypertension", "Asthma", "Cancer", "Arthritis", "Heart Disease"];

/// Random casing and padding, as typed by hand.
fn messy(rng: &mut SimpleRng, value: &str) -> String {
    let cased = match rng.below(4) {
        0 => value.to_lowercase(),
        1 => value.to_uppercase(),
        _ => value.to_string(),
    };
    if rng.chance(0.15) {
        format!("  {cased} ")
    } else {
        cased
    }
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let mut rows: Vec<Row> = Vec::with_capacity(n);

    for i in 0..n {
        let admitted = base + Duration::days(rng.below(365) as i64);
        let mut stay = 1 + rng.below(14) as i64;
        // A few discharge-before-admission rows.
        if rng.chance(0.02) {
            stay = -stay;
        }
        let discharged = admitted + Duration::days(stay);

        let mut admission = admitted.format("%d-%m-%Y").to_string();
        if rng.chance(0.03) {
            admission = admitted.format("%Y/%m/%d").to_string();
        }
        let discharge = if rng.chance(0.02) {
            String::new()
        } else {
            discharged.format("%d-%m-%Y").to_string()
        };

        let mut billing = 500.0 + rng.next_f64() * 49_500.0;
        if rng.chance(0.03) {
            billing = -billing / 10.0;
        }

        let condition = rng.pick(&CONDITIONS);
        let readmission = if rng.chance(0.3) { "Yes" } else { "No" };
        let survived = if rng.chance(0.85) { "Yes" } else { "No" };
        let gender = rng.pick(&["Male", "Female"]).to_string();

        rows.push(Row {
            patient_id: 1000 + i as i64,
            age: 18 + rng.below(72) as i64,
            gender,
            condition: messy(rng, condition),
            admission,
            discharge,
            billing: (billing * 1000.0).round() / 1000.0,
            readmission: messy(rng, readmission),
            survived: messy(rng, survived),
        });
    }

    // Exact duplicates of earlier rows.
    for _ in 0..n / 20 {
        let idx = rng.below(rows.len() as u64) as usize;
        rows.push(rows[idx].clone());
    }
    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADER)?;
    for r in rows {
        writer.write_record([
            r.patient_id.to_string(),
            r.age.to_string(),
            r.gender.clone(),
            r.condition.clone(),
            r.admission.clone(),
            r.discharge.clone(),
            r.billing.to_string(),
            r.readmission.clone(),
            r.survived.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let text = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADER[0], DataType::Int64, false),
        Field::new(HEADER[1], DataType::Int64, false),
        Field::new(HEADER[2], DataType::Utf8, false),
        Field::new(HEADER[3], DataType::Utf8, false),
        Field::new(HEADER[4], DataType::Utf8, false),
        Field::new(HEADER[5], DataType::Utf8, false),
        Field::new(HEADER[6], DataType::Float64, false),
        Field::new(HEADER[7], DataType::Utf8, false),
        Field::new(HEADER[8], DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.patient_id).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.age).collect::<Vec<_>>())),
            text(|r| &r.gender),
            text(|r| &r.condition),
            text(|r| &r.admission),
            text(|r| &r.discharge),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.billing).collect::<Vec<_>>())),
            text(|r| &r.readmission),
            text(|r| &r.survived),
        ],
    )?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 1000);

    write_csv(&rows, "sample_healthcare.csv")?;
    write_parquet(&rows, "sample_healthcare.parquet")?;

    println!(
        "Wrote {} encounters to sample_healthcare.csv and sample_healthcare.parquet",
        rows.len()
    );
    Ok(())
}
