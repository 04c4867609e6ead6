//! Writes a synthetic, Titanic-shaped passenger list for trying out the
//! dashboard without the Kaggle file.
//!
//! ```text
//! generate_sample [OUTPUT] [ROWS]
//! ```
//!
//! The output format follows the extension: `.parquet` writes Arrow/Parquet,
//! anything else writes CSV with the Kaggle `train.csv` header.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const DEFAULT_OUTPUT: &str = "sample_titanic.csv";
const DEFAULT_ROWS: usize = 891;

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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Row {
    passenger_id: i64,
    survived: u8,
    pclass: u8,
    name: String,
    sex: &'static str,
    age: Option<f64>,
    #[serde(rename = "SibSp")]
    sib_sp: u8,
    parch: u8,
    ticket: String,
    fare: Option<f64>,
    cabin: Option<String>,
    embarked: Option<&'static str>,
}

fn synth_row(id: i64, rng: &mut SimpleRng) -> Row {
    let pclass = match rng.next_f64() {
        u if u < 0.24 => 1,
        u if u < 0.45 => 2,
        _ => 3,
    };
    let female = rng.chance(0.35);

    let (age_mean, fare_median): (f64, f64) = match pclass {
        1 => (38.0, 60.0),
        2 => (30.0, 15.0),
        _ => (25.0, 8.0),
    };
    let age = (!rng.chance(0.2)).then(|| {
        let a = rng.gauss(age_mean, 13.0).clamp(0.42, 80.0);
        if a < 1.0 {
            (a * 100.0).round() / 100.0
        } else {
            a.round()
        }
    });
    let fare = (rng.gauss(fare_median.ln(), 0.6).exp() * 10_000.0).round() / 10_000.0;

    let embarked = match rng.next_f64() {
        u if u < 0.003 => None,
        u if u < 0.19 => Some("C"),
        u if u < 0.28 => Some("Q"),
        _ => Some("S"),
    };

    let mut p_survive: f64 = if female { 0.74 } else { 0.19 };
    p_survive += match pclass {
        1 => 0.18,
        2 => 0.05,
        _ => -0.12,
    };
    if age.is_some_and(|a| a < 12.0) {
        p_survive += 0.2;
    }
    let survived = rng.chance(p_survive.clamp(0.02, 0.98));

    let cabin = (pclass == 1 && rng.chance(0.8)).then(|| {
        let deck = ["A", "B", "C", "D", "E"][(rng.next_u64() % 5) as usize];
        format!("{deck}{}", 1 + rng.next_u64() % 120)
    });

    Row {
        passenger_id: id,
        survived: survived as u8,
        pclass,
        name: format!("Passenger {id}"),
        sex: if female { "female" } else { "male" },
        age,
        sib_sp: (rng.next_u64() % 3) as u8,
        parch: (rng.next_u64() % 3) as u8,
        ticket: format!("{}", 100_000 + rng.next_u64() % 900_000),
        fare: Some(fare),
        cabin,
        embarked,
    }
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("PassengerId", DataType::Int64, false),
        Field::new("Survived", DataType::Int64, false),
        Field::new("Pclass", DataType::Int64, false),
        Field::new("Sex", DataType::Utf8, false),
        Field::new("Age", DataType::Float64, true),
        Field::new("Fare", DataType::Float64, true),
        Field::new("Embarked", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.passenger_id))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| i64::from(r.survived)))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| i64::from(r.pclass)))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.sex))),
            Arc::new(rows.iter().map(|r| r.age).collect::<Float64Array>()),
            Arc::new(rows.iter().map(|r| r.fare).collect::<Float64Array>()),
            Arc::new(rows.iter().map(|r| r.embarked).collect::<StringArray>()),
        ],
    )
    .context("building record batch")?;
    log::debug!(
        "first rows:\n{}",
        arrow::util::pretty::pretty_format_batches(&[batch.slice(0, rows.len().min(5))])?
    );

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string()));
    let n_rows = match args.next() {
        Some(n) => n.parse::<usize>().with_context(|| format!("invalid row count {n:?}"))?,
        None => DEFAULT_ROWS,
    };

    let mut rng = SimpleRng::new(42);
    let rows: Vec<Row> = (1..=n_rows as i64).map(|id| synth_row(id, &mut rng)).collect();

    let is_parquet = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&output, &rows)?;
    } else {
        write_csv(&output, &rows)?;
    }

    let survived = rows.iter().filter(|r| r.survived == 1).count();
    log::info!("generated {} rows, {survived} survivors", rows.len());
    println!("Wrote {} passengers to {}", rows.len(), output.display());
    Ok(())
}
