use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, AsArray, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Dataset, Passenger, PassengerClass, Port, Sex};
use crate::error::DataLoadError;

const COL_ID: &str = "PassengerId";
const COL_SURVIVED: &str = "Survived";
const COL_CLASS: &str = "Pclass";
const COL_SEX: &str = "Sex";
const COL_AGE: &str = "Age";
const COL_FARE: &str = "Fare";
const COL_PORT: &str = "Embarked";

const REQUIRED_COLUMNS: [&str; 7] = [
    COL_ID,
    COL_SURVIVED,
    COL_CLASS,
    COL_SEX,
    COL_AGE,
    COL_FARE,
    COL_PORT,
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the passenger table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – Kaggle Titanic layout; extra columns (`Name`, `Ticket`, ...) are ignored
/// * `.json`    – `[{ "PassengerId": 1, "Survived": 0, "Pclass": 3, ... }, ...]`
/// * `.parquet` – same column names, integer or float numeric columns
pub fn load_file(path: &Path) -> Result<Dataset, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let raw = match ext.as_str() {
        "csv" => read_csv_rows(file)?,
        "json" => read_json_rows(file)?,
        "parquet" | "pq" => read_parquet_rows(file)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    let dataset = into_dataset(raw)?;
    log::info!(
        "Loaded {} passengers from {}",
        dataset.len(),
        path.display()
    );
    Ok(dataset)
}

/// Parse CSV text from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, DataLoadError> {
    into_dataset(read_csv_rows(reader)?)
}

fn into_dataset(raw: Vec<RawPassenger>) -> Result<Dataset, DataLoadError> {
    let passengers = raw
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.into_passenger(i + 1))
        .collect::<Result<Vec<_>, _>>()?;

    let dataset = Dataset::from_passengers(passengers);
    let duplicates = dataset.duplicate_ids();
    if duplicates > 0 {
        log::warn!("{duplicates} rows reuse an already seen {COL_ID}");
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Source-agnostic row
// ---------------------------------------------------------------------------

/// One row as read from disk, before categorical validation.
#[derive(Debug, Deserialize)]
struct RawPassenger {
    #[serde(rename = "PassengerId")]
    id: i64,
    #[serde(rename = "Survived")]
    survived: i64,
    #[serde(rename = "Pclass")]
    class: i64,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Age")]
    age: Option<f64>,
    #[serde(rename = "Fare")]
    fare: Option<f64>,
    #[serde(rename = "Embarked")]
    port: Option<String>,
}

impl RawPassenger {
    fn into_passenger(self, row: usize) -> Result<Passenger, DataLoadError> {
        let class = PassengerClass::from_number(self.class)
            .ok_or_else(|| DataLoadError::invalid(row, COL_CLASS, self.class))?;
        let sex = Sex::parse(&self.sex).ok_or_else(|| DataLoadError::invalid(row, COL_SEX, &self.sex))?;
        let survived = match self.survived {
            0 => false,
            1 => true,
            other => return Err(DataLoadError::invalid(row, COL_SURVIVED, other)),
        };
        let port = match self.port.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => {
                Some(Port::parse(code).ok_or_else(|| DataLoadError::invalid(row, COL_PORT, code))?)
            }
        };

        Ok(Passenger {
            id: self.id,
            class,
            sex,
            age: self.age.filter(|v| !v.is_nan()),
            fare: self.fare.filter(|v| !v.is_nan()),
            port,
            survived,
        })
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<RawPassenger>, DataLoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == col) {
            return Err(DataLoadError::MissingColumn(col));
        }
    }

    reader
        .deserialize()
        .map(|row| row.map_err(DataLoadError::from))
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`); `null` is missing.
fn read_json_rows<R: Read>(reader: R) -> Result<Vec<RawPassenger>, DataLoadError> {
    Ok(serde_json::from_reader(reader)?)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn read_parquet_rows(file: File) -> Result<Vec<RawPassenger>, DataLoadError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        let ids = numeric_column(&batch, COL_ID)?;
        let survived = numeric_column(&batch, COL_SURVIVED)?;
        let classes = numeric_column(&batch, COL_CLASS)?;
        let sexes = string_column(&batch, COL_SEX)?;
        let ages = numeric_column(&batch, COL_AGE)?;
        let fares = numeric_column(&batch, COL_FARE)?;
        let ports = string_column(&batch, COL_PORT)?;

        for i in 0..batch.num_rows() {
            let row = rows.len() + 1;
            let sex = if sexes.is_null(i) {
                return Err(DataLoadError::invalid(row, COL_SEX, "null"));
            } else {
                sexes.value(i).to_string()
            };
            rows.push(RawPassenger {
                id: required_integer(&ids, i, row, COL_ID)?,
                survived: required_integer(&survived, i, row, COL_SURVIVED)?,
                class: required_integer(&classes, i, row, COL_CLASS)?,
                sex,
                age: optional_number(&ages, i),
                fare: optional_number(&fares, i),
                port: (!ports.is_null(i)).then(|| ports.value(i).to_string()),
            });
        }
    }
    Ok(rows)
}

/// Cast a numeric column (any int/float width) to `Float64`.
fn numeric_column(batch: &RecordBatch, name: &'static str) -> Result<Float64Array, DataLoadError> {
    let col = batch
        .column_by_name(name)
        .ok_or(DataLoadError::MissingColumn(name))?;
    let values = cast(col.as_ref(), &DataType::Float64)?;
    Ok(values.as_primitive::<Float64Type>().clone())
}

/// Cast a string column (`Utf8`, `LargeUtf8`, dictionary) to `Utf8`.
fn string_column(batch: &RecordBatch, name: &'static str) -> Result<StringArray, DataLoadError> {
    let col = batch
        .column_by_name(name)
        .ok_or(DataLoadError::MissingColumn(name))?;
    let values = cast(col.as_ref(), &DataType::Utf8)?;
    Ok(values.as_string::<i32>().clone())
}

fn required_integer(
    arr: &Float64Array,
    i: usize,
    row: usize,
    column: &'static str,
) -> Result<i64, DataLoadError> {
    if arr.is_null(i) {
        return Err(DataLoadError::invalid(row, column, "null"));
    }
    let v = arr.value(i);
    if v.fract() != 0.0 || !v.is_finite() {
        return Err(DataLoadError::invalid(row, column, v));
    }
    Ok(v as i64)
}

fn optional_number(arr: &Float64Array, i: usize) -> Option<f64> {
    if arr.is_null(i) {
        None
    } else {
        Some(arr.value(i))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n";

    fn csv_text(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for r in rows {
            text.push_str(r);
            text.push('\n');
        }
        text
    }

    #[test]
    fn csv_rows_with_missing_cells() {
        let text = csv_text(&[
            r#"1,0,3,"Braund, Mr. Owen Harris",male,22,1,0,A/5 21171,7.25,,S"#,
            r#"2,1,1,"Cumings, Mrs. John Bradley",female,38,1,0,PC 17599,71.2833,C85,C"#,
            r#"6,0,3,"Moran, Mr. James",male,,0,0,330877,8.4583,,Q"#,
            r#"62,1,1,"Icard, Miss. Amelie",female,38,0,0,113572,80,B28,"#,
        ]);
        let ds = read_csv(text.as_bytes()).expect("csv parses");

        assert_eq!(ds.len(), 4);
        let moran = &ds.passengers[2];
        assert_eq!(moran.age, None);
        assert_eq!(moran.port, Some(Port::Queenstown));
        let icard = &ds.passengers[3];
        assert_eq!(icard.port, None);
        assert_eq!(icard.class, PassengerClass::First);
        assert!(icard.survived);
        assert_eq!(ds.ports.len(), 3);
    }

    #[test]
    fn missing_column_is_reported() {
        let text = "PassengerId,Survived,Pclass,Sex,Age,Fare\n1,0,3,male,22,7.25\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn("Embarked")));
    }

    #[test]
    fn invalid_categorical_values_fail() {
        let text = csv_text(&[r#"1,0,4,"X",male,22,0,0,T,7.25,,S"#]);
        assert!(matches!(
            read_csv(text.as_bytes()).unwrap_err(),
            DataLoadError::InvalidValue { row: 1, column: "Pclass", .. }
        ));

        let text = csv_text(&[r#"1,0,3,"X",male,22,0,0,T,7.25,,Z"#]);
        assert!(matches!(
            read_csv(text.as_bytes()).unwrap_err(),
            DataLoadError::InvalidValue { column: "Embarked", .. }
        ));

        let text = csv_text(&[r#"1,2,3,"X",male,22,0,0,T,7.25,,S"#]);
        assert!(matches!(
            read_csv(text.as_bytes()).unwrap_err(),
            DataLoadError::InvalidValue { column: "Survived", .. }
        ));
    }

    #[test]
    fn non_numeric_age_is_a_parse_error() {
        let text = csv_text(&[r#"1,0,3,"X",male,old,0,0,T,7.25,,S"#]);
        assert!(matches!(
            read_csv(text.as_bytes()).unwrap_err(),
            DataLoadError::Csv(_)
        ));
    }

    #[test]
    fn duplicate_ids_are_tolerated() {
        let text = csv_text(&[
            r#"1,0,3,"A",male,22,0,0,T,7.25,,S"#,
            r#"1,1,2,"B",female,30,0,0,T,13,,S"#,
        ]);
        let ds = read_csv(text.as_bytes()).expect("duplicates load");
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_file(Path::new("/definitely/not/here/titanic.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::NotFound(_)));
    }

    #[test]
    fn unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn csv_file_on_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(csv_text(&[r#"1,0,3,"A",male,22,0,0,T,7.25,,S"#]).as_bytes())
            .unwrap();
        let ds = load_file(file.path()).expect("loads");
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn json_records_with_nulls() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = r#"[
            {"PassengerId": 1, "Survived": 1, "Pclass": 2, "Sex": "female", "Age": null, "Fare": 13.0, "Embarked": "S"},
            {"PassengerId": 2, "Survived": 0, "Pclass": 3, "Sex": "male", "Age": 40.5, "Fare": null, "Embarked": null}
        ]"#;
        file.write_all(json.as_bytes()).unwrap();

        let ds = load_file(file.path()).expect("json loads");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.passengers[0].age, None);
        assert_eq!(ds.passengers[1].fare, None);
        assert_eq!(ds.passengers[1].port, None);
    }

    #[test]
    fn parquet_with_integer_and_null_columns() {
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
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(Int64Array::from(vec![1, 0])),
                Arc::new(Int64Array::from(vec![1, 3])),
                Arc::new(StringArray::from(vec!["female", "male"])),
                Arc::new(Float64Array::from(vec![Some(29.0), None])),
                Arc::new(Float64Array::from(vec![Some(100.0), Some(8.05)])),
                Arc::new(StringArray::from(vec![Some("S"), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(File::create(file.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).expect("parquet loads");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.passengers[0].class, PassengerClass::First);
        assert_eq!(ds.passengers[1].age, None);
        assert_eq!(ds.passengers[1].port, None);
        assert!(ds.passengers[0].survived);
    }
}
