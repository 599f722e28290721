use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Dataset, Record};

/// Why the dataset could not be loaded. All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed row {row} in {}: {message}", path.display())]
    MalformedRow {
        path: PathBuf,
        row: u64,
        message: String,
    },

    #[error("{} is not valid UTF-8 (row {row})", path.display())]
    Encoding { path: PathBuf, row: u64 },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a paper table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`            – comma separated, header row required
/// * `.tsv` / `.tab`   – tab separated, header row required
/// * `.json`           – `[{ "title": ..., "authors": ..., ... }, ...]`
/// * `.parquet` / `.pq`
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_delimited(path, b',')?,
        "tsv" | "tab" => load_delimited(path, b'\t')?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} papers from {} with columns {:?}",
        dataset.len(),
        path.display(),
        dataset.columns()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one paper per line. Every field is typed
/// with [`CellValue::parse`]; rows with a different field count than the
/// header are rejected.
fn load_delimited(path: &Path, delimiter: u8) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(open(path)?);

    let headers = unique_names(
        reader
            .headers()
            .map_err(|e| csv_error(path, e))?
            .iter()
            .map(|h| h.to_string()),
    );

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| csv_error(path, e))?;
        let values = headers
            .iter()
            .zip(row.iter())
            .map(|(col, value)| (col.clone(), CellValue::parse(value)))
            .collect();
        records.push(Record::new(values));
    }

    Dataset::from_records(headers, records)
}

/// Rename repeated column names to `name.1`, `name.2`, ... so every column
/// keeps its own cells.
fn unique_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for name in names {
        let mut candidate = name.clone();
        let mut n = 1;
        while unique.contains(&candidate) {
            candidate = format!("{name}.{n}");
            n += 1;
        }
        unique.push(candidate);
    }
    unique
}

fn csv_error(path: &Path, err: csv::Error) -> LoadError {
    let path = path.to_path_buf();
    let row = err.position().map(|p| p.line()).unwrap_or(0);

    if let csv::ErrorKind::UnequalLengths {
        expected_len, len, ..
    } = err.kind()
    {
        return LoadError::MalformedRow {
            path,
            row,
            message: format!("expected {expected_len} fields, found {len}"),
        };
    }
    if let csv::ErrorKind::Utf8 { .. } = err.kind() {
        return LoadError::Encoding { path, row };
    }
    if err.is_io_error() {
        return LoadError::Io {
            path,
            source: err.into(),
        };
    }
    LoadError::MalformedRow {
        path,
        row,
        message: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "Deep Learning Basics", "authors": "A. Smith", "year": 2020, "category": "ML" },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys in first-seen order.
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let text = String::from_utf8(text).map_err(|_| LoadError::Encoding {
        path: path.to_path_buf(),
        row: 0,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let rows = root.as_array().ok_or_else(|| LoadError::Parse {
        path: path.to_path_buf(),
        message: "expected top-level JSON array".to_string(),
    })?;

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or_else(|| LoadError::MalformedRow {
            path: path.to_path_buf(),
            row: i as u64 + 1,
            message: "row is not a JSON object".to_string(),
        })?;

        let mut values = BTreeMap::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            values.insert(key.clone(), json_to_cell(val));
        }
        records.push(Record::new(values));
    }

    Dataset::from_records(columns, records)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the paper table.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Integer, float, boolean and string
/// columns keep their type; anything else is rendered to text.
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let parse_error = |e: &dyn std::fmt::Display| LoadError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let builder =
        ParquetRecordBatchReaderBuilder::try_new(open(path)?).map_err(|e| parse_error(&e))?;
    let columns = unique_names(builder.schema().fields().iter().map(|f| f.name().clone()));
    let reader = builder.build().map_err(|e| parse_error(&e))?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| parse_error(&e))?;
        for row in 0..batch.num_rows() {
            let values = columns
                .iter()
                .zip(batch.columns())
                .map(|(name, col)| (name.clone(), extract_cell(col, row)))
                .collect();
            records.push(Record::new(values));
        }
    }

    Dataset::from_records(columns, records)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    let typed = match col.data_type() {
        DataType::Utf8 => Some(CellValue::String(col.as_string::<i32>().value(row).to_string())),
        DataType::LargeUtf8 => {
            Some(CellValue::String(col.as_string::<i64>().value(row).to_string()))
        }
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };
    typed.unwrap_or_else(|| match array_value_to_string(col, row) {
        Ok(text) => CellValue::String(text),
        Err(_) => CellValue::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::StringArray;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn loads_csv_with_extra_columns_in_file_order() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "papers.csv",
            b"title,venue,authors,year,category\n\
              Deep Learning Basics,NeurIPS,A. Smith,2020,ML\n\
              Shallow Parsing,,B. Lee,2021,NLP\n",
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.columns(), &["title", "venue", "authors", "year", "category"]);
        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!(first.get("venue"), &CellValue::from("NeurIPS"));
        assert_eq!(first.get("year"), &CellValue::Integer(2020));
        assert!(ds.records()[1].get("venue").is_null());
    }

    #[test]
    fn loads_tab_separated() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "papers.tsv",
            b"title\tauthors\tyear\tcategory\nA, B and C\tX\t2019\tCV\n",
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.records()[0].get("title"), &CellValue::from("A, B and C"));
    }

    #[test]
    fn duplicate_headers_are_renamed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "papers.csv",
            b"title,authors,year,category,title,title.1,title\n\
              Deep,A. Smith,2020,ML,Second,Third,Fourth\n",
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(
            ds.columns(),
            &["title", "authors", "year", "category", "title.1", "title.1.1", "title.2"]
        );
        let row = &ds.records()[0];
        assert_eq!(row.get("title"), &CellValue::from("Deep"));
        assert_eq!(row.get("title.1"), &CellValue::from("Second"));
        assert_eq!(row.get("title.1.1"), &CellValue::from("Third"));
        assert_eq!(row.get("title.2"), &CellValue::from("Fourth"));
    }

    #[test]
    fn header_only_file_is_empty_dataset() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "papers.csv", b"title,authors,year,category\n");
        let ds = load_file(&path).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.columns().len(), 4);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn ragged_row_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "papers.csv",
            b"title,authors,year,category\nA,B,2020,ML\nC,D,2021\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRow { row: 3, .. }), "{err}");
    }

    #[test]
    fn invalid_utf8_is_encoding_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "papers.csv",
            b"title,authors,year,category\n\xff\xfe,B,2020,ML\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Encoding { .. }), "{err}");
    }

    #[test]
    fn missing_category_column_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "papers.csv", b"title,authors,year\nA,B,2020\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "category"));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "papers.xlsx", b"");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref e) if e == "xlsx"));
    }

    #[test]
    fn loads_json_records() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "papers.json",
            br#"[
                {"title": "Deep Learning Basics", "authors": "A. Smith", "year": 2020, "category": "ML"},
                {"title": null, "authors": "B. Lee", "year": 2021, "category": "NLP", "citations": 4.5}
            ]"#,
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.columns(), &["title", "authors", "year", "category", "citations"]);
        assert!(ds.records()[1].get("title").is_null());
        assert_eq!(ds.records()[1].get("citations"), &CellValue::Float(4.5));
        assert!(ds.records()[0].get("citations").is_null());
    }

    #[test]
    fn json_row_that_is_not_an_object_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "papers.json", b"[1, 2]");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRow { row: 1, .. }));
    }

    #[test]
    fn loads_parquet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("papers.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("title", DataType::Utf8, true),
            Field::new("authors", DataType::Utf8, false),
            Field::new("year", DataType::Int64, false),
            Field::new("category", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Deep Learning Basics"), None])),
                Arc::new(StringArray::from(vec!["A. Smith", "B. Lee"])),
                Arc::new(Int64Array::from(vec![2020, 2021])),
                Arc::new(StringArray::from(vec!["ML", "NLP"])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].get("year"), &CellValue::Integer(2020));
        assert!(ds.records()[1].get("title").is_null());
        assert_eq!(ds.category_options(), &[CellValue::from("ML"), CellValue::from("NLP")]);
    }
}
