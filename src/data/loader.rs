use std::io::Read;
use std::path::Path;

use crate::error::{PrepError, Result};
use crate::types::{RawValue, Row};

use super::Dataset;

/// Маркеры пропусков в CSV (как в pandas).
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Ячейка CSV -> значение. Пустые ячейки и маркеры пропусков дают `Missing`.
pub fn parse_cell(cell: &str) -> RawValue {
    let trimmed = cell.trim();
    if MISSING_TOKENS.contains(&trimmed) {
        return RawValue::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(x) if x.is_finite() => RawValue::Number(x),
        _ => RawValue::Text(trimmed.to_string()),
    }
}

pub fn load_csv_path(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .map_err(|e| PrepError::Parse(format!("opening {}: {e}", path.display())))?;
    let dataset = load_csv_reader(file)?;
    tracing::info!(
        "Loaded {} rows, {} columns from {}",
        dataset.len(),
        dataset.columns.len(),
        path.display()
    );
    Ok(dataset)
}

pub fn parse_csv_str(text: &str) -> Result<Dataset> {
    load_csv_reader(text.as_bytes())
}

/// CSV с заголовком. Строка с другим числом полей - ошибка разбора.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(PrepError::Parse("CSV has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| PrepError::Parse(format!("row {}: {e}", i + 1)))?;
        let row: Row = columns
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| (column.clone(), parse_cell(cell)))
            .collect();
        rows.push(row);
    }

    Ok(Dataset::new(columns, rows))
}

/// JSON-массив объектов -> строки.
pub fn load_json_rows(text: &str) -> Result<Dataset> {
    let rows: Vec<Row> = serde_json::from_str(text)?;
    Ok(Dataset::from_rows(rows))
}
