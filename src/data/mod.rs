//! Табличные данные, загруженные из CSV или JSON

pub mod export;
pub mod loader;

pub use export::{scored_to_csv, write_scored_csv};
pub use loader::{load_csv_path, load_csv_reader, load_json_rows, parse_csv_str};

use crate::types::{RawValue, Row};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Набор из строк; колонки собираются в порядке первого появления.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Значения колонки по всем строкам; отсутствующие ячейки дают `Missing`.
    pub fn column_values(&self, column: &str) -> Vec<RawValue> {
        self.rows
            .iter()
            .map(|r| r.get(column).cloned().unwrap_or_default())
            .collect()
    }
}
