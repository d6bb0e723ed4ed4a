/// Агрегаты по набору данных для дашборда

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::Dataset;
use crate::error::{PrepError, Result};
use crate::types::{RawValue, Row};

/// Сколько строк попадает в образец для таблицы.
pub const SAMPLE_ROWS: usize = 50;

/// Количество строк по каждому значению колонки. Пропуски не считаются.
pub fn value_counts(rows: &[Row], column: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for category in rows
        .iter()
        .filter_map(|r| r.get(column).and_then(RawValue::as_category))
    {
        *counts.entry(category.into_owned()).or_insert(0) += 1;
    }
    counts
}

/// Среднее числового `target_column` по группам `group_column`, округлённое до 4 знаков.
///
/// Строки без группы или без числовой цели пропускаются.
pub fn rate_by_group(rows: &[Row], group_column: &str, target_column: &str) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let group = row.get(group_column).and_then(RawValue::as_category);
        let target = row.get(target_column).and_then(RawValue::as_number);
        if let (Some(group), Some(target)) = (group, target) {
            let entry = sums.entry(group.into_owned()).or_insert((0.0, 0));
            entry.0 += target;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(group, (sum, n))| (group, ((sum / n as f64) * 10_000.0).round_ties_even() / 10_000.0))
        .collect()
}

/// Числовые значения колонки без пропусков, в исходном порядке.
pub fn numeric_values(rows: &[Row], column: &str) -> Vec<f64> {
    rows.iter()
        .filter_map(|r| r.get(column).and_then(RawValue::as_number))
        .collect()
}

/// Значения `value_column`, разложенные по значениям `group_column` (для гистограмм).
pub fn values_by_group(rows: &[Row], value_column: &str, group_column: &str) -> BTreeMap<String, Vec<f64>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in rows {
        let group = row.get(group_column).and_then(RawValue::as_category);
        let value = row.get(value_column).and_then(RawValue::as_number);
        if let (Some(group), Some(value)) = (group, value) {
            groups.entry(group.into_owned()).or_default().push(value);
        }
    }
    groups
}

/// Сводка по набору для дашборда: распределение цели, доли по группам,
/// распределения числовых колонок и первые строки.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub target_counts: BTreeMap<String, usize>,
    pub rate_by: BTreeMap<String, BTreeMap<String, f64>>,
    pub distributions: BTreeMap<String, Vec<f64>>,
    pub distributions_by_target: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
    pub sample_rows: Vec<Row>,
}

impl DatasetSummary {
    pub fn build(
        dataset: &Dataset,
        target: &str,
        group_columns: &[&str],
        distribution_columns: &[&str],
    ) -> Result<Self> {
        let missing: Vec<&str> = std::iter::once(target)
            .chain(group_columns.iter().copied())
            .chain(distribution_columns.iter().copied())
            .filter(|column| !dataset.has_column(column))
            .collect();
        if !missing.is_empty() {
            return Err(PrepError::Parse(format!(
                "dataset is missing columns: {}",
                missing.join(", ")
            )));
        }

        let rows = &dataset.rows;
        Ok(Self {
            total: rows.len(),
            target_counts: value_counts(rows, target),
            rate_by: group_columns
                .iter()
                .map(|&group| (group.to_string(), rate_by_group(rows, group, target)))
                .collect(),
            distributions: distribution_columns
                .iter()
                .map(|&column| (column.to_string(), numeric_values(rows, column)))
                .collect(),
            distributions_by_target: distribution_columns
                .iter()
                .map(|&column| (column.to_string(), values_by_group(rows, column, target)))
                .collect(),
            sample_rows: rows.iter().take(SAMPLE_ROWS).cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::row;

    fn passengers() -> Vec<Row> {
        vec![
            row([("Sex", RawValue::from("female")), ("Survived", RawValue::Number(1.0)), ("Pclass", RawValue::Number(1.0))]),
            row([("Sex", RawValue::from("male")), ("Survived", RawValue::Number(0.0)), ("Pclass", RawValue::Number(3.0))]),
            row([("Sex", RawValue::from("male")), ("Survived", RawValue::Number(1.0)), ("Pclass", RawValue::Number(3.0))]),
            row([("Sex", RawValue::from("male")), ("Survived", RawValue::Number(0.0)), ("Pclass", RawValue::Missing)]),
        ]
    }

    #[test]
    fn counts_values() {
        let counts = value_counts(&passengers(), "Survived");
        assert_eq!(counts["0"], 2);
        assert_eq!(counts["1"], 2);
    }

    #[test]
    fn survival_rate_by_group() {
        let rates = rate_by_group(&passengers(), "Sex", "Survived");
        assert_eq!(rates["female"], 1.0);
        assert_eq!(rates["male"], 0.3333);

        let by_class = rate_by_group(&passengers(), "Pclass", "Survived");
        assert_eq!(by_class.len(), 2);
        assert_eq!(by_class["3"], 0.5);
    }

    #[test]
    fn ages_split_by_target() {
        let rows = vec![
            row([("Age", RawValue::Number(22.0)), ("Survived", RawValue::Number(0.0))]),
            row([("Age", RawValue::Missing), ("Survived", RawValue::Number(1.0))]),
            row([("Age", RawValue::Number(38.0)), ("Survived", RawValue::Number(1.0))]),
        ];
        let split = values_by_group(&rows, "Age", "Survived");
        assert_eq!(split["0"], vec![22.0]);
        assert_eq!(split["1"], vec![38.0]);
        assert_eq!(numeric_values(&rows, "Age"), vec![22.0, 38.0]);
    }

    #[test]
    fn summary_requires_named_columns() {
        let dataset = Dataset::from_rows(passengers());
        let summary = DatasetSummary::build(&dataset, "Survived", &["Sex"], &[]).unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.rate_by["Sex"]["female"], 1.0);
        assert_eq!(summary.sample_rows.len(), 4);

        let err = DatasetSummary::build(&dataset, "Survived", &["Embarked"], &["Fare"]).unwrap_err();
        assert!(matches!(err, PrepError::Parse(msg) if msg.contains("Embarked, Fare")));
    }
}
