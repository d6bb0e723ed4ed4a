//! Заполнение пропусков медианой, модой или константой

use std::collections::{BTreeMap, HashMap};

use crate::error::{PrepError, Result};
use crate::types::{RawValue, Row};

/// Медиана без усреднения: для чётной длины берётся верхний из двух средних элементов.
pub fn impute_median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(sorted[sorted.len() / 2])
}

/// Самое частое значение. При равенстве побеждает встреченное первым.
pub fn impute_mode<T>(values: &[T]) -> Option<T>
where
    T: Clone + Eq + std::hash::Hash,
{
    let mut counts: HashMap<&T, (usize, usize)> = HashMap::new();
    for (position, value) in values.iter().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value.clone())
}

/// Значения заполнения по колонкам. Вычисляются один раз на обучающих данных.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImputationPlan {
    fills: BTreeMap<String, RawValue>,
}

impl ImputationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(rows: &[Row], median_columns: &[&str], mode_columns: &[&str]) -> Result<Self> {
        if rows.is_empty() {
            return Err(PrepError::InvalidSpec(
                "cannot fit imputation on zero rows".to_string(),
            ));
        }

        let mut plan = Self::new();

        for &column in median_columns {
            let observed: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.get(column).and_then(RawValue::as_number))
                .collect();
            let median = impute_median(&observed).ok_or_else(|| {
                PrepError::InvalidSpec(format!("column '{column}' has no numeric values"))
            })?;
            plan.fills.insert(column.to_string(), RawValue::Number(median));
        }

        for &column in mode_columns {
            let observed: Vec<String> = rows
                .iter()
                .filter_map(|r| r.get(column).and_then(|v| v.as_category()))
                .map(|c| c.into_owned())
                .collect();
            let mode = impute_mode(&observed).ok_or_else(|| {
                PrepError::InvalidSpec(format!("column '{column}' has no observed values"))
            })?;
            plan.fills.insert(column.to_string(), RawValue::Text(mode));
        }

        tracing::debug!("Imputation plan fitted for {} columns", plan.fills.len());
        Ok(plan)
    }

    /// Фиксированное значение заполнения (например `children -> 0`).
    pub fn with_constant(mut self, column: &str, value: impl Into<RawValue>) -> Self {
        self.fills.insert(column.to_string(), value.into());
        self
    }

    pub fn fill_value(&self, column: &str) -> Option<&RawValue> {
        self.fills.get(column)
    }

    /// Новая строка с заполненными пропусками. Отсутствующие колонки тоже добавляются.
    pub fn apply(&self, row: &Row) -> Row {
        let mut filled = row.clone();
        for (column, fill) in &self.fills {
            let cell = filled.entry(column.clone()).or_default();
            if cell.is_missing() {
                *cell = fill.clone();
            }
        }
        filled
    }

    pub fn apply_all(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter().map(|r| self.apply(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::row;

    #[test]
    fn median_of_odd_length() {
        assert_eq!(impute_median(&[3.0, 1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn median_of_even_length_takes_upper_middle() {
        assert_eq!(impute_median(&[4.0, 1.0, 3.0, 2.0]), Some(3.0));
        assert_eq!(impute_median(&[]), None);
    }

    #[test]
    fn mode_ties_break_by_first_seen() {
        assert_eq!(impute_mode(&["Q", "S", "S", "Q"]), Some("Q"));
        assert_eq!(impute_mode(&["C", "S", "S"]), Some("S"));
        assert_eq!(impute_mode::<&str>(&[]), None);
    }

    #[test]
    fn plan_fills_only_missing_cells() {
        let rows = vec![
            row([("age", RawValue::Number(22.0)), ("embarked", RawValue::from("S"))]),
            row([("age", RawValue::Number(38.0)), ("embarked", RawValue::from("C"))]),
            row([("age", RawValue::Number(26.0)), ("embarked", RawValue::from("S"))]),
            row([("age", RawValue::Missing), ("embarked", RawValue::Missing)]),
        ];
        let plan = ImputationPlan::fit(&rows, &["age"], &["embarked"]).unwrap();
        assert_eq!(plan.fill_value("age"), Some(&RawValue::Number(26.0)));

        let filled = plan.apply(&rows[3]);
        assert_eq!(filled["age"], RawValue::Number(26.0));
        assert_eq!(filled["embarked"], RawValue::from("S"));

        let untouched = plan.apply(&rows[1]);
        assert_eq!(untouched, rows[1]);
    }

    #[test]
    fn constant_fill_adds_absent_column() {
        let plan = ImputationPlan::new().with_constant("country", "Unknown");
        let filled = plan.apply(&row([("adults", 2.0)]));
        assert_eq!(filled["country"], RawValue::from("Unknown"));
    }

    #[test]
    fn all_missing_column_is_invalid() {
        let rows = vec![row([("age", RawValue::Missing)])];
        let err = ImputationPlan::fit(&rows, &["age"], &[]).unwrap_err();
        assert!(matches!(err, PrepError::InvalidSpec(_)));
    }
}
