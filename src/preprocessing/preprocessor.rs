//! Сборка матрицы признаков из сырых строк

use std::collections::{BTreeMap, HashMap};

use ndarray::{Array1, Array2};

use crate::error::{PrepError, Result};
use crate::preprocessing::encoding::{collect_categories, one_hot_expand, one_hot_feature_name};
use crate::preprocessing::normalization::{mean_std, standardize};
use crate::preprocessing::spec::{FeatureSlot, PreprocessingSpec};
use crate::types::{RawValue, Row};

pub type FeatureVector = Array1<f64>;
pub type FeatureMatrix = Array2<f64>;

pub struct FeaturePreprocessor;

impl FeaturePreprocessor {
    /// Вектор признаков одной строки. Чистая функция: `row` и `spec` не меняются.
    ///
    /// Пропущенные и нечисловые значения заменяются средним, то есть дают 0.
    pub fn build_feature_vector(row: &Row, spec: &PreprocessingSpec) -> FeatureVector {
        let mut expanded: HashMap<&str, Vec<f64>> = HashMap::new();
        let mut features = Array1::zeros(spec.n_features());

        for (j, slot) in spec.slots().iter().enumerate() {
            let value = match slot {
                FeatureSlot::Numeric { column } => row.get(column).and_then(RawValue::as_number),
                FeatureSlot::OneHot { column, index } => {
                    let encoded = expanded.entry(column.as_str()).or_insert_with(|| {
                        let categories = spec
                            .category_values()
                            .get(column)
                            .map(Vec::as_slice)
                            .unwrap_or(&[]);
                        match row.get(column) {
                            Some(value) => one_hot_expand(value, categories),
                            None => vec![0.0; categories.len()],
                        }
                    });
                    encoded.get(*index).copied()
                }
            };
            features[j] = standardize(value, spec.means()[j], spec.stds()[j]);
        }

        features
    }

    /// Матрица признаков: строка на каждую входную строку, порядок сохраняется.
    pub fn build_feature_matrix(rows: &[Row], spec: &PreprocessingSpec) -> FeatureMatrix {
        let mut matrix = Array2::zeros((rows.len(), spec.n_features()));
        for (i, row) in rows.iter().enumerate() {
            matrix
                .row_mut(i)
                .assign(&Self::build_feature_vector(row, spec));
        }
        matrix
    }

    /// Спецификация по обучающим данным.
    ///
    /// Стандартное отклонение считается по генеральной совокупности (ddof = 0).
    /// Порядок признаков: числовые колонки, затем one-hot компоненты каждой
    /// категориальной колонки в порядке первого появления значений.
    pub fn fit_spec(
        rows: &[Row],
        feature_columns: &[&str],
        categorical_columns: &[&str],
    ) -> Result<PreprocessingSpec> {
        if rows.is_empty() {
            return Err(PrepError::InvalidSpec(
                "cannot fit spec on zero rows".to_string(),
            ));
        }

        let mut feature_names = Vec::new();
        let mut means = Vec::new();
        let mut stds = Vec::new();
        let mut category_values = BTreeMap::new();

        for &column in feature_columns {
            let observed: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.get(column).and_then(RawValue::as_number))
                .collect();
            let (mean, std) = mean_std(&observed).ok_or_else(|| {
                PrepError::InvalidSpec(format!("numeric column '{column}' has no values"))
            })?;

            feature_names.push(column.to_string());
            means.push(mean);
            stds.push(std);
        }

        for &column in categorical_columns {
            let categories = collect_categories(rows.iter().filter_map(|r| r.get(column)));
            if categories.is_empty() {
                return Err(PrepError::InvalidSpec(format!(
                    "categorical column '{column}' has no values"
                )));
            }

            // one-hot компоненты проходят без масштабирования
            for category in &categories {
                feature_names.push(one_hot_feature_name(column, category));
                means.push(0.0);
                stds.push(1.0);
            }
            category_values.insert(column.to_string(), categories);
        }

        let spec = PreprocessingSpec::new(feature_names, means, stds, category_values)?;
        tracing::info!(
            "Preprocessing spec fitted on {} rows: {} features",
            rows.len(),
            spec.n_features()
        );
        Ok(spec)
    }
}
