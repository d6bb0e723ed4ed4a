//! Спецификация предобработки: имена признаков, средние, отклонения, категории

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::preprocessing::encoding::one_hot_feature_name;

/// Откуда берётся значение признака.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FeatureSlot {
    Numeric { column: String },
    OneHot { column: String, index: usize },
}

/// Формат артефакта на диске (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecArtifact {
    pub feature_names: Vec<String>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
    #[serde(default)]
    pub category_values: BTreeMap<String, Vec<String>>,
}

/// Замороженная спецификация. После создания не меняется.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpecArtifact", into = "SpecArtifact")]
pub struct PreprocessingSpec {
    feature_names: Vec<String>,
    means: Vec<f64>,
    stds: Vec<f64>,
    category_values: BTreeMap<String, Vec<String>>,
    slots: Vec<FeatureSlot>,
}

impl PreprocessingSpec {
    pub fn new(
        feature_names: Vec<String>,
        means: Vec<f64>,
        stds: Vec<f64>,
        category_values: BTreeMap<String, Vec<String>>,
    ) -> Result<Self> {
        if feature_names.is_empty() {
            return Err(PrepError::InvalidSpec("spec has no features".to_string()));
        }
        if means.len() != feature_names.len() || stds.len() != feature_names.len() {
            return Err(PrepError::InvalidSpec(format!(
                "{} feature names, {} means, {} stds",
                feature_names.len(),
                means.len(),
                stds.len()
            )));
        }
        if let Some(j) = means.iter().position(|m| !m.is_finite()) {
            return Err(PrepError::InvalidSpec(format!(
                "mean of '{}' is not finite",
                feature_names[j]
            )));
        }
        if let Some(j) = stds.iter().position(|s| !s.is_finite() || *s < 0.0) {
            return Err(PrepError::InvalidSpec(format!(
                "std of '{}' is not a finite non-negative number",
                feature_names[j]
            )));
        }

        let mut seen = HashSet::new();
        if let Some(name) = feature_names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(PrepError::InvalidSpec(format!(
                "feature '{name}' appears more than once"
            )));
        }

        let slots = resolve_slots(&feature_names, &category_values)?;

        Ok(Self {
            feature_names,
            means,
            stds,
            category_values,
            slots,
        })
    }

    /// Только числовые признаки, без категорий.
    pub fn numeric(feature_names: Vec<String>, means: Vec<f64>, stds: Vec<f64>) -> Result<Self> {
        Self::new(feature_names, means, stds, BTreeMap::new())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let spec = Self::from_json(&text)?;
        tracing::info!(
            "Loaded preprocessing spec from {}: {} features",
            path.display(),
            spec.n_features()
        );
        Ok(spec)
    }

    /// Разбор JSON-артефакта. Ошибки валидации остаются `InvalidSpec`.
    pub fn from_json(text: &str) -> Result<Self> {
        let artifact: SpecArtifact = serde_json::from_str(text)?;
        Self::try_from(artifact)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!("Saved preprocessing spec to {}", path.display());
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    pub fn category_values(&self) -> &BTreeMap<String, Vec<String>> {
        &self.category_values
    }

    pub(crate) fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    /// Исходные колонки, из которых строятся признаки, в порядке первого использования.
    pub fn source_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for slot in &self.slots {
            let column = match slot {
                FeatureSlot::Numeric { column } | FeatureSlot::OneHot { column, .. } => column.as_str(),
            };
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }
}

/// Имя вида `column_value` считается one-hot компонентой, если такая категория объявлена.
///
/// Имя, которое дают две разные пары (колонка, значение), неоднозначно и отвергается.
fn resolve_slots(
    feature_names: &[String],
    category_values: &BTreeMap<String, Vec<String>>,
) -> Result<Vec<FeatureSlot>> {
    let mut one_hot: HashMap<String, (&str, usize)> = HashMap::new();
    for (column, values) in category_values {
        for (index, value) in values.iter().enumerate() {
            let name = one_hot_feature_name(column, value);
            if let Some(&(other, other_index)) = one_hot.get(&name) {
                return Err(PrepError::InvalidSpec(format!(
                    "one-hot feature '{name}' is ambiguous: '{other}' = '{}' and '{column}' = '{value}'",
                    category_values[other][other_index]
                )));
            }
            one_hot.insert(name, (column.as_str(), index));
        }
    }

    Ok(feature_names
        .iter()
        .map(|name| match one_hot.get(name) {
            Some(&(column, index)) => FeatureSlot::OneHot {
                column: column.to_string(),
                index,
            },
            None => FeatureSlot::Numeric {
                column: name.clone(),
            },
        })
        .collect())
}

impl TryFrom<SpecArtifact> for PreprocessingSpec {
    type Error = PrepError;

    fn try_from(artifact: SpecArtifact) -> Result<Self> {
        Self::new(
            artifact.feature_names,
            artifact.means,
            artifact.stds,
            artifact.category_values,
        )
    }
}

impl From<PreprocessingSpec> for SpecArtifact {
    fn from(spec: PreprocessingSpec) -> Self {
        Self {
            feature_names: spec.feature_names,
            means: spec.means,
            stds: spec.stds,
            category_values: spec.category_values,
        }
    }
}
