//! Сессия скоринга: замороженная спецификация, модель и (опционально) набор данных

use std::sync::Arc;

use crate::data::Dataset;
use crate::error::{PrepError, Result};
use crate::models::ProbabilisticClassifier;
use crate::preprocessing::{FeatureEngineer, FeatureMatrix, FeaturePreprocessor, PreprocessingSpec};
use crate::types::{DemandForecast, Prediction, Row, ScoredRow, SCORE_COLUMNS};

/// Неизменяемый снимок состояния. Клонируется дёшево, делится между запросами без блокировок.
#[derive(Clone)]
pub struct Session {
    spec: Arc<PreprocessingSpec>,
    model: Arc<dyn ProbabilisticClassifier>,
    dataset: Option<Arc<Dataset>>,
}

impl Session {
    pub fn new(spec: PreprocessingSpec, model: Arc<dyn ProbabilisticClassifier>) -> Result<Self> {
        if model.n_features() != spec.n_features() {
            return Err(PrepError::FeatureMismatch {
                expected: spec.n_features(),
                got: model.n_features(),
            });
        }

        Ok(Self {
            spec: Arc::new(spec),
            model,
            dataset: None,
        })
    }

    /// Новый снимок с загруженным набором данных. Исходная сессия не меняется.
    pub fn with_dataset(&self, dataset: Dataset) -> Self {
        Self {
            spec: Arc::clone(&self.spec),
            model: Arc::clone(&self.model),
            dataset: Some(Arc::new(dataset)),
        }
    }

    pub fn spec(&self) -> &PreprocessingSpec {
        &self.spec
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    pub fn features(&self, rows: &[Row]) -> FeatureMatrix {
        FeaturePreprocessor::build_feature_matrix(rows, &self.spec)
    }

    /// Вероятность и метка для каждой строки, в исходном порядке.
    pub fn score(&self, rows: &[Row]) -> Result<Vec<ScoredRow>> {
        self.score_with_threshold(rows, Prediction::THRESHOLD)
    }

    /// Как `score`, но с заданным порогом положительного класса.
    pub fn score_with_threshold(&self, rows: &[Row], threshold: f64) -> Result<Vec<ScoredRow>> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PrepError::Parse(format!(
                "threshold {threshold} is outside [0, 1]"
            )));
        }
        if let Some(column) = rows
            .iter()
            .flat_map(|r| r.keys())
            .find(|k| SCORE_COLUMNS.contains(&k.as_str()))
        {
            return Err(PrepError::Parse(format!(
                "input column '{column}' clashes with scoring output"
            )));
        }

        let features = self.features(rows);
        let probabilities = self.model.predict_proba(&features)?;

        if probabilities.len() != rows.len() {
            return Err(PrepError::InvalidModel(format!(
                "model returned {} probabilities for {} rows",
                probabilities.len(),
                rows.len()
            )));
        }

        let scored: Vec<ScoredRow> = rows
            .iter()
            .zip(probabilities.iter())
            .map(|(row, &p)| {
                let probability = p.clamp(0.0, 1.0);
                ScoredRow {
                    row: row.clone(),
                    probability,
                    prediction: Prediction::with_threshold(probability, threshold),
                }
            })
            .collect();

        tracing::debug!("Scored {} rows at threshold {}", scored.len(), threshold);
        Ok(scored)
    }

    /// Скоринг загруженного набора данных.
    pub fn score_dataset(&self) -> Result<Vec<ScoredRow>> {
        self.score_dataset_with_threshold(Prediction::THRESHOLD)
    }

    pub fn score_dataset_with_threshold(&self, threshold: f64) -> Result<Vec<ScoredRow>> {
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| PrepError::Parse("no dataset loaded".to_string()))?;
        self.check_columns(dataset)?;
        self.score_with_threshold(&dataset.rows, threshold)
    }

    /// Все исходные колонки спецификации должны быть в заголовке набора.
    /// Пустые ячейки допустимы, отсутствующая колонка нет.
    pub fn check_columns(&self, dataset: &Dataset) -> Result<()> {
        let missing: Vec<&str> = self
            .spec
            .source_columns()
            .into_iter()
            .filter(|column| !dataset.has_column(column))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PrepError::Parse(format!(
                "dataset is missing required columns: {}",
                missing.join(", ")
            )))
        }
    }

    /// Спрос по бронированию: модель сессии трактуется как модель отмен.
    pub fn forecast_demand(&self, booking: &Row) -> Result<DemandForecast> {
        let derived = FeatureEngineer::derive_booking_features(booking);
        let scored = self.score(std::slice::from_ref(&derived))?;
        let probability = scored
            .first()
            .map(|s| s.probability)
            .ok_or_else(|| PrepError::InvalidModel("no probability for booking".to_string()))?;
        Ok(DemandForecast::from_cancellation_probability(probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogisticModel;
    use crate::types::{row, RawValue};

    fn session() -> Session {
        let spec = PreprocessingSpec::numeric(vec!["age".to_string()], vec![30.0], vec![10.0]).unwrap();
        let model = LogisticModel::new(vec![1.0], 0.0).unwrap();
        Session::new(spec, Arc::new(model)).unwrap()
    }

    #[test]
    fn scores_rows_in_order() {
        let rows = vec![row([("age", 50.0)]), row([("age", 10.0)]), row([("age", RawValue::Missing)])];
        let scored = session().score(&rows).unwrap();

        assert_eq!(scored.len(), 3);
        assert_eq!(scored[0].prediction, Prediction::Positive);
        assert_eq!(scored[1].prediction, Prediction::Negative);
        // пропуск -> признак 0 -> вероятность 0.5
        assert_eq!(scored[2].probability, 0.5);
        assert_eq!(scored[2].prediction, Prediction::Positive);
        assert_eq!(scored[0].row, rows[0]);
    }

    #[test]
    fn empty_batch_is_not_an_error() {
        assert!(session().score(&[]).unwrap().is_empty());
    }

    #[test]
    fn model_width_must_match_spec() {
        let spec = PreprocessingSpec::numeric(vec!["age".to_string()], vec![30.0], vec![10.0]).unwrap();
        let model = LogisticModel::new(vec![1.0, 2.0], 0.0).unwrap();
        let err = Session::new(spec, Arc::new(model)).err().unwrap();
        assert!(matches!(err, PrepError::FeatureMismatch { expected: 1, got: 2 }));
    }

    #[test]
    fn dataset_snapshot_does_not_touch_original() {
        let base = session();
        let loaded = base.with_dataset(Dataset::from_rows(vec![row([("age", 40.0)])]));

        assert!(base.dataset().is_none());
        assert!(base.score_dataset().is_err());
        assert_eq!(loaded.score_dataset().unwrap().len(), 1);
    }

    #[test]
    fn custom_threshold_changes_labels_only() {
        let rows = vec![row([("age", 25.0)])];
        let default = session().score(&rows).unwrap();
        let lowered = session().score_with_threshold(&rows, 0.3).unwrap();

        assert_eq!(default[0].probability, lowered[0].probability);
        assert_eq!(default[0].prediction, Prediction::Negative);
        assert_eq!(lowered[0].prediction, Prediction::Positive);
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let rows = vec![row([("age", 25.0)])];
        assert!(matches!(session().score_with_threshold(&rows, 1.5), Err(PrepError::Parse(_))));
        assert!(matches!(session().score_with_threshold(&rows, f64::NAN), Err(PrepError::Parse(_))));
    }

    #[test]
    fn dataset_without_source_columns_is_rejected() {
        let dataset = Dataset::new(
            vec!["customer".to_string(), "notes".to_string()],
            vec![row([("customer", "c1"), ("notes", "vip")])],
        );
        let err = session().with_dataset(dataset).score_dataset().unwrap_err();
        assert!(matches!(err, PrepError::Parse(msg) if msg.contains("age")));
    }

    #[test]
    fn empty_cells_in_present_column_are_still_scored() {
        let dataset = Dataset::new(
            vec!["age".to_string()],
            vec![row([("age", RawValue::Missing)])],
        );
        let scored = session().with_dataset(dataset).score_dataset().unwrap();
        assert_eq!(scored[0].probability, 0.5);
    }

    #[test]
    fn scoring_output_columns_are_reserved() {
        let rows = vec![row([("age", 25.0), ("probability", 0.9)])];
        let err = session().score(&rows).unwrap_err();
        assert!(matches!(err, PrepError::Parse(msg) if msg.contains("'probability'")));
    }

    #[test]
    fn booking_demand_is_inverse_of_cancellation() {
        let spec = PreprocessingSpec::numeric(
            vec!["total_guests".to_string()],
            vec![2.0],
            vec![1.0],
        )
        .unwrap();
        let model = LogisticModel::new(vec![1.0], 0.0).unwrap();
        let session = Session::new(spec, Arc::new(model)).unwrap();

        // 2 гостя -> признак 0 -> отмена 0.5
        let forecast = session
            .forecast_demand(&row([("adults", 2.0), ("children", 0.0), ("babies", 0.0)]))
            .unwrap();
        assert_eq!(forecast.cancellation_probability, 0.5);
        assert_eq!(forecast.demand_confidence, 0.5);
        assert_eq!(forecast.demand_level, "Medium");
    }
}
