/// Типы данных для предобработки и скоринга

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Значение ячейки после парсинга CSV/JSON.
///
/// В JSON: число, строка или `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawValue {
    /// Числовое значение ячейки. Пустые и нечисловые значения дают `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(x) if x.is_finite() => Some(*x),
            RawValue::Number(_) => None,
            RawValue::Text(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
            RawValue::Missing => None,
        }
    }

    /// Значение как категория для one-hot.
    ///
    /// Целые числа пишутся без дробной части, чтобы `3` и `"3"` совпадали.
    pub fn as_category(&self) -> Option<Cow<'_, str>> {
        match self {
            RawValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Cow::Borrowed(trimmed))
                }
            }
            RawValue::Number(x) if x.is_finite() => Some(Cow::Owned(format_number(*x))),
            RawValue::Number(_) | RawValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            RawValue::Missing => true,
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Number(x) => !x.is_finite(),
        }
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        RawValue::Number(x)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

pub(crate) fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        x.to_string()
    }
}

/// Строка таблицы: колонка -> значение.
pub type Row = BTreeMap<String, RawValue>;

/// Собрать строку из пар (колонка, значение).
pub fn row<K, V, I>(cells: I) -> Row
where
    K: Into<String>,
    V: Into<RawValue>,
    I: IntoIterator<Item = (K, V)>,
{
    cells
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prediction {
    Positive,
    Negative,
}

impl Prediction {
    pub const THRESHOLD: f64 = 0.5;

    /// `probability >= 0.5` -> Positive
    pub fn from_probability(probability: f64) -> Self {
        Self::with_threshold(probability, Self::THRESHOLD)
    }

    pub fn with_threshold(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Prediction::Positive
        } else {
            Prediction::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Positive => "positive",
            Prediction::Negative => "negative",
        }
    }
}

/// Колонки, которые добавляет скоринг. Во входных строках запрещены.
pub const SCORE_COLUMNS: [&str; 2] = ["probability", "prediction"];

/// Исходная строка + результат модели.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRow {
    #[serde(flatten)]
    pub row: Row,
    pub probability: f64,
    pub prediction: Prediction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub rows: Vec<Row>,
    /// Порог положительного класса, по умолчанию 0.5.
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub results: Vec<ScoredRow>,
    pub positive_count: usize,
    pub total: usize,
}

impl PredictResponse {
    pub fn from_results(results: Vec<ScoredRow>) -> Self {
        let positive_count = results
            .iter()
            .filter(|r| r.prediction == Prediction::Positive)
            .count();
        Self {
            total: results.len(),
            positive_count,
            results,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRequest {
    pub demand_confidence: f64,
    pub competition_price: f64,
    #[serde(default = "default_season_factor")]
    pub season_factor: f64,
    #[serde(default = "default_hotel_type")]
    pub hotel_type: String,
    #[serde(default = "default_room_type")]
    pub room_type: String,
}

/// Цена по бронированию: спрос оценивает модель отмен.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPriceRequest {
    pub booking: Row,
    pub competition_price: f64,
    #[serde(default = "default_season_factor")]
    pub season_factor: f64,
    #[serde(default = "default_hotel_type")]
    pub hotel_type: String,
    #[serde(default = "default_room_type")]
    pub room_type: String,
}

impl BookingPriceRequest {
    pub fn price_request(&self, demand_confidence: f64) -> PriceRequest {
        PriceRequest {
            demand_confidence,
            competition_price: self.competition_price,
            season_factor: self.season_factor,
            hotel_type: self.hotel_type.clone(),
            room_type: self.room_type.clone(),
        }
    }
}

fn default_season_factor() -> f64 { 1.0 }
fn default_hotel_type() -> String { "Resort".to_string() }
fn default_room_type() -> String { "Standard".to_string() }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub optimal_price: f64,
    pub base_price: f64,
    pub demand_multiplier: f64,
    pub competition_adjustment: f64,
    pub season_adjustment: f64,
    pub room_multiplier: f64,
    pub pricing_strategy: String,
    pub demand_level: String,
    pub expected_occupancy: f64,
}

/// Оценка спроса по вероятности отмены бронирования.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    pub demand_confidence: f64,
    pub cancellation_probability: f64,
    pub demand_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingQuote {
    pub forecast: DemandForecast,
    pub quote: PriceQuote,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_parse_from_text() {
        assert_eq!(RawValue::from("50").as_number(), Some(50.0));
        assert_eq!(RawValue::from(" 2.5 ").as_number(), Some(2.5));
        assert_eq!(RawValue::from("").as_number(), None);
        assert_eq!(RawValue::from("abc").as_number(), None);
        assert_eq!(RawValue::Number(f64::NAN).as_number(), None);
        assert_eq!(RawValue::Missing.as_number(), None);
    }

    #[test]
    fn integral_numbers_match_text_categories() {
        assert_eq!(RawValue::Number(3.0).as_category().as_deref(), Some("3"));
        assert_eq!(RawValue::from("3").as_category().as_deref(), Some("3"));
        assert_eq!(RawValue::Number(1.5).as_category().as_deref(), Some("1.5"));
        assert_eq!(RawValue::from("  ").as_category(), None);
    }

    #[test]
    fn raw_values_deserialize_untagged() {
        let parsed: Row = serde_json::from_str(r#"{"age": 30, "sex": "male", "cabin": null}"#).unwrap();
        assert_eq!(parsed["age"], RawValue::Number(30.0));
        assert_eq!(parsed["sex"], RawValue::from("male"));
        assert_eq!(parsed["cabin"], RawValue::Missing);
    }

    #[test]
    fn prediction_threshold_is_inclusive() {
        assert_eq!(Prediction::from_probability(0.5), Prediction::Positive);
        assert_eq!(Prediction::from_probability(0.49), Prediction::Negative);
        assert_eq!(Prediction::with_threshold(0.3, 0.3), Prediction::Positive);
        assert_eq!(Prediction::with_threshold(0.29, 0.3).as_str(), "negative");
    }

    #[test]
    fn predict_request_threshold_is_optional() {
        let request: PredictRequest = serde_json::from_str(r#"{"rows": []}"#).unwrap();
        assert_eq!(request.threshold, None);
        let request: PredictRequest =
            serde_json::from_str(r#"{"rows": [], "threshold": 0.3}"#).unwrap();
        assert_eq!(request.threshold, Some(0.3));
    }

    #[test]
    fn scored_row_flattens_original_columns() {
        let scored = ScoredRow {
            row: row([("tenure", 12.0)]),
            probability: 0.8,
            prediction: Prediction::Positive,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["tenure"], 12.0);
        assert_eq!(json["prediction"], "positive");
    }
}
