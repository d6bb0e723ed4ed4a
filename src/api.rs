/// HTTP API для скоринга и ценообразования

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::data::{parse_csv_str, scored_to_csv};
use crate::error::PrepError;
use crate::models::{DatasetSummary, PricingOptimizer};
use crate::preprocessing::PreprocessingSpec;
use crate::session::Session;
use crate::types::{
    BookingPriceRequest, BookingQuote, PredictRequest, PredictResponse, Prediction, PriceQuote,
    PriceRequest,
};

#[derive(Clone)]
pub struct AppState {
    pub session: Session,
    pub pricing: Arc<PricingOptimizer>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            pricing: Arc::new(PricingOptimizer::new()),
        }
    }
}

#[derive(Debug)]
pub struct ApiError(PrepError);

impl From<PrepError> for ApiError {
    fn from(err: PrepError) -> Self {
        ApiError(err)
    }
}

// Ошибки разбора тела и query отдаются тем же JSON, что и остальные
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(PrepError::Parse(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(PrepError::Parse(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PrepError::Parse(_) => StatusCode::BAD_REQUEST,
            PrepError::InvalidSpec(_) | PrepError::FeatureMismatch { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PrepError::InvalidModel(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!("Request failed: {}", self.0);
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/spec", get(spec))
        .route("/api/predict", post(predict))
        .route("/api/predict-csv", post(predict_csv))
        .route("/api/price", post(price))
        .route("/api/price-booking", post(price_booking))
        .route("/api/summary", post(summary))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Tabular ML API (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn spec(State(state): State<AppState>) -> Json<PreprocessingSpec> {
    Json(state.session.spec().clone())
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
struct CsvScoreParams {
    threshold: Option<f64>,
    #[serde(default)]
    format: OutputFormat,
}

#[derive(Debug, Deserialize)]
struct SummaryParams {
    target: String,
    #[serde(default)]
    group_by: String,
    #[serde(default)]
    distribution: String,
}

/// "Sex,Pclass" -> ["Sex", "Pclass"]
fn split_columns(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    tracing::info!("Predict request: {} rows", request.rows.len());

    let threshold = request.threshold.unwrap_or(Prediction::THRESHOLD);
    let results = state.session.score_with_threshold(&request.rows, threshold)?;
    Ok(Json(PredictResponse::from_results(results)))
}

async fn predict_csv(
    State(state): State<AppState>,
    params: Result<Query<CsvScoreParams>, QueryRejection>,
    body: String,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let dataset = parse_csv_str(&body)?;
    tracing::info!("Predict CSV request: {} rows", dataset.len());

    let columns = dataset.columns.clone();
    let threshold = params.threshold.unwrap_or(Prediction::THRESHOLD);
    let results = state
        .session
        .with_dataset(dataset)
        .score_dataset_with_threshold(threshold)?;

    match params.format {
        OutputFormat::Json => Ok(Json(PredictResponse::from_results(results)).into_response()),
        OutputFormat::Csv => {
            let text = scored_to_csv(&columns, &results)?;
            Ok(([(header::CONTENT_TYPE, "text/csv")], text).into_response())
        }
    }
}

async fn price(
    State(state): State<AppState>,
    payload: Result<Json<PriceRequest>, JsonRejection>,
) -> Result<Json<PriceQuote>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(
        "Price request: demand {:.2}, competition {:.2}",
        request.demand_confidence,
        request.competition_price
    );
    Ok(Json(state.pricing.optimal_price(&request)))
}

async fn price_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingPriceRequest>, JsonRejection>,
) -> Result<Json<BookingQuote>, ApiError> {
    let Json(request) = payload?;
    let forecast = state.session.forecast_demand(&request.booking)?;
    tracing::info!(
        "Booking price request: cancellation {:.3}, demand {}",
        forecast.cancellation_probability,
        forecast.demand_level
    );

    let quote = state
        .pricing
        .optimal_price(&request.price_request(forecast.demand_confidence));
    Ok(Json(BookingQuote { forecast, quote }))
}

async fn summary(
    params: Result<Query<SummaryParams>, QueryRejection>,
    body: String,
) -> Result<Json<DatasetSummary>, ApiError> {
    let Query(params) = params?;
    let dataset = parse_csv_str(&body)?;
    tracing::info!("Summary request: {} rows, target {}", dataset.len(), params.target);

    let summary = DatasetSummary::build(
        &dataset,
        &params.target,
        &split_columns(&params.group_by),
        &split_columns(&params.distribution),
    )?;
    Ok(Json(summary))
}
