use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::artifacts::Artifacts;
use crate::encoding::raw_row;
use crate::types::{
    Bounds, Field, InputRecord, BRAND_OPTIONS, FEATURE_COUNT, FEATURE_ORDER, NUMERIC_BOUNDS, OS_OPTIONS,
    OVERHEATING_OPTIONS, USAGE_TYPE_OPTIONS,
};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub artifacts: Arc<Artifacts>,
    pub log_pred: bool,
}

impl AppState {
    pub fn new(artifacts: Artifacts, log_pred: bool) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
            log_pred,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/schema", get(schema))
        .route("/predict", post(predict))
        .with_state(state)
}

// ---------- Response types ----------

#[derive(Serialize, Debug)]
pub struct PredictOut {
    pub prediction: f64,
    pub rounded: f64,
    pub display: String,
    pub features: [f64; FEATURE_COUNT],
}

#[derive(Serialize, Debug)]
pub struct NumericInput {
    pub field: Field,
    #[serde(flatten)]
    pub bounds: Bounds,
}

#[derive(Serialize, Debug)]
pub struct ChoiceInput {
    pub field: Field,
    pub options: Vec<&'static str>,
    pub default: &'static str,
}

#[derive(Serialize, Debug)]
pub struct Schema {
    pub categorical: Vec<ChoiceInput>,
    pub numeric: Vec<NumericInput>,
    pub feature_order: Vec<Field>,
}

// ---------- Handlers ----------

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Describes the input form: choices, numeric ranges and defaults.
pub async fn schema() -> Json<Schema> {
    let choice = |field, options: &[&'static str]| ChoiceInput {
        field,
        options: options.to_vec(),
        default: options[0],
    };
    Json(Schema {
        categorical: vec![
            choice(Field::Brand, &BRAND_OPTIONS),
            choice(Field::Os, &OS_OPTIONS),
            choice(Field::UsageType, &USAGE_TYPE_OPTIONS),
            choice(Field::OverheatingIssues, &OVERHEATING_OPTIONS),
        ],
        numeric: NUMERIC_BOUNDS
            .iter()
            .map(|(field, bounds)| NumericInput {
                field: *field,
                bounds: *bounds,
            })
            .collect(),
        feature_order: FEATURE_ORDER.to_vec(),
    })
}

pub async fn predict(
    State(state): State<AppState>,
    Json(record): Json<InputRecord>,
) -> Result<Json<PredictOut>, (StatusCode, Json<serde_json::Value>)> {
    let record = record.clamped();

    let (x, p) = state
        .artifacts
        .predict(&record)
        .map_err(|e| {
            tracing::error!("inference failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
        })?;

    if state.log_pred {
        let raw = raw_row(&record, &state.artifacts.encodings);
        tracing::info!(
            "predict brand={} os={} usage={} raw={:?} scaled={:?} -> {:.4}",
            record.brand,
            record.operating_system,
            record.usage_type,
            raw,
            x.0,
            p.raw
        );
    }

    Ok(Json(PredictOut {
        prediction: p.raw,
        rounded: p.rounded(),
        display: p.display(),
        features: x.0,
    }))
}
