//! JSON handlers mounted under `/api`

mod error;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

pub use error::ApiError;

use crate::activity::Activity;
use crate::models::{Card, DailyForecast, HistoryEntry};
use crate::service::{CardService, CardSummary};

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub activity_id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn router(service: Arc<CardService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/activities", get(list_activities))
        .route("/cards", get(list_cards).post(create_card))
        .route("/cards/{id}", put(refresh_card).delete(delete_card))
        .route("/cards/{id}/forecast", get(card_forecast))
        .route("/history", get(history))
        .with_state(service)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}

async fn list_activities(State(service): State<Arc<CardService>>) -> Json<Vec<Activity>> {
    Json(service.list_activities())
}

async fn list_cards(State(service): State<Arc<CardService>>) -> ApiResult<Json<Vec<CardSummary>>> {
    Ok(Json(service.list_cards().await?))
}

async fn create_card(
    State(service): State<Arc<CardService>>,
    payload: Result<Json<CreateCardRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let card = service
        .create_card(&request.city, &request.activity_id)
        .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn refresh_card(
    State(service): State<Arc<CardService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Card>> {
    Ok(Json(service.refresh_card(&id).await?))
}

async fn delete_card(
    State(service): State<Arc<CardService>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    service.delete_card(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn card_forecast(
    State(service): State<Arc<CardService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<DailyForecast>>> {
    Ok(Json(service.card_forecast(&id).await?))
}

async fn history(State(service): State<Arc<CardService>>) -> ApiResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(service.history().await?))
}
