use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    attendance::{
        dto::{ScanRequest, ScanResponse},
        ledger::LedgerEntry,
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/scanEvent", post(scan_event))
        .route("/scanEvent/:eventTitle", get(get_scan_event))
        .route("/scanEvents", get(list_scan_events))
}

#[instrument(skip(state, payload))]
pub async fn scan_event(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, AppError> {
    let Json(payload) = payload?;
    let event = services::scan(&state, payload).await?;
    Ok(Json(ScanResponse {
        message: "Participant scanned successfully!",
        event,
    }))
}

#[instrument(skip(state))]
pub async fn get_scan_event(
    State(state): State<AppState>,
    Path(event_title): Path<String>,
) -> Result<Json<LedgerEntry>, AppError> {
    Ok(Json(services::get_by_title(&state, &event_title).await?))
}

#[instrument(skip(state))]
pub async fn list_scan_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<LedgerEntry>>, AppError> {
    Ok(Json(services::list_all(&state).await?))
}
