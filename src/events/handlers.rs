use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AppError,
    events::{
        dto::{CreateEventRequest, CreatedEventResponse},
        repo_types::Event,
        services,
    },
    state::AppState,
};

pub fn event_routes() -> Router<AppState> {
    Router::new().route("/events", get(list_events).post(create_event))
}

#[instrument(skip(state, payload))]
pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedEventResponse>), AppError> {
    let Json(payload) = payload?;
    let event = services::create_event(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedEventResponse {
            message: "Event created successfully!",
            event,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(services::list_events(&state).await?))
}
