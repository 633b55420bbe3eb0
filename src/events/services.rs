use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    events::{dto::CreateEventRequest, repo_types::Event},
    state::AppState,
};

/// Parse a schedule date. Accepts RFC 3339 timestamps, HTML `datetime-local`
/// values (`2024-05-01T09:30`, read as UTC) and bare calendar dates
/// (midnight UTC).
pub fn parse_event_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    if let Ok(ts) = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(ts.assume_utc());
    }
    if let Ok(ts) =
        PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(ts.assume_utc());
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

fn required_date(field: &str, raw: &str) -> Result<OffsetDateTime, AppError> {
    parse_event_date(raw).ok_or_else(|| {
        warn!(field, value = raw, "unparseable event date");
        AppError::Validation(format!("Invalid {field}"))
    })
}

pub async fn create_event(state: &AppState, req: CreateEventRequest) -> Result<Event, AppError> {
    let title = req.event_title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("eventTitle is required".into()));
    }
    let time_limit = req.time_limit.trim();
    if time_limit.is_empty() {
        return Err(AppError::Validation("timeLimit is required".into()));
    }

    let event = Event {
        id: Uuid::new_v4(),
        event_title: title.to_string(),
        due_date: required_date("dueDate", &req.due_date)?,
        time_limit: time_limit.to_string(),
        release_date: required_date("releaseDate", &req.release_date)?,
        created_at: OffsetDateTime::now_utc(),
    };

    state.events.insert(&event).await?;
    info!(event_id = %event.id, title = %event.event_title, "event created");
    Ok(event)
}

pub async fn list_events(state: &AppState) -> Result<Vec<Event>, AppError> {
    Ok(state.events.list().await?)
}
