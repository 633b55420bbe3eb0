use serde::{Deserialize, Serialize};

use crate::events::repo_types::Event;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub event_title: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub time_limit: String,
    #[serde(default)]
    pub release_date: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedEventResponse {
    pub message: &'static str,
    pub event: Event,
}
