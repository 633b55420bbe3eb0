use serde::{Deserialize, Serialize};

use crate::{attendance::ledger::LedgerEntry, serde_ext::string_or_number};

/// Body posted by the QR scanner for one attendee.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[serde(default)]
    pub event_title: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub student_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub message: &'static str,
    pub event: LedgerEntry,
}
