//! Per-title attendance ledgers and the duplicate-scan guard.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::StoreError;

/// One scanned attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub course: String,
    pub gender: String,
    pub student_id: String,
    pub year: String,
    /// Scan time as reported by the scanning device.
    pub time: String,
}

/// All participants scanned for one event title, in scan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[serde(rename = "eventQrId")]
    pub id: Uuid,
    pub event_title: String,
    pub participants: Vec<Participant>,
}

impl LedgerEntry {
    pub fn new(event_title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_title: event_title.into(),
            participants: Vec::new(),
        }
    }

    pub fn has_student(&self, student_id: &str) -> bool {
        self.participants.iter().any(|p| p.student_id == student_id)
    }

    /// Append `participant` unless their student ID was already scanned.
    /// The entry is left untouched on rejection.
    pub fn admit(&mut self, participant: Participant) -> Result<&Participant, StoreError> {
        if self.has_student(&participant.student_id) {
            return Err(StoreError::AlreadyScanned);
        }
        self.participants.push(participant);
        Ok(&self.participants[self.participants.len() - 1])
    }
}
