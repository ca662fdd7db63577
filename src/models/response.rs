// src/models/response.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::submission::Answers;

/// Store-assigned identifier of a response record.
pub type ResponseId = i64;

/// A persisted survey submission. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: ResponseId,
    pub respondent_name: String,
    /// Assigned by the store at write time.
    pub submitted_at: DateTime<Utc>,
    pub answers: Answers,
}

/// Response body for an accepted submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponseReply {
    pub id: ResponseId,
    pub message: String,
}

/// DTO for the destructive wipe. `confirm` must be explicitly `true`.
#[derive(Debug, Default, Deserialize)]
pub struct WipeRequest {
    #[serde(default)]
    pub confirm: bool,
}
