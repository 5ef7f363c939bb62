use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable record of one transmitted assessment. Exactly one per session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub session_id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub answers: JsonValue,
    pub time_taken_seconds: i32,
    pub disqualified: bool,
    pub created_at: Option<DateTime<Utc>>,
}
