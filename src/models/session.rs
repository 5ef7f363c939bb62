use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::session::SessionState;

/// Persisted form of a candidate's proctored attempt. The state machine in
/// `crate::session` is rehydrated from this row, applied one event, and the
/// outcome written back.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentSession {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub access_token: String,
    pub status: String,
    pub violations: i32,
    pub warning_shown: bool,
    pub last_violation_at: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    pub fn state(&self) -> SessionState {
        SessionState::from_persisted(
            &self.status,
            self.violations.max(0) as u32,
            self.warning_shown,
            self.last_violation_at,
            self.deadline,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub session_id: Uuid,
    pub image_data: String,
    pub captured_at: DateTime<Utc>,
}
