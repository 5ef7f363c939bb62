use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of a job's ranked candidate list. Joins the deterministic test
/// result with the background composite score, which may not exist yet.
#[derive(Debug, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub candidate_id: Uuid,
    pub name: String,
    pub email: String,
    pub total_score: i32,
    pub mcq_score: i32,
    pub subjective_score: i32,
    pub coding_score: i32,
    pub disqualified: bool,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub final_weighted_score: Option<Decimal>,
    pub ai_summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub job_id: Uuid,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CandidateDetail {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub resume_path: Option<String>,
    pub parsed_skills: Option<JsonValue>,
    pub parsed_experience: Option<JsonValue>,
    pub parsed_projects: Option<JsonValue>,
    pub parsed_education: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
pub struct RescoreJobResponse {
    pub job_id: Uuid,
    /// Candidates handed to the background re-scorer, not yet completed.
    pub triggered: u64,
}
