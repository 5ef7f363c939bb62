use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Deterministic scoring output, written once per submission. Category and
/// total scores never change after evaluation; only the asynchronous
/// composite score in `ai_scores` is updated later.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResult {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub total_score: i32,
    pub mcq_score: i32,
    pub subjective_score: i32,
    pub coding_score: i32,
    pub skill_scores: JsonValue,
    pub disqualified: bool,
    pub evaluated_at: Option<DateTime<Utc>>,
}

/// Resume-derived composite score, upserted per (candidate, job) by the
/// background re-scorer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiScore {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub skills_score: i32,
    pub experience_score: i32,
    pub projects_score: i32,
    pub test_score: i32,
    pub final_weighted_score: Decimal,
    pub ai_summary: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
