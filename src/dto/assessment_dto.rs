use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Question, TestResult};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StartAssessmentRequest {
    pub job_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

/// A question as the candidate sees it. MCQ answer keys never leave the
/// server.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub order_index: i32,
    #[serde(rename = "type")]
    pub question_type: String,
    pub question: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub skill: String,
    pub difficulty: String,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            order_index: q.order_index,
            question_type: q.question_type.as_str().to_string(),
            question: q.question,
            options: q.options,
            skill: q.skill,
            difficulty: q.difficulty,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StartAssessmentResponse {
    pub session_id: Uuid,
    pub access_token: String,
    pub deadline: DateTime<Utc>,
    pub time_remaining_seconds: i64,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ViolationResponse {
    pub violations: u32,
    /// True exactly once, on the first counted violation.
    pub warning: bool,
    pub terminated: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SnapshotRequest {
    /// Base64-encoded webcam frame.
    #[validate(length(min = 1))]
    pub image_data: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotResponse {
    pub stored: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStatusResponse {
    pub status: String,
    pub violations: i32,
    pub warning_shown: bool,
    pub time_remaining_seconds: i64,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAssessmentRequest {
    #[serde(default)]
    pub answers: HashMap<Uuid, String>,
    /// Final batch of evidence frames captured during the attempt.
    #[serde(default)]
    pub snapshots: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAssessmentResponse {
    pub submission_id: Uuid,
    pub total_score: i32,
    pub mcq_score: i32,
    pub subjective_score: i32,
    pub coding_score: i32,
    pub skill_scores: BTreeMap<String, i32>,
    pub disqualified: bool,
}

/// One of the authenticated candidate's own results, joined with the job it
/// belongs to and the composite score when the re-scorer has produced one.
#[derive(Debug, Serialize, FromRow)]
pub struct MyResultEntry {
    pub job_id: Uuid,
    pub job_title: String,
    pub total_score: i32,
    pub mcq_score: i32,
    pub subjective_score: i32,
    pub coding_score: i32,
    pub disqualified: bool,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub final_weighted_score: Option<Decimal>,
}

impl SubmitAssessmentResponse {
    pub fn from_result(result: &TestResult) -> Self {
        SubmitAssessmentResponse {
            submission_id: result.submission_id,
            total_score: result.total_score,
            mcq_score: result.mcq_score,
            subjective_score: result.subjective_score,
            coding_score: result.coding_score,
            skill_scores: serde_json::from_value(result.skill_scores.clone()).unwrap_or_default(),
            disqualified: result.disqualified,
        }
    }
}
