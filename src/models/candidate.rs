use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub resume_path: Option<String>,
    pub parsed_skills: Option<JsonValue>,
    pub parsed_experience: Option<JsonValue>,
    pub parsed_projects: Option<JsonValue>,
    pub parsed_education: Option<JsonValue>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Candidate {
    pub fn skills_vec(&self) -> Vec<String> {
        self.parsed_skills
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}
