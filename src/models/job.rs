use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub required_skills: JsonValue,
    pub tools_technologies: JsonValue,
    pub experience_level: String,
    pub created_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn required_skills_vec(&self) -> Vec<String> {
        serde_json::from_value(self.required_skills.clone()).unwrap_or_default()
    }

    pub fn tools_vec(&self) -> Vec<String> {
        serde_json::from_value(self.tools_technologies.clone()).unwrap_or_default()
    }
}
