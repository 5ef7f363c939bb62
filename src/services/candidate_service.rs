use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Candidate;
use crate::services::ai_service::ParsedResume;

/// Candidates are keyed by email. A returning candidate keeps their row and
/// any parsed resume data; only the display name is refreshed.
pub async fn find_or_create(pool: &PgPool, name: &str, email: &str) -> Result<Candidate> {
    let candidate: Candidate = sqlx::query_as(
        r#"
        INSERT INTO candidates (name, email)
        VALUES ($1, $2)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name, updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(email.to_lowercase())
    .fetch_one(pool)
    .await?;
    Ok(candidate)
}

pub async fn get_candidate(pool: &PgPool, candidate_id: Uuid) -> Result<Candidate> {
    let candidate: Option<Candidate> = sqlx::query_as("SELECT * FROM candidates WHERE id = $1")
        .bind(candidate_id)
        .fetch_optional(pool)
        .await?;
    candidate.ok_or_else(|| Error::NotFound("Candidate not found".to_string()))
}

/// Stores the structured profile extracted from an uploaded resume.
pub async fn apply_parsed_resume(
    pool: &PgPool,
    candidate_id: Uuid,
    resume_path: &str,
    parsed: &ParsedResume,
) -> Result<Candidate> {
    let candidate: Candidate = sqlx::query_as(
        r#"
        UPDATE candidates
        SET resume_path = $2,
            parsed_skills = $3,
            parsed_experience = $4,
            parsed_projects = $5,
            parsed_education = $6,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(candidate_id)
    .bind(resume_path)
    .bind(serde_json::json!(parsed.skills))
    .bind(&parsed.experience)
    .bind(&parsed.projects)
    .bind(&parsed.education)
    .fetch_one(pool)
    .await?;
    Ok(candidate)
}
