use axum::extract::{Path, State};
use axum::response::Json;
use axum::Extension;
use uuid::Uuid;
use validator::Validate;

use crate::dto::job_dto::{CreateJobRequest, CreateJobResponse};
use crate::dto::recruiter_dto::{
    CandidateDetail, LeaderboardEntry, LeaderboardResponse, RescoreJobResponse,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::SessionSnapshot;
use crate::services::{job_service, rescore_service};
use crate::AppState;

pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<Json<CreateJobResponse>> {
    payload.validate()?;
    let created_by = claims.sub.parse::<Uuid>().ok();
    let (job, questions) = job_service::create_job_from_description(
        &state.pool,
        &state.ai,
        &payload.description,
        created_by,
    )
    .await?;
    Ok(Json(CreateJobResponse { job, questions }))
}

/// Candidates ranked for a job: composite score first when present, raw test
/// score as the tie-break and the fallback for unscored profiles.
pub async fn leaderboard(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<LeaderboardResponse>> {
    job_service::get_job(&state.pool, job_id).await?;

    let entries: Vec<LeaderboardEntry> = sqlx::query_as(
        r#"
        SELECT c.id AS candidate_id, c.name, c.email,
               r.total_score, r.mcq_score, r.subjective_score, r.coding_score,
               r.disqualified, r.evaluated_at,
               a.final_weighted_score, a.ai_summary
        FROM (
            SELECT DISTINCT ON (candidate_id) *
            FROM results
            WHERE job_id = $1
            ORDER BY candidate_id, evaluated_at DESC
        ) r
        JOIN candidates c ON c.id = r.candidate_id
        LEFT JOIN ai_scores a ON a.candidate_id = r.candidate_id AND a.job_id = $1
        ORDER BY a.final_weighted_score DESC NULLS LAST, r.total_score DESC
        "#,
    )
    .bind(job_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(LeaderboardResponse { job_id, entries }))
}

/// Kicks off a composite rescore for every candidate who submitted for the
/// job and returns as soon as the work is dispatched.
pub async fn rescore_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<RescoreJobResponse>> {
    job_service::get_job(&state.pool, job_id).await?;
    let triggered = rescore_service::rescore_job(&state.pool, &state.ai, job_id).await?;
    Ok(Json(RescoreJobResponse { job_id, triggered }))
}

/// Proctoring evidence captured during a session, oldest first. Never more
/// than the retention cap per session.
pub async fn session_snapshots(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<SessionSnapshot>>> {
    let snapshots: Vec<SessionSnapshot> = sqlx::query_as(
        "SELECT * FROM session_snapshots WHERE session_id = $1 ORDER BY captured_at ASC",
    )
    .bind(session_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(snapshots))
}

pub async fn candidate_detail(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<CandidateDetail>> {
    let detail: Option<CandidateDetail> = sqlx::query_as(
        r#"
        SELECT id, name, email, resume_path,
               parsed_skills, parsed_experience, parsed_projects, parsed_education
        FROM candidates WHERE id = $1
        "#,
    )
    .bind(candidate_id)
    .fetch_optional(&state.pool)
    .await?;
    let detail = detail.ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;
    Ok(Json(detail))
}
