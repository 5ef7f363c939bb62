use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use validator::Validate;

use crate::dto::assessment_dto::{
    PublicQuestion, SessionStatusResponse, SnapshotRequest, SnapshotResponse,
    StartAssessmentRequest, StartAssessmentResponse, SubmitAssessmentRequest,
    SubmitAssessmentResponse, ViolationResponse,
};
use crate::dto::job_dto::{JobDetailResponse, JobListResponse};
use crate::error::Result;
use crate::services::{job_service, rescore_service, session_service};
use crate::AppState;

pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<JobListResponse>> {
    let jobs = job_service::list_jobs(&state.pool).await?;
    Ok(Json(JobListResponse { jobs }))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<uuid::Uuid>,
) -> Result<Json<JobDetailResponse>> {
    let job = job_service::get_job(&state.pool, job_id).await?;
    let questions = job_service::job_questions(&state.pool, job_id).await?;
    Ok(Json(JobDetailResponse {
        job,
        questions: questions.into_iter().map(PublicQuestion::from).collect(),
    }))
}

/// Starts a proctored attempt and reveals the question set. The answer keys
/// are stripped before the payload leaves the server.
#[utoipa::path(
    post,
    path = "/api/assessment/start",
    request_body = StartAssessmentRequest,
    responses(
        (status = 200, body = StartAssessmentResponse),
        (status = 404, description = "Unknown job")
    )
)]
pub async fn start_assessment(
    State(state): State<AppState>,
    Json(payload): Json<StartAssessmentRequest>,
) -> Result<Json<StartAssessmentResponse>> {
    payload.validate()?;

    let session = session_service::start_session(
        &state.pool,
        payload.job_id,
        &payload.name,
        &payload.email,
    )
    .await?;
    let questions = job_service::job_questions(&state.pool, payload.job_id).await?;

    let now = Utc::now();
    Ok(Json(StartAssessmentResponse {
        session_id: session.id,
        deadline: session.deadline,
        time_remaining_seconds: session.state().time_remaining(now),
        access_token: session.access_token,
        questions: questions.into_iter().map(PublicQuestion::from).collect(),
    }))
}

/// Reports one focus-loss signal from the candidate's browser.
#[utoipa::path(
    post,
    path = "/api/assessment/{token}/violation",
    params(("token" = String, Path, description = "Session access token")),
    responses((status = 200, body = ViolationResponse))
)]
pub async fn report_violation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ViolationResponse>> {
    let report = session_service::record_violation(&state.pool, &token, Utc::now()).await?;
    Ok(Json(ViolationResponse {
        violations: report.violations,
        warning: report.warning,
        terminated: report.terminated,
    }))
}

pub async fn upload_snapshot(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<SnapshotRequest>,
) -> Result<Json<SnapshotResponse>> {
    payload.validate()?;
    let stored = session_service::add_snapshot(&state.pool, &token, &payload.image_data).await?;
    Ok(Json(SnapshotResponse { stored }))
}

pub async fn session_status(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SessionStatusResponse>> {
    let session = session_service::find_by_token(&state.pool, &token).await?;
    let now = Utc::now();
    Ok(Json(SessionStatusResponse {
        status: session.status.clone(),
        violations: session.violations,
        warning_shown: session.warning_shown,
        time_remaining_seconds: session.state().time_remaining(now),
        deadline: session.deadline,
    }))
}

/// Final transmission of an attempt. Scoring is synchronous; the composite
/// resume rescore runs in the background after the response is sent.
#[utoipa::path(
    post,
    path = "/api/assessment/{token}/submit",
    params(("token" = String, Path, description = "Session access token")),
    responses(
        (status = 200, description = "Scored result for the submission"),
        (status = 409, description = "Already submitted or expired")
    )
)]
pub async fn submit_assessment(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<SubmitAssessmentRequest>,
) -> Result<Json<SubmitAssessmentResponse>> {
    let (submission, result) = session_service::submit_session(
        &state.pool,
        state.scorer.as_ref(),
        &token,
        &payload.answers,
        &payload.snapshots,
        Utc::now(),
    )
    .await?;

    rescore_service::spawn_rescore(
        state.pool.clone(),
        state.ai.clone(),
        submission.candidate_id,
        submission.job_id,
    );

    Ok(Json(SubmitAssessmentResponse::from_result(&result)))
}
