pub mod assessment;
pub mod auth_routes;
pub mod candidate;
pub mod health;
pub mod recruiter;
pub mod resume;

use axum::middleware::from_fn;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

use crate::dto::assessment_dto::{
    PublicQuestion, SessionStatusResponse, SnapshotRequest, SnapshotResponse,
    StartAssessmentRequest, StartAssessmentResponse, ViolationResponse,
};
use crate::middleware::auth::{require_candidate, require_recruiter};
use crate::middleware::rate_limit::{new_rps_state, rps_middleware};
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        assessment::start_assessment,
        assessment::report_violation,
        assessment::submit_assessment,
    ),
    components(schemas(
        StartAssessmentRequest,
        StartAssessmentResponse,
        PublicQuestion,
        ViolationResponse,
        SnapshotRequest,
        SnapshotResponse,
        SessionStatusResponse,
    ))
)]
pub struct ApiDoc;

pub fn app(state: AppState, public_rps: u32, recruiter_rps: u32) -> Router {
    let public = Router::new()
        .route("/api/jobs", get(assessment::list_jobs))
        .route("/api/jobs/:id", get(assessment::get_job))
        .route("/api/assessment/start", post(assessment::start_assessment))
        .route(
            "/api/assessment/:token/violation",
            post(assessment::report_violation),
        )
        .route(
            "/api/assessment/:token/snapshot",
            post(assessment::upload_snapshot),
        )
        .route(
            "/api/assessment/:token/status",
            get(assessment::session_status),
        )
        .route(
            "/api/assessment/:token/submit",
            post(assessment::submit_assessment),
        )
        .layer(axum::middleware::from_fn_with_state(
            new_rps_state(public_rps),
            rps_middleware,
        ));

    let recruiter = Router::new()
        .route("/api/recruiter/jobs", post(recruiter::create_job))
        .route(
            "/api/recruiter/jobs/:id/leaderboard",
            get(recruiter::leaderboard),
        )
        .route(
            "/api/recruiter/jobs/:id/rescore",
            post(recruiter::rescore_job),
        )
        .route(
            "/api/recruiter/candidates/:id",
            get(recruiter::candidate_detail),
        )
        .route(
            "/api/recruiter/sessions/:id/snapshots",
            get(recruiter::session_snapshots),
        )
        .layer(from_fn(require_recruiter))
        .layer(axum::middleware::from_fn_with_state(
            new_rps_state(recruiter_rps),
            rps_middleware,
        ));

    let candidate = Router::new()
        .route("/api/resume/upload", post(resume::upload_resume))
        .route("/api/candidate/results", get(candidate::my_results))
        .layer(from_fn(require_candidate))
        .layer(axum::middleware::from_fn_with_state(
            new_rps_state(public_rps),
            rps_middleware,
        ));

    let auth = Router::new()
        .route("/api/auth/register", post(auth_routes::register))
        .route("/api/auth/login", post(auth_routes::login))
        .layer(axum::middleware::from_fn_with_state(
            new_rps_state(public_rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(public)
        .merge(recruiter)
        .merge(candidate)
        .merge(auth)
        .with_state(state)
}
