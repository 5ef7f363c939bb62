use axum::extract::State;
use axum::response::Json;
use axum::Extension;

use crate::dto::assessment_dto::MyResultEntry;
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::AppState;

/// The authenticated candidate's results across all jobs, newest first.
pub async fn my_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<MyResultEntry>>> {
    let entries: Vec<MyResultEntry> = sqlx::query_as(
        r#"
        SELECT r.job_id, j.title AS job_title,
               r.total_score, r.mcq_score, r.subjective_score, r.coding_score,
               r.disqualified, r.evaluated_at,
               a.final_weighted_score
        FROM results r
        JOIN candidates c ON c.id = r.candidate_id
        JOIN jobs j ON j.id = r.job_id
        LEFT JOIN ai_scores a ON a.candidate_id = r.candidate_id AND a.job_id = r.job_id
        WHERE c.email = $1
        ORDER BY r.evaluated_at DESC
        "#,
    )
    .bind(claims.email.to_lowercase())
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(entries))
}
