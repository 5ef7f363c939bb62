use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{AssessmentSession, Submission, TestResult};
use crate::services::{candidate_service, job_service, scoring_service};
use crate::services::scoring_service::AnswerScorer;
use crate::session::{
    EvidenceRing, SessionState, SubmitRejected, ViolationOutcome, SESSION_DURATION_SECS,
    SNAPSHOT_CAP,
};
use crate::utils::token::generate_access_token;

/// Grace period past the deadline before the sweeper marks a session
/// expired. Covers clock skew and an in-flight final submit.
const EXPIRY_GRACE_SECS: i64 = 60;

const ACCESS_TOKEN_LEN: usize = 48;

pub async fn start_session(
    pool: &PgPool,
    job_id: Uuid,
    candidate_name: &str,
    candidate_email: &str,
) -> Result<AssessmentSession> {
    // A missing job is a hard failure before any row is written.
    job_service::get_job(pool, job_id).await?;

    let now = Utc::now();
    let state = SessionState::start(now);
    let deadline = now + chrono::Duration::seconds(SESSION_DURATION_SECS);
    let access_token = generate_access_token(ACCESS_TOKEN_LEN);

    let session: AssessmentSession = sqlx::query_as(
        r#"
        INSERT INTO assessment_sessions
            (job_id, candidate_name, candidate_email, access_token, status, started_at, deadline)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(candidate_name)
    .bind(candidate_email.to_lowercase())
    .bind(&access_token)
    .bind(state.status_str())
    .bind(now)
    .bind(deadline)
    .fetch_one(pool)
    .await?;

    tracing::info!(session_id = %session.id, job_id = %job_id, "assessment session started");
    Ok(session)
}

pub async fn find_by_token(pool: &PgPool, access_token: &str) -> Result<AssessmentSession> {
    let session: Option<AssessmentSession> =
        sqlx::query_as("SELECT * FROM assessment_sessions WHERE access_token = $1")
            .bind(access_token)
            .fetch_optional(pool)
            .await?;
    session.ok_or_else(|| Error::NotFound("Session not found".to_string()))
}

/// What the client learns from one violation report. `violations` is the
/// stored count even when the event changed nothing, so a report against an
/// already-terminal session does not pretend the slate is clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolationReport {
    pub violations: u32,
    pub warning: bool,
    pub terminated: bool,
}

fn build_report(
    outcome: ViolationOutcome,
    stored_violations: i32,
    state: &SessionState,
) -> ViolationReport {
    let violations = match outcome {
        ViolationOutcome::Ignored => stored_violations.max(0) as u32,
        other => violation_count(&other),
    };
    ViolationReport {
        violations,
        warning: matches!(outcome, ViolationOutcome::Warning { .. }),
        terminated: matches!(state, SessionState::Disqualified),
    }
}

/// Applies one focus-loss signal to the session under a row lock, so two
/// concurrent reports cannot both count.
pub async fn record_violation(
    pool: &PgPool,
    access_token: &str,
    now: DateTime<Utc>,
) -> Result<ViolationReport> {
    let mut tx = pool.begin().await?;

    let session: Option<AssessmentSession> =
        sqlx::query_as("SELECT * FROM assessment_sessions WHERE access_token = $1 FOR UPDATE")
            .bind(access_token)
            .fetch_optional(&mut *tx)
            .await?;
    let session = session.ok_or_else(|| Error::NotFound("Session not found".to_string()))?;

    let mut state = session.state();
    let outcome = state.record_violation(now);

    if !matches!(outcome, ViolationOutcome::Ignored) {
        let warning_shown = session.warning_shown
            || matches!(
                outcome,
                ViolationOutcome::Warning { .. } | ViolationOutcome::Disqualified { .. }
            );
        sqlx::query(
            r#"
            UPDATE assessment_sessions
            SET status = $2, violations = $3, warning_shown = $4, last_violation_at = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(session.id)
        .bind(state.status_str())
        .bind(violation_count(&outcome) as i32)
        .bind(warning_shown)
        .bind(last_violation_for(&state, &session, now))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    if matches!(outcome, ViolationOutcome::Disqualified { .. }) {
        tracing::warn!(session_id = %session.id, "session disqualified after repeated violations");
    }
    Ok(build_report(outcome, session.violations, &state))
}

fn violation_count(outcome: &ViolationOutcome) -> u32 {
    match outcome {
        ViolationOutcome::Ignored => 0,
        ViolationOutcome::Debounced { violations }
        | ViolationOutcome::Warning { violations }
        | ViolationOutcome::Disqualified { violations } => *violations,
    }
}

fn last_violation_for(
    state: &SessionState,
    session: &AssessmentSession,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match state {
        SessionState::Active { .. } => state.last_violation_at(),
        // The disqualifying violation itself is still evidence.
        SessionState::Disqualified => Some(now),
        _ => session.last_violation_at,
    }
}

/// Rejects frames that are not base64 image payloads before they reach the
/// database. A `data:image/...;base64,` prefix is tolerated.
fn validate_snapshot(image_data: &str) -> Result<()> {
    use base64::Engine;

    let encoded = image_data
        .split_once(";base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(image_data);
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| Error::BadRequest("Snapshot is not valid base64".to_string()))?;
    Ok(())
}

/// Stores one webcam frame, keeping only the newest `SNAPSHOT_CAP` per
/// session. Frames for non-active sessions are dropped.
pub async fn add_snapshot(pool: &PgPool, access_token: &str, image_data: &str) -> Result<bool> {
    validate_snapshot(image_data)?;
    let session = find_by_token(pool, access_token).await?;
    if !session.state().accepts_evidence() {
        return Ok(false);
    }

    let mut tx = pool.begin().await?;
    sqlx::query("INSERT INTO session_snapshots (session_id, image_data) VALUES ($1, $2)")
        .bind(session.id)
        .bind(image_data)
        .execute(&mut *tx)
        .await?;
    trim_snapshots(&mut tx, session.id).await?;
    tx.commit().await?;
    Ok(true)
}

/// Drops everything older than the newest `SNAPSHOT_CAP` frames. Runs after
/// every insert path so streamed and submit-payload frames share one cap.
async fn trim_snapshots(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    session_id: Uuid,
) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM session_snapshots
        WHERE id IN (
            SELECT id FROM session_snapshots
            WHERE session_id = $1
            ORDER BY captured_at DESC
            OFFSET $2
        )
        "#,
    )
    .bind(session_id)
    .bind(SNAPSHOT_CAP as i64)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Accepts the final answer payload and produces the immutable result row.
///
/// A disqualified session may still transmit exactly once; its submission is
/// stored with the disqualification flag set and its total score forced to
/// zero. Submitted and expired sessions reject with a conflict.
pub async fn submit_session(
    pool: &PgPool,
    scorer: &dyn AnswerScorer,
    access_token: &str,
    answers: &HashMap<Uuid, String>,
    snapshots: &[String],
    now: DateTime<Utc>,
) -> Result<(Submission, TestResult)> {
    let mut tx = pool.begin().await?;

    let session: Option<AssessmentSession> =
        sqlx::query_as("SELECT * FROM assessment_sessions WHERE access_token = $1 FOR UPDATE")
            .bind(access_token)
            .fetch_optional(&mut *tx)
            .await?;
    let session = session.ok_or_else(|| Error::NotFound("Session not found".to_string()))?;

    let mut state = session.state();
    let disqualified = match state.submit() {
        Ok(()) => false,
        Err(SubmitRejected::Disqualified) => {
            let existing: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM submissions WHERE session_id = $1")
                    .bind(session.id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if existing.is_some() {
                return Err(Error::Conflict("Session already submitted".to_string()));
            }
            true
        }
        Err(SubmitRejected::AlreadySubmitted) => {
            return Err(Error::Conflict("Session already submitted".to_string()))
        }
        Err(SubmitRejected::Expired) => {
            return Err(Error::Conflict("Session expired".to_string()))
        }
        Err(SubmitRejected::NotStarted) => {
            return Err(Error::BadRequest("Session was never started".to_string()))
        }
    };

    let candidate =
        candidate_service::find_or_create(pool, &session.candidate_name, &session.candidate_email)
            .await?;
    let questions = job_service::job_questions(pool, session.job_id).await?;

    let time_taken = (now - session.started_at)
        .num_seconds()
        .clamp(0, SESSION_DURATION_SECS);

    let submission: Submission = sqlx::query_as(
        r#"
        INSERT INTO submissions (session_id, candidate_id, job_id, answers, time_taken_seconds, disqualified)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(session.id)
    .bind(candidate.id)
    .bind(session.job_id)
    .bind(serde_json::json!(answers))
    .bind(time_taken as i32)
    .bind(disqualified)
    .fetch_one(&mut *tx)
    .await?;

    // Cap the payload's evidence frames, then re-trim so frames streamed
    // earlier and this batch never sum past the cap.
    let mut ring = EvidenceRing::new(SNAPSHOT_CAP);
    ring.extend(snapshots.iter().cloned());
    for frame in ring.into_vec() {
        sqlx::query("INSERT INTO session_snapshots (session_id, image_data) VALUES ($1, $2)")
            .bind(session.id)
            .bind(frame)
            .execute(&mut *tx)
            .await?;
    }
    trim_snapshots(&mut tx, session.id).await?;

    let breakdown = scoring_service::score_submission(&questions, answers, disqualified, scorer);

    let result: TestResult = sqlx::query_as(
        r#"
        INSERT INTO results
            (submission_id, candidate_id, job_id, total_score, mcq_score, subjective_score,
             coding_score, skill_scores, disqualified)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(submission.id)
    .bind(candidate.id)
    .bind(session.job_id)
    .bind(breakdown.total_score)
    .bind(breakdown.mcq_score)
    .bind(breakdown.subjective_score)
    .bind(breakdown.coding_score)
    .bind(serde_json::json!(breakdown.skill_scores))
    .bind(breakdown.disqualified)
    .fetch_one(&mut *tx)
    .await?;

    // A disqualified session keeps its terminal status; a normal submit
    // records the transition.
    if !disqualified {
        sqlx::query(
            r#"
            UPDATE assessment_sessions
            SET status = 'submitted', submitted_at = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(session.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        session_id = %session.id,
        total_score = result.total_score,
        disqualified = result.disqualified,
        "submission evaluated"
    );
    Ok((submission, result))
}

/// Marks overrun active sessions as expired. Runs on a fixed cadence from
/// the server's background loop.
pub async fn sweep_expired(pool: &PgPool, now: DateTime<Utc>) -> Result<u64> {
    let cutoff = now - chrono::Duration::seconds(EXPIRY_GRACE_SECS);
    let res = sqlx::query(
        r#"
        UPDATE assessment_sessions
        SET status = 'expired', updated_at = NOW()
        WHERE status = 'active' AND deadline < $1
        "#,
    )
    .bind(cutoff)
    .execute(pool)
    .await?;
    let swept = res.rows_affected();
    if swept > 0 {
        tracing::info!(swept, "expired abandoned sessions");
    }
    Ok(swept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_and_data_url_base64() {
        assert!(validate_snapshot("aGVsbG8=").is_ok());
        assert!(validate_snapshot("data:image/jpeg;base64,aGVsbG8=").is_ok());
    }

    #[test]
    fn rejects_non_base64_payloads() {
        assert!(validate_snapshot("not base64!!").is_err());
        assert!(validate_snapshot("data:image/jpeg;base64,???").is_err());
    }

    #[test]
    fn ignored_report_echoes_the_stored_violation_count() {
        let report = build_report(ViolationOutcome::Ignored, 2, &SessionState::Disqualified);
        assert_eq!(
            report,
            ViolationReport {
                violations: 2,
                warning: false,
                terminated: true,
            }
        );

        let report = build_report(ViolationOutcome::Ignored, 1, &SessionState::Submitted);
        assert_eq!(report.violations, 1);
        assert!(!report.terminated);
    }

    #[test]
    fn counted_outcomes_report_their_own_tally() {
        let active = SessionState::start(Utc::now());
        let report = build_report(ViolationOutcome::Warning { violations: 1 }, 0, &active);
        assert_eq!(
            report,
            ViolationReport {
                violations: 1,
                warning: true,
                terminated: false,
            }
        );

        let report = build_report(
            ViolationOutcome::Disqualified { violations: 2 },
            1,
            &SessionState::Disqualified,
        );
        assert_eq!(
            report,
            ViolationReport {
                violations: 2,
                warning: false,
                terminated: true,
            }
        );

        let report = build_report(ViolationOutcome::Debounced { violations: 1 }, 1, &active);
        assert_eq!(report.violations, 1);
        assert!(!report.warning);
    }
}
