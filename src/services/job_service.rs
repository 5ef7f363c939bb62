use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Job, Question, QuestionType};
use crate::services::ai_service::{AiService, QuestionCounts};

/// Creates a job from a raw description: the description is parsed into
/// structured requirements, the assessment question set is generated, and
/// everything is stored in one transaction.
pub async fn create_job_from_description(
    pool: &PgPool,
    ai: &AiService,
    description: &str,
    created_by: Option<Uuid>,
) -> Result<(Job, Vec<Question>)> {
    let parsed = ai.parse_job_description(description).await?;
    let generated = ai
        .generate_questions(&parsed, QuestionCounts::default())
        .await?;

    let mut tx = pool.begin().await?;

    let job: Job = sqlx::query_as(
        r#"
        INSERT INTO jobs (title, description, required_skills, tools_technologies, experience_level, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&parsed.title)
    .bind(description)
    .bind(json!(parsed.required_skills))
    .bind(json!(parsed.tools_technologies))
    .bind(&parsed.experience_level)
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await?;

    let mut questions = Vec::new();
    let mut order_index = 0i32;

    for mcq in &generated.mcqs {
        let q = insert_question(
            &mut tx,
            job.id,
            order_index,
            QuestionType::Mcq,
            &mcq.question,
            Some(json!(mcq.options)),
            Some(mcq.correct_answer.as_str()),
            &mcq.skill,
            &mcq.difficulty,
        )
        .await?;
        questions.push(q);
        order_index += 1;
    }
    for subj in &generated.subjective {
        let q = insert_question(
            &mut tx,
            job.id,
            order_index,
            QuestionType::Subjective,
            &subj.question,
            None,
            None,
            &subj.skill,
            &subj.difficulty,
        )
        .await?;
        questions.push(q);
        order_index += 1;
    }
    for coding in &generated.coding {
        let q = insert_question(
            &mut tx,
            job.id,
            order_index,
            QuestionType::Coding,
            &coding.question,
            None,
            None,
            &coding.skill,
            &coding.difficulty,
        )
        .await?;
        questions.push(q);
        order_index += 1;
    }

    tx.commit().await?;

    tracing::info!(job_id = %job.id, questions = questions.len(), "job created");
    Ok((job, questions))
}

#[allow(clippy::too_many_arguments)]
async fn insert_question(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    job_id: Uuid,
    order_index: i32,
    question_type: QuestionType,
    question: &str,
    options: Option<serde_json::Value>,
    correct_answer: Option<&str>,
    skill: &str,
    difficulty: &str,
) -> Result<Question> {
    let q: Question = sqlx::query_as(
        r#"
        INSERT INTO questions (job_id, order_index, question_type, question, options, correct_answer, skill, difficulty)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(order_index)
    .bind(question_type.as_str())
    .bind(question)
    .bind(options)
    .bind(correct_answer)
    .bind(skill)
    .bind(difficulty)
    .fetch_one(&mut **tx)
    .await?;
    Ok(q)
}

pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<Job> {
    let job: Option<Job> = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?;
    job.ok_or_else(|| Error::NotFound("Job not found".to_string()))
}

pub async fn list_jobs(pool: &PgPool) -> Result<Vec<Job>> {
    let jobs = sqlx::query_as("SELECT * FROM jobs ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(jobs)
}

/// Questions in their authored order.
pub async fn job_questions(pool: &PgPool, job_id: Uuid) -> Result<Vec<Question>> {
    let questions = sqlx::query_as(
        "SELECT * FROM questions WHERE job_id = $1 ORDER BY order_index ASC",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;
    Ok(questions)
}
