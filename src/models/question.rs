use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Subjective,
    Coding,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Subjective => "subjective",
            QuestionType::Coding => "coding",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mcq" => Some(QuestionType::Mcq),
            "subjective" => Some(QuestionType::Subjective),
            "coding" => Some(QuestionType::Coding),
            _ => None,
        }
    }
}

/// One question of a job's assessment. Immutable once authored; `options`
/// and `correct_answer` are present only for MCQ, and `correct_answer`
/// always equals one of the options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub job_id: Uuid,
    pub order_index: i32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
    pub skill: String,
    pub difficulty: String,
}

impl FromRow<'_, PgRow> for Question {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let type_str: String = row.try_get("question_type")?;
        let question_type = QuestionType::parse(&type_str).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown question type: {type_str}").into())
        })?;
        let options: Vec<String> = row
            .try_get::<Option<JsonValue>, _>("options")?
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        Ok(Question {
            id: row.try_get("id")?,
            job_id: row.try_get("job_id")?,
            order_index: row.try_get("order_index")?,
            question_type,
            question: row.try_get("question")?,
            options,
            correct_answer: row.try_get("correct_answer")?,
            skill: row.try_get("skill")?,
            difficulty: row.try_get("difficulty")?,
        })
    }
}
