use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::assessment_dto::PublicQuestion;
use crate::models::{Job, Question};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    /// Free-text job description; parsed into structured requirements.
    #[validate(length(min = 30, max = 20000))]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job: Job,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
}

/// Candidate-facing job view; questions are included without answer keys.
#[derive(Debug, Serialize)]
pub struct JobDetailResponse {
    pub job: Job,
    pub questions: Vec<PublicQuestion>,
}
