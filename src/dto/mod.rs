pub mod assessment_dto;
pub mod auth_dto;
pub mod job_dto;
pub mod recruiter_dto;
