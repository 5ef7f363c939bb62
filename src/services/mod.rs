pub mod ai_service;
pub mod candidate_service;
pub mod job_service;
pub mod rescore_service;
pub mod scoring_service;
pub mod session_service;
