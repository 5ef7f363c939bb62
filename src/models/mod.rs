pub mod candidate;
pub mod job;
pub mod question;
pub mod result;
pub mod session;
pub mod submission;
pub mod user;

pub use candidate::Candidate;
pub use job::Job;
pub use question::{Question, QuestionType};
pub use result::{AiScore, TestResult};
pub use session::{AssessmentSession, SessionSnapshot};
pub use submission::Submission;
pub use user::{PublicUser, User};
