pub mod debounce;
pub mod ring;
pub mod state;

pub use debounce::Debounce;
pub use ring::EvidenceRing;
pub use state::{SessionState, SubmitRejected, ViolationOutcome};

/// Fixed assessment budget per session.
pub const SESSION_DURATION_SECS: i64 = 1800;

/// Repeated visibility/blur signals inside this window count as one violation.
pub const VIOLATION_DEBOUNCE_SECS: i64 = 2;

/// Second qualifying violation disqualifies the session.
pub const MAX_VIOLATIONS: u32 = 2;

/// At most this many proctoring snapshots are retained per session.
pub const SNAPSHOT_CAP: usize = 30;
