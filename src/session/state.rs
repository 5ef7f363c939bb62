use chrono::{DateTime, Duration, Utc};

use super::{Debounce, MAX_VIOLATIONS, SESSION_DURATION_SECS, VIOLATION_DEBOUNCE_SECS};

/// Proctored-session state machine.
///
/// Transitions are one-way: `Idle -> Active`, then `Active` to exactly one of
/// the terminal states. Terminal states are sticky; no event can revive a
/// session, which is what makes "second violation is terminal" checkable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active {
        violations: u32,
        warning_shown: bool,
        debounce: Debounce,
        deadline: DateTime<Utc>,
    },
    Submitted,
    Disqualified,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationOutcome {
    /// Session was never started or already terminal; nothing recorded.
    Ignored,
    /// Signal fell inside the debounce window of the previous violation.
    Debounced { violations: u32 },
    /// First qualifying violation: show the one-time warning, stay active.
    Warning { violations: u32 },
    /// Second qualifying violation: session is now terminal.
    Disqualified { violations: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    NotStarted,
    AlreadySubmitted,
    Disqualified,
    Expired,
}

impl SessionState {
    /// `Idle -> Active` with the fixed 1800 s budget.
    pub fn start(now: DateTime<Utc>) -> Self {
        SessionState::Active {
            violations: 0,
            warning_shown: false,
            debounce: Debounce::new(Duration::seconds(VIOLATION_DEBOUNCE_SECS)),
            deadline: now + Duration::seconds(SESSION_DURATION_SECS),
        }
    }

    /// Rehydrates the machine from a persisted session row.
    pub fn from_persisted(
        status: &str,
        violations: u32,
        warning_shown: bool,
        last_violation_at: Option<DateTime<Utc>>,
        deadline: DateTime<Utc>,
    ) -> Self {
        match status {
            "active" => SessionState::Active {
                violations,
                warning_shown,
                debounce: Debounce::with_last(
                    Duration::seconds(VIOLATION_DEBOUNCE_SECS),
                    last_violation_at,
                ),
                deadline,
            },
            "submitted" => SessionState::Submitted,
            "disqualified" => SessionState::Disqualified,
            "expired" => SessionState::Expired,
            _ => SessionState::Idle,
        }
    }

    pub fn status_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Active { .. } => "active",
            SessionState::Submitted => "submitted",
            SessionState::Disqualified => "disqualified",
            SessionState::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Submitted | SessionState::Disqualified | SessionState::Expired
        )
    }

    pub fn violations(&self) -> u32 {
        match self {
            SessionState::Active { violations, .. } => *violations,
            _ => 0,
        }
    }

    pub fn last_violation_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SessionState::Active { debounce, .. } => debounce.last(),
            _ => None,
        }
    }

    /// Seconds left on the countdown, clamped at zero. Terminal states have
    /// no remaining time.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> i64 {
        match self {
            SessionState::Active { deadline, .. } => {
                (*deadline - now).num_seconds().max(0)
            }
            _ => 0,
        }
    }

    /// Evidence is captured only while the session is active.
    pub fn accepts_evidence(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }

    /// Applies one visibility/blur signal.
    pub fn record_violation(&mut self, now: DateTime<Utc>) -> ViolationOutcome {
        let SessionState::Active {
            violations,
            warning_shown,
            debounce,
            ..
        } = self
        else {
            return ViolationOutcome::Ignored;
        };

        if !debounce.observe(now) {
            return ViolationOutcome::Debounced {
                violations: *violations,
            };
        }

        *violations += 1;
        if *violations >= MAX_VIOLATIONS {
            let count = *violations;
            *self = SessionState::Disqualified;
            ViolationOutcome::Disqualified { violations: count }
        } else {
            *warning_shown = true;
            ViolationOutcome::Warning {
                violations: *violations,
            }
        }
    }

    /// True when an active session's deadline has passed. The client-side
    /// countdown converges on `submit`; this is the sweeper's check.
    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        match self {
            SessionState::Active { deadline, .. } => now >= *deadline,
            _ => false,
        }
    }

    /// `Active -> Expired`, used by the deadline sweeper for sessions that
    /// never transmitted. No-op on any other state.
    pub fn expire(&mut self) {
        if matches!(self, SessionState::Active { .. }) {
            *self = SessionState::Expired;
        }
    }

    /// `Active -> Submitted`. Terminal states reject the transition so a
    /// concurrent timeout/manual-submit race resolves to a single winner.
    pub fn submit(&mut self) -> Result<(), SubmitRejected> {
        match self {
            SessionState::Active { .. } => {
                *self = SessionState::Submitted;
                Ok(())
            }
            SessionState::Idle => Err(SubmitRejected::NotStarted),
            SessionState::Submitted => Err(SubmitRejected::AlreadySubmitted),
            SessionState::Disqualified => Err(SubmitRejected::Disqualified),
            SessionState::Expired => Err(SubmitRejected::Expired),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn t_ms(secs: i64, ms: u32) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, ms * 1_000_000).unwrap()
    }

    #[test]
    fn first_violation_warns_and_stays_active() {
        let mut s = SessionState::start(t(0));
        let outcome = s.record_violation(t(10));
        assert_eq!(outcome, ViolationOutcome::Warning { violations: 1 });
        assert_eq!(s.status_str(), "active");
        assert_eq!(s.violations(), 1);
    }

    #[test]
    fn second_violation_disqualifies() {
        let mut s = SessionState::start(t(0));
        s.record_violation(t(10));
        let outcome = s.record_violation(t(15));
        assert_eq!(outcome, ViolationOutcome::Disqualified { violations: 2 });
        assert_eq!(s, SessionState::Disqualified);
    }

    #[test]
    fn never_disqualifies_on_a_single_violation() {
        let mut s = SessionState::start(t(0));
        let outcome = s.record_violation(t(10));
        assert!(matches!(outcome, ViolationOutcome::Warning { violations: 1 }));
        assert!(!s.is_terminal());
    }

    #[test]
    fn burst_within_two_seconds_counts_once() {
        let mut s = SessionState::start(t(0));
        assert_eq!(
            s.record_violation(t_ms(10, 0)),
            ViolationOutcome::Warning { violations: 1 }
        );
        // 500ms later: visibilitychange + blur double-fire.
        assert_eq!(
            s.record_violation(t_ms(10, 500)),
            ViolationOutcome::Debounced { violations: 1 }
        );
        assert_eq!(s.status_str(), "active");
        assert_eq!(s.violations(), 1);
    }

    #[test]
    fn violation_after_debounce_window_is_terminal() {
        let mut s = SessionState::start(t(0));
        s.record_violation(t(10));
        assert!(matches!(
            s.record_violation(t(15)),
            ViolationOutcome::Disqualified { .. }
        ));
    }

    #[test]
    fn terminal_states_ignore_further_violations() {
        let mut s = SessionState::start(t(0));
        s.record_violation(t(10));
        s.record_violation(t(20));
        assert_eq!(s.record_violation(t(30)), ViolationOutcome::Ignored);
        assert_eq!(s, SessionState::Disqualified);

        let mut s = SessionState::start(t(0));
        s.submit().unwrap();
        assert_eq!(s.record_violation(t(30)), ViolationOutcome::Ignored);
    }

    #[test]
    fn submit_is_single_winner() {
        let mut s = SessionState::start(t(0));
        assert!(s.submit().is_ok());
        assert_eq!(s.submit(), Err(SubmitRejected::AlreadySubmitted));
    }

    #[test]
    fn submit_after_disqualification_is_rejected() {
        let mut s = SessionState::start(t(0));
        s.record_violation(t(1));
        s.record_violation(t(5));
        assert_eq!(s.submit(), Err(SubmitRejected::Disqualified));
    }

    #[test]
    fn countdown_clamps_at_zero() {
        let s = SessionState::start(t(0));
        assert_eq!(s.time_remaining(t(0)), SESSION_DURATION_SECS);
        assert_eq!(s.time_remaining(t(1800)), 0);
        assert_eq!(s.time_remaining(t(5000)), 0);
    }

    #[test]
    fn deadline_expiry_is_terminal_and_blocks_submit() {
        let mut s = SessionState::start(t(0));
        assert!(s.deadline_passed(t(1800)));
        s.expire();
        assert_eq!(s, SessionState::Expired);
        assert_eq!(s.submit(), Err(SubmitRejected::Expired));
        s.expire();
        assert_eq!(s, SessionState::Expired);
    }

    #[test]
    fn evidence_only_while_active() {
        let mut s = SessionState::start(t(0));
        assert!(s.accepts_evidence());
        s.submit().unwrap();
        assert!(!s.accepts_evidence());
        assert!(!SessionState::Idle.accepts_evidence());
        assert!(!SessionState::Disqualified.accepts_evidence());
    }

    #[test]
    fn rehydration_round_trips_status() {
        let now = t(0);
        let s = SessionState::start(now);
        let back = SessionState::from_persisted(
            s.status_str(),
            s.violations(),
            false,
            s.last_violation_at(),
            now + Duration::seconds(SESSION_DURATION_SECS),
        );
        assert_eq!(back, s);
        assert_eq!(
            SessionState::from_persisted("disqualified", 2, true, None, now),
            SessionState::Disqualified
        );
    }
}
