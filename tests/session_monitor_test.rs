use chrono::{DateTime, Duration, TimeZone, Utc};

use hireai_backend::session::{
    EvidenceRing, SessionState, SubmitRejected, ViolationOutcome, MAX_VIOLATIONS,
    SESSION_DURATION_SECS, SNAPSHOT_CAP,
};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_720_000_000 + secs, 0).unwrap()
}

#[test]
fn clean_run_submits_with_no_violations() {
    let mut state = SessionState::start(at(0));
    assert_eq!(state.status_str(), "active");
    assert_eq!(state.violations(), 0);
    assert_eq!(state.time_remaining(at(600)), SESSION_DURATION_SECS - 600);

    state.submit().unwrap();
    assert_eq!(state.status_str(), "submitted");
    assert_eq!(state.time_remaining(at(600)), 0);
}

#[test]
fn tab_switch_storm_warns_once_then_disqualifies() {
    let mut state = SessionState::start(at(0));

    // First tab switch fires visibilitychange and blur back to back.
    assert_eq!(
        state.record_violation(at(100)),
        ViolationOutcome::Warning { violations: 1 }
    );
    assert_eq!(
        state.record_violation(at(101)),
        ViolationOutcome::Debounced { violations: 1 }
    );
    assert_eq!(state.status_str(), "active");

    // Second real tab switch, well clear of the debounce window.
    assert_eq!(
        state.record_violation(at(400)),
        ViolationOutcome::Disqualified {
            violations: MAX_VIOLATIONS
        }
    );
    assert_eq!(state.status_str(), "disqualified");
    assert_eq!(state.submit(), Err(SubmitRejected::Disqualified));
}

#[test]
fn debounce_window_is_exactly_two_seconds() {
    let mut state = SessionState::start(at(0));
    state.record_violation(at(10));
    // 1.9s later is swallowed, 2.0s later counts.
    assert!(matches!(
        state.record_violation(at(10) + Duration::milliseconds(1900)),
        ViolationOutcome::Debounced { .. }
    ));
    assert!(matches!(
        state.record_violation(at(10) + Duration::milliseconds(2000)),
        ViolationOutcome::Disqualified { .. }
    ));
}

#[test]
fn expiry_beats_late_submit() {
    let mut state = SessionState::start(at(0));
    assert!(state.deadline_passed(at(SESSION_DURATION_SECS)));
    state.expire();
    assert_eq!(state.submit(), Err(SubmitRejected::Expired));
    assert_eq!(state.record_violation(at(2000)), ViolationOutcome::Ignored);
}

#[test]
fn persisted_row_resumes_mid_debounce() {
    // Server restart between two signals of the same burst.
    let started = at(0);
    let deadline = started + Duration::seconds(SESSION_DURATION_SECS);
    let mut state = SessionState::from_persisted("active", 1, true, Some(at(50)), deadline);

    assert!(matches!(
        state.record_violation(at(51)),
        ViolationOutcome::Debounced { violations: 1 }
    ));
    assert!(matches!(
        state.record_violation(at(60)),
        ViolationOutcome::Disqualified { violations: 2 }
    ));
}

#[test]
fn evidence_ring_keeps_only_newest_frames() {
    let mut ring = EvidenceRing::new(SNAPSHOT_CAP);
    for i in 0..100 {
        ring.push(format!("frame-{i}"));
    }
    let kept = ring.into_vec();
    assert_eq!(kept.len(), SNAPSHOT_CAP);
    assert_eq!(kept.first().map(String::as_str), Some("frame-70"));
    assert_eq!(kept.last().map(String::as_str), Some("frame-99"));
}

#[test]
fn evidence_cap_holds_across_streamed_and_submitted_batches() {
    // A client that streams frames during the attempt and then sends a full
    // batch with the final submit still ends with at most the cap retained.
    let mut ring = EvidenceRing::new(SNAPSHOT_CAP);
    ring.extend((0..30).map(|i| format!("streamed-{i}")));
    ring.extend((0..30).map(|i| format!("payload-{i}")));
    assert_eq!(ring.len(), SNAPSHOT_CAP);
    assert!(ring.iter().all(|f| f.starts_with("payload-")));
}

#[test]
fn evidence_capture_stops_at_terminal_states() {
    let mut state = SessionState::start(at(0));
    assert!(state.accepts_evidence());
    state.record_violation(at(10));
    assert!(state.accepts_evidence());
    state.record_violation(at(20));
    assert!(!state.accepts_evidence());
}
