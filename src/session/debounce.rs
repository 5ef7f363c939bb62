use chrono::{DateTime, Duration, Utc};

/// De-duplicates a burst of events into a single observation.
///
/// The browser fires both `visibilitychange` and `blur` for one tab switch;
/// anything inside the window is treated as the same violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    window: Duration,
    last: Option<DateTime<Utc>>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Resume a debouncer from a persisted last-event timestamp.
    pub fn with_last(window: Duration, last: Option<DateTime<Utc>>) -> Self {
        Self { window, last }
    }

    /// Returns true if the event at `now` is a fresh observation, false if it
    /// falls inside the window of the previous one.
    pub fn observe(&mut self, now: DateTime<Utc>) -> bool {
        match self.last {
            Some(prev) if now.signed_duration_since(prev) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs_ms: (i64, u32)) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs_ms.0, secs_ms.1 * 1_000_000)
            .unwrap()
    }

    #[test]
    fn first_event_passes() {
        let mut d = Debounce::new(Duration::seconds(2));
        assert!(d.observe(at((0, 0))));
    }

    #[test]
    fn events_inside_window_are_swallowed() {
        let mut d = Debounce::new(Duration::seconds(2));
        assert!(d.observe(at((0, 0))));
        assert!(!d.observe(at((0, 500))));
        assert!(!d.observe(at((1, 999))));
    }

    #[test]
    fn event_after_window_passes() {
        let mut d = Debounce::new(Duration::seconds(2));
        assert!(d.observe(at((0, 0))));
        assert!(d.observe(at((2, 0))));
    }

    #[test]
    fn swallowed_event_does_not_extend_window() {
        let mut d = Debounce::new(Duration::seconds(2));
        assert!(d.observe(at((0, 0))));
        assert!(!d.observe(at((1, 500))));
        // 2s after the *accepted* event, not the swallowed one.
        assert!(d.observe(at((2, 100))));
    }

    #[test]
    fn resumes_from_persisted_timestamp() {
        let mut d = Debounce::with_last(Duration::seconds(2), Some(at((0, 0))));
        assert!(!d.observe(at((1, 0))));
        assert!(d.observe(at((3, 0))));
    }
}
