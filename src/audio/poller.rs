use std::time::{Duration, Instant};

/// Repeating progress refresh bound to one playback session.
///
/// Arming ties the poller to a session id. Once the engine moves on to another
/// session (new track, stop, completion) the poller disarms itself on the next
/// check instead of firing for a track that is gone.
#[derive(Debug)]
pub struct ProgressPoller {
    interval: Duration,
    armed: Option<u64>,
    next_due: Option<Instant>,
}

impl ProgressPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            armed: None,
            next_due: None,
        }
    }

    pub fn arm(&mut self, session: u64, now: Instant) {
        self.armed = Some(session);
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.armed = None;
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Time left until the next refresh, if armed.
    pub fn wait_hint(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Whether a refresh for `session` should happen now. Reschedules on `true`.
    pub fn due(&mut self, session: u64, now: Instant) -> bool {
        if self.armed != Some(session) {
            self.cancel();
            return false;
        }
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
