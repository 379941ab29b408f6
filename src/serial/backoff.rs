use std::time::{Duration, Instant};

/// Exponential retry pacing for re-opening the hub-side serial device.
///
/// Distinct from the node-health failure counter: this only governs how
/// often the daemon attempts to reopen a vanished port.
#[derive(Debug)]
pub struct BackoffController {
    initial: Duration,
    max: Duration,
    delay: Duration,
    next_attempt: Option<Instant>,
}

impl BackoffController {
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        let initial = Duration::from_millis(initial_ms.max(1));
        let max = Duration::from_millis(max_ms.max(initial_ms.max(1)));
        Self {
            initial,
            max,
            delay: initial,
            next_attempt: None,
        }
    }

    /// True when enough time has passed since the last failure to try again.
    pub fn should_retry(&self, now: Instant) -> bool {
        self.next_attempt.map_or(true, |at| now >= at)
    }

    pub fn mark_failure(&mut self, now: Instant) {
        self.next_attempt = Some(now + self.delay);
        self.delay = (self.delay * 2).min(self.max);
    }

    pub fn mark_success(&mut self) {
        self.delay = self.initial;
        self.next_attempt = None;
    }

    pub fn current_delay(&self) -> Duration {
        self.delay
    }

    pub fn update(&mut self, initial_ms: u64, max_ms: u64) {
        self.initial = Duration::from_millis(initial_ms.max(1));
        self.max = Duration::from_millis(max_ms.max(initial_ms.max(1)));
        self.delay = self.delay.clamp(self.initial, self.max);
    }
}
