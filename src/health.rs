use std::time::{Duration, Instant};

/// Tracks freshness of the node link across poll cycles.
///
/// One of `on_success`/`on_failure` is recorded per poll cycle; the
/// `healthy`/`stale` verdicts are recomputed on demand so they can never
/// drift from the underlying counters.
#[derive(Debug)]
pub struct HealthMonitor {
    consecutive_failures: u32,
    failure_threshold: u32,
    failure_cap: u32,
    stale_after: Duration,
    last_success: Option<Instant>,
}

impl HealthMonitor {
    /// `failure_threshold` must sit strictly below the saturation cap so an
    /// unhealthy verdict is reachable before the counter pins; the cap is
    /// raised if the caller passes something smaller.
    pub fn new(failure_threshold: u32, failure_cap: u32, stale_after: Duration) -> Self {
        Self {
            consecutive_failures: 0,
            failure_threshold,
            failure_cap: failure_cap.max(failure_threshold.saturating_add(1)),
            stale_after,
            last_success: None,
        }
    }

    pub fn on_success(&mut self, now: Instant) {
        self.consecutive_failures = 0;
        self.last_success = Some(now);
    }

    /// Count one failed exchange; saturates at the cap rather than growing
    /// unbounded, so the counter stays a severity indicator.
    pub fn on_failure(&mut self) {
        if self.consecutive_failures < self.failure_cap {
            self.consecutive_failures += 1;
        }
    }

    pub fn healthy(&self) -> bool {
        self.consecutive_failures < self.failure_threshold
    }

    /// True once the last success is older than the staleness window.
    /// Before any success has occurred there is nothing to go stale.
    pub fn stale(&self, now: Instant) -> bool {
        match self.last_success {
            Some(at) => now.duration_since(at) >= self.stale_after,
            None => false,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_success_age(&self, now: Instant) -> Option<Duration> {
        self.last_success.map(|at| now.duration_since(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> HealthMonitor {
        HealthMonitor::new(3, 10, Duration::from_secs(30))
    }

    #[test]
    fn healthy_until_threshold_failures() {
        let mut health = monitor();
        health.on_failure();
        health.on_failure();
        assert!(health.healthy());
        health.on_failure();
        assert!(!health.healthy());
        health.on_failure();
        assert!(!health.healthy());
    }

    #[test]
    fn success_clears_the_counter_and_restores_health() {
        let mut health = monitor();
        for _ in 0..5 {
            health.on_failure();
        }
        assert!(!health.healthy());
        health.on_success(Instant::now());
        assert!(health.healthy());
        assert_eq!(health.consecutive_failures(), 0);
    }

    #[test]
    fn counter_saturates_at_the_cap() {
        let mut health = monitor();
        for _ in 0..1_000 {
            health.on_failure();
        }
        assert_eq!(health.consecutive_failures(), 10);
    }

    #[test]
    fn cap_is_kept_above_the_threshold() {
        let mut health = HealthMonitor::new(5, 2, Duration::from_secs(30));
        for _ in 0..100 {
            health.on_failure();
        }
        assert_eq!(health.consecutive_failures(), 6);
        assert!(!health.healthy());
    }

    #[test]
    fn never_stale_before_the_first_success() {
        let health = monitor();
        let far_future = Instant::now() + Duration::from_secs(3_600);
        assert!(!health.stale(far_future));
    }

    #[test]
    fn stale_flips_at_the_threshold_boundary() {
        let mut health = monitor();
        let t0 = Instant::now();
        health.on_success(t0);
        assert!(!health.stale(t0 + Duration::from_secs(29)));
        assert!(health.stale(t0 + Duration::from_secs(30)));
        assert!(health.stale(t0 + Duration::from_secs(31)));
    }

    #[test]
    fn new_success_refreshes_staleness() {
        let mut health = monitor();
        let t0 = Instant::now();
        health.on_success(t0);
        let later = t0 + Duration::from_secs(45);
        assert!(health.stale(later));
        health.on_success(later);
        assert!(!health.stale(later + Duration::from_secs(29)));
        assert_eq!(
            health.last_success_age(later + Duration::from_secs(5)),
            Some(Duration::from_secs(5))
        );
    }
}
