use crate::health::HealthMonitor;
use crate::protocol::Reading;
use serde::Serialize;
use std::time::Instant;

/// The latest accepted sensor reading. Written only by the poll loop on a
/// successful exchange; read by the serving layer between ticks.
#[derive(Debug, Default)]
pub struct StatusCache {
    reading: Option<Reading>,
}

/// Snapshot handed to the serving layer: the cached reading plus health
/// flags derived at call time, so a reader always sees one coherent view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub reading: Option<Reading>,
    pub stale: bool,
    pub healthy: bool,
    pub link_failures: u32,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, reading: Reading) {
        self.reading = Some(reading);
    }

    pub fn reading(&self) -> Option<Reading> {
        self.reading
    }

    /// The flags are recomputed from the live monitor on every call rather
    /// than stored next to the reading, so they cannot drift stale.
    pub fn snapshot(&self, health: &HealthMonitor, now: Instant) -> StatusSnapshot {
        StatusSnapshot {
            reading: self.reading,
            stale: health.stale(now),
            healthy: health.healthy(),
            link_failures: health.consecutive_failures(),
        }
    }
}
