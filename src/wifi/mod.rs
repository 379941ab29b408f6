pub mod sysfs;

pub use sysfs::SysfsWifi;

use crate::Error;
use std::time::{Duration, Instant};

/// Black-box control surface over the wireless interface. Latency of the
/// underlying calls is bounded by the supervisor's own cadence, not here.
pub trait WifiControl {
    /// Whether the interface is currently associated.
    fn is_connected(&mut self) -> bool;
    /// Issue a lightweight reconnect request.
    fn reconnect(&mut self) -> crate::Result<()>;
    /// Tear down and re-establish all interface state.
    fn reset_interface(&mut self) -> crate::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiLinkState {
    Connected,
    Disconnected,
    Reconnecting,
    ResettingInterface,
}

impl WifiLinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiLinkState::Connected => "connected",
            WifiLinkState::Disconnected => "disconnected",
            WifiLinkState::Reconnecting => "reconnecting",
            WifiLinkState::ResettingInterface => "resetting_interface",
        }
    }
}

/// What one supervisor tick did; the caller owns logging. Control-call
/// errors are carried here, never propagated: wireless trouble degrades,
/// it does not crash the daemon.
#[derive(Debug)]
pub enum WifiEvent {
    LinkLost,
    ReconnectIssued { attempt: u32, error: Option<Error> },
    InterfaceReset { error: Option<Error> },
    LinkRestored,
}

/// Supervises the wireless link: debounced lightweight reconnects while
/// disconnected, escalating to a full interface reset after a bounded
/// number of failed attempts.
///
/// A plain reconnect is cheap but can wedge against certain driver fault
/// states; the bounded escalation caps worst-case time-to-recovery without
/// paying the heavier reset on every attempt.
#[derive(Debug)]
pub struct WifiSupervisor {
    state: WifiLinkState,
    reconnect_attempts: u32,
    last_attempt: Option<Instant>,
    reconnect_interval: Duration,
    max_attempts: u32,
}

impl WifiSupervisor {
    pub fn new(reconnect_interval: Duration, max_attempts: u32) -> Self {
        Self {
            state: WifiLinkState::Connected,
            reconnect_attempts: 0,
            last_attempt: None,
            reconnect_interval,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn state(&self) -> WifiLinkState {
        self.state
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Evaluate one transition. Called on a fixed cadence from the tick
    /// loop, never concurrently with itself.
    pub fn tick<C: WifiControl>(&mut self, control: &mut C, now: Instant) -> Option<WifiEvent> {
        if control.is_connected() {
            let was_down = self.state != WifiLinkState::Connected;
            self.state = WifiLinkState::Connected;
            self.reconnect_attempts = 0;
            return was_down.then_some(WifiEvent::LinkRestored);
        }

        match self.state {
            WifiLinkState::Connected => {
                self.state = WifiLinkState::Disconnected;
                Some(WifiEvent::LinkLost)
            }
            // The reset has been issued; fall back to normal disconnected
            // handling from the next tick on.
            WifiLinkState::ResettingInterface => {
                self.state = WifiLinkState::Disconnected;
                None
            }
            WifiLinkState::Disconnected | WifiLinkState::Reconnecting => {
                if self.reconnect_attempts >= self.max_attempts {
                    self.state = WifiLinkState::ResettingInterface;
                    let error = control.reset_interface().err();
                    self.reconnect_attempts = 0;
                    // Re-stamp so the next tick does not immediately retry.
                    self.last_attempt = Some(now);
                    Some(WifiEvent::InterfaceReset { error })
                } else if self.attempt_due(now) {
                    self.state = WifiLinkState::Reconnecting;
                    let error = control.reconnect().err();
                    self.reconnect_attempts += 1;
                    self.last_attempt = Some(now);
                    Some(WifiEvent::ReconnectIssued {
                        attempt: self.reconnect_attempts,
                        error,
                    })
                } else {
                    self.state = WifiLinkState::Disconnected;
                    None
                }
            }
        }
    }

    fn attempt_due(&self, now: Instant) -> bool {
        self.last_attempt
            .map_or(true, |at| now.duration_since(at) >= self.reconnect_interval)
    }
}
