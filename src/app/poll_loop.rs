use std::{
    sync::atomic::Ordering,
    thread,
    time::{Duration, Instant},
};

use super::connection::attempt_serial_connect;
use super::lifecycle::create_shutdown_flag;
use super::{AppConfig, Logger};
use crate::{
    health::HealthMonitor,
    link::{self, LinkFailure, LinkOutcome},
    serial::{backoff::BackoffController, errors::classify_error, LineIo, SerialPort},
    status::StatusCache,
    wifi::{WifiControl, WifiEvent, WifiSupervisor},
    Result,
};

const IDLE_TICK_MS: u64 = 20;

/// Drive the hub: poll the node on its cadence, keep the health
/// bookkeeping, supervise the wireless link, and reopen the serial port
/// when it drops. All of it runs on one cooperative tick sequence; the
/// only blocking step is the bounded receive inside a poll cycle.
pub(super) fn run_poll_loop<C: WifiControl>(
    config: &AppConfig,
    logger: &Logger,
    mut port: Option<SerialPort>,
    mut backoff: BackoffController,
    wifi_control: &mut C,
) -> Result<()> {
    let mut health = HealthMonitor::new(
        config.failure_threshold,
        config.failure_cap,
        Duration::from_millis(config.stale_after_ms),
    );
    let mut cache = StatusCache::new();
    let mut supervisor = WifiSupervisor::new(
        Duration::from_millis(config.wifi_reconnect_interval_ms),
        config.wifi_max_attempts,
    );
    let mut buffer = String::new();

    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let wifi_interval = Duration::from_millis(config.wifi_check_interval_ms);
    let report_interval = Duration::from_millis(config.report_interval_ms);
    let mut next_poll = Instant::now();
    let mut next_wifi_check = Instant::now();
    let mut next_report = Instant::now() + report_interval;

    let running = create_shutdown_flag()?;

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();

        if port.is_none() && backoff.should_retry(now) {
            match attempt_serial_connect(logger, &config.device, config.serial_options()) {
                Some(p) => {
                    port = Some(p);
                    backoff.mark_success();
                }
                None => backoff.mark_failure(now),
            }
        }

        if now >= next_poll {
            next_poll = now + poll_interval;
            match port.as_mut() {
                Some(io) => {
                    if let Err(err) = poll_cycle(io, &mut buffer, &mut health, &mut cache, logger) {
                        logger.warn(format!(
                            "serial fault ({}): {err}; reopening port",
                            classify_error(&err)
                        ));
                        port = None;
                        backoff.mark_failure(now);
                    }
                }
                None => {
                    // The node is unreachable while the port is down; that
                    // is a failed cycle as far as freshness is concerned.
                    health.on_failure();
                    logger.debug("poll skipped: serial port offline");
                }
            }
        }

        if now >= next_wifi_check {
            next_wifi_check = now + wifi_interval;
            if let Some(event) = supervisor.tick(wifi_control, now) {
                log_wifi_event(logger, &event);
            }
        }

        if now >= next_report {
            next_report = now + report_interval;
            report_status(logger, &cache, &health, &supervisor, now);
        }

        thread::sleep(Duration::from_millis(IDLE_TICK_MS));
    }

    logger.info("daemon exiting");
    Ok(())
}

/// One poll cycle: exchange, then health/cache bookkeeping, in that order.
/// Protocol-level failures are absorbed into the failure counter; only
/// hard port faults bubble up so the caller can tear the port down.
fn poll_cycle<IO: LineIo>(
    io: &mut IO,
    buffer: &mut String,
    health: &mut HealthMonitor,
    cache: &mut StatusCache,
    logger: &Logger,
) -> Result<()> {
    match link::request_status(io, buffer)? {
        LinkOutcome::Success(reading) => {
            cache.write(reading);
            health.on_success(Instant::now());
            logger.debug(format!(
                "status: {:.1}% (min {:.1}, max {:.1})",
                reading.current, reading.minimum, reading.maximum
            ));
        }
        LinkOutcome::Failure(kind) => {
            health.on_failure();
            match kind {
                LinkFailure::Timeout => logger.warn("status exchange timed out"),
                LinkFailure::Malformed => logger.warn(format!(
                    "status response rejected as malformed: '{}'",
                    buffer.trim()
                )),
            }
        }
    }
    Ok(())
}

fn log_wifi_event(logger: &Logger, event: &WifiEvent) {
    match event {
        WifiEvent::LinkLost => logger.warn("wifi link lost"),
        WifiEvent::LinkRestored => logger.info("wifi link restored"),
        WifiEvent::ReconnectIssued { attempt, error } => match error {
            Some(err) => logger.warn(format!(
                "wifi reconnect attempt {attempt} failed to issue: {err}"
            )),
            None => logger.info(format!("wifi reconnect attempt {attempt} issued")),
        },
        WifiEvent::InterfaceReset { error } => match error {
            Some(err) => logger.warn(format!("wifi interface reset failed: {err}")),
            None => logger.warn("wifi interface reset issued after repeated reconnect failures"),
        },
    }
}

fn report_status(
    logger: &Logger,
    cache: &StatusCache,
    health: &HealthMonitor,
    supervisor: &WifiSupervisor,
    now: Instant,
) {
    let snapshot = cache.snapshot(health, now);
    let age = health
        .last_success_age(now)
        .map(|age| humantime::format_duration(Duration::from_secs(age.as_secs())).to_string())
        .unwrap_or_else(|| "never".into());
    let reading = snapshot
        .reading
        .map(|r| format!("{:.1}%", r.current))
        .unwrap_or_else(|| "n/a".into());
    logger.info(format!(
        "health: reading={reading} last_success={age} failures={} healthy={} stale={} wifi={}",
        snapshot.link_failures,
        snapshot.healthy,
        snapshot.stale,
        supervisor.state().as_str()
    ));
    if let Ok(json) = serde_json::to_string(&snapshot) {
        logger.debug(format!("status snapshot: {json}"));
    }
}
