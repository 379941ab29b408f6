use crate::{
    cli::RunOptions,
    config::Config,
    link,
    serial::{
        backoff::BackoffController, DtrBehavior, FlowControlMode, ParityMode, SerialOptions,
        SerialPort, StopBitsMode,
    },
    wifi::SysfsWifi,
    Result,
};
use std::{str::FromStr, time::Instant};

mod connection;
mod lifecycle;
mod logger;
mod poll_loop;

use connection::attempt_serial_connect;
pub use logger::{LogLevel, Logger};
use poll_loop::run_poll_loop;

/// Merged runtime settings for the daemon (config file + CLI overrides).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub device: String,
    pub baud: u32,
    pub flow_control: FlowControlMode,
    pub parity: ParityMode,
    pub stop_bits: StopBitsMode,
    pub dtr_on_open: DtrBehavior,
    pub serial_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub stale_after_ms: u64,
    pub failure_threshold: u32,
    pub failure_cap: u32,
    pub display_cols: u8,
    pub wifi_iface: String,
    pub wifi_check_interval_ms: u64,
    pub wifi_reconnect_interval_ms: u64,
    pub wifi_max_attempts: u32,
    pub backoff_initial_ms: u64,
    pub backoff_max_ms: u64,
    pub report_interval_ms: u64,
    pub log_level: LogLevel,
    pub log_file: Option<String>,
}

pub struct App {
    config: AppConfig,
    logger: Logger,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let logger = Logger::new(config.log_level, config.log_file.clone());
        Self { config, logger }
    }

    pub fn from_options(opts: RunOptions) -> Result<Self> {
        let cfg_file = Config::load_or_default()?;
        let merged = AppConfig::from_sources(cfg_file, opts);
        Ok(Self::new(merged))
    }

    /// Entry point for the daemon.
    pub fn run(&self) -> Result<()> {
        let config = &self.config;
        self.logger.info(format!(
            "daemon start (device={}, baud={}, poll_interval={}ms, wifi={})",
            config.device, config.baud, config.poll_interval_ms, config.wifi_iface
        ));

        let mut backoff =
            BackoffController::new(config.backoff_initial_ms, config.backoff_max_ms);
        let port = attempt_serial_connect(&self.logger, &config.device, config.serial_options());
        if port.is_none() {
            backoff.mark_failure(Instant::now());
        }
        let mut wifi = SysfsWifi::new(&config.wifi_iface);
        run_poll_loop(config, &self.logger, port, backoff, &mut wifi)
    }
}

impl AppConfig {
    pub fn from_sources(config: Config, opts: RunOptions) -> Self {
        Self {
            device: opts.device.unwrap_or_else(|| config.device.clone()),
            baud: opts.baud.unwrap_or(config.baud),
            flow_control: config.flow_control,
            parity: config.parity,
            stop_bits: config.stop_bits,
            dtr_on_open: config.dtr_on_open,
            serial_timeout_ms: opts.serial_timeout_ms.unwrap_or(config.serial_timeout_ms),
            poll_interval_ms: opts.poll_interval_ms.unwrap_or(config.poll_interval_ms),
            stale_after_ms: config.stale_after_ms,
            failure_threshold: config.failure_threshold,
            failure_cap: config.failure_cap,
            display_cols: config.display_cols,
            wifi_iface: opts.wifi_iface.unwrap_or_else(|| config.wifi_iface.clone()),
            wifi_check_interval_ms: config.wifi_check_interval_ms,
            wifi_reconnect_interval_ms: config.wifi_reconnect_interval_ms,
            wifi_max_attempts: config.wifi_max_attempts,
            backoff_initial_ms: config.backoff_initial_ms,
            backoff_max_ms: config.backoff_max_ms,
            report_interval_ms: config.report_interval_ms,
            log_level: opts
                .log_level
                .as_deref()
                .and_then(|s| LogLevel::from_str(s).ok())
                .unwrap_or_default(),
            log_file: opts.log_file,
        }
    }

    pub fn serial_options(&self) -> SerialOptions {
        SerialOptions {
            baud: self.baud,
            timeout_ms: self.serial_timeout_ms,
            flow_control: self.flow_control,
            parity: self.parity,
            stop_bits: self.stop_bits,
            dtr: self.dtr_on_open,
        }
    }
}

/// One-shot helper backing `hygrolink reset`.
pub fn send_reset_once(opts: RunOptions) -> Result<()> {
    let (config, logger) = one_shot_setup(opts)?;
    let mut port = SerialPort::connect(&config.device, config.serial_options())?;
    link::send_reset(&mut port)?;
    logger.info("reset command sent");
    Ok(())
}

/// One-shot helper backing `hygrolink msg <text>`.
pub fn send_message_once(opts: RunOptions, text: &str) -> Result<()> {
    let (config, logger) = one_shot_setup(opts)?;
    let mut port = SerialPort::connect(&config.device, config.serial_options())?;
    link::send_message(&mut port, text, config.display_cols as usize)?;
    logger.info(format!(
        "message sent ({} column display)",
        config.display_cols
    ));
    Ok(())
}

fn one_shot_setup(opts: RunOptions) -> Result<(AppConfig, Logger)> {
    let cfg_file = Config::load_or_default()?;
    let merged = AppConfig::from_sources(cfg_file, opts);
    let logger = Logger::new(merged.log_level, merged.log_file.clone());
    Ok((merged, logger))
}
