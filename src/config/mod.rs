use crate::serial::{DtrBehavior, FlowControlMode, ParityMode, SerialOptions, StopBitsMode};
use crate::{Error, Result};
use std::path::Path;

pub mod loader;

pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 9_600;
pub const DEFAULT_SERIAL_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_STALE_AFTER_MS: u64 = 30_000;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_FAILURE_CAP: u32 = 10;
pub const DEFAULT_DISPLAY_COLS: u8 = 16;
pub const DEFAULT_WIFI_IFACE: &str = "wlan0";
pub const DEFAULT_WIFI_CHECK_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_WIFI_RECONNECT_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_WIFI_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF_INITIAL_MS: u64 = 500;
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 10_000;
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 60_000;
const CONFIG_DIR_NAME: &str = ".hygrolink";
const CONFIG_FILE_NAME: &str = "config.toml";

/// User-supplied settings loaded from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
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
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: DEFAULT_BAUD,
            flow_control: FlowControlMode::default(),
            parity: ParityMode::default(),
            stop_bits: StopBitsMode::default(),
            dtr_on_open: DtrBehavior::default(),
            serial_timeout_ms: DEFAULT_SERIAL_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            stale_after_ms: DEFAULT_STALE_AFTER_MS,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            failure_cap: DEFAULT_FAILURE_CAP,
            display_cols: DEFAULT_DISPLAY_COLS,
            wifi_iface: DEFAULT_WIFI_IFACE.to_string(),
            wifi_check_interval_ms: DEFAULT_WIFI_CHECK_INTERVAL_MS,
            wifi_reconnect_interval_ms: DEFAULT_WIFI_RECONNECT_INTERVAL_MS,
            wifi_max_attempts: DEFAULT_WIFI_MAX_ATTEMPTS,
            backoff_initial_ms: DEFAULT_BACKOFF_INITIAL_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        loader::load_or_default()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        loader::load_from_path(path)
    }

    pub fn save(&self) -> Result<()> {
        loader::save(self)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        loader::save_to_path(self, path)
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

pub(crate) fn validate(cfg: &Config) -> Result<()> {
    if cfg.baud == 0 {
        return Err(Error::InvalidArgs("baud must be > 0".into()));
    }
    if cfg.serial_timeout_ms < 50 {
        return Err(Error::InvalidArgs("serial_timeout_ms must be >= 50".into()));
    }
    if cfg.poll_interval_ms < 100 {
        return Err(Error::InvalidArgs("poll_interval_ms must be >= 100".into()));
    }
    if cfg.failure_threshold == 0 {
        return Err(Error::InvalidArgs("failure_threshold must be >= 1".into()));
    }
    if cfg.failure_cap <= cfg.failure_threshold {
        return Err(Error::InvalidArgs(
            "failure_cap must be greater than failure_threshold".into(),
        ));
    }
    if cfg.display_cols == 0 || cfg.display_cols > 40 {
        return Err(Error::InvalidArgs(
            "display_cols must be between 1 and 40".into(),
        ));
    }
    if cfg.wifi_iface.is_empty() {
        return Err(Error::InvalidArgs("wifi_iface must not be empty".into()));
    }
    if cfg.wifi_check_interval_ms < 100 {
        return Err(Error::InvalidArgs(
            "wifi_check_interval_ms must be >= 100".into(),
        ));
    }
    if cfg.wifi_max_attempts == 0 {
        return Err(Error::InvalidArgs("wifi_max_attempts must be >= 1".into()));
    }
    if cfg.backoff_max_ms < cfg.backoff_initial_ms {
        return Err(Error::InvalidArgs(
            "backoff_max_ms must be >= backoff_initial_ms".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        validate(&Config::default()).unwrap();
    }

    #[test]
    fn rejects_cap_at_or_below_threshold() {
        let mut cfg = Config::default();
        cfg.failure_threshold = 5;
        cfg.failure_cap = 5;
        let err = validate(&cfg).unwrap_err();
        assert!(format!("{err}").contains("failure_cap"));
    }

    #[test]
    fn rejects_display_cols_outside_range() {
        let mut cfg = Config::default();
        cfg.display_cols = 0;
        assert!(validate(&cfg).is_err());
        cfg.display_cols = 99;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn serial_options_carry_link_settings() {
        let mut cfg = Config::default();
        cfg.baud = 57_600;
        cfg.serial_timeout_ms = 750;
        let opts = cfg.serial_options();
        assert_eq!(opts.baud, 57_600);
        assert_eq!(opts.timeout_ms, 750);
    }
}
