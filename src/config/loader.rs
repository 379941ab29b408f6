use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Error, Result};

use super::{Config, CONFIG_DIR_NAME, CONFIG_FILE_NAME};

pub fn load_or_default() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        let cfg = Config::default();
        cfg.save_to_path(&path)?;
        super::validate(&cfg)?;
        return Ok(cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        super::validate(&cfg)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(path)?;
    parse(&raw)
}

pub fn save(config: &Config) -> Result<()> {
    let path = config_path()?;
    save_to_path(config, &path)
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = format!(
        "# hygrolink config\n\
device = \"{}\"\n\
baud = {}\n\
flow_control = \"{}\"\n\
parity = \"{}\"\n\
stop_bits = \"{}\"\n\
dtr_on_open = \"{}\"\n\
serial_timeout_ms = {}\n\
poll_interval_ms = {}\n\
stale_after_ms = {}\n\
failure_threshold = {}\n\
failure_cap = {}\n\
display_cols = {}\n\
wifi_iface = \"{}\"\n\
wifi_check_interval_ms = {}\n\
wifi_reconnect_interval_ms = {}\n\
wifi_max_attempts = {}\n\
backoff_initial_ms = {}\n\
backoff_max_ms = {}\n\
report_interval_ms = {}\n",
        config.device,
        config.baud,
        config.flow_control,
        config.parity,
        config.stop_bits,
        config.dtr_on_open,
        config.serial_timeout_ms,
        config.poll_interval_ms,
        config.stale_after_ms,
        config.failure_threshold,
        config.failure_cap,
        config.display_cols,
        config.wifi_iface,
        config.wifi_check_interval_ms,
        config.wifi_reconnect_interval_ms,
        config.wifi_max_attempts,
        config.backoff_initial_ms,
        config.backoff_max_ms,
        config.report_interval_ms,
    );
    fs::write(path, contents)?;
    Ok(())
}

pub fn parse(raw: &str) -> Result<Config> {
    let mut cfg = Config::default();

    for (idx, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = trimmed.split_once('=').ok_or_else(|| {
            Error::InvalidArgs(format!("invalid config line {}: '{}'", idx + 1, line))
        })?;

        let key = key.trim();
        let value = value.trim().trim_matches('"');
        match key {
            "device" => cfg.device = value.to_string(),
            "baud" => {
                cfg.baud = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid baud value on line {}", idx + 1))
                })?;
            }
            "flow_control" => {
                cfg.flow_control = value.parse().map_err(|e: String| {
                    Error::InvalidArgs(format!("invalid flow_control on line {}: {e}", idx + 1))
                })?;
            }
            "parity" => {
                cfg.parity = value.parse().map_err(|e: String| {
                    Error::InvalidArgs(format!("invalid parity on line {}: {e}", idx + 1))
                })?;
            }
            "stop_bits" => {
                cfg.stop_bits = value.parse().map_err(|e: String| {
                    Error::InvalidArgs(format!("invalid stop_bits on line {}: {e}", idx + 1))
                })?;
            }
            "dtr_on_open" => {
                cfg.dtr_on_open = value.parse().map_err(|e: String| {
                    Error::InvalidArgs(format!("invalid dtr_on_open on line {}: {e}", idx + 1))
                })?;
            }
            "serial_timeout_ms" => {
                cfg.serial_timeout_ms = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid serial_timeout_ms on line {}", idx + 1))
                })?;
            }
            "poll_interval_ms" => {
                cfg.poll_interval_ms = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid poll_interval_ms on line {}", idx + 1))
                })?;
            }
            "stale_after_ms" => {
                cfg.stale_after_ms = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid stale_after_ms on line {}", idx + 1))
                })?;
            }
            "failure_threshold" => {
                cfg.failure_threshold = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid failure_threshold on line {}", idx + 1))
                })?;
            }
            "failure_cap" => {
                cfg.failure_cap = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid failure_cap on line {}", idx + 1))
                })?;
            }
            "display_cols" => {
                cfg.display_cols = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid display_cols on line {}", idx + 1))
                })?;
            }
            "wifi_iface" => cfg.wifi_iface = value.to_string(),
            "wifi_check_interval_ms" => {
                cfg.wifi_check_interval_ms = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!(
                        "invalid wifi_check_interval_ms on line {}",
                        idx + 1
                    ))
                })?;
            }
            "wifi_reconnect_interval_ms" => {
                cfg.wifi_reconnect_interval_ms = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!(
                        "invalid wifi_reconnect_interval_ms on line {}",
                        idx + 1
                    ))
                })?;
            }
            "wifi_max_attempts" => {
                cfg.wifi_max_attempts = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid wifi_max_attempts on line {}", idx + 1))
                })?;
            }
            "backoff_initial_ms" => {
                cfg.backoff_initial_ms = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid backoff_initial_ms on line {}", idx + 1))
                })?;
            }
            "backoff_max_ms" => {
                cfg.backoff_max_ms = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid backoff_max_ms on line {}", idx + 1))
                })?;
            }
            "report_interval_ms" => {
                cfg.report_interval_ms = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid report_interval_ms on line {}", idx + 1))
                })?;
            }
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown config key '{}' on line {}",
                    other,
                    idx + 1
                )));
            }
        }
    }

    super::validate(&cfg)?;
    Ok(cfg)
}

fn config_path() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| Error::InvalidArgs("HOME not set; cannot locate config directory".into()))?;
    Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::{DtrBehavior, FlowControlMode, ParityMode, StopBitsMode};

    fn temp_path(name: &str) -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("{name}.toml"));
        // Keep the directory alive for the duration of the test.
        std::mem::forget(dir);
        path
    }

    #[test]
    fn loads_default_when_missing() {
        let path = temp_path("missing");
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn parses_valid_config() {
        let path = temp_path("parse");
        let contents = r#"
            device = "/dev/ttyS0"
            baud = 57600
            flow_control = "hardware"
            parity = "even"
            stop_bits = "2"
            dtr_on_open = "on"
            serial_timeout_ms = 1500
            poll_interval_ms = 2000
            stale_after_ms = 20000
            failure_threshold = 4
            failure_cap = 12
            display_cols = 20
            wifi_iface = "wlan1"
            wifi_check_interval_ms = 500
            wifi_reconnect_interval_ms = 8000
            wifi_max_attempts = 4
            backoff_initial_ms = 750
            backoff_max_ms = 9000
            report_interval_ms = 30000
        "#;
        fs::write(&path, contents).unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.device, "/dev/ttyS0");
        assert_eq!(cfg.baud, 57_600);
        assert_eq!(cfg.flow_control, FlowControlMode::Hardware);
        assert_eq!(cfg.parity, ParityMode::Even);
        assert_eq!(cfg.stop_bits, StopBitsMode::Two);
        assert_eq!(cfg.dtr_on_open, DtrBehavior::Assert);
        assert_eq!(cfg.serial_timeout_ms, 1500);
        assert_eq!(cfg.poll_interval_ms, 2000);
        assert_eq!(cfg.stale_after_ms, 20_000);
        assert_eq!(cfg.failure_threshold, 4);
        assert_eq!(cfg.failure_cap, 12);
        assert_eq!(cfg.display_cols, 20);
        assert_eq!(cfg.wifi_iface, "wlan1");
        assert_eq!(cfg.wifi_check_interval_ms, 500);
        assert_eq!(cfg.wifi_reconnect_interval_ms, 8000);
        assert_eq!(cfg.wifi_max_attempts, 4);
        assert_eq!(cfg.backoff_initial_ms, 750);
        assert_eq!(cfg.backoff_max_ms, 9000);
        assert_eq!(cfg.report_interval_ms, 30_000);
    }

    #[test]
    fn rejects_unknown_key() {
        let path = temp_path("unknown");
        fs::write(&path, "nope = 1").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{err}").contains("unknown config key"));
    }

    #[test]
    fn rejects_invalid_threshold_pair() {
        let path = temp_path("threshold");
        fs::write(&path, "failure_threshold = 9\nfailure_cap = 9\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{err}").contains("failure_cap"));
    }

    #[test]
    fn saves_and_loads_round_trip() {
        let path = temp_path("roundtrip");
        let cfg = Config {
            device: "/dev/ttyS1".into(),
            baud: 115_200,
            flow_control: FlowControlMode::Software,
            parity: ParityMode::Odd,
            stop_bits: StopBitsMode::Two,
            dtr_on_open: DtrBehavior::Deassert,
            serial_timeout_ms: 1_200,
            poll_interval_ms: 3_000,
            stale_after_ms: 25_000,
            failure_threshold: 2,
            failure_cap: 8,
            display_cols: 20,
            wifi_iface: "wlp2s0".into(),
            wifi_check_interval_ms: 2_000,
            wifi_reconnect_interval_ms: 15_000,
            wifi_max_attempts: 3,
            backoff_initial_ms: 600,
            backoff_max_ms: 12_000,
            report_interval_ms: 45_000,
        };
        save_to_path(&cfg, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn load_or_default_creates_file_with_defaults() {
        let home = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", home.path());
        let cfg_path = home.path().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);

        let cfg = load_or_default().unwrap();
        assert_eq!(cfg, Config::default());
        assert!(cfg_path.exists(), "expected config file to be created");

        let contents = fs::read_to_string(&cfg_path).unwrap();
        assert!(contents.contains("device ="));
        assert!(contents.contains("poll_interval_ms ="));
    }
}
