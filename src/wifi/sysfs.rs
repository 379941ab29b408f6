use super::WifiControl;
use crate::{Error, Result};
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// Wireless control for Linux hubs: association state from sysfs,
/// lightweight reconnects via `wpa_cli`, full reset by cycling the
/// interface with `ip link`.
pub struct SysfsWifi {
    iface: String,
    sys_root: PathBuf,
}

impl SysfsWifi {
    pub fn new(iface: &str) -> Self {
        Self::with_sys_root(iface, PathBuf::from("/sys/class/net"))
    }

    fn with_sys_root(iface: &str, sys_root: PathBuf) -> Self {
        Self {
            iface: iface.to_string(),
            sys_root,
        }
    }

    fn read_attr(&self, name: &str) -> Option<String> {
        let path = self.sys_root.join(&self.iface).join(name);
        std::fs::read_to_string(path)
            .ok()
            .map(|raw| raw.trim().to_string())
    }
}

impl WifiControl for SysfsWifi {
    /// An unreadable attribute (interface gone) counts as disconnected.
    fn is_connected(&mut self) -> bool {
        let operstate_up = self.read_attr("operstate").as_deref() == Some("up");
        let carrier_on = self.read_attr("carrier").as_deref() == Some("1");
        operstate_up && carrier_on
    }

    fn reconnect(&mut self) -> Result<()> {
        run_command("wpa_cli", &["-i", &self.iface, "reconnect"])
    }

    fn reset_interface(&mut self) -> Result<()> {
        run_command("ip", &["link", "set", &self.iface, "down"])?;
        run_command("ip", &["link", "set", &self.iface, "up"])
    }
}

fn run_command(program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program).args(args).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("{program} {} exited with {status}", args.join(" ")),
        )))
    }
}
