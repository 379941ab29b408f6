use crate::{Error, Result};

/// Options for the daemon and one-shot commands; `None` when not given on
/// the command line, so config-file values win.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub device: Option<String>,
    pub baud: Option<u32>,
    pub poll_interval_ms: Option<u64>,
    pub serial_timeout_ms: Option<u64>,
    pub wifi_iface: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

/// Parsed command-line intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the hub daemon.
    Run(RunOptions),
    /// One-shot: send the node a counter-reset command and exit.
    SendReset(RunOptions),
    /// One-shot: put a message on the node display and exit.
    SendMessage(RunOptions, String),
    ShowHelp,
    ShowVersion,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        if args.is_empty() {
            return Ok(Command::Run(RunOptions::default()));
        }

        let mut iter = args.iter();
        match iter.next().map(|s| s.as_str()) {
            Some("run") => Ok(Command::Run(parse_run_options(&mut iter)?)),
            Some("reset") => Ok(Command::SendReset(parse_run_options(&mut iter)?)),
            Some("msg") => {
                let text = iter
                    .next()
                    .cloned()
                    .ok_or_else(|| Error::InvalidArgs("expected message text after msg".into()))?;
                Ok(Command::SendMessage(parse_run_options(&mut iter)?, text))
            }
            Some("--help") | Some("-h") => Ok(Command::ShowHelp),
            Some("--version") | Some("-V") => Ok(Command::ShowVersion),
            Some(flag) if flag.starts_with('-') => {
                // Allow omitting the explicit `run` subcommand: pass the consumed flag plus the
                // remaining args into the run parser.
                let flags: Vec<String> = std::iter::once(flag.to_string())
                    .chain(iter.map(|s| s.to_string()))
                    .collect();
                let mut iter = flags.iter();
                Ok(Command::Run(parse_run_options(&mut iter)?))
            }
            Some(cmd) => Err(Error::InvalidArgs(format!(
                "unknown command '{cmd}', try --help"
            ))),
            None => Ok(Command::Run(RunOptions::default())),
        }
    }

    pub fn help() -> &'static str {
        concat!(
            "hygrolink - humidity sensor node link hub daemon\n",
            "\n",
            "USAGE:\n",
            "  hygrolink run [OPTIONS]\n",
            "  hygrolink reset [OPTIONS]\n",
            "  hygrolink msg <text> [OPTIONS]\n",
            "  hygrolink --help\n",
            "  hygrolink --version\n",
            "\n",
            "OPTIONS:\n",
            "  --device <path>            Serial device path (default: /dev/ttyUSB0)\n",
            "  --baud <number>            Baud rate (default: 9600)\n",
            "  --poll-interval-ms <ms>    Node status poll cadence (default: 5000)\n",
            "  --serial-timeout-ms <ms>   Receive window per exchange (default: 1000)\n",
            "  --wifi-iface <name>        Wireless interface to supervise (default: wlan0)\n",
            "  --log-level <level>        error|warn|info|debug|trace\n",
            "  --log-file <path>          Append log lines to a file as well as stderr\n",
            "  -h, --help                 Show this help\n",
            "  -V, --version              Show version\n",
        )
    }

    pub fn print_help() {
        println!("{}", Self::help());
    }
}

fn parse_run_options(iter: &mut std::slice::Iter<String>) -> Result<RunOptions> {
    let mut opts = RunOptions::default();

    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--device" => {
                opts.device = Some(take_value(flag, iter)?);
            }
            "--baud" => {
                let raw = take_value(flag, iter)?;
                opts.baud = Some(raw.parse().map_err(|_| {
                    Error::InvalidArgs("baud must be a positive integer".to_string())
                })?);
            }
            "--poll-interval-ms" => {
                let raw = take_value(flag, iter)?;
                opts.poll_interval_ms = Some(raw.parse().map_err(|_| {
                    Error::InvalidArgs("poll-interval-ms must be a positive integer".to_string())
                })?);
            }
            "--serial-timeout-ms" => {
                let raw = take_value(flag, iter)?;
                opts.serial_timeout_ms = Some(raw.parse().map_err(|_| {
                    Error::InvalidArgs("serial-timeout-ms must be a positive integer".to_string())
                })?);
            }
            "--wifi-iface" => {
                opts.wifi_iface = Some(take_value(flag, iter)?);
            }
            "--log-level" => {
                opts.log_level = Some(take_value(flag, iter)?);
            }
            "--log-file" => {
                opts.log_file = Some(take_value(flag, iter)?);
            }
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown flag '{other}', try --help"
                )));
            }
        }
    }

    Ok(opts)
}

fn take_value(flag: &str, iter: &mut std::slice::Iter<String>) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| Error::InvalidArgs(format!("expected a value after {flag}")))
}
