pub mod backoff;
pub mod errors;
pub mod fake;
pub mod sync;

pub use sync::SerialPort;

/// Upper bound for one received line; anything longer is drained and rejected.
pub const MAX_LINE_BYTES: usize = 128;

/// Line-oriented half-duplex transport as the link layer sees it.
///
/// `read_message_line` returns `Ok(0)` when the receive window elapses with
/// no terminator; hard I/O faults surface as errors so the caller can tear
/// the port down.
pub trait LineIo {
    fn send_command_line(&mut self, line: &str) -> crate::Result<()>;
    fn read_message_line(&mut self, line_buffer: &mut String) -> crate::Result<usize>;
    /// Drop any bytes still buffered from an earlier, unconsumed exchange.
    fn discard_pending(&mut self) -> crate::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialOptions {
    pub baud: u32,
    pub timeout_ms: u64,
    pub flow_control: FlowControlMode,
    pub parity: ParityMode,
    pub stop_bits: StopBitsMode,
    pub dtr: DtrBehavior,
}

impl Default for SerialOptions {
    fn default() -> Self {
        Self {
            baud: crate::config::DEFAULT_BAUD,
            timeout_ms: crate::config::DEFAULT_SERIAL_TIMEOUT_MS,
            flow_control: FlowControlMode::default(),
            parity: ParityMode::default(),
            stop_bits: StopBitsMode::default(),
            dtr: DtrBehavior::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowControlMode {
    #[default]
    None,
    Software,
    Hardware,
}

impl std::str::FromStr for FlowControlMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(FlowControlMode::None),
            "software" | "xonxoff" => Ok(FlowControlMode::Software),
            "hardware" | "rtscts" => Ok(FlowControlMode::Hardware),
            _ => Err("expected 'none', 'software' or 'hardware'".into()),
        }
    }
}

impl std::fmt::Display for FlowControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FlowControlMode::None => "none",
            FlowControlMode::Software => "software",
            FlowControlMode::Hardware => "hardware",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParityMode {
    #[default]
    None,
    Odd,
    Even,
}

impl std::str::FromStr for ParityMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ParityMode::None),
            "odd" => Ok(ParityMode::Odd),
            "even" => Ok(ParityMode::Even),
            _ => Err("expected 'none', 'odd' or 'even'".into()),
        }
    }
}

impl std::fmt::Display for ParityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ParityMode::None => "none",
            ParityMode::Odd => "odd",
            ParityMode::Even => "even",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBitsMode {
    #[default]
    One,
    Two,
}

impl std::str::FromStr for StopBitsMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "1" | "one" => Ok(StopBitsMode::One),
            "2" | "two" => Ok(StopBitsMode::Two),
            _ => Err("expected '1' or '2'".into()),
        }
    }
}

impl std::fmt::Display for StopBitsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StopBitsMode::One => "1",
            StopBitsMode::Two => "2",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DtrBehavior {
    #[default]
    Preserve,
    Assert,
    Deassert,
}

impl std::str::FromStr for DtrBehavior {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preserve" => Ok(DtrBehavior::Preserve),
            "on" | "assert" => Ok(DtrBehavior::Assert),
            "off" | "deassert" => Ok(DtrBehavior::Deassert),
            _ => Err("expected 'preserve', 'on' or 'off'".into()),
        }
    }
}

impl std::fmt::Display for DtrBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DtrBehavior::Preserve => "preserve",
            DtrBehavior::Assert => "on",
            DtrBehavior::Deassert => "off",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn modes_round_trip_through_strings() {
        for mode in [
            FlowControlMode::None,
            FlowControlMode::Software,
            FlowControlMode::Hardware,
        ] {
            assert_eq!(FlowControlMode::from_str(&mode.to_string()), Ok(mode));
        }
        for mode in [ParityMode::None, ParityMode::Odd, ParityMode::Even] {
            assert_eq!(ParityMode::from_str(&mode.to_string()), Ok(mode));
        }
        for mode in [StopBitsMode::One, StopBitsMode::Two] {
            assert_eq!(StopBitsMode::from_str(&mode.to_string()), Ok(mode));
        }
        for mode in [DtrBehavior::Preserve, DtrBehavior::Assert, DtrBehavior::Deassert] {
            assert_eq!(DtrBehavior::from_str(&mode.to_string()), Ok(mode));
        }
    }

    #[test]
    fn rejects_unknown_mode_strings() {
        assert!(FlowControlMode::from_str("both").is_err());
        assert!(ParityMode::from_str("mark").is_err());
        assert!(StopBitsMode::from_str("3").is_err());
        assert!(DtrBehavior::from_str("maybe").is_err());
    }
}
