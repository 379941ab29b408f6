use crate::{Error, Result};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, StopBits};
use std::io;
use std::time::Duration;

use super::{
    DtrBehavior, FlowControlMode, LineIo, ParityMode, SerialOptions, StopBitsMode, MAX_LINE_BYTES,
};

/// Hub end of the point-to-point node link.
#[derive(Debug)]
pub struct SerialPort {
    device: String,
    baud: u32,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialPort {
    pub fn connect(device: &str, options: SerialOptions) -> Result<Self> {
        if device.is_empty() {
            return Err(Error::InvalidArgs(
                "device path cannot be empty".to_string(),
            ));
        }

        let mut builder = serialport::new(device, options.baud)
            .data_bits(DataBits::Eight)
            .parity(to_serial_parity(options.parity))
            .stop_bits(to_serial_stop_bits(options.stop_bits))
            .flow_control(to_serial_flow(options.flow_control))
            .timeout(Duration::from_millis(options.timeout_ms));

        builder = match options.dtr {
            DtrBehavior::Preserve => builder,
            DtrBehavior::Assert => builder.dtr_on_open(true),
            DtrBehavior::Deassert => builder.dtr_on_open(false),
        };

        let port = builder.open().map_err(map_serial_error)?;

        Ok(Self {
            device: device.to_string(),
            baud: options.baud,
            port: Some(port),
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn baud(&self) -> u32 {
        self.baud
    }

    fn port_mut(&mut self) -> Result<&mut (dyn serialport::SerialPort + 'static)> {
        self.port
            .as_deref_mut()
            .ok_or_else(|| Error::InvalidArgs("serial port not connected".into()))
    }
}

impl LineIo for SerialPort {
    /// Send a single newline-terminated line; no acknowledgement is read.
    fn send_command_line(&mut self, line: &str) -> Result<()> {
        let port = self.port_mut()?;
        let mut buf = line.as_bytes().to_vec();
        buf.push(b'\n');
        port.write_all(&buf)?;
        port.flush()?;
        Ok(())
    }

    /// Read one newline-terminated line within the configured receive
    /// timeout. Returns 0 when the window elapses without a terminator.
    fn read_message_line(&mut self, line_buffer: &mut String) -> Result<usize> {
        line_buffer.clear();
        let port = self.port_mut()?;

        let mut byte = [0u8; 1];
        let mut total = 0;
        // Read byte-by-byte until newline while enforcing a size guard.
        loop {
            match port.read(&mut byte) {
                Ok(0) => return Ok(total),
                Ok(_) => {
                    total += 1;
                    if total > MAX_LINE_BYTES {
                        // Drain until newline so the next exchange starts clean.
                        while port.read(&mut byte).is_ok() {
                            if byte[0] == b'\n' {
                                break;
                            }
                        }
                        return Err(Error::Parse(format!(
                            "response exceeds {MAX_LINE_BYTES} bytes"
                        )));
                    }
                    let b = byte[0];
                    if b == b'\n' {
                        return Ok(total);
                    }
                    if b != b'\r' {
                        line_buffer.push(b as char);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(0),
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }

    /// Drop bytes left over from a late or duplicate reply so the next
    /// response cannot be misattributed to a stale exchange.
    fn discard_pending(&mut self) -> Result<()> {
        let port = self.port_mut()?;
        port.clear(ClearBuffer::Input).map_err(map_serial_error)
    }
}

fn map_serial_error(err: serialport::Error) -> Error {
    use serialport::ErrorKind;

    let kind = match err.kind() {
        ErrorKind::NoDevice => io::ErrorKind::NotFound,
        ErrorKind::InvalidInput => io::ErrorKind::InvalidInput,
        ErrorKind::Io(inner) => inner,
        ErrorKind::Unknown => io::ErrorKind::Other,
    };

    Error::Io(io::Error::new(kind, err))
}

fn to_serial_flow(mode: FlowControlMode) -> FlowControl {
    match mode {
        FlowControlMode::None => FlowControl::None,
        FlowControlMode::Software => FlowControl::Software,
        FlowControlMode::Hardware => FlowControl::Hardware,
    }
}

fn to_serial_parity(mode: ParityMode) -> Parity {
    match mode {
        ParityMode::None => Parity::None,
        ParityMode::Odd => Parity::Odd,
        ParityMode::Even => Parity::Even,
    }
}

fn to_serial_stop_bits(mode: StopBitsMode) -> StopBits {
    match mode {
        StopBitsMode::One => StopBits::One,
        StopBitsMode::Two => StopBits::Two,
    }
}
