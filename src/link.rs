use crate::protocol::{self, Reading};
use crate::serial::LineIo;
use crate::Result;

/// Outcome of one status exchange over the node link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkOutcome {
    Success(Reading),
    Failure(LinkFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFailure {
    Timeout,
    Malformed,
}

impl LinkFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkFailure::Timeout => "timeout",
            LinkFailure::Malformed => "malformed_response",
        }
    }
}

/// Run one request/response exchange: flush stale buffered bytes, send the
/// request, await one line within the transport's receive window, decode it.
///
/// Exactly one attempt per call; retry cadence belongs to the poll loop.
/// Hard port faults propagate as errors so the caller can drop the port.
pub fn request_status<IO: LineIo>(io: &mut IO, line_buffer: &mut String) -> Result<LinkOutcome> {
    io.discard_pending()?;
    io.send_command_line(protocol::STATUS_REQUEST)?;
    if io.read_message_line(line_buffer)? == 0 {
        return Ok(LinkOutcome::Failure(LinkFailure::Timeout));
    }
    match protocol::parse_status_line(line_buffer.trim()) {
        Ok(reading) => Ok(LinkOutcome::Success(reading)),
        Err(_) => Ok(LinkOutcome::Failure(LinkFailure::Malformed)),
    }
}

/// Ask the node to collapse its min/max envelope to the current value.
/// Fire-and-forget: success means the bytes reached the transport.
pub fn send_reset<IO: LineIo>(io: &mut IO) -> Result<()> {
    io.send_command_line(protocol::RESET_COMMAND)
}

/// Put `text` on the node's display. Control characters are stripped and
/// the text truncated to `display_cols` characters; the node display
/// cannot show more, and the protocol truncates rather than rejects.
pub fn send_message<IO: LineIo>(io: &mut IO, text: &str, display_cols: usize) -> Result<()> {
    let mut line = String::with_capacity(protocol::MESSAGE_PREFIX.len() + display_cols);
    line.push_str(protocol::MESSAGE_PREFIX);
    line.extend(text.chars().filter(|c| !c.is_control()).take(display_cols));
    io.send_command_line(&line)
}
