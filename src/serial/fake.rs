use super::LineIo;
use crate::Result;
use std::collections::VecDeque;

/// Scriptable in-memory transport used by tests.
///
/// Each scripted entry answers one `read_message_line` call; an empty
/// string models a receive timeout (`Ok(0)`), an `Err` a hard port fault.
#[derive(Default)]
pub struct FakeSerialPort {
    script: VecDeque<Result<String>>,
    writes: Vec<String>,
    discards: usize,
}

impl FakeSerialPort {
    pub fn new(script: Vec<Result<String>>) -> Self {
        Self {
            script: script.into(),
            writes: Vec::new(),
            discards: 0,
        }
    }

    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    pub fn discards(&self) -> usize {
        self.discards
    }
}

impl LineIo for FakeSerialPort {
    fn send_command_line(&mut self, line: &str) -> Result<()> {
        self.writes.push(line.to_string());
        Ok(())
    }

    fn read_message_line(&mut self, line_buffer: &mut String) -> Result<usize> {
        line_buffer.clear();
        match self.script.pop_front() {
            Some(Ok(line)) => {
                line_buffer.push_str(&line);
                Ok(line_buffer.len())
            }
            Some(Err(e)) => Err(e),
            None => Ok(0),
        }
    }

    fn discard_pending(&mut self) -> Result<()> {
        self.discards += 1;
        Ok(())
    }
}
