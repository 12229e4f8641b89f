//! Command/response framing for both wire protocols.
//!
//! The memory-read protocol is bounded: a reply is complete once a blank line
//! arrives after more than two lines. The basic-data protocol is open ended:
//! the device keeps emitting `key:\r\nvalue\r\n\r\n` blocks and the only end
//! marker is the read timeout.

use thiserror::Error;
use tracing::{debug, trace};

use crate::error::PiraError;
use crate::protocol::constants::{LINE_TERMINATOR, MEMORY_PAYLOAD_LINE, MIN_LINES_BEFORE_BLANK};
use crate::protocol::{Command, MemoryWindow};
use crate::transport::{LineTransport, ReadOutcome};

#[derive(Error, Debug)]
pub enum FramingError {
    #[error("Timed out after {lines_read} lines of a bounded reply")]
    Timeout { lines_read: usize },

    #[error("Short response: {lines} lines, need at least {}", MEMORY_PAYLOAD_LINE + 1)]
    ShortResponse { lines: usize },

    #[error("Payload length mismatch: expected {expected} hex digits, got {actual}")]
    PayloadLength { expected: usize, actual: usize },

    #[error("Invalid hex payload: {0}")]
    InvalidHex(String),
}

/// Write a command and wait for it to leave the output buffer.
pub fn send_command<T: LineTransport>(
    transport: &mut T,
    command: &Command,
) -> Result<(), PiraError> {
    let wire = command.to_wire();
    let sent = transport.write(wire.as_bytes())?;
    if sent != wire.len() {
        let expected = wire.len();
        return Err(PiraError::ShortWrite {
            command: wire,
            sent,
            expected,
        });
    }
    transport.drain()?;
    debug!(command = %wire, "Command sent");
    Ok(())
}

/// True for a line holding only the terminator.
pub fn is_blank(line: &[u8]) -> bool {
    line == LINE_TERMINATOR
}

/// Strip a trailing `\r\n` (or lone `\n`).
pub fn strip_terminator(line: &[u8]) -> &[u8] {
    line.strip_suffix(LINE_TERMINATOR)
        .or_else(|| line.strip_suffix(b"\n"))
        .unwrap_or(line)
}

fn closes_reply(lines: &[Vec<u8>]) -> bool {
    lines.len() > MIN_LINES_BEFORE_BLANK && lines.last().is_some_and(|l| is_blank(l))
}

/// Read one bounded reply. A timeout before the closing blank line is an error.
pub fn read_bounded_reply<T: LineTransport>(transport: &mut T) -> Result<Vec<Vec<u8>>, PiraError> {
    let mut lines = Vec::new();
    loop {
        match transport.read_line()? {
            ReadOutcome::Line(line) => {
                lines.push(line);
                if closes_reply(&lines) {
                    trace!(lines = lines.len(), "Reply complete");
                    return Ok(lines);
                }
            }
            ReadOutcome::TimedOut => {
                return Err(FramingError::Timeout {
                    lines_read: lines.len(),
                }
                .into());
            }
        }
    }
}

/// Pull the hex payload out of a memory reply and decode it to exactly `window.len()` bytes.
pub fn extract_payload(lines: &[Vec<u8>], window: &MemoryWindow) -> Result<Vec<u8>, FramingError> {
    let line = lines
        .get(MEMORY_PAYLOAD_LINE)
        .ok_or(FramingError::ShortResponse { lines: lines.len() })?;
    let payload = strip_terminator(line);

    if payload.len() != window.hex_len() {
        return Err(FramingError::PayloadLength {
            expected: window.hex_len(),
            actual: payload.len(),
        });
    }

    hex::decode(payload).map_err(|e| FramingError::InvalidHex(e.to_string()))
}

/// One `key:` line plus the value lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportBlock {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl ReportBlock {
    fn from_lines(mut lines: Vec<Vec<u8>>) -> Self {
        let key = lines.remove(0);
        Self {
            key,
            value: lines.concat(),
        }
    }
}

/// Iterates the blocks of a basic-data stream until the device goes quiet.
pub struct BlockReader<'a, T: LineTransport> {
    transport: &'a mut T,
    finished: bool,
}

impl<'a, T: LineTransport> BlockReader<'a, T> {
    pub fn new(transport: &'a mut T) -> Self {
        Self {
            transport,
            finished: false,
        }
    }

    /// Next block, `Ok(None)` once the stream has ended.
    ///
    /// A block still open when the timeout fires is returned as the final block
    /// if at least one value line arrived.
    pub fn next_block(&mut self) -> Result<Option<ReportBlock>, PiraError> {
        if self.finished {
            return Ok(None);
        }

        let mut lines: Vec<Vec<u8>> = Vec::new();
        loop {
            match self.transport.read_line()? {
                ReadOutcome::Line(line) => {
                    // separators between blocks
                    if lines.is_empty() && is_blank(&line) {
                        continue;
                    }
                    lines.push(line);
                    if closes_reply(&lines) {
                        return Ok(Some(ReportBlock::from_lines(lines)));
                    }
                }
                ReadOutcome::TimedOut => {
                    self.finished = true;
                    trace!(pending = lines.len(), "Stream ended on timeout");
                    // a key without any value line is dropped
                    if lines.len() < 2 {
                        return Ok(None);
                    }
                    return Ok(Some(ReportBlock::from_lines(lines)));
                }
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
