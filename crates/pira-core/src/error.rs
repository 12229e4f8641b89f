//! Client-level error type.

use thiserror::Error;

use crate::framing::FramingError;
use crate::memory::DecodeError;
use crate::report::ParseError;
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum PiraError {
    /// Address or length outside the 12-bit bus; nothing was sent.
    #[error("Memory window out of range: address=0x{address:X} length=0x{length:X} (max 0xFFF)")]
    WindowOutOfRange { address: u16, length: u16 },

    #[error("Short write: sent {sent} of {expected} bytes of '{command}'")]
    ShortWrite {
        command: String,
        sent: usize,
        expected: usize,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, PiraError>;
