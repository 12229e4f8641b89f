//! Host commands and memory window requests.

use std::fmt;

use super::constants::{CMD_BASIC_DATA, CMD_FREQUENCY, CMD_MEMORY_READ_SUFFIX, MAX_WINDOW_VALUE};
use crate::error::PiraError;

/// A contiguous range of device memory, bounded to the 12-bit address bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryWindow {
    address: u16,
    length: u16,
}

impl MemoryWindow {
    /// Create a window, rejecting address or length above 0xFFF.
    pub fn new(address: u16, length: u16) -> Result<Self, PiraError> {
        if address > MAX_WINDOW_VALUE || length > MAX_WINDOW_VALUE {
            return Err(PiraError::WindowOutOfRange { address, length });
        }
        Ok(Self { address, length })
    }

    /// Window from an address and a byte count computed at runtime.
    pub fn with_len(address: u16, length: usize) -> Result<Self, PiraError> {
        let length = u16::try_from(length).map_err(|_| PiraError::WindowOutOfRange {
            address,
            length: u16::MAX,
        })?;
        Self::new(address, length)
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of hex digits the payload line must carry.
    pub fn hex_len(&self) -> usize {
        self.len() * 2
    }
}

impl fmt::Display for MemoryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:03X}+{}", self.address, self.length)
    }
}

/// Command sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `?B`: start the basic-data stream.
    BasicData,
    /// `?F`: frequency-only query.
    Frequency,
    /// `AAA,SSS?h`: read a memory window.
    MemoryRead(MemoryWindow),
}

impl Command {
    /// Wire representation, without any terminator.
    pub fn to_wire(&self) -> String {
        match self {
            Command::BasicData => CMD_BASIC_DATA.to_string(),
            Command::Frequency => CMD_FREQUENCY.to_string(),
            Command::MemoryRead(window) => format!(
                "{:03X},{:03X}{}",
                window.address(),
                window.length(),
                CMD_MEMORY_READ_SUFFIX
            ),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_wire_format() {
        let window = MemoryWindow::new(0x1A, 2).unwrap();
        assert_eq!(Command::MemoryRead(window).to_wire(), "01A,002?h");

        let window = MemoryWindow::new(0x48C, 0x304).unwrap();
        assert_eq!(Command::MemoryRead(window).to_wire(), "48C,304?h");

        let window = MemoryWindow::new(0xFFF, 0xFFF).unwrap();
        assert_eq!(Command::MemoryRead(window).to_wire(), "FFF,FFF?h");
    }

    #[test]
    fn test_fixed_tokens() {
        assert_eq!(Command::BasicData.to_wire(), "?B");
        assert_eq!(Command::Frequency.to_wire(), "?F");
    }

    #[test]
    fn test_window_bounds() {
        assert!(matches!(
            MemoryWindow::new(0x1000, 1),
            Err(PiraError::WindowOutOfRange { address: 0x1000, length: 1 })
        ));
        assert!(MemoryWindow::new(0, 0x1000).is_err());
        assert!(MemoryWindow::with_len(0x10, 70_000).is_err());

        let window = MemoryWindow::with_len(0x01A, 0x1E4).unwrap();
        assert_eq!(window.len(), 484);
        assert_eq!(window.hex_len(), 968);
        assert!(!window.is_empty());
        assert!(MemoryWindow::new(0x1A, 0).unwrap().is_empty());
        assert_eq!(window.to_string(), "0x01A+484");
    }
}
