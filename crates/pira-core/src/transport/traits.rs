//! Line transport abstraction.
//!
//! Defines the `LineTransport` trait for the serial link,
//! allowing different implementations (serialport, mock, etc.).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to open {port}: {message}")]
    OpenFailed { port: String, message: String },

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Drain failed: {0}")]
    DrainFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Device disconnected")]
    Disconnected,
}

/// Outcome of a single timed line read.
///
/// Together with `Err(TransportError)` this forms the three-way result of the
/// read primitive: a line, the end of the device's output, or a hard failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete line, terminator included.
    Line(Vec<u8>),
    /// The read timeout elapsed with no complete line pending.
    TimedOut,
}

/// Abstract line-oriented transport interface.
///
/// The transport is exclusively owned by one client; the wire protocol carries
/// no request IDs, so every method takes `&mut self`.
pub trait LineTransport {
    /// Write raw bytes, returning how many were accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Block until all written bytes have left the output buffer.
    fn drain(&mut self) -> Result<(), TransportError>;

    /// Read up to and including the next `\n`, or time out.
    fn read_line(&mut self) -> Result<ReadOutcome, TransportError>;
}

impl<T: LineTransport + ?Sized> LineTransport for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        (**self).write(data)
    }

    fn drain(&mut self) -> Result<(), TransportError> {
        (**self).drain()
    }

    fn read_line(&mut self) -> Result<ReadOutcome, TransportError> {
        (**self).read_line()
    }
}
