//! serialport-based line transport implementation.

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::time::Duration;
use tracing::{debug, info, instrument, trace};

use super::traits::{LineTransport, ReadOutcome, TransportError};
use crate::config::ConnectionConfig;

/// Serial port transport (8N1, no flow control).
pub struct SerialTransport {
    reader: BufReader<Box<dyn SerialPort>>,
    /// Bytes of a line that was cut short by a read timeout.
    pending: Vec<u8>,
    port: String,
}

impl SerialTransport {
    /// Open `port` at `baud_rate` with the given read timeout.
    #[instrument(level = "info", fields(read_timeout_ms = read_timeout.as_millis() as u64))]
    pub fn open(
        port: &str,
        baud_rate: u32,
        read_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let serial = serialport::new(port, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(read_timeout)
            .open()
            .map_err(|e| TransportError::OpenFailed {
                port: port.to_string(),
                message: e.to_string(),
            })?;

        info!(port = %port, baud_rate, "Serial port opened");

        Ok(Self {
            reader: BufReader::new(serial),
            pending: Vec::with_capacity(1024),
            port: port.to_string(),
        })
    }

    /// Open using a connection configuration.
    pub fn open_config(config: &ConnectionConfig) -> Result<Self, TransportError> {
        Self::open(&config.port, config.baud_rate, config.read_timeout())
    }

    /// Path of the underlying device.
    pub fn port(&self) -> &str {
        &self.port
    }
}

impl LineTransport for SerialTransport {
    #[instrument(skip(self, data), fields(len = data.len()))]
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let n = self
            .reader
            .get_mut()
            .write(data)
            .map_err(|e| TransportError::WriteFailed(e.to_string()))?;

        debug!(bytes_written = n, "Write complete");
        Ok(n)
    }

    fn drain(&mut self) -> Result<(), TransportError> {
        self.reader
            .get_mut()
            .flush()
            .map_err(|e| TransportError::DrainFailed(e.to_string()))
    }

    fn read_line(&mut self) -> Result<ReadOutcome, TransportError> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(_) if self.pending.last() == Some(&b'\n') => {
                let line = std::mem::take(&mut self.pending);
                trace!(len = line.len(), "Line received");
                Ok(ReadOutcome::Line(line))
            }
            // EOF without a terminator; keep what we have for the next call.
            Ok(_) => Ok(ReadOutcome::TimedOut),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                trace!(pending = self.pending.len(), "Read timed out");
                Ok(ReadOutcome::TimedOut)
            }
            Err(e) => Err(TransportError::ReadFailed(e.to_string())),
        }
    }
}
