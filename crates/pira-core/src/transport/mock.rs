//! Mock line transport for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::traits::{LineTransport, ReadOutcome, TransportError};

/// One scripted reaction to a `read_line` call.
#[derive(Debug, Clone)]
enum Scripted {
    Line(Vec<u8>),
    Timeout,
    Fail(String),
}

/// Mock transport for unit testing framing and client logic.
///
/// Clones share state, so a test can keep a handle after moving one into a client.
/// Once the script runs dry every read times out, like a device that went quiet.
#[derive(Clone)]
pub struct MockTransport {
    /// Queued reactions returned on read.
    script: Arc<Mutex<VecDeque<Scripted>>>,
    /// Captured writes.
    write_log: Arc<Mutex<Vec<Vec<u8>>>>,
    /// Number of drain calls.
    drains: Arc<Mutex<usize>>,
    /// Whether the device is "connected".
    connected: Arc<Mutex<bool>>,
    /// Cap on bytes accepted per write, to simulate short writes.
    write_limit: Arc<Mutex<Option<usize>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            write_log: Arc::new(Mutex::new(Vec::new())),
            drains: Arc::new(Mutex::new(0)),
            connected: Arc::new(Mutex::new(true)),
            write_limit: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue a single line; it is returned verbatim, terminator or not.
    pub fn queue_line(&self, line: &[u8]) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Line(line.to_vec()));
    }

    /// Split `wire` after every `\n` and queue each piece as a line.
    pub fn queue_wire(&self, wire: &str) {
        for line in wire.split_inclusive('\n') {
            self.queue_line(line.as_bytes());
        }
    }

    /// Queue a read timeout.
    pub fn queue_timeout(&self) {
        self.script.lock().unwrap().push_back(Scripted::Timeout);
    }

    /// Queue a hard read failure.
    pub fn queue_failure(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(message.to_string()));
    }

    /// Queue a complete memory-read reply carrying `payload` as hex.
    pub fn queue_memory_reply(&self, command: &str, payload: &[u8]) {
        self.queue_wire(&format!(
            "{command}\r\nOK\r\n{}\r\n\r\n",
            hex::encode_upper(payload)
        ));
    }

    /// Get all captured writes.
    pub fn get_writes(&self) -> Vec<Vec<u8>> {
        self.write_log.lock().unwrap().clone()
    }

    /// Clear captured writes.
    pub fn clear_writes(&self) {
        self.write_log.lock().unwrap().clear();
    }

    /// Number of `drain` calls seen so far.
    pub fn drain_count(&self) -> usize {
        *self.drains.lock().unwrap()
    }

    /// Number of scripted reads not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    /// Accept at most `limit` bytes per write.
    pub fn limit_writes(&self, limit: usize) {
        *self.write_limit.lock().unwrap() = Some(limit);
    }

    /// Simulate device disconnect.
    pub fn disconnect(&self) {
        *self.connected.lock().unwrap() = false;
    }

    /// Simulate device reconnect.
    pub fn reconnect(&self) {
        *self.connected.lock().unwrap() = true;
    }

    fn is_connected(&self) -> bool {
        *self.connected.lock().unwrap()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LineTransport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }
        let accepted = match *self.write_limit.lock().unwrap() {
            Some(limit) => data.len().min(limit),
            None => data.len(),
        };
        self.write_log
            .lock()
            .unwrap()
            .push(data[..accepted].to_vec());
        Ok(accepted)
    }

    fn drain(&mut self) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }
        *self.drains.lock().unwrap() += 1;
        Ok(())
    }

    fn read_line(&mut self) -> Result<ReadOutcome, TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Line(line)) => Ok(ReadOutcome::Line(line)),
            Some(Scripted::Timeout) | None => Ok(ReadOutcome::TimedOut),
            Some(Scripted::Fail(message)) => Err(TransportError::ReadFailed(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_wire_split() {
        let mut mock = MockTransport::new();
        mock.queue_wire("key:\r\nvalue\r\n\r\n");

        assert_eq!(
            mock.read_line().unwrap(),
            ReadOutcome::Line(b"key:\r\n".to_vec())
        );
        assert_eq!(
            mock.read_line().unwrap(),
            ReadOutcome::Line(b"value\r\n".to_vec())
        );
        assert_eq!(mock.read_line().unwrap(), ReadOutcome::Line(b"\r\n".to_vec()));

        // Script is empty now
        assert_eq!(mock.read_line().unwrap(), ReadOutcome::TimedOut);
    }

    #[test]
    fn test_mock_write_capture() {
        let mut mock = MockTransport::new();
        mock.write(b"?B").unwrap();
        mock.drain().unwrap();
        mock.write(b"01A,002?h").unwrap();

        let writes = mock.get_writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], b"?B");
        assert_eq!(writes[1], b"01A,002?h");
        assert_eq!(mock.drain_count(), 1);
    }

    #[test]
    fn test_mock_short_write() {
        let mut mock = MockTransport::new();
        mock.limit_writes(3);
        assert_eq!(mock.write(b"01A,002?h").unwrap(), 3);
        assert_eq!(mock.get_writes()[0], b"01A");
    }

    #[test]
    fn test_mock_failure_and_disconnect() {
        let mut mock = MockTransport::new();
        mock.queue_failure("framing error");
        assert!(matches!(
            mock.read_line(),
            Err(TransportError::ReadFailed(msg)) if msg == "framing error"
        ));

        let handle = mock.clone();
        handle.disconnect();
        assert!(mock.write(b"?B").is_err());
        assert!(matches!(mock.read_line(), Err(TransportError::Disconnected)));

        handle.reconnect();
        assert!(mock.write(b"?B").is_ok());
    }
}
