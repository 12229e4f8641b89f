//! Event system for UI decoupling.
//!
//! Lets the CLI (or any other front end) follow the wire traffic and the
//! progress of a call without the core logging on its behalf.

use std::fmt;

/// Serial traffic direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDirection {
    Tx, // Host -> analyzer
    Rx, // Analyzer -> host
}

impl fmt::Display for PacketDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketDirection::Tx => write!(f, "TX"),
            PacketDirection::Rx => write!(f, "RX"),
        }
    }
}

/// Events emitted by the client.
#[derive(Debug, Clone)]
pub enum PiraEvent {
    /// A command left the output buffer.
    CommandSent { command: String },
    /// Bytes written or one line read.
    Packet {
        direction: PacketDirection,
        length: usize,
        data: Vec<u8>,
    },
    /// The line read timed out.
    ReadTimedOut,
    /// A basic-data block was received; `known` is false for ignored keys.
    BlockReceived { key: String, known: bool },
    /// The basic-data stream went quiet.
    StreamEnded { blocks: usize },
    /// A memory window was read and hex-decoded.
    WindowDecoded { address: u16, length: usize },
}

/// Observer trait for receiving client events.
pub trait PiraObserver: Send + Sync {
    fn on_event(&self, event: &PiraEvent);
}

/// No-op observer that discards all events.
pub struct NullObserver;

impl PiraObserver for NullObserver {
    fn on_event(&self, _event: &PiraEvent) {}
}

/// Observer that logs events using tracing.
pub struct TracingObserver;

impl PiraObserver for TracingObserver {
    fn on_event(&self, event: &PiraEvent) {
        match event {
            PiraEvent::CommandSent { command } => {
                tracing::debug!(command = %command, "Command sent");
            }
            PiraEvent::Packet {
                direction,
                length,
                data,
            } => {
                let text = String::from_utf8_lossy(data).escape_debug().to_string();
                tracing::trace!(dir = %direction, len = length, data = %text, "Serial packet");
            }
            PiraEvent::ReadTimedOut => {
                tracing::trace!("Read timed out");
            }
            PiraEvent::BlockReceived { key, known } => {
                if *known {
                    tracing::debug!(key = %key, "Block received");
                } else {
                    tracing::debug!(key = %key, "Ignoring unknown block");
                }
            }
            PiraEvent::StreamEnded { blocks } => {
                tracing::debug!(blocks = blocks, "Basic data stream ended");
            }
            PiraEvent::WindowDecoded { address, length } => {
                tracing::debug!(
                    address = %format!("0x{:03X}", address),
                    len = length,
                    "Memory window decoded"
                );
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Observer that records every event for inspection.
    #[derive(Default)]
    pub(crate) struct RecordingObserver {
        events: Mutex<Vec<PiraEvent>>,
    }

    impl RecordingObserver {
        pub(crate) fn events(&self) -> Vec<PiraEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl PiraObserver for RecordingObserver {
        fn on_event(&self, event: &PiraEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(PacketDirection::Tx.to_string(), "TX");
        assert_eq!(PacketDirection::Rx.to_string(), "RX");
    }

    #[test]
    fn test_observers_accept_every_event() {
        let events = [
            PiraEvent::CommandSent {
                command: "?B".into(),
            },
            PiraEvent::Packet {
                direction: PacketDirection::Rx,
                length: 4,
                data: b"OK\r\n".to_vec(),
            },
            PiraEvent::ReadTimedOut,
            PiraEvent::BlockReceived {
                key: "fft:".into(),
                known: true,
            },
            PiraEvent::StreamEnded { blocks: 3 },
            PiraEvent::WindowDecoded {
                address: 0x1A,
                length: 2,
            },
        ];
        let recorder = RecordingObserver::default();
        for event in &events {
            NullObserver.on_event(event);
            TracingObserver.on_event(event);
            recorder.on_event(event);
        }
        assert_eq!(recorder.events().len(), events.len());
    }
}
