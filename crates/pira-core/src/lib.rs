//! Pira-Core: P.I.R.A. FM monitor driver in Rust.
//!
//! This crate talks to a P.I.R.A. FM broadcast analyzer over a serial link.
//! Two protocols share the byte stream: the open-ended basic-data report
//! (`?B`, `key:` / value blocks until the device goes quiet) and the bounded
//! memory-read protocol (`AAA,LLL?h`, answered with an ASCII-hex dump).
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Transport**: line-oriented serial abstraction (serialport, mock)
//! - **Protocol**: wire commands, memory map addresses and constants
//! - **Framing**: where each protocol's reply ends
//! - **Memory**: fixed-offset record layouts and decoded registers
//! - **Report**: basic-data tokenizers and the `BasicReport` model
//! - **Convert**: raw register values to physical units and flags
//! - **Events**: Observer pattern for UI decoupling
//! - **Client**: High-level orchestrator
//!
//! # Example
//!
//! ```no_run
//! use pira_core::{ConnectionConfig, Pira, SerialTransport};
//!
//! let config = ConnectionConfig::default();
//! let transport = SerialTransport::open_config(&config).expect("open failed");
//! let mut pira = Pira::new(transport);
//!
//! let report = pira.basic_data().expect("basic data failed");
//! println!("{} MHz, quality {}", report.frequency, report.signal_quality);
//! ```

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod events;
pub mod framing;
pub mod info;
pub mod memory;
pub mod nullable;
pub mod protocol;
pub mod report;
pub mod transport;

// Re-exports for convenience
pub use client::Pira;
pub use config::ConnectionConfig;
pub use convert::{RdsStatus, RtType};
pub use error::{PiraError, Result};
pub use events::{NullObserver, PiraEvent, PiraObserver, TracingObserver};
pub use info::{DeviceInfo, RdsClock, RdsInfo, RdsPin, RtPlus, RtPlusItem};
pub use memory::{DeviationKind, MemoryRecord, PrimaryMemory, SecondaryMemory};
pub use nullable::Nullable;
pub use protocol::{Command, MemoryWindow};
pub use report::{BasicReport, GroupShare, ReportKey};
pub use transport::{LineTransport, MockTransport, ReadOutcome, SerialTransport, TransportError};
