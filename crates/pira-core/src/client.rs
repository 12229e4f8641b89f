//! Pira client - High-level orchestrator for one analyzer link.
//!
//! Every call is a strict request/response round trip over the exclusively
//! owned transport. Nothing is cached between calls and nothing is retried.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::convert::{
    RdsStatus, af_list_mhz, deviation_hz, frequency_khz, modulation_power_dbr, phase_difference,
    rds_status, rds_text,
};
use crate::error::Result;
use crate::events::{PacketDirection, PiraEvent, PiraObserver, TracingObserver};
use crate::framing::{BlockReader, extract_payload, read_bounded_reply, send_command};
use crate::info::{DeviceInfo, RdsClock, RdsPin, RtPlus};
use crate::memory::registers::{self, VALUE};
use crate::memory::{
    DecodedRecord, DeviationKind, MemoryRecord, PrimaryMemory, Register, SecondaryMemory,
};
use crate::protocol::{Command, MemoryWindow};
use crate::report::BasicReport;
use crate::transport::{LineTransport, ReadOutcome, TransportError};

/// Client for a P.I.R.A. analyzer.
pub struct Pira<T: LineTransport, O: PiraObserver = TracingObserver> {
    transport: T,
    observer: Arc<O>,
}

impl<T: LineTransport> Pira<T, TracingObserver> {
    /// Create a client with the default tracing observer.
    pub fn new(transport: T) -> Self {
        Self::with_observer(transport, Arc::new(TracingObserver))
    }
}

impl<T: LineTransport, O: PiraObserver> Pira<T, O> {
    /// Create a client with a custom observer.
    pub fn with_observer(transport: T, observer: Arc<O>) -> Self {
        Self {
            transport,
            observer,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn observed(&mut self) -> ObservableTransport<'_, T, O> {
        ObservableTransport {
            inner: &mut self.transport,
            observer: self.observer.as_ref(),
        }
    }

    /// Fetch the raw bytes of a memory window.
    #[instrument(skip(self, window), fields(window = %window))]
    pub fn read_window(&mut self, window: MemoryWindow) -> Result<Vec<u8>> {
        let command = Command::MemoryRead(window);
        let observer = Arc::clone(&self.observer);
        let mut transport = self.observed();
        send_command(&mut transport, &command)?;
        observer.on_event(&PiraEvent::CommandSent {
            command: command.to_string(),
        });

        let lines = read_bounded_reply(&mut transport)?;
        let data = extract_payload(&lines, &window)?;
        observer.on_event(&PiraEvent::WindowDecoded {
            address: window.address(),
            length: data.len(),
        });
        Ok(data)
    }

    /// Fetch `length` bytes at `address`. Out-of-range requests are rejected before sending.
    pub fn read_memory(&mut self, address: u16, length: u16) -> Result<Vec<u8>> {
        self.read_window(MemoryWindow::new(address, length)?)
    }

    /// Read one register window and decode it through its layout.
    pub fn read_register(&mut self, register: &Register) -> Result<DecodedRecord> {
        let data = self.read_window(register.window()?)?;
        Ok(register.layout.decode(&data)?)
    }

    /// Read and decode a full record at its home address.
    pub fn load<R: MemoryRecord>(&mut self) -> Result<R> {
        let data = self.read_window(R::window()?)?;
        Ok(R::decode(&data)?)
    }

    pub fn primary_memory(&mut self) -> Result<PrimaryMemory> {
        self.load()
    }

    pub fn secondary_memory(&mut self) -> Result<SecondaryMemory> {
        self.load()
    }

    /// Request the basic-data report and collect blocks until the device goes quiet.
    ///
    /// A read failure other than the timeout discards everything collected so far.
    #[instrument(skip(self))]
    pub fn basic_data(&mut self) -> Result<BasicReport> {
        let command = Command::BasicData;
        let observer = Arc::clone(&self.observer);
        let mut transport = self.observed();
        send_command(&mut transport, &command)?;
        observer.on_event(&PiraEvent::CommandSent {
            command: command.to_string(),
        });

        let mut report = BasicReport::default();
        let mut blocks = 0;
        let mut reader = BlockReader::new(&mut transport);
        while let Some(block) = reader.next_block()? {
            blocks += 1;
            let key = report.apply(&block)?;
            observer.on_event(&PiraEvent::BlockReceived {
                key: String::from_utf8_lossy(&block.key).trim().to_string(),
                known: key.is_some(),
            });
        }
        observer.on_event(&PiraEvent::StreamEnded { blocks });
        debug!(blocks, "Basic data collected");
        Ok(report)
    }

    /// Read both memory records and merge them into one normalized snapshot.
    #[instrument(skip(self))]
    pub fn device_info(&mut self) -> Result<DeviceInfo> {
        let primary = self.primary_memory()?;
        let secondary = self.secondary_memory()?;
        Ok(DeviceInfo::from_memory(&primary, &secondary))
    }

    fn read_u8(&mut self, register: &Register) -> Result<u8> {
        Ok(self.read_register(register)?.u8(VALUE)?)
    }

    fn read_u16(&mut self, register: &Register) -> Result<u16> {
        Ok(self.read_register(register)?.u16(VALUE)?)
    }

    fn read_text(&mut self, register: &Register) -> Result<String> {
        Ok(rds_text(self.read_register(register)?.bytes(VALUE)?))
    }

    /// Tuned frequency in kHz.
    pub fn frequency(&mut self) -> Result<u32> {
        Ok(frequency_khz(self.read_u16(&registers::FREQUENCY)?))
    }

    /// Deviation in Hz.
    pub fn deviation(&mut self, kind: DeviationKind) -> Result<u32> {
        Ok(deviation_hz(self.read_u16(&kind.register())?))
    }

    pub fn rds_phase_difference(&mut self) -> Result<i16> {
        let raw = self
            .read_register(&registers::RDS_PHASE_DIFFERENCE)?
            .i16(VALUE)?;
        Ok(phase_difference(raw))
    }

    /// Modulation power in dBr.
    pub fn modulation_power(&mut self) -> Result<f64> {
        Ok(modulation_power_dbr(
            self.read_u16(&registers::MODULATION_POWER)?,
        ))
    }

    pub fn rds_pi(&mut self) -> Result<u16> {
        self.read_u16(&registers::RDS_PI)
    }

    pub fn rds_ps(&mut self) -> Result<String> {
        self.read_text(&registers::RDS_PS)
    }

    pub fn rds_pty(&mut self) -> Result<u8> {
        self.read_u8(&registers::RDS_PTY)
    }

    pub fn rds_status(&mut self) -> Result<RdsStatus> {
        Ok(rds_status(self.read_u16(&registers::RDS_STATUS)?))
    }

    pub fn rds_group_counters(&mut self) -> Result<[u8; 32]> {
        Ok(self
            .read_register(&registers::RDS_GROUP_COUNTERS)?
            .byte_array(VALUE)?)
    }

    /// Alternative frequencies in MHz.
    pub fn rds_af_list(&mut self) -> Result<Vec<f64>> {
        let record = self.read_register(&registers::RDS_AF_LIST)?;
        Ok(af_list_mhz(record.bytes(VALUE)?))
    }

    pub fn rds_eon_pi(&mut self) -> Result<[u16; 4]> {
        Ok(self
            .read_register(&registers::RDS_EON_PI)?
            .word_array(VALUE)?)
    }

    pub fn signal_quality(&mut self) -> Result<i32> {
        Ok(i32::from(self.read_u8(&registers::SIGNAL_QUALITY)?))
    }

    pub fn am(&mut self) -> Result<u8> {
        self.read_u8(&registers::AM)
    }

    pub fn noise_level(&mut self) -> Result<u16> {
        self.read_u16(&registers::NOISE_LEVEL)
    }

    /// RadioText.
    pub fn rds_rt(&mut self) -> Result<String> {
        self.read_text(&registers::RDS_RT)
    }

    pub fn rds_ptyn(&mut self) -> Result<String> {
        self.read_text(&registers::RDS_PTYN)
    }

    /// Clock time; the local time offset lives elsewhere and costs a second read.
    pub fn rds_ct(&mut self) -> Result<RdsClock> {
        let record = self.read_register(&registers::RDS_CT)?;
        let local_time_offset = self.rds_ct_offset()?;
        Ok(RdsClock {
            hour: record.u8("hour")?,
            minute: record.u8("minute")?,
            local_time_offset,
        })
    }

    pub fn rds_ct_offset(&mut self) -> Result<u8> {
        self.read_u8(&registers::RDS_CT_OFFSET)
    }

    /// Modified Julian Date bytes as stored by the decoder.
    pub fn rds_mjd(&mut self) -> Result<[u8; 3]> {
        Ok(self.read_register(&registers::RDS_MJD)?.byte_array(VALUE)?)
    }

    pub fn rds_rt_plus(&mut self) -> Result<RtPlus> {
        Ok(RtPlus::from_record(
            &self.read_register(&registers::RDS_RT_PLUS)?,
        )?)
    }

    pub fn rds_pin(&mut self) -> Result<RdsPin> {
        let record = self.read_register(&registers::RDS_PIN)?;
        Ok(RdsPin {
            day: record.u8("day")?,
            hour: record.u8("hour")?,
            minute: record.u8("minute")?,
        })
    }

    pub fn rds_lic(&mut self) -> Result<u8> {
        self.read_u8(&registers::RDS_LIC)
    }

    pub fn rds_ecc(&mut self) -> Result<u8> {
        self.read_u8(&registers::RDS_ECC)
    }

    /// Deviation histogram, 122 bins.
    pub fn histogram(&mut self) -> Result<Vec<u16>> {
        Ok(self.read_register(&registers::HISTOGRAM)?.words(VALUE)?.to_vec())
    }

    pub fn rds_long_ps(&mut self) -> Result<String> {
        self.read_text(&registers::RDS_LONG_PS)
    }
}

/// Transport wrapper that emits packet events.
struct ObservableTransport<'a, T: LineTransport, O: PiraObserver> {
    inner: &'a mut T,
    observer: &'a O,
}

impl<T: LineTransport, O: PiraObserver> LineTransport for ObservableTransport<'_, T, O> {
    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, TransportError> {
        let res = self.inner.write(data);
        if let Ok(sent) = &res {
            self.observer.on_event(&PiraEvent::Packet {
                direction: PacketDirection::Tx,
                length: *sent,
                data: data.iter().take(*sent).copied().collect(),
            });
        }
        res
    }

    fn drain(&mut self) -> std::result::Result<(), TransportError> {
        self.inner.drain()
    }

    fn read_line(&mut self) -> std::result::Result<ReadOutcome, TransportError> {
        let res = self.inner.read_line();
        match &res {
            Ok(ReadOutcome::Line(line)) => {
                self.observer.on_event(&PiraEvent::Packet {
                    direction: PacketDirection::Rx,
                    length: line.len(),
                    data: line.iter().take(64).copied().collect(),
                });
            }
            Ok(ReadOutcome::TimedOut) => self.observer.on_event(&PiraEvent::ReadTimedOut),
            Err(_) => {}
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PiraError;
    use crate::events::NullObserver;
    use crate::events::tests::RecordingObserver;
    use crate::framing::FramingError;
    use crate::memory::records::{PRIMARY_LAYOUT, SECONDARY_LAYOUT};
    use crate::nullable::Nullable;
    use crate::transport::MockTransport;

    fn client(mock: &MockTransport) -> Pira<MockTransport, NullObserver> {
        Pira::with_observer(mock.clone(), Arc::new(NullObserver))
    }

    #[test]
    fn test_frequency_from_register() {
        let mock = MockTransport::new();
        mock.queue_memory_reply("01A,002?h", &[0x52, 0x08]);
        let mut pira = client(&mock);

        assert_eq!(pira.frequency().unwrap(), 106);
        assert_eq!(mock.get_writes(), vec![b"01A,002?h".to_vec()]);
        assert_eq!(pira.transport().drain_count(), 1);

        // Shared state survives releasing the transport
        pira.into_inner().clear_writes();
        assert!(mock.get_writes().is_empty());
    }

    #[test]
    fn test_read_memory_rejects_out_of_range_before_sending() {
        let mock = MockTransport::new();
        let mut pira = client(&mock);

        let err = pira.read_memory(0x1000, 2).unwrap_err();
        assert!(matches!(err, PiraError::WindowOutOfRange { .. }));
        assert!(pira.read_memory(0x10, 0x1000).is_err());
        assert!(mock.get_writes().is_empty());
    }

    #[test]
    fn test_read_memory_timeout_is_error() {
        let mock = MockTransport::new();
        mock.queue_wire("01A,002?h\r\nOK\r\n");
        let mut pira = client(&mock);

        let err = pira.read_memory(0x1A, 2).unwrap_err();
        assert!(matches!(err, PiraError::Framing(FramingError::Timeout { .. })));
    }

    #[test]
    fn test_read_memory_bad_payload() {
        let mock = MockTransport::new();
        mock.queue_wire("01A,002?h\r\nOK\r\n52\r\n\r\n");
        let mut pira = client(&mock);

        let err = pira.read_memory(0x1A, 2).unwrap_err();
        assert!(matches!(
            err,
            PiraError::Framing(FramingError::PayloadLength { expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn test_basic_data_stream_until_timeout() {
        let mock = MockTransport::new();
        mock.queue_wire("frequency:\r\n87.5 MHz\r\n\r\nsignal quality:\r\n95\r\n");
        let mut pira = client(&mock);

        let report = pira.basic_data().unwrap();
        assert_eq!(mock.get_writes(), vec![b"?B".to_vec()]);
        assert_eq!(report.frequency, 87.5);
        assert_eq!(report.signal_quality, 95);
        assert!(report.pilot.is_null());
        assert!(report.rds_deviation.is_null());
        assert!(report.rds_phase_difference.is_null());
        assert!(report.modulation_power.is_null());
        assert!(report.histogram.is_empty());
        assert!(report.rds_group_stats.is_empty());
    }

    #[test]
    fn test_basic_data_drops_trailing_key_without_value() {
        let mock = MockTransport::new();
        mock.queue_wire(concat!(
            "frequency:\r\n87.5 MHz\r\n\r\n",
            "signal quality:\r\n95\r\n\r\n",
            "frequency:\r\n",
        ));
        mock.queue_timeout();
        let observer = Arc::new(RecordingObserver::default());
        let mut pira = Pira::with_observer(mock, Arc::clone(&observer));

        let report = pira.basic_data().unwrap();
        assert_eq!(report.frequency, 87.5);
        assert_eq!(report.signal_quality, 95);
        assert!(observer
            .events()
            .iter()
            .any(|e| matches!(e, PiraEvent::StreamEnded { blocks: 2 })));
    }

    #[test]
    fn test_basic_data_full_stream() {
        let mock = MockTransport::new();
        mock.queue_wire(concat!(
            "\r\n",
            "Frequency:\r\n98.3 MHz\r\n\r\n",
            "Pilot:\r\n6.8 kHz\r\n\r\n",
            "FFT:\r\n1;2 3;4\r\n\r\n",
            "Stereo:\r\n1\r\n\r\n",
            "RDS Phase Difference:\r\n0\r\n\r\n",
            "Histogram data:\r\n0;10 1;20\r\n2;5\r\n\r\n",
            "RDS group statistics:\r\n0A;70% 2A;30%\r\n\r\n",
        ));
        mock.queue_timeout();
        let observer = Arc::new(RecordingObserver::default());
        let mut pira = Pira::with_observer(mock.clone(), Arc::clone(&observer));

        let report = pira.basic_data().unwrap();
        assert_eq!(report.frequency, 98.3);
        assert_eq!(report.pilot, Nullable::new(6.8));
        assert_eq!(report.rds_phase_difference, Nullable::new(0.0));
        assert_eq!(report.histogram, vec![(0, 10), (1, 20), (2, 5)]);
        assert_eq!(report.rds_group_stats.len(), 2);

        let events = observer.events();
        let unknown: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                PiraEvent::BlockReceived { key, known: false } => Some(key.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(unknown, vec!["Stereo:".to_string()]);
        assert!(events
            .iter()
            .any(|e| matches!(e, PiraEvent::StreamEnded { blocks: 7 })));
    }

    #[test]
    fn test_basic_data_read_failure_discards_report() {
        let mock = MockTransport::new();
        mock.queue_wire("frequency:\r\n87.5 MHz\r\n\r\n");
        mock.queue_failure("framing error on port");
        let mut pira = client(&mock);

        assert!(matches!(
            pira.basic_data(),
            Err(PiraError::Transport(TransportError::ReadFailed(_)))
        ));
    }

    #[test]
    fn test_basic_data_bad_required_field() {
        let mock = MockTransport::new();
        mock.queue_wire("signal quality:\r\nexcellent\r\n\r\n");
        let mut pira = client(&mock);
        assert!(matches!(pira.basic_data(), Err(PiraError::Parse(_))));
    }

    #[test]
    fn test_device_info_reads_both_records() {
        let mock = MockTransport::new();
        let mut primary = vec![0u8; PRIMARY_LAYOUT.size()];
        primary[0..2].copy_from_slice(&2130u16.to_le_bytes());
        primary[0x034 - 0x01A..0x03C - 0x01A].copy_from_slice(b"PIRA FM ");
        let mut secondary = vec![0u8; SECONDARY_LAYOUT.size()];
        secondary[0x770 - 0x48C..0x774 - 0x48C].copy_from_slice(b"LONG");
        mock.queue_memory_reply("01A,1E4?h", &primary);
        mock.queue_memory_reply("48C,304?h", &secondary);
        let mut pira = client(&mock);

        let info = pira.device_info().unwrap();
        assert_eq!(info.frequency, 106);
        assert_eq!(info.rds.ps, "PIRA FM ");
        assert_eq!(info.rds.long_ps, "LONG");
        assert_eq!(
            mock.get_writes(),
            vec![b"01A,1E4?h".to_vec(), b"48C,304?h".to_vec()]
        );
    }

    #[test]
    fn test_register_getters() {
        let mock = MockTransport::new();
        mock.queue_memory_reply("024,002?h", &68u16.to_le_bytes());
        mock.queue_memory_reply("028,002?h", &(-10i16).to_le_bytes());
        mock.queue_memory_reply("03E,002?h", &0b100000u16.to_le_bytes());
        let mut af = [0u8; 26];
        af[..2].copy_from_slice(&[1, 204]);
        mock.queue_memory_reply("060,01A?h", &af);
        mock.queue_memory_reply("1DC,008?h", b"Pop\0\0\0\0\0");
        let mut pira = client(&mock);

        assert_eq!(pira.deviation(DeviationKind::Pilot).unwrap(), 6800);
        assert_eq!(pira.rds_phase_difference().unwrap(), -100);
        let status = pira.rds_status().unwrap();
        assert!(status.ta && !status.tp);
        assert_eq!(pira.rds_af_list().unwrap(), vec![87.6, 107.9]);
        assert_eq!(pira.rds_ptyn().unwrap(), "Pop");
    }

    #[test]
    fn test_rds_ct_uses_two_reads() {
        let mock = MockTransport::new();
        mock.queue_memory_reply("1E4,003?h", &[21, 0xFF, 5]);
        mock.queue_memory_reply("1FD,001?h", &[4]);
        let mut pira = client(&mock);

        let ct = pira.rds_ct().unwrap();
        assert_eq!(
            ct,
            RdsClock {
                hour: 21,
                minute: 5,
                local_time_offset: 4
            }
        );
        assert_eq!(mock.get_writes().len(), 2);
    }

    #[test]
    fn test_rt_plus_and_pin() {
        let mock = MockTransport::new();
        mock.queue_memory_reply("1EE,008?h", &[12, 1, 4, 0, 10, 1, 11, 5]);
        mock.queue_memory_reply("1F8,003?h", &[15, 8, 30]);
        let mut pira = client(&mock);

        let rt_plus = pira.rds_rt_plus().unwrap();
        assert_eq!(rt_plus.group_type, 12);
        assert_eq!(rt_plus.item1.length, 10);
        assert_eq!(rt_plus.item2.kind, 1);
        assert_eq!(pira.rds_pin().unwrap().to_string(), "15 08:30");
    }

    #[test]
    fn test_histogram_register() {
        let mock = MockTransport::new();
        let mut words = vec![0u8; 244];
        words[242..].copy_from_slice(&513u16.to_le_bytes());
        mock.queue_memory_reply("572,0F4?h", &words);
        let mut pira = client(&mock);

        let histogram = pira.histogram().unwrap();
        assert_eq!(histogram.len(), 122);
        assert_eq!(histogram[121], 513);
    }

    #[test]
    fn test_observer_sees_traffic() {
        let mock = MockTransport::new();
        mock.queue_memory_reply("01A,002?h", &[0x52, 0x08]);
        let observer = Arc::new(RecordingObserver::default());
        let mut pira = Pira::with_observer(mock, Arc::clone(&observer));
        pira.frequency().unwrap();

        let events = observer.events();
        assert!(matches!(
            &events[0],
            PiraEvent::Packet { direction: PacketDirection::Tx, length: 9, data }
                if data.as_slice() == b"01A,002?h"
        ));
        let rx = events
            .iter()
            .filter(|e| matches!(e, PiraEvent::Packet { direction: PacketDirection::Rx, .. }))
            .count();
        assert_eq!(rx, 4);
        assert!(events
            .iter()
            .any(|e| matches!(e, PiraEvent::WindowDecoded { address: 0x1A, length: 2 })));
    }
}
