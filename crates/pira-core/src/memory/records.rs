//! Raw memory records of the analyzer.
//!
//! Field order and widths are the device's memory map; the offsets noted
//! beside each field are absolute addresses.

use serde::Serialize;

use super::layout::FieldKind::{Bytes, I16, U8, U16, Words};
use super::layout::{DecodeError, DecodedRecord, FieldSpec, Layout};
use crate::error::PiraError;
use crate::protocol::MemoryWindow;
use crate::protocol::constants::{ADDR_PRIMARY, ADDR_SECONDARY};

/// A record with a fixed home address and layout.
pub trait MemoryRecord: Sized {
    const ADDRESS: u16;
    const LAYOUT: Layout;

    /// Build the typed record from decoded fields.
    fn from_record(record: &DecodedRecord) -> Result<Self, DecodeError>;

    fn window() -> Result<MemoryWindow, PiraError> {
        Self::LAYOUT.window(Self::ADDRESS)
    }

    /// Decode a raw dump straight into the typed record.
    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        Self::from_record(&Self::LAYOUT.decode(data)?)
    }
}

pub const PRIMARY_LAYOUT: Layout = Layout::new(
    "primary",
    &[
        FieldSpec::new("frequency", U16), // 0x01A
        FieldSpec::reserved(4),
        FieldSpec::new("dip", U16), // 0x020
        FieldSpec::reserved(2),
        FieldSpec::new("pilot_deviation", U16), // 0x024
        FieldSpec::new("rds_deviation", U16),   // 0x026
        FieldSpec::new("rds_phase_difference", I16), // 0x028
        FieldSpec::new("deviation_max", U16),   // 0x02A
        FieldSpec::new("deviation_average", U16), // 0x02C
        FieldSpec::new("modulation_power", U16), // 0x02E
        FieldSpec::new("deviation_min_hold", U16), // 0x030
        FieldSpec::new("rds_pi", U16),          // 0x032
        FieldSpec::new("rds_ps", Bytes(8)),     // 0x034
        FieldSpec::new("rds_pty", U8),          // 0x03C
        FieldSpec::reserved(1),
        FieldSpec::new("rds_status", U16),      // 0x03E
        FieldSpec::new("rds_group_counters", Bytes(32)), // 0x040
        FieldSpec::new("rds_af_list", Bytes(26)), // 0x060
        FieldSpec::new("rds_eon_pi", Words(4)), // 0x07A
        FieldSpec::new("signal_quality", U8),   // 0x082
        FieldSpec::reserved(5),
        FieldSpec::new("deviation_max_hold", U16), // 0x088
        FieldSpec::reserved(4),
        FieldSpec::new("am", U8), // 0x08E
        FieldSpec::reserved(181),
        FieldSpec::new("deviation", U16),   // 0x144
        FieldSpec::new("noise_level", U16), // 0x146
        FieldSpec::reserved(84),
        FieldSpec::new("rds_rt", Bytes(64)),  // 0x19C
        FieldSpec::new("rds_ptyn", Bytes(8)), // 0x1DC
        FieldSpec::new("rds_ct_hour", U8),    // 0x1E4
        FieldSpec::reserved(1),
        FieldSpec::new("rds_ct_minute", U8), // 0x1E6
        FieldSpec::reserved(3),
        FieldSpec::new("rds_mjd", Bytes(3)), // 0x1EA
        FieldSpec::reserved(1),
        FieldSpec::new("rt_plus_group_type", U8), // 0x1EE
        FieldSpec::new("rt_plus_status", U8),
        FieldSpec::new("rt_plus_item1_type", U8), // 0x1F0
        FieldSpec::new("rt_plus_item1_start", U8),
        FieldSpec::new("rt_plus_item1_length", U8),
        FieldSpec::new("rt_plus_item2_type", U8), // 0x1F3
        FieldSpec::new("rt_plus_item2_start", U8),
        FieldSpec::new("rt_plus_item2_length", U8),
        FieldSpec::reserved(2),
        FieldSpec::new("rds_pin_day", U8), // 0x1F8
        FieldSpec::new("rds_pin_hour", U8),
        FieldSpec::new("rds_pin_minute", U8),
        FieldSpec::new("rds_lic", U8),       // 0x1FB
        FieldSpec::new("rds_ecc", U8),       // 0x1FC
        FieldSpec::new("rds_ct_offset", U8), // 0x1FD
    ],
);

pub const SECONDARY_LAYOUT: Layout = Layout::new(
    "secondary",
    &[
        FieldSpec::new("instant_modulation_power", U16), // 0x48C
        FieldSpec::reserved(64),
        FieldSpec::new("alarms", Bytes(13)), // 0x4CE
        FieldSpec::reserved(151),
        FieldSpec::new("histogram", Words(122)), // 0x572
        FieldSpec::reserved(266),
        FieldSpec::new("rds_long_ps", Bytes(32)), // 0x770
    ],
);

/// Raw registers from 0x01A to 0x1FD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryMemory {
    /// kHz * 10, raised by 1065.
    pub frequency: u16,
    pub dip: u16,
    /// Deviations count in units of 100 Hz.
    pub pilot_deviation: u16,
    pub rds_deviation: u16,
    /// Degrees, raised by 90.
    pub rds_phase_difference: i16,
    pub deviation_max: u16,
    pub deviation_average: u16,
    /// Linear; see `convert::modulation_power_dbr`.
    pub modulation_power: u16,
    pub deviation_min_hold: u16,
    pub rds_pi: u16,
    pub rds_ps: [u8; 8],
    pub rds_pty: u8,
    pub rds_status: u16,
    pub rds_group_counters: [u8; 32],
    pub rds_af_list: [u8; 26],
    pub rds_eon_pi: [u16; 4],
    pub signal_quality: u8,
    pub deviation_max_hold: u16,
    pub am: u8,
    pub deviation: u16,
    pub noise_level: u16,
    pub rds_rt: Vec<u8>,
    pub rds_ptyn: [u8; 8],
    pub rds_ct_hour: u8,
    pub rds_ct_minute: u8,
    pub rds_mjd: [u8; 3],
    pub rt_plus_group_type: u8,
    pub rt_plus_status: u8,
    pub rt_plus_item1_type: u8,
    pub rt_plus_item1_start: u8,
    pub rt_plus_item1_length: u8,
    pub rt_plus_item2_type: u8,
    pub rt_plus_item2_start: u8,
    pub rt_plus_item2_length: u8,
    pub rds_pin_day: u8,
    pub rds_pin_hour: u8,
    pub rds_pin_minute: u8,
    pub rds_lic: u8,
    pub rds_ecc: u8,
    pub rds_ct_offset: u8,
}

impl MemoryRecord for PrimaryMemory {
    const ADDRESS: u16 = ADDR_PRIMARY;
    const LAYOUT: Layout = PRIMARY_LAYOUT;

    fn from_record(r: &DecodedRecord) -> Result<Self, DecodeError> {
        Ok(Self {
            frequency: r.u16("frequency")?,
            dip: r.u16("dip")?,
            pilot_deviation: r.u16("pilot_deviation")?,
            rds_deviation: r.u16("rds_deviation")?,
            rds_phase_difference: r.i16("rds_phase_difference")?,
            deviation_max: r.u16("deviation_max")?,
            deviation_average: r.u16("deviation_average")?,
            modulation_power: r.u16("modulation_power")?,
            deviation_min_hold: r.u16("deviation_min_hold")?,
            rds_pi: r.u16("rds_pi")?,
            rds_ps: r.byte_array("rds_ps")?,
            rds_pty: r.u8("rds_pty")?,
            rds_status: r.u16("rds_status")?,
            rds_group_counters: r.byte_array("rds_group_counters")?,
            rds_af_list: r.byte_array("rds_af_list")?,
            rds_eon_pi: r.word_array("rds_eon_pi")?,
            signal_quality: r.u8("signal_quality")?,
            deviation_max_hold: r.u16("deviation_max_hold")?,
            am: r.u8("am")?,
            deviation: r.u16("deviation")?,
            noise_level: r.u16("noise_level")?,
            rds_rt: r.bytes("rds_rt")?.to_vec(),
            rds_ptyn: r.byte_array("rds_ptyn")?,
            rds_ct_hour: r.u8("rds_ct_hour")?,
            rds_ct_minute: r.u8("rds_ct_minute")?,
            rds_mjd: r.byte_array("rds_mjd")?,
            rt_plus_group_type: r.u8("rt_plus_group_type")?,
            rt_plus_status: r.u8("rt_plus_status")?,
            rt_plus_item1_type: r.u8("rt_plus_item1_type")?,
            rt_plus_item1_start: r.u8("rt_plus_item1_start")?,
            rt_plus_item1_length: r.u8("rt_plus_item1_length")?,
            rt_plus_item2_type: r.u8("rt_plus_item2_type")?,
            rt_plus_item2_start: r.u8("rt_plus_item2_start")?,
            rt_plus_item2_length: r.u8("rt_plus_item2_length")?,
            rds_pin_day: r.u8("rds_pin_day")?,
            rds_pin_hour: r.u8("rds_pin_hour")?,
            rds_pin_minute: r.u8("rds_pin_minute")?,
            rds_lic: r.u8("rds_lic")?,
            rds_ecc: r.u8("rds_ecc")?,
            rds_ct_offset: r.u8("rds_ct_offset")?,
        })
    }
}

/// Raw registers from 0x48C to 0x78F.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryMemory {
    pub instant_modulation_power: u16,
    pub alarms: [u8; 13],
    /// Deviation histogram, 122 bins.
    pub histogram: Vec<u16>,
    pub rds_long_ps: [u8; 32],
}

impl MemoryRecord for SecondaryMemory {
    const ADDRESS: u16 = ADDR_SECONDARY;
    const LAYOUT: Layout = SECONDARY_LAYOUT;

    fn from_record(r: &DecodedRecord) -> Result<Self, DecodeError> {
        Ok(Self {
            instant_modulation_power: r.u16("instant_modulation_power")?,
            alarms: r.byte_array("alarms")?,
            histogram: r.words("histogram")?.to_vec(),
            rds_long_ps: r.byte_array("rds_long_ps")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(layout: &Layout, base: u16, field: &str) -> usize {
        layout.offset_of(field).unwrap() + base as usize
    }

    #[test]
    fn test_primary_layout_matches_memory_map() {
        assert_eq!(PRIMARY_LAYOUT.size(), 0x1E4);
        let at = |field| offset(&PRIMARY_LAYOUT, ADDR_PRIMARY, field);
        assert_eq!(at("frequency"), 0x01A);
        assert_eq!(at("dip"), 0x020);
        assert_eq!(at("pilot_deviation"), 0x024);
        assert_eq!(at("rds_phase_difference"), 0x028);
        assert_eq!(at("deviation_min_hold"), 0x030);
        assert_eq!(at("rds_ps"), 0x034);
        assert_eq!(at("rds_pty"), 0x03C);
        assert_eq!(at("rds_status"), 0x03E);
        assert_eq!(at("rds_group_counters"), 0x040);
        assert_eq!(at("rds_af_list"), 0x060);
        assert_eq!(at("rds_eon_pi"), 0x07A);
        assert_eq!(at("signal_quality"), 0x082);
        assert_eq!(at("deviation_max_hold"), 0x088);
        assert_eq!(at("am"), 0x08E);
        assert_eq!(at("deviation"), 0x144);
        assert_eq!(at("noise_level"), 0x146);
        assert_eq!(at("rds_rt"), 0x19C);
        assert_eq!(at("rds_ptyn"), 0x1DC);
        assert_eq!(at("rds_ct_hour"), 0x1E4);
        assert_eq!(at("rds_ct_minute"), 0x1E6);
        assert_eq!(at("rds_mjd"), 0x1EA);
        assert_eq!(at("rt_plus_group_type"), 0x1EE);
        assert_eq!(at("rt_plus_item2_length"), 0x1F5);
        assert_eq!(at("rds_pin_day"), 0x1F8);
        assert_eq!(at("rds_ct_offset"), 0x1FD);
    }

    #[test]
    fn test_secondary_layout_matches_memory_map() {
        assert_eq!(SECONDARY_LAYOUT.size(), 0x304);
        let at = |field| offset(&SECONDARY_LAYOUT, ADDR_SECONDARY, field);
        assert_eq!(at("instant_modulation_power"), 0x48C);
        assert_eq!(at("alarms"), 0x4CE);
        assert_eq!(at("histogram"), 0x572);
        assert_eq!(at("rds_long_ps"), 0x770);
    }

    #[test]
    fn test_windows() {
        let window = PrimaryMemory::window().unwrap();
        assert_eq!((window.address(), window.length()), (0x01A, 0x1E4));
        let window = SecondaryMemory::window().unwrap();
        assert_eq!((window.address(), window.length()), (0x48C, 0x304));
    }

    #[test]
    fn test_primary_decode_fields() {
        let mut data = vec![0u8; PRIMARY_LAYOUT.size()];
        let base = ADDR_PRIMARY as usize;
        data[0x01A - base..0x01C - base].copy_from_slice(&2130u16.to_le_bytes());
        data[0x028 - base..0x02A - base].copy_from_slice(&(-5i16).to_le_bytes());
        data[0x034 - base..0x03C - base].copy_from_slice(b"RADIO 1 ");
        data[0x07A - base..0x07C - base].copy_from_slice(&0xD3C2u16.to_le_bytes());
        data[0x082 - base] = 95;
        data[0x19C - base..0x1A1 - base].copy_from_slice(b"Hello");
        data[0x1FD - base] = 2;

        let memory = PrimaryMemory::decode(&data).unwrap();
        assert_eq!(memory.frequency, 2130);
        assert_eq!(memory.rds_phase_difference, -5);
        assert_eq!(&memory.rds_ps, b"RADIO 1 ");
        assert_eq!(memory.rds_eon_pi, [0xD3C2, 0, 0, 0]);
        assert_eq!(memory.signal_quality, 95);
        assert_eq!(memory.rds_rt.len(), 64);
        assert_eq!(&memory.rds_rt[..5], b"Hello");
        assert_eq!(memory.rds_ct_offset, 2);
    }

    #[test]
    fn test_secondary_decode_histogram() {
        let mut data = vec![0u8; SECONDARY_LAYOUT.size()];
        let base = ADDR_SECONDARY as usize;
        data[0x572 - base..0x574 - base].copy_from_slice(&7u16.to_le_bytes());
        data[0x664 - base..0x666 - base].copy_from_slice(&0x0102u16.to_le_bytes());

        let memory = SecondaryMemory::decode(&data).unwrap();
        assert_eq!(memory.histogram.len(), 122);
        assert_eq!(memory.histogram[0], 7);
        assert_eq!(memory.histogram[121], 0x0102);
    }

    #[test]
    fn test_decode_rejects_wrong_size() {
        assert!(PrimaryMemory::decode(&[0u8; 0x1E3]).is_err());
        assert!(SecondaryMemory::decode(&[0u8; 0x305]).is_err());
    }
}
