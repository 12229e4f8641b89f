//! Normalized device snapshot built from both memory records.

use serde::Serialize;
use std::fmt;

use crate::convert::{
    RdsStatus, af_list_mhz, deviation_hz, frequency_khz, modulation_power_dbr, phase_difference,
    rds_status, rds_text,
};
use crate::memory::{DecodeError, DecodedRecord, PrimaryMemory, SecondaryMemory};

/// RDS clock time plus the local time offset register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RdsClock {
    pub hour: u8,
    pub minute: u8,
    pub local_time_offset: u8,
}

impl fmt::Display for RdsClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02} ({:02})",
            self.hour, self.minute, self.local_time_offset
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RtPlusItem {
    #[serde(rename = "type")]
    pub kind: u8,
    pub start: u8,
    pub length: u8,
}

/// RadioText+ tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RtPlus {
    pub group_type: u8,
    pub status: u8,
    pub item1: RtPlusItem,
    pub item2: RtPlusItem,
}

impl RtPlus {
    /// Build from a decoded RT+ register window.
    pub fn from_record(r: &DecodedRecord) -> Result<Self, DecodeError> {
        Ok(Self {
            group_type: r.u8("group_type")?,
            status: r.u8("status")?,
            item1: RtPlusItem {
                kind: r.u8("item1_type")?,
                start: r.u8("item1_start")?,
                length: r.u8("item1_length")?,
            },
            item2: RtPlusItem {
                kind: r.u8("item2_type")?,
                start: r.u8("item2_start")?,
                length: r.u8("item2_length")?,
            },
        })
    }
}

impl From<&PrimaryMemory> for RtPlus {
    fn from(m: &PrimaryMemory) -> Self {
        Self {
            group_type: m.rt_plus_group_type,
            status: m.rt_plus_status,
            item1: RtPlusItem {
                kind: m.rt_plus_item1_type,
                start: m.rt_plus_item1_start,
                length: m.rt_plus_item1_length,
            },
            item2: RtPlusItem {
                kind: m.rt_plus_item2_type,
                start: m.rt_plus_item2_start,
                length: m.rt_plus_item2_length,
            },
        }
    }
}

/// Programme Item Number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RdsPin {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl fmt::Display for RdsPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02} {:02}:{:02}", self.day, self.hour, self.minute)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RdsInfo {
    pub pi: u16,
    pub ps: String,
    pub pty: u8,
    pub status: RdsStatus,
    pub groups: [u8; 32],
    /// Alternative frequencies in MHz.
    pub af_list: Vec<f64>,
    pub eon_pi: [u16; 4],
    pub rt: String,
    pub ptyn: String,
    pub ct: RdsClock,
    pub mjd: [u8; 3],
    pub rt_plus: RtPlus,
    pub pin: RdsPin,
    pub lic: u8,
    pub ecc: u8,
    pub long_ps: String,
}

/// Everything the analyzer reports, in physical units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    /// kHz
    pub frequency: u32,
    /// Deviations in Hz.
    pub pilot_deviation: u32,
    pub rds_deviation: u32,
    pub rds_phase_difference: i16,
    pub deviation_max: u32,
    pub deviation_average: u32,
    /// dBr, negative infinity (JSON null) when the raw register is zero.
    pub modulation_power: f64,
    pub deviation_min_hold: u32,
    pub rds: RdsInfo,
    pub signal_quality: i32,
    pub deviation_max_hold: u32,
    pub am: u8,
    pub deviation: u32,
    pub noise_level: u16,
    pub histogram: Vec<u16>,
}

impl DeviceInfo {
    pub fn from_memory(primary: &PrimaryMemory, secondary: &SecondaryMemory) -> Self {
        let rds = RdsInfo {
            pi: primary.rds_pi,
            ps: rds_text(&primary.rds_ps),
            pty: primary.rds_pty,
            status: rds_status(primary.rds_status),
            groups: primary.rds_group_counters,
            af_list: af_list_mhz(&primary.rds_af_list),
            eon_pi: primary.rds_eon_pi,
            rt: rds_text(&primary.rds_rt),
            ptyn: rds_text(&primary.rds_ptyn),
            ct: RdsClock {
                hour: primary.rds_ct_hour,
                minute: primary.rds_ct_minute,
                local_time_offset: primary.rds_ct_offset,
            },
            mjd: primary.rds_mjd,
            rt_plus: RtPlus::from(primary),
            pin: RdsPin {
                day: primary.rds_pin_day,
                hour: primary.rds_pin_hour,
                minute: primary.rds_pin_minute,
            },
            lic: primary.rds_lic,
            ecc: primary.rds_ecc,
            long_ps: rds_text(&secondary.rds_long_ps),
        };

        Self {
            frequency: frequency_khz(primary.frequency),
            pilot_deviation: deviation_hz(primary.pilot_deviation),
            rds_deviation: deviation_hz(primary.rds_deviation),
            rds_phase_difference: phase_difference(primary.rds_phase_difference),
            deviation_max: deviation_hz(primary.deviation_max),
            deviation_average: deviation_hz(primary.deviation_average),
            modulation_power: modulation_power_dbr(primary.modulation_power),
            deviation_min_hold: deviation_hz(primary.deviation_min_hold),
            rds,
            signal_quality: i32::from(primary.signal_quality),
            deviation_max_hold: deviation_hz(primary.deviation_max_hold),
            am: primary.am,
            deviation: deviation_hz(primary.deviation),
            noise_level: primary.noise_level,
            histogram: secondary.histogram.clone(),
        }
    }
}
