//! Register value conversions.
//!
//! All functions are pure and total: every raw value maps to an output.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::protocol::constants::*;

/// Frequency register to kHz.
///
/// Truncates to whole kHz; raw values below the offset wrap around.
pub fn frequency_khz(raw: u16) -> u32 {
    u32::from(raw.wrapping_sub(FREQUENCY_RAW_OFFSET)) / FREQUENCY_RAW_DIVISOR
}

/// Deviation register to Hz.
pub fn deviation_hz(raw: u16) -> u32 {
    u32::from(raw) * DEVIATION_SCALE_HZ
}

/// Pilot to RDS phase difference in degrees.
pub fn phase_difference(raw: i16) -> i16 {
    raw.wrapping_sub(PHASE_DIFFERENCE_OFFSET)
}

/// Linear modulation power to dBr. Zero maps to negative infinity.
pub fn modulation_power_dbr(raw: u16) -> f64 {
    10.0 * (f64::from(raw) * 100.0).log10()
}

/// RadioText A/B flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RtType {
    #[default]
    A,
    B,
}

impl fmt::Display for RtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtType::A => write!(f, "RTA"),
            RtType::B => write!(f, "RTB"),
        }
    }
}

/// Decoded RDS status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RdsStatus {
    pub ct: bool,
    pub rt: bool,
    pub rt_type: RtType,
    pub af: bool,
    pub tp: bool,
    pub ta: bool,
    pub ms: bool,
    /// Decoder identification bits.
    pub di: u8,
}

/// Split the RDS status register into its flags.
pub fn rds_status(raw: u16) -> RdsStatus {
    RdsStatus {
        ct: raw & RDS_STATUS_CT != 0,
        rt: raw & RDS_STATUS_RT != 0,
        rt_type: if raw & RDS_STATUS_RT_TYPE_A != 0 {
            RtType::A
        } else {
            RtType::B
        },
        af: raw & RDS_STATUS_AF != 0,
        tp: raw & RDS_STATUS_TP != 0,
        ta: raw & RDS_STATUS_TA != 0,
        ms: raw & RDS_STATUS_MS != 0,
        di: (raw & RDS_STATUS_DI_MASK) as u8,
    }
}

/// AF code to MHz; `None` for fillers, counts and LF/MF markers.
pub fn af_frequency_mhz(code: u8) -> Option<f64> {
    if (1..=AF_CODE_MAX_FREQUENCY).contains(&code) {
        Some(f64::from(875 + u16::from(code)) / 10.0)
    } else {
        None
    }
}

/// Frequencies in an AF list, in list order.
pub fn af_list_mhz(codes: &[u8]) -> Vec<f64> {
    codes.iter().filter_map(|&code| af_frequency_mhz(code)).collect()
}

/// RDS text buffer to String, one char per byte, trailing NULs dropped.
pub fn rds_text(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);
    bytes[..end].iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency() {
        assert_eq!(frequency_khz(2130), 106);
        // truncates
        assert_eq!(frequency_khz(1065 + 19), 1);
        assert_eq!(frequency_khz(1065), 0);
        // wraps below the offset
        assert_eq!(frequency_khz(1064), 6553);
    }

    #[test]
    fn test_deviation_and_phase() {
        assert_eq!(deviation_hz(0), 0);
        assert_eq!(deviation_hz(68), 6800);
        assert_eq!(deviation_hz(u16::MAX), 6_553_500);

        assert_eq!(phase_difference(90), 0);
        assert_eq!(phase_difference(0), -90);
        assert_eq!(phase_difference(i16::MIN), i16::MAX - 89);
    }

    #[test]
    fn test_modulation_power() {
        assert!((modulation_power_dbr(1) - 20.0).abs() < 1e-9);
        assert!((modulation_power_dbr(10) - 30.0).abs() < 1e-9);
        assert_eq!(modulation_power_dbr(0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_rds_status_ta_only() {
        let status = rds_status(0b00000100000);
        assert_eq!(
            status,
            RdsStatus {
                ct: false,
                rt: false,
                rt_type: RtType::B,
                af: false,
                tp: false,
                ta: true,
                ms: false,
                di: 0,
            }
        );
    }

    #[test]
    fn test_rds_status_all_bits() {
        let status = rds_status(0b111_1111_1111);
        assert!(status.ct && status.rt && status.af && status.tp && status.ta && status.ms);
        assert_eq!(status.rt_type, RtType::A);
        assert_eq!(status.di, 0xF);

        // bits above 10 are ignored
        assert_eq!(rds_status(0xF800), rds_status(0));
        assert_eq!(rds_status(0b1_0000_0000).rt_type, RtType::A);
        assert_eq!(rds_status(0b0101).di, 5);
    }

    #[test]
    fn test_af_codes() {
        assert_eq!(af_frequency_mhz(1), Some(87.6));
        assert_eq!(af_frequency_mhz(204), Some(107.9));
        assert_eq!(af_frequency_mhz(0), None);
        assert_eq!(af_frequency_mhz(205), None);
        assert_eq!(af_frequency_mhz(225), None);
        assert_eq!(af_list_mhz(&[225, 1, 0, 205, 104]), vec![87.6, 97.9]);
    }

    #[test]
    fn test_rds_text() {
        assert_eq!(rds_text(b"RADIO 1 "), "RADIO 1 ");
        assert_eq!(rds_text(b"ABC\0\0\0"), "ABC");
        assert_eq!(rds_text(&[0, 0]), "");
        assert_eq!(rds_text(&[0xC4]), "\u{C4}");
    }
}
