use serde::{Deserialize, Serialize};
use std::fmt;

use super::parser::{
    GroupShare, Histogram, ParseError, parse_f64, parse_group_stats, parse_histogram, parse_i32,
    parse_nullable_f64,
};
use crate::framing::ReportBlock;
use crate::nullable::Nullable;

/// Keys the firmware emits in the basic-data stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKey {
    Frequency,
    Pilot,
    RdsDeviation,
    RdsGroupStats,
    DeviationMax,
    DeviationMin,
    DeviationAverage,
    SignalQuality,
    ModulationPower,
    RdsPhaseDifference,
    Histogram,
    Fft,
    DeviationMaxHold,
    SignalLevel,
    Am,
    Balance,
}

impl ReportKey {
    pub const ALL: [ReportKey; 16] = [
        ReportKey::Frequency,
        ReportKey::Pilot,
        ReportKey::RdsDeviation,
        ReportKey::RdsGroupStats,
        ReportKey::DeviationMax,
        ReportKey::DeviationMin,
        ReportKey::DeviationAverage,
        ReportKey::SignalQuality,
        ReportKey::ModulationPower,
        ReportKey::RdsPhaseDifference,
        ReportKey::Histogram,
        ReportKey::Fft,
        ReportKey::DeviationMaxHold,
        ReportKey::SignalLevel,
        ReportKey::Am,
        ReportKey::Balance,
    ];

    /// Key line as it appears on the wire, lowercased.
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKey::Frequency => "frequency:",
            ReportKey::Pilot => "pilot:",
            ReportKey::RdsDeviation => "rds deviation:",
            ReportKey::RdsGroupStats => "rds group statistics:",
            ReportKey::DeviationMax => "max:",
            ReportKey::DeviationMin => "min:",
            ReportKey::DeviationAverage => "ave:",
            ReportKey::SignalQuality => "signal quality:",
            ReportKey::ModulationPower => "modulation power:",
            ReportKey::RdsPhaseDifference => "rds phase difference:",
            ReportKey::Histogram => "histogram data:",
            ReportKey::Fft => "fft:",
            ReportKey::DeviationMaxHold => "max hold:",
            ReportKey::SignalLevel => "signal level:",
            ReportKey::Am => "am:",
            ReportKey::Balance => "r/l:",
        }
    }

    /// Match a raw key line, ignoring case and surrounding whitespace.
    pub fn from_key(line: &[u8]) -> Option<Self> {
        let key = String::from_utf8_lossy(line).trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One snapshot of the basic-data stream.
///
/// Metrics the firmware did not send (or sent unparsable) stay null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicReport {
    /// MHz as reported.
    pub frequency: f64,
    pub signal_quality: i32,
    pub pilot: Nullable<f64>,
    pub rds_deviation: Nullable<f64>,
    pub rds_phase_difference: Nullable<f64>,
    pub modulation_power: Nullable<f64>,
    pub deviation_max: Nullable<f64>,
    pub deviation_min: Nullable<f64>,
    pub deviation_average: Nullable<f64>,
    pub deviation_max_hold: Nullable<f64>,
    pub signal_level: Nullable<f64>,
    pub am: Nullable<f64>,
    pub balance: Nullable<f64>,
    pub histogram: Histogram,
    pub rds_group_stats: Vec<GroupShare>,
}

impl BasicReport {
    /// Fold one block into the report.
    ///
    /// Returns the recognised key, or `None` for keys this report does not know.
    pub fn apply(&mut self, block: &ReportBlock) -> Result<Option<ReportKey>, ParseError> {
        let Some(key) = ReportKey::from_key(&block.key) else {
            return Ok(None);
        };
        let value = block.value.as_slice();

        match key {
            ReportKey::Frequency => self.frequency = parse_f64(value)?,
            ReportKey::SignalQuality => self.signal_quality = parse_i32(value)?,
            ReportKey::Pilot => self.pilot = parse_nullable_f64(value),
            ReportKey::RdsDeviation => self.rds_deviation = parse_nullable_f64(value),
            ReportKey::RdsPhaseDifference => self.rds_phase_difference = parse_nullable_f64(value),
            ReportKey::ModulationPower => self.modulation_power = parse_nullable_f64(value),
            ReportKey::DeviationMax => self.deviation_max = parse_nullable_f64(value),
            ReportKey::DeviationMin => self.deviation_min = parse_nullable_f64(value),
            ReportKey::DeviationAverage => self.deviation_average = parse_nullable_f64(value),
            ReportKey::DeviationMaxHold => self.deviation_max_hold = parse_nullable_f64(value),
            ReportKey::SignalLevel => self.signal_level = parse_nullable_f64(value),
            ReportKey::Am => self.am = parse_nullable_f64(value),
            ReportKey::Balance => self.balance = parse_nullable_f64(value),
            ReportKey::Histogram => self.histogram = parse_histogram(value)?,
            ReportKey::RdsGroupStats => self.rds_group_stats = parse_group_stats(value)?,
            ReportKey::Fft => {}
        }
        Ok(Some(key))
    }
}
