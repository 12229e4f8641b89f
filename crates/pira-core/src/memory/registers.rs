//! Single-register windows.
//!
//! Small reads of one value (or one tightly packed group) from the memory map,
//! decoded through the same layout machinery as the full records.

use super::layout::FieldKind::{Bytes, I16, U8, U16, Words};
use super::layout::{FieldSpec, Layout};
use crate::error::PiraError;
use crate::protocol::MemoryWindow;
use crate::protocol::constants::*;

/// Name of the field in a single-value register.
pub const VALUE: &str = "value";

/// A layout anchored at a device address.
#[derive(Debug, Clone, Copy)]
pub struct Register {
    pub address: u16,
    pub layout: Layout,
}

impl Register {
    pub const fn new(address: u16, layout: Layout) -> Self {
        Self { address, layout }
    }

    pub fn window(&self) -> Result<MemoryWindow, PiraError> {
        self.layout.window(self.address)
    }
}

/// Declare a register holding a single field named `value`.
macro_rules! register {
    ($(#[$meta:meta])* $name:ident, $label:literal, $addr:expr, $kind:expr) => {
        $(#[$meta])*
        pub const $name: Register =
            Register::new($addr, Layout::new($label, &[FieldSpec::new(VALUE, $kind)]));
    };
}

register!(FREQUENCY, "frequency", ADDR_FREQUENCY, U16);
register!(
    /// Pilot to RDS phase difference, raised by 90.
    RDS_PHASE_DIFFERENCE,
    "rds_phase_difference",
    ADDR_RDS_PHASE_DIFFERENCE,
    I16
);
register!(MODULATION_POWER, "modulation_power", ADDR_MODULATION_POWER, U16);
register!(RDS_PI, "rds_pi", ADDR_RDS_PI, U16);
register!(RDS_PS, "rds_ps", ADDR_RDS_PS, Bytes(8));
register!(RDS_PTY, "rds_pty", ADDR_RDS_PTY, U8);
register!(RDS_STATUS, "rds_status", ADDR_RDS_STATUS, U16);
register!(RDS_GROUP_COUNTERS, "rds_group_counters", ADDR_RDS_GROUP_COUNTERS, Bytes(32));
register!(RDS_AF_LIST, "rds_af_list", ADDR_RDS_AF_LIST, Bytes(26));
register!(RDS_EON_PI, "rds_eon_pi", ADDR_RDS_EON_PI, Words(4));
register!(SIGNAL_QUALITY, "signal_quality", ADDR_SIGNAL_QUALITY, U8);
register!(AM, "am", ADDR_AM, U8);
register!(NOISE_LEVEL, "noise_level", ADDR_NOISE_LEVEL, U16);
register!(RDS_RT, "rds_rt", ADDR_RDS_RT, Bytes(64));
register!(RDS_PTYN, "rds_ptyn", ADDR_RDS_PTYN, Bytes(8));
register!(RDS_MJD, "rds_mjd", ADDR_RDS_MJD, Bytes(3));
register!(RDS_LIC, "rds_lic", ADDR_RDS_LIC, U8);
register!(RDS_ECC, "rds_ecc", ADDR_RDS_ECC, U8);
register!(RDS_CT_OFFSET, "rds_ct_offset", ADDR_RDS_CT_OFFSET, U8);
register!(HISTOGRAM, "histogram", ADDR_HISTOGRAM, Words(122));
register!(RDS_LONG_PS, "rds_long_ps", ADDR_RDS_LONG_PS, Bytes(32));

/// CT hour and minute, with a filler byte between them.
pub const RDS_CT: Register = Register::new(
    ADDR_RDS_CT,
    Layout::new(
        "rds_ct",
        &[
            FieldSpec::new("hour", U8),
            FieldSpec::reserved(1),
            FieldSpec::new("minute", U8),
        ],
    ),
);

/// RadioText+ tagging block.
pub const RDS_RT_PLUS: Register = Register::new(
    ADDR_RDS_RT_PLUS,
    Layout::new(
        "rds_rt_plus",
        &[
            FieldSpec::new("group_type", U8),
            FieldSpec::new("status", U8),
            FieldSpec::new("item1_type", U8),
            FieldSpec::new("item1_start", U8),
            FieldSpec::new("item1_length", U8),
            FieldSpec::new("item2_type", U8),
            FieldSpec::new("item2_start", U8),
            FieldSpec::new("item2_length", U8),
        ],
    ),
);

/// Programme Item Number.
pub const RDS_PIN: Register = Register::new(
    ADDR_RDS_PIN,
    Layout::new(
        "rds_pin",
        &[
            FieldSpec::new("day", U8),
            FieldSpec::new("hour", U8),
            FieldSpec::new("minute", U8),
        ],
    ),
);

const DEVIATION_LAYOUT: Layout = Layout::new("deviation", &[FieldSpec::new(VALUE, U16)]);

/// The deviation registers, all one u16 in units of 100 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviationKind {
    Pilot,
    Rds,
    Max,
    Average,
    MinHold,
    MaxHold,
    Total,
}

impl DeviationKind {
    pub const ALL: [DeviationKind; 7] = [
        DeviationKind::Pilot,
        DeviationKind::Rds,
        DeviationKind::Max,
        DeviationKind::Average,
        DeviationKind::MinHold,
        DeviationKind::MaxHold,
        DeviationKind::Total,
    ];

    pub fn address(self) -> u16 {
        match self {
            DeviationKind::Pilot => ADDR_PILOT_DEVIATION,
            DeviationKind::Rds => ADDR_RDS_DEVIATION,
            DeviationKind::Max => ADDR_DEVIATION_MAX,
            DeviationKind::Average => ADDR_DEVIATION_AVERAGE,
            DeviationKind::MinHold => ADDR_DEVIATION_MIN_HOLD,
            DeviationKind::MaxHold => ADDR_DEVIATION_MAX_HOLD,
            DeviationKind::Total => ADDR_DEVIATION,
        }
    }

    pub fn register(self) -> Register {
        Register::new(self.address(), DEVIATION_LAYOUT)
    }
}
