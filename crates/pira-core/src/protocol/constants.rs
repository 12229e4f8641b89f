//! Protocol constants for the P.I.R.A. serial interface.

// ============================================================================
// Command tokens (Host -> Device)
// ============================================================================

/// Start the basic-data report stream.
pub const CMD_BASIC_DATA: &str = "?B";

/// Frequency-only query.
pub const CMD_FREQUENCY: &str = "?F";

/// Suffix of the memory-read command (`AAA,SSS?h`).
pub const CMD_MEMORY_READ_SUFFIX: &str = "?h";

// ============================================================================
// Wire framing
// ============================================================================

/// Every reply line ends with CR LF.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Memory replies: index of the hex payload line.
pub const MEMORY_PAYLOAD_LINE: usize = 2;

/// A blank line only ends a reply once more than this many lines were read.
pub const MIN_LINES_BEFORE_BLANK: usize = 2;

/// Highest address and length on the device's 12-bit bus.
pub const MAX_WINDOW_VALUE: u16 = 0xFFF;

// ============================================================================
// Memory map
// ============================================================================

/// Start of the primary block (frequency through CT local time offset).
pub const ADDR_PRIMARY: u16 = 0x01A;
/// Start of the secondary block (instant modulation power through long PS).
pub const ADDR_SECONDARY: u16 = 0x48C;

pub const ADDR_FREQUENCY: u16 = 0x01A;
pub const ADDR_DIP: u16 = 0x020;
pub const ADDR_PILOT_DEVIATION: u16 = 0x024;
pub const ADDR_RDS_DEVIATION: u16 = 0x026;
pub const ADDR_RDS_PHASE_DIFFERENCE: u16 = 0x028;
pub const ADDR_DEVIATION_MAX: u16 = 0x02A;
pub const ADDR_DEVIATION_AVERAGE: u16 = 0x02C;
pub const ADDR_MODULATION_POWER: u16 = 0x02E;
pub const ADDR_DEVIATION_MIN_HOLD: u16 = 0x030;
pub const ADDR_RDS_PI: u16 = 0x032;
pub const ADDR_RDS_PS: u16 = 0x034;
pub const ADDR_RDS_PTY: u16 = 0x03C;
pub const ADDR_RDS_STATUS: u16 = 0x03E;
pub const ADDR_RDS_GROUP_COUNTERS: u16 = 0x040;
pub const ADDR_RDS_AF_LIST: u16 = 0x060;
pub const ADDR_RDS_EON_PI: u16 = 0x07A;
pub const ADDR_SIGNAL_QUALITY: u16 = 0x082;
pub const ADDR_DEVIATION_MAX_HOLD: u16 = 0x088;
pub const ADDR_AM: u16 = 0x08E;
pub const ADDR_DEVIATION: u16 = 0x144;
pub const ADDR_NOISE_LEVEL: u16 = 0x146;
pub const ADDR_RDS_RT: u16 = 0x19C;
pub const ADDR_RDS_PTYN: u16 = 0x1DC;
pub const ADDR_RDS_CT: u16 = 0x1E4;
pub const ADDR_RDS_MJD: u16 = 0x1EA;
pub const ADDR_RDS_RT_PLUS: u16 = 0x1EE;
pub const ADDR_RDS_PIN: u16 = 0x1F8;
pub const ADDR_RDS_LIC: u16 = 0x1FB;
pub const ADDR_RDS_ECC: u16 = 0x1FC;
pub const ADDR_RDS_CT_OFFSET: u16 = 0x1FD;
pub const ADDR_INSTANT_MODULATION_POWER: u16 = 0x48C;
pub const ADDR_ALARMS: u16 = 0x4CE;
pub const ADDR_HISTOGRAM: u16 = 0x572;
pub const ADDR_RDS_LONG_PS: u16 = 0x770;

// ============================================================================
// Conversions
// ============================================================================

/// Offset subtracted from the raw frequency register.
pub const FREQUENCY_RAW_OFFSET: u16 = 1065;
/// Divisor applied after the offset.
pub const FREQUENCY_RAW_DIVISOR: u32 = 10;
/// Deviation registers count in units of 100 Hz.
pub const DEVIATION_SCALE_HZ: u32 = 100;
/// Phase register zero point in degrees.
pub const PHASE_DIFFERENCE_OFFSET: i16 = 90;

// RDS status register bits
pub const RDS_STATUS_CT: u16 = 0b100_0000_0000;
pub const RDS_STATUS_RT: u16 = 0b010_0000_0000;
pub const RDS_STATUS_RT_TYPE_A: u16 = 0b001_0000_0000;
pub const RDS_STATUS_AF: u16 = 0b000_1000_0000;
pub const RDS_STATUS_TP: u16 = 0b000_0100_0000;
pub const RDS_STATUS_TA: u16 = 0b000_0010_0000;
pub const RDS_STATUS_MS: u16 = 0b000_0001_0000;
pub const RDS_STATUS_DI_MASK: u16 = 0b000_0000_1111;

/// Highest AF code that encodes a VHF frequency.
pub const AF_CODE_MAX_FREQUENCY: u8 = 204;
