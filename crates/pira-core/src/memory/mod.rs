//! Memory-read protocol: layouts, raw records and single registers.

pub mod layout;
pub mod records;
pub mod registers;

pub use layout::{DecodeError, DecodedRecord, FieldKind, FieldSpec, FieldValue, Layout};
pub use records::{MemoryRecord, PrimaryMemory, SecondaryMemory};
pub use registers::{DeviationKind, Register};
