//! Protocol module - wire commands and memory map constants.

pub mod command;
pub mod constants;

pub use command::{Command, MemoryWindow};
pub use constants::*;
