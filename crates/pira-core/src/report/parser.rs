//! Value tokenizers for the basic-data report.
//!
//! Values arrive as raw line bytes, terminators included. Numeric values carry
//! a unit suffix after a space (`87.5 MHz`), which is cut off before parsing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nullable::Nullable;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid number: '{0}'")]
    InvalidFloat(String),

    #[error("Invalid integer: '{0}'")]
    InvalidInteger(String),

    #[error("Invalid histogram bin: '{0}'")]
    InvalidBin(String),

    #[error("Invalid histogram count: '{0}'")]
    InvalidCount(String),

    #[error("Invalid group percentage: '{0}'")]
    InvalidPercentage(String),
}

/// Ordered (bin, count) pairs.
pub type Histogram = Vec<(i64, i64)>;

/// Share of one RDS group type in the received traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupShare {
    pub group: String,
    pub percent: f64,
}

/// Trimmed value up to the first space.
fn leading_token(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let trimmed = text.trim();
    trimmed.split(' ').next().unwrap_or_default().to_string()
}

pub fn parse_f64(data: &[u8]) -> Result<f64, ParseError> {
    let token = leading_token(data);
    token.parse().map_err(|_| ParseError::InvalidFloat(token))
}

pub fn parse_i32(data: &[u8]) -> Result<i32, ParseError> {
    let token = leading_token(data);
    token.parse().map_err(|_| ParseError::InvalidInteger(token))
}

/// Integer flag, nonzero is true.
pub fn parse_bool(data: &[u8]) -> Result<bool, ParseError> {
    parse_i32(data).map(|v| v != 0)
}

/// Whitespace-trimmed text. Never fails.
pub fn parse_string(data: &[u8]) -> String {
    String::from_utf8_lossy(data).trim().to_string()
}

pub fn parse_nullable_f64(data: &[u8]) -> Nullable<f64> {
    parse_f64(data).ok().into()
}

pub fn parse_nullable_i32(data: &[u8]) -> Nullable<i32> {
    parse_i32(data).ok().into()
}

pub fn parse_nullable_bool(data: &[u8]) -> Nullable<bool> {
    parse_bool(data).ok().into()
}

pub fn parse_nullable_string(data: &[u8]) -> Nullable<String> {
    Nullable::new(parse_string(data))
}

/// Parse `bin;count` pairs.
///
/// Any run of characters other than digits and `.` separates tokens. A
/// dangling final token is dropped; a non-integer token fails the whole block.
pub fn parse_histogram(data: &[u8]) -> Result<Histogram, ParseError> {
    let text = String::from_utf8_lossy(data);
    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_numeric() && c != '.')
        .filter(|t| !t.is_empty())
        .collect();

    tokens
        .chunks_exact(2)
        .map(|pair| {
            let bin = pair[0]
                .parse()
                .map_err(|_| ParseError::InvalidBin(pair[0].to_string()))?;
            let count = pair[1]
                .parse()
                .map_err(|_| ParseError::InvalidCount(pair[1].to_string()))?;
            Ok((bin, count))
        })
        .collect()
}

/// Render pairs in the wire form `parse_histogram` reads.
pub fn format_histogram(histogram: &[(i64, i64)]) -> String {
    histogram
        .iter()
        .map(|(bin, count)| format!("{bin};{count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse `<group>;<percent>%` entries.
pub fn parse_group_stats(data: &[u8]) -> Result<Vec<GroupShare>, ParseError> {
    let text = String::from_utf8_lossy(data);
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ';' || c == '%')
        .filter(|t| !t.is_empty())
        .collect();

    tokens
        .chunks_exact(2)
        .map(|pair| {
            let percent = parse_f64(pair[1].as_bytes())
                .map_err(|_| ParseError::InvalidPercentage(pair[1].to_string()))?;
            Ok(GroupShare {
                group: pair[0].to_string(),
                percent,
            })
        })
        .collect()
}
