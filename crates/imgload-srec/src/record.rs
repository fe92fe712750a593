//! S-Record line parsing.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::{RecordError, Result, SrecError};

/// Record type, from the digit after `S`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordType {
    /// S0: vendor header text.
    Header,
    /// S1: data at a 16-bit address.
    Data16,
    /// S2: data at a 24-bit address.
    Data24,
    /// S3: data at a 32-bit address.
    Data32,
    /// S4: reserved.
    Reserved,
    /// S5: 16-bit record count.
    Count16,
    /// S6: 24-bit record count.
    Count24,
    /// S7: 32-bit start address, terminates S3 data.
    Start32,
    /// S8: 24-bit start address, terminates S2 data.
    Start24,
    /// S9: 16-bit start address, terminates S1 data.
    Start16,
}

impl RecordType {
    #[must_use]
    pub const fn digit(self) -> u8 {
        match self {
            Self::Header => 0,
            Self::Data16 => 1,
            Self::Data24 => 2,
            Self::Data32 => 3,
            Self::Reserved => 4,
            Self::Count16 => 5,
            Self::Count24 => 6,
            Self::Start32 => 7,
            Self::Start24 => 8,
            Self::Start16 => 9,
        }
    }

    /// Number of big-endian address bytes at the front of the data.
    ///
    /// Count and reserved records are ignored, so no address is read from them.
    #[must_use]
    pub const fn address_width(self) -> usize {
        match self {
            Self::Header | Self::Data16 | Self::Start16 => 2,
            Self::Data24 | Self::Start24 => 3,
            Self::Data32 | Self::Start32 => 4,
            Self::Reserved | Self::Count16 | Self::Count24 => 0,
        }
    }

    #[must_use]
    pub const fn is_data(self) -> bool {
        matches!(self, Self::Data16 | Self::Data24 | Self::Data32)
    }

    #[must_use]
    pub const fn is_termination(self) -> bool {
        matches!(self, Self::Start32 | Self::Start24 | Self::Start16)
    }
}

impl TryFrom<u8> for RecordType {
    type Error = RecordError;

    fn try_from(digit: u8) -> std::result::Result<Self, RecordError> {
        Ok(match digit {
            0 => Self::Header,
            1 => Self::Data16,
            2 => Self::Data24,
            3 => Self::Data32,
            4 => Self::Reserved,
            5 => Self::Count16,
            6 => Self::Count24,
            7 => Self::Start32,
            8 => Self::Start24,
            9 => Self::Start16,
            other => return Err(RecordError::UnknownType(other)),
        })
    }
}

/// One verified record. The checksum byte is not kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub record_type: RecordType,
    /// Declared byte count: address, payload and checksum.
    pub count: u8,
    /// Present when the type has an address field.
    pub address: Option<u32>,
    pub payload: Vec<u8>,
}

impl Record {
    /// Build a record, computing its count.
    ///
    /// `address` is truncated to the type's address width.
    ///
    /// # Errors
    ///
    /// [`RecordError::PayloadTooLong`] if the count byte cannot hold the
    /// address and payload.
    pub fn new(
        record_type: RecordType,
        address: u32,
        payload: Vec<u8>,
    ) -> std::result::Result<Self, RecordError> {
        let width = record_type.address_width();
        let count = u8::try_from(width + payload.len() + 1)
            .map_err(|_| RecordError::PayloadTooLong { len: payload.len() })?;
        let address = (width > 0).then(|| {
            let mask = if width == 4 {
                u32::MAX
            } else {
                (1u32 << (width * 8)) - 1
            };
            address & mask
        });
        Ok(Self {
            record_type,
            count,
            address,
            payload,
        })
    }

    /// Parse and verify one line. Trailing whitespace is ignored.
    ///
    /// # Errors
    ///
    /// [`RecordError::Shape`] for a line that is not hex record syntax,
    /// otherwise the first failed length, address or checksum check.
    pub fn parse(line: &str) -> std::result::Result<Self, RecordError> {
        let line = line.trim_end();
        let caps = record_pattern()
            .captures(line)
            .ok_or(RecordError::Shape)?;

        let digit = caps[1].as_bytes()[0] - b'0';
        let count = u8::from_str_radix(&caps[2], 16).map_err(|_| RecordError::Shape)?;
        let mut bytes = decode_hex(&caps[3]).ok_or(RecordError::Shape)?;

        if usize::from(count) != bytes.len() {
            return Err(RecordError::LengthMismatch {
                declared: usize::from(count),
                actual: bytes.len(),
            });
        }

        let stored = bytes.pop().ok_or(RecordError::Shape)?;
        let computed = checksum(count, &bytes);
        if computed != stored {
            return Err(RecordError::Checksum { computed, stored });
        }

        let record_type = RecordType::try_from(digit)?;
        let width = record_type.address_width();
        if bytes.len() < width {
            return Err(RecordError::MissingAddress {
                record_type: digit,
                needed: width,
                available: bytes.len(),
            });
        }

        let payload = bytes.split_off(width);
        let address =
            (width > 0).then(|| bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)));

        Ok(Self {
            record_type,
            count,
            address,
            payload,
        })
    }

    /// Stored checksum byte for this record.
    #[must_use]
    pub fn checksum(&self) -> u8 {
        let mut body = self.address_bytes();
        body.extend_from_slice(&self.payload);
        checksum(self.count, &body)
    }

    fn address_bytes(&self) -> Vec<u8> {
        let width = self.record_type.address_width();
        let address = self.address.unwrap_or_default().to_be_bytes();
        address[4 - width..].to_vec()
    }
}

impl fmt::Display for Record {
    /// Canonical uppercase line, without a terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}{:02X}", self.record_type.digit(), self.count)?;
        for b in self.address_bytes().iter().chain(&self.payload) {
            write!(f, "{b:02X}")?;
        }
        write!(f, "{:02X}", self.checksum())
    }
}

/// One's complement of the low byte of `count` plus every byte in `bytes`.
#[must_use]
pub fn checksum(count: u8, bytes: &[u8]) -> u8 {
    bytes.iter().fold(count, |acc, b| acc.wrapping_add(*b)) ^ 0xFF
}

/// Parse every line of `text`, stopping at the first bad one.
pub fn parse_records(text: &str) -> impl Iterator<Item = Result<Record>> + '_ {
    text.lines()
        .enumerate()
        .map(|(index, line)| parse_numbered(index + 1, line))
}

/// Parse one line, attaching its 1-based line number and text to any error.
///
/// # Errors
///
/// [`SrecError::Record`] wrapping the [`Record::parse`] failure.
pub fn parse_numbered(line: usize, content: &str) -> Result<Record> {
    Record::parse(content).map_err(|source| SrecError::Record {
        line,
        content: content.trim_end().to_string(),
        source,
    })
}

fn decode_hex(digits: &str) -> Option<Vec<u8>> {
    digits
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}

fn record_pattern() -> &'static Regex {
    RECORD_PATTERN.get_or_init(|| {
        Regex::new(r"^S([0-9])([0-9A-Fa-f]{2})((?:[0-9A-Fa-f]{2})+)$").unwrap()
    })
}

static RECORD_PATTERN: OnceLock<Regex> = OnceLock::new();
