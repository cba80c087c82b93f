//! Frames read from the reader and the scan records derived from them.

use super::member::{AllowFlag, MemberId};
use crate::error::{FrameError, FrameResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of text received from the serial device.
///
/// The line has already been decoded and trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    line: String,
}

impl Frame {
    /// Wrap a decoded, trimmed line.
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    /// Decode raw bytes into a frame.
    ///
    /// Invalid UTF-8 is rejected rather than replaced, since a garbled
    /// member id must never reach the table.
    pub fn decode(bytes: &[u8]) -> FrameResult<Self> {
        let text = std::str::from_utf8(bytes).map_err(|_| FrameError::InvalidUtf8)?;
        Ok(Self::new(text.trim()))
    }

    /// The text of the frame.
    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// Split the frame on single spaces.
    ///
    /// Consecutive spaces produce empty tokens, matching what the reader
    /// firmware actually emits on the wire.
    pub fn tokens(&self) -> Vec<&str> {
        self.line.split(' ').collect()
    }

    /// Parse the frame into a scan record.
    ///
    /// The first token is the member id and the second the allow flag;
    /// anything after that is ignored.
    pub fn parse(&self) -> FrameResult<ScanRecord> {
        let tokens = self.tokens();
        match tokens.as_slice() {
            [member, allow, ..] => Ok(ScanRecord::new(
                MemberId::new(*member),
                AllowFlag::new(*allow),
            )),
            _ => Err(FrameError::Malformed {
                line: self.line.clone(),
                tokens: tokens.len(),
            }),
        }
    }
}

/// A single scan event, ready to be inserted as one row.
///
/// The row identifier is assigned by the database and never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Member identifier column.
    pub member_id: MemberId,
    /// Allow flag column.
    pub allow: AllowFlag,
    /// When the frame was parsed. Not persisted.
    pub received_at: DateTime<Utc>,
}

impl ScanRecord {
    /// Create a record stamped with the current time.
    pub fn new(member_id: MemberId, allow: AllowFlag) -> Self {
        Self {
            member_id,
            allow,
            received_at: Utc::now(),
        }
    }
}
