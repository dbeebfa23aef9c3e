//! Redundant counter record codec.
//!
//! A record holds an `N`-byte big-endian counter followed by one check byte:
//!
//! ```text
//! [!counter[0] .. !counter[N-1]] [complete:1 | !crc7:7]
//! ```
//!
//! Counter bytes and CRC are stored inverted so that erased storage (all 0xff)
//! decodes as a valid counter of zero. The top bit of the check byte is cleared
//! before the counter bytes are rewritten and set again with the new CRC, so a
//! torn write reads back as incomplete rather than as a plausible value.
//!
//! Everything here is pure and reentrant; safe to call from interrupt context.

use radiolink_frame::crc::crc7_5b;

use crate::consts::{ERASED_BYTE, RECORD_COMPLETE_FLAG, RECORD_CRC_MASK};

/// Why a stored record could not be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFault {
    /// Write-complete flag is clear: an update was interrupted.
    WriteIncomplete,
    /// Stored CRC does not match the counter bytes.
    CrcMismatch,
}

/// Stored form of an `N`-byte counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRecord<const N: usize> {
    inverted: [u8; N],
    check: u8,
}

impl<const N: usize> CounterRecord<N> {
    /// Bytes occupied in storage.
    pub const SIZE: usize = N + 1;

    /// Record as read from freshly erased storage; decodes to zero.
    pub const ERASED: Self = Self {
        inverted: [ERASED_BYTE; N],
        check: ERASED_BYTE,
    };

    /// Encode a counter value as a complete record.
    #[must_use]
    pub fn encode(counter: &[u8; N]) -> Self {
        let crc = crc7_5b(0, counter);
        let mut inverted = [0u8; N];
        for (dst, src) in inverted.iter_mut().zip(counter) {
            *dst = !src;
        }
        Self {
            inverted,
            check: RECORD_COMPLETE_FLAG | (!crc & RECORD_CRC_MASK),
        }
    }

    /// Decode and verify the record.
    pub fn decode(&self) -> Result<[u8; N], RecordFault> {
        if !self.is_write_complete() {
            return Err(RecordFault::WriteIncomplete);
        }
        let mut counter = [0u8; N];
        for (dst, src) in counter.iter_mut().zip(&self.inverted) {
            *dst = !src;
        }
        if crc7_5b(0, &counter) != !self.check & RECORD_CRC_MASK {
            return Err(RecordFault::CrcMismatch);
        }
        Ok(counter)
    }

    #[must_use]
    pub fn is_write_complete(&self) -> bool {
        self.check & RECORD_COMPLETE_FLAG != 0
    }

    /// Check byte with the write-complete flag cleared, marking an update in progress.
    ///
    /// Only clears a bit, so it never needs an erase cycle.
    #[must_use]
    pub fn in_progress_check(&self) -> u8 {
        self.check & !RECORD_COMPLETE_FLAG
    }

    /// Inverted counter bytes as stored.
    #[must_use]
    pub fn counter_bytes(&self) -> &[u8; N] {
        &self.inverted
    }

    /// Check byte as stored.
    #[must_use]
    pub fn check_byte(&self) -> u8 {
        self.check
    }

    /// Rebuild from stored inverted counter bytes and check byte.
    #[must_use]
    pub const fn from_parts(inverted: [u8; N], check: u8) -> Self {
        Self { inverted, check }
    }

    /// Rebuild from stored bytes. Returns `None` unless `bytes` is `N + 1` long.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::SIZE {
            return None;
        }
        let mut inverted = [0u8; N];
        inverted.copy_from_slice(&bytes[..N]);
        Some(Self {
            inverted,
            check: bytes[N],
        })
    }
}

/// Combine two independently decoded copies of the same logical counter.
///
/// The larger valid value wins; a single valid copy is trusted; with no valid
/// copy there is no value.
#[must_use]
pub fn reconcile<const N: usize>(
    primary: Result<[u8; N], RecordFault>,
    secondary: Result<[u8; N], RecordFault>,
) -> Option<[u8; N]> {
    match (primary, secondary) {
        (Ok(a), Ok(b)) => Some(a.max(b)),
        (Ok(a), Err(_)) | (Err(_), Ok(a)) => Some(a),
        (Err(_), Err(_)) => None,
    }
}
