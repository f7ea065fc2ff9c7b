//! Message Header Implementation
//!
//! The header is identical for all messages and carries framing and
//! correlation information. Everything after it up to the declared length
//! is payload: an optional subsystem-specific extra header followed by a
//! sequence of TLV attributes.

use crate::protocol::constants::{align, MIN_DATA_TYPE};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// Message header (16 bytes)
///
/// Field ordering matches the wire layout exactly; all fields are native
/// byte order and the struct has zero padding. The declared `len` always
/// includes the header itself.
///
/// ```text
/// ┌────────────────┬─────────────────────────────────────┐
/// │ MessageHeader  │ extra header (optional) + TLVs      │
/// │ (16 bytes)     │ (len - 16 bytes)                    │
/// └────────────────┴─────────────────────────────────────┘
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct MessageHeader {
    /// Total message length including this header (bytes 0-3)
    pub len: u32,
    /// Message type; values below [`MIN_DATA_TYPE`] are control messages
    pub msg_type: u16,
    /// Flag bits, opaque to the codec (bytes 6-7)
    pub flags: u16,
    /// Sequence number for request/reply correlation; 0 marks an
    /// unsolicited notification (bytes 8-11)
    pub seq: u32,
    /// Origin/port identifier of the sending endpoint; 0 marks an
    /// event source exempt from origin checks (bytes 12-15)
    pub origin: u32,
}

impl MessageHeader {
    /// Header size in bytes (already a multiple of the alignment unit)
    pub const SIZE: usize = 16;

    /// Declared payload length: the full message minus the header
    pub fn payload_len(&self) -> usize {
        (self.len as usize).saturating_sub(Self::SIZE)
    }

    /// Aligned on-wire footprint, i.e. the step to the next message in a
    /// batched buffer
    pub fn aligned_len(&self) -> usize {
        align(self.len as usize)
    }

    /// Whether this message carries a reserved control type
    pub fn is_control(&self) -> bool {
        self.msg_type < MIN_DATA_TYPE
    }

    /// Whether this message is routed to the data handler
    pub fn is_data(&self) -> bool {
        !self.is_control()
    }

    /// Sequence correlation check.
    ///
    /// A zero sequence number on the message marks an asynchronous
    /// notification, and a zero `expected` value opts the caller out of
    /// tracking; either exempts the message from the comparison.
    pub fn seq_ok(&self, expected: u32) -> bool {
        self.seq == 0 || expected == 0 || self.seq == expected
    }

    /// Origin correlation check, with the same zero exemptions as
    /// [`seq_ok`](Self::seq_ok).
    pub fn origin_ok(&self, expected: u32) -> bool {
        self.origin == 0 || expected == 0 || self.origin == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_exactly_16_bytes() {
        assert_eq!(std::mem::size_of::<MessageHeader>(), MessageHeader::SIZE);
        assert_eq!(MessageHeader::SIZE, 16);
    }

    #[test]
    fn payload_len_saturates_on_malformed_declared_length() {
        let hdr = MessageHeader {
            len: 7, // shorter than the header itself
            msg_type: 0,
            flags: 0,
            seq: 0,
            origin: 0,
        };
        assert_eq!(hdr.payload_len(), 0);
    }

    #[test]
    fn sequence_tracking_zero_exemptions() {
        let mut hdr = MessageHeader::new_zeroed();

        // Message seq 0: exempt against any expectation
        assert!(hdr.seq_ok(0));
        assert!(hdr.seq_ok(42));

        // Nonzero message seq: must match unless the expectation is 0
        hdr.seq = 7;
        assert!(hdr.seq_ok(7));
        assert!(hdr.seq_ok(0));
        assert!(!hdr.seq_ok(8));
    }

    #[test]
    fn origin_tracking_zero_exemptions() {
        let mut hdr = MessageHeader::new_zeroed();
        assert!(hdr.origin_ok(1234));

        hdr.origin = 99;
        assert!(hdr.origin_ok(99));
        assert!(hdr.origin_ok(0));
        assert!(!hdr.origin_ok(100));
    }

    #[test]
    fn control_data_split() {
        let mut hdr = MessageHeader::new_zeroed();
        hdr.msg_type = 2;
        assert!(hdr.is_control());
        hdr.msg_type = MIN_DATA_TYPE;
        assert!(hdr.is_data());
    }
}
