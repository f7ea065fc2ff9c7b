//! # Message Framer - Read Side
//!
//! ## Purpose
//!
//! Zero-copy views over framed messages in caller-owned receive buffers.
//! A buffer may hold several concatenated messages, a truncated tail, or
//! arbitrary garbage; [`Message::well_formed`] is the single guard that
//! decides whether the next bytes may be interpreted as a message, and
//! [`Messages`] drives iteration strictly through that guard so no getter
//! can ever read past the buffer.
//!
//! A truncated or malformed tail is an expected, silently-stoppable
//! condition during iteration, not an error: the guard returns `false`
//! and the walk ends. Explicit error reporting only happens in the
//! validation and dispatch layers.

use crate::attr::{parse_attrs, Attr, AttrIter};
use crate::error::CbResult;
use types::{align, MessageHeader};
use zerocopy::FromBytes;

/// Borrowed view of one framed message
///
/// The view covers exactly the declared length: header plus payload,
/// without the padding that aligns the next message. It is an index into
/// the caller's buffer; nothing is copied except the 16-byte header,
/// which is read once at construction so field access never re-validates.
#[derive(Debug, Clone, Copy)]
pub struct Message<'a> {
    header: MessageHeader,
    bytes: &'a [u8],
}

impl<'a> Message<'a> {
    /// Check that `buf` begins with a complete, in-bounds message.
    ///
    /// Returns `false` when the remainder is shorter than a header, the
    /// declared length is shorter than a header, or the declared length
    /// exceeds the remainder. Never raises: this is the loop guard for
    /// iteration over possibly-truncated input.
    pub fn well_formed(buf: &[u8]) -> bool {
        match MessageHeader::read_from_prefix(buf) {
            Some(hdr) => {
                let len = hdr.len as usize;
                len >= MessageHeader::SIZE && len <= buf.len()
            }
            None => false,
        }
    }

    /// View of the first message in `buf`, if the guard accepts it
    pub fn from_prefix(buf: &'a [u8]) -> Option<Self> {
        let header = MessageHeader::read_from_prefix(buf)?;
        let len = header.len as usize;
        if len < MessageHeader::SIZE || len > buf.len() {
            return None;
        }
        Some(Self {
            header,
            bytes: &buf[..len],
        })
    }

    /// Copy of the message header
    pub fn header(&self) -> MessageHeader {
        self.header
    }

    /// Message type
    pub fn msg_type(&self) -> u16 {
        self.header.msg_type
    }

    /// Flag bits
    pub fn flags(&self) -> u16 {
        self.header.flags
    }

    /// Sequence number
    pub fn seq(&self) -> u32 {
        self.header.seq
    }

    /// Origin identifier
    pub fn origin(&self) -> u32 {
        self.header.origin
    }

    /// Declared total length, header included
    pub fn total_len(&self) -> usize {
        self.bytes.len()
    }

    /// The whole message as raw bytes (header + payload, unpadded)
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Payload region: everything after the header
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[MessageHeader::SIZE..]
    }

    /// Declared payload length
    pub fn payload_len(&self) -> usize {
        self.bytes.len() - MessageHeader::SIZE
    }

    /// Payload region starting at an aligned `offset`, typically the
    /// size of a subsystem extra header.
    ///
    /// An offset at or past the end of the payload yields an empty
    /// slice rather than a panic.
    pub fn payload_at(&self, offset: usize) -> &'a [u8] {
        let start = (MessageHeader::SIZE + align(offset)).min(self.bytes.len());
        &self.bytes[start..]
    }

    /// Sequence correlation check with zero exemptions on either side
    pub fn seq_ok(&self, expected: u32) -> bool {
        self.header.seq_ok(expected)
    }

    /// Origin correlation check with zero exemptions on either side
    pub fn origin_ok(&self, expected: u32) -> bool {
        self.header.origin_ok(expected)
    }

    /// Iterate the attributes in the payload, skipping `offset` bytes of
    /// extra header first
    pub fn attrs(&self, offset: usize) -> AttrIter<'a> {
        AttrIter::new(self.payload_at(offset))
    }

    /// Visit each well-formed attribute in order, starting `offset`
    /// bytes into the payload.
    ///
    /// Structural well-formedness is checked here; semantic validation
    /// (`validate`, `type_valid`) is the visitor's decision. A stop or
    /// error verdict from `visit` ends the walk and is propagated.
    pub fn parse<F>(&self, offset: usize, visit: F) -> CbResult
    where
        F: FnMut(Attr<'a>) -> CbResult,
    {
        parse_attrs(self.payload_at(offset), visit)
    }
}

/// Iterator over a buffer of zero or more concatenated messages
///
/// Stops at the first position where [`Message::well_formed`] rejects
/// the remainder. Each step consumes at least one aligned header, so the
/// walk terminates within `buf.len() / 16 + 1` steps on any input.
#[derive(Debug, Clone)]
pub struct Messages<'a> {
    buf: &'a [u8],
}

impl<'a> Messages<'a> {
    /// Iterate the messages in `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed; after the iterator ends this is the
    /// truncated or empty tail
    pub fn remaining(&self) -> &'a [u8] {
        self.buf
    }
}

impl<'a> Iterator for Messages<'a> {
    type Item = Message<'a>;

    fn next(&mut self) -> Option<Message<'a>> {
        let msg = Message::from_prefix(self.buf)?;
        // The aligned length may overhang the buffer by up to 3 pad bytes
        let step = align(msg.total_len()).min(self.buf.len());
        self.buf = &self.buf[step..];
        Some(msg)
    }
}
