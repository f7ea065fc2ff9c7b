//! # Message Builder - Write Side
//!
//! ## Purpose
//!
//! Constructs a framed message directly inside a caller-provided buffer:
//! header, optional subsystem extra header, then a sequence of aligned
//! TLV attributes appended at the tail. Nothing is allocated; the builder
//! is a length cursor plus a shadow copy of the header that is flushed
//! into the buffer on every mutation, so the buffer is valid wire format
//! after each successful call.
//!
//! Nested attributes are a two-phase commit: [`MessageBuilder::nest_start`]
//! reserves a header whose length is unknown, children are appended with
//! the ordinary put operations, and [`MessageBuilder::nest_end`] patches
//! the length from the tail delta once all children exist.

use thiserror::Error;
use types::{align, AttrHeader, MessageHeader, ATTR_NESTED};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// Build errors for in-buffer message construction
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// The caller buffer cannot hold the appended record
    #[error("buffer too small for message")]
    BufferTooSmall,
    /// An attribute would overflow its 16-bit length field
    #[error("attribute payload exceeds the 16-bit length field")]
    PayloadTooLarge,
    /// `nest_end` received a token that does not match this message's
    /// current tail
    #[error("nest token does not match the message being built")]
    NestMismatch,
}

/// Result type for build operations
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Token returned by [`MessageBuilder::nest_start`] and consumed by
/// [`MessageBuilder::nest_end`]
#[derive(Debug, Clone, Copy)]
pub struct NestToken {
    offset: usize,
}

/// In-place builder over a caller-owned buffer
///
/// The declared length field only advances after an append fully
/// succeeds, so a failed put leaves the message unchanged and still
/// well formed.
pub struct MessageBuilder<'a> {
    buf: &'a mut [u8],
    header: MessageHeader,
}

impl<'a> MessageBuilder<'a> {
    /// Zero and write a minimal header at the start of `buf`.
    ///
    /// The declared length starts at the aligned header size; type,
    /// flags, sequence and origin start at zero and are set through the
    /// field setters.
    pub fn put_header(buf: &'a mut [u8]) -> BuildResult<Self> {
        let len = align(MessageHeader::SIZE);
        if buf.len() < len {
            return Err(BuildError::BufferTooSmall);
        }
        buf[..len].fill(0);
        let mut builder = Self {
            buf,
            header: MessageHeader::new_zeroed(),
        };
        builder.header.len = len as u32;
        builder.flush();
        Ok(builder)
    }

    fn flush(&mut self) {
        self.buf[..MessageHeader::SIZE].copy_from_slice(self.header.as_bytes());
    }

    /// Set the message type
    pub fn set_msg_type(&mut self, msg_type: u16) {
        self.header.msg_type = msg_type;
        self.flush();
    }

    /// Set the flag bits
    pub fn set_flags(&mut self, flags: u16) {
        self.header.flags = flags;
        self.flush();
    }

    /// Set the sequence number used for reply correlation
    pub fn set_seq(&mut self, seq: u32) {
        self.header.seq = seq;
        self.flush();
    }

    /// Set the origin identifier
    pub fn set_origin(&mut self, origin: u32) {
        self.header.origin = origin;
        self.flush();
    }

    /// Current total message length, header included
    pub fn len(&self) -> usize {
        self.header.len as usize
    }

    /// Whether anything beyond the bare header has been appended
    pub fn is_empty(&self) -> bool {
        self.len() == MessageHeader::SIZE
    }

    /// Copy of the header as currently written
    pub fn header(&self) -> MessageHeader {
        self.header
    }

    /// Reserve and zero a subsystem-specific extra header of `size`
    /// bytes directly after the message header, returning the region for
    /// the caller to fill.
    ///
    /// Call at most once, before any attribute is appended: the codec
    /// assumes all attributes come after exactly one (possibly empty)
    /// extra header region.
    pub fn put_extra_header(&mut self, size: usize) -> BuildResult<&mut [u8]> {
        let start = self.len();
        let aligned = align(size);
        if self.buf.len() < start + aligned {
            return Err(BuildError::BufferTooSmall);
        }
        self.buf[start..start + aligned].fill(0);
        self.header.len += aligned as u32;
        self.flush();
        Ok(&mut self.buf[start..start + size])
    }

    /// Append one attribute: header written, payload filled by `fill`,
    /// padding zeroed, declared length advanced by the aligned size.
    fn append_attr<F>(&mut self, atype: u16, payload_len: usize, fill: F) -> BuildResult<()>
    where
        F: FnOnce(&mut [u8]),
    {
        let wire_len = AttrHeader::SIZE + payload_len;
        if wire_len > u16::MAX as usize {
            return Err(BuildError::PayloadTooLarge);
        }
        let start = self.len();
        let aligned = align(wire_len);
        if self.buf.len() < start + aligned {
            return Err(BuildError::BufferTooSmall);
        }

        let hdr = AttrHeader {
            len: wire_len as u16,
            atype,
        };
        self.buf[start..start + AttrHeader::SIZE].copy_from_slice(hdr.as_bytes());
        // Zero the padding; the length field stores the unpadded size
        self.buf[start + wire_len..start + aligned].fill(0);
        fill(&mut self.buf[start + AttrHeader::SIZE..start + wire_len]);

        self.header.len += aligned as u32;
        self.flush();
        Ok(())
    }

    /// Append an attribute with an opaque payload
    pub fn put(&mut self, atype: u16, payload: &[u8]) -> BuildResult<()> {
        self.append_attr(atype, payload.len(), |dst| dst.copy_from_slice(payload))
    }

    /// Append an 8-bit unsigned integer attribute
    pub fn put_u8(&mut self, atype: u16, value: u8) -> BuildResult<()> {
        self.put(atype, &[value])
    }

    /// Append a 16-bit unsigned integer attribute
    pub fn put_u16(&mut self, atype: u16, value: u16) -> BuildResult<()> {
        self.put(atype, &value.to_ne_bytes())
    }

    /// Append a 32-bit unsigned integer attribute
    pub fn put_u32(&mut self, atype: u16, value: u32) -> BuildResult<()> {
        self.put(atype, &value.to_ne_bytes())
    }

    /// Append a 64-bit unsigned integer attribute
    pub fn put_u64(&mut self, atype: u16, value: u64) -> BuildResult<()> {
        self.put(atype, &value.to_ne_bytes())
    }

    /// Append a presence-flag attribute with an empty payload
    pub fn put_flag(&mut self, atype: u16) -> BuildResult<()> {
        self.put(atype, &[])
    }

    /// Append a string attribute without a NUL terminator
    pub fn put_str(&mut self, atype: u16, value: &str) -> BuildResult<()> {
        self.put(atype, value.as_bytes())
    }

    /// Append a string attribute including the NUL terminator
    pub fn put_strz(&mut self, atype: u16, value: &str) -> BuildResult<()> {
        self.append_attr(atype, value.len() + 1, |dst| {
            dst[..value.len()].copy_from_slice(value.as_bytes());
            dst[value.len()] = 0;
        })
    }

    /// Open a nested attribute.
    ///
    /// Writes a header with the nested flag set and a provisional zero
    /// length; append children with the ordinary put operations and
    /// close the nest with [`nest_end`](Self::nest_end).
    pub fn nest_start(&mut self, atype: u16) -> BuildResult<NestToken> {
        let start = self.len();
        if self.buf.len() < start + AttrHeader::SIZE {
            return Err(BuildError::BufferTooSmall);
        }
        let hdr = AttrHeader {
            len: 0,
            atype: atype | ATTR_NESTED,
        };
        self.buf[start..start + AttrHeader::SIZE].copy_from_slice(hdr.as_bytes());
        self.header.len += AttrHeader::SIZE as u32;
        self.flush();
        Ok(NestToken { offset: start })
    }

    /// Close a nested attribute, patching its length to `tail - start`
    pub fn nest_end(&mut self, token: NestToken) -> BuildResult<()> {
        let tail = self.len();
        if token.offset + AttrHeader::SIZE > tail || token.offset < MessageHeader::SIZE {
            return Err(BuildError::NestMismatch);
        }
        let nest_len = tail - token.offset;
        if nest_len > u16::MAX as usize {
            return Err(BuildError::PayloadTooLarge);
        }
        let mut hdr = AttrHeader::read_from_prefix(&self.buf[token.offset..])
            .ok_or(BuildError::NestMismatch)?;
        hdr.len = nest_len as u16;
        self.buf[token.offset..token.offset + AttrHeader::SIZE].copy_from_slice(hdr.as_bytes());
        Ok(())
    }

    /// Finish building and return the total number of bytes written,
    /// ready to hand `&buf[..len]` to the transport
    pub fn finish(self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use types::ATTR_TYPE_MASK;

    #[test]
    fn put_header_zeroes_and_declares_header_length() {
        let mut buf = [0xffu8; 64];
        let builder = MessageBuilder::put_header(&mut buf).unwrap();
        assert_eq!(builder.len(), MessageHeader::SIZE);
        drop(builder);
        assert_eq!(&buf[4..16], &[0u8; 12]);
        assert_eq!(&buf[0..4], &16u32.to_ne_bytes());
    }

    #[test]
    fn put_header_requires_a_header_sized_buffer() {
        let mut buf = [0u8; 15];
        assert_eq!(
            MessageBuilder::put_header(&mut buf).err(),
            Some(BuildError::BufferTooSmall)
        );
    }

    #[test]
    fn extra_header_is_zeroed_and_length_aligned() {
        let mut buf = [0xffu8; 64];
        let mut builder = MessageBuilder::put_header(&mut buf).unwrap();
        let extra = builder.put_extra_header(6).unwrap();
        assert_eq!(extra, &[0u8; 6][..]);
        extra[0] = 0x42;
        assert_eq!(builder.len(), 16 + 8); // 6 rounds up to 8
        drop(builder);
        assert_eq!(buf[16], 0x42);
    }

    #[test]
    fn attributes_are_padded_and_length_field_is_unpadded() {
        let mut buf = [0xffu8; 64];
        let mut builder = MessageBuilder::put_header(&mut buf).unwrap();
        builder.put(5, &[0xaa, 0xbb, 0xcc]).unwrap();
        assert_eq!(builder.len(), 16 + 8); // 4 header + 3 payload + 1 pad
        drop(builder);

        assert_eq!(&buf[16..18], &7u16.to_ne_bytes()); // unpadded length
        assert_eq!(&buf[18..20], &5u16.to_ne_bytes());
        assert_eq!(&buf[20..23], &[0xaa, 0xbb, 0xcc]);
        assert_eq!(buf[23], 0); // padding zeroed over the 0xff canvas
    }

    #[test]
    fn failed_put_leaves_the_message_untouched() {
        let mut buf = [0u8; 24];
        let mut builder = MessageBuilder::put_header(&mut buf).unwrap();
        builder.put_u32(1, 7).unwrap();
        let len_before = builder.len();
        assert_eq!(builder.put(2, &[0u8; 16]).err(), Some(BuildError::BufferTooSmall));
        assert_eq!(builder.len(), len_before);

        drop(builder);
        let msg = Message::from_prefix(&buf).unwrap();
        assert_eq!(msg.total_len(), len_before);
    }

    #[test]
    fn oversized_attribute_is_rejected_before_any_write() {
        let big = vec![0u8; u16::MAX as usize];
        let mut buf = vec![0u8; 2 * u16::MAX as usize];
        let mut builder = MessageBuilder::put_header(&mut buf).unwrap();
        assert_eq!(builder.put(1, &big).err(), Some(BuildError::PayloadTooLarge));
    }

    #[test]
    fn strz_appends_the_terminator() {
        let mut buf = [0u8; 64];
        let mut builder = MessageBuilder::put_header(&mut buf).unwrap();
        builder.put_strz(6, "eth0").unwrap();
        drop(builder);

        let msg = Message::from_prefix(&buf).unwrap();
        let attr = msg.attrs(0).next().unwrap();
        assert_eq!(attr.payload_len(), 5);
        assert_eq!(attr.payload(), b"eth0\0");
        assert_eq!(attr.get_str().unwrap(), "eth0");
    }

    #[test]
    fn nest_two_phase_commit_patches_the_length() {
        let mut buf = [0u8; 128];
        let mut builder = MessageBuilder::put_header(&mut buf).unwrap();
        let token = builder.nest_start(1).unwrap();
        builder.put_u32(2, 0x01020304).unwrap();
        builder.put_u8(3, 9).unwrap();
        builder.nest_end(token).unwrap();
        let total = builder.finish();

        let msg = Message::from_prefix(&buf[..total]).unwrap();
        let nest = msg.attrs(0).next().unwrap();
        assert!(nest.is_nested());
        assert_eq!(nest.attr_type() & ATTR_TYPE_MASK, 1);
        // 4 nest header + 8 (u32 attr) + 8 (u8 attr, padded)
        assert_eq!(nest.len(), 4 + 8 + 8);

        let children: Vec<u16> = nest.nested().map(|a| a.attr_type()).collect();
        assert_eq!(children, vec![2, 3]);
    }

    #[test]
    fn empty_nest_has_zero_payload() {
        let mut buf = [0u8; 64];
        let mut builder = MessageBuilder::put_header(&mut buf).unwrap();
        let token = builder.nest_start(4).unwrap();
        builder.nest_end(token).unwrap();
        drop(builder);

        let msg = Message::from_prefix(&buf).unwrap();
        let nest = msg.attrs(0).next().unwrap();
        assert_eq!(nest.payload_len(), 0);
        assert_eq!(nest.nested().count(), 0);
    }

    #[test]
    fn stale_nest_token_is_rejected() {
        let mut buf = [0u8; 64];
        let mut builder = MessageBuilder::put_header(&mut buf).unwrap();
        let bogus = NestToken { offset: 0 };
        assert_eq!(builder.nest_end(bogus).err(), Some(BuildError::NestMismatch));
    }
}
