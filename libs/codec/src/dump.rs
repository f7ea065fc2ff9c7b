//! Human-readable hex dump of a framed message
//!
//! Rendering is a [`std::fmt::Display`] adapter so it composes with
//! `format!`, logging macros, and test assertions without allocating
//! until the caller asks for a string.

use crate::message::Message;
use std::fmt;
use types::MessageHeader;

/// Display adapter that renders a message as an annotated hex dump
///
/// The header fields are printed by name, then the payload as four-byte
/// rows with offsets, hex bytes, and an ASCII gutter. Intended for logs
/// and debugging sessions, not for machine consumption.
pub struct MessageDump<'a> {
    msg: Message<'a>,
}

impl<'a> MessageDump<'a> {
    pub fn new(msg: Message<'a>) -> Self {
        Self { msg }
    }
}

impl fmt::Display for MessageDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hdr = self.msg.header();
        writeln!(f, "message: len={} bytes", self.msg.total_len())?;
        writeln!(
            f,
            "  type={:#06x} flags={:#06x} seq={} origin={}",
            hdr.msg_type, hdr.flags, hdr.seq, hdr.origin
        )?;

        for (row, chunk) in self.msg.payload().chunks(4).enumerate() {
            write!(f, "  ({:04}) ", MessageHeader::SIZE + row * 4)?;
            for i in 0..4 {
                match chunk.get(i) {
                    Some(b) => write!(f, "{b:02x} ")?,
                    None => write!(f, "   ")?,
                }
            }
            write!(f, "| ")?;
            for &b in chunk {
                let c = if b.is_ascii_graphic() { b as char } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
