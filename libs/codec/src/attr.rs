//! # Attribute Codec - TLV Read Side
//!
//! ## Purpose
//!
//! Bounds-checked views, typed getters and structural validation for the
//! length-prefixed attribute records inside a message payload. The same
//! walk handles top-level and nested attributes: a nested attribute's
//! payload is just another attribute region.
//!
//! Two deliberately separate passes:
//! - **structural**: [`Attr::well_formed`] guards iteration and never
//!   raises; a short tail ends the walk silently.
//! - **semantic**: [`Attr::validate`] / [`Attr::type_valid`] are invoked
//!   by the visitor when it wants per-kind checking, and report
//!   distinguishable truncated/malformed/unsupported conditions so the
//!   visitor can choose between skip-and-continue and abort.

use crate::error::{CbResult, ProtocolError, ProtocolResult, Verdict};
use tracing::trace;
use types::{align, AttrHeader, AttrKind};
use zerocopy::FromBytes;

/// Borrowed view of one attribute record
///
/// Covers exactly the declared length (header + payload, unpadded). The
/// 4-byte header is read once at construction.
#[derive(Debug, Clone, Copy)]
pub struct Attr<'a> {
    header: AttrHeader,
    bytes: &'a [u8],
}

impl<'a> Attr<'a> {
    /// Check that `buf` begins with a complete, in-bounds attribute.
    ///
    /// Mirrors the message framer's guard: false when the remainder or
    /// the declared length is smaller than the attribute header, or the
    /// declared length exceeds the remainder. Never raises.
    pub fn well_formed(buf: &[u8]) -> bool {
        match AttrHeader::read_from_prefix(buf) {
            Some(hdr) => {
                let len = hdr.len as usize;
                len >= AttrHeader::SIZE && len <= buf.len()
            }
            None => false,
        }
    }

    /// View of the first attribute in `buf`, if the guard accepts it
    pub fn from_prefix(buf: &'a [u8]) -> Option<Self> {
        let header = AttrHeader::read_from_prefix(buf)?;
        let len = header.len as usize;
        if len < AttrHeader::SIZE || len > buf.len() {
            return None;
        }
        Some(Self {
            header,
            bytes: &buf[..len],
        })
    }

    /// Bare attribute type with the flag bits masked off
    pub fn attr_type(&self) -> u16 {
        self.header.attr_type()
    }

    /// On-wire type field including the flag bits
    pub fn raw_type(&self) -> u16 {
        self.header.atype
    }

    /// Whether the nested flag bit is set
    pub fn is_nested(&self) -> bool {
        self.header.is_nested()
    }

    /// Declared on-wire length, header included
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Declared payload length
    pub fn payload_len(&self) -> usize {
        self.bytes.len() - AttrHeader::SIZE
    }

    /// Payload bytes
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[AttrHeader::SIZE..]
    }

    fn checked_payload(&self, want: usize, context: &'static str) -> ProtocolResult<&'a [u8]> {
        let payload = self.payload();
        if payload.len() < want {
            return Err(ProtocolError::truncated(want, payload.len(), context));
        }
        Ok(payload)
    }

    /// 8-bit unsigned payload value
    pub fn get_u8(&self) -> ProtocolResult<u8> {
        let p = self.checked_payload(1, "u8 attribute")?;
        Ok(p[0])
    }

    /// 16-bit unsigned payload value
    pub fn get_u16(&self) -> ProtocolResult<u16> {
        let p = self.checked_payload(2, "u16 attribute")?;
        let mut raw = [0u8; 2];
        raw.copy_from_slice(&p[..2]);
        Ok(u16::from_ne_bytes(raw))
    }

    /// 32-bit unsigned payload value
    pub fn get_u32(&self) -> ProtocolResult<u32> {
        let p = self.checked_payload(4, "u32 attribute")?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&p[..4]);
        Ok(u32::from_ne_bytes(raw))
    }

    /// 64-bit unsigned payload value.
    ///
    /// Always copied through an intermediate byte array: the buffer is
    /// only guaranteed 4-byte aligned, never 8, so a direct wide load at
    /// the payload address would trap on strict-alignment targets.
    pub fn get_u64(&self) -> ProtocolResult<u64> {
        let p = self.checked_payload(8, "u64 attribute")?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&p[..8]);
        Ok(u64::from_ne_bytes(raw))
    }

    /// String payload value.
    ///
    /// Stops at the first NUL so both terminated and unterminated string
    /// attributes read back as the logical string.
    pub fn get_str(&self) -> ProtocolResult<&'a str> {
        let payload = self.payload();
        let end = payload
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(payload.len());
        std::str::from_utf8(&payload[..end])
            .map_err(|_| ProtocolError::malformed("string attribute", "payload is not valid UTF-8"))
    }

    /// Raw payload bytes, for binary attributes
    pub fn get_bytes(&self) -> &'a [u8] {
        self.payload()
    }

    /// Advisory check that the type is within the caller's known range.
    ///
    /// Failure means the attribute comes from a newer protocol revision;
    /// callers are expected to skip it and keep iterating, not abort.
    pub fn type_valid(&self, max_type: u16) -> ProtocolResult<()> {
        let attr_type = self.attr_type();
        if attr_type > max_type {
            trace!(attr_type, max_type, "attribute type above known range");
            return Err(ProtocolError::UnsupportedType {
                attr_type,
                max_type,
            });
        }
        Ok(())
    }

    /// Validate the payload against a declared kind
    pub fn validate(&self, kind: AttrKind) -> ProtocolResult<()> {
        self.validate_inner(kind, None)
    }

    /// Validate against a declared kind and an exact expected payload
    /// length; a payload exceeding `expected_len` fails even when the
    /// kind alone would accept it
    pub fn validate_exact(&self, kind: AttrKind, expected_len: usize) -> ProtocolResult<()> {
        self.validate_inner(kind, Some(expected_len))
    }

    fn validate_inner(&self, kind: AttrKind, exact: Option<usize>) -> ProtocolResult<()> {
        let plen = self.payload_len();

        if let Some(expected) = exact {
            if plen > expected {
                return Err(ProtocolError::malformed(
                    "attribute payload",
                    format!("payload of {plen} bytes exceeds expected length {expected}"),
                ));
            }
        }

        if let Some(width) = kind.expected_payload_len() {
            if plen < width {
                return Err(ProtocolError::truncated(width, plen, "fixed-width attribute"));
            }
            if plen > width {
                return Err(ProtocolError::malformed(
                    "fixed-width attribute",
                    format!("payload of {plen} bytes for a {width}-byte kind"),
                ));
            }
            return Ok(());
        }

        match kind {
            AttrKind::NulString => {
                if plen == 0 {
                    return Err(ProtocolError::truncated(1, 0, "NUL-terminated string"));
                }
                if self.payload()[plen - 1] != 0 {
                    return Err(ProtocolError::malformed(
                        "NUL-terminated string",
                        "missing NUL terminator",
                    ));
                }
            }
            AttrKind::String => {
                if plen == 0 {
                    return Err(ProtocolError::truncated(1, 0, "string attribute"));
                }
            }
            AttrKind::Nested => {
                // An empty nest is valid; a non-empty one must hold at
                // least one inner attribute header
                if plen != 0 && plen < AttrHeader::SIZE {
                    return Err(ProtocolError::truncated(
                        AttrHeader::SIZE,
                        plen,
                        "nested attribute",
                    ));
                }
            }
            AttrKind::Unspec | AttrKind::Binary => {}
            // Fixed-width kinds were fully handled above
            _ => {}
        }
        Ok(())
    }

    /// Iterate the attributes inside this attribute's payload
    pub fn nested(&self) -> AttrIter<'a> {
        AttrIter::new(self.payload())
    }

    /// Visit each well-formed attribute inside this nest, in order
    pub fn parse_nested<F>(&self, visit: F) -> CbResult
    where
        F: FnMut(Attr<'a>) -> CbResult,
    {
        parse_attrs(self.payload(), visit)
    }
}

/// Iterator over a region of concatenated attributes
///
/// Stops at the first position where [`Attr::well_formed`] rejects the
/// remainder; a trailing truncated record is "no more attributes", not an
/// error. Each step consumes at least one aligned header, so the walk
/// terminates on any input.
#[derive(Debug, Clone)]
pub struct AttrIter<'a> {
    buf: &'a [u8],
}

impl<'a> AttrIter<'a> {
    /// Iterate the attributes in `region`
    pub fn new(region: &'a [u8]) -> Self {
        Self { buf: region }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> &'a [u8] {
        self.buf
    }
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = Attr<'a>;

    fn next(&mut self) -> Option<Attr<'a>> {
        let attr = Attr::from_prefix(self.buf)?;
        let step = align(attr.len()).min(self.buf.len());
        self.buf = &self.buf[step..];
        Some(attr)
    }
}

/// Drive `visit` over every syntactically well-formed attribute in
/// `region`, in order.
///
/// A [`Verdict::Stop`] or error verdict from `visit` ends the walk
/// immediately and is propagated to the caller.
pub fn parse_attrs<'a, F>(region: &'a [u8], mut visit: F) -> CbResult
where
    F: FnMut(Attr<'a>) -> CbResult,
{
    for attr in AttrIter::new(region) {
        if visit(attr)? == Verdict::Stop {
            return Ok(Verdict::Stop);
        }
    }
    Ok(Verdict::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{ATTR_NESTED, ATTR_NET_BYTEORDER};
    use zerocopy::AsBytes;

    fn raw_attr(atype: u16, payload: &[u8]) -> Vec<u8> {
        let hdr = AttrHeader {
            len: (AttrHeader::SIZE + payload.len()) as u16,
            atype,
        };
        let mut buf = hdr.as_bytes().to_vec();
        buf.extend_from_slice(payload);
        buf.resize(align(buf.len()), 0);
        buf
    }

    #[test]
    fn guard_rejects_short_and_overlong_declarations() {
        assert!(!Attr::well_formed(&[]));
        assert!(!Attr::well_formed(&[0u8; 3]));

        // Declared length below the header size
        let mut buf = raw_attr(1, &[0xaa]);
        buf[0..2].copy_from_slice(&2u16.to_ne_bytes());
        assert!(!Attr::well_formed(&buf));

        // Declared length beyond the remaining bytes
        let buf = raw_attr(1, &[0u8; 12]);
        assert!(!Attr::well_formed(&buf[..8]));
    }

    #[test]
    fn typed_getters_round_values_through_byte_copies() {
        let attr_buf = raw_attr(3, &0xdead_beefu32.to_ne_bytes());
        let attr = Attr::from_prefix(&attr_buf).unwrap();
        assert_eq!(attr.get_u32().unwrap(), 0xdead_beef);
        // Width checks catch misuse
        assert!(matches!(
            attr.get_u64(),
            Err(ProtocolError::Truncated { need: 8, got: 4, .. })
        ));

        let attr_buf = raw_attr(4, &u64::MAX.to_ne_bytes());
        let attr = Attr::from_prefix(&attr_buf).unwrap();
        assert_eq!(attr.get_u64().unwrap(), u64::MAX);
    }

    #[test]
    fn strings_read_back_with_and_without_terminator() {
        let attr_buf = raw_attr(6, b"eth0");
        let attr = Attr::from_prefix(&attr_buf).unwrap();
        assert_eq!(attr.get_str().unwrap(), "eth0");

        let attr_buf = raw_attr(6, b"eth0\0");
        let attr = Attr::from_prefix(&attr_buf).unwrap();
        assert_eq!(attr.get_str().unwrap(), "eth0");
    }

    #[test]
    fn flag_bits_do_not_leak_into_the_type() {
        let attr_buf = raw_attr(9 | ATTR_NESTED | ATTR_NET_BYTEORDER, &[]);
        let attr = Attr::from_prefix(&attr_buf).unwrap();
        assert_eq!(attr.attr_type(), 9);
        assert!(attr.is_nested());
    }

    #[test]
    fn validate_fixed_width_kinds() {
        let attr_buf = raw_attr(1, &42u32.to_ne_bytes());
        let attr = Attr::from_prefix(&attr_buf).unwrap();
        assert!(attr.validate(AttrKind::U32).is_ok());
        assert!(matches!(
            attr.validate(AttrKind::U64),
            Err(ProtocolError::Truncated { .. })
        ));
        assert!(matches!(
            attr.validate(AttrKind::U16),
            Err(ProtocolError::Malformed { .. })
        ));
        assert!(attr.validate(AttrKind::Msecs).is_err());
    }

    #[test]
    fn validate_flag_requires_empty_payload() {
        let empty = raw_attr(2, &[]);
        let attr = Attr::from_prefix(&empty).unwrap();
        assert!(attr.validate(AttrKind::Flag).is_ok());

        let full = raw_attr(2, &[1]);
        let attr = Attr::from_prefix(&full).unwrap();
        assert!(attr.validate(AttrKind::Flag).is_err());
    }

    #[test]
    fn validate_string_kinds() {
        let terminated = raw_attr(6, b"lo\0");
        let attr = Attr::from_prefix(&terminated).unwrap();
        assert!(attr.validate(AttrKind::NulString).is_ok());
        assert!(attr.validate(AttrKind::String).is_ok());

        let unterminated = raw_attr(6, b"lo");
        let attr = Attr::from_prefix(&unterminated).unwrap();
        assert!(matches!(
            attr.validate(AttrKind::NulString),
            Err(ProtocolError::Malformed { .. })
        ));
        assert!(attr.validate(AttrKind::String).is_ok());

        let empty = raw_attr(6, &[]);
        let attr = Attr::from_prefix(&empty).unwrap();
        assert!(matches!(
            attr.validate(AttrKind::NulString),
            Err(ProtocolError::Truncated { .. })
        ));
        assert!(attr.validate(AttrKind::String).is_err());
    }

    #[test]
    fn validate_nested_accepts_empty_and_populated_nests() {
        let empty = raw_attr(8 | ATTR_NESTED, &[]);
        let attr = Attr::from_prefix(&empty).unwrap();
        assert!(attr.validate(AttrKind::Nested).is_ok());

        let child = raw_attr(1, &[7]);
        let populated = raw_attr(8 | ATTR_NESTED, &child);
        let attr = Attr::from_prefix(&populated).unwrap();
        assert!(attr.validate(AttrKind::Nested).is_ok());
    }

    #[test]
    fn validate_exact_rejects_oversized_payloads() {
        let attr_buf = raw_attr(10, &[0u8; 6]);
        let attr = Attr::from_prefix(&attr_buf).unwrap();
        assert!(attr.validate_exact(AttrKind::Binary, 6).is_ok());
        assert!(attr.validate_exact(AttrKind::Binary, 8).is_ok());
        assert!(matches!(
            attr.validate_exact(AttrKind::Binary, 4),
            Err(ProtocolError::Malformed { .. })
        ));
    }

    #[test]
    fn unsupported_type_is_advisory_and_does_not_break_iteration() {
        let mut region = raw_attr(9, &[0u8; 3]);
        region.extend_from_slice(&raw_attr(2, &[0xaa]));

        let mut seen = Vec::new();
        for attr in AttrIter::new(&region) {
            if attr.type_valid(5).is_err() {
                // skip unknown attribute, keep walking
                continue;
            }
            seen.push(attr.attr_type());
        }
        assert_eq!(seen, vec![2]);
    }

    #[test]
    fn parse_attrs_visits_in_order_and_propagates_stop() {
        let mut region = raw_attr(1, &[1]);
        region.extend_from_slice(&raw_attr(2, &[2]));
        region.extend_from_slice(&raw_attr(3, &[3]));

        let mut seen = Vec::new();
        let verdict = parse_attrs(&region, |attr| {
            seen.push(attr.attr_type());
            if attr.attr_type() == 2 {
                Ok(Verdict::Stop)
            } else {
                Ok(Verdict::Continue)
            }
        })
        .unwrap();
        assert_eq!(verdict, Verdict::Stop);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn parse_attrs_propagates_visitor_errors() {
        let region = raw_attr(1, &[1]);
        let result = parse_attrs(&region, |_| Err(ProtocolError::handler("boom")));
        assert_eq!(result, Err(ProtocolError::handler("boom")));
    }

    #[test]
    fn truncated_tail_ends_the_walk_silently() {
        let mut region = raw_attr(1, &[0u8; 4]);
        let partial = raw_attr(2, &[0u8; 8]);
        region.extend_from_slice(&partial[..5]);

        let types: Vec<u16> = AttrIter::new(&region).map(|a| a.attr_type()).collect();
        assert_eq!(types, vec![1]);
    }
}
