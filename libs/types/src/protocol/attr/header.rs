//! Attribute header layout
//!
//! ```text
//! |<-- 2 bytes -->|<-- 2 bytes -->|<--- variable --->|
//! +---------------+---------------+------------------+
//! |    length     |     type      |      value       |
//! +---------------+---------------+------------------+
//! |<---------- header ----------->|<---- payload --->|
//! ```
//!
//! The length includes the header but not the padding that aligns the
//! *next* attribute. The top two bits of the type field are flag bits and
//! must be masked off before interpreting the type number.

use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// Flag bit: the attribute payload is itself a sequence of attributes
pub const ATTR_NESTED: u16 = 1 << 15;

/// Flag bit: the payload is stored in network byte order
pub const ATTR_NET_BYTEORDER: u16 = 1 << 14;

/// Mask selecting the bare attribute type number
pub const ATTR_TYPE_MASK: u16 = !(ATTR_NESTED | ATTR_NET_BYTEORDER);

/// Attribute header (4 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct AttrHeader {
    /// Attribute length including this header, excluding trailing padding
    pub len: u16,
    /// Attribute type with the flag bits folded in
    pub atype: u16,
}

impl AttrHeader {
    /// Header size in bytes (already a multiple of the alignment unit)
    pub const SIZE: usize = 4;

    /// Bare attribute type with the flag bits masked off
    pub fn attr_type(&self) -> u16 {
        self.atype & ATTR_TYPE_MASK
    }

    /// Whether the nested flag bit is set
    pub fn is_nested(&self) -> bool {
        self.atype & ATTR_NESTED != 0
    }

    /// Declared payload length: the attribute length minus the header
    pub fn payload_len(&self) -> usize {
        (self.len as usize).saturating_sub(Self::SIZE)
    }
}
