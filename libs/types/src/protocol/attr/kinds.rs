//! Attribute data-kind registry
//!
//! Declares the structural shape an attribute payload is validated
//! against. The kind is caller knowledge (from the subsystem's schema),
//! never encoded on the wire; the codec's `validate` operations check an
//! attribute's payload against the kind the caller declares for its type.

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

/// Structural kinds an attribute payload can be validated against
#[repr(u16)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize,
)]
pub enum AttrKind {
    /// No structural constraint
    Unspec = 0,
    /// 8-bit unsigned integer
    U8 = 1,
    /// 16-bit unsigned integer
    U16 = 2,
    /// 32-bit unsigned integer
    U32 = 3,
    /// 64-bit unsigned integer
    U64 = 4,
    /// String; a trailing NUL terminator is not required
    String = 5,
    /// Presence flag; the payload must be empty
    Flag = 6,
    /// Millisecond interval, carried as a 64-bit integer
    Msecs = 7,
    /// The payload is itself a sequence of attributes
    Nested = 8,
    /// NUL-terminated string
    NulString = 9,
    /// Opaque binary data, no structural constraint
    Binary = 10,
}

impl AttrKind {
    /// Natural payload width of fixed-width kinds, `None` for
    /// variable-length ones
    pub fn expected_payload_len(&self) -> Option<usize> {
        match self {
            AttrKind::U8 => Some(1),
            AttrKind::U16 => Some(2),
            AttrKind::U32 => Some(4),
            AttrKind::U64 | AttrKind::Msecs => Some(8),
            AttrKind::Flag => Some(0),
            _ => None,
        }
    }
}
