//! Attribute (TLV) wire structures

pub mod header;
pub mod kinds;

pub use header::{AttrHeader, ATTR_NESTED, ATTR_NET_BYTEORDER, ATTR_TYPE_MASK};
pub use kinds::AttrKind;
