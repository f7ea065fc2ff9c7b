//! # Wire-Format Types - nlwire Protocol Data Structures
//!
//! ## Purpose
//!
//! Pure data definitions for the nlwire binary protocol: the fixed 16-byte
//! message header, the 4-byte attribute (TLV) header, the alignment
//! arithmetic every record computation goes through, and the numeric
//! registries for control message types and attribute data kinds.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → libs/codec → caller transport
//!     ↑             ↓             ↓
//! Wire Layout   Framing/TLV    Datagram
//! Structures    Validation     Buffers
//! ```
//!
//! This crate contains no protocol logic, no I/O and no allocation. All
//! structures are `#[repr(C)]` with `zerocopy` derives so the codec can
//! read and write them directly inside caller-owned buffers.

pub mod protocol;

// Re-export commonly used protocol types
pub use protocol::attr::{
    AttrHeader, AttrKind, ATTR_NESTED, ATTR_NET_BYTEORDER, ATTR_TYPE_MASK,
};
pub use protocol::constants::{
    align, ControlType, ALIGNTO, DEFAULT_BUFFER_SIZE, MIN_DATA_TYPE,
};
pub use protocol::message::MessageHeader;
