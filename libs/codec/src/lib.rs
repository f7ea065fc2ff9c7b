//! # Protocol Codec - Framing, Attributes, Dispatch
//!
//! ## Purpose
//!
//! This crate contains the "Rules" layer of the protocol stack:
//! - Message framing over caller-owned buffers (read and write side)
//! - TLV attribute encoding, decoding, and validation, with nesting
//! - The callback dispatch loop with correlation and control routing
//! - Protocol error taxonomy shared by every layer
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → application callbacks
//!     ↑           ↓              ↓
//! Wire Layouts  Framing      Domain Logic
//! Constants     Validation   Handlers
//! Registries    Dispatch
//! ```
//!
//! ## What This Crate Contains
//! - [`Message`] / [`Messages`]: bounds-checked views over framed input
//! - [`MessageBuilder`]: in-place message construction with attributes
//! - [`Attr`] / [`AttrIter`] / [`parse_attrs`]: attribute walking
//! - [`dispatch()`] / [`dispatch_with_controls`]: the receive runqueue
//! - [`ProtocolError`]: the single error taxonomy for the receive path
//!
//! ## What This Crate Does NOT Contain
//! - Socket management or transport (callers own their I/O)
//! - Raw wire struct definitions (those live in libs/types)
//! - Subsystem-specific attribute schemas
//!
//! ## Safety Profile
//!
//! No getter or iterator in this crate can read outside the caller's
//! buffer: every view is admitted through a single structural guard, and
//! iteration steps are clamped to the bytes that actually remain. Hostile
//! or truncated input degrades to an early stop or an explicit error,
//! never to a panic or an out-of-bounds read.

pub mod attr;
pub mod builder;
pub mod dispatch;
pub mod dump;
pub mod error;
pub mod message;

pub use attr::{parse_attrs, Attr, AttrIter};
pub use builder::{BuildError, BuildResult, MessageBuilder, NestToken};
pub use dispatch::{dispatch, dispatch_with_controls, ControlHandlers, Handler};
pub use dump::MessageDump;
pub use error::{CbResult, ProtocolError, ProtocolResult, Verdict};
pub use message::{Message, Messages};

// Re-export the wire-layer types callers need alongside the codec
pub use types::{
    align, AttrHeader, AttrKind, ControlType, MessageHeader, ALIGNTO, ATTR_NESTED,
    ATTR_NET_BYTEORDER, ATTR_TYPE_MASK, DEFAULT_BUFFER_SIZE, MIN_DATA_TYPE,
};
