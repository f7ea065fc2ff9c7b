//! Protocol constants and numeric registries
//!
//! These are fundamental values that both the codec and its callers must
//! agree on. They stay in the types crate to avoid circular dependencies;
//! framing and validation logic remains in codec.

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

/// Alignment boundary for every record in a message buffer
pub const ALIGNTO: usize = 4;

/// Round `len` up to the next [`ALIGNTO`] boundary.
///
/// All offset arithmetic in the workspace goes through this function;
/// padding is never computed ad hoc.
pub const fn align(len: usize) -> usize {
    (len + ALIGNTO - 1) & !(ALIGNTO - 1)
}

/// Lowest message type that is routed to the data handler.
///
/// Types below this threshold are reserved for control messages; most of
/// them are unassigned and must be skipped when received from a newer
/// peer.
pub const MIN_DATA_TYPE: u16 = 0x10;

/// Recommended receive buffer size for the datagram transport
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Reserved control message types
///
/// Control messages carry meta-information about the conversation itself
/// rather than application data. The dispatch loop routes them to
/// built-in handlers unless the caller overrides a specific entry.
#[repr(u16)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize,
)]
pub enum ControlType {
    /// No operation, silently ignored
    Noop = 1,
    /// Error report; the payload begins with a signed status value
    Error = 2,
    /// End-of-dump marker terminating a multi-message reply
    Done = 3,
    /// Receive buffer overrun notification
    Overrun = 4,
}
