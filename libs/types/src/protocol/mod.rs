//! Protocol wire definitions
//!
//! Fundamental layout types shared by the codec and its callers. Protocol
//! behavior (framing, validation, dispatch) lives in `libs/codec`.

pub mod attr;
pub mod constants;
pub mod message;
