//! # Dispatch Loop - Callback Runqueue
//!
//! ## Purpose
//!
//! Consumes a receive buffer holding zero or more framed messages and
//! routes each one: origin and sequence correlation first, then control
//! messages to a per-call handler table and data messages to the
//! caller's data handler. A single pass, no retry, no re-entry: the loop
//! ends when the guard rejects the remainder, a handler says stop, or an
//! error aborts it.
//!
//! The control table is an immutable per-call value with caller
//! overrides merged over the built-in defaults (no-op for no-op and
//! overrun notifications, stop-success for end-of-dump, error decode for
//! error reports). There is no process-wide mutable state.

use crate::error::{CbResult, ProtocolError, Verdict};
use crate::message::{Message, Messages};
use tracing::{debug, trace};
use types::{ControlType, MIN_DATA_TYPE};

/// Boxed message handler
pub type Handler<'h> = Box<dyn FnMut(Message<'_>) -> CbResult + 'h>;

/// Per-call override table for the reserved control types
///
/// Entries left unset fall through to the built-in defaults. All other
/// message types are data and never consult this table.
#[derive(Default)]
pub struct ControlHandlers<'h> {
    noop: Option<Handler<'h>>,
    error: Option<Handler<'h>>,
    done: Option<Handler<'h>>,
    overrun: Option<Handler<'h>>,
}

impl<'h> ControlHandlers<'h> {
    /// Table with no overrides; every control type gets its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Override handling of no-op messages
    pub fn on_noop(mut self, f: impl FnMut(Message<'_>) -> CbResult + 'h) -> Self {
        self.noop = Some(Box::new(f));
        self
    }

    /// Override handling of error report messages
    pub fn on_error(mut self, f: impl FnMut(Message<'_>) -> CbResult + 'h) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    /// Override handling of end-of-dump messages
    pub fn on_done(mut self, f: impl FnMut(Message<'_>) -> CbResult + 'h) -> Self {
        self.done = Some(Box::new(f));
        self
    }

    /// Override handling of overrun notifications
    pub fn on_overrun(mut self, f: impl FnMut(Message<'_>) -> CbResult + 'h) -> Self {
        self.overrun = Some(Box::new(f));
        self
    }
}

/// Decode an error-control message into a runqueue outcome.
///
/// The payload must begin with a signed status value; a message too
/// short to carry it is malformed. Status 0 is the wire representation
/// of a successful acknowledgment and stops the runqueue; any other
/// status aborts it, sign-normalized to a positive value.
fn decode_error_control(msg: &Message<'_>) -> CbResult {
    let payload = msg.payload();
    if payload.len() < 4 {
        return Err(ProtocolError::malformed(
            "error control message",
            "payload too short to carry a status value",
        ));
    }
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&payload[..4]);
    let status = i32::from_ne_bytes(raw);
    if status == 0 {
        trace!(seq = msg.seq(), "acknowledgment received");
        return Ok(Verdict::Stop);
    }
    debug!(status, seq = msg.seq(), "remote reported an error");
    Err(ProtocolError::Remote {
        status: status.saturating_abs(),
    })
}

fn run_control(controls: &mut ControlHandlers<'_>, msg: Message<'_>) -> CbResult {
    let Ok(ctl) = ControlType::try_from(msg.msg_type()) else {
        // Reserved but unassigned control type, likely from a newer
        // peer; skip it rather than wedge the conversation
        trace!(msg_type = msg.msg_type(), "ignoring unassigned control type");
        return Ok(Verdict::Continue);
    };

    let slot = match ctl {
        ControlType::Noop => controls.noop.as_mut(),
        ControlType::Error => controls.error.as_mut(),
        ControlType::Done => controls.done.as_mut(),
        ControlType::Overrun => controls.overrun.as_mut(),
    };
    if let Some(handler) = slot {
        return handler(msg);
    }

    match ctl {
        ControlType::Noop | ControlType::Overrun => Ok(Verdict::Continue),
        ControlType::Done => Ok(Verdict::Stop),
        ControlType::Error => decode_error_control(&msg),
    }
}

/// Run the dispatch loop with an explicit control override table.
///
/// `expected_seq` and `expected_origin` are correlation values recorded
/// when the request was sent; zero on either side of a comparison skips
/// that check. A missing data handler turns data messages into silent
/// no-ops.
pub fn dispatch_with_controls(
    buf: &[u8],
    expected_seq: u32,
    expected_origin: u32,
    mut data: Option<&mut dyn FnMut(Message<'_>) -> CbResult>,
    controls: &mut ControlHandlers<'_>,
) -> CbResult {
    for msg in Messages::new(buf) {
        trace!(
            msg_type = msg.msg_type(),
            seq = msg.seq(),
            len = msg.total_len(),
            "dispatching message"
        );

        if !msg.origin_ok(expected_origin) {
            debug!(expected = expected_origin, got = msg.origin(), "origin mismatch");
            return Err(ProtocolError::OriginMismatch {
                expected: expected_origin,
                got: msg.origin(),
            });
        }
        if !msg.seq_ok(expected_seq) {
            debug!(expected = expected_seq, got = msg.seq(), "sequence mismatch");
            return Err(ProtocolError::SequenceMismatch {
                expected: expected_seq,
                got: msg.seq(),
            });
        }

        let verdict = if msg.msg_type() >= MIN_DATA_TYPE {
            match data.as_mut() {
                Some(handler) => handler(msg)?,
                None => Verdict::Continue,
            }
        } else {
            run_control(controls, msg)?
        };

        if verdict == Verdict::Stop {
            return Ok(Verdict::Stop);
        }
    }
    Ok(Verdict::Continue)
}

/// Run the dispatch loop with the default control handlers
pub fn dispatch<F>(buf: &[u8], expected_seq: u32, expected_origin: u32, mut data: F) -> CbResult
where
    F: FnMut(Message<'_>) -> CbResult,
{
    let mut controls = ControlHandlers::new();
    dispatch_with_controls(buf, expected_seq, expected_origin, Some(&mut data), &mut controls)
}
