//! Binary wire format for the TurtleMesh coordinator/worker protocol.
//!
//! Every frame is a 4-byte header, a per-type payload, and a trailing
//! 1-byte checksum. This module is a closed enum (one variant per
//! message type) so callers match exhaustively instead of branching on
//! a raw type byte.

mod checksum;
mod error;
mod frame;

pub use checksum::checksum;
pub use error::WireError;
pub use frame::{Frame, MessageType, PROTOCOL_VERSION};
