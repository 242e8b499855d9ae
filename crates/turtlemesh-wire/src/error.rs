use thiserror::Error;

/// A frame that must be dropped silently at the decoder.
///
/// Callers that need the "indistinguishable from loss" behavior should
/// log at `trace`/`debug` and otherwise treat this the same as a
/// timeout — never propagate it as a fatal error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("datagram too short to contain a header ({len} bytes)")]
    TooShort { len: usize },
    #[error("unsupported protocol version {found}, expected {}", crate::PROTOCOL_VERSION)]
    WrongVersion { found: u8 },
    #[error("unknown message type nibble {0:#x}")]
    UnknownType(u8),
    #[error("declared payload length {declared} does not match datagram size {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("checksum mismatch: computed {computed:#x}, frame claims {claimed:#x}")]
    BadChecksum { computed: u8, claimed: u8 },
    #[error("payload malformed for this message type: {0}")]
    MalformedPayload(&'static str),
}
