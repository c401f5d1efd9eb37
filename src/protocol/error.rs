//! Codec error types.

use thiserror::Error;

/// Errors decoding a message received from (or destined to) firmware.
///
/// Every variant rejects a single message; none is fatal to the session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("message too short: expected at least {expected}, got {got}")]
    TooShort { expected: usize, got: usize },

    #[error("unknown message type: 0x{0:02x}")]
    UnknownType(u8),

    #[error("truncated records: {count} x {record_len} bytes declared, {available} available")]
    TruncatedRecords {
        count: usize,
        record_len: usize,
        available: usize,
    },

    #[error("malformed option TLV at offset {offset}")]
    MalformedTlv { offset: usize },
}
