//! Firmware event envelope.
//!
//! Every buffer the bus delivers to the host is wrapped in a small header
//! naming the event kind and the interface it concerns:
//!
//! ```text
//! w0: [event_id:8][vdev_id:8][reserved:16]
//!
//! event_id 0x01 (HTT indication):
//!   target-to-host message follows w0
//!
//! event_id 0x02 (wake-up host):
//!   w1: [reason:32 signed]
//!   w2: [payload_len:32]
//!   payload...
//! ```

use crate::bitfield::FieldSpec;
use crate::protocol::CodecError;
use crate::wake::{WakeEvent, WakeReason};

const EVENT_ID: FieldSpec = FieldSpec::uint(0, 8);
const VDEV_ID: FieldSpec = FieldSpec::uint(8, 8);

/// Envelope header length for HTT indications.
pub const HTT_HEADER_LEN: usize = 4;

/// Envelope header length for wake events.
pub const WAKE_HEADER_LEN: usize = 12;

/// Kind of firmware event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum EventId {
    HttIndication = 0x01,
    WakeUpHost = 0x02,
}

impl EventId {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(EventId::HttIndication),
            0x02 => Some(EventId::WakeUpHost),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// An unwrapped firmware event, borrowing from the delivered buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirmwareEvent<'a> {
    Htt { vdev_id: u8, message: &'a [u8] },
    Wake(WakeEvent<'a>),
}

fn word(data: &[u8], index: usize) -> Option<u32> {
    let bytes = data.get(index * 4..index * 4 + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Unwrap a delivered buffer.
///
/// A wake payload longer than the buffer is rejected as `TooShort`; the
/// frame length inside a raw-packet payload is a separate matter handled by
/// the dispatcher.
pub fn parse_envelope(data: &[u8]) -> Result<FirmwareEvent<'_>, CodecError> {
    let w0 = word(data, 0).ok_or(CodecError::TooShort {
        expected: HTT_HEADER_LEN,
        got: data.len(),
    })?;
    let vdev_id = VDEV_ID.read_u32(w0) as u8;
    let id = EVENT_ID.read_u32(w0) as u8;

    match EventId::from_byte(id) {
        Some(EventId::HttIndication) => Ok(FirmwareEvent::Htt {
            vdev_id,
            message: &data[HTT_HEADER_LEN..],
        }),
        Some(EventId::WakeUpHost) => {
            let too_short = CodecError::TooShort {
                expected: WAKE_HEADER_LEN,
                got: data.len(),
            };
            let reason = word(data, 1).ok_or(too_short.clone())?;
            let payload_len = word(data, 2).ok_or(too_short)? as usize;
            let payload = data
                .get(WAKE_HEADER_LEN..WAKE_HEADER_LEN.saturating_add(payload_len))
                .ok_or(CodecError::TooShort {
                    expected: WAKE_HEADER_LEN.saturating_add(payload_len),
                    got: data.len(),
                })?;
            Ok(FirmwareEvent::Wake(WakeEvent {
                vdev_id,
                reason: WakeReason(reason as i32),
                payload,
            }))
        }
        None => Err(CodecError::UnknownType(id)),
    }
}

fn header(id: EventId, vdev_id: u8) -> u32 {
    u32::from(id.to_byte()) | (u32::from(vdev_id) << 8)
}

/// Wrap an encoded target-to-host message.
pub fn htt_envelope(vdev_id: u8, message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HTT_HEADER_LEN + message.len());
    out.extend_from_slice(&header(EventId::HttIndication, vdev_id).to_le_bytes());
    out.extend_from_slice(message);
    out
}

/// Wrap a wake notification.
pub fn wake_envelope(vdev_id: u8, reason: WakeReason, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WAKE_HEADER_LEN + payload.len());
    out.extend_from_slice(&header(EventId::WakeUpHost, vdev_id).to_le_bytes());
    out.extend_from_slice(&reason.code().to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wake_envelope_layout() {
        let bytes = wake_envelope(3, WakeReason::UNSPECIFIED, &[0xaa, 0xbb]);
        assert_eq!(
            bytes,
            [0x02, 0x03, 0, 0, 0xff, 0xff, 0xff, 0xff, 2, 0, 0, 0, 0xaa, 0xbb]
        );
        assert_eq!(
            parse_envelope(&bytes).unwrap(),
            FirmwareEvent::Wake(WakeEvent {
                vdev_id: 3,
                reason: WakeReason::UNSPECIFIED,
                payload: &[0xaa, 0xbb],
            })
        );
    }

    #[test]
    fn test_htt_envelope() {
        let bytes = htt_envelope(1, &[0x02, 0, 0, 0]);
        assert_eq!(
            parse_envelope(&bytes).unwrap(),
            FirmwareEvent::Htt {
                vdev_id: 1,
                message: &[0x02, 0, 0, 0],
            }
        );
    }

    #[test]
    fn test_truncated_envelopes() {
        assert_eq!(
            parse_envelope(&[0x02]),
            Err(CodecError::TooShort { expected: 4, got: 1 })
        );
        assert_eq!(
            parse_envelope(&[0x02, 0, 0, 0, 1, 0, 0, 0]),
            Err(CodecError::TooShort { expected: 12, got: 8 })
        );

        let mut bytes = wake_envelope(0, WakeReason::EAP_REQ, &[1, 2, 3]);
        bytes.truncate(13);
        assert_eq!(
            parse_envelope(&bytes),
            Err(CodecError::TooShort { expected: 15, got: 13 })
        );
    }

    #[test]
    fn test_unknown_event_id() {
        assert_eq!(
            parse_envelope(&[0x7f, 0, 0, 0]),
            Err(CodecError::UnknownType(0x7f))
        );
    }

    #[test]
    fn test_huge_payload_length() {
        let mut bytes = wake_envelope(0, WakeReason::EAP_REQ, &[]);
        bytes[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            parse_envelope(&bytes),
            Err(CodecError::TooShort { got: 12, .. })
        ));
    }
}
