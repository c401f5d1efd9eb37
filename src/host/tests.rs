use super::*;
use crate::negotiate::TxCompletionMode;
use crate::protocol::h2t::TxFrm;
use crate::protocol::t2h::{PeerMap, VersionConf};
use crate::protocol::{
    AddressWidth, BusAddr, H2tMsgType, Message, OptionTlv, ProtocolVersion, PROTOCOL_VERSION,
};
use crate::wake::{EventBody, PiggybackEvent, RoamEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Records every buffer sent.
#[derive(Default)]
struct MockTransport {
    sent: Mutex<Vec<Vec<u8>>>,
}

impl MockTransport {
    fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }
}

struct ClosedTransport;

impl Transport for ClosedTransport {
    fn send(&self, _bytes: &[u8]) -> Result<(), TransportError> {
        Err(TransportError::Closed)
    }
}

fn wide_caps() -> Capabilities {
    Capabilities {
        address_width: AddressWidth::Addr64,
        tx_completion: TxCompletionMode::BulkCredit,
        max_tx_queue_groups: 8,
        tx_msdu_desc_ext: true,
    }
}

fn session(local: Capabilities) -> HostSession<MockTransport> {
    HostSession::with_parts(local, DispatchConfig::default(), MockTransport::default())
}

fn version_conf(options: Vec<OptionTlv>) -> Vec<u8> {
    let conf = VersionConf {
        version: PROTOCOL_VERSION,
        options,
    };
    htt_envelope(0, &conf.encode(AddressWidth::Addr32).unwrap())
}

// ===== Handshake =====

#[test]
fn test_handshake_sends_version_req() {
    let mut s = session(wide_caps());
    s.start_handshake().unwrap();

    let sent = s.transport().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0][0], H2tMsgType::VersionReq.to_byte());
    let req = VersionReq::decode(&sent[0], AddressWidth::Addr32).unwrap();
    assert_eq!(Capabilities::from_tlvs(&req.options), wide_caps());
    assert_eq!(s.handshake_state(), NegotiationState::AwaitingPeerTlvs);
}

#[test]
fn test_handshake_completes_on_version_conf() {
    let mut s = session(wide_caps());
    s.start_handshake().unwrap();

    let conf = version_conf(wide_caps().to_tlvs());
    let outcome = s.on_event(&conf).unwrap();

    let EventOutcome::Negotiated(caps) = outcome else {
        panic!("expected negotiation, got {:?}", outcome);
    };
    assert_eq!(caps.address_width, AddressWidth::Addr64);
    assert_eq!(caps.tx_completion, TxCompletionMode::BulkCredit);
    assert!(s.is_negotiated());
    assert_eq!(s.caps(), caps);
    assert_eq!(s.session_caps().address_width(), AddressWidth::Addr64);
}

#[test]
fn test_silent_firmware_keeps_defaults() {
    let mut s = session(wide_caps());
    s.start_handshake().unwrap();
    s.on_event(&version_conf(Vec::new())).unwrap();

    let caps = s.caps();
    assert_eq!(caps.address_width, AddressWidth::Addr32);
    assert_eq!(caps.tx_completion, TxCompletionMode::PerFrame);
    assert_eq!(caps.max_tx_queue_groups, 0);
}

#[test]
fn test_version_conf_before_request() {
    let mut s = session(wide_caps());
    let err = s.on_event(&version_conf(Vec::new())).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Negotiation(NegotiationError::UnexpectedState(NegotiationState::Idle))
    ));
    assert!(!s.is_negotiated());
}

#[test]
fn test_second_version_conf_rejected() {
    let mut s = session(wide_caps());
    s.start_handshake().unwrap();
    s.on_event(&version_conf(Vec::new())).unwrap();
    let err = s.on_event(&version_conf(wide_caps().to_tlvs())).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Negotiation(NegotiationError::AlreadyNegotiated)
    ));
    assert_eq!(s.caps().address_width, AddressWidth::Addr32);
}

#[test]
fn test_version_mismatch() {
    let mut s = session(Capabilities::default());
    s.start_handshake().unwrap();
    let conf = VersionConf {
        version: ProtocolVersion::new(PROTOCOL_VERSION.major + 1, 0),
        options: Vec::new(),
    };
    let bytes = htt_envelope(0, &conf.encode(AddressWidth::Addr32).unwrap());
    assert!(matches!(
        s.on_event(&bytes),
        Err(SessionError::Negotiation(NegotiationError::VersionMismatch { .. }))
    ));
    assert!(!s.is_negotiated());
}

#[test]
fn test_closed_transport() {
    let mut s = HostSession::with_parts(
        Capabilities::default(),
        DispatchConfig::default(),
        ClosedTransport,
    );
    assert!(matches!(
        s.start_handshake(),
        Err(SessionError::Transport(TransportError::Closed))
    ));
}

// ===== Messages =====

#[test]
fn test_send_message_uses_negotiated_width() {
    let mut s = session(wide_caps());
    s.start_handshake().unwrap();
    s.on_event(&version_conf(wide_caps().to_tlvs())).unwrap();

    let frm = TxFrm {
        frame_len: 1500,
        msdu_id: 9,
        frag_desc_paddr: BusAddr::new(0x2_0000_1000),
        ..Default::default()
    };
    s.send_message(&H2tMessage::from(frm.clone())).unwrap();

    let sent = s.transport().sent();
    let bytes = sent.last().unwrap();
    assert_eq!(TxFrm::decode(bytes, AddressWidth::Addr64).unwrap(), frm);
}

#[test]
fn test_send_message_overflow_before_negotiation() {
    let s = session(wide_caps());
    let frm = TxFrm {
        frag_desc_paddr: BusAddr::new(0x2_0000_1000),
        ..Default::default()
    };
    assert!(matches!(
        s.send_message(&H2tMessage::from(frm)),
        Err(SessionError::Encode(_))
    ));
    assert!(s.transport().sent().is_empty());
}

#[test]
fn test_indication_decoded() {
    let mut s = session(Capabilities::default());
    let map = PeerMap {
        vdev_id: 1,
        peer_id: 42,
        mac: [0x02, 0x11, 0x22, 0x33, 0x44, 0x55],
        hw_peer_id: 7,
    };
    let bytes = htt_envelope(1, &map.encode(AddressWidth::Addr32).unwrap());
    assert_eq!(
        s.on_event(&bytes).unwrap(),
        EventOutcome::Indication {
            vdev_id: 1,
            message: T2hMessage::from(map),
        }
    );
}

#[test]
fn test_bad_envelope() {
    let mut s = session(Capabilities::default());
    assert!(matches!(
        s.on_event(&[0x09, 0, 0, 0]),
        Err(SessionError::Codec(CodecError::UnknownType(0x09)))
    ));
}

// ===== Wake Events =====

#[test]
fn test_wake_event_dispatched() {
    let mut s = session(Capabilities::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    s.register_reason_handler(
        WakeReason::LOW_RSSI,
        Box::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }),
    );

    let roam = RoamEvent {
        vdev_id: 2,
        roam_reason: 1,
        rssi: -75,
    };
    let payload = roam.encode(AddressWidth::Addr32).unwrap();
    let bytes = wake_envelope(2, WakeReason::LOW_RSSI, &payload);

    let EventOutcome::Wake(decoded) = s.on_event(&bytes).unwrap() else {
        panic!("expected wake event");
    };
    assert_eq!(decoded.vdev_id, 2);
    assert_eq!(
        decoded.body,
        EventBody::Piggyback(Some(PiggybackEvent::RoamEvent(roam)))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(s.get_wake_stats(2).reason_count(WakeReason::LOW_RSSI), 1);
}

#[test]
fn test_wake_event_for_unknown_interface() {
    let mut config = Config::default();
    config.host.max_interfaces = 1;
    let mut s = HostSession::new(&config, MockTransport::default());

    let bytes = wake_envelope(5, WakeReason::WLAN_HB, &[]);
    assert!(matches!(
        s.on_event(&bytes),
        Err(SessionError::Dispatch(DispatchError::InvalidInterface { vdev_id: 5, max: 1 }))
    ));
    assert_eq!(s.dispatcher().rejected_events(), 1);
}
