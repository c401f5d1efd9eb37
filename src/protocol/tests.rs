use super::h2t::*;
use super::t2h::*;
use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WIDTHS: [AddressWidth; 2] = [AddressWidth::Addr32, AddressWidth::Addr64];

fn addr(rng: &mut StdRng, width: AddressWidth) -> BusAddr {
    BusAddr::new(rng.random_range(0..=width.max_addr()))
}

fn mac(rng: &mut StdRng) -> MacAddr {
    let mut mac = [0u8; 6];
    rng.fill(&mut mac[..]);
    mac
}

fn tlvs(rng: &mut StdRng) -> Vec<OptionTlv> {
    (0..rng.random_range(0..4))
        .map(|_| {
            let len = rng.random_range(0..12);
            let value: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            OptionTlv::with_value(rng.random(), rng.random(), &value)
        })
        .collect()
}

/// One random instance of every host-to-target message.
fn random_h2t(rng: &mut StdRng, width: AddressWidth) -> Vec<H2tMessage> {
    vec![
        VersionReq { options: tlvs(rng) }.into(),
        TxFrm {
            pkt_subtype: rng.random_range(0..32),
            pkt_type: rng.random_range(0..8),
            vdev_id: rng.random_range(0..64),
            ext_tid: rng.random_range(0..32),
            postponed: rng.random(),
            extension: rng.random(),
            cksum_offload: rng.random_range(0..4),
            tx_compl_req: rng.random(),
            frame_len: rng.random(),
            msdu_id: rng.random(),
            frag_desc_paddr: addr(rng, width),
            peer_id: rng.random(),
            chan_freq: rng.random(),
        }
        .into(),
        RxRingCfg {
            rings: (0..rng.random_range(0..3))
                .map(|_| RxRingConfig {
                    idx_shadow_paddr: addr(rng, width),
                    base_paddr: addr(rng, width),
                    ring_len: rng.random(),
                    buf_size: rng.random(),
                    enabled_flags: rng.random(),
                    rx_pkt_offset: rng.random(),
                })
                .collect(),
        }
        .into(),
        StatsReq {
            upload_types: rng.random_range(0..1 << 24),
            reset_types: rng.random_range(0..1 << 24),
            stat_type: rng.random(),
            config_param: rng.random(),
            cookie: rng.random(),
        }
        .into(),
        SyncReq {
            sync_count: rng.random(),
        }
        .into(),
        AggrCfg {
            max_ampdu_subframes: rng.random_range(0..32),
            max_amsdu_subframes: rng.random_range(0..16),
        }
        .into(),
        FragDescBankCfg {
            pdev_id: rng.random_range(0..4),
            swap: rng.random(),
            banks: (0..rng.random_range(0..4))
                .map(|_| FragDescBank {
                    base_paddr: addr(rng, width),
                    min_id: rng.random(),
                    max_id: rng.random(),
                })
                .collect(),
        }
        .into(),
        MgmtTx {
            desc_id: rng.random(),
            frag_paddr: addr(rng, width),
            len: rng.random(),
            vdev_id: rng.random(),
        }
        .into(),
        WdiIpaOpReq {
            op_code: rng.random(),
        }
        .into(),
        AggrCfgEx {
            max_ampdu_subframes: rng.random(),
            max_amsdu_subframes: rng.random(),
        }
        .into(),
    ]
}

/// One random instance of every target-to-host message.
fn random_t2h(rng: &mut StdRng, width: AddressWidth) -> Vec<T2hMessage> {
    vec![
        VersionConf {
            version: ProtocolVersion::new(rng.random(), rng.random()),
            options: tlvs(rng),
        }
        .into(),
        RxFlush {
            peer_id: rng.random(),
            tid: rng.random(),
            mpdu_status: rng.random(),
            seq_start: rng.random_range(0..64),
            seq_end: rng.random_range(0..64),
        }
        .into(),
        PeerMap {
            vdev_id: rng.random(),
            peer_id: rng.random(),
            mac: mac(rng),
            hw_peer_id: rng.random(),
        }
        .into(),
        PeerUnmap {
            peer_id: rng.random(),
        }
        .into(),
        RxAddba {
            peer_id: rng.random_range(0..4096),
            tid: rng.random_range(0..16),
            win_size: rng.random(),
        }
        .into(),
        RxDelba {
            peer_id: rng.random_range(0..4096),
            tid: rng.random_range(0..16),
            initiator: rng.random(),
        }
        .into(),
        TxComplInd {
            status: rng.random_range(0..8),
            tid: rng.random_range(0..16),
            tid_invalid: rng.random(),
            msdu_ids: (0..rng.random_range(0..9)).map(|_| rng.random()).collect(),
        }
        .into(),
        RcUpdateInd {
            peer_id: rng.random(),
            entries: (0..rng.random_range(0..4))
                .map(|_| RateEntry {
                    rate_code: rng.random(),
                    flags: rng.random(),
                    tries: rng.random(),
                })
                .collect(),
        }
        .into(),
        MgmtTxComplInd {
            desc_id: rng.random(),
            status: rng.random(),
        }
        .into(),
        TxCreditUpdateInd {
            credit_delta: rng.random(),
        }
        .into(),
        RxPnInd {
            peer_id: rng.random(),
            tid: rng.random_range(0..32),
            seq_start: rng.random(),
            seq_end: rng.random(),
            pn_ies: (0..rng.random_range(0..7)).map(|_| rng.random()).collect(),
        }
        .into(),
        RxInOrdPaddrInd {
            offload: rng.random(),
            frag: rng.random(),
            peer_id: rng.random(),
            tid: rng.random_range(0..32),
            msdus: (0..rng.random_range(0..4))
                .map(|_| InOrderMsdu {
                    paddr: addr(rng, width),
                    fw_desc: rng.random(),
                    msdu_len: rng.random_range(0..1 << 14),
                })
                .collect(),
        }
        .into(),
        ChanChange {
            primary_mhz: rng.random(),
            center_freq1: rng.random(),
            center_freq2: rng.random(),
            phy_mode: rng.random(),
        }
        .into(),
        FlowPoolMap {
            flows: (0..rng.random_range(0..4))
                .map(|_| FlowPool {
                    flow_type: rng.random(),
                    flow_id: rng.random(),
                    pool_id: rng.random(),
                    pool_size: rng.random(),
                })
                .collect(),
        }
        .into(),
        FlowPoolUnmap {
            flow_type: rng.random(),
            flow_id: rng.random(),
            pool_id: rng.random(),
        }
        .into(),
    ]
}

// ===== Round Trip =====

#[test]
fn test_every_message_round_trips_in_both_widths() {
    let mut rng = StdRng::seed_from_u64(0x4854_5401);
    for width in WIDTHS {
        for _ in 0..50 {
            for msg in random_h2t(&mut rng, width) {
                let bytes = msg.encode(width).unwrap();
                assert_eq!(bytes.len() % 4, 0, "{} not word aligned", msg.msg_type());
                assert_eq!(H2tMessage::decode(&bytes, width).unwrap(), msg);
            }
            for msg in random_t2h(&mut rng, width) {
                let bytes = msg.encode(width).unwrap();
                assert_eq!(bytes.len() % 4, 0, "{} not word aligned", msg.msg_type());
                assert_eq!(decode_t2h(&bytes, width).unwrap(), msg);
            }
        }
    }
}

#[test]
fn test_samples_cover_catalog() {
    let mut rng = StdRng::seed_from_u64(1);
    let h2t: Vec<_> = random_h2t(&mut rng, AddressWidth::Addr32)
        .iter()
        .map(|m| m.msg_type())
        .collect();
    let t2h: Vec<_> = random_t2h(&mut rng, AddressWidth::Addr32)
        .iter()
        .map(|m| m.msg_type())
        .collect();
    assert_eq!(h2t, H2tMsgType::ALL);
    assert_eq!(t2h, T2hMsgType::ALL);
}

#[test]
fn test_decoded_message_reports_type() {
    let msg: DecodedMessage = H2tMessage::from(SyncReq { sync_count: 9 }).into();
    assert_eq!(msg.message_type(), MessageType::H2t(H2tMsgType::Sync));
    let bytes = msg.encode(AddressWidth::Addr32).unwrap();
    assert_eq!(decode(Direction::HostToTarget, &bytes, AddressWidth::Addr32).unwrap(), msg);
}

// ===== Layout Tables =====

#[test]
fn test_fields_within_a_word_are_disjoint() {
    for (t, layout) in layouts() {
        for fields in layout.field_words() {
            for (i, a) in fields.iter().enumerate() {
                for b in &fields[i + 1..] {
                    assert!(
                        !a.spec.overlaps(&b.spec),
                        "{}: {} overlaps {}",
                        t,
                        a.name,
                        b.name
                    );
                }
            }
        }
    }
}

#[test]
fn test_bit_isolation_for_every_field_pair() {
    let mut rng = StdRng::seed_from_u64(7);
    for (t, layout) in layouts() {
        for fields in layout.field_words() {
            for a in fields {
                for b in fields {
                    if a.name == b.name {
                        continue;
                    }
                    let prior = rng.random_range(b.spec.min_value()..=b.spec.max_value());
                    let mut word: u32 = rng.random();
                    b.spec.write(&mut word, prior).unwrap();
                    a.spec.write(&mut word, a.spec.max_value()).unwrap();
                    assert_eq!(b.spec.read(word), prior, "{}: {} clobbered {}", t, a.name, b.name);
                    a.spec.write(&mut word, a.spec.min_value()).unwrap();
                    assert_eq!(b.spec.read(word), prior, "{}: {} clobbered {}", t, a.name, b.name);
                }
            }
        }
    }
}

#[test]
fn test_every_word_zero_starts_with_type_code() {
    for (t, layout) in layouts() {
        let first = layout.field_words().next().unwrap();
        assert_eq!(first[0].name, "msg_type", "{}", t);
    }
}

// ===== Truncation =====

#[test]
fn test_short_buffers_rejected_for_every_type() {
    let mut rng = StdRng::seed_from_u64(0x5348_4f52);
    for width in WIDTHS {
        for (t, layout) in layouts() {
            let min = layout.header_len(width);
            for len in 0..min {
                let mut buf = vec![0u8; len];
                rng.fill(&mut buf[..]);
                if let Some(b) = buf.first_mut() {
                    *b = t.to_byte();
                }
                let err = decode(t.direction(), &buf, width).unwrap_err();
                assert!(
                    matches!(err, CodecError::TooShort { .. }),
                    "{} len {} gave {:?}",
                    t,
                    len,
                    err
                );
            }
        }
    }
}

#[test]
fn test_overstated_counts_rejected() {
    let width = AddressWidth::Addr64;
    for (t, layout) in layouts() {
        let Some(record_len) = layout.record_len(width) else {
            continue;
        };
        // Header only, every count field saturated.
        let mut buf = vec![0xffu8; layout.header_len(width)];
        buf[0] = t.to_byte();
        let err = decode(t.direction(), &buf, width).unwrap_err();
        assert!(
            matches!(err, CodecError::TruncatedRecords { record_len: r, .. } if r == record_len),
            "{} gave {:?}",
            t,
            err
        );
    }
}

#[test]
fn test_random_buffers_never_panic() {
    let mut rng = StdRng::seed_from_u64(0xf022);
    for _ in 0..5000 {
        let len = rng.random_range(0..96);
        let mut buf = vec![0u8; len];
        rng.fill(&mut buf[..]);
        if len > 0 && rng.random_bool(0.8) {
            buf[0] = rng.random_range(0..0x1a);
        }
        for width in WIDTHS {
            let _ = decode(Direction::HostToTarget, &buf, width);
            let _ = decode(Direction::TargetToHost, &buf, width);
        }
    }
}

// ===== Sign Extension =====

#[test]
fn test_negative_credit_survives_encoding() {
    for delta in [-1i16, -2, -128, i16::MIN, i16::MAX, 0] {
        let msg = T2hMessage::from(TxCreditUpdateInd { credit_delta: delta });
        let bytes = msg.encode(AddressWidth::Addr32).unwrap();
        assert_eq!(decode_t2h(&bytes, AddressWidth::Addr32).unwrap(), msg);
    }
}
