//! Benchmarks for wake packet classification and catalog decode.
//!
//! Run with: cargo bench --bench classify

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use htt_wow::protocol::t2h::{InOrderMsdu, RxInOrdPaddrInd};
use htt_wow::protocol::decode_t2h;
use htt_wow::{classify, AddressWidth, BusAddr, T2hMessage};

/// Broadcast DHCP frame carrying option 53 after `pad` bytes of padding.
fn dhcp_frame(pad: usize) -> Vec<u8> {
    let mut bootp = vec![0u8; 236];
    bootp.extend_from_slice(&[0x63, 0x82, 0x53, 0x63]);
    bootp.extend(std::iter::repeat(0u8).take(pad));
    bootp.extend_from_slice(&[53, 1, 3, 255]);

    let mut udp = Vec::new();
    udp.extend_from_slice(&68u16.to_be_bytes());
    udp.extend_from_slice(&67u16.to_be_bytes());
    udp.extend_from_slice(&((8 + bootp.len()) as u16).to_be_bytes());
    udp.extend_from_slice(&[0, 0]);
    udp.extend_from_slice(&bootp);

    let mut ip = vec![0x45, 0x00];
    ip.extend_from_slice(&((20 + udp.len()) as u16).to_be_bytes());
    ip.extend_from_slice(&[0, 0, 0, 0, 64, 17, 0, 0, 0, 0, 0, 0, 255, 255, 255, 255]);
    ip.extend_from_slice(&udp);

    let mut frame = vec![0xff; 6];
    frame.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x01, 0x08, 0x00]);
    frame.extend_from_slice(&ip);
    frame
}

fn eapol_m1() -> Vec<u8> {
    let mut frame = vec![0x02, 0, 0, 0, 0, 0x01, 0x02, 0, 0, 0, 0, 0xaa, 0x88, 0x8e];
    frame.extend_from_slice(&[0x02, 0x03, 0x00, 0x5f, 0x02, 0x00, 0x8a]);
    frame.extend_from_slice(&[0u8; 90]);
    frame
}

// ===== Classifier Benchmarks =====

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let eapol = eapol_m1();
    group.bench_function("eapol_m1", |b| b.iter(|| classify(black_box(&eapol))));

    for &pad in &[0usize, 64, 256] {
        let frame = dhcp_frame(pad);
        group.bench_with_input(BenchmarkId::new("dhcp_option_walk", pad), &frame, |b, frame| {
            b.iter(|| classify(black_box(frame)))
        });
    }

    let garbage = vec![0x5au8; 1500];
    group.bench_function("invalid", |b| b.iter(|| classify(black_box(&garbage))));

    group.finish();
}

// ===== Catalog Benchmarks =====

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_t2h");

    for &count in &[1usize, 16, 64] {
        let msg = T2hMessage::from(RxInOrdPaddrInd {
            offload: false,
            frag: false,
            peer_id: 3,
            tid: 0,
            msdus: (0..count)
                .map(|i| InOrderMsdu {
                    paddr: BusAddr::new(0x1_0000_0000 + (i as u64) * 2048),
                    fw_desc: 0,
                    msdu_len: 1514,
                })
                .collect(),
        });
        let bytes = msg.encode(AddressWidth::Addr64).unwrap();
        group.bench_with_input(BenchmarkId::new("in_order_paddr", count), &bytes, |b, bytes| {
            b.iter(|| decode_t2h(black_box(bytes), AddressWidth::Addr64))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_decode);
criterion_main!(benches);
