//! Per-interface wake statistics.

use super::reason::WakeReason;
use crate::packet::{DestClass, ProtocolClassification};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
struct InterfaceCounters {
    total: u64,
    reasons: HashMap<WakeReason, u64>,
    protocols: HashMap<ProtocolClassification, u64>,
    destinations: HashMap<DestClass, u64>,
    malformed: u64,
}

/// Wake counters, written by the dispatcher and read by anyone.
///
/// One lock guards every interface so a snapshot never mixes counts from
/// before and after an event.
#[derive(Debug, Default)]
pub struct WakeStats {
    interfaces: Mutex<HashMap<u8, InterfaceCounters>>,
    rejected: AtomicU64,
}

impl WakeStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_interface<F: FnOnce(&mut InterfaceCounters)>(&self, vdev_id: u8, f: F) {
        let mut interfaces = self.interfaces.lock().unwrap_or_else(PoisonError::into_inner);
        f(interfaces.entry(vdev_id).or_default());
    }

    /// Count a dispatched event.
    pub fn record(
        &self,
        vdev_id: u8,
        reason: WakeReason,
        protocol: Option<ProtocolClassification>,
        destination: Option<DestClass>,
    ) {
        self.with_interface(vdev_id, |c| {
            c.total += 1;
            *c.reasons.entry(reason).or_default() += 1;
            if let Some(p) = protocol.filter(|p| p.is_valid()) {
                *c.protocols.entry(p).or_default() += 1;
            }
            if let Some(d) = destination {
                *c.destinations.entry(d).or_default() += 1;
            }
        });
    }

    /// Count an event whose piggybacked payload failed to decode.
    pub fn record_malformed(&self, vdev_id: u8, reason: WakeReason) {
        self.with_interface(vdev_id, |c| {
            c.total += 1;
            *c.reasons.entry(reason).or_default() += 1;
            c.malformed += 1;
        });
    }

    /// Count an event for an interface out of range.
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rejected_events(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Copy of one interface's counters; zeros if it never woke the host.
    pub fn snapshot(&self, vdev_id: u8) -> WakeStatsSnapshot {
        let interfaces = self.interfaces.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(c) = interfaces.get(&vdev_id) else {
            return WakeStatsSnapshot {
                vdev_id,
                ..Default::default()
            };
        };
        WakeStatsSnapshot {
            vdev_id,
            total: c.total,
            reasons: c.reasons.iter().map(|(k, v)| (*k, *v)).collect(),
            protocols: c.protocols.iter().map(|(k, v)| (*k, *v)).collect(),
            destinations: c.destinations.iter().map(|(k, v)| (*k, *v)).collect(),
            malformed: c.malformed,
        }
    }

    /// Interfaces with at least one recorded event, ascending.
    pub fn interfaces(&self) -> Vec<u8> {
        let interfaces = self.interfaces.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<u8> = interfaces.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Point-in-time wake counters for one interface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WakeStatsSnapshot {
    pub vdev_id: u8,
    pub total: u64,
    pub reasons: BTreeMap<WakeReason, u64>,
    pub protocols: BTreeMap<ProtocolClassification, u64>,
    pub destinations: BTreeMap<DestClass, u64>,
    pub malformed: u64,
}

impl WakeStatsSnapshot {
    pub fn reason_count(&self, reason: WakeReason) -> u64 {
        self.reasons.get(&reason).copied().unwrap_or(0)
    }

    pub fn protocol_count(&self, protocol: ProtocolClassification) -> u64 {
        self.protocols.get(&protocol).copied().unwrap_or(0)
    }

    pub fn destination_count(&self, dest: DestClass) -> u64 {
        self.destinations.get(&dest).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_snapshot() {
        let stats = WakeStats::new();
        let snap = stats.snapshot(3);
        assert_eq!(snap.vdev_id, 3);
        assert_eq!(snap.total, 0);
        assert!(snap.reasons.is_empty());
        assert!(stats.interfaces().is_empty());
    }

    #[test]
    fn test_invalid_protocol_not_counted() {
        let stats = WakeStats::new();
        stats.record(
            0,
            WakeReason::PATTERN_MATCH_FOUND,
            Some(ProtocolClassification::Invalid),
            Some(DestClass::Unicast),
        );
        let snap = stats.snapshot(0);
        assert_eq!(snap.total, 1);
        assert!(snap.protocols.is_empty());
        assert_eq!(snap.destination_count(DestClass::Unicast), 1);
    }

    #[test]
    fn test_malformed_counts_reason_once() {
        let stats = WakeStats::new();
        stats.record_malformed(1, WakeReason::LOW_RSSI);
        let snap = stats.snapshot(1);
        assert_eq!(snap.reason_count(WakeReason::LOW_RSSI), 1);
        assert_eq!(snap.malformed, 1);
        assert_eq!(snap.total, 1);
    }

    #[test]
    fn test_concurrent_recording() {
        let stats = Arc::new(WakeStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..250 {
                        stats.record(0, WakeReason::WLAN_HB, None, None);
                        stats.record_rejected();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.snapshot(0).reason_count(WakeReason::WLAN_HB), 1000);
        assert_eq!(stats.rejected_events(), 1000);
    }
}
