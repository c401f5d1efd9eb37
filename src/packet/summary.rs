//! One-line frame summaries for logs and destination accounting.

use super::classify::{
    be16, ethertype, ipv4_transport_offset, ETHERTYPE_IPV4, ETHERTYPE_IPV6, ETH_HEADER_LEN,
    IPPROTO_TCP, IPPROTO_UDP,
};
use crate::protocol::MacAddr;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Destination address class of an Ethernet frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DestClass {
    Unicast,
    Broadcast,
    /// 01:00:5e:xx:xx:xx
    Ipv4Multicast,
    /// 33:33:xx:xx:xx:xx
    Ipv6Multicast,
    /// Any other group address.
    OtherMulticast,
}

impl DestClass {
    pub fn of(dest: &MacAddr) -> Self {
        if dest.iter().all(|&b| b == 0xff) {
            DestClass::Broadcast
        } else if dest[..3] == [0x01, 0x00, 0x5e] {
            DestClass::Ipv4Multicast
        } else if dest[..2] == [0x33, 0x33] {
            DestClass::Ipv6Multicast
        } else if dest[0] & 0x01 != 0 {
            DestClass::OtherMulticast
        } else {
            DestClass::Unicast
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DestClass::Unicast => "unicast",
            DestClass::Broadcast => "broadcast",
            DestClass::Ipv4Multicast => "ipv4-multicast",
            DestClass::Ipv6Multicast => "ipv6-multicast",
            DestClass::OtherMulticast => "multicast",
        }
    }
}

impl fmt::Display for DestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn mac_at(frame: &[u8], offset: usize) -> Option<MacAddr> {
    let bytes = frame.get(offset..offset + 6)?;
    let mut mac = [0u8; 6];
    mac.copy_from_slice(bytes);
    Some(mac)
}

pub(crate) struct MacDisplay<'a>(pub &'a MacAddr);

impl fmt::Display for MacDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

// ============================================================================
// Ethernet
// ============================================================================

/// Addressing details of an Ethernet frame; every field is optional
/// because the frame may be cut short anywhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketSummary {
    pub len: usize,
    pub dest_mac: Option<MacAddr>,
    pub src_mac: Option<MacAddr>,
    pub ethertype: Option<u16>,
    pub src_ip: Option<IpAddr>,
    pub dst_ip: Option<IpAddr>,
    pub ip_proto: Option<u8>,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
}

impl PacketSummary {
    pub fn dest_class(&self) -> Option<DestClass> {
        self.dest_mac.as_ref().map(DestClass::of)
    }
}

/// Summarize an Ethernet frame.
pub fn summarize(frame: &[u8]) -> PacketSummary {
    let mut summary = PacketSummary {
        len: frame.len(),
        dest_mac: mac_at(frame, 0),
        src_mac: mac_at(frame, 6),
        ethertype: ethertype(frame),
        ..Default::default()
    };

    let l4 = match summary.ethertype {
        Some(ETHERTYPE_IPV4) => ipv4_transport_offset(frame).and_then(|l4| {
            let src: [u8; 4] = frame.get(ETH_HEADER_LEN + 12..ETH_HEADER_LEN + 16)?.try_into().ok()?;
            let dst: [u8; 4] = frame.get(ETH_HEADER_LEN + 16..ETH_HEADER_LEN + 20)?.try_into().ok()?;
            summary.src_ip = Some(IpAddr::V4(Ipv4Addr::from(src)));
            summary.dst_ip = Some(IpAddr::V4(Ipv4Addr::from(dst)));
            summary.ip_proto = frame.get(ETH_HEADER_LEN + 9).copied();
            Some(l4)
        }),
        Some(ETHERTYPE_IPV6) => {
            let src: Option<[u8; 16]> = frame
                .get(ETH_HEADER_LEN + 8..ETH_HEADER_LEN + 24)
                .and_then(|b| b.try_into().ok());
            let dst: Option<[u8; 16]> = frame
                .get(ETH_HEADER_LEN + 24..ETH_HEADER_LEN + 40)
                .and_then(|b| b.try_into().ok());
            match (src, dst) {
                (Some(src), Some(dst)) => {
                    summary.src_ip = Some(IpAddr::V6(Ipv6Addr::from(src)));
                    summary.dst_ip = Some(IpAddr::V6(Ipv6Addr::from(dst)));
                    summary.ip_proto = frame.get(ETH_HEADER_LEN + 6).copied();
                    Some(ETH_HEADER_LEN + 40)
                }
                _ => None,
            }
        }
        _ => None,
    };

    if let (Some(l4), Some(IPPROTO_TCP | IPPROTO_UDP)) = (l4, summary.ip_proto) {
        summary.src_port = be16(frame, l4);
        summary.dst_port = be16(frame, l4 + 2);
    }

    summary
}

impl fmt::Display for PacketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "len={}", self.len)?;
        if let Some(mac) = &self.dest_mac {
            write!(f, " dst={} ({})", MacDisplay(mac), DestClass::of(mac))?;
        }
        if let Some(mac) = &self.src_mac {
            write!(f, " src={}", MacDisplay(mac))?;
        }
        if let Some(ethertype) = self.ethertype {
            write!(f, " ethertype={:#06x}", ethertype)?;
        }
        if let (Some(src), Some(dst)) = (self.src_ip, self.dst_ip) {
            match (self.src_port, self.dst_port) {
                (Some(sp), Some(dp)) => match (src, dst) {
                    (IpAddr::V6(_), _) => write!(f, " [{}]:{} -> [{}]:{}", src, sp, dst, dp)?,
                    _ => write!(f, " {}:{} -> {}:{}", src, sp, dst, dp)?,
                },
                _ => write!(f, " {} -> {}", src, dst)?,
            }
        }
        if let Some(proto) = self.ip_proto {
            write!(f, " proto={}", proto)?;
        }
        Ok(())
    }
}

// ============================================================================
// 802.11 Management
// ============================================================================

/// 802.11 management header length.
pub const MGMT_HEADER_LEN: usize = 24;

const FC_TYPE_MGMT: u8 = 0;

/// Management frame subtype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MgmtSubtype {
    AssocReq,
    AssocResp,
    ReassocReq,
    ReassocResp,
    ProbeReq,
    ProbeResp,
    Beacon,
    Atim,
    Disassoc,
    Auth,
    Deauth,
    Action,
    ActionNoAck,
    Reserved(u8),
}

impl MgmtSubtype {
    pub fn from_bits(subtype: u8) -> Self {
        match subtype {
            0 => MgmtSubtype::AssocReq,
            1 => MgmtSubtype::AssocResp,
            2 => MgmtSubtype::ReassocReq,
            3 => MgmtSubtype::ReassocResp,
            4 => MgmtSubtype::ProbeReq,
            5 => MgmtSubtype::ProbeResp,
            8 => MgmtSubtype::Beacon,
            9 => MgmtSubtype::Atim,
            10 => MgmtSubtype::Disassoc,
            11 => MgmtSubtype::Auth,
            12 => MgmtSubtype::Deauth,
            13 => MgmtSubtype::Action,
            14 => MgmtSubtype::ActionNoAck,
            other => MgmtSubtype::Reserved(other),
        }
    }

    /// Frames whose body starts with a reason code.
    pub fn has_reason_code(self) -> bool {
        matches!(self, MgmtSubtype::Deauth | MgmtSubtype::Disassoc)
    }
}

impl fmt::Display for MgmtSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MgmtSubtype::AssocReq => "assoc-req",
            MgmtSubtype::AssocResp => "assoc-resp",
            MgmtSubtype::ReassocReq => "reassoc-req",
            MgmtSubtype::ReassocResp => "reassoc-resp",
            MgmtSubtype::ProbeReq => "probe-req",
            MgmtSubtype::ProbeResp => "probe-resp",
            MgmtSubtype::Beacon => "beacon",
            MgmtSubtype::Atim => "atim",
            MgmtSubtype::Disassoc => "disassoc",
            MgmtSubtype::Auth => "auth",
            MgmtSubtype::Deauth => "deauth",
            MgmtSubtype::Action => "action",
            MgmtSubtype::ActionNoAck => "action-no-ack",
            MgmtSubtype::Reserved(n) => return write!(f, "reserved({})", n),
        };
        write!(f, "{}", name)
    }
}

/// Header details of an 802.11 management frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MgmtSummary {
    pub subtype: MgmtSubtype,
    pub da: MacAddr,
    pub sa: MacAddr,
    pub bssid: MacAddr,
    /// Deauthentication or disassociation reason.
    pub reason_code: Option<u16>,
    pub len: usize,
}

/// Summarize an 802.11 management frame; `None` if it is not one or is
/// shorter than the header.
pub fn summarize_mgmt(frame: &[u8]) -> Option<MgmtSummary> {
    if frame.len() < MGMT_HEADER_LEN {
        return None;
    }
    let fc = frame[0];
    if (fc >> 2) & 0x03 != FC_TYPE_MGMT {
        return None;
    }
    let subtype = MgmtSubtype::from_bits(fc >> 4);

    let reason_code = if subtype.has_reason_code() {
        frame
            .get(MGMT_HEADER_LEN..MGMT_HEADER_LEN + 2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
    } else {
        None
    };

    Some(MgmtSummary {
        subtype,
        da: mac_at(frame, 4)?,
        sa: mac_at(frame, 10)?,
        bssid: mac_at(frame, 16)?,
        reason_code,
        len: frame.len(),
    })
}

impl fmt::Display for MgmtSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} da={} sa={} bssid={} len={}",
            self.subtype,
            MacDisplay(&self.da),
            MacDisplay(&self.sa),
            MacDisplay(&self.bssid),
            self.len
        )?;
        if let Some(reason) = self.reason_code {
            write!(f, " reason={}", reason)?;
        }
        Ok(())
    }
}
