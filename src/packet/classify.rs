//! Protocol classification of captured wake frames.
//!
//! Frames are Ethernet II as delivered by the firmware for data-path wake
//! reasons. Every offset below is from the start of the Ethernet header.
//! Each branch checks length before it reads, so any slice is accepted.

use std::fmt;

/// Ethernet header length.
pub const ETH_HEADER_LEN: usize = 14;
/// Offset of the ethertype.
pub const ETHERTYPE_OFFSET: usize = 12;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_IPV6: u16 = 0x86DD;
pub const ETHERTYPE_EAPOL: u16 = 0x888E;

// EAPOL-Key
const EAPOL_PACKET_TYPE_OFFSET: usize = 15;
const EAPOL_PACKET_TYPE_KEY: u8 = 3;
const EAPOL_KEY_INFO_OFFSET: usize = 19;
const KEY_INFO_PAIRWISE: u16 = 0x0008;
const KEY_INFO_ACK: u16 = 0x0080;
const KEY_INFO_MIC: u16 = 0x0100;
const KEY_INFO_SECURE: u16 = 0x0200;

// ARP
const ARP_OPCODE_OFFSET: usize = 20;
const ARP_REQUEST: u16 = 1;
const ARP_REPLY: u16 = 2;

// IPv4
const IPV4_MIN_HEADER_LEN: usize = 20;
const IPV4_PROTO_OFFSET: usize = 23;

// IPv6
const IPV6_HEADER_LEN: usize = 40;
const IPV6_NEXT_HEADER_OFFSET: usize = 20;
const IPV6_TRANSPORT_OFFSET: usize = ETH_HEADER_LEN + IPV6_HEADER_LEN;

pub const IPPROTO_ICMP: u8 = 1;
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;
pub const IPPROTO_ICMPV6: u8 = 58;

const UDP_HEADER_LEN: usize = 8;

// ICMP
const ICMP_ECHO_REPLY: u8 = 0;
const ICMP_ECHO_REQUEST: u8 = 8;
const ICMPV6_ECHO_REQUEST: u8 = 128;
const ICMPV6_ECHO_REPLY: u8 = 129;
const ICMPV6_ROUTER_SOLICIT: u8 = 133;
const ICMPV6_ROUTER_ADVERT: u8 = 134;
const ICMPV6_NEIGHBOR_SOLICIT: u8 = 135;
const ICMPV6_NEIGHBOR_ADVERT: u8 = 136;

// DHCP
pub const DHCP_SERVER_PORT: u16 = 67;
pub const DHCP_CLIENT_PORT: u16 = 68;
/// Fixed BOOTP header plus the magic cookie.
const DHCP_OPTIONS_OFFSET: usize = 240;
const DHCP_MAGIC_COOKIE: [u8; 4] = [0x63, 0x82, 0x53, 0x63];
const DHCP_OPT_PAD: u8 = 0;
const DHCP_OPT_MSG_TYPE: u8 = 53;
const DHCP_OPT_END: u8 = 255;

/// Protocol and subtype of a captured frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtocolClassification {
    EapolM1,
    EapolM2,
    EapolM3,
    EapolM4,
    ArpRequest,
    ArpReply,
    DhcpDiscover,
    DhcpOffer,
    DhcpRequest,
    DhcpDecline,
    DhcpAck,
    DhcpNak,
    DhcpRelease,
    DhcpInform,
    Icmpv4EchoRequest,
    Icmpv4EchoReply,
    Icmpv6EchoRequest,
    Icmpv6EchoReply,
    Icmpv6RouterSolicit,
    Icmpv6RouterAdvert,
    Icmpv6NeighborSolicit,
    Icmpv6NeighborAdvert,
    Ipv4Tcp,
    Ipv4Udp,
    Ipv6Tcp,
    Ipv6Udp,
    Invalid,
}

impl ProtocolClassification {
    /// Stable upper-case name for logs and counters.
    pub fn as_str(self) -> &'static str {
        use ProtocolClassification::*;
        match self {
            EapolM1 => "EAPOL_M1",
            EapolM2 => "EAPOL_M2",
            EapolM3 => "EAPOL_M3",
            EapolM4 => "EAPOL_M4",
            ArpRequest => "ARP_REQUEST",
            ArpReply => "ARP_REPLY",
            DhcpDiscover => "DHCP_DISCOVER",
            DhcpOffer => "DHCP_OFFER",
            DhcpRequest => "DHCP_REQUEST",
            DhcpDecline => "DHCP_DECLINE",
            DhcpAck => "DHCP_ACK",
            DhcpNak => "DHCP_NAK",
            DhcpRelease => "DHCP_RELEASE",
            DhcpInform => "DHCP_INFORM",
            Icmpv4EchoRequest => "ICMPV4_ECHO_REQUEST",
            Icmpv4EchoReply => "ICMPV4_ECHO_REPLY",
            Icmpv6EchoRequest => "ICMPV6_ECHO_REQUEST",
            Icmpv6EchoReply => "ICMPV6_ECHO_REPLY",
            Icmpv6RouterSolicit => "ICMPV6_RS",
            Icmpv6RouterAdvert => "ICMPV6_RA",
            Icmpv6NeighborSolicit => "ICMPV6_NS",
            Icmpv6NeighborAdvert => "ICMPV6_NA",
            Ipv4Tcp => "IPV4_TCP",
            Ipv4Udp => "IPV4_UDP",
            Ipv6Tcp => "IPV6_TCP",
            Ipv6Udp => "IPV6_UDP",
            Invalid => "INVALID",
        }
    }

    pub fn is_valid(self) -> bool {
        self != ProtocolClassification::Invalid
    }
}

impl fmt::Display for ProtocolClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Classification
// ============================================================================

pub(crate) fn be16(frame: &[u8], offset: usize) -> Option<u16> {
    let bytes = frame.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Ethertype of an Ethernet II frame.
pub fn ethertype(frame: &[u8]) -> Option<u16> {
    be16(frame, ETHERTYPE_OFFSET)
}

/// Classify a captured Ethernet frame.
pub fn classify(frame: &[u8]) -> ProtocolClassification {
    let result = match ethertype(frame) {
        Some(ETHERTYPE_EAPOL) => classify_eapol(frame),
        Some(ETHERTYPE_ARP) => classify_arp(frame),
        Some(ETHERTYPE_IPV4) => classify_ipv4(frame),
        Some(ETHERTYPE_IPV6) => classify_ipv6(frame),
        _ => None,
    };
    result.unwrap_or(ProtocolClassification::Invalid)
}

fn classify_eapol(frame: &[u8]) -> Option<ProtocolClassification> {
    if *frame.get(EAPOL_PACKET_TYPE_OFFSET)? != EAPOL_PACKET_TYPE_KEY {
        return None;
    }
    let info = be16(frame, EAPOL_KEY_INFO_OFFSET)?;
    if info & KEY_INFO_PAIRWISE == 0 {
        return None;
    }

    let ack = info & KEY_INFO_ACK != 0;
    let mic = info & KEY_INFO_MIC != 0;
    let secure = info & KEY_INFO_SECURE != 0;
    match (ack, mic, secure) {
        (true, false, _) => Some(ProtocolClassification::EapolM1),
        (false, true, false) => Some(ProtocolClassification::EapolM2),
        (true, true, _) => Some(ProtocolClassification::EapolM3),
        (false, true, true) => Some(ProtocolClassification::EapolM4),
        (false, false, _) => None,
    }
}

fn classify_arp(frame: &[u8]) -> Option<ProtocolClassification> {
    match be16(frame, ARP_OPCODE_OFFSET)? {
        ARP_REQUEST => Some(ProtocolClassification::ArpRequest),
        ARP_REPLY => Some(ProtocolClassification::ArpReply),
        _ => None,
    }
}

/// Offset of the IPv4 transport header, from the IHL field.
pub(crate) fn ipv4_transport_offset(frame: &[u8]) -> Option<usize> {
    let ver_ihl = *frame.get(ETH_HEADER_LEN)?;
    let ihl = usize::from(ver_ihl & 0x0f) * 4;
    if ver_ihl >> 4 != 4 || ihl < IPV4_MIN_HEADER_LEN || frame.len() < ETH_HEADER_LEN + ihl {
        return None;
    }
    Some(ETH_HEADER_LEN + ihl)
}

fn classify_ipv4(frame: &[u8]) -> Option<ProtocolClassification> {
    let l4 = ipv4_transport_offset(frame)?;
    match *frame.get(IPV4_PROTO_OFFSET)? {
        IPPROTO_ICMP => match *frame.get(l4)? {
            ICMP_ECHO_REQUEST => Some(ProtocolClassification::Icmpv4EchoRequest),
            ICMP_ECHO_REPLY => Some(ProtocolClassification::Icmpv4EchoReply),
            _ => None,
        },
        IPPROTO_UDP => {
            let src = be16(frame, l4)?;
            let dst = be16(frame, l4 + 2)?;
            if is_dhcp_ports(src, dst) {
                classify_dhcp(frame, l4 + UDP_HEADER_LEN)
            } else {
                Some(ProtocolClassification::Ipv4Udp)
            }
        }
        IPPROTO_TCP => Some(ProtocolClassification::Ipv4Tcp),
        _ => None,
    }
}

fn is_dhcp_ports(src: u16, dst: u16) -> bool {
    matches!(
        (src, dst),
        (DHCP_CLIENT_PORT, DHCP_SERVER_PORT) | (DHCP_SERVER_PORT, DHCP_CLIENT_PORT)
    )
}

/// Find option 53 in a BOOTP payload starting at `bootp`.
fn classify_dhcp(frame: &[u8], bootp: usize) -> Option<ProtocolClassification> {
    let cookie = frame.get(bootp + DHCP_OPTIONS_OFFSET - 4..bootp + DHCP_OPTIONS_OFFSET)?;
    if cookie != DHCP_MAGIC_COOKIE {
        return None;
    }

    let mut pos = bootp + DHCP_OPTIONS_OFFSET;
    loop {
        match *frame.get(pos)? {
            DHCP_OPT_PAD => pos += 1,
            DHCP_OPT_END => return None,
            code => {
                let len = usize::from(*frame.get(pos + 1)?);
                if code == DHCP_OPT_MSG_TYPE {
                    if len < 1 {
                        return None;
                    }
                    return dhcp_message_type(*frame.get(pos + 2)?);
                }
                pos += 2 + len;
            }
        }
    }
}

fn dhcp_message_type(value: u8) -> Option<ProtocolClassification> {
    use ProtocolClassification::*;
    match value {
        1 => Some(DhcpDiscover),
        2 => Some(DhcpOffer),
        3 => Some(DhcpRequest),
        4 => Some(DhcpDecline),
        5 => Some(DhcpAck),
        6 => Some(DhcpNak),
        7 => Some(DhcpRelease),
        8 => Some(DhcpInform),
        _ => None,
    }
}

fn classify_ipv6(frame: &[u8]) -> Option<ProtocolClassification> {
    if frame.len() < IPV6_TRANSPORT_OFFSET {
        return None;
    }
    match *frame.get(IPV6_NEXT_HEADER_OFFSET)? {
        IPPROTO_ICMPV6 => match *frame.get(IPV6_TRANSPORT_OFFSET)? {
            ICMPV6_ECHO_REQUEST => Some(ProtocolClassification::Icmpv6EchoRequest),
            ICMPV6_ECHO_REPLY => Some(ProtocolClassification::Icmpv6EchoReply),
            ICMPV6_ROUTER_SOLICIT => Some(ProtocolClassification::Icmpv6RouterSolicit),
            ICMPV6_ROUTER_ADVERT => Some(ProtocolClassification::Icmpv6RouterAdvert),
            ICMPV6_NEIGHBOR_SOLICIT => Some(ProtocolClassification::Icmpv6NeighborSolicit),
            ICMPV6_NEIGHBOR_ADVERT => Some(ProtocolClassification::Icmpv6NeighborAdvert),
            _ => None,
        },
        IPPROTO_UDP => Some(ProtocolClassification::Ipv6Udp),
        IPPROTO_TCP => Some(ProtocolClassification::Ipv6Tcp),
        _ => None,
    }
}
