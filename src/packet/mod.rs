//! Wake Packet Inspection
//!
//! Classifies and summarizes the frames firmware hands up with raw-packet
//! wake reasons. Everything here runs on over-the-air input: functions are
//! total over any byte slice and never index past the end.

mod classify;
mod summary;

pub use classify::{
    classify, ethertype, ProtocolClassification, DHCP_CLIENT_PORT, DHCP_SERVER_PORT, ETHERTYPE_ARP,
    ETHERTYPE_EAPOL, ETHERTYPE_IPV4, ETHERTYPE_IPV6, ETH_HEADER_LEN, IPPROTO_ICMP, IPPROTO_ICMPV6,
    IPPROTO_TCP, IPPROTO_UDP,
};
pub use summary::{summarize, summarize_mgmt, DestClass, MgmtSubtype, MgmtSummary, PacketSummary, MGMT_HEADER_LEN};
