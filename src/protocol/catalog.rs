//! Message catalog.
//!
//! One enum per direction wraps the typed messages. Decoding reads the
//! type byte, resolves it in the direction's namespace and hands the
//! buffer to the matching message. The session's negotiated address width
//! is a parameter of every call, so callers see one logical message per
//! code regardless of width.

use super::address::AddressWidth;
use super::h2t::{
    AggrCfg, AggrCfgEx, FragDescBankCfg, MgmtTx, RxRingCfg, StatsReq, SyncReq, TxFrm, VersionReq,
    WdiIpaOpReq,
};
use super::layout::{Message, MessageLayout};
use super::t2h::{
    ChanChange, FlowPoolMap, FlowPoolUnmap, MgmtTxComplInd, PeerMap, PeerUnmap, RcUpdateInd, RxAddba,
    RxDelba, RxFlush, RxInOrdPaddrInd, RxPnInd, TxComplInd, TxCreditUpdateInd, VersionConf,
};
use super::types::{Direction, H2tMsgType, MessageType, T2hMsgType};
use super::CodecError;
use crate::bitfield::FieldOverflow;

/// Generates a direction enum over its message structs, with the shared
/// encode/decode/type plumbing.
macro_rules! message_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $code:ident, $wrap:ident {
            $($variant:ident($ty:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum $name {
            $($variant($ty),)+
        }

        impl $name {
            /// Type code of this message.
            pub fn msg_type(&self) -> $code {
                match self {
                    $($name::$variant(_) => $code::$variant,)+
                }
            }

            /// Encode in the given address width.
            pub fn encode(&self, width: AddressWidth) -> Result<Vec<u8>, FieldOverflow> {
                match self {
                    $($name::$variant(m) => m.encode(width),)+
                }
            }

            /// Decode a message in this direction.
            pub fn decode(data: &[u8], width: AddressWidth) -> Result<Self, CodecError> {
                let code = *data.first().ok_or(CodecError::TooShort {
                    expected: 4,
                    got: 0,
                })?;
                if data.len() < 4 {
                    return Err(CodecError::TooShort {
                        expected: 4,
                        got: data.len(),
                    });
                }
                match $code::from_byte(code) {
                    $(Some($code::$variant) => <$ty>::decode(data, width).map($name::$variant),)+
                    None => Err(CodecError::UnknownType(code)),
                }
            }

            /// Wire layout of a code.
            pub fn layout(code: $code) -> MessageLayout {
                match code {
                    $($code::$variant => <$ty as Message>::LAYOUT,)+
                }
            }
        }

        $(
            impl From<$ty> for $name {
                fn from(m: $ty) -> Self {
                    $name::$variant(m)
                }
            }
        )+

        impl From<$name> for DecodedMessage {
            fn from(m: $name) -> Self {
                DecodedMessage::$wrap(m)
            }
        }
    };
}

message_enum! {
    /// A decoded host-to-target message.
    H2tMessage, H2tMsgType, H2t {
        VersionReq(VersionReq),
        TxFrm(TxFrm),
        RxRingCfg(RxRingCfg),
        StatsReq(StatsReq),
        Sync(SyncReq),
        AggrCfg(AggrCfg),
        FragDescBankCfg(FragDescBankCfg),
        MgmtTx(MgmtTx),
        WdiIpaOpReq(WdiIpaOpReq),
        AggrCfgEx(AggrCfgEx),
    }
}

message_enum! {
    /// A decoded target-to-host message.
    T2hMessage, T2hMsgType, T2h {
        VersionConf(VersionConf),
        RxFlush(RxFlush),
        PeerMap(PeerMap),
        PeerUnmap(PeerUnmap),
        RxAddba(RxAddba),
        RxDelba(RxDelba),
        TxComplInd(TxComplInd),
        RcUpdateInd(RcUpdateInd),
        MgmtTxComplInd(MgmtTxComplInd),
        TxCreditUpdateInd(TxCreditUpdateInd),
        RxPnInd(RxPnInd),
        RxInOrdPaddrInd(RxInOrdPaddrInd),
        ChanChange(ChanChange),
        FlowPoolMap(FlowPoolMap),
        FlowPoolUnmap(FlowPoolUnmap),
    }
}

/// A decoded message of either direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedMessage {
    H2t(H2tMessage),
    T2h(T2hMessage),
}

impl DecodedMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            DecodedMessage::H2t(m) => MessageType::H2t(m.msg_type()),
            DecodedMessage::T2h(m) => MessageType::T2h(m.msg_type()),
        }
    }

    pub fn encode(&self, width: AddressWidth) -> Result<Vec<u8>, FieldOverflow> {
        match self {
            DecodedMessage::H2t(m) => m.encode(width),
            DecodedMessage::T2h(m) => m.encode(width),
        }
    }
}

/// Decode a message travelling in `direction`.
pub fn decode(direction: Direction, data: &[u8], width: AddressWidth) -> Result<DecodedMessage, CodecError> {
    match direction {
        Direction::HostToTarget => H2tMessage::decode(data, width).map(DecodedMessage::H2t),
        Direction::TargetToHost => T2hMessage::decode(data, width).map(DecodedMessage::T2h),
    }
}

/// Decode a target-to-host message.
pub fn decode_t2h(data: &[u8], width: AddressWidth) -> Result<T2hMessage, CodecError> {
    T2hMessage::decode(data, width)
}

/// Layout of a message type.
pub fn layout_of(msg_type: MessageType) -> MessageLayout {
    match msg_type {
        MessageType::H2t(t) => H2tMessage::layout(t),
        MessageType::T2h(t) => T2hMessage::layout(t),
    }
}

/// Every message type with its layout, host-to-target first.
pub fn layouts() -> Vec<(MessageType, MessageLayout)> {
    let h2t = H2tMsgType::ALL.iter().map(|&t| MessageType::H2t(t));
    let t2h = T2hMsgType::ALL.iter().map(|&t| MessageType::T2h(t));
    h2t.chain(t2h).map(|t| (t, layout_of(t))).collect()
}
