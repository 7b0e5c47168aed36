//! Packet data of the swap applications wrapped by the router.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::RouterError;

/// Message types of atomic swap packets.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicSwapMessageType {
    #[serde(rename = "TYPE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "TYPE_MSG_MAKE_SWAP")]
    MakeSwap,
    #[serde(rename = "TYPE_MSG_TAKE_SWAP")]
    TakeSwap,
    #[serde(rename = "TYPE_MSG_CANCEL_SWAP")]
    CancelSwap,
}

/// Message types of interchain swap packets.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterchainSwapMessageType {
    #[serde(rename = "TYPE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "TYPE_MSG_MAKE_POOL")]
    MakePool,
    #[serde(rename = "TYPE_MSG_TAKE_POOL")]
    TakePool,
    #[serde(rename = "TYPE_MSG_SINGLE_DEPOSIT")]
    SingleDeposit,
    #[serde(rename = "TYPE_MSG_MAKE_MULTI_DEPOSIT")]
    MakeMultiDeposit,
    #[serde(rename = "TYPE_MSG_CANCEL_MULTI_DEPOSIT")]
    CancelMultiDeposit,
    #[serde(rename = "TYPE_MSG_TAKE_MULTI_DEPOSIT")]
    TakeMultiDeposit,
    #[serde(rename = "TYPE_MSG_MULTI_WITHDRAW")]
    MultiWithdraw,
    #[serde(rename = "TYPE_MSG_SWAP")]
    Swap,
}

/// Packet data of the atomic swap application.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AtomicSwapPacketData {
    /// Kind of swap message carried in `data`.
    #[serde(rename = "type")]
    pub msg_type: AtomicSwapMessageType,
    /// Encoded swap message. Opaque to the router.
    #[serde(default)]
    pub data: String,
    /// Identifier of the swap order.
    pub order_id: String,
    /// Channel path of the order.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// Packet memo.
    #[serde(default)]
    pub memo: String,
}

/// Packet data of the interchain swap application.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InterchainSwapPacketData {
    /// Kind of swap message carried in `data`.
    #[serde(rename = "type")]
    pub msg_type: InterchainSwapMessageType,
    /// Encoded swap message. Opaque to the router.
    #[serde(default)]
    pub data: String,
    /// Pool state change produced by the message.
    /// Opaque to the router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_change: Option<serde_json::Value>,
    /// Packet memo.
    #[serde(default)]
    pub memo: String,
}

/// Packet data of any of the swap applications known to the router.
///
/// Swap packets carry no type tag on the wire, so [`SwapPayload::decode`]
/// attempts each format in turn, atomic swaps first.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SwapPayload {
    /// Atomic swap packet data.
    AtomicSwap(AtomicSwapPacketData),
    /// Interchain swap packet data.
    InterchainSwap(InterchainSwapPacketData),
}

impl SwapPayload {
    /// Decode the packet data of some swap packet.
    pub fn decode(data: &[u8]) -> Result<Self, RouterError> {
        let atomic_swap_err = match serde_json::from_slice(data) {
            Ok(data) => return Ok(Self::AtomicSwap(data)),
            Err(err) => err,
        };
        serde_json::from_slice(data)
            .map(Self::InterchainSwap)
            .map_err(|interchain_swap_err| {
                RouterError::UnknownPayload(format!(
                    "not an atomic swap packet ({atomic_swap_err}), \
                     nor an interchain swap packet ({interchain_swap_err})"
                ))
            })
    }

    /// Encode this payload as packet data, as accepted by
    /// [`SwapPayload::decode`]. Used by hosts building raw packets.
    pub fn encode(&self) -> Result<Vec<u8>, RouterError> {
        serde_json::to_vec(self).map_err(|err| {
            RouterError::Context(format!("Failed to encode {} packet data: {err}", self.kind()))
        })
    }

    /// Memo of the swap packet.
    pub fn memo(&self) -> &str {
        match self {
            Self::AtomicSwap(data) => &data.memo,
            Self::InterchainSwap(data) => &data.memo,
        }
    }

    /// Replace the memo of the swap packet.
    #[must_use]
    pub fn with_memo(self, memo: String) -> Self {
        match self {
            Self::AtomicSwap(data) => Self::AtomicSwap(AtomicSwapPacketData { memo, ..data }),
            Self::InterchainSwap(data) => {
                Self::InterchainSwap(InterchainSwapPacketData { memo, ..data })
            }
        }
    }

    /// Short label of the swap application this payload belongs to.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AtomicSwap(_) => "atomic-swap",
            Self::InterchainSwap(_) => "interchain-swap",
        }
    }
}
