//! Errors raised while routing swap packets.

use alloc::string::String;

use ibc_core_host_types::identifiers::{ChannelId, PortId};

/// Errors raised by the swap router.
///
/// None of these halt the chain. On the receive path they become an
/// error acknowledgement of the inbound packet, and on the acknowledgement
/// and timeout paths they are returned as a packet error.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The packet memo holds a `forward` key, but its
    /// value is not a valid forward directive.
    #[error("error parsing forward metadata: {0}")]
    MalformedDirective(String),
    /// The forwarded packet could not be submitted to
    /// the next hop.
    #[error("insufficient resources to forward packet: {0}")]
    InsufficientResources(String),
    /// A forwarded packet timed out with no retries left.
    #[error("giving up on packet on channel ({channel}) port ({port}) after max retries")]
    RetriesExhausted {
        /// Port where the original packet was received.
        port: PortId,
        /// Channel where the original packet was received.
        channel: ChannelId,
    },
    /// Reading or writing an in-flight packet failed.
    #[error("in-flight packet store error: {0}")]
    Store(String),
    /// An acknowledgement could not be decoded.
    #[error("cannot unmarshal packet acknowledgement: {0}")]
    InvalidAcknowledgement(String),
    /// The packet data is neither an atomic swap nor
    /// an interchain swap packet.
    #[error("unrecognized swap packet data: {0}")]
    UnknownPayload(String),
    /// Some call into the host context failed.
    #[error("{0}")]
    Context(String),
}
