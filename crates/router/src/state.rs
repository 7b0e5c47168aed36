use alloc::vec::Vec;
use core::fmt;

use ibc_core_channel_types::packet::Packet;
use ibc_core_channel_types::timeout::{TimeoutHeight, TimeoutTimestamp};
use ibc_core_host_types::identifiers::{ChannelId, PortId, Sequence};
use ibc_primitives::Signer;
use serde::{Deserialize, Serialize};

use crate::msg::Duration;

/// Key of a [`RoutingPacket`] in the module store.
///
/// Identifies the packet sent by the router to the next
/// hop, not the packet received from the previous hop.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Hash, Clone)]
pub struct RoutingPacketKey {
    /// Channel the forwarded packet was sent over.
    pub channel: ChannelId,
    /// Port the forwarded packet was sent from.
    pub port: PortId,
    /// Sequence number of the forwarded packet.
    pub sequence: Sequence,
}

impl RoutingPacketKey {
    /// Key of the record tracking `packet`, a packet
    /// sent by this chain.
    pub fn from_sent_packet(packet: &Packet) -> Self {
        Self {
            channel: packet.chan_id_on_a.clone(),
            port: packet.port_id_on_a.clone(),
            sequence: packet.seq_on_a,
        }
    }
}

impl fmt::Display for RoutingPacketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.channel,
            self.port,
            self.sequence.value()
        )
    }
}

/// Packet that is currently being forwarded to
/// a destination chain over multiple hops.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Hash, Clone)]
pub struct RoutingPacket {
    /// Data of the packet received from the previous hop.
    pub packet_data: Vec<u8>,
    /// Account that initiated the swap on the source chain.
    pub original_sender_address: Signer,
    /// Channel where the packet was received in the
    /// current chain.
    pub refund_channel_id: ChannelId,
    /// Port where the packet was received in the
    /// current chain.
    pub refund_port_id: PortId,
    /// Sequence number of the packet received from
    /// the previous hop.
    pub refund_sequence: Sequence,
    /// Port on the sending chain.
    pub packet_src_port_id: PortId,
    /// Channel on the sending chain.
    pub packet_src_channel_id: ChannelId,
    /// Timeout height of the received packet.
    pub packet_timeout_height: TimeoutHeight,
    /// Timeout timestamp of the received packet.
    pub packet_timeout_timestamp: TimeoutTimestamp,
    /// Number of retries remaining before the
    /// packet is given up on.
    pub retries_remaining: i32,
    /// Timeout duration of retried packets, relative
    /// to some instant (usually a block timestamp).
    pub timeout: Duration,
    /// Whether the swap can no longer be refunded
    /// on this chain.
    pub nonrefundable: bool,
}

impl RoutingPacket {
    /// Whether a timed out forward may be sent again.
    pub const fn should_retry(&self) -> bool {
        self.retries_remaining > 0
    }

    /// Record tracking the retry of this packet.
    #[must_use]
    pub fn retried(self) -> Self {
        Self {
            retries_remaining: self.retries_remaining.saturating_sub(1),
            ..self
        }
    }

    /// Key under which the received packet would be
    /// acknowledged on this chain.
    pub fn refund_key(&self) -> RoutingPacketKey {
        RoutingPacketKey {
            channel: self.refund_channel_id.clone(),
            port: self.refund_port_id.clone(),
            sequence: self.refund_sequence,
        }
    }
}

impl From<&RoutingPacket> for Packet {
    fn from(routing_packet: &RoutingPacket) -> Self {
        Self {
            seq_on_a: routing_packet.refund_sequence,
            port_id_on_a: routing_packet.packet_src_port_id.clone(),
            chan_id_on_a: routing_packet.packet_src_channel_id.clone(),
            port_id_on_b: routing_packet.refund_port_id.clone(),
            chan_id_on_b: routing_packet.refund_channel_id.clone(),
            data: routing_packet.packet_data.clone(),
            timeout_height_on_b: routing_packet.packet_timeout_height,
            timeout_timestamp_on_b: routing_packet.packet_timeout_timestamp,
        }
    }
}
