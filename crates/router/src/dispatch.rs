//! Sending of swap packets to the next hop.

use either::Either;

use ibc_primitives::prelude::*;

use super::*;
use crate::msg::ForwardMetadata;
use crate::state::RoutingPacketKey;
use crate::store::InFlightStore;

/// Data required to start tracking a packet received from
/// the previous hop, that is forwarded for the first time.
pub(crate) struct NewRoutingPacket<'pkt> {
    /// Packet received from the previous hop.
    pub src_packet: &'pkt Packet,
    /// Account that initiated the swap.
    pub original_sender: Signer,
    /// Retries allowed before giving up on the forward.
    pub retries: u8,
    /// Timeout of the forwarded packet, and of its retries.
    pub timeout: dur::Duration,
    /// Whether the swap can no longer be refunded.
    pub nonrefundable: bool,
}

/// Existing record of a forward that timed out and
/// is sent once more.
pub(crate) type RetryRoutingPacket = RoutingPacket;

impl<M> SwapRouterMiddleware<M>
where
    M: IbcCoreModule + RouterContext,
{
    /// Send `payload` to the hop described by `fwd_metadata`, and
    /// track the sent packet until it is acknowledged or times out.
    ///
    /// The routing record is only written after the packet is sent.
    pub(crate) fn forward_swap_packet(
        &mut self,
        extras: &mut ModuleExtras,
        packet: Either<NewRoutingPacket<'_>, RetryRoutingPacket>,
        payload: SwapPayload,
        fwd_metadata: ForwardMetadata,
    ) -> Result<Sequence, MiddlewareError> {
        let timeout = match &packet {
            Either::Left(new_packet) => new_packet.timeout.clone(),
            Either::Right(routing_packet) => routing_packet.timeout.0.clone(),
        };

        emit_event_with_attrs(extras, {
            let mut attributes = Vec::with_capacity(6);

            push_event_attr(&mut attributes, "is-retry", packet.is_right().to_string());
            push_event_attr(&mut attributes, "payload", payload.kind());
            push_event_attr(
                &mut attributes,
                "sender",
                packet
                    .as_ref()
                    .either(
                        |new_packet| &new_packet.original_sender,
                        |routing_packet| &routing_packet.original_sender_address,
                    )
                    .to_string(),
            );
            push_event_attr(
                &mut attributes,
                "receiver",
                fwd_metadata
                    .receiver
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            );
            push_event_attr(&mut attributes, "port", fwd_metadata.port.to_string());
            push_event_attr(&mut attributes, "channel", fwd_metadata.channel.to_string());

            attributes
        });

        let payload = payload.with_memo(fwd_metadata.next_memo()?);
        let payload_kind = payload.kind();

        let timeout_timestamp = self.next.timeout_timestamp(timeout).map_err(|err| {
            RouterError::Context(format!(
                "Failed to get timeout timestamp of forwarded packet: {err}"
            ))
        })?;

        let sent = match payload {
            SwapPayload::AtomicSwap(data) => self.next.send_swap_packet(
                &fwd_metadata.port,
                &fwd_metadata.channel,
                TimeoutHeight::Never,
                timeout_timestamp,
                data,
            ),
            SwapPayload::InterchainSwap(data) => self.next.send_ibc_swap_packet(
                &fwd_metadata.port,
                &fwd_metadata.channel,
                TimeoutHeight::Never,
                timeout_timestamp,
                data,
            ),
        };

        let sequence = sent.map_err(|err| {
            tracing::error!(
                port = %fwd_metadata.port,
                channel = %fwd_metadata.channel,
                payload = payload_kind,
                error = %err,
                "Failed to send forwarded packet"
            );
            RouterError::InsufficientResources(err.to_string())
        })?;

        let key = RoutingPacketKey {
            channel: fwd_metadata.channel,
            port: fwd_metadata.port,
            sequence,
        };
        let routing_packet = next_routing_packet(packet);

        self.next
            .store_mut()
            .put_routing_packet(&key, &routing_packet)?;

        tracing::debug!(
            %key,
            retries_remaining = routing_packet.retries_remaining,
            "Stored routing packet"
        );

        emit_event_with_attrs(
            extras,
            vec![event_attr(
                "info",
                "Packet has been successfully forwarded",
            )],
        );

        Ok(sequence)
    }
}

/// Compute the record tracking the next forward of a packet.
///
/// First forwards start off with the retries of their directive,
/// while each retry takes one off the existing record.
pub(crate) fn next_routing_packet(
    packet: Either<NewRoutingPacket<'_>, RetryRoutingPacket>,
) -> RoutingPacket {
    packet.either(
        |NewRoutingPacket {
             src_packet,
             original_sender,
             retries,
             timeout,
             nonrefundable,
         }| RoutingPacket {
            packet_data: src_packet.data.clone(),
            original_sender_address: original_sender,
            refund_channel_id: src_packet.chan_id_on_b.clone(),
            refund_port_id: src_packet.port_id_on_b.clone(),
            refund_sequence: src_packet.seq_on_a,
            packet_src_port_id: src_packet.port_id_on_a.clone(),
            packet_src_channel_id: src_packet.chan_id_on_a.clone(),
            packet_timeout_height: src_packet.timeout_height_on_b,
            packet_timeout_timestamp: src_packet.timeout_timestamp_on_b,
            retries_remaining: i32::from(retries),
            timeout: Duration::from_dur(timeout),
            nonrefundable,
        },
        RoutingPacket::retried,
    )
}
