//! Resolution of swap packets received, acknowledged
//! or timed out by the router.

use core::ops::ControlFlow;

use either::{Left, Right};

use ibc_primitives::prelude::*;

use super::*;
use crate::dispatch::NewRoutingPacket;
use crate::msg::{ForwardMetadata, NextHop};
use crate::state::RoutingPacketKey;
use crate::store::InFlightStore;

/// Prefix of the success acknowledgement proxied in place of
/// a failure, when a swap can no longer be refunded.
const NONREFUNDABLE_ACK_PREFIX: &str = "packet forward failed after point of no return";

/// What to do with a forwarded packet that timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryOutcome {
    /// Send the packet once more.
    GoAhead,
    /// Give up on the packet, and acknowledge the
    /// previous hop with an error.
    MaxRetriesExceeded,
}

impl<M> SwapRouterMiddleware<M>
where
    M: IbcCoreModule + RouterContext,
{
    /// Run the receive callback of the wrapped application,
    /// breaking with its acknowledgement if it failed.
    fn receive_on_next(
        &mut self,
        extras: &mut ModuleExtras,
        packet: &Packet,
        relayer: &Signer,
    ) -> Result<ControlFlow<Acknowledgement>, MiddlewareError> {
        let maybe_ack = {
            let (next_extras, maybe_ack) = self.next.on_recv_packet_execute(packet, relayer);
            join_module_extras(extras, next_extras);
            maybe_ack
        };

        let Some(ack) = maybe_ack else {
            return Err(RouterError::Context(
                "Wrapped application returned no acknowledgement".to_owned(),
            )
            .into());
        };

        if decode_ack_status(&ack)?.is_successful() {
            Ok(ControlFlow::Continue(()))
        } else {
            Ok(ControlFlow::Break(ack))
        }
    }

    /// Write the acknowledgement of the packet received from the
    /// previous hop, once its forward has been resolved.
    pub(crate) fn write_acknowledgement_for_forwarded_packet(
        &mut self,
        routing_packet: &RoutingPacket,
        acknowledgement: &Acknowledgement,
        status: &AcknowledgementStatus,
    ) -> Result<(), MiddlewareError> {
        let module_id = self
            .next
            .lookup_module_by_channel(
                &routing_packet.refund_port_id,
                &routing_packet.refund_channel_id,
            )
            .map_err(|err| {
                RouterError::Context(format!(
                    "Could not retrieve module from port {}: {err}",
                    routing_packet.refund_port_id
                ))
            })?;

        let proxied_ack = proxied_acknowledgement(routing_packet, acknowledgement, status);

        self.next
            .write_acknowledgement(&routing_packet.into(), &proxied_ack)
            .map_err(|err| {
                RouterError::Context(format!(
                    "Failed to write acknowledgement of forwarded packet: {err}"
                ))
            })?;

        tracing::debug!(
            refund_key = %routing_packet.refund_key(),
            ?module_id,
            success = status.is_successful(),
            "Proxied acknowledgement to the previous hop"
        );

        Ok(())
    }

    pub(crate) fn timeout_should_retry(
        &self,
        packet: &Packet,
    ) -> Result<(RetryOutcome, RoutingPacket), MiddlewareError> {
        let routing_packet = self
            .next
            .store()
            .get_routing_packet(&RoutingPacketKey::from_sent_packet(packet))?
            .ok_or(MiddlewareError::ForwardToNextMiddleware)?;

        let outcome = if routing_packet.should_retry() {
            RetryOutcome::GoAhead
        } else {
            RetryOutcome::MaxRetriesExceeded
        };

        Ok((outcome, routing_packet))
    }

    /// Send a timed out packet once more, over the same
    /// port and channel, moving its record to the key of
    /// the new packet.
    pub(crate) fn retry_timeout(
        &mut self,
        extras: &mut ModuleExtras,
        packet: &Packet,
        routing_packet: RoutingPacket,
    ) -> Result<(), MiddlewareError> {
        let payload = SwapPayload::decode(&packet.data)?;

        let fwd_metadata = ForwardMetadata {
            receiver: None,
            port: packet.port_id_on_a.clone(),
            channel: packet.chan_id_on_a.clone(),
            timeout: Some(routing_packet.timeout.clone()),
            retries: None,
            next: {
                let memo = payload.memo();
                (!memo.is_empty()).then(|| NextHop::Memo(memo.to_owned()))
            },
        };

        let timed_out_key = RoutingPacketKey::from_sent_packet(packet);

        tracing::info!(
            key = %timed_out_key,
            retries_remaining = routing_packet.retries_remaining,
            "Retrying forwarded packet that timed out"
        );

        let sequence =
            self.forward_swap_packet(extras, Right(routing_packet), payload, fwd_metadata)?;

        if sequence != timed_out_key.sequence {
            self.next
                .store_mut()
                .delete_routing_packet(&timed_out_key)?;
        }

        Ok(())
    }

    pub(crate) fn on_recv_packet_execute_inner(
        &mut self,
        extras: &mut ModuleExtras,
        packet: &Packet,
        relayer: &Signer,
    ) -> Result<Option<Acknowledgement>, MiddlewareError> {
        let payload = SwapPayload::decode(&packet.data)?;

        let Some(fwd_metadata) = ForwardMetadata::from_memo(payload.memo())? else {
            tracing::debug!(
                sequence = packet.seq_on_a.value(),
                port = %packet.port_id_on_b,
                channel = %packet.chan_id_on_b,
                "Swap packet carries no forward directive"
            );
            return Err(MiddlewareError::ForwardToNextMiddleware);
        };

        tracing::debug!(
            sequence = packet.seq_on_a.value(),
            port = %packet.port_id_on_b,
            channel = %packet.chan_id_on_b,
            next_port = %fwd_metadata.port,
            next_channel = %fwd_metadata.channel,
            payload = payload.kind(),
            "Intercepted swap packet to forward"
        );

        if !self.next.is_packet_processed(packet) {
            if let ControlFlow::Break(ack) = self.receive_on_next(extras, packet, relayer)? {
                return Ok(Some(ack));
            }
        }

        let original_sender = self.next.original_sender(packet, &payload);
        let nonrefundable = self.next.is_packet_nonrefundable(packet);
        let timeout = fwd_metadata.timeout_or(self.config.forward_timeout());
        let retries = fwd_metadata.retries_or(self.config.retries_on_timeout);

        self.forward_swap_packet(
            extras,
            Left(NewRoutingPacket {
                src_packet: packet,
                original_sender,
                retries,
                timeout,
                nonrefundable,
            }),
            payload,
            fwd_metadata,
        )?;

        Ok(None)
    }

    pub(crate) fn on_acknowledgement_packet_execute_inner(
        &mut self,
        extras: &mut ModuleExtras,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
    ) -> Result<(), MiddlewareError> {
        let key = RoutingPacketKey::from_sent_packet(packet);

        let routing_packet = self
            .next
            .store()
            .get_routing_packet(&key)?
            .ok_or(MiddlewareError::ForwardToNextMiddleware)?;

        let status = decode_ack_status(acknowledgement)?;

        self.next.store_mut().delete_routing_packet(&key)?;

        self.write_acknowledgement_for_forwarded_packet(&routing_packet, acknowledgement, &status)?;

        emit_event_with_attrs(
            extras,
            vec![event_attr(
                "info",
                "Packet acknowledgement processed successfully",
            )],
        );

        Ok(())
    }

    pub(crate) fn on_timeout_packet_execute_inner(
        &mut self,
        extras: &mut ModuleExtras,
        packet: &Packet,
        relayer: &Signer,
    ) -> Result<(), MiddlewareError> {
        match self.timeout_should_retry(packet)? {
            (RetryOutcome::GoAhead, routing_packet) => {
                let (next_extras, result) = self.next.on_timeout_packet_execute(packet, relayer);

                join_module_extras(extras, next_extras);
                result.map_err(|err| {
                    RouterError::Context(format!(
                        "Failed to retry packet, while invoking \
                         on_timeout_packet_execute: {err}"
                    ))
                })?;

                self.retry_timeout(extras, packet, routing_packet)
            }
            (RetryOutcome::MaxRetriesExceeded, routing_packet) => {
                let key = RoutingPacketKey::from_sent_packet(packet);

                self.next.store_mut().delete_routing_packet(&key)?;

                let err = RouterError::RetriesExhausted {
                    port: routing_packet.refund_port_id.clone(),
                    channel: routing_packet.refund_channel_id.clone(),
                };
                tracing::error!(%key, error = %err, "Giving up on forwarded packet");

                let status = new_error_ack(err);
                self.write_acknowledgement_for_forwarded_packet(
                    &routing_packet,
                    &status.clone().into(),
                    &status,
                )?;

                emit_event_with_attrs(
                    extras,
                    vec![event_attr(
                        "info",
                        "Packet forward given up after max retries",
                    )],
                );

                Ok(())
            }
        }
    }
}

/// Decode the ICS-04 envelope of some acknowledgement.
pub(crate) fn decode_ack_status(
    acknowledgement: &Acknowledgement,
) -> Result<AcknowledgementStatus, RouterError> {
    serde_json::from_slice(acknowledgement.as_bytes())
        .map_err(|err| RouterError::InvalidAcknowledgement(err.to_string()))
}

/// Compute the acknowledgement written for the packet received
/// from the previous hop, given the `acknowledgement` of the
/// packet forwarded to the next hop.
///
/// Failures of swaps that can no longer be refunded are turned
/// into successes, so that no refund is attempted upstream.
#[allow(clippy::expect_used)]
pub(crate) fn proxied_acknowledgement(
    routing_packet: &RoutingPacket,
    acknowledgement: &Acknowledgement,
    status: &AcknowledgementStatus,
) -> Acknowledgement {
    if !routing_packet.nonrefundable || status.is_successful() {
        return acknowledgement.clone();
    }

    AcknowledgementStatus::success(
        // cannot fail: the prefix keeps the message non-empty
        AckStatusValue::new(format!("{NONREFUNDABLE_ACK_PREFIX}: {status}"))
            .expect("Acknowledgement result must not be empty"),
    )
    .into()
}
