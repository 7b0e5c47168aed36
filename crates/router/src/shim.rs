//! ICS-26 callbacks of the swap router.

use ibc_core_channel_types::channel::{Counterparty, Order};
use ibc_core_channel_types::error::ChannelError;
use ibc_core_host_types::identifiers::ConnectionId;

use super::*;

impl<M> SwapRouterMiddleware<M>
where
    M: RouterContext,
{
    /// Send a raw packet through the wrapped application.
    pub fn send_packet(
        &mut self,
        port: &PortId,
        channel: &ChannelId,
        timeout_height: TimeoutHeight,
        timeout_timestamp: TimeoutTimestamp,
        data: Vec<u8>,
    ) -> Result<Sequence, M::Error> {
        self.next
            .send_packet(port, channel, timeout_height, timeout_timestamp, data)
    }

    /// Write the acknowledgement of a received packet
    /// through the wrapped application.
    pub fn write_acknowledgement(
        &mut self,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
    ) -> Result<(), M::Error> {
        self.next.write_acknowledgement(packet, acknowledgement)
    }

    /// Return the application version of `port/channel`.
    pub fn get_app_version(&self, port: &PortId, channel: &ChannelId) -> Option<Version> {
        self.next.get_app_version(port, channel)
    }
}

impl<M> IbcCoreModule for SwapRouterMiddleware<M>
where
    M: IbcCoreModule + RouterContext,
{
    fn on_recv_packet_execute(
        &mut self,
        packet: &Packet,
        relayer: &Signer,
    ) -> (ModuleExtras, Option<Acknowledgement>) {
        let mut extras = ModuleExtras::empty();

        match self.on_recv_packet_execute_inner(&mut extras, packet, relayer) {
            Ok(maybe_ack) => (extras, maybe_ack),
            Err(MiddlewareError::ForwardToNextMiddleware) => {
                self.next.on_recv_packet_execute(packet, relayer)
            }
            Err(MiddlewareError::Router(err)) => {
                tracing::debug!(
                    sequence = packet.seq_on_a.value(),
                    port = %packet.port_id_on_b,
                    channel = %packet.chan_id_on_b,
                    error = %err,
                    "Rejecting swap packet"
                );
                (extras, Some(new_error_ack(err).into()))
            }
        }
    }

    fn on_acknowledgement_packet_validate(
        &self,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
        relayer: &Signer,
    ) -> Result<(), PacketError> {
        self.next
            .on_acknowledgement_packet_validate(packet, acknowledgement, relayer)
    }

    fn on_acknowledgement_packet_execute(
        &mut self,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
        relayer: &Signer,
    ) -> (ModuleExtras, Result<(), PacketError>) {
        let mut extras = ModuleExtras::empty();

        match self.on_acknowledgement_packet_execute_inner(&mut extras, packet, acknowledgement) {
            Ok(()) => (extras, Ok(())),
            Err(MiddlewareError::ForwardToNextMiddleware) => self
                .next
                .on_acknowledgement_packet_execute(packet, acknowledgement, relayer),
            Err(MiddlewareError::Router(err)) => (extras, new_packet_error(err)),
        }
    }

    fn on_timeout_packet_validate(
        &self,
        packet: &Packet,
        relayer: &Signer,
    ) -> Result<(), PacketError> {
        self.next.on_timeout_packet_validate(packet, relayer)
    }

    fn on_timeout_packet_execute(
        &mut self,
        packet: &Packet,
        relayer: &Signer,
    ) -> (ModuleExtras, Result<(), PacketError>) {
        let mut extras = ModuleExtras::empty();

        match self.on_timeout_packet_execute_inner(&mut extras, packet, relayer) {
            Ok(()) => (extras, Ok(())),
            Err(MiddlewareError::ForwardToNextMiddleware) => {
                self.next.on_timeout_packet_execute(packet, relayer)
            }
            Err(MiddlewareError::Router(err)) => (extras, new_packet_error(err)),
        }
    }

    // =========================================================================
    // the calls below are simply forwarded to the next middleware
    // =========================================================================

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_open_init_validate(
        &self,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        version: &Version,
    ) -> Result<Version, ChannelError> {
        self.next.on_chan_open_init_validate(
            order,
            connection_hops,
            port_id,
            channel_id,
            counterparty,
            version,
        )
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_open_init_execute(
        &mut self,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        self.next.on_chan_open_init_execute(
            order,
            connection_hops,
            port_id,
            channel_id,
            counterparty,
            version,
        )
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_open_try_validate(
        &self,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<Version, ChannelError> {
        self.next.on_chan_open_try_validate(
            order,
            connection_hops,
            port_id,
            channel_id,
            counterparty,
            counterparty_version,
        )
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_open_try_execute(
        &mut self,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        self.next.on_chan_open_try_execute(
            order,
            connection_hops,
            port_id,
            channel_id,
            counterparty,
            counterparty_version,
        )
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_open_ack_validate(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty_version: &Version,
    ) -> Result<(), ChannelError> {
        self.next
            .on_chan_open_ack_validate(port_id, channel_id, counterparty_version)
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_open_ack_execute(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty_version: &Version,
    ) -> Result<ModuleExtras, ChannelError> {
        self.next
            .on_chan_open_ack_execute(port_id, channel_id, counterparty_version)
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_open_confirm_validate(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), ChannelError> {
        self.next.on_chan_open_confirm_validate(port_id, channel_id)
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_open_confirm_execute(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<ModuleExtras, ChannelError> {
        self.next.on_chan_open_confirm_execute(port_id, channel_id)
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_close_init_validate(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), ChannelError> {
        self.next.on_chan_close_init_validate(port_id, channel_id)
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_close_init_execute(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<ModuleExtras, ChannelError> {
        self.next.on_chan_close_init_execute(port_id, channel_id)
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_close_confirm_validate(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), ChannelError> {
        self.next
            .on_chan_close_confirm_validate(port_id, channel_id)
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    fn on_chan_close_confirm_execute(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<ModuleExtras, ChannelError> {
        self.next.on_chan_close_confirm_execute(port_id, channel_id)
    }
}
