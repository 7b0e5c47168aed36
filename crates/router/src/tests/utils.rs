use std::collections::HashSet;

use ibc_core_channel_types::channel::{Counterparty, Order};
use ibc_core_channel_types::error::ChannelError;
use ibc_core_host_types::identifiers::ConnectionId;
use ibc_primitives::Timestamp;
use swap_router_core::memory::MemoryStore;
use swap_router_core::BoxError;

use super::*;

pub mod addresses {
    pub const A: &str = "side1arndt";
    pub const C: &str = "side1copernicus";

    pub const RELAYER: &str = "RELAYER";
}

pub trait StrExt {
    fn signer(&self) -> Signer;
}

impl StrExt for str {
    fn signer(&self) -> Signer {
        self.to_string().into()
    }
}

// NOTE: Assume we have four chains: A, B, C and D. The tests will be set
// up as if we were chain B, forwarding a swap packet from A to C.
pub mod channels {
    // Outgoing channels from A.
    pub const AB: u64 = 0;

    // Outgoing channels from B.
    pub const BA: u64 = 1;
    pub const BC: u64 = 2;

    // Outgoing channels from C.
    pub const CB: u64 = 3;
    pub const CD: u64 = 4;
}

pub mod ports {
    pub const ATOMIC_SWAP: &str = "atomicswap";
    pub const INTERCHAIN_SWAP: &str = "interchainswap";
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    BeforeSendSwapPacket,
    AfterSendSwapPacket,
    NextMiddlewareOnTimeoutPacket,
    ReadStore,
    WriteStore,
    WriteAcknowledgement,
    LookupModule,
}

/// Acknowledgement returned by the swap application
/// when it receives a packet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecvAck {
    Success,
    Error,
    Nil,
}

#[derive(Debug, Default)]
pub struct MockStore {
    pub inner: MemoryStore,
    fail_reads: bool,
    fail_writes: bool,
}

impl Store for MockStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError> {
        if self.fail_reads {
            return Err(failure_injection_err_msg(FailurePoint::ReadStore).into());
        }
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<(), BoxError> {
        if self.fail_writes {
            return Err(failure_injection_err_msg(FailurePoint::WriteStore).into());
        }
        self.inner.write(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), BoxError> {
        if self.fail_writes {
            return Err(failure_injection_err_msg(FailurePoint::WriteStore).into());
        }
        self.inner.delete(key)
    }
}

/// Chain B, hosting the swap applications wrapped by the router.
#[derive(Debug)]
pub struct MockChain {
    failure_injections: HashSet<FailurePoint>,
    pub store: MockStore,
    pub recv_ack: RecvAck,
    pub processed: bool,
    pub nonrefundable: bool,
    pub sent_packets: Vec<Packet>,
    pub acks_written: Vec<(Packet, Acknowledgement)>,
    pub recv_calls: Vec<Packet>,
    pub ack_calls: Vec<(Packet, Acknowledgement)>,
    pub timeout_calls: Vec<Packet>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            failure_injections: HashSet::new(),
            store: MockStore::default(),
            recv_ack: RecvAck::Success,
            processed: false,
            nonrefundable: false,
            sent_packets: Vec::new(),
            acks_written: Vec::new(),
            recv_calls: Vec::new(),
            ack_calls: Vec::new(),
            timeout_calls: Vec::new(),
        }
    }

    fn check_failure_injection(&self, point: FailurePoint) -> Result<(), String> {
        if !self.failure_injections.contains(&point) {
            Ok(())
        } else {
            Err(failure_injection_err_msg(point))
        }
    }

    fn send(
        &mut self,
        port: &PortId,
        channel: &ChannelId,
        timeout_height: TimeoutHeight,
        timeout_timestamp: TimeoutTimestamp,
        data: Vec<u8>,
    ) -> Result<Sequence, String> {
        self.check_failure_injection(FailurePoint::BeforeSendSwapPacket)?;
        let seq = Sequence::from(self.sent_packets.len() as u64 + 1);
        self.sent_packets.push(Packet {
            data,
            seq_on_a: seq,
            port_id_on_a: port.clone(),
            chan_id_on_a: channel.clone(),
            port_id_on_b: port.clone(),
            chan_id_on_b: ChannelId::new(channels::CB),
            timeout_height_on_b: timeout_height,
            timeout_timestamp_on_b: timeout_timestamp,
        });
        self.check_failure_injection(FailurePoint::AfterSendSwapPacket)?;
        Ok(seq)
    }

    /// Last packet sent by chain B.
    #[track_caller]
    pub fn last_sent_packet(&self) -> Packet {
        self.sent_packets.last().cloned().unwrap()
    }

    pub fn routing_packet(&self, packet_sent: &Packet) -> Option<RoutingPacket> {
        self.store
            .inner
            .get_routing_packet(&RoutingPacketKey::from_sent_packet(packet_sent))
            .unwrap()
    }
}

impl IbcCoreModule for MockChain {
    fn on_recv_packet_execute(
        &mut self,
        packet: &Packet,
        _relayer: &Signer,
    ) -> (ModuleExtras, Option<Acknowledgement>) {
        self.recv_calls.push(packet.clone());

        let maybe_ack = match self.recv_ack {
            RecvAck::Success => Some(success_ack()),
            RecvAck::Error => Some(error_ack()),
            RecvAck::Nil => None,
        };

        (ModuleExtras::empty(), maybe_ack)
    }

    fn on_acknowledgement_packet_validate(
        &self,
        _packet: &Packet,
        _acknowledgement: &Acknowledgement,
        _relayer: &Signer,
    ) -> Result<(), PacketError> {
        Ok(())
    }

    fn on_acknowledgement_packet_execute(
        &mut self,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
        _relayer: &Signer,
    ) -> (ModuleExtras, Result<(), PacketError>) {
        self.ack_calls
            .push((packet.clone(), acknowledgement.clone()));
        (ModuleExtras::empty(), Ok(()))
    }

    fn on_timeout_packet_validate(
        &self,
        _packet: &Packet,
        _relayer: &Signer,
    ) -> Result<(), PacketError> {
        Ok(())
    }

    fn on_timeout_packet_execute(
        &mut self,
        packet: &Packet,
        _relayer: &Signer,
    ) -> (ModuleExtras, Result<(), PacketError>) {
        self.timeout_calls.push(packet.clone());

        let result = self
            .check_failure_injection(FailurePoint::NextMiddlewareOnTimeoutPacket)
            .map_err(|description| PacketError::Other { description });

        (ModuleExtras::empty(), result)
    }

    fn on_chan_open_init_validate(
        &self,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        version: &Version,
    ) -> Result<Version, ChannelError> {
        Ok(version.clone())
    }

    fn on_chan_open_init_execute(
        &mut self,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        Ok((ModuleExtras::empty(), version.clone()))
    }

    fn on_chan_open_try_validate(
        &self,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<Version, ChannelError> {
        Ok(counterparty_version.clone())
    }

    fn on_chan_open_try_execute(
        &mut self,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<(ModuleExtras, Version), ChannelError> {
        Ok((ModuleExtras::empty(), counterparty_version.clone()))
    }

    fn on_chan_open_ack_validate(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_version: &Version,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    fn on_chan_open_ack_execute(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_version: &Version,
    ) -> Result<ModuleExtras, ChannelError> {
        Ok(ModuleExtras::empty())
    }

    fn on_chan_open_confirm_validate(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    fn on_chan_open_confirm_execute(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<ModuleExtras, ChannelError> {
        Ok(ModuleExtras::empty())
    }

    fn on_chan_close_init_validate(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    fn on_chan_close_init_execute(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<ModuleExtras, ChannelError> {
        Ok(ModuleExtras::empty())
    }

    fn on_chan_close_confirm_validate(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    fn on_chan_close_confirm_execute(
        &mut self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<ModuleExtras, ChannelError> {
        Ok(ModuleExtras::empty())
    }
}

impl RouterContext for MockChain {
    type Error = String;

    fn send_swap_packet(
        &mut self,
        port: &PortId,
        channel: &ChannelId,
        timeout_height: TimeoutHeight,
        timeout_timestamp: TimeoutTimestamp,
        data: AtomicSwapPacketData,
    ) -> Result<Sequence, Self::Error> {
        let data = serde_json::to_vec(&data).map_err(|err| err.to_string())?;
        self.send(port, channel, timeout_height, timeout_timestamp, data)
    }

    fn send_ibc_swap_packet(
        &mut self,
        port: &PortId,
        channel: &ChannelId,
        timeout_height: TimeoutHeight,
        timeout_timestamp: TimeoutTimestamp,
        data: InterchainSwapPacketData,
    ) -> Result<Sequence, Self::Error> {
        let data = serde_json::to_vec(&data).map_err(|err| err.to_string())?;
        self.send(port, channel, timeout_height, timeout_timestamp, data)
    }

    fn send_packet(
        &mut self,
        port: &PortId,
        channel: &ChannelId,
        timeout_height: TimeoutHeight,
        timeout_timestamp: TimeoutTimestamp,
        data: Vec<u8>,
    ) -> Result<Sequence, Self::Error> {
        self.send(port, channel, timeout_height, timeout_timestamp, data)
    }

    fn write_acknowledgement(
        &mut self,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
    ) -> Result<(), Self::Error> {
        self.check_failure_injection(FailurePoint::WriteAcknowledgement)?;
        self.acks_written
            .push((packet.clone(), acknowledgement.clone()));
        Ok(())
    }

    fn get_app_version(&self, _port: &PortId, _channel: &ChannelId) -> Option<Version> {
        Some(Version::new("ics100-1".to_owned()))
    }

    fn lookup_module_by_channel(
        &self,
        port: &PortId,
        _channel: &ChannelId,
    ) -> Result<ModuleId, Self::Error> {
        self.check_failure_injection(FailurePoint::LookupModule)?;
        Ok(ModuleId::new(port.to_string()))
    }

    fn timeout_timestamp(
        &self,
        timeout_duration: dur::Duration,
    ) -> Result<TimeoutTimestamp, Self::Error> {
        let nanos: u64 = timeout_duration.as_nanos().try_into().map_err(|e| {
            format!("Could not convert duration {timeout_duration} to u64 nanos: {e}")
        })?;

        Ok(TimeoutTimestamp::At(Timestamp::from_nanoseconds(nanos)))
    }

    fn store(&self) -> &dyn Store {
        &self.store
    }

    fn store_mut(&mut self) -> &mut dyn Store {
        &mut self.store
    }

    fn original_sender(&self, _packet: &Packet, _payload: &SwapPayload) -> Signer {
        addresses::A.signer()
    }

    fn is_packet_processed(&self, _packet: &Packet) -> bool {
        self.processed
    }

    fn is_packet_nonrefundable(&self, _packet: &Packet) -> bool {
        self.nonrefundable
    }
}

impl SwapRouterMiddleware<MockChain> {
    pub fn inject_failure(&mut self, point: FailurePoint) {
        match point {
            FailurePoint::ReadStore => self.next.store.fail_reads = true,
            FailurePoint::WriteStore => self.next.store.fail_writes = true,
            _ => {
                self.next.failure_injections.insert(point);
            }
        }
    }

    pub fn clear_failures(&mut self) {
        self.next.store.fail_reads = false;
        self.next.store.fail_writes = false;
        self.next.failure_injections.clear();
    }
}

pub fn failure_injection_err_msg(point: FailurePoint) -> String {
    format!("Failure injection on {point:?}")
}

pub type DummyRouter = SwapRouterMiddleware<MockChain>;

pub fn get_dummy_router() -> DummyRouter {
    SwapRouterMiddleware::wrap(MockChain::new())
}

pub fn relayer() -> Signer {
    addresses::RELAYER.signer()
}

pub fn success_ack() -> Acknowledgement {
    Acknowledgement::try_from(br#"{"result":"AQ=="}"#.to_vec()).unwrap()
}

pub fn error_ack() -> Acknowledgement {
    Acknowledgement::try_from(br#"{"error":"oh no"}"#.to_vec()).unwrap()
}

pub fn fwd_memo(port: &str, channel: u64) -> String {
    format!(r#"{{"forward":{{"port":"{port}","channel":"channel-{channel}"}}}}"#)
}

pub fn get_dummy_atomic_swap_data(memo: String) -> SwapPayload {
    SwapPayload::AtomicSwap(AtomicSwapPacketData {
        msg_type: AtomicSwapMessageType::TakeSwap,
        data: "Zm9vYmFy".to_owned(),
        order_id: "order-1".to_owned(),
        path: String::new(),
        memo,
    })
}

pub fn get_dummy_interchain_swap_data(memo: String) -> SwapPayload {
    SwapPayload::InterchainSwap(InterchainSwapPacketData {
        msg_type: InterchainSwapMessageType::Swap,
        data: "YmF6".to_owned(),
        state_change: None,
        memo,
    })
}

/// Packet sent by chain A to chain B.
pub fn get_dummy_packet_with_payload(seq: u64, payload: &SwapPayload) -> Packet {
    let port: PortId = match payload {
        SwapPayload::AtomicSwap(_) => ports::ATOMIC_SWAP,
        SwapPayload::InterchainSwap(_) => ports::INTERCHAIN_SWAP,
    }
    .parse()
    .unwrap();

    Packet {
        data: payload.encode().unwrap(),
        seq_on_a: seq.into(),
        port_id_on_a: port.clone(),
        chan_id_on_a: ChannelId::new(channels::AB),
        port_id_on_b: port,
        chan_id_on_b: ChannelId::new(channels::BA),
        timeout_height_on_b: TimeoutHeight::Never,
        timeout_timestamp_on_b: TimeoutTimestamp::Never,
    }
}

/// Decode the ICS-04 envelope of an acknowledgement, as JSON.
pub fn ack_json(ack: &Acknowledgement) -> serde_json::Value {
    serde_json::from_slice(ack.as_bytes()).unwrap()
}

/// Key-value pairs of the attributes of some event.
pub fn event_pairs(event: &ModuleEvent) -> Vec<(String, String)> {
    event
        .attributes
        .iter()
        .map(|attr| (attr.key.clone(), attr.value.clone()))
        .collect()
}

pub fn pairs(attrs: &[(&str, &str)]) -> Vec<(String, String)> {
    attrs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}
