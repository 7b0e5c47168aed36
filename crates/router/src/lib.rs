//! Rust implementation of the swap router IBC middleware.
//!
//! The router sits between core IBC and a swap application (atomic
//! swaps or interchain swaps). Packets whose memo carries a `forward`
//! directive are received by the wrapped application, then re-sent
//! towards the next hop. The acknowledgement of the original packet is
//! withheld until the forwarded packet is acknowledged or times out,
//! at which point it is proxied back to the previous hop.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod config;
mod dispatch;
mod error;
mod msg;
mod payload;
mod resolve;
mod shim;
mod state;
mod store;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use ibc_core_channel_types::acknowledgement::{
    Acknowledgement, AcknowledgementStatus, StatusValue as AckStatusValue,
};
use ibc_core_channel_types::error::PacketError;
use ibc_core_channel_types::packet::Packet;
use ibc_core_channel_types::timeout::{TimeoutHeight, TimeoutTimestamp};
use ibc_core_channel_types::Version;
use ibc_core_host_types::identifiers::{ChannelId, PortId, Sequence};
use ibc_core_router::module::Module as IbcCoreModule;
use ibc_core_router_types::event::{ModuleEvent, ModuleEventAttribute};
use ibc_core_router_types::module::{ModuleExtras, ModuleId};
use ibc_primitives::prelude::*;
use ibc_primitives::Signer;
use swap_router_core::store::Store;

#[doc(inline)]
pub use self::config::{
    ConfigError, RouterConfig, DEFAULT_FORWARD_RETRIES, DEFAULT_FORWARD_TIMEOUT,
    DEFAULT_REFUND_TIMEOUT,
};
#[doc(inline)]
pub use self::error::RouterError;
#[doc(inline)]
pub use self::msg::{Duration, ForwardMetadata, NextHop, PacketMetadata};
#[doc(inline)]
pub use self::payload::{
    AtomicSwapMessageType, AtomicSwapPacketData, InterchainSwapMessageType,
    InterchainSwapPacketData, SwapPayload,
};
#[doc(inline)]
pub use self::state::{RoutingPacket, RoutingPacketKey};
#[doc(inline)]
pub use self::store::InFlightStore;

#[derive(Debug, thiserror::Error)]
enum MiddlewareError {
    /// Error raised by the router.
    #[error(transparent)]
    Router(#[from] RouterError),
    /// Forward the call to the next middleware.
    #[error("call handed over to the next middleware")]
    ForwardToNextMiddleware,
}

/// Module name of the swap router.
const MODULE: &str = "swap-router-middleware";

/// Context data required by the [`SwapRouterMiddleware`].
///
/// This is implemented by the wrapped swap application, which
/// owns the channel keepers, the module store and the send
/// entrypoints of the swap protocols.
pub trait RouterContext {
    /// Error returned by fallible operations.
    type Error: fmt::Display;

    /// Send an atomic swap packet over `port/channel`, returning
    /// the [`Sequence`] of the sent packet.
    fn send_swap_packet(
        &mut self,
        port: &PortId,
        channel: &ChannelId,
        timeout_height: TimeoutHeight,
        timeout_timestamp: TimeoutTimestamp,
        data: AtomicSwapPacketData,
    ) -> Result<Sequence, Self::Error>;

    /// Send an interchain swap packet over `port/channel`, returning
    /// the [`Sequence`] of the sent packet.
    fn send_ibc_swap_packet(
        &mut self,
        port: &PortId,
        channel: &ChannelId,
        timeout_height: TimeoutHeight,
        timeout_timestamp: TimeoutTimestamp,
        data: InterchainSwapPacketData,
    ) -> Result<Sequence, Self::Error>;

    /// Send a raw packet through the ICS-04 channel handler.
    fn send_packet(
        &mut self,
        port: &PortId,
        channel: &ChannelId,
        timeout_height: TimeoutHeight,
        timeout_timestamp: TimeoutTimestamp,
        data: Vec<u8>,
    ) -> Result<Sequence, Self::Error>;

    /// Write the `acknowledgement` of a received `packet`, and emit events.
    fn write_acknowledgement(
        &mut self,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
    ) -> Result<(), Self::Error>;

    /// Return the application version negotiated on `port/channel`.
    fn get_app_version(&self, port: &PortId, channel: &ChannelId) -> Option<Version>;

    /// Look up the module bound to `port/channel`.
    fn lookup_module_by_channel(
        &self,
        port: &PortId,
        channel: &ChannelId,
    ) -> Result<ModuleId, Self::Error>;

    /// Given a timeout duration, return a [`TimeoutTimestamp`], to be
    /// applied to some hop.
    fn timeout_timestamp(
        &self,
        timeout_duration: dur::Duration,
    ) -> Result<TimeoutTimestamp, Self::Error>;

    /// Return a reference to the router's durable [`Store`].
    fn store(&self) -> &dyn Store;

    /// Return a mutable reference to the router's durable [`Store`].
    fn store_mut(&mut self) -> &mut dyn Store;

    /// Account that initiated the swap carried by `packet`.
    ///
    /// The swap message is opaque to the router, so by default
    /// no sender is recorded.
    fn original_sender(&self, _packet: &Packet, _payload: &SwapPayload) -> Signer {
        String::new().into()
    }

    /// Whether the wrapped application already processed `packet`,
    /// e.g. because some other middleware in the stack called into it.
    fn is_packet_processed(&self, _packet: &Packet) -> bool {
        false
    }

    /// Whether the funds of `packet` can no longer be refunded, due
    /// to some irreversible action that took place on this chain.
    fn is_packet_nonrefundable(&self, _packet: &Packet) -> bool {
        false
    }
}

/// Swap router entrypoint, which intercepts swap packets carrying
/// forward directives and forwards them to other chains.
#[derive(Debug)]
pub struct SwapRouterMiddleware<M> {
    next: M,
    config: RouterConfig,
}

impl<M> SwapRouterMiddleware<M> {
    /// Wrap an existing middleware in the router, with
    /// the default [`RouterConfig`].
    pub fn wrap(next: M) -> Self {
        Self {
            next,
            config: RouterConfig::default(),
        }
    }

    /// Wrap an existing middleware in the router, with
    /// a custom [`RouterConfig`].
    pub fn with_config(next: M, config: RouterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { next, config })
    }

    /// Return an immutable ref to the next middleware.
    pub fn next(&self) -> &M {
        &self.next
    }

    /// Return a mutable ref to the next middleware.
    pub fn next_mut(&mut self) -> &mut M {
        &mut self.next
    }

    /// Return the configuration of the router.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

#[inline]
#[allow(clippy::expect_used)]
fn new_error_ack(message: impl fmt::Display) -> AcknowledgementStatus {
    AcknowledgementStatus::error(
        // cannot fail: the module name prefix keeps
        // the message non-empty
        AckStatusValue::new(format!("{MODULE} error: {message}"))
            .expect("Acknowledgement error must not be empty"),
    )
}

#[inline]
fn new_packet_error(message: impl fmt::Display) -> Result<(), PacketError> {
    Err(PacketError::Other {
        description: format!("{MODULE} error: {message}"),
    })
}

fn join_module_extras(first: &mut ModuleExtras, mut second: ModuleExtras) {
    first.events.append(&mut second.events);
    first.log.append(&mut second.log);
}

#[inline]
fn event_attr<K, V>(key: K, value: V) -> ModuleEventAttribute
where
    K: Into<String>,
    V: Into<String>,
{
    ModuleEventAttribute {
        key: key.into(),
        value: value.into(),
    }
}

#[inline]
fn push_event_attr<K, V>(attributes: &mut Vec<ModuleEventAttribute>, key: K, value: V)
where
    K: Into<String>,
    V: Into<String>,
{
    attributes.push(event_attr(key, value));
}

#[inline]
fn emit_event_with_attrs(extras: &mut ModuleExtras, attributes: Vec<ModuleEventAttribute>) {
    extras.events.push(ModuleEvent {
        kind: MODULE.to_owned(),
        attributes,
    });
}
