//! Storage of [`RoutingPacket`] records.

use alloc::format;
use alloc::string::ToString;

use swap_router_core::store::Store;

use crate::error::RouterError;
use crate::state::{RoutingPacket, RoutingPacketKey};

/// Point lookups of in-flight [`RoutingPacket`] records,
/// on top of any [`Store`].
///
/// Records are encoded as JSON, under the key
/// `"<channel>/<port>/<sequence>"` of the forwarded packet.
pub trait InFlightStore {
    /// Store a [`RoutingPacket`], replacing any
    /// record under the same key.
    fn put_routing_packet(
        &mut self,
        key: &RoutingPacketKey,
        routing_packet: &RoutingPacket,
    ) -> Result<(), RouterError>;

    /// Retrieve a [`RoutingPacket`] from storage.
    fn get_routing_packet(
        &self,
        key: &RoutingPacketKey,
    ) -> Result<Option<RoutingPacket>, RouterError>;

    /// Delete a [`RoutingPacket`] from storage.
    fn delete_routing_packet(&mut self, key: &RoutingPacketKey) -> Result<(), RouterError>;

    /// Check if a [`RoutingPacket`] is stored under `key`.
    fn has_routing_packet(&self, key: &RoutingPacketKey) -> Result<bool, RouterError>;
}

impl<S: Store + ?Sized> InFlightStore for S {
    fn put_routing_packet(
        &mut self,
        key: &RoutingPacketKey,
        routing_packet: &RoutingPacket,
    ) -> Result<(), RouterError> {
        let encoded = serde_json::to_vec(routing_packet).map_err(|err| {
            RouterError::Store(format!("Failed to encode routing packet {key}: {err}"))
        })?;

        self.write(&key.to_string(), &encoded).map_err(|err| {
            RouterError::Store(format!("Failed to write routing packet {key}: {err}"))
        })
    }

    fn get_routing_packet(
        &self,
        key: &RoutingPacketKey,
    ) -> Result<Option<RoutingPacket>, RouterError> {
        let Some(encoded) = self.read(&key.to_string()).map_err(|err| {
            RouterError::Store(format!("Failed to read routing packet {key}: {err}"))
        })?
        else {
            return Ok(None);
        };

        serde_json::from_slice(&encoded).map(Some).map_err(|err| {
            RouterError::Store(format!("Failed to decode routing packet {key}: {err}"))
        })
    }

    fn delete_routing_packet(&mut self, key: &RoutingPacketKey) -> Result<(), RouterError> {
        self.delete(&key.to_string()).map_err(|err| {
            RouterError::Store(format!("Failed to delete routing packet {key}: {err}"))
        })
    }

    fn has_routing_packet(&self, key: &RoutingPacketKey) -> Result<bool, RouterError> {
        self.has(&key.to_string()).map_err(|err| {
            RouterError::Store(format!("Failed to look up routing packet {key}: {err}"))
        })
    }
}
