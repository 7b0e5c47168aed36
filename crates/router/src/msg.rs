use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use ibc_core_host_types::identifiers::{ChannelId, PortId};
use ibc_primitives::Signer;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RouterError;

/// Top-level memo key holding a forward directive.
const FORWARD_KEY: &str = "forward";

/// Metadata included in swap packet memos.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct PacketMetadata {
    /// Swap router metadata.
    pub forward: ForwardMetadata,
}

/// Metadata included in swap packet memos,
/// related with the swap router.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct ForwardMetadata {
    /// Receiver account on the destination chain.
    #[serde(default, deserialize_with = "deserialize_non_empty_signer")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Signer>,
    /// Destination port of the next hop.
    #[serde(deserialize_with = "deserialize_from_str")]
    pub port: PortId,
    /// Destination channel of the next hop.
    #[serde(deserialize_with = "deserialize_from_str")]
    pub channel: ChannelId,
    /// Packet timeout duration.
    ///
    /// Formatted as regular time strings (e.g. `"1m20s"`),
    /// or nanoseconds (e.g. `12345`). Zero or negative values
    /// fall back to the configured forward timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    /// The number of retries before a packet is invalidated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u8>,
    /// Memo of the next hop, which may hold yet
    /// another forward directive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NextHop>,
}

/// Memo passed on to the next hop.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(untagged)]
pub enum NextHop {
    /// Memo given verbatim, as a string.
    Memo(String),
    /// Memo given as a JSON object, to be encoded as the
    /// memo string of the forwarded packet.
    Object(serde_json::Map<String, serde_json::Value>),
}

impl NextHop {
    /// Render the memo string of the forwarded packet.
    pub fn to_memo(&self) -> Result<String, RouterError> {
        match self {
            Self::Memo(memo) => Ok(memo.clone()),
            Self::Object(obj) => serde_json::to_string(obj).map_err(|err| {
                RouterError::MalformedDirective(format!("Failed to encode next memo: {err}"))
            }),
        }
    }
}

impl ForwardMetadata {
    /// Decode the forward directive held in some packet `memo`.
    ///
    /// Returns [`None`] if the memo is not a JSON object, or if its
    /// `forward` key is missing or `null`. Other top-level keys are
    /// ignored.
    pub fn from_memo(memo: &str) -> Result<Option<Self>, RouterError> {
        let Ok(json_obj_memo) =
            serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(memo)
        else {
            return Ok(None);
        };

        match json_obj_memo.get(FORWARD_KEY) {
            None | Some(serde_json::Value::Null) => return Ok(None),
            Some(_) => {}
        }

        serde_json::from_value(json_obj_memo.into())
            .map(|PacketMetadata { forward }| Some(forward))
            .map_err(|err| RouterError::MalformedDirective(err.to_string()))
    }

    /// Timeout of the forwarded packet, or `default` if none
    /// was given (or if a non-positive timeout was given).
    pub fn timeout_or(&self, default: dur::Duration) -> dur::Duration {
        match &self.timeout {
            Some(Duration(timeout)) if timeout.as_nanos() > 0 => timeout.clone(),
            _ => default,
        }
    }

    /// Retries of the forwarded packet, or `default` if none
    /// were given.
    pub fn retries_or(&self, default: u8) -> u8 {
        self.retries.unwrap_or(default)
    }

    /// Memo of the forwarded packet. Empty if there is no next hop.
    pub fn next_memo(&self) -> Result<String, RouterError> {
        self.next
            .as_ref()
            .map(NextHop::to_memo)
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

fn deserialize_non_empty_signer<'de, D>(deserializer: D) -> Result<Option<Signer>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if s.is_empty() => Err(serde::de::Error::custom(
            "IBC forward receiver cannot be empty",
        )),
        maybe_signer => Ok(maybe_signer.map(Signer::from)),
    }
}

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let s = String::deserialize(deserializer)?;
    T::from_str(&s).map_err(serde::de::Error::custom)
}

fn serialize_to_str<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: fmt::Display,
{
    serializer.serialize_str(&value.to_string())
}

#[doc(inline)]
pub use duration::Duration;

mod duration {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct StrDuration(
        #[serde(deserialize_with = "deserialize_from_str")]
        #[serde(serialize_with = "serialize_to_str")]
        dur::Duration,
    );

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(untagged)]
    enum AnyDuration {
        Str(StrDuration),
        Nanos(i64),
        F64(f64),
    }

    impl From<AnyDuration> for Duration {
        fn from(dur: AnyDuration) -> Self {
            match dur {
                AnyDuration::Str(StrDuration(dur)) => Self(dur),
                // NB: negative nanoseconds saturate to a zero duration
                AnyDuration::Nanos(nanos) => {
                    Self(dur::Duration::from_nanos(u128::try_from(nanos).unwrap_or(0)))
                }
                #[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
                AnyDuration::F64(nanos) => Self(dur::Duration::from_nanos(nanos as u128)),
            }
        }
    }

    /// Duration type whose serialization routines are compatible with
    /// the JSON forward directives found in swap packet memos.
    #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
    #[serde(from = "AnyDuration")]
    #[repr(transparent)]
    pub struct Duration(#[serde(serialize_with = "serialize_to_str")] pub dur::Duration);

    impl Duration {
        /// Wrap a [`dur::Duration`].
        pub const fn from_dur(dur: dur::Duration) -> Self {
            Self(dur)
        }
    }
}
