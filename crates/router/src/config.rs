//! Configuration of the swap router.

use serde::{Deserialize, Serialize};

use crate::msg::Duration;

/// Default number of retries of a forwarded packet
/// that timed out.
pub const DEFAULT_FORWARD_RETRIES: u8 = 3;

/// Default timeout of forwarded packets, matching the
/// relative packet timeout of the atomic swap application.
pub const DEFAULT_FORWARD_TIMEOUT: dur::Duration = dur::Duration::from_secs(10 * 60);

/// Default window within which a refund can take place.
pub const DEFAULT_REFUND_TIMEOUT: dur::Duration = dur::Duration::from_secs(28 * 24 * 60 * 60);

/// Error returned when validating a [`RouterConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The forward timeout is zero.
    #[error("forward timeout must be greater than zero")]
    ZeroForwardTimeout,
    /// The refund timeout is zero.
    #[error("refund timeout must be greater than zero")]
    ZeroRefundTimeout,
}

/// Module-level configuration of the swap router.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RouterConfig {
    /// Retries of forwarded packets whose directive
    /// does not specify any.
    pub retries_on_timeout: u8,
    /// Timeout of forwarded packets whose directive does
    /// not specify a positive one.
    pub forward_timeout: Duration,
    /// Window within which a refund can take place.
    ///
    /// Reserved for hosts that schedule refunds. The router
    /// itself never reads it.
    pub refund_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            retries_on_timeout: DEFAULT_FORWARD_RETRIES,
            forward_timeout: Duration::from_dur(DEFAULT_FORWARD_TIMEOUT),
            refund_timeout: Duration::from_dur(DEFAULT_REFUND_TIMEOUT),
        }
    }
}

impl RouterConfig {
    /// Check that this configuration can be used by the router.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.forward_timeout.0.as_nanos() == 0 {
            return Err(ConfigError::ZeroForwardTimeout);
        }
        if self.refund_timeout.0.as_nanos() == 0 {
            return Err(ConfigError::ZeroRefundTimeout);
        }
        Ok(())
    }

    /// Timeout of forwarded packets, absent an override.
    pub fn forward_timeout(&self) -> dur::Duration {
        self.forward_timeout.0.clone()
    }

    /// Refund window. Not read by the router.
    pub fn refund_timeout(&self) -> dur::Duration {
        self.refund_timeout.0.clone()
    }
}
