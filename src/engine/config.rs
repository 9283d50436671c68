//! Tunables for a [`super::protocol::ProtocolEngine`] instance, overriding
//! the protocol-wide defaults in [`crate::constants`].

use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// How long a single round of `Broadcaster` calls is allowed to take
    /// before the engine gives up waiting on peers.
    pub coms_timeout: Duration,
    /// `threshold = ceil(threshold_factor * (peer_count + 1))`.
    pub threshold_factor: f64,
    /// Cap, in UTF-8 bytes, on a normalized decryption condition.
    pub max_decryption_condition_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            coms_timeout: Duration::from_secs(crate::constants::DEFAULT_COMS_TIMEOUT_SECS),
            threshold_factor: crate::constants::THRESHOLD_FACTOR,
            max_decryption_condition_bytes: crate::constants::MAX_DECRYPTION_CONDITION_BYTES,
        }
    }
}
