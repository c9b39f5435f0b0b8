//! Configuration Module
//!
//! Cache settings with sensible defaults.

/// Default TTL applied when a fetch does not specify one.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Cache configuration parameters.
///
/// Built in code by the caller; nothing is read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for fetches without explicit TTL
    pub default_ttl: u64,
}

impl Config {
    /// Returns a copy with a different default TTL.
    pub fn with_default_ttl(mut self, secs: u64) -> Self {
        self.default_ttl = secs;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECS,
        }
    }
}
