//! Request timestamps for Bybit API authentication.
//!
//! Every signed request carries a millisecond timestamp which the server
//! checks against its own clock and the receive window. The same value is
//! folded into the signature and sent in `X-BAPI-TIMESTAMP`.

use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for providing request timestamps.
pub trait TimestampProvider: Send + Sync {
    /// Milliseconds since the UNIX epoch.
    fn now_millis(&self) -> u64;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock provider.
    pub fn new() -> Self {
        Self
    }
}

impl TimestampProvider for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Always returns the same timestamp.
///
/// Useful for reproducing a failed call or for signature test vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTimestamp(pub u64);

impl TimestampProvider for FixedTimestamp {
    fn now_millis(&self) -> u64 {
        self.0
    }
}
