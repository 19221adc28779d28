use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine-wide settings, fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Smallest wager accepted by `create_game`, in base currency units.
    pub minimum_wager: u64,
    /// How long both parties have to reveal after a challenger joins.
    pub reveal_window: Duration,
    /// Buffered capacity of the `GameUpdate` broadcast channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            minimum_wager: 5_000_000_000_000_000,
            reveal_window: Duration::from_secs(24 * 60 * 60), // 24 hours
            event_capacity: 256,
        }
    }
}

impl EngineConfig {
    pub fn new(minimum_wager: u64) -> Self {
        Self {
            minimum_wager,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.minimum_wager == 0 {
            return Err(EngineError::config("minimum wager must be non-zero"));
        }
        if self.reveal_window.is_zero() {
            return Err(EngineError::config("reveal window must be non-zero"));
        }
        if self.event_capacity == 0 {
            return Err(EngineError::config("event capacity must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_minimum_wager_is_rejected() {
        let config = EngineConfig {
            minimum_wager: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }
}
