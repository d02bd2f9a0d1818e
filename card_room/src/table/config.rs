//! Table configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::entities::{Blinds, Chips, DEFAULT_BIG_BLIND, DEFAULT_SMALL_BLIND};

/// Configuration for one table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableConfig {
    /// Table name, for logs and display.
    pub name: String,

    /// Small blind amount.
    pub small_blind: Chips,

    /// Big blind amount.
    pub big_blind: Chips,

    /// Minimum buy-in in big blinds.
    pub min_buy_in_bb: u8,

    /// Maximum buy-in in big blinds.
    pub max_buy_in_bb: u8,

    /// Pause between a betting round completing and the next street being
    /// shown, in milliseconds. Presentation pacing only; the state is
    /// fully applied before the pause begins.
    pub pacing_ms: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Main Table".to_string(),
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            min_buy_in_bb: 10,
            max_buy_in_bb: 100,
            pacing_ms: 500,
        }
    }
}

impl TableConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.big_blind <= self.small_blind {
            return Err("Big blind must be greater than small blind".to_string());
        }
        if self.max_buy_in_bb <= self.min_buy_in_bb {
            return Err("Max buy-in must be greater than min buy-in".to_string());
        }
        if self.big_blind == 0 {
            return Err("Big blind must be nonzero".to_string());
        }
        Ok(())
    }

    #[must_use]
    pub fn blinds(&self) -> Blinds {
        Blinds {
            small: self.small_blind,
            big: self.big_blind,
        }
    }

    /// Get minimum buy-in in chips.
    #[must_use]
    pub fn min_buy_in_chips(&self) -> Chips {
        self.big_blind * Chips::from(self.min_buy_in_bb)
    }

    /// Get maximum buy-in in chips.
    #[must_use]
    pub fn max_buy_in_chips(&self) -> Chips {
        self.big_blind * Chips::from(self.max_buy_in_bb)
    }

    #[must_use]
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TableConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_buy_in_chips(), 200);
        assert_eq!(config.max_buy_in_chips(), 2000);
    }

    #[test]
    fn test_validate_rejects_inverted_blinds() {
        let config = TableConfig {
            small_blind: 20,
            big_blind: 10,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_buy_ins() {
        let config = TableConfig {
            min_buy_in_bb: 100,
            max_buy_in_bb: 20,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
