//! # Model Configuration
//!
//! Configuration structures for training a model and for drawing synthetic
//! sequences from it.

use crate::errors::{validate_order, LabelingResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest history order accepted by training.
pub const MAX_HISTORY_ORDER: usize = 8;

/// Configuration for supervised training
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainingConfig {
    /// Number of history orders to estimate transition tables for (`1..=history_order`)
    pub history_order: usize,
    /// Order whose transition table drives scoring, decoding and sampling
    pub active_order: usize,
    /// Cap on the number of `(label, emission)` pairs handed to the fallback model
    pub fallback_training_limit: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            history_order: 2,
            active_order: 1,
            fallback_training_limit: None,
        }
    }
}

impl TrainingConfig {
    /// Plain first-order model: one transition table, used for decoding
    pub fn first_order() -> Self {
        Self {
            history_order: 1,
            ..Self::default()
        }
    }

    /// Estimate tables for orders `1..=order` and decode with the highest one
    pub fn with_history_order(order: usize) -> Self {
        Self {
            history_order: order,
            active_order: order,
            fallback_training_limit: None,
        }
    }

    /// Select the order used for scoring, decoding and sampling
    pub fn active_order(mut self, order: usize) -> Self {
        self.active_order = order;
        self
    }

    /// Limit the pairs used to train the fallback model
    pub fn fallback_training_limit(mut self, limit: usize) -> Self {
        self.fallback_training_limit = Some(limit);
        self
    }

    /// Check the orders are consistent
    pub fn validate(&self) -> LabelingResult<()> {
        validate_order(self.history_order, 1, MAX_HISTORY_ORDER, "history_order")?;
        validate_order(self.active_order, 1, self.history_order, "active_order")
    }
}

/// Configuration for stochastic sequence generation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplingConfig {
    /// Transitions walked before the first yielded pair when no start label is given
    pub burn_in_steps: usize,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            burn_in_steps: 1000,
            seed: None,
        }
    }
}

impl SamplingConfig {
    /// Default burn-in with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LabelingError;

    #[test]
    fn test_default_trains_two_orders_decodes_first() {
        let config = TrainingConfig::default();
        assert_eq!(config.history_order, 2);
        assert_eq!(config.active_order, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_active_order_above_history_order_is_rejected() {
        let config = TrainingConfig::first_order().active_order(2);
        assert!(matches!(
            config.validate(),
            Err(LabelingError::InvalidParameter { ref parameter, value: 2, .. }) if parameter == "active_order"
        ));
    }

    #[test]
    fn test_zero_history_order_is_rejected() {
        let config = TrainingConfig {
            history_order: 0,
            active_order: 0,
            fallback_training_limit: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sampling_defaults() {
        let config = SamplingConfig::seeded(7);
        assert_eq!(config.burn_in_steps, 1000);
        assert_eq!(config.seed, Some(7));
    }
}
