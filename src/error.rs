//! Typed errors raised at the configuration boundary of the core.

use thiserror::Error;

/// Invalid configuration handed to the generator, estimator or allocator.
///
/// This is the only error class the analytical core propagates; data-quality
/// problems inside a campaign are absorbed by omitting that campaign.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("days must be greater than zero")]
    NonPositiveDays,

    #[error("campaign_count must be greater than zero")]
    NonPositiveCampaignCount,

    #[error("shift_fraction must lie strictly between 0 and 1, got {0}")]
    ShiftFractionOutOfRange(f64),

    #[error("holdout_fraction must lie strictly between 0 and 1, got {0}")]
    HoldoutFractionOutOfRange(f64),

    #[error("min_observations must be at least 2, got {0}")]
    MinObservationsTooSmall(usize),

    #[error("policy shares must lie in [0, 1] and sum to at most 1, got increase={increase} decrease={decrease}")]
    InvalidPolicyShares { increase: f64, decrease: f64 },

    #[error("could not parse {key}={value}: {reason}")]
    Unparseable {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
