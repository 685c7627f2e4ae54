//! Errors raised while loading game data or validating balance configuration.

use thiserror::Error;

use crate::items::types::{Rarity, Slot};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("rarity multipliers must increase: {higher:?} ({higher_value}) is not above {lower:?} ({lower_value})")]
    RarityOrder {
        lower: Rarity,
        lower_value: f64,
        higher: Rarity,
        higher_value: f64,
    },

    #[error("slot {slot:?} stat ratios sum to {sum}, expected 1.0")]
    SlotRatios { slot: Slot, sum: f64 },

    #[error("table {0} is empty")]
    EmptyTable(&'static str),

    #[error("table {table} row {row}: {reason}")]
    BadRow {
        table: &'static str,
        row: usize,
        reason: String,
    },

    #[error("unknown feature flag: {0}")]
    UnknownFeature(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConfigError::InvalidValue {
            field: "power_variance",
            reason: "must be in [0, 1)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for power_variance: must be in [0, 1)"
        );

        let err = ConfigError::SlotRatios {
            slot: Slot::Weapon,
            sum: 0.9,
        };
        assert!(err.to_string().contains("Weapon"));
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: ConfigError = parse.unwrap_err().into();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
