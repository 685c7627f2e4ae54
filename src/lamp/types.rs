use serde::{Deserialize, Serialize};

use crate::items::types::Rarity;

/// Player lamp state.
///
/// `current_rarity_multiplier` is the smoothed value enemy power scales with.
/// `base_rarity_multiplier` is its snapshot at the last level-up or reset, the
/// anchor convergence is measured from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lamp {
    pub level: u32,
    /// Missing in older saves; `GameState::migrate` resets non-positive values to 1.0.
    #[serde(default)]
    pub current_rarity_multiplier: f64,
    #[serde(default)]
    pub base_rarity_multiplier: f64,
}

impl Lamp {
    pub fn new() -> Self {
        Self {
            level: 1,
            current_rarity_multiplier: 1.0,
            base_rarity_multiplier: 1.0,
        }
    }

    /// Raises the level by one. The smoothed multiplier carries over as the new
    /// anchor, so the level-up causes no jump in enemy power.
    pub fn upgrade(&mut self) {
        self.level += 1;
        self.base_rarity_multiplier = self.current_rarity_multiplier;
    }

    /// Back to level 1 with neutral multipliers.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Fraction of the way from the anchor to `target`, in `[0, 1]`.
    pub fn convergence(&self, target: f64) -> f64 {
        let span = target - self.base_rarity_multiplier;
        if span <= f64::EPSILON {
            return 1.0;
        }
        ((self.current_rarity_multiplier - self.base_rarity_multiplier) / span).clamp(0.0, 1.0)
    }
}

impl Default for Lamp {
    fn default() -> Self {
        Self::new()
    }
}

/// Best tier the coupon-collector model expects to fill a slot, with the
/// inputs the guaranteed-rarity interval is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuaranteedRarity {
    pub rarity: Rarity,
    pub expected_filled: f64,
    pub total_drops: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_keeps_current_as_anchor() {
        let mut lamp = Lamp::new();
        lamp.current_rarity_multiplier = 1.3;
        lamp.upgrade();
        assert_eq!(lamp.level, 2);
        assert_eq!(lamp.current_rarity_multiplier, 1.3);
        assert_eq!(lamp.base_rarity_multiplier, 1.3);
    }

    #[test]
    fn test_reset() {
        let mut lamp = Lamp {
            level: 9,
            current_rarity_multiplier: 2.0,
            base_rarity_multiplier: 1.5,
        };
        lamp.reset();
        assert_eq!(lamp, Lamp::new());
    }

    #[test]
    fn test_convergence() {
        let lamp = Lamp {
            level: 3,
            current_rarity_multiplier: 1.5,
            base_rarity_multiplier: 1.0,
        };
        assert!((lamp.convergence(2.0) - 0.5).abs() < 1e-9);
        assert_eq!(lamp.convergence(1.0), 1.0);
    }

    #[test]
    fn test_old_save_without_multipliers() {
        let lamp: Lamp = serde_json::from_str(r#"{"level":4}"#).unwrap();
        assert_eq!(lamp.level, 4);
        assert_eq!(lamp.current_rarity_multiplier, 0.0);
    }
}
