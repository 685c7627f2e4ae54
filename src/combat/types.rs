use serde::{Deserialize, Serialize};

use crate::items::types::effective_power;

/// A combatant snapshot: the hero or one enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleUnit {
    pub name: String,
    pub hp: u64,
    pub max_hp: u64,
    pub damage: u64,
    #[serde(default)]
    pub is_boss: bool,
}

impl BattleUnit {
    pub fn new(name: impl Into<String>, max_hp: u64, damage: u64) -> Self {
        Self {
            name: name.into(),
            hp: max_hp,
            max_hp,
            damage,
            is_boss: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Applies damage and returns the hp left.
    pub fn take_damage(&mut self, amount: u64) -> u64 {
        self.hp = self.hp.saturating_sub(amount);
        self.hp
    }

    /// Effective power at full health.
    pub fn power(&self) -> u64 {
        effective_power(self.max_hp, self.damage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLogEntry {
    pub turn: u32,
    pub attacker: String,
    pub target: String,
    pub damage: u64,
    pub target_hp_after: u64,
}

/// In-progress battle. Created per fight and dropped once its result is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleState {
    pub hero: BattleUnit,
    pub enemies: Vec<BattleUnit>,
    pub current_turn: u32,
    pub is_complete: bool,
    pub victory: bool,
    /// Closed by the round cap rather than by a side falling.
    pub timed_out: bool,
    pub log: Vec<BattleLogEntry>,
}

impl BattleState {
    pub fn all_enemies_dead(&self) -> bool {
        self.enemies.iter().all(|enemy| !enemy.is_alive())
    }

    pub fn enemies_defeated(&self) -> u32 {
        self.enemies.iter().filter(|enemy| !enemy.is_alive()).count() as u32
    }
}

/// Outcome of a finished battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub victory: bool,
    pub hero_hp_remaining: u64,
    pub hero_damage_taken: u64,
    pub enemies_defeated: u32,
    /// Per-enemy gold; credited only on victory.
    pub gold_reward: u64,
    pub rounds: u32,
    pub timed_out: bool,
    pub log: Vec<BattleLogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_damage_saturates() {
        let mut unit = BattleUnit::new("Rat", 10, 2);
        assert_eq!(unit.take_damage(4), 6);
        assert_eq!(unit.take_damage(100), 0);
        assert!(!unit.is_alive());
    }

    #[test]
    fn test_unit_power() {
        let unit = BattleUnit::new("Wolf", 60, 10);
        assert_eq!(unit.power(), 100);
    }
}
