use serde::{Deserialize, Serialize};

use crate::combat::types::BattleUnit;
use crate::core::constants::{
    HERO_BASE_DAMAGE, HERO_BASE_HP, HERO_DAMAGE_PER_LEVEL, HERO_HP_PER_LEVEL, HERO_NAME,
    STARTING_LAMPS,
};
use crate::core::data::GameData;
use crate::items::equipment::Equipment;
use crate::items::types::{effective_power, Item};

/// The player's hero.
///
/// `max_hp` and `damage` are derived from level and equipment; call
/// [`Hero::recalculate_stats`] after changing either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    /// 0 only in saves that predate levels; migration raises it to 1.
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub xp: u64,
    pub hp: u64,
    pub max_hp: u64,
    #[serde(default)]
    pub damage: u64,
    pub gold: u64,
    pub lamps: u32,
    pub equipment: Equipment,
}

impl Hero {
    pub fn new() -> Self {
        let mut hero = Self {
            level: 1,
            xp: 0,
            hp: 0,
            max_hp: 0,
            damage: 0,
            gold: 0,
            lamps: STARTING_LAMPS,
            equipment: Equipment::new(),
        };
        hero.recalculate_stats();
        hero.heal();
        hero
    }

    pub fn base_hp(&self) -> u64 {
        HERO_BASE_HP + u64::from(self.level.saturating_sub(1)) * HERO_HP_PER_LEVEL
    }

    pub fn base_damage(&self) -> u64 {
        HERO_BASE_DAMAGE + u64::from(self.level.saturating_sub(1)) * HERO_DAMAGE_PER_LEVEL
    }

    /// Rebuilds `max_hp` and `damage` from level and equipment, clamping `hp`.
    pub fn recalculate_stats(&mut self) {
        self.max_hp = self.base_hp().saturating_add(self.equipment.total_hp());
        self.damage = self.base_damage().saturating_add(self.equipment.total_damage());
        self.hp = self.hp.min(self.max_hp);
    }

    /// Effective power: `max_hp + 4 * damage`.
    pub fn power(&self) -> u64 {
        effective_power(self.max_hp, self.damage)
    }

    pub fn heal(&mut self) {
        self.hp = self.max_hp;
    }

    pub fn filled_slots(&self) -> usize {
        self.equipment.filled_slots()
    }

    /// Equips `item` and returns the replaced item.
    pub fn equip(&mut self, item: Item) -> Option<Item> {
        let old = self.equipment.equip(item);
        self.recalculate_stats();
        old
    }

    /// Adds XP and levels up while the experience table allows. Returns levels gained.
    pub fn add_xp(&mut self, amount: u64, data: &GameData) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        loop {
            let needed = data.xp_to_next(self.level);
            if self.xp < needed {
                break;
            }
            self.xp -= needed;
            self.level += 1;
            gained += 1;
        }
        if gained > 0 {
            self.recalculate_stats();
        }
        gained
    }

    /// Combat snapshot at the hero's current hp.
    pub fn battle_unit(&self) -> BattleUnit {
        BattleUnit {
            hp: self.hp,
            ..BattleUnit::new(HERO_NAME, self.max_hp, self.damage)
        }
    }
}

impl Default for Hero {
    fn default() -> Self {
        Self::new()
    }
}
