use serde::{Deserialize, Serialize};

use crate::core::constants::EFFECTIVE_DAMAGE_WEIGHT;

/// Equipment rarity tiers, declared from worst to best.
///
/// Ordering is significant: `rarity >= target` comparisons use declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common = 0,
    Good = 1,
    Rare = 2,
    Epic = 3,
    Mythic = 4,
    Legendary = 5,
    Immortal = 6,
}

impl Rarity {
    pub const ALL: [Rarity; 7] = [
        Rarity::Common,
        Rarity::Good,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Mythic,
        Rarity::Legendary,
        Rarity::Immortal,
    ];

    /// Position in the catalog (0 = common).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the display name for this rarity tier.
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Good => "Good",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Mythic => "Mythic",
            Rarity::Legendary => "Legendary",
            Rarity::Immortal => "Immortal",
        }
    }

    /// Catalog power multiplier (geometric, x1.5 per tier).
    pub fn base_multiplier(&self) -> f64 {
        1.5_f64.powi(self.index() as i32)
    }

    /// Gold range `(min, max)` paid when an item of this tier is sold.
    pub fn sell_price_range(&self) -> (u64, u64) {
        match self {
            Rarity::Common => (5, 10),
            Rarity::Good => (10, 20),
            Rarity::Rare => (20, 40),
            Rarity::Epic => (40, 80),
            Rarity::Mythic => (80, 160),
            Rarity::Legendary => (160, 320),
            Rarity::Immortal => (320, 640),
        }
    }
}

/// Equipment slots. A closed, static catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Weapon,
    Helmet,
    Armor,
    Gloves,
    Shoes,
    Magic,
    Ring,
    Amulet,
    Pants,
    Cloak,
    Artefact,
    Belt,
}

impl Slot {
    pub const ALL: [Slot; 12] = [
        Slot::Weapon,
        Slot::Helmet,
        Slot::Armor,
        Slot::Gloves,
        Slot::Shoes,
        Slot::Magic,
        Slot::Ring,
        Slot::Amulet,
        Slot::Pants,
        Slot::Cloak,
        Slot::Artefact,
        Slot::Belt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Slot::Weapon => "Weapon",
            Slot::Helmet => "Helmet",
            Slot::Armor => "Armor",
            Slot::Gloves => "Gloves",
            Slot::Shoes => "Shoes",
            Slot::Magic => "Magic",
            Slot::Ring => "Ring",
            Slot::Amulet => "Amulet",
            Slot::Pants => "Pants",
            Slot::Cloak => "Cloak",
            Slot::Artefact => "Artefact",
            Slot::Belt => "Belt",
        }
    }

    /// Global stage index at which the slot becomes lootable.
    pub fn unlock_stage(&self) -> u32 {
        match self {
            Slot::Weapon | Slot::Helmet | Slot::Armor => 1,
            Slot::Gloves => 3,
            Slot::Shoes => 5,
            Slot::Magic => 8,
            Slot::Ring => 11,
            Slot::Amulet => 15,
            Slot::Pants => 20,
            Slot::Cloak => 25,
            Slot::Artefact => 30,
            Slot::Belt => 40,
        }
    }

    /// `(hp_ratio, damage_ratio)` split of the slot's internal power budget.
    pub fn stat_ratios(&self) -> (f64, f64) {
        match self {
            Slot::Weapon => (0.1, 0.9),
            Slot::Helmet => (0.8, 0.2),
            Slot::Armor => (0.9, 0.1),
            Slot::Gloves => (0.4, 0.6),
            Slot::Shoes => (0.6, 0.4),
            Slot::Magic => (0.2, 0.8),
            Slot::Ring => (0.3, 0.7),
            Slot::Amulet => (0.5, 0.5),
            Slot::Pants => (0.7, 0.3),
            Slot::Cloak => (0.75, 0.25),
            Slot::Artefact => (0.35, 0.65),
            Slot::Belt => (0.85, 0.15),
        }
    }

    pub fn hp_ratio(&self) -> f64 {
        self.stat_ratios().0
    }

    pub fn damage_ratio(&self) -> f64 {
        self.stat_ratios().1
    }

    /// `hp_ratio + 4 * damage_ratio`: effective power produced per unit of internal power.
    pub fn effective_ratio(&self) -> f64 {
        let (hp, damage) = self.stat_ratios();
        hp + EFFECTIVE_DAMAGE_WEIGHT as f64 * damage
    }

    /// Slots lootable at the given global stage, in catalog order.
    pub fn unlocked_at(global_stage: u32) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|slot| slot.unlock_stage() <= global_stage)
            .collect()
    }
}

/// A generated piece of equipment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub slot: Slot,
    pub rarity: Rarity,
    pub level: u32,
    /// Missing in saves older than the hp/damage split; rebuilt from `power` on load.
    #[serde(default)]
    pub hp: u64,
    #[serde(default)]
    pub damage: u64,
    pub power: u64,
}

/// Effective power of an hp/damage pair: `hp + 4 * damage`.
pub fn effective_power(hp: u64, damage: u64) -> u64 {
    hp.saturating_add(damage.saturating_mul(EFFECTIVE_DAMAGE_WEIGHT))
}
