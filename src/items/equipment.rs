use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{Item, Rarity, Slot};

/// Hero equipment: at most one item per slot.
///
/// Serialized as a `slot -> item` map, so saves from builds with fewer slots
/// load unchanged. Slots stored as `null` load as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Slot, Option<Item>>",
    into = "BTreeMap<Slot, Item>"
)]
pub struct Equipment {
    items: BTreeMap<Slot, Item>,
}

impl From<BTreeMap<Slot, Option<Item>>> for Equipment {
    fn from(slots: BTreeMap<Slot, Option<Item>>) -> Self {
        let items = slots
            .into_iter()
            .filter_map(|(slot, item)| item.map(|item| (slot, item)))
            .collect();
        Self { items }
    }
}

impl From<Equipment> for BTreeMap<Slot, Item> {
    fn from(equipment: Equipment) -> Self {
        equipment.items
    }
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&Item> {
        self.items.get(&slot)
    }

    /// Puts `item` into its slot and returns the item it replaced.
    pub fn equip(&mut self, item: Item) -> Option<Item> {
        self.items.insert(item.slot, item)
    }

    pub fn remove(&mut self, slot: Slot) -> Option<Item> {
        self.items.remove(&slot)
    }

    pub fn iter_equipped_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.items.values_mut()
    }

    pub fn filled_slots(&self) -> usize {
        self.items.len()
    }

    /// Power of the item in `slot`, 0 when empty.
    pub fn power_in(&self, slot: Slot) -> u64 {
        self.get(slot).map_or(0, |item| item.power)
    }

    pub fn total_hp(&self) -> u64 {
        self.items
            .values()
            .fold(0u64, |sum, item| sum.saturating_add(item.hp))
    }

    pub fn total_damage(&self) -> u64 {
        self.items
            .values()
            .fold(0u64, |sum, item| sum.saturating_add(item.damage))
    }

    /// True when `item` has strictly more power than whatever occupies its slot.
    pub fn is_upgrade(&self, item: &Item) -> bool {
        item.power > self.power_in(item.slot)
    }

    /// The slot among `candidates` with the lowest equipped power (empty = 0).
    /// Ties go to the earliest candidate.
    pub fn weakest_slot(&self, candidates: &[Slot]) -> Option<Slot> {
        candidates
            .iter()
            .copied()
            .min_by_key(|slot| self.power_in(*slot))
    }

    pub fn count_by_rarity(&self) -> BTreeMap<Rarity, u32> {
        let mut counts = BTreeMap::new();
        for item in self.items.values() {
            *counts.entry(item.rarity).or_insert(0) += 1;
        }
        counts
    }
}
