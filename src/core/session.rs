//! A playable session: game state bound to its ruleset, RNG and save file.
//!
//! [`GameState`] methods take the ruleset and RNG explicitly. `GameSession`
//! owns both so a front-end can drive the game with plain method calls, and it
//! writes the snapshot after every mutating operation when a [`SaveManager`]
//! is attached.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io;

use super::data::Ruleset;
use super::game_state::GameState;
use crate::character::save::SaveManager;
use crate::combat::types::BattleResult;
use crate::items::types::Item;

pub struct GameSession {
    state: GameState,
    ruleset: Ruleset,
    rng: ChaCha8Rng,
    saves: Option<SaveManager>,
}

impl GameSession {
    /// Starts a fresh game with no persistence.
    pub fn new(ruleset: Ruleset, seed: u64) -> Self {
        Self {
            state: GameState::new(&ruleset),
            ruleset,
            rng: ChaCha8Rng::seed_from_u64(seed),
            saves: None,
        }
    }

    /// Resumes the saved game, or starts a new one when no usable save exists.
    pub fn with_save_manager(ruleset: Ruleset, saves: SaveManager, seed: u64) -> Self {
        let state = match saves.load(&ruleset) {
            Some(state) => {
                tracing::info!(path = %saves.path().display(), "resumed saved game");
                state
            }
            None => GameState::new(&ruleset),
        };
        Self {
            state,
            ruleset,
            rng: ChaCha8Rng::seed_from_u64(seed),
            saves: Some(saves),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn open_loot(&mut self) -> Option<Item> {
        let item = self.state.open_loot(&self.ruleset, &mut self.rng);
        if item.is_some() {
            self.persist();
        }
        item
    }

    pub fn equip_from_inventory(&mut self, item_id: &str) -> bool {
        let equipped = self.state.equip_from_inventory(item_id, &mut self.rng);
        if equipped {
            self.persist();
        }
        equipped
    }

    pub fn sell_from_inventory(&mut self, item_id: &str) -> Option<u64> {
        let price = self.state.sell_from_inventory(item_id, &mut self.rng);
        if price.is_some() {
            self.persist();
        }
        price
    }

    pub fn fight(&mut self) -> BattleResult {
        let result = self.state.fight(&self.ruleset, &mut self.rng);
        self.persist();
        result
    }

    pub fn upgrade_lamp(&mut self) -> bool {
        let upgraded = self.state.upgrade_lamp(&self.ruleset);
        if upgraded {
            self.persist();
        }
        upgraded
    }

    pub fn add_lamps(&mut self, amount: u32) {
        self.state.add_lamps(amount);
        self.persist();
    }

    pub fn add_gold(&mut self, amount: u64) {
        self.state.add_gold(amount);
        self.persist();
    }

    /// Stamps the save time and writes the snapshot. No-op without a save manager.
    pub fn save(&mut self) -> io::Result<()> {
        let Some(saves) = &self.saves else {
            return Ok(());
        };
        self.state.last_save_time = chrono::Utc::now().timestamp();
        saves.save(&self.state)
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "failed to save game");
        }
    }
}
