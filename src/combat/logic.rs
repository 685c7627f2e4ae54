use rand::Rng;

use super::types::{BattleLogEntry, BattleResult, BattleState, BattleUnit};
use crate::core::balance::BalanceConfig;
use crate::core::constants::{
    MAX_BATTLE_ROUNDS, MULTI_WAVE_HP_SHARE, PAIR_WAVE_DAMAGE_SHARE, TRIO_WAVE_DAMAGE_SHARE,
};

const ENEMY_NAMES: [&str; 10] = [
    "Goblin", "Skeleton", "Orc", "Troll", "Zombie", "Ghost", "Spider", "Slime", "Rat", "Wolf",
];

const BOSS_NAMES: [&str; 7] = [
    "Goblin King",
    "Lich",
    "Orc Warlord",
    "Mountain Troll",
    "Necromancer",
    "Demon of Darkness",
    "Spider Queen",
];

fn enemy_name(is_boss: bool, rng: &mut impl Rng) -> String {
    if is_boss {
        format!("👑 {}", BOSS_NAMES[rng.gen_range(0..BOSS_NAMES.len())])
    } else {
        ENEMY_NAMES[rng.gen_range(0..ENEMY_NAMES.len())].to_string()
    }
}

/// Builds one enemy worth `power` with hp/damage ratio `k`:
/// `damage = max(1, floor(power / (4 + k)))`, `hp = floor(damage * k)`.
pub fn enemy_from_power(name: String, power: u64, k: f64, is_boss: bool) -> BattleUnit {
    let damage = ((power as f64 / (4.0 + k)).floor() as u64).max(1);
    let hp = (damage as f64 * k).floor() as u64;
    BattleUnit {
        is_boss,
        ..BattleUnit::new(name, hp, damage)
    }
}

/// Splits a power budget into a wave.
///
/// Bosses and single-enemy waves get the whole budget. In 2-3 enemy waves the
/// party shares half the budget as hp, while each enemy hits for a fixed share
/// of the full budget.
pub fn generate_wave(
    target_power: u64,
    min_count: u32,
    max_count: u32,
    is_boss: bool,
    config: &BalanceConfig,
    rng: &mut impl Rng,
) -> Vec<BattleUnit> {
    let k = config.hp_to_damage_ratio;
    if is_boss {
        return vec![enemy_from_power(enemy_name(true, rng), target_power, k, true)];
    }

    let min_count = min_count.max(1);
    let count = rng.gen_range(min_count..=max_count.max(min_count));
    if count == 1 {
        return vec![enemy_from_power(enemy_name(false, rng), target_power, k, false)];
    }

    let power = target_power as f64;
    let hp = (power * MULTI_WAVE_HP_SHARE / count as f64).floor() as u64;
    let damage_share = if count == 2 {
        PAIR_WAVE_DAMAGE_SHARE
    } else {
        TRIO_WAVE_DAMAGE_SHARE
    };
    let damage = ((power * damage_share).floor() as u64).max(1);

    (0..count)
        .map(|_| BattleUnit::new(enemy_name(false, rng), hp, damage))
        .collect()
}

pub fn init_battle(hero: BattleUnit, enemies: Vec<BattleUnit>) -> BattleState {
    BattleState {
        hero,
        enemies,
        current_turn: 0,
        is_complete: false,
        victory: false,
        timed_out: false,
        log: Vec::new(),
    }
}

/// Resolves one round in place.
///
/// The hero strikes the first living enemy. Every enemy still standing then
/// strikes back in spawn order until the hero falls. Reaching the round cap
/// closes the battle as a timed-out defeat.
pub fn execute_battle_round(state: &mut BattleState) {
    if state.is_complete {
        return;
    }
    state.current_turn += 1;
    let turn = state.current_turn;

    if let Some(target) = state.enemies.iter_mut().find(|enemy| enemy.is_alive()) {
        let hp_after = target.take_damage(state.hero.damage);
        state.log.push(BattleLogEntry {
            turn,
            attacker: state.hero.name.clone(),
            target: target.name.clone(),
            damage: state.hero.damage,
            target_hp_after: hp_after,
        });
    }

    for enemy in state.enemies.iter().filter(|enemy| enemy.is_alive()) {
        let hp_after = state.hero.take_damage(enemy.damage);
        state.log.push(BattleLogEntry {
            turn,
            attacker: enemy.name.clone(),
            target: state.hero.name.clone(),
            damage: enemy.damage,
            target_hp_after: hp_after,
        });
        if hp_after == 0 {
            break;
        }
    }

    let enemies_dead = state.all_enemies_dead();
    let hero_dead = !state.hero.is_alive();
    if enemies_dead || hero_dead {
        state.is_complete = true;
        state.victory = enemies_dead && !hero_dead;
    } else if turn >= MAX_BATTLE_ROUNDS {
        state.is_complete = true;
        state.victory = false;
        state.timed_out = true;
        tracing::debug!(turn, "battle hit the round cap");
    }
}

/// Runs rounds until the battle completes. Always terminates within the round cap.
pub fn run_full_battle(state: &mut BattleState) {
    while !state.is_complete {
        execute_battle_round(state);
    }
}

/// Summarizes a finished battle.
pub fn battle_result(state: &BattleState, gold_per_enemy: u64) -> BattleResult {
    let enemies_defeated = state.enemies_defeated();
    BattleResult {
        victory: state.victory,
        hero_hp_remaining: state.hero.hp,
        hero_damage_taken: state.hero.max_hp.saturating_sub(state.hero.hp),
        enemies_defeated,
        gold_reward: gold_per_enemy.saturating_mul(enemies_defeated as u64),
        rounds: state.current_turn,
        timed_out: state.timed_out,
        log: state.log.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn hero(hp: u64, damage: u64) -> BattleUnit {
        BattleUnit::new("Hero", hp, damage)
    }

    #[test]
    fn test_enemy_from_power_uses_ratio() {
        let enemy = enemy_from_power("Orc".into(), 100, 6.0, false);
        assert_eq!(enemy.damage, 10);
        assert_eq!(enemy.hp, 60);
        assert_eq!(enemy.power(), 100);

        let tiny = enemy_from_power("Rat".into(), 3, 6.0, false);
        assert_eq!(tiny.damage, 1);
        assert_eq!(tiny.hp, 6);
    }

    #[test]
    fn test_boss_wave_is_single_enemy() {
        let config = BalanceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let wave = generate_wave(1_000, 1, 3, true, &config, &mut rng);
        assert_eq!(wave.len(), 1);
        assert!(wave[0].is_boss);
        assert!(wave[0].name.starts_with('👑'));
        assert_eq!(wave[0].damage, 100);
        assert_eq!(wave[0].hp, 600);
    }

    #[test]
    fn test_multi_enemy_waves_split_hp_not_damage() {
        let config = BalanceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let pair = generate_wave(1_000, 2, 2, false, &config, &mut rng);
        assert_eq!(pair.len(), 2);
        assert!(pair.iter().all(|e| e.hp == 250 && e.damage == 83));

        let trio = generate_wave(1_000, 3, 3, false, &config, &mut rng);
        assert_eq!(trio.len(), 3);
        assert!(trio.iter().all(|e| e.hp == 166 && e.damage == 62));
    }

    #[test]
    fn test_wave_size_within_bounds() {
        let config = BalanceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let wave = generate_wave(500, 1, 3, false, &config, &mut rng);
            assert!((1..=3).contains(&wave.len()));
            seen[wave.len()] = true;
        }
        assert!(seen[1] && seen[2] && seen[3]);
    }

    #[test]
    fn test_one_round_victory_against_harmless_enemy() {
        let enemy = BattleUnit::new("Slime", 40, 0);
        let mut state = init_battle(hero(10, 40), vec![enemy]);
        run_full_battle(&mut state);
        assert!(state.is_complete);
        assert!(state.victory);
        assert_eq!(state.current_turn, 1);
        assert_eq!(state.hero.hp, 10);
    }

    #[test]
    fn test_enemies_strike_after_hero() {
        let enemies = vec![BattleUnit::new("A", 5, 3), BattleUnit::new("B", 50, 4)];
        let mut state = init_battle(hero(100, 5), enemies);
        execute_battle_round(&mut state);
        // A dies to the opening strike, so only B hits back.
        assert_eq!(state.hero.hp, 96);
        assert_eq!(state.log.len(), 2);
        assert_eq!(state.log[0].target, "A");
        assert_eq!(state.log[1].attacker, "B");
        assert!(!state.is_complete);
    }

    #[test]
    fn test_attacks_stop_once_hero_falls() {
        let enemies = vec![
            BattleUnit::new("A", 100, 10),
            BattleUnit::new("B", 100, 10),
            BattleUnit::new("C", 100, 10),
        ];
        let mut state = init_battle(hero(15, 1), enemies);
        execute_battle_round(&mut state);
        assert!(state.is_complete);
        assert!(!state.victory);
        assert_eq!(state.hero.hp, 0);
        // Hero strike plus A and B; C never swings.
        assert_eq!(state.log.len(), 3);
    }

    #[test]
    fn test_round_cap_is_timed_out_defeat() {
        let enemy = BattleUnit::new("Wall", 1_000_000, 0);
        let mut state = init_battle(hero(10, 1), vec![enemy]);
        run_full_battle(&mut state);
        assert!(state.is_complete);
        assert!(!state.victory);
        assert!(state.timed_out);
        assert_eq!(state.current_turn, MAX_BATTLE_ROUNDS);
    }

    #[test]
    fn test_completed_battle_is_frozen() {
        let mut state = init_battle(hero(10, 100), vec![BattleUnit::new("Rat", 5, 1)]);
        run_full_battle(&mut state);
        let snapshot = state.clone();
        execute_battle_round(&mut state);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_battle_result() {
        let enemies = vec![BattleUnit::new("A", 5, 3), BattleUnit::new("B", 6, 4)];
        let mut state = init_battle(hero(100, 6), enemies);
        run_full_battle(&mut state);
        let result = battle_result(&state, 10);
        assert!(result.victory);
        assert_eq!(result.rounds, 2);
        assert_eq!(result.enemies_defeated, 2);
        assert_eq!(result.gold_reward, 20);
        assert_eq!(result.hero_damage_taken, 4);
        assert_eq!(result.hero_hp_remaining, 96);
    }
}
