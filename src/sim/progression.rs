//! Experience, level-ups and the upgrade offer screen
//!
//! Crossing the xp threshold suspends the run in `GamePhase::LevelUp` with up
//! to three distinct rarity-weighted offers. The screen closes when an offer
//! is taken, or after a short delay when nothing was eligible.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, GameState, Player};
use super::upgrades::{UpgradeDef, apply_effect, shield_capacity};
use crate::config::LevelingConfig;
use crate::consts::OFFER_COUNT;

/// Open level-up screen (empty while playing)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelUpScreen {
    /// Catalog indices on offer, distinct
    pub offers: Vec<usize>,
    /// Selecting an offer banishes it instead of taking it
    pub banish_mode: bool,
    /// Wall-clock time (ms) at which an empty screen closes itself
    pub auto_advance_at: Option<f64>,
}

/// Xp needed to advance from `level` to the next
pub fn next_level_xp(config: &LevelingConfig, level: u32) -> f32 {
    let l = level as f32;
    let curve = l.powf(config.xp_power) * config.xp_power_scale;
    (config.base_xp + l * config.xp_per_level + curve).floor()
}

/// Draw up to `count` distinct eligible entries, weighted by rarity
pub fn generate_offers<R: Rng>(
    catalog: &[UpgradeDef],
    player: &Player,
    rng: &mut R,
    count: usize,
) -> Vec<usize> {
    let mut pool: Vec<usize> = catalog
        .iter()
        .enumerate()
        .filter(|(_, u)| u.is_eligible(player))
        .flat_map(|(i, u)| std::iter::repeat_n(i, u.rarity.weight()))
        .collect();

    let mut offers = Vec::with_capacity(count);
    while offers.len() < count && !pool.is_empty() {
        let pick = pool[rng.random_range(0..pool.len())];
        offers.push(pick);
        // Dropping every copy keeps draws distinct
        pool.retain(|&i| i != pick);
    }
    offers
}

/// Enter the level-up screen if playing and the threshold is reached
pub fn check_level_up(state: &mut GameState) {
    if state.phase != GamePhase::Playing || state.player.xp < state.player.next_level_xp {
        return;
    }

    let player = &mut state.player;
    player.xp = (player.xp - player.next_level_xp).max(0.0);
    player.level += 1;
    player.next_level_xp = next_level_xp(&state.config.leveling, player.level);
    player.hp = player.max_hp;
    let shield_level = player.upgrade_level("shield");
    if shield_level > 0 {
        player.shield = shield_capacity(shield_level);
    }
    let level = player.level;

    state.phase = GamePhase::LevelUp;
    open_screen(state);
    state.events.push(GameEvent::LevelUp { level });
    log::info!(
        "Level up to {level} at t={:.1}s ({} offers)",
        state.game_time,
        state.level_up.offers.len()
    );
}

/// Fresh offers; arm the auto-advance timer when there are none
fn open_screen(state: &mut GameState) {
    let offers = generate_offers(&state.catalog, &state.player, &mut state.rng, OFFER_COUNT);
    state.level_up = LevelUpScreen {
        auto_advance_at: offers.is_empty().then(|| state.now + state.config.auto_advance_ms),
        offers,
        banish_mode: false,
    };
}

/// Close the screen and resume; banked xp may open the next screen at once
pub fn resume(state: &mut GameState) {
    state.level_up = LevelUpScreen::default();
    state.phase = GamePhase::Playing;
    check_level_up(state);
}

/// Take (or banish) the offer in `slot`. Returns false if nothing happened.
pub fn select_offer(state: &mut GameState, slot: usize) -> bool {
    if state.phase != GamePhase::LevelUp {
        return false;
    }
    let Some(&index) = state.level_up.offers.get(slot) else {
        return false;
    };
    let Some(def) = state.catalog.get(index) else {
        return false;
    };
    let (id, effect) = (def.id, def.effect);

    if state.level_up.banish_mode && state.player.banishes > 0 {
        state.player.banishes -= 1;
        state.player.banned.insert(id.to_string());
        state.events.push(GameEvent::UpgradeBanished { id: id.to_string() });
        log::debug!("Banished {id}");
        open_screen(state);
        return true;
    }

    apply_effect(&mut state.player, &effect);
    let entry = state.player.upgrades.entry(id.to_string()).or_default();
    entry.level += 1;
    let level = entry.level;
    state.events.push(GameEvent::UpgradeApplied {
        id: id.to_string(),
        level,
    });
    log::info!("Took {id} (level {level})");
    resume(state);
    true
}

/// Spend a reroll on fresh offers
pub fn reroll(state: &mut GameState) -> bool {
    if state.phase != GamePhase::LevelUp || state.player.rerolls == 0 {
        return false;
    }
    state.player.rerolls -= 1;
    open_screen(state);
    state.events.push(GameEvent::OffersRerolled);
    true
}

/// Flip banish mode; only available while a banish is banked
pub fn toggle_banish_mode(state: &mut GameState) -> bool {
    if state.phase != GamePhase::LevelUp || state.player.banishes == 0 {
        return false;
    }
    state.level_up.banish_mode = !state.level_up.banish_mode;
    true
}

/// Close an empty screen once its timer has elapsed
pub fn update_auto_advance(state: &mut GameState) {
    if state.phase != GamePhase::LevelUp {
        return;
    }
    if state.level_up.auto_advance_at.is_some_and(|at| state.now >= at) {
        log::debug!("Nothing to offer, resuming");
        resume(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::upgrades::{Category, Rarity, Stat, UpgradeEffect, default_catalog};
    use glam::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn entry(id: &'static str, rarity: Rarity, max_level: u32) -> UpgradeDef {
        UpgradeDef {
            id,
            name: id,
            description: "",
            category: Category::Attack,
            rarity,
            max_level,
            effect: UpgradeEffect::Add(Stat::Damage, 1.0),
            requires: None,
            excludes: &[],
        }
    }

    fn leveled_state() -> GameState {
        let mut s = GameState::new(SimConfig::default(), 9);
        s.player.xp = s.player.next_level_xp;
        check_level_up(&mut s);
        s
    }

    #[test]
    fn test_threshold_formula() {
        let c = LevelingConfig::default();
        // 5 + 1.8 + 0.6 = 7.4
        assert_eq!(next_level_xp(&c, 1), 7.0);
        // 5 + 18 + 10^1.35 * 0.6 = 36.39
        assert_eq!(next_level_xp(&c, 10), 36.0);
    }

    proptest! {
        #[test]
        fn prop_threshold_increases(level in 1u32..500) {
            let c = LevelingConfig::default();
            prop_assert!(next_level_xp(&c, level + 1) > next_level_xp(&c, level));
        }

        #[test]
        fn prop_offers_distinct_and_eligible(seed in any::<u64>()) {
            let catalog = default_catalog();
            let player = Player::new(&SimConfig::default(), Vec2::ZERO);
            let mut rng = Pcg32::seed_from_u64(seed);
            let offers = generate_offers(&catalog, &player, &mut rng, OFFER_COUNT);
            prop_assert_eq!(offers.len(), OFFER_COUNT);
            for (i, a) in offers.iter().enumerate() {
                prop_assert!(catalog[*a].is_eligible(&player));
                prop_assert!(!offers[i + 1..].contains(a));
            }
        }
    }

    #[test]
    fn test_rarity_weighting() {
        let catalog = vec![entry("common", Rarity::Common, 5), entry("legend", Rarity::Legend, 5)];
        let player = Player::new(&SimConfig::default(), Vec2::ZERO);
        let mut rng = Pcg32::seed_from_u64(1);
        let draws = 20_000;
        let commons = (0..draws)
            .filter(|_| generate_offers(&catalog, &player, &mut rng, 1) == vec![0])
            .count();
        // Expected 60 / 63 of draws
        let share = commons as f64 / draws as f64;
        assert!((share - 60.0 / 63.0).abs() < 0.01, "common share {share}");
    }

    #[test]
    fn test_banned_and_maxed_never_offered() {
        let catalog = vec![
            entry("a", Rarity::Common, 1),
            entry("b", Rarity::Common, 5),
            entry("c", Rarity::Rare, 5),
        ];
        let mut player = Player::new(&SimConfig::default(), Vec2::ZERO);
        player.upgrades.entry("a".into()).or_default().level = 1;
        player.banned.insert("b".into());
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..100 {
            assert_eq!(generate_offers(&catalog, &player, &mut rng, 3), vec![2]);
        }
    }

    #[test]
    fn test_exact_threshold_levels_once() {
        let s = leveled_state();
        assert_eq!(s.phase, GamePhase::LevelUp);
        assert_eq!(s.player.level, 2);
        assert_eq!(s.player.xp, 0.0);
        assert_eq!(s.level_up.offers.len(), OFFER_COUNT);
        let level_ups = s.events.iter().filter(|e| matches!(e, GameEvent::LevelUp { .. })).count();
        assert_eq!(level_ups, 1);
    }

    #[test]
    fn test_level_up_restores_hp_and_shield() {
        let mut s = GameState::new(SimConfig::default(), 9);
        s.player.hp = 20.0;
        s.player.upgrades.entry("shield".into()).or_default().level = 2;
        s.player.shield = 0.0;
        s.player.xp = 100.0;
        check_level_up(&mut s);
        assert_eq!(s.player.hp, s.player.max_hp);
        assert_eq!(s.player.shield, 80.0);
        assert_eq!(s.player.xp, 93.0);
    }

    #[test]
    fn test_select_applies_and_chains_banked_levels() {
        let mut s = GameState::new(SimConfig::default(), 9);
        // Enough for level 2 (7) and level 3 (floor(5 + 3.6 + 2^1.35 * 0.6) = 10)
        s.player.xp = 17.0;
        check_level_up(&mut s);
        assert_eq!(s.player.level, 2);

        let taken = s.catalog[s.level_up.offers[0]].id;
        assert!(select_offer(&mut s, 0));
        assert_eq!(s.player.upgrade_level(taken), 1);
        assert_eq!(s.phase, GamePhase::LevelUp, "banked xp reopens the screen");
        assert_eq!(s.player.level, 3);

        assert!(select_offer(&mut s, 0));
        assert_eq!(s.phase, GamePhase::Playing);
        assert!(s.level_up.offers.is_empty());
    }

    #[test]
    fn test_select_out_of_range_is_noop() {
        let mut s = leveled_state();
        assert!(!select_offer(&mut s, 7));
        assert_eq!(s.phase, GamePhase::LevelUp);

        let mut playing = GameState::new(SimConfig::default(), 9);
        assert!(!select_offer(&mut playing, 0));
    }

    #[test]
    fn test_reroll_spends_charge() {
        let mut s = leveled_state();
        assert!(!reroll(&mut s));
        s.player.rerolls = 1;
        assert!(reroll(&mut s));
        assert_eq!(s.player.rerolls, 0);
        assert_eq!(s.level_up.offers.len(), OFFER_COUNT);
        assert!(!reroll(&mut s));
    }

    #[test]
    fn test_banish_removes_from_future_offers() {
        let mut s = leveled_state();
        assert!(!toggle_banish_mode(&mut s), "needs a banked banish");
        s.player.banishes = 1;
        assert!(toggle_banish_mode(&mut s));

        let banished = s.catalog[s.level_up.offers[1]].id;
        assert!(select_offer(&mut s, 1));
        assert_eq!(s.phase, GamePhase::LevelUp);
        assert_eq!(s.player.banishes, 0);
        assert!(!s.level_up.banish_mode);
        assert!(s.player.banned.contains(banished));
        assert!(s.level_up.offers.iter().all(|&i| s.catalog[i].id != banished));
        assert_eq!(s.player.upgrade_level(banished), 0);
    }

    #[test]
    fn test_empty_offers_auto_advance() {
        let mut s = GameState::with_catalog(SimConfig::default(), 9, Vec::new());
        s.now = 2000.0;
        s.player.xp = 7.0;
        check_level_up(&mut s);
        assert_eq!(s.phase, GamePhase::LevelUp);
        assert_eq!(s.level_up.auto_advance_at, Some(3500.0));

        s.now = 3499.0;
        update_auto_advance(&mut s);
        assert_eq!(s.phase, GamePhase::LevelUp);

        s.now = 3500.0;
        update_auto_advance(&mut s);
        assert_eq!(s.phase, GamePhase::Playing);
    }
}
