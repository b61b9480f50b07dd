//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use serde::{Deserialize, Serialize};

use super::movement::{self, MoveIntent};
use super::state::{GameEvent, GamePhase, GameState};
use super::{combat, progression, spawner};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Held movement keys
    pub intent: MoveIntent,
    /// Wall-clock timestamp (ms) driving cooldowns, i-frames and status effects
    pub now: f64,
    /// Pause toggle
    pub pause: bool,
    /// Take the level-up offer in this slot
    pub select: Option<usize>,
    /// Spend a reroll on the level-up screen
    pub reroll: bool,
    /// Toggle banish mode on the level-up screen
    pub banish: bool,
    /// Start a dash
    pub dash: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep.
///
/// One-shot actions are handled first, even while suspended. A zero `dt`
/// only processes actions.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.now = state.now.max(input.now);

    if state.phase.is_terminal() {
        return;
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                log::info!("Paused at t={:.1}s", state.game_time);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Resumed);
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    if state.phase == GamePhase::LevelUp {
        if input.banish {
            progression::toggle_banish_mode(state);
        }
        if input.reroll {
            progression::reroll(state);
        }
        // The autopilot takes whatever is in the first slot
        let choice = input.select.or(input.idle_mode.then_some(0));
        if let Some(slot) = choice {
            progression::select_offer(state, slot);
        }
        progression::update_auto_advance(state);
    }

    if state.phase != GamePhase::Playing || dt <= 0.0 {
        return;
    }

    step(state, input, dt);
}

fn step(state: &mut GameState, input: &TickInput, dt: f32) {
    state.game_time += dt;

    let intent = if input.idle_mode {
        movement::idle_intent(state)
    } else {
        input.intent
    };
    if input.dash {
        movement::try_dash(state, &intent);
    }
    movement::move_player(state, &intent, dt);

    combat::fire_weapon(state);
    movement::move_projectiles(state, dt);

    spawner::update(state, dt);
    movement::move_enemies(state, dt);
    combat::tick_status_effects(state);

    movement::move_gems(state, dt);
    combat::resolve_collisions(state);

    state.compact();
    check_end(state);
}

/// Death wins over survival when both land on the same step
fn check_end(state: &mut GameState) {
    let time = state.game_time;
    if state.player.hp <= 0.0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver { time });
        log::info!("Game over at t={time:.1}s, level {}", state.player.level);
    } else if time >= state.config.win_time {
        state.phase = GamePhase::Won;
        state.events.push(GameEvent::Won { time });
        log::info!("Survived {time:.1}s at level {}", state.player.level);
    } else {
        return;
    }
    state.level_up = progression::LevelUpScreen::default();
}
