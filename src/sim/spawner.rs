//! Time-driven enemy spawning
//!
//! The spawn interval shrinks linearly with game time down to a floor, then
//! a difficulty-phase multiplier divides it. Spawned enemies get tougher and
//! faster the longer the run has lasted.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::config::{EnemyConfig, SpawnConfig};

/// Countdown to the next enemy (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub timer: f32,
}

impl Spawner {
    pub fn new(config: &SpawnConfig) -> Self {
        Self {
            timer: config.initial_interval,
        }
    }
}

/// Difficulty multiplier for the phase containing `t`.
///
/// Exactly one applies; later thresholds win and boundaries are inclusive.
pub fn phase_multiplier(config: &SpawnConfig, t: f32) -> f32 {
    if t < config.easy_until {
        config.easy_multiplier
    } else if t >= config.very_hard_from {
        config.very_hard_multiplier
    } else if t >= config.hard_from {
        config.hard_multiplier
    } else {
        1.0
    }
}

/// Base interval before the phase multiplier
pub fn base_interval(config: &SpawnConfig, t: f32) -> f32 {
    (config.initial_interval - config.interval_decrease_rate * t).max(config.min_interval)
}

/// Seconds until the next spawn when one happens at game time `t`
pub fn next_interval(config: &SpawnConfig, t: f32) -> f32 {
    base_interval(config, t) / phase_multiplier(config, t)
}

/// Enemy hp and speed at game time `t`
pub fn scaled_stats(enemy: &EnemyConfig, spawn: &SpawnConfig, t: f32) -> (f32, f32) {
    let hp_scale = 1.0 + spawn.hp_scale_rate * (t / 10.0);
    let speed_scale = 1.0 + spawn.speed_scale_rate * t;
    (enemy.hp * hp_scale, enemy.speed * speed_scale)
}

/// Random point just outside one of the four field edges
pub fn edge_position<R: Rng>(rng: &mut R, field: Vec2, radius: f32) -> Vec2 {
    match rng.random_range(0..4) {
        0 => Vec2::new(rng.random::<f32>() * field.x, -radius),
        1 => Vec2::new(field.x + radius, rng.random::<f32>() * field.y),
        2 => Vec2::new(rng.random::<f32>() * field.x, field.y + radius),
        _ => Vec2::new(-radius, rng.random::<f32>() * field.y),
    }
}

/// Count the spawn timer down and spawn an enemy when it expires
pub fn update(state: &mut GameState, dt: f32) {
    state.spawner.timer -= dt;
    if state.spawner.timer > 0.0 {
        return;
    }

    let t = state.game_time;
    let field = state.field();
    let radius = state.config.enemy.radius;
    let pos = edge_position(&mut state.rng, field, radius);
    let (hp, speed) = scaled_stats(&state.config.enemy, &state.config.spawn, t);
    state.spawn_enemy(pos, hp, speed);

    let interval = next_interval(&state.config.spawn, t);
    state.spawner.timer = interval;
    log::debug!("Spawned enemy at t={t:.1}s (hp {hp:.1}), next in {interval:.3}s");
}
