//! Combat resolution
//!
//! Auto-fire, contact damage, projectile hits (crit, knockback, status
//! rolls, pierce/chain continuation), status ticking, enemy death and gem
//! collection.

use glam::Vec2;
use rand::Rng;

use super::collision::{circles_overlap, hit_threshold, nearest};
use super::progression;
use super::state::{GameEvent, GameState, StatusEffect, StatusKind};
use crate::consts::{HITBOX_SCALE, STATUS_TICK_MS, VOLLEY_SPREAD};
use crate::{direction_to, rotate};

/// Fire a volley at the nearest enemy once the cooldown has elapsed
pub fn fire_weapon(state: &mut GameState) {
    let now = state.now;
    if now - state.player.last_shot_at <= state.player.projectile_cooldown_ms {
        return;
    }
    let origin = state.player.pos;
    let Some(target) = nearest(origin, state.enemies.iter().map(|(i, e)| (i, e.pos)))
        .and_then(|i| state.enemies.get(i))
        .map(|e| e.pos)
    else {
        return;
    };

    let aim = direction_to(origin, target);
    let count = state.player.projectile_count.max(1);
    for k in 0..count {
        let offset = (k as f32 - (count - 1) as f32 / 2.0) * VOLLEY_SPREAD;
        state.spawn_projectile(origin, rotate(aim, offset));
    }
    state.player.last_shot_at = now;
}

/// Roll a critical hit
pub fn roll_damage<R: Rng>(rng: &mut R, base: f32, crit_chance: f32, crit_mult: f32) -> f32 {
    if crit_chance > 0.0 && rng.random::<f32>() < crit_chance {
        base * crit_mult
    } else {
        base
    }
}

/// Run the death transition once: lifesteal, gem drop, release.
///
/// Returns false if the enemy was already dying or not live. A player already
/// at zero hp gets no lifesteal, so a lethal hit stays lethal.
pub fn kill_enemy(state: &mut GameState, index: usize) -> bool {
    let Some(enemy) = state.enemies.get_mut(index) else {
        return false;
    };
    if enemy.dying {
        return false;
    }
    enemy.dying = true;
    let (id, pos) = (enemy.id, enemy.pos);

    let lifesteal = state.player.lifesteal;
    if lifesteal > 0.0 && state.player.hp > 0.0 {
        state.player.heal(lifesteal);
    }
    drop_gem(state, pos);
    state.enemies.release(index);
    state.events.push(GameEvent::EnemyKilled { id, pos });
    log::trace!("Enemy {id} killed at ({:.0}, {:.0})", pos.x, pos.y);
    true
}

/// Maybe spawn an experience gem with a uniformly drawn value
fn drop_gem(state: &mut GameState, pos: Vec2) {
    let gem = &state.config.gem;
    let (chance, min, max) = (gem.drop_chance, gem.min_xp, gem.max_xp);
    if !state.rng.random_bool(chance.clamp(0.0, 1.0)) {
        return;
    }
    let value = state.rng.random_range(min.min(max)..=min.max(max));
    state.spawn_gem(pos, value);
}

/// Apply contact damage from the first overlapping enemy, if not invulnerable
pub fn resolve_contact(state: &mut GameState) {
    let now = state.now;
    if state.player.is_invulnerable(now) {
        return;
    }
    let (pos, radius) = (state.player.pos, state.player.radius);
    let Some((index, damage)) = state
        .enemies
        .iter()
        .find(|(_, e)| circles_overlap(pos, radius, e.pos, e.radius))
        .map(|(i, e)| (i, e.damage))
    else {
        return;
    };

    state.player.take_damage(damage);
    state.player.iframe_until = now + state.config.player.iframe_ms;
    state.events.push(GameEvent::PlayerHit {
        damage,
        hp: state.player.hp,
    });

    let thorns = state.player.thorns();
    if thorns <= 0.0 {
        return;
    }
    let Some(enemy) = state.enemies.get_mut(index) else {
        return;
    };
    enemy.hp -= thorns;
    if enemy.hp <= 0.0 {
        kill_enemy(state, index);
    }
}

/// Damage an enemy with knockback and status rolls.
///
/// Returns where the enemy died (after knockback) if this hit killed it.
pub fn apply_hit(
    state: &mut GameState,
    index: usize,
    source: Vec2,
    damage: f32,
) -> Option<Vec2> {
    let now = state.now;
    let knockback = state.player.knockback;
    let base_damage = state.player.damage;
    let status = state.player.status.clone();

    let enemy = state.enemies.get_mut(index)?;
    if enemy.hp <= 0.0 {
        return None;
    }
    enemy.hp -= damage;

    if knockback > 0.0 && base_damage > 0.0 {
        let force = knockback * (damage / base_damage);
        enemy.pos += direction_to(source, enemy.pos) * force;
    }

    for kind in StatusKind::ALL {
        let roll = status.get(kind);
        if roll.chance <= 0.0 || state.rng.random::<f32>() >= roll.chance {
            continue;
        }
        let expires_at = now + roll.duration_ms;
        match enemy.effects.iter_mut().find(|e| e.kind == kind) {
            Some(existing) => existing.expires_at = existing.expires_at.max(expires_at),
            None => enemy.effects.push(StatusEffect {
                kind,
                magnitude: roll.magnitude,
                expires_at,
                last_tick: now,
            }),
        }
    }

    let (hp, pos) = (enemy.hp, enemy.pos);
    (hp <= 0.0 && kill_enemy(state, index)).then_some(pos)
}

/// Each projectile resolves at most one new enemy per step
pub fn resolve_projectiles(state: &mut GameState) {
    let area_scale = state.player.area_scale;
    let (crit_chance, crit_mult) = (state.player.crit_chance, state.player.crit_mult);

    for proj_index in state.projectiles.indices() {
        let Some(proj) = state.projectiles.get(proj_index) else {
            continue;
        };
        let (proj_pos, proj_damage) = (proj.pos, proj.damage);
        let reach = proj.radius * area_scale;
        let target = state
            .enemies
            .iter()
            .filter(|(_, e)| !proj.hit.contains(&e.id))
            .find(|(_, e)| proj_pos.distance(e.pos) < hit_threshold(reach, e.radius))
            .map(|(i, e)| (i, e.id));
        let Some((enemy_index, enemy_id)) = target else {
            continue;
        };

        let damage = roll_damage(&mut state.rng, proj_damage, crit_chance, crit_mult);
        let killed_at = apply_hit(state, enemy_index, proj_pos, damage);

        let Some(proj) = state.projectiles.get_mut(proj_index) else {
            continue;
        };
        proj.hit.push(enemy_id);

        // Chain retargets from where the victim ended up
        if let Some(origin) = killed_at.filter(|_| proj.chain > 0) {
            let hit = &proj.hit;
            let next = nearest(
                origin,
                state
                    .enemies
                    .iter()
                    .filter(|(_, e)| !hit.contains(&e.id))
                    .map(|(i, e)| (i, e.pos)),
            )
            .and_then(|i| state.enemies.get(i))
            .map(|e| e.pos);
            match next {
                Some(next_pos) => {
                    proj.vel = direction_to(proj.pos, next_pos) * proj.speed;
                    proj.chain -= 1;
                }
                None => {
                    state.projectiles.release(proj_index);
                }
            }
        } else if proj.pierce > 0 {
            proj.pierce -= 1;
        } else {
            state.projectiles.release(proj_index);
        }
    }
}

/// Expire finished effects and apply due periodic damage, then run the
/// death transition for anything that died.
pub fn tick_status_effects(state: &mut GameState) {
    let now = state.now;
    for index in state.enemies.indices() {
        let Some(enemy) = state.enemies.get_mut(index) else {
            continue;
        };
        enemy.effects.retain(|e| now <= e.expires_at);
        let mut damage = 0.0;
        for effect in &mut enemy.effects {
            if now > effect.last_tick + STATUS_TICK_MS {
                if effect.kind.deals_damage() {
                    damage += effect.magnitude;
                }
                effect.last_tick = now;
            }
        }
        enemy.hp -= damage;
    }
    reap_dead(state);
}

/// Death transition for every live enemy at or below zero hp
pub fn reap_dead(state: &mut GameState) {
    for index in state.enemies.indices() {
        if state.enemies.get(index).is_some_and(|e| e.hp <= 0.0) {
            kill_enemy(state, index);
        }
    }
}

/// Pick up overlapping gems, then check for a level-up
pub fn collect_gems(state: &mut GameState) {
    let player = &state.player;
    let reach = player.radius + state.config.gem.pickup_radius + player.magnet_bonus;
    let (pos, mult) = (player.pos, player.xp_gain_mult);

    for index in state.gems.indices() {
        let Some(gem) = state.gems.get(index) else {
            continue;
        };
        if pos.distance(gem.pos) >= (reach + gem.radius) * HITBOX_SCALE {
            continue;
        }
        let xp = gem.value as f32 * mult;
        state.gems.release(index);
        state.player.xp += xp;
        state.events.push(GameEvent::GemCollected { xp });
        progression::check_level_up(state);
    }
}

/// All overlap resolution for one step, in order
pub fn resolve_collisions(state: &mut GameState) {
    resolve_contact(state);
    resolve_projectiles(state);
    collect_gems(state);
}
