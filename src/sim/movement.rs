//! Per-step position integration
//!
//! Player (walk + dash), enemies (straight seek), projectiles (ballistic,
//! released off-field) and gems (magnet seek).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{clamp_to_field, nearest, outside_field};
use super::state::GameState;
use crate::consts::OFFFIELD_MARGIN;
use crate::direction_to;

/// Held movement keys (screen space: up is -y)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    /// Unnormalised axis sum, each component in {-1, 0, 1}
    pub fn raw(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.up {
            v.y -= 1.0;
        }
        if self.down {
            v.y += 1.0;
        }
        if self.left {
            v.x -= 1.0;
        }
        if self.right {
            v.x += 1.0;
        }
        v
    }

    /// Unit direction, zero when no (or cancelling) keys are held
    pub fn direction(&self) -> Vec2 {
        self.raw().normalize_or_zero()
    }

    /// Nearest 8-way intent for an arbitrary direction
    pub fn toward(dir: Vec2) -> Self {
        const DEADZONE: f32 = 0.38;
        let dir = dir.normalize_or_zero();
        Self {
            up: dir.y < -DEADZONE,
            down: dir.y > DEADZONE,
            left: dir.x < -DEADZONE,
            right: dir.x > DEADZONE,
        }
    }
}

/// Start a dash if unlocked and off cooldown. Returns whether it started.
pub fn try_dash(state: &mut GameState, intent: &MoveIntent) -> bool {
    let now = state.now;
    let player = &mut state.player;
    if !player.dash.unlocked || player.dash.active || now < player.dash.ready_at {
        return false;
    }

    let raw = intent.raw();
    // No keys held leaves a zero direction: the dash grants i-frames in place
    let magnitude = if raw == Vec2::ZERO { 1.0 } else { raw.length() };
    player.dash.active = true;
    player.dash.direction = raw / magnitude;
    player.dash.until = now + player.dash_duration_ms;
    player.iframe_until = player.iframe_until.max(player.dash.until);
    log::debug!("Dash until {:.0}ms", player.dash.until);
    true
}

/// Walk or dash, then keep the player inside the field
pub fn move_player(state: &mut GameState, intent: &MoveIntent, dt: f32) {
    let now = state.now;
    let field = state.field();
    let player = &mut state.player;

    if player.dash.active {
        if now >= player.dash.until {
            player.dash.active = false;
            player.dash.ready_at = now + player.dash_cooldown_ms;
        } else {
            player.pos += player.dash.direction * player.dash_speed * dt;
        }
    } else {
        player.pos += intent.direction() * player.speed * dt;
    }

    player.pos = clamp_to_field(player.pos, player.radius, field);
}

/// Every live enemy walks straight at the player
pub fn move_enemies(state: &mut GameState, dt: f32) {
    let target = state.player.pos;
    for index in state.enemies.indices() {
        if let Some(enemy) = state.enemies.get_mut(index) {
            let speed = enemy.current_speed();
            enemy.pos += direction_to(enemy.pos, target) * speed * dt;
        }
    }
}

/// Advance projectiles; release any that left the field
pub fn move_projectiles(state: &mut GameState, dt: f32) {
    let field = state.field();
    for index in state.projectiles.indices() {
        let Some(proj) = state.projectiles.get_mut(index) else {
            continue;
        };
        proj.pos += proj.vel * dt;
        if outside_field(proj.pos, field, OFFFIELD_MARGIN) {
            state.projectiles.release(index);
        }
    }
}

/// Gems inside the magnet radius fly straight at the player
pub fn move_gems(state: &mut GameState, dt: f32) {
    let target = state.player.pos;
    let magnet_radius = state.config.gem.magnet_radius + state.player.magnet_bonus;
    let speed = state.config.gem.magnet_speed;
    for index in state.gems.indices() {
        let Some(gem) = state.gems.get_mut(index) else {
            continue;
        };
        if gem.pos.distance(target) <= magnet_radius {
            gem.pos += direction_to(gem.pos, target) * speed * dt;
        }
    }
}

/// Demo steering: flee the nearest close enemy, otherwise collect gems,
/// otherwise drift back toward the middle of the field
pub fn idle_intent(state: &GameState) -> MoveIntent {
    const DANGER_RADIUS: f32 = 220.0;
    let me = state.player.pos;

    let threat = nearest(me, state.enemies.iter().map(|(i, e)| (i, e.pos)))
        .and_then(|i| state.enemies.get(i))
        .filter(|e| e.pos.distance(me) < DANGER_RADIUS);
    if let Some(enemy) = threat {
        let away = direction_to(enemy.pos, me);
        // Slide along walls instead of pinning into a corner
        let center = state.field() / 2.0;
        let steer = away + direction_to(me, center) * 0.35;
        return MoveIntent::toward(steer);
    }

    let gems = state.gems.iter().map(|(i, g)| (i, g.pos));
    if let Some(gem) = nearest(me, gems).and_then(|i| state.gems.get(i)) {
        return MoveIntent::toward(gem.pos - me);
    }

    let center = state.field() / 2.0;
    if me.distance(center) > 40.0 {
        MoveIntent::toward(center - me)
    } else {
        MoveIntent::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::state::{StatusEffect, StatusKind};

    fn state() -> GameState {
        GameState::new(SimConfig::default(), 11)
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let intent = MoveIntent {
            up: true,
            right: true,
            ..Default::default()
        };
        assert!((intent.direction().length() - 1.0).abs() < 1e-5);
        let cancel = MoveIntent {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(cancel.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_player_moves_and_clamps() {
        let mut s = state();
        let start = s.player.pos;
        let right = MoveIntent {
            right: true,
            ..Default::default()
        };
        move_player(&mut s, &right, 0.1);
        assert!((s.player.pos.x - (start.x + 27.0)).abs() < 1e-3);

        move_player(&mut s, &right, 100.0);
        assert_eq!(s.player.pos.x, s.config.field_width - s.player.radius);
    }

    #[test]
    fn test_dash_requires_unlock_and_cooldown() {
        let mut s = state();
        let right = MoveIntent {
            right: true,
            ..Default::default()
        };
        assert!(!try_dash(&mut s, &right));

        s.player.dash.unlocked = true;
        s.now = 1000.0;
        assert!(try_dash(&mut s, &right));
        assert_eq!(s.player.dash.until, 1150.0);
        assert!(s.player.is_invulnerable(1100.0));
        assert!(!try_dash(&mut s, &right), "already dashing");

        let start = s.player.pos.x;
        move_player(&mut s, &MoveIntent::default(), 0.01);
        assert!((s.player.pos.x - (start + 7.0)).abs() < 1e-3, "dash keeps its trigger direction");

        // Dash ends, cooldown starts
        s.now = 1150.0;
        move_player(&mut s, &MoveIntent::default(), 0.01);
        assert!(!s.player.dash.active, "dash ends exactly at its duration");
        assert_eq!(s.player.dash.ready_at, 3650.0);
        assert!(!try_dash(&mut s, &right));
        s.now = 1150.0 + 2500.0;
        assert!(try_dash(&mut s, &right));
    }

    #[test]
    fn test_dash_without_input_stays_put() {
        let mut s = state();
        s.player.dash.unlocked = true;
        assert!(try_dash(&mut s, &MoveIntent::default()));
        let start = s.player.pos;
        move_player(&mut s, &MoveIntent::default(), 0.05);
        assert_eq!(s.player.pos, start);
    }

    #[test]
    fn test_enemy_seeks_and_freeze_slows() {
        let mut s = state();
        let p = s.player.pos;
        let a = s.spawn_enemy(p - Vec2::new(100.0, 0.0), 20.0, 100.0);
        let b = s.spawn_enemy(p + Vec2::new(100.0, 0.0), 20.0, 100.0);
        s.enemies.get_mut(b).unwrap().effects.push(StatusEffect {
            kind: StatusKind::Freeze,
            magnitude: 0.5,
            expires_at: 10_000.0,
            last_tick: 0.0,
        });

        move_enemies(&mut s, 0.1);
        assert!((s.enemies.get(a).unwrap().pos.x - (p.x - 90.0)).abs() < 1e-3);
        assert!((s.enemies.get(b).unwrap().pos.x - (p.x + 95.0)).abs() < 1e-3);
    }

    #[test]
    fn test_projectile_released_off_field() {
        let mut s = state();
        let i = s.spawn_projectile(Vec2::new(10.0, 10.0), Vec2::new(-1.0, 0.0));
        move_projectiles(&mut s, 0.1);
        assert!(s.projectiles.is_live(i));
        move_projectiles(&mut s, 1.0);
        assert!(!s.projectiles.is_live(i));
    }

    #[test]
    fn test_gem_magnet() {
        let mut s = state();
        let p = s.player.pos;
        let near = s.spawn_gem(p + Vec2::new(100.0, 0.0), 1);
        let far = s.spawn_gem(p + Vec2::new(300.0, 0.0), 1);
        move_gems(&mut s, 0.1);
        assert!((s.gems.get(near).unwrap().pos.x - (p.x + 52.0)).abs() < 1e-3);
        assert_eq!(s.gems.get(far).unwrap().pos.x, p.x + 300.0);

        // Magnet bonus widens the pull radius
        s.player.magnet_bonus = 200.0;
        move_gems(&mut s, 0.1);
        assert!(s.gems.get(far).unwrap().pos.x < p.x + 300.0);
    }

    #[test]
    fn test_idle_flees_nearest_enemy() {
        let mut s = state();
        let p = s.player.pos;
        s.spawn_enemy(p + Vec2::new(100.0, 0.0), 20.0, 85.0);
        let intent = idle_intent(&s);
        assert!(intent.left && !intent.right);
    }
}
