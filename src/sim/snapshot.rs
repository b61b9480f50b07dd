//! Read-only views of the state for renderers and HUDs
//!
//! Building a snapshot never mutates the simulation.

use glam::Vec2;
use serde::Serialize;

use super::state::{GamePhase, GameState};
use super::upgrades::Rarity;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub radius: f32,
    /// Toggles every 100ms during invulnerability
    pub blinking: bool,
    pub dashing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub hp_fraction: f32,
    pub frozen: bool,
    pub burning: bool,
    pub poisoned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GemView {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub value: u32,
}

/// Everything a renderer draws for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub field: Vec2,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub gems: Vec<GemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnedUpgradeView {
    pub name: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
    pub level: u32,
}

/// Numbers and lists shown around the playfield
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub hp: f32,
    pub max_hp: f32,
    pub shield: f32,
    pub level: u32,
    pub xp: f32,
    pub next_level_xp: f32,
    /// Seconds of play
    pub elapsed: f32,
    /// `elapsed` as `MM:SS`
    pub elapsed_label: String,
    pub win_time: f32,
    /// Sorted by display name
    pub upgrades: Vec<OwnedUpgradeView>,
    pub offers: Vec<OfferView>,
    pub rerolls: u32,
    pub banishes: u32,
    pub banish_mode: bool,
}

/// Whole minutes and seconds, zero padded
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub fn build_render_snapshot(state: &GameState) -> RenderSnapshot {
    use super::state::StatusKind;

    let player = &state.player;
    RenderSnapshot {
        field: state.field(),
        player: PlayerView {
            pos: player.pos,
            radius: player.radius,
            blinking: player.blinking(state.now),
            dashing: player.dash.active,
        },
        enemies: state
            .enemies
            .iter()
            .map(|(_, e)| {
                let has = |kind: StatusKind| e.effects.iter().any(|fx| fx.kind == kind);
                let hp_fraction = if e.max_hp > 0.0 {
                    (e.hp / e.max_hp).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                EnemyView {
                    id: e.id,
                    pos: e.pos,
                    radius: e.radius,
                    hp_fraction,
                    frozen: has(StatusKind::Freeze),
                    burning: has(StatusKind::Burn),
                    poisoned: has(StatusKind::Poison),
                }
            })
            .collect(),
        projectiles: state
            .projectiles
            .iter()
            .map(|(_, p)| ProjectileView {
                id: p.id,
                pos: p.pos,
                radius: p.radius * player.area_scale,
            })
            .collect(),
        gems: state
            .gems
            .iter()
            .map(|(_, g)| GemView {
                id: g.id,
                pos: g.pos,
                radius: g.radius,
                value: g.value,
            })
            .collect(),
    }
}

pub fn build_hud_snapshot(state: &GameState) -> HudSnapshot {
    let player = &state.player;
    let display_name = |id: &str| {
        state
            .catalog
            .iter()
            .find(|u| u.id == id)
            .map_or_else(|| id.to_string(), |u| u.name.to_string())
    };

    let mut upgrades: Vec<OwnedUpgradeView> = player
        .upgrades
        .iter()
        .filter(|(_, u)| u.level > 0)
        .map(|(id, u)| OwnedUpgradeView {
            name: display_name(id),
            level: u.level,
        })
        .collect();
    upgrades.sort_by(|a, b| a.name.cmp(&b.name));

    let offers = state
        .level_up
        .offers
        .iter()
        .filter_map(|&i| state.catalog.get(i))
        .map(|u| OfferView {
            id: u.id.to_string(),
            name: u.name.to_string(),
            description: u.description.to_string(),
            rarity: u.rarity,
            level: player.upgrade_level(u.id),
        })
        .collect();

    HudSnapshot {
        phase: state.phase,
        hp: player.hp,
        max_hp: player.max_hp,
        shield: player.shield,
        level: player.level,
        xp: player.xp,
        next_level_xp: player.next_level_xp,
        elapsed: state.game_time,
        elapsed_label: format_clock(state.game_time),
        win_time: state.config.win_time,
        upgrades,
        offers,
        rerolls: player.rerolls,
        banishes: player.banishes,
        banish_mode: state.level_up.banish_mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::progression;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(61.9), "01:01");
        assert_eq!(format_clock(600.0), "10:00");
    }

    #[test]
    fn test_hud_upgrades_sorted_by_name() {
        let mut s = GameState::new(SimConfig::default(), 2);
        for id in ["speed", "damage", "pierce"] {
            s.player.upgrades.entry(id.into()).or_default().level = 1;
        }
        let hud = build_hud_snapshot(&s);
        let names: Vec<_> = hud.upgrades.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Damage +15%", "Move Speed +10%", "Pierce +1"]);
    }

    #[test]
    fn test_hud_lists_offers() {
        let mut s = GameState::new(SimConfig::default(), 2);
        s.player.xp = 50.0;
        progression::check_level_up(&mut s);
        let hud = build_hud_snapshot(&s);
        assert_eq!(hud.phase, GamePhase::LevelUp);
        assert_eq!(hud.offers.len(), s.level_up.offers.len());
        assert_eq!(hud.offers[0].id, s.catalog[s.level_up.offers[0]].id);
    }

    #[test]
    fn test_render_snapshot_blinks_during_iframes() {
        let mut s = GameState::new(SimConfig::default(), 2);
        s.spawn_enemy(Vec2::new(10.0, 10.0), 20.0, 80.0);
        s.spawn_gem(Vec2::new(20.0, 20.0), 2);
        s.player.iframe_until = 650.0;
        s.now = 50.0;
        let snap = build_render_snapshot(&s);
        assert!(snap.player.blinking);
        assert_eq!(snap.enemies.len(), 1);
        assert_eq!(snap.enemies[0].hp_fraction, 1.0);
        assert_eq!(snap.gems[0].value, 2);

        s.now = 150.0;
        assert!(!build_render_snapshot(&s).player.blinking);
    }
}
