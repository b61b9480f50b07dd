//! Game state and core simulation types
//!
//! `GameState` is the single owner of everything a run mutates: the player,
//! the three live entity rosters, spawner, level-up screen and RNG.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::progression::{LevelUpScreen, next_level_xp};
use super::registry::Roster;
use super::spawner::Spawner;
use super::upgrades::{UpgradeDef, default_catalog};
use crate::config::SimConfig;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Simulation suspended while an upgrade is chosen
    LevelUp,
    /// Player hp reached zero
    GameOver,
    /// Survived until the win time
    Won,
}

impl GamePhase {
    /// Whether the frame loop stops scheduling simulation steps
    pub fn is_suspended(self) -> bool {
        self != GamePhase::Playing
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Won)
    }
}

/// Damage-over-time and crowd-control effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Burn,
    Freeze,
    Poison,
}

impl StatusKind {
    pub const ALL: [StatusKind; 3] = [StatusKind::Burn, StatusKind::Freeze, StatusKind::Poison];

    /// Freeze slows instead of dealing periodic damage
    pub fn deals_damage(self) -> bool {
        self != StatusKind::Freeze
    }
}

/// The player's roll table for one status kind
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusStats {
    /// Probability per hit
    pub chance: f32,
    /// Damage per tick (burn/poison) or slow fraction (freeze)
    pub magnitude: f32,
    /// Effect length (ms)
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusLoadout {
    pub burn: StatusStats,
    pub freeze: StatusStats,
    pub poison: StatusStats,
}

impl StatusLoadout {
    pub fn get(&self, kind: StatusKind) -> &StatusStats {
        match kind {
            StatusKind::Burn => &self.burn,
            StatusKind::Freeze => &self.freeze,
            StatusKind::Poison => &self.poison,
        }
    }

    pub fn get_mut(&mut self, kind: StatusKind) -> &mut StatusStats {
        match kind {
            StatusKind::Burn => &mut self.burn,
            StatusKind::Freeze => &mut self.freeze,
            StatusKind::Poison => &mut self.poison,
        }
    }
}

/// An effect currently running on an enemy (timestamps in wall-clock ms)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub magnitude: f32,
    pub expires_at: f64,
    pub last_tick: f64,
}

/// Stacked level of an owned upgrade plus any accumulated effect value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AcquiredUpgrade {
    pub level: u32,
    /// Accumulated magnitude for structured effects (thorns damage)
    pub value: f32,
}

/// Dash ability state (timestamps in wall-clock ms)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashState {
    pub unlocked: bool,
    pub active: bool,
    pub ready_at: f64,
    pub until: f64,
    /// Direction locked in when the dash started
    pub direction: Vec2,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Absorbs damage before hp
    pub shield: f32,
    pub speed: f32,
    pub level: u32,
    pub xp: f32,
    pub next_level_xp: f32,

    // Weapon
    pub damage: f32,
    pub projectile_speed: f32,
    pub projectile_cooldown_ms: f64,
    pub projectile_count: u32,
    pub projectile_radius: f32,
    pub last_shot_at: f64,
    pub crit_chance: f32,
    pub crit_mult: f32,
    pub pierce: u32,
    pub chain: u32,
    pub knockback: f32,
    pub area_scale: f32,
    pub status: StatusLoadout,

    // Sustain and utility
    pub lifesteal: f32,
    pub magnet_bonus: f32,
    pub xp_gain_mult: f32,
    pub rerolls: u32,
    pub banishes: u32,

    pub upgrades: BTreeMap<String, AcquiredUpgrade>,
    pub banned: BTreeSet<String>,

    pub dash: DashState,
    /// Time between dashes (ms)
    pub dash_cooldown_ms: f64,
    pub dash_speed: f32,
    /// How long a dash lasts (ms)
    pub dash_duration_ms: f64,
    /// Contact damage is ignored until this wall-clock time (ms)
    pub iframe_until: f64,
}

impl Player {
    pub fn new(config: &SimConfig, pos: Vec2) -> Self {
        let p = &config.player;
        Self {
            pos,
            radius: p.radius,
            hp: p.max_hp,
            max_hp: p.max_hp,
            shield: 0.0,
            speed: p.speed,
            level: 1,
            xp: 0.0,
            next_level_xp: next_level_xp(&config.leveling, 1),
            damage: p.damage,
            projectile_speed: p.projectile_speed,
            projectile_cooldown_ms: p.projectile_cooldown_ms,
            projectile_count: 1,
            projectile_radius: p.projectile_radius,
            last_shot_at: 0.0,
            crit_chance: p.crit_chance,
            crit_mult: p.crit_mult,
            pierce: 0,
            chain: 0,
            knockback: 0.0,
            area_scale: 1.0,
            status: StatusLoadout::default(),
            lifesteal: 0.0,
            magnet_bonus: 0.0,
            xp_gain_mult: 1.0,
            rerolls: 0,
            banishes: 0,
            upgrades: BTreeMap::new(),
            banned: BTreeSet::new(),
            dash: DashState::default(),
            dash_cooldown_ms: p.dash_cooldown_ms,
            dash_speed: p.dash_speed,
            dash_duration_ms: p.dash_duration_ms,
            iframe_until: 0.0,
        }
    }

    /// Apply incoming damage: shield first, overflow to hp, hp clamped at 0.
    /// Returns the hp actually lost.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let absorbed = self.shield.min(amount);
        self.shield -= absorbed;
        let overflow = amount - absorbed;
        let before = self.hp;
        self.hp = (self.hp - overflow).max(0.0);
        before - self.hp
    }

    /// Heal without exceeding max hp
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    pub fn upgrade_level(&self, id: &str) -> u32 {
        self.upgrades.get(id).map_or(0, |u| u.level)
    }

    pub fn owns(&self, id: &str) -> bool {
        self.upgrade_level(id) > 0
    }

    /// Damage reflected onto an enemy that lands a contact hit
    pub fn thorns(&self) -> f32 {
        self.upgrades.get("thorns").map_or(0.0, |u| u.value)
    }

    #[inline]
    pub fn is_invulnerable(&self, now: f64) -> bool {
        now <= self.iframe_until
    }

    /// Sprite flicker while invulnerable (100 ms on/off)
    pub fn blinking(&self, now: f64) -> bool {
        now < self.iframe_until && (now / 100.0).floor() as i64 % 2 == 0
    }
}

/// An enemy entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub base_speed: f32,
    pub damage: f32,
    pub effects: Vec<StatusEffect>,
    /// Set once the death transition has run
    pub dying: bool,
}

impl Enemy {
    /// Movement speed after any active freeze slow
    pub fn current_speed(&self) -> f32 {
        let slow = self
            .effects
            .iter()
            .find(|e| e.kind == StatusKind::Freeze)
            .map_or(0.0, |e| e.magnitude.clamp(0.0, 1.0));
        self.base_speed * (1.0 - slow)
    }
}

/// A projectile entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Remaining pierce charges
    pub pierce: u32,
    /// Remaining chain charges
    pub chain: u32,
    pub speed: f32,
    /// Ids of enemies already damaged by this projectile
    pub hit: Vec<u32>,
}

/// An experience gem
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Gem {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub value: u32,
}

/// Things that happened during a tick, drained by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned { id: u32 },
    EnemyKilled { id: u32, pos: Vec2 },
    PlayerHit { damage: f32, hp: f32 },
    GemCollected { xp: f32 },
    LevelUp { level: u32 },
    UpgradeApplied { id: String, level: u32 },
    UpgradeBanished { id: String },
    OffersRerolled,
    Paused,
    Resumed,
    GameOver { time: f32 },
    Won { time: f32 },
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: SimConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Seconds of simulated play (frozen while suspended)
    pub game_time: f32,
    /// Most recent wall-clock timestamp seen (ms)
    pub now: f64,
    pub player: Player,
    pub enemies: Roster<Enemy>,
    pub projectiles: Roster<Projectile>,
    pub gems: Roster<Gem>,
    pub spawner: Spawner,
    pub catalog: Vec<UpgradeDef>,
    pub level_up: LevelUpScreen,
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new run with the default upgrade catalog
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self::with_catalog(config, seed, default_catalog())
    }

    pub fn with_catalog(config: SimConfig, seed: u64, catalog: Vec<UpgradeDef>) -> Self {
        let center = Vec2::new(config.field_width / 2.0, config.field_height / 2.0);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            game_time: 0.0,
            now: 0.0,
            player: Player::new(&config, center),
            enemies: Roster::new(),
            projectiles: Roster::new(),
            gems: Roster::new(),
            spawner: Spawner::new(&config.spawn),
            catalog,
            level_up: LevelUpScreen::default(),
            events: Vec::new(),
            next_id: 1,
            config,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Field size as a vector
    pub fn field(&self) -> Vec2 {
        Vec2::new(self.config.field_width, self.config.field_height)
    }

    /// Drop released slots from every live list
    pub fn compact(&mut self) {
        self.enemies.compact();
        self.projectiles.compact();
        self.gems.compact();
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Acquire and fully initialise an enemy slot
    pub fn spawn_enemy(&mut self, pos: Vec2, hp: f32, speed: f32) -> usize {
        let id = self.next_entity_id();
        let radius = self.config.enemy.radius;
        let damage = self.config.enemy.contact_damage;
        let (index, enemy) = self.enemies.spawn();
        enemy.id = id;
        enemy.pos = pos;
        enemy.radius = radius;
        enemy.hp = hp;
        enemy.max_hp = hp;
        enemy.base_speed = speed;
        enemy.damage = damage;
        enemy.effects.clear();
        enemy.dying = false;
        self.events.push(GameEvent::EnemySpawned { id });
        index
    }

    /// Acquire and fully initialise a gem slot
    pub fn spawn_gem(&mut self, pos: Vec2, value: u32) -> usize {
        let id = self.next_entity_id();
        let radius = self.config.gem.radius;
        let (index, gem) = self.gems.spawn();
        gem.id = id;
        gem.pos = pos;
        gem.radius = radius;
        gem.value = value;
        index
    }

    /// Acquire and fully initialise a projectile slot from the player's current stats
    pub fn spawn_projectile(&mut self, pos: Vec2, dir: Vec2) -> usize {
        let id = self.next_entity_id();
        let p = &self.player;
        let (radius, damage, pierce, chain, speed) =
            (p.projectile_radius, p.damage, p.pierce, p.chain, p.projectile_speed);
        let (index, proj) = self.projectiles.spawn();
        proj.id = id;
        proj.pos = pos;
        proj.vel = dir * speed;
        proj.radius = radius;
        proj.damage = damage;
        proj.pierce = pierce;
        proj.chain = chain;
        proj.speed = speed;
        proj.hit.clear();
        index
    }
}
