//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (live lists keep spawn order)
//! - Wall-clock time arrives through `TickInput::now`, never read directly
//! - No rendering or platform dependencies

pub mod collision;
pub mod combat;
pub mod movement;
pub mod pool;
pub mod progression;
pub mod registry;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod upgrades;

pub use movement::MoveIntent;
pub use pool::Pool;
pub use progression::LevelUpScreen;
pub use registry::Roster;
pub use snapshot::{HudSnapshot, RenderSnapshot, build_hud_snapshot, build_render_snapshot};
pub use state::{Enemy, GameEvent, GamePhase, GameState, Gem, Player, Projectile, StatusKind};
pub use tick::{TickInput, tick};
pub use upgrades::{Rarity, UpgradeDef, UpgradeEffect, default_catalog};
