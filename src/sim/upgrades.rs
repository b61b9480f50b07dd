//! Upgrade catalog and effect interpreter
//!
//! Catalog entries are plain data: an `UpgradeEffect` variant with typed
//! parameters, interpreted by `apply_effect` against the player.

use serde::{Deserialize, Serialize};

use super::state::{Player, StatusKind};
use crate::consts::SHIELD_PER_LEVEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Attack,
    Defense,
    Utility,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legend,
}

impl Rarity {
    /// Copies of an entry placed in the weighted offer pool
    pub fn weight(self) -> usize {
        match self {
            Rarity::Common => 60,
            Rarity::Rare => 25,
            Rarity::Epic => 12,
            Rarity::Legend => 3,
        }
    }
}

/// Player stats an upgrade can modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stat {
    Damage,
    ProjectileCooldown,
    ProjectileCount,
    ProjectileSpeed,
    CritChance,
    CritMult,
    AreaScale,
    Pierce,
    Chain,
    Knockback,
    MaxHp,
    Speed,
    Shield,
    MagnetBonus,
    XpGainMult,
    Rerolls,
    Banishes,
    Lifesteal,
}

/// What choosing an upgrade does
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    /// `stat += amount`
    Add(Stat, f32),
    /// `stat *= factor`
    Scale(Stat, f32),
    /// Raise max hp and heal to full
    Vitality(f32),
    /// Reflect damage onto enemies that land contact hits
    Thorns(f32),
    /// Raise the on-hit roll for a status effect
    Status {
        kind: StatusKind,
        chance: f32,
        magnitude: f32,
        duration_ms: f64,
    },
    UnlockDash,
}

/// Eligibility gate over current acquisitions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Requirement {
    Owns(&'static str),
}

impl Requirement {
    pub fn is_met(&self, player: &Player) -> bool {
        match *self {
            Requirement::Owns(id) => player.owns(id),
        }
    }
}

/// An immutable catalog entry
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub rarity: Rarity,
    pub max_level: u32,
    pub effect: UpgradeEffect,
    pub requires: Option<Requirement>,
    /// Not offered while any of these is owned
    pub excludes: &'static [&'static str],
}

impl UpgradeDef {
    /// Not maxed, not banned, and gated requirements pass
    pub fn is_eligible(&self, player: &Player) -> bool {
        if player.upgrade_level(self.id) >= self.max_level {
            return false;
        }
        if player.banned.contains(self.id) {
            return false;
        }
        if self.requires.is_some_and(|req| !req.is_met(player)) {
            return false;
        }
        !self.excludes.iter().any(|ex| player.owns(ex))
    }
}

fn add_count(count: &mut u32, amount: f32) {
    *count = count.saturating_add(amount.max(0.0).round() as u32);
}

fn scale_count(count: &mut u32, factor: f32) {
    *count = (*count as f32 * factor).round().max(0.0) as u32;
}

/// Apply an effect to the player
pub fn apply_effect(player: &mut Player, effect: &UpgradeEffect) {
    match *effect {
        UpgradeEffect::Add(stat, amount) => match stat {
            Stat::Damage => player.damage += amount,
            Stat::ProjectileCooldown => {
                player.projectile_cooldown_ms =
                    (player.projectile_cooldown_ms + amount as f64).max(0.0)
            }
            Stat::ProjectileCount => add_count(&mut player.projectile_count, amount),
            Stat::ProjectileSpeed => player.projectile_speed += amount,
            Stat::CritChance => player.crit_chance = (player.crit_chance + amount).min(1.0),
            Stat::CritMult => player.crit_mult += amount,
            Stat::AreaScale => player.area_scale += amount,
            Stat::Pierce => add_count(&mut player.pierce, amount),
            Stat::Chain => add_count(&mut player.chain, amount),
            Stat::Knockback => player.knockback += amount,
            Stat::MaxHp => player.max_hp += amount,
            Stat::Speed => player.speed += amount,
            Stat::Shield => player.shield += amount,
            Stat::MagnetBonus => player.magnet_bonus += amount,
            Stat::XpGainMult => player.xp_gain_mult += amount,
            Stat::Rerolls => add_count(&mut player.rerolls, amount),
            Stat::Banishes => add_count(&mut player.banishes, amount),
            Stat::Lifesteal => player.lifesteal += amount,
        },
        UpgradeEffect::Scale(stat, factor) => match stat {
            Stat::Damage => player.damage *= factor,
            Stat::ProjectileCooldown => player.projectile_cooldown_ms *= factor as f64,
            Stat::ProjectileCount => scale_count(&mut player.projectile_count, factor),
            Stat::ProjectileSpeed => player.projectile_speed *= factor,
            Stat::CritChance => player.crit_chance = (player.crit_chance * factor).min(1.0),
            Stat::CritMult => player.crit_mult *= factor,
            Stat::AreaScale => player.area_scale *= factor,
            Stat::Pierce => scale_count(&mut player.pierce, factor),
            Stat::Chain => scale_count(&mut player.chain, factor),
            Stat::Knockback => player.knockback *= factor,
            Stat::MaxHp => player.max_hp *= factor,
            Stat::Speed => player.speed *= factor,
            Stat::Shield => player.shield *= factor,
            Stat::MagnetBonus => player.magnet_bonus *= factor,
            Stat::XpGainMult => player.xp_gain_mult *= factor,
            Stat::Rerolls => scale_count(&mut player.rerolls, factor),
            Stat::Banishes => scale_count(&mut player.banishes, factor),
            Stat::Lifesteal => player.lifesteal *= factor,
        },
        UpgradeEffect::Vitality(amount) => {
            player.max_hp += amount;
            player.hp = player.max_hp;
        }
        UpgradeEffect::Thorns(amount) => {
            player.upgrades.entry("thorns".to_string()).or_default().value += amount;
        }
        UpgradeEffect::Status {
            kind,
            chance,
            magnitude,
            duration_ms,
        } => {
            let stats = player.status.get_mut(kind);
            stats.chance = (stats.chance + chance).min(1.0);
            stats.magnitude += magnitude;
            if kind == StatusKind::Freeze {
                stats.magnitude = stats.magnitude.min(0.9);
            }
            stats.duration_ms = stats.duration_ms.max(duration_ms);
        }
        UpgradeEffect::UnlockDash => player.dash.unlocked = true,
    }
}

/// Shield capacity for a stacked shield-upgrade level
pub fn shield_capacity(level: u32) -> f32 {
    level as f32 * SHIELD_PER_LEVEL
}

/// The shipped upgrade catalog
pub fn default_catalog() -> Vec<UpgradeDef> {
    use Category::*;
    use Rarity::*;

    fn def(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        category: Category,
        rarity: Rarity,
        max_level: u32,
        effect: UpgradeEffect,
    ) -> UpgradeDef {
        UpgradeDef {
            id,
            name,
            description,
            category,
            rarity,
            max_level,
            effect,
            requires: None,
            excludes: &[],
        }
    }

    vec![
        // Attack
        def(
            "damage",
            "Damage +15%",
            "All attacks deal 15% more damage.",
            Attack,
            Common,
            5,
            UpgradeEffect::Scale(Stat::Damage, 1.15),
        ),
        def(
            "cooldown",
            "Attack Speed +12%",
            "Attack cooldown is reduced by 12%.",
            Attack,
            Common,
            5,
            UpgradeEffect::Scale(Stat::ProjectileCooldown, 0.88),
        ),
        def(
            "projCount",
            "Projectiles +1",
            "Fire one more projectile per volley.",
            Attack,
            Epic,
            2,
            UpgradeEffect::Add(Stat::ProjectileCount, 1.0),
        ),
        def(
            "critChance",
            "Critical Chance +5%",
            "Hits are 5% more likely to be critical.",
            Attack,
            Rare,
            3,
            UpgradeEffect::Add(Stat::CritChance, 0.05),
        ),
        def(
            "critMult",
            "Critical Damage +50%",
            "Critical hits deal 50% more damage.",
            Attack,
            Epic,
            2,
            UpgradeEffect::Add(Stat::CritMult, 0.5),
        ),
        def(
            "areaScale",
            "Area +15%",
            "Projectiles grow larger and hit wider.",
            Attack,
            Rare,
            3,
            UpgradeEffect::Scale(Stat::AreaScale, 1.15),
        ),
        def(
            "pierce",
            "Pierce +1",
            "Projectiles pass through one more enemy.",
            Attack,
            Rare,
            3,
            UpgradeEffect::Add(Stat::Pierce, 1.0),
        ),
        UpgradeDef {
            requires: Some(Requirement::Owns("pierce")),
            ..def(
                "chain",
                "Chain +1",
                "Projectiles that kill jump to the nearest enemy.",
                Attack,
                Epic,
                2,
                UpgradeEffect::Add(Stat::Chain, 1.0),
            )
        },
        def(
            "knockback",
            "Knockback",
            "Hits push enemies back.",
            Attack,
            Common,
            3,
            UpgradeEffect::Add(Stat::Knockback, 12.0),
        ),
        UpgradeDef {
            excludes: &["poison"],
            ..def(
                "burn",
                "Burning Shots",
                "Hits may set enemies ablaze.",
                Attack,
                Rare,
                3,
                UpgradeEffect::Status {
                    kind: StatusKind::Burn,
                    chance: 0.15,
                    magnitude: 3.0,
                    duration_ms: 3000.0,
                },
            )
        },
        UpgradeDef {
            excludes: &["burn"],
            ..def(
                "poison",
                "Venom Shots",
                "Hits may poison enemies for a long time.",
                Attack,
                Rare,
                3,
                UpgradeEffect::Status {
                    kind: StatusKind::Poison,
                    chance: 0.2,
                    magnitude: 2.0,
                    duration_ms: 5000.0,
                },
            )
        },
        def(
            "freeze",
            "Frost Shots",
            "Hits may slow enemies.",
            Attack,
            Rare,
            3,
            UpgradeEffect::Status {
                kind: StatusKind::Freeze,
                chance: 0.1,
                magnitude: 0.3,
                duration_ms: 2000.0,
            },
        ),
        // Defense / mobility
        def(
            "maxHp",
            "Max HP +25",
            "Max HP increases by 25 and fully heals.",
            Defense,
            Common,
            5,
            UpgradeEffect::Vitality(25.0),
        ),
        def(
            "speed",
            "Move Speed +10%",
            "Move 10% faster.",
            Defense,
            Common,
            4,
            UpgradeEffect::Scale(Stat::Speed, 1.10),
        ),
        def(
            "shield",
            "Shield +40",
            "Gain a damage-absorbing shield, recharged on level up.",
            Defense,
            Rare,
            3,
            UpgradeEffect::Add(Stat::Shield, SHIELD_PER_LEVEL),
        ),
        def(
            "thorns",
            "Thorns +4",
            "Enemies that hit you take 4 damage.",
            Defense,
            Rare,
            3,
            UpgradeEffect::Thorns(4.0),
        ),
        def(
            "dash",
            "Dash",
            "Unlock a short invulnerable dash.",
            Defense,
            Rare,
            1,
            UpgradeEffect::UnlockDash,
        ),
        // Utility
        def(
            "magnetBonus",
            "Magnet +60",
            "Gems are attracted from further away.",
            Utility,
            Common,
            3,
            UpgradeEffect::Add(Stat::MagnetBonus, 60.0),
        ),
        def(
            "xpGainMult",
            "XP Gain +15%",
            "Gain 15% more experience.",
            Utility,
            Rare,
            4,
            UpgradeEffect::Add(Stat::XpGainMult, 0.15),
        ),
        def(
            "reroll",
            "Reroll +1",
            "Redraw the level-up offers once.",
            Utility,
            Common,
            3,
            UpgradeEffect::Add(Stat::Rerolls, 1.0),
        ),
        def(
            "banish",
            "Banish +1",
            "Remove an unwanted upgrade from future offers.",
            Utility,
            Epic,
            3,
            UpgradeEffect::Add(Stat::Banishes, 1.0),
        ),
        // Special
        def(
            "lifesteal",
            "Lifesteal",
            "Heal 2 HP for every kill.",
            Special,
            Legend,
            1,
            UpgradeEffect::Add(Stat::Lifesteal, 2.0),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::state::AcquiredUpgrade;
    use glam::Vec2;

    fn player() -> Player {
        Player::new(&SimConfig::default(), Vec2::ZERO)
    }

    fn find(id: &str) -> UpgradeDef {
        default_catalog().into_iter().find(|u| u.id == id).unwrap()
    }

    fn owned(level: u32) -> AcquiredUpgrade {
        AcquiredUpgrade { level, value: 0.0 }
    }

    #[test]
    fn test_catalog_ids_unique() {
        let catalog = default_catalog();
        let mut ids: Vec<_> = catalog.iter().map(|u| u.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
        assert!(catalog.iter().all(|u| u.max_level >= 1));
    }

    #[test]
    fn test_scale_and_add_effects() {
        let mut p = player();
        apply_effect(&mut p, &find("damage").effect);
        assert!((p.damage - 11.5).abs() < 1e-4);
        apply_effect(&mut p, &find("cooldown").effect);
        assert!((p.projectile_cooldown_ms - 792.0).abs() < 1e-3);
        apply_effect(&mut p, &find("reroll").effect);
        assert_eq!(p.rerolls, 1);
    }

    #[test]
    fn test_vitality_heals_to_new_max() {
        let mut p = player();
        p.hp = 10.0;
        apply_effect(&mut p, &find("maxHp").effect);
        assert_eq!(p.max_hp, 125.0);
        assert_eq!(p.hp, 125.0);
    }

    #[test]
    fn test_thorns_accumulate() {
        let mut p = player();
        let thorns = find("thorns");
        apply_effect(&mut p, &thorns.effect);
        apply_effect(&mut p, &thorns.effect);
        assert_eq!(p.thorns(), 8.0);
    }

    #[test]
    fn test_status_and_dash() {
        let mut p = player();
        apply_effect(&mut p, &find("burn").effect);
        assert_eq!(p.status.burn.chance, 0.15);
        assert_eq!(p.status.burn.duration_ms, 3000.0);
        apply_effect(&mut p, &find("dash").effect);
        assert!(p.dash.unlocked);
    }

    #[test]
    fn test_eligibility_gates() {
        let mut p = player();
        let chain = find("chain");
        assert!(!chain.is_eligible(&p), "chain requires pierce");
        p.upgrades.insert("pierce".into(), Default::default());
        p.upgrades.get_mut("pierce").unwrap().level = 1;
        assert!(chain.is_eligible(&p));

        let poison = find("poison");
        assert!(poison.is_eligible(&p));
        p.upgrades.insert("burn".into(), owned(1));
        assert!(!poison.is_eligible(&p), "poison excluded by burn");

        let lifesteal = find("lifesteal");
        p.banned.insert("lifesteal".into());
        assert!(!lifesteal.is_eligible(&p));
    }

    #[test]
    fn test_maxed_entry_not_eligible() {
        let mut p = player();
        let lifesteal = find("lifesteal");
        p.upgrades.insert("lifesteal".into(), owned(1));
        assert!(!lifesteal.is_eligible(&p));
    }
}
