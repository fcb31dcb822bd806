//! Per-caller game state records
//!
//! `PlayerProfile` is the single mutable record the engine owns for each
//! caller. Every remote call reads it, applies one transition, and writes it
//! back under the caller's profile lock. Nested collections (survivors,
//! weapons, pets, killers) are exclusively owned by the profile; catalog
//! data lives in `crate::catalog` and is shared across all callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::Killer;
use crate::stats::StatBlock;

/// Maximum number of rebirths in the aura prestige loop.
pub const MAX_REBIRTH_COUNT: u64 = 1_000_000;

/// Survivor level ceiling enforced by `AdminSetLevel`.
pub const MAX_SURVIVOR_LEVEL: u64 = 2_400;

/// A playable survivor owned by a profile. `name` is the identity key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Survivor {
    pub name: String,
    pub level: u64,
    /// Experience within the current level. The level-up threshold is
    /// `level * 100`, applied repeatedly (see `progression::apply_experience`).
    pub experience: u64,
    pub stats: StatBlock,
}

impl Survivor {
    /// A fresh survivor at level 1 with the given base stats.
    pub fn new(name: String, mut stats: StatBlock) -> Self {
        stats.level = 1;
        Self {
            name,
            level: 1,
            experience: 0,
            stats,
        }
    }
}

/// An owned weapon. Bonuses are flat additions to effective combat stats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    pub name: String,
    pub description: String,
    pub attack_bonus: u64,
    pub defense_bonus: u64,
    pub speed_bonus: u64,
    pub magic_bonus: u64,
}

/// An owned pet. `level_bonus` is a combat modifier (added to effective
/// level); `experience_bonus` and `drop_rate_bonus` are percentages applied
/// to combat rewards only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub name: String,
    pub description: String,
    pub experience_bonus: u64,
    pub level_bonus: u64,
    pub drop_rate_bonus: u64,
}

/// Role assigned to a caller identity. Closed set, exhaustively matched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

/// An event logged through the admin panel, stored per caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminPanelEvent {
    pub id: u64,
    pub event_name: String,
    pub description: String,
    /// Caller-supplied timestamp (the engine does not read wall clocks).
    pub timestamp: u64,
}

/// The opponent snapshotted into a combat session when it starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Opponent {
    /// Client-chosen enemy, snapshotted verbatim at start.
    Enemy(EnemyDef),
    /// Server-resolved bot; combat stats derive from `difficulty`.
    Bot {
        id: u64,
        name: String,
        difficulty: u64,
        reward_currency: u64,
        reward_exp: u64,
    },
}

/// Enemy definition as supplied on `StartCombat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnemyDef {
    pub name: String,
    pub health: u64,
    pub attack: u64,
    pub defense: u64,
    pub speed: u64,
    pub magic: u64,
    pub gold_reward: u64,
    pub exp_reward: u64,
}

/// The single active combat encounter for a profile.
///
/// Health fields are server-owned: they are never accepted as client input
/// and only move downward until one of them reaches zero, which clears the
/// session in the same call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CombatSession {
    pub opponent: Opponent,
    pub enemy_health: u64,
    pub player_health: u64,
    /// Effective max health of the survivor at session start, kept so
    /// status queries can report a stable denominator.
    pub player_max_health: u64,
    pub ongoing: bool,
}

/// The complete per-caller game-state record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub currency: u64,
    pub survivors: Vec<Survivor>,
    /// Name of the survivor used for combat, if one has been chosen.
    pub active_survivor: Option<String>,
    /// Per-profile killer roster, seeded from the catalog at creation.
    pub killers: Vec<Killer>,
    pub weapons: Vec<Weapon>,
    pub pets: Vec<Pet>,
    pub equipped_weapon: Option<String>,
    pub equipped_pet: Option<String>,
    pub inventory: Vec<String>,
    pub completed_quests: BTreeSet<u64>,
    pub opened_crates: BTreeSet<u64>,
    pub collected_keys: BTreeSet<String>,
    pub active_dungeon: Option<u64>,
    pub has_admin_panel: bool,
    pub storyline_progress: u64,
    pub following: BTreeSet<String>,
    pub followers: BTreeSet<String>,
    // Aura clicker state
    pub aura_power: u64,
    pub aura_level: u64,
    pub rebirth_count: u64,
    pub rebirth_multiplier: u64,
    /// At most one active combat session.
    pub combat: Option<CombatSession>,
}

impl PlayerProfile {
    /// A fresh profile with the killer roster seeded from the catalog.
    pub fn new(killers: Vec<Killer>) -> Self {
        Self {
            currency: 0,
            survivors: Vec::new(),
            active_survivor: None,
            killers,
            weapons: Vec::new(),
            pets: Vec::new(),
            equipped_weapon: None,
            equipped_pet: None,
            inventory: Vec::new(),
            completed_quests: BTreeSet::new(),
            opened_crates: BTreeSet::new(),
            collected_keys: BTreeSet::new(),
            active_dungeon: None,
            has_admin_panel: false,
            storyline_progress: 0,
            following: BTreeSet::new(),
            followers: BTreeSet::new(),
            aura_power: 0,
            aura_level: 1,
            rebirth_count: 0,
            rebirth_multiplier: 1,
            combat: None,
        }
    }

    pub fn survivor(&self, name: &str) -> Option<&Survivor> {
        self.survivors.iter().find(|s| s.name == name)
    }

    pub fn survivor_mut(&mut self, name: &str) -> Option<&mut Survivor> {
        self.survivors.iter_mut().find(|s| s.name == name)
    }

    /// The survivor currently selected for combat.
    pub fn active_survivor(&self) -> Option<&Survivor> {
        self.active_survivor
            .as_deref()
            .and_then(|name| self.survivor(name))
    }

    pub fn weapon(&self, name: &str) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.name == name)
    }

    pub fn pet(&self, name: &str) -> Option<&Pet> {
        self.pets.iter().find(|p| p.name == name)
    }

    /// The equipped weapon record, resolved against the owned collection.
    pub fn equipped_weapon(&self) -> Option<&Weapon> {
        self.equipped_weapon
            .as_deref()
            .and_then(|name| self.weapon(name))
    }

    /// The equipped pet record, resolved against the owned collection.
    pub fn equipped_pet(&self) -> Option<&Pet> {
        self.equipped_pet.as_deref().and_then(|name| self.pet(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_stats() -> StatBlock {
        StatBlock {
            health: 100,
            attack: 20,
            defense: 10,
            speed: 5,
            magic: 8,
            level: 7, // overwritten by Survivor::new
        }
    }

    #[test]
    fn new_survivor_starts_at_level_one() {
        let s = Survivor::new("Ellis".into(), base_stats());
        assert_eq!(s.level, 1);
        assert_eq!(s.experience, 0);
        assert_eq!(s.stats.level, 1);
    }

    #[test]
    fn new_profile_has_empty_collections_and_aura_defaults() {
        let p = PlayerProfile::new(Vec::new());
        assert_eq!(p.currency, 0);
        assert!(p.survivors.is_empty());
        assert!(p.combat.is_none());
        assert_eq!(p.aura_level, 1);
        assert_eq!(p.rebirth_multiplier, 1);
        assert!(!p.has_admin_panel);
    }

    #[test]
    fn equipped_lookups_resolve_against_owned_collections() {
        let mut p = PlayerProfile::new(Vec::new());
        p.weapons.push(Weapon {
            name: "Rusty Axe".into(),
            description: "Seen better days".into(),
            attack_bonus: 5,
            defense_bonus: 0,
            speed_bonus: 0,
            magic_bonus: 0,
        });
        // Equipping a name that is not owned resolves to nothing.
        p.equipped_weapon = Some("Excalibur".into());
        assert!(p.equipped_weapon().is_none());

        p.equipped_weapon = Some("Rusty Axe".into());
        assert_eq!(p.equipped_weapon().unwrap().attack_bonus, 5);
    }
}
