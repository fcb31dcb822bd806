//! Stat model — base stats plus additive equipment bonuses
//!
//! Effective combat stats are recomputed on every read from the survivor's
//! base block, the equipped weapon's bonuses, and the equipped pet's level
//! bonus. Nothing derived is ever cached on the survivor record, so an
//! equip/unequip takes effect on the very next call. Composition is pure
//! addition; there is no multiplicative stacking.

use serde::{Deserialize, Serialize};

use crate::profile::{Pet, Weapon};

/// The six-field stat block shared by survivors, killers, and enemies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatBlock {
    pub health: u64,
    pub attack: u64,
    pub defense: u64,
    pub speed: u64,
    pub magic: u64,
    pub level: u64,
}

/// Effective combat stats for a survivor with the given equipment.
///
/// Weapon bonuses add to attack/defense/speed/magic; the pet's level bonus
/// adds to level only. Pet experience and drop-rate bonuses are economy
/// modifiers and do not appear here.
pub fn effective_stats(base: StatBlock, weapon: Option<&Weapon>, pet: Option<&Pet>) -> StatBlock {
    let mut stats = base;
    if let Some(w) = weapon {
        stats.attack += w.attack_bonus;
        stats.defense += w.defense_bonus;
        stats.speed += w.speed_bonus;
        stats.magic += w.magic_bonus;
    }
    if let Some(p) = pet {
        stats.level += p.level_bonus;
    }
    stats
}

/// Damage dealt by an attack stat against a defense stat.
///
/// Floored at 1 so every exchange makes progress and combat terminates even
/// against targets whose defense exceeds the attack.
pub fn damage(attack: u64, defense: u64) -> u64 {
    attack.saturating_sub(defense).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon() -> Weapon {
        Weapon {
            name: "Runed Blade".into(),
            description: "Hums faintly".into(),
            attack_bonus: 7,
            defense_bonus: 2,
            speed_bonus: 1,
            magic_bonus: 3,
        }
    }

    fn pet() -> Pet {
        Pet {
            name: "Ember Fox".into(),
            description: "Warm to the touch".into(),
            experience_bonus: 25,
            level_bonus: 4,
            drop_rate_bonus: 10,
        }
    }

    #[test]
    fn bare_stats_pass_through() {
        let base = StatBlock {
            health: 100,
            attack: 20,
            defense: 5,
            speed: 9,
            magic: 12,
            level: 3,
        };
        assert_eq!(effective_stats(base, None, None), base);
    }

    #[test]
    fn weapon_adds_to_combat_stats_only() {
        let base = StatBlock {
            health: 100,
            attack: 20,
            defense: 5,
            speed: 9,
            magic: 12,
            level: 3,
        };
        let eff = effective_stats(base, Some(&weapon()), None);
        assert_eq!(eff.attack, 27);
        assert_eq!(eff.defense, 7);
        assert_eq!(eff.speed, 10);
        assert_eq!(eff.magic, 15);
        assert_eq!(eff.health, 100);
        assert_eq!(eff.level, 3);
    }

    #[test]
    fn pet_adds_to_level_only() {
        let base = StatBlock {
            health: 100,
            attack: 20,
            defense: 5,
            speed: 9,
            magic: 12,
            level: 3,
        };
        let eff = effective_stats(base, None, Some(&pet()));
        assert_eq!(eff.level, 7);
        assert_eq!(eff.attack, 20);
        assert_eq!(eff.health, 100);
    }

    #[test]
    fn damage_is_attack_minus_defense() {
        // Spec example: attack 20 vs defense 8 deals 12.
        assert_eq!(damage(20, 8), 12);
    }

    #[test]
    fn damage_floors_at_one() {
        // Spec example: attack 10 vs defense 20 still deals 1.
        assert_eq!(damage(10, 20), 1);
        assert_eq!(damage(0, 0), 1);
    }
}
