//! Progression & Economy — experience curves, reward scaling, currency
//!
//! Shared mutators invoked by the combat, dungeon, and aura services.
//! The level curve is `level * 100` experience per level, applied
//! repeatedly, so a large grant can carry a survivor through several
//! levels in one call. Currency is a plain unsigned ledger: additive
//! credits, checked debits, no partial application on error.

use crate::error::GameError;
use crate::profile::{Pet, Survivor, MAX_SURVIVOR_LEVEL};

/// Experience required to advance from `level` to `level + 1`.
pub fn experience_for_level(level: u64) -> u64 {
    level * 100
}

/// Apply earned experience to a survivor, leveling up repeatedly while the
/// within-level experience meets the threshold. Returns levels gained.
///
/// The stat-block level is kept in step with the survivor level so that
/// effective-stat reads never disagree with the progression state.
pub fn apply_experience(survivor: &mut Survivor, amount: u64) -> u64 {
    survivor.experience += amount;
    let mut gained = 0;
    while survivor.experience >= experience_for_level(survivor.level) {
        survivor.experience -= experience_for_level(survivor.level);
        survivor.level += 1;
        gained += 1;
    }
    survivor.stats.level = survivor.level;
    gained
}

/// Scale combat rewards by the equipped pet's economy bonuses.
///
/// `experience_bonus` and `drop_rate_bonus` are percentages: a pet with
/// `experience_bonus = 25` turns 100 base experience into 125. Integer
/// division floors the result. No pet means no scaling.
pub fn scaled_rewards(base_currency: u64, base_exp: u64, pet: Option<&Pet>) -> (u64, u64) {
    match pet {
        Some(p) => (
            base_currency * (100 + p.drop_rate_bonus) / 100,
            base_exp * (100 + p.experience_bonus) / 100,
        ),
        None => (base_currency, base_exp),
    }
}

/// Clamp an admin-supplied level into the legal range.
pub fn clamp_level(level: u64) -> u64 {
    level.clamp(1, MAX_SURVIVOR_LEVEL)
}

/// Deduct `price` from `currency`, failing without mutation when the
/// balance is short.
pub fn debit(currency: &mut u64, price: u64) -> Result<(), GameError> {
    if *currency < price {
        return Err(GameError::InsufficientFunds {
            required: price,
            available: *currency,
        });
    }
    *currency -= price;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatBlock;

    fn survivor() -> Survivor {
        Survivor::new(
            "Ellis".into(),
            StatBlock {
                health: 100,
                attack: 20,
                defense: 10,
                speed: 5,
                magic: 8,
                level: 1,
            },
        )
    }

    #[test]
    fn small_grant_does_not_level() {
        let mut s = survivor();
        assert_eq!(apply_experience(&mut s, 99), 0);
        assert_eq!(s.level, 1);
        assert_eq!(s.experience, 99);
    }

    #[test]
    fn threshold_grant_levels_once_and_carries_remainder() {
        let mut s = survivor();
        assert_eq!(apply_experience(&mut s, 150), 1);
        assert_eq!(s.level, 2);
        assert_eq!(s.experience, 50);
        assert_eq!(s.stats.level, 2);
    }

    #[test]
    fn large_grant_levels_repeatedly() {
        let mut s = survivor();
        // 100 + 200 + 300 = 600 to reach level 4.
        assert_eq!(apply_experience(&mut s, 600), 3);
        assert_eq!(s.level, 4);
        assert_eq!(s.experience, 0);
    }

    #[test]
    fn pet_scaling_floors_the_result() {
        let pet = Pet {
            name: "Ember Fox".into(),
            description: "".into(),
            experience_bonus: 33,
            level_bonus: 0,
            drop_rate_bonus: 10,
        };
        let (currency, exp) = scaled_rewards(105, 50, Some(&pet));
        assert_eq!(currency, 115); // 105 * 110 / 100 = 115.5 → 115
        assert_eq!(exp, 66); // 50 * 133 / 100 = 66.5 → 66
    }

    #[test]
    fn no_pet_means_no_scaling() {
        assert_eq!(scaled_rewards(100, 50, None), (100, 50));
    }

    #[test]
    fn clamp_level_bounds() {
        assert_eq!(clamp_level(0), 1);
        assert_eq!(clamp_level(1), 1);
        assert_eq!(clamp_level(2_400), 2_400);
        assert_eq!(clamp_level(9_999), 2_400);
    }

    #[test]
    fn debit_rejects_short_balance_without_mutation() {
        let mut currency = 50;
        let err = debit(&mut currency, 100).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientFunds {
                required: 100,
                available: 50
            }
        ));
        assert_eq!(currency, 50);

        debit(&mut currency, 50).unwrap();
        assert_eq!(currency, 0);
    }
}
