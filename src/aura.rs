//! Aura Clicker — incremental power accumulation with a prestige reset
//!
//! Power is cumulative: level-ups are a derived threshold check, not a
//! resource spend, so leveling never subtracts from accumulated power.
//! Rebirth is the one-way prestige reset: it wipes power and level in
//! exchange for a permanent click multiplier and a quadratically harder
//! level curve.

use crate::error::GameError;
use crate::profile::{PlayerProfile, MAX_REBIRTH_COUNT};

/// Aura power required to reach `level + 1` from `level`.
///
/// `level * 100`, scaled by `rebirth²` once the profile has rebirthed.
pub fn level_requirement(level: u64, rebirth_count: u64) -> u64 {
    let rebirth_scale = if rebirth_count == 0 {
        1
    } else {
        rebirth_count * rebirth_count
    };
    level * 100 * rebirth_scale
}

/// One click: gain `rebirth_multiplier` power, then absorb any level-ups
/// whose threshold the cumulative power now meets.
pub fn click(profile: &mut PlayerProfile) {
    profile.aura_power += profile.rebirth_multiplier;
    while profile.aura_power >= level_requirement(profile.aura_level, profile.rebirth_count) {
        profile.aura_level += 1;
    }
}

/// Prestige reset. Fails with `MaxRebirthReached` at the cap, leaving the
/// profile untouched; otherwise bumps the count, doubles it into the
/// multiplier, and wipes power and level.
pub fn rebirth(profile: &mut PlayerProfile) -> Result<(), GameError> {
    if profile.rebirth_count >= MAX_REBIRTH_COUNT {
        return Err(GameError::MaxRebirthReached);
    }
    profile.rebirth_count += 1;
    profile.rebirth_multiplier = profile.rebirth_count * 2;
    profile.aura_power = 0;
    profile.aura_level = 1;
    Ok(())
}
