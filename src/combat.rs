//! Combat Engine — turn-based resolution between one survivor and one opponent
//!
//! ## Architecture
//! ```text
//! StartCombat / StartBotCombat → snapshot opponent + survivor health
//!   └→ PerformAttack / PerformMagicAttack / AttackBot
//!        └→ resolve_attack(): player strikes, then the opponent strikes
//!           back only if it survived; first side at 0 health ends the
//!           session in the same call
//! ```
//!
//! The session is a server-owned field on the profile: health values are
//! never accepted as client input, only move downward, and are cleared the
//! moment either side reaches zero. Reward crediting happens in the API
//! layer through `progression`, so the resolution itself stays pure.

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::profile::{CombatSession, EnemyDef, Opponent, PlayerProfile};
use crate::stats::{self, StatBlock};

// ============================================================================
// Attack kinds and outcomes
// ============================================================================

/// Which stat the player's strike is driven by. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackKind {
    Physical,
    Magic,
}

/// Who won a resolved session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player,
    Enemy,
}

/// The result of a single attack call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub damage_to_enemy: u64,
    /// Zero when the enemy died to the player's strike (no counterattack).
    pub damage_to_player: u64,
    /// Set exactly when the session ended on this call.
    pub winner: Option<Winner>,
}

// ============================================================================
// Session transitions
// ============================================================================

/// Start a combat session against a client-chosen enemy definition.
///
/// Fails with `AlreadyInCombat` if a session is ongoing and with
/// `NoActiveSurvivor` if the profile has no active survivor. Enemy health
/// snapshots from the definition; player health from the survivor's
/// effective max health (equipment included).
pub fn start_enemy_combat(
    profile: &PlayerProfile,
    enemy: EnemyDef,
) -> Result<CombatSession, GameError> {
    let player = starting_player_stats(profile)?;
    Ok(CombatSession {
        enemy_health: enemy.health,
        player_health: player.health,
        player_max_health: player.health,
        opponent: Opponent::Enemy(enemy),
        ongoing: true,
    })
}

/// Start a combat session against a catalog bot.
///
/// Bot max health derives from `difficulty * 100`; the remaining combat
/// stats derive from difficulty in `bot_stats`.
pub fn start_bot_combat(
    profile: &PlayerProfile,
    bot: &crate::catalog::Bot,
) -> Result<CombatSession, GameError> {
    let player = starting_player_stats(profile)?;
    Ok(CombatSession {
        enemy_health: bot.difficulty * 100,
        player_health: player.health,
        player_max_health: player.health,
        opponent: Opponent::Bot {
            id: bot.id,
            name: bot.name.clone(),
            difficulty: bot.difficulty,
            reward_currency: bot.reward_currency,
            reward_exp: bot.reward_exp,
        },
        ongoing: true,
    })
}

/// Resolve one attack against the session's opponent.
///
/// Player strikes first with the chosen stat; if the opponent survives it
/// strikes back in the same call. Health never goes below zero. When either
/// side reaches zero the session is marked not ongoing and the winner is
/// reported; the caller clears the session and settles rewards.
pub fn resolve_attack(
    session: &mut CombatSession,
    player: &StatBlock,
    kind: AttackKind,
) -> AttackOutcome {
    let (enemy_attack, enemy_defense) = opponent_combat_stats(&session.opponent);

    let strike = match kind {
        AttackKind::Physical => player.attack,
        AttackKind::Magic => player.magic,
    };

    let damage_to_enemy = stats::damage(strike, enemy_defense);
    session.enemy_health = session.enemy_health.saturating_sub(damage_to_enemy);

    if session.enemy_health == 0 {
        session.ongoing = false;
        return AttackOutcome {
            damage_to_enemy,
            damage_to_player: 0,
            winner: Some(Winner::Player),
        };
    }

    let damage_to_player = stats::damage(enemy_attack, player.defense);
    session.player_health = session.player_health.saturating_sub(damage_to_player);

    let winner = if session.player_health == 0 {
        session.ongoing = false;
        Some(Winner::Enemy)
    } else {
        None
    };

    AttackOutcome {
        damage_to_enemy,
        damage_to_player,
        winner,
    }
}

/// Reward values carried by the session's opponent (unscaled).
pub fn opponent_rewards(opponent: &Opponent) -> (u64, u64) {
    match opponent {
        Opponent::Enemy(e) => (e.gold_reward, e.exp_reward),
        Opponent::Bot {
            reward_currency,
            reward_exp,
            ..
        } => (*reward_currency, *reward_exp),
    }
}

/// Display name of the session's opponent.
pub fn opponent_name(opponent: &Opponent) -> &str {
    match opponent {
        Opponent::Enemy(e) => &e.name,
        Opponent::Bot { name, .. } => name,
    }
}

/// Attack and defense used when the opponent strikes back or soaks a hit.
fn opponent_combat_stats(opponent: &Opponent) -> (u64, u64) {
    match opponent {
        Opponent::Enemy(e) => (e.attack, e.defense),
        Opponent::Bot { difficulty, .. } => bot_stats(*difficulty),
    }
}

/// Combat stats derived from a bot's difficulty. Only max health is fixed
/// by the interface contract (`difficulty * 100`); attack and defense scale
/// with difficulty so harder bots hit harder and soak more.
pub fn bot_stats(difficulty: u64) -> (u64, u64) {
    (difficulty * 10, difficulty * 5)
}

/// Effective stats for a combat start: rejects a second session, requires
/// an active survivor.
fn starting_player_stats(profile: &PlayerProfile) -> Result<StatBlock, GameError> {
    if profile.combat.as_ref().is_some_and(|c| c.ongoing) {
        return Err(GameError::AlreadyInCombat);
    }
    attacking_player_stats(profile)
}

/// Stats used for an attack call: recomputed on every read so an equip
/// between attacks takes effect immediately.
pub fn attacking_player_stats(profile: &PlayerProfile) -> Result<StatBlock, GameError> {
    let survivor = profile
        .active_survivor()
        .ok_or(GameError::NoActiveSurvivor)?;
    Ok(stats::effective_stats(
        survivor.stats,
        profile.equipped_weapon(),
        profile.equipped_pet(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Survivor;

    fn enemy(health: u64, attack: u64, defense: u64) -> EnemyDef {
        EnemyDef {
            name: "Goblin Scout".into(),
            health,
            attack,
            defense,
            speed: 8,
            magic: 2,
            gold_reward: 100,
            exp_reward: 50,
        }
    }

    fn profile_with_survivor(stats: StatBlock) -> PlayerProfile {
        let mut p = PlayerProfile::new(Vec::new());
        let mut s = Survivor::new("Ellis".into(), stats);
        s.stats = stats;
        p.survivors.push(s);
        p.active_survivor = Some("Ellis".into());
        p
    }

    fn stats(health: u64, attack: u64, defense: u64, magic: u64) -> StatBlock {
        StatBlock {
            health,
            attack,
            defense,
            speed: 5,
            magic,
            level: 1,
        }
    }

    #[test]
    fn start_requires_active_survivor() {
        let p = PlayerProfile::new(Vec::new());
        let err = start_enemy_combat(&p, enemy(50, 10, 5)).unwrap_err();
        assert!(matches!(err, GameError::NoActiveSurvivor));
    }

    #[test]
    fn start_rejects_second_session() {
        let mut p = profile_with_survivor(stats(100, 20, 10, 5));
        p.combat = Some(start_enemy_combat(&p, enemy(50, 10, 5)).unwrap());
        let err = start_enemy_combat(&p, enemy(50, 10, 5)).unwrap_err();
        assert!(matches!(err, GameError::AlreadyInCombat));
    }

    #[test]
    fn attack_applies_floored_damage_both_ways() {
        let player = stats(100, 20, 20, 5);
        let p = profile_with_survivor(player);
        // Enemy defense 8 → player deals 12; enemy attack 10 vs defense 20 → 1 back.
        let mut session = start_enemy_combat(&p, enemy(50, 10, 8)).unwrap();
        let out = resolve_attack(&mut session, &player, AttackKind::Physical);
        assert_eq!(out.damage_to_enemy, 12);
        assert_eq!(out.damage_to_player, 1);
        assert_eq!(session.enemy_health, 38);
        assert_eq!(session.player_health, 99);
        assert!(out.winner.is_none());
        assert!(session.ongoing);
    }

    #[test]
    fn magic_attack_uses_magic_stat() {
        let player = stats(100, 5, 20, 30);
        let p = profile_with_survivor(player);
        let mut session = start_enemy_combat(&p, enemy(50, 10, 8)).unwrap();
        let out = resolve_attack(&mut session, &player, AttackKind::Magic);
        assert_eq!(out.damage_to_enemy, 22);
    }

    #[test]
    fn killing_blow_skips_counterattack() {
        let player = stats(100, 20, 0, 5);
        let p = profile_with_survivor(player);
        let mut session = start_enemy_combat(&p, enemy(12, 50, 8)).unwrap();
        let out = resolve_attack(&mut session, &player, AttackKind::Physical);
        assert_eq!(out.winner, Some(Winner::Player));
        assert_eq!(out.damage_to_player, 0);
        assert_eq!(session.enemy_health, 0);
        assert_eq!(session.player_health, 100);
        assert!(!session.ongoing);
    }

    #[test]
    fn player_defeat_ends_session_at_exactly_zero() {
        let player = stats(3, 1, 0, 1);
        let p = profile_with_survivor(player);
        // Player chips 1 per turn into 100 health; enemy lands 3 per turn.
        let mut session = start_enemy_combat(&p, enemy(100, 3, 50)).unwrap();
        let out = resolve_attack(&mut session, &player, AttackKind::Physical);
        assert_eq!(out.winner, Some(Winner::Enemy));
        assert_eq!(session.player_health, 0);
        assert!(!session.ongoing);
    }

    #[test]
    fn health_is_monotonically_non_increasing() {
        let player = stats(100, 10, 2, 5);
        let p = profile_with_survivor(player);
        let mut session = start_enemy_combat(&p, enemy(60, 6, 4)).unwrap();
        let mut last_enemy = session.enemy_health;
        let mut last_player = session.player_health;
        while session.ongoing {
            resolve_attack(&mut session, &player, AttackKind::Physical);
            assert!(session.enemy_health <= last_enemy);
            assert!(session.player_health <= last_player);
            last_enemy = session.enemy_health;
            last_player = session.player_health;
        }
        assert!(session.enemy_health == 0 || session.player_health == 0);
    }

    #[test]
    fn bot_session_health_derives_from_difficulty() {
        let player = stats(100, 20, 10, 5);
        let p = profile_with_survivor(player);
        let bot = crate::catalog::Bot {
            id: 1,
            name: "Training Bot".into(),
            description: "".into(),
            url: "".into(),
            difficulty: 3,
            reward_currency: 500,
            reward_exp: 200,
        };
        let session = start_bot_combat(&p, &bot).unwrap();
        assert_eq!(session.enemy_health, 300);
        assert_eq!(opponent_rewards(&session.opponent), (500, 200));
        assert_eq!(opponent_name(&session.opponent), "Training Bot");
    }
}
