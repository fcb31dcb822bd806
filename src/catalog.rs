//! Catalog definitions — shared, read-mostly game content
//!
//! Killers, dungeons, bots, and shop items are process-wide definition data:
//! seeded once at startup by `storage::seed_data`, immutable afterwards
//! except through explicit admin-add operations, and never owned by any
//! single profile. Per-profile state that references catalog entries
//! (completed quest ids, opened crate ids, killer unlock flags) lives on
//! `PlayerProfile`.

use serde::{Deserialize, Serialize};

use crate::stats::StatBlock;

/// A killer definition. Unlock order is the fixed total order of `id`;
/// "unlock next" always targets the lowest-id locked entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Killer {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub url: String,
    pub unlocked: bool,
    pub stats: StatBlock,
    /// Currency threshold shown in the UI. Informational only: the unlock
    /// operations do not re-validate it (observed contract).
    pub unlock_criteria: Option<u64>,
    pub storyline: Option<String>,
}

/// A quest inside a dungeon. Completion is tracked per profile via
/// `completed_quests`, never on the dungeon itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub reward_currency: u64,
    /// Key granted on completion, if any. Keys gate crate unlocks.
    pub reward_key: Option<String>,
}

/// A lootable crate inside a dungeon, gated by a named key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CrateDef {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub location: String,
    pub required_key: String,
    pub reward: u64,
}

/// A dungeon map: ordered quests and crates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dungeon {
    pub id: u64,
    pub name: String,
    pub difficulty: u64,
    pub description: String,
    pub quests: Vec<Quest>,
    pub crates: Vec<CrateDef>,
}

impl Dungeon {
    pub fn quest(&self, id: u64) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn crate_def(&self, id: u64) -> Option<&CrateDef> {
        self.crates.iter().find(|c| c.id == id)
    }
}

/// An AI bot opponent. Resolved server-side by id on `StartBotCombat` so
/// clients cannot tamper with stats; max health is `difficulty * 100`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub url: String,
    pub difficulty: u64,
    pub reward_currency: u64,
    pub reward_exp: u64,
}

/// What a shop entry unlocks. Closed set, exhaustively matched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ShopItemKind {
    /// Grants the admin panel flag; its price is authoritative for
    /// `PurchaseAdminPanel`.
    AdminPanel,
    /// Display-only inventory item.
    Cosmetic,
}

/// A purchasable shop entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub kind: ShopItemKind,
}
