//! Seed Data — initial catalog content
//!
//! Populates the catalog store with the launch content: the thirteen-killer
//! roster, the dungeon maps with their quests and crates, the AI bot
//! ladder, and the shop. Seeding is idempotent (fixed ids, plain
//! overwrites) and runs on every startup.

use tracing::info;

use super::catalog_store::CatalogStore;
use super::StoreError;
use crate::catalog::{Bot, CrateDef, Dungeon, Killer, Quest, ShopItem, ShopItemKind};
use crate::stats::StatBlock;

/// Seed every catalog database.
pub fn seed_all(store: &CatalogStore) -> Result<(), StoreError> {
    seed_killers(store)?;
    seed_dungeons(store)?;
    seed_bots(store)?;
    seed_shop(store)?;

    let stats = store.stats()?;
    info!(
        "seeded catalog: {} killers, {} dungeons, {} bots, {} shop items",
        stats.killers, stats.dungeons, stats.bots, stats.shop_items
    );
    Ok(())
}

fn killer(
    id: u64,
    name: &str,
    description: &str,
    stats: StatBlock,
    unlock_criteria: Option<u64>,
    storyline: Option<&str>,
) -> Killer {
    Killer {
        id,
        name: name.into(),
        description: description.into(),
        url: format!("/assets/killers/{}.png", id),
        unlocked: false,
        stats,
        unlock_criteria,
        storyline: storyline.map(Into::into),
    }
}

fn stats(health: u64, attack: u64, defense: u64, speed: u64, magic: u64, level: u64) -> StatBlock {
    StatBlock {
        health,
        attack,
        defense,
        speed,
        magic,
        level,
    }
}

/// The fixed thirteen-killer roster. Unlock order is id order.
fn seed_killers(store: &CatalogStore) -> Result<(), StoreError> {
    let roster = vec![
        killer(
            1,
            "Jason",
            "The first hunter to breach the veil.",
            stats(200, 35, 25, 10, 15, 5),
            None,
            Some("He never speaks. The machete does."),
        ),
        killer(
            2,
            "Coolkidd",
            "A glitch that learned to want things.",
            stats(250, 40, 30, 12, 20, 8),
            Some(5_000),
            None,
        ),
        killer(
            3,
            "1x1x1x1",
            "Nobody agrees on what it is.",
            stats(300, 45, 35, 15, 25, 12),
            Some(10_000),
            Some("Old servers whisper its name in hex."),
        ),
        killer(
            4,
            "Noli",
            "Stares back from every mirror.",
            stats(350, 50, 40, 18, 30, 16),
            Some(25_000),
            None,
        ),
        killer(
            5,
            "Spydersammy",
            "Webs the corridors before you arrive.",
            stats(400, 55, 45, 20, 35, 20),
            Some(50_000),
            None,
        ),
        killer(
            6,
            "Doodle",
            "Drawn in crayon. Kills in earnest.",
            stats(450, 60, 50, 22, 40, 25),
            Some(75_000),
            None,
        ),
        killer(
            7,
            "Arkey",
            "Keeps trophies from every chase.",
            stats(500, 65, 55, 25, 45, 30),
            Some(100_000),
            None,
        ),
        killer(
            8,
            "Caylus",
            "Laughs first. Strikes second.",
            stats(550, 70, 60, 28, 50, 35),
            Some(150_000),
            None,
        ),
        killer(
            9,
            "Steak",
            "Rare. Dangerously so.",
            stats(600, 75, 65, 30, 55, 40),
            Some(200_000),
            None,
        ),
        killer(
            10,
            "Cruz",
            "Moves like a rumor.",
            stats(650, 80, 70, 32, 60, 45),
            Some(250_000),
            None,
        ),
        killer(
            11,
            "King Arkey",
            "Arkey, crowned by the survivors he's taken.",
            stats(700, 85, 75, 35, 65, 50),
            Some(400_000),
            Some("The crown is made of dungeon keys."),
        ),
        killer(
            12,
            "67 Kid",
            "Counts to sixty-seven. Then it starts.",
            stats(750, 90, 80, 38, 70, 55),
            Some(450_000),
            None,
        ),
        killer(
            13,
            "Zeus",
            "The storm at the bottom of the last floor.",
            stats(1_000, 100, 100, 50, 100, 60),
            Some(500_000),
            Some("Thunder in a place with no sky."),
        ),
    ];

    for k in &roster {
        store.put_killer(k)?;
    }
    Ok(())
}

fn seed_dungeons(store: &CatalogStore) -> Result<(), StoreError> {
    let dungeons = vec![
        Dungeon {
            id: 1,
            name: "Flooded Mines".into(),
            difficulty: 1,
            description: "Collapsed shafts below the old camp. Something pumps the water out.".into(),
            quests: vec![
                Quest {
                    id: 101,
                    name: "Clear the Entrance".into(),
                    description: "Drive the scavengers off the winch platform.".into(),
                    reward_currency: 250,
                    reward_key: None,
                },
                Quest {
                    id: 102,
                    name: "Restart the Pumps".into(),
                    description: "Find the pump room and bring it back online.".into(),
                    reward_currency: 600,
                    reward_key: Some("Rusty Key".into()),
                },
            ],
            crates: vec![CrateDef {
                id: 151,
                name: "Foreman's Cache".into(),
                description: "A lockbox bolted under the winch.".into(),
                location: "Winch platform".into(),
                required_key: "Rusty Key".into(),
                reward: 1_500,
            }],
        },
        Dungeon {
            id: 2,
            name: "Hollow Chapel".into(),
            difficulty: 3,
            description: "The pews face away from the altar. They were moved recently.".into(),
            quests: vec![
                Quest {
                    id: 201,
                    name: "Light the Braziers".into(),
                    description: "Four braziers, four corners, one match.".into(),
                    reward_currency: 1_200,
                    reward_key: None,
                },
                Quest {
                    id: 202,
                    name: "Read the Ledger".into(),
                    description: "The sexton kept names. Find out whose.".into(),
                    reward_currency: 2_000,
                    reward_key: Some("Silver Key".into()),
                },
            ],
            crates: vec![
                CrateDef {
                    id: 251,
                    name: "Reliquary".into(),
                    description: "Silver-chased and cold to the touch.".into(),
                    location: "Behind the altar".into(),
                    required_key: "Silver Key".into(),
                    reward: 4_000,
                },
                CrateDef {
                    id: 252,
                    name: "Sexton's Trunk".into(),
                    description: "Still smells of candle smoke.".into(),
                    location: "Bell tower".into(),
                    required_key: "Silver Key".into(),
                    reward: 2_500,
                },
            ],
        },
        Dungeon {
            id: 3,
            name: "The Undervault".into(),
            difficulty: 6,
            description: "Maps of it disagree with each other. All of them are right.".into(),
            quests: vec![Quest {
                id: 301,
                name: "Survey the Threshold".into(),
                description: "Chart the first gallery and come back breathing.".into(),
                reward_currency: 5_000,
                reward_key: Some("Obsidian Key".into()),
            }],
            crates: vec![CrateDef {
                id: 351,
                name: "Vault Core".into(),
                description: "The reason the maps disagree.".into(),
                location: "Lowest gallery".into(),
                required_key: "Obsidian Key".into(),
                reward: 20_000,
            }],
        },
    ];

    for d in &dungeons {
        store.put_dungeon(d)?;
    }
    Ok(())
}

fn seed_bots(store: &CatalogStore) -> Result<(), StoreError> {
    let bots = vec![
        Bot {
            id: 1,
            name: "Drill Sergeant".into(),
            description: "Training unit. Hits exactly as hard as the manual says.".into(),
            url: "/assets/bots/1.png".into(),
            difficulty: 1,
            reward_currency: 150,
            reward_exp: 75,
        },
        Bot {
            id: 2,
            name: "Patrol Unit 7".into(),
            description: "Walks the same route. Learns yours.".into(),
            url: "/assets/bots/2.png".into(),
            difficulty: 3,
            reward_currency: 600,
            reward_exp: 300,
        },
        Bot {
            id: 3,
            name: "Siegebreaker".into(),
            description: "Decommissioned twice. Unimpressed both times.".into(),
            url: "/assets/bots/3.png".into(),
            difficulty: 6,
            reward_currency: 2_000,
            reward_exp: 900,
        },
        Bot {
            id: 4,
            name: "Null Warden".into(),
            description: "The ladder ends here.".into(),
            url: "/assets/bots/4.png".into(),
            difficulty: 10,
            reward_currency: 6_000,
            reward_exp: 2_500,
        },
    ];

    for b in &bots {
        store.put_bot(b)?;
    }
    Ok(())
}

fn seed_shop(store: &CatalogStore) -> Result<(), StoreError> {
    let items = vec![
        ShopItem {
            id: "admin_panel".into(),
            name: "Admin Panel".into(),
            description: "Full control over your own game state.".into(),
            price: 10_000,
            kind: ShopItemKind::AdminPanel,
        },
        ShopItem {
            id: "banner_crimson".into(),
            name: "Crimson Banner".into(),
            description: "Flies over your profile page.".into(),
            price: 500,
            kind: ShopItemKind::Cosmetic,
        },
        ShopItem {
            id: "banner_midnight".into(),
            name: "Midnight Banner".into(),
            description: "Barely visible. That's the point.".into(),
            price: 500,
            kind: ShopItemKind::Cosmetic,
        },
    ];

    for i in &items {
        store.put_shop_item(i)?;
    }
    Ok(())
}
