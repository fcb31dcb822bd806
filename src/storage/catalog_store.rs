//! Catalog Store — LMDB-backed definition data shared by all callers
//!
//! Killers, dungeons, bots, and shop items are loaded once at startup and
//! read on the hot path of nearly every call. Entries are keyed by id
//! (big-endian, so iteration order is numeric id order — the killer unlock
//! order depends on this) and encoded with bincode.
//!
//! Catalog reads take no profile lock: the data is read-mostly and only
//! ever extended by explicit admin-add operations.

use heed::{Database, Env, EnvOpenOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::StoreError;
use crate::catalog::{Bot, Dungeon, Killer, ShopItem};

type U64Key = heed::types::U64<heed::byteorder::BigEndian>;

/// LMDB-backed catalog store.
pub struct CatalogStore {
    env: Arc<Env>,
    killers: Database<U64Key, heed::types::Bytes>,
    dungeons: Database<U64Key, heed::types::Bytes>,
    bots: Database<U64Key, heed::types::Bytes>,
    shop_items: Database<heed::types::Str, heed::types::Bytes>,
}

impl CatalogStore {
    /// Open or create the catalog store.
    pub fn new<P: AsRef<Path>>(path: P, max_size: usize) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size)
                .max_dbs(4)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let killers = env.create_database::<U64Key, heed::types::Bytes>(&mut wtxn, Some("killers"))?;
        let dungeons =
            env.create_database::<U64Key, heed::types::Bytes>(&mut wtxn, Some("dungeons"))?;
        let bots = env.create_database::<U64Key, heed::types::Bytes>(&mut wtxn, Some("bots"))?;
        let shop_items = env.create_database::<heed::types::Str, heed::types::Bytes>(
            &mut wtxn,
            Some("shop_items"),
        )?;
        wtxn.commit()?;

        info!("catalog store opened ({} MB map)", max_size / (1024 * 1024));

        Ok(Self {
            env: Arc::new(env),
            killers,
            dungeons,
            bots,
            shop_items,
        })
    }

    // ========================================================================
    // Generic encode/decode over a u64-keyed database
    // ========================================================================

    fn put_by_id<T: Serialize>(
        &self,
        db: Database<U64Key, heed::types::Bytes>,
        id: u64,
        value: &T,
    ) -> Result<(), StoreError> {
        let bytes = bincode::serialize(value)?;
        let mut wtxn = self.env.write_txn()?;
        db.put(&mut wtxn, &id, &bytes)?;
        wtxn.commit()?;
        Ok(())
    }

    fn get_by_id<T: DeserializeOwned>(
        &self,
        db: Database<U64Key, heed::types::Bytes>,
        id: u64,
    ) -> Result<Option<T>, StoreError> {
        let rtxn = self.env.read_txn()?;
        match db.get(&rtxn, &id)? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    /// All entries in ascending id order.
    fn all<T: DeserializeOwned>(
        &self,
        db: Database<U64Key, heed::types::Bytes>,
    ) -> Result<Vec<T>, StoreError> {
        let rtxn = self.env.read_txn()?;
        let mut out = Vec::new();
        for item in db.iter(&rtxn)? {
            let (_, bytes) = item?;
            out.push(bincode::deserialize(bytes)?);
        }
        Ok(out)
    }

    // ========================================================================
    // Killers
    // ========================================================================

    pub fn put_killer(&self, killer: &Killer) -> Result<(), StoreError> {
        self.put_by_id(self.killers, killer.id, killer)
    }

    pub fn get_killer(&self, id: u64) -> Result<Option<Killer>, StoreError> {
        self.get_by_id(self.killers, id)
    }

    /// The full roster in unlock order (ascending id).
    pub fn all_killers(&self) -> Result<Vec<Killer>, StoreError> {
        self.all(self.killers)
    }

    // ========================================================================
    // Dungeons
    // ========================================================================

    pub fn put_dungeon(&self, dungeon: &Dungeon) -> Result<(), StoreError> {
        self.put_by_id(self.dungeons, dungeon.id, dungeon)
    }

    pub fn all_dungeons(&self) -> Result<Vec<Dungeon>, StoreError> {
        self.all(self.dungeons)
    }

    /// The dungeon containing the given quest, with the quest itself.
    pub fn find_quest(&self, quest_id: u64) -> Result<Option<(Dungeon, crate::catalog::Quest)>, StoreError> {
        for dungeon in self.all_dungeons()? {
            if let Some(quest) = dungeon.quest(quest_id) {
                let quest = quest.clone();
                return Ok(Some((dungeon, quest)));
            }
        }
        Ok(None)
    }

    /// The dungeon containing the given crate, with the crate itself.
    pub fn find_crate(
        &self,
        crate_id: u64,
    ) -> Result<Option<(Dungeon, crate::catalog::CrateDef)>, StoreError> {
        for dungeon in self.all_dungeons()? {
            if let Some(c) = dungeon.crate_def(crate_id) {
                let c = c.clone();
                return Ok(Some((dungeon, c)));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Bots
    // ========================================================================

    pub fn put_bot(&self, bot: &Bot) -> Result<(), StoreError> {
        self.put_by_id(self.bots, bot.id, bot)
    }

    pub fn get_bot(&self, id: u64) -> Result<Option<Bot>, StoreError> {
        self.get_by_id(self.bots, id)
    }

    pub fn all_bots(&self) -> Result<Vec<Bot>, StoreError> {
        self.all(self.bots)
    }

    // ========================================================================
    // Shop items
    // ========================================================================

    pub fn put_shop_item(&self, item: &ShopItem) -> Result<(), StoreError> {
        let bytes = bincode::serialize(item)?;
        let mut wtxn = self.env.write_txn()?;
        self.shop_items.put(&mut wtxn, &item.id, &bytes)?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn all_shop_items(&self) -> Result<Vec<ShopItem>, StoreError> {
        let rtxn = self.env.read_txn()?;
        let mut out = Vec::new();
        for item in self.shop_items.iter(&rtxn)? {
            let (_, bytes) = item?;
            out.push(bincode::deserialize::<ShopItem>(bytes)?);
        }
        Ok(out)
    }

    /// Price of the admin panel shop entry, if seeded.
    pub fn admin_panel_price(&self) -> Result<Option<u64>, StoreError> {
        Ok(self
            .all_shop_items()?
            .into_iter()
            .find(|i| matches!(i.kind, crate::catalog::ShopItemKind::AdminPanel))
            .map(|i| i.price))
    }

    /// Entry counts per database, logged after seeding.
    pub fn stats(&self) -> Result<CatalogStats, StoreError> {
        let rtxn = self.env.read_txn()?;
        Ok(CatalogStats {
            killers: self.killers.len(&rtxn)? as usize,
            dungeons: self.dungeons.len(&rtxn)? as usize,
            bots: self.bots.len(&rtxn)? as usize,
            shop_items: self.shop_items.len(&rtxn)? as usize,
        })
    }
}

/// Entry counts for the catalog store.
#[derive(Debug, Clone, Copy)]
pub struct CatalogStats {
    pub killers: usize,
    pub dungeons: usize,
    pub bots: usize,
    pub shop_items: usize,
}

impl CatalogStats {
    pub fn total(&self) -> usize {
        self.killers + self.dungeons + self.bots + self.shop_items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ShopItemKind;
    use crate::stats::StatBlock;

    fn test_store() -> (CatalogStore, tempfile::TempDir) {
        let tmp = tempfile::tempdir().expect("temp dir");
        let store = CatalogStore::new(tmp.path().join("catalog"), 10 * 1024 * 1024).unwrap();
        (store, tmp)
    }

    fn killer(id: u64, name: &str) -> Killer {
        Killer {
            id,
            name: name.into(),
            description: String::new(),
            url: String::new(),
            unlocked: false,
            stats: StatBlock::default(),
            unlock_criteria: None,
            storyline: None,
        }
    }

    #[test]
    fn killers_iterate_in_id_order() {
        let (store, _tmp) = test_store();
        store.put_killer(&killer(3, "Zeus")).unwrap();
        store.put_killer(&killer(1, "Jason")).unwrap();
        store.put_killer(&killer(2, "Coolkidd")).unwrap();

        let names: Vec<String> = store
            .all_killers()
            .unwrap()
            .into_iter()
            .map(|k| k.name)
            .collect();
        assert_eq!(names, ["Jason", "Coolkidd", "Zeus"]);
    }

    #[test]
    fn missing_bot_is_none() {
        let (store, _tmp) = test_store();
        assert!(store.get_bot(42).unwrap().is_none());
    }

    #[test]
    fn admin_panel_price_comes_from_the_shop_catalog() {
        let (store, _tmp) = test_store();
        assert_eq!(store.admin_panel_price().unwrap(), None);

        store
            .put_shop_item(&ShopItem {
                id: "admin_panel".into(),
                name: "Admin Panel".into(),
                description: String::new(),
                price: 10_000,
                kind: ShopItemKind::AdminPanel,
            })
            .unwrap();
        assert_eq!(store.admin_panel_price().unwrap(), Some(10_000));
    }

    #[test]
    fn quest_and_crate_lookup_walk_all_dungeons() {
        let (store, _tmp) = test_store();
        store
            .put_dungeon(&Dungeon {
                id: 1,
                name: "Mines".into(),
                difficulty: 2,
                description: String::new(),
                quests: vec![crate::catalog::Quest {
                    id: 10,
                    name: "Clear the entrance".into(),
                    description: String::new(),
                    reward_currency: 100,
                    reward_key: None,
                }],
                crates: vec![crate::catalog::CrateDef {
                    id: 20,
                    name: "Cache".into(),
                    description: String::new(),
                    location: "Entrance".into(),
                    required_key: "Rusty Key".into(),
                    reward: 250,
                }],
            })
            .unwrap();

        let (dungeon, quest) = store.find_quest(10).unwrap().unwrap();
        assert_eq!(dungeon.id, 1);
        assert_eq!(quest.reward_currency, 100);
        assert!(store.find_quest(11).unwrap().is_none());

        let (_, crate_def) = store.find_crate(20).unwrap().unwrap();
        assert_eq!(crate_def.reward, 250);
    }
}
