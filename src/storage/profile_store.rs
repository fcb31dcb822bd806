//! Profile Store — LMDB-backed per-caller game state
//!
//! Holds everything mutable: profiles keyed by caller id, caller roles,
//! clans and join listings keyed by sequential id, admin-panel event logs,
//! and the id counters. Values are bincode-encoded.
//!
//! Handlers serialize access per caller through `ProfileLocks` before
//! touching this store; the composite methods below additionally commit
//! their multi-record writes in one LMDB transaction so that no typed
//! failure can leave, say, a consumed listing without its clan.

use heed::{Database, Env, EnvOpenOptions, RwTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::StoreError;
use crate::clan::{Clan, JoinListing};
use crate::profile::{AdminPanelEvent, PlayerProfile, UserRole};

type U64Key = heed::types::U64<heed::byteorder::BigEndian>;

const NEXT_CLAN_ID: &str = "next_clan_id";
const NEXT_LISTING_ID: &str = "next_listing_id";

/// LMDB-backed store for per-caller and cross-caller mutable state.
pub struct ProfileStore {
    env: Arc<Env>,
    profiles: Database<heed::types::Str, heed::types::Bytes>,
    roles: Database<heed::types::Str, heed::types::Bytes>,
    clans: Database<U64Key, heed::types::Bytes>,
    listings: Database<U64Key, heed::types::Bytes>,
    events: Database<heed::types::Str, heed::types::Bytes>,
    counters: Database<heed::types::Str, heed::types::Bytes>,
}

impl ProfileStore {
    /// Open or create the profile store.
    pub fn new<P: AsRef<Path>>(path: P, max_size: usize) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size)
                .max_dbs(6)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let profiles = env
            .create_database::<heed::types::Str, heed::types::Bytes>(&mut wtxn, Some("profiles"))?;
        let roles =
            env.create_database::<heed::types::Str, heed::types::Bytes>(&mut wtxn, Some("roles"))?;
        let clans = env.create_database::<U64Key, heed::types::Bytes>(&mut wtxn, Some("clans"))?;
        let listings =
            env.create_database::<U64Key, heed::types::Bytes>(&mut wtxn, Some("listings"))?;
        let events =
            env.create_database::<heed::types::Str, heed::types::Bytes>(&mut wtxn, Some("events"))?;
        let counters = env
            .create_database::<heed::types::Str, heed::types::Bytes>(&mut wtxn, Some("counters"))?;
        wtxn.commit()?;

        info!("profile store opened ({} MB map)", max_size / (1024 * 1024));

        Ok(Self {
            env: Arc::new(env),
            profiles,
            roles,
            clans,
            listings,
            events,
            counters,
        })
    }

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(value)?)
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(bincode::deserialize(bytes)?)
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    pub fn get_profile(&self, caller: &str) -> Result<Option<PlayerProfile>, StoreError> {
        let rtxn = self.env.read_txn()?;
        match self.profiles.get(&rtxn, caller)? {
            Some(bytes) => Ok(Some(Self::decode(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put_profile(&self, caller: &str, profile: &PlayerProfile) -> Result<(), StoreError> {
        let bytes = Self::encode(profile)?;
        let mut wtxn = self.env.write_txn()?;
        self.profiles.put(&mut wtxn, caller, &bytes)?;
        wtxn.commit()?;
        Ok(())
    }

    /// Write two profiles in one transaction (cross-profile operations).
    pub fn put_profile_pair(
        &self,
        a: (&str, &PlayerProfile),
        b: (&str, &PlayerProfile),
    ) -> Result<(), StoreError> {
        let a_bytes = Self::encode(a.1)?;
        let b_bytes = Self::encode(b.1)?;
        let mut wtxn = self.env.write_txn()?;
        self.profiles.put(&mut wtxn, a.0, &a_bytes)?;
        self.profiles.put(&mut wtxn, b.0, &b_bytes)?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn profile_count(&self) -> Result<usize, StoreError> {
        let rtxn = self.env.read_txn()?;
        Ok(self.profiles.len(&rtxn)? as usize)
    }

    // ========================================================================
    // Roles
    // ========================================================================

    /// The caller's role. Unknown callers are guests.
    pub fn get_role(&self, caller: &str) -> Result<UserRole, StoreError> {
        let rtxn = self.env.read_txn()?;
        match self.roles.get(&rtxn, caller)? {
            Some(bytes) => Self::decode(bytes),
            None => Ok(UserRole::Guest),
        }
    }

    pub fn put_role(&self, caller: &str, role: UserRole) -> Result<(), StoreError> {
        let bytes = Self::encode(&role)?;
        let mut wtxn = self.env.write_txn()?;
        self.roles.put(&mut wtxn, caller, &bytes)?;
        wtxn.commit()?;
        Ok(())
    }

    // ========================================================================
    // Clans
    // ========================================================================

    pub fn get_clan(&self, id: u64) -> Result<Option<Clan>, StoreError> {
        let rtxn = self.env.read_txn()?;
        match self.clans.get(&rtxn, &id)? {
            Some(bytes) => Ok(Some(Self::decode(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put_clan(&self, clan: &Clan) -> Result<(), StoreError> {
        let bytes = Self::encode(clan)?;
        let mut wtxn = self.env.write_txn()?;
        self.clans.put(&mut wtxn, &clan.id, &bytes)?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn all_clans(&self) -> Result<Vec<Clan>, StoreError> {
        let rtxn = self.env.read_txn()?;
        let mut out = Vec::new();
        for item in self.clans.iter(&rtxn)? {
            let (_, bytes) = item?;
            out.push(Self::decode::<Clan>(bytes)?);
        }
        Ok(out)
    }

    pub fn clan_count(&self) -> Result<usize, StoreError> {
        let rtxn = self.env.read_txn()?;
        Ok(self.clans.len(&rtxn)? as usize)
    }

    /// Consume a listing into a new clan: marks the listing inactive,
    /// allocates the clan id, and writes both records plus the counter in
    /// one transaction.
    pub fn create_clan_from_listing(
        &self,
        mut listing: JoinListing,
        name: String,
    ) -> Result<Clan, StoreError> {
        let mut wtxn = self.env.write_txn()?;
        let id = self.next_id(&mut wtxn, NEXT_CLAN_ID)?;
        listing.active = false;

        let clan = Clan::found(id, name, listing.leader.clone());

        let listing_bytes = Self::encode(&listing)?;
        let clan_bytes = Self::encode(&clan)?;
        self.listings.put(&mut wtxn, &listing.id, &listing_bytes)?;
        self.clans.put(&mut wtxn, &clan.id, &clan_bytes)?;
        wtxn.commit()?;
        Ok(clan)
    }

    // ========================================================================
    // Join listings
    // ========================================================================

    pub fn get_listing(&self, id: u64) -> Result<Option<JoinListing>, StoreError> {
        let rtxn = self.env.read_txn()?;
        match self.listings.get(&rtxn, &id)? {
            Some(bytes) => Ok(Some(Self::decode(bytes)?)),
            None => Ok(None),
        }
    }

    /// Insert a new listing, allocating its id.
    pub fn insert_listing(&self, mut listing: JoinListing) -> Result<JoinListing, StoreError> {
        let mut wtxn = self.env.write_txn()?;
        listing.id = self.next_id(&mut wtxn, NEXT_LISTING_ID)?;
        let bytes = Self::encode(&listing)?;
        self.listings.put(&mut wtxn, &listing.id, &bytes)?;
        wtxn.commit()?;
        Ok(listing)
    }

    /// Active listings in id order.
    pub fn active_listings(&self) -> Result<Vec<JoinListing>, StoreError> {
        let rtxn = self.env.read_txn()?;
        let mut out = Vec::new();
        for item in self.listings.iter(&rtxn)? {
            let (_, bytes) = item?;
            let listing: JoinListing = Self::decode(bytes)?;
            if listing.active {
                out.push(listing);
            }
        }
        Ok(out)
    }

    // ========================================================================
    // Admin panel events
    // ========================================================================

    pub fn events_for(&self, caller: &str) -> Result<Vec<AdminPanelEvent>, StoreError> {
        let rtxn = self.env.read_txn()?;
        match self.events.get(&rtxn, caller)? {
            Some(bytes) => Self::decode(bytes),
            None => Ok(Vec::new()),
        }
    }

    /// Append an event to the caller's log, assigning the next sequential
    /// event id within that log.
    pub fn append_event(
        &self,
        caller: &str,
        mut event: AdminPanelEvent,
    ) -> Result<AdminPanelEvent, StoreError> {
        let mut wtxn = self.env.write_txn()?;
        let mut log: Vec<AdminPanelEvent> = match self.events.get(&wtxn, caller)? {
            Some(bytes) => Self::decode(bytes)?,
            None => Vec::new(),
        };
        event.id = log.last().map(|e| e.id + 1).unwrap_or(1);
        log.push(event.clone());
        let bytes = Self::encode(&log)?;
        self.events.put(&mut wtxn, caller, &bytes)?;
        wtxn.commit()?;
        Ok(event)
    }

    // ========================================================================
    // Id counters
    // ========================================================================

    /// Allocate the next id for `key` within an open write transaction.
    fn next_id(&self, wtxn: &mut RwTxn, key: &str) -> Result<u64, StoreError> {
        let next: u64 = match self.counters.get(wtxn, key)? {
            Some(bytes) => Self::decode(bytes)?,
            None => 1,
        };
        let bytes = Self::encode(&(next + 1))?;
        self.counters.put(wtxn, key, &bytes)?;
        Ok(next)
    }
}
