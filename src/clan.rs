//! Clan Formation — recruitment listings and clan membership
//!
//! A listing ("why don't you join") is a recruitment post that can be
//! converted into a clan exactly once: conversion marks it inactive and
//! founds the clan with the listing's leader. Membership is tracked on the
//! clan record; a caller may belong to at most one clan across the whole
//! catalog, and `member_count` always equals the member-set cardinality.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::GameError;

/// A recruitment post. Consumed (set inactive) when a clan is created
/// from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinListing {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Caller id of the poster.
    pub leader: String,
    pub active: bool,
    /// Accumulated interest shown on the marketplace card.
    pub member_count: u64,
}

/// A formed clan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Clan {
    pub id: u64,
    pub name: String,
    /// Caller id of the founding listing's leader.
    pub founder: String,
    pub members: BTreeSet<String>,
    pub member_count: u64,
}

impl Clan {
    /// Found a clan from a consumed listing: the listing leader is the
    /// founder and sole seed member.
    pub fn found(id: u64, name: String, leader: String) -> Self {
        let mut members = BTreeSet::new();
        members.insert(leader.clone());
        Self {
            id,
            name,
            founder: leader,
            member_count: members.len() as u64,
            members,
        }
    }

    /// Add a member, keeping `member_count` in step with the set.
    pub fn add_member(&mut self, caller: &str) {
        if self.members.insert(caller.to_string()) {
            self.member_count = self.members.len() as u64;
        }
    }
}

/// Validate a listing for conversion by `caller`, returning it on success.
///
/// Missing and inactive listings are indistinguishable to the caller
/// (`NotFound`); the leader cannot claim their own post.
pub fn validate_conversion(
    listing: Option<JoinListing>,
    caller: &str,
) -> Result<JoinListing, GameError> {
    let listing = listing
        .filter(|l| l.active)
        .ok_or(GameError::NotFound("listing"))?;
    if listing.leader == caller {
        return Err(GameError::AlreadyLeaderOfSelf);
    }
    Ok(listing)
}

/// Enforce the single-clan-membership invariant: `caller` may not already
/// be in the member set of any clan.
pub fn ensure_not_member(clans: &[Clan], caller: &str) -> Result<(), GameError> {
    if clans.iter().any(|c| c.members.contains(caller)) {
        return Err(GameError::AlreadyMember);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: u64, leader: &str, active: bool) -> JoinListing {
        JoinListing {
            id,
            name: "Night Shift".into(),
            description: "We raid at midnight".into(),
            image_url: String::new(),
            leader: leader.into(),
            active,
            member_count: 4,
        }
    }

    #[test]
    fn founding_seeds_membership_with_the_leader() {
        let clan = Clan::found(1, "Night Shift".into(), "alice".into());
        assert_eq!(clan.founder, "alice");
        assert!(clan.members.contains("alice"));
        assert_eq!(clan.member_count, 1);
    }

    #[test]
    fn add_member_is_idempotent_and_keeps_count_in_step() {
        let mut clan = Clan::found(1, "Night Shift".into(), "alice".into());
        clan.add_member("bob");
        clan.add_member("bob");
        assert_eq!(clan.member_count, 2);
        assert_eq!(clan.members.len(), 2);
    }

    #[test]
    fn conversion_rejects_missing_inactive_and_self() {
        assert!(matches!(
            validate_conversion(None, "bob"),
            Err(GameError::NotFound("listing"))
        ));
        assert!(matches!(
            validate_conversion(Some(listing(1, "alice", false)), "bob"),
            Err(GameError::NotFound("listing"))
        ));
        assert!(matches!(
            validate_conversion(Some(listing(1, "alice", true)), "alice"),
            Err(GameError::AlreadyLeaderOfSelf)
        ));
        let ok = validate_conversion(Some(listing(1, "alice", true)), "bob").unwrap();
        assert_eq!(ok.id, 1);
    }

    #[test]
    fn membership_check_spans_all_clans() {
        let mut a = Clan::found(1, "A".into(), "alice".into());
        let b = Clan::found(2, "B".into(), "bella".into());
        a.add_member("bob");
        let clans = vec![a, b];
        assert!(matches!(
            ensure_not_member(&clans, "bob"),
            Err(GameError::AlreadyMember)
        ));
        ensure_not_member(&clans, "carol").unwrap();
    }
}
