//! Error taxonomy for the game engine
//!
//! Every operation either completes or fails with one of these typed
//! errors, leaving the profile unmodified. The API layer renders them as a
//! JSON body with a stable machine-readable code; the web client owns
//! presentation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("no profile exists for this caller")]
    ProfileNotFound,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("a {0} named '{1}' already exists")]
    DuplicateName(&'static str, String),
    #[error("a combat session is already ongoing")]
    AlreadyInCombat,
    #[error("no combat session is ongoing")]
    NoActiveCombat,
    #[error("no active survivor is selected")]
    NoActiveSurvivor,
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds { required: u64, available: u64 },
    #[error("crate requires the key '{0}'")]
    KeyRequired(String),
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("caller is already a member of a clan")]
    AlreadyMember,
    #[error("every killer is already unlocked")]
    AllUnlocked,
    #[error("maximum rebirth count reached")]
    MaxRebirthReached,
    #[error("no clans are available to join")]
    NoClansAvailable,
    #[error("the listing leader cannot claim their own listing")]
    AlreadyLeaderOfSelf,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl GameError {
    /// Stable machine-readable code for the client.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::ProfileNotFound => "profile_not_found",
            GameError::NotFound(_) => "not_found",
            GameError::DuplicateName(..) => "duplicate_name",
            GameError::AlreadyInCombat => "already_in_combat",
            GameError::NoActiveCombat => "no_active_combat",
            GameError::NoActiveSurvivor => "no_active_survivor",
            GameError::InsufficientFunds { .. } => "insufficient_funds",
            GameError::KeyRequired(_) => "key_required",
            GameError::Unauthorized(_) => "unauthorized",
            GameError::InvalidInput(_) => "invalid_input",
            GameError::AlreadyMember => "already_member",
            GameError::AllUnlocked => "all_unlocked",
            GameError::MaxRebirthReached => "max_rebirth_reached",
            GameError::NoClansAvailable => "no_clans_available",
            GameError::AlreadyLeaderOfSelf => "already_leader_of_self",
            GameError::Storage(_) => "storage",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GameError::ProfileNotFound | GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::Unauthorized(_) => StatusCode::FORBIDDEN,
            GameError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GameError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // State conflicts: the request was well-formed but the profile
            // is not in a state that permits it.
            GameError::DuplicateName(..)
            | GameError::AlreadyInCombat
            | GameError::NoActiveCombat
            | GameError::NoActiveSurvivor
            | GameError::InsufficientFunds { .. }
            | GameError::KeyRequired(_)
            | GameError::AlreadyMember
            | GameError::AllUnlocked
            | GameError::MaxRebirthReached
            | GameError::NoClansAvailable
            | GameError::AlreadyLeaderOfSelf => StatusCode::CONFLICT,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        if matches!(self, GameError::Storage(_)) {
            tracing::error!("storage failure: {}", self);
        }
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(GameError::AlreadyInCombat.code(), "already_in_combat");
        assert_eq!(
            GameError::KeyRequired("Rusty Key".into()).code(),
            "key_required"
        );
        assert_eq!(GameError::NotFound("clan").code(), "not_found");
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(GameError::ProfileNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            GameError::Unauthorized("admin panel required").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GameError::InvalidInput("empty name".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GameError::AlreadyMember.status(), StatusCode::CONFLICT);
    }
}
