//! Port for per-listing team invites.
use async_trait::async_trait;

use crate::domain::{Email, ListingId, TeamInvite};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by team invite repository adapters.
    pub enum TeamInvitePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "team invite repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError,
            "team invite repository query failed: {message}",
        /// The `(listing, email)` pair already has an invite.
        Duplicate { listing_id: String, email: String } => StateConflict,
            "{email} is already invited to {listing_id}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamInviteRepository: Send + Sync {
    /// Insert an invite, failing with `Duplicate` when the pair exists.
    async fn insert(&self, invite: &TeamInvite) -> Result<(), TeamInvitePersistenceError>;

    /// Replace an existing invite keyed by `(listing_id, email)`.
    async fn update(&self, invite: &TeamInvite) -> Result<(), TeamInvitePersistenceError>;

    async fn find(
        &self,
        listing_id: &ListingId,
        email: &Email,
    ) -> Result<Option<TeamInvite>, TeamInvitePersistenceError>;

    /// Remove an invite; returns whether one existed.
    async fn remove(
        &self,
        listing_id: &ListingId,
        email: &Email,
    ) -> Result<bool, TeamInvitePersistenceError>;

    /// Invites for a listing, in insertion order.
    async fn list(
        &self,
        listing_id: &ListingId,
    ) -> Result<Vec<TeamInvite>, TeamInvitePersistenceError>;
}
