//! Team invite registry: per-listing collaborator invitations keyed by email.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ListingPersistenceError, ListingRepository, TeamInvitePersistenceError, TeamInviteRepository,
};
use crate::domain::{
    AccessDenied, Email, Error, ErrorCode, ListingId, Principal, TeamInvite, UserRole,
    UserValidationError,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InviteError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),
    #[error("invalid invitee email: {0}")]
    InvalidEmail(UserValidationError),
    #[error("listing {listing_id} not found")]
    ListingNotFound { listing_id: ListingId },
    #[error("{email} is already invited to {listing_id}")]
    DuplicateInvite { listing_id: ListingId, email: Email },
    #[error("no invite for {email} on {listing_id}")]
    NoSuchInvite { listing_id: ListingId, email: Email },
    #[error(transparent)]
    Listings(#[from] ListingPersistenceError),
    #[error(transparent)]
    Invites(TeamInvitePersistenceError),
}

impl InviteError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "access_denied",
            Self::InvalidEmail(_) => "invalid_email",
            Self::ListingNotFound { .. } => "listing_not_found",
            Self::DuplicateInvite { .. } => "duplicate_invite",
            Self::NoSuchInvite { .. } => "no_such_invite",
            Self::Listings(_) | Self::Invites(_) => "persistence",
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::AccessDenied(_) => ErrorCode::Forbidden,
            Self::InvalidEmail(_) => ErrorCode::InvalidRequest,
            Self::ListingNotFound { .. } | Self::NoSuchInvite { .. } => ErrorCode::NotFound,
            Self::DuplicateInvite { .. } => ErrorCode::StateConflict,
            Self::Listings(err) => err.code(),
            Self::Invites(err) => err.code(),
        }
    }
}

impl From<InviteError> for Error {
    fn from(err: InviteError) -> Self {
        Error::new(err.code(), err.to_string()).with_reason(err.reason())
    }
}

/// Invite, accept and remove co-investors on a listing.
#[derive(Clone)]
pub struct TeamInviteRegistry {
    listings: Arc<dyn ListingRepository>,
    invites: Arc<dyn TeamInviteRepository>,
    clock: Arc<dyn Clock>,
}

impl TeamInviteRegistry {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        invites: Arc<dyn TeamInviteRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            listings,
            invites,
            clock,
        }
    }

    /// Record a pending invite for `email` on `listing_id`.
    pub async fn invite(
        &self,
        principal: &Principal,
        listing_id: &ListingId,
        email: &str,
    ) -> Result<TeamInvite, InviteError> {
        principal.require_role(UserRole::Investor)?;
        let email = Email::new(email).map_err(InviteError::InvalidEmail)?;
        if self.listings.find(listing_id).await?.is_none() {
            return Err(InviteError::ListingNotFound {
                listing_id: listing_id.clone(),
            });
        }

        let invite = TeamInvite::pending(listing_id.clone(), email, self.clock.utc());
        match self.invites.insert(&invite).await {
            Ok(()) => {}
            Err(TeamInvitePersistenceError::Duplicate { .. }) => {
                return Err(InviteError::DuplicateInvite {
                    listing_id: invite.listing_id,
                    email: invite.email,
                });
            }
            Err(err) => return Err(InviteError::Invites(err)),
        }
        info!(listing_id = %listing_id, invitee = %invite.email, inviter = %principal.email, "team invite created");
        Ok(invite)
    }

    /// Accept the caller's own invite on `listing_id`.
    pub async fn accept(
        &self,
        principal: &Principal,
        listing_id: &ListingId,
    ) -> Result<TeamInvite, InviteError> {
        principal.require_role(UserRole::Investor)?;
        let mut invite = self
            .invites
            .find(listing_id, &principal.email)
            .await
            .map_err(InviteError::Invites)?
            .ok_or_else(|| InviteError::NoSuchInvite {
                listing_id: listing_id.clone(),
                email: principal.email.clone(),
            })?;
        invite.accept();
        self.invites
            .update(&invite)
            .await
            .map_err(InviteError::Invites)?;
        Ok(invite)
    }

    /// Remove an invite. Removing an absent invite succeeds.
    pub async fn remove(
        &self,
        principal: &Principal,
        listing_id: &ListingId,
        email: &str,
    ) -> Result<(), InviteError> {
        principal.require_role(UserRole::Investor)?;
        let email = Email::new(email).map_err(InviteError::InvalidEmail)?;
        let removed = self
            .invites
            .remove(listing_id, &email)
            .await
            .map_err(InviteError::Invites)?;
        if removed {
            info!(listing_id = %listing_id, invitee = %email, "team invite removed");
        }
        Ok(())
    }

    pub async fn list(&self, listing_id: &ListingId) -> Result<Vec<TeamInvite>, InviteError> {
        self.invites
            .list(listing_id)
            .await
            .map_err(InviteError::Invites)
    }
}
