//! Listing catalogue: administrator-facing listing maintenance.
//!
//! Metadata revisions and raised-total corrections are separate operations.
//! Only [`ListingCatalogue::adjust_raised_total`] moves `total_raised`
//! outside of investor commits, and every such move is audited.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{ListingPersistenceError, ListingRepository};
use crate::domain::{
    AccessDenied, Error, ErrorCode, Listing, ListingDraft, ListingId, ListingLocks,
    ListingValidationError, Principal, RaisedTotalAdjustment, UserRole,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListingError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),
    #[error(transparent)]
    Invalid(#[from] ListingValidationError),
    #[error("listing {listing_id} not found")]
    NotFound { listing_id: ListingId },
    #[error("a reason is required for raised-total adjustments")]
    MissingReason,
    #[error(transparent)]
    Persistence(#[from] ListingPersistenceError),
}

impl ListingError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "access_denied",
            Self::Invalid(ListingValidationError::InvalidStatus { .. }) => "invalid_status",
            Self::Invalid(ListingValidationError::RaisedTotalNotEditable) => {
                "raised_total_not_editable"
            }
            Self::Invalid(_) => "invalid_listing",
            Self::NotFound { .. } => "listing_not_found",
            Self::MissingReason => "missing_reason",
            Self::Persistence(_) => "persistence",
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::AccessDenied(_) => ErrorCode::Forbidden,
            Self::Invalid(_) | Self::MissingReason => ErrorCode::InvalidRequest,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Persistence(err) => err.code(),
        }
    }
}

impl From<ListingError> for Error {
    fn from(err: ListingError) -> Self {
        let mut error = Error::new(err.code(), err.to_string()).with_reason(err.reason());
        if let ListingError::Invalid(invalid) = &err {
            error = error.with_field(invalid.field());
        }
        error
    }
}

/// Create, revise, correct and remove listings.
#[derive(Clone)]
pub struct ListingCatalogue {
    listings: Arc<dyn ListingRepository>,
    locks: ListingLocks,
    clock: Arc<dyn Clock>,
}

impl ListingCatalogue {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        locks: ListingLocks,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            listings,
            locks,
            clock,
        }
    }

    /// Upsert keyed by id.
    ///
    /// A missing id is generated from the title and the current time. An
    /// existing listing keeps its raised total and creation time.
    pub async fn save(
        &self,
        principal: &Principal,
        draft: &ListingDraft,
    ) -> Result<Listing, ListingError> {
        principal.require_role(UserRole::Admin)?;
        let now = self.clock.utc();
        let id = match draft.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(raw) => ListingId::new(raw)?,
            None => ListingId::generate(&draft.title, now),
        };

        let _guard = self.locks.acquire(&id).await;
        let listing = match self.listings.find(&id).await? {
            Some(mut existing) => {
                existing.revise(draft)?;
                existing
            }
            None => Listing::create(id, draft, now)?,
        };
        self.listings.upsert(&listing).await?;
        info!(listing_id = %listing.id(), actor = %principal.email, "listing saved");
        Ok(listing)
    }

    pub async fn get(&self, id: &ListingId) -> Result<Listing, ListingError> {
        self.listings
            .find(id)
            .await?
            .ok_or_else(|| ListingError::NotFound {
                listing_id: id.clone(),
            })
    }

    /// All listings, newest first.
    pub async fn list(&self) -> Result<Vec<Listing>, ListingError> {
        let mut listings = self.listings.list().await?;
        listings.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(listings)
    }

    /// Delete a listing and everything that references it.
    pub async fn delete(&self, principal: &Principal, id: &ListingId) -> Result<(), ListingError> {
        principal.require_role(UserRole::Admin)?;
        let _guard = self.locks.acquire(id).await;
        if !self.listings.delete_cascading(id).await? {
            return Err(ListingError::NotFound {
                listing_id: id.clone(),
            });
        }
        info!(listing_id = %id, actor = %principal.email, "listing deleted");
        Ok(())
    }

    /// Overwrite a listing's raised total and record who did it and why.
    pub async fn adjust_raised_total(
        &self,
        principal: &Principal,
        id: &ListingId,
        new_total: i64,
        reason: &str,
    ) -> Result<Listing, ListingError> {
        principal.require_role(UserRole::Admin)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ListingError::MissingReason);
        }

        let _guard = self.locks.acquire(id).await;
        let mut listing = self.get(id).await?;
        let previous_total = listing.set_raised_total(new_total)?;
        let adjustment = RaisedTotalAdjustment {
            listing_id: id.clone(),
            previous_total,
            new_total: listing.total_raised(),
            reason: reason.to_owned(),
            actor_id: principal.user_id,
            actor_email: principal.email.clone(),
            at: self.clock.utc(),
        };
        self.listings.upsert(&listing).await?;
        self.listings.record_adjustment(&adjustment).await?;

        info!(
            listing_id = %id,
            previous_total,
            new_total = adjustment.new_total,
            actor = %principal.email,
            reason,
            "raised total adjusted"
        );
        Ok(listing)
    }

    /// Audit trail of raised-total adjustments for a listing.
    pub async fn adjustments(
        &self,
        principal: &Principal,
        id: &ListingId,
    ) -> Result<Vec<RaisedTotalAdjustment>, ListingError> {
        principal.require_role(UserRole::Admin)?;
        self.get(id).await?;
        Ok(self.listings.adjustments(id).await?)
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
