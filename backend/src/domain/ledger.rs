//! Investment ledger: admits, records and lists investor commitments.
//!
//! A commit runs its read-validate-write sequence under the per-listing lock
//! from [`ListingLocks`], so concurrent commits against the same listing can
//! never jointly overshoot its target.

use std::sync::Arc;

use mockable::Clock;
use tracing::{error, info};

use crate::domain::ports::{
    InvestmentPersistenceError, InvestmentRepository, ListingPersistenceError, ListingRepository,
};
use crate::domain::{
    AccessDenied, AdmissionRejection, Error, ErrorCode, Investment, InvestmentFilter,
    InvestmentId, ListingId, ListingLocks, ListingStatus, Principal, UserRole,
};

/// Reasons a commit or ledger read is refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),
    #[error("investment amount must be a positive whole number, got {amount}")]
    InvalidAmount { amount: i64 },
    #[error("listing {listing_id} not found")]
    ListingNotFound { listing_id: ListingId },
    #[error("listing {listing_id} is {status} and not open for investment")]
    ListingNotInvestable {
        listing_id: ListingId,
        status: ListingStatus,
    },
    #[error("minimum investment is {minimum}, got {amount}")]
    BelowMinimum { amount: u64, minimum: u64 },
    #[error("only {remaining} remains before the target is reached, got {amount}")]
    ExceedsRemainingCapacity { amount: u64, remaining: u64 },
    #[error(transparent)]
    Listings(#[from] ListingPersistenceError),
    #[error(transparent)]
    Investments(#[from] InvestmentPersistenceError),
}

impl LedgerError {
    /// Stable machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "access_denied",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::ListingNotFound { .. } => "listing_not_found",
            Self::ListingNotInvestable { .. } => "listing_not_investable",
            Self::BelowMinimum { .. } => "below_minimum",
            Self::ExceedsRemainingCapacity { .. } => "exceeds_remaining_capacity",
            Self::Listings(_) | Self::Investments(_) => "persistence",
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::AccessDenied(_) => ErrorCode::Forbidden,
            Self::InvalidAmount { .. } => ErrorCode::InvalidRequest,
            Self::ListingNotFound { .. } => ErrorCode::NotFound,
            Self::ListingNotInvestable { .. }
            | Self::BelowMinimum { .. }
            | Self::ExceedsRemainingCapacity { .. } => ErrorCode::StateConflict,
            Self::Listings(err) => err.code(),
            Self::Investments(err) => err.code(),
        }
    }
}

impl From<LedgerError> for Error {
    fn from(err: LedgerError) -> Self {
        Error::new(err.code(), err.to_string()).with_reason(err.reason())
    }
}

fn rejection(listing_id: &ListingId, rejection: AdmissionRejection) -> LedgerError {
    match rejection {
        AdmissionRejection::NotInvestable { status } => LedgerError::ListingNotInvestable {
            listing_id: listing_id.clone(),
            status,
        },
        AdmissionRejection::BelowMinimum { amount, minimum } => {
            LedgerError::BelowMinimum { amount, minimum }
        }
        AdmissionRejection::ExceedsRemainingCapacity { amount, remaining } => {
            LedgerError::ExceedsRemainingCapacity { amount, remaining }
        }
    }
}

/// Records investments and keeps listing totals in step with them.
#[derive(Clone)]
pub struct InvestmentLedger {
    listings: Arc<dyn ListingRepository>,
    investments: Arc<dyn InvestmentRepository>,
    locks: ListingLocks,
    clock: Arc<dyn Clock>,
}

impl InvestmentLedger {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        investments: Arc<dyn InvestmentRepository>,
        locks: ListingLocks,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            listings,
            investments,
            locks,
            clock,
        }
    }

    /// Commit `amount` from `principal` to `listing_id`.
    ///
    /// Checks run in order: investor role, positive amount, listing exists,
    /// listing is `Active`, amount meets the minimum, amount fits the
    /// remaining capacity. On success the listing total and the new
    /// investment are written while the listing lock is held.
    pub async fn commit(
        &self,
        principal: &Principal,
        listing_id: &ListingId,
        amount: i64,
    ) -> Result<Investment, LedgerError> {
        principal.require_role(UserRole::Investor)?;
        let amount = u64::try_from(amount)
            .ok()
            .filter(|value| *value > 0)
            .ok_or(LedgerError::InvalidAmount { amount })?;

        let _guard = self.locks.acquire(listing_id).await;

        let previous = self
            .listings
            .find(listing_id)
            .await?
            .ok_or_else(|| LedgerError::ListingNotFound {
                listing_id: listing_id.clone(),
            })?;
        let mut listing = previous.clone();
        listing
            .record_commitment(amount)
            .map_err(|err| rejection(listing_id, err))?;

        let investment = Investment {
            id: InvestmentId::random(),
            listing_id: listing_id.clone(),
            user_id: principal.user_id,
            user_email: principal.email.clone(),
            amount,
            date: self.clock.utc(),
        };

        self.listings.upsert(&listing).await?;
        if let Err(err) = self.investments.append(&investment).await {
            if let Err(restore_err) = self.listings.upsert(&previous).await {
                error!(
                    listing_id = %listing_id,
                    error = %restore_err,
                    "failed to restore listing total after ledger append failure"
                );
            }
            return Err(err.into());
        }

        info!(
            listing_id = %listing_id,
            amount,
            total_raised = listing.total_raised(),
            status = %listing.status(),
            "investment committed"
        );
        Ok(investment)
    }

    /// Investments visible to `principal`, newest first.
    ///
    /// Administrators see the whole ledger; investors see their own entries.
    pub async fn history(&self, principal: &Principal) -> Result<Vec<Investment>, LedgerError> {
        let filter = if principal.is_admin() {
            InvestmentFilter::All
        } else {
            InvestmentFilter::ByUser(principal.user_id)
        };
        let mut entries = self.investments.list(&filter).await?;
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
