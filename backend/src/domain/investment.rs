//! Append-only investment ledger entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::listing::ListingId;
use super::user::{Email, UserId};

/// Identifier of a recorded investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvestmentId(Uuid);

impl InvestmentId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for InvestmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Immutable record of an investor committing capital to a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Investment {
    pub id: InvestmentId,
    pub listing_id: ListingId,
    pub user_id: UserId,
    pub user_email: Email,
    pub amount: u64,
    pub date: DateTime<Utc>,
}

/// Selection applied when reading the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvestmentFilter {
    All,
    ByUser(UserId),
    ByListing(ListingId),
}

impl InvestmentFilter {
    /// Return `true` when `investment` falls inside this selection.
    pub fn matches(&self, investment: &Investment) -> bool {
        match self {
            Self::All => true,
            Self::ByUser(user_id) => investment.user_id == *user_id,
            Self::ByListing(listing_id) => investment.listing_id == *listing_id,
        }
    }
}
