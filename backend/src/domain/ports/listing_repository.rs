//! Port for listing persistence, including the cascade on delete and the
//! raised-total audit log.
use async_trait::async_trait;

use crate::domain::{Listing, ListingId, RaisedTotalAdjustment};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by listing repository adapters.
    pub enum ListingPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError,
            "listing repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Insert or replace a listing keyed by id.
    async fn upsert(&self, listing: &Listing) -> Result<(), ListingPersistenceError>;

    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, ListingPersistenceError>;

    /// Every listing, in no particular order.
    async fn list(&self) -> Result<Vec<Listing>, ListingPersistenceError>;

    /// Remove a listing together with its investments, invites and
    /// adjustments. Returns `false` when the listing did not exist.
    async fn delete_cascading(&self, id: &ListingId) -> Result<bool, ListingPersistenceError>;

    /// Append an entry to the raised-total audit log.
    async fn record_adjustment(
        &self,
        adjustment: &RaisedTotalAdjustment,
    ) -> Result<(), ListingPersistenceError>;

    /// Audit entries for a listing, oldest first.
    async fn adjustments(
        &self,
        id: &ListingId,
    ) -> Result<Vec<RaisedTotalAdjustment>, ListingPersistenceError>;
}
