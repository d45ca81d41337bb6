//! Port for the append-only investment ledger.
use async_trait::async_trait;

use crate::domain::{Investment, InvestmentFilter};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by investment repository adapters.
    pub enum InvestmentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "investment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError,
            "investment repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvestmentRepository: Send + Sync {
    /// Append an investment. Entries are never edited or removed here.
    async fn append(&self, investment: &Investment) -> Result<(), InvestmentPersistenceError>;

    /// Investments matching `filter`, in insertion order.
    async fn list(
        &self,
        filter: &InvestmentFilter,
    ) -> Result<Vec<Investment>, InvestmentPersistenceError>;
}
