//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports, and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::ImageStore;
use crate::domain::{
    AccountService, InvestmentLedger, ListingCatalogue, PortfolioProjector, TeamInviteRegistry,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub listings: ListingCatalogue,
    pub ledger: InvestmentLedger,
    pub portfolio: PortfolioProjector,
    pub teams: TeamInviteRegistry,
    pub images: Arc<dyn ImageStore>,
    pub clock: Arc<dyn Clock>,
}
