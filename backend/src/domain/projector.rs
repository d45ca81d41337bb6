//! Read-only derivations over listings and the investment ledger.
//!
//! Nothing here is cached; every figure is recomputed from the current rows.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::domain::ports::{
    InvestmentPersistenceError, InvestmentRepository, ListingPersistenceError, ListingRepository,
};
use crate::domain::{Error, Investment, InvestmentFilter, Listing, ListingId, Principal};

/// Funding progress as a whole percentage, saturating at 100.
///
/// # Examples
/// ```
/// use propvest::domain::progress_percent_of;
///
/// assert_eq!(progress_percent_of(25_500_000, 50_000_000), 51);
/// assert_eq!(progress_percent_of(1, 3), 33);
/// assert_eq!(progress_percent_of(2, 3), 67);
/// assert_eq!(progress_percent_of(80, 50), 100);
/// ```
pub fn progress_percent_of(total_raised: u64, target_amount: u64) -> u8 {
    if target_amount == 0 {
        return 0;
    }
    let raised = u128::from(total_raised);
    let target = u128::from(target_amount);
    let rounded = (raised * 100 + target / 2) / target;
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

pub fn progress_percent(listing: &Listing) -> u8 {
    progress_percent_of(listing.total_raised(), listing.target_amount())
}

pub fn remaining_capacity(listing: &Listing) -> u64 {
    listing.target_amount().saturating_sub(listing.total_raised())
}

/// Granularity a presentation layer offers amounts in.
pub fn investable_step(listing: &Listing) -> u64 {
    listing.min_investment().max(1)
}

/// Round `amount` down to a multiple of the listing's step.
pub fn snap_to_step(listing: &Listing, amount: u64) -> u64 {
    let step = investable_step(listing);
    amount - amount % step
}

/// Dashboard aggregates for one investor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorSummary {
    pub total_invested: u64,
    pub distinct_properties: usize,
    /// Mean listing ROI across investments, counted per investment and not
    /// weighted by amount. `None` when there is nothing to average.
    pub average_roi: Option<f64>,
}

/// Fold an investor's ledger entries into an [`InvestorSummary`].
///
/// Investments whose listing no longer resolves still count towards the
/// total and the distinct-property count but not towards the ROI mean.
/// The total saturates at `u64::MAX`.
pub fn investor_summary(
    investments: &[Investment],
    listings: &HashMap<ListingId, Listing>,
) -> InvestorSummary {
    let total_invested = investments
        .iter()
        .map(|inv| inv.amount)
        .fold(0, u64::saturating_add);
    let distinct_properties = investments
        .iter()
        .map(|inv| &inv.listing_id)
        .collect::<HashSet<_>>()
        .len();
    let rois: Vec<f64> = investments
        .iter()
        .filter_map(|inv| listings.get(&inv.listing_id).map(Listing::roi))
        .collect();
    let average_roi = if rois.is_empty() {
        None
    } else {
        Some(rois.iter().sum::<f64>() / rois.len() as f64)
    };

    InvestorSummary {
        total_invested,
        distinct_properties,
        average_roi,
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Listings(#[from] ListingPersistenceError),
    #[error(transparent)]
    Investments(#[from] InvestmentPersistenceError),
}

impl From<ProjectionError> for Error {
    fn from(err: ProjectionError) -> Self {
        match err {
            ProjectionError::Listings(err) => err.into(),
            ProjectionError::Investments(err) => err.into(),
        }
    }
}

/// Computes investor summaries from the repositories.
#[derive(Clone)]
pub struct PortfolioProjector {
    listings: Arc<dyn ListingRepository>,
    investments: Arc<dyn InvestmentRepository>,
}

impl PortfolioProjector {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        investments: Arc<dyn InvestmentRepository>,
    ) -> Self {
        Self {
            listings,
            investments,
        }
    }

    /// Summary of the caller's own investments.
    pub async fn summary(&self, principal: &Principal) -> Result<InvestorSummary, ProjectionError> {
        let investments = self
            .investments
            .list(&InvestmentFilter::ByUser(principal.user_id))
            .await?;
        let listings = self
            .listings
            .list()
            .await?
            .into_iter()
            .map(|listing| (listing.id().clone(), listing))
            .collect::<HashMap<_, _>>();
        Ok(investor_summary(&investments, &listings))
    }
}
