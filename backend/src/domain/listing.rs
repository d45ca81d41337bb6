//! Property listings and their funding state.
//!
//! A listing owns the only contended state in the marketplace: the
//! `total_raised`/`status` pair. Mutations of that pair go through
//! [`Listing::record_commitment`] (investor commits) or
//! [`Listing::set_raised_total`] (audited administrative correction).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::slug::{is_valid_slug, slugify_with_suffix};
use super::user::{Email, UserId};

/// Minimum title length for a listing.
pub const TITLE_MIN_LEN: usize = 3;

/// Validation errors raised while building or revising a listing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingValidationError {
    #[error("listing id must be a lowercase slug, got '{value}'")]
    InvalidId { value: String },
    #[error("title must be at least {min} characters")]
    TitleTooShort { min: usize },
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("invalid status '{value}'; expected Active, Funding or Coming Soon")]
    InvalidStatus { value: String },
    #[error("{field} must be a positive whole number")]
    NotPositive { field: &'static str },
    #[error("roi must be a non-negative percentage")]
    InvalidRoi,
    #[error("totalRaised {total_raised} must be between 0 and targetAmount {target_amount}")]
    RaisedTotalOutOfRange { total_raised: i64, target_amount: u64 },
    #[error("totalRaised can only be changed through a raised-total adjustment")]
    RaisedTotalNotEditable,
}

impl ListingValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId { .. } => "id",
            Self::TitleTooShort { .. } => "title",
            Self::MissingField { field } | Self::NotPositive { field } => field,
            Self::InvalidStatus { .. } => "status",
            Self::InvalidRoi => "roi",
            Self::RaisedTotalOutOfRange { .. } | Self::RaisedTotalNotEditable => "totalRaised",
        }
    }
}

/// Listing identifier: a lowercase slug such as `colombo-sky-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListingId(String);

impl ListingId {
    /// Validate a caller-supplied identifier.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ListingValidationError> {
        let trimmed = id.as_ref().trim();
        if is_valid_slug(trimmed) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(ListingValidationError::InvalidId {
                value: trimmed.to_owned(),
            })
        }
    }

    /// Generate an identifier from a title and a creation timestamp.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use propvest::domain::ListingId;
    ///
    /// let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    /// let id = ListingId::generate("Galle Heritage Hotel", at);
    /// assert_eq!(id.as_ref(), "galle-heritage-hotel-1700000000000");
    /// ```
    pub fn generate(title: &str, at: DateTime<Utc>) -> Self {
        Self(slugify_with_suffix(title, at.timestamp_millis()))
    }
}

impl AsRef<str> for ListingId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ListingId> for String {
    fn from(value: ListingId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ListingId {
    type Error = ListingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Funding lifecycle of a listing. Only `Active` listings accept capital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    Active,
    Funding,
    #[serde(rename = "Coming Soon", alias = "ComingSoon")]
    ComingSoon,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Funding => "Funding",
            Self::ComingSoon => "Coming Soon",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = ListingValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Active" => Ok(Self::Active),
            "Funding" => Ok(Self::Funding),
            "Coming Soon" | "ComingSoon" => Ok(Self::ComingSoon),
            other => Err(ListingValidationError::InvalidStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Raw listing input as submitted by an administrator.
///
/// Numeric fields are signed so that negative submissions surface as
/// validation errors instead of deserialisation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub id: Option<String>,
    pub title: String,
    pub city: String,
    pub category: String,
    pub status: String,
    pub image: String,
    pub min_investment: i64,
    pub roi: f64,
    pub target_amount: i64,
    pub total_raised: Option<i64>,
    pub duration_months: i64,
}

/// Validated descriptive fields shared by creation and revision.
struct ListingMetadata {
    title: String,
    city: String,
    category: String,
    status: ListingStatus,
    image: String,
    min_investment: u64,
    roi: f64,
    target_amount: u64,
    duration_months: u32,
}

fn positive(value: i64, field: &'static str) -> Result<u64, ListingValidationError> {
    u64::try_from(value)
        .ok()
        .filter(|value| *value > 0)
        .ok_or(ListingValidationError::NotPositive { field })
}

fn required(value: &str, field: &'static str) -> Result<String, ListingValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ListingValidationError::MissingField { field })
    } else {
        Ok(trimmed.to_owned())
    }
}

impl ListingMetadata {
    fn validate(draft: &ListingDraft) -> Result<Self, ListingValidationError> {
        let title = draft.title.trim();
        if title.chars().count() < TITLE_MIN_LEN {
            return Err(ListingValidationError::TitleTooShort {
                min: TITLE_MIN_LEN,
            });
        }
        let city = required(&draft.city, "city")?;
        let category = required(&draft.category, "category")?;
        let status = draft.status.parse::<ListingStatus>()?;
        if !draft.roi.is_finite() || draft.roi < 0.0 {
            return Err(ListingValidationError::InvalidRoi);
        }
        let duration_months = u32::try_from(positive(draft.duration_months, "durationMonths")?)
            .map_err(|_| ListingValidationError::NotPositive {
                field: "durationMonths",
            })?;

        Ok(Self {
            title: title.to_owned(),
            city,
            category,
            status,
            image: draft.image.trim().to_owned(),
            min_investment: positive(draft.min_investment, "minInvestment")?,
            roi: draft.roi,
            target_amount: positive(draft.target_amount, "targetAmount")?,
            duration_months,
        })
    }
}

/// Reason an investment amount is refused by a listing, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionRejection {
    /// The listing is not `Active`.
    NotInvestable { status: ListingStatus },
    /// The amount is smaller than the listing minimum.
    BelowMinimum { amount: u64, minimum: u64 },
    /// The amount would push the raised total past the target.
    ExceedsRemainingCapacity { amount: u64, remaining: u64 },
}

/// A fundable property investment opportunity.
///
/// ## Invariants
/// - `0 <= total_raised <= target_amount`.
/// - `min_investment`, `target_amount` and `duration_months` are positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    id: ListingId,
    title: String,
    city: String,
    category: String,
    status: ListingStatus,
    image: String,
    min_investment: u64,
    roi: f64,
    target_amount: u64,
    total_raised: u64,
    duration_months: u32,
    created_at: DateTime<Utc>,
}

impl Listing {
    /// Build a new listing from administrator input.
    ///
    /// `draft.total_raised` seeds the opening balance and defaults to zero.
    pub fn create(
        id: ListingId,
        draft: &ListingDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ListingValidationError> {
        let metadata = ListingMetadata::validate(draft)?;
        let opening = draft.total_raised.unwrap_or(0);
        let total_raised = u64::try_from(opening)
            .ok()
            .filter(|total| *total <= metadata.target_amount)
            .ok_or(ListingValidationError::RaisedTotalOutOfRange {
                total_raised: opening,
                target_amount: metadata.target_amount,
            })?;

        let ListingMetadata {
            title,
            city,
            category,
            status,
            image,
            min_investment,
            roi,
            target_amount,
            duration_months,
        } = metadata;
        Ok(Self {
            id,
            title,
            city,
            category,
            status,
            image,
            min_investment,
            roi,
            target_amount,
            total_raised,
            duration_months,
            created_at,
        })
    }

    /// Revise descriptive fields, leaving the raised total untouched.
    ///
    /// A draft that names a different `total_raised` is refused; that value
    /// only moves through commits or [`Listing::set_raised_total`].
    pub fn revise(&mut self, draft: &ListingDraft) -> Result<(), ListingValidationError> {
        let metadata = ListingMetadata::validate(draft)?;
        if let Some(requested) = draft.total_raised {
            if u64::try_from(requested).ok() != Some(self.total_raised) {
                return Err(ListingValidationError::RaisedTotalNotEditable);
            }
        }
        if metadata.target_amount < self.total_raised {
            return Err(ListingValidationError::RaisedTotalOutOfRange {
                total_raised: i64::try_from(self.total_raised).unwrap_or(i64::MAX),
                target_amount: metadata.target_amount,
            });
        }

        self.title = metadata.title;
        self.city = metadata.city;
        self.category = metadata.category;
        self.status = metadata.status;
        self.image = metadata.image;
        self.min_investment = metadata.min_investment;
        self.roi = metadata.roi;
        self.target_amount = metadata.target_amount;
        self.duration_months = metadata.duration_months;
        Ok(())
    }

    /// Check whether `amount` may be committed, in rule order: status,
    /// minimum, remaining capacity.
    pub fn admit(&self, amount: u64) -> Result<(), AdmissionRejection> {
        if self.status != ListingStatus::Active {
            return Err(AdmissionRejection::NotInvestable {
                status: self.status,
            });
        }
        if amount < self.min_investment {
            return Err(AdmissionRejection::BelowMinimum {
                amount,
                minimum: self.min_investment,
            });
        }
        let remaining = self.target_amount.saturating_sub(self.total_raised);
        if amount > remaining {
            return Err(AdmissionRejection::ExceedsRemainingCapacity { amount, remaining });
        }
        Ok(())
    }

    /// Apply an admitted commitment.
    ///
    /// A listing that reaches its target moves from `Active` to `Funding`,
    /// which closes it to further commits.
    pub fn record_commitment(&mut self, amount: u64) -> Result<(), AdmissionRejection> {
        self.admit(amount)?;
        self.total_raised += amount;
        if self.total_raised == self.target_amount {
            self.status = ListingStatus::Funding;
        }
        Ok(())
    }

    /// Overwrite the raised total, returning the previous value.
    pub fn set_raised_total(&mut self, new_total: i64) -> Result<u64, ListingValidationError> {
        let accepted = u64::try_from(new_total)
            .ok()
            .filter(|total| *total <= self.target_amount)
            .ok_or(ListingValidationError::RaisedTotalOutOfRange {
                total_raised: new_total,
                target_amount: self.target_amount,
            })?;
        Ok(std::mem::replace(&mut self.total_raised, accepted))
    }

    pub fn id(&self) -> &ListingId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn status(&self) -> ListingStatus {
        self.status
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn min_investment(&self) -> u64 {
        self.min_investment
    }

    /// Projected annual return, in percent.
    pub fn roi(&self) -> f64 {
        self.roi
    }

    pub fn target_amount(&self) -> u64 {
        self.target_amount
    }

    pub fn total_raised(&self) -> u64 {
        self.total_raised
    }

    pub fn duration_months(&self) -> u32 {
        self.duration_months
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Audit entry for an administrative change of a listing's raised total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaisedTotalAdjustment {
    pub listing_id: ListingId,
    pub previous_total: u64,
    pub new_total: u64,
    pub reason: String,
    pub actor_id: UserId,
    pub actor_email: Email,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "listing_tests.rs"]
mod tests;
