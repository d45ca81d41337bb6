//! Internal snapshot row structs.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They define the on-disk JSON shape of
//! each table and convert to and from domain entities, revalidating on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Email, Investment, InvestmentId, InviteId, InviteStatus, Listing, ListingDraft, ListingId,
    OtpCode, OtpRecord, PasswordHash, RaisedTotalAdjustment, TeamInvite, User, UserDraft, UserId,
    UserName,
};

/// Conversion failure for a stored row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{table} row {key}: {message}")]
pub(crate) struct RowError {
    pub table: &'static str,
    pub key: String,
    pub message: String,
}

impl RowError {
    fn new(table: &'static str, key: impl Into<String>, message: impl ToString) -> Self {
        Self {
            table,
            key: key.into(),
            message: message.to_string(),
        }
    }
}

fn amount_as_i64(table: &'static str, key: &str, value: u64) -> Result<i64, RowError> {
    i64::try_from(value).map_err(|_| RowError::new(table, key, "amount out of range"))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            email: user.email().to_string(),
            password_hash: user.password_hash().as_str().to_owned(),
            name: user.name().as_ref().to_owned(),
            role: user.role().as_str().to_owned(),
            is_verified: user.is_verified(),
            created_at: user.created_at(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = RowError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let key = row.id.to_string();
        let invalid = |err: crate::domain::UserValidationError| RowError::new("users", key.as_str(), err);
        Ok(User::new(UserDraft {
            id: UserId::from_uuid(row.id),
            email: Email::new(&row.email).map_err(invalid)?,
            password_hash: PasswordHash::from_encoded(row.password_hash),
            name: UserName::new(&row.name).map_err(invalid)?,
            role: row.role.parse().map_err(invalid)?,
            is_verified: row.is_verified,
            created_at: row.created_at,
        }))
    }
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListingRow {
    pub id: String,
    pub title: String,
    pub city: String,
    pub category: String,
    pub status: String,
    pub image: String,
    pub min_investment: u64,
    pub roi: f64,
    pub target_amount: u64,
    pub total_raised: u64,
    pub duration_months: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&Listing> for ListingRow {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id().to_string(),
            title: listing.title().to_owned(),
            city: listing.city().to_owned(),
            category: listing.category().to_owned(),
            status: listing.status().as_str().to_owned(),
            image: listing.image().to_owned(),
            min_investment: listing.min_investment(),
            roi: listing.roi(),
            target_amount: listing.target_amount(),
            total_raised: listing.total_raised(),
            duration_months: listing.duration_months(),
            created_at: listing.created_at(),
        }
    }
}

impl TryFrom<ListingRow> for Listing {
    type Error = RowError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "listings";
        let key = row.id.clone();
        let id = ListingId::new(&row.id).map_err(|err| RowError::new(TABLE, &key, err))?;
        let draft = ListingDraft {
            id: Some(row.id),
            title: row.title,
            city: row.city,
            category: row.category,
            status: row.status,
            image: row.image,
            min_investment: amount_as_i64(TABLE, &key, row.min_investment)?,
            roi: row.roi,
            target_amount: amount_as_i64(TABLE, &key, row.target_amount)?,
            total_raised: Some(amount_as_i64(TABLE, &key, row.total_raised)?),
            duration_months: i64::from(row.duration_months),
        };
        Listing::create(id, &draft, row.created_at).map_err(|err| RowError::new(TABLE, &key, err))
    }
}

// ---------------------------------------------------------------------------
// Investments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvestmentRow {
    pub id: Uuid,
    pub listing_id: String,
    pub user_id: Uuid,
    pub user_email: String,
    pub amount: u64,
    pub date: DateTime<Utc>,
}

impl From<&Investment> for InvestmentRow {
    fn from(investment: &Investment) -> Self {
        Self {
            id: *investment.id.as_uuid(),
            listing_id: investment.listing_id.to_string(),
            user_id: *investment.user_id.as_uuid(),
            user_email: investment.user_email.to_string(),
            amount: investment.amount,
            date: investment.date,
        }
    }
}

impl TryFrom<InvestmentRow> for Investment {
    type Error = RowError;

    fn try_from(row: InvestmentRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "investments";
        let key = row.id.to_string();
        if row.amount == 0 {
            return Err(RowError::new(TABLE, key, "amount must be positive"));
        }
        Ok(Investment {
            id: InvestmentId::from_uuid(row.id),
            listing_id: ListingId::new(&row.listing_id)
                .map_err(|err| RowError::new(TABLE, &key, err))?,
            user_id: UserId::from_uuid(row.user_id),
            user_email: Email::new(&row.user_email).map_err(|err| RowError::new(TABLE, &key, err))?,
            amount: row.amount,
            date: row.date,
        })
    }
}

// ---------------------------------------------------------------------------
// Team invites
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TeamInviteRow {
    pub id: Uuid,
    pub listing_id: String,
    pub email: String,
    pub status: InviteStatus,
    pub date: DateTime<Utc>,
}

impl From<&TeamInvite> for TeamInviteRow {
    fn from(invite: &TeamInvite) -> Self {
        Self {
            id: *invite.id.as_uuid(),
            listing_id: invite.listing_id.to_string(),
            email: invite.email.to_string(),
            status: invite.status,
            date: invite.date,
        }
    }
}

impl TryFrom<TeamInviteRow> for TeamInvite {
    type Error = RowError;

    fn try_from(row: TeamInviteRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "team_invites";
        let key = row.id.to_string();
        Ok(TeamInvite {
            id: InviteId::from_uuid(row.id),
            listing_id: ListingId::new(&row.listing_id)
                .map_err(|err| RowError::new(TABLE, &key, err))?,
            email: Email::new(&row.email).map_err(|err| RowError::new(TABLE, &key, err))?,
            status: row.status,
            date: row.date,
        })
    }
}

// ---------------------------------------------------------------------------
// Pending OTPs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OtpRow {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&OtpRecord> for OtpRow {
    fn from(record: &OtpRecord) -> Self {
        Self {
            email: record.email.to_string(),
            code: record.code.as_str().to_owned(),
            expires_at: record.expires_at,
        }
    }
}

impl TryFrom<OtpRow> for OtpRecord {
    type Error = RowError;

    fn try_from(row: OtpRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "pending_otps";
        let email = Email::new(&row.email).map_err(|err| RowError::new(TABLE, &row.email, err))?;
        let code = OtpCode::parse(&row.code)
            .ok_or_else(|| RowError::new(TABLE, &row.email, "code must be six digits"))?;
        Ok(OtpRecord {
            email,
            code,
            expires_at: row.expires_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Raised-total adjustments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdjustmentRow {
    pub listing_id: String,
    pub previous_total: u64,
    pub new_total: u64,
    pub reason: String,
    pub actor_id: Uuid,
    pub actor_email: String,
    pub at: DateTime<Utc>,
}

impl From<&RaisedTotalAdjustment> for AdjustmentRow {
    fn from(adjustment: &RaisedTotalAdjustment) -> Self {
        Self {
            listing_id: adjustment.listing_id.to_string(),
            previous_total: adjustment.previous_total,
            new_total: adjustment.new_total,
            reason: adjustment.reason.clone(),
            actor_id: *adjustment.actor_id.as_uuid(),
            actor_email: adjustment.actor_email.to_string(),
            at: adjustment.at,
        }
    }
}

impl TryFrom<AdjustmentRow> for RaisedTotalAdjustment {
    type Error = RowError;

    fn try_from(row: AdjustmentRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "listing_adjustments";
        let key = row.listing_id.clone();
        Ok(RaisedTotalAdjustment {
            listing_id: ListingId::new(&row.listing_id)
                .map_err(|err| RowError::new(TABLE, &key, err))?,
            previous_total: row.previous_total,
            new_total: row.new_total,
            reason: row.reason,
            actor_id: UserId::from_uuid(row.actor_id),
            actor_email: Email::new(&row.actor_email)
                .map_err(|err| RowError::new(TABLE, &key, err))?,
            at: row.at,
        })
    }
}
