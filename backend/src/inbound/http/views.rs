//! JSON response bodies.
//!
//! Domain entities stay free of wire concerns; these views fix the field
//! names clients see and add derived figures such as listing progress.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    Investment, InviteStatus, Listing, RaisedTotalAdjustment, TeamInvite, User, UserRole,
    investable_step, progress_percent, remaining_capacity,
};

/// Public account view. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().as_ref().to_owned(),
            email: user.email().to_string(),
            role: user.role(),
            is_verified: user.is_verified(),
            created_at: user.created_at(),
        }
    }
}

/// Listing with its funding figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
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
    pub progress_percent: u8,
    pub remaining_capacity: u64,
    pub investable_step: u64,
}

impl From<&Listing> for ListingView {
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
            progress_percent: progress_percent(listing),
            remaining_capacity: remaining_capacity(listing),
            investable_step: investable_step(listing),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentView {
    pub id: String,
    pub listing_id: String,
    pub user_id: String,
    pub user_email: String,
    pub amount: u64,
    pub date: DateTime<Utc>,
}

impl From<&Investment> for InvestmentView {
    fn from(investment: &Investment) -> Self {
        Self {
            id: investment.id.to_string(),
            listing_id: investment.listing_id.to_string(),
            user_id: investment.user_id.to_string(),
            user_email: investment.user_email.to_string(),
            amount: investment.amount,
            date: investment.date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteView {
    pub id: String,
    pub listing_id: String,
    pub email: String,
    pub status: InviteStatus,
    pub date: DateTime<Utc>,
}

impl From<&TeamInvite> for InviteView {
    fn from(invite: &TeamInvite) -> Self {
        Self {
            id: invite.id.to_string(),
            listing_id: invite.listing_id.to_string(),
            email: invite.email.to_string(),
            status: invite.status,
            date: invite.date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentView {
    pub listing_id: String,
    pub previous_total: u64,
    pub new_total: u64,
    pub reason: String,
    pub actor_id: String,
    pub actor_email: String,
    pub at: DateTime<Utc>,
}

impl From<&RaisedTotalAdjustment> for AdjustmentView {
    fn from(adjustment: &RaisedTotalAdjustment) -> Self {
        Self {
            listing_id: adjustment.listing_id.to_string(),
            previous_total: adjustment.previous_total,
            new_total: adjustment.new_total,
            reason: adjustment.reason.clone(),
            actor_id: adjustment.actor_id.to_string(),
            actor_email: adjustment.actor_email.to_string(),
            at: adjustment.at,
        }
    }
}
