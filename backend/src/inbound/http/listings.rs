//! Listing API handlers.
//!
//! ```text
//! GET    /api/listings
//! GET    /api/listings/{id}
//! POST   /api/listings                    (admin)
//! DELETE /api/listings/{id}               (admin)
//! POST   /api/listings/{id}/raised-total  (admin) {"totalRaised":30000000,"reason":"..."}
//! GET    /api/listings/{id}/adjustments   (admin)
//! ```

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::{Error, ListingDraft, ListingId, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{AdjustmentView, ListingView};

/// Parse a listing id taken from the path. Malformed ids cannot name an
/// existing listing.
pub(crate) fn listing_id_from_path(raw: &str) -> Result<ListingId, Error> {
    ListingId::new(raw).map_err(|_| {
        Error::not_found(format!("listing {raw} not found")).with_reason("listing_not_found")
    })
}

/// Body of `POST /api/listings`. Omitting `id` creates a new listing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub city: String,
    pub category: String,
    pub status: String,
    #[serde(default)]
    pub image: String,
    pub min_investment: i64,
    pub roi: f64,
    pub target_amount: i64,
    #[serde(default)]
    pub total_raised: Option<i64>,
    pub duration_months: i64,
}

impl From<ListingRequest> for ListingDraft {
    fn from(request: ListingRequest) -> Self {
        Self {
            id: request.id,
            title: request.title,
            city: request.city,
            category: request.category,
            status: request.status,
            image: request.image,
            min_investment: request.min_investment,
            roi: request.roi,
            target_amount: request.target_amount,
            total_raised: request.total_raised,
            duration_months: request.duration_months,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaisedTotalRequest {
    pub total_raised: i64,
    pub reason: String,
}

/// All listings, newest first.
#[get("/listings")]
pub async fn list_listings(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<ListingView>>> {
    let listings = state.listings.list().await?;
    Ok(web::Json(listings.iter().map(ListingView::from).collect()))
}

#[get("/listings/{id}")]
pub async fn get_listing(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ListingView>> {
    let id = listing_id_from_path(&path)?;
    let listing = state.listings.get(&id).await?;
    Ok(web::Json(ListingView::from(&listing)))
}

/// Create or revise a listing.
#[post("/listings")]
pub async fn save_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ListingRequest>,
) -> ApiResult<web::Json<ListingView>> {
    let principal = session.require_role(UserRole::Admin)?;
    let draft = ListingDraft::from(payload.into_inner());
    let listing = state.listings.save(&principal, &draft).await?;
    Ok(web::Json(ListingView::from(&listing)))
}

/// Delete a listing together with its investments, invites and audit log.
#[delete("/listings/{id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    let principal = session.require_role(UserRole::Admin)?;
    let id = listing_id_from_path(&path)?;
    state.listings.delete(&principal, &id).await?;
    Ok(web::Json(json!({ "message": "Listing deleted successfully" })))
}

/// Correct a listing's raised total outside the investment flow.
#[post("/listings/{id}/raised-total")]
pub async fn adjust_raised_total(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RaisedTotalRequest>,
) -> ApiResult<web::Json<ListingView>> {
    let principal = session.require_role(UserRole::Admin)?;
    let id = listing_id_from_path(&path)?;
    let listing = state
        .listings
        .adjust_raised_total(&principal, &id, payload.total_raised, &payload.reason)
        .await?;
    Ok(web::Json(ListingView::from(&listing)))
}

#[get("/listings/{id}/adjustments")]
pub async fn list_adjustments(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<AdjustmentView>>> {
    let principal = session.require_role(UserRole::Admin)?;
    let id = listing_id_from_path(&path)?;
    let adjustments = state.listings.adjustments(&principal, &id).await?;
    Ok(web::Json(adjustments.iter().map(AdjustmentView::from).collect()))
}
