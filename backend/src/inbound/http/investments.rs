//! Investment API handlers.
//!
//! ```text
//! GET  /api/investments
//! POST /api/investments  (investor) {"listingId":"colombo-sky-1","amount":500000}
//! GET  /api/portfolio    (investor)
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{InvestorSummary, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::listings::listing_id_from_path;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::InvestmentView;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRequest {
    pub listing_id: String,
    pub amount: i64,
}

/// Ledger entries visible to the caller, newest first.
#[get("/investments")]
pub async fn list_investments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<InvestmentView>>> {
    let principal = session.require_principal()?;
    let entries = state.ledger.history(&principal).await?;
    Ok(web::Json(entries.iter().map(InvestmentView::from).collect()))
}

/// Commit capital to a listing.
#[post("/investments")]
pub async fn commit_investment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<InvestmentRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_role(UserRole::Investor)?;
    let listing_id = listing_id_from_path(&payload.listing_id)?;
    let investment = state
        .ledger
        .commit(&principal, &listing_id, payload.amount)
        .await?;
    Ok(HttpResponse::Created().json(InvestmentView::from(&investment)))
}

/// Dashboard figures for the caller's own investments.
#[get("/portfolio")]
pub async fn portfolio(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<InvestorSummary>> {
    let principal = session.require_role(UserRole::Investor)?;
    let summary = state.portfolio.summary(&principal).await?;
    Ok(web::Json(summary))
}
