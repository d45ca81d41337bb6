//! Team invite API handlers.
//!
//! ```text
//! GET    /api/teams/{listingId}
//! POST   /api/teams/{listingId}/invite          (investor) {"email":"bob@example.com"}
//! POST   /api/teams/{listingId}/accept          (investor)
//! DELETE /api/teams/{listingId}/invites/{email} (investor)
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::UserRole;
use crate::inbound::http::ApiResult;
use crate::inbound::http::listings::listing_id_from_path;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::InviteView;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InviteRequest {
    pub email: String,
}

#[get("/teams/{listing_id}")]
pub async fn list_invites(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<InviteView>>> {
    session.require_principal()?;
    let listing_id = listing_id_from_path(&path)?;
    let invites = state.teams.list(&listing_id).await?;
    Ok(web::Json(invites.iter().map(InviteView::from).collect()))
}

#[post("/teams/{listing_id}/invite")]
pub async fn send_invite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<InviteRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_role(UserRole::Investor)?;
    let listing_id = listing_id_from_path(&path)?;
    let invite = state
        .teams
        .invite(&principal, &listing_id, &payload.email)
        .await?;
    Ok(HttpResponse::Created().json(InviteView::from(&invite)))
}

/// Accept the caller's own invite.
#[post("/teams/{listing_id}/accept")]
pub async fn accept_invite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<InviteView>> {
    let principal = session.require_role(UserRole::Investor)?;
    let listing_id = listing_id_from_path(&path)?;
    let invite = state.teams.accept(&principal, &listing_id).await?;
    Ok(web::Json(InviteView::from(&invite)))
}

/// Withdraw an invite. Withdrawing an absent invite succeeds.
#[delete("/teams/{listing_id}/invites/{email}")]
pub async fn remove_invite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_role(UserRole::Investor)?;
    let (listing_id, email) = path.into_inner();
    let listing_id = listing_id_from_path(&listing_id)?;
    state.teams.remove(&principal, &listing_id, &email).await?;
    Ok(HttpResponse::NoContent().finish())
}
