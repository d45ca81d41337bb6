//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every API route lives under `/api`; stored images are served from
//! `/uploads`. [`configure`] registers both so the server and the
//! integration tests build the same surface.

pub mod accounts;
pub mod error;
pub mod health;
pub mod investments;
pub mod listings;
pub mod session;
pub mod state;
pub mod teams;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod uploads;
pub mod views;

pub use error::ApiResult;

use actix_web::{HttpRequest, error::JsonPayloadError, web};

use crate::domain::Error;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {err}")).into()
}

/// JSON extractor settings shared by every handler: bodies up to
/// [`uploads::UPLOAD_BODY_LIMIT`], and malformed bodies reported as
/// `invalid_request` errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(uploads::UPLOAD_BODY_LIMIT)
        .error_handler(json_error)
}

/// Register the API scope and the upload file route.
///
/// Callers supply `HttpState` and `HealthState` as app data and wrap the
/// app in a session middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::scope("/api")
                .service(health::health)
                .service(accounts::register)
                .service(accounts::login)
                .service(accounts::verify)
                .service(accounts::resend_otp)
                .service(accounts::logout)
                .service(accounts::current_user)
                .service(listings::list_listings)
                .service(listings::save_listing)
                .service(listings::get_listing)
                .service(listings::delete_listing)
                .service(listings::adjust_raised_total)
                .service(listings::list_adjustments)
                .service(investments::list_investments)
                .service(investments::commit_investment)
                .service(investments::portfolio)
                .service(teams::list_invites)
                .service(teams::send_invite)
                .service(teams::accept_invite)
                .service(teams::remove_invite)
                .service(uploads::upload_image),
        )
        .service(uploads::serve_upload);
}
