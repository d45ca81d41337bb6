//! Account API handlers.
//!
//! ```text
//! POST /api/auth/register   {"name":"Ann","email":"ann@example.com","password":"secret1"}
//! POST /api/auth/login      {"email":"ann@example.com","password":"secret1"}
//! POST /api/auth/verify     {"email":"ann@example.com","code":"123456"}
//! POST /api/auth/resend-otp {"email":"ann@example.com"}
//! POST /api/auth/logout
//! GET  /api/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, OtpCode};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::UserView;

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResendRequest {
    pub email: String,
}

/// Acknowledgement for operations that sent a code.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSentResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_otp: Option<String>,
}

impl CodeSentResponse {
    fn new(message: &'static str, dev_otp: Option<OtpCode>) -> Self {
        Self {
            message,
            dev_otp: dev_otp.map(|code| code.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub user: UserView,
}

/// Create an unverified investor account and send a verification code.
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload.into_inner();
    let dispatch = state.accounts.register(&name, &email, &password).await?;
    Ok(HttpResponse::Created().json(CodeSentResponse::new(
        "Registration successful. Please verify your email with the code sent.",
        dispatch.dev_otp,
    )))
}

/// Authenticate a verified user and establish a session.
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state
        .accounts
        .login(&payload.email, &payload.password)
        .await?;
    session.persist_user(&user)?;
    Ok(web::Json(UserResponse {
        message: None,
        user: UserView::from(&user),
    }))
}

/// Redeem a verification code and log the user in.
#[post("/auth/verify")]
pub async fn verify(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VerifyRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state
        .accounts
        .verify_email(&payload.email, &payload.code)
        .await?;
    session.persist_user(&user)?;
    Ok(web::Json(UserResponse {
        message: Some("Email verified successfully"),
        user: UserView::from(&user),
    }))
}

/// Issue a fresh verification code, replacing any pending one.
#[post("/auth/resend-otp")]
pub async fn resend_otp(
    state: web::Data<HttpState>,
    payload: web::Json<ResendRequest>,
) -> ApiResult<web::Json<CodeSentResponse>> {
    let dispatch = state.accounts.resend_otp(&payload.email).await?;
    Ok(web::Json(CodeSentResponse::new("Code sent", dispatch.dev_otp)))
}

#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Return the account behind the current session.
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserView>> {
    let principal = session.require_principal()?;
    let user = state
        .accounts
        .find_user(&principal.user_id)
        .await?
        .ok_or_else(|| Error::unauthorized("login required"))?;
    Ok(web::Json(UserView::from(&user)))
}
