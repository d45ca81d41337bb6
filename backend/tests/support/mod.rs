//! Shared helpers for HTTP integration suites.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use serde_json::Value;

/// Status, parsed JSON body and session cookie of one response.
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<Cookie<'static>>,
}

impl Reply {
    /// The `details.reason` of an error body.
    pub fn reason(&self) -> Option<&str> {
        self.body
            .get("details")
            .and_then(|details| details.get("reason"))
            .and_then(Value::as_str)
    }

    pub fn code(&self) -> Option<&str> {
        self.body.get("code").and_then(Value::as_str)
    }

    pub fn session(&self) -> Cookie<'static> {
        self.cookie.clone().expect("response should set a session cookie")
    }
}

pub fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).expect("response body should be JSON")
    }
}

/// Send a `TestRequest` through an initialised service and collect a
/// [`Reply`].
#[macro_export]
macro_rules! send {
    ($app:expr, $request:expr) => {{
        let response = ::actix_web::test::call_service(&$app, $request.to_request()).await;
        let status = response.status();
        let cookie = response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned());
        let bytes = ::actix_web::test::read_body(response).await;
        $crate::support::Reply {
            status,
            body: $crate::support::parse_body(bytes.as_ref()),
            cookie,
        }
    }};
}

/// Log in and return the session cookie.
#[macro_export]
macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let reply = $crate::send!(
            $app,
            ::actix_web::test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(::serde_json::json!({ "email": $email, "password": $password }))
        );
        assert_eq!(reply.status, ::actix_web::http::StatusCode::OK, "{}", reply.body);
        reply.session()
    }};
}

pub const ADMIN_EMAIL: &str = "admin@stake.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const INVESTOR_EMAIL: &str = "investor@stake.com";
pub const INVESTOR_PASSWORD: &str = "investor123";
