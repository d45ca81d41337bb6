//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations such as persisting or retrieving the caller's
//! [`Principal`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Email, Error, Principal, User, UserId, UserRole};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const EMAIL_KEY: &str = "email";
pub(crate) const ROLE_KEY: &str = "role";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

fn read_failure(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to read session: {error}"))
}

fn write_failure(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to persist session: {error}"))
}

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's identity claims in the session cookie.
    pub fn persist_user(&self, user: &User) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user.id().to_string())
            .map_err(write_failure)?;
        self.0
            .insert(EMAIL_KEY, user.email().as_ref())
            .map_err(write_failure)?;
        self.0
            .insert(ROLE_KEY, user.role().as_str())
            .map_err(write_failure)
    }

    /// Drop every claim from the session.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Fetch the caller's identity from the session, if present.
    ///
    /// Tampered or partial claims are treated as an anonymous caller.
    pub fn principal(&self) -> Result<Option<Principal>, Error> {
        let id = self.0.get::<String>(USER_ID_KEY).map_err(read_failure)?;
        let email = self.0.get::<String>(EMAIL_KEY).map_err(read_failure)?;
        let role = self.0.get::<String>(ROLE_KEY).map_err(read_failure)?;
        let (Some(id), Some(email), Some(role)) = (id, email, role) else {
            return Ok(None);
        };
        let parsed = UserId::new(&id).and_then(|id| {
            let email = Email::new(&email)?;
            let role = role.parse::<UserRole>()?;
            Ok(Principal::new(id, email, role))
        });
        match parsed {
            Ok(principal) => Ok(Some(principal)),
            Err(error) => {
                tracing::warn!("invalid identity in session cookie: {error}");
                Ok(None)
            }
        }
    }

    /// Require an authenticated caller or return `401 Unauthorized`.
    pub fn require_principal(&self) -> Result<Principal, Error> {
        self.principal()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require an authenticated caller holding `role`.
    ///
    /// Anonymous callers get `401`; callers with another role get `403`.
    pub fn require_role(&self, role: UserRole) -> Result<Principal, Error> {
        let principal = self.require_principal()?;
        principal
            .require_role(role)
            .map_err(|denied| Error::forbidden(denied.to_string()))?;
        Ok(principal)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PasswordHash, UserDraft, UserName};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use chrono::Utc;

    const FIXTURE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn fixture_user(role: UserRole) -> User {
        User::new(UserDraft {
            id: UserId::new(FIXTURE_ID).expect("fixture id"),
            email: Email::new("ann@example.com").expect("email"),
            password_hash: PasswordHash::from_encoded("$argon2id$fixture"),
            name: UserName::new("Ann Perera").expect("name"),
            role,
            is_verified: true,
            created_at: Utc::now(),
        })
    }

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .route(
                "/login-investor",
                web::get().to(|session: SessionContext| async move {
                    session.persist_user(&fixture_user(UserRole::Investor))?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/whoami",
                web::get().to(|session: SessionContext| async move {
                    let principal = session.require_principal()?;
                    Ok::<_, Error>(HttpResponse::Ok().body(format!(
                        "{} {} {}",
                        principal.user_id, principal.email, principal.role
                    )))
                }),
            )
            .route(
                "/admin-only",
                web::get().to(|session: SessionContext| async move {
                    session.require_role(UserRole::Admin)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
    }

    macro_rules! login_cookie {
        ($app:expr) => {{
            let res = test::call_service(
                &$app,
                test::TestRequest::get().uri("/login-investor").to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::OK);
            res.response()
                .cookies()
                .find(|cookie| cookie.name() == "session")
                .map(|cookie| cookie.into_owned())
                .expect("session cookie set")
        }};
    }

    #[actix_web::test]
    async fn round_trips_principal() {
        let app = test::init_service(session_test_app()).await;
        let cookie = login_cookie!(app);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, format!("{FIXTURE_ID} ann@example.com investor"));
    }

    #[actix_web::test]
    async fn missing_session_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn wrong_role_is_forbidden() {
        let app = test::init_service(session_test_app()).await;
        let cookie = login_cookie!(app);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin-only")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
