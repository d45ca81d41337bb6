//! Registration, verification and session flows over HTTP.

#[macro_use]
mod support;

use actix_web::http::StatusCode;
use actix_web::test::{TestRequest, init_service};
use propvest::server::build_app;
use propvest::test_support::app::{TEST_OTP, TestState};
use rstest::rstest;
use serde_json::{Value, json};

fn register_request(email: &str) -> TestRequest {
    TestRequest::post().uri("/api/auth/register").set_json(json!({
        "name": "Nimal Perera",
        "email": email,
        "password": "secret12",
    }))
}

fn verify_request(email: &str, code: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/auth/verify")
        .set_json(json!({ "email": email, "code": code }))
}

#[rstest]
#[actix_web::test]
async fn registration_verification_and_session_round_trip() {
    let state = TestState::new();
    let app = init_service(build_app(state.app_dependencies())).await;

    let registered = send!(app, register_request("nimal@example.com"));
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(
        registered.body.get("devOtp").and_then(Value::as_str),
        Some(TEST_OTP)
    );

    let blocked = send!(
        app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "nimal@example.com", "password": "secret12" }))
    );
    assert_eq!(blocked.status, StatusCode::FORBIDDEN);
    assert_eq!(blocked.reason(), Some("not_verified"));

    let verified = send!(app, verify_request("nimal@example.com", TEST_OTP));
    assert_eq!(verified.status, StatusCode::OK);
    assert_eq!(verified.body["user"]["isVerified"], json!(true));
    assert_eq!(verified.body["user"]["role"], json!("investor"));
    assert!(verified.body["user"].get("passwordHash").is_none());

    let me = send!(
        app,
        TestRequest::get()
            .uri("/api/auth/me")
            .cookie(verified.session())
    );
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], json!("nimal@example.com"));

    let session = login!(app, "nimal@example.com", "secret12");
    let logout = send!(
        app,
        TestRequest::post().uri("/api/auth/logout").cookie(session)
    );
    assert_eq!(logout.status, StatusCode::NO_CONTENT);
    let cleared = logout.session();
    let after = send!(app, TestRequest::get().uri("/api/auth/me").cookie(cleared));
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn duplicate_registration_is_rejected() {
    let state = TestState::new();
    let app = init_service(build_app(state.app_dependencies())).await;

    let first = send!(app, register_request("dup@example.com"));
    assert_eq!(first.status, StatusCode::CREATED);
    let second = send!(app, register_request("DUP@example.com"));
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.code(), Some("state_conflict"));
    assert_eq!(second.reason(), Some("email_taken"));
}

#[rstest]
#[case("000000", "code_mismatch")]
#[case("12ab", "code_mismatch")]
#[actix_web::test]
async fn wrong_codes_are_rejected(#[case] code: &str, #[case] reason: &str) {
    let state = TestState::new();
    let app = init_service(build_app(state.app_dependencies())).await;
    send!(app, register_request("code@example.com"));

    let reply = send!(app, verify_request("code@example.com", code));
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.reason(), Some(reason));
}

#[rstest]
#[actix_web::test]
async fn expired_codes_need_a_resend() {
    let state = TestState::new();
    let app = init_service(build_app(state.app_dependencies())).await;
    send!(app, register_request("late@example.com"));

    state.clock.advance_seconds(601);
    let expired = send!(app, verify_request("late@example.com", TEST_OTP));
    assert_eq!(expired.status, StatusCode::BAD_REQUEST);
    assert_eq!(expired.reason(), Some("expired"));

    let resent = send!(
        app,
        TestRequest::post()
            .uri("/api/auth/resend-otp")
            .set_json(json!({ "email": "late@example.com" }))
    );
    assert_eq!(resent.status, StatusCode::OK);
    assert_eq!(resent.body["devOtp"], json!(TEST_OTP));

    let verified = send!(app, verify_request("late@example.com", TEST_OTP));
    assert_eq!(verified.status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn wrong_password_is_unauthorised() {
    let state = TestState::new();
    state.seed_demo().await;
    let app = init_service(build_app(state.app_dependencies())).await;

    let reply = send!(
        app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": support::INVESTOR_EMAIL, "password": "wrong-password" }))
    );
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.reason(), Some("invalid_credentials"));
}

#[rstest]
#[actix_web::test]
async fn health_reports_ok() {
    let state = TestState::new();
    let deps = state.app_dependencies();
    deps.health_state.mark_ready();
    let app = init_service(build_app(deps)).await;

    let reply = send!(app, TestRequest::get().uri("/api/health"));
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], json!("OK"));
}
