//! Team invite flow over HTTP.

#[macro_use]
mod support;

use actix_web::http::StatusCode;
use actix_web::test::{TestRequest, init_service};
use propvest::server::build_app;
use propvest::test_support::app::{TEST_OTP, TestState};
use rstest::rstest;
use serde_json::json;
use support::{ADMIN_EMAIL, ADMIN_PASSWORD, INVESTOR_EMAIL, INVESTOR_PASSWORD};

fn invite(email: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/teams/colombo-sky-1/invite")
        .set_json(json!({ "email": email }))
}

#[rstest]
#[actix_web::test]
async fn invitees_accept_their_own_invites() {
    let state = TestState::new();
    state.seed_demo().await;
    let app = init_service(build_app(state.app_dependencies())).await;
    let inviter = login!(app, INVESTOR_EMAIL, INVESTOR_PASSWORD);

    let sent = send!(app, invite("Kamala@Example.com").cookie(inviter.clone()));
    assert_eq!(sent.status, StatusCode::CREATED, "{}", sent.body);
    assert_eq!(sent.body["email"], json!("kamala@example.com"));
    assert_eq!(sent.body["status"], json!("Pending"));

    let duplicate = send!(app, invite("kamala@example.com").cookie(inviter.clone()));
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.reason(), Some("duplicate_invite"));

    let not_invited = send!(
        app,
        TestRequest::post()
            .uri("/api/teams/colombo-sky-1/accept")
            .cookie(inviter.clone())
    );
    assert_eq!(not_invited.status, StatusCode::NOT_FOUND);
    assert_eq!(not_invited.reason(), Some("no_such_invite"));

    send!(
        app,
        TestRequest::post().uri("/api/auth/register").set_json(json!({
            "name": "Kamala Silva",
            "email": "kamala@example.com",
            "password": "secret12",
        }))
    );
    let invitee = send!(
        app,
        TestRequest::post()
            .uri("/api/auth/verify")
            .set_json(json!({ "email": "kamala@example.com", "code": TEST_OTP }))
    )
    .session();

    let accepted = send!(
        app,
        TestRequest::post()
            .uri("/api/teams/colombo-sky-1/accept")
            .cookie(invitee)
    );
    assert_eq!(accepted.status, StatusCode::OK, "{}", accepted.body);
    assert_eq!(accepted.body["status"], json!("Accepted"));

    let listed = send!(
        app,
        TestRequest::get().uri("/api/teams/colombo-sky-1").cookie(inviter)
    );
    assert_eq!(listed.body.as_array().map(Vec::len), Some(1));
    assert_eq!(listed.body[0]["status"], json!("Accepted"));
}

#[rstest]
#[actix_web::test]
async fn removing_invites_is_idempotent() {
    let state = TestState::new();
    state.seed_demo().await;
    let app = init_service(build_app(state.app_dependencies())).await;
    let inviter = login!(app, INVESTOR_EMAIL, INVESTOR_PASSWORD);
    send!(app, invite("gone@example.com").cookie(inviter.clone()));

    for _ in 0..2 {
        let removed = send!(
            app,
            TestRequest::delete()
                .uri("/api/teams/colombo-sky-1/invites/gone@example.com")
                .cookie(inviter.clone())
        );
        assert_eq!(removed.status, StatusCode::NO_CONTENT);
    }

    let listed = send!(
        app,
        TestRequest::get().uri("/api/teams/colombo-sky-1").cookie(inviter)
    );
    assert_eq!(listed.body, json!([]));
}

#[rstest]
#[actix_web::test]
async fn invites_need_an_investor_and_a_listing() {
    let state = TestState::new();
    state.seed_demo().await;
    let app = init_service(build_app(state.app_dependencies())).await;

    let anonymous = send!(app, invite("x@example.com"));
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let admin = login!(app, ADMIN_EMAIL, ADMIN_PASSWORD);
    let refused = send!(app, invite("x@example.com").cookie(admin));
    assert_eq!(refused.status, StatusCode::FORBIDDEN);

    let investor = login!(app, INVESTOR_EMAIL, INVESTOR_PASSWORD);
    let missing = send!(
        app,
        TestRequest::post()
            .uri("/api/teams/no-such-listing/invite")
            .cookie(investor.clone())
            .set_json(json!({ "email": "x@example.com" }))
    );
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let malformed = send!(app, invite("not-an-email").cookie(investor));
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.reason(), Some("invalid_email"));
}
