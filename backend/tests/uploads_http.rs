//! Image upload and retrieval over HTTP.

#[macro_use]
mod support;

use actix_web::http::{StatusCode, header};
use actix_web::test::{TestRequest, call_service, init_service, read_body};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use propvest::server::build_app;
use propvest::test_support::app::TestState;
use rstest::rstest;
use serde_json::json;
use support::{INVESTOR_EMAIL, INVESTOR_PASSWORD};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];

fn upload(content_type: &str, data: &str) -> TestRequest {
    upload_named("tower.png", content_type, data)
}

fn upload_named(file_name: &str, content_type: &str, data: &str) -> TestRequest {
    TestRequest::post().uri("/api/upload").set_json(json!({
        "fileName": file_name,
        "contentType": content_type,
        "dataBase64": data,
    }))
}

#[rstest]
#[actix_web::test]
async fn uploaded_images_are_served_back() {
    let state = TestState::new();
    state.seed_demo().await;
    let app = init_service(build_app(state.app_dependencies())).await;
    let session = login!(app, INVESTOR_EMAIL, INVESTOR_PASSWORD);

    let stored = send!(
        app,
        upload("image/png", &STANDARD.encode(PNG_BYTES)).cookie(session)
    );
    assert_eq!(stored.status, StatusCode::OK, "{}", stored.body);
    let url = stored.body["imageUrl"].as_str().expect("url").to_owned();
    assert!(url.starts_with("/uploads/1735689600000-"), "{url}");
    assert!(url.ends_with(".png"), "{url}");

    let response = call_service(&app, TestRequest::get().uri(&url).to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("image/png")
    );
    assert_eq!(
        response
            .headers()
            .get(header::X_CONTENT_TYPE_OPTIONS)
            .and_then(|value| value.to_str().ok()),
        Some("nosniff")
    );
    assert!(
        response
            .headers()
            .get(header::CONTENT_SECURITY_POLICY)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|policy| policy.contains("sandbox"))
    );
    assert_eq!(read_body(response).await.as_ref(), PNG_BYTES);
}

#[rstest]
#[actix_web::test]
async fn svg_uploads_are_refused() {
    let state = TestState::new();
    state.seed_demo().await;
    let app = init_service(build_app(state.app_dependencies())).await;
    let session = login!(app, INVESTOR_EMAIL, INVESTOR_PASSWORD);

    let script = r#"<svg xmlns="http://www.w3.org/2000/svg"><script>fetch('/api/listings')</script></svg>"#;
    let reply = send!(
        app,
        upload_named("logo.svg", "image/svg+xml", &STANDARD.encode(script)).cookie(session)
    );
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.reason(), Some("unsupported_image_type"));
}

#[rstest]
#[actix_web::test]
async fn stored_extension_follows_the_content_type() {
    let state = TestState::new();
    state.seed_demo().await;
    let app = init_service(build_app(state.app_dependencies())).await;
    let session = login!(app, INVESTOR_EMAIL, INVESTOR_PASSWORD);

    let stored = send!(
        app,
        upload_named("page.html", "image/png", &STANDARD.encode(PNG_BYTES)).cookie(session)
    );
    assert_eq!(stored.status, StatusCode::OK, "{}", stored.body);
    let url = stored.body["imageUrl"].as_str().expect("url");
    assert!(url.ends_with(".png"), "{url}");
}

#[rstest]
#[case("text/plain", "AQID", "not_an_image")]
#[case("image/png", "", "empty_upload")]
#[actix_web::test]
async fn unsuitable_uploads_are_rejected(
    #[case] content_type: &str,
    #[case] data: &str,
    #[case] reason: &str,
) {
    let state = TestState::new();
    state.seed_demo().await;
    let app = init_service(build_app(state.app_dependencies())).await;
    let session = login!(app, INVESTOR_EMAIL, INVESTOR_PASSWORD);

    let reply = send!(app, upload(content_type, data).cookie(session));
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.reason(), Some(reason));
}

#[rstest]
#[actix_web::test]
async fn uploads_need_a_session() {
    let state = TestState::new();
    let app = init_service(build_app(state.app_dependencies())).await;

    let reply = send!(app, upload("image/png", "AQID"));
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let missing = send!(app, TestRequest::get().uri("/uploads/1735689600000-none.png"));
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
