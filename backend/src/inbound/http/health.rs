//! Health endpoint for orchestration and load balancers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use mockable::Clock;
use serde_json::json;

/// Shared health state. The process reports healthy once the server has
/// finished wiring and keeps doing so until shutdown begins.
pub struct HealthState {
    ready: AtomicBool,
    clock: Arc<dyn Clock>,
}

impl HealthState {
    /// Create a new health state starting as not ready.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            clock,
        }
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as draining so probes fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.ready.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

/// Return `200 {"status":"OK","timestamp":...}` while ready and `503`
/// otherwise.
#[get("/health")]
pub async fn health(state: web::Data<HealthState>) -> HttpResponse {
    let mut response = if state.is_ready() {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    let status = if state.is_ready() { "OK" } else { "UNAVAILABLE" };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(json!({ "status": status, "timestamp": state.clock.utc() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::clock::MutableClock;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(true, StatusCode::OK, "OK")]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")]
    #[actix_web::test]
    async fn reports_readiness(
        #[case] ready: bool,
        #[case] expected: StatusCode,
        #[case] status: &str,
    ) {
        let state = web::Data::new(HealthState::new(Arc::new(MutableClock::fixed())));
        if ready {
            state.mark_ready();
        }
        let app = test::init_service(App::new().app_data(state).service(health)).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request())
            .await;
        assert_eq!(res.status(), expected);
        assert_eq!(
            res.headers()
                .get(header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("no-store")
        );
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], status);
        assert_eq!(body["timestamp"], "2025-01-01T00:00:00Z");
    }
}
