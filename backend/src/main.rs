//! Backend entry-point: loads settings, prepares state and runs the server.

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultClock;
use ortho_config::OrthoConfig as _;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use propvest::inbound::http::health::HealthState;
use propvest::server::{
    AppSettings, ServerConfig, build_runtime_state, create_server, load_session_key,
};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;
    let key = load_session_key(settings.session_key_file.as_deref())?;
    let http_state = build_runtime_state(&settings).await?;

    let health_state = web::Data::new(HealthState::new(Arc::new(DefaultClock)));
    let config = ServerConfig::new(key, settings.cookie_secure(), bind_addr);
    let server = create_server(health_state, http_state, config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;

    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated")
}
