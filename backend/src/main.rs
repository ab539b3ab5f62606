//! Backend entry-point: loads configuration, prepares the database and
//! serves the listing endpoints.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use listings::inbound::http::health::HealthState;
use listings::inbound::http::session_config::{BuildMode, session_settings_from_env};
use listings::outbound::persistence::{DatabaseSettings, DbPool, run_pending_migrations};

use server::{ServerConfig, create_server, server_settings_from_env};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let settings = server_settings_from_env(&env).map_err(std::io::Error::other)?;
    let database = DatabaseSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    run_pending_migrations(database.database_url())
        .await
        .map_err(std::io::Error::other)?;
    let pool = DbPool::new(database.pool_config())
        .await
        .map_err(std::io::Error::other)?;
    match pool.ping().await {
        Ok(result) => info!(result, "database connectivity check passed"),
        Err(err) => error!(error = %err, "database connectivity check failed"),
    }

    info!(
        addr = %settings.bind_addr,
        upload_dir = %settings.upload_dir.display(),
        "starting server"
    );
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, ServerConfig::new(session, settings, pool))?;
    server.await
}
