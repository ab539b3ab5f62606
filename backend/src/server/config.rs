//! HTTP server configuration object and helpers.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use listings::inbound::http::session_config::SessionSettings;
use listings::outbound::persistence::DbPool;
use listings::outbound::security::Argon2Costs;
use mockable::Env;

const PORT_ENV: &str = "PORT";
const UPLOAD_DIR_ENV: &str = "UPLOAD_DIR";
const ARGON2_MEMORY_ENV: &str = "ARGON2_MEMORY_KIB";
const ARGON2_ITERATIONS_ENV: &str = "ARGON2_ITERATIONS";
const ARGON2_PARALLELISM_ENV: &str = "ARGON2_PARALLELISM";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPLOAD_DIR: &str = "public/uploads";

/// Errors raised while reading process-level settings.
#[derive(Debug, thiserror::Error)]
pub enum ServerConfigError {
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Process-level settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub argon2: Argon2Costs,
}

fn parse_env<E: Env, T: std::str::FromStr>(
    env: &E,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ServerConfigError> {
    match env.string(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ServerConfigError::InvalidEnv {
                name,
                value,
                expected,
            }),
    }
}

/// Read `PORT`, `UPLOAD_DIR` and the Argon2 cost overrides.
pub fn server_settings_from_env<E: Env>(env: &E) -> Result<ServerSettings, ServerConfigError> {
    let port = parse_env(env, PORT_ENV, "a TCP port", DEFAULT_PORT)?;
    let upload_dir = env
        .string(UPLOAD_DIR_ENV)
        .filter(|dir| !dir.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR), PathBuf::from);
    let defaults = Argon2Costs::default();
    let argon2 = Argon2Costs {
        memory_kib: parse_env(env, ARGON2_MEMORY_ENV, "KiB as an integer", defaults.memory_kib)?,
        iterations: parse_env(env, ARGON2_ITERATIONS_ENV, "an integer", defaults.iterations)?,
        parallelism: parse_env(env, ARGON2_PARALLELISM_ENV, "an integer", defaults.parallelism)?,
    };

    Ok(ServerSettings {
        bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
        upload_dir,
        argon2,
    })
}

/// Everything needed to build and bind the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) upload_dir: PathBuf,
    pub(crate) argon2: Argon2Costs,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, settings: ServerSettings, db_pool: DbPool) -> Self {
        let ServerSettings {
            bind_addr,
            upload_dir,
            argon2,
        } = settings;
        Self {
            session,
            bind_addr,
            db_pool,
            upload_dir,
            argon2,
        }
    }
}
