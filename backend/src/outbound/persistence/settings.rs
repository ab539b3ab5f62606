//! Database settings loaded via OrthoConfig.
//!
//! Values come from `DB_*` environment variables (or matching CLI flags) and
//! are turned into a libpq-style keyword/value connection string, which both
//! `diesel-async` and the blocking migration connection accept. Quoting there
//! avoids URL-encoding passwords.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use super::pool::PoolConfig;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USER: &str = "postgres";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connection parameters for the listings database.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DB")]
pub struct DatabaseSettings {
    /// Server host name.
    #[ortho_config(default = DEFAULT_HOST.into())]
    pub host: String,
    /// Server port.
    #[ortho_config(default = DEFAULT_PORT)]
    pub port: u16,
    /// Role to connect as.
    #[ortho_config(default = DEFAULT_USER.into())]
    pub user: String,
    /// Role password; omitted from the connection string when unset.
    pub password: Option<String>,
    /// Database name; the server default applies when unset.
    pub name: Option<String>,
    /// Pool size; must be at least one.
    #[ortho_config(default = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
    /// Upper bound on waiting for a pooled connection. Unbounded when unset.
    pub acquire_timeout_secs: Option<u64>,
}

impl DatabaseSettings {
    /// Keyword/value connection string, e.g.
    /// `host='localhost' port=5432 user='postgres' dbname='listings'`.
    pub fn database_url(&self) -> String {
        let mut parts = vec![
            format!("host={}", quote(&self.host)),
            format!("port={}", self.port),
            format!("user={}", quote(&self.user)),
        ];
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            parts.push(format!("password={}", quote(password)));
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            parts.push(format!("dbname={}", quote(name)));
        }
        parts.join(" ")
    }

    /// Pool configuration derived from these settings.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.database_url())
            .with_max_size(self.max_connections)
            .with_acquire_timeout(self.acquire_timeout_secs.map(Duration::from_secs))
    }
}

/// Single-quote a conninfo value, escaping `\` and `'`.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

#[cfg(test)]
mod tests {
    //! Unit tests for database settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "DB_HOST",
        "DB_PORT",
        "DB_USER",
        "DB_PASSWORD",
        "DB_NAME",
        "DB_MAX_CONNECTIONS",
        "DB_ACQUIRE_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> DatabaseSettings {
        DatabaseSettings::load_from_iter([OsString::from("listings")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url(),
            "host='localhost' port=5432 user='postgres'"
        );
        let pool = settings.pool_config();
        assert_eq!(pool.max_size(), 10);
        assert_eq!(pool.acquire_timeout(), None);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("DB_HOST", Some("db.internal".to_owned())),
            ("DB_PORT", Some("6543".to_owned())),
            ("DB_USER", Some("listings".to_owned())),
            ("DB_PASSWORD", Some("s3cret".to_owned())),
            ("DB_NAME", Some("listings".to_owned())),
            ("DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("DB_ACQUIRE_TIMEOUT_SECS", Some("15".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url(),
            "host='db.internal' port=6543 user='listings' password='s3cret' dbname='listings'"
        );
        let pool = settings.pool_config();
        assert_eq!(pool.max_size(), 4);
        assert_eq!(pool.acquire_timeout(), Some(Duration::from_secs(15)));
    }

    #[rstest]
    #[case("plain", "'plain'")]
    #[case("it's", r"'it\'s'")]
    #[case(r"back\slash", r"'back\\slash'")]
    #[case("with space", "'with space'")]
    fn conninfo_values_are_quoted(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(quote(raw), expected);
    }
}
