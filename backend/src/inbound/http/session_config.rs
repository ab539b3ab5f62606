//! Cookie-session settings read from the environment.
//!
//! Release builds insist on explicit, valid values. Debug builds substitute
//! a default for anything missing or malformed and log a warning, so a
//! local run needs no session setup at all.
//!
//! | Variable                | Values                | Debug default   |
//! |-------------------------|-----------------------|-----------------|
//! | `SESSION_SECRET`        | >= 32 bytes (64 rel.) | random key      |
//! | `SESSION_COOKIE_SECURE` | `1`/`0`, `true`/...   | secure          |
//! | `SESSION_SAMESITE`      | `Strict`/`Lax`/`None` | `Lax`           |
//! | `SESSION_TTL_SECONDS`   | positive integer      | 3600 (any mode) |

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

const SECRET_MIN_LEN: usize = 32;
const SECRET_RELEASE_MIN_LEN: usize = 64;
const DEFAULT_TTL_SECONDS: i64 = 3600;

const SECRET_ENV: &str = "SESSION_SECRET";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const TTL_ENV: &str = "SESSION_TTL_SECONDS";

/// Which validation regime applies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// `Debug` when compiled with debug assertions.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use listings::inbound::http::session_config::BuildMode;
    ///
    /// let expected = if cfg!(debug_assertions) {
    ///     BuildMode::Debug
    /// } else {
    ///     BuildMode::Release
    /// };
    /// assert_eq!(BuildMode::from_debug_assertions(), expected);
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    /// Debug builds swallow `error` and continue with `default`.
    fn tolerate<T>(self, error: SessionConfigError, default: T) -> Result<T, SessionConfigError> {
        match self {
            Self::Debug => {
                warn!(%error, "session setting defaulted");
                Ok(default)
            }
            Self::Release => Err(error),
        }
    }

    fn secret_min_len(self) -> usize {
        match self {
            Self::Debug => SECRET_MIN_LEN,
            Self::Release => SECRET_RELEASE_MIN_LEN,
        }
    }
}

/// Validated cookie-session settings.
pub struct SessionSettings {
    /// Signing and encryption key for the private session cookie.
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
    /// Lifetime counted from login.
    pub ttl: Duration,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("{name} is not set")]
    Missing { name: &'static str },
    #[error("{name}='{value}' is invalid; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{SECRET_ENV} must be at least {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
    #[error("{SAMESITE_ENV}=None requires {COOKIE_SECURE_ENV}=1")]
    InsecureSameSiteNone,
}

/// Read and validate the session settings.
///
/// # Errors
/// Any [`SessionConfigError`] in release builds. Debug builds only fail on a
/// secret that is present but too short.
///
/// # Examples
///
/// ```rust
/// use listings::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let secret = "s".repeat(64);
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "SESSION_SECRET" => Some(secret.clone()),
///     "SESSION_COOKIE_SECURE" => Some("1".to_owned()),
///     "SESSION_SAMESITE" => Some("Strict".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Release).unwrap();
/// assert!(settings.cookie_secure);
/// assert_eq!(settings.ttl.whole_seconds(), 3600);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = required(env, mode, COOKIE_SECURE_ENV, "1 or 0", true, parse_flag)?;
    let default_same_site = match mode {
        BuildMode::Debug => SameSite::Lax,
        BuildMode::Release => SameSite::Strict,
    };
    let same_site = required(
        env,
        mode,
        SAMESITE_ENV,
        "Strict, Lax or None",
        default_same_site,
        parse_same_site,
    )?;
    if same_site == SameSite::None && !cookie_secure {
        mode.tolerate(SessionConfigError::InsecureSameSiteNone, ())?;
    }

    Ok(SessionSettings {
        key: session_key(env, mode)?,
        cookie_secure,
        same_site,
        ttl: session_ttl(env, mode)?,
    })
}

/// Read a variable every release deployment must set.
fn required<E: Env, T>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    expected: &'static str,
    default: T,
    parse: fn(&str) -> Option<T>,
) -> Result<T, SessionConfigError> {
    let Some(value) = env.string(name) else {
        return mode.tolerate(SessionConfigError::Missing { name }, default);
    };
    match parse(&value) {
        Some(parsed) => Ok(parsed),
        None => mode.tolerate(
            SessionConfigError::Invalid {
                name,
                value,
                expected,
            },
            default,
        ),
    }
}

fn session_ttl<E: Env>(env: &E, mode: BuildMode) -> Result<Duration, SessionConfigError> {
    let default = Duration::seconds(DEFAULT_TTL_SECONDS);
    let Some(value) = env.string(TTL_ENV) else {
        return Ok(default);
    };
    match value.trim().parse::<i64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::seconds(seconds)),
        _ => mode.tolerate(
            SessionConfigError::Invalid {
                name: TTL_ENV,
                value,
                expected: "a positive number of seconds",
            },
            default,
        ),
    }
}

fn session_key<E: Env>(env: &E, mode: BuildMode) -> Result<Key, SessionConfigError> {
    let Some(secret) = env.string(SECRET_ENV).map(Zeroizing::new) else {
        // Sessions from a generated key do not survive a restart.
        return mode.tolerate(SessionConfigError::Missing { name: SECRET_ENV }, Key::generate());
    };
    let min_len = mode.secret_min_len();
    if secret.len() < min_len {
        return Err(SessionConfigError::SecretTooShort {
            length: secret.len(),
            min_len,
        });
    }
    Ok(Key::derive_from(secret.as_bytes()))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}
