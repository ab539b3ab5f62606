//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! parameters travel with each hash and older hashes keep verifying after the
//! costs change. Work runs on the blocking pool.

use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use password_hash::{PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

const SALT_LEN: usize = 16;

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Costs {
    /// Memory in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Costs {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Argon2id hasher with fixed costs.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Build a hasher, rejecting costs Argon2 cannot run with.
    pub fn new(costs: Argon2Costs) -> Result<Self, PasswordHasherError> {
        let params = Params::new(costs.memory_kib, costs.iterations, costs.parallelism, None)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

fn random_salt() -> Result<SaltString, PasswordHasherError> {
    let mut bytes = [0_u8; SALT_LEN];
    getrandom::getrandom(&mut bytes).map_err(|err| PasswordHasherError::hash(err.to_string()))?;
    SaltString::encode_b64(&bytes).map_err(|err| PasswordHasherError::hash(err.to_string()))
}

async fn run_blocking<T, F>(work: F) -> Result<T, PasswordHasherError>
where
    F: FnOnce() -> Result<T, PasswordHasherError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| PasswordHasherError::hash(err.to_string()))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let argon2 = self.argon2.clone();
        let password = Zeroizing::new(password.to_owned());
        run_blocking(move || {
            let salt = random_salt()?;
            let phc = argon2
                .hash_password(password.as_bytes(), &salt)
                .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
            Ok(PasswordHash::new(phc.to_string()))
        })
        .await
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let argon2 = self.argon2.clone();
        let password = Zeroizing::new(password.to_owned());
        let encoded = hash.as_str().to_owned();
        run_blocking(move || {
            let parsed = PhcHash::new(&encoded)
                .map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(err) => Err(PasswordHasherError::malformed_hash(err.to_string())),
            }
        })
        .await
    }
}
