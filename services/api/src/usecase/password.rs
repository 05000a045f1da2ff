use anyhow::anyhow;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::ApiServiceError;

/// Salted argon2id password hashing with startup-configured cost.
///
/// Hashing runs on the blocking pool; a single hash takes tens of milliseconds
/// at default cost.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher {
    /// Build with explicit cost; `None` keeps the argon2 default for that knob.
    pub fn new(
        memory_kib: Option<u32>,
        iterations: Option<u32>,
        parallelism: Option<u32>,
    ) -> Result<Self, argon2::Error> {
        let params = Params::new(
            memory_kib.unwrap_or(Params::DEFAULT_M_COST),
            iterations.unwrap_or(Params::DEFAULT_T_COST),
            parallelism.unwrap_or(Params::DEFAULT_P_COST),
            None,
        )?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `plaintext` with a fresh OS-random salt into a PHC string.
    pub async fn hash(&self, plaintext: &str) -> Result<String, ApiServiceError> {
        let argon2 = self.argon2();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| anyhow!("hash password: {e}"))
        })
        .await
        .map_err(|e| anyhow!("hash task: {e}"))?
        .map_err(ApiServiceError::Internal)
    }

    /// Constant-time check of `plaintext` against a stored PHC digest.
    ///
    /// The digest carries its own parameters, so hashes made under an older
    /// cost setting still verify. An unparseable digest is an error, never a match.
    pub async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, ApiServiceError> {
        let argon2 = self.argon2();
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();
        tokio::task::spawn_blocking(move || -> anyhow::Result<bool> {
            let parsed = PasswordHash::new(&digest).map_err(|e| anyhow!("parse hash: {e}"))?;
            Ok(argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|e| anyhow!("verify task: {e}"))?
        .map_err(ApiServiceError::Internal)
    }
}
