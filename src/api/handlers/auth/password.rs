//! Argon2id password hashing.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{rngs::OsRng, RngCore};

/// One-way password hashing with a configurable cost.
///
/// Hashes are PHC strings, so verification reads the parameters from the
/// stored hash and keeps working after the cost is raised.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
    // Verified against when the email is unknown so both failure paths cost the same.
    dummy_hash: String,
}

impl CredentialHasher {
    /// # Errors
    /// Returns an error if the parameters are rejected or the salt cannot be generated.
    pub fn new(params: Params) -> Result<Self> {
        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        let mut filler = [0u8; 16];
        OsRng.fill_bytes(&mut filler);
        hasher.dummy_hash = hasher.hash(&format!("{filler:02x?}"))?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// # Errors
    /// Returns an error if salt generation or hashing fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| anyhow!("failed to generate salt: {e}"))?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
        let phc = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("failed to hash password: {e}"))?
            .to_string();
        Ok(phc)
    }

    /// `false` on mismatch and on hashes that do not parse.
    #[must_use]
    pub fn verify(&self, password: &str, phc: &str) -> bool {
        PasswordHash::new(phc)
            .is_ok_and(|parsed| self.argon2().verify_password(password.as_bytes(), &parsed).is_ok())
    }

    /// Burn the same work as a real verification without a real hash.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> CredentialHasher {
    // Minimal cost keeps the test suite fast.
    let params = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap_or_default();
    CredentialHasher {
        params,
        dummy_hash: String::new(),
    }
}
