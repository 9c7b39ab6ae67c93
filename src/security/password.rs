use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Config {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
    pub output_length: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost_kib: 19456,
            time_cost: 2,
            parallelism: 1,
            output_length: 32,
        }
    }
}

impl Argon2Config {
    /// Cheapest parameters argon2 accepts; only for tests and local tooling.
    pub fn minimal() -> Self {
        Self {
            memory_cost_kib: 8,
            time_cost: 1,
            parallelism: 1,
            output_length: 32,
        }
    }
}

/// Argon2id hasher producing PHC strings (`$argon2id$v=19$m=...`).
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("m_cost", &self.argon2.params().m_cost())
            .field("t_cost", &self.argon2.params().t_cost())
            .finish()
    }
}

impl CredentialHasher {
    pub fn new(config: &Argon2Config) -> Result<Self> {
        let params = Params::new(
            config.memory_cost_kib,
            config.time_cost,
            config.parallelism,
            Some(config.output_length),
        )
        .map_err(|e| anyhow!("Invalid Argon2 parameters: {e}"))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Ok(Self { argon2 })
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {e}"))?;

        Ok(hash.to_string())
    }

    /// `Ok(false)` means a well-formed hash that does not match.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow!("Invalid password hash format: {e}"))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("Password verification failed: {e}")),
        }
    }

    pub fn needs_rehash(&self, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow!("Invalid password hash format: {e}"))?;

        if parsed_hash.algorithm != argon2::ARGON2ID_IDENT {
            return Ok(true);
        }

        if let Some(m_param) = parsed_hash.params.get_str("m") {
            if let Ok(memory) = m_param.parse::<u32>() {
                if memory < self.argon2.params().m_cost() {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(&Argon2Config::minimal()).expect("Failed to create hasher")
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("admin123").expect("Failed to hash");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("admin123", &hash).expect("Verify failed"));
        assert!(!hasher.verify("admin124", &hash).expect("Verify failed"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("admin123").expect("Failed to hash");
        let second = hasher.hash("admin123").expect("Failed to hash");

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let hasher = hasher();
        assert!(hasher.verify("admin123", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_needs_rehash() {
        let weak = hasher();
        let strong = CredentialHasher::new(&Argon2Config::default()).expect("Failed to create hasher");
        let hash = weak.hash("admin123").expect("Failed to hash");

        assert!(!weak.needs_rehash(&hash).expect("Rehash check failed"));
        assert!(strong.needs_rehash(&hash).expect("Rehash check failed"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let config = Argon2Config {
            memory_cost_kib: 1,
            time_cost: 1,
            parallelism: 1,
            output_length: 32,
        };
        assert!(CredentialHasher::new(&config).is_err());
    }
}
