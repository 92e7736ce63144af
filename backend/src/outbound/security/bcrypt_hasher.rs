//! bcrypt-backed `PasswordHasher`.

use async_trait::async_trait;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Work factor used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Hashes passwords with bcrypt on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Hasher with the given work factor (4..=31).
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let cost = self.cost;
        let password = zeroize::Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || bcrypt::hash(password.as_bytes(), cost))
            .await
            .map_err(|err| PasswordHashError::new(err.to_string()))?
            .map_err(|err| PasswordHashError::new(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn hashes_verify_against_the_plain_text() {
        let hasher = BcryptPasswordHasher::new(4);

        let hash = hasher.hash("secret1").await.expect("hash");

        assert_ne!(hash, "secret1");
        assert!(bcrypt::verify("secret1", &hash).expect("verify"));
        assert!(!bcrypt::verify("secret2", &hash).expect("verify"));
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(32)]
    #[tokio::test]
    async fn out_of_range_cost_is_an_error(#[case] cost: u32) {
        let result = BcryptPasswordHasher::new(cost).hash("secret1").await;

        assert!(result.is_err());
    }
}
