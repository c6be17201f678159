use tracing::error;

use crate::UserError;

/// Fixed bcrypt work factor. Verification uses the factor embedded in the
/// stored hash, so changing this only affects newly written hashes.
pub const BCRYPT_COST: u32 = 10;

pub fn hash_password(plain: &str) -> Result<String, UserError> {
    bcrypt::hash(plain, BCRYPT_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        UserError::Hash(e)
    })
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, UserError> {
    bcrypt::verify(plain, hash).map_err(|e| {
        error!(error = %e, "bcrypt verify error");
        UserError::Hash(e)
    })
}

/// Runs `hash_password` on a blocking worker thread so the cost-10 bcrypt
/// work does not stall the async runtime.
pub async fn hash_blocking(plain: String) -> Result<String, UserError> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

pub async fn verify_blocking(plain: String, hash: String) -> Result<bool, UserError> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, UserError::Hash(_)));
    }

    #[test]
    fn hash_carries_cost_ten() {
        let hash = hash_password("some-password").expect("hashing should succeed");
        // Modular crypt format: $2b$<cost>$<salt+digest>
        assert_eq!(&hash[..7], "$2b$10$");
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("repeatable").unwrap();
        let b = hash_password("repeatable").unwrap();
        assert_ne!(a, b, "salts must differ");
    }

    #[tokio::test]
    async fn blocking_wrappers_agree_with_sync_cores() {
        let hash = hash_blocking("off-thread".into()).await.unwrap();
        assert!(verify_blocking("off-thread".into(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_blocking("on-thread".into(), hash).await.unwrap());
    }
}
