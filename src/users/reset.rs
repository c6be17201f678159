use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

const TOKEN_BYTES: usize = 20;
const RESET_TTL_MINUTES: i64 = 15;

/// A freshly generated password-reset token. `plaintext` goes to the user
/// exactly once (via the mail collaborator); only `hashed` and `expires_at`
/// are ever persisted, so a database read alone cannot produce a usable
/// reset link.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub plaintext: String,
    pub hashed: String,
    pub expires_at: OffsetDateTime,
}

impl ResetToken {
    /// Draws 20 random bytes from the OS, hex-encodes them as the plaintext
    /// token, and records the SHA-256 hex digest plus a 15-minute deadline.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let plaintext = hex::encode(bytes);
        Self {
            hashed: hash_token(&plaintext),
            expires_at: OffsetDateTime::now_utc() + Duration::minutes(RESET_TTL_MINUTES),
            plaintext,
        }
    }
}

/// SHA-256 hex digest of a token, as stored in `reset_password_token`.
/// Also used to hash candidate tokens on lookup.
pub fn hash_token(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_is_forty_lowercase_hex_chars() {
        let token = ResetToken::generate();
        assert_eq!(token.plaintext.len(), 40);
        assert!(token
            .plaintext
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn stored_form_is_sha256_of_plaintext() {
        let token = ResetToken::generate();
        assert_eq!(token.hashed.len(), 64);
        assert_eq!(token.hashed, hash_token(&token.plaintext));
        assert_ne!(token.hashed, token.plaintext);
    }

    #[test]
    fn expiry_is_fifteen_minutes_out() {
        let before = OffsetDateTime::now_utc();
        let token = ResetToken::generate();
        let after = OffsetDateTime::now_utc();
        assert!(token.expires_at >= before + Duration::minutes(15));
        assert!(token.expires_at <= after + Duration::minutes(15));
    }

    #[test]
    fn successive_tokens_differ() {
        let a = ResetToken::generate();
        let b = ResetToken::generate();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hashed, b.hashed);
    }

    #[test]
    fn digest_matches_known_vector() {
        // sha256("abc")
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
