use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::UserError;

/// Session token payload: subject is the user id, expiry defaults to
/// thirty days after issuance.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// HS256 signing and verification keys. The secret is injected here rather
/// than read from ambient process state; collaborators holding the same
/// secret can verify tokens independently.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            &config.secret,
            Duration::from_secs((config.ttl_days as u64) * 24 * 60 * 60),
        )
    }

    /// Issues a signed session token asserting `user_id` as subject.
    pub fn sign_session(&self, user_id: Uuid) -> Result<String, UserError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "session token signed");
        Ok(token)
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, UserError> {
        let validation = Validation::default();
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THIRTY_DAYS_SECS: usize = 30 * 24 * 60 * 60;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            ttl_days: 30,
        })
    }

    #[test]
    fn sign_and_verify_session_token() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.sign_session(user_id).expect("sign session");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn token_has_three_dot_separated_parts() {
        let keys = make_keys("dev-secret");
        let token = keys.sign_session(Uuid::new_v4()).expect("sign session");
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn expiry_is_thirty_days_after_issuance() {
        let keys = make_keys("dev-secret");
        let before = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let token = keys.sign_session(Uuid::new_v4()).expect("sign session");
        let after = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.exp - claims.iat, THIRTY_DAYS_SECS);
        assert!(claims.iat >= before && claims.iat <= after);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let good = make_keys("the-real-secret");
        let bad = make_keys("an-impostor-secret");
        let token = good.sign_session(Uuid::new_v4()).expect("sign session");
        let err = bad.verify(&token).unwrap_err();
        assert!(matches!(err, UserError::Jwt(_)));
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let keys = make_keys("dev-secret");
        let token = keys.sign_session(Uuid::new_v4()).expect("sign session");
        let mut parts: Vec<&str> = token.split('.').collect();
        let other = keys.sign_session(Uuid::new_v4()).expect("sign session");
        let other_payload = other.split('.').nth(1).unwrap().to_owned();
        parts[1] = &other_payload;
        let forged = parts.join(".");
        assert!(keys.verify(&forged).is_err());
    }
}
