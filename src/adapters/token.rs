//! Bearer tokens as HS256 JWTs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::MemberId,
    ports::token::{Error, TokenPort},
};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Member id
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
}

#[derive(Clone)]
pub struct JwtTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl JwtTokens {
    pub fn new(secret: &SecretString, expiry: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            expiry,
        }
    }
}

impl std::fmt::Debug for JwtTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokens")
            .field("keys", &"[REDACTED]")
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl TokenPort for JwtTokens {
    fn issue(&self, member_id: MemberId) -> Result<String, Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: member_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| Error::Adapter(Box::new(err)))
    }

    fn verify(&self, token: &str) -> Result<MemberId, Error> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|err| Error::Invalid(err.to_string()))?
            .claims;
        claims
            .sub
            .parse()
            .map_err(|_| Error::Invalid(format!("subject is not a member id: {}", claims.sub)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use speculoos::prelude::*;

    #[fixture]
    fn tokens() -> JwtTokens {
        JwtTokens::new(
            &SecretString::from("a-long-and-random-test-signing-key".to_string()),
            Duration::hours(1),
        )
    }

    #[rstest]
    fn test_issue_verify(tokens: JwtTokens) {
        let token = tokens.issue(3).unwrap();
        assert_that!(tokens.verify(&token)).is_ok().is_equal_to(3);
    }

    #[rstest]
    fn test_other_key(tokens: JwtTokens) {
        let other = JwtTokens::new(
            &SecretString::from("another-long-and-random-signing-key".to_string()),
            Duration::hours(1),
        );
        let token = other.issue(3).unwrap();
        assert_that!(tokens.verify(&token))
            .is_err()
            .matches(|err| matches!(err, Error::Invalid(_)));
    }

    #[test]
    fn test_expired() {
        let tokens = JwtTokens::new(
            &SecretString::from("a-long-and-random-test-signing-key".to_string()),
            Duration::minutes(-10),
        );
        let token = tokens.issue(3).unwrap();
        assert_that!(tokens.verify(&token)).is_err();
    }

    #[rstest]
    fn test_garbage(tokens: JwtTokens) {
        assert_that!(tokens.verify("not.a.token")).is_err();
    }
}
