use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shelf_kernel::settings::AuthSettings;
use time::OffsetDateTime;

use crate::error::AuthError;

/// Claims carried by access tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id (ObjectId hex)
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens.
pub struct JwtAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtAuthority {
    pub fn new(settings: &AuthSettings) -> anyhow::Result<Self> {
        if settings.jwt_secret.is_empty() {
            anyhow::bail!("JWT secret not configured");
        }

        let secret = settings.jwt_secret.as_bytes();
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs: i64::try_from(settings.token_ttl_secs).unwrap_or(i64::MAX),
        })
    }

    /// Sign a token for `subject` valid for the configured lifetime.
    pub fn issue(&self, subject: &str, email: &str) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority(secret: &str) -> JwtAuthority {
        JwtAuthority::new(&AuthSettings {
            jwt_secret: secret.to_string(),
            ..AuthSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn issued_tokens_verify() {
        let authority = authority("secret");
        let token = authority.issue("64b7f0c2a1b2c3d4e5f60718", "a@a.ru").unwrap();

        let claims = authority.verify(&token).unwrap();
        assert_eq!(claims.sub, "64b7f0c2a1b2c3d4e5f60718");
        assert_eq!(claims.email, "a@a.ru");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let token = authority("one").issue("user", "a@a.ru").unwrap();
        assert!(matches!(
            authority("two").verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let authority = authority("secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let token = authority
            .sign(&Claims {
                sub: "user".to_string(),
                email: "a@a.ru".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(authority.verify(&token).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let settings = AuthSettings {
            jwt_secret: String::new(),
            ..AuthSettings::default()
        };
        assert!(JwtAuthority::new(&settings).is_err());
    }
}
