use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;
use crate::models::ViewerIdentity;

/// Errors that can occur while authenticating a request
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

/// Resolves a bearer token into the caller's identity
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<ViewerIdentity, AuthError>;
}

/// Claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

/// HS256 JWT validation against a shared secret
pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, token: &str) -> Result<ViewerIdentity, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(ViewerIdentity {
            user_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

/// Pull the token out of an `Authorization: Bearer ...` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, sub: &str, email: Option<&str>, exp_offset: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: email.map(String::from),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let auth = JwtAuthenticator::new("secret", None);
        let identity = auth
            .authenticate(&token("secret", "u1", Some("asha@example.com"), 3600))
            .unwrap();

        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let auth = JwtAuthenticator::new("secret", None);
        assert!(auth.authenticate(&token("other", "u1", None, 3600)).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = JwtAuthenticator::new("secret", None);
        assert!(auth.authenticate(&token("secret", "u1", None, -3600)).is_err());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(bearer_token(Some("Basic abc")).is_err());
        assert!(bearer_token(Some("Bearer   ")).is_err());
        assert!(bearer_token(None).is_err());
    }
}
