use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Opaque user identifier; store ownership is keyed by it.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id.into(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Identity-context collaborator: yields the caller's user id, or nothing.
pub trait IdentityProvider: Send + Sync {
    fn identify(&self, headers: &HeaderMap) -> Option<String>;
}

/// HS256 bearer tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtIdentity {
    secret: String,
    expiry_hours: u64,
}

impl JwtIdentity {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    /// Sign a token for `user_id`
    pub fn issue(&self, user_id: &str) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let claims = Claims::new(user_id, self.expiry_hours);
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Validate JWT token and extract claims
    pub fn verify(&self, token: &str) -> Result<Claims, String> {
        if self.secret.is_empty() {
            return Err("JWT secret not configured".to_string());
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(|e| format!("Invalid JWT token: {}", e))?;

        Ok(token_data.claims)
    }
}

impl IdentityProvider for JwtIdentity {
    fn identify(&self, headers: &HeaderMap) -> Option<String> {
        let token = match extract_bearer_token(headers) {
            Ok(token) => token,
            Err(msg) => {
                tracing::debug!("No identity: {}", msg);
                return None;
            }
        };

        match self.verify(&token) {
            Ok(claims) if !claims.sub.is_empty() => Some(claims.sub),
            Ok(_) => None,
            Err(msg) => {
                tracing::debug!("No identity: {}", msg);
                None
            }
        }
    }
}

/// Extract JWT token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn issued_token_identifies_user() {
        let identity = JwtIdentity::new("test-secret", 1);
        let token = identity.issue("user_1").unwrap();
        let headers = headers_with(&format!("Bearer {token}"));
        assert_eq!(identity.identify(&headers).as_deref(), Some("user_1"));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = JwtIdentity::new("one", 1).issue("user_1").unwrap();
        let headers = headers_with(&format!("Bearer {token}"));
        assert!(JwtIdentity::new("two", 1).identify(&headers).is_none());
    }

    #[test]
    fn malformed_headers_yield_no_identity() {
        let identity = JwtIdentity::new("test-secret", 1);
        assert!(identity.identify(&HeaderMap::new()).is_none());
        assert!(identity.identify(&headers_with("Basic abc")).is_none());
        assert!(identity.identify(&headers_with("Bearer   ")).is_none());
        assert!(identity.identify(&headers_with("Bearer not.a.jwt")).is_none());
    }

    #[test]
    fn empty_secret_cannot_issue() {
        assert!(matches!(JwtIdentity::new("", 1).issue("u"), Err(JwtError::InvalidSecret)));
    }
}
