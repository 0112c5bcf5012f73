use crate::{
    config::Config,
    error::{AppError, Result},
    models::user::User,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Name of the HTTP-only session cookie.
pub const SESSION_COOKIE: &str = "jwt";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub iat: i64,    // issued at
    pub exp: i64,    // expiry
}

/// Session issuer. Turns a verified identity into a signed, expiring token
/// delivered as an HTTP-only cookie, and verifies tokens on the way back in.
#[derive(Clone)]
pub struct AuthService {
    config: Config,
}

impl AuthService {
    pub async fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
        })
    }

    pub fn sign_token(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.config.session_ttl_days)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.config.jwt_secret.as_ref());
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                debug!("Session token verified for user: {}", token_data.claims.sub);
                Ok(token_data.claims)
            }
            Err(e) => {
                warn!("Session token verification failed: {}", e);
                Err(AppError::Authentication("Invalid token".to_string()))
            }
        }
    }

    /// Set-Cookie value carrying a fresh session token.
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
            SESSION_COOKIE,
            token,
            Duration::days(self.config.session_ttl_days).num_seconds()
        )
    }

    /// Set-Cookie value that clears the session on logout.
    pub fn clear_session_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
            SESSION_COOKIE
        )
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Extractor for the authenticated user placed into request extensions by
/// the auth middleware. Rejects with 401 when no valid session is present.
pub struct CurrentUser(pub User);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Authentication("Unauthorized: no valid session".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> AuthService {
        AuthService::new(&Config::default()).await.unwrap()
    }

    #[tokio::test]
    async fn token_round_trip_preserves_subject() {
        let auth = service().await;
        let token = auth.sign_token("user-123").unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let auth = service().await;
        let mut token = auth.sign_token("user-123").unwrap();
        token.push('x');
        assert!(auth.verify_token(&token).is_err());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let auth = service().await;
        let now = Utc::now();
        let claims = Claims {
            sub: "user-123".to_string(),
            iat: (now - Duration::days(2)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(Config::default().jwt_secret.as_ref()),
        )
        .unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let auth = service().await;
        let mut other = Config::default();
        other.jwt_secret = "a-different-secret".to_string();
        let foreign = AuthService::new(&other).await.unwrap();
        let token = foreign.sign_token("user-123").unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[tokio::test]
    async fn session_cookie_is_http_only() {
        let auth = service().await;
        let cookie = auth.session_cookie("token-value");
        assert!(cookie.starts_with("jwt=token-value;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));

        let cleared = auth.clear_session_cookie();
        assert!(cleared.starts_with("jwt=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let auth = service().await;
        let hash = auth.hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(auth.verify_password("secret1", &hash).unwrap());
        assert!(!auth.verify_password("secret2", &hash).unwrap());
    }
}
