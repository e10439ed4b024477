//! Bearer token verification and the request extractors built on it.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

use crate::domain::auth::{AuthenticatedUser, IdentityClaims};
use crate::models::config::IdentityConfig;
use crate::repository::DieselRepository;
use crate::services::auth::load_session;
use crate::services::{ServiceError, Session};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no token verification key configured")]
    MissingKey,

    #[error("invalid verification key: {0}")]
    InvalidKey(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Verifies identity provider tokens with a shared secret or an RSA public key.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let mut verifier = if let Some(pem) = &config.jwt_public_key_pem {
            let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                .map_err(|err| IdentityError::InvalidKey(err.to_string()))?;
            Self::new(key, Algorithm::RS256)
        } else if let Some(secret) = &config.jwt_secret {
            Self::hs256(secret.as_bytes())
        } else {
            return Err(IdentityError::MissingKey);
        };

        if let Some(issuer) = &config.issuer {
            verifier.validation.set_issuer(&[issuer]);
        }
        Ok(verifier)
    }

    pub fn hs256(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // Session tokens of the identity provider carry no audience.
        validation.validate_aud = false;
        Self { key, validation }
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, IdentityError> {
        decode::<IdentityClaims>(token, &self.key, &self.validation)
            .map(|data| AuthenticatedUser::from(data.claims))
            .map_err(|err| IdentityError::InvalidToken(err.to_string()))
    }
}

/// Token from `Authorization: Bearer` or, for the browser shell, the identity cookie.
fn request_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| req.get_identity().ok().and_then(|identity| identity.id().ok()))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ServiceError> {
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or_else(|| ServiceError::Internal("token verifier is not configured".to_string()))?;
    let token = request_token(req).ok_or(ServiceError::Unauthorized)?;

    verifier.verify(&token).map_err(|err| {
        log::warn!("Rejected token for {} {}: {err}", req.method(), req.path());
        ServiceError::Unauthorized
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(actix_web::Error::from))
    }
}

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = authenticate(req).and_then(|auth| {
            let repo = req
                .app_data::<web::Data<DieselRepository>>()
                .ok_or_else(|| ServiceError::Internal("repository is not configured".to_string()))?;
            load_session(repo.get_ref(), &auth)
        });
        ready(session.map_err(actix_web::Error::from))
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    use super::*;
    use crate::domain::types::UserRole;

    const SECRET: &[u8] = b"test-secret";

    fn token(exp: i64, role: Option<&str>) -> String {
        let claims = json!({
            "sub": "user_42",
            "exp": exp,
            "email": "guest@hotel.com",
            "name": "Guest",
            "public_metadata": {"role": role},
        });
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn far_future() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn valid_token_yields_user_with_role() {
        let verifier = TokenVerifier::hs256(SECRET);

        let user = verifier.verify(&token(far_future(), Some("admin"))).unwrap();

        assert_eq!(user.sub, "user_42");
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn missing_role_defaults_to_client() {
        let verifier = TokenVerifier::hs256(SECRET);

        let user = verifier.verify(&token(far_future(), None)).unwrap();

        assert_eq!(user.role, UserRole::Client);
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let verifier = TokenVerifier::hs256(SECRET);
        assert!(verifier.verify(&token(1, None)).is_err());

        let other = TokenVerifier::hs256(b"another-secret");
        assert!(other.verify(&token(far_future(), None)).is_err());
    }

    #[test]
    fn config_without_key_is_rejected() {
        let config = IdentityConfig {
            sign_in_url: "/sign-in".to_string(),
            jwt_secret: None,
            jwt_public_key_pem: None,
            issuer: None,
        };
        assert!(matches!(
            TokenVerifier::from_config(&config),
            Err(IdentityError::MissingKey)
        ));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let req = actix_web::test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc"))
            .to_http_request();
        assert_eq!(request_token(&req).as_deref(), Some("abc"));

        let req = actix_web::test::TestRequest::default().to_http_request();
        assert_eq!(request_token(&req), None);
    }
}
