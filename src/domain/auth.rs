//! Identity claims carried by the bearer token.

use serde::{Deserialize, Serialize};

use crate::domain::types::UserRole;

/// Metadata block the identity provider attaches to a session token.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PublicMetadata {
    /// Raw role string; anything other than a known role falls back to client.
    #[serde(default)]
    pub role: Option<String>,
}

/// Claims as they appear in the token payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IdentityClaims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub public_metadata: PublicMetadata,
}

/// Resolves the portal role from identity metadata, defaulting to client.
pub fn resolve_role(raw: Option<&str>) -> UserRole {
    raw.and_then(|role| role.parse().ok()).unwrap_or_default()
}

/// Caller identity after token verification.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub exp: usize,
}

impl From<IdentityClaims> for AuthenticatedUser {
    fn from(claims: IdentityClaims) -> Self {
        let role = resolve_role(claims.public_metadata.role.as_deref());
        let email = claims.email.unwrap_or_default();
        let name = claims
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email.clone());
        Self {
            sub: claims.sub,
            email,
            name,
            role,
            exp: claims.exp,
        }
    }
}
