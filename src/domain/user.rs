use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::{ClientId, IdentityId, SetupStatus, TypeConstraintError, UserId, UserRole};

/// Local record of a person authenticated by the identity provider.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub clerk_user_id: IdentityId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Hotel the user belongs to; always `None` for admins who see every client.
    pub client_id: Option<ClientId>,
    pub setup_status: SetupStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Registration data derived from verified identity claims.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub clerk_user_id: IdentityId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl TryFrom<&AuthenticatedUser> for NewUser {
    type Error = TypeConstraintError;

    fn try_from(user: &AuthenticatedUser) -> Result<Self, Self::Error> {
        Ok(Self {
            clerk_user_id: IdentityId::new(user.sub.as_str())?,
            email: user.email.trim().to_lowercase(),
            name: user.name.trim().to_string(),
            role: user.role,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub client_id: Option<ClientId>,
    pub setup_status: Option<SetupStatus>,
}
