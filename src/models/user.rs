use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{ClientId, IdentityId, TypeConstraintError, UserId};
use crate::domain::user::{
    NewUser as DomainNewUser, UpdateUser as DomainUpdateUser, User as DomainUser,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: i32,
    pub clerk_user_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub client_id: Option<i32>,
    pub setup_status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub clerk_user_id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'a str,
}

/// Claim-derived columns refreshed on every registration.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct RefreshUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UpdateUser<'a> {
    pub email: Option<&'a str>,
    pub name: Option<&'a str>,
    pub client_id: Option<i32>,
    pub setup_status: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(user.id)?,
            clerk_user_id: IdentityId::new(user.clerk_user_id)?,
            email: user.email,
            name: user.name,
            role: user.role.parse()?,
            client_id: user.client_id.map(ClientId::new).transpose()?,
            setup_status: user.setup_status.parse()?,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            clerk_user_id: user.clerk_user_id.as_str(),
            email: user.email.as_str(),
            name: user.name.as_str(),
            role: user.role.as_str(),
        }
    }
}

impl<'a> RefreshUser<'a> {
    pub fn from_domain(user: &'a DomainNewUser, updated_at: NaiveDateTime) -> Self {
        Self {
            email: user.email.as_str(),
            name: user.name.as_str(),
            role: user.role.as_str(),
            updated_at,
        }
    }
}

impl<'a> UpdateUser<'a> {
    pub fn from_domain(updates: &'a DomainUpdateUser, updated_at: NaiveDateTime) -> Self {
        Self {
            email: updates.email.as_deref(),
            name: updates.name.as_deref(),
            client_id: updates.client_id.map(ClientId::get),
            setup_status: updates.setup_status.map(|status| status.as_str()),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{SetupStatus, UserRole};
    use chrono::Utc;

    #[test]
    fn row_converts_into_domain_user() {
        let now = Utc::now().naive_utc();
        let row = User {
            id: 3,
            clerk_user_id: "user_abc".to_string(),
            email: "guest@hotel.com".to_string(),
            name: "Guest".to_string(),
            role: "client".to_string(),
            client_id: Some(9),
            setup_status: "skipped".to_string(),
            created_at: now,
            updated_at: now,
        };

        let user = DomainUser::try_from(row).unwrap();

        assert_eq!(user.role, UserRole::Client);
        assert_eq!(user.client_id.map(ClientId::get), Some(9));
        assert_eq!(user.setup_status, SetupStatus::Skipped);
    }
}
