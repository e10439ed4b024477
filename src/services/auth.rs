//! Session resolution and profile use cases.

use serde::Serialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::capabilities::Capabilities;
use crate::domain::types::{ClientId, IdentityId};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::forms::auth::UpdateProfileForm;
use crate::repository::{ClientReader, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

/// Stored user of the current request together with the permissions derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user: User,
    pub capabilities: Capabilities,
}

impl Session {
    pub fn new(user: User) -> Self {
        let capabilities = Capabilities::for_user(&user);
        Self { user, capabilities }
    }

    /// Hotel the caller is confined to, if any.
    pub fn scope_client_id(&self) -> Option<ClientId> {
        self.capabilities.scope_client_id
    }

    pub fn require_client_management(&self) -> ServiceResult<()> {
        if self.capabilities.can_manage_clients {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    pub fn require_training_management(&self) -> ServiceResult<()> {
        if self.capabilities.can_manage_trainings {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    pub fn require_access(&self, client_id: ClientId) -> ServiceResult<()> {
        if self.capabilities.can_access_client(client_id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

/// Loads the stored user behind verified claims.
///
/// Users must call the register endpoint once before anything else.
pub fn load_session<R>(repo: &R, auth: &AuthenticatedUser) -> ServiceResult<Session>
where
    R: UserReader + ?Sized,
{
    let identity = IdentityId::new(auth.sub.as_str())?;
    match repo.get_user_by_identity(&identity)? {
        Some(user) => Ok(Session::new(user)),
        None => {
            log::warn!("No registered user for identity {}", auth.sub);
            Err(ServiceError::NotFound)
        }
    }
}

/// Inserts the caller or refreshes the claim-derived columns of the stored row.
///
/// The role always comes from the verified token.
pub fn register_user<R>(repo: &R, auth: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    let new_user = NewUser::try_from(auth)?;
    repo.register_user(&new_user).map_err(|err| {
        log::error!("Failed to register user {}: {err}", auth.sub);
        ServiceError::from(err)
    })
}

/// Updates name and email of the caller and optionally links a hotel.
///
/// Client users may only link the hotel they are already scoped to; admins
/// may link any existing hotel.
pub fn update_me<R>(repo: &R, session: &Session, form: UpdateProfileForm) -> ServiceResult<User>
where
    R: UserWriter + ClientReader + ?Sized,
{
    let updates = UpdateUser::try_from(form)?;

    if let Some(client_id) = updates.client_id {
        session.require_access(client_id)?;
        if repo.get_client_by_id(client_id)?.is_none() {
            return Err(ServiceError::NotFound);
        }
    }

    repo.update_user(session.user.id, &updates).map_err(|err| {
        log::error!("Failed to update user {}: {err}", session.user.id);
        ServiceError::from(err)
    })
}
