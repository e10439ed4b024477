//! Repository implementation for portal users.

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::types::{IdentityId, UserId};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::models::user::{
    NewUser as DbNewUser, RefreshUser as DbRefreshUser, UpdateUser as DbUpdateUser,
    User as DbUser,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserReader, UserWriter};

impl UserReader for DieselRepository {
    fn get_user_by_identity(&self, clerk_user_id: &IdentityId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::clerk_user_id.eq(clerk_user_id.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        db_user
            .map(|db_user| User::try_from(db_user).map_err(RepositoryError::from))
            .transpose()
    }

    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .find(id.get())
            .first::<DbUser>(&mut conn)
            .optional()?;

        db_user
            .map(|db_user| User::try_from(db_user).map_err(RepositoryError::from))
            .transpose()
    }
}

impl UserWriter for DieselRepository {
    fn register_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let db_new_user: DbNewUser = new_user.into();
        let refresh = DbRefreshUser::from_domain(new_user, Utc::now().naive_utc());

        let db_user = diesel::insert_into(users::table)
            .values(&db_new_user)
            .on_conflict(users::clerk_user_id)
            .do_update()
            .set(&refresh)
            .get_result::<DbUser>(&mut conn)?;

        User::try_from(db_user).map_err(RepositoryError::from)
    }

    fn update_user(&self, id: UserId, updates: &UpdateUser) -> RepositoryResult<User> {
        let mut conn = self.conn()?;

        let db_user = apply_user_update(&mut conn, id, updates)?;

        User::try_from(db_user).map_err(RepositoryError::from)
    }
}

pub(super) fn apply_user_update(
    conn: &mut SqliteConnection,
    id: UserId,
    updates: &UpdateUser,
) -> QueryResult<DbUser> {
    use crate::schema::users;

    let changeset = DbUpdateUser::from_domain(updates, Utc::now().naive_utc());
    diesel::update(users::table.find(id.get()))
        .set(&changeset)
        .get_result::<DbUser>(conn)
}
