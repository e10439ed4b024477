//! Repository implementation for client hotels.

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::folder::FolderTemplate;
use crate::domain::types::{ClientId, Stage, UserId};
use crate::domain::user::UpdateUser;
use crate::models::client::{
    Client as DbClient, ClientService as DbClientService, NewClient as DbNewClient,
    UpdateClient as DbUpdateClient, service_rows,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::folder::insert_folder_tree;
use crate::repository::user::apply_user_update;
use crate::repository::{ClientListQuery, ClientReader, ClientWriter, DieselRepository};

/// Loads the completed services of `rows` and converts them into domain clients.
fn hydrate(conn: &mut SqliteConnection, rows: Vec<DbClient>) -> RepositoryResult<Vec<Client>> {
    use crate::schema::client_services;

    let ids = rows.iter().map(|row| row.id).collect::<Vec<i32>>();
    let services = client_services::table
        .filter(client_services::client_id.eq_any(&ids))
        .load::<DbClientService>(conn)?;

    rows.into_iter()
        .map(|row| row.into_domain(&services).map_err(RepositoryError::from))
        .collect()
}

impl ClientReader for DieselRepository {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_client = clients::table
            .find(id.get())
            .first::<DbClient>(&mut conn)
            .optional()?;

        match db_client {
            Some(db_client) => Ok(hydrate(&mut conn, vec![db_client])?.pop()),
            None => Ok(None),
        }
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)> {
        use crate::schema::clients;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = clients::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(stage) = query.stage {
                items = items.filter(clients::current_stage.eq(stage.as_str()));
            }

            if let Some(term) = query.search.as_deref().map(str::trim)
                && !term.is_empty()
            {
                let pattern = format!("%{term}%");
                items = items.filter(
                    clients::name
                        .like(pattern.clone())
                        .or(clients::hotel_name.like(pattern.clone()))
                        .or(clients::contact_person.like(pattern.clone()))
                        .or(clients::email.like(pattern)),
                );
            }

            items
        };

        let total = query_builder()
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder().order((clients::created_at.desc(), clients::id.desc()));

        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.per_page as i64);
        }

        let rows = items.load::<DbClient>(&mut conn)?;
        let clients = hydrate(&mut conn, rows)?;

        Ok((total, clients))
    }

    fn count_clients(&self, stage: Option<Stage>) -> RepositoryResult<usize> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let mut query = clients::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(stage) = stage {
            query = query.filter(clients::current_stage.eq(stage.as_str()));
        }
        let total = query.count().get_result::<i64>(&mut conn)?;
        Ok(total as usize)
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;

        let db_new_client: DbNewClient = new_client.into();
        let db_client = diesel::insert_into(clients::table)
            .values(&db_new_client)
            .get_result::<DbClient>(&mut conn)?;

        db_client.into_domain(&[]).map_err(RepositoryError::from)
    }

    fn create_client_with_folders(
        &self,
        new_client: &NewClient,
        template: &FolderTemplate,
        link: Option<(UserId, UpdateUser)>,
    ) -> RepositoryResult<(Client, usize)> {
        use crate::schema::clients;

        let mut conn = self.conn()?;

        let db_new_client: DbNewClient = new_client.into();
        let (db_client, created) =
            conn.transaction::<(DbClient, usize), diesel::result::Error, _>(|conn| {
                let db_client = diesel::insert_into(clients::table)
                    .values(&db_new_client)
                    .get_result::<DbClient>(conn)?;
                let client_id = ClientId::new(db_client.id)
                    .map_err(|_| diesel::result::Error::RollbackTransaction)?;

                let created = insert_folder_tree(conn, client_id, template)?;

                if let Some((user_id, updates)) = &link {
                    let updates = UpdateUser {
                        client_id: Some(client_id),
                        ..updates.clone()
                    };
                    apply_user_update(conn, *user_id, &updates)?;
                }

                Ok((db_client, created))
            })?;

        let client = db_client.into_domain(&[]).map_err(RepositoryError::from)?;
        Ok((client, created))
    }

    fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client> {
        use crate::schema::{client_services, clients};

        let mut conn = self.conn()?;

        let changeset = DbUpdateClient::from_domain(updates, Utc::now().naive_utc());

        let db_client = conn.transaction::<DbClient, diesel::result::Error, _>(|conn| {
            // `updated_at` is always set so the changeset is never empty.
            let db_client = diesel::update(clients::table.find(id.get()))
                .set(&changeset)
                .get_result::<DbClient>(conn)?;

            if let Some(services) = &updates.services_completed {
                diesel::delete(
                    client_services::table.filter(client_services::client_id.eq(id.get())),
                )
                .execute(conn)?;

                if !services.is_empty() {
                    diesel::insert_into(client_services::table)
                        .values(service_rows(id, services))
                        .execute(conn)?;
                }
            }

            Ok(db_client)
        })?;

        hydrate(&mut conn, vec![db_client])?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    fn delete_client(&self, id: ClientId) -> RepositoryResult<()> {
        use crate::schema::{
            client_services, clients, consumptions, documents, folders, trainings, users,
        };

        let mut conn = self.conn()?;

        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            let client_id = id.get();

            diesel::update(users::table.filter(users::client_id.eq(client_id)))
                .set(users::client_id.eq(None::<i32>))
                .execute(conn)?;
            diesel::delete(documents::table.filter(documents::client_id.eq(client_id)))
                .execute(conn)?;
            // Leaves first so the parent foreign key never dangles.
            for level in [2, 1, 0] {
                diesel::delete(
                    folders::table
                        .filter(folders::client_id.eq(client_id))
                        .filter(folders::level.eq(level)),
                )
                .execute(conn)?;
            }
            diesel::delete(trainings::table.filter(trainings::client_id.eq(client_id)))
                .execute(conn)?;
            diesel::delete(consumptions::table.filter(consumptions::client_id.eq(client_id)))
                .execute(conn)?;
            diesel::delete(
                client_services::table.filter(client_services::client_id.eq(client_id)),
            )
            .execute(conn)?;

            let deleted = diesel::delete(clients::table.find(client_id)).execute(conn)?;
            if deleted == 0 {
                return Err(diesel::result::Error::NotFound);
            }
            Ok(())
        })
        .map_err(RepositoryError::from)
    }
}
