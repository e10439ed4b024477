use diesel::prelude::*;

use crate::domain::folder::{Folder, FolderLevel, FolderTemplate};
use crate::domain::types::{ClientId, FolderId};
use crate::models::folder::{Folder as DbFolder, NewFolder as DbNewFolder};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, FolderReader, FolderWriter};

impl FolderReader for DieselRepository {
    fn get_folder_by_id(&self, id: FolderId) -> RepositoryResult<Option<Folder>> {
        use crate::schema::folders;

        let mut conn = self.conn()?;
        let db_folder = folders::table
            .find(id.get())
            .first::<DbFolder>(&mut conn)
            .optional()?;

        db_folder
            .map(|db_folder| Folder::try_from(db_folder).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_folders(&self, client_id: Option<ClientId>) -> RepositoryResult<Vec<Folder>> {
        use crate::schema::folders;

        let mut conn = self.conn()?;
        let mut query = folders::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(client_id) = client_id {
            query = query.filter(folders::client_id.eq(client_id.get()));
        }

        query
            .order((folders::client_id.asc(), folders::level.asc(), folders::id.asc()))
            .load::<DbFolder>(&mut conn)?
            .into_iter()
            .map(|db_folder| Folder::try_from(db_folder).map_err(RepositoryError::from))
            .collect()
    }
}

fn insert_folder(conn: &mut SqliteConnection, folder: DbNewFolder) -> QueryResult<i32> {
    use crate::schema::folders;

    diesel::insert_into(folders::table)
        .values(&folder)
        .returning(folders::id)
        .get_result::<i32>(conn)
}

/// Inserts the folders of `template` for `client_id`, returning how many were created.
pub(super) fn insert_folder_tree(
    conn: &mut SqliteConnection,
    client_id: ClientId,
    template: &FolderTemplate,
) -> QueryResult<usize> {
    let insert = |conn: &mut SqliteConnection, name: &str, level: FolderLevel, parent| {
        insert_folder(
            conn,
            DbNewFolder {
                client_id: client_id.get(),
                name,
                level: level.get(),
                parent_folder_id: parent,
            },
        )
    };

    let mut created = 0;
    let root_id = insert(conn, template.root.as_str(), FolderLevel::Root, None)?;
    created += 1;

    for (column, leaves) in &template.columns {
        let column_id = insert(
            conn,
            column.as_str(),
            FolderLevel::Category,
            Some(root_id),
        )?;
        created += 1;

        for leaf in leaves {
            insert(conn, leaf.as_str(), FolderLevel::Leaf, Some(column_id))?;
            created += 1;
        }
    }

    Ok(created)
}

impl FolderWriter for DieselRepository {
    fn create_folder_tree(
        &self,
        client_id: ClientId,
        template: &FolderTemplate,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            insert_folder_tree(conn, client_id, template)
        })
        .map_err(RepositoryError::from)
    }
}
