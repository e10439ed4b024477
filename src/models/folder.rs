use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::folder::Folder as DomainFolder;
use crate::domain::types::{ClientId, FolderId, FolderName, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::folders)]
/// Diesel model for [`crate::domain::folder::Folder`].
pub struct Folder {
    pub id: i32,
    pub client_id: i32,
    pub name: String,
    pub level: i32,
    pub parent_folder_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::folders)]
pub struct NewFolder<'a> {
    pub client_id: i32,
    pub name: &'a str,
    pub level: i32,
    pub parent_folder_id: Option<i32>,
}

impl TryFrom<Folder> for DomainFolder {
    type Error = TypeConstraintError;

    fn try_from(folder: Folder) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FolderId::new(folder.id)?,
            client_id: ClientId::new(folder.client_id)?,
            name: FolderName::new(folder.name)?,
            level: folder.level.try_into()?,
            parent_folder_id: folder.parent_folder_id.map(FolderId::new).transpose()?,
            created_at: folder.created_at,
        })
    }
}
