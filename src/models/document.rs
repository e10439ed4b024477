use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::document::{Document as DomainDocument, NewDocument as DomainNewDocument};
use crate::domain::types::{ClientId, DocumentId, DocumentName, FolderId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::documents)]
/// Diesel model for [`crate::domain::document::Document`].
pub struct Document {
    pub id: i32,
    pub client_id: i32,
    pub folder_id: Option<i32>,
    pub name: String,
    pub document_type: String,
    pub stage: String,
    pub storage_key: String,
    pub original_filename: String,
    pub file_size: i64,
    pub uploaded_by: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::documents)]
pub struct NewDocument<'a> {
    pub client_id: i32,
    pub folder_id: Option<i32>,
    pub name: &'a str,
    pub document_type: &'a str,
    pub stage: &'a str,
    pub storage_key: &'a str,
    pub original_filename: &'a str,
    pub file_size: i64,
    pub uploaded_by: &'a str,
}

impl TryFrom<Document> for DomainDocument {
    type Error = TypeConstraintError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DocumentId::new(document.id)?,
            client_id: ClientId::new(document.client_id)?,
            folder_id: document.folder_id.map(FolderId::new).transpose()?,
            name: DocumentName::new(document.name)?,
            document_type: document.document_type.parse()?,
            stage: document.stage.parse()?,
            storage_key: document.storage_key,
            original_filename: document.original_filename,
            file_size: document.file_size,
            uploaded_by: document.uploaded_by,
            created_at: document.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewDocument> for NewDocument<'a> {
    fn from(document: &'a DomainNewDocument) -> Self {
        Self {
            client_id: document.client_id.get(),
            folder_id: Some(document.folder_id.get()),
            name: document.name.as_str(),
            document_type: document.document_type.as_str(),
            stage: document.stage.as_str(),
            storage_key: document.storage_key.as_str(),
            original_filename: document.original_filename.as_str(),
            file_size: document.file_size,
            uploaded_by: document.uploaded_by.as_str(),
        }
    }
}
