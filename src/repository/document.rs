use diesel::prelude::*;

use crate::domain::document::{Document, NewDocument};
use crate::domain::types::{ClientId, DocumentId};
use crate::models::document::{Document as DbDocument, NewDocument as DbNewDocument};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, DocumentListQuery, DocumentReader, DocumentWriter};

impl DocumentReader for DieselRepository {
    fn get_document_by_id(&self, id: DocumentId) -> RepositoryResult<Option<Document>> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let db_document = documents::table
            .find(id.get())
            .first::<DbDocument>(&mut conn)
            .optional()?;

        db_document
            .map(|db_document| Document::try_from(db_document).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_documents(&self, query: DocumentListQuery) -> RepositoryResult<Vec<Document>> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let mut items = documents::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(client_id) = query.client_id {
            items = items.filter(documents::client_id.eq(client_id.get()));
        }
        if let Some(folder_id) = query.folder_id {
            items = items.filter(documents::folder_id.eq(folder_id.get()));
        }
        if let Some(document_type) = query.document_type {
            items = items.filter(documents::document_type.eq(document_type.as_str()));
        }

        items
            .order((documents::created_at.desc(), documents::id.desc()))
            .load::<DbDocument>(&mut conn)?
            .into_iter()
            .map(|db_document| Document::try_from(db_document).map_err(RepositoryError::from))
            .collect()
    }

    fn count_documents(&self, client_id: Option<ClientId>) -> RepositoryResult<usize> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let mut query = documents::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(client_id) = client_id {
            query = query.filter(documents::client_id.eq(client_id.get()));
        }
        let total = query.count().get_result::<i64>(&mut conn)?;
        Ok(total as usize)
    }
}

impl DocumentWriter for DieselRepository {
    fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document> {
        use crate::schema::documents;

        let mut conn = self.conn()?;

        let db_new_document: DbNewDocument = new_document.into();
        let db_document = diesel::insert_into(documents::table)
            .values(&db_new_document)
            .get_result::<DbDocument>(&mut conn)?;

        Document::try_from(db_document).map_err(RepositoryError::from)
    }

    fn delete_document(&self, id: DocumentId) -> RepositoryResult<()> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(documents::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
