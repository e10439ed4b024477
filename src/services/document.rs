//! Document upload, download and folder browsing.

use std::io::Read;

use crate::domain::document::{Document, NewDocument, is_allowed_extension};
use crate::domain::folder::Folder;
use crate::domain::navigation::{
    FolderSelection, FolderTree, documents_in_selection, orphaned_documents,
};
use crate::domain::types::{ClientId, DocumentId, DocumentType, FolderId};
use crate::dto::document::{BrowseQuery, DocumentsPageData};
use crate::forms::document::DocumentUpload;
use crate::repository::{
    ClientReader, DocumentListQuery, DocumentReader, DocumentWriter, FolderReader,
};
use crate::services::client::list_clients;
use crate::services::{ServiceError, ServiceResult, Session};
use crate::storage::{FileStorage, storage_key};

/// Client filter the caller is allowed to apply, or `None` when nothing is visible.
///
/// Admins may narrow down to any client or see everything; client users are
/// always pinned to their linked hotel.
fn visible_scope(session: &Session, requested: Option<ClientId>) -> ServiceResult<Option<Scope>> {
    if session.capabilities.can_view_all_clients {
        return Ok(Some(match requested {
            Some(client_id) => Scope::Client(client_id),
            None => Scope::All,
        }));
    }
    match (session.scope_client_id(), requested) {
        (None, _) => Ok(None),
        (Some(own), Some(requested)) if own != requested => Err(ServiceError::Forbidden),
        (Some(own), _) => Ok(Some(Scope::Client(own))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    Client(ClientId),
}

impl Scope {
    fn client_id(self) -> Option<ClientId> {
        match self {
            Scope::All => None,
            Scope::Client(client_id) => Some(client_id),
        }
    }
}

/// Documents visible to the caller, newest first.
pub fn list_documents<R>(
    repo: &R,
    session: &Session,
    client_id: Option<ClientId>,
) -> ServiceResult<Vec<Document>>
where
    R: DocumentReader + ?Sized,
{
    let Some(scope) = visible_scope(session, client_id)? else {
        return Ok(Vec::new());
    };
    let mut query = DocumentListQuery::default();
    if let Some(client_id) = scope.client_id() {
        query = query.client(client_id);
    }
    Ok(repo.list_documents(query)?)
}

/// Carbon footprint reports of one hotel.
pub fn list_carbon_reports<R>(
    repo: &R,
    session: &Session,
    client_id: ClientId,
) -> ServiceResult<Vec<Document>>
where
    R: DocumentReader + ?Sized,
{
    session.require_access(client_id)?;
    let query = DocumentListQuery::default()
        .client(client_id)
        .document_type(DocumentType::CarbonFootprintReport);
    Ok(repo.list_documents(query)?)
}

/// Folder tree rows of the hotels visible to the caller.
pub fn list_folders<R>(
    repo: &R,
    session: &Session,
    client_id: Option<ClientId>,
) -> ServiceResult<Vec<Folder>>
where
    R: FolderReader + ?Sized,
{
    match visible_scope(session, client_id)? {
        Some(scope) => Ok(repo.list_folders(scope.client_id())?),
        None => Ok(Vec::new()),
    }
}

/// Stores the bytes of an upload and records the document.
///
/// The file must go into a leaf folder of the same hotel. If the database
/// insert fails the stored blob is removed again.
pub fn upload_document<R, S>(
    repo: &R,
    storage: &S,
    session: &Session,
    upload: DocumentUpload,
    data: &mut dyn Read,
    max_upload_size: u64,
) -> ServiceResult<Document>
where
    R: ClientReader + FolderReader + DocumentWriter + ?Sized,
    S: FileStorage + ?Sized,
{
    if !session.capabilities.can_upload_for(upload.client_id) {
        return Err(ServiceError::Forbidden);
    }
    if repo.get_client_by_id(upload.client_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    let folder = repo
        .get_folder_by_id(upload.folder_id)?
        .ok_or_else(|| ServiceError::Form("Klasör bulunamadı".to_string()))?;
    if folder.client_id != upload.client_id {
        return Err(ServiceError::Form(
            "Klasör bu müşteriye ait değil".to_string(),
        ));
    }
    if !folder.is_leaf() {
        return Err(ServiceError::Form(
            "Belgeler yalnızca alt klasörlere yüklenebilir".to_string(),
        ));
    }

    if upload.file_size == 0 {
        return Err(ServiceError::Form("Dosya boş".to_string()));
    }
    if upload.file_size > max_upload_size {
        return Err(ServiceError::Form(format!(
            "Dosya çok büyük (en fazla {} MB)",
            max_upload_size / (1024 * 1024)
        )));
    }
    if !is_allowed_extension(&upload.original_filename) {
        return Err(ServiceError::Form(format!(
            "Desteklenmeyen dosya türü: {}",
            upload.original_filename
        )));
    }

    let key = storage_key(upload.client_id, &upload.original_filename);
    let written = storage.save(&key, data).map_err(|err| {
        log::error!("Failed to store upload {}: {err}", upload.original_filename);
        ServiceError::from(err)
    })?;

    let new_document = NewDocument {
        client_id: upload.client_id,
        folder_id: upload.folder_id,
        name: upload.name,
        document_type: upload.document_type,
        stage: upload.stage,
        storage_key: key,
        original_filename: upload.original_filename,
        file_size: i64::try_from(written).unwrap_or(i64::MAX),
        uploaded_by: session.user.clerk_user_id.as_str().to_string(),
    };

    repo.create_document(&new_document).map_err(|err| {
        log::error!("Failed to record document {}: {err}", new_document.storage_key);
        if let Err(cleanup) = storage.delete(&new_document.storage_key) {
            log::error!("Failed to remove orphaned blob {}: {cleanup}", new_document.storage_key);
        }
        ServiceError::from(err)
    })
}

/// Document metadata and stored bytes for download.
pub fn open_document<R, S>(
    repo: &R,
    storage: &S,
    session: &Session,
    document_id: DocumentId,
) -> ServiceResult<(Document, Vec<u8>)>
where
    R: DocumentReader + ?Sized,
    S: FileStorage + ?Sized,
{
    let document = repo
        .get_document_by_id(document_id)?
        .ok_or(ServiceError::NotFound)?;
    session.require_access(document.client_id)?;

    let bytes = storage.load(&document.storage_key).map_err(|err| {
        log::error!("Failed to read file of document {document_id}: {err}");
        ServiceError::from(err)
    })?;
    Ok((document, bytes))
}

/// Removes the row and the stored file. A missing file does not block deletion.
pub fn delete_document<R, S>(
    repo: &R,
    storage: &S,
    session: &Session,
    document_id: DocumentId,
) -> ServiceResult<()>
where
    R: DocumentReader + DocumentWriter + ?Sized,
    S: FileStorage + ?Sized,
{
    if !session.capabilities.can_delete_documents {
        return Err(ServiceError::Forbidden);
    }
    let document = repo
        .get_document_by_id(document_id)?
        .ok_or(ServiceError::NotFound)?;

    repo.delete_document(document_id).map_err(|err| {
        log::error!("Failed to delete document {document_id}: {err}");
        ServiceError::from(err)
    })?;
    if let Err(err) = storage.delete(&document.storage_key) {
        log::error!("Failed to remove file {}: {err}", document.storage_key);
    }
    Ok(())
}

/// Folder browser state for one hotel.
///
/// Without a `client_id` admins start on the first hotel of the list and
/// client users on their own. An unknown `folder_id` falls back to the root.
pub fn browse_documents<R>(
    repo: &R,
    session: &Session,
    query: BrowseQuery,
) -> ServiceResult<DocumentsPageData>
where
    R: ClientReader + FolderReader + DocumentReader + ?Sized,
{
    let clients = list_clients(repo, session)?;
    let requested = query
        .client_id
        .map(ClientId::new)
        .transpose()?
        .or_else(|| clients.first().map(|client| client.id));

    let client = match requested {
        Some(client_id) => {
            session.require_access(client_id)?;
            clients.iter().find(|client| client.id == client_id).cloned()
        }
        None => None,
    };

    let Some(client) = client else {
        return Ok(DocumentsPageData {
            clients,
            client: None,
            selection: FolderSelection::Root,
            breadcrumb: Vec::new(),
            categories: Vec::new(),
            leaves: Vec::new(),
            documents: Vec::new(),
            unfiled: Vec::new(),
        });
    };

    let tree = FolderTree::new(repo.list_folders(Some(client.id))?);
    let documents = repo.list_documents(DocumentListQuery::default().client(client.id))?;

    let selection = match query.folder_id.map(FolderId::new).transpose()? {
        Some(folder_id) => FolderSelection::Root
            .select(&tree, folder_id)
            .unwrap_or_else(|err| {
                log::warn!("Ignoring folder selection {folder_id}: {err:?}");
                FolderSelection::Root
            }),
        None => FolderSelection::Root,
    };

    let breadcrumb = selection
        .breadcrumb()
        .into_iter()
        .filter_map(|id| tree.get(id).cloned())
        .collect();
    let categories = tree.categories(client.id).into_iter().cloned().collect();
    let leaves = selection
        .category()
        .map(|category| tree.children(category).into_iter().cloned().collect())
        .unwrap_or_default();
    let filed = documents_in_selection(&selection, &documents)
        .into_iter()
        .cloned()
        .collect();
    let unfiled = if session.capabilities.can_delete_documents {
        orphaned_documents(&tree, &documents)
            .into_iter()
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    Ok(DocumentsPageData {
        clients,
        client: Some(client),
        selection,
        breadcrumb,
        categories,
        leaves,
        documents: filed,
        unfiled,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use chrono::DateTime;

    use super::*;
    use crate::domain::folder::FolderLevel;
    use crate::domain::types::{DocumentName, FolderName, Stage};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::auth::tests::{admin, client_user};
    use crate::services::client::tests::client;
    use crate::storage::{StorageError, StorageResult};

    #[derive(Default)]
    struct MemoryStorage {
        blobs: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl FileStorage for MemoryStorage {
        fn save(&self, key: &str, data: &mut dyn Read) -> StorageResult<u64> {
            let mut bytes = Vec::new();
            data.read_to_end(&mut bytes)?;
            let len = bytes.len() as u64;
            self.blobs.borrow_mut().insert(key.to_string(), bytes);
            Ok(len)
        }

        fn load(&self, key: &str) -> StorageResult<Vec<u8>> {
            self.blobs
                .borrow()
                .get(key)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(key.to_string()))
        }

        fn delete(&self, key: &str) -> StorageResult<()> {
            self.blobs.borrow_mut().remove(key);
            Ok(())
        }
    }

    fn folder(id: i32, client_id: i32, level: FolderLevel, parent: Option<i32>) -> Folder {
        Folder {
            id: FolderId::new(id).unwrap(),
            client_id: ClientId::new(client_id).unwrap(),
            name: FolderName::new(format!("A{id}")).unwrap(),
            level,
            parent_folder_id: parent.map(|p| FolderId::new(p).unwrap()),
            created_at: DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        }
    }

    fn document(id: i32, client_id: i32, folder_id: Option<i32>) -> Document {
        Document {
            id: DocumentId::new(id).unwrap(),
            client_id: ClientId::new(client_id).unwrap(),
            folder_id: folder_id.map(|f| FolderId::new(f).unwrap()),
            name: DocumentName::new(format!("Belge {id}")).unwrap(),
            document_type: DocumentType::Tr1Criteria,
            stage: Stage::Stage1,
            storage_key: format!("{client_id}/{id}.pdf"),
            original_filename: format!("{id}.pdf"),
            file_size: 3,
            uploaded_by: "user_1".to_string(),
            created_at: DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        }
    }

    fn upload(client_id: i32, folder_id: i32, filename: &str, size: u64) -> DocumentUpload {
        DocumentUpload::parse(
            client_id,
            Some(folder_id),
            "Kriterler",
            "tr1_criteria",
            "Stage1",
            Some(filename),
            size,
        )
        .unwrap()
    }

    fn upload_repo(folder_client: i32, level: FolderLevel) -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|id| Ok(Some(client(id.get()))));
        repo.expect_get_folder_by_id()
            .returning(move |id| Ok(Some(folder(id.get(), folder_client, level, Some(2)))));
        repo
    }

    #[test]
    fn upload_stores_blob_and_records_document() {
        let mut repo = upload_repo(1, FolderLevel::Leaf);
        repo.expect_create_document()
            .withf(|doc| doc.file_size == 3 && doc.storage_key.starts_with("1/"))
            .times(1)
            .returning(|_| Ok(document(9, 1, Some(7))));
        let storage = MemoryStorage::default();

        let created = upload_document(
            &repo,
            &storage,
            &client_user(Some(1)),
            upload(1, 7, "kriter.pdf", 3),
            &mut &b"pdf"[..],
            1024,
        )
        .unwrap();

        assert_eq!(created.id.get(), 9);
        assert_eq!(storage.blobs.borrow().len(), 1);
    }

    #[test]
    fn upload_for_other_hotel_is_forbidden() {
        let mut repo = MockRepository::new();
        repo.expect_create_document().times(0);

        let result = upload_document(
            &repo,
            &MemoryStorage::default(),
            &client_user(Some(1)),
            upload(2, 7, "kriter.pdf", 3),
            &mut &b"pdf"[..],
            1024,
        );

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn upload_rejects_category_folders_and_foreign_folders() {
        for repo in [
            upload_repo(1, FolderLevel::Category),
            upload_repo(2, FolderLevel::Leaf),
        ] {
            let result = upload_document(
                &repo,
                &MemoryStorage::default(),
                &admin(),
                upload(1, 7, "kriter.pdf", 3),
                &mut &b"pdf"[..],
                1024,
            );
            assert!(matches!(result, Err(ServiceError::Form(_))));
        }
    }

    #[test]
    fn upload_rejects_oversized_empty_and_unknown_files() {
        let cases = [
            upload(1, 7, "kriter.pdf", 2048),
            upload(1, 7, "kriter.pdf", 0),
            upload(1, 7, "setup.exe", 3),
        ];
        for case in cases {
            let repo = upload_repo(1, FolderLevel::Leaf);
            let result = upload_document(
                &repo,
                &MemoryStorage::default(),
                &admin(),
                case,
                &mut &b"pdf"[..],
                1024,
            );
            assert!(matches!(result, Err(ServiceError::Form(_))));
        }
    }

    #[test]
    fn failed_insert_removes_the_blob() {
        let mut repo = upload_repo(1, FolderLevel::Leaf);
        repo.expect_create_document()
            .returning(|_| Err(RepositoryError::DatabaseError("disk full".to_string())));
        let storage = MemoryStorage::default();

        let result = upload_document(
            &repo,
            &storage,
            &admin(),
            upload(1, 7, "kriter.pdf", 3),
            &mut &b"pdf"[..],
            1024,
        );

        assert!(result.is_err());
        assert!(storage.blobs.borrow().is_empty());
    }

    #[test]
    fn download_of_foreign_document_is_forbidden() {
        let mut repo = MockRepository::new();
        repo.expect_get_document_by_id()
            .returning(|id| Ok(Some(document(id.get(), 2, Some(7)))));

        let result = open_document(
            &repo,
            &MemoryStorage::default(),
            &client_user(Some(1)),
            DocumentId::new(4).unwrap(),
        );

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn only_admins_delete_documents() {
        let mut repo = MockRepository::new();
        repo.expect_delete_document().times(0);

        let result = delete_document(
            &repo,
            &MemoryStorage::default(),
            &client_user(Some(1)),
            DocumentId::new(4).unwrap(),
        );

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn unlinked_client_sees_no_documents() {
        let mut repo = MockRepository::new();
        repo.expect_list_documents().times(0);

        let documents = list_documents(&repo, &client_user(None), None).unwrap();

        assert!(documents.is_empty());
    }

    fn browse_repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_list_clients()
            .returning(|_| Ok((1, vec![client(1)])));
        repo.expect_get_client_by_id()
            .returning(|id| Ok(Some(client(id.get()))));
        repo.expect_list_folders().returning(|_| {
            Ok(vec![
                folder(1, 1, FolderLevel::Root, None),
                folder(2, 1, FolderLevel::Category, Some(1)),
                folder(10, 1, FolderLevel::Leaf, Some(2)),
                folder(3, 1, FolderLevel::Leaf, Some(2)),
            ])
        });
        repo.expect_list_documents().returning(|_| {
            Ok(vec![
                document(1, 1, Some(3)),
                document(2, 1, Some(10)),
                document(3, 1, Some(99)),
                document(4, 1, None),
            ])
        });
        repo
    }

    #[test]
    fn browsing_a_leaf_lists_only_its_documents() {
        let repo = browse_repo();
        let query = BrowseQuery {
            client_id: Some(1),
            folder_id: Some(3),
        };

        let page = browse_documents(&repo, &admin(), query).unwrap();

        let ids: Vec<i32> = page.documents.iter().map(|d| d.id.get()).collect();
        assert_eq!(ids, vec![1]);
        let leaves: Vec<&str> = page.leaves.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(leaves, vec!["A3", "A10"]);
        assert_eq!(page.breadcrumb.len(), 2);
    }

    #[test]
    fn unfiled_documents_are_listed_for_admins_only() {
        let page = browse_documents(&browse_repo(), &admin(), BrowseQuery::default()).unwrap();
        let unfiled: Vec<i32> = page.unfiled.iter().map(|d| d.id.get()).collect();
        assert_eq!(unfiled, vec![3, 4]);
        assert!(page.documents.is_empty());

        let page =
            browse_documents(&browse_repo(), &client_user(Some(1)), BrowseQuery::default())
                .unwrap();
        assert!(page.unfiled.is_empty());
    }
}
