use crate::db::{DbConnection, DbPool};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::consumption::{Consumption, NewConsumption, UpdateConsumption};
use crate::domain::document::{Document, NewDocument};
use crate::domain::folder::{Folder, FolderTemplate};
use crate::domain::training::{NewTraining, Training, UpdateTraining};
use crate::domain::types::{
    ClientId, ConsumptionId, DocumentId, DocumentType, FolderId, IdentityId, Stage, TrainingId,
    UserId,
};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::repository::errors::RepositoryResult;

pub mod client;
pub mod consumption;
pub mod document;
pub mod errors;
pub mod folder;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod training;
pub mod user;

/// Diesel-backed implementation of every reader/writer trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) as i64 * self.per_page as i64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientListQuery {
    pub search: Option<String>,
    pub stage: Option<Stage>,
    pub pagination: Option<Pagination>,
}

impl ClientListQuery {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentListQuery {
    pub client_id: Option<ClientId>,
    pub folder_id: Option<FolderId>,
    pub document_type: Option<DocumentType>,
}

impl DocumentListQuery {
    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn folder(mut self, folder_id: FolderId) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = Some(document_type);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumptionListQuery {
    pub client_id: Option<ClientId>,
    /// Empty means every year.
    pub years: Vec<i32>,
}

impl ConsumptionListQuery {
    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = years.into_iter().collect();
        self
    }
}

pub trait UserReader {
    fn get_user_by_identity(&self, clerk_user_id: &IdentityId) -> RepositoryResult<Option<User>>;
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
}

pub trait UserWriter {
    /// Inserts the user or refreshes the claim-derived columns of an existing one.
    fn register_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn update_user(&self, id: UserId, updates: &UpdateUser) -> RepositoryResult<User>;
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    fn count_clients(&self, stage: Option<Stage>) -> RepositoryResult<usize>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    /// Inserts the client with its folder tree and, when `link` is set, points that
    /// user at the new client. All or nothing; returns the folder count as well.
    fn create_client_with_folders(
        &self,
        new_client: &NewClient,
        template: &FolderTemplate,
        link: Option<(UserId, UpdateUser)>,
    ) -> RepositoryResult<(Client, usize)>;
    fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client>;
    /// Removes the client together with its folders, documents, trainings and consumption rows.
    fn delete_client(&self, id: ClientId) -> RepositoryResult<()>;
}

pub trait FolderReader {
    fn get_folder_by_id(&self, id: FolderId) -> RepositoryResult<Option<Folder>>;
    /// Folders of one client, or of every client when `client_id` is `None`.
    fn list_folders(&self, client_id: Option<ClientId>) -> RepositoryResult<Vec<Folder>>;
}

pub trait FolderWriter {
    /// Materializes `template` for the client in one transaction, returning the folder count.
    fn create_folder_tree(
        &self,
        client_id: ClientId,
        template: &FolderTemplate,
    ) -> RepositoryResult<usize>;
}

pub trait DocumentReader {
    fn get_document_by_id(&self, id: DocumentId) -> RepositoryResult<Option<Document>>;
    fn list_documents(&self, query: DocumentListQuery) -> RepositoryResult<Vec<Document>>;
    fn count_documents(&self, client_id: Option<ClientId>) -> RepositoryResult<usize>;
}

pub trait DocumentWriter {
    fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document>;
    fn delete_document(&self, id: DocumentId) -> RepositoryResult<()>;
}

pub trait TrainingReader {
    fn get_training_by_id(&self, id: TrainingId) -> RepositoryResult<Option<Training>>;
    fn list_trainings(&self, client_id: Option<ClientId>) -> RepositoryResult<Vec<Training>>;
    fn count_trainings(&self, client_id: Option<ClientId>) -> RepositoryResult<usize>;
}

pub trait TrainingWriter {
    fn create_training(&self, new_training: &NewTraining) -> RepositoryResult<Training>;
    fn update_training(
        &self,
        id: TrainingId,
        updates: &UpdateTraining,
    ) -> RepositoryResult<Training>;
}

pub trait ConsumptionReader {
    fn get_consumption_by_id(&self, id: ConsumptionId) -> RepositoryResult<Option<Consumption>>;
    fn list_consumptions(&self, query: ConsumptionListQuery)
    -> RepositoryResult<Vec<Consumption>>;
}

pub trait ConsumptionWriter {
    fn create_consumption(&self, record: &NewConsumption) -> RepositoryResult<Consumption>;
    /// Inserts all records or none of them.
    fn create_consumptions(&self, records: &[NewConsumption]) -> RepositoryResult<usize>;
    fn update_consumption(
        &self,
        id: ConsumptionId,
        updates: &UpdateConsumption,
    ) -> RepositoryResult<Consumption>;
    fn delete_consumption(&self, id: ConsumptionId) -> RepositoryResult<()>;
}
