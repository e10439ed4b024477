//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::consumption::{Consumption, NewConsumption, UpdateConsumption};
use crate::domain::document::{Document, NewDocument};
use crate::domain::folder::{Folder, FolderTemplate};
use crate::domain::training::{NewTraining, Training, UpdateTraining};
use crate::domain::types::{
    ClientId, ConsumptionId, DocumentId, FolderId, IdentityId, Stage, TrainingId, UserId,
};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, ConsumptionListQuery, ConsumptionReader,
    ConsumptionWriter, DocumentListQuery, DocumentReader, DocumentWriter, FolderReader,
    FolderWriter, TrainingReader, TrainingWriter, UserReader, UserWriter,
};

mock! {
    pub Repository {}

    impl UserReader for Repository {
        fn get_user_by_identity(&self, clerk_user_id: &IdentityId) -> RepositoryResult<Option<User>>;
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    }

    impl UserWriter for Repository {
        fn register_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn update_user(&self, id: UserId, updates: &UpdateUser) -> RepositoryResult<User>;
    }

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
        fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
        fn count_clients(&self, stage: Option<Stage>) -> RepositoryResult<usize>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn create_client_with_folders(
            &self,
            new_client: &NewClient,
            template: &FolderTemplate,
            link: Option<(UserId, UpdateUser)>,
        ) -> RepositoryResult<(Client, usize)>;
        fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client>;
        fn delete_client(&self, id: ClientId) -> RepositoryResult<()>;
    }

    impl FolderReader for Repository {
        fn get_folder_by_id(&self, id: FolderId) -> RepositoryResult<Option<Folder>>;
        fn list_folders(&self, client_id: Option<ClientId>) -> RepositoryResult<Vec<Folder>>;
    }

    impl FolderWriter for Repository {
        fn create_folder_tree(
            &self,
            client_id: ClientId,
            template: &FolderTemplate,
        ) -> RepositoryResult<usize>;
    }

    impl DocumentReader for Repository {
        fn get_document_by_id(&self, id: DocumentId) -> RepositoryResult<Option<Document>>;
        fn list_documents(&self, query: DocumentListQuery) -> RepositoryResult<Vec<Document>>;
        fn count_documents(&self, client_id: Option<ClientId>) -> RepositoryResult<usize>;
    }

    impl DocumentWriter for Repository {
        fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document>;
        fn delete_document(&self, id: DocumentId) -> RepositoryResult<()>;
    }

    impl TrainingReader for Repository {
        fn get_training_by_id(&self, id: TrainingId) -> RepositoryResult<Option<Training>>;
        fn list_trainings(&self, client_id: Option<ClientId>) -> RepositoryResult<Vec<Training>>;
        fn count_trainings(&self, client_id: Option<ClientId>) -> RepositoryResult<usize>;
    }

    impl TrainingWriter for Repository {
        fn create_training(&self, new_training: &NewTraining) -> RepositoryResult<Training>;
        fn update_training(
            &self,
            id: TrainingId,
            updates: &UpdateTraining,
        ) -> RepositoryResult<Training>;
    }

    impl ConsumptionReader for Repository {
        fn get_consumption_by_id(&self, id: ConsumptionId) -> RepositoryResult<Option<Consumption>>;
        fn list_consumptions(
            &self,
            query: ConsumptionListQuery,
        ) -> RepositoryResult<Vec<Consumption>>;
    }

    impl ConsumptionWriter for Repository {
        fn create_consumption(&self, record: &NewConsumption) -> RepositoryResult<Consumption>;
        fn create_consumptions(&self, records: &[NewConsumption]) -> RepositoryResult<usize>;
        fn update_consumption(
            &self,
            id: ConsumptionId,
            updates: &UpdateConsumption,
        ) -> RepositoryResult<Consumption>;
        fn delete_consumption(&self, id: ConsumptionId) -> RepositoryResult<()>;
    }
}
