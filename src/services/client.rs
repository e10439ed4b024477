//! Client hotel use cases.

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::folder::FolderTemplate;
use crate::domain::setup::{SetupEvent, SetupState};
use crate::domain::types::ClientId;
use crate::domain::user::UpdateUser;
use crate::dto::client::{ClientsPageData, ClientsQuery};
use crate::forms::client::{AddClientForm, UpdateClientForm};
use crate::pagination::Paginated;
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, DocumentListQuery, DocumentReader, FolderReader,
    FolderWriter,
};
use crate::services::{DEFAULT_ITEMS_PER_PAGE, ServiceError, ServiceResult, Session};
use crate::storage::FileStorage;

/// Creates the standard folder tree for `client` unless it already has one.
///
/// Returns the number of folders created.
pub fn provision_folders<R>(repo: &R, client: &Client) -> ServiceResult<usize>
where
    R: FolderReader + FolderWriter + ?Sized,
{
    let existing = repo.list_folders(Some(client.id))?;
    if !existing.is_empty() {
        return Ok(0);
    }

    let template = FolderTemplate::standard(client.name.as_str())?;
    let created = repo
        .create_folder_tree(client.id, &template)
        .map_err(|err| {
            log::error!("Failed to create folders for client {}: {err}", client.id);
            ServiceError::from(err)
        })?;
    log::info!("Created {created} folders for client {}", client.id);
    Ok(created)
}

/// Creates a hotel record.
///
/// Admins may create any number of hotels. A client user gets their linked
/// hotel back if it exists; otherwise the new hotel is linked to them and
/// their setup is marked completed.
pub fn create_client<R>(repo: &R, session: &Session, form: AddClientForm) -> ServiceResult<Client>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    let self_service = !session.capabilities.can_manage_clients;

    if self_service
        && let Some(client_id) = session.user.client_id
        && let Some(existing) = repo.get_client_by_id(client_id)?
    {
        return Ok(existing);
    }

    let new_client = NewClient::try_from(form)?;
    let template = FolderTemplate::standard(new_client.name.as_str())?;
    let link = self_service.then(|| {
        (
            session.user.id,
            UpdateUser {
                setup_status: Some(SetupState::persisted_status(SetupEvent::Complete)),
                ..Default::default()
            },
        )
    });

    let (client, folders) = repo
        .create_client_with_folders(&new_client, &template, link)
        .map_err(|err| {
            log::error!("Failed to create client: {err}");
            ServiceError::from(err)
        })?;
    log::info!("Created client {} with {folders} folders", client.id);

    Ok(client)
}

/// Hotels visible to the caller: all of them for admins, the linked one otherwise.
pub fn list_clients<R>(repo: &R, session: &Session) -> ServiceResult<Vec<Client>>
where
    R: ClientReader + ?Sized,
{
    if session.capabilities.can_view_all_clients {
        let (_, clients) = repo.list_clients(ClientListQuery::default())?;
        return Ok(clients);
    }

    match session.scope_client_id() {
        Some(client_id) => Ok(repo.get_client_by_id(client_id)?.into_iter().collect()),
        None => Ok(Vec::new()),
    }
}

/// Paginated, searchable clients table of the admin shell.
pub fn load_clients_page<R>(
    repo: &R,
    session: &Session,
    query: ClientsQuery,
) -> ServiceResult<ClientsPageData>
where
    R: ClientReader + ?Sized,
{
    session.require_client_management()?;

    let page = query.page.unwrap_or(1).max(1);
    let search_query = query
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    let mut list_query = ClientListQuery::default().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &search_query {
        list_query = list_query.search(term.clone());
    }
    if let Some(stage) = query.stage {
        list_query = list_query.stage(stage);
    }

    let (total, clients) = repo.list_clients(list_query).map_err(|err| {
        log::error!("Failed to list clients: {err}");
        ServiceError::from(err)
    })?;

    Ok(ClientsPageData {
        clients: Paginated::from_total(clients, page, total, DEFAULT_ITEMS_PER_PAGE),
        search_query,
        stage: query.stage,
    })
}

pub fn get_client<R>(repo: &R, session: &Session, client_id: ClientId) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    session.require_access(client_id)?;
    repo.get_client_by_id(client_id)?
        .ok_or(ServiceError::NotFound)
}

/// Applies a partial update; absent fields keep their values.
pub fn update_client<R>(
    repo: &R,
    session: &Session,
    client_id: ClientId,
    form: UpdateClientForm,
) -> ServiceResult<Client>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    session.require_client_management()?;

    let updates = UpdateClient::try_from(form)?;
    if updates.is_empty() {
        return repo
            .get_client_by_id(client_id)?
            .ok_or(ServiceError::NotFound);
    }

    repo.update_client(client_id, &updates).map_err(|err| {
        log::error!("Failed to update client {client_id}: {err}");
        ServiceError::from(err)
    })
}

/// Deletes the hotel with all dependent rows and the stored document files.
pub fn delete_client<R, S>(
    repo: &R,
    storage: &S,
    session: &Session,
    client_id: ClientId,
) -> ServiceResult<()>
where
    R: ClientWriter + DocumentReader + ?Sized,
    S: FileStorage + ?Sized,
{
    session.require_client_management()?;

    let documents = repo.list_documents(DocumentListQuery::default().client(client_id))?;
    repo.delete_client(client_id).map_err(|err| {
        log::error!("Failed to delete client {client_id}: {err}");
        ServiceError::from(err)
    })?;

    for document in documents {
        if let Err(err) = storage.delete(&document.storage_key) {
            log::error!(
                "Failed to remove file {} of deleted client {client_id}: {err}",
                document.storage_key
            );
        }
    }
    Ok(())
}

/// Creates the default folders for a hotel that predates automatic provisioning.
pub fn ensure_folders<R>(repo: &R, session: &Session, client_id: ClientId) -> ServiceResult<usize>
where
    R: ClientReader + FolderReader + FolderWriter + ?Sized,
{
    session.require_client_management()?;
    let client = repo
        .get_client_by_id(client_id)?
        .ok_or(ServiceError::NotFound)?;
    provision_folders(repo, &client)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeSet;

    use chrono::DateTime;

    use super::*;
    use crate::domain::types::{
        ClientEmail, ClientName, ContactPerson, HotelName, PhoneNumber, SetupStatus, Stage,
    };
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::auth::tests::{admin, client_user};
    use crate::storage::{StorageError, StorageResult};

    pub(crate) fn client(id: i32) -> Client {
        let now = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        Client {
            id: ClientId::new(id).unwrap(),
            name: ClientName::new("Deniz Turizm").unwrap(),
            hotel_name: HotelName::new("Deniz Otel").unwrap(),
            contact_person: ContactPerson::new("Ayşe Yılmaz").unwrap(),
            email: ClientEmail::new("info@denizotel.com").unwrap(),
            phone: PhoneNumber::new("+905321234567").unwrap(),
            address: String::new(),
            current_stage: Stage::Stage1,
            services_completed: BTreeSet::new(),
            carbon_footprint: None,
            sustainability_score: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn add_form() -> AddClientForm {
        AddClientForm {
            name: "Deniz Turizm".to_string(),
            hotel_name: "Deniz Otel".to_string(),
            contact_person: "Ayşe Yılmaz".to_string(),
            email: "info@denizotel.com".to_string(),
            phone: "0532 123 45 67".to_string(),
            address: String::new(),
        }
    }

    struct NullStorage;

    impl FileStorage for NullStorage {
        fn save(&self, _key: &str, _data: &mut dyn std::io::Read) -> StorageResult<u64> {
            Ok(0)
        }
        fn load(&self, key: &str) -> StorageResult<Vec<u8>> {
            Err(StorageError::NotFound(key.to_string()))
        }
        fn delete(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn admin_create_provisions_folders_without_linking() {
        let mut repo = MockRepository::new();
        repo.expect_create_client_with_folders()
            .withf(|_, template, link| {
                template.root.as_str() == "Deniz Turizm SYS" && link.is_none()
            })
            .times(1)
            .returning(|_, template, _| Ok((client(5), template.folder_count())));
        repo.expect_create_client().times(0);
        repo.expect_update_user().times(0);

        let created = create_client(&repo, &admin(), add_form()).unwrap();

        assert_eq!(created.id.get(), 5);
    }

    #[test]
    fn linked_client_user_gets_existing_hotel_back() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .times(1)
            .returning(|id| Ok(Some(client(id.get()))));
        repo.expect_create_client_with_folders().times(0);

        let existing = create_client(&repo, &client_user(Some(8)), add_form()).unwrap();

        assert_eq!(existing.id.get(), 8);
    }

    #[test]
    fn self_service_create_links_user_and_completes_setup() {
        let session = client_user(None);
        let user_id = session.user.id;
        let mut repo = MockRepository::new();
        repo.expect_create_client_with_folders()
            .withf(move |_, _, link| {
                matches!(
                    link,
                    Some((id, updates))
                        if *id == user_id
                            && updates.setup_status == Some(SetupStatus::Completed)
                )
            })
            .times(1)
            .returning(|_, template, _| Ok((client(11), template.folder_count())));
        repo.expect_update_user().times(0);

        assert!(create_client(&repo, &session, add_form()).is_ok());
    }

    #[test]
    fn failed_self_service_create_can_be_retried_without_duplicates() {
        let session = client_user(None);
        let mut repo = MockRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_create_client_with_folders()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(RepositoryError::DatabaseError("disk full".to_string())));
        repo.expect_create_client_with_folders()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, template, _| Ok((client(12), template.folder_count())));
        repo.expect_create_client().times(0);
        repo.expect_create_folder_tree().times(0);

        assert!(create_client(&repo, &session, add_form()).is_err());
        let created = create_client(&repo, &session, add_form()).unwrap();

        assert_eq!(created.id.get(), 12);
    }

    #[test]
    fn unlinked_client_user_sees_no_hotels() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients().times(0);

        let clients = list_clients(&repo, &client_user(None)).unwrap();

        assert!(clients.is_empty());
    }

    #[test]
    fn client_user_cannot_read_foreign_hotel() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id().times(0);

        let result = get_client(&repo, &client_user(Some(1)), ClientId::new(2).unwrap());

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn stage_only_edit_is_forwarded() {
        let mut repo = MockRepository::new();
        repo.expect_update_client()
            .withf(|_, updates| {
                updates.current_stage == Some(Stage::Stage2) && updates.name.is_none()
            })
            .times(1)
            .returning(|id, _| {
                let mut updated = client(id.get());
                updated.current_stage = Stage::Stage2;
                Ok(updated)
            });
        let form = UpdateClientForm {
            current_stage: Some(Stage::Stage2),
            ..Default::default()
        };

        let updated = update_client(&repo, &admin(), ClientId::new(3).unwrap(), form).unwrap();

        assert_eq!(updated.current_stage, Stage::Stage2);
    }

    #[test]
    fn client_users_cannot_edit_or_delete() {
        let mut repo = MockRepository::new();
        repo.expect_update_client().times(0);
        repo.expect_delete_client().times(0);
        let session = client_user(Some(3));
        let id = ClientId::new(3).unwrap();

        assert!(matches!(
            update_client(&repo, &session, id, UpdateClientForm::default()),
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            delete_client(&repo, &NullStorage, &session, id),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn existing_folders_are_not_recreated() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|id| Ok(Some(client(id.get()))));
        repo.expect_list_folders().times(1).returning(|client_id| {
            let now = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
            Ok(vec![crate::domain::folder::Folder {
                id: crate::domain::types::FolderId::new(1).unwrap(),
                client_id: client_id.unwrap(),
                name: crate::domain::types::FolderName::new("Deniz Turizm SYS").unwrap(),
                level: crate::domain::folder::FolderLevel::Root,
                parent_folder_id: None,
                created_at: now,
            }])
        });
        repo.expect_create_folder_tree().times(0);

        let created = ensure_folders(&repo, &admin(), ClientId::new(4).unwrap()).unwrap();

        assert_eq!(created, 0);
    }
}
