use crate::domain::training::{NewTraining, Training, UpdateTraining};
use crate::domain::types::{ClientId, TrainingId};
use crate::dto::training::{TrainingsPageData, TrainingsQuery};
use crate::forms::training::{AddTrainingForm, UpdateTrainingForm};
use crate::repository::{ClientReader, TrainingReader, TrainingWriter};
use crate::services::client::list_clients;
use crate::services::{ServiceError, ServiceResult, Session};

/// Trainings of one hotel, or of every hotel for admins when `client_id` is `None`.
pub fn list_trainings<R>(
    repo: &R,
    session: &Session,
    client_id: Option<ClientId>,
) -> ServiceResult<Vec<Training>>
where
    R: TrainingReader + ?Sized,
{
    let filter = match client_id {
        Some(client_id) => {
            session.require_access(client_id)?;
            Some(client_id)
        }
        None if session.capabilities.can_view_all_clients => None,
        None => match session.scope_client_id() {
            Some(own) => Some(own),
            None => return Ok(Vec::new()),
        },
    };
    Ok(repo.list_trainings(filter)?)
}

pub fn create_training<R>(
    repo: &R,
    session: &Session,
    form: AddTrainingForm,
) -> ServiceResult<Training>
where
    R: ClientReader + TrainingWriter + ?Sized,
{
    session.require_training_management()?;

    let new_training = NewTraining::try_from(form)?;
    if repo.get_client_by_id(new_training.client_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    repo.create_training(&new_training).map_err(|err| {
        log::error!("Failed to create training: {err}");
        ServiceError::from(err)
    })
}

/// Partial update, typically a status change.
pub fn update_training<R>(
    repo: &R,
    session: &Session,
    training_id: TrainingId,
    form: UpdateTrainingForm,
) -> ServiceResult<Training>
where
    R: TrainingWriter + ?Sized,
{
    session.require_training_management()?;

    let updates = UpdateTraining::try_from(form)?;
    repo.update_training(training_id, &updates).map_err(|err| {
        log::error!("Failed to update training {training_id}: {err}");
        ServiceError::from(err)
    })
}

pub fn load_trainings_page<R>(
    repo: &R,
    session: &Session,
    query: TrainingsQuery,
) -> ServiceResult<TrainingsPageData>
where
    R: ClientReader + TrainingReader + ?Sized,
{
    let client_id = query.client_id.map(ClientId::new).transpose()?;
    let trainings = list_trainings(repo, session, client_id)?;
    let clients = list_clients(repo, session)?;

    Ok(TrainingsPageData {
        trainings,
        clients,
        selected_client: query.client_id,
    })
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::domain::types::{TrainingStatus, TrainingTitle};
    use crate::repository::mock::MockRepository;
    use crate::services::auth::tests::{admin, client_user};
    use crate::services::client::tests::client;

    fn training(id: i32, status: TrainingStatus) -> Training {
        let now = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        Training {
            id: TrainingId::new(id).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            title: TrainingTitle::new("Enerji Verimliliği").unwrap(),
            description: String::new(),
            trainer: None,
            training_date: now,
            participants: 10,
            status,
            created_at: now,
        }
    }

    fn add_form(client_id: i32) -> AddTrainingForm {
        AddTrainingForm {
            client_id,
            title: "Enerji Verimliliği".to_string(),
            description: String::new(),
            trainer: None,
            training_date: "2024-05-10T10:00".to_string(),
            participants: Some(10),
            status: None,
        }
    }

    #[test]
    fn client_users_cannot_create_trainings() {
        let mut repo = MockRepository::new();
        repo.expect_create_training().times(0);

        let result = create_training(&repo, &client_user(Some(1)), add_form(1));

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn training_for_unknown_hotel_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id().returning(|_| Ok(None));
        repo.expect_create_training().times(0);

        let result = create_training(&repo, &admin(), add_form(5));

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn admin_creates_planned_training() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|id| Ok(Some(client(id.get()))));
        repo.expect_create_training()
            .withf(|t| t.status == TrainingStatus::Planned && t.participants == 10)
            .times(1)
            .returning(|_| Ok(training(1, TrainingStatus::Planned)));

        assert!(create_training(&repo, &admin(), add_form(1)).is_ok());
    }

    #[test]
    fn status_update_is_forwarded() {
        let mut repo = MockRepository::new();
        repo.expect_update_training()
            .withf(|_, updates| updates.status == Some(TrainingStatus::Completed))
            .times(1)
            .returning(|id, _| Ok(training(id.get(), TrainingStatus::Completed)));
        let form = UpdateTrainingForm {
            status: Some(TrainingStatus::Completed),
            ..Default::default()
        };

        let updated = update_training(&repo, &admin(), TrainingId::new(2).unwrap(), form).unwrap();

        assert_eq!(updated.status, TrainingStatus::Completed);
    }

    #[test]
    fn client_user_is_pinned_to_own_hotel() {
        let mut repo = MockRepository::new();
        repo.expect_list_trainings()
            .withf(|filter| filter.map(ClientId::get) == Some(3))
            .times(1)
            .returning(|_| Ok(vec![]));

        assert!(list_trainings(&repo, &client_user(Some(3)), None).is_ok());
        assert!(matches!(
            list_trainings(&repo, &client_user(Some(3)), ClientId::new(4).ok()),
            Err(ServiceError::Forbidden)
        ));
    }
}
