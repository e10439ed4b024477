//! Dashboard, statistics and the first-login setup gate.

use chrono::Utc;

use crate::domain::client::Client;
use crate::domain::setup::{SetupEvent, SetupState};
use crate::domain::types::{Stage, TrainingStatus};
use crate::domain::user::{UpdateUser, User};
use crate::dto::api::{StageDistribution, Stats};
use crate::dto::main::DashboardData;
use crate::forms::client::AddClientForm;
use crate::repository::{ClientReader, ClientWriter, DocumentReader, TrainingReader, UserWriter};
use crate::services::{ServiceError, ServiceResult, Session, client, document, training};

const DASHBOARD_LIST_LIMIT: usize = 5;

/// Counters of the stats cards.
///
/// Admins see totals over every hotel. Client users see their own hotel as a
/// single client with a one-hot stage distribution, or zeros while unlinked.
pub fn load_stats<R>(repo: &R, session: &Session) -> ServiceResult<Stats>
where
    R: ClientReader + DocumentReader + TrainingReader + ?Sized,
{
    if session.capabilities.can_view_all_clients {
        let mut stage_distribution = StageDistribution::default();
        for stage in Stage::ALL {
            *stage_distribution.slot(*stage) = repo.count_clients(Some(*stage))?;
        }
        return Ok(Stats {
            total_clients: repo.count_clients(None)?,
            stage_distribution,
            total_documents: repo.count_documents(None)?,
            total_trainings: repo.count_trainings(None)?,
        });
    }

    let Some(client_id) = session.scope_client_id() else {
        return Ok(Stats::default());
    };
    let stage = repo
        .get_client_by_id(client_id)?
        .map(|client| client.current_stage)
        .unwrap_or_default();

    Ok(Stats {
        total_clients: 1,
        stage_distribution: StageDistribution::one_hot(stage),
        total_documents: repo.count_documents(Some(client_id))?,
        total_trainings: repo.count_trainings(Some(client_id))?,
    })
}

pub fn load_dashboard<R>(repo: &R, session: &Session) -> ServiceResult<DashboardData>
where
    R: ClientReader + DocumentReader + TrainingReader + ?Sized,
{
    let setup = SetupState::resolve(&session.user);

    let linked = match session.scope_client_id() {
        Some(client_id) => repo.get_client_by_id(client_id)?,
        None => None,
    };
    let footprint = linked.as_ref().map(Client::footprint_status);

    let stats = load_stats(repo, session)?;

    let now = Utc::now().naive_utc();
    let mut upcoming_trainings: Vec<_> = training::list_trainings(repo, session, None)?
        .into_iter()
        .filter(|t| t.status == TrainingStatus::Planned && t.training_date >= now)
        .collect();
    upcoming_trainings.sort_by_key(|t| t.training_date);
    upcoming_trainings.truncate(DASHBOARD_LIST_LIMIT);

    let mut recent_documents = document::list_documents(repo, session, None)?;
    recent_documents.truncate(DASHBOARD_LIST_LIMIT);

    Ok(DashboardData {
        setup,
        client: linked,
        footprint,
        stats,
        upcoming_trainings,
        recent_documents,
    })
}

/// Submits the setup form: creates the hotel and links it to the caller.
pub fn complete_setup<R>(repo: &R, session: &Session, form: AddClientForm) -> ServiceResult<Client>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    SetupState::resolve(&session.user)
        .complete()
        .map_err(|err| {
            log::warn!("Rejected setup for user {}: {err}", session.user.id);
            ServiceError::Conflict("Kurulum zaten tamamlandı".to_string())
        })?;

    client::create_client(repo, session, form)
}

/// Dismisses the setup form for good without creating a hotel.
pub fn skip_setup<R>(repo: &R, session: &Session) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    SetupState::resolve(&session.user).skip().map_err(|err| {
        log::warn!("Rejected setup skip for user {}: {err}", session.user.id);
        ServiceError::Conflict("Kurulum zaten tamamlandı".to_string())
    })?;

    let updates = UpdateUser {
        setup_status: Some(SetupState::persisted_status(SetupEvent::Skip)),
        ..Default::default()
    };
    repo.update_user(session.user.id, &updates).map_err(|err| {
        log::error!("Failed to skip setup for user {}: {err}", session.user.id);
        ServiceError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ClientId, SetupStatus, UserRole};
    use crate::repository::mock::MockRepository;
    use crate::services::auth::tests::{admin, client_user, user};
    use crate::services::client::tests::client as hotel;

    #[test]
    fn admin_stats_cover_every_hotel() {
        let mut repo = MockRepository::new();
        repo.expect_count_clients().returning(|stage| {
            Ok(match stage {
                None => 6,
                Some(Stage::Stage1) => 3,
                Some(Stage::Stage2) => 2,
                Some(Stage::Stage3) => 1,
            })
        });
        repo.expect_count_documents().returning(|_| Ok(40));
        repo.expect_count_trainings().returning(|_| Ok(7));

        let stats = load_stats(&repo, &admin()).unwrap();

        assert_eq!(stats.total_clients, 6);
        assert_eq!(stats.stage_distribution.stage_2, 2);
        assert_eq!(stats.stage_distribution.total(), 6);
        assert_eq!(stats.total_documents, 40);
    }

    #[test]
    fn client_stats_are_one_hot() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id().returning(|id| {
            let mut linked = hotel(id.get());
            linked.current_stage = Stage::Stage3;
            Ok(Some(linked))
        });
        repo.expect_count_documents()
            .withf(|client_id| client_id.map(ClientId::get) == Some(2))
            .returning(|_| Ok(4));
        repo.expect_count_trainings().returning(|_| Ok(1));
        repo.expect_count_clients().times(0);

        let stats = load_stats(&repo, &client_user(Some(2))).unwrap();

        assert_eq!(stats.total_clients, 1);
        assert_eq!(stats.stage_distribution, StageDistribution::one_hot(Stage::Stage3));
        assert_eq!(stats.total_documents, 4);
    }

    #[test]
    fn unlinked_client_stats_are_zero() {
        let repo = MockRepository::new();

        let stats = load_stats(&repo, &client_user(None)).unwrap();

        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn dashboard_shows_pending_analysis_without_footprint() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|id| Ok(Some(hotel(id.get()))));
        repo.expect_count_documents().returning(|_| Ok(0));
        repo.expect_count_trainings().returning(|_| Ok(0));
        repo.expect_list_trainings().returning(|_| Ok(vec![]));
        repo.expect_list_documents().returning(|_| Ok(vec![]));

        let dashboard = load_dashboard(&repo, &client_user(Some(1))).unwrap();

        assert_eq!(
            dashboard.footprint,
            Some(crate::domain::client::FootprintStatus::Pending)
        );
        assert_eq!(dashboard.setup, SetupState::Completed);
    }

    #[test]
    fn skip_persists_status_server_side() {
        let mut repo = MockRepository::new();
        repo.expect_update_user()
            .withf(|_, updates| {
                updates.setup_status == Some(SetupStatus::Skipped) && updates.client_id.is_none()
            })
            .times(1)
            .returning(|_, _| {
                let mut skipped = user(UserRole::Client, None);
                skipped.setup_status = SetupStatus::Skipped;
                Ok(skipped)
            });

        let updated = skip_setup(&repo, &client_user(None)).unwrap();

        assert_eq!(SetupState::resolve(&updated), SetupState::Completed);
    }

    #[test]
    fn setup_cannot_run_twice() {
        let repo = MockRepository::new();

        assert!(matches!(
            skip_setup(&repo, &client_user(Some(3))),
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            skip_setup(&repo, &admin()),
            Err(ServiceError::Conflict(_))
        ));
    }
}
