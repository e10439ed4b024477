use diesel::prelude::*;

use crate::domain::training::{NewTraining, Training, UpdateTraining};
use crate::domain::types::{ClientId, TrainingId};
use crate::models::training::{
    NewTraining as DbNewTraining, Training as DbTraining, UpdateTraining as DbUpdateTraining,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, TrainingReader, TrainingWriter};

impl TrainingReader for DieselRepository {
    fn get_training_by_id(&self, id: TrainingId) -> RepositoryResult<Option<Training>> {
        use crate::schema::trainings;

        let mut conn = self.conn()?;
        let db_training = trainings::table
            .find(id.get())
            .first::<DbTraining>(&mut conn)
            .optional()?;

        db_training
            .map(|db_training| Training::try_from(db_training).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_trainings(&self, client_id: Option<ClientId>) -> RepositoryResult<Vec<Training>> {
        use crate::schema::trainings;

        let mut conn = self.conn()?;
        let mut query = trainings::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(client_id) = client_id {
            query = query.filter(trainings::client_id.eq(client_id.get()));
        }

        query
            .order((trainings::training_date.desc(), trainings::id.desc()))
            .load::<DbTraining>(&mut conn)?
            .into_iter()
            .map(|db_training| Training::try_from(db_training).map_err(RepositoryError::from))
            .collect()
    }

    fn count_trainings(&self, client_id: Option<ClientId>) -> RepositoryResult<usize> {
        use crate::schema::trainings;

        let mut conn = self.conn()?;
        let mut query = trainings::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(client_id) = client_id {
            query = query.filter(trainings::client_id.eq(client_id.get()));
        }
        let total = query.count().get_result::<i64>(&mut conn)?;
        Ok(total as usize)
    }
}

impl TrainingWriter for DieselRepository {
    fn create_training(&self, new_training: &NewTraining) -> RepositoryResult<Training> {
        use crate::schema::trainings;

        let mut conn = self.conn()?;

        let db_new_training: DbNewTraining = new_training.into();
        let db_training = diesel::insert_into(trainings::table)
            .values(&db_new_training)
            .get_result::<DbTraining>(&mut conn)?;

        Training::try_from(db_training).map_err(RepositoryError::from)
    }

    fn update_training(
        &self,
        id: TrainingId,
        updates: &UpdateTraining,
    ) -> RepositoryResult<Training> {
        use crate::schema::trainings;

        let mut conn = self.conn()?;

        // Diesel rejects empty changesets.
        if updates.is_empty() {
            let db_training = trainings::table
                .find(id.get())
                .first::<DbTraining>(&mut conn)?;
            return Training::try_from(db_training).map_err(RepositoryError::from);
        }

        let changeset: DbUpdateTraining = updates.into();
        let db_training = diesel::update(trainings::table.find(id.get()))
            .set(&changeset)
            .get_result::<DbTraining>(&mut conn)?;

        Training::try_from(db_training).map_err(RepositoryError::from)
    }
}
