use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::training::{
    NewTraining as DomainNewTraining, Training as DomainTraining,
    UpdateTraining as DomainUpdateTraining,
};
use crate::domain::types::{ClientId, TrainingId, TrainingTitle, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::trainings)]
/// Diesel model for [`crate::domain::training::Training`].
pub struct Training {
    pub id: i32,
    pub client_id: i32,
    pub title: String,
    pub description: String,
    pub trainer: Option<String>,
    pub training_date: NaiveDateTime,
    pub participants: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::trainings)]
pub struct NewTraining<'a> {
    pub client_id: i32,
    pub title: &'a str,
    pub description: &'a str,
    pub trainer: Option<&'a str>,
    pub training_date: NaiveDateTime,
    pub participants: i32,
    pub status: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::trainings)]
pub struct UpdateTraining<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub trainer: Option<&'a str>,
    pub training_date: Option<NaiveDateTime>,
    pub participants: Option<i32>,
    pub status: Option<&'a str>,
}

impl TryFrom<Training> for DomainTraining {
    type Error = TypeConstraintError;

    fn try_from(training: Training) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TrainingId::new(training.id)?,
            client_id: ClientId::new(training.client_id)?,
            title: TrainingTitle::new(training.title)?,
            description: training.description,
            trainer: training.trainer,
            training_date: training.training_date,
            participants: training.participants,
            status: training.status.parse()?,
            created_at: training.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewTraining> for NewTraining<'a> {
    fn from(training: &'a DomainNewTraining) -> Self {
        Self {
            client_id: training.client_id.get(),
            title: training.title.as_str(),
            description: training.description.as_str(),
            trainer: training.trainer.as_deref(),
            training_date: training.training_date,
            participants: training.participants,
            status: training.status.as_str(),
        }
    }
}

impl<'a> From<&'a DomainUpdateTraining> for UpdateTraining<'a> {
    fn from(updates: &'a DomainUpdateTraining) -> Self {
        Self {
            title: updates.title.as_ref().map(|title| title.as_str()),
            description: updates.description.as_deref(),
            trainer: updates.trainer.as_deref(),
            training_date: updates.training_date,
            participants: updates.participants,
            status: updates.status.map(|status| status.as_str()),
        }
    }
}
