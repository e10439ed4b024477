use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, TrainingId, TrainingStatus, TrainingTitle};

/// Awareness or compliance training delivered to a hotel's staff.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Training {
    pub id: TrainingId,
    pub client_id: ClientId,
    pub title: TrainingTitle,
    pub description: String,
    pub trainer: Option<String>,
    pub training_date: NaiveDateTime,
    pub participants: i32,
    pub status: TrainingStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewTraining {
    pub client_id: ClientId,
    pub title: TrainingTitle,
    pub description: String,
    pub trainer: Option<String>,
    pub training_date: NaiveDateTime,
    pub participants: i32,
    pub status: TrainingStatus,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateTraining {
    pub title: Option<TrainingTitle>,
    pub description: Option<String>,
    pub trainer: Option<String>,
    pub training_date: Option<NaiveDateTime>,
    pub participants: Option<i32>,
    pub status: Option<TrainingStatus>,
}

impl UpdateTraining {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
