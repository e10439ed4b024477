use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use validator::Validate;

use crate::domain::training::{NewTraining, UpdateTraining};
use crate::domain::types::{ClientId, TrainingStatus, TrainingTitle, sanitize_text};
use crate::forms::{FormError, non_blank, optional_number};

/// Parses the date formats produced by `datetime-local` and `date` inputs and by JSON clients.
pub fn parse_training_date(value: &str) -> Result<NaiveDateTime, FormError> {
    let value = value.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    if let Some(naive) = value
        .strip_suffix('Z')
        .and_then(|rest| NaiveDateTime::parse_from_str(rest, "%Y-%m-%dT%H:%M:%S%.f").ok())
    {
        return Ok(naive);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| FormError::InvalidDate(value.to_string()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddTrainingForm {
    pub client_id: i32,
    #[serde(alias = "name")]
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default, alias = "subject")]
    pub description: String,
    #[serde(default)]
    pub trainer: Option<String>,
    pub training_date: String,
    #[serde(default, alias = "participant_count", deserialize_with = "optional_number")]
    pub participants: Option<i32>,
    #[serde(default)]
    pub status: Option<TrainingStatus>,
}

impl TryFrom<AddTrainingForm> for NewTraining {
    type Error = FormError;

    fn try_from(form: AddTrainingForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let participants = form.participants.unwrap_or(0);
        if participants < 0 {
            return Err(FormError::invalid("participants", "must not be negative"));
        }

        Ok(NewTraining {
            client_id: ClientId::new(form.client_id).map_err(|_| FormError::InvalidClientId)?,
            title: TrainingTitle::new(form.title).map_err(|_| FormError::InvalidName)?,
            description: sanitize_text(&form.description).unwrap_or_default(),
            trainer: non_blank(form.trainer),
            training_date: parse_training_date(&form.training_date)?,
            participants,
            status: form.status.unwrap_or_default(),
        })
    }
}

/// Partial training update; `PUT /trainings/{id}` with only `status` is the common case.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTrainingForm {
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default, alias = "subject")]
    pub description: Option<String>,
    #[serde(default)]
    pub trainer: Option<String>,
    #[serde(default)]
    pub training_date: Option<String>,
    #[serde(default, alias = "participant_count", deserialize_with = "optional_number")]
    pub participants: Option<i32>,
    #[serde(default)]
    pub status: Option<TrainingStatus>,
}

impl TryFrom<UpdateTrainingForm> for UpdateTraining {
    type Error = FormError;

    fn try_from(form: UpdateTrainingForm) -> Result<Self, Self::Error> {
        if let Some(participants) = form.participants
            && participants < 0
        {
            return Err(FormError::invalid("participants", "must not be negative"));
        }

        Ok(UpdateTraining {
            title: non_blank(form.title)
                .map(TrainingTitle::new)
                .transpose()
                .map_err(|_| FormError::InvalidName)?,
            description: form
                .description
                .map(|text| sanitize_text(&text).unwrap_or_default()),
            trainer: non_blank(form.trainer),
            training_date: non_blank(form.training_date)
                .map(|date| parse_training_date(&date))
                .transpose()?,
            participants: form.participants,
            status: form.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn dates_from_every_input_flavour_parse() {
        assert_eq!(
            parse_training_date("2024-05-10T14:30").unwrap().hour(),
            14
        );
        assert_eq!(
            parse_training_date("2024-05-10T14:30:15").unwrap().second(),
            15
        );
        assert_eq!(
            parse_training_date("2024-05-10T14:30:15.250Z").unwrap().minute(),
            30
        );
        assert_eq!(parse_training_date("2024-05-10").unwrap().hour(), 0);
        assert!(parse_training_date("10.05.2024").is_err());
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let form: AddTrainingForm = serde_json::from_str(
            r#"{
                "client_id": 3,
                "name": "Atık Yönetimi",
                "subject": "Ayrıştırma",
                "trainer": "Mehmet",
                "training_date": "2024-06-01",
                "participant_count": 12
            }"#,
        )
        .unwrap();
        let training = NewTraining::try_from(form).unwrap();
        assert_eq!(training.title.as_str(), "Atık Yönetimi");
        assert_eq!(training.participants, 12);
        assert_eq!(training.status, TrainingStatus::Planned);
    }

    #[test]
    fn status_only_update() {
        let form: UpdateTrainingForm = serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        let updates = UpdateTraining::try_from(form).unwrap();
        assert_eq!(updates.status, Some(TrainingStatus::Completed));
        assert!(updates.title.is_none());
        assert!(updates.training_date.is_none());
    }
}
