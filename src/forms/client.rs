use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::client::{NewClient, UpdateClient};
use crate::domain::types::{
    ClientEmail, ClientName, ContactPerson, HotelName, PhoneNumber, ServiceType, Stage,
    sanitize_text,
};
use crate::forms::{FormError, non_blank, optional_number};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
/// Form data for registering a client hotel, used by admins and by the setup form.
pub struct AddClientForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub hotel_name: String,
    #[validate(length(min = 1, max = 255))]
    pub contact_person: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 1024))]
    pub address: String,
}

impl TryFrom<AddClientForm> for NewClient {
    type Error = FormError;

    fn try_from(form: AddClientForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(NewClient::new(
            ClientName::new(form.name).map_err(|_| FormError::InvalidName)?,
            HotelName::new(form.hotel_name).map_err(|_| FormError::InvalidName)?,
            ContactPerson::new(form.contact_person).map_err(|_| FormError::InvalidName)?,
            ClientEmail::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            PhoneNumber::new(form.phone).map_err(|_| FormError::InvalidPhoneNumber)?,
            sanitize_text(&form.address).unwrap_or_default(),
        ))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
/// Partial client update; absent fields keep their stored values.
pub struct UpdateClientForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hotel_name: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub current_stage: Option<Stage>,
    #[serde(default)]
    pub services_completed: Option<Vec<ServiceType>>,
    #[serde(default, deserialize_with = "optional_number")]
    pub carbon_footprint: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub sustainability_score: Option<i32>,
}

impl TryFrom<UpdateClientForm> for UpdateClient {
    type Error = FormError;

    fn try_from(form: UpdateClientForm) -> Result<Self, Self::Error> {
        let name = non_blank(form.name)
            .map(ClientName::new)
            .transpose()
            .map_err(|_| FormError::InvalidName)?;
        let hotel_name = non_blank(form.hotel_name)
            .map(HotelName::new)
            .transpose()
            .map_err(|_| FormError::InvalidName)?;
        let contact_person = non_blank(form.contact_person)
            .map(ContactPerson::new)
            .transpose()
            .map_err(|_| FormError::InvalidName)?;
        let email = non_blank(form.email)
            .map(ClientEmail::new)
            .transpose()
            .map_err(|_| FormError::InvalidEmail)?;
        let phone = non_blank(form.phone)
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|_| FormError::InvalidPhoneNumber)?;
        let address = form
            .address
            .map(|address| sanitize_text(&address).unwrap_or_default());

        if let Some(footprint) = form.carbon_footprint
            && (!footprint.is_finite() || footprint < 0.0)
        {
            return Err(FormError::invalid(
                "carbon_footprint",
                "must be a non-negative number",
            ));
        }
        if let Some(score) = form.sustainability_score
            && !(0..=100).contains(&score)
        {
            return Err(FormError::invalid(
                "sustainability_score",
                "must be between 0 and 100",
            ));
        }

        Ok(UpdateClient {
            name,
            hotel_name,
            contact_person,
            email,
            phone,
            address,
            current_stage: form.current_stage,
            services_completed: form
                .services_completed
                .map(|services| services.into_iter().collect::<BTreeSet<_>>()),
            carbon_footprint: form.carbon_footprint,
            sustainability_score: form.sustainability_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_form() -> AddClientForm {
        AddClientForm {
            name: "Deniz Turizm A.Ş.".to_string(),
            hotel_name: "Deniz Otel".to_string(),
            contact_person: "Ayşe Yılmaz".to_string(),
            email: "Info@DenizOtel.com".to_string(),
            phone: "0532 123 45 67".to_string(),
            address: "Konyaaltı, <b>Antalya</b>".to_string(),
        }
    }

    #[test]
    fn add_form_builds_normalized_client() {
        let client = NewClient::try_from(add_form()).unwrap();
        assert_eq!(client.email.as_str(), "info@denizotel.com");
        assert_eq!(client.phone.as_str(), "+905321234567");
        assert_eq!(client.address, "Konyaaltı, Antalya");
    }

    #[test]
    fn add_form_rejects_bad_email() {
        let mut form = add_form();
        form.email = "not-an-email".to_string();
        assert!(NewClient::try_from(form).is_err());
    }

    #[test]
    fn stage_only_edit_changes_only_the_stage() {
        let form: UpdateClientForm =
            serde_json::from_str(r#"{"current_stage": "Stage2"}"#).unwrap();
        let updates = UpdateClient::try_from(form).unwrap();
        assert_eq!(updates.current_stage, Some(Stage::Stage2));
        assert!(updates.name.is_none());
        assert!(updates.services_completed.is_none());
        assert!(updates.carbon_footprint.is_none());
    }

    #[test]
    fn blank_footprint_is_left_untouched() {
        let form: UpdateClientForm =
            serde_json::from_str(r#"{"carbon_footprint": "", "sustainability_score": "80"}"#)
                .unwrap();
        let updates = UpdateClient::try_from(form).unwrap();
        assert_eq!(updates.carbon_footprint, None);
        assert_eq!(updates.sustainability_score, Some(80));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let form = UpdateClientForm {
            carbon_footprint: Some(-1.0),
            ..Default::default()
        };
        assert!(UpdateClient::try_from(form).is_err());

        let form = UpdateClientForm {
            sustainability_score: Some(101),
            ..Default::default()
        };
        assert!(UpdateClient::try_from(form).is_err());
    }

    #[test]
    fn unknown_stage_fails_to_deserialize() {
        assert!(serde_json::from_str::<UpdateClientForm>(r#"{"current_stage": "Stage7"}"#).is_err());
    }
}
