//! Diesel models representing client hotels and their completed services.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::{
    Client as DomainClient, NewClient as DomainNewClient, UpdateClient as DomainUpdateClient,
};
use crate::domain::types::{
    ClientEmail, ClientId, ClientName, ContactPerson, HotelName, PhoneNumber, ServiceType,
    TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub name: String,
    pub hotel_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub current_stage: String,
    pub carbon_footprint: Option<f64>,
    pub sustainability_score: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub name: &'a str,
    pub hotel_name: &'a str,
    pub contact_person: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub current_stage: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
/// Partial update of a [`Client`] row; `None` fields are left untouched.
pub struct UpdateClient<'a> {
    pub name: Option<&'a str>,
    pub hotel_name: Option<&'a str>,
    pub contact_person: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub current_stage: Option<&'a str>,
    pub carbon_footprint: Option<f64>,
    pub sustainability_score: Option<i32>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Insertable, Associations)]
#[diesel(table_name = crate::schema::client_services)]
#[diesel(belongs_to(Client, foreign_key = client_id))]
#[diesel(primary_key(client_id, service))]
/// Completed consulting service of a client.
pub struct ClientService {
    pub client_id: i32,
    pub service: String,
}

impl Client {
    /// Converts the row into the domain aggregate using its loaded services.
    pub fn into_domain(
        self,
        services: &[ClientService],
    ) -> Result<DomainClient, TypeConstraintError> {
        let services_completed = services
            .iter()
            .filter(|s| s.client_id == self.id)
            .map(|s| s.service.parse::<ServiceType>())
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(DomainClient {
            id: ClientId::new(self.id)?,
            name: ClientName::new(self.name)?,
            hotel_name: HotelName::new(self.hotel_name)?,
            contact_person: ContactPerson::new(self.contact_person)?,
            email: ClientEmail::new(self.email)?,
            phone: PhoneNumber::new(self.phone)?,
            address: self.address,
            current_stage: self.current_stage.parse()?,
            services_completed,
            carbon_footprint: self.carbon_footprint,
            sustainability_score: self.sustainability_score,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewClient> for NewClient<'a> {
    fn from(client: &'a DomainNewClient) -> Self {
        Self {
            name: client.name.as_str(),
            hotel_name: client.hotel_name.as_str(),
            contact_person: client.contact_person.as_str(),
            email: client.email.as_str(),
            phone: client.phone.as_str(),
            address: client.address.as_str(),
            current_stage: crate::domain::types::Stage::default().as_str(),
        }
    }
}

impl<'a> UpdateClient<'a> {
    pub fn from_domain(updates: &'a DomainUpdateClient, updated_at: NaiveDateTime) -> Self {
        Self {
            name: updates.name.as_ref().map(|v| v.as_str()),
            hotel_name: updates.hotel_name.as_ref().map(|v| v.as_str()),
            contact_person: updates.contact_person.as_ref().map(|v| v.as_str()),
            email: updates.email.as_ref().map(|v| v.as_str()),
            phone: updates.phone.as_ref().map(|v| v.as_str()),
            address: updates.address.as_deref(),
            current_stage: updates.current_stage.map(|stage| stage.as_str()),
            carbon_footprint: updates.carbon_footprint,
            sustainability_score: updates.sustainability_score,
            updated_at,
        }
    }
}

/// Rows to insert for a client's completed services.
pub fn service_rows(client_id: ClientId, services: &BTreeSet<ServiceType>) -> Vec<ClientService> {
    services
        .iter()
        .map(|service| ClientService {
            client_id: client_id.get(),
            service: service.as_str().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Stage;
    use chrono::Utc;

    fn sample_row() -> Client {
        let now = Utc::now().naive_utc();
        Client {
            id: 5,
            name: "Deniz Turizm".to_string(),
            hotel_name: "Deniz Otel".to_string(),
            contact_person: "Ayşe".to_string(),
            email: "info@denizotel.com".to_string(),
            phone: "+905321234567".to_string(),
            address: "Antalya".to_string(),
            current_stage: "Stage2".to_string(),
            carbon_footprint: None,
            sustainability_score: Some(70),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_with_its_services_only() {
        let services = vec![
            ClientService {
                client_id: 5,
                service: "training".to_string(),
            },
            ClientService {
                client_id: 6,
                service: "monitoring".to_string(),
            },
        ];

        let client = sample_row().into_domain(&services).unwrap();

        assert_eq!(client.current_stage, Stage::Stage2);
        assert_eq!(
            client.services_completed,
            BTreeSet::from([ServiceType::Training])
        );
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let mut row = sample_row();
        row.current_stage = "Stage9".to_string();
        assert!(row.into_domain(&[]).is_err());
    }

    #[test]
    fn update_changeset_only_carries_present_fields() {
        let updates = DomainUpdateClient {
            current_stage: Some(Stage::Stage2),
            ..Default::default()
        };
        let changeset = UpdateClient::from_domain(&updates, Utc::now().naive_utc());
        assert_eq!(changeset.current_stage, Some("Stage2"));
        assert!(changeset.name.is_none());
        assert!(changeset.carbon_footprint.is_none());
    }
}
