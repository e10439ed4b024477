//! Client hotel aggregate.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    ClientEmail, ClientId, ClientName, ContactPerson, HotelName, PhoneNumber, ServiceType, Stage,
};

/// A hotel enrolled in the certification program.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub name: ClientName,
    pub hotel_name: HotelName,
    pub contact_person: ContactPerson,
    pub email: ClientEmail,
    pub phone: PhoneNumber,
    pub address: String,
    pub current_stage: Stage,
    pub services_completed: BTreeSet<ServiceType>,
    pub carbon_footprint: Option<f64>,
    pub sustainability_score: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Outcome of the carbon footprint analysis shown on the dashboard.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FootprintStatus {
    /// No footprint has been recorded yet; the analysis is still in progress.
    Pending,
    /// Annual footprint in kg CO2.
    Reported(f64),
}

impl Client {
    pub fn footprint_status(&self) -> FootprintStatus {
        match self.carbon_footprint {
            Some(value) => FootprintStatus::Reported(value),
            None => FootprintStatus::Pending,
        }
    }

    pub fn has_completed(&self, service: ServiceType) -> bool {
        self.services_completed.contains(&service)
    }
}

/// Data required to register a new client.
#[derive(Clone, Debug, PartialEq)]
pub struct NewClient {
    pub name: ClientName,
    pub hotel_name: HotelName,
    pub contact_person: ContactPerson,
    pub email: ClientEmail,
    pub phone: PhoneNumber,
    pub address: String,
}

impl NewClient {
    #[must_use]
    pub fn new(
        name: ClientName,
        hotel_name: HotelName,
        contact_person: ContactPerson,
        email: ClientEmail,
        phone: PhoneNumber,
        address: String,
    ) -> Self {
        Self {
            name,
            hotel_name,
            contact_person,
            email,
            phone,
            address: address.trim().to_string(),
        }
    }
}

/// Partial update of a client. `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateClient {
    pub name: Option<ClientName>,
    pub hotel_name: Option<HotelName>,
    pub contact_person: Option<ContactPerson>,
    pub email: Option<ClientEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
    pub current_stage: Option<Stage>,
    pub services_completed: Option<BTreeSet<ServiceType>>,
    pub carbon_footprint: Option<f64>,
    pub sustainability_score: Option<i32>,
}

impl UpdateClient {
    /// True when at least one column of the `clients` row changes.
    pub fn touches_row(&self) -> bool {
        self.name.is_some()
            || self.hotel_name.is_some()
            || self.contact_person.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.address.is_some()
            || self.current_stage.is_some()
            || self.carbon_footprint.is_some()
            || self.sustainability_score.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_row() && self.services_completed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_client(carbon_footprint: Option<f64>) -> Client {
        let now = Utc::now().naive_utc();
        Client {
            id: ClientId::new(1).unwrap(),
            name: ClientName::new("Deniz Turizm").unwrap(),
            hotel_name: HotelName::new("Deniz Otel").unwrap(),
            contact_person: ContactPerson::new("Ayşe Yılmaz").unwrap(),
            email: ClientEmail::new("info@denizotel.com").unwrap(),
            phone: PhoneNumber::new("+905321234567").unwrap(),
            address: "Antalya".to_string(),
            current_stage: Stage::Stage1,
            services_completed: BTreeSet::from([ServiceType::SituationAnalysis]),
            carbon_footprint,
            sustainability_score: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn missing_footprint_means_analysis_pending() {
        let client = sample_client(None);
        assert_eq!(client.footprint_status(), FootprintStatus::Pending);
    }

    #[test]
    fn recorded_footprint_is_reported() {
        let client = sample_client(Some(125.5));
        assert_eq!(client.footprint_status(), FootprintStatus::Reported(125.5));
        assert!(client.has_completed(ServiceType::SituationAnalysis));
        assert!(!client.has_completed(ServiceType::Training));
    }

    #[test]
    fn update_with_only_services_does_not_touch_row() {
        let update = UpdateClient {
            services_completed: Some(BTreeSet::new()),
            ..Default::default()
        };
        assert!(!update.touches_row());
        assert!(!update.is_empty());
        assert!(UpdateClient::default().is_empty());
    }
}
