use serde::{Deserialize, Serialize};

use crate::domain::client::Client;
use crate::domain::training::Training;

#[derive(Debug, Default, Deserialize)]
pub struct TrainingsQuery {
    #[serde(default)]
    pub client_id: Option<i32>,
}

/// Trainings tab; `clients` fills the hotel picker for admins.
#[derive(Debug, Serialize)]
pub struct TrainingsPageData {
    pub trainings: Vec<Training>,
    pub clients: Vec<Client>,
    pub selected_client: Option<i32>,
}
