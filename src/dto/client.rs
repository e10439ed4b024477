//! DTOs shaped for the clients table.

use serde::{Deserialize, Serialize};

use crate::domain::client::Client;
use crate::domain::types::Stage;
use crate::pagination::Paginated;

/// Query parameters of the clients table.
#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    /// Free-form search over name, hotel, contact person and email.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub page: Option<usize>,
}

#[derive(Serialize)]
pub struct ClientsPageData {
    pub clients: Paginated<Client>,
    pub search_query: Option<String>,
    pub stage: Option<Stage>,
}
