use serde::Serialize;

use crate::domain::client::{Client, FootprintStatus};
use crate::domain::document::Document;
use crate::domain::setup::SetupState;
use crate::domain::training::Training;
use crate::dto::api::Stats;

/// Data required to render the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub setup: SetupState,
    /// Linked hotel of a client user.
    pub client: Option<Client>,
    /// `Pending` renders the "analysis pending" card.
    pub footprint: Option<FootprintStatus>,
    pub stats: Stats,
    pub upcoming_trainings: Vec<Training>,
    pub recent_documents: Vec<Document>,
}
