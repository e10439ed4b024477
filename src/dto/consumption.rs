//! DTOs of the consumption tab.

use serde::{Deserialize, Serialize};

use crate::domain::analytics::{ConsumptionAnalytics, MonthlyTrend};
use crate::domain::client::Client;
use crate::domain::consumption::Consumption;
use crate::domain::types::Resource;

#[derive(Debug, Default, Deserialize)]
pub struct ConsumptionPageQuery {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub client_id: Option<i32>,
}

/// One resource line of the year-over-year table, formatted for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResourceRow {
    pub code: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub current: f64,
    pub previous: f64,
    pub change: String,
    pub per_person_current: f64,
    pub per_person_previous: f64,
    pub per_person_change: String,
}

#[derive(Debug, Serialize)]
pub struct ConsumptionPageData {
    pub clients: Vec<Client>,
    pub selected_client: Option<i32>,
    pub year: i32,
    pub records: Vec<Consumption>,
    pub analytics: ConsumptionAnalytics,
    pub rows: Vec<ResourceRow>,
    pub trends: Vec<MonthlyTrend>,
}

impl ResourceRow {
    pub fn for_resource(resource: Resource, analytics: &ConsumptionAnalytics) -> Self {
        use crate::domain::analytics::format_change;

        Self {
            code: resource.as_str(),
            label: resource.label(),
            unit: resource.unit(),
            current: analytics.yearly_totals.current_year.get(resource),
            previous: analytics.yearly_totals.previous_year.get(resource),
            change: format_change(analytics.percentage_change.get(resource)),
            per_person_current: analytics.yearly_per_person.current_year.get(resource),
            per_person_previous: analytics.yearly_per_person.previous_year.get(resource),
            per_person_change: format_change(analytics.per_person_change.get(resource)),
        }
    }
}
