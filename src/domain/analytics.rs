//! Year-over-year consumption analytics.
//!
//! Everything here is pure: callers load the records for the years of interest
//! and the functions fold them into totals, per-person figures and twelve-month
//! series. Division guards are part of the contract:
//!
//! * per-person values are `0.0` when the occupancy denominator is zero;
//! * percentage changes are `None` when the previous value is zero.

use serde::{Deserialize, Serialize};

use crate::domain::consumption::{Consumption, ResourceAmounts};
use crate::domain::types::{Month, Resource};

/// Divides `total` by `occupancy`, yielding `0.0` for an empty denominator.
pub fn per_person(total: f64, occupancy: i64) -> f64 {
    if occupancy <= 0 {
        0.0
    } else {
        total / occupancy as f64
    }
}

/// Relative change from `previous` to `current` in percent.
///
/// Returns `None` when there is no previous value to compare against.
pub fn percentage_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

/// Renders an optional percentage the way the dashboard shows it.
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(value) => format!("{value:+.1}%"),
        None => "N/A".to_string(),
    }
}

fn amounts_per_person(amounts: ResourceAmounts, occupancy: i64) -> ResourceAmounts {
    amounts.map(|total| per_person(total, occupancy))
}

/// Pair of values for the selected year and the one before it.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct YearPair<T> {
    pub current_year: T,
    pub previous_year: T,
}

/// Percentage change per resource; `None` marks a zero baseline.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceChange {
    pub electricity: Option<f64>,
    pub water: Option<f64>,
    pub natural_gas: Option<f64>,
    pub coal: Option<f64>,
}

impl ResourceChange {
    pub fn between(current: &ResourceAmounts, previous: &ResourceAmounts) -> Self {
        Self {
            electricity: percentage_change(current.electricity, previous.electricity),
            water: percentage_change(current.water, previous.water),
            natural_gas: percentage_change(current.natural_gas, previous.natural_gas),
            coal: percentage_change(current.coal, previous.coal),
        }
    }

    pub fn get(&self, resource: Resource) -> Option<f64> {
        match resource {
            Resource::Electricity => self.electricity,
            Resource::Water => self.water,
            Resource::NaturalGas => self.natural_gas,
            Resource::Coal => self.coal,
        }
    }
}

/// Sum of the records falling into one month.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct MonthBucket {
    amounts: ResourceAmounts,
    accommodation: i64,
}

/// Folds the records of `year` into twelve monthly buckets.
///
/// Months without records stay at zero; several records for the same month
/// (for example across clients) are summed.
fn monthly_buckets(year: i32, records: &[Consumption]) -> [MonthBucket; 12] {
    let mut buckets = [MonthBucket::default(); 12];
    for record in records.iter().filter(|record| record.year == year) {
        let bucket = &mut buckets[record.month.index()];
        bucket.amounts += record.amounts;
        bucket.accommodation += i64::from(record.accommodation_count);
    }
    buckets
}

fn yearly_total(buckets: &[MonthBucket; 12]) -> MonthBucket {
    buckets
        .iter()
        .fold(MonthBucket::default(), |acc, bucket| MonthBucket {
            amounts: acc.amounts + bucket.amounts,
            accommodation: acc.accommodation + bucket.accommodation,
        })
}

/// One row of the month-by-month comparison table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonthlyComparison {
    pub month: Month,
    pub current_year: ResourceAmounts,
    pub previous_year: ResourceAmounts,
    pub current_year_accommodation: i64,
    pub previous_year_accommodation: i64,
    pub current_year_per_person: ResourceAmounts,
    pub previous_year_per_person: ResourceAmounts,
}

/// Analytics for a selected year against the previous one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionAnalytics {
    pub year: i32,
    pub previous_year: i32,
    pub yearly_totals: YearPair<ResourceAmounts>,
    pub yearly_accommodation: YearPair<i64>,
    pub yearly_per_person: YearPair<ResourceAmounts>,
    pub percentage_change: ResourceChange,
    pub per_person_change: ResourceChange,
    /// Always twelve entries, January first.
    pub monthly_comparison: Vec<MonthlyComparison>,
}

/// Computes year-over-year analytics for `year` from `records`.
///
/// Records of years other than `year` and `year - 1` are ignored.
pub fn analyze(year: i32, records: &[Consumption]) -> ConsumptionAnalytics {
    let previous_year = year - 1;
    let current = monthly_buckets(year, records);
    let previous = monthly_buckets(previous_year, records);

    let current_total = yearly_total(&current);
    let previous_total = yearly_total(&previous);

    let current_per_person = amounts_per_person(current_total.amounts, current_total.accommodation);
    let previous_per_person =
        amounts_per_person(previous_total.amounts, previous_total.accommodation);

    let monthly_comparison = Month::all()
        .map(|month| {
            let now = current[month.index()];
            let before = previous[month.index()];
            MonthlyComparison {
                month,
                current_year: now.amounts,
                previous_year: before.amounts,
                current_year_accommodation: now.accommodation,
                previous_year_accommodation: before.accommodation,
                current_year_per_person: amounts_per_person(now.amounts, now.accommodation),
                previous_year_per_person: amounts_per_person(before.amounts, before.accommodation),
            }
        })
        .collect();

    ConsumptionAnalytics {
        year,
        previous_year,
        yearly_totals: YearPair {
            current_year: current_total.amounts,
            previous_year: previous_total.amounts,
        },
        yearly_accommodation: YearPair {
            current_year: current_total.accommodation,
            previous_year: previous_total.accommodation,
        },
        yearly_per_person: YearPair {
            current_year: current_per_person,
            previous_year: previous_per_person,
        },
        percentage_change: ResourceChange::between(&current_total.amounts, &previous_total.amounts),
        per_person_change: ResourceChange::between(&current_per_person, &previous_per_person),
        monthly_comparison,
    }
}

/// Aggregated figures of one month, used for trend charts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTrend {
    pub month: Month,
    #[serde(flatten)]
    pub amounts: ResourceAmounts,
    pub accommodation_count: i64,
    pub per_person: ResourceAmounts,
}

/// Twelve-entry series for `year`, summing all supplied records per month.
pub fn monthly_trends(year: i32, records: &[Consumption]) -> Vec<MonthlyTrend> {
    let buckets = monthly_buckets(year, records);
    Month::all()
        .map(|month| {
            let bucket = buckets[month.index()];
            MonthlyTrend {
                month,
                amounts: bucket.amounts,
                accommodation_count: bucket.accommodation,
                per_person: amounts_per_person(bucket.amounts, bucket.accommodation),
            }
        })
        .collect()
}
