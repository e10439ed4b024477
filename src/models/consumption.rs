use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::consumption::{
    Consumption as DomainConsumption, NewConsumption as DomainNewConsumption, ResourceAmounts,
    UpdateConsumption as DomainUpdateConsumption,
};
use crate::domain::types::{ClientId, ConsumptionId, Month, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::consumptions)]
/// Diesel model for [`crate::domain::consumption::Consumption`].
pub struct Consumption {
    pub id: i32,
    pub client_id: i32,
    pub year: i32,
    pub month: i32,
    pub electricity: f64,
    pub water: f64,
    pub natural_gas: f64,
    pub coal: f64,
    pub accommodation_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::consumptions)]
pub struct NewConsumption {
    pub client_id: i32,
    pub year: i32,
    pub month: i32,
    pub electricity: f64,
    pub water: f64,
    pub natural_gas: f64,
    pub coal: f64,
    pub accommodation_count: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::consumptions)]
pub struct UpdateConsumption {
    pub year: i32,
    pub month: i32,
    pub electricity: f64,
    pub water: f64,
    pub natural_gas: f64,
    pub coal: f64,
    pub accommodation_count: i32,
    pub updated_at: NaiveDateTime,
}

fn month_column(month: Month) -> i32 {
    // Month is 1..=12 so the cast is lossless.
    month.get() as i32
}

impl TryFrom<Consumption> for DomainConsumption {
    type Error = TypeConstraintError;

    fn try_from(row: Consumption) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ConsumptionId::new(row.id)?,
            client_id: ClientId::new(row.client_id)?,
            year: row.year,
            month: Month::try_from(row.month)?,
            amounts: ResourceAmounts::new(row.electricity, row.water, row.natural_gas, row.coal)?,
            accommodation_count: row.accommodation_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&DomainNewConsumption> for NewConsumption {
    fn from(record: &DomainNewConsumption) -> Self {
        Self {
            client_id: record.client_id.get(),
            year: record.year,
            month: month_column(record.month),
            electricity: record.amounts.electricity,
            water: record.amounts.water,
            natural_gas: record.amounts.natural_gas,
            coal: record.amounts.coal,
            accommodation_count: record.accommodation_count,
        }
    }
}

impl UpdateConsumption {
    pub fn from_domain(record: &DomainUpdateConsumption, updated_at: NaiveDateTime) -> Self {
        Self {
            year: record.year,
            month: month_column(record.month),
            electricity: record.amounts.electricity,
            water: record.amounts.water,
            natural_gas: record.amounts.natural_gas,
            coal: record.amounts.coal,
            accommodation_count: record.accommodation_count,
            updated_at,
        }
    }
}
