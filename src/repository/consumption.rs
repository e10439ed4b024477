use chrono::Utc;
use diesel::prelude::*;

use crate::domain::consumption::{Consumption, NewConsumption, UpdateConsumption};
use crate::domain::types::ConsumptionId;
use crate::models::consumption::{
    Consumption as DbConsumption, NewConsumption as DbNewConsumption,
    UpdateConsumption as DbUpdateConsumption,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ConsumptionListQuery, ConsumptionReader, ConsumptionWriter, DieselRepository,
};

impl ConsumptionReader for DieselRepository {
    fn get_consumption_by_id(&self, id: ConsumptionId) -> RepositoryResult<Option<Consumption>> {
        use crate::schema::consumptions;

        let mut conn = self.conn()?;
        let db_consumption = consumptions::table
            .find(id.get())
            .first::<DbConsumption>(&mut conn)
            .optional()?;

        db_consumption
            .map(|row| Consumption::try_from(row).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_consumptions(
        &self,
        query: ConsumptionListQuery,
    ) -> RepositoryResult<Vec<Consumption>> {
        use crate::schema::consumptions;

        let mut conn = self.conn()?;
        let mut items = consumptions::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(client_id) = query.client_id {
            items = items.filter(consumptions::client_id.eq(client_id.get()));
        }
        if !query.years.is_empty() {
            items = items.filter(consumptions::year.eq_any(query.years));
        }

        items
            .order((
                consumptions::year.desc(),
                consumptions::month.asc(),
                consumptions::client_id.asc(),
            ))
            .load::<DbConsumption>(&mut conn)?
            .into_iter()
            .map(|row| Consumption::try_from(row).map_err(RepositoryError::from))
            .collect()
    }
}

impl ConsumptionWriter for DieselRepository {
    fn create_consumption(&self, record: &NewConsumption) -> RepositoryResult<Consumption> {
        use crate::schema::consumptions;

        let mut conn = self.conn()?;

        let db_record: DbNewConsumption = record.into();
        let row = diesel::insert_into(consumptions::table)
            .values(&db_record)
            .get_result::<DbConsumption>(&mut conn)?;

        Consumption::try_from(row).map_err(RepositoryError::from)
    }

    fn create_consumptions(&self, records: &[NewConsumption]) -> RepositoryResult<usize> {
        use crate::schema::consumptions;

        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;

        let db_records = records
            .iter()
            .map(DbNewConsumption::from)
            .collect::<Vec<_>>();

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::insert_into(consumptions::table)
                .values(&db_records)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }

    fn update_consumption(
        &self,
        id: ConsumptionId,
        updates: &UpdateConsumption,
    ) -> RepositoryResult<Consumption> {
        use crate::schema::consumptions;

        let mut conn = self.conn()?;

        let changeset = DbUpdateConsumption::from_domain(updates, Utc::now().naive_utc());
        let row = diesel::update(consumptions::table.find(id.get()))
            .set(&changeset)
            .get_result::<DbConsumption>(&mut conn)?;

        Consumption::try_from(row).map_err(RepositoryError::from)
    }

    fn delete_consumption(&self, id: ConsumptionId) -> RepositoryResult<()> {
        use crate::schema::consumptions;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(consumptions::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
