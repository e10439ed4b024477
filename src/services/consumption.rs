//! Monthly consumption records and their analytics.

use chrono::{Datelike, Utc};

use crate::domain::analytics::{self, ConsumptionAnalytics, MonthlyTrend};
use crate::domain::consumption::{Consumption, NewConsumption, validate_year};
use crate::domain::types::{ClientId, ConsumptionId, Resource};
use crate::dto::consumption::{ConsumptionPageData, ConsumptionPageQuery, ResourceRow};
use crate::forms::consumption::{ConsumptionForm, ConsumptionValues};
use crate::repository::{ClientReader, ConsumptionListQuery, ConsumptionReader, ConsumptionWriter};
use crate::services::client::list_clients;
use crate::services::{ServiceError, ServiceResult, Session};

fn current_year() -> i32 {
    Utc::now().year()
}

/// Whether the caller sees any records at all, and the client filter to apply.
fn read_filter(
    session: &Session,
    requested: Option<ClientId>,
) -> ServiceResult<(bool, Option<ClientId>)> {
    if let Some(client_id) = requested {
        session.require_access(client_id)?;
        return Ok((true, Some(client_id)));
    }
    if session.capabilities.can_view_all_clients {
        return Ok((true, None));
    }
    Ok((
        session.scope_client_id().is_some(),
        session.scope_client_id(),
    ))
}

/// Hotel a new record is written for; client users default to their own.
fn write_target(session: &Session, requested: Option<ClientId>) -> ServiceResult<ClientId> {
    let client_id = requested
        .or(session.scope_client_id())
        .ok_or_else(|| ServiceError::Form("Müşteri seçilmedi".to_string()))?;
    if session.capabilities.can_record_consumption_for(client_id) {
        Ok(client_id)
    } else {
        Err(ServiceError::Forbidden)
    }
}

fn ensure_client_exists<R>(repo: &R, client_id: ClientId) -> ServiceResult<()>
where
    R: ClientReader + ?Sized,
{
    match repo.get_client_by_id(client_id)? {
        Some(_) => Ok(()),
        None => Err(ServiceError::NotFound),
    }
}

pub fn list_consumptions<R>(
    repo: &R,
    session: &Session,
    year: Option<i32>,
    client_id: Option<ClientId>,
) -> ServiceResult<Vec<Consumption>>
where
    R: ConsumptionReader + ?Sized,
{
    let (visible, filter) = read_filter(session, client_id)?;
    if !visible {
        return Ok(Vec::new());
    }
    let mut query = ConsumptionListQuery::default().years(year);
    if let Some(client_id) = filter {
        query = query.client(client_id);
    }
    Ok(repo.list_consumptions(query)?)
}

/// Records one month; a second record for the same hotel and month is a conflict.
pub fn create_consumption<R>(
    repo: &R,
    session: &Session,
    form: ConsumptionForm,
) -> ServiceResult<Consumption>
where
    R: ClientReader + ConsumptionWriter + ?Sized,
{
    let values = ConsumptionValues::try_from(form)?;
    let client_id = write_target(session, values.client_id)?;
    ensure_client_exists(repo, client_id)?;

    let record = values.into_new(client_id);
    repo.create_consumption(&record).map_err(|err| {
        log::error!(
            "Failed to record consumption {}/{} for client {client_id}: {err}",
            record.year,
            record.month
        );
        match ServiceError::from(err) {
            ServiceError::Conflict(_) => ServiceError::Conflict(format!(
                "{}/{} dönemi için kayıt zaten mevcut",
                record.month, record.year
            )),
            other => other,
        }
    })
}

pub fn update_consumption<R>(
    repo: &R,
    session: &Session,
    consumption_id: ConsumptionId,
    form: ConsumptionForm,
) -> ServiceResult<Consumption>
where
    R: ConsumptionReader + ConsumptionWriter + ?Sized,
{
    let existing = repo
        .get_consumption_by_id(consumption_id)?
        .ok_or(ServiceError::NotFound)?;
    if !session
        .capabilities
        .can_record_consumption_for(existing.client_id)
    {
        return Err(ServiceError::Forbidden);
    }

    let values = ConsumptionValues::try_from(form)?;
    if values
        .client_id
        .is_some_and(|client_id| client_id != existing.client_id)
    {
        return Err(ServiceError::Form(
            "Kayıt başka bir müşteriye taşınamaz".to_string(),
        ));
    }

    repo.update_consumption(consumption_id, &values.into_update())
        .map_err(|err| {
            log::error!("Failed to update consumption {consumption_id}: {err}");
            ServiceError::from(err)
        })
}

pub fn delete_consumption<R>(
    repo: &R,
    session: &Session,
    consumption_id: ConsumptionId,
) -> ServiceResult<()>
where
    R: ConsumptionReader + ConsumptionWriter + ?Sized,
{
    let existing = repo
        .get_consumption_by_id(consumption_id)?
        .ok_or(ServiceError::NotFound)?;
    if !session
        .capabilities
        .can_record_consumption_for(existing.client_id)
    {
        return Err(ServiceError::Forbidden);
    }

    repo.delete_consumption(consumption_id).map_err(|err| {
        log::error!("Failed to delete consumption {consumption_id}: {err}");
        ServiceError::from(err)
    })
}

/// Year-over-year analytics of `year` against `year - 1`.
pub fn consumption_analytics<R>(
    repo: &R,
    session: &Session,
    year: Option<i32>,
    client_id: Option<ClientId>,
) -> ServiceResult<ConsumptionAnalytics>
where
    R: ConsumptionReader + ?Sized,
{
    let year = validate_year(year.unwrap_or_else(current_year))?;
    let (visible, filter) = read_filter(session, client_id)?;
    let records = if visible {
        let mut query = ConsumptionListQuery::default().years([year, year - 1]);
        if let Some(client_id) = filter {
            query = query.client(client_id);
        }
        repo.list_consumptions(query)?
    } else {
        Vec::new()
    };
    Ok(analytics::analyze(year, &records))
}

/// Twelve-month series of `year` summed over every hotel visible to the caller.
pub fn monthly_trends<R>(
    repo: &R,
    session: &Session,
    year: Option<i32>,
) -> ServiceResult<Vec<MonthlyTrend>>
where
    R: ConsumptionReader + ?Sized,
{
    let year = validate_year(year.unwrap_or_else(current_year))?;
    let records = list_consumptions(repo, session, Some(year), None)?;
    Ok(analytics::monthly_trends(year, &records))
}

/// Inserts every parsed CSV row for one hotel, all or nothing.
pub fn import_consumptions<R>(
    repo: &R,
    session: &Session,
    client_id: Option<ClientId>,
    rows: Vec<ConsumptionValues>,
) -> ServiceResult<usize>
where
    R: ClientReader + ConsumptionWriter + ?Sized,
{
    let client_id = write_target(session, client_id)?;
    ensure_client_exists(repo, client_id)?;

    let records: Vec<NewConsumption> = rows
        .into_iter()
        .map(|row| row.into_new(client_id))
        .collect();
    repo.create_consumptions(&records).map_err(|err| {
        log::error!("Failed to import consumption rows for client {client_id}: {err}");
        ServiceError::from(err)
    })
}

pub fn load_consumption_page<R>(
    repo: &R,
    session: &Session,
    query: ConsumptionPageQuery,
) -> ServiceResult<ConsumptionPageData>
where
    R: ClientReader + ConsumptionReader + ?Sized,
{
    let year = validate_year(query.year.unwrap_or_else(current_year))?;
    let client_id = query.client_id.map(ClientId::new).transpose()?;

    let clients = list_clients(repo, session)?;
    let analytics = consumption_analytics(repo, session, Some(year), client_id)?;
    let trends = monthly_trends(repo, session, Some(year))?;
    let records = list_consumptions(repo, session, Some(year), client_id)?;
    let rows = Resource::ALL
        .iter()
        .map(|resource| ResourceRow::for_resource(*resource, &analytics))
        .collect();

    Ok(ConsumptionPageData {
        clients,
        selected_client: query.client_id,
        year,
        records,
        analytics,
        rows,
        trends,
    })
}
