use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::types::{ClientId, ConsumptionId, Month};
use crate::dto::consumption::ConsumptionPageQuery;
use crate::forms::consumption::{ConsumptionForm, UploadConsumptionForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, Session, consumption as consumption_service};

fn page_location(year: Option<i32>, client_id: Option<i32>) -> String {
    match (year, client_id) {
        (Some(year), Some(client_id)) => format!("/consumption?year={year}&client_id={client_id}"),
        (Some(year), None) => format!("/consumption?year={year}"),
        (None, Some(client_id)) => format!("/consumption?client_id={client_id}"),
        (None, None) => "/consumption".to_string(),
    }
}

#[get("/consumption")]
pub async fn show_consumption(
    params: web::Query<ConsumptionPageQuery>,
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match consumption_service::load_consumption_page(repo.get_ref(), &session, params.into_inner())
    {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &session,
                "consumption",
                &server_config.identity.sign_in_url,
            );
            context.insert("clients", &data.clients);
            context.insert("selected_client", &data.selected_client);
            context.insert("year", &data.year);
            context.insert("records", &data.records);
            context.insert("analytics", &data.analytics);
            context.insert("rows", &data.rows);
            context.insert("months", &Month::all().map(Month::get).collect::<Vec<_>>());
            // Chart data is embedded as JSON for the page script.
            match serde_json::to_string(&data.trends) {
                Ok(trends) => context.insert("trends_json", &trends),
                Err(err) => {
                    log::error!("Failed to serialize trends: {err}");
                    return HttpResponse::InternalServerError().finish();
                }
            }

            render_template(&tera, "consumption/index.html", &context)
        }
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Bu müşterinin verilerine erişiminiz yok.").send();
            redirect("/consumption")
        }
        Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/consumption")
        }
        Err(err) => {
            log::error!("Failed to load consumption page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/consumption/add")]
pub async fn add_consumption(
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ConsumptionForm>,
) -> impl Responder {
    let location = page_location(Some(form.year), form.client_id);
    match consumption_service::create_consumption(repo.get_ref(), &session, form) {
        Ok(record) => FlashMessage::success(format!(
            "{}/{} dönemi kaydedildi.",
            record.month, record.year
        ))
        .send(),
        Err(ServiceError::Form(message)) | Err(ServiceError::Conflict(message)) => {
            FlashMessage::error(message).send()
        }
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Bu müşteri için kayıt giremezsiniz.").send()
        }
        Err(err) => {
            log::error!("Failed to add consumption: {err}");
            FlashMessage::error("Kayıt eklenemedi.").send()
        }
    }
    redirect(&location)
}

#[post("/consumption/{consumption_id}/delete")]
pub async fn delete_consumption(
    consumption_id: web::Path<i32>,
    params: web::Query<ConsumptionPageQuery>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = ConsumptionId::new(consumption_id.into_inner())
        .map_err(ServiceError::from)
        .and_then(|consumption_id| {
            consumption_service::delete_consumption(repo.get_ref(), &session, consumption_id)
        });
    match result {
        Ok(()) => FlashMessage::success("Kayıt silindi.").send(),
        Err(ServiceError::Forbidden) => FlashMessage::error("Bu kaydı silemezsiniz.").send(),
        Err(ServiceError::NotFound) => FlashMessage::error("Kayıt bulunamadı.").send(),
        Err(err) => {
            log::error!("Failed to delete consumption: {err}");
            FlashMessage::error("Kayıt silinemedi.").send()
        }
    }
    redirect(&page_location(params.year, params.client_id))
}

#[post("/consumption/upload")]
pub async fn upload_consumption(
    session: Session,
    repo: web::Data<DieselRepository>,
    MultipartForm(mut form): MultipartForm<UploadConsumptionForm>,
) -> impl Responder {
    let requested = form.client_id.as_ref().map(|client_id| **client_id);
    let location = page_location(None, requested);

    let rows = match form.parse() {
        Ok(rows) => rows,
        Err(err) => {
            FlashMessage::error(format!("CSV okunamadı: {err}")).send();
            return redirect(&location);
        }
    };

    let result = requested
        .map(ClientId::new)
        .transpose()
        .map_err(ServiceError::from)
        .and_then(|client_id| {
            consumption_service::import_consumptions(repo.get_ref(), &session, client_id, rows)
        });
    match result {
        Ok(count) => FlashMessage::success(format!("{count} kayıt içe aktarıldı.")).send(),
        Err(ServiceError::Form(message)) | Err(ServiceError::Conflict(message)) => {
            FlashMessage::error(message).send()
        }
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Bu müşteri için kayıt giremezsiniz.").send()
        }
        Err(err) => {
            log::error!("Failed to import consumption rows: {err}");
            FlashMessage::error("Kayıtlar içe aktarılamadı.").send()
        }
    }
    redirect(&location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_location_keeps_filters() {
        assert_eq!(page_location(None, None), "/consumption");
        assert_eq!(
            page_location(Some(2024), Some(3)),
            "/consumption?year=2024&client_id=3"
        );
        assert_eq!(page_location(None, Some(3)), "/consumption?client_id=3");
    }
}
