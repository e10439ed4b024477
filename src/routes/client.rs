use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::types::{ClientId, ServiceType};
use crate::dto::client::ClientsQuery;
use crate::forms::client::{AddClientForm, UpdateClientForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template, stage_choices};
use crate::services::{ServiceError, Session, client as client_service};
use crate::storage::LocalFileStorage;

#[get("/clients")]
pub async fn show_clients(
    params: web::Query<ClientsQuery>,
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match client_service::load_clients_page(repo.get_ref(), &session, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &session,
                "clients",
                &server_config.identity.sign_in_url,
            );
            context.insert("clients", &data.clients);
            context.insert("search_query", &data.search_query);
            context.insert("stage", &data.stage);
            context.insert("stages", &stage_choices());

            render_template(&tera, "clients/index.html", &context)
        }
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Bu sayfa için yetkiniz yok.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to list clients: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/clients/add")]
pub async fn add_client(
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddClientForm>,
) -> impl Responder {
    match client_service::create_client(repo.get_ref(), &session, form) {
        Ok(client) => {
            FlashMessage::success(format!("{} eklendi.", client.hotel_name)).send();
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
        }
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Bu işlem için yetkiniz yok.").send();
        }
        Err(err) => {
            log::error!("Failed to add a client: {err}");
            FlashMessage::error("Müşteri eklenemedi.").send();
        }
    }
    redirect("/clients")
}

#[get("/clients/{client_id}")]
pub async fn show_client(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let client = match ClientId::new(client_id.into_inner())
        .map_err(ServiceError::from)
        .and_then(|client_id| client_service::get_client(repo.get_ref(), &session, client_id))
    {
        Ok(client) => client,
        Err(ServiceError::Internal(err)) => {
            log::error!("Failed to get client: {err}");
            return HttpResponse::InternalServerError().finish();
        }
        Err(_) => {
            FlashMessage::error("Müşteri bulunamadı.").send();
            return redirect("/clients");
        }
    };

    let mut context = base_context(
        &flash_messages,
        &session,
        "clients",
        &server_config.identity.sign_in_url,
    );
    context.insert("client", &client);
    context.insert("stages", &stage_choices());
    context.insert(
        "services",
        &ServiceType::ALL
            .iter()
            .map(|service| (service.as_str(), service.label(), client.has_completed(*service)))
            .collect::<Vec<_>>(),
    );

    render_template(&tera, "clients/edit.html", &context)
}

/// Saves the edit form. The checkbox group always describes the full set of
/// completed services, so an absent field clears it.
#[post("/clients/{client_id}")]
pub async fn save_client(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    form: web::Bytes,
) -> impl Responder {
    let client_id = client_id.into_inner();
    let location = format!("/clients/{client_id}");

    let mut form: UpdateClientForm = match serde_html_form::from_bytes(&form) {
        Ok(form) => form,
        Err(err) => {
            FlashMessage::error(format!("Form okunamadı: {err}")).send();
            return redirect(&location);
        }
    };
    form.services_completed.get_or_insert_with(Vec::new);

    let result = ClientId::new(client_id)
        .map_err(ServiceError::from)
        .and_then(|client_id| {
            client_service::update_client(repo.get_ref(), &session, client_id, form)
        });
    match result {
        Ok(_) => FlashMessage::success("Müşteri güncellendi.").send(),
        Err(ServiceError::Form(message)) | Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send()
        }
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Bu işlem için yetkiniz yok.").send()
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Müşteri bulunamadı.").send();
            return redirect("/clients");
        }
        Err(err) => {
            log::error!("Failed to update client {client_id}: {err}");
            FlashMessage::error("Müşteri güncellenemedi.").send()
        }
    }
    redirect(&location)
}

#[post("/clients/{client_id}/delete")]
pub async fn delete_client(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalFileStorage>,
) -> impl Responder {
    let result = ClientId::new(client_id.into_inner())
        .map_err(ServiceError::from)
        .and_then(|client_id| {
            client_service::delete_client(repo.get_ref(), storage.get_ref(), &session, client_id)
        });
    match result {
        Ok(()) => FlashMessage::success("Müşteri silindi.").send(),
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Bu işlem için yetkiniz yok.").send()
        }
        Err(err) => {
            log::error!("Failed to delete client: {err}");
            FlashMessage::error("Müşteri silinemedi.").send()
        }
    }
    redirect("/clients")
}

#[post("/clients/{client_id}/folders")]
pub async fn create_folders(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let client_id = client_id.into_inner();
    let result = ClientId::new(client_id)
        .map_err(ServiceError::from)
        .and_then(|id| client_service::ensure_folders(repo.get_ref(), &session, id));
    match result {
        Ok(0) => FlashMessage::info("Klasörler zaten mevcut.").send(),
        Ok(created) => FlashMessage::success(format!("{created} klasör oluşturuldu.")).send(),
        Err(err) => {
            log::error!("Failed to create folders for client {client_id}: {err}");
            FlashMessage::error("Klasörler oluşturulamadı.").send()
        }
    }
    redirect(&format!("/clients/{client_id}"))
}
