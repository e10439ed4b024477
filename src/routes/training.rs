use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::types::{TrainingId, TrainingStatus};
use crate::dto::training::TrainingsQuery;
use crate::forms::training::{AddTrainingForm, UpdateTrainingForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, Session, training as training_service};

#[get("/trainings")]
pub async fn show_trainings(
    params: web::Query<TrainingsQuery>,
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match training_service::load_trainings_page(repo.get_ref(), &session, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &session,
                "trainings",
                &server_config.identity.sign_in_url,
            );
            context.insert("trainings", &data.trainings);
            context.insert("clients", &data.clients);
            context.insert("selected_client", &data.selected_client);
            context.insert(
                "statuses",
                &TrainingStatus::ALL
                    .iter()
                    .map(|s| (s.as_str(), s.label()))
                    .collect::<Vec<_>>(),
            );

            render_template(&tera, "trainings/index.html", &context)
        }
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Bu müşterinin eğitimlerine erişiminiz yok.").send();
            redirect("/trainings")
        }
        Err(err) => {
            log::error!("Failed to list trainings: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/trainings/add")]
pub async fn add_training(
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddTrainingForm>,
) -> impl Responder {
    let location = format!("/trainings?client_id={}", form.client_id);
    match training_service::create_training(repo.get_ref(), &session, form) {
        Ok(training) => FlashMessage::success(format!("{} planlandı.", training.title)).send(),
        Err(ServiceError::Form(message)) => FlashMessage::error(message).send(),
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Eğitim ekleme yetkiniz yok.").send()
        }
        Err(ServiceError::NotFound) => FlashMessage::error("Müşteri bulunamadı.").send(),
        Err(err) => {
            log::error!("Failed to add a training: {err}");
            FlashMessage::error("Eğitim eklenemedi.").send()
        }
    }
    redirect(&location)
}

#[post("/trainings/{training_id}")]
pub async fn save_training(
    training_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<UpdateTrainingForm>,
) -> impl Responder {
    let result = TrainingId::new(training_id.into_inner())
        .map_err(ServiceError::from)
        .and_then(|training_id| {
            training_service::update_training(repo.get_ref(), &session, training_id, form)
        });
    match result {
        Ok(training) => {
            FlashMessage::success(format!("Eğitim durumu: {}", training.status.label())).send();
            redirect(&format!("/trainings?client_id={}", training.client_id))
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/trainings")
        }
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Eğitim düzenleme yetkiniz yok.").send();
            redirect("/trainings")
        }
        Err(err) => {
            log::error!("Failed to update training: {err}");
            FlashMessage::error("Eğitim güncellenemedi.").send();
            redirect("/trainings")
        }
    }
}
