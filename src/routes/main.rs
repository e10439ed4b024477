use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::setup::SetupState;
use crate::forms::auth::SessionForm;
use crate::forms::client::AddClientForm;
use crate::identity::TokenVerifier;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, Session, auth as auth_service, main as main_service};

#[get("/")]
pub async fn show_index(
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    if SetupState::resolve(&session.user).requires_form() {
        return redirect("/setup");
    }

    match main_service::load_dashboard(repo.get_ref(), &session) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &session,
                "index",
                &server_config.identity.sign_in_url,
            );
            context.insert("client", &data.client);
            context.insert("footprint", &data.footprint);
            context.insert("stats", &data.stats);
            context.insert("upcoming_trainings", &data.upcoming_trainings);
            context.insert("recent_documents", &data.recent_documents);

            render_template(&tera, "main/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to load dashboard: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Exchanges an identity provider token for the session cookie.
#[post("/session")]
pub async fn create_session(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    verifier: web::Data<TokenVerifier>,
    web::Form(form): web::Form<SessionForm>,
) -> impl Responder {
    let auth = match verifier.verify(form.token.trim()) {
        Ok(auth) => auth,
        Err(err) => {
            log::warn!("Rejected sign-in token: {err}");
            return HttpResponse::Unauthorized().finish();
        }
    };

    if let Err(err) = auth_service::register_user(repo.get_ref(), &auth) {
        log::error!("Failed to register {} on sign-in: {err}", auth.sub);
        return HttpResponse::InternalServerError().finish();
    }

    match Identity::login(&req.extensions(), form.token.trim().to_string()) {
        Ok(_) => redirect("/"),
        Err(err) => {
            log::error!("Failed to attach identity: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/logout")]
pub async fn logout(user: Identity, server_config: web::Data<ServerConfig>) -> impl Responder {
    user.logout();
    redirect(&server_config.identity.sign_in_url)
}

#[get("/setup")]
pub async fn show_setup(
    session: Session,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let state = match SetupState::resolve(&session.user).show() {
        Ok(state) => state,
        Err(_) => return redirect("/"),
    };

    let mut context = base_context(
        &flash_messages,
        &session,
        "setup",
        &server_config.identity.sign_in_url,
    );
    context.insert("setup_state", &state);
    render_template(&tera, "main/setup.html", &context)
}

#[post("/setup")]
pub async fn complete_setup(
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddClientForm>,
) -> impl Responder {
    match main_service::complete_setup(repo.get_ref(), &session, form) {
        Ok(client) => {
            FlashMessage::success(format!("{} kaydedildi.", client.hotel_name)).send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/setup")
        }
        Err(ServiceError::Conflict(_)) => redirect("/"),
        Err(err) => {
            log::error!("Failed to complete setup: {err}");
            FlashMessage::error("Otel bilgileri kaydedilemedi.").send();
            redirect("/setup")
        }
    }
}

#[post("/setup/skip")]
pub async fn skip_setup(session: Session, repo: web::Data<DieselRepository>) -> impl Responder {
    match main_service::skip_setup(repo.get_ref(), &session) {
        Ok(_) | Err(ServiceError::Conflict(_)) => redirect("/"),
        Err(err) => {
            log::error!("Failed to skip setup: {err}");
            FlashMessage::error("İşlem tamamlanamadı.").send();
            redirect("/setup")
        }
    }
}
