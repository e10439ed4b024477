//! HTTP handlers: the JSON API under `/api` and the server-rendered shell.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::types::Stage;
use crate::dto::api::ErrorBody;
use crate::services::{ServiceError, Session};

pub mod api;
pub mod client;
pub mod consumption;
pub mod document;
pub mod main;
pub mod training;

#[derive(Serialize)]
struct TabLink {
    path: &'static str,
    label: &'static str,
    active: bool,
}

/// Maps a flash message level to the bootstrap alert class.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// `(code, label)` pairs for stage pickers.
pub fn stage_choices() -> Vec<(&'static str, &'static str)> {
    Stage::ALL
        .iter()
        .map(|stage| (stage.as_str(), stage.label()))
        .collect()
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Context shared by every page of the shell: alerts, user, tabs.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    session: &Session,
    current_page: &str,
    sign_in_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();
    let tabs = session
        .capabilities
        .tabs()
        .into_iter()
        .map(|tab| TabLink {
            path: tab.path(),
            label: tab.label(),
            active: tab.path().trim_start_matches('/') == current_page
                || (tab.path() == "/" && current_page == "index"),
        })
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &session.user);
    context.insert("capabilities", &session.capabilities);
    context.insert("tabs", &tabs);
    context.insert("current_page", current_page);
    context.insert("sign_in_url", sign_in_url);
    context
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Form(_) | ServiceError::TypeConstraint(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            ServiceError::Form(message) | ServiceError::Conflict(message) => message.clone(),
            // Internals stay in the log.
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { detail })
    }
}
