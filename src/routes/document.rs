use std::io::{Seek, SeekFrom};

use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::types::{DocumentId, DocumentType};
use crate::dto::document::BrowseQuery;
use crate::forms::document::UploadDocumentForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template, stage_choices};
use crate::services::{ServiceError, Session, document as document_service};
use crate::storage::LocalFileStorage;

fn browse_location(client_id: i32, folder_id: Option<i32>) -> String {
    match folder_id {
        Some(folder_id) => format!("/documents?client_id={client_id}&folder_id={folder_id}"),
        None => format!("/documents?client_id={client_id}"),
    }
}

#[get("/documents")]
pub async fn show_documents(
    params: web::Query<BrowseQuery>,
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match document_service::browse_documents(repo.get_ref(), &session, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &session,
                "documents",
                &server_config.identity.sign_in_url,
            );
            context.insert("clients", &data.clients);
            context.insert("client", &data.client);
            context.insert("selection", &data.selection);
            context.insert("selected_category", &data.selection.category());
            context.insert("selected_leaf", &data.selection.leaf());
            context.insert("breadcrumb", &data.breadcrumb);
            context.insert("categories", &data.categories);
            context.insert("leaves", &data.leaves);
            context.insert("documents", &data.documents);
            context.insert("unfiled", &data.unfiled);
            context.insert(
                "document_types",
                &DocumentType::ALL
                    .iter()
                    .map(|t| (t.as_str(), t.label()))
                    .collect::<Vec<_>>(),
            );
            context.insert("stages", &stage_choices());

            render_template(&tera, "documents/index.html", &context)
        }
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Bu müşterinin belgelerine erişiminiz yok.").send();
            redirect("/documents")
        }
        Err(err) => {
            log::error!("Failed to browse documents: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/documents/upload")]
pub async fn upload_document(
    session: Session,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalFileStorage>,
    server_config: web::Data<ServerConfig>,
    MultipartForm(form): MultipartForm<UploadDocumentForm>,
) -> impl Responder {
    let client_id = *form.client_id;
    let folder_id = form.folder_id.as_ref().map(|folder_id| **folder_id);
    let location = browse_location(client_id, folder_id);

    let (upload, temp) = match form.into_upload() {
        Ok(parts) => parts,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect(&location);
        }
    };
    let mut file = temp.file;
    if let Err(err) = file.seek(SeekFrom::Start(0)) {
        log::error!("Failed to rewind upload: {err}");
        return HttpResponse::InternalServerError().finish();
    }

    match document_service::upload_document(
        repo.get_ref(),
        storage.get_ref(),
        &session,
        upload,
        &mut file,
        server_config.max_upload_size as u64,
    ) {
        Ok(document) => FlashMessage::success(format!("{} yüklendi.", document.name)).send(),
        Err(ServiceError::Form(message)) => FlashMessage::error(message).send(),
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Bu müşteri için belge yükleyemezsiniz.").send()
        }
        Err(err) => {
            log::error!("Failed to upload document: {err}");
            FlashMessage::error("Belge yüklenemedi.").send()
        }
    }
    redirect(&location)
}

#[post("/documents/{document_id}/delete")]
pub async fn delete_document(
    document_id: web::Path<i32>,
    params: web::Query<BrowseQuery>,
    session: Session,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalFileStorage>,
) -> impl Responder {
    let result = DocumentId::new(document_id.into_inner())
        .map_err(ServiceError::from)
        .and_then(|document_id| {
            document_service::delete_document(
                repo.get_ref(),
                storage.get_ref(),
                &session,
                document_id,
            )
        });
    match result {
        Ok(()) => FlashMessage::success("Belge silindi.").send(),
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Belge silme yetkiniz yok.").send()
        }
        Err(ServiceError::NotFound) => FlashMessage::error("Belge bulunamadı.").send(),
        Err(err) => {
            log::error!("Failed to delete document: {err}");
            FlashMessage::error("Belge silinemedi.").send()
        }
    }

    match params.client_id {
        Some(client_id) => redirect(&browse_location(client_id, params.folder_id)),
        None => redirect("/documents"),
    }
}
