//! JSON REST API mounted under `/api`.

use std::io::{Seek, SeekFrom};

use actix_multipart::form::MultipartForm;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::document::file_extension;
use crate::domain::types::{ClientId, ConsumptionId, DocumentId, TrainingId};
use crate::dto::api::{FoldersCreated, MessageResponse, UploadResponse};
use crate::forms::auth::UpdateProfileForm;
use crate::forms::client::{AddClientForm, UpdateClientForm};
use crate::forms::consumption::{ConsumptionForm, ConsumptionQuery};
use crate::forms::document::{DownloadQuery, UploadDocumentForm};
use crate::forms::training::{AddTrainingForm, UpdateTrainingForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::services::{
    ServiceError, Session, auth as auth_service, client as client_service,
    consumption as consumption_service, document as document_service, main as main_service,
    training as training_service,
};
use crate::storage::LocalFileStorage;

type ApiResult = Result<HttpResponse, ServiceError>;

#[derive(Debug, Default, Deserialize)]
struct ClientFilter {
    #[serde(default)]
    client_id: Option<i32>,
}

impl ClientFilter {
    fn client_id(&self) -> Result<Option<ClientId>, ServiceError> {
        Ok(self.client_id.map(ClientId::new).transpose()?)
    }
}

#[derive(Debug, Default, Deserialize)]
struct YearQuery {
    #[serde(default)]
    year: Option<i32>,
}

#[post("/auth/register")]
pub async fn register(auth: AuthenticatedUser, repo: web::Data<DieselRepository>) -> ApiResult {
    let user = auth_service::register_user(repo.get_ref(), &auth)?;
    log::info!("Registered user {} as {}", user.id, user.role);
    Ok(HttpResponse::Ok().json(user))
}

#[get("/auth/me")]
pub async fn me(session: Session) -> ApiResult {
    Ok(HttpResponse::Ok().json(session.user))
}

#[put("/auth/me")]
pub async fn update_me(
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateProfileForm>,
) -> ApiResult {
    let user = auth_service::update_me(repo.get_ref(), &session, form)?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/clients")]
pub async fn list_clients(session: Session, repo: web::Data<DieselRepository>) -> ApiResult {
    let clients = client_service::list_clients(repo.get_ref(), &session)?;
    Ok(HttpResponse::Ok().json(clients))
}

#[post("/clients")]
pub async fn create_client(
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AddClientForm>,
) -> ApiResult {
    let client = client_service::create_client(repo.get_ref(), &session, form)?;
    Ok(HttpResponse::Ok().json(client))
}

#[get("/clients/{client_id}")]
pub async fn get_client(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let client_id = ClientId::new(client_id.into_inner())?;
    let client = client_service::get_client(repo.get_ref(), &session, client_id)?;
    Ok(HttpResponse::Ok().json(client))
}

#[put("/clients/{client_id}")]
pub async fn update_client(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateClientForm>,
) -> ApiResult {
    let client_id = ClientId::new(client_id.into_inner())?;
    let client = client_service::update_client(repo.get_ref(), &session, client_id, form)?;
    Ok(HttpResponse::Ok().json(client))
}

#[delete("/clients/{client_id}")]
pub async fn delete_client(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalFileStorage>,
) -> ApiResult {
    let client_id = ClientId::new(client_id.into_inner())?;
    client_service::delete_client(repo.get_ref(), storage.get_ref(), &session, client_id)?;
    log::info!("Client {client_id} deleted by user {}", session.user.id);
    Ok(HttpResponse::Ok().json(MessageResponse::new("Müşteri silindi")))
}

#[post("/clients/{client_id}/folders")]
pub async fn create_client_folders(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let client_id = ClientId::new(client_id.into_inner())?;
    let created = client_service::ensure_folders(repo.get_ref(), &session, client_id)?;
    let message = if created == 0 {
        "Klasörler zaten mevcut"
    } else {
        "Klasörler oluşturuldu"
    };
    Ok(HttpResponse::Ok().json(FoldersCreated {
        message: message.to_string(),
        created,
    }))
}

#[get("/documents")]
pub async fn list_documents(session: Session, repo: web::Data<DieselRepository>) -> ApiResult {
    let documents = document_service::list_documents(repo.get_ref(), &session, None)?;
    Ok(HttpResponse::Ok().json(documents))
}

#[get("/documents/{client_id}")]
pub async fn list_client_documents(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let client_id = ClientId::new(client_id.into_inner())?;
    let documents = document_service::list_documents(repo.get_ref(), &session, Some(client_id))?;
    Ok(HttpResponse::Ok().json(documents))
}

#[post("/upload-document")]
pub async fn upload_document(
    session: Session,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalFileStorage>,
    server_config: web::Data<ServerConfig>,
    MultipartForm(form): MultipartForm<UploadDocumentForm>,
) -> ApiResult {
    let (upload, temp) = form.into_upload()?;
    let mut file = temp.file;
    file.seek(SeekFrom::Start(0))
        .map_err(|err| ServiceError::Internal(err.to_string()))?;

    let document = document_service::upload_document(
        repo.get_ref(),
        storage.get_ref(),
        &session,
        upload,
        &mut file,
        server_config.max_upload_size as u64,
    )?;
    log::info!(
        "Stored document {} ({} bytes) for client {}",
        document.id,
        document.file_size,
        document.client_id
    );

    Ok(HttpResponse::Ok().json(UploadResponse {
        message: "Belge yüklendi".to_string(),
        document_id: document.id,
        file_size: document.file_size,
    }))
}

/// `Content-Disposition` with an ASCII fallback name and the UTF-8 original.
fn content_disposition(inline: bool, filename: &str) -> ContentDisposition {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() && c != '"' { c } else { '_' })
        .collect();
    let mut parameters = vec![DispositionParam::Filename(fallback)];
    if !filename.is_ascii() {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: filename.as_bytes().to_vec(),
        }));
    }
    ContentDisposition {
        disposition: if inline {
            DispositionType::Inline
        } else {
            DispositionType::Attachment
        },
        parameters,
    }
}

#[get("/documents/{document_id}/download")]
pub async fn download_document(
    document_id: web::Path<i32>,
    query: web::Query<DownloadQuery>,
    session: Session,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalFileStorage>,
) -> ApiResult {
    let document_id = DocumentId::new(document_id.into_inner())?;
    let (document, bytes) =
        document_service::open_document(repo.get_ref(), storage.get_ref(), &session, document_id)?;

    // Unknown extensions resolve to application/octet-stream.
    let mime = actix_files::file_extension_to_mime(
        &file_extension(&document.original_filename).unwrap_or_default(),
    );

    Ok(HttpResponse::Ok()
        .content_type(mime)
        .insert_header(content_disposition(query.inline, &document.original_filename))
        .body(bytes))
}

#[delete("/documents/{document_id}")]
pub async fn delete_document(
    document_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalFileStorage>,
) -> ApiResult {
    let document_id = DocumentId::new(document_id.into_inner())?;
    document_service::delete_document(repo.get_ref(), storage.get_ref(), &session, document_id)?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Belge silindi")))
}

#[get("/carbon-reports/{client_id}")]
pub async fn carbon_reports(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let client_id = ClientId::new(client_id.into_inner())?;
    let reports = document_service::list_carbon_reports(repo.get_ref(), &session, client_id)?;
    Ok(HttpResponse::Ok().json(reports))
}

#[get("/folders")]
pub async fn list_folders(
    query: web::Query<ClientFilter>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let folders = document_service::list_folders(repo.get_ref(), &session, query.client_id()?)?;
    Ok(HttpResponse::Ok().json(folders))
}

#[get("/trainings")]
pub async fn list_trainings(session: Session, repo: web::Data<DieselRepository>) -> ApiResult {
    let trainings = training_service::list_trainings(repo.get_ref(), &session, None)?;
    Ok(HttpResponse::Ok().json(trainings))
}

#[get("/trainings/{client_id}")]
pub async fn list_client_trainings(
    client_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let client_id = ClientId::new(client_id.into_inner())?;
    let trainings = training_service::list_trainings(repo.get_ref(), &session, Some(client_id))?;
    Ok(HttpResponse::Ok().json(trainings))
}

#[post("/trainings")]
pub async fn create_training(
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AddTrainingForm>,
) -> ApiResult {
    let training = training_service::create_training(repo.get_ref(), &session, form)?;
    Ok(HttpResponse::Ok().json(training))
}

#[put("/trainings/{training_id}")]
pub async fn update_training(
    training_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateTrainingForm>,
) -> ApiResult {
    let training_id = TrainingId::new(training_id.into_inner())?;
    let training = training_service::update_training(repo.get_ref(), &session, training_id, form)?;
    Ok(HttpResponse::Ok().json(training))
}

#[get("/consumptions")]
pub async fn list_consumptions(
    query: web::Query<ConsumptionQuery>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let client_id = query.client_id.map(ClientId::new).transpose()?;
    let records =
        consumption_service::list_consumptions(repo.get_ref(), &session, query.year, client_id)?;
    Ok(HttpResponse::Ok().json(records))
}

#[get("/consumptions/analytics")]
pub async fn consumption_analytics(
    query: web::Query<ConsumptionQuery>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let client_id = query.client_id.map(ClientId::new).transpose()?;
    let analytics =
        consumption_service::consumption_analytics(repo.get_ref(), &session, query.year, client_id)?;
    Ok(HttpResponse::Ok().json(analytics))
}

#[post("/consumptions")]
pub async fn create_consumption(
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ConsumptionForm>,
) -> ApiResult {
    let record = consumption_service::create_consumption(repo.get_ref(), &session, form)?;
    Ok(HttpResponse::Ok().json(record))
}

#[put("/consumptions/{consumption_id}")]
pub async fn update_consumption(
    consumption_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ConsumptionForm>,
) -> ApiResult {
    let consumption_id = ConsumptionId::new(consumption_id.into_inner())?;
    let record =
        consumption_service::update_consumption(repo.get_ref(), &session, consumption_id, form)?;
    Ok(HttpResponse::Ok().json(record))
}

#[delete("/consumptions/{consumption_id}")]
pub async fn delete_consumption(
    consumption_id: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let consumption_id = ConsumptionId::new(consumption_id.into_inner())?;
    consumption_service::delete_consumption(repo.get_ref(), &session, consumption_id)?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Kayıt silindi")))
}

#[get("/analytics/monthly-trends")]
pub async fn monthly_trends(
    query: web::Query<YearQuery>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let trends = consumption_service::monthly_trends(repo.get_ref(), &session, query.year)?;
    Ok(HttpResponse::Ok().json(trends))
}

#[get("/stats")]
pub async fn stats(session: Session, repo: web::Data<DieselRepository>) -> ApiResult {
    let stats = main_service::load_stats(repo.get_ref(), &session)?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Registers every API handler; mounted under `/api` by [`crate::run`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(me)
        .service(update_me)
        .service(list_clients)
        .service(create_client)
        .service(get_client)
        .service(update_client)
        .service(delete_client)
        .service(create_client_folders)
        .service(list_documents)
        .service(list_client_documents)
        .service(upload_document)
        .service(download_document)
        .service(delete_document)
        .service(carbon_reports)
        .service(list_folders)
        .service(list_trainings)
        .service(list_client_trainings)
        .service(create_training)
        .service(update_training)
        .service(consumption_analytics)
        .service(list_consumptions)
        .service(create_consumption)
        .service(update_consumption)
        .service(delete_consumption)
        .service(monthly_trends)
        .service(stats);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_filenames_are_sent_verbatim() {
        let header = content_disposition(false, "rapor.pdf");
        assert_eq!(header.to_string(), "attachment; filename=\"rapor.pdf\"");
    }

    #[test]
    fn non_ascii_filenames_get_an_extended_parameter() {
        let header = content_disposition(true, "Karbon Ayak İzi.pdf");
        assert!(header.is_inline());
        assert_eq!(header.get_filename(), Some("Karbon Ayak _zi.pdf"));
        assert!(header.get_filename_ext().is_some());
    }
}
