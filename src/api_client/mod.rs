//! Typed async client for the portal REST API.
//!
//! Every request carries the bearer token, no-cache headers and the
//! configured timeout. A 401 clears the token and surfaces
//! [`ApiError::SessionExpired`]; the caller reloads the session instead of
//! retrying in place.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::domain::analytics::{ConsumptionAnalytics, MonthlyTrend};
use crate::domain::client::Client;
use crate::domain::consumption::Consumption;
use crate::domain::document::Document;
use crate::domain::folder::Folder;
use crate::domain::training::Training;
use crate::domain::types::{ClientId, ConsumptionId, DocumentId, TrainingId};
use crate::domain::user::User;
use crate::dto::api::{ErrorBody, FoldersCreated, MessageResponse, Stats, UploadResponse};

pub mod errors;
pub mod mounted;
pub mod requests;
pub mod upload;

pub use errors::{ApiError, ApiResult};
pub use mounted::Mounted;
pub use requests::{
    ClientUpdateRequest, ConsumptionRequest, DocumentUploadRequest, NewClientRequest,
    ProfileUpdateRequest, TrainingRequest, TrainingUpdateRequest,
};
pub use upload::UploadReport;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API scope, e.g. `http://localhost:8080/api`.
    pub base_url: String,
    pub timeout: Duration,
    /// Delay before the caller reloads after the session expired.
    pub reload_delay: Duration,
    /// Delay before the single retry of a forbidden stats request.
    pub forbidden_retry_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout: Duration::from_secs(30),
            reload_delay: Duration::from_secs(1),
            forbidden_retry_delay: Duration::from_millis(500),
        }
    }
}

/// Raw file returned by the download endpoint.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Stores the session token and upserts the local user record.
    pub async fn bootstrap(&self, token: impl Into<String>) -> ApiResult<User> {
        self.set_token(Some(token.into())).await;
        self.send_empty(Method::POST, "/auth/register").await
    }

    // auth

    pub async fn me(&self) -> ApiResult<User> {
        self.get_json("/auth/me", NO_QUERY).await
    }

    pub async fn update_me(&self, request: &ProfileUpdateRequest) -> ApiResult<User> {
        self.send_json(Method::PUT, "/auth/me", request).await
    }

    // clients

    pub async fn list_clients(&self) -> ApiResult<Vec<Client>> {
        self.get_list("/clients", NO_QUERY).await
    }

    pub async fn get_client(&self, client_id: ClientId) -> ApiResult<Client> {
        self.get_json(&format!("/clients/{client_id}"), NO_QUERY).await
    }

    pub async fn create_client(&self, request: &NewClientRequest) -> ApiResult<Client> {
        self.send_json(Method::POST, "/clients", request).await
    }

    pub async fn update_client(
        &self,
        client_id: ClientId,
        request: &ClientUpdateRequest,
    ) -> ApiResult<Client> {
        self.send_json(Method::PUT, &format!("/clients/{client_id}"), request)
            .await
    }

    pub async fn delete_client(&self, client_id: ClientId) -> ApiResult<MessageResponse> {
        self.send_empty(Method::DELETE, &format!("/clients/{client_id}"))
            .await
    }

    pub async fn create_client_folders(&self, client_id: ClientId) -> ApiResult<FoldersCreated> {
        self.send_empty(Method::POST, &format!("/clients/{client_id}/folders"))
            .await
    }

    // documents

    pub async fn list_documents(&self, client_id: Option<ClientId>) -> ApiResult<Vec<Document>> {
        match client_id {
            Some(client_id) => self.get_list(&format!("/documents/{client_id}"), NO_QUERY).await,
            None => self.get_list("/documents", NO_QUERY).await,
        }
    }

    pub async fn upload_document(&self, request: DocumentUploadRequest) -> ApiResult<UploadResponse> {
        let response = self
            .execute(Method::POST, "/upload-document", |builder| {
                builder.multipart(request.into_form())
            })
            .await?;
        decode(response).await
    }

    /// Uploads each file in its own request, stopping at the first failure.
    pub async fn upload_documents(&self, requests: Vec<DocumentUploadRequest>) -> UploadReport {
        let mut report = UploadReport::new(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let filename = request.filename.clone();
            match self.upload_document(request).await {
                Ok(uploaded) => report.succeeded.push(uploaded),
                Err(err) => {
                    log::warn!("Upload of {filename} failed: {err}");
                    report.failed = Some((index, err));
                    break;
                }
            }
        }
        report
    }

    pub async fn download_document(&self, document_id: DocumentId) -> ApiResult<DownloadedFile> {
        let response = self
            .execute(
                Method::GET,
                &format!("/documents/{document_id}/download"),
                |builder| builder,
            )
            .await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok(DownloadedFile {
            content_type,
            bytes,
        })
    }

    pub async fn delete_document(&self, document_id: DocumentId) -> ApiResult<MessageResponse> {
        self.send_empty(Method::DELETE, &format!("/documents/{document_id}"))
            .await
    }

    pub async fn carbon_reports(&self, client_id: ClientId) -> ApiResult<Vec<Document>> {
        self.get_list(&format!("/carbon-reports/{client_id}"), NO_QUERY).await
    }

    pub async fn list_folders(&self, client_id: Option<ClientId>) -> ApiResult<Vec<Folder>> {
        self.get_list("/folders", &ClientQuery { client_id }).await
    }

    // trainings

    pub async fn list_trainings(&self, client_id: Option<ClientId>) -> ApiResult<Vec<Training>> {
        match client_id {
            Some(client_id) => self.get_list(&format!("/trainings/{client_id}"), NO_QUERY).await,
            None => self.get_list("/trainings", NO_QUERY).await,
        }
    }

    pub async fn create_training(&self, request: &TrainingRequest) -> ApiResult<Training> {
        self.send_json(Method::POST, "/trainings", request).await
    }

    pub async fn update_training(
        &self,
        training_id: TrainingId,
        request: &TrainingUpdateRequest,
    ) -> ApiResult<Training> {
        self.send_json(Method::PUT, &format!("/trainings/{training_id}"), request)
            .await
    }

    // consumptions

    pub async fn list_consumptions(
        &self,
        year: Option<i32>,
        client_id: Option<ClientId>,
    ) -> ApiResult<Vec<Consumption>> {
        self.get_list("/consumptions", &PeriodQuery { year, client_id })
            .await
    }

    pub async fn create_consumption(&self, request: &ConsumptionRequest) -> ApiResult<Consumption> {
        self.send_json(Method::POST, "/consumptions", request).await
    }

    pub async fn update_consumption(
        &self,
        consumption_id: ConsumptionId,
        request: &ConsumptionRequest,
    ) -> ApiResult<Consumption> {
        self.send_json(Method::PUT, &format!("/consumptions/{consumption_id}"), request)
            .await
    }

    pub async fn delete_consumption(
        &self,
        consumption_id: ConsumptionId,
    ) -> ApiResult<MessageResponse> {
        self.send_empty(Method::DELETE, &format!("/consumptions/{consumption_id}"))
            .await
    }

    pub async fn consumption_analytics(
        &self,
        year: Option<i32>,
        client_id: Option<ClientId>,
    ) -> ApiResult<ConsumptionAnalytics> {
        self.get_json("/consumptions/analytics", &PeriodQuery { year, client_id })
            .await
    }

    pub async fn monthly_trends(&self, year: Option<i32>) -> ApiResult<Vec<MonthlyTrend>> {
        self.get_list(
            "/analytics/monthly-trends",
            &PeriodQuery {
                year,
                client_id: None,
            },
        )
        .await
    }

    /// Dashboard counters. A 403 is retried once after the configured delay.
    pub async fn stats(&self) -> ApiResult<Stats> {
        match self.get_json("/stats", NO_QUERY).await {
            Err(ApiError::Forbidden(detail)) => {
                log::debug!("Stats forbidden ({detail}), retrying once");
                tokio::time::sleep(self.config.forbidden_retry_delay).await;
                self.get_json("/stats", NO_QUERY).await
            }
            other => other,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Sends an authenticated request and maps error statuses.
    async fn execute<F>(&self, method: Method, path: &str, build: F) -> ApiResult<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or(ApiError::NotAuthenticated)?;
        let url = self.url(path);

        log::debug!("{method} {url}");
        let request = build(self.http.request(method.clone(), &url).bearer_auth(token));
        let response = request.send().await.map_err(|err| {
            log::warn!("{method} {url} failed: {err}");
            ApiError::from(err)
        })?;
        log::debug!("{method} {url} -> {}", response.status());

        self.check(response).await
    }

    async fn check(&self, response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.set_token(None).await;
            return Err(ApiError::SessionExpired {
                reload_after: self.config.reload_delay,
            });
        }

        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("İstek başarısız oldu")
                .to_string(),
        };
        if status == StatusCode::FORBIDDEN {
            Err(ApiError::Forbidden(detail))
        } else {
            Err(ApiError::Http { status, detail })
        }
    }

    async fn get_json<Q, T>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(Method::GET, path, |builder| builder.query(query))
            .await?;
        decode(response).await
    }

    /// Like [`Self::get_json`], but an unauthenticated client sees an empty list.
    async fn get_list<Q, T>(&self, path: &str, query: &Q) -> ApiResult<Vec<T>>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match self.get_json(path, query).await {
            Err(ApiError::NotAuthenticated) => Ok(Vec::new()),
            other => other,
        }
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(method, path, |builder| builder.json(body))
            .await?;
        decode(response).await
    }

    async fn send_empty<T: DeserializeOwned>(&self, method: Method, path: &str) -> ApiResult<T> {
        let response = self.execute(method, path, |builder| builder).await?;
        decode(response).await
    }
}

const NO_QUERY: &[(&str, &str)] = &[];

#[derive(Serialize)]
struct ClientQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<ClientId>,
}

#[derive(Serialize)]
struct PeriodQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<ClientId>,
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}
