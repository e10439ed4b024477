#![cfg(all(feature = "client", feature = "server"))]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use sustain_crm::api_client::{
    ApiClient, ApiError, ClientConfig, ClientUpdateRequest, DocumentUploadRequest,
};
use sustain_crm::domain::types::{ClientId, DocumentType, FolderId, Stage};

#[derive(Default)]
struct Stub {
    uploads: AtomicUsize,
    stats_calls: AtomicUsize,
    last_update: Mutex<Option<Value>>,
    last_auth: Mutex<Option<String>>,
}

fn client_json(stage: &str) -> Value {
    json!({
        "id": 1,
        "name": "Deniz Turizm",
        "hotel_name": "Deniz Otel",
        "contact_person": "Ayşe Yılmaz",
        "email": "info@denizotel.com",
        "phone": "+905321234567",
        "address": "Antalya",
        "current_stage": stage,
        "services_completed": [],
        "carbon_footprint": null,
        "sustainability_score": null,
        "created_at": "2024-01-01T00:00:00",
        "updated_at": "2024-01-01T00:00:00"
    })
}

async fn upload(stub: web::Data<Stub>, _body: web::Bytes) -> HttpResponse {
    let call = stub.uploads.fetch_add(1, Ordering::SeqCst) + 1;
    if call == 2 {
        return HttpResponse::BadRequest().json(json!({ "detail": "Desteklenmeyen dosya türü" }));
    }
    HttpResponse::Ok().json(json!({
        "message": "Belge yüklendi",
        "document_id": call,
        "file_size": 4
    }))
}

async fn update_client(stub: web::Data<Stub>, body: web::Json<Value>) -> HttpResponse {
    let stage = body["current_stage"].as_str().unwrap_or("Stage1").to_string();
    *stub.last_update.lock().unwrap() = Some(body.into_inner());
    HttpResponse::Ok().json(client_json(&stage))
}

async fn list_clients(stub: web::Data<Stub>, req: HttpRequest) -> HttpResponse {
    let auth = req
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    *stub.last_auth.lock().unwrap() = auth;
    HttpResponse::Ok().json(json!([client_json("Stage2")]))
}

async fn stats(stub: web::Data<Stub>) -> HttpResponse {
    if stub.stats_calls.fetch_add(1, Ordering::SeqCst) == 0 {
        return HttpResponse::Forbidden().json(json!({ "detail": "Forbidden" }));
    }
    HttpResponse::Ok().json(json!({
        "total_clients": 1,
        "stage_distribution": { "stage_1": 0, "stage_2": 1, "stage_3": 0 },
        "total_documents": 1,
        "total_trainings": 0
    }))
}

async fn expired() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "detail": "Unauthorized" }))
}

/// Starts the stub API on an ephemeral port and returns a client pointed at it.
async fn start_stub() -> (ApiClient, web::Data<Stub>) {
    let stub = web::Data::new(Stub::default());
    let data = stub.clone();
    let server = HttpServer::new(move || {
        App::new().app_data(data.clone()).service(
            web::scope("/api")
                .route("/upload-document", web::post().to(upload))
                .route("/clients", web::get().to(list_clients))
                .route("/clients/{id}", web::put().to(update_client))
                .route("/stats", web::get().to(stats))
                .route("/auth/me", web::get().to(expired)),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    let client = ApiClient::new(ClientConfig {
        base_url: format!("http://{addr}/api"),
        timeout: Duration::from_secs(5),
        reload_delay: Duration::from_millis(50),
        forbidden_retry_delay: Duration::from_millis(10),
    })
    .unwrap();
    client.set_token(Some("session-token".to_string())).await;
    (client, stub)
}

fn file(name: &str) -> DocumentUploadRequest {
    DocumentUploadRequest {
        client_id: ClientId::new(1).unwrap(),
        folder_id: Some(FolderId::new(5).unwrap()),
        document_name: name.to_string(),
        document_type: DocumentType::Tr1Criteria,
        stage: Stage::Stage1,
        filename: format!("{name}.pdf"),
        bytes: b"%PDF".to_vec(),
    }
}

#[actix_web::test]
async fn upload_batch_stops_at_the_first_failure() {
    let (client, stub) = start_stub().await;

    let report = client
        .upload_documents(vec![file("bir"), file("iki"), file("uc")])
        .await;

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded.len(), 1);
    let (index, err) = report.failed.as_ref().unwrap();
    assert_eq!(*index, 1);
    assert!(matches!(err, ApiError::Http { detail, .. } if detail == "Desteklenmeyen dosya türü"));
    assert!(!report.is_complete());
    assert_eq!(report.skipped(), 1);
    // The third file is never sent.
    assert_eq!(stub.uploads.load(Ordering::SeqCst), 2);
}

#[actix_web::test]
async fn stage_only_edit_sends_only_the_stage() {
    let (client, stub) = start_stub().await;

    let updated = client
        .update_client(
            ClientId::new(1).unwrap(),
            &ClientUpdateRequest::stage(Stage::Stage2),
        )
        .await
        .unwrap();
    assert_eq!(updated.current_stage, Stage::Stage2);
    assert_eq!(
        stub.last_update.lock().unwrap().clone(),
        Some(json!({ "current_stage": "Stage2" }))
    );

    let clients = client.list_clients().await.unwrap();
    assert_eq!(clients[0].current_stage, Stage::Stage2);
    assert_eq!(
        stub.last_auth.lock().unwrap().as_deref(),
        Some("Bearer session-token")
    );
}

#[actix_web::test]
async fn forbidden_stats_are_retried_once() {
    let (client, stub) = start_stub().await;

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.total_clients, 1);
    assert_eq!(stats.stage_distribution.stage_2, 1);
    assert_eq!(stub.stats_calls.load(Ordering::SeqCst), 2);
}

#[actix_web::test]
async fn expired_session_clears_the_token() {
    let (client, _stub) = start_stub().await;

    let err = client.me().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::SessionExpired { reload_after } if reload_after == Duration::from_millis(50)
    ));
    assert!(!client.has_token().await);

    // Lists degrade to empty once the token is gone.
    assert!(client.list_clients().await.unwrap().is_empty());
}
