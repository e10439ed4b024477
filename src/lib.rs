//! Client portal and CRM for a hotel sustainability-certification consultancy.

#[cfg(feature = "client")]
pub mod api_client;
#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod dto;
#[cfg(feature = "data")]
mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod identity;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod storage;

#[cfg(feature = "server")]
pub use server::{configure_shell, run};

#[cfg(feature = "server")]
mod server {
    use actix_cors::Cors;
    use actix_files::Files;
    use actix_identity::IdentityMiddleware;
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::cookie::Key;
    use actix_web::{App, HttpServer, middleware, web};
    use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
    use tera::Tera;

    use crate::db::establish_connection_pool;
    use crate::identity::TokenVerifier;
    use crate::middleware::RedirectUnauthorized;
    use crate::models::config::ServerConfig;
    use crate::repository::DieselRepository;
    use crate::routes::client::{
        add_client, create_folders, delete_client, save_client, show_client, show_clients,
    };
    use crate::routes::consumption::{
        add_consumption, delete_consumption, show_consumption, upload_consumption,
    };
    use crate::routes::document::{delete_document, show_documents, upload_document};
    use crate::routes::main::{
        complete_setup, create_session, logout, show_index, show_setup, skip_setup,
    };
    use crate::routes::training::{add_training, save_training, show_trainings};
    use crate::routes::api;
    use crate::storage::LocalFileStorage;

    /// Registers the server-rendered shell. Wrapped by [`RedirectUnauthorized`] in [`run`].
    pub fn configure_shell(cfg: &mut web::ServiceConfig) {
        cfg.service(show_index)
            .service(create_session)
            .service(logout)
            .service(show_setup)
            .service(complete_setup)
            .service(skip_setup)
            .service(show_clients)
            .service(add_client)
            .service(create_folders)
            .service(delete_client)
            .service(show_client)
            .service(save_client)
            .service(show_documents)
            .service(upload_document)
            .service(delete_document)
            .service(show_trainings)
            .service(add_training)
            .service(save_training)
            .service(show_consumption)
            .service(add_consumption)
            .service(upload_consumption)
            .service(delete_consumption);
    }

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        // Establish Diesel connection pool for the SQLite database.
        let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
            std::io::Error::other(format!("Failed to establish database connection: {e}"))
        })?;
        let repo = DieselRepository::new(pool);

        let verifier = TokenVerifier::from_config(&server_config.identity)
            .map_err(|e| std::io::Error::other(format!("Identity configuration error: {e}")))?;

        std::fs::create_dir_all(&server_config.storage_dir)?;
        let storage = LocalFileStorage::new(&server_config.storage_dir);
        log::info!("Storing uploads in {}", storage.root().display());

        // Keys and stores for identity, sessions, and flash messages.
        let secret_key = Key::from(server_config.secret.as_bytes());

        let message_store = CookieMessageStore::builder(secret_key.clone()).build();
        let message_framework = FlashMessagesFramework::builder(message_store).build();

        let tera = Tera::new(&server_config.templates_dir)
            .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

        let bind_address = (server_config.address.clone(), server_config.port);
        let upload_limit = server_config.max_upload_size;

        HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(message_framework.clone())
                .wrap(IdentityMiddleware::default())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                        .cookie_secure(false) // set to true in prod
                        .cookie_domain(Some(server_config.domain.clone()))
                        .build(),
                )
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .app_data(web::Data::new(tera.clone()))
                .app_data(web::Data::new(repo.clone()))
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(verifier.clone()))
                .app_data(web::Data::new(server_config.clone()))
                .app_data(
                    actix_multipart::form::MultipartFormConfig::default()
                        .total_limit(upload_limit.saturating_add(1024 * 1024)),
                )
                .service(Files::new("/assets", "./assets"))
                .service(web::scope("/api").configure(api::configure))
                .service(
                    web::scope("")
                        .wrap(RedirectUnauthorized::new(&server_config.identity.sign_in_url))
                        .configure(configure_shell),
                )
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
