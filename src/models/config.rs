//! Configuration model loaded from external sources.

use std::env;

use config::Config;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Identity provider settings used to verify bearer tokens.
pub struct IdentityConfig {
    /// Page the browser is sent to when it has no valid session.
    pub sign_in_url: String,
    /// Shared HS256 secret.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// PEM encoded RS256 public key; takes precedence over `jwt_secret`.
    #[serde(default)]
    pub jwt_public_key_pem: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    pub secret: String,
    /// Directory holding uploaded document blobs.
    pub storage_dir: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: usize,
    pub identity: IdentityConfig,
}

impl ServerConfig {
    /// Loads `config/default.yaml`, the `APP_ENV` profile (default `local`)
    /// and `APP_*` environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}
