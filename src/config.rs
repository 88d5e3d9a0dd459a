use serde::Deserialize;

use crate::db::connection::DatabaseSettings;
use crate::error::AppError;

fn default_database() -> String {
    "stackOverflow".to_string()
}

fn default_identity_header() -> String {
    "x-user-id".to_string()
}

fn default_page_size() -> u64 {
    10
}

/// Server configuration, read from environment variables.
///
/// - `MONGODB_URL`: connection string; when absent the server starts but
///   every data operation fails with a connection error
/// - `MONGODB_DATABASE`: database name (default `stackOverflow`)
/// - `IDENTITY_HEADER`: request header carrying the viewer's identity id
///   (default `x-user-id`)
/// - `PAGE_SIZE`: items per profile list page (default 10)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mongodb_url: Option<String>,
    #[serde(default = "default_database")]
    pub mongodb_database: String,
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mongodb_url: None,
            mongodb_database: default_database(),
            identity_header: default_identity_header(),
            page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from the process environment.
    pub fn load() -> Result<Self, AppError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(environment.try_parsing(true))
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        if app_config.page_size == 0 {
            return Err(AppError::Config("PAGE_SIZE must be at least 1".into()));
        }
        if app_config
            .mongodb_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            app_config.mongodb_url = None;
        }

        Ok(app_config)
    }

    pub fn database_settings(&self) -> DatabaseSettings {
        DatabaseSettings {
            url: self.mongodb_url.clone(),
            database: self.mongodb_database.clone(),
        }
    }
}
