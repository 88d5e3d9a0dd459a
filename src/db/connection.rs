use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::error::AppError;

/// Where the document store lives.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Connection string. When `None` the connector never connects and every
    /// data operation fails with `ConnectionUnavailable`.
    pub url: Option<String>,
    /// Database name within the deployment.
    pub database: String,
}

/// Opens a connection handle to the store.
///
/// Abstracted as a trait so the memoization in [`Connector`] can be tested
/// without a running server.
#[async_trait]
pub trait Dialer: Send + Sync {
    type Handle: Clone + Send + Sync + 'static;

    async fn dial(&self, url: &str, database: &str) -> Result<Self::Handle, AppError>;

    /// Runs once on a freshly dialed handle before it is published. A failure
    /// discards the handle so the next `connect` dials again.
    async fn prepare(&self, _handle: &Self::Handle) -> Result<(), AppError> {
        Ok(())
    }
}

/// Owns the single, lazily established connection handle.
///
/// `connect` is idempotent: the first successful call dials, every later call
/// (including concurrent ones racing the first) reuses the same handle.
pub struct Connector<D: Dialer> {
    dialer: D,
    settings: DatabaseSettings,
    handle: OnceCell<D::Handle>,
}

impl<D: Dialer> Connector<D> {
    pub fn with_dialer(dialer: D, settings: DatabaseSettings) -> Self {
        if settings.url.is_none() {
            tracing::warn!("Missing MONGODB_URL, database operations are unavailable");
        }
        Self {
            dialer,
            settings,
            handle: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }

    /// Establish the connection if it is not already established.
    ///
    /// A missing URL is not an error here: the connector stays disconnected
    /// and the warning was already logged at construction. A failed dial or
    /// prepare step is returned and retried on the next call.
    pub async fn connect(&self) -> Result<(), AppError> {
        let Some(url) = self.settings.url.as_deref() else {
            tracing::debug!("No MONGODB_URL configured, skipping connect");
            return Ok(());
        };

        self.handle
            .get_or_try_init(|| async {
                let handle = self.dialer.dial(url, &self.settings.database).await?;
                self.dialer.prepare(&handle).await?;
                tracing::info!(
                    database = %self.settings.database,
                    "Connected to MongoDB at {}",
                    redact_credentials(url)
                );
                Ok::<_, AppError>(handle)
            })
            .await
            .inspect_err(|e| tracing::error!("MongoDB connection failed: {e}"))?;

        Ok(())
    }

    /// The connected handle, connecting first if needed.
    pub async fn database(&self) -> Result<D::Handle, AppError> {
        self.connect().await?;
        self.handle
            .get()
            .cloned()
            .ok_or_else(|| AppError::ConnectionUnavailable("MONGODB_URL is not set".into()))
    }
}

/// Strip user info from a connection string so it can be logged.
pub fn redact_credentials(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() || !parsed.username().is_empty() {
                let _ = parsed.set_username("");
                let _ = parsed.set_password(None);
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}

/// Dials MongoDB and pings the target database.
pub struct MongoDialer;

#[async_trait]
impl Dialer for MongoDialer {
    type Handle = mongodb::Database;

    async fn dial(&self, url: &str, database: &str) -> Result<mongodb::Database, AppError> {
        use mongodb::bson::doc;

        let client = mongodb::Client::with_uri_str(url)
            .await
            .map_err(|e| AppError::ConnectionUnavailable(e.to_string()))?;
        let db = client.database(database);

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::ConnectionUnavailable(e.to_string()))?;

        Ok(db)
    }

    /// Create the indexes the data layer relies on.
    async fn prepare(&self, db: &mongodb::Database) -> Result<(), AppError> {
        crate::db::tag_repository::ensure_indexes(db).await
    }
}

pub type MongoConnector = Connector<MongoDialer>;

impl Connector<MongoDialer> {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self::with_dialer(MongoDialer, settings)
    }
}
