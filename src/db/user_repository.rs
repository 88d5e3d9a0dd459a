use async_trait::async_trait;

use crate::db::models::User;
use crate::error::AppError;

/// Repository trait for user profiles. Users are read-only here.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by the id issued by the external identity provider.
    async fn find_by_clerk_id(&self, clerk_id: &str) -> Result<Option<User>, AppError>;
}

/// MongoDB implementation of the UserRepository.
#[cfg(feature = "ssr")]
pub struct MongoUserRepository {
    connector: std::sync::Arc<crate::db::connection::MongoConnector>,
}

#[cfg(feature = "ssr")]
impl MongoUserRepository {
    pub fn new(connector: std::sync::Arc<crate::db::connection::MongoConnector>) -> Self {
        Self { connector }
    }
}

#[cfg(feature = "ssr")]
#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_clerk_id(&self, clerk_id: &str) -> Result<Option<User>, AppError> {
        use crate::db::models::USERS;
        use mongodb::bson::doc;

        Ok(self
            .connector
            .database()
            .await?
            .collection::<User>(USERS)
            .find_one(doc! { "clerk_id": clerk_id })
            .await?)
    }
}
