use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::error::AppError;

/// Repository trait for interaction records.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Delete every interaction that references the given question.
    async fn delete_by_question(&self, question_id: ObjectId) -> Result<u64, AppError>;
}

/// MongoDB implementation of the InteractionRepository.
#[cfg(feature = "ssr")]
pub struct MongoInteractionRepository {
    connector: std::sync::Arc<crate::db::connection::MongoConnector>,
}

#[cfg(feature = "ssr")]
impl MongoInteractionRepository {
    pub fn new(connector: std::sync::Arc<crate::db::connection::MongoConnector>) -> Self {
        Self { connector }
    }
}

#[cfg(feature = "ssr")]
#[async_trait]
impl InteractionRepository for MongoInteractionRepository {
    async fn delete_by_question(&self, question_id: ObjectId) -> Result<u64, AppError> {
        use crate::db::models::{Interaction, INTERACTIONS};
        use mongodb::bson::doc;

        let result = self
            .connector
            .database()
            .await?
            .collection::<Interaction>(INTERACTIONS)
            .delete_many(doc! { "question": question_id })
            .await?;

        Ok(result.deleted_count)
    }
}
