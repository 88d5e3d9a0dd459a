use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::models::{Answer, Page};
use crate::error::AppError;

/// Repository trait for answer operations.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Delete every answer to the given question. Returns how many were removed.
    async fn delete_by_question(&self, question_id: ObjectId) -> Result<u64, AppError>;

    async fn count_by_author(&self, author: ObjectId) -> Result<u64, AppError>;

    /// Answers by an author, newest first.
    async fn find_by_author(
        &self,
        author: ObjectId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Answer>, AppError>;
}

/// MongoDB implementation of the AnswerRepository.
#[cfg(feature = "ssr")]
pub struct MongoAnswerRepository {
    connector: std::sync::Arc<crate::db::connection::MongoConnector>,
}

#[cfg(feature = "ssr")]
impl MongoAnswerRepository {
    pub fn new(connector: std::sync::Arc<crate::db::connection::MongoConnector>) -> Self {
        Self { connector }
    }

    async fn collection(&self) -> Result<mongodb::Collection<Answer>, AppError> {
        Ok(self
            .connector
            .database()
            .await?
            .collection(crate::db::models::ANSWERS))
    }
}

#[cfg(feature = "ssr")]
#[async_trait]
impl AnswerRepository for MongoAnswerRepository {
    async fn delete_by_question(&self, question_id: ObjectId) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection()
            .await?
            .delete_many(doc! { "question": question_id })
            .await?;

        Ok(result.deleted_count)
    }

    async fn count_by_author(&self, author: ObjectId) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        Ok(self
            .collection()
            .await?
            .count_documents(doc! { "author": author })
            .await?)
    }

    async fn find_by_author(
        &self,
        author: ObjectId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Answer>, AppError> {
        use crate::db::models::page_offset;
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let collection = self.collection().await?;
        let skip = page_offset(page, page_size);
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1, "_id": -1 })
            .skip(skip)
            .limit(i64::try_from(page_size).unwrap_or(i64::MAX))
            .build();

        let answers: Vec<Answer> = collection
            .find(doc! { "author": author })
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        let total = collection.count_documents(doc! { "author": author }).await?;

        Ok(Page::new(answers, total, skip))
    }
}
