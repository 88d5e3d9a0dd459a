use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::models::{Page, PopulatedQuestion, Question, QuestionDetail};
use crate::error::AppError;

/// Repository trait for question operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a new question as-is.
    async fn insert(&self, question: Question) -> Result<(), AppError>;

    /// Find a question by id without resolving relations.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Question>, AppError>;

    /// All questions, newest first, with tags and author resolved.
    async fn find_all_populated(&self) -> Result<Vec<PopulatedQuestion>, AppError>;

    /// One question with the summary projection of its tags and author.
    async fn find_detail(&self, id: ObjectId) -> Result<Option<QuestionDetail>, AppError>;

    /// Link tags to a question. Ids already linked are not added twice.
    async fn add_tags(&self, id: ObjectId, tag_ids: &[ObjectId]) -> Result<(), AppError>;

    /// Overwrite title and content. Returns `false` if no question matched.
    async fn update_text(&self, id: ObjectId, title: &str, content: &str)
        -> Result<bool, AppError>;

    /// Delete a question. Returns `false` if it did not exist.
    async fn delete(&self, id: ObjectId) -> Result<bool, AppError>;

    async fn count_by_author(&self, author: ObjectId) -> Result<u64, AppError>;

    /// Questions by an author, most viewed first.
    async fn find_by_author(
        &self,
        author: ObjectId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Question>, AppError>;
}

/// MongoDB implementation of the QuestionRepository.
///
/// This is only available when the `ssr` feature is enabled (i.e., server-side).
#[cfg(feature = "ssr")]
pub struct MongoQuestionRepository {
    connector: std::sync::Arc<crate::db::connection::MongoConnector>,
}

#[cfg(feature = "ssr")]
impl MongoQuestionRepository {
    pub fn new(connector: std::sync::Arc<crate::db::connection::MongoConnector>) -> Self {
        Self { connector }
    }

    async fn collection(&self) -> Result<mongodb::Collection<Question>, AppError> {
        Ok(self
            .connector
            .database()
            .await?
            .collection(crate::db::models::QUESTIONS))
    }

    async fn aggregate<T: serde::de::DeserializeOwned>(
        &self,
        pipeline: Vec<mongodb::bson::Document>,
    ) -> Result<Vec<T>, AppError> {
        use futures::TryStreamExt;

        let mut cursor = self.collection().await?.aggregate(pipeline).await?;

        let mut results = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            results.push(mongodb::bson::from_document(doc)?);
        }

        Ok(results)
    }
}

/// Stages replacing the `tags` id list with the tag documents, in the order
/// the ids were linked. Ids whose tag no longer exists are dropped.
#[cfg(feature = "ssr")]
fn lookup_tags_in_order(
    tag_pipeline: Vec<mongodb::bson::Document>,
) -> Vec<mongodb::bson::Document> {
    use crate::db::models::TAGS;
    use mongodb::bson::doc;

    vec![
        doc! { "$lookup": {
            "from": TAGS,
            "localField": "tags",
            "foreignField": "_id",
            "pipeline": tag_pipeline,
            "as": "tag_docs",
        } },
        doc! { "$addFields": { "tags": { "$filter": {
            "input": { "$map": {
                "input": { "$ifNull": ["$tags", []] },
                "as": "tag_id",
                "in": { "$arrayElemAt": [
                    { "$filter": {
                        "input": "$tag_docs",
                        "as": "tag",
                        "cond": { "$eq": ["$$tag._id", "$$tag_id"] },
                    } },
                    0,
                ] },
            } },
            "as": "tag",
            "cond": { "$eq": [{ "$type": "$$tag" }, "object"] },
        } } } },
        doc! { "$project": { "tag_docs": 0 } },
    ]
}

#[cfg(feature = "ssr")]
#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn insert(&self, question: Question) -> Result<(), AppError> {
        self.collection().await?.insert_one(&question).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Question>, AppError> {
        use mongodb::bson::doc;

        Ok(self.collection().await?.find_one(doc! { "_id": id }).await?)
    }

    async fn find_all_populated(&self) -> Result<Vec<PopulatedQuestion>, AppError> {
        use crate::db::models::USERS;
        use mongodb::bson::doc;

        let mut pipeline = vec![doc! { "$sort": { "created_at": -1, "_id": -1 } }];
        pipeline.extend(lookup_tags_in_order(vec![]));
        pipeline.extend([
            doc! { "$lookup": {
                "from": USERS,
                "localField": "author",
                "foreignField": "_id",
                "as": "author",
            } },
            // An empty lookup drops the field, which deserializes as `None`.
            doc! { "$unwind": { "path": "$author", "preserveNullAndEmptyArrays": true } },
        ]);

        self.aggregate(pipeline).await
    }

    async fn find_detail(&self, id: ObjectId) -> Result<Option<QuestionDetail>, AppError> {
        use crate::db::models::USERS;
        use mongodb::bson::doc;

        let mut pipeline = vec![doc! { "$match": { "_id": id } }];
        pipeline.extend(lookup_tags_in_order(vec![doc! { "$project": { "name": 1 } }]));
        pipeline.extend([
            doc! { "$lookup": {
                "from": USERS,
                "localField": "author",
                "foreignField": "_id",
                "pipeline": [ { "$project": { "name": 1, "picture": 1, "clerk_id": 1 } } ],
                "as": "author",
            } },
            doc! { "$unwind": { "path": "$author", "preserveNullAndEmptyArrays": true } },
        ]);

        Ok(self.aggregate(pipeline).await?.into_iter().next())
    }

    async fn add_tags(&self, id: ObjectId, tag_ids: &[ObjectId]) -> Result<(), AppError> {
        use mongodb::bson::doc;

        self.collection()
            .await?
            .update_one(
                doc! { "_id": id },
                doc! { "$addToSet": { "tags": { "$each": tag_ids.to_vec() } } },
            )
            .await?;

        Ok(())
    }

    async fn update_text(
        &self,
        id: ObjectId,
        title: &str,
        content: &str,
    ) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection()
            .await?
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "title": title, "content": content } },
            )
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection()
            .await?
            .delete_one(doc! { "_id": id })
            .await?;

        Ok(result.deleted_count > 0)
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
    ) -> Result<Page<Question>, AppError> {
        use crate::db::models::page_offset;
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let collection = self.collection().await?;
        let skip = page_offset(page, page_size);
        let options = FindOptions::builder()
            .sort(doc! { "views": -1, "created_at": -1, "_id": -1 })
            .skip(skip)
            .limit(i64::try_from(page_size).unwrap_or(i64::MAX))
            .build();

        let questions: Vec<Question> = collection
            .find(doc! { "author": author })
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        let total = collection.count_documents(doc! { "author": author }).await?;

        Ok(Page::new(questions, total, skip))
    }
}
