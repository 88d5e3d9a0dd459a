use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::models::Tag;
use crate::error::AppError;

/// Repository trait for tag operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Atomically find the tag whose name matches `name` case-insensitively,
    /// creating it with that exact casing if absent, and link `question_id`
    /// to it. Linking the same question twice has no further effect.
    async fn find_or_create(&self, name: &str, question_id: ObjectId) -> Result<Tag, AppError>;

    /// Remove `question_id` from every tag's question list.
    /// Returns the number of tags modified.
    async fn unlink_question(&self, question_id: ObjectId) -> Result<u64, AppError>;
}

/// MongoDB implementation of the TagRepository.
///
/// Case-insensitive uniqueness is enforced by a unique index on `name` with a
/// strength-2 collation, which every name query here also uses.
#[cfg(feature = "ssr")]
pub struct MongoTagRepository {
    connector: std::sync::Arc<crate::db::connection::MongoConnector>,
}

#[cfg(feature = "ssr")]
fn case_insensitive() -> mongodb::options::Collation {
    use mongodb::options::{Collation, CollationStrength};

    Collation::builder()
        .locale("en".to_string())
        .strength(CollationStrength::Secondary)
        .build()
}

#[cfg(feature = "ssr")]
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    const DUPLICATE_KEY: i32 = 11000;
    match err.kind.as_ref() {
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

#[cfg(feature = "ssr")]
impl MongoTagRepository {
    pub fn new(connector: std::sync::Arc<crate::db::connection::MongoConnector>) -> Self {
        Self { connector }
    }

    async fn collection(&self) -> Result<mongodb::Collection<Tag>, AppError> {
        Ok(self
            .connector
            .database()
            .await?
            .collection(crate::db::models::TAGS))
    }
}

/// Create the case-insensitive unique index on `tags.name`.
///
/// Runs on every fresh connection; creating an existing index is a no-op.
#[cfg(feature = "ssr")]
pub async fn ensure_indexes(db: &mongodb::Database) -> Result<(), AppError> {
    use mongodb::bson::doc;
    use mongodb::options::IndexOptions;
    use mongodb::IndexModel;

    let index = IndexModel::builder()
        .keys(doc! { "name": 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .collation(case_insensitive())
                .build(),
        )
        .build();

    db.collection::<Tag>(crate::db::models::TAGS)
        .create_index(index)
        .await?;
    Ok(())
}

#[cfg(feature = "ssr")]
#[async_trait]
impl TagRepository for MongoTagRepository {
    async fn find_or_create(&self, name: &str, question_id: ObjectId) -> Result<Tag, AppError> {
        use chrono::Utc;
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let collection = self.collection().await?;

        // The equality on `name` is copied into the document on insert.
        let filter = doc! { "name": name };
        let update = doc! {
            "$setOnInsert": { "created_on": mongodb::bson::DateTime::from_chrono(Utc::now()) },
            "$addToSet": { "questions": question_id },
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .collation(case_insensitive())
            .build();

        let result = match collection
            .find_one_and_update(filter.clone(), update.clone())
            .with_options(options.clone())
            .await
        {
            // A concurrent upsert inserted the same name first; it now matches.
            Err(e) if is_duplicate_key(&e) => {
                tracing::debug!(tag = %name, "Tag upsert raced, retrying");
                collection
                    .find_one_and_update(filter, update)
                    .with_options(options)
                    .await?
            }
            other => other?,
        };

        result.ok_or_else(|| AppError::Database(format!("Upsert of tag '{}' returned nothing", name)))
    }

    async fn unlink_question(&self, question_id: ObjectId) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection()
            .await?
            .update_many(
                doc! { "questions": question_id },
                doc! { "$pull": { "questions": question_id } },
            )
            .await?;

        Ok(result.modified_count)
    }
}
