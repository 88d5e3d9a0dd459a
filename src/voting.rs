use async_trait::async_trait;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which kind of entity a vote is cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Question,
    Answer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteDirection {
    Up,
    Down,
}

/// A vote as seen by the voting collaborator.
///
/// `has_upvoted` / `has_downvoted` describe the voter's state before this
/// vote, as rendered to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub entity_id: ObjectId,
    pub user_id: ObjectId,
    pub has_upvoted: bool,
    pub has_downvoted: bool,
    pub entity_type: EntityType,
    pub direction: VoteDirection,
}

/// Records votes on questions and answers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRecorder: Send + Sync {
    async fn record_vote(&self, request: VoteRequest) -> Result<(), AppError>;
}

/// The update applied to the entity's vote arrays.
///
/// Voting again in the same direction withdraws the vote; voting in the
/// opposite direction moves it.
pub fn vote_update(request: &VoteRequest) -> bson::Document {
    use bson::doc;

    let user = request.user_id;
    match (request.direction, request.has_upvoted, request.has_downvoted) {
        (VoteDirection::Up, true, _) => doc! { "$pull": { "upvotes": user } },
        (VoteDirection::Up, false, true) => doc! {
            "$pull": { "downvotes": user },
            "$addToSet": { "upvotes": user },
        },
        (VoteDirection::Up, false, false) => doc! { "$addToSet": { "upvotes": user } },
        (VoteDirection::Down, _, true) => doc! { "$pull": { "downvotes": user } },
        (VoteDirection::Down, true, false) => doc! {
            "$pull": { "upvotes": user },
            "$addToSet": { "downvotes": user },
        },
        (VoteDirection::Down, false, false) => doc! { "$addToSet": { "downvotes": user } },
    }
}

/// MongoDB implementation of the VoteRecorder.
#[cfg(feature = "ssr")]
pub struct MongoVoteRecorder {
    connector: std::sync::Arc<crate::db::connection::MongoConnector>,
}

#[cfg(feature = "ssr")]
impl MongoVoteRecorder {
    pub fn new(connector: std::sync::Arc<crate::db::connection::MongoConnector>) -> Self {
        Self { connector }
    }
}

#[cfg(feature = "ssr")]
#[async_trait]
impl VoteRecorder for MongoVoteRecorder {
    async fn record_vote(&self, request: VoteRequest) -> Result<(), AppError> {
        use crate::db::models::{ANSWERS, QUESTIONS};
        use mongodb::bson::{doc, Document};

        let (collection, label) = match request.entity_type {
            EntityType::Question => (QUESTIONS, "Question"),
            EntityType::Answer => (ANSWERS, "Answer"),
        };

        let result = self
            .connector
            .database()
            .await?
            .collection::<Document>(collection)
            .update_one(doc! { "_id": request.entity_id }, vote_update(&request))
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "{} '{}' not found",
                label, request.entity_id
            )));
        }

        tracing::debug!(
            entity = %request.entity_id,
            direction = ?request.direction,
            "Vote recorded"
        );

        Ok(())
    }
}
