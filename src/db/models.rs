use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime as bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const QUESTIONS: &str = "questions";
pub const TAGS: &str = "tags";
pub const USERS: &str = "users";
pub const ANSWERS: &str = "answers";
pub const INTERACTIONS: &str = "interactions";

/// A question stored in the `questions` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    /// Tags linked to this question. Filled in after tag resolution.
    #[serde(default)]
    pub tags: Vec<ObjectId>,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub upvotes: Vec<ObjectId>,
    #[serde(default)]
    pub downvotes: Vec<ObjectId>,
    pub author: ObjectId,
    #[serde(default)]
    pub answers: Vec<ObjectId>,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// A fresh, untagged question with a newly generated id.
    pub fn new(title: String, content: String, author: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            title,
            content,
            tags: vec![],
            views: 0,
            upvotes: vec![],
            downvotes: vec![],
            author,
            answers: vec![],
            created_at: Utc::now(),
        }
    }
}

/// A tag stored in the `tags` collection.
///
/// Names are unique case-insensitively; the stored casing is the one used by
/// the first question that introduced the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<ObjectId>,
    #[serde(default)]
    pub followers: Vec<ObjectId>,
    #[serde(with = "bson_datetime")]
    pub created_on: DateTime<Utc>,
}

/// A user profile stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Identifier issued by the external identity provider.
    pub clerk_id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    pub picture: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub portfolio_website: Option<String>,
    #[serde(default)]
    pub reputation: i64,
    #[serde(default)]
    pub saved: Vec<ObjectId>,
    #[serde(with = "bson_datetime")]
    pub joined_at: DateTime<Utc>,
}

/// An answer stored in the `answers` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub author: ObjectId,
    pub question: ObjectId,
    pub content: String,
    #[serde(default)]
    pub upvotes: Vec<ObjectId>,
    #[serde(default)]
    pub downvotes: Vec<ObjectId>,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// A user interaction (view, ask, answer...) stored in `interactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: ObjectId,
    pub action: String,
    #[serde(default)]
    pub question: Option<ObjectId>,
    #[serde(default)]
    pub answer: Option<ObjectId>,
    #[serde(default)]
    pub tags: Vec<ObjectId>,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// A question with its tags and author resolved to full documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulatedQuestion {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// `None` when the author document no longer exists.
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub upvotes: Vec<ObjectId>,
    #[serde(default)]
    pub downvotes: Vec<ObjectId>,
    #[serde(default)]
    pub answers: Vec<ObjectId>,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSummary {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub picture: String,
    pub clerk_id: String,
}

/// A single question with a reduced projection of its tags and author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDetail {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<TagSummary>,
    #[serde(default)]
    pub author: Option<AuthorSummary>,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub upvotes: Vec<ObjectId>,
    #[serde(default)]
    pub downvotes: Vec<ObjectId>,
    #[serde(default)]
    pub answers: Vec<ObjectId>,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Profile aggregate: the user plus how much they have posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user: User,
    pub total_questions: u64,
    pub total_answers: u64,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Whether a further page exists.
    pub is_next: bool,
}

impl<T> Page<T> {
    /// Build a page given the total number of matching items and the offset
    /// the items were fetched from.
    pub fn new(items: Vec<T>, total: u64, skip: u64) -> Self {
        let is_next = total > skip.saturating_add(items.len() as u64);
        Self { items, is_next }
    }
}

/// Number of documents to skip for a 1-based page number.
///
/// Saturates at `i64::MAX`, the largest skip the store accepts; a page that
/// far out is simply empty.
pub fn page_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1)
        .saturating_mul(page_size)
        .min(i64::MAX as u64)
}

/// Parameters of the create-question action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestionParams {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: ObjectId,
    /// Logical path whose cached rendering is stale after the change.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditQuestionParams {
    pub question_id: ObjectId,
    pub title: String,
    pub content: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteQuestionParams {
    pub question_id: ObjectId,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionVoteParams {
    pub question_id: ObjectId,
    pub user_id: ObjectId,
    #[serde(default)]
    pub has_upvoted: bool,
    #[serde(default)]
    pub has_downvoted: bool,
    pub path: String,
}
