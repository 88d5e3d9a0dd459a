use std::sync::Arc;

use crate::db::answer_repository::AnswerRepository;
use crate::db::interaction_repository::InteractionRepository;
use crate::db::question_repository::QuestionRepository;
use crate::db::tag_repository::TagRepository;
use crate::db::user_repository::UserRepository;
use crate::voting::VoteRecorder;

/// Every collaborator the actions talk to, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub questions: Arc<dyn QuestionRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub interactions: Arc<dyn InteractionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub votes: Arc<dyn VoteRecorder>,
}

#[cfg(feature = "ssr")]
impl Repositories {
    /// MongoDB-backed repositories sharing one connector.
    pub fn mongo(connector: Arc<crate::db::connection::MongoConnector>) -> Self {
        use crate::db::answer_repository::MongoAnswerRepository;
        use crate::db::interaction_repository::MongoInteractionRepository;
        use crate::db::question_repository::MongoQuestionRepository;
        use crate::db::tag_repository::MongoTagRepository;
        use crate::db::user_repository::MongoUserRepository;
        use crate::voting::MongoVoteRecorder;

        Self {
            questions: Arc::new(MongoQuestionRepository::new(connector.clone())),
            tags: Arc::new(MongoTagRepository::new(connector.clone())),
            answers: Arc::new(MongoAnswerRepository::new(connector.clone())),
            interactions: Arc::new(MongoInteractionRepository::new(connector.clone())),
            users: Arc::new(MongoUserRepository::new(connector.clone())),
            votes: Arc::new(MongoVoteRecorder::new(connector)),
        }
    }
}
