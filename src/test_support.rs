//! In-memory repositories shared by the unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;

use crate::db::answer_repository::AnswerRepository;
use crate::db::interaction_repository::InteractionRepository;
use crate::db::models::{
    page_offset, Answer, AuthorSummary, Interaction, Page, PopulatedQuestion, Question,
    QuestionDetail, Tag, TagSummary, User,
};
use crate::db::question_repository::QuestionRepository;
use crate::db::store::Repositories;
use crate::db::tag_repository::TagRepository;
use crate::db::user_repository::UserRepository;
use crate::error::AppError;
use crate::voting::{MockVoteRecorder, VoteRecorder};

#[derive(Default)]
pub struct StoreState {
    pub questions: Vec<Question>,
    pub tags: Vec<Tag>,
    pub users: Vec<User>,
    pub answers: Vec<Answer>,
    pub interactions: Vec<Interaction>,
}

#[derive(Default)]
pub struct InMemoryStore {
    pub state: Mutex<StoreState>,
    /// `find_or_create` fails for this tag name.
    pub failing_tag: Mutex<Option<String>>,
    /// `InteractionRepository::delete_by_question` fails while set.
    pub fail_interaction_delete: AtomicBool,
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn repositories(self: &Arc<Self>, votes: Arc<dyn VoteRecorder>) -> Repositories {
        Repositories {
            questions: self.clone(),
            tags: self.clone(),
            answers: self.clone(),
            interactions: self.clone(),
            users: self.clone(),
            votes,
        }
    }

    /// Repositories whose vote recorder panics if called.
    pub fn repositories_without_votes(self: &Arc<Self>) -> Repositories {
        self.repositories(Arc::new(MockVoteRecorder::new()))
    }

    pub fn question(&self, id: ObjectId) -> Option<Question> {
        self.state
            .lock()
            .unwrap()
            .questions
            .iter()
            .find(|q| q.id == id)
            .cloned()
    }

    pub fn tags_named(&self, name: &str) -> Vec<Tag> {
        self.state
            .lock()
            .unwrap()
            .tags
            .iter()
            .filter(|t| same_name(&t.name, name))
            .cloned()
            .collect()
    }

    pub fn add_user(&self, clerk_id: &str, name: &str) -> User {
        let user = User {
            id: ObjectId::new(),
            clerk_id: clerk_id.to_string(),
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@example.com", name.to_lowercase()),
            bio: None,
            picture: format!("https://img.example.com/{clerk_id}.png"),
            location: None,
            portfolio_website: None,
            reputation: 0,
            saved: vec![],
            joined_at: Utc::now(),
        };
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_answer(&self, question: ObjectId, author: ObjectId) -> Answer {
        let answer = Answer {
            id: ObjectId::new(),
            author,
            question,
            content: "An answer".to_string(),
            upvotes: vec![],
            downvotes: vec![],
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().answers.push(answer.clone());
        answer
    }

    pub fn add_interaction(&self, question: ObjectId, user: ObjectId) -> Interaction {
        let interaction = Interaction {
            id: ObjectId::new(),
            user,
            action: "view".to_string(),
            question: Some(question),
            answer: None,
            tags: vec![],
            created_at: Utc::now(),
        };
        self.state
            .lock()
            .unwrap()
            .interactions
            .push(interaction.clone());
        interaction
    }
}

#[async_trait]
impl QuestionRepository for InMemoryStore {
    async fn insert(&self, question: Question) -> Result<(), AppError> {
        self.state.lock().unwrap().questions.push(question);
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Question>, AppError> {
        Ok(self.question(id))
    }

    async fn find_all_populated(&self) -> Result<Vec<PopulatedQuestion>, AppError> {
        let state = self.state.lock().unwrap();
        let mut questions = state.questions.clone();
        questions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(questions
            .into_iter()
            .map(|q| PopulatedQuestion {
                id: q.id,
                title: q.title,
                content: q.content,
                tags: state
                    .tags
                    .iter()
                    .filter(|t| q.tags.contains(&t.id))
                    .cloned()
                    .collect(),
                author: state.users.iter().find(|u| u.id == q.author).cloned(),
                views: q.views,
                upvotes: q.upvotes,
                downvotes: q.downvotes,
                answers: q.answers,
                created_at: q.created_at,
            })
            .collect())
    }

    async fn find_detail(&self, id: ObjectId) -> Result<Option<QuestionDetail>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.questions.iter().find(|q| q.id == id).map(|q| QuestionDetail {
            id: q.id,
            title: q.title.clone(),
            content: q.content.clone(),
            tags: state
                .tags
                .iter()
                .filter(|t| q.tags.contains(&t.id))
                .map(|t| TagSummary {
                    id: t.id,
                    name: t.name.clone(),
                })
                .collect(),
            author: state
                .users
                .iter()
                .find(|u| u.id == q.author)
                .map(|u| AuthorSummary {
                    id: u.id,
                    name: u.name.clone(),
                    picture: u.picture.clone(),
                    clerk_id: u.clerk_id.clone(),
                }),
            views: q.views,
            upvotes: q.upvotes.clone(),
            downvotes: q.downvotes.clone(),
            answers: q.answers.clone(),
            created_at: q.created_at,
        }))
    }

    async fn add_tags(&self, id: ObjectId, tag_ids: &[ObjectId]) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        if let Some(q) = state.questions.iter_mut().find(|q| q.id == id) {
            for tag_id in tag_ids {
                if !q.tags.contains(tag_id) {
                    q.tags.push(*tag_id);
                }
            }
        }
        Ok(())
    }

    async fn update_text(
        &self,
        id: ObjectId,
        title: &str,
        content: &str,
    ) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        match state.questions.iter_mut().find(|q| q.id == id) {
            Some(q) => {
                q.title = title.to_string();
                q.content = content.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.questions.len();
        state.questions.retain(|q| q.id != id);
        Ok(state.questions.len() < before)
    }

    async fn count_by_author(&self, author: ObjectId) -> Result<u64, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .questions
            .iter()
            .filter(|q| q.author == author)
            .count() as u64)
    }

    async fn find_by_author(
        &self,
        author: ObjectId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Question>, AppError> {
        let mut questions: Vec<Question> = self
            .state
            .lock()
            .unwrap()
            .questions
            .iter()
            .filter(|q| q.author == author)
            .cloned()
            .collect();
        questions.sort_by(|a, b| {
            b.views
                .cmp(&a.views)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total = questions.len() as u64;
        let skip = page_offset(page, page_size);
        let items = questions
            .into_iter()
            .skip(skip as usize)
            .take(page_size as usize)
            .collect();
        Ok(Page::new(items, total, skip))
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_or_create(&self, name: &str, question_id: ObjectId) -> Result<Tag, AppError> {
        if self.failing_tag.lock().unwrap().as_deref() == Some(name) {
            return Err(AppError::Database(format!("cannot upsert tag '{name}'")));
        }

        let mut state = self.state.lock().unwrap();
        let index = match state.tags.iter().position(|t| same_name(&t.name, name)) {
            Some(index) => index,
            None => {
                state.tags.push(Tag {
                    id: ObjectId::new(),
                    name: name.to_string(),
                    description: None,
                    questions: vec![],
                    followers: vec![],
                    created_on: Utc::now(),
                });
                state.tags.len() - 1
            }
        };

        let tag = &mut state.tags[index];
        if !tag.questions.contains(&question_id) {
            tag.questions.push(question_id);
        }
        Ok(tag.clone())
    }

    async fn unlink_question(&self, question_id: ObjectId) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        let mut modified = 0;
        for tag in state.tags.iter_mut() {
            if tag.questions.contains(&question_id) {
                tag.questions.retain(|q| *q != question_id);
                modified += 1;
            }
        }
        Ok(modified)
    }
}

#[async_trait]
impl AnswerRepository for InMemoryStore {
    async fn delete_by_question(&self, question_id: ObjectId) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.answers.len();
        state.answers.retain(|a| a.question != question_id);
        Ok((before - state.answers.len()) as u64)
    }

    async fn count_by_author(&self, author: ObjectId) -> Result<u64, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .answers
            .iter()
            .filter(|a| a.author == author)
            .count() as u64)
    }

    async fn find_by_author(
        &self,
        author: ObjectId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Answer>, AppError> {
        let mut answers: Vec<Answer> = self
            .state
            .lock()
            .unwrap()
            .answers
            .iter()
            .filter(|a| a.author == author)
            .cloned()
            .collect();
        answers.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = answers.len() as u64;
        let skip = page_offset(page, page_size);
        let items = answers
            .into_iter()
            .skip(skip as usize)
            .take(page_size as usize)
            .collect();
        Ok(Page::new(items, total, skip))
    }
}

#[async_trait]
impl InteractionRepository for InMemoryStore {
    async fn delete_by_question(&self, question_id: ObjectId) -> Result<u64, AppError> {
        if self.fail_interaction_delete.load(Ordering::SeqCst) {
            return Err(AppError::Database("interactions unavailable".into()));
        }

        let mut state = self.state.lock().unwrap();
        let before = state.interactions.len();
        state
            .interactions
            .retain(|i| i.question != Some(question_id));
        Ok((before - state.interactions.len()) as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_clerk_id(&self, clerk_id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.clerk_id == clerk_id)
            .cloned())
    }
}
