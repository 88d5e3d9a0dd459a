use bson::oid::ObjectId;

use crate::db::models::{Answer, Page, Question, UserInfo};
use crate::db::store::Repositories;
use crate::error::AppError;

/// Profile aggregate for the user with the given external identity id.
pub async fn get_user_info(repos: &Repositories, clerk_id: &str) -> Result<UserInfo, AppError> {
    async {
        let user = repos
            .users
            .find_by_clerk_id(clerk_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", clerk_id)))?;

        let total_questions = repos.questions.count_by_author(user.id).await?;
        let total_answers = repos.answers.count_by_author(user.id).await?;

        Ok::<_, AppError>(UserInfo {
            user,
            total_questions,
            total_answers,
        })
    }
    .await
    .inspect_err(|e| tracing::error!(user = %clerk_id, "Failed to load user info: {e}"))
}

/// One page of the questions a user has asked.
pub async fn get_user_questions(
    repos: &Repositories,
    author: ObjectId,
    page: u64,
    page_size: u64,
) -> Result<Page<Question>, AppError> {
    repos
        .questions
        .find_by_author(author, page.max(1), page_size)
        .await
        .inspect_err(|e| tracing::error!(user = %author, "Failed to list user questions: {e}"))
}

/// One page of the answers a user has written.
pub async fn get_user_answers(
    repos: &Repositories,
    author: ObjectId,
    page: u64,
    page_size: u64,
) -> Result<Page<Answer>, AppError> {
    repos
        .answers
        .find_by_author(author, page.max(1), page_size)
        .await
        .inspect_err(|e| tracing::error!(user = %author, "Failed to list user answers: {e}"))
}
