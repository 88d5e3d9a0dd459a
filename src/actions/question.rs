use bson::oid::ObjectId;

use crate::db::models::{
    CreateQuestionParams, DeleteQuestionParams, EditQuestionParams, PopulatedQuestion, Question,
    QuestionDetail, QuestionVoteParams,
};
use crate::db::store::Repositories;
use crate::error::AppError;
use crate::revalidate::Revalidator;
use crate::voting::{EntityType, VoteDirection, VoteRequest};

fn question_not_found(id: ObjectId) -> AppError {
    AppError::NotFound(format!("Question '{}' not found", id))
}

/// Every question, newest first, with tags and author resolved.
pub async fn get_questions(repos: &Repositories) -> Result<Vec<PopulatedQuestion>, AppError> {
    repos
        .questions
        .find_all_populated()
        .await
        .inspect_err(|e| tracing::error!("Failed to list questions: {e}"))
}

/// A single question, or `None` if it does not exist.
pub async fn get_question_by_id(
    repos: &Repositories,
    question_id: ObjectId,
) -> Result<Option<QuestionDetail>, AppError> {
    repos
        .questions
        .find_detail(question_id)
        .await
        .inspect_err(|e| tracing::error!(question = %question_id, "Failed to load question: {e}"))
}

/// Create a question and link it to its tags, creating tags on first use.
///
/// Steps:
/// 1. insert the untagged question
/// 2. find-or-create each tag in order, linking the question to it
/// 3. link the collected tags to the question in one update
///
/// If step 2 or 3 fails the question is removed again before the error is
/// returned, so callers never observe a half-tagged question.
pub async fn create_question(
    repos: &Repositories,
    revalidator: &Revalidator,
    params: CreateQuestionParams,
) -> Result<ObjectId, AppError> {
    let CreateQuestionParams {
        title,
        content,
        tags,
        author,
        path,
    } = params;

    let question = Question::new(title, content, author);
    let question_id = question.id;

    repos
        .questions
        .insert(question)
        .await
        .inspect_err(|e| tracing::error!("Failed to create question: {e}"))?;

    if let Err(e) = link_tags(repos, question_id, &tags).await {
        tracing::error!(question = %question_id, "Failed to link tags, rolling back: {e}");
        roll_back_creation(repos, question_id).await;
        return Err(e);
    }

    tracing::info!(question = %question_id, tags = tags.len(), "Question created");
    revalidator.revalidate(&path);

    Ok(question_id)
}

async fn link_tags(
    repos: &Repositories,
    question_id: ObjectId,
    names: &[String],
) -> Result<(), AppError> {
    let mut tag_ids: Vec<ObjectId> = Vec::with_capacity(names.len());

    for name in names {
        let tag = repos.tags.find_or_create(name, question_id).await?;
        if !tag_ids.contains(&tag.id) {
            tag_ids.push(tag.id);
        }
    }

    if !tag_ids.is_empty() {
        repos.questions.add_tags(question_id, &tag_ids).await?;
    }

    Ok(())
}

async fn roll_back_creation(repos: &Repositories, question_id: ObjectId) {
    if let Err(e) = repos.tags.unlink_question(question_id).await {
        tracing::warn!(question = %question_id, "Rollback could not unlink tags: {e}");
    }
    if let Err(e) = repos.questions.delete(question_id).await {
        tracing::warn!(question = %question_id, "Rollback could not delete question: {e}");
    }
}

/// Overwrite a question's title and content.
pub async fn edit_question(
    repos: &Repositories,
    revalidator: &Revalidator,
    params: EditQuestionParams,
) -> Result<(), AppError> {
    let id = params.question_id;

    async {
        repos
            .questions
            .find_by_id(id)
            .await?
            .ok_or_else(|| question_not_found(id))?;

        // Deleted between the lookup and the write.
        if !repos
            .questions
            .update_text(id, &params.title, &params.content)
            .await?
        {
            return Err(question_not_found(id));
        }

        Ok::<(), AppError>(())
    }
    .await
    .inspect_err(|e| tracing::error!(question = %id, "Failed to edit question: {e}"))?;

    revalidator.revalidate(&params.path);
    Ok(())
}

/// Delete a question together with its answers, interactions and tag links.
///
/// The steps are not transactional. Dependents are removed before the
/// question itself, so after a partial failure the question still exists and
/// repeating the call finishes the cascade.
pub async fn delete_question(
    repos: &Repositories,
    revalidator: &Revalidator,
    params: DeleteQuestionParams,
) -> Result<(), AppError> {
    let id = params.question_id;

    async {
        repos
            .questions
            .find_by_id(id)
            .await?
            .ok_or_else(|| question_not_found(id))?;

        let answers = repos.answers.delete_by_question(id).await?;
        let interactions = repos.interactions.delete_by_question(id).await?;
        let tags = repos.tags.unlink_question(id).await?;
        repos.questions.delete(id).await?;

        tracing::info!(
            question = %id,
            answers,
            interactions,
            tags,
            "Question deleted"
        );
        Ok::<(), AppError>(())
    }
    .await
    .inspect_err(|e| tracing::error!(question = %id, "Failed to delete question: {e}"))?;

    revalidator.revalidate(&params.path);
    Ok(())
}

pub async fn upvote_question(
    repos: &Repositories,
    revalidator: &Revalidator,
    params: QuestionVoteParams,
) -> Result<(), AppError> {
    vote_question(repos, revalidator, params, VoteDirection::Up).await
}

pub async fn downvote_question(
    repos: &Repositories,
    revalidator: &Revalidator,
    params: QuestionVoteParams,
) -> Result<(), AppError> {
    vote_question(repos, revalidator, params, VoteDirection::Down).await
}

async fn vote_question(
    repos: &Repositories,
    revalidator: &Revalidator,
    params: QuestionVoteParams,
    direction: VoteDirection,
) -> Result<(), AppError> {
    let request = VoteRequest {
        entity_id: params.question_id,
        user_id: params.user_id,
        has_upvoted: params.has_upvoted,
        has_downvoted: params.has_downvoted,
        entity_type: EntityType::Question,
        direction,
    };

    repos.votes.record_vote(request).await.inspect_err(|e| {
        tracing::error!(
            question = %params.question_id,
            ?direction,
            "Failed to record vote: {e}"
        )
    })?;

    revalidator.revalidate(&params.path);
    Ok(())
}
