use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::actions::question;
use crate::db::models::{
    CreateQuestionParams, DeleteQuestionParams, EditQuestionParams, PopulatedQuestion,
    QuestionDetail, QuestionVoteParams,
};
use crate::error::AppError;
use crate::state::AppState;

/// Parse a hex `ObjectId` from a path or body field.
pub fn parse_object_id(field: &str, raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw)
        .map_err(|_| AppError::BadRequest(format!("Invalid {field} '{raw}'")))
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Hex id of the authoring user.
    pub author: String,
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateQuestionResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct EditQuestionRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequestBody {
    /// Hex id of the voting user.
    pub user_id: String,
    #[serde(default)]
    pub has_upvoted: bool,
    #[serde(default)]
    pub has_downvoted: bool,
    #[serde(default = "default_path")]
    pub path: String,
}

impl VoteRequestBody {
    fn into_params(self, question_id: ObjectId) -> Result<QuestionVoteParams, AppError> {
        Ok(QuestionVoteParams {
            question_id,
            user_id: parse_object_id("user id", &self.user_id)?,
            has_upvoted: self.has_upvoted,
            has_downvoted: self.has_downvoted,
            path: self.path,
        })
    }
}

/// `GET /api/v1/questions`
pub async fn list_questions_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PopulatedQuestion>>, AppError> {
    let questions = question::get_questions(&state.repos).await?;
    Ok(Json(questions))
}

/// `GET /api/v1/questions/{id}`
pub async fn get_question_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuestionDetail>, AppError> {
    let question_id = parse_object_id("question id", &id)?;
    question::get_question_by_id(&state.repos, question_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Question '{}' not found", id)))
}

/// `POST /api/v1/questions`
pub async fn create_question_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<CreateQuestionResponse>), AppError> {
    let author = parse_object_id("author id", &request.author)?;

    let id = question::create_question(
        &state.repos,
        &state.revalidator,
        CreateQuestionParams {
            title: request.title,
            content: request.content,
            tags: request.tags,
            author,
            path: request.path,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateQuestionResponse { id: id.to_hex() }),
    ))
}

/// `PUT /api/v1/questions/{id}`
pub async fn edit_question_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<EditQuestionRequest>,
) -> Result<StatusCode, AppError> {
    let question_id = parse_object_id("question id", &id)?;
    question::edit_question(
        &state.repos,
        &state.revalidator,
        EditQuestionParams {
            question_id,
            title: request.title,
            content: request.content,
            path: request.path,
        },
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/questions/{id}?path=`
pub async fn delete_question_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PathQuery>,
) -> Result<StatusCode, AppError> {
    let question_id = parse_object_id("question id", &id)?;
    question::delete_question(
        &state.repos,
        &state.revalidator,
        DeleteQuestionParams {
            question_id,
            path: query.path,
        },
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/questions/{id}/upvote`
pub async fn upvote_question_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<VoteRequestBody>,
) -> Result<StatusCode, AppError> {
    let question_id = parse_object_id("question id", &id)?;
    let params = body.into_params(question_id)?;
    question::upvote_question(&state.repos, &state.revalidator, params).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/questions/{id}/downvote`
pub async fn downvote_question_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<VoteRequestBody>,
) -> Result<StatusCode, AppError> {
    let question_id = parse_object_id("question id", &id)?;
    let params = body.into_params(question_id)?;
    question::downvote_question(&state.repos, &state.revalidator, params).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id_accepts_hex() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id("question id", &id.to_hex()).unwrap(), id);
    }

    #[test]
    fn test_parse_object_id_rejects_garbage() {
        match parse_object_id("question id", "not-an-id") {
            Err(AppError::BadRequest(msg)) => {
                assert!(msg.contains("question id"));
                assert!(msg.contains("not-an-id"));
            }
            other => panic!("Expected BadRequest, got: {:?}", other),
        }
    }

    #[test]
    fn test_vote_body_defaults() {
        let body: VoteRequestBody =
            serde_json::from_str(r#"{"user_id":"65f1c0ffee0000000000abcd"}"#).unwrap();
        assert!(!body.has_upvoted);
        assert!(!body.has_downvoted);
        assert_eq!(body.path, "/");

        let question_id = ObjectId::new();
        let params = body.into_params(question_id).unwrap();
        assert_eq!(params.question_id, question_id);
        assert_eq!(params.user_id.to_hex(), "65f1c0ffee0000000000abcd");
    }

    #[test]
    fn test_vote_body_rejects_bad_user_id() {
        let body: VoteRequestBody = serde_json::from_str(r#"{"user_id":"nope"}"#).unwrap();
        assert!(matches!(
            body.into_params(ObjectId::new()),
            Err(AppError::BadRequest(_))
        ));
    }
}
