use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::actions::user;
use crate::db::models::{Answer, Page, Question, User, UserInfo};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

impl PageQuery {
    fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }
}

async fn resolve_user(state: &AppState, clerk_id: &str) -> Result<User, AppError> {
    state
        .repos
        .users
        .find_by_clerk_id(clerk_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", clerk_id)))
}

/// `GET /api/v1/users/{clerk_id}`
pub async fn user_info_handler(
    State(state): State<AppState>,
    Path(clerk_id): Path<String>,
) -> Result<Json<UserInfo>, AppError> {
    let info = user::get_user_info(&state.repos, &clerk_id).await?;
    Ok(Json(info))
}

/// `GET /api/v1/users/{clerk_id}/questions?page=`
pub async fn user_questions_handler(
    State(state): State<AppState>,
    Path(clerk_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Question>>, AppError> {
    let author = resolve_user(&state, &clerk_id).await?;
    let page =
        user::get_user_questions(&state.repos, author.id, query.page(), state.config.page_size)
            .await?;
    Ok(Json(page))
}

/// `GET /api/v1/users/{clerk_id}/answers?page=`
pub async fn user_answers_handler(
    State(state): State<AppState>,
    Path(clerk_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Answer>>, AppError> {
    let author = resolve_user(&state, &clerk_id).await?;
    let page =
        user::get_user_answers(&state.repos, author.id, query.page(), state.config.page_size)
            .await?;
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults_to_first_page() {
        assert_eq!(PageQuery::default().page(), 1);
        assert_eq!(PageQuery { page: Some(0) }.page(), 1);
        assert_eq!(PageQuery { page: Some(4) }.page(), 4);
    }
}
