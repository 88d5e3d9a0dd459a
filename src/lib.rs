pub mod app;
pub mod error;
pub mod voting;
pub mod db {
    pub mod models;
    pub mod question_repository;
    pub mod tag_repository;
    pub mod answer_repository;
    pub mod interaction_repository;
    pub mod user_repository;
    pub mod store;
    #[cfg(feature = "ssr")]
    pub mod connection;
}
pub mod components {
    pub mod profile;
    pub mod question_list;
}

#[cfg(feature = "ssr")]
pub mod actions {
    pub mod question;
    pub mod user;
}
#[cfg(feature = "ssr")]
pub mod auth;
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod revalidate;
#[cfg(feature = "ssr")]
pub mod state;

#[cfg(feature = "ssr")]
pub mod api {
    pub mod errors;
    pub mod questions;
    pub mod users;

    use axum::routing::{get, post};
    use axum::Router;

    use crate::state::AppState;

    /// The JSON API under `/api/v1`.
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route(
                "/api/v1/questions",
                get(questions::list_questions_handler).post(questions::create_question_handler),
            )
            .route(
                "/api/v1/questions/{id}",
                get(questions::get_question_handler)
                    .put(questions::edit_question_handler)
                    .delete(questions::delete_question_handler),
            )
            .route(
                "/api/v1/questions/{id}/upvote",
                post(questions::upvote_question_handler),
            )
            .route(
                "/api/v1/questions/{id}/downvote",
                post(questions::downvote_question_handler),
            )
            .route("/api/v1/users/{clerk_id}", get(users::user_info_handler))
            .route(
                "/api/v1/users/{clerk_id}/questions",
                get(users::user_questions_handler),
            )
            .route(
                "/api/v1/users/{clerk_id}/answers",
                get(users::user_answers_handler),
            )
    }
}

#[cfg(all(test, feature = "ssr"))]
mod test_support;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(app::App);
}
