use leptos::prelude::LeptosOptions;

use crate::config::AppConfig;
use crate::db::store::Repositories;
use crate::revalidate::Revalidator;

/// Shared server state, handed to the API handlers and provided as context
/// to Leptos server functions.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub revalidator: Revalidator,
    pub config: AppConfig,
    pub leptos_options: LeptosOptions,
}

impl axum::extract::FromRef<AppState> for LeptosOptions {
    fn from_ref(state: &AppState) -> Self {
        state.leptos_options.clone()
    }
}
