#![recursion_limit = "256"]

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::sync::Arc;

    use anyhow::Context;
    use axum::Router;
    use devflow::app::{shell, App};
    use devflow::config::AppConfig;
    use devflow::db::connection::MongoConnector;
    use devflow::db::store::Repositories;
    use devflow::revalidate::{log_revalidations, Revalidator};
    use devflow::state::AppState;
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use tower_http::services::ServeDir;
    use tower_http::trace::TraceLayer;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devflow=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting DevFlow server...");

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Load Leptos options from Cargo.toml metadata
    let conf = get_configuration(None).context("Failed to load Leptos configuration")?;
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;
    let site_root = leptos_options.site_root.to_string();

    // Connect to MongoDB and build indexes. A failure here is not fatal: the
    // connector retries both on the next data operation.
    let connector = Arc::new(MongoConnector::new(config.database_settings()));
    if let Err(e) = connector.connect().await {
        tracing::error!("Initial MongoDB connection failed: {e}");
    }

    let repos = Repositories::mongo(connector);

    let revalidator = Revalidator::default();
    tokio::spawn(log_revalidations(revalidator.subscribe()));

    // Build application state
    let app_state = AppState {
        repos,
        revalidator,
        config,
        leptos_options: leptos_options.clone(),
    };

    // Generate the Leptos route list for SSR
    let routes = generate_route_list(App);

    // Build the Axum router
    let app = Router::new()
        .merge(devflow::api::routes())
        // Leptos SSR routes and server functions
        .leptos_routes_with_context(
            &app_state,
            routes,
            {
                let app_state = app_state.clone();
                move || provide_context(app_state.clone())
            },
            {
                let leptos_options = leptos_options.clone();
                move || shell(leptos_options.clone())
            },
        )
        // Static files
        .fallback_service(ServeDir::new(&site_root))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start the server
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}

// When compiled for WASM (client-side), there's no main function.
// The hydrate() function in lib.rs handles client-side initialization.
#[cfg(not(feature = "ssr"))]
fn main() {}
