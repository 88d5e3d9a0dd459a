#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use bson::oid::ObjectId;
use chrono::Utc;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use devflow::config::AppConfig;
use devflow::db::connection::{DatabaseSettings, MongoConnector};
use devflow::db::models::{Answer, Interaction, User, ANSWERS, INTERACTIONS, USERS};
use devflow::db::store::Repositories;
use devflow::revalidate::Revalidator;
use devflow::state::AppState;

/// Holds the running MongoDB container and provides the Axum router for
/// integration tests.
///
/// The container is kept alive for as long as this struct lives.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub db: mongodb::Database,
    pub repos: Repositories,
    pub revalidator: Revalidator,
    pub router: Router,
}

impl TestEnv {
    /// Start MongoDB and build an Axum router wired to it.
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");
        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_url = format!("mongodb://127.0.0.1:{}", mongo_port);

        let config = AppConfig {
            mongodb_url: Some(mongo_url),
            mongodb_database: "devflow_test".to_string(),
            page_size: 2,
            ..AppConfig::default()
        };

        let connector = Arc::new(MongoConnector::new(config.database_settings()));
        connector
            .connect()
            .await
            .expect("Failed to connect to MongoDB");
        let db = connector.database().await.expect("Database handle");

        let repos = Repositories::mongo(connector);
        let revalidator = Revalidator::default();

        let leptos_options = leptos::prelude::LeptosOptions::builder()
            .output_name("devflow")
            .build();

        let app_state = AppState {
            repos: repos.clone(),
            revalidator: revalidator.clone(),
            config,
            leptos_options,
        };

        // API routes only, no Leptos SSR
        let router = devflow::api::routes().with_state(app_state);

        Self {
            _mongo: mongo_container,
            db,
            repos,
            revalidator,
            router,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }

    /// Helper: insert a user directly into the `users` collection.
    pub async fn insert_user(&self, clerk_id: &str, name: &str) -> User {
        let user = User {
            id: ObjectId::new(),
            clerk_id: clerk_id.to_string(),
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@example.com", name.to_lowercase()),
            bio: Some("Writes Rust".to_string()),
            picture: format!("https://img.example.com/{clerk_id}.png"),
            location: None,
            portfolio_website: None,
            reputation: 0,
            saved: vec![],
            joined_at: Utc::now(),
        };
        self.db
            .collection::<User>(USERS)
            .insert_one(&user)
            .await
            .expect("Failed to insert user");
        user
    }

    /// Helper: insert an answer directly into the `answers` collection.
    pub async fn insert_answer(&self, question: ObjectId, author: ObjectId) -> Answer {
        let answer = Answer {
            id: ObjectId::new(),
            author,
            question,
            content: "Use a OnceCell".to_string(),
            upvotes: vec![],
            downvotes: vec![],
            created_at: Utc::now(),
        };
        self.db
            .collection::<Answer>(ANSWERS)
            .insert_one(&answer)
            .await
            .expect("Failed to insert answer");
        answer
    }

    /// Helper: insert an interaction directly into the `interactions` collection.
    pub async fn insert_interaction(&self, question: ObjectId, user: ObjectId) -> Interaction {
        let interaction = Interaction {
            id: ObjectId::new(),
            user,
            action: "view".to_string(),
            question: Some(question),
            answer: None,
            tags: vec![],
            created_at: Utc::now(),
        };
        self.db
            .collection::<Interaction>(INTERACTIONS)
            .insert_one(&interaction)
            .await
            .expect("Failed to insert interaction");
        interaction
    }

    /// Helper: create a question via the API and return its hex id.
    pub async fn create_question(
        &self,
        server: &axum_test::TestServer,
        author: ObjectId,
        title: &str,
        tags: &[&str],
    ) -> String {
        let response = server
            .post("/api/v1/questions")
            .json(&serde_json::json!({
                "title": title,
                "content": format!("Body of {title}"),
                "tags": tags,
                "author": author.to_hex(),
                "path": "/",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<serde_json::Value>()["id"]
            .as_str()
            .expect("id in response")
            .to_string()
    }
}

/// Settings for a connector with no URL configured.
pub fn unconfigured_settings() -> DatabaseSettings {
    DatabaseSettings {
        url: None,
        database: "devflow_test".to_string(),
    }
}
