//! Main entry point for the account service backend.
//!
//! This file initializes the Axum web server, sets up the database
//! connection, and registers all API routes and middleware. It orchestrates
//! the application's startup and defines its overall structure.

use axum::{Extension, Router, response::Json, routing::get};
use backend::api;
use backend::api::common::ApiResponse;
use backend::auth;
use backend::config::Config;
use backend::database::Database;
use backend::services::email_service::{Mailer, SmtpMailer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() {
    init();

    let config = Config::from_env().unwrap();
    let db = Database::new(&config).await.unwrap();
    let pool = db.pool().clone();

    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(config.email.clone()).unwrap());

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/api/auth", auth::routes::auth_router())
        .nest("/api/profile", api::profile::routes::profile_router())
        .nest("/api/users", api::users::routes::users_router())
        .layer(Extension(pool))
        .layer(Extension(config.clone()))
        .layer(Extension(mailer));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();

    info!("Starting account service on port {}", config.server_port);
    axum::serve(listener, app).await.unwrap();
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(serde_json::json!({
        "message": "API server is live!"
    })))
}
