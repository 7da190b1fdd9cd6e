//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health and catalog
        .route("/health", get(handlers::health))
        .route("/traditions", get(handlers::list_traditions))
        // Guidance
        .route("/chat", post(handlers::chat))
        .route("/daily-wisdom", get(handlers::daily_wisdom))
        .route("/compare", post(handlers::compare))
        .route("/journal", post(handlers::journal))
        .route("/user/:user_id", get(handlers::get_user))
        .route("/greeting", get(handlers::greeting))
        .route("/migrate-memory", post(handlers::migrate_memory))
        // Accounts
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::me))
        .route("/auth/preferences", put(handlers::update_preferences))
        // Chat threads
        .route("/chats", get(handlers::list_chats).post(handlers::create_chat))
        .route("/chats/current", get(handlers::current_chat))
        .route(
            "/chats/:id",
            get(handlers::get_chat).delete(handlers::delete_chat),
        )
        .route("/chats/:id/title", put(handlers::rename_chat))
        .route("/chats/:id/messages", post(handlers::add_chat_message))
        .route("/chats/current/:id", put(handlers::set_current_chat))
        // Search
        .route("/search/chats", get(handlers::search_chats))
        .route("/search/journal", get(handlers::search_journal))
        .route("/search/profiles", get(handlers::search_profiles))
        // Community
        .route(
            "/community/profile",
            get(handlers::get_profile).post(handlers::save_profile),
        )
        .route("/community/matches", get(handlers::matches))
        .route("/community/connect", post(handlers::connect))
        .route("/community/respond", post(handlers::respond))
        .route("/community/connections", get(handlers::connections))
        .route("/community/requests", get(handlers::pending_requests))
        .with_state(state)
}
