//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use super::handlers;
use crate::presentation::middleware::auth_middleware;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .with_state(state)
}

/// API v1 routes, all authenticated
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes())
        .nest("/chats", chat_routes())
        .nest("/messages", message_routes())
        .nest("/search", search_routes())
        .nest("/folders", folder_routes())
        .nest("/privacy", privacy_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn user_routes() -> Router<AppState> {
    Router::new().route("/chats", get(handlers::user::get_user_chats))
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::chat::create_chat).get(handlers::chat::list_chats),
        )
        .route("/archived", get(handlers::chat::list_archived_chats))
        .route(
            "/{chat_id}",
            get(handlers::chat::get_chat)
                .put(handlers::chat::update_chat)
                .delete(handlers::chat::delete_chat),
        )
        .route("/{chat_id}/join", post(handlers::chat::join_chat))
        .route("/{chat_id}/leave", post(handlers::chat::leave_chat))
        .route("/{chat_id}/archive", post(handlers::chat::archive_chat))
        .route("/{chat_id}/read", post(handlers::chat::mark_chat_read))
        .route(
            "/{chat_id}/messages",
            post(handlers::message::send_message).get(handlers::message::get_messages),
        )
        .route("/{chat_id}/pins", get(handlers::message::get_pinned_messages))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{message_id}",
            get(handlers::message::get_message)
                .put(handlers::message::update_message)
                .delete(handlers::message::delete_message),
        )
        .route("/{message_id}/read", post(handlers::message::mark_message_read))
        .route("/{message_id}/react", post(handlers::message::add_reaction))
        .route(
            "/{message_id}/react/{emoji}",
            delete(handlers::message::remove_reaction),
        )
        .route("/{message_id}/forward", post(handlers::message::forward_message))
}

fn search_routes() -> Router<AppState> {
    Router::new().route("/messages", get(handlers::search::search_messages))
}

fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::folder::list_folders).post(handlers::folder::create_folder),
        )
        .route(
            "/{folder_id}",
            put(handlers::folder::update_folder).delete(handlers::folder::delete_folder),
        )
        .route("/{folder_id}/chats", get(handlers::folder::get_folder_chats))
}

fn privacy_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::privacy::get_privacy_settings).put(handlers::privacy::update_privacy_settings),
        )
        .route("/contacts", put(handlers::privacy::update_contact_privacy))
        .route("/contacts/{contact_id}", get(handlers::privacy::get_contact_privacy))
        .route("/visibility/{target_id}", get(handlers::privacy::get_visibility))
}
