use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a bearer token: health, sign-up/login, and the flashcard
/// catalogue (sets and cards).
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Load balancer probe.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/register
        // Self-service sign-up. Returns the projected account, never the password hash.
        .route("/auth/register", post(handlers::register_account))
        // POST /auth/login
        // Exchanges credentials for a signed JWT.
        .route("/auth/login", post(handlers::login))
        // --- Flashcard Sets ---
        .route(
            "/flashcard-sets",
            get(handlers::get_flashcard_sets).post(handlers::create_flashcard_set),
        )
        .route(
            "/flashcard-sets/{id}",
            get(handlers::get_flashcard_set)
                .patch(handlers::update_flashcard_set)
                .delete(handlers::delete_flashcard_set),
        )
        // GET /flashcard-sets/{id}/flashcards
        // 404 when the set itself does not exist.
        .route(
            "/flashcard-sets/{id}/flashcards",
            get(handlers::get_flashcards_in_set),
        )
        // --- Flashcards ---
        .route(
            "/flashcards",
            get(handlers::get_flashcards).post(handlers::create_flashcard),
        )
        .route(
            "/flashcards/{id}",
            get(handlers::get_flashcard)
                .patch(handlers::update_flashcard)
                .delete(handlers::delete_flashcard),
        )
}
