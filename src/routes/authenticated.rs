use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Account management. The whole router sits behind the `AuthUser` middleware layer; the
/// mutating handlers additionally take `AuthUser` themselves so the principal can be handed
/// to the access policy.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /users
        // Lists all accounts (ascending id) or creates one with registration rules.
        .route("/users", get(handlers::get_users).post(handlers::create_user))
        // GET/PUT/DELETE /users/{id}
        // PUT: admin or self. DELETE: admin, and never self.
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // GET /users/{id}/flashcard-sets
        // Ownership-scoped listing; 404 if the account does not exist.
        .route(
            "/users/{id}/flashcard-sets",
            get(handlers::get_user_flashcard_sets),
        )
}
