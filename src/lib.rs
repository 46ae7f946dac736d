use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;

// Routing segregated by access requirement (Public, Authenticated).
pub mod routes;
use auth::{AuthUser, PasswordHasherState};
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use repository::{AccountRepositoryState, MockRepository, PostgresRepository, Repository};
pub use services::{FlashcardService, FlashcardSetService, UserAccountService};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the OpenAPI document
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_account, handlers::login, handlers::create_user, handlers::get_users,
        handlers::get_user, handlers::update_user, handlers::delete_user,
        handlers::get_user_flashcard_sets, handlers::create_flashcard_set,
        handlers::get_flashcard_sets, handlers::get_flashcard_set, handlers::get_flashcards_in_set,
        handlers::update_flashcard_set, handlers::delete_flashcard_set, handlers::create_flashcard,
        handlers::get_flashcards, handlers::get_flashcard, handlers::update_flashcard,
        handlers::delete_flashcard
    ),
    components(
        schemas(
            models::Role, models::AccountView, models::FlashcardSetView, models::Flashcard,
            models::TokenResponse, models::RegisterAccountRequest, models::UpdateAccountRequest,
            models::LoginRequest, models::CreateFlashcardSetRequest,
            models::UpdateFlashcardSetRequest, models::CreateFlashcardRequest,
            models::UpdateFlashcardRequest, error::ErrorResponse,
        )
    ),
    tags(
        (name = "brain-booster", description = "Flashcard study API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container of every service shared across requests. Services hold
/// `Arc`s to their repositories, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Account lookups for the `AuthUser` extractor.
    pub accounts: AccountRepositoryState,
    pub users: UserAccountService,
    pub flashcard_sets: FlashcardSetService,
    pub flashcards: FlashcardService,
    pub config: AppConfig,
}

impl AppState {
    /// Wires every service onto one backend that implements all repository traits.
    pub fn new<R>(repo: Arc<R>, hasher: PasswordHasherState, config: AppConfig) -> Self
    where
        R: Repository + 'static,
    {
        let accounts: repository::AccountRepositoryState = repo.clone();
        let sets: repository::FlashcardSetRepositoryState = repo.clone();
        let cards: repository::FlashcardRepositoryState = repo;

        Self {
            users: UserAccountService::new(accounts.clone(), sets.clone(), hasher),
            flashcard_sets: FlashcardSetService::new(accounts.clone(), sets.clone(), cards.clone()),
            flashcards: FlashcardService::new(sets, cards),
            accounts,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AccountRepositoryState {
    fn from_ref(app_state: &AppState) -> AccountRepositoryState {
        app_state.accounts.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated router. Extracting `AuthUser` rejects the request with 401
/// before the handler runs if no valid principal can be resolved.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware, and registers
/// the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                // Unique id per request, echoed back to the client.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying method, URI and the `x-request-id`, so every log line of a
/// request is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
