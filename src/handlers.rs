use crate::{
    AppState,
    auth::{self, AuthUser},
    error::{AppError, AppJson, ErrorResponse},
    models::{
        AccountView, CreateFlashcardRequest, CreateFlashcardSetRequest, Flashcard,
        FlashcardSetView, LoginRequest, RegisterAccountRequest, TokenResponse,
        UpdateAccountRequest, UpdateFlashcardRequest, UpdateFlashcardSetRequest,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

// --- Auth Handlers ---

/// register_account
///
/// [Public Route] Self-service sign-up. New accounts always get the `USER` role.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterAccountRequest,
    responses(
        (status = 201, description = "Registered", body = AccountView),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 422, description = "Email already exists", body = ErrorResponse)
    )
)]
pub async fn register_account(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterAccountRequest>,
) -> Result<(StatusCode, Json<AccountView>), AppError> {
    let created = state.users.register(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// login
///
/// [Public Route] Exchanges an email/password pair for a signed bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let account = state
        .users
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = auth::issue_token(account.id, &state.config)?;
    Ok(Json(TokenResponse { token }))
}

// --- User Handlers ---

/// create_user
///
/// [Authenticated Route] Creates an account on someone's behalf. Same rules as registration.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterAccountRequest,
    responses(
        (status = 201, description = "Created", body = AccountView),
        (status = 422, description = "Email already exists", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterAccountRequest>,
) -> Result<(StatusCode, Json<AccountView>), AppError> {
    let created = state.users.register(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// get_users
///
/// [Authenticated Route] Lists every account in ascending id order.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All accounts", body = [AccountView]))
)]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<AccountView>>, AppError> {
    Ok(Json(state.users.list_all().await?))
}

/// get_user
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Found", body = AccountView),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AccountView>, AppError> {
    Ok(Json(state.users.get_by_id(id).await?))
}

/// update_user
///
/// [Authenticated Route] Full overwrite of an account.
///
/// *Authorization*: admins may update anyone; a regular user only their own account.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated", body = AccountView),
        (status = 403, description = "Not allowed to update other users", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_user(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateAccountRequest>,
) -> Result<Json<AccountView>, AppError> {
    let updated = state.users.update_user(&principal, id, payload).await?;
    Ok(Json(updated))
}

/// delete_user
///
/// [Authenticated Route] Removes an account.
///
/// *Authorization*: admins only, and never their own account.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Cannot delete yourself or other users", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.users.delete_user(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// get_user_flashcard_sets
///
/// [Authenticated Route] Lists the sets owned by an account.
#[utoipa::path(
    get,
    path = "/users/{id}/flashcard-sets",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Owned sets", body = [FlashcardSetView]),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_user_flashcard_sets(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<FlashcardSetView>>, AppError> {
    Ok(Json(state.users.list_sets_for_user(id).await?))
}

// --- Flashcard Set Handlers ---

/// create_flashcard_set
#[utoipa::path(
    post,
    path = "/flashcard-sets",
    request_body = CreateFlashcardSetRequest,
    responses(
        (status = 201, description = "Created", body = FlashcardSetView),
        (status = 404, description = "Owner not found", body = ErrorResponse)
    )
)]
pub async fn create_flashcard_set(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateFlashcardSetRequest>,
) -> Result<(StatusCode, Json<FlashcardSetView>), AppError> {
    let created = state.flashcard_sets.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// get_flashcard_sets
#[utoipa::path(
    get,
    path = "/flashcard-sets",
    responses((status = 200, description = "All sets", body = [FlashcardSetView]))
)]
pub async fn get_flashcard_sets(
    State(state): State<AppState>,
) -> Result<Json<Vec<FlashcardSetView>>, AppError> {
    Ok(Json(state.flashcard_sets.list_all().await?))
}

/// get_flashcard_set
#[utoipa::path(
    get,
    path = "/flashcard-sets/{id}",
    params(("id" = i64, Path, description = "Flashcard set ID")),
    responses(
        (status = 200, description = "Found", body = FlashcardSetView),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_flashcard_set(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FlashcardSetView>, AppError> {
    Ok(Json(state.flashcard_sets.get_by_id(id).await?))
}

/// get_flashcards_in_set
#[utoipa::path(
    get,
    path = "/flashcard-sets/{id}/flashcards",
    params(("id" = i64, Path, description = "Flashcard set ID")),
    responses(
        (status = 200, description = "Cards in the set", body = [Flashcard]),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_flashcards_in_set(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Flashcard>>, AppError> {
    Ok(Json(state.flashcard_sets.list_flashcards(id).await?))
}

/// update_flashcard_set
///
/// Renames / re-describes a set. Ownership and creation time never change.
#[utoipa::path(
    patch,
    path = "/flashcard-sets/{id}",
    params(("id" = i64, Path, description = "Flashcard set ID")),
    request_body = UpdateFlashcardSetRequest,
    responses(
        (status = 200, description = "Updated", body = FlashcardSetView),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_flashcard_set(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateFlashcardSetRequest>,
) -> Result<Json<FlashcardSetView>, AppError> {
    Ok(Json(state.flashcard_sets.update(id, payload).await?))
}

/// delete_flashcard_set
#[utoipa::path(
    delete,
    path = "/flashcard-sets/{id}",
    params(("id" = i64, Path, description = "Flashcard set ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_flashcard_set(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.flashcard_sets.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Flashcard Handlers ---

/// create_flashcard
#[utoipa::path(
    post,
    path = "/flashcards",
    request_body = CreateFlashcardRequest,
    responses(
        (status = 201, description = "Created", body = Flashcard),
        (status = 404, description = "Set not found", body = ErrorResponse)
    )
)]
pub async fn create_flashcard(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateFlashcardRequest>,
) -> Result<(StatusCode, Json<Flashcard>), AppError> {
    let created = state.flashcards.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// get_flashcards
#[utoipa::path(
    get,
    path = "/flashcards",
    responses((status = 200, description = "All flashcards", body = [Flashcard]))
)]
pub async fn get_flashcards(State(state): State<AppState>) -> Result<Json<Vec<Flashcard>>, AppError> {
    Ok(Json(state.flashcards.list_all().await?))
}

/// get_flashcard
#[utoipa::path(
    get,
    path = "/flashcards/{id}",
    params(("id" = i64, Path, description = "Flashcard ID")),
    responses(
        (status = 200, description = "Found", body = Flashcard),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_flashcard(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Flashcard>, AppError> {
    Ok(Json(state.flashcards.get_by_id(id).await?))
}

/// update_flashcard
///
/// Returns the card as stored after the update.
#[utoipa::path(
    patch,
    path = "/flashcards/{id}",
    params(("id" = i64, Path, description = "Flashcard ID")),
    request_body = UpdateFlashcardRequest,
    responses(
        (status = 200, description = "Updated", body = Flashcard),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_flashcard(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateFlashcardRequest>,
) -> Result<Json<Flashcard>, AppError> {
    Ok(Json(state.flashcards.update(id, payload).await?))
}

/// delete_flashcard
#[utoipa::path(
    delete,
    path = "/flashcards/{id}",
    params(("id" = i64, Path, description = "Flashcard ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_flashcard(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.flashcards.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
