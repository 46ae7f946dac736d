use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Identity & Roles ---

/// Role
///
/// The RBAC field of an account. Stored as `'USER'` / `'ADMIN'` in the `accounts.role` column
/// and serialized with the same upper-case spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// The column spelling used by the `accounts` table.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored role string is neither `USER` nor `ADMIN`.
#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownRole(value)),
        }
    }
}

/// Principal
///
/// The account identified as making the current request. Only the identity and the role
/// take part in access decisions, so nothing else is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
}

impl Principal {
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// Account
///
/// A registered user, mapped to the `accounts` table.
///
/// Deliberately not `Serialize`: the only way out of the service boundary is
/// [`Account::project`], which drops `password_hash`.
#[derive(Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub nickname: String,
    // Unique across all accounts (UNIQUE constraint on the column).
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// project
    ///
    /// The outward view of an account. Total, and the single place an `Account` is
    /// turned into something that can leave the service.
    pub fn project(&self) -> AccountView {
        AccountView {
            id: self.id,
            nickname: self.nickname.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }

    pub const fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("nickname", &self.nickname)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// NewAccount
///
/// An account that has not been persisted yet; the database assigns the id.
#[derive(Clone)]
pub struct NewAccount {
    pub nickname: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// FlashcardSet
///
/// A named collection of flashcards from the `flashcard_sets` table.
/// `owner_id` is a back-reference to `accounts.id`.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct FlashcardSet {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl FlashcardSet {
    /// project
    ///
    /// Builds the outward view, embedding the owner's projected account rather than the account itself.
    pub fn project(&self, owner: &Account) -> FlashcardSetView {
        FlashcardSetView {
            id: self.id,
            owner: owner.project(),
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewFlashcardSet {
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Flashcard
///
/// A single term/definition pair from the `flashcards` table. Carries no sensitive data,
/// so the row is also the response body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq, Default)]
#[ts(export)]
pub struct Flashcard {
    pub id: i64,
    // FK to flashcard_sets.id.
    pub set_id: i64,
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone)]
pub struct NewFlashcard {
    pub set_id: i64,
    pub term: String,
    pub definition: String,
}

// --- Outward Views (Output Schemas) ---

/// AccountView
///
/// The projected account returned by every endpoint. Has no password field at all.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct AccountView {
    pub id: i64,
    pub nickname: String,
    pub email: String,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// FlashcardSetView
///
/// Output schema for a flashcard set, with the owning account embedded in projected form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct FlashcardSetView {
    pub id: i64,
    pub owner: AccountView,
    pub name: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// TokenResponse
///
/// Returned by a successful login (POST /auth/login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterAccountRequest
///
/// Input payload for POST /auth/register and POST /users. The role is always `USER`
/// for a fresh account, so it is not accepted here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterAccountRequest {
    pub nickname: String,
    pub email: String,
    pub password: String,
}

/// UpdateAccountRequest
///
/// Full-overwrite payload for PUT /users/{id}. Every field is required and every field is applied,
/// including `role`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateAccountRequest {
    pub nickname: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreateFlashcardSetRequest
///
/// Input payload for POST /flashcard-sets. `owner_id` must name an existing account.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateFlashcardSetRequest {
    pub owner_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// UpdateFlashcardSetRequest
///
/// PATCH /flashcard-sets/{id}. Only the name and description of a set are mutable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateFlashcardSetRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// CreateFlashcardRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateFlashcardRequest {
    pub set_id: i64,
    pub term: String,
    pub definition: String,
}

/// UpdateFlashcardRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateFlashcardRequest {
    pub term: String,
    pub definition: String,
}
