use crate::models::{
    Account, Flashcard, FlashcardSet, NewAccount, NewFlashcard, NewFlashcardSet,
};
use async_trait::async_trait;
use std::sync::Arc;

mod mock;
mod postgres;

pub use mock::MockRepository;
pub use postgres::PostgresRepository;

/// RepositoryError
///
/// Failures surfaced by any repository implementation. Nothing below the service layer
/// swallows an error; every call returns one of these on failure.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// A UNIQUE constraint rejected the write (e.g. a concurrent registration won the race).
    #[error("{0}")]
    UniqueViolation(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let message = match db_err.constraint() {
                    Some("accounts_email_key") => "User with this email already exists!".to_string(),
                    Some(constraint) => format!("duplicate value violates {constraint}"),
                    None => "duplicate value violates a unique constraint".to_string(),
                };
                return RepositoryError::UniqueViolation(message);
            }
        }
        RepositoryError::Database(err)
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

// --- Repository Contracts ---

/// AccountRepository
///
/// Persistence of accounts, keyed by id and by email.
/// `insert` and `save` together form the upsert contract: `insert` creates a row and
/// assigns its id, `save` overwrites every mutable column of an existing row.
///
/// **Send + Sync + async_trait** make `Arc<dyn AccountRepository>` shareable across Axum tasks.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn exists_by_email(&self, email: &str) -> RepoResult<bool>;
    async fn exists_by_id(&self, id: i64) -> RepoResult<bool>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Account>>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>>;
    async fn insert(&self, account: NewAccount) -> RepoResult<Account>;
    async fn save(&self, account: &Account) -> RepoResult<Account>;
    async fn delete_by_id(&self, id: i64) -> RepoResult<()>;
    /// Every account, ascending by id. The ordering is part of the contract.
    async fn find_all_ordered_by_id(&self) -> RepoResult<Vec<Account>>;
}

/// FlashcardSetRepository
///
/// Persistence of flashcard sets, queryable by owning account.
#[async_trait]
pub trait FlashcardSetRepository: Send + Sync {
    /// Sets owned by `owner_id`, ascending by id.
    async fn find_by_owner_id(&self, owner_id: i64) -> RepoResult<Vec<FlashcardSet>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<FlashcardSet>>;
    async fn exists_by_id(&self, id: i64) -> RepoResult<bool>;
    async fn find_all_ordered_by_id(&self) -> RepoResult<Vec<FlashcardSet>>;
    async fn insert(&self, set: NewFlashcardSet) -> RepoResult<FlashcardSet>;
    async fn save(&self, set: &FlashcardSet) -> RepoResult<FlashcardSet>;
    /// Removes the set; its flashcards go with it (ON DELETE CASCADE).
    async fn delete_by_id(&self, id: i64) -> RepoResult<()>;
}

/// FlashcardRepository
#[async_trait]
pub trait FlashcardRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Flashcard>>;
    async fn find_all_ordered_by_id(&self) -> RepoResult<Vec<Flashcard>>;
    async fn find_by_set_id(&self, set_id: i64) -> RepoResult<Vec<Flashcard>>;
    async fn insert(&self, card: NewFlashcard) -> RepoResult<Flashcard>;
    async fn save(&self, card: &Flashcard) -> RepoResult<Flashcard>;
    async fn delete_by_id(&self, id: i64) -> RepoResult<()>;
}

/// Repository
///
/// Convenience bound for a backend that provides every store.
pub trait Repository: AccountRepository + FlashcardSetRepository + FlashcardRepository {}

impl<T> Repository for T where T: AccountRepository + FlashcardSetRepository + FlashcardRepository {}

// --- Shared State Aliases ---

pub type AccountRepositoryState = Arc<dyn AccountRepository>;
pub type FlashcardSetRepositoryState = Arc<dyn FlashcardSetRepository>;
pub type FlashcardRepositoryState = Arc<dyn FlashcardRepository>;
