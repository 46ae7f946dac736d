use super::{AccountRepository, FlashcardRepository, FlashcardSetRepository, RepoResult};
use crate::models::{
    Account, Flashcard, FlashcardSet, NewAccount, NewFlashcard, NewFlashcardSet,
};
use async_trait::async_trait;
use sqlx::PgPool;

const ACCOUNT_COLUMNS: &str = "id, nickname, email, password_hash, role, created_at";
const SET_COLUMNS: &str = "id, owner_id, name, description, created_at";
const CARD_COLUMNS: &str = "id, set_id, term, definition";

/// PostgresRepository
///
/// The concrete implementation of every repository trait, backed by PostgreSQL.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded `migrations/` directory.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl AccountRepository for PostgresRepository {
    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn exists_by_id(&self, id: i64) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let account = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let account = sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    /// insert
    ///
    /// Creates the row and returns it with the id assigned by the BIGSERIAL sequence.
    async fn insert(&self, account: NewAccount) -> RepoResult<Account> {
        let query = format!(
            "INSERT INTO accounts (nickname, email, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ACCOUNT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Account>(&query)
            .bind(account.nickname)
            .bind(account.email)
            .bind(account.password_hash)
            .bind(account.role.as_str())
            .bind(account.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    /// save
    ///
    /// Overwrites every mutable column. `created_at` is never touched.
    async fn save(&self, account: &Account) -> RepoResult<Account> {
        let query = format!(
            "UPDATE accounts SET nickname = $2, email = $3, password_hash = $4, role = $5 \
             WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Account>(&query)
            .bind(account.id)
            .bind(&account.nickname)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_all_ordered_by_id(&self) -> RepoResult<Vec<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id ASC");
        let accounts = sqlx::query_as::<_, Account>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }
}

#[async_trait]
impl FlashcardSetRepository for PostgresRepository {
    async fn find_by_owner_id(&self, owner_id: i64) -> RepoResult<Vec<FlashcardSet>> {
        let query = format!("SELECT {SET_COLUMNS} FROM flashcard_sets WHERE owner_id = $1 ORDER BY id ASC");
        let sets = sqlx::query_as::<_, FlashcardSet>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(sets)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<FlashcardSet>> {
        let query = format!("SELECT {SET_COLUMNS} FROM flashcard_sets WHERE id = $1");
        let set = sqlx::query_as::<_, FlashcardSet>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(set)
    }

    async fn exists_by_id(&self, id: i64) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM flashcard_sets WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_all_ordered_by_id(&self) -> RepoResult<Vec<FlashcardSet>> {
        let query = format!("SELECT {SET_COLUMNS} FROM flashcard_sets ORDER BY id ASC");
        let sets = sqlx::query_as::<_, FlashcardSet>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(sets)
    }

    async fn insert(&self, set: NewFlashcardSet) -> RepoResult<FlashcardSet> {
        let query = format!(
            "INSERT INTO flashcard_sets (owner_id, name, description, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING {SET_COLUMNS}"
        );
        let created = sqlx::query_as::<_, FlashcardSet>(&query)
            .bind(set.owner_id)
            .bind(set.name)
            .bind(set.description)
            .bind(set.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn save(&self, set: &FlashcardSet) -> RepoResult<FlashcardSet> {
        let query = format!(
            "UPDATE flashcard_sets SET name = $2, description = $3 WHERE id = $1 RETURNING {SET_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, FlashcardSet>(&query)
            .bind(set.id)
            .bind(&set.name)
            .bind(&set.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM flashcard_sets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FlashcardRepository for PostgresRepository {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Flashcard>> {
        let query = format!("SELECT {CARD_COLUMNS} FROM flashcards WHERE id = $1");
        let card = sqlx::query_as::<_, Flashcard>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(card)
    }

    async fn find_all_ordered_by_id(&self) -> RepoResult<Vec<Flashcard>> {
        let query = format!("SELECT {CARD_COLUMNS} FROM flashcards ORDER BY id ASC");
        let cards = sqlx::query_as::<_, Flashcard>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(cards)
    }

    async fn find_by_set_id(&self, set_id: i64) -> RepoResult<Vec<Flashcard>> {
        let query = format!("SELECT {CARD_COLUMNS} FROM flashcards WHERE set_id = $1 ORDER BY id ASC");
        let cards = sqlx::query_as::<_, Flashcard>(&query)
            .bind(set_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(cards)
    }

    async fn insert(&self, card: NewFlashcard) -> RepoResult<Flashcard> {
        let query = format!(
            "INSERT INTO flashcards (set_id, term, definition) VALUES ($1, $2, $3) RETURNING {CARD_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Flashcard>(&query)
            .bind(card.set_id)
            .bind(card.term)
            .bind(card.definition)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn save(&self, card: &Flashcard) -> RepoResult<Flashcard> {
        let query = format!(
            "UPDATE flashcards SET term = $2, definition = $3 WHERE id = $1 RETURNING {CARD_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Flashcard>(&query)
            .bind(card.id)
            .bind(&card.term)
            .bind(&card.definition)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM flashcards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
