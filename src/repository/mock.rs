use super::{
    AccountRepository, FlashcardRepository, FlashcardSetRepository, RepoResult, RepositoryError,
};
use crate::models::{
    Account, Flashcard, FlashcardSet, NewAccount, NewFlashcard, NewFlashcardSet, Role,
};
use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::BTreeMap,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i64, Account>,
    sets: BTreeMap<i64, FlashcardSet>,
    cards: BTreeMap<i64, Flashcard>,
    next_account_id: i64,
    next_set_id: i64,
    next_card_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.accounts
            .values()
            .any(|a| a.email == email && Some(a.id) != except)
    }

    fn delete_set_cascade(&mut self, set_id: i64) {
        self.sets.remove(&set_id);
        self.cards.retain(|_, card| card.set_id != set_id);
    }
}

/// MockRepository
///
/// In-memory implementation of every repository trait, mirroring the schema's rules
/// (BIGSERIAL ids, unique email, cascading deletes). It counts account writes so tests
/// can assert that a failed operation never reached persistence.
#[derive(Default)]
pub struct MockRepository {
    tables: Mutex<Tables>,
    account_inserts: AtomicUsize,
    account_saves: AtomicUsize,
    account_deletes: AtomicUsize,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Seeding (bypasses the call counters) ---

    /// Stores an account with a fixed id. The password hash is `hash:<email>`.
    pub fn seed_account(&self, id: i64, nickname: &str, email: &str, role: Role) -> Account {
        let account = Account {
            id,
            nickname: nickname.to_string(),
            email: email.to_string(),
            password_hash: format!("hash:{email}"),
            role,
            created_at: Utc::now(),
        };
        let mut tables = self.tables();
        tables.next_account_id = tables.next_account_id.max(id);
        tables.accounts.insert(id, account.clone());
        account
    }

    pub fn seed_set(&self, id: i64, owner_id: i64, name: &str) -> FlashcardSet {
        let set = FlashcardSet {
            id,
            owner_id,
            name: name.to_string(),
            description: String::new(),
            created_at: Utc::now(),
        };
        let mut tables = self.tables();
        tables.next_set_id = tables.next_set_id.max(id);
        tables.sets.insert(id, set.clone());
        set
    }

    pub fn seed_flashcard(&self, id: i64, set_id: i64, term: &str, definition: &str) -> Flashcard {
        let card = Flashcard {
            id,
            set_id,
            term: term.to_string(),
            definition: definition.to_string(),
        };
        let mut tables = self.tables();
        tables.next_card_id = tables.next_card_id.max(id);
        tables.cards.insert(id, card.clone());
        card
    }

    // --- Inspection ---

    pub fn account_insert_calls(&self) -> usize {
        self.account_inserts.load(Ordering::SeqCst)
    }

    pub fn account_save_calls(&self) -> usize {
        self.account_saves.load(Ordering::SeqCst)
    }

    pub fn account_delete_calls(&self) -> usize {
        self.account_deletes.load(Ordering::SeqCst)
    }

    pub fn stored_account(&self, id: i64) -> Option<Account> {
        self.tables().accounts.get(&id).cloned()
    }

    pub fn stored_set(&self, id: i64) -> Option<FlashcardSet> {
        self.tables().sets.get(&id).cloned()
    }

    pub fn stored_flashcard(&self, id: i64) -> Option<Flashcard> {
        self.tables().cards.get(&id).cloned()
    }
}

fn duplicate_email() -> RepositoryError {
    RepositoryError::UniqueViolation("User with this email already exists!".to_string())
}

#[async_trait]
impl AccountRepository for MockRepository {
    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        Ok(self.tables().email_taken(email, None))
    }

    async fn exists_by_id(&self, id: i64) -> RepoResult<bool> {
        Ok(self.tables().accounts.contains_key(&id))
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Account>> {
        Ok(self.tables().accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        Ok(self
            .tables()
            .accounts
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn insert(&self, account: NewAccount) -> RepoResult<Account> {
        self.account_inserts.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables();
        if tables.email_taken(&account.email, None) {
            return Err(duplicate_email());
        }
        tables.next_account_id += 1;
        let created = Account {
            id: tables.next_account_id,
            nickname: account.nickname,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            created_at: account.created_at,
        };
        tables.accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, account: &Account) -> RepoResult<Account> {
        self.account_saves.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables();
        if tables.email_taken(&account.email, Some(account.id)) {
            return Err(duplicate_email());
        }
        let Some(existing) = tables.accounts.get_mut(&account.id) else {
            return Err(RepositoryError::Database(sqlx::Error::RowNotFound));
        };
        existing.nickname = account.nickname.clone();
        existing.email = account.email.clone();
        existing.password_hash = account.password_hash.clone();
        existing.role = account.role;
        Ok(existing.clone())
    }

    async fn delete_by_id(&self, id: i64) -> RepoResult<()> {
        self.account_deletes.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables();
        tables.accounts.remove(&id);
        let owned: Vec<i64> = tables
            .sets
            .values()
            .filter(|s| s.owner_id == id)
            .map(|s| s.id)
            .collect();
        for set_id in owned {
            tables.delete_set_cascade(set_id);
        }
        Ok(())
    }

    async fn find_all_ordered_by_id(&self) -> RepoResult<Vec<Account>> {
        Ok(self.tables().accounts.values().cloned().collect())
    }
}

#[async_trait]
impl FlashcardSetRepository for MockRepository {
    async fn find_by_owner_id(&self, owner_id: i64) -> RepoResult<Vec<FlashcardSet>> {
        Ok(self
            .tables()
            .sets
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<FlashcardSet>> {
        Ok(self.tables().sets.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> RepoResult<bool> {
        Ok(self.tables().sets.contains_key(&id))
    }

    async fn find_all_ordered_by_id(&self) -> RepoResult<Vec<FlashcardSet>> {
        Ok(self.tables().sets.values().cloned().collect())
    }

    async fn insert(&self, set: NewFlashcardSet) -> RepoResult<FlashcardSet> {
        let mut tables = self.tables();
        tables.next_set_id += 1;
        let created = FlashcardSet {
            id: tables.next_set_id,
            owner_id: set.owner_id,
            name: set.name,
            description: set.description,
            created_at: set.created_at,
        };
        tables.sets.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, set: &FlashcardSet) -> RepoResult<FlashcardSet> {
        let mut tables = self.tables();
        let Some(existing) = tables.sets.get_mut(&set.id) else {
            return Err(RepositoryError::Database(sqlx::Error::RowNotFound));
        };
        existing.name = set.name.clone();
        existing.description = set.description.clone();
        Ok(existing.clone())
    }

    async fn delete_by_id(&self, id: i64) -> RepoResult<()> {
        self.tables().delete_set_cascade(id);
        Ok(())
    }
}

#[async_trait]
impl FlashcardRepository for MockRepository {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Flashcard>> {
        Ok(self.tables().cards.get(&id).cloned())
    }

    async fn find_all_ordered_by_id(&self) -> RepoResult<Vec<Flashcard>> {
        Ok(self.tables().cards.values().cloned().collect())
    }

    async fn find_by_set_id(&self, set_id: i64) -> RepoResult<Vec<Flashcard>> {
        Ok(self
            .tables()
            .cards
            .values()
            .filter(|c| c.set_id == set_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, card: NewFlashcard) -> RepoResult<Flashcard> {
        let mut tables = self.tables();
        tables.next_card_id += 1;
        let created = Flashcard {
            id: tables.next_card_id,
            set_id: card.set_id,
            term: card.term,
            definition: card.definition,
        };
        tables.cards.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, card: &Flashcard) -> RepoResult<Flashcard> {
        let mut tables = self.tables();
        let Some(existing) = tables.cards.get_mut(&card.id) else {
            return Err(RepositoryError::Database(sqlx::Error::RowNotFound));
        };
        existing.term = card.term.clone();
        existing.definition = card.definition.clone();
        Ok(existing.clone())
    }

    async fn delete_by_id(&self, id: i64) -> RepoResult<()> {
        self.tables().cards.remove(&id);
        Ok(())
    }
}
