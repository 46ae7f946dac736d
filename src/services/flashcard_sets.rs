use chrono::Utc;
use std::collections::{HashMap, hash_map::Entry};

use super::{accounts::user_not_found, require_non_blank};
use crate::{
    error::AppError,
    models::{
        Account, CreateFlashcardSetRequest, Flashcard, FlashcardSet, FlashcardSetView,
        NewFlashcardSet, UpdateFlashcardSetRequest,
    },
    repository::{AccountRepositoryState, FlashcardRepositoryState, FlashcardSetRepositoryState},
};

pub(crate) fn set_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("FlashcardSet with id: {id} not found"))
}

/// FlashcardSetService
///
/// Plain CRUD over flashcard sets. Every set leaves this service as a [`FlashcardSetView`]
/// with its owner projected.
#[derive(Clone)]
pub struct FlashcardSetService {
    accounts: AccountRepositoryState,
    sets: FlashcardSetRepositoryState,
    cards: FlashcardRepositoryState,
}

impl FlashcardSetService {
    pub fn new(
        accounts: AccountRepositoryState,
        sets: FlashcardSetRepositoryState,
        cards: FlashcardRepositoryState,
    ) -> Self {
        Self {
            accounts,
            sets,
            cards,
        }
    }

    async fn owner_of(&self, set: &FlashcardSet) -> Result<Account, AppError> {
        // A set outliving its owner means the cascade did not run.
        self.accounts.find_by_id(set.owner_id).await?.ok_or_else(|| {
            AppError::Internal(format!("flashcard set {} has no owner {}", set.id, set.owner_id))
        })
    }

    async fn view(&self, set: &FlashcardSet) -> Result<FlashcardSetView, AppError> {
        let owner = self.owner_of(set).await?;
        Ok(set.project(&owner))
    }

    /// create
    ///
    /// The owner must exist when the set is created.
    pub async fn create(&self, request: CreateFlashcardSetRequest) -> Result<FlashcardSetView, AppError> {
        require_non_blank("name", &request.name)?;

        let owner = self
            .accounts
            .find_by_id(request.owner_id)
            .await?
            .ok_or_else(|| user_not_found(request.owner_id))?;

        let created = self
            .sets
            .insert(NewFlashcardSet {
                owner_id: owner.id,
                name: request.name,
                description: request.description,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(set_id = created.id, owner_id = owner.id, "Flashcard set created");
        Ok(created.project(&owner))
    }

    /// list_all
    ///
    /// Ascending by id. Owners are looked up once each.
    pub async fn list_all(&self) -> Result<Vec<FlashcardSetView>, AppError> {
        let sets = self.sets.find_all_ordered_by_id().await?;

        let mut owners: HashMap<i64, Account> = HashMap::new();
        let mut views = Vec::with_capacity(sets.len());
        for set in &sets {
            let owner = match owners.entry(set.owner_id) {
                Entry::Occupied(cached) => cached.into_mut(),
                Entry::Vacant(slot) => slot.insert(self.owner_of(set).await?),
            };
            views.push(set.project(owner));
        }
        Ok(views)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<FlashcardSetView, AppError> {
        let set = self.sets.find_by_id(id).await?.ok_or_else(|| set_not_found(id))?;
        self.view(&set).await
    }

    /// The set's flashcards, ascending by id.
    pub async fn list_flashcards(&self, set_id: i64) -> Result<Vec<Flashcard>, AppError> {
        if !self.sets.exists_by_id(set_id).await? {
            return Err(set_not_found(set_id));
        }
        Ok(self.cards.find_by_set_id(set_id).await?)
    }

    /// update
    ///
    /// Only the name and description are replaced; owner and creation time are fixed.
    pub async fn update(
        &self,
        id: i64,
        changes: UpdateFlashcardSetRequest,
    ) -> Result<FlashcardSetView, AppError> {
        let mut set = self.sets.find_by_id(id).await?.ok_or_else(|| set_not_found(id))?;

        require_non_blank("name", &changes.name)?;

        set.name = changes.name;
        set.description = changes.description;

        let saved = self.sets.save(&set).await?;
        tracing::info!(set_id = id, "Flashcard set updated");
        self.view(&saved).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.sets.exists_by_id(id).await? {
            return Err(set_not_found(id));
        }
        self.sets.delete_by_id(id).await?;
        tracing::info!(set_id = id, "Flashcard set deleted");
        Ok(())
    }
}
