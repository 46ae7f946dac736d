use super::{flashcard_sets::set_not_found, require_non_blank};
use crate::{
    error::AppError,
    models::{CreateFlashcardRequest, Flashcard, NewFlashcard, UpdateFlashcardRequest},
    repository::{FlashcardRepositoryState, FlashcardSetRepositoryState},
};

fn flashcard_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Flashcard with id {id} not found"))
}

/// FlashcardService
///
/// Fetch-or-404, copy fields, save.
#[derive(Clone)]
pub struct FlashcardService {
    sets: FlashcardSetRepositoryState,
    cards: FlashcardRepositoryState,
}

impl FlashcardService {
    pub fn new(sets: FlashcardSetRepositoryState, cards: FlashcardRepositoryState) -> Self {
        Self { sets, cards }
    }

    /// create
    ///
    /// The parent set must exist.
    pub async fn create(&self, request: CreateFlashcardRequest) -> Result<Flashcard, AppError> {
        require_non_blank("term", &request.term)?;
        require_non_blank("definition", &request.definition)?;

        if !self.sets.exists_by_id(request.set_id).await? {
            return Err(set_not_found(request.set_id));
        }

        let created = self
            .cards
            .insert(NewFlashcard {
                set_id: request.set_id,
                term: request.term,
                definition: request.definition,
            })
            .await?;

        tracing::info!(flashcard_id = created.id, set_id = created.set_id, "Flashcard created");
        Ok(created)
    }

    pub async fn list_all(&self) -> Result<Vec<Flashcard>, AppError> {
        Ok(self.cards.find_all_ordered_by_id().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Flashcard, AppError> {
        self.cards
            .find_by_id(id)
            .await?
            .ok_or_else(|| flashcard_not_found(id))
    }

    /// Replaces the term and definition, returning the stored card.
    pub async fn update(&self, id: i64, changes: UpdateFlashcardRequest) -> Result<Flashcard, AppError> {
        let mut card = self.get_by_id(id).await?;

        require_non_blank("term", &changes.term)?;
        require_non_blank("definition", &changes.definition)?;

        card.term = changes.term;
        card.definition = changes.definition;

        Ok(self.cards.save(&card).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.cards.find_by_id(id).await?.is_none() {
            return Err(flashcard_not_found(id));
        }
        self.cards.delete_by_id(id).await?;
        tracing::info!(flashcard_id = id, "Flashcard deleted");
        Ok(())
    }
}
