/// Service Module Index
///
/// The orchestration layer between the handlers and the repositories. Every service method
/// runs its checks (access policy, existence, validation) before the first persistence write,
/// so a failed call leaves storage untouched.
pub mod accounts;
pub mod flashcard_sets;
pub mod flashcards;

pub use accounts::UserAccountService;
pub use flashcard_sets::FlashcardSetService;
pub use flashcards::FlashcardService;

use crate::error::AppError;

/// Rejects empty or whitespace-only input.
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

pub(crate) fn require_email(value: &str) -> Result<(), AppError> {
    require_non_blank("email", value)?;
    if !value.contains('@') {
        return Err(AppError::Validation("email must be a valid address".to_string()));
    }
    Ok(())
}
