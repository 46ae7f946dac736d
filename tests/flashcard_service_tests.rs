use brain_booster::{
    AppError, FlashcardService, FlashcardSetService, MockRepository,
    models::{
        CreateFlashcardRequest, CreateFlashcardSetRequest, Role, UpdateFlashcardRequest,
        UpdateFlashcardSetRequest,
    },
};
use std::sync::Arc;

fn set_service(repo: &Arc<MockRepository>) -> FlashcardSetService {
    FlashcardSetService::new(repo.clone(), repo.clone(), repo.clone())
}

fn card_service(repo: &Arc<MockRepository>) -> FlashcardService {
    FlashcardService::new(repo.clone(), repo.clone())
}

fn seeded() -> Arc<MockRepository> {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);
    repo.seed_account(2, "Bob", "bob@example.com", Role::Admin);
    repo
}

// --- Flashcard Sets ---

#[tokio::test]
async fn test_create_set_embeds_projected_owner() {
    let repo = seeded();

    let created = set_service(&repo)
        .create(CreateFlashcardSetRequest {
            owner_id: 1,
            name: "Rust ownership".to_string(),
            description: "Borrowing rules".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(created.name, "Rust ownership");
    assert_eq!(created.owner.id, 1);
    assert_eq!(created.owner.nickname, "Ada");

    let stored = repo.stored_set(created.id).unwrap();
    assert_eq!(stored.owner_id, 1);
    assert_eq!(stored.created_at, created.created_at);
}

#[tokio::test]
async fn test_create_set_for_missing_owner_is_not_found() {
    let repo = seeded();

    let result = set_service(&repo)
        .create(CreateFlashcardSetRequest {
            owner_id: 77,
            name: "Orphan".to_string(),
            ..Default::default()
        })
        .await;

    match result {
        Err(AppError::NotFound(message)) => assert_eq!(message, "User with id: 77 not found"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_set_with_blank_name_is_rejected() {
    let repo = seeded();

    let result = set_service(&repo)
        .create(CreateFlashcardSetRequest {
            owner_id: 1,
            name: "  ".to_string(),
            ..Default::default()
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_list_all_sets_ordered_with_owners() {
    let repo = seeded();
    repo.seed_set(30, 2, "Later");
    repo.seed_set(10, 1, "First");
    repo.seed_set(20, 1, "Second");

    let sets = set_service(&repo).list_all().await.unwrap();

    let summary: Vec<(i64, i64)> = sets.iter().map(|s| (s.id, s.owner.id)).collect();
    assert_eq!(summary, vec![(10, 1), (20, 1), (30, 2)]);
}

#[tokio::test]
async fn test_list_all_sets_fails_loudly_on_ownerless_set() {
    let repo = seeded();
    repo.seed_set(10, 1, "Owned");
    repo.seed_set(11, 42, "Orphaned");

    let result = set_service(&repo).list_all().await;

    match result {
        Err(AppError::Internal(message)) => assert!(message.contains("11")),
        other => panic!("expected Internal, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_missing_set_is_not_found() {
    let repo = seeded();

    let result = set_service(&repo).get_by_id(5).await;

    match result {
        Err(AppError::NotFound(message)) => assert_eq!(message, "FlashcardSet with id: 5 not found"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_set_changes_name_and_description_only() {
    let repo = seeded();
    let original = repo.seed_set(10, 1, "Draft");

    let updated = set_service(&repo)
        .update(
            10,
            UpdateFlashcardSetRequest {
                name: "Final".to_string(),
                description: "Polished".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Final");
    assert_eq!(updated.description, "Polished");
    assert_eq!(updated.owner.id, 1);
    assert_eq!(updated.created_at, original.created_at);
}

#[tokio::test]
async fn test_update_missing_set_is_not_found() {
    let repo = seeded();

    let result = set_service(&repo)
        .update(
            404,
            UpdateFlashcardSetRequest {
                name: "Anything".to_string(),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_list_flashcards_in_set() {
    let repo = seeded();
    repo.seed_set(10, 1, "Rust");
    repo.seed_set(11, 1, "Go");
    repo.seed_flashcard(3, 10, "move", "transfer of ownership");
    repo.seed_flashcard(1, 10, "borrow", "temporary reference");
    repo.seed_flashcard(2, 11, "goroutine", "green thread");

    let service = set_service(&repo);
    let cards = service.list_flashcards(10).await.unwrap();

    let ids: Vec<i64> = cards.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 3]);

    repo.seed_set(12, 2, "Empty");
    assert!(service.list_flashcards(12).await.unwrap().is_empty());
    assert!(matches!(service.list_flashcards(99).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_set_removes_its_flashcards() {
    let repo = seeded();
    repo.seed_set(10, 1, "Rust");
    repo.seed_set(11, 1, "Go");
    repo.seed_flashcard(1, 10, "borrow", "temporary reference");
    repo.seed_flashcard(2, 11, "goroutine", "green thread");

    set_service(&repo).delete(10).await.unwrap();

    assert!(repo.stored_set(10).is_none());
    assert!(repo.stored_flashcard(1).is_none());
    assert!(repo.stored_flashcard(2).is_some());
}

#[tokio::test]
async fn test_delete_missing_set_is_not_found() {
    let repo = seeded();

    assert!(matches!(set_service(&repo).delete(10).await, Err(AppError::NotFound(_))));
}

// --- Flashcards ---

#[tokio::test]
async fn test_create_flashcard_in_existing_set() {
    let repo = seeded();
    repo.seed_set(10, 1, "Rust");

    let card = card_service(&repo)
        .create(CreateFlashcardRequest {
            set_id: 10,
            term: "lifetime".to_string(),
            definition: "scope a reference is valid for".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(card.set_id, 10);
    assert_eq!(repo.stored_flashcard(card.id), Some(card));
}

#[tokio::test]
async fn test_create_flashcard_in_missing_set_is_not_found() {
    let repo = seeded();

    let result = card_service(&repo)
        .create(CreateFlashcardRequest {
            set_id: 10,
            term: "lifetime".to_string(),
            definition: "scope".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_create_flashcard_with_blank_fields_is_rejected() {
    let repo = seeded();
    repo.seed_set(10, 1, "Rust");
    let service = card_service(&repo);

    let blank_term = service
        .create(CreateFlashcardRequest {
            set_id: 10,
            term: String::new(),
            definition: "something".to_string(),
        })
        .await;
    assert!(matches!(blank_term, Err(AppError::Validation(_))));

    let blank_definition = service
        .create(CreateFlashcardRequest {
            set_id: 10,
            term: "something".to_string(),
            definition: " ".to_string(),
        })
        .await;
    assert!(matches!(blank_definition, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_get_missing_flashcard_is_not_found() {
    let repo = seeded();

    match card_service(&repo).get_by_id(8).await {
        Err(AppError::NotFound(message)) => assert_eq!(message, "Flashcard with id 8 not found"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_flashcard_returns_stored_card() {
    let repo = seeded();
    repo.seed_set(10, 1, "Rust");
    repo.seed_flashcard(1, 10, "borrow", "old");

    let updated = card_service(&repo)
        .update(
            1,
            UpdateFlashcardRequest {
                term: "borrow".to_string(),
                definition: "a reference that does not take ownership".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.definition, "a reference that does not take ownership");
    assert_eq!(updated.set_id, 10);
    assert_eq!(repo.stored_flashcard(1), Some(updated));
}

#[tokio::test]
async fn test_list_all_flashcards_ordered() {
    let repo = seeded();
    repo.seed_set(10, 1, "Rust");
    repo.seed_flashcard(4, 10, "d", "4");
    repo.seed_flashcard(2, 10, "b", "2");

    let ids: Vec<i64> = card_service(&repo)
        .list_all()
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();

    assert_eq!(ids, vec![2, 4]);
}

#[tokio::test]
async fn test_delete_flashcard() {
    let repo = seeded();
    repo.seed_set(10, 1, "Rust");
    repo.seed_flashcard(1, 10, "borrow", "reference");
    let service = card_service(&repo);

    service.delete(1).await.unwrap();

    assert!(repo.stored_flashcard(1).is_none());
    assert!(matches!(service.delete(1).await, Err(AppError::NotFound(_))));
}
