use brain_booster::{
    AppError, MockRepository, UserAccountService,
    auth::PasswordHasher,
    models::{Principal, RegisterAccountRequest, Role, UpdateAccountRequest},
    policy::AccessPolicy,
};
use std::sync::Arc;

// --- Test Doubles ---

/// Deterministic stand-in for Argon2 so the tests stay fast.
struct FakeHasher;

impl PasswordHasher for FakeHasher {
    fn hash(&self, plain: &str) -> Result<String, AppError> {
        Ok(format!("hashed:{plain}"))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        hash == format!("hashed:{plain}")
    }
}

// --- Test Utilities ---

fn service(repo: &Arc<MockRepository>) -> UserAccountService {
    UserAccountService::new(repo.clone(), repo.clone(), Arc::new(FakeHasher))
}

fn user(id: i64) -> Principal {
    Principal { id, role: Role::User }
}

fn admin(id: i64) -> Principal {
    Principal { id, role: Role::Admin }
}

fn registration(email: &str) -> RegisterAccountRequest {
    RegisterAccountRequest {
        nickname: "Ada".to_string(),
        email: email.to_string(),
        password: "correct horse".to_string(),
    }
}

fn changes(nickname: &str, email: &str, role: Role) -> UpdateAccountRequest {
    UpdateAccountRequest {
        nickname: nickname.to_string(),
        email: email.to_string(),
        password: "new-password".to_string(),
        role,
    }
}

// --- Registration ---

#[tokio::test]
async fn test_register_creates_user_role_with_hashed_password() {
    let repo = Arc::new(MockRepository::new());

    let created = service(&repo)
        .register(registration("ada@example.com"))
        .await
        .unwrap();

    assert_eq!(created.role, Role::User);
    assert_eq!(created.email, "ada@example.com");
    assert_eq!(repo.account_insert_calls(), 1);

    let stored = repo.stored_account(created.id).unwrap();
    assert_eq!(stored.password_hash, "hashed:correct horse");
    assert_eq!(stored.created_at, created.created_at);
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict_and_never_persists() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Existing", "taken@example.com", Role::User);

    let result = service(&repo).register(registration("taken@example.com")).await;

    match result {
        Err(AppError::Conflict(message)) => assert_eq!(message, "User with this email already exists!"),
        other => panic!("expected Conflict, got {:?}", other),
    }
    assert_eq!(repo.account_insert_calls(), 0);
}

#[tokio::test]
async fn test_register_rejects_blank_fields() {
    let repo = Arc::new(MockRepository::new());
    let service = service(&repo);

    let mut blank_nickname = registration("a@example.com");
    blank_nickname.nickname = "   ".to_string();
    assert!(matches!(
        service.register(blank_nickname).await,
        Err(AppError::Validation(_))
    ));

    let mut bad_email = registration("not-an-email");
    bad_email.email = "not-an-email".to_string();
    assert!(matches!(service.register(bad_email).await, Err(AppError::Validation(_))));

    let mut blank_password = registration("b@example.com");
    blank_password.password = String::new();
    assert!(matches!(
        service.register(blank_password).await,
        Err(AppError::Validation(_))
    ));

    assert_eq!(repo.account_insert_calls(), 0);
}

// --- Lookup ---

#[tokio::test]
async fn test_get_by_id_missing_is_not_found() {
    let repo = Arc::new(MockRepository::new());

    let result = service(&repo).get_by_id(42).await;

    match result {
        Err(AppError::NotFound(message)) => assert_eq!(message, "User with id: 42 not found"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_all_is_ordered_by_ascending_id() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(5, "Eve", "eve@example.com", Role::User);
    repo.seed_account(2, "Bob", "bob@example.com", Role::Admin);
    repo.seed_account(9, "Ivy", "ivy@example.com", Role::User);

    let service = service(&repo);
    let registered = service.register(registration("new@example.com")).await.unwrap();

    let ids: Vec<i64> = service.list_all().await.unwrap().iter().map(|a| a.id).collect();

    assert_eq!(ids, vec![2, 5, 9, registered.id]);
    assert!(registered.id > 9);
}

#[tokio::test]
async fn test_authenticate_checks_password() {
    let repo = Arc::new(MockRepository::new());
    let service = service(&repo);
    let created = service.register(registration("ada@example.com")).await.unwrap();

    let ok = service.authenticate("ada@example.com", "correct horse").await.unwrap();
    assert_eq!(ok.id, created.id);

    assert!(matches!(
        service.authenticate("ada@example.com", "wrong").await,
        Err(AppError::Unauthorized)
    ));
    assert!(matches!(
        service.authenticate("nobody@example.com", "correct horse").await,
        Err(AppError::Unauthorized)
    ));
}

// --- Update ---

#[tokio::test]
async fn test_user_can_update_self() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);

    let updated = service(&repo)
        .update_user(&user(1), 1, changes("Countess", "countess@example.com", Role::User))
        .await
        .unwrap();

    assert_eq!(updated.nickname, "Countess");
    assert_eq!(updated.email, "countess@example.com");
    let stored = repo.stored_account(1).unwrap();
    assert_eq!(stored.password_hash, "hashed:new-password");
    assert_eq!(repo.account_save_calls(), 1);
}

#[tokio::test]
async fn test_user_updating_other_is_forbidden_before_any_write() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);
    repo.seed_account(2, "Bob", "bob@example.com", Role::User);

    let result = service(&repo)
        .update_user(&user(1), 2, changes("Hacked", "bob@example.com", Role::User))
        .await;

    match result {
        Err(AppError::Forbidden(reason)) => assert_eq!(reason, "not allowed to update other users"),
        other => panic!("expected Forbidden, got {:?}", other),
    }
    assert_eq!(repo.account_save_calls(), 0);
    assert_eq!(repo.stored_account(2).unwrap().nickname, "Bob");
}

#[tokio::test]
async fn test_forbidden_wins_over_not_found_on_update() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);

    let result = service(&repo)
        .update_user(&user(1), 999, changes("X", "x@example.com", Role::User))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_admin_can_update_other_account() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);
    repo.seed_account(2, "Root", "root@example.com", Role::Admin);

    let updated = service(&repo)
        .update_user(&admin(2), 1, changes("Renamed", "ada@example.com", Role::User))
        .await
        .unwrap();

    assert_eq!(updated.id, 1);
    assert_eq!(updated.nickname, "Renamed");
}

#[tokio::test]
async fn test_update_missing_target_is_not_found() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(2, "Root", "root@example.com", Role::Admin);

    let result = service(&repo)
        .update_user(&admin(2), 42, changes("Ghost", "ghost@example.com", Role::User))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(repo.account_save_calls(), 0);
}

#[tokio::test]
async fn test_self_service_update_overwrites_own_role() {
    // Full-overwrite semantics: a regular user can promote themselves through update.
    // Kept as-is; AccessPolicy::role_overwritable_on_update is the switch to tighten it.
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);

    let updated = service(&repo)
        .update_user(&user(1), 1, changes("Ada", "ada@example.com", Role::Admin))
        .await
        .unwrap();

    assert_eq!(updated.role, Role::Admin);
}

#[tokio::test]
async fn test_role_kept_when_policy_disallows_overwrite() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);

    let strict = service(&repo).with_policy(AccessPolicy {
        role_overwritable_on_update: false,
    });
    let updated = strict
        .update_user(&user(1), 1, changes("Ada", "ada@example.com", Role::Admin))
        .await
        .unwrap();

    assert_eq!(updated.role, Role::User);
}

#[tokio::test]
async fn test_update_to_taken_email_is_conflict() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);
    repo.seed_account(2, "Bob", "bob@example.com", Role::User);

    let result = service(&repo)
        .update_user(&user(1), 1, changes("Ada", "bob@example.com", Role::User))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(repo.stored_account(1).unwrap().email, "ada@example.com");
}

// --- Delete ---

#[tokio::test]
async fn test_admin_deletes_other_account() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);
    repo.seed_account(2, "Root", "root@example.com", Role::Admin);

    service(&repo).delete_user(&admin(2), 1).await.unwrap();

    assert!(repo.stored_account(1).is_none());
    assert_eq!(repo.account_delete_calls(), 1);
}

#[tokio::test]
async fn test_admin_self_delete_is_forbidden() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(2, "Root", "root@example.com", Role::Admin);

    let result = service(&repo).delete_user(&admin(2), 2).await;

    match result {
        Err(AppError::Forbidden(reason)) => assert_eq!(reason, "cannot delete yourself or other users"),
        other => panic!("expected Forbidden, got {:?}", other),
    }
    assert!(repo.stored_account(2).is_some());
    assert_eq!(repo.account_delete_calls(), 0);
}

#[tokio::test]
async fn test_user_cannot_delete_anyone() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);
    repo.seed_account(3, "Cy", "cy@example.com", Role::User);

    let service = service(&repo);

    assert!(matches!(service.delete_user(&user(1), 1).await, Err(AppError::Forbidden(_))));
    assert!(matches!(service.delete_user(&user(1), 3).await, Err(AppError::Forbidden(_))));
    assert_eq!(repo.account_delete_calls(), 0);
}

#[tokio::test]
async fn test_delete_missing_target_is_not_found_without_delete_call() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(2, "Root", "root@example.com", Role::Admin);

    let result = service(&repo).delete_user(&admin(2), 999).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(repo.account_delete_calls(), 0);
}

#[tokio::test]
async fn test_deleting_account_removes_owned_sets() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);
    repo.seed_account(2, "Root", "root@example.com", Role::Admin);
    repo.seed_set(10, 1, "Owned by Ada");
    repo.seed_set(11, 2, "Owned by Root");

    service(&repo).delete_user(&admin(2), 1).await.unwrap();

    assert!(repo.stored_set(10).is_none());
    assert!(repo.stored_set(11).is_some());
}

// --- Ownership-scoped Listing ---

#[tokio::test]
async fn test_list_sets_for_missing_user_is_not_found() {
    let repo = Arc::new(MockRepository::new());

    let result = service(&repo).list_sets_for_user(999).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_list_sets_for_user_returns_exactly_owned_sets() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);
    repo.seed_account(2, "Bob", "bob@example.com", Role::User);
    repo.seed_set(10, 1, "Rust");
    repo.seed_set(11, 2, "Go");
    repo.seed_set(12, 1, "SQL");

    let sets = service(&repo).list_sets_for_user(1).await.unwrap();

    let ids: Vec<i64> = sets.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![10, 12]);
    for set in &sets {
        assert_eq!(set.owner.id, 1);
        assert_eq!(set.owner.email, "ada@example.com");
    }
}

#[tokio::test]
async fn test_list_sets_for_user_without_sets_is_empty() {
    let repo = Arc::new(MockRepository::new());
    repo.seed_account(1, "Ada", "ada@example.com", Role::User);

    let sets = service(&repo).list_sets_for_user(1).await.unwrap();

    assert!(sets.is_empty());
}
