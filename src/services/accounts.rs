use chrono::Utc;

use super::{require_email, require_non_blank};
use crate::{
    auth::PasswordHasherState,
    error::AppError,
    models::{
        AccountView, FlashcardSetView, NewAccount, Principal, RegisterAccountRequest, Role,
        UpdateAccountRequest,
    },
    policy::{AccessPolicy, Intent},
    repository::{AccountRepositoryState, FlashcardSetRepositoryState},
};

pub(crate) fn user_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("User with id: {id} not found"))
}

/// UserAccountService
///
/// Orchestrates the account lifecycle: registration, lookup, authorization-checked update
/// and delete, and the ownership-scoped listing of flashcard sets.
///
/// Holds no state between calls beyond its collaborators; the acting principal is passed
/// into each mutating call rather than read from the request context.
#[derive(Clone)]
pub struct UserAccountService {
    accounts: AccountRepositoryState,
    sets: FlashcardSetRepositoryState,
    hasher: PasswordHasherState,
    policy: AccessPolicy,
}

impl UserAccountService {
    pub fn new(
        accounts: AccountRepositoryState,
        sets: FlashcardSetRepositoryState,
        hasher: PasswordHasherState,
    ) -> Self {
        Self {
            accounts,
            sets,
            hasher,
            policy: AccessPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// register
    ///
    /// Creates a `USER` account. A taken email fails with `Conflict` before anything is written.
    ///
    /// The existence check and the insert are not atomic. Two concurrent registrations with the
    /// same email can both pass the check; the UNIQUE constraint on `accounts.email` then rejects
    /// the loser, which also surfaces as `Conflict`.
    pub async fn register(&self, candidate: RegisterAccountRequest) -> Result<AccountView, AppError> {
        if self.accounts.exists_by_email(&candidate.email).await? {
            tracing::warn!("Registration rejected: email already in use");
            return Err(AppError::Conflict("User with this email already exists!".to_string()));
        }

        require_non_blank("nickname", &candidate.nickname)?;
        require_email(&candidate.email)?;
        require_non_blank("password", &candidate.password)?;

        let password_hash = self.hasher.hash(&candidate.password)?;

        let created = self
            .accounts
            .insert(NewAccount {
                nickname: candidate.nickname,
                email: candidate.email,
                password_hash,
                role: Role::User,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(account_id = created.id, "Account registered");
        Ok(created.project())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<AccountView, AppError> {
        self.accounts
            .find_by_id(id)
            .await?
            .map(|account| account.project())
            .ok_or_else(|| user_not_found(id))
    }

    /// list_all
    ///
    /// Every account, ascending by id.
    pub async fn list_all(&self) -> Result<Vec<AccountView>, AppError> {
        let accounts = self.accounts.find_all_ordered_by_id().await?;
        Ok(accounts.iter().map(|account| account.project()).collect())
    }

    /// authenticate
    ///
    /// Checks an email/password pair. Unknown email and wrong password are indistinguishable
    /// to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AccountView, AppError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !self.hasher.verify(password, &account.password_hash) {
            tracing::warn!(account_id = account.id, "Login rejected: wrong password");
            return Err(AppError::Unauthorized);
        }

        Ok(account.project())
    }

    /// update_user
    ///
    /// Access check, then fetch, then a full overwrite of nickname, email, password and role.
    /// There is no partial update: every field of `changes` is applied. With the default
    /// policy that includes `role`, so a self-service update can change the caller's own role.
    pub async fn update_user(
        &self,
        principal: &Principal,
        target_id: i64,
        changes: UpdateAccountRequest,
    ) -> Result<AccountView, AppError> {
        let decision = self.policy.can_modify(principal, target_id, Intent::Update);
        if !decision.allowed {
            tracing::warn!(principal_id = principal.id, target_id, "Update denied");
            return Err(AppError::Forbidden(decision.reason));
        }

        let mut account = self
            .accounts
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| user_not_found(target_id))?;

        require_non_blank("nickname", &changes.nickname)?;
        require_email(&changes.email)?;
        require_non_blank("password", &changes.password)?;

        account.nickname = changes.nickname;
        account.email = changes.email;
        account.password_hash = self.hasher.hash(&changes.password)?;
        if self.policy.role_overwritable_on_update {
            account.role = changes.role;
        }

        let saved = self.accounts.save(&account).await?;

        tracing::info!(principal_id = principal.id, target_id, "Account updated");
        Ok(saved.project())
    }

    /// delete_user
    ///
    /// Access check, then existence check, then delete. Admins cannot delete themselves.
    pub async fn delete_user(&self, principal: &Principal, target_id: i64) -> Result<(), AppError> {
        let decision = self.policy.can_modify(principal, target_id, Intent::Delete);
        if !decision.allowed {
            tracing::warn!(principal_id = principal.id, target_id, "Delete denied");
            return Err(AppError::Forbidden(decision.reason));
        }

        if !self.accounts.exists_by_id(target_id).await? {
            return Err(user_not_found(target_id));
        }

        self.accounts.delete_by_id(target_id).await?;

        tracing::info!(principal_id = principal.id, target_id, "Account deleted");
        Ok(())
    }

    /// list_sets_for_user
    ///
    /// All sets owned by `target_id`, each embedding the owner's projected account.
    pub async fn list_sets_for_user(&self, target_id: i64) -> Result<Vec<FlashcardSetView>, AppError> {
        let owner = self
            .accounts
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| user_not_found(target_id))?;

        let sets = self.sets.find_by_owner_id(target_id).await?;
        Ok(sets.iter().map(|set| set.project(&owner)).collect())
    }
}
