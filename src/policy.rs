use crate::models::Principal;

/// Reason attached to a denied update.
pub const UPDATE_DENIED: &str = "not allowed to update other users";
/// Reason attached to a denied delete.
pub const DELETE_DENIED: &str = "cannot delete yourself or other users";

/// The kind of mutation being checked against a target account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Update,
    Delete,
}

/// AccessDecision
///
/// Produced per check and consumed immediately; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: String,
}

impl AccessDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
        }
    }

    fn deny(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: reason.to_string(),
        }
    }
}

/// AccessPolicy
///
/// Decides whether a principal may mutate a target account.
///
/// Update and delete are asymmetric:
/// - **Update**: admins, or the account owner (self-service).
/// - **Delete**: admins only, and never their own account. A regular user cannot delete
///   any account, including their own.
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    /// Whether the update path may overwrite `role`. Self-service updates currently can
    /// promote their own account; setting this to `false` keeps the stored role instead.
    pub role_overwritable_on_update: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            role_overwritable_on_update: true,
        }
    }
}

impl AccessPolicy {
    /// can_modify
    ///
    /// Pure function of its inputs; no side effects.
    pub fn can_modify(&self, principal: &Principal, target_id: i64, intent: Intent) -> AccessDecision {
        let is_admin = principal.is_admin();
        let is_self = principal.id == target_id;

        match intent {
            Intent::Update if is_admin || is_self => AccessDecision::allow(),
            Intent::Update => AccessDecision::deny(UPDATE_DENIED),
            Intent::Delete if is_admin && !is_self => AccessDecision::allow(),
            Intent::Delete => AccessDecision::deny(DELETE_DENIED),
        }
    }
}
