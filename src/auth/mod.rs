/*!
 * # Authorization
 *
 * Decides whether an authenticated caller may act on a tenant's orders.
 * Authentication itself happens upstream; this module only receives the
 * already-verified identity as an [`Actor`].
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The authenticated identity performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub email: Option<String>,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email,
        }
    }
}

/// Access decision for tenant-scoped resources.
pub trait AuthorizationPolicy: Send + Sync + fmt::Debug {
    /// Returns true when `actor` may manage resources of the tenant owned by `owner_id`.
    fn can_manage(&self, actor: &Actor, owner_id: &str) -> bool;
}

/// Grants access to the tenant owner and to a configured set of superadmins.
#[derive(Debug, Clone, Default)]
pub struct OwnerOrSuperadmin {
    superadmin_emails: HashSet<String>,
}

impl OwnerOrSuperadmin {
    pub fn new<I, S>(superadmin_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let superadmin_emails = superadmin_emails
            .into_iter()
            .map(|email| email.as_ref().trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();
        Self { superadmin_emails }
    }

    /// Parses a comma separated list such as `"ops@shop.io, root@shop.io"`.
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn is_superadmin(&self, email: &str) -> bool {
        self.superadmin_emails
            .contains(&email.trim().to_lowercase())
    }
}

impl AuthorizationPolicy for OwnerOrSuperadmin {
    fn can_manage(&self, actor: &Actor, owner_id: &str) -> bool {
        if actor.user_id == owner_id {
            return true;
        }
        actor
            .email
            .as_deref()
            .map(|email| self.is_superadmin(email))
            .unwrap_or(false)
    }
}
