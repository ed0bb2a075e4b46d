//! User profile projection used by the entitlement updater.
//!
//! Profiles are owned by the external identity/profile store; this pipeline
//! only ever mutates `role` and `lifetime`, never creates or deletes the
//! profile itself.

use serde::{Deserialize, Serialize};

use super::entitlement::EntitlementChange;
use crate::domain::foundation::UserId;

/// Access role granted to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Premium,
    Vip,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Premium => "premium",
            Role::Vip => "vip",
            Role::Admin => "admin",
        }
    }

    /// Parses a role string, case-insensitively. Unknown values fall back to
    /// the base role so a malformed store row never locks anyone out.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "premium" => Role::Premium,
            "vip" => Role::Vip,
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user profile as seen by the reconciliation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub lifetime: bool,
}

impl UserProfile {
    /// Applies an entitlement change in place.
    ///
    /// Returns `true` if any field actually changed. Re-applying an already
    /// granted entitlement is a no-op, never a toggle, which makes profile
    /// writes safe to repeat under webhook redelivery.
    pub fn apply(&mut self, change: &EntitlementChange) -> bool {
        match change {
            EntitlementChange::SetRole(role) => {
                if self.role == *role {
                    false
                } else {
                    self.role = *role;
                    true
                }
            }
            EntitlementChange::GrantLifetime => {
                if self.lifetime {
                    false
                } else {
                    self.lifetime = true;
                    true
                }
            }
        }
    }
}
