//! Directory records used to gate order operations.

use common::UserId;
use serde::{Deserialize, Serialize};

/// Role assigned to a directory account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Places and cancels own orders.
    #[default]
    Buyer,

    /// Reviews pending orders and records tracking milestones.
    Manager,

    /// Administers accounts; not part of the order review flow.
    Admin,
}

impl Role {
    /// Returns true if this role may approve or reject orders.
    pub fn can_review_orders(&self) -> bool {
        matches!(self, Role::Manager)
    }

    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A directory account as the order flows see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Directory identifier.
    pub id: UserId,

    /// Account email, the identity orders are keyed on.
    pub email: String,

    /// Assigned role.
    pub role: Role,

    /// Suspended accounts may not place, review, or cancel orders.
    pub suspended: bool,

    /// Reason shown to a suspended account, if one was recorded.
    pub suspend_reason: Option<String>,
}

impl UserAccount {
    /// Creates an active buyer account.
    pub fn buyer(email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            role: Role::Buyer,
            suspended: false,
            suspend_reason: None,
        }
    }

    /// Creates an active manager account.
    pub fn manager(email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            role: Role::Manager,
            suspended: false,
            suspend_reason: None,
        }
    }

    /// Marks the account suspended with a reason.
    pub fn suspend(mut self, reason: impl Into<String>) -> Self {
        self.suspended = true;
        self.suspend_reason = Some(reason.into());
        self
    }

    /// Returns the suspension reason, or a generic message when none was recorded.
    pub fn suspension_message(&self) -> String {
        self.suspend_reason
            .clone()
            .unwrap_or_else(|| "account suspended".to_string())
    }
}
