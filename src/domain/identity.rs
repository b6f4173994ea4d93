// src/domain/identity.rs
use crate::domain::DomainError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
            role: Role::User,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Identity context handed to every operation that needs to know who is acting.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    /// Return the signed-in user or fail with `AuthRequired` naming the action.
    pub fn require_user(&self, action: &'static str) -> Result<&User, DomainError> {
        self.user.as_ref().ok_or(DomainError::AuthRequired(action))
    }

    pub fn require_admin(&self, action: &'static str) -> Result<&User, DomainError> {
        let user = self.require_user(action)?;
        if user.role != Role::Admin {
            return Err(DomainError::Forbidden(format!(
                "{action} requires the admin role"
            )));
        }
        Ok(user)
    }
}
