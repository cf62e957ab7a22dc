//! User domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{MAX_USERNAME_LENGTH, ROLE_STAFF, ROLE_USER};
use crate::errors::{AppError, AppResult};

/// Letters, digits and `@ . + - _`, the same alphabet the site has always accepted.
static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

/// Check a username chosen at registration.
pub fn validate_username(username: &str) -> AppResult<()> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LENGTH as usize {
        return Err(AppError::validation(format!(
            "Username must be between 1 and {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if !USERNAME_PATTERN.is_match(username) {
        return Err(AppError::validation(
            "Username may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(())
}

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Staff,
}

impl UserRole {
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Staff)
    }
}

impl From<bool> for UserRole {
    fn from(is_staff: bool) -> Self {
        if is_staff {
            UserRole::Staff
        } else {
            UserRole::User
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_STAFF => UserRole::Staff,
            _ => UserRole::User,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Staff => write!(f, "{}", ROLE_STAFF),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// First name when set, username otherwise.
    pub fn display_name(&self) -> &str {
        if self.first_name.is_empty() {
            &self.username
        } else {
            &self.first_name
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "user")]
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role.to_string(),
            created_at: user.created_at,
        }
    }
}
