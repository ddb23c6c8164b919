// src/models/user.rs

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Mobile or landline number, dashes optional (e.g. 010-1234-5678).
pub static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0\d{1,2}-?\d{3,4}-?\d{4}$").expect("phone pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub role: Role,
    pub is_expert: bool,
    pub can_manage_content: bool,
    pub can_manage_inquiry: bool,
    pub expert_field: Option<String>,
    pub expert_license: Option<String>,
    pub expert_verified: bool,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a user row. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub is_expert: bool,
    pub can_manage_content: bool,
    pub can_manage_inquiry: bool,
    pub phone: Option<String>,
}

impl NewUser {
    pub fn member(name: String, email: String, password_hash: String, phone: Option<String>) -> Self {
        Self {
            name,
            email,
            password: password_hash,
            role: Role::User,
            is_expert: false,
            can_manage_content: false,
            can_manage_inquiry: false,
            phone,
        }
    }
}

/// Partial update of a user row; `None` leaves the column untouched.
/// The double options clear a nullable column when set to `Some(None)`.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub password: Option<String>,
    pub phone: Option<Option<String>>,
    pub role: Option<Role>,
    pub is_expert: Option<bool>,
    pub can_manage_content: Option<bool>,
    pub can_manage_inquiry: Option<bool>,
    pub expert_field: Option<Option<String>>,
    pub expert_license: Option<Option<String>>,
    pub expert_verified: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.password.is_none()
            && self.phone.is_none()
            && self.role.is_none()
            && self.is_expert.is_none()
            && self.can_manage_content.is_none()
            && self.can_manage_inquiry.is_none()
            && self.expert_field.is_none()
            && self.expert_license.is_none()
            && self.expert_verified.is_none()
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters."))]
    pub name: String,
    #[validate(email(message = "Email address is not valid."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,
    #[validate(regex(path = *PHONE_RE, message = "Phone number is not valid."))]
    pub phone: Option<String>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254, message = "Email is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "Password is required."))]
    pub password: String,
}

/// Self-service profile edit. Changing the password requires the current one.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters."))]
    pub name: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Phone number is not valid."))]
    pub phone: Option<String>,
    pub current_password: Option<String>,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub new_password: Option<String>,
    #[validate(length(max = 100, message = "Expert field must be at most 100 characters."))]
    pub expert_field: Option<String>,
    #[validate(length(max = 100, message = "License must be at most 100 characters."))]
    pub expert_license: Option<String>,
}

/// DTO for an admin creating an account with a role and permission flags.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateUserRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters."))]
    pub name: String,
    #[validate(email(message = "Email address is not valid."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,
    pub role: Option<Role>,
    #[serde(default)]
    pub is_expert: bool,
    #[serde(default)]
    pub can_manage_content: bool,
    #[serde(default)]
    pub can_manage_inquiry: bool,
    #[validate(regex(path = *PHONE_RE, message = "Phone number is not valid."))]
    pub phone: Option<String>,
}

/// DTO for an admin editing a user's role, permissions or expert metadata.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters."))]
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_expert: Option<bool>,
    pub can_manage_content: Option<bool>,
    pub can_manage_inquiry: Option<bool>,
    #[validate(length(max = 100, message = "Expert field must be at most 100 characters."))]
    pub expert_field: Option<String>,
    #[validate(length(max = 100, message = "License must be at most 100 characters."))]
    pub expert_license: Option<String>,
    pub expert_verified: Option<bool>,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: Option<String>,
}
