// src/models/inquiry.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{comment::CommentView, user::PHONE_RE, validate_media_paths};

/// Represents the 'inquiries' table in the database.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: i64,
    pub title: String,
    pub content: String,

    /// Contact fields for visitors who post without an account.
    /// Email and phone are shown to the author and inquiry staff only.
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_phone: Option<String>,

    /// Owning member, if any. Cleared when the account is deleted.
    pub user_id: Option<i64>,

    pub is_private: bool,

    /// Argon2 hash; present iff `is_private`.
    #[serde(skip)]
    pub password: Option<String>,

    pub view_count: i64,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full set of writable inquiry columns, used for both insert and update.
#[derive(Debug, Clone)]
pub struct InquiryDraft {
    pub title: String,
    pub content: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_phone: Option<String>,
    pub user_id: Option<i64>,
    pub is_private: bool,
    pub password: Option<String>,
    pub attachments: Vec<String>,
}

impl InquiryDraft {
    /// Starts an edit from the stored row.
    pub fn from_existing(inquiry: &Inquiry) -> Self {
        Self {
            title: inquiry.title.clone(),
            content: inquiry.content.clone(),
            author_name: inquiry.author_name.clone(),
            author_email: inquiry.author_email.clone(),
            author_phone: inquiry.author_phone.clone(),
            user_id: inquiry.user_id,
            is_private: inquiry.is_private,
            password: inquiry.password.clone(),
            attachments: inquiry.attachments.clone(),
        }
    }
}

/// Row shape for the board listing. Never carries the body or attachments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquirySummary {
    pub id: i64,
    pub title: String,
    pub author_name: String,
    pub user_id: Option<i64>,
    pub is_private: bool,
    pub view_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Response for an admitted read: the inquiry plus its comments.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryDetail {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub author_display_name: String,
    pub comments: Vec<CommentView>,
}

/// DTO for posting an inquiry, as a guest or a signed-in member.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInquiryRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters."))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content must be between 1 and 10000 characters."
    ))]
    pub content: String,
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters."))]
    pub author_name: Option<String>,
    #[validate(email(message = "Email address is not valid."))]
    pub author_email: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Phone number is not valid."))]
    pub author_phone: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[validate(length(min = 4, max = 64, message = "Password must be between 4 and 64 characters."))]
    pub password: Option<String>,
    #[serde(default)]
    #[validate(
        length(max = 10, message = "At most 10 attachments are allowed."),
        custom(function = validate_media_paths)
    )]
    pub attachments: Vec<String>,
}

/// DTO for editing an inquiry. PATCH treats absent fields as unchanged;
/// PUT requires title and content.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInquiryRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters."))]
    pub title: Option<String>,
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content must be between 1 and 10000 characters."
    ))]
    pub content: Option<String>,
    pub is_private: Option<bool>,
    #[validate(length(min = 4, max = 64, message = "Password must be between 4 and 64 characters."))]
    pub password: Option<String>,
    #[validate(
        length(max = 10, message = "At most 10 attachments are allowed."),
        custom(function = validate_media_paths)
    )]
    pub attachments: Option<Vec<String>>,
}

/// Query string for a gated read.
#[derive(Debug, Deserialize)]
pub struct InquiryReadParams {
    pub password: Option<String>,
}
