use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Comments are stored trimmed, so whitespace alone counts as empty.
fn validate_not_blank(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("Comment must not be blank")));
    }
    Ok(())
}

/// Represents the 'comments' table in the database.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub inquiry_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for displaying a comment with author info.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub inquiry_id: i64,
    pub user_id: i64,
    pub author_name: String,
    /// Lets the board badge answers written by experts.
    pub author_is_expert: bool,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(range(min = 1, message = "Inquiry id is required."))]
    pub inquiry_id: i64,

    #[validate(
        length(
            min = 1,
            max = 2000,
            message = "Comment must be between 1 and 2000 characters"
        ),
        custom(function = validate_not_blank)
    )]
    pub content: String,

    /// Password of a private inquiry, for commenters without session access.
    pub password: Option<String>,
}

/// DTO for editing a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(
        length(
            min = 1,
            max = 2000,
            message = "Comment must be between 1 and 2000 characters"
        ),
        custom(function = validate_not_blank)
    )]
    pub content: String,
}
