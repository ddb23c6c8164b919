// src/models/content.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_clearable_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentCategory {
    Lifestyle,
    Treatment,
    Notice,
}

impl ContentCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentCategory::Lifestyle => "LIFESTYLE",
            ContentCategory::Treatment => "TREATMENT",
            ContentCategory::Notice => "NOTICE",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIFESTYLE" => Ok(ContentCategory::Lifestyle),
            "TREATMENT" => Ok(ContentCategory::Treatment),
            "NOTICE" => Ok(ContentCategory::Notice),
            other => Err(format!("unknown content category '{other}'")),
        }
    }
}

/// Represents the 'contents' table (published articles).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    /// Sanitized HTML.
    pub body: String,
    pub category: ContentCategory,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ContentDraft {
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub category: ContentCategory,
    pub thumbnail: Option<String>,
    pub published: bool,
}

impl From<&Content> for ContentDraft {
    fn from(content: &Content) -> Self {
        Self {
            title: content.title.clone(),
            excerpt: content.excerpt.clone(),
            body: content.body.clone(),
            category: content.category,
            thumbnail: content.thumbnail.clone(),
            published: content.published,
        }
    }
}

/// Listing filter.
#[derive(Debug, Clone, Copy)]
pub struct ContentFilter {
    pub published_only: bool,
    pub category: Option<ContentCategory>,
    pub limit: i64,
    pub offset: i64,
}

/// Card shown in article lists (no body).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub category: ContentCategory,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Content> for ContentSummary {
    fn from(content: Content) -> Self {
        Self {
            id: content.id,
            title: content.title,
            excerpt: content.excerpt,
            category: content.category,
            thumbnail: content.thumbnail,
            published: content.published,
            view_count: content.view_count,
            created_at: content.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters."))]
    pub title: String,
    #[validate(length(max = 300, message = "Excerpt must be at most 300 characters."))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1, max = 200000, message = "Body is required."))]
    pub body: String,
    pub category: ContentCategory,
    #[validate(custom(function = validate_clearable_path))]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// PATCH: absent fields stay unchanged. PUT: title, body and category are required.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters."))]
    pub title: Option<String>,
    #[validate(length(max = 300, message = "Excerpt must be at most 300 characters."))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1, max = 200000, message = "Body is required."))]
    pub body: Option<String>,
    pub category: Option<ContentCategory>,
    #[validate(custom(function = validate_clearable_path))]
    pub thumbnail: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ContentListParams {
    pub category: Option<ContentCategory>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
