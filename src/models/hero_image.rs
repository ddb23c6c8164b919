use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate_clearable_path, validate_media_path};

/// Represents the 'hero_images' table (landing-page carousel).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroImage {
    pub id: i64,
    pub image_url: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub is_active: bool,
    /// Display rank, ascending.
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct HeroImageDraft {
    pub image_url: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub is_active: bool,
    pub order: i32,
}

impl From<&HeroImage> for HeroImageDraft {
    fn from(image: &HeroImage) -> Self {
        Self {
            image_url: image.image_url.clone(),
            title: image.title.clone(),
            subtitle: image.subtitle.clone(),
            link_url: image.link_url.clone(),
            link_text: image.link_text.clone(),
            is_active: image.is_active,
            order: image.order,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHeroImageRequest {
    #[validate(
        length(min = 1, max = 500, message = "Image URL is required."),
        custom(function = validate_media_path)
    )]
    pub image_url: String,
    #[validate(length(max = 100, message = "Title must be at most 100 characters."))]
    pub title: Option<String>,
    #[validate(length(max = 200, message = "Subtitle must be at most 200 characters."))]
    pub subtitle: Option<String>,
    #[validate(custom(function = validate_clearable_path))]
    pub link_url: Option<String>,
    #[validate(length(max = 50, message = "Link text must be at most 50 characters."))]
    pub link_text: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[validate(range(min = 0, message = "Order must not be negative."))]
    #[serde(default)]
    pub order: i32,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHeroImageRequest {
    #[validate(
        length(min = 1, max = 500, message = "Image URL is required."),
        custom(function = validate_media_path)
    )]
    pub image_url: Option<String>,
    #[validate(length(max = 100, message = "Title must be at most 100 characters."))]
    pub title: Option<String>,
    #[validate(length(max = 200, message = "Subtitle must be at most 200 characters."))]
    pub subtitle: Option<String>,
    #[validate(custom(function = validate_clearable_path))]
    pub link_url: Option<String>,
    #[validate(length(max = 50, message = "Link text must be at most 50 characters."))]
    pub link_text: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, message = "Order must not be negative."))]
    pub order: Option<i32>,
}
