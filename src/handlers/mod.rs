// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod comments;
pub mod content;
pub mod health;
pub mod hero_images;
pub mod inquiries;
pub mod orders;
pub mod payments;
pub mod products;
pub mod profile;

/// An empty string clears a nullable text column.
pub(crate) fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
