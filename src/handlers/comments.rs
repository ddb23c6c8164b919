// src/handlers/comments.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    db::CommentStore,
    error::AppError,
    extractors::ValidatedJson,
    handlers::inquiries,
    models::comment::{Comment, CreateCommentRequest, UpdateCommentRequest},
    policy::{Action, Resource, ensure},
    state::AppState,
    utils::jwt::Session,
};

async fn load(state: &AppState, id: i64) -> Result<Comment, AppError> {
    state
        .store
        .comment_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))
}

/// Adds a comment to an inquiry.
/// Requires: Login. Private inquiries also require admission (session or password).
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Login
    let viewer = session.require()?;
    ensure(
        Some(viewer),
        Resource::Comment {
            author_id: viewer.id,
        },
        Action::Create,
    )?;

    // 2. Inquiry exists and the viewer is admitted to it
    let inquiry = inquiries::load(&state, payload.inquiry_id).await?;
    inquiries::admit(&inquiry, Some(viewer), payload.password.as_deref())?;

    // 3. Insert
    let comment = state
        .store
        .insert_comment(inquiry.id, viewer.id, payload.content.trim())
        .await?;

    tracing::info!("User {} commented on inquiry {}", viewer.id, inquiry.id);
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Edits a comment. Author or inquiry staff only.
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let existing = load(&state, id).await?;
    ensure(
        session.viewer(),
        Resource::Comment {
            author_id: existing.user_id,
        },
        Action::Update,
    )?;

    let updated = state
        .store
        .update_comment(id, payload.content.trim())
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    Ok(Json(updated))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let existing = load(&state, id).await?;
    ensure(
        session.viewer(),
        Resource::Comment {
            author_id: existing.user_id,
        },
        Action::Delete,
    )?;

    if !state.store.delete_comment(id).await? {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
