// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    db::UserStore,
    error::AppError,
    extractors::ValidatedJson,
    handlers::blank_to_none,
    models::user::{UpdateProfileRequest, UserChanges},
    state::AppState,
    utils::{
        hash::{hash_password, verify_password},
        jwt::Session,
    },
};

/// Get the current user's profile.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = session.require()?;

    let user = state
        .store
        .user_by_id(viewer.id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Self-service profile edit.
///
/// Role and permission flags are admin-only and cannot be changed here.
/// A new password is accepted only together with the correct current password.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = session.require()?;

    let user = state
        .store
        .user_by_id(viewer.id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let password = match payload.new_password {
        Some(new_password) => {
            let current = payload.current_password.as_deref().ok_or_else(|| {
                AppError::BadRequest("Current password is required to set a new one".to_string())
            })?;
            if !verify_password(current, &user.password)? {
                return Err(AppError::BadRequest(
                    "Current password is incorrect".to_string(),
                ));
            }
            Some(hash_password(&new_password)?)
        }
        None => None,
    };

    let changes = UserChanges {
        name: payload.name.map(|n| n.trim().to_string()),
        password,
        phone: payload.phone.map(Some),
        expert_field: payload.expert_field.map(blank_to_none),
        expert_license: payload.expert_license.map(blank_to_none),
        ..Default::default()
    };

    let updated = state
        .store
        .update_user(user.id, changes)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(updated))
}
