// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    db::UserStore,
    error::AppError,
    extractors::ValidatedJson,
    models::user::{LoginRequest, NewUser, RegisterRequest},
    state::AppState,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new member account.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let hashed_password = hash_password(&payload.password)?;

    let user = state
        .store
        .insert_user(NewUser::member(
            payload.name.trim().to_string(),
            payload.email.trim().to_lowercase(),
            hashed_password,
            payload.phone,
        ))
        .await?;

    tracing::info!("Registered user {} ({})", user.id, user.email);
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
///
/// Unknown emails and wrong passwords get the same 401.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::AuthError("Invalid email or password".to_string());

    let user = state
        .store
        .user_by_email(payload.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(invalid());
    }

    let token = sign_jwt(
        user.id,
        user.role,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user": user,
    })))
}
