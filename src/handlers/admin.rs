// src/handlers/admin.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    db::{OrderStore, UserStore},
    error::AppError,
    extractors::ValidatedJson,
    handlers::blank_to_none,
    models::{
        order::{OrderListParams, OrderStatus, UpdateOrderStatusRequest},
        user::{AdminCreateUserRequest, AdminUpdateUserRequest, NewUser, Role, UserChanges},
    },
    policy::{Action, Resource, ensure},
    state::AppState,
    utils::{hash::hash_password, jwt::Session},
};

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::BackOffice, Action::Read)?;

    let users = state.store.list_users().await.map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        e
    })?;

    Ok(Json(users))
}

/// Creates a user with a specific role and permission flags.
/// Admin only.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::BackOffice, Action::Create)?;

    let hashed_password = hash_password(&payload.password)?;

    let user = state
        .store
        .insert_user(NewUser {
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_lowercase(),
            password: hashed_password,
            role: payload.role.unwrap_or(Role::User),
            is_expert: payload.is_expert,
            can_manage_content: payload.can_manage_content,
            can_manage_inquiry: payload.can_manage_inquiry,
            phone: payload.phone,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Updates a user's role, permissions or expert metadata.
/// Admin only. An admin cannot demote themselves.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::BackOffice, Action::Update)?;
    let viewer = session.require()?;

    if id == viewer.id && payload.role == Some(Role::User) {
        return Err(AppError::BadRequest(
            "Cannot remove your own admin role".to_string(),
        ));
    }

    let password = match payload.password {
        Some(password) => Some(hash_password(&password)?),
        None => None,
    };

    let changes = UserChanges {
        name: payload.name.map(|n| n.trim().to_string()),
        password,
        phone: None,
        role: payload.role,
        is_expert: payload.is_expert,
        can_manage_content: payload.can_manage_content,
        can_manage_inquiry: payload.can_manage_inquiry,
        expert_field: payload.expert_field.map(blank_to_none),
        expert_license: payload.expert_license.map(blank_to_none),
        expert_verified: payload.expert_verified,
    };

    let user = state
        .store
        .update_user(id, changes)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    tracing::info!("Admin {} updated user {}", viewer.id, user.id);
    Ok(Json(user))
}

/// Deletes a user by ID.
/// Admin only. Prevents deleting self.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::BackOffice, Action::Delete)?;
    let viewer = session.require()?;

    if id == viewer.id {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    if !state.store.delete_user(id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!("Admin {} deleted user {}", viewer.id, id);
    Ok(StatusCode::NO_CONTENT)
}

/// All orders, newest first, optionally filtered by `?status=`.
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<OrderListParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::BackOffice, Action::Read)?;
    Ok(Json(state.store.list_orders(params.status).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::BackOffice, Action::Read)?;

    let order = state
        .store
        .order_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(order))
}

/// Moves an order one step along fulfilment, or cancels it.
///
/// Skips, backwards moves and `PAID` are rejected; payment confirmation owns that step.
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::BackOffice, Action::Update)?;

    let order = state
        .store
        .order_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Order not found".to_string()))?;

    let target: OrderStatus = payload.status.trim().parse().map_err(AppError::BadRequest)?;

    if !order.status.admin_can_move_to(target) {
        return Err(AppError::BadRequest(format!(
            "Cannot change order status from {} to {}",
            order.status, target
        )));
    }

    let updated = state
        .store
        .transition_order(id, order.status, target)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Order status was changed by another request".to_string())
        })?;

    tracing::info!(
        "Order {} moved {} -> {}",
        updated.order_number,
        order.status,
        updated.status
    );
    Ok(Json(updated))
}
