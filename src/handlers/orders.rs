// src/handlers/orders.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    db::{OrderStore, ProductStore},
    error::AppError,
    extractors::ValidatedJson,
    models::order::CreateOrderRequest,
    policy::{Action, Resource, ensure},
    services::checkout::{build_order, order_number},
    state::AppState,
    utils::jwt::Session,
};

/// The signed-in user's orders, newest first.
pub async fn list_my_orders(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = session.require()?;
    let orders = state.store.orders_for_user(viewer.id).await?;
    Ok(Json(orders))
}

/// Places an order in `PENDING`.
///
/// Prices come from the catalogue at this moment; any total sent by the client is ignored.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = session.require()?;
    ensure(
        Some(viewer),
        Resource::Order {
            owner_id: viewer.id,
        },
        Action::Create,
    )?;

    let mut ids: Vec<i64> = payload.items.iter().map(|line| line.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let products = state.store.products_by_ids(&ids).await?;

    let order = build_order(viewer.id, &payload.items, &products, order_number(Utc::now()))?;
    let order = state.store.insert_order(order).await?;

    tracing::info!(
        "Order {} placed by user {} ({} KRW)",
        order.order_number,
        viewer.id,
        order.total_amount
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// One of the signed-in user's orders, by order number.
/// Other users' orders are reported as not found.
pub async fn get_my_order(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(order_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = session.require()?;

    let order = state
        .store
        .order_by_number_for_user(&order_number, viewer.id)
        .await?
        .ok_or(AppError::NotFound("Order not found".to_string()))?;

    ensure(
        Some(viewer),
        Resource::Order {
            owner_id: order.user_id,
        },
        Action::Read,
    )?;

    Ok(Json(order))
}
