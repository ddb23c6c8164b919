// src/handlers/payments.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::{
    db::OrderStore,
    error::AppError,
    extractors::ValidatedJson,
    models::order::{ConfirmPaymentRequest, OrderStatus},
    services::payment::ConfirmPayment,
    state::AppState,
    utils::jwt::Session,
};

/// Confirms a payment with the gateway and moves the order `PENDING → PAID`.
///
/// The only way an order becomes `PAID`.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = session.require()?;

    // 1. The order must belong to the caller
    let order = state
        .store
        .order_by_number_for_user(&payload.order_id, viewer.id)
        .await?
        .ok_or(AppError::NotFound("Order not found".to_string()))?;

    // 2. Amount must match exactly; nothing is sent to the gateway otherwise
    if payload.amount != order.total_amount {
        tracing::warn!(
            "Amount mismatch for order {}: expected {}, got {}",
            order.order_number,
            order.total_amount,
            payload.amount
        );
        return Err(AppError::BadRequest(
            "Payment amount does not match the order total".to_string(),
        ));
    }

    // 3. Retried confirmations of an already-paid order are answered from the store
    match order.status {
        OrderStatus::Pending => {}
        OrderStatus::Paid if order.payment_key.as_deref() == Some(payload.payment_key.as_str()) => {
            return Ok(Json(order));
        }
        status => {
            return Err(AppError::Conflict(format!(
                "Order cannot be paid in status {status}"
            )));
        }
    }

    // 4. Gateway confirm
    state
        .gateway
        .confirm(&ConfirmPayment {
            payment_key: payload.payment_key.clone(),
            order_id: order.order_number.clone(),
            amount: order.total_amount,
        })
        .await?;

    // 5. Record PAID once; a concurrent confirmation that got there first wins
    let paid = state
        .store
        .mark_order_paid(order.id, &payload.payment_key, Utc::now())
        .await?
        .ok_or_else(|| AppError::Conflict("Order is no longer pending".to_string()))?;

    tracing::info!("Order {} paid by user {}", paid.order_number, viewer.id);
    Ok(Json(paid))
}
