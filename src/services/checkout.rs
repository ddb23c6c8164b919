// src/services/checkout.rs

//! Turns a cart into an order: snapshot prices, server-side total, order number.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        order::{NewOrder, NewOrderItem, OrderLineRequest},
        product::Product,
    },
};

/// `ORD-<yyyymmddHHMMSS>-<6 hex chars>`.
pub fn order_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "ORD-{}-{}",
        now.format("%Y%m%d%H%M%S"),
        suffix[..6].to_uppercase()
    )
}

/// Prices every line from the current catalogue.
///
/// The whole order fails if any product is missing or out of stock, or if the total is zero.
pub fn build_order(
    user_id: i64,
    lines: &[OrderLineRequest],
    products: &[Product],
    order_number: String,
) -> Result<NewOrder, AppError> {
    let catalogue: HashMap<i64, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut items = Vec::with_capacity(lines.len());
    let mut total_amount: i64 = 0;

    for line in lines {
        let product = catalogue
            .get(&line.product_id)
            .ok_or_else(|| AppError::BadRequest(format!("Product {} not found", line.product_id)))?;

        if !product.in_stock {
            return Err(AppError::BadRequest(format!(
                "'{}' is out of stock",
                product.name
            )));
        }

        let price = product.unit_price();
        total_amount = price
            .checked_mul(i64::from(line.quantity))
            .and_then(|line_total| total_amount.checked_add(line_total))
            .ok_or_else(|| AppError::BadRequest("Order total is too large".to_string()))?;

        items.push(NewOrderItem {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: line.quantity,
            price,
        });
    }

    // Confirmation needs a positive amount, so a free order could never be paid.
    if total_amount == 0 {
        return Err(AppError::BadRequest(
            "Order total must be greater than zero".to_string(),
        ));
    }

    Ok(NewOrder {
        order_number,
        user_id,
        total_amount,
        items,
    })
}
