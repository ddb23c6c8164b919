// src/models/order.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order lifecycle.
///
/// `Pending → Paid → Preparing → Shipped → Delivered`, and `Cancelled` from any
/// non-terminal state. Only the payment confirmation may move `Pending → Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The single state an admin may advance to, if any.
    pub fn next_fulfilment_step(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Paid => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    /// Whether an admin status update from `self` to `target` is allowed.
    pub fn admin_can_move_to(self, target: OrderStatus) -> bool {
        if target == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next_fulfilment_step() == Some(target)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{other}'")),
        }
    }
}

/// Represents the 'orders' table, with its lines attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub payment_key: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub user_id: i64,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents the 'order_items' table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    /// Cleared if the product is deleted later; the name snapshot remains.
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i32,
    /// Unit price captured when the order was placed.
    pub price: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: i64,
    pub total_amount: i64,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    #[validate(range(min = 1, message = "Product id is required."))]
    pub product_id: i64,
    #[validate(range(min = 1, max = 99, message = "Quantity must be between 1 and 99."))]
    pub quantity: i32,
}

/// DTO for placing an order. Any total sent by the client is ignored.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(
        length(min = 1, max = 50, message = "An order needs between 1 and 50 items."),
        nested
    )]
    pub items: Vec<OrderLineRequest>,
}

/// DTO for the admin status update.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1, message = "Status is required."))]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub status: Option<OrderStatus>,
}

/// Body of `POST /api/payments/confirm`, as forwarded by the gateway's success redirect.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    #[validate(length(min = 1, max = 200, message = "Payment key is required."))]
    pub payment_key: String,
    /// The order number.
    #[validate(length(min = 1, max = 64, message = "Order id is required."))]
    pub order_id: String,
    #[validate(range(min = 1, message = "Amount must be a positive number."))]
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;
    use super::*;

    #[test]
    fn fulfilment_advances_one_step_at_a_time() {
        assert!(Paid.admin_can_move_to(Preparing));
        assert!(Preparing.admin_can_move_to(Shipped));
        assert!(Shipped.admin_can_move_to(Delivered));

        assert!(!Paid.admin_can_move_to(Shipped));
        assert!(!Preparing.admin_can_move_to(Delivered));
        assert!(!Shipped.admin_can_move_to(Preparing));
    }

    #[test]
    fn admins_cannot_mark_orders_paid() {
        assert!(!Pending.admin_can_move_to(Paid));
        assert!(!Pending.admin_can_move_to(Shipped));
        assert!(!Pending.admin_can_move_to(Delivered));
    }

    #[test]
    fn cancel_only_from_non_terminal_states() {
        for status in [Pending, Paid, Preparing, Shipped] {
            assert!(status.admin_can_move_to(Cancelled), "{status} should cancel");
        }
        assert!(!Delivered.admin_can_move_to(Cancelled));
        assert!(!Cancelled.admin_can_move_to(Cancelled));
    }

    #[test]
    fn terminal_states_go_nowhere() {
        for target in [Pending, Paid, Preparing, Shipped, Delivered, Cancelled] {
            assert!(!Delivered.admin_can_move_to(target));
            assert!(!Cancelled.admin_can_move_to(target));
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [Pending, Paid, Preparing, Shipped, Delivered, Cancelled] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("SHIPPING".parse::<OrderStatus>().is_err());
    }
}
