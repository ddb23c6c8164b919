// src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_media_paths;

/// Represents the 'products' table in the database.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub discount_rate: i32,
    /// Derived from `price` and `discount_rate`; absent when there is no discount.
    pub discount_price: Option<i64>,
    pub category: String,
    pub images: Vec<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price charged per unit when ordering.
    pub fn unit_price(&self) -> i64 {
        self.discount_price.unwrap_or(self.price)
    }
}

/// Discounted price for a rate in percent, rounded down. `None` when the rate is 0.
pub fn discount_price(price: i64, discount_rate: i32) -> Option<i64> {
    if discount_rate <= 0 {
        return None;
    }
    let keep = 100 - i64::from(discount_rate.min(100));
    // Split so the intermediate never exceeds `price`.
    Some(price / 100 * keep + price % 100 * keep / 100)
}

#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub discount_rate: i32,
    pub discount_price: Option<i64>,
    pub category: String,
    pub images: Vec<String>,
    pub in_stock: bool,
}

impl ProductDraft {
    /// Recomputes the derived price. Called before every write.
    pub fn reprice(mut self) -> Self {
        self.discount_price = discount_price(self.price, self.discount_rate);
        self
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            discount_rate: product.discount_rate,
            discount_price: product.discount_price,
            category: product.category.clone(),
            images: product.images.clone(),
            in_stock: product.in_stock,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<String>,
    pub in_stock: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters."))]
    pub name: String,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters."))]
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, max = 1_000_000_000, message = "Price must be between 1 and 1000000000."))]
    pub price: i64,
    #[validate(range(min = 0, max = 100, message = "Discount rate must be between 0 and 100."))]
    #[serde(default)]
    pub discount_rate: i32,
    #[validate(length(min = 1, max = 50, message = "Category is required."))]
    pub category: String,
    #[serde(default)]
    #[validate(
        length(max = 10, message = "At most 10 images are allowed."),
        custom(function = validate_media_paths)
    )]
    pub images: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters."))]
    pub name: Option<String>,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters."))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 1_000_000_000, message = "Price must be between 1 and 1000000000."))]
    pub price: Option<i64>,
    #[validate(range(min = 0, max = 100, message = "Discount rate must be between 0 and 100."))]
    pub discount_rate: Option<i32>,
    #[validate(length(min = 1, max = 50, message = "Category is required."))]
    pub category: Option<String>,
    #[validate(
        length(max = 10, message = "At most 10 images are allowed."),
        custom(function = validate_media_paths)
    )]
    pub images: Option<Vec<String>>,
    pub in_stock: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_percent_off_ten_thousand() {
        assert_eq!(discount_price(10_000, 20), Some(8_000));
    }

    #[test]
    fn zero_rate_has_no_discount_price() {
        assert_eq!(discount_price(10_000, 0), None);
    }

    #[test]
    fn discount_rounds_down() {
        assert_eq!(discount_price(999, 15), Some(849));
        assert_eq!(discount_price(5_000, 100), Some(0));
    }

    #[test]
    fn discount_on_extreme_price_does_not_overflow() {
        let price = 9_000_000_000_000_000_000;
        assert_eq!(discount_price(price, 20), Some(7_200_000_000_000_000_000));
        assert_eq!(discount_price(i64::MAX, 1), Some(i64::MAX / 100 * 99 + 7 * 99 / 100));
    }

    #[test]
    fn price_above_ceiling_is_rejected() {
        let request: CreateProductRequest = serde_json::from_str(
            r#"{"name":"Omega 3","price":9000000000000000000,"discountRate":20,"category":"supplement"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());

        let request: UpdateProductRequest =
            serde_json::from_str(r#"{"price":1000000000}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn reprice_ignores_stale_discount_price() {
        let draft = ProductDraft {
            name: "Omega 3".to_string(),
            description: String::new(),
            price: 30_000,
            discount_rate: 10,
            discount_price: Some(1),
            category: "supplement".to_string(),
            images: vec![],
            in_stock: true,
        }
        .reprice();
        assert_eq!(draft.discount_price, Some(27_000));
    }
}
