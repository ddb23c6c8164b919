// src/services/payment.rs

//! Client for the payment gateway's confirm endpoint.
//!
//! The browser completes checkout on the gateway's hosted page, then hands the server a
//! `paymentKey`. Nothing is charged until the server confirms that key with the gateway.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::PaymentConfig, error::AppError};

/// Body sent to the confirm endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPayment {
    pub payment_key: String,
    /// The order number.
    pub order_id: String,
    pub amount: i64,
}

/// Error body returned by the gateway on rejection.
#[derive(Debug, Default, Deserialize)]
struct GatewayFailure {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway rejected payment ({status}): {code} {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("invalid gateway configuration: {0}")]
    Config(String),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        AppError::PaymentRejected(err.to_string())
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Succeeds only when the gateway accepted the payment.
    async fn confirm(&self, request: &ConfirmPayment) -> Result<(), GatewayError>;
}

/// `PaymentGateway` over HTTPS, authenticated with the merchant secret key.
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    confirm_url: String,
}

impl HttpPaymentGateway {
    /// Builds the client with the Basic auth header and request timeout baked in.
    pub fn new(config: &PaymentConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();

        // The gateway expects the secret key as the username with an empty password.
        let credentials = STANDARD.encode(format!("{}:", config.secret_key));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {credentials}"))
                .map_err(|e| GatewayError::Config(format!("invalid secret key: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            confirm_url: config.confirm_url.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn confirm(&self, request: &ConfirmPayment) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(&self.confirm_url)
            .json(request)
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            tracing::info!(
                "Gateway confirmed payment for order {} ({} KRW)",
                request.order_id,
                request.amount
            );
            return Ok(());
        }

        let failure: GatewayFailure = response.json().await.unwrap_or_default();
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            code: failure.code,
            message: failure.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_maps_to_payment_rejected() {
        let err = GatewayError::Rejected {
            status: 400,
            code: "REJECT_CARD_COMPANY".to_string(),
            message: "limit exceeded".to_string(),
        };
        let app: AppError = err.into();
        match app {
            AppError::PaymentRejected(detail) => {
                assert!(detail.contains("REJECT_CARD_COMPANY"));
                assert!(detail.contains("400"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn confirm_body_is_camel_case() {
        let body = serde_json::to_value(ConfirmPayment {
            payment_key: "pk_1".to_string(),
            order_id: "ORD-1".to_string(),
            amount: 8000,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "paymentKey": "pk_1", "orderId": "ORD-1", "amount": 8000 })
        );
    }
}
