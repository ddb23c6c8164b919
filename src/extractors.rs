// src/extractors.rs

//! Validated JSON extractor: deserialization plus `validator` checks.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::AppError;

/// Rejects with 400 when the body is malformed or fails validation.
///
/// ```rust,ignore
/// async fn register(ValidatedJson(payload): ValidatedJson<RegisterRequest>) { ... }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::BadRequest(first_message(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// First failure, visiting fields in name order so the message is stable.
pub fn first_message(errors: &ValidationErrors) -> String {
    first_in(errors).unwrap_or_else(|| "Invalid request".to_string())
}

fn first_in(errors: &ValidationErrors) -> Option<String> {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(name, _)| name.to_string());

    fields.into_iter().find_map(|(name, kind)| match kind {
        ValidationErrorsKind::Field(errs) => errs.first().map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{name} is invalid"))
        }),
        ValidationErrorsKind::Struct(inner) => first_in(inner),
        ValidationErrorsKind::List(items) => items.values().find_map(|inner| first_in(inner)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::CreateOrderRequest;
    use crate::models::user::RegisterRequest;

    #[test]
    fn reports_first_field_by_name() {
        let request = RegisterRequest {
            name: String::new(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            phone: None,
        };
        let errors = request.validate().unwrap_err();
        // email < name < password
        assert_eq!(first_message(&errors), "Email address is not valid.");
    }

    #[test]
    fn reaches_into_nested_lines() {
        let request: CreateOrderRequest =
            serde_json::from_str(r#"{"items":[{"productId":1,"quantity":0}]}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(first_message(&errors), "Quantity must be between 1 and 99.");
    }
}
