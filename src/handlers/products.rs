// src/handlers/products.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    db::ProductStore,
    error::AppError,
    extractors::ValidatedJson,
    models::product::{
        CreateProductRequest, ProductDraft, ProductFilter, UpdateProductRequest,
    },
    policy::{Action, Resource, ensure},
    state::AppState,
    utils::jwt::Session,
};

/// Lists products, newest first. Filters: `category`, `inStock`.
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, AppError> {
    let products = state.store.list_products(&filter).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .store
        .product_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// Creates a product. Admin only.
/// `discountPrice` is always computed here, never taken from the request.
pub async fn create_product(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::Product, Action::Create)?;

    let draft = ProductDraft {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        discount_rate: payload.discount_rate,
        discount_price: None,
        category: payload.category,
        images: payload.images,
        in_stock: payload.in_stock,
    }
    .reprice();

    let product = state.store.insert_product(draft).await.map_err(|e| {
        tracing::error!("Failed to create product: {:?}", e);
        e
    })?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Updates a product. Admin only.
pub async fn update_product(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::Product, Action::Update)?;

    let existing = state
        .store
        .product_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    let mut draft = ProductDraft::from(&existing);
    if let Some(name) = payload.name {
        draft.name = name;
    }
    if let Some(description) = payload.description {
        draft.description = description;
    }
    if let Some(price) = payload.price {
        draft.price = price;
    }
    if let Some(rate) = payload.discount_rate {
        draft.discount_rate = rate;
    }
    if let Some(category) = payload.category {
        draft.category = category;
    }
    if let Some(images) = payload.images {
        draft.images = images;
    }
    if let Some(in_stock) = payload.in_stock {
        draft.in_stock = in_stock;
    }

    let updated = state
        .store
        .update_product(id, draft.reprice())
        .await?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a product. Existing order lines keep their name and price snapshot.
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::Product, Action::Delete)?;

    if !state.store.delete_product(id).await? {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
