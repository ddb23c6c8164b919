// src/handlers/hero_images.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    db::HeroImageStore,
    error::AppError,
    extractors::ValidatedJson,
    handlers::blank_to_none,
    models::hero_image::{CreateHeroImageRequest, HeroImageDraft, UpdateHeroImageRequest},
    policy::{Action, Resource, ensure},
    state::AppState,
    utils::jwt::Session,
};

/// Active slides for the landing page, in display order.
pub async fn list_active(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_hero_images(true).await?))
}

/// All slides, including inactive ones. Admin only.
pub async fn list_all(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::BackOffice, Action::Read)?;
    Ok(Json(state.store.list_hero_images(false).await?))
}

pub async fn create_hero_image(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<CreateHeroImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::HeroImage, Action::Create)?;

    let image = state
        .store
        .insert_hero_image(HeroImageDraft {
            image_url: payload.image_url,
            title: payload.title.and_then(blank_to_none),
            subtitle: payload.subtitle.and_then(blank_to_none),
            link_url: payload.link_url.and_then(blank_to_none),
            link_text: payload.link_text.and_then(blank_to_none),
            is_active: payload.is_active,
            order: payload.order,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(image)))
}

/// Partial edit. An empty string clears an optional text field.
pub async fn update_hero_image(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateHeroImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::HeroImage, Action::Update)?;

    let existing = state
        .store
        .hero_image_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Hero image not found".to_string()))?;

    let mut draft = HeroImageDraft::from(&existing);
    if let Some(image_url) = payload.image_url {
        draft.image_url = image_url;
    }
    if let Some(title) = payload.title {
        draft.title = blank_to_none(title);
    }
    if let Some(subtitle) = payload.subtitle {
        draft.subtitle = blank_to_none(subtitle);
    }
    if let Some(link_url) = payload.link_url {
        draft.link_url = blank_to_none(link_url);
    }
    if let Some(link_text) = payload.link_text {
        draft.link_text = blank_to_none(link_text);
    }
    if let Some(is_active) = payload.is_active {
        draft.is_active = is_active;
    }
    if let Some(order) = payload.order {
        draft.order = order;
    }

    let updated = state
        .store
        .update_hero_image(id, draft)
        .await?
        .ok_or(AppError::NotFound("Hero image not found".to_string()))?;

    Ok(Json(updated))
}

pub async fn delete_hero_image(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::HeroImage, Action::Delete)?;

    if !state.store.delete_hero_image(id).await? {
        return Err(AppError::NotFound("Hero image not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
