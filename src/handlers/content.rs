// src/handlers/content.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    db::ContentStore,
    error::AppError,
    extractors::ValidatedJson,
    handlers::blank_to_none,
    models::{
        PageParams, Paginated,
        content::{
            Content, ContentDraft, ContentFilter, ContentListParams, ContentSummary,
            CreateContentRequest, UpdateContentRequest,
        },
    },
    policy::{Action, Resource, ensure},
    state::AppState,
    utils::{
        html::{clean_html, excerpt_from_html},
        jwt::{Session, Viewer},
    },
};

async fn load(state: &AppState, id: i64) -> Result<Content, AppError> {
    state
        .store
        .content_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Content not found".to_string()))
}

/// A supplied excerpt wins; a blank or missing one is derived from the body.
fn excerpt_or_derived(excerpt: Option<String>, body: &str) -> String {
    excerpt
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| excerpt_from_html(body))
}

async fn list(
    state: &AppState,
    params: ContentListParams,
    published_only: bool,
) -> Result<Paginated<ContentSummary>, AppError> {
    let page = PageParams {
        page: params.page,
        limit: params.limit,
        q: None,
    };

    let (contents, total) = state
        .store
        .list_contents(ContentFilter {
            published_only,
            category: params.category,
            limit: page.limit(),
            offset: page.offset(),
        })
        .await?;

    Ok(Paginated {
        items: contents.into_iter().map(ContentSummary::from).collect(),
        total,
        page: page.page(),
        limit: page.limit(),
    })
}

/// Published articles, newest first, optionally by category.
pub async fn list_contents(
    State(state): State<AppState>,
    Query(params): Query<ContentListParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(list(&state, params, true).await?))
}

/// Every article including drafts. Admin only.
pub async fn list_all_contents(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<ContentListParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure(session.viewer(), Resource::BackOffice, Action::Read)?;
    Ok(Json(list(&state, params, false).await?))
}

/// Reads an article. Drafts are visible to content staff only and do not count views.
pub async fn get_content(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut content = load(&state, id).await?;
    ensure(
        session.viewer(),
        Resource::Content {
            published: content.published,
        },
        Action::Read,
    )?;

    if content.published {
        if let Some(count) = state.store.increment_content_views(id).await? {
            content.view_count = count;
        }
    }

    Ok(Json(content))
}

/// Creates an article. The body is sanitized before it is stored.
pub async fn create_content(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<CreateContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure(
        session.viewer(),
        Resource::Content {
            published: payload.published,
        },
        Action::Create,
    )?;

    let body = clean_html(&payload.body);
    let excerpt = excerpt_or_derived(payload.excerpt, &body);

    let content = state
        .store
        .insert_content(ContentDraft {
            title: payload.title,
            excerpt,
            body,
            category: payload.category,
            thumbnail: payload.thumbnail.and_then(blank_to_none),
            published: payload.published,
        })
        .await?;

    tracing::info!("Content {} created ({})", content.id, content.category);
    Ok((StatusCode::CREATED, Json(content)))
}

/// Partial edit: absent fields are left unchanged.
pub async fn patch_content(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    apply_update(&state, session.viewer(), id, payload).await
}

/// Full edit: title, body and category must be present.
pub async fn put_content(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.title.is_none() || payload.body.is_none() || payload.category.is_none() {
        return Err(AppError::BadRequest(
            "Title, body and category are required".to_string(),
        ));
    }
    apply_update(&state, session.viewer(), id, payload).await
}

async fn apply_update(
    state: &AppState,
    viewer: Option<&Viewer>,
    id: i64,
    payload: UpdateContentRequest,
) -> Result<Json<Content>, AppError> {
    let existing = load(state, id).await?;
    ensure(
        viewer,
        Resource::Content {
            published: existing.published,
        },
        Action::Update,
    )?;

    let mut draft = ContentDraft::from(&existing);
    if let Some(title) = payload.title {
        draft.title = title;
    }
    if let Some(category) = payload.category {
        draft.category = category;
    }
    if let Some(thumbnail) = payload.thumbnail {
        draft.thumbnail = blank_to_none(thumbnail);
    }
    if let Some(published) = payload.published {
        draft.published = published;
    }

    let body_changed = payload.body.is_some();
    if let Some(body) = payload.body {
        draft.body = clean_html(&body);
    }
    // A new body refreshes the excerpt unless one is supplied alongside it.
    if payload.excerpt.is_some() || body_changed {
        draft.excerpt = excerpt_or_derived(payload.excerpt, &draft.body);
    }

    let updated = state
        .store
        .update_content(id, draft)
        .await?
        .ok_or(AppError::NotFound("Content not found".to_string()))?;

    Ok(Json(updated))
}

pub async fn delete_content(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let existing = load(&state, id).await?;
    ensure(
        session.viewer(),
        Resource::Content {
            published: existing.published,
        },
        Action::Delete,
    )?;

    if !state.store.delete_content(id).await? {
        return Err(AppError::NotFound("Content not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
