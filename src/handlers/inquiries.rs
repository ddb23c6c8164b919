// src/handlers/inquiries.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    db::{CommentStore, InquiryStore, UserStore},
    error::AppError,
    extractors::ValidatedJson,
    models::{
        PageParams, Paginated,
        inquiry::{
            CreateInquiryRequest, Inquiry, InquiryDetail, InquiryDraft, InquiryReadParams,
            UpdateInquiryRequest,
        },
    },
    policy::{Action, Decision, Resource, authorize, ensure},
    state::AppState,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Session, Viewer},
    },
};

fn resource(inquiry: &Inquiry) -> Resource {
    Resource::Inquiry {
        author_id: inquiry.user_id,
        is_private: inquiry.is_private,
    }
}

/// Access gate for private inquiries.
///
/// Staff and the author are admitted by session; anyone else needs the inquiry's password.
pub(crate) fn admit(
    inquiry: &Inquiry,
    viewer: Option<&Viewer>,
    password: Option<&str>,
) -> Result<(), AppError> {
    if authorize(viewer, resource(inquiry), Action::Read) == Decision::Allow {
        return Ok(());
    }

    let admitted = match (password, inquiry.password.as_deref()) {
        (Some(given), Some(hash)) => verify_password(given, hash)?,
        _ => false,
    };

    if admitted { Ok(()) } else { Err(AppError::PasswordRequired) }
}

pub(crate) async fn load(state: &AppState, id: i64) -> Result<Inquiry, AppError> {
    state
        .store
        .inquiry_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Inquiry not found".to_string()))
}

/// Lists inquiries, newest first. Bodies and attachments are never included.
pub async fn list_inquiries(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (items, total) = state
        .store
        .list_inquiries(params.keyword(), params.limit(), params.offset())
        .await?;

    Ok(Json(Paginated {
        items,
        total,
        page: params.page(),
        limit: params.limit(),
    }))
}

/// Posts an inquiry as a guest or as the signed-in member.
pub async fn create_inquiry(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(payload): ValidatedJson<CreateInquiryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = session.viewer();

    if viewer.is_none() && payload.author_name.is_none() {
        return Err(AppError::BadRequest(
            "Name is required when posting without an account".to_string(),
        ));
    }

    let password = match (payload.is_private, payload.password.as_deref()) {
        (true, Some(password)) => Some(hash_password(password)?),
        (true, None) => {
            return Err(AppError::BadRequest(
                "A password is required for a private inquiry".to_string(),
            ));
        }
        (false, _) => None,
    };

    let inquiry = state
        .store
        .insert_inquiry(InquiryDraft {
            title: payload.title,
            content: payload.content,
            author_name: payload.author_name,
            author_email: payload.author_email,
            author_phone: payload.author_phone,
            user_id: viewer.map(|v| v.id),
            is_private: payload.is_private,
            password,
            attachments: payload.attachments,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(inquiry)))
}

/// Reads one inquiry with its comments.
///
/// Private inquiries pass the access gate first. Every admitted read counts as a view.
pub async fn get_inquiry(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    Query(params): Query<InquiryReadParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut inquiry = load(&state, id).await?;

    admit(&inquiry, session.viewer(), params.password.as_deref())?;

    if authorize(session.viewer(), resource(&inquiry), Action::Update) == Decision::Deny {
        inquiry.author_email = None;
        inquiry.author_phone = None;
    }

    inquiry.view_count = state
        .store
        .increment_inquiry_views(id)
        .await?
        .ok_or(AppError::NotFound("Inquiry not found".to_string()))?;

    let author_display_name = match inquiry.user_id {
        Some(user_id) => state.store.user_by_id(user_id).await?.map(|u| u.name),
        None => None,
    }
    .or_else(|| inquiry.author_name.clone())
    .unwrap_or_else(|| "Guest".to_string());

    let comments = state.store.comments_for_inquiry(id).await?;

    Ok(Json(InquiryDetail {
        inquiry,
        author_display_name,
        comments,
    }))
}

/// Partial edit: absent fields are left unchanged.
pub async fn patch_inquiry(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateInquiryRequest>,
) -> Result<impl IntoResponse, AppError> {
    apply_update(&state, session.viewer(), id, payload).await
}

/// Full edit: title and content must be present.
pub async fn put_inquiry(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateInquiryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.title.is_none() || payload.content.is_none() {
        return Err(AppError::BadRequest(
            "Title and content are required".to_string(),
        ));
    }
    apply_update(&state, session.viewer(), id, payload).await
}

async fn apply_update(
    state: &AppState,
    viewer: Option<&Viewer>,
    id: i64,
    payload: UpdateInquiryRequest,
) -> Result<Json<Inquiry>, AppError> {
    let existing = load(state, id).await?;
    ensure(viewer, resource(&existing), Action::Update)?;

    let mut draft = InquiryDraft::from_existing(&existing);
    if let Some(title) = payload.title {
        draft.title = title;
    }
    if let Some(content) = payload.content {
        draft.content = content;
    }
    if let Some(attachments) = payload.attachments {
        draft.attachments = attachments;
    }
    if let Some(is_private) = payload.is_private {
        draft.is_private = is_private;
    }
    if let Some(password) = payload.password {
        draft.password = Some(hash_password(&password)?);
    }

    // private ⇔ password hash present
    if !draft.is_private {
        draft.password = None;
    } else if draft.password.is_none() {
        return Err(AppError::BadRequest(
            "A password is required for a private inquiry".to_string(),
        ));
    }

    let updated = state
        .store
        .update_inquiry(id, draft)
        .await?
        .ok_or(AppError::NotFound("Inquiry not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes an inquiry and its comments.
pub async fn delete_inquiry(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let existing = load(&state, id).await?;
    ensure(session.viewer(), resource(&existing), Action::Delete)?;

    if !state.store.delete_inquiry(id).await? {
        return Err(AppError::NotFound("Inquiry not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
