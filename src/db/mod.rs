// src/db/mod.rs

//! Persistence layer.
//!
//! Handlers talk to the store through the repository traits below. `PgStore` backs them with
//! Postgres; `MemoryStore` keeps everything in process for local runs and the test suite.

pub mod codec;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentView},
        content::{Content, ContentDraft, ContentFilter},
        hero_image::{HeroImage, HeroImageDraft},
        inquiry::{Inquiry, InquiryDraft, InquirySummary},
        order::{NewOrder, Order, OrderStatus},
        product::{Product, ProductDraft, ProductFilter},
        user::{NewUser, User, UserChanges},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle to whichever store the app was started with.
pub type SharedStore = Arc<dyn Store>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, AppError>;
    async fn delete_user(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait InquiryStore: Send + Sync {
    async fn insert_inquiry(&self, draft: InquiryDraft) -> Result<Inquiry, AppError>;
    async fn inquiry_by_id(&self, id: i64) -> Result<Option<Inquiry>, AppError>;
    /// Newest first, with the total count of matching rows.
    async fn list_inquiries(
        &self,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<InquirySummary>, i64), AppError>;
    async fn update_inquiry(&self, id: i64, draft: InquiryDraft) -> Result<Option<Inquiry>, AppError>;
    /// Also removes the inquiry's comments.
    async fn delete_inquiry(&self, id: i64) -> Result<bool, AppError>;
    /// Returns the new count, or `None` if the inquiry is gone.
    async fn increment_inquiry_views(&self, id: i64) -> Result<Option<i64>, AppError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(
        &self,
        inquiry_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentView, AppError>;
    async fn comment_by_id(&self, id: i64) -> Result<Option<Comment>, AppError>;
    /// Oldest first.
    async fn comments_for_inquiry(&self, inquiry_id: i64) -> Result<Vec<CommentView>, AppError>;
    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<CommentView>, AppError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_content(&self, draft: ContentDraft) -> Result<Content, AppError>;
    async fn content_by_id(&self, id: i64) -> Result<Option<Content>, AppError>;
    /// Newest first, with the total count of matching rows.
    async fn list_contents(&self, filter: ContentFilter) -> Result<(Vec<Content>, i64), AppError>;
    async fn update_content(&self, id: i64, draft: ContentDraft) -> Result<Option<Content>, AppError>;
    async fn delete_content(&self, id: i64) -> Result<bool, AppError>;
    async fn increment_content_views(&self, id: i64) -> Result<Option<i64>, AppError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert_product(&self, draft: ProductDraft) -> Result<Product, AppError>;
    async fn product_by_id(&self, id: i64) -> Result<Option<Product>, AppError>;
    /// Missing ids are simply absent from the result.
    async fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, AppError>;
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError>;
    async fn update_product(&self, id: i64, draft: ProductDraft) -> Result<Option<Product>, AppError>;
    async fn delete_product(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes the order and all its lines atomically.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, AppError>;
    async fn order_by_id(&self, id: i64) -> Result<Option<Order>, AppError>;
    async fn order_by_number_for_user(
        &self,
        order_number: &str,
        user_id: i64,
    ) -> Result<Option<Order>, AppError>;
    async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AppError>;
    async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, AppError>;
    /// `PENDING → PAID`. Returns `None` when the order was no longer pending.
    async fn mark_order_paid(
        &self,
        id: i64,
        payment_key: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, AppError>;
    /// Compare-and-set on the status column. Returns `None` when the current status is not `from`.
    async fn transition_order(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, AppError>;
}

#[async_trait]
pub trait HeroImageStore: Send + Sync {
    async fn insert_hero_image(&self, draft: HeroImageDraft) -> Result<HeroImage, AppError>;
    async fn hero_image_by_id(&self, id: i64) -> Result<Option<HeroImage>, AppError>;
    /// Ordered by display rank, then id.
    async fn list_hero_images(&self, active_only: bool) -> Result<Vec<HeroImage>, AppError>;
    async fn update_hero_image(
        &self,
        id: i64,
        draft: HeroImageDraft,
    ) -> Result<Option<HeroImage>, AppError>;
    async fn delete_hero_image(&self, id: i64) -> Result<bool, AppError>;
}

/// Every repository the handlers need, behind one object.
pub trait Store:
    UserStore + InquiryStore + CommentStore + ContentStore + ProductStore + OrderStore + HeroImageStore
{
}

impl<T> Store for T where
    T: UserStore
        + InquiryStore
        + CommentStore
        + ContentStore
        + ProductStore
        + OrderStore
        + HeroImageStore
{
}
