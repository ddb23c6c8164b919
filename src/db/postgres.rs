// src/db/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::{
    CommentStore, ContentStore, HeroImageStore, InquiryStore, OrderStore, ProductStore, UserStore,
    codec::{decode_list, encode_list},
};
use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentView},
        content::{Content, ContentDraft, ContentFilter},
        hero_image::{HeroImage, HeroImageDraft},
        inquiry::{Inquiry, InquiryDraft, InquirySummary},
        order::{NewOrder, Order, OrderItem, OrderStatus},
        product::{Product, ProductDraft, ProductFilter},
        user::{NewUser, User, UserChanges},
    },
};

// Column lists, kept next to the row structs they feed.

macro_rules! user_columns {
    () => {
        "id, name, email, password, role, is_expert, can_manage_content, can_manage_inquiry, \
         expert_field, expert_license, expert_verified, phone, created_at, updated_at"
    };
}

macro_rules! inquiry_columns {
    () => {
        "id, title, content, author_name, author_email, author_phone, user_id, is_private, \
         password, view_count, attachments, created_at, updated_at"
    };
}

macro_rules! comment_view_select {
    () => {
        "SELECT c.id, c.inquiry_id, c.user_id, u.name AS author_name, \
         u.is_expert AS author_is_expert, c.content, c.created_at, c.updated_at \
         FROM comments c JOIN users u ON u.id = c.user_id"
    };
}

macro_rules! content_columns {
    () => {
        "id, title, excerpt, body, category, thumbnail, published, view_count, created_at, updated_at"
    };
}

macro_rules! product_columns {
    () => {
        "id, name, description, price, discount_rate, discount_price, category, images, in_stock, \
         created_at, updated_at"
    };
}

macro_rules! order_columns {
    () => {
        "id, order_number, total_amount, status, payment_key, paid_at, user_id, created_at, updated_at"
    };
}

macro_rules! order_item_columns {
    () => {
        "id, order_id, product_id, product_name, quantity, price"
    };
}

macro_rules! hero_image_columns {
    () => {
        "id, image_url, title, subtitle, link_url, link_text, is_active, sort_order, created_at, \
         updated_at"
    };
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending migrations from `./migrations`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Loads the lines of every order in `rows` and assembles the orders, keeping row order.
    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let items: Vec<OrderItemRow> = sqlx::query_as(concat!(
            "SELECT ",
            order_item_columns!(),
            " FROM order_items WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item.into());
        }

        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }

    async fn attach_items_one(&self, row: Option<OrderRow>) -> Result<Option<Order>, AppError> {
        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

fn unique_violation(err: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(message()),
        _ => AppError::from(err),
    }
}

fn corrupt(err: String) -> AppError {
    AppError::InternalServerError(err)
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
    role: String,
    is_expert: bool,
    can_manage_content: bool,
    can_manage_inquiry: bool,
    expert_field: Option<String>,
    expert_license: Option<String>,
    expert_verified: bool,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            role: row.role.parse().map_err(corrupt)?,
            is_expert: row.is_expert,
            can_manage_content: row.can_manage_content,
            can_manage_inquiry: row.can_manage_inquiry,
            expert_field: row.expert_field,
            expert_license: row.expert_license,
            expert_verified: row.expert_verified,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct InquiryRow {
    id: i64,
    title: String,
    content: String,
    author_name: Option<String>,
    author_email: Option<String>,
    author_phone: Option<String>,
    user_id: Option<i64>,
    is_private: bool,
    password: Option<String>,
    view_count: i64,
    attachments: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InquiryRow> for Inquiry {
    type Error = AppError;

    fn try_from(row: InquiryRow) -> Result<Self, Self::Error> {
        Ok(Inquiry {
            id: row.id,
            title: row.title,
            content: row.content,
            author_name: row.author_name,
            author_email: row.author_email,
            author_phone: row.author_phone,
            user_id: row.user_id,
            is_private: row.is_private,
            password: row.password,
            view_count: row.view_count,
            attachments: decode_list(&row.attachments)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct InquirySummaryRow {
    id: i64,
    title: String,
    author_name: String,
    user_id: Option<i64>,
    is_private: bool,
    view_count: i64,
    comment_count: i64,
    created_at: DateTime<Utc>,
}

impl From<InquirySummaryRow> for InquirySummary {
    fn from(row: InquirySummaryRow) -> Self {
        InquirySummary {
            id: row.id,
            title: row.title,
            author_name: row.author_name,
            user_id: row.user_id,
            is_private: row.is_private,
            view_count: row.view_count,
            comment_count: row.comment_count,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    inquiry_id: i64,
    user_id: i64,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            inquiry_id: row.inquiry_id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CommentViewRow {
    id: i64,
    inquiry_id: i64,
    user_id: i64,
    author_name: String,
    author_is_expert: bool,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentViewRow> for CommentView {
    fn from(row: CommentViewRow) -> Self {
        CommentView {
            id: row.id,
            inquiry_id: row.inquiry_id,
            user_id: row.user_id,
            author_name: row.author_name,
            author_is_expert: row.author_is_expert,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ContentRow {
    id: i64,
    title: String,
    excerpt: String,
    body: String,
    category: String,
    thumbnail: Option<String>,
    published: bool,
    view_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for Content {
    type Error = AppError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        Ok(Content {
            id: row.id,
            title: row.title,
            excerpt: row.excerpt,
            body: row.body,
            category: row.category.parse().map_err(corrupt)?,
            thumbnail: row.thumbnail,
            published: row.published,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: i64,
    discount_rate: i32,
    discount_price: Option<i64>,
    category: String,
    images: String,
    in_stock: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            discount_rate: row.discount_rate,
            discount_price: row.discount_price,
            category: row.category,
            images: decode_list(&row.images)?,
            in_stock: row.in_stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    total_amount: i64,
    status: String,
    payment_key: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, AppError> {
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            total_amount: self.total_amount,
            status: self.status.parse().map_err(corrupt)?,
            payment_key: self.payment_key,
            paid_at: self.paid_at,
            user_id: self.user_id,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: Option<i64>,
    product_name: String,
    quantity: i32,
    price: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

#[derive(FromRow)]
struct HeroImageRow {
    id: i64,
    image_url: String,
    title: Option<String>,
    subtitle: Option<String>,
    link_url: Option<String>,
    link_text: Option<String>,
    is_active: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<HeroImageRow> for HeroImage {
    fn from(row: HeroImageRow) -> Self {
        HeroImage {
            id: row.id,
            image_url: row.image_url,
            title: row.title,
            subtitle: row.subtitle,
            link_url: row.link_url,
            link_text: row.link_text,
            is_active: row.is_active,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Substring pattern for `ILIKE ... ESCAPE '\'`; wildcards in the keyword match literally.
fn like_pattern(keyword: Option<&str>) -> Option<String> {
    keyword.map(|k| {
        let escaped = k
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let email = user.email.clone();
        let row: UserRow = sqlx::query_as(concat!(
            "INSERT INTO users (name, email, password, role, is_expert, can_manage_content, \
             can_manage_inquiry, phone) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            user_columns!()
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(user.password)
        .bind(user.role.as_str())
        .bind(user.is_expert)
        .bind(user.can_manage_content)
        .bind(user.can_manage_inquiry)
        .bind(user.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, || format!("Email '{}' is already registered", email)))?;

        row.try_into()
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let row: Option<UserRow> =
            sqlx::query_as(concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row: Option<UserRow> = sqlx::query_as(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(concat!("SELECT ", user_columns!(), " FROM users ORDER BY id DESC"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, AppError> {
        if changes.is_empty() {
            return self.user_by_id(id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = builder.separated(", ");

        if let Some(name) = changes.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }

        if let Some(password) = changes.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password);
        }

        if let Some(phone) = changes.phone {
            separated.push("phone = ");
            separated.push_bind_unseparated(phone);
        }

        if let Some(role) = changes.role {
            separated.push("role = ");
            separated.push_bind_unseparated(role.as_str());
        }

        if let Some(is_expert) = changes.is_expert {
            separated.push("is_expert = ");
            separated.push_bind_unseparated(is_expert);
        }

        if let Some(flag) = changes.can_manage_content {
            separated.push("can_manage_content = ");
            separated.push_bind_unseparated(flag);
        }

        if let Some(flag) = changes.can_manage_inquiry {
            separated.push("can_manage_inquiry = ");
            separated.push_bind_unseparated(flag);
        }

        if let Some(field) = changes.expert_field {
            separated.push("expert_field = ");
            separated.push_bind_unseparated(field);
        }

        if let Some(license) = changes.expert_license {
            separated.push("expert_license = ");
            separated.push_bind_unseparated(license);
        }

        if let Some(verified) = changes.expert_verified {
            separated.push("expert_verified = ");
            separated.push_bind_unseparated(verified);
        }

        separated.push("updated_at = NOW()");

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(concat!(" RETURNING ", user_columns!()));

        let row: Option<UserRow> = builder
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update user {}: {:?}", id, e);
                AppError::from(e)
            })?;

        row.map(User::try_from).transpose()
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl InquiryStore for PgStore {
    async fn insert_inquiry(&self, draft: InquiryDraft) -> Result<Inquiry, AppError> {
        let row: InquiryRow = sqlx::query_as(concat!(
            "INSERT INTO inquiries (title, content, author_name, author_email, author_phone, \
             user_id, is_private, password, attachments) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING ",
            inquiry_columns!()
        ))
        .bind(draft.title)
        .bind(draft.content)
        .bind(draft.author_name)
        .bind(draft.author_email)
        .bind(draft.author_phone)
        .bind(draft.user_id)
        .bind(draft.is_private)
        .bind(draft.password)
        .bind(encode_list(&draft.attachments)?)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn inquiry_by_id(&self, id: i64) -> Result<Option<Inquiry>, AppError> {
        let row: Option<InquiryRow> =
            sqlx::query_as(concat!("SELECT ", inquiry_columns!(), " FROM inquiries WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Inquiry::try_from).transpose()
    }

    async fn list_inquiries(
        &self,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<InquirySummary>, i64), AppError> {
        let pattern = like_pattern(keyword);

        let rows: Vec<InquirySummaryRow> = sqlx::query_as(
            r#"
            SELECT
                i.id, i.title,
                COALESCE(u.name, i.author_name, 'Guest') AS author_name,
                i.user_id, i.is_private, i.view_count,
                (SELECT COUNT(*) FROM comments c WHERE c.inquiry_id = i.id) AS comment_count,
                i.created_at
            FROM inquiries i
            LEFT JOIN users u ON u.id = i.user_id
            WHERE ($1::TEXT IS NULL OR i.title ILIKE $1 ESCAPE '\')
            ORDER BY i.created_at DESC, i.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"SELECT COUNT(*) FROM inquiries WHERE ($1::TEXT IS NULL OR title ILIKE $1 ESCAPE '\')",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(InquirySummary::from).collect(), total))
    }

    async fn update_inquiry(&self, id: i64, draft: InquiryDraft) -> Result<Option<Inquiry>, AppError> {
        let row: Option<InquiryRow> = sqlx::query_as(concat!(
            "UPDATE inquiries SET title = $1, content = $2, author_name = $3, author_email = $4, \
             author_phone = $5, user_id = $6, is_private = $7, password = $8, attachments = $9, \
             updated_at = NOW() WHERE id = $10 RETURNING ",
            inquiry_columns!()
        ))
        .bind(draft.title)
        .bind(draft.content)
        .bind(draft.author_name)
        .bind(draft.author_email)
        .bind(draft.author_phone)
        .bind(draft.user_id)
        .bind(draft.is_private)
        .bind(draft.password)
        .bind(encode_list(&draft.attachments)?)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Inquiry::try_from).transpose()
    }

    async fn delete_inquiry(&self, id: i64) -> Result<bool, AppError> {
        // comments go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_inquiry_views(&self, id: i64) -> Result<Option<i64>, AppError> {
        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE inquiries SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(
        &self,
        inquiry_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentView, AppError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (inquiry_id, user_id, content) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(inquiry_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        let row: CommentViewRow =
            sqlx::query_as(concat!(comment_view_select!(), " WHERE c.id = $1"))
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(row.into())
    }

    async fn comment_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let row: Option<CommentRow> = sqlx::query_as(
            "SELECT id, inquiry_id, user_id, content, created_at, updated_at \
             FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    async fn comments_for_inquiry(&self, inquiry_id: i64) -> Result<Vec<CommentView>, AppError> {
        let rows: Vec<CommentViewRow> = sqlx::query_as(concat!(
            comment_view_select!(),
            " WHERE c.inquiry_id = $1 ORDER BY c.created_at ASC, c.id ASC"
        ))
        .bind(inquiry_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentView::from).collect())
    }

    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<CommentView>, AppError> {
        let updated = sqlx::query(
            "UPDATE comments SET content = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(content)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let row: Option<CommentViewRow> =
            sqlx::query_as(concat!(comment_view_select!(), " WHERE c.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(CommentView::from))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn insert_content(&self, draft: ContentDraft) -> Result<Content, AppError> {
        let row: ContentRow = sqlx::query_as(concat!(
            "INSERT INTO contents (title, excerpt, body, category, thumbnail, published) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
            content_columns!()
        ))
        .bind(draft.title)
        .bind(draft.excerpt)
        .bind(draft.body)
        .bind(draft.category.as_str())
        .bind(draft.thumbnail)
        .bind(draft.published)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn content_by_id(&self, id: i64) -> Result<Option<Content>, AppError> {
        let row: Option<ContentRow> =
            sqlx::query_as(concat!("SELECT ", content_columns!(), " FROM contents WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Content::try_from).transpose()
    }

    async fn list_contents(&self, filter: ContentFilter) -> Result<(Vec<Content>, i64), AppError> {
        let category = filter.category.map(|c| c.as_str());

        let rows: Vec<ContentRow> = sqlx::query_as(concat!(
            "SELECT ",
            content_columns!(),
            " FROM contents \
             WHERE (NOT $1 OR published) AND ($2::TEXT IS NULL OR category = $2) \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(filter.published_only)
        .bind(category)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contents \
             WHERE (NOT $1 OR published) AND ($2::TEXT IS NULL OR category = $2)",
        )
        .bind(filter.published_only)
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        let contents = rows
            .into_iter()
            .map(Content::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((contents, total))
    }

    async fn update_content(&self, id: i64, draft: ContentDraft) -> Result<Option<Content>, AppError> {
        let row: Option<ContentRow> = sqlx::query_as(concat!(
            "UPDATE contents SET title = $1, excerpt = $2, body = $3, category = $4, \
             thumbnail = $5, published = $6, updated_at = NOW() WHERE id = $7 RETURNING ",
            content_columns!()
        ))
        .bind(draft.title)
        .bind(draft.excerpt)
        .bind(draft.body)
        .bind(draft.category.as_str())
        .bind(draft.thumbnail)
        .bind(draft.published)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Content::try_from).transpose()
    }

    async fn delete_content(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM contents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_content_views(&self, id: i64) -> Result<Option<i64>, AppError> {
        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE contents SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn insert_product(&self, draft: ProductDraft) -> Result<Product, AppError> {
        let row: ProductRow = sqlx::query_as(concat!(
            "INSERT INTO products (name, description, price, discount_rate, discount_price, \
             category, images, in_stock) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            product_columns!()
        ))
        .bind(draft.name)
        .bind(draft.description)
        .bind(draft.price)
        .bind(draft.discount_rate)
        .bind(draft.discount_price)
        .bind(draft.category)
        .bind(encode_list(&draft.images)?)
        .bind(draft.in_stock)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn product_by_id(&self, id: i64) -> Result<Option<Product>, AppError> {
        let row: Option<ProductRow> =
            sqlx::query_as(concat!("SELECT ", product_columns!(), " FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }

    async fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, AppError> {
        let rows: Vec<ProductRow> = sqlx::query_as(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let rows: Vec<ProductRow> = sqlx::query_as(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products \
             WHERE ($1::TEXT IS NULL OR category = $1) AND ($2::BOOLEAN IS NULL OR in_stock = $2) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(filter.category.as_deref())
        .bind(filter.in_stock)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn update_product(&self, id: i64, draft: ProductDraft) -> Result<Option<Product>, AppError> {
        let row: Option<ProductRow> = sqlx::query_as(concat!(
            "UPDATE products SET name = $1, description = $2, price = $3, discount_rate = $4, \
             discount_price = $5, category = $6, images = $7, in_stock = $8, updated_at = NOW() \
             WHERE id = $9 RETURNING ",
            product_columns!()
        ))
        .bind(draft.name)
        .bind(draft.description)
        .bind(draft.price)
        .bind(draft.discount_rate)
        .bind(draft.discount_price)
        .bind(draft.category)
        .bind(encode_list(&draft.images)?)
        .bind(draft.in_stock)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn delete_product(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(concat!(
            "INSERT INTO orders (order_number, total_amount, user_id) VALUES ($1, $2, $3) RETURNING ",
            order_columns!()
        ))
        .bind(&order.order_number)
        .bind(order.total_amount)
        .bind(order.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, || "Order number collision, please retry".to_string()))?;

        let mut items = Vec::with_capacity(order.items.len());
        for item in order.items {
            let item_row: OrderItemRow = sqlx::query_as(concat!(
                "INSERT INTO order_items (order_id, product_id, product_name, quantity, price) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING ",
                order_item_columns!()
            ))
            .bind(row.id)
            .bind(item.product_id)
            .bind(item.product_name)
            .bind(item.quantity)
            .bind(item.price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item_row.into());
        }

        tx.commit().await?;

        row.into_order(items)
    }

    async fn order_by_id(&self, id: i64) -> Result<Option<Order>, AppError> {
        let row: Option<OrderRow> =
            sqlx::query_as(concat!("SELECT ", order_columns!(), " FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        self.attach_items_one(row).await
    }

    async fn order_by_number_for_user(
        &self,
        order_number: &str,
        user_id: i64,
    ) -> Result<Option<Order>, AppError> {
        let row: Option<OrderRow> = sqlx::query_as(concat!(
            "SELECT ",
            order_columns!(),
            " FROM orders WHERE order_number = $1 AND user_id = $2"
        ))
        .bind(order_number)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        self.attach_items_one(row).await
    }

    async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        let rows: Vec<OrderRow> = sqlx::query_as(concat!(
            "SELECT ",
            order_columns!(),
            " FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(rows).await
    }

    async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, AppError> {
        let rows: Vec<OrderRow> = sqlx::query_as(concat!(
            "SELECT ",
            order_columns!(),
            " FROM orders WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY created_at DESC, id DESC"
        ))
        .bind(status.map(OrderStatus::as_str))
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(rows).await
    }

    async fn mark_order_paid(
        &self,
        id: i64,
        payment_key: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, AppError> {
        let row: Option<OrderRow> = sqlx::query_as(concat!(
            "UPDATE orders SET status = 'PAID', payment_key = $2, paid_at = $3, updated_at = NOW() \
             WHERE id = $1 AND status = 'PENDING' RETURNING ",
            order_columns!()
        ))
        .bind(id)
        .bind(payment_key)
        .bind(paid_at)
        .fetch_optional(&self.pool)
        .await?;

        self.attach_items_one(row).await
    }

    async fn transition_order(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let row: Option<OrderRow> = sqlx::query_as(concat!(
            "UPDATE orders SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING ",
            order_columns!()
        ))
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;

        self.attach_items_one(row).await
    }
}

#[async_trait]
impl HeroImageStore for PgStore {
    async fn insert_hero_image(&self, draft: HeroImageDraft) -> Result<HeroImage, AppError> {
        let row: HeroImageRow = sqlx::query_as(concat!(
            "INSERT INTO hero_images (image_url, title, subtitle, link_url, link_text, is_active, \
             sort_order) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
            hero_image_columns!()
        ))
        .bind(draft.image_url)
        .bind(draft.title)
        .bind(draft.subtitle)
        .bind(draft.link_url)
        .bind(draft.link_text)
        .bind(draft.is_active)
        .bind(draft.order)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn hero_image_by_id(&self, id: i64) -> Result<Option<HeroImage>, AppError> {
        let row: Option<HeroImageRow> = sqlx::query_as(concat!(
            "SELECT ",
            hero_image_columns!(),
            " FROM hero_images WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(HeroImage::from))
    }

    async fn list_hero_images(&self, active_only: bool) -> Result<Vec<HeroImage>, AppError> {
        let rows: Vec<HeroImageRow> = sqlx::query_as(concat!(
            "SELECT ",
            hero_image_columns!(),
            " FROM hero_images WHERE (NOT $1 OR is_active) ORDER BY sort_order ASC, id ASC"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(HeroImage::from).collect())
    }

    async fn update_hero_image(
        &self,
        id: i64,
        draft: HeroImageDraft,
    ) -> Result<Option<HeroImage>, AppError> {
        let row: Option<HeroImageRow> = sqlx::query_as(concat!(
            "UPDATE hero_images SET image_url = $1, title = $2, subtitle = $3, link_url = $4, \
             link_text = $5, is_active = $6, sort_order = $7, updated_at = NOW() \
             WHERE id = $8 RETURNING ",
            hero_image_columns!()
        ))
        .bind(draft.image_url)
        .bind(draft.title)
        .bind(draft.subtitle)
        .bind(draft.link_url)
        .bind(draft.link_text)
        .bind(draft.is_active)
        .bind(draft.order)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(HeroImage::from))
    }

    async fn delete_hero_image(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM hero_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(None), None);
        assert_eq!(like_pattern(Some("zinc")).as_deref(), Some("%zinc%"));
        assert_eq!(like_pattern(Some("100%")).as_deref(), Some(r"%100\%%"));
        assert_eq!(like_pattern(Some("b_12")).as_deref(), Some(r"%b\_12%"));
        assert_eq!(like_pattern(Some(r"a\b")).as_deref(), Some(r"%a\\b%"));
    }
}
