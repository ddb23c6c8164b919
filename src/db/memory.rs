// src/db/memory.rs

//! In-process store with the same semantics as the Postgres schema
//! (unique emails, cascades, ordering). Selected with `DATABASE_URL=memory://`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{
    CommentStore, ContentStore, HeroImageStore, InquiryStore, OrderStore, ProductStore, UserStore,
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

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<i64, User>,
    inquiries: BTreeMap<i64, Inquiry>,
    comments: BTreeMap<i64, Comment>,
    contents: BTreeMap<i64, Content>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    hero_images: BTreeMap<i64, HeroImage>,
}

impl Tables {
    /// One sequence shared by all tables keeps ids unique and increasing.
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn comment_view(&self, comment: &Comment) -> Result<CommentView, AppError> {
        let author = self.users.get(&comment.user_id).ok_or_else(|| {
            AppError::InternalServerError(format!("comment {} has no author", comment.id))
        })?;
        Ok(CommentView {
            id: comment.id,
            inquiry_id: comment.inquiry_id,
            user_id: comment.user_id,
            author_name: author.name.clone(),
            author_is_expert: author.is_expert,
            content: comment.content.clone(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        })
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first, ties broken by id like `ORDER BY created_at DESC, id DESC`.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn paginate<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    items.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                user.email
            )));
        }

        let now = Utc::now();
        let id = tables.next_id();
        let created = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
            role: user.role,
            is_expert: user.is_expert,
            can_manage_content: user.can_manage_content,
            can_manage_inquiry: user.can_manage_inquiry,
            expert_field: None,
            expert_license: None,
            expert_verified: false,
            phone: user.phone,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().rev().cloned().collect())
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(user.clone()));
        }

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(password) = changes.password {
            user.password = password;
        }
        if let Some(phone) = changes.phone {
            user.phone = phone;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(flag) = changes.is_expert {
            user.is_expert = flag;
        }
        if let Some(flag) = changes.can_manage_content {
            user.can_manage_content = flag;
        }
        if let Some(flag) = changes.can_manage_inquiry {
            user.can_manage_inquiry = flag;
        }
        if let Some(field) = changes.expert_field {
            user.expert_field = field;
        }
        if let Some(license) = changes.expert_license {
            user.expert_license = license;
        }
        if let Some(flag) = changes.expert_verified {
            user.expert_verified = flag;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }

        // Same effects as the foreign keys: inquiries are orphaned, comments and orders go.
        for inquiry in tables.inquiries.values_mut() {
            if inquiry.user_id == Some(id) {
                inquiry.user_id = None;
            }
        }
        tables.comments.retain(|_, c| c.user_id != id);
        tables.orders.retain(|_, o| o.user_id != id);

        Ok(true)
    }
}

#[async_trait]
impl InquiryStore for MemoryStore {
    async fn insert_inquiry(&self, draft: InquiryDraft) -> Result<Inquiry, AppError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let id = tables.next_id();
        let inquiry = Inquiry {
            id,
            title: draft.title,
            content: draft.content,
            author_name: draft.author_name,
            author_email: draft.author_email,
            author_phone: draft.author_phone,
            user_id: draft.user_id,
            is_private: draft.is_private,
            password: draft.password,
            view_count: 0,
            attachments: draft.attachments,
            created_at: now,
            updated_at: now,
        };
        tables.inquiries.insert(id, inquiry.clone());
        Ok(inquiry)
    }

    async fn inquiry_by_id(&self, id: i64) -> Result<Option<Inquiry>, AppError> {
        Ok(self.tables.lock().await.inquiries.get(&id).cloned())
    }

    async fn list_inquiries(
        &self,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<InquirySummary>, i64), AppError> {
        let tables = self.tables.lock().await;
        let needle = keyword.map(str::to_lowercase);

        let mut matching: Vec<&Inquiry> = tables
            .inquiries
            .values()
            .filter(|i| match &needle {
                Some(needle) => i.title.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect();
        newest_first(&mut matching, |i| (i.created_at, i.id));

        let total = matching.len() as i64;
        let summaries = paginate(matching, limit, offset)
            .into_iter()
            .map(|i| {
                let author_name = i
                    .user_id
                    .and_then(|uid| tables.users.get(&uid))
                    .map(|u| u.name.clone())
                    .or_else(|| i.author_name.clone())
                    .unwrap_or_else(|| "Guest".to_string());
                InquirySummary {
                    id: i.id,
                    title: i.title.clone(),
                    author_name,
                    user_id: i.user_id,
                    is_private: i.is_private,
                    view_count: i.view_count,
                    comment_count: tables
                        .comments
                        .values()
                        .filter(|c| c.inquiry_id == i.id)
                        .count() as i64,
                    created_at: i.created_at,
                }
            })
            .collect();

        Ok((summaries, total))
    }

    async fn update_inquiry(&self, id: i64, draft: InquiryDraft) -> Result<Option<Inquiry>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(inquiry) = tables.inquiries.get_mut(&id) else {
            return Ok(None);
        };
        inquiry.title = draft.title;
        inquiry.content = draft.content;
        inquiry.author_name = draft.author_name;
        inquiry.author_email = draft.author_email;
        inquiry.author_phone = draft.author_phone;
        inquiry.user_id = draft.user_id;
        inquiry.is_private = draft.is_private;
        inquiry.password = draft.password;
        inquiry.attachments = draft.attachments;
        inquiry.updated_at = Utc::now();
        Ok(Some(inquiry.clone()))
    }

    async fn delete_inquiry(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.inquiries.remove(&id).is_none() {
            return Ok(false);
        }
        tables.comments.retain(|_, c| c.inquiry_id != id);
        Ok(true)
    }

    async fn increment_inquiry_views(&self, id: i64) -> Result<Option<i64>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.inquiries.get_mut(&id).map(|inquiry| {
            inquiry.view_count += 1;
            inquiry.view_count
        }))
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(
        &self,
        inquiry_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentView, AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.inquiries.contains_key(&inquiry_id) || !tables.users.contains_key(&user_id) {
            return Err(AppError::InternalServerError(format!(
                "comment references missing inquiry {inquiry_id} or user {user_id}"
            )));
        }

        let now = Utc::now();
        let id = tables.next_id();
        let comment = Comment {
            id,
            inquiry_id,
            user_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        let view = tables.comment_view(&comment)?;
        tables.comments.insert(id, comment);
        Ok(view)
    }

    async fn comment_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        Ok(self.tables.lock().await.comments.get(&id).cloned())
    }

    async fn comments_for_inquiry(&self, inquiry_id: i64) -> Result<Vec<CommentView>, AppError> {
        let tables = self.tables.lock().await;
        // ids increase with insertion time, so BTreeMap order is oldest first
        tables
            .comments
            .values()
            .filter(|c| c.inquiry_id == inquiry_id)
            .map(|c| tables.comment_view(c))
            .collect()
    }

    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<CommentView>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(comment) = tables.comments.get_mut(&id) else {
            return Ok(None);
        };
        comment.content = content.to_string();
        comment.updated_at = Utc::now();
        let comment = comment.clone();
        tables.comment_view(&comment).map(Some)
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.lock().await.comments.remove(&id).is_some())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn insert_content(&self, draft: ContentDraft) -> Result<Content, AppError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let id = tables.next_id();
        let content = Content {
            id,
            title: draft.title,
            excerpt: draft.excerpt,
            body: draft.body,
            category: draft.category,
            thumbnail: draft.thumbnail,
            published: draft.published,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.contents.insert(id, content.clone());
        Ok(content)
    }

    async fn content_by_id(&self, id: i64) -> Result<Option<Content>, AppError> {
        Ok(self.tables.lock().await.contents.get(&id).cloned())
    }

    async fn list_contents(&self, filter: ContentFilter) -> Result<(Vec<Content>, i64), AppError> {
        let tables = self.tables.lock().await;
        let mut matching: Vec<Content> = tables
            .contents
            .values()
            .filter(|c| !filter.published_only || c.published)
            .filter(|c| filter.category.is_none_or(|category| c.category == category))
            .cloned()
            .collect();
        newest_first(&mut matching, |c| (c.created_at, c.id));

        let total = matching.len() as i64;
        Ok((paginate(matching, filter.limit, filter.offset), total))
    }

    async fn update_content(&self, id: i64, draft: ContentDraft) -> Result<Option<Content>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(content) = tables.contents.get_mut(&id) else {
            return Ok(None);
        };
        content.title = draft.title;
        content.excerpt = draft.excerpt;
        content.body = draft.body;
        content.category = draft.category;
        content.thumbnail = draft.thumbnail;
        content.published = draft.published;
        content.updated_at = Utc::now();
        Ok(Some(content.clone()))
    }

    async fn delete_content(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.lock().await.contents.remove(&id).is_some())
    }

    async fn increment_content_views(&self, id: i64) -> Result<Option<i64>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.contents.get_mut(&id).map(|content| {
            content.view_count += 1;
            content.view_count
        }))
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, draft: ProductDraft) -> Result<Product, AppError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let id = tables.next_id();
        let product = Product {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            discount_rate: draft.discount_rate,
            discount_price: draft.discount_price,
            category: draft.category,
            images: draft.images,
            in_stock: draft.in_stock,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    async fn product_by_id(&self, id: i64) -> Result<Option<Product>, AppError> {
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .products
            .values()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let tables = self.tables.lock().await;
        let mut matching: Vec<Product> = tables
            .products
            .values()
            .filter(|p| filter.category.as_ref().is_none_or(|c| &p.category == c))
            .filter(|p| filter.in_stock.is_none_or(|flag| p.in_stock == flag))
            .cloned()
            .collect();
        newest_first(&mut matching, |p| (p.created_at, p.id));
        Ok(matching)
    }

    async fn update_product(&self, id: i64, draft: ProductDraft) -> Result<Option<Product>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(None);
        };
        product.name = draft.name;
        product.description = draft.description;
        product.price = draft.price;
        product.discount_rate = draft.discount_rate;
        product.discount_price = draft.discount_price;
        product.category = draft.category;
        product.images = draft.images;
        product.in_stock = draft.in_stock;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.products.remove(&id).is_none() {
            return Ok(false);
        }
        for order in tables.orders.values_mut() {
            for item in &mut order.items {
                if item.product_id == Some(id) {
                    item.product_id = None;
                }
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, AppError> {
        let mut tables = self.tables.lock().await;
        if tables
            .orders
            .values()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(AppError::Conflict(
                "Order number collision, please retry".to_string(),
            ));
        }

        let now = Utc::now();
        let id = tables.next_id();
        let mut items = Vec::with_capacity(order.items.len());
        for item in order.items {
            items.push(OrderItem {
                id: tables.next_id(),
                order_id: id,
                product_id: Some(item.product_id),
                product_name: item.product_name,
                quantity: item.quantity,
                price: item.price,
            });
        }

        let created = Order {
            id,
            order_number: order.order_number,
            total_amount: order.total_amount,
            status: OrderStatus::Pending,
            payment_key: None,
            paid_at: None,
            user_id: order.user_id,
            items,
            created_at: now,
            updated_at: now,
        };
        tables.orders.insert(id, created.clone());
        Ok(created)
    }

    async fn order_by_id(&self, id: i64) -> Result<Option<Order>, AppError> {
        Ok(self.tables.lock().await.orders.get(&id).cloned())
    }

    async fn order_by_number_for_user(
        &self,
        order_number: &str,
        user_id: i64,
    ) -> Result<Option<Order>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .orders
            .values()
            .find(|o| o.order_number == order_number && o.user_id == user_id)
            .cloned())
    }

    async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut orders, |o| (o.created_at, o.id));
        Ok(orders)
    }

    async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, AppError> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        newest_first(&mut orders, |o| (o.created_at, o.id));
        Ok(orders)
    }

    async fn mark_order_paid(
        &self,
        id: i64,
        payment_key: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, AppError> {
        let mut tables = self.tables.lock().await;
        match tables.orders.get_mut(&id) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = OrderStatus::Paid;
                order.payment_key = Some(payment_key.to_string());
                order.paid_at = Some(paid_at);
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn transition_order(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let mut tables = self.tables.lock().await;
        match tables.orders.get_mut(&id) {
            Some(order) if order.status == from => {
                order.status = to;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl HeroImageStore for MemoryStore {
    async fn insert_hero_image(&self, draft: HeroImageDraft) -> Result<HeroImage, AppError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let id = tables.next_id();
        let image = HeroImage {
            id,
            image_url: draft.image_url,
            title: draft.title,
            subtitle: draft.subtitle,
            link_url: draft.link_url,
            link_text: draft.link_text,
            is_active: draft.is_active,
            order: draft.order,
            created_at: now,
            updated_at: now,
        };
        tables.hero_images.insert(id, image.clone());
        Ok(image)
    }

    async fn hero_image_by_id(&self, id: i64) -> Result<Option<HeroImage>, AppError> {
        Ok(self.tables.lock().await.hero_images.get(&id).cloned())
    }

    async fn list_hero_images(&self, active_only: bool) -> Result<Vec<HeroImage>, AppError> {
        let tables = self.tables.lock().await;
        let mut images: Vec<HeroImage> = tables
            .hero_images
            .values()
            .filter(|h| !active_only || h.is_active)
            .cloned()
            .collect();
        images.sort_by_key(|h| (h.order, h.id));
        Ok(images)
    }

    async fn update_hero_image(
        &self,
        id: i64,
        draft: HeroImageDraft,
    ) -> Result<Option<HeroImage>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(image) = tables.hero_images.get_mut(&id) else {
            return Ok(None);
        };
        image.image_url = draft.image_url;
        image.title = draft.title;
        image.subtitle = draft.subtitle;
        image.link_url = draft.link_url;
        image.link_text = draft.link_text;
        image.is_active = draft.is_active;
        image.order = draft.order;
        image.updated_at = Utc::now();
        Ok(Some(image.clone()))
    }

    async fn delete_hero_image(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.lock().await.hero_images.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn member(email: &str) -> NewUser {
        NewUser::member("Kim".to_string(), email.to_string(), "hash".to_string(), None)
    }

    fn draft(title: &str, user_id: Option<i64>) -> InquiryDraft {
        InquiryDraft {
            title: title.to_string(),
            content: "body".to_string(),
            author_name: Some("Visitor".to_string()),
            author_email: None,
            author_phone: None,
            user_id,
            is_private: false,
            password: None,
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let store = MemoryStore::new();
        store.insert_user(member("kim@example.com")).await.unwrap();
        let err = store.insert_user(member("KIM@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_user_orphans_inquiries_and_drops_comments() {
        let store = MemoryStore::new();
        let user = store.insert_user(member("a@example.com")).await.unwrap();
        let inquiry = store.insert_inquiry(draft("q", Some(user.id))).await.unwrap();
        store.insert_comment(inquiry.id, user.id, "hi").await.unwrap();

        assert!(store.delete_user(user.id).await.unwrap());

        let inquiry = store.inquiry_by_id(inquiry.id).await.unwrap().unwrap();
        assert_eq!(inquiry.user_id, None);
        assert!(store.comments_for_inquiry(inquiry.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_inquiry_cascades_comments() {
        let store = MemoryStore::new();
        let user = store.insert_user(member("b@example.com")).await.unwrap();
        let inquiry = store.insert_inquiry(draft("q", None)).await.unwrap();
        let comment = store.insert_comment(inquiry.id, user.id, "answer").await.unwrap();

        assert!(store.delete_inquiry(inquiry.id).await.unwrap());
        assert!(store.comment_by_id(comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_counts_comments() {
        let store = MemoryStore::new();
        let user = store.insert_user(member("c@example.com")).await.unwrap();
        let first = store.insert_inquiry(draft("first", None)).await.unwrap();
        let second = store.insert_inquiry(draft("second", Some(user.id))).await.unwrap();
        store.insert_comment(first.id, user.id, "a").await.unwrap();

        let (items, total) = store.list_inquiries(None, 10, 0).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(items[0].id, second.id);
        assert_eq!(items[0].author_name, "Kim");
        assert_eq!(items[1].author_name, "Visitor");
        assert_eq!(items[1].comment_count, 1);

        let (items, total) = store.list_inquiries(Some("FIR"), 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].id, first.id);
    }

    #[tokio::test]
    async fn paid_transition_happens_once() {
        let store = MemoryStore::new();
        let user = store.insert_user(member("d@example.com")).await.unwrap();
        let order = store
            .insert_order(NewOrder {
                order_number: "ORD-1".to_string(),
                user_id: user.id,
                total_amount: 100,
                items: vec![],
            })
            .await
            .unwrap();

        let paid = store.mark_order_paid(order.id, "pk", Utc::now()).await.unwrap();
        assert_eq!(paid.map(|o| o.status), Some(OrderStatus::Paid));
        assert!(store.mark_order_paid(order.id, "pk2", Utc::now()).await.unwrap().is_none());

        let stored = store.order_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_key.as_deref(), Some("pk"));
    }

    #[tokio::test]
    async fn admin_role_survives_update_round() {
        let store = MemoryStore::new();
        let user = store.insert_user(member("e@example.com")).await.unwrap();
        let updated = store
            .update_user(
                user.id,
                UserChanges {
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
    }
}
