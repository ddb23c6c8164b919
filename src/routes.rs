// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{
        admin, auth, comments, content, health, hero_images, inquiries, orders, payments,
        products, profile,
    },
    state::AppState,
    utils::jwt::session_middleware,
};

/// Assembles the main application router.
///
/// * Every route sits behind the session middleware; handlers decide what an anonymous
///   session may do.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let user_routes = Router::new().route("/me", get(profile::get_me).patch(profile::update_me));

    let inquiry_routes = Router::new()
        .route(
            "/",
            get(inquiries::list_inquiries).post(inquiries::create_inquiry),
        )
        .route(
            "/{id}",
            get(inquiries::get_inquiry)
                .patch(inquiries::patch_inquiry)
                .put(inquiries::put_inquiry)
                .delete(inquiries::delete_inquiry),
        );

    let comment_routes = Router::new()
        .route("/", post(comments::create_comment))
        .route(
            "/{id}",
            patch(comments::update_comment).delete(comments::delete_comment),
        );

    let content_routes = Router::new()
        .route("/", get(content::list_contents).post(content::create_content))
        .route(
            "/{id}",
            get(content::get_content)
                .patch(content::patch_content)
                .put(content::put_content)
                .delete(content::delete_content),
        );

    let product_routes = Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/{id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        );

    let order_routes = Router::new()
        .route("/", get(orders::list_my_orders).post(orders::create_order))
        .route("/{order_number}", get(orders::get_my_order));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            patch(admin::update_user).delete(admin::delete_user),
        )
        .route("/orders", get(admin::list_orders))
        .route(
            "/orders/{id}",
            get(admin::get_order).patch(admin::update_order_status),
        )
        .route(
            "/hero-images",
            get(hero_images::list_all).post(hero_images::create_hero_image),
        )
        .route(
            "/hero-images/{id}",
            patch(hero_images::update_hero_image).delete(hero_images::delete_hero_image),
        )
        .route("/content", get(content::list_all_contents));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/inquiries", inquiry_routes)
        .nest("/api/comments", comment_routes)
        .nest("/api/content", content_routes)
        .nest("/api/products", product_routes)
        .nest("/api/orders", order_routes)
        .route("/api/payments/confirm", post(payments::confirm_payment))
        .route("/api/hero-images", get(hero_images::list_active))
        .nest("/api/admin", admin_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
