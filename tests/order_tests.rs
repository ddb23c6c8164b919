// tests/order_tests.rs

mod common;

use common::{TestApp, spawn_app};
use serde_json::{Value, json};

async fn create_product(app: &TestApp, admin: &str, body: Value) -> Value {
    let response = app.post("/api/products", Some(admin), &body).await;
    assert_eq!(response.status().as_u16(), 201);
    response.json().await.unwrap()
}

/// Admin + member + one 10000 KRW product at 20% off, ordered once.
async fn placed_order(app: &TestApp) -> (String, String, Value) {
    let (_, admin) = app.admin("admin@example.com").await;
    let (_, member) = app.member("buyer@example.com").await;
    let product = create_product(
        app,
        &admin,
        json!({ "name": "Vitamin D 1000IU", "price": 10000, "discountRate": 20, "category": "vitamin" }),
    )
    .await;

    let response = app
        .post(
            "/api/orders",
            Some(&member),
            &json!({ "items": [{ "productId": product["id"], "quantity": 1 }] }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);
    (admin, member, response.json().await.unwrap())
}

#[tokio::test]
async fn discount_price_is_derived_on_every_write() {
    // Arrange
    let app = spawn_app().await;
    let (_, admin) = app.admin("admin@example.com").await;

    // Act: a client-sent discountPrice is ignored
    let product = create_product(
        &app,
        &admin,
        json!({ "name": "Omega 3", "price": 10000, "discountRate": 20, "discountPrice": 1, "category": "omega" }),
    )
    .await;
    let id = product["id"].as_i64().unwrap();
    let updated: Value = app
        .patch(&format!("/api/products/{id}"), Some(&admin), &json!({ "discountRate": 0 }))
        .await
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(product["discountPrice"], 8000);
    assert!(updated["discountPrice"].is_null());
    assert_eq!(updated["price"], 10000);
}

#[tokio::test]
async fn only_admins_manage_products() {
    let app = spawn_app().await;
    let (_, member) = app.member("member@example.com").await;
    let body = json!({ "name": "Zinc", "price": 5000, "category": "mineral" });

    assert_eq!(app.post("/api/products", None, &body).await.status().as_u16(), 401);
    assert_eq!(app.post("/api/products", Some(&member), &body).await.status().as_u16(), 403);
}

#[tokio::test]
async fn order_total_is_computed_from_snapshot_prices() {
    // Arrange
    let app = spawn_app().await;
    let (admin, member, _) = placed_order(&app).await;
    let second = create_product(
        &app,
        &admin,
        json!({ "name": "Probiotic", "price": 3000, "category": "gut" }),
    )
    .await;

    // Act: the client total is ignored
    let response = app
        .post(
            "/api/orders",
            Some(&member),
            &json!({
                "items": [{ "productId": second["id"], "quantity": 3 }],
                "totalAmount": 1
            }),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let order: Value = response.json().await.unwrap();
    assert_eq!(order["totalAmount"], 9000);
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["items"][0]["price"], 3000);
    assert_eq!(order["items"][0]["productName"], "Probiotic");
    assert!(order["orderNumber"].as_str().unwrap().starts_with("ORD-"));
}

#[tokio::test]
async fn out_of_stock_or_missing_products_fail_the_order() {
    let app = spawn_app().await;
    let (admin, member, _) = placed_order(&app).await;
    let sold_out = create_product(
        &app,
        &admin,
        json!({ "name": "Rare herb", "price": 50000, "category": "herb", "inStock": false }),
    )
    .await;

    let out_of_stock = app
        .post("/api/orders", Some(&member), &json!({ "items": [{ "productId": sold_out["id"], "quantity": 1 }] }))
        .await;
    let missing = app
        .post("/api/orders", Some(&member), &json!({ "items": [{ "productId": 99999, "quantity": 1 }] }))
        .await;
    let empty = app.post("/api/orders", Some(&member), &json!({ "items": [] })).await;

    assert_eq!(out_of_stock.status().as_u16(), 400);
    assert_eq!(missing.status().as_u16(), 400);
    assert_eq!(empty.status().as_u16(), 400);
}

#[tokio::test]
async fn confirm_marks_order_paid() {
    // Arrange
    let app = spawn_app().await;
    let (_, member, order) = placed_order(&app).await;
    assert_eq!(order["totalAmount"], 8000);

    // Act
    let response = app
        .post(
            "/api/payments/confirm",
            Some(&member),
            &json!({ "paymentKey": "pk_test_1", "orderId": order["orderNumber"], "amount": 8000 }),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let paid: Value = response.json().await.unwrap();
    assert_eq!(paid["status"], "PAID");
    assert_eq!(paid["paymentKey"], "pk_test_1");
    assert!(paid["paidAt"].is_string());
    assert_eq!(app.gateway_calls(), 1);

    // A retried confirmation with the same key answers without another gateway call
    let retry = app
        .post(
            "/api/payments/confirm",
            Some(&member),
            &json!({ "paymentKey": "pk_test_1", "orderId": order["orderNumber"], "amount": 8000 }),
        )
        .await;
    assert_eq!(retry.status().as_u16(), 200);
    assert_eq!(app.gateway_calls(), 1);

    // A different key for a paid order is a conflict
    let other_key = app
        .post(
            "/api/payments/confirm",
            Some(&member),
            &json!({ "paymentKey": "pk_test_2", "orderId": order["orderNumber"], "amount": 8000 }),
        )
        .await;
    assert_eq!(other_key.status().as_u16(), 409);
}

#[tokio::test]
async fn amount_mismatch_never_reaches_the_gateway() {
    // Arrange
    let app = spawn_app().await;
    let (_, member, order) = placed_order(&app).await;

    // Act
    let response = app
        .post(
            "/api/payments/confirm",
            Some(&member),
            &json!({ "paymentKey": "pk_test_1", "orderId": order["orderNumber"], "amount": 7999 }),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(app.gateway_calls(), 0);
    let id = order["id"].as_i64().unwrap();
    assert_eq!(app.stored_order_status(id).await, "PENDING");
}

#[tokio::test]
async fn gateway_rejection_leaves_order_pending() {
    let app = spawn_app().await;
    let (_, member, order) = placed_order(&app).await;

    let response = app
        .post(
            "/api/payments/confirm",
            Some(&member),
            &json!({ "paymentKey": "fail_card", "orderId": order["orderNumber"], "amount": 8000 }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Payment confirmation failed");
    assert_eq!(app.gateway_calls(), 1);
    assert_eq!(app.stored_order_status(order["id"].as_i64().unwrap()).await, "PENDING");
}

#[tokio::test]
async fn orders_are_scoped_to_their_owner() {
    let app = spawn_app().await;
    let (_, _, order) = placed_order(&app).await;
    let (_, stranger) = app.member("stranger@example.com").await;
    let number = order["orderNumber"].as_str().unwrap();

    let read = app.get(&format!("/api/orders/{number}"), Some(&stranger)).await;
    let confirm = app
        .post(
            "/api/payments/confirm",
            Some(&stranger),
            &json!({ "paymentKey": "pk", "orderId": number, "amount": 8000 }),
        )
        .await;
    let mine: Value = app.get("/api/orders", Some(&stranger)).await.json().await.unwrap();

    assert_eq!(read.status().as_u16(), 404);
    assert_eq!(confirm.status().as_u16(), 404);
    assert!(mine.as_array().unwrap().is_empty());
    assert_eq!(app.gateway_calls(), 0);
}

#[tokio::test]
async fn admin_moves_orders_one_step_at_a_time() {
    // Arrange
    let app = spawn_app().await;
    let (admin, member, order) = placed_order(&app).await;
    let id = order["id"].as_i64().unwrap();
    let path = format!("/api/admin/orders/{id}");

    // Admins cannot mark an order paid by hand
    let manual_paid = app.patch(&path, Some(&admin), &json!({ "status": "PAID" })).await;
    assert_eq!(manual_paid.status().as_u16(), 400);

    app.post(
        "/api/payments/confirm",
        Some(&member),
        &json!({ "paymentKey": "pk_ok", "orderId": order["orderNumber"], "amount": 8000 }),
    )
    .await;

    // Act / Assert
    let by_member = app.patch(&path, Some(&member), &json!({ "status": "PREPARING" })).await;
    assert_eq!(by_member.status().as_u16(), 403);

    let skip = app.patch(&path, Some(&admin), &json!({ "status": "SHIPPED" })).await;
    assert_eq!(skip.status().as_u16(), 400);

    let unknown = app.patch(&path, Some(&admin), &json!({ "status": "LOST" })).await;
    assert_eq!(unknown.status().as_u16(), 400);

    for next in ["PREPARING", "SHIPPED", "DELIVERED"] {
        let response = app.patch(&path, Some(&admin), &json!({ "status": next })).await;
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], next);
    }

    let backwards = app.patch(&path, Some(&admin), &json!({ "status": "SHIPPED" })).await;
    assert_eq!(backwards.status().as_u16(), 400);

    let cancel_delivered = app.patch(&path, Some(&admin), &json!({ "status": "CANCELLED" })).await;
    assert_eq!(cancel_delivered.status().as_u16(), 400);
}

#[tokio::test]
async fn admin_can_cancel_and_filter_orders() {
    let app = spawn_app().await;
    let (admin, _, order) = placed_order(&app).await;
    let id = order["id"].as_i64().unwrap();

    let cancelled = app
        .patch(&format!("/api/admin/orders/{id}"), Some(&admin), &json!({ "status": "CANCELLED" }))
        .await;
    assert_eq!(cancelled.status().as_u16(), 200);

    let listed: Value = app
        .get("/api/admin/orders?status=CANCELLED", Some(&admin))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let pending: Value = app
        .get("/api/admin/orders?status=PENDING", Some(&admin))
        .await
        .json()
        .await
        .unwrap();
    assert!(pending.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn free_order_is_rejected() {
    let app = spawn_app().await;
    let (_, admin) = app.admin("admin@example.com").await;
    let (_, member) = app.member("buyer@example.com").await;
    let product = create_product(
        &app,
        &admin,
        json!({ "name": "Sample sachet", "price": 5000, "discountRate": 100, "category": "sample" }),
    )
    .await;
    assert_eq!(product["discountPrice"], 0);

    let response = app
        .post(
            "/api/orders",
            Some(&member),
            &json!({ "items": [{ "productId": product["id"], "quantity": 2 }] }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn oversized_price_is_rejected() {
    let app = spawn_app().await;
    let (_, admin) = app.admin("admin@example.com").await;

    let response = app
        .post(
            "/api/products",
            Some(&admin),
            &json!({ "name": "Gold", "price": 9_000_000_000_000_000_000_i64, "discountRate": 20, "category": "x" }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn admin_order_routes_are_back_office_only() {
    // Arrange
    let app = spawn_app().await;
    let (_, owner, order) = placed_order(&app).await;
    let path = format!("/api/admin/orders/{}", order["id"]);

    // Act
    let by_owner = app.get(&path, Some(&owner)).await;
    let anonymous_missing = app
        .patch("/api/admin/orders/999999", None, &json!({ "status": "PREPARING" }))
        .await;
    let member_missing = app.get("/api/admin/orders/999999", Some(&owner)).await;

    // Assert
    assert_eq!(by_owner.status().as_u16(), 403);
    assert_eq!(anonymous_missing.status().as_u16(), 401);
    assert_eq!(member_missing.status().as_u16(), 403);
}
