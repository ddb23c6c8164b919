// tests/admin_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};
use vitacare::models::user::Role;

#[tokio::test]
async fn admin_routes_reject_members_and_guests() {
    let app = spawn_app().await;
    let (_, member) = app.member("member@example.com").await;

    assert_eq!(app.get("/api/admin/users", None).await.status().as_u16(), 403);
    assert_eq!(app.get("/api/admin/users", Some(&member)).await.status().as_u16(), 403);
    assert_eq!(app.get("/api/admin/orders", Some(&member)).await.status().as_u16(), 403);
    assert_eq!(app.get("/api/admin/content", Some(&member)).await.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_creates_and_grants_permissions() {
    // Arrange
    let app = spawn_app().await;
    let (_, admin) = app.admin("admin@example.com").await;

    // Act
    let created = app
        .post(
            "/api/admin/users",
            Some(&admin),
            &json!({
                "name": "Dr. Han",
                "email": "han@example.com",
                "password": "password123",
                "isExpert": true
            }),
        )
        .await;
    assert_eq!(created.status().as_u16(), 201);
    let created: Value = created.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let updated = app
        .patch(
            &format!("/api/admin/users/{id}"),
            Some(&admin),
            &json!({ "canManageContent": true, "expertField": "Pharmacy", "expertVerified": true }),
        )
        .await;

    // Assert
    assert_eq!(updated.status().as_u16(), 200);
    let updated: Value = updated.json().await.unwrap();
    assert_eq!(updated["role"], "USER");
    assert_eq!(updated["isExpert"], true);
    assert_eq!(updated["canManageContent"], true);
    assert_eq!(updated["expertField"], "Pharmacy");
    assert_eq!(updated["expertVerified"], true);

    let users: Value = app.get("/api/admin/users", Some(&admin)).await.json().await.unwrap();
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn permission_changes_apply_to_existing_tokens() {
    let app = spawn_app().await;
    let (_, admin) = app.admin("admin@example.com").await;
    let (editor_id, editor) = app.member("editor@example.com").await;
    let draft = json!({ "title": "Sleep hygiene", "body": "<p>Go to bed early.</p>", "category": "LIFESTYLE" });

    let before = app.post("/api/content", Some(&editor), &draft).await;
    app.patch(
        &format!("/api/admin/users/{editor_id}"),
        Some(&admin),
        &json!({ "canManageContent": true }),
    )
    .await;
    let after = app.post("/api/content", Some(&editor), &draft).await;

    assert_eq!(before.status().as_u16(), 403);
    assert_eq!(after.status().as_u16(), 201);
}

#[tokio::test]
async fn admin_cannot_delete_or_demote_themselves() {
    let app = spawn_app().await;
    let (admin_id, admin) = app.admin("admin@example.com").await;

    let delete_self = app.delete(&format!("/api/admin/users/{admin_id}"), Some(&admin)).await;
    let demote_self = app
        .patch(&format!("/api/admin/users/{admin_id}"), Some(&admin), &json!({ "role": "USER" }))
        .await;

    assert_eq!(delete_self.status().as_u16(), 400);
    let body: Value = delete_self.json().await.unwrap();
    assert_eq!(body["error"], "Cannot delete yourself");
    assert_eq!(demote_self.status().as_u16(), 400);
}

#[tokio::test]
async fn deleted_user_token_stops_working() {
    let app = spawn_app().await;
    let (_, admin) = app.admin("admin@example.com").await;
    let (member_id, member) = app.member("member@example.com").await;

    let deleted = app.delete(&format!("/api/admin/users/{member_id}"), Some(&admin)).await;
    let me = app.get("/api/users/me", Some(&member)).await;

    assert_eq!(deleted.status().as_u16(), 204);
    assert_eq!(me.status().as_u16(), 401);
}

#[tokio::test]
async fn hero_images_are_listed_in_display_order() {
    // Arrange
    let app = spawn_app().await;
    let (_, admin) = app.admin("admin@example.com").await;
    for (url, order, active) in [
        ("/uploads/hero/b.jpg", 2, true),
        ("/uploads/hero/a.jpg", 1, true),
        ("/uploads/hero/hidden.jpg", 0, false),
    ] {
        let response = app
            .post(
                "/api/admin/hero-images",
                Some(&admin),
                &json!({ "imageUrl": url, "order": order, "isActive": active, "title": "" }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
    }

    // Act
    let public: Value = app.get("/api/hero-images", None).await.json().await.unwrap();
    let all: Value = app.get("/api/admin/hero-images", Some(&admin)).await.json().await.unwrap();

    // Assert
    let urls: Vec<&str> = public
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["imageUrl"].as_str().unwrap())
        .collect();
    assert_eq!(urls, vec!["/uploads/hero/a.jpg", "/uploads/hero/b.jpg"]);
    assert!(public[0]["title"].is_null());
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn hero_image_edits_are_admin_only() {
    let app = spawn_app().await;
    let (_, admin) = app.admin("admin@example.com").await;
    let (_, manager) = app
        .user_with("manager@example.com", Role::User, |u| u.can_manage_content = true)
        .await;
    let created: Value = app
        .post("/api/admin/hero-images", Some(&admin), &json!({ "imageUrl": "/uploads/hero/a.jpg" }))
        .await
        .json()
        .await
        .unwrap();
    let path = format!("/api/admin/hero-images/{}", created["id"]);

    let by_manager = app.patch(&path, Some(&manager), &json!({ "isActive": false })).await;
    let by_admin = app.patch(&path, Some(&admin), &json!({ "isActive": false })).await;
    let invalid_url = app.patch(&path, Some(&admin), &json!({ "imageUrl": "not a path" })).await;
    let removed = app.delete(&path, Some(&admin)).await;

    assert_eq!(by_manager.status().as_u16(), 403);
    assert_eq!(by_admin.status().as_u16(), 200);
    assert_eq!(invalid_url.status().as_u16(), 400);
    assert_eq!(removed.status().as_u16(), 204);
}
