use axum::http::StatusCode;
use serde_json::json;

use crate::integration::common::{empty_request, json_request, setup_test_app};

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let (status, json) = app.send(empty_request("GET", "/api/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let (status, json) = app.send(empty_request("GET", "/documents-json", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["info"]["title"], "Sharm Beauty API");
    assert!(json["paths"]["/api/auth/signup"].is_object());
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_returns_user_and_token_without_password() {
    let app = setup_test_app().await;

    let (status, json) = app
        .send(json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "email": "anna@sharm.test",
                "password": "secret123",
                "name": "Anna",
                "surname": "Lee",
                "phone": "+79990001122",
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["user"]["email"], "anna@sharm.test");
    assert_eq!(json["user"]["role"], "user");
    assert!(json["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(json["user"].get("password").is_none());
    assert!(!json.to_string().contains("argon2"));
}

#[tokio::test]
async fn duplicate_signup_returns_409() {
    let app = setup_test_app().await;
    app.signup("dup@sharm.test").await;

    let (status, json) = app
        .send(json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "email": "dup@sharm.test",
                "password": "another1",
                "name": "B",
                "surname": "C",
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");
    assert_eq!(json["message"], "User already exist");
}

#[tokio::test]
async fn invalid_signup_returns_400() {
    let app = setup_test_app().await;

    let (status, json) = app
        .send(json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "email": "not-an-email",
                "password": "123",
                "name": "Anna",
                "surname": "Lee",
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn login_and_profile() {
    let app = setup_test_app().await;
    let (id, _) = app.signup("me@sharm.test").await;

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "me@sharm.test", "password": "wrong-password"}),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "me@sharm.test", "password": "secret123"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = json["token"].as_str().unwrap().to_string();

    let (status, json) = app
        .send(empty_request("GET", "/api/auth/profile", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id);
    assert_eq!(json["email"], "me@sharm.test");
}

#[tokio::test]
async fn missing_or_bad_token_returns_401() {
    let app = setup_test_app().await;

    let (status, json) = app
        .send(empty_request("GET", "/api/auth/profile", None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");

    let (status, _) = app
        .send(empty_request("GET", "/api/auth/profile", Some("garbage")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routes_reject_users_and_anonymous() {
    let app = setup_test_app().await;
    let (_, token) = app.signup("plain@sharm.test").await;

    let (status, _) = app.send(empty_request("GET", "/api/users", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = app
        .send(empty_request("GET", "/api/users", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "forbidden");

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/categories",
            Some(&token),
            json!({"title": "Face", "url": "face", "parent": {"id": 1}}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_lists_users_with_pagination() {
    let app = setup_test_app().await;
    let (_, admin) = app.admin("admin@sharm.test").await;
    for i in 0..4 {
        app.signup(&format!("user{i}@sharm.test")).await;
    }

    let (status, json) = app
        .send(empty_request("GET", "/api/users?page=2&limit=2", Some(&admin)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 5);
    assert_eq!(json["current_page"], 2);
    assert_eq!(json["total_pages"], 3);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let (status, json) = app
        .send(empty_request("GET", "/api/users", Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["current_page"], 1);
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["data"][0]["email"], "user3@sharm.test");

    let (status, _) = app
        .send(empty_request("GET", "/api/users?page=0", Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_admin_lookup_resolves_to_self() {
    let app = setup_test_app().await;
    let (own_id, token) = app.signup("self@sharm.test").await;
    let (other_id, _) = app.signup("other@sharm.test").await;

    let (status, json) = app
        .send(empty_request(
            "GET",
            &format!("/api/users/{other_id}"),
            Some(&token),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], own_id);
    assert_eq!(json["email"], "self@sharm.test");
}

#[tokio::test]
async fn admin_lookup_of_missing_user_returns_404() {
    let app = setup_test_app().await;
    let (_, admin) = app.admin("admin@sharm.test").await;

    let (status, json) = app
        .send(empty_request("GET", "/api/users/9999", Some(&admin)))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn update_returns_previous_snapshot_and_persists() {
    let app = setup_test_app().await;
    let (id, token) = app.signup("edit@sharm.test").await;

    let (status, json) = app
        .send(json_request(
            "PATCH",
            &format!("/api/users/{id}"),
            Some(&token),
            json!({"name": "Maria"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Anna");

    let (_, json) = app
        .send(empty_request("GET", "/api/auth/profile", Some(&token)))
        .await;
    assert_eq!(json["name"], "Maria");
}

#[tokio::test]
async fn update_to_taken_email_returns_409() {
    let app = setup_test_app().await;
    app.signup("taken@sharm.test").await;
    let (id, token) = app.signup("mine@sharm.test").await;

    let (status, _) = app
        .send(json_request(
            "PATCH",
            &format!("/api/users/{id}"),
            Some(&token),
            json!({"email": "taken@sharm.test"}),
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn admin_changes_role_and_deletes_user() {
    let app = setup_test_app().await;
    let (_, admin) = app.admin("admin@sharm.test").await;
    let (id, _) = app.signup("target@sharm.test").await;

    let (status, json) = app
        .send(json_request(
            "PATCH",
            &format!("/api/users/{id}/role"),
            Some(&admin),
            json!({"role": "admin"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role"], "admin");

    let (status, _) = app
        .send(json_request(
            "PATCH",
            &format!("/api/users/{id}/role"),
            Some(&admin),
            json!({"role": "owner"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = app
        .send(empty_request(
            "DELETE",
            &format!("/api/users/{id}"),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], true);

    let (status, _) = app
        .send(empty_request(
            "DELETE",
            &format!("/api/users/{id}"),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_users_by_field() {
    let app = setup_test_app().await;
    let (_, admin) = app.admin("boss@sharm.test").await;
    app.signup("client@sharm.test").await;

    let (status, json) = app
        .send(empty_request(
            "GET",
            "/api/users/search?field=role&value=ADMIN",
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let found = json.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["email"], "boss@sharm.test");

    let (status, json) = app
        .send(empty_request(
            "GET",
            "/api/users/search?field=ssn&value=1",
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid search field");
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[tokio::test]
async fn category_tree_lifecycle() {
    let app = setup_test_app().await;
    let (_, admin) = app.admin("admin@sharm.test").await;

    let (status, face) = app
        .send(json_request(
            "POST",
            "/api/categories",
            Some(&admin),
            json!({"title": "Face", "url": "face", "parent": {"id": 1}}),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let face_id = face["id"].as_i64().unwrap();
    assert_eq!(face["parent_id"], 1);

    let (status, creams) = app
        .send(json_request(
            "POST",
            "/api/categories",
            Some(&admin),
            json!({
                "title": "Creams",
                "url": "face-creams",
                "description": "Day and night creams",
                "parent": {"id": face_id},
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let creams_id = creams["id"].as_i64().unwrap();

    // Public reads
    let (status, json) = app
        .send(empty_request(
            "GET",
            &format!("/api/categories/{face_id}/children"),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["url"], "face-creams");

    let (status, json) = app.send(empty_request("GET", "/api/categories", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 3);

    // Cycle
    let (status, json) = app
        .send(json_request(
            "PATCH",
            &format!("/api/categories/{face_id}"),
            Some(&admin),
            json!({"parent": {"id": creams_id}}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bad_request");

    // Parent with children cannot go
    let (status, _) = app
        .send(empty_request(
            "DELETE",
            &format!("/api/categories/{face_id}"),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = app
        .send(empty_request(
            "DELETE",
            &format!("/api/categories/{creams_id}"),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(json.is_null());

    let (status, _) = app
        .send(empty_request(
            "GET",
            &format!("/api/categories/{creams_id}"),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_with_missing_parent_or_bad_slug() {
    let app = setup_test_app().await;
    let (_, admin) = app.admin("admin@sharm.test").await;

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/categories",
            Some(&admin),
            json!({"title": "Lost", "url": "lost", "parent": {"id": 777}}),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = app
        .send(json_request(
            "POST",
            "/api/categories",
            Some(&admin),
            json!({"title": "Bad", "url": "Bad Slug", "parent": {"id": 1}}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    let (status, _) = app
        .send(empty_request("DELETE", "/api/categories/1", Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
