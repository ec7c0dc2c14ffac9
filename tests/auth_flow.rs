mod common;

use axum::http::{header, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use common::{spawn_app, spawn_app_with_limit, PASSWORD};
use folio::domain::Role;

#[tokio::test]
async fn login_returns_bearer_token() {
    let app = spawn_app().await;
    app.seed_user("alice@example.com", Role::User, true).await;

    let response = app.login("alice@example.com", PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(response.body["token_type"], "bearer");
    assert_eq!(response.body["expires_in"], 30 * 60);
    assert!(response.body["access_token"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let app = spawn_app().await;
    app.seed_user("alice@example.com", Role::User, true).await;

    let wrong_password = app.login("alice@example.com", "nope-nope").await;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["error"], "Invalid credentials");

    let unknown = app.login("ghost@example.com", PASSWORD).await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["error"], "Invalid credentials");

    // Lookup is case-sensitive
    let other_case = app.login("Alice@example.com", PASSWORD).await;
    assert_eq!(other_case.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unverified_user_cannot_log_in() {
    let app = spawn_app().await;
    app.seed_user("new@example.com", Role::User, false).await;

    let response = app.login("new@example.com", PASSWORD).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body["error"],
        "User not verified. Request reset password."
    );

    let wrong = app.login("new@example.com", "not-the-password").await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_reset_verifies_the_account() {
    let app = spawn_app().await;
    app.seed_user("new@example.com", Role::User, false).await;

    let requested = app
        .post_json(
            "/api/v1/auth/reset-password",
            None,
            json!({ "email": "new@example.com" }),
        )
        .await;
    assert_eq!(requested.status, StatusCode::ACCEPTED);

    // Unknown emails get the same answer
    let unknown = app
        .post_json(
            "/api/v1/auth/reset-password",
            None,
            json!({ "email": "ghost@example.com" }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::ACCEPTED);
    assert_eq!(unknown.body, requested.body);

    let sent = app.notifier.wait_for(1).await;
    assert_eq!(sent.len(), 1);
    let reset_token = sent[0].1.clone();

    let confirmed = app
        .post_json(
            "/api/v1/auth/reset-password/confirm",
            None,
            json!({ "token": reset_token, "new_password": "fresh-password" }),
        )
        .await;
    assert_eq!(confirmed.status, StatusCode::OK, "{}", confirmed.text);
    assert_eq!(confirmed.body["data"]["verified"], true);

    assert_eq!(app.login("new@example.com", PASSWORD).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.login("new@example.com", "fresh-password").await.status, StatusCode::OK);
}

#[tokio::test]
async fn reset_confirmation_rejects_other_tokens() {
    let app = spawn_app().await;
    let user = app.seed_user("alice@example.com", Role::User, true).await;
    let access = app.token_for("alice@example.com").await;

    let garbage = app
        .post_json(
            "/api/v1/auth/reset-password/confirm",
            None,
            json!({ "token": "garbage", "new_password": "fresh-password" }),
        )
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let with_access = app
        .post_json(
            "/api/v1/auth/reset-password/confirm",
            None,
            json!({ "token": access, "new_password": "fresh-password" }),
        )
        .await;
    assert_eq!(with_access.status, StatusCode::UNAUTHORIZED);

    // A reset token is not an access token either
    let reset_token = app.codec.encode_reset(user.id).unwrap();
    let me = app.get("/api/v1/auth/me", Some(&reset_token)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = spawn_app().await;
    let user = app.seed_user("alice@example.com", Role::User, true).await;

    let stale = app
        .codec
        .encode_at(
            user.id,
            &user.role.granted_scopes(),
            Utc::now() - Duration::minutes(31),
        )
        .unwrap();

    let response = app.get("/api/v1/auth/me", Some(&stale)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn profile_includes_posts_and_tags() {
    let app = spawn_app().await;
    app.seed_user("alice@example.com", Role::User, true).await;
    let token = app.token_for("alice@example.com").await;

    let created = app
        .post_json(
            "/api/v1/posts",
            Some(&token),
            json!({ "title": "Hello", "content": "First post.", "tags": ["rust", "intro"] }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text);
    assert_eq!(created.body["data"]["tags"].as_array().unwrap().len(), 2);

    let second = app
        .post_json(
            "/api/v1/posts",
            Some(&token),
            json!({ "title": "Again", "content": "More.", "tags": ["rust"] }),
        )
        .await;
    assert_eq!(second.status, StatusCode::CREATED);

    let me = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK, "{}", me.text);
    let profile = &me.body["data"];
    assert_eq!(profile["email"], "alice@example.com");
    assert!(profile.get("password_hash").is_none());
    assert_eq!(profile["posts"].as_array().unwrap().len(), 2);

    let tag_names: Vec<_> = profile["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tag_names, vec!["intro", "rust"]);

    let posts = app.get("/api/v1/posts", Some(&token)).await;
    assert_eq!(posts.status, StatusCode::OK);
    assert_eq!(posts.body["data"][0]["title"], "Hello");
}

#[tokio::test]
async fn posts_are_private_to_their_owner() {
    let app = spawn_app().await;
    app.seed_user("alice@example.com", Role::User, true).await;
    app.seed_user("bob@example.com", Role::User, true).await;
    let alice = app.token_for("alice@example.com").await;
    let bob = app.token_for("bob@example.com").await;

    app.post_json(
        "/api/v1/posts",
        Some(&alice),
        json!({ "title": "Mine", "content": "Alice only." }),
    )
    .await;

    let bobs = app.get("/api/v1/posts", Some(&bob)).await;
    assert_eq!(bobs.status, StatusCode::OK);
    assert!(bobs.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rate_limit_rejects_after_budget_with_retry_after() {
    let app = spawn_app_with_limit(2).await;
    app.seed_user("alice@example.com", Role::User, true).await;
    app.seed_user("bob@example.com", Role::User, true).await;
    let alice = app.token_for("alice@example.com").await;
    let bob = app.token_for("bob@example.com").await;

    assert_eq!(app.get("/api/v1/posts", Some(&alice)).await.status, StatusCode::OK);
    assert_eq!(app.get("/api/v1/auth/me", Some(&alice)).await.status, StatusCode::OK);

    let limited = app.get("/api/v1/posts", Some(&alice)).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = limited.headers[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 60);

    // Budgets are per identity
    assert_eq!(app.get("/api/v1/posts", Some(&bob)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn token_of_deleted_user_cannot_create_posts() {
    let app = spawn_app().await;
    let user = app.seed_user("alice@example.com", Role::User, true).await;
    let token = app.token_for("alice@example.com").await;

    app.state.users.delete_user(user.id).await.unwrap();

    let response = app
        .post_json(
            "/api/v1/posts",
            Some(&token),
            json!({ "title": "Late", "content": "Account is gone.", "tags": ["rust"] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", response.text);
    assert_eq!(response.body["success"], false);

    let me = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::NOT_FOUND);
}
