//! Token lifecycle and silent-refresh integration tests.

mod common;

use axum::http::StatusCode;
use common::*;
use tidytask::jwt::TokenType;

#[tokio::test]
async fn test_login_sets_paired_cookies_with_max_ages() {
    let app = test_app().await;
    register(&app, "alice", "correctpassword").await;

    let response = post_json(
        &app,
        "/api/login",
        r#"{"username": "alice", "password": "correctpassword"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let access = find_set_cookie(&response, "access_token").expect("no access cookie");
    let refresh = find_set_cookie(&response, "refresh_token").expect("no refresh cookie");

    // 30 minutes and 1440 minutes, in seconds
    assert_eq!(cookie_max_age(&access), Some(1800));
    assert_eq!(cookie_max_age(&refresh), Some(86400));
    assert!(access.contains("HttpOnly"));
    assert!(refresh.contains("HttpOnly"));

    // Both tokens carry the same subject; access expires strictly earlier
    let access_claims = decode_claims(&cookie_value(&access));
    let refresh_claims = decode_claims(&cookie_value(&refresh));
    assert_eq!(access_claims.sub, refresh_claims.sub);
    assert_eq!(access_claims.token_type, TokenType::Access);
    assert_eq!(refresh_claims.token_type, TokenType::Refresh);
    assert!(access_claims.exp < refresh_claims.exp);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Login successful");
}

#[tokio::test]
async fn test_login_wrong_password_sets_no_cookies() {
    let app = test_app().await;
    register(&app, "alice", "correctpassword").await;

    let response = post_json(
        &app,
        "/api/login",
        r#"{"username": "alice", "password": "wrongpassword"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());

    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid credentials");
    assert_eq!(json["authenticated"], false);
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = test_app().await;

    let response = post_json(
        &app,
        "/api/login",
        r#"{"username": "nobody", "password": "whatever123"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_valid_access_cookie_passes_without_refresh() {
    let app = test_app().await;
    let (access, _refresh) = register_and_login(&app, "alice", "correctpassword").await;

    let response = request_with_cookies(
        &app,
        "GET",
        "/api/todos",
        Some(&format!("access_token={}", access)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    // No refresh happened, so nothing is set on the response
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_silent_refresh_with_only_refresh_cookie() {
    let app = test_app().await;
    let (_access, refresh) = register_and_login(&app, "alice", "correctpassword").await;

    let response = request_with_cookies(
        &app,
        "GET",
        "/api/todos",
        Some(&format!("refresh_token={}", refresh)),
        None,
    )
    .await;

    // Handler ran and the response carries a freshly minted access cookie
    assert_eq!(response.status(), StatusCode::OK);
    let new_access = find_set_cookie(&response, "access_token").expect("no refreshed cookie");
    assert_eq!(cookie_max_age(&new_access), Some(1800));

    let new_claims = decode_claims(&cookie_value(&new_access));
    let refresh_claims = decode_claims(&refresh);
    assert_eq!(new_claims.sub, refresh_claims.sub);
    assert_eq!(new_claims.token_type, TokenType::Access);
}

#[tokio::test]
async fn test_silent_refresh_with_expired_access_cookie() {
    let app = test_app().await;
    let (access, refresh) = register_and_login(&app, "alice", "correctpassword").await;

    let claims = decode_claims(&access);
    let expired = make_expired_token(&claims.sub, &claims.username, TokenType::Access);

    let response = request_with_cookies(
        &app,
        "GET",
        "/api/todos",
        Some(&format!("access_token={}; refresh_token={}", expired, refresh)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let new_access = find_set_cookie(&response, "access_token").expect("no refreshed cookie");
    let new_claims = decode_claims(&cookie_value(&new_access));
    assert_eq!(new_claims.sub, claims.sub);
}

#[tokio::test]
async fn test_no_cookies_rejected_before_handler() {
    let app = test_app().await;

    let response = request_with_cookies(&app, "GET", "/api/todos", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());

    let json = body_json(response).await;
    assert_eq!(json["error"], "No refresh token provided");
}

#[tokio::test]
async fn test_rejection_short_circuits_handler() {
    let app = test_app().await;
    let (access, _refresh) = register_and_login(&app, "alice", "correctpassword").await;

    // Unauthenticated create must not run the handler
    let response = request_with_cookies(
        &app,
        "POST",
        "/api/todos",
        None,
        Some(r#"{"title": "sneaky"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The authenticated view confirms nothing was created
    let response = request_with_cookies(
        &app,
        "GET",
        "/api/todos",
        Some(&format!("access_token={}", access)),
        None,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_invalid_refresh_cookie_rejected() {
    let app = test_app().await;

    let response = request_with_cookies(
        &app,
        "GET",
        "/api/todos",
        Some("refresh_token=garbage"),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn test_expired_refresh_cookie_rejected() {
    let app = test_app().await;
    register_and_login(&app, "alice", "correctpassword").await;

    let expired = make_expired_token("some-uuid", "alice", TokenType::Refresh);
    let response = request_with_cookies(
        &app,
        "GET",
        "/api/todos",
        Some(&format!("refresh_token={}", expired)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn test_access_token_in_refresh_cookie_rejected() {
    let app = test_app().await;
    let (access, _refresh) = register_and_login(&app, "alice", "correctpassword").await;

    // A valid access token is the wrong type for the refresh slot
    let response = request_with_cookies(
        &app,
        "GET",
        "/api/todos",
        Some(&format!("refresh_token={}", access)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_in_access_cookie_falls_back_to_refresh() {
    let app = test_app().await;
    let (_access, refresh) = register_and_login(&app, "alice", "correctpassword").await;

    // Wrong-type access cookie is unusable, but the valid refresh cookie
    // still rescues the request
    let response = request_with_cookies(
        &app,
        "GET",
        "/api/todos",
        Some(&format!("access_token={}; refresh_token={}", refresh, refresh)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(find_set_cookie(&response, "access_token").is_some());
}

#[tokio::test]
async fn test_refresh_token_reusable_across_refreshes() {
    let app = test_app().await;
    let (_access, refresh) = register_and_login(&app, "alice", "correctpassword").await;

    // The refresh token is not rotated; it keeps working
    for _ in 0..3 {
        let response = request_with_cookies(
            &app,
            "GET",
            "/api/todos",
            Some(&format!("refresh_token={}", refresh)),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(find_set_cookie(&response, "access_token").is_some());
        assert!(find_set_cookie(&response, "refresh_token").is_none());
    }
}

#[tokio::test]
async fn test_check_auth_with_valid_refresh() {
    let app = test_app().await;
    let (_access, refresh) = register_and_login(&app, "alice", "correctpassword").await;

    let response = request_with_cookies(
        &app,
        "GET",
        "/api/check-auth",
        Some(&format!("refresh_token={}", refresh)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    // Probe never mutates cookies
    assert!(set_cookies(&response).is_empty());

    let json = body_json(response).await;
    assert_eq!(json["authenticated"], true);
}

#[tokio::test]
async fn test_check_auth_without_cookies() {
    let app = test_app().await;

    let response = request_with_cookies(&app, "GET", "/api/check-auth", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());

    let json = body_json(response).await;
    assert_eq!(json["authenticated"], false);
    assert_eq!(json["message"], "Session expired. Please login again.");
}

#[tokio::test]
async fn test_check_auth_with_invalid_refresh() {
    let app = test_app().await;

    let response = request_with_cookies(
        &app,
        "GET",
        "/api/check-auth",
        Some("refresh_token=garbage"),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["authenticated"], false);
}

#[tokio::test]
async fn test_public_paths_ignore_cookie_state() {
    let app = test_app().await;
    register(&app, "alice", "correctpassword").await;

    // Garbage cookies must not trip the refresh logic on public paths
    let cookies = "access_token=garbage; refresh_token=garbage";

    let response = request_with_cookies(
        &app,
        "POST",
        "/api/login",
        Some(cookies),
        Some(r#"{"username": "alice", "password": "correctpassword"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request_with_cookies(
        &app,
        "POST",
        "/api/register",
        Some(cookies),
        Some(r#"{"username": "bob", "email": "bob@example.com", "password": "longenough"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_logout_clears_both_cookies() {
    let app = test_app().await;
    let (access, refresh) = register_and_login(&app, "alice", "correctpassword").await;

    let response = request_with_cookies(
        &app,
        "POST",
        "/api/logout",
        Some(&format!("access_token={}; refresh_token={}", access, refresh)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let clear_access = find_set_cookie(&response, "access_token").expect("access not cleared");
    let clear_refresh = find_set_cookie(&response, "refresh_token").expect("refresh not cleared");
    assert_eq!(cookie_value(&clear_access), "");
    assert_eq!(cookie_max_age(&clear_access), Some(0));
    assert_eq!(cookie_value(&clear_refresh), "");
    assert_eq!(cookie_max_age(&clear_refresh), Some(0));
}

#[tokio::test]
async fn test_logout_after_silent_refresh_still_clears() {
    let app = test_app().await;
    let (_access, refresh) = register_and_login(&app, "alice", "correctpassword").await;

    // No access cookie: logout is reached via silent refresh, and the
    // clearing instruction must win over the freshly minted token
    let response = request_with_cookies(
        &app,
        "POST",
        "/api/logout",
        Some(&format!("refresh_token={}", refresh)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let access_cookies: Vec<String> = set_cookies(&response)
        .into_iter()
        .filter(|c| c.split('=').next() == Some("access_token"))
        .collect();
    assert_eq!(access_cookies.len(), 1);
    assert_eq!(cookie_value(&access_cookies[0]), "");
    assert_eq!(cookie_max_age(&access_cookies[0]), Some(0));

    let clear_refresh = find_set_cookie(&response, "refresh_token").expect("refresh not cleared");
    assert_eq!(cookie_max_age(&clear_refresh), Some(0));
}

#[tokio::test]
async fn test_logout_without_any_credentials_rejected() {
    let app = test_app().await;

    let response = request_with_cookies(&app, "POST", "/api/logout", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
