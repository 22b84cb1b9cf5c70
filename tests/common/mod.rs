#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header::SET_COOKIE},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use tidytask::auth::SameSite;
use tidytask::jwt::{Claims, TokenType};
use tidytask::{ServerConfig, create_app, db::Database};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-for-integration-tests";

pub async fn test_app() -> Router {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db,
        jwt_secret: TEST_SECRET.to_vec(),
        access_token_expiry_mins: 30,
        refresh_token_expiry_mins: 1440,
        secure_cookies: false,
        same_site: SameSite::Lax,
    };
    create_app(&config)
}

/// Send a JSON POST through the app.
pub async fn post_json(app: &Router, uri: &str, body: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Send a request with an optional Cookie header.
pub async fn request_with_cookies(
    app: &Router,
    method: &str,
    uri: &str,
    cookies: Option<&str>,
    body: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookies) = cookies {
        builder = builder.header("cookie", cookies);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Collect all Set-Cookie header values from a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Find the Set-Cookie header for a given cookie name.
pub fn find_set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.split('=').next() == Some(name))
}

/// The value part of a Set-Cookie header (between `name=` and the first `;`).
pub fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, v)| v.to_string())
        .expect("malformed Set-Cookie")
}

/// The Max-Age attribute of a Set-Cookie header.
pub fn cookie_max_age(set_cookie: &str) -> Option<u64> {
    set_cookie.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("Max-Age=")
            .and_then(|v| v.parse().ok())
    })
}

/// Deserialize a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a user via the API.
pub async fn register(app: &Router, username: &str, password: &str) {
    let body = format!(
        r#"{{"username": "{}", "email": "{}@example.com", "password": "{}"}}"#,
        username, username, password
    );
    let response = post_json(app, "/api/register", &body).await;
    assert_eq!(response.status(), 201, "registration failed");
}

/// Log in and return the (access, refresh) token values from the cookies.
pub async fn login(app: &Router, username: &str, password: &str) -> (String, String) {
    let body = format!(
        r#"{{"username": "{}", "password": "{}"}}"#,
        username, password
    );
    let response = post_json(app, "/api/login", &body).await;
    assert_eq!(response.status(), 200, "login failed");

    let access = find_set_cookie(&response, "access_token").expect("no access cookie");
    let refresh = find_set_cookie(&response, "refresh_token").expect("no refresh cookie");
    (cookie_value(&access), cookie_value(&refresh))
}

/// Register a fresh user and log in, returning the (access, refresh) tokens.
pub async fn register_and_login(app: &Router, username: &str, password: &str) -> (String, String) {
    register(app, username, password).await;
    login(app, username, password).await
}

/// Decode a token's claims using the test secret, ignoring expiry.
pub fn decode_claims(token: &str) -> Claims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(TEST_SECRET), &validation)
        .expect("failed to decode token")
        .claims
}

/// Craft a token signed with the test secret that expired 50 seconds ago.
pub fn make_expired_token(sub: &str, username: &str, token_type: TokenType) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let claims = Claims {
        sub: sub.to_string(),
        username: username.to_string(),
        token_type,
        iat: now - 100,
        exp: now - 50,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .unwrap()
}
