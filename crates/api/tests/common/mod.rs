#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use wayside_api::auth::jwt::{generate_access_token, JwtConfig};
use wayside_api::config::ServerConfig;
use wayside_api::router::build_app_router;
use wayside_api::state::AppState;
use wayside_core::cities::{City, CityDirectory};
use wayside_core::types::DbId;
use wayside_db::models::user::CreateUser;
use wayside_db::repositories::UserRepo;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        db_max_connections: 5,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        cities_path: "unused".to_string(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
            leeway_secs: 0,
        },
    }
}

fn city(name: &str, state_id: &str, latitude: f64, longitude: f64, population: i64) -> City {
    City {
        name: name.to_string(),
        state_id: state_id.to_string(),
        state_name: String::new(),
        latitude,
        longitude,
        population,
    }
}

/// A small city directory for feed and search tests.
pub fn test_cities() -> CityDirectory {
    CityDirectory::new(vec![
        city("San Francisco", "CA", 37.7749, -122.4194, 3_364_862),
        city("San Diego", "CA", 32.8313, -117.1222, 3_084_174),
        city("Sacramento", "CA", 38.5677, -121.4685, 1_924_167),
        city("Portland", "OR", 45.5371, -122.65, 2_052_796),
    ])
}

/// Build the full application router over `pool`, with the production
/// middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cities: Arc::new(test_cities()),
    };
    build_app_router(state, &config)
}

/// Insert a user into the directory and return its id.
pub async fn create_user(pool: &PgPool, username: &str) -> DbId {
    let input = CreateUser {
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        email: None,
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

/// Mint an access token for `username` with the test secret.
pub fn token_for(username: &str) -> String {
    generate_access_token(username, &test_config().jwt).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST with the token in the `access_token` cookie instead of a header.
pub async fn post_json_cookie(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("cookie", format!("access_token={token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
