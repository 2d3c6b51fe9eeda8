//! Common Test Utilities
//!
//! Shared helpers and fixtures for the integration suite.

use axum::{routing::get, Router};
use axum_test::{TestResponse, TestServer};

use gameconnecting::presentation::http::handlers::health;

/// Test harness over the routes that answer without live backing services.
///
/// The API routes hang off `AppState`, which owns real Postgres and Redis
/// connections, so behavior over data is covered by the service tests with
/// mocked repositories instead.
pub struct TestApp {
    server: TestServer,
}

impl TestApp {
    pub fn new() -> Self {
        let router = Router::new().route("/health/live", get(health::liveness));

        Self {
            server: TestServer::new(router).expect("failed to start test server"),
        }
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.server.get(uri).await
    }
}

/// Test user credentials for request validation tests
pub struct TestUser {
    pub username: &'static str,
    pub password: &'static str,
}

pub const TEST_USER: TestUser = TestUser {
    username: "testuser",
    password: "TestPassword123!",
};

/// Generate a unique test username
pub fn unique_username() -> String {
    format!("user_{}", &uuid::Uuid::new_v4().to_string()[..8])
}
