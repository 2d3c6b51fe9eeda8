//! CORS Middleware Configuration

use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::CorsSettings;

/// Create CORS layer from the configured browser origin allowlist.
///
/// An empty allowlist falls back to permissive CORS for local development.
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<_> = settings
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!(origin = %o, "Skipping unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(std::time::Duration::from_secs(3600))
    }
}
