//! Telemetry and Observability
//!
//! Structured logging setup. Local runs get human-readable output;
//! everything else emits JSON lines for the log pipeline.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// The output format follows `RUN_ENV`: `development` logs annotated
/// single lines, any other environment logs JSON.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gameconnecting=debug,sqlx=warn,tower_http=debug"));

    let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if environment == "development" {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    }

    tracing::info!(%environment, "Tracing initialized");
}
