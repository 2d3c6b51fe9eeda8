//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Active WebSocket connection gauges
//! - Relay event counters by event type
//! - Rooms with at least one connected member

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace("gameconnecting"),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace("gameconnecting")
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Active WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(
        Opts::new(
            "websocket_connections_active",
            "Number of active WebSocket connections",
        )
        .namespace("gameconnecting"),
        &["state"], // "connected", "identified"
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Relay event counter - tracks dispatched realtime events by type
pub static RELAY_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("relay_events_total", "Total number of relayed realtime events")
            .namespace("gameconnecting"),
        &["event"],
    )
    .expect("Failed to create RELAY_EVENTS_TOTAL metric")
});

/// Rooms that currently have at least one connected member
pub static ACTIVE_RELAY_ROOMS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "active_relay_rooms",
            "Rooms with at least one connected member",
        )
        .namespace("gameconnecting"),
    )
    .expect("Failed to create ACTIVE_RELAY_ROOMS metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(RELAY_EVENTS_TOTAL.clone()))
        .expect("Failed to register RELAY_EVENTS_TOTAL");
    registry
        .register(Box::new(ACTIVE_RELAY_ROOMS.clone()))
        .expect("Failed to register ACTIVE_RELAY_ROOMS");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics should be valid UTF-8")
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record a relayed realtime event
pub fn record_relay_event(event: &str) {
    RELAY_EVENTS_TOTAL.with_label_values(&[event]).inc();
}

/// Helper to bump the WebSocket connection gauge for a state
pub fn inc_websocket_connections(state: &str) {
    WEBSOCKET_CONNECTIONS_ACTIVE
        .with_label_values(&[state])
        .inc();
}

/// Helper to drop the WebSocket connection gauge for a state
pub fn dec_websocket_connections(state: &str) {
    WEBSOCKET_CONNECTIONS_ACTIVE
        .with_label_values(&[state])
        .dec();
}

/// Helper to track the number of rooms with connected members
pub fn set_active_relay_rooms(count: i64) {
    ACTIVE_RELAY_ROOMS.set(count);
}
