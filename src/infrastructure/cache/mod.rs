//! Cache Module
//!
//! Redis connection management and caching utilities.
//!
//! This module provides:
//! - Redis connection management with automatic reconnection
//! - A room list cache that keeps the lobby listing off the database
//! - Predefined key names for consistent cache key naming
//!
//! # Example
//!
//! ```rust,ignore
//! use gameconnecting::infrastructure::cache::{create_redis_client, RoomListCacheService};
//! use gameconnecting::config::RedisSettings;
//!
//! let settings = RedisSettings {
//!     url: "redis://localhost:6379".into(),
//!     pool_size: 10,
//! };
//! let conn = create_redis_client(&settings).await?;
//!
//! let room_cache = RoomListCacheService::new(conn);
//! if let Some(rooms) = room_cache.get_public_rooms().await? {
//!     // serve from cache
//! }
//! ```

mod room_list_cache;

pub use room_list_cache::RoomListCacheService;

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Creates a Redis connection manager with automatic reconnection.
///
/// The connection manager handles connection pooling and automatic
/// reconnection when the connection is lost.
///
/// # Arguments
/// * `settings` - Redis configuration settings
///
/// # Returns
/// * `Ok(ConnectionManager)` - On successful connection
/// * `Err(redis::RedisError)` - If connection fails
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Cache key names for different data types.
///
/// Use these constants to ensure consistent key naming across the application.
pub mod keys {
    /// Key holding the serialized public room listing
    pub const PUBLIC_ROOMS: &str = "rooms:public";
}
