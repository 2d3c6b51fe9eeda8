//! Room List Cache Service
//!
//! Redis-based caching for the public room listing. The lobby polls this
//! list aggressively, so it is served from cache and invalidated whenever
//! a room is created, updated, or deleted.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use super::keys;
use crate::domain::RoomSummary;
use crate::shared::error::AppError;

/// Default time-to-live for the cached room list, in seconds.
const DEFAULT_TTL: u64 = 60;

/// Cache service for the public room listing.
#[derive(Clone)]
pub struct RoomListCacheService {
    redis: ConnectionManager,
    ttl: u64,
}

impl RoomListCacheService {
    /// Create a new room list cache service with the default TTL.
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            redis,
            ttl: DEFAULT_TTL,
        }
    }

    /// Create with a custom TTL.
    pub fn with_ttl(redis: ConnectionManager, ttl: u64) -> Self {
        Self { redis, ttl }
    }

    /// Get the cached public room listing, if present.
    pub async fn get_public_rooms(&self) -> Result<Option<Vec<RoomSummary>>, AppError> {
        let mut conn = self.redis.clone();
        let value: Option<String> = conn.get(keys::PUBLIC_ROOMS).await?;

        match value {
            Some(json) => {
                debug!(key = keys::PUBLIC_ROOMS, "Room list cache hit");
                let rooms = serde_json::from_str(&json)
                    .map_err(|e| AppError::Internal(format!("Cache deserialization failed: {}", e)))?;
                Ok(Some(rooms))
            }
            None => {
                debug!(key = keys::PUBLIC_ROOMS, "Room list cache miss");
                Ok(None)
            }
        }
    }

    /// Store the public room listing.
    pub async fn set_public_rooms(&self, rooms: &[RoomSummary]) -> Result<(), AppError> {
        let json = serde_json::to_string(rooms)
            .map_err(|e| AppError::Internal(format!("Cache serialization failed: {}", e)))?;

        let mut conn = self.redis.clone();
        let _: () = conn.set_ex(keys::PUBLIC_ROOMS, json, self.ttl).await?;
        debug!(key = keys::PUBLIC_ROOMS, ttl = self.ttl, "Room list cached");

        Ok(())
    }

    /// Drop the cached listing. Returns whether a cached copy existed.
    pub async fn invalidate(&self) -> Result<bool, AppError> {
        let mut conn = self.redis.clone();
        let deleted: u64 = conn.del(keys::PUBLIC_ROOMS).await?;

        debug!(key = keys::PUBLIC_ROOMS, existed = deleted > 0, "Room list cache invalidated");

        Ok(deleted > 0)
    }
}

impl std::fmt::Debug for RoomListCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomListCacheService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
