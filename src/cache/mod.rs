mod macros;

use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::error::{AppError, AppResult};

/// Creates a Redis client for caching
///
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Typed cache keys so call sites cannot collide on raw strings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Ranked recommendation list, keyed by a taste-profile fingerprint
    Recommendations(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Recommendations(fingerprint) => write!(f, "recs:{}", fingerprint),
        }
    }
}

/// Cache handler for storing and retrieving data from Redis
///
/// Writes are fire-and-forget: a failed write is logged and never surfaces
/// to the request path.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
}

impl Cache {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Retrieves a cached value by key, `None` on miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache without blocking the caller
    ///
    /// Serialization happens inline; the Redis write runs on a detached task
    /// so a slow or unreachable Redis never delays a response.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let client = self.redis_client.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            let write = async {
                let mut conn = client.get_multiplexed_async_connection().await?;
                conn.set_ex::<_, _, ()>(&key, json, ttl).await
            };
            if let Err(e) = write.await {
                tracing::warn!(error = %e, key = %key, "Background cache write failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_recommendations() {
        let key = CacheKey::Recommendations("s1,2|l3|n20".to_string());
        assert_eq!(format!("{}", key), "recs:s1,2|l3|n20");
    }

    #[test]
    fn test_cache_key_equality() {
        let a = CacheKey::Recommendations("fp".to_string());
        let b = CacheKey::Recommendations("fp".to_string());
        assert_eq!(a, b);
    }
}
