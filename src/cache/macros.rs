/// Read-through caching over a fallible async computation.
///
/// Checks the cache first and returns the hit if present. On a miss the
/// block is awaited, its value stored in the background, and returned. A
/// failed cache read is logged and treated as a miss so a Redis outage
/// degrades to uncached calls instead of failing the request.
///
/// # Arguments
/// * `$cache`: a [`crate::cache::Cache`]
/// * `$key`: the [`crate::cache::CacheKey`] for the value
/// * `$ttl`: time-to-live in seconds
/// * `$block`: the future to await when the value is not cached
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, bypassing cache");
                None
            }
        };

        if let Some(cached) = hit {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
