/// Read-through caching around an async computation.
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues the
/// result for a background write with `$ttl` seconds, and returns it. A failed
/// cache read is logged and treated as a miss so Redis trouble never hides the
/// upstream value.
///
/// # Arguments
/// * `$cache`: a `Cache` (anything with `get_from_cache` and `set_in_background`).
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: a future yielding `AppResult<T>`.
///
/// # Example
/// ```rust,ignore
/// let details: MovieDetails = cached!(self.cache, CacheKey::MovieDetails(id), 3600, async move {
///     self.fetch_details(id).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            other => {
                if let Err(e) = other {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                }
                match $block.await {
                    Ok(value) => {
                        $cache.set_in_background(&key, &value, $ttl);
                        Ok(value)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }};
}
