/// Cache-aside over a [`RecommendationStore`](crate::db::RecommendationStore).
///
/// Returns the stored value for `$key` if there is one. Otherwise awaits
/// `$block`, which must produce an `AppResult`; only an `Ok` value is written
/// back, so a failed computation never leaves an entry behind.
///
/// Store failures are logged and treated as a miss (on read) or ignored (on
/// write); only the block's error is propagated.
///
/// # Example
/// ```rust,ignore
/// let snapshot = cached!(store, query, async move {
///     compute_snapshot().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($store:expr, $key:expr, $block:expr) => {{
        let hit = match $store.get(&$key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key = %$key, error = %e, "Cache read failed, treating as miss");
                None
            }
        };

        if let Some(cached) = hit {
            tracing::debug!(key = %$key, "Cache hit");
            Ok(cached)
        } else {
            match $block.await {
                Ok(value) => {
                    if let Err(e) = $store.put(&$key, &value).await {
                        tracing::warn!(key = %$key, error = %e, "Cache write failed");
                    }
                    Ok(value)
                }
                Err(e) => Err(e),
            }
        }
    }};
}
