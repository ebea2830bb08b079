use std::sync::Arc;
use std::time::Duration;

/// The data loader hook, invoked by `value` on a cache miss.
///
/// Returning `Some((data, life_span))` inserts a fresh item through the
/// regular add path (added-item callbacks included) and hands it back to the
/// caller; returning `None` turns the miss into
/// [`CacheError::KeyNotFoundOrNotLoadable`](crate::CacheError).
///
/// The loader runs with no table lock held. Two concurrent misses for the
/// same key may both invoke it; the last insert wins.
pub type DataLoader<K, V> = Arc<dyn Fn(&K) -> Option<(V, Duration)> + Send + Sync>;
