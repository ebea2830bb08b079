use crate::item::CacheItem;

use std::sync::Arc;

/// A hook invoked with a table item, used for the added-item and
/// about-to-delete notification lists.
///
/// Callbacks are plain function values stored in ordered lists; a list is
/// invoked in registration order. The table lock is guaranteed to be
/// released while a callback runs, so a callback may safely re-enter the
/// table (for example, to delete another key). Callbacks should not block
/// indefinitely, since they run synchronously on the mutating call.
pub type ItemCallback<K, V> = Arc<dyn Fn(&Arc<CacheItem<K, V>>) + Send + Sync>;

/// A hook invoked with an item's key immediately before the item is removed
/// from its table, for any removal reason (explicit delete or TTL expiry).
pub type KeyCallback<K> = Arc<dyn Fn(&K) + Send + Sync>;
