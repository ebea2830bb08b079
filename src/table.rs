use crate::error::CacheError;
use crate::item::CacheItem;
use crate::metrics::MetricsSnapshot;
use crate::shared::TableShared;

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

/// A concurrent, named table of cached items with per-item TTL expiration,
/// lazy loading on miss, and lifecycle callbacks.
///
/// `CacheTable` is a cheap handle over shared state: cloning it yields a
/// second handle onto the same table, which is how the registry hands the
/// same table to every caller asking for its name.
///
/// Every mutating operation releases the table lock before invoking any
/// user callback, so callbacks may re-enter the table without deadlocking.
///
/// # Example
///
/// ```
/// use memotable::CacheTable;
/// use std::time::Duration;
///
/// let table: CacheTable<String, String> = CacheTable::new("sessions");
/// table.add("alpha".to_string(), Duration::from_secs(60), "payload".to_string());
///
/// let item = table.value(&"alpha".to_string()).unwrap();
/// assert_eq!(item.data().as_str(), "payload");
/// assert_eq!(item.access_count(), 1);
/// ```
pub struct CacheTable<K: Send + Sync, V: Send + Sync> {
  pub(crate) shared: Arc<TableShared<K, V>>,
}

impl<K: Send + Sync, V: Send + Sync> Clone for CacheTable<K, V> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
    }
  }
}

impl<K: Send + Sync, V: Send + Sync> fmt::Debug for CacheTable<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheTable")
      .field("shared", &self.shared)
      .finish()
  }
}

impl<K, V> CacheTable<K, V>
where
  K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Creates a standalone table. Most callers go through
  /// [`cache`](crate::cache) instead, which hands out one shared table per
  /// name.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      shared: TableShared::new(name.into()),
    }
  }

  /// The table's name.
  pub fn name(&self) -> &str {
    &self.shared.name
  }

  /// Returns how many items are currently in the table.
  pub fn count(&self) -> usize {
    self.shared.inner.read().items.len()
  }

  /// Returns whether an item exists for `key`.
  pub fn exists(&self, key: &K) -> bool {
    self.shared.inner.read().items.contains_key(key)
  }

  /// Invokes `f` for every entry while holding the read lock. `f` must not
  /// re-enter the table.
  pub fn foreach(&self, mut f: impl FnMut(&K, &Arc<CacheItem<K, V>>)) {
    let inner = self.shared.inner.read();
    for (key, item) in &inner.items {
      f(key, item);
    }
  }

  /// Adds a new item to the table, overwriting any existing entry for the
  /// key with no special signal.
  ///
  /// After the insert, every added-item callback is invoked (outside the
  /// lock, in registration order); then, if the new item's lifespan is
  /// finite and shorter than the next scheduled expiration scan, the
  /// scheduler is re-evaluated synchronously before returning.
  pub fn add(&self, key: K, life_span: Duration, data: V) -> Arc<CacheItem<K, V>> {
    let item = Arc::new(CacheItem::new(key, life_span, data));
    let inner = self.shared.inner.write();
    TableShared::finish_add(&self.shared, inner, item.clone());
    item
  }

  /// Adds an item only if its key is not already present. Returns whether
  /// the item was added; the check and the insert are atomic under the
  /// table lock.
  pub fn not_found_add(&self, key: K, life_span: Duration, data: V) -> bool {
    let inner = self.shared.inner.write();
    if inner.items.contains_key(&key) {
      return false;
    }
    let item = Arc::new(CacheItem::new(key, life_span, data));
    TableShared::finish_add(&self.shared, inner, item);
    true
  }

  /// Removes the item for `key` and returns it.
  ///
  /// Before the entry leaves the map, and with the table lock released, all
  /// about-to-delete callbacks are invoked with the item, then the item's
  /// own about-to-expire callbacks with the key. Fails with
  /// [`CacheError::KeyNotFound`] if the key is absent (or a concurrent
  /// removal already claimed it).
  pub fn delete(&self, key: &K) -> Result<Arc<CacheItem<K, V>>, CacheError> {
    let item = self.shared.delete_item(key)?;
    self.shared.metrics.deletes.fetch_add(1, Ordering::Relaxed);
    Ok(item)
  }

  /// Looks up `key`, keeping the item alive on a hit.
  ///
  /// On a miss with a data loader configured, the loader is invoked with
  /// the key; a produced value is inserted through the regular add path
  /// (same callback semantics) and returned, while a declined load fails
  /// with [`CacheError::KeyNotFoundOrNotLoadable`]. A miss without a loader
  /// fails with [`CacheError::KeyNotFound`].
  pub fn value(&self, key: &K) -> Result<Arc<CacheItem<K, V>>, CacheError> {
    let (found, loader) = {
      let inner = self.shared.inner.read();
      (inner.items.get(key).cloned(), inner.loader.clone())
    };

    if let Some(item) = found {
      item.keep_alive();
      self.shared.metrics.hits.fetch_add(1, Ordering::Relaxed);
      return Ok(item);
    }
    self.shared.metrics.misses.fetch_add(1, Ordering::Relaxed);

    let Some(loader) = loader else {
      return Err(CacheError::KeyNotFound);
    };
    match loader(key) {
      Some((data, life_span)) => {
        self.shared.metrics.loads.fetch_add(1, Ordering::Relaxed);
        Ok(self.add(key.clone(), life_span, data))
      }
      None => Err(CacheError::KeyNotFoundOrNotLoadable),
    }
  }

  /// Removes every item and disarms the expiration scheduler. Callback
  /// registrations and the data loader survive a flush.
  pub fn flush(&self) {
    {
      let mut inner = self.shared.inner.write();
      debug!("table {}: flushing", self.shared.name);
      inner.items.clear();
      inner.cleanup_interval = Duration::ZERO;
      if let Some(timer) = inner.cleanup_timer.take() {
        timer.disarm();
      }
    }
    self.shared.metrics.flushes.fetch_add(1, Ordering::Relaxed);
  }

  /// Returns up to `count` items sorted by descending access count. Ties
  /// break arbitrarily; the order is not stable across calls.
  pub fn most_accessed(&self, count: usize) -> Vec<Arc<CacheItem<K, V>>> {
    let mut pairs: Vec<(u64, Arc<CacheItem<K, V>>)> = {
      let inner = self.shared.inner.read();
      inner
        .items
        .values()
        .map(|item| (item.access_count(), item.clone()))
        .collect()
    };
    pairs.sort_unstable_by(|a, b| b.0.cmp(&a.0));
    pairs.into_iter().take(count).map(|(_, item)| item).collect()
  }

  /// Installs `f` as the data loader invoked on a cache miss, replacing any
  /// previously configured loader.
  pub fn set_data_loader(
    &self,
    f: impl Fn(&K) -> Option<(V, Duration)> + Send + Sync + 'static,
  ) {
    self.shared.inner.write().loader = Some(Arc::new(f));
  }

  /// Clears any existing added-item callbacks, then installs exactly `f`.
  pub fn set_added_item_callback(&self, f: impl Fn(&Arc<CacheItem<K, V>>) + Send + Sync + 'static) {
    let mut inner = self.shared.inner.write();
    inner.added_callbacks.clear();
    inner.added_callbacks.push(Arc::new(f));
  }

  /// Appends `f` to the added-item callbacks without clearing any.
  pub fn add_added_item_callback(&self, f: impl Fn(&Arc<CacheItem<K, V>>) + Send + Sync + 'static) {
    self.shared.inner.write().added_callbacks.push(Arc::new(f));
  }

  /// Clears all added-item callbacks.
  pub fn remove_added_item_callbacks(&self) {
    self.shared.inner.write().added_callbacks.clear();
  }

  /// Clears any existing about-to-delete callbacks, then installs exactly
  /// `f`.
  pub fn set_about_to_delete_item_callback(
    &self,
    f: impl Fn(&Arc<CacheItem<K, V>>) + Send + Sync + 'static,
  ) {
    let mut inner = self.shared.inner.write();
    inner.delete_callbacks.clear();
    inner.delete_callbacks.push(Arc::new(f));
  }

  /// Appends `f` to the about-to-delete callbacks without clearing any.
  pub fn add_about_to_delete_item_callback(
    &self,
    f: impl Fn(&Arc<CacheItem<K, V>>) + Send + Sync + 'static,
  ) {
    self.shared.inner.write().delete_callbacks.push(Arc::new(f));
  }

  /// Clears all about-to-delete callbacks.
  pub fn remove_about_to_delete_item_callbacks(&self) {
    self.shared.inner.write().delete_callbacks.clear();
  }

  /// A point-in-time snapshot of the table's operational counters.
  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }
}
