use crate::callbacks::ItemCallback;
use crate::error::CacheError;
use crate::item::CacheItem;
use crate::loader::DataLoader;
use crate::metrics::Metrics;
use crate::task::timer::CleanupTimer;
use crate::time;

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use ahash::HashMap;
use log::{debug, trace};
use parking_lot::{RwLock, RwLockWriteGuard};

/// The fields guarded by the table lock: the item map, the callback lists,
/// the loader slot, and the scheduler bookkeeping.
pub(crate) struct TableInner<K, V> {
  pub(crate) items: HashMap<K, Arc<CacheItem<K, V>>>,
  /// The currently armed one-shot timer, if any finite-TTL items exist.
  pub(crate) cleanup_timer: Option<CleanupTimer>,
  /// The delay the armed timer was scheduled with; `ZERO` when no timer is
  /// armed. Not externally observable except through timing behavior.
  pub(crate) cleanup_interval: Duration,
  pub(crate) loader: Option<DataLoader<K, V>>,
  pub(crate) added_callbacks: Vec<ItemCallback<K, V>>,
  pub(crate) delete_callbacks: Vec<ItemCallback<K, V>>,
}

/// The internal, thread-safe core of a cache table.
///
/// Public handles (`CacheTable`) are cheap clones of an `Arc` around this.
/// One `RwLock` guards the map and list fields; the locking discipline is
/// that no user callback is ever invoked while that lock is held.
pub(crate) struct TableShared<K, V> {
  pub(crate) name: String,
  pub(crate) metrics: Arc<Metrics>,
  pub(crate) inner: RwLock<TableInner<K, V>>,
}

impl<K, V> fmt::Debug for TableShared<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TableShared")
      .field("name", &self.name)
      .field("metrics", &self.metrics.snapshot())
      .finish_non_exhaustive()
  }
}

impl<K, V> Drop for TableShared<K, V> {
  fn drop(&mut self) {
    if let Some(timer) = self.inner.get_mut().cleanup_timer.take() {
      timer.disarm();
    }
  }
}

impl<K, V> TableShared<K, V>
where
  K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  pub(crate) fn new(name: String) -> Arc<Self> {
    Arc::new(Self {
      name,
      metrics: Arc::new(Metrics::new()),
      inner: RwLock::new(TableInner {
        items: HashMap::default(),
        cleanup_timer: None,
        cleanup_interval: Duration::ZERO,
        loader: None,
        added_callbacks: Vec::new(),
        delete_callbacks: Vec::new(),
      }),
    })
  }

  /// Completes an insert whose write guard the caller already holds:
  /// records the item, snapshots the callback list and the scheduled
  /// interval, releases the lock, then notifies and re-evaluates the
  /// scheduler. Takes the guard by value; callbacks run only after it is
  /// dropped.
  pub(crate) fn finish_add(
    shared: &Arc<Self>,
    mut inner: RwLockWriteGuard<'_, TableInner<K, V>>,
    item: Arc<CacheItem<K, V>>,
  ) {
    debug!(
      "table {}: adding item {:?} with lifespan {:?}",
      shared.name,
      item.key(),
      item.life_span()
    );
    inner.items.insert(item.key().clone(), item.clone());

    let scheduled = inner.cleanup_interval;
    let callbacks = inner.added_callbacks.clone();
    drop(inner);

    shared.metrics.inserts.fetch_add(1, Ordering::Relaxed);
    for callback in &callbacks {
      callback(&item);
    }

    // If the new item expires sooner than the next scheduled scan (or no
    // scan is scheduled), the scheduler must be re-evaluated now.
    let life_span = item.life_span();
    if !life_span.is_zero() && (scheduled.is_zero() || life_span < scheduled) {
      Self::expiration_check(shared);
    }
  }

  /// The expiration scan: removes every item whose deadline has passed and
  /// arms a one-shot timer for the soonest remaining deadline.
  ///
  /// Runs on every trigger that could shorten the next deadline: an add of
  /// a shorter-lived item, or the previous timer firing. A full O(n) pass
  /// over the finite-TTL items, not a priority queue; the timer re-arms by
  /// re-running this scan, never by a fixed tick.
  pub(crate) fn expiration_check(shared: &Arc<Self>) {
    let mut expired = Vec::new();
    {
      let mut inner = shared.inner.write();
      if let Some(timer) = inner.cleanup_timer.take() {
        timer.disarm();
      }
      if inner.cleanup_interval.is_zero() {
        trace!("table {}: expiration check installed", shared.name);
      } else {
        trace!(
          "table {}: expiration check triggered after {:?}",
          shared.name,
          inner.cleanup_interval
        );
      }

      let now = time::now_nanos();
      let mut smallest: Option<Duration> = None;
      for item in inner.items.values() {
        match item.remaining(now) {
          // Permanent items are exempt from the scheduler.
          None => {}
          Some(left) if left.is_zero() => expired.push(item.clone()),
          Some(left) => {
            smallest = Some(smallest.map_or(left, |s| s.min(left)));
          }
        }
      }

      inner.cleanup_interval = smallest.unwrap_or(Duration::ZERO);
      if let Some(delay) = smallest {
        trace!(
          "table {}: next expiration check in {:?}",
          shared.name,
          delay
        );
        let weak = Arc::downgrade(shared);
        inner.cleanup_timer = Some(CleanupTimer::arm(delay, move || {
          if let Some(shared) = weak.upgrade() {
            Self::expiration_check(&shared);
          }
        }));
      }
    }

    // Deletions run after the lock is released: each one re-enters the
    // notify-then-remove path, which takes the lock itself.
    for item in expired {
      if item.claim_removal() {
        shared.notify_and_remove(&item);
        shared.metrics.evicted_by_ttl.fetch_add(1, Ordering::Relaxed);
      }
    }
  }

  /// The explicit-delete entry point: looks the item up, claims it, and
  /// runs the notify-then-remove path. A claim that loses to a concurrent
  /// removal reports `KeyNotFound`, so the callbacks fire exactly once.
  pub(crate) fn delete_item(&self, key: &K) -> Result<Arc<CacheItem<K, V>>, CacheError> {
    let item = self
      .inner
      .read()
      .items
      .get(key)
      .cloned()
      .ok_or(CacheError::KeyNotFound)?;
    if !item.claim_removal() {
      return Err(CacheError::KeyNotFound);
    }
    self.notify_and_remove(&item);
    Ok(item)
  }

  /// Runs the removal protocol for a claimed item: about-to-delete table
  /// callbacks first, then the item's own about-to-expire callbacks, and
  /// only then the map deletion under the write lock.
  ///
  /// The key may have been re-added while the callbacks ran; in that case
  /// the fresh entry wins and is left untouched.
  pub(crate) fn notify_and_remove(&self, item: &Arc<CacheItem<K, V>>) {
    let callbacks = self.inner.read().delete_callbacks.clone();
    for callback in &callbacks {
      callback(item);
    }
    item.notify_about_to_expire();

    let mut inner = self.inner.write();
    debug!(
      "table {}: deleting item {:?} created on {:?}, hit {} times",
      self.name,
      item.key(),
      item.created_on(),
      item.access_count()
    );
    if let Some(current) = inner.items.get(item.key()) {
      if Arc::ptr_eq(current, item) {
        inner.items.remove(item.key());
      }
    }
  }
}
