use crate::callbacks::KeyCallback;
use crate::time;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// A single cached entry, holding the payload and all per-item metadata.
///
/// Items are created by the table (`add`, `not_found_add`, or a data-loader
/// miss) and handed out as `Arc<CacheItem>`. The key, payload, lifespan and
/// creation time are immutable for the item's lifetime; the payload changes
/// only by whole-item replacement through a re-`add` of the key.
pub struct CacheItem<K, V> {
  /// The item's key, used as the map key in its table.
  key: K,
  /// The user's payload, wrapped in an Arc for shared ownership. The crate
  /// performs no deep copy; concurrent interior mutation of `V` is the
  /// caller's responsibility.
  data: Arc<V>,
  /// How long the item lives without being accessed. `ZERO` means the item
  /// never expires and is exempt from the expiration scheduler.
  life_span: Duration,
  /// When the item was created.
  created_on: Instant,
  /// The last access timestamp in nanoseconds since the crate epoch.
  accessed_on: AtomicU64,
  /// How often the item has been accessed.
  access_count: AtomicU64,
  /// Set by the first removal path (explicit delete or expiration scan) to
  /// claim the item; guarantees the removal callbacks fire exactly once.
  removal_pending: AtomicBool,
  /// Ordered hooks invoked with the key immediately before removal.
  expire_callbacks: Mutex<Vec<KeyCallback<K>>>,
}

impl<K, V> CacheItem<K, V> {
  /// Creates a new item. `accessed_on` starts equal to `created_on`.
  pub(crate) fn new(key: K, life_span: Duration, data: V) -> Self {
    let now = Instant::now();
    Self {
      key,
      data: Arc::new(data),
      life_span,
      created_on: now,
      accessed_on: AtomicU64::new(time::instant_to_nanos(now)),
      access_count: AtomicU64::new(0),
      removal_pending: AtomicBool::new(false),
      expire_callbacks: Mutex::new(Vec::new()),
    }
  }

  /// Marks the item as accessed: resets the access timestamp to now and
  /// increments the access counter. Cheap atomic stores.
  pub fn keep_alive(&self) {
    self.accessed_on.store(time::now_nanos(), Ordering::Relaxed);
    self.access_count.fetch_add(1, Ordering::Relaxed);
  }

  /// Returns the item's lifespan. Immutable, no locking required.
  #[inline]
  pub fn life_span(&self) -> Duration {
    self.life_span
  }

  /// Returns when the item was created. Immutable, no locking required.
  #[inline]
  pub fn created_on(&self) -> Instant {
    self.created_on
  }

  /// Returns when the item was last accessed.
  pub fn accessed_on(&self) -> Instant {
    time::nanos_to_instant(self.accessed_on.load(Ordering::Relaxed))
  }

  /// Returns how often the item has been accessed.
  pub fn access_count(&self) -> u64 {
    self.access_count.load(Ordering::Relaxed)
  }

  /// Returns the item's key.
  #[inline]
  pub fn key(&self) -> &K {
    &self.key
  }

  /// Returns a clone of the `Arc` containing the payload.
  #[inline]
  pub fn data(&self) -> Arc<V> {
    self.data.clone()
  }

  /// Clears any existing about-to-expire callbacks, then installs `f` as
  /// the sole callback.
  pub fn set_about_to_expire_callback(&self, f: impl Fn(&K) + Send + Sync + 'static) {
    let mut callbacks = self.expire_callbacks.lock();
    callbacks.clear();
    callbacks.push(Arc::new(f));
  }

  /// Appends `f` to the about-to-expire callbacks without clearing any.
  pub fn add_about_to_expire_callback(&self, f: impl Fn(&K) + Send + Sync + 'static) {
    self.expire_callbacks.lock().push(Arc::new(f));
  }

  /// Clears all about-to-expire callbacks.
  pub fn remove_about_to_expire_callback(&self) {
    self.expire_callbacks.lock().clear();
  }

  /// Time left before this item expires, measured from its last access.
  /// `None` for permanent items; `Some(ZERO)` once the deadline has passed.
  pub(crate) fn remaining(&self, now_nanos: u64) -> Option<Duration> {
    if self.life_span.is_zero() {
      return None;
    }
    let accessed = self.accessed_on.load(Ordering::Relaxed);
    let elapsed = Duration::from_nanos(now_nanos.saturating_sub(accessed));
    Some(self.life_span.saturating_sub(elapsed))
  }

  /// Claims the item for removal. Only the first caller gets `true` and may
  /// run the removal callbacks; every later claim is refused.
  pub(crate) fn claim_removal(&self) -> bool {
    !self.removal_pending.swap(true, Ordering::AcqRel)
  }

  /// Invokes the about-to-expire callbacks with the key, in order. The
  /// callback list lock is not held during invocation.
  pub(crate) fn notify_about_to_expire(&self) {
    let callbacks = self.expire_callbacks.lock().clone();
    for callback in &callbacks {
      callback(&self.key);
    }
  }
}

impl<K: fmt::Debug, V> fmt::Debug for CacheItem<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheItem")
      .field("key", &self.key)
      .field("life_span", &self.life_span)
      .field("created_on", &self.created_on)
      .field("access_count", &self.access_count.load(Ordering::Relaxed))
      .finish_non_exhaustive()
  }
}
