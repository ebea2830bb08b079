use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for a cache table.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub(crate) struct Metrics {
  // --- Hit/Miss Ratios ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,

  // --- Throughput ---
  pub(crate) inserts: CachePadded<AtomicU64>,
  pub(crate) deletes: CachePadded<AtomicU64>,
  pub(crate) loads: CachePadded<AtomicU64>,

  // --- Expiration / Maintenance ---
  pub(crate) evicted_by_ttl: CachePadded<AtomicU64>,
  pub(crate) flushes: CachePadded<AtomicU64>,

  created_at: Instant,
}

// Manual implementation of Default to handle the non-default `Instant`.
impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      inserts: CachePadded::new(AtomicU64::new(0)),
      deletes: CachePadded::new(AtomicU64::new(0)),
      loads: CachePadded::new(AtomicU64::new(0)),
      evicted_by_ttl: CachePadded::new(AtomicU64::new(0)),
      flushes: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let total_lookups = hits + misses;

    MetricsSnapshot {
      hits,
      misses,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      inserts: self.inserts.load(Ordering::Relaxed),
      deletes: self.deletes.load(Ordering::Relaxed),
      loads: self.loads.load(Ordering::Relaxed),
      evicted_by_ttl: self.evicted_by_ttl.load(Ordering::Relaxed),
      flushes: self.flushes.load(Ordering::Relaxed),
      uptime: self.created_at.elapsed(),
    }
  }
}

/// A public, point-in-time view of a table's operational counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
  /// Lookups that found a live item.
  pub hits: u64,
  /// Lookups that found nothing (before any loader ran).
  pub misses: u64,
  /// `hits / (hits + misses)`, or `0.0` before any lookup.
  pub hit_ratio: f64,
  /// Items inserted, including overwrites and loader inserts.
  pub inserts: u64,
  /// Items removed by explicit `delete`.
  pub deletes: u64,
  /// Misses the data loader turned into items.
  pub loads: u64,
  /// Items removed by the expiration scheduler.
  pub evicted_by_ttl: u64,
  /// Calls to `flush`.
  pub flushes: u64,
  /// Time since the table was created.
  pub uptime: Duration,
}
