use crate::table::CacheTable;

use std::any::Any;
use std::fmt;
use std::hash::Hash;

use ahash::HashMap;
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

// The process-wide directory of named tables. Tables are stored type-erased
// because each one is generic over its own key/value parameters.
static REGISTRY: Lazy<RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>> =
  Lazy::new(|| RwLock::new(HashMap::default()));

/// Returns the table registered under `name`, creating it on first use.
///
/// Every caller asking for the same name receives a handle onto the same
/// table, created at most once under contention: a read-locked fast path,
/// then a write-locked re-check before construction.
///
/// # Panics
///
/// Panics if `name` is already registered with different key/value type
/// parameters. That is a broken programming invariant, not a runtime
/// condition, and is intentionally not recoverable.
pub fn cache<K, V>(name: &str) -> CacheTable<K, V>
where
  K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  {
    let tables = REGISTRY.read();
    if let Some(existing) = tables.get(name) {
      return downcast_table(existing.as_ref(), name);
    }
  }

  let mut tables = REGISTRY.write();
  // Double check whether the table appeared while we waited for the
  // exclusive lock.
  if let Some(existing) = tables.get(name) {
    return downcast_table(existing.as_ref(), name);
  }

  debug!("registry: created cache table {}", name);
  let table = CacheTable::<K, V>::new(name);
  tables.insert(name.to_string(), Box::new(table.clone()));
  table
}

fn downcast_table<K, V>(entry: &(dyn Any + Send + Sync), name: &str) -> CacheTable<K, V>
where
  K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  entry
    .downcast_ref::<CacheTable<K, V>>()
    .unwrap_or_else(|| {
      panic!(
        "cache table {:?} is already registered with different key/value types",
        name
      )
    })
    .clone()
}
