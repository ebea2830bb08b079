use memotable::{CacheError, CacheTable};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

fn new_test_table(name: &str) -> CacheTable<String, String> {
  CacheTable::new(name)
}

#[test]
fn test_added_callbacks_run_in_registration_order() {
  let table = new_test_table("cb_added_order");
  let events = Arc::new(Mutex::new(Vec::new()));

  let log = events.clone();
  table.add_added_item_callback(move |item| {
    log.lock().push(format!("first:{}", item.key()));
  });
  let log = events.clone();
  table.add_added_item_callback(move |item| {
    log.lock().push(format!("second:{}", item.key()));
  });

  table.add("key1".to_string(), Duration::ZERO, "data".to_string());

  assert_eq!(*events.lock(), ["first:key1", "second:key1"]);
}

#[test]
fn test_set_added_callback_replaces_the_list() {
  let table = new_test_table("cb_added_replace");
  let stale = Arc::new(AtomicUsize::new(0));
  let live = Arc::new(AtomicUsize::new(0));

  let counter = stale.clone();
  table.set_added_item_callback(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  let counter = live.clone();
  table.set_added_item_callback(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });

  table.add("key1".to_string(), Duration::ZERO, "data".to_string());
  assert_eq!(stale.load(Ordering::SeqCst), 0, "set must clear prior callbacks");
  assert_eq!(live.load(Ordering::SeqCst), 1);
}

#[test]
fn test_remove_added_callbacks() {
  let table = new_test_table("cb_added_remove");
  let count = Arc::new(AtomicUsize::new(0));

  let counter = count.clone();
  table.add_added_item_callback(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  table.remove_added_item_callbacks();

  table.add("key1".to_string(), Duration::ZERO, "data".to_string());
  assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_delete_runs_table_callbacks_before_item_callbacks() {
  let table = new_test_table("cb_delete_order");
  let events = Arc::new(Mutex::new(Vec::new()));

  let log = events.clone();
  table.add_about_to_delete_item_callback(move |_| {
    log.lock().push("table");
  });

  let item = table.add("key1".to_string(), Duration::ZERO, "data".to_string());
  let log = events.clone();
  item.add_about_to_expire_callback(move |_| {
    log.lock().push("item");
  });

  table.delete(&"key1".to_string()).unwrap();
  assert_eq!(*events.lock(), ["table", "item"]);
}

#[test]
fn test_set_expire_callback_replaces_and_remove_clears() {
  let table = new_test_table("cb_expire_slots");
  let stale = Arc::new(AtomicUsize::new(0));
  let live = Arc::new(AtomicUsize::new(0));

  let item = table.add("key1".to_string(), Duration::ZERO, "data".to_string());
  let counter = stale.clone();
  item.set_about_to_expire_callback(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  let counter = live.clone();
  item.set_about_to_expire_callback(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  table.delete(&"key1".to_string()).unwrap();
  assert_eq!(stale.load(Ordering::SeqCst), 0);
  assert_eq!(live.load(Ordering::SeqCst), 1);

  let item = table.add("key2".to_string(), Duration::ZERO, "data".to_string());
  let counter = live.clone();
  item.add_about_to_expire_callback(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  item.remove_about_to_expire_callback();
  table.delete(&"key2".to_string()).unwrap();
  assert_eq!(live.load(Ordering::SeqCst), 1, "cleared callbacks must not fire");
}

#[test]
fn test_flush_preserves_callbacks_and_loader() {
  let table = new_test_table("cb_flush_survives");
  let added = Arc::new(AtomicUsize::new(0));

  let counter = added.clone();
  table.set_added_item_callback(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  table.set_data_loader(|key| Some((format!("loaded {}", key), Duration::ZERO)));

  table.add("key1".to_string(), Duration::ZERO, "data".to_string());
  table.flush();
  assert_eq!(table.count(), 0);

  // Registrations made before the flush still apply afterwards.
  table.add("key2".to_string(), Duration::ZERO, "data".to_string());
  assert_eq!(added.load(Ordering::SeqCst), 2);

  let item = table.value(&"missing".to_string()).unwrap();
  assert_eq!(item.data().as_str(), "loaded missing");
}

#[test]
fn test_loader_contract() {
  let table = new_test_table("cb_loader");
  let calls = Arc::new(AtomicUsize::new(0));

  let counter = calls.clone();
  table.set_data_loader(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
    Some(("X".to_string(), Duration::ZERO))
  });

  let item = table.value(&"missing".to_string()).expect("loader should produce the item");
  assert_eq!(item.data().as_str(), "X");
  assert_eq!(calls.load(Ordering::SeqCst), 1);

  // The second lookup is a plain hit; the loader must not run again.
  let item = table.value(&"missing".to_string()).unwrap();
  assert_eq!(item.data().as_str(), "X");
  assert_eq!(calls.load(Ordering::SeqCst), 1);

  let metrics = table.metrics();
  assert_eq!(metrics.loads, 1);
  assert_eq!(metrics.misses, 1);
  assert_eq!(metrics.hits, 1);
}

#[test]
fn test_loader_insert_fires_added_callbacks() {
  let table = new_test_table("cb_loader_added");
  let added = Arc::new(AtomicUsize::new(0));

  let counter = added.clone();
  table.set_added_item_callback(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  table.set_data_loader(|_| Some(("loaded".to_string(), Duration::ZERO)));

  table.value(&"missing".to_string()).unwrap();
  assert_eq!(
    added.load(Ordering::SeqCst),
    1,
    "a loader insert goes through the regular add path"
  );
}

#[test]
fn test_loader_declines() {
  let table = new_test_table("cb_loader_declines");
  table.set_data_loader(|_| None);

  assert_eq!(
    table.value(&"missing".to_string()).unwrap_err(),
    CacheError::KeyNotFoundOrNotLoadable
  );
  assert!(!table.exists(&"missing".to_string()));
}
