use memotable::{CacheError, CacheTable};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn new_test_table(name: &str) -> CacheTable<String, i32> {
  CacheTable::new(name)
}

#[test]
fn test_ttl_expiry_removes_item() {
  let table = new_test_table("exp_ttl");
  table.add("short".to_string(), Duration::from_millis(250), 1);
  assert!(table.exists(&"short".to_string()), "present before its deadline");

  thread::sleep(Duration::from_millis(1000));
  assert!(!table.exists(&"short".to_string()), "gone after its deadline");
  assert_eq!(
    table.value(&"short".to_string()).unwrap_err(),
    CacheError::KeyNotFound
  );
  assert_eq!(table.metrics().evicted_by_ttl, 1);
}

#[test]
fn test_keep_alive_extends_deadline() {
  let table = new_test_table("exp_keep_alive");
  table.add("key".to_string(), Duration::from_millis(1000), 1);

  // Touch the item past its half-life; the deadline restarts from the
  // access, not from creation.
  thread::sleep(Duration::from_millis(600));
  table.value(&"key".to_string()).expect("still alive at 600ms");

  thread::sleep(Duration::from_millis(700));
  assert!(
    table.exists(&"key".to_string()),
    "1300ms after creation but only 700ms after last access"
  );

  thread::sleep(Duration::from_millis(900));
  assert!(
    !table.exists(&"key".to_string()),
    "1600ms after last access exceeds the lifespan"
  );
}

#[test]
fn test_permanent_items_survive_the_scheduler() {
  let table = new_test_table("exp_permanent");
  table.add("permanent".to_string(), Duration::ZERO, 1);
  table.add("short".to_string(), Duration::from_millis(200), 2);

  thread::sleep(Duration::from_millis(800));
  assert!(table.exists(&"permanent".to_string()));
  assert!(!table.exists(&"short".to_string()));

  // Permanent items fall only to an explicit delete or flush.
  table.delete(&"permanent".to_string()).unwrap();
  assert_eq!(table.count(), 0);
}

#[test]
fn test_shorter_item_reschedules_the_scan() {
  let table = new_test_table("exp_reschedule");
  // The first add arms the timer for ~2s; the second must pull the next
  // scan forward instead of waiting behind it.
  table.add("long".to_string(), Duration::from_millis(2000), 1);
  table.add("short".to_string(), Duration::from_millis(200), 2);

  thread::sleep(Duration::from_millis(800));
  assert!(!table.exists(&"short".to_string()), "short item expired first");
  assert!(table.exists(&"long".to_string()));

  thread::sleep(Duration::from_millis(2000));
  assert!(!table.exists(&"long".to_string()));
  assert_eq!(table.metrics().evicted_by_ttl, 2);
}

#[test]
fn test_expiry_runs_delete_and_expire_callbacks() {
  let table = new_test_table("exp_callbacks");
  let deletes = Arc::new(AtomicUsize::new(0));
  let expires = Arc::new(AtomicUsize::new(0));

  let counter = deletes.clone();
  table.set_about_to_delete_item_callback(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });

  let item = table.add("doomed".to_string(), Duration::from_millis(250), 1);
  let counter = expires.clone();
  item.set_about_to_expire_callback(move |key| {
    assert_eq!(key, "doomed");
    counter.fetch_add(1, Ordering::SeqCst);
  });

  thread::sleep(Duration::from_millis(1000));
  assert_eq!(deletes.load(Ordering::SeqCst), 1, "about-to-delete fired once");
  assert_eq!(expires.load(Ordering::SeqCst), 1, "about-to-expire fired once");
  assert!(!table.exists(&"doomed".to_string()));
}

#[test]
fn test_flush_disarms_the_timer() {
  let table = new_test_table("exp_flush");
  let expires = Arc::new(AtomicUsize::new(0));

  let item = table.add("key".to_string(), Duration::from_millis(250), 1);
  let counter = expires.clone();
  item.set_about_to_expire_callback(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });

  table.flush();
  thread::sleep(Duration::from_millis(800));

  assert_eq!(table.count(), 0);
  assert_eq!(
    expires.load(Ordering::SeqCst),
    0,
    "a flushed table must not fire expirations afterwards"
  );
  assert_eq!(table.metrics().evicted_by_ttl, 0);
}
