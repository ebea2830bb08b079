use memotable::cache;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_same_name_returns_the_same_table() {
  let first = cache::<String, i32>("reg_shared");
  let second = cache::<String, i32>("reg_shared");

  first.add("key1".to_string(), Duration::ZERO, 1);
  assert!(
    second.exists(&"key1".to_string()),
    "both handles must see the same table"
  );
  assert_eq!(second.name(), "reg_shared");
}

#[test]
fn test_distinct_names_are_distinct_tables() {
  let left = cache::<String, i32>("reg_left");
  let right = cache::<String, i32>("reg_right");

  left.add("key1".to_string(), Duration::ZERO, 1);
  assert!(!right.exists(&"key1".to_string()));
}

#[test]
fn test_creation_race_yields_one_table() {
  let threads = 8;
  let barrier = Arc::new(Barrier::new(threads));
  let wins = Arc::new(AtomicUsize::new(0));

  let handles: Vec<_> = (0..threads)
    .map(|id| {
      let barrier = barrier.clone();
      let wins = wins.clone();
      thread::spawn(move || {
        barrier.wait();
        let table = cache::<String, usize>("reg_race");
        if table.not_found_add("slot".to_string(), Duration::ZERO, id) {
          wins.fetch_add(1, Ordering::SeqCst);
        }
      })
    })
    .collect();
  for handle in handles {
    handle.join().unwrap();
  }

  assert_eq!(
    wins.load(Ordering::SeqCst),
    1,
    "all racers must land on one table"
  );
  assert_eq!(cache::<String, usize>("reg_race").count(), 1);
}

#[test]
#[should_panic(expected = "different key/value types")]
fn test_type_mismatch_panics() {
  let _ = cache::<String, i32>("reg_mismatch");
  let _ = cache::<String, String>("reg_mismatch");
}
