use memotable::cache;

use std::thread;
use std::time::Duration;

// An arbitrary payload type; tables are generic over the stored value.
#[derive(Debug)]
struct MyData {
  text: String,
  more_data: Vec<u8>,
}

fn main() {
  println!("--- Caching Arbitrary Value Types ---");
  let table = cache::<String, MyData>("myCache");

  table.set_added_item_callback(|item| {
    println!("[Added] key: {}, created: {:?}", item.key(), item.created_on());
  });

  let value = MyData {
    text: "This is Key1 data!".to_string(),
    more_data: vec![1, 2, 3, 4, 5],
  };
  println!("\nAdding Key1 with a 2s lifespan...");
  table.add("Key1".to_string(), Duration::from_secs(2), value);

  match table.value(&"Key1".to_string()) {
    Ok(item) => println!(
      "Found value in cache: '{}' ({} extra bytes)",
      item.data().text,
      item.data().more_data.len()
    ),
    Err(err) => println!("Error retrieving value from cache: {}", err),
  }

  println!("\nWaiting 3s for Key1 to expire...");
  thread::sleep(Duration::from_secs(3));
  if table.value(&"Key1".to_string()).is_err() {
    println!("Item is not cached (anymore).");
  }

  println!("\nAdding a permanent Key2, then deleting it...");
  table.add(
    "Key2".to_string(),
    Duration::ZERO,
    MyData {
      text: "This is Key2 data!".to_string(),
      more_data: Vec::new(),
    },
  );
  table.set_about_to_delete_item_callback(|item| {
    println!("[Deleting] key: {}, text: '{}'", item.key(), item.data().text);
  });
  let _ = table.delete(&"Key2".to_string());

  table.flush();
  println!("\nAll done!");
}
