use memotable::cache;

use std::thread;
use std::time::Duration;

fn main() {
  println!("--- Lifecycle Callbacks ---");
  let table = cache::<String, String>("myCache");

  println!("\nRegistering an added-item callback...");
  table.set_added_item_callback(|item| {
    println!(
      "[Added] key: {}, data: '{}', created: {:?}",
      item.key(),
      item.data(),
      item.created_on()
    );
  });

  println!("Registering an about-to-delete callback...");
  table.set_about_to_delete_item_callback(|item| {
    println!("[Deleting] key: {}, data: '{}'", item.key(), item.data());
  });

  println!("\nAdding three permanent items...");
  table.add("Key1".to_string(), Duration::ZERO, "Key1 data".to_string());
  table.add("Key2".to_string(), Duration::ZERO, "Key2 data".to_string());
  table.add("Key3".to_string(), Duration::ZERO, "Key3 data".to_string());

  match table.value(&"Key1".to_string()) {
    Ok(item) => println!("\nFound value in cache: {}", item.data()),
    Err(err) => {
      println!("\nError retrieving value from cache: {}", err);
      std::process::exit(1);
    }
  }

  println!("\nDeleting Key1 (triggers the delete callback)...");
  let _ = table.delete(&"Key1".to_string());

  println!("\nClearing the added-item callbacks...");
  table.remove_added_item_callbacks();

  println!("Adding Key4 with a 2s lifespan and an expire callback...");
  let item = table.add("Key4".to_string(), Duration::from_secs(2), "Key4 data".to_string());
  item.set_about_to_expire_callback(|key| {
    println!("[Expiring] key: {}", key);
  });

  println!("Waiting 4s for Key4 to expire...");
  thread::sleep(Duration::from_secs(4));

  match table.value(&"Key4".to_string()) {
    Ok(item) => println!("Found value in cache: {}", item.data()),
    Err(err) => println!("Error retrieving value from cache: {}", err),
  }
  println!("\nAll done!");
}
