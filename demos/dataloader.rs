use memotable::cache;

use std::time::Duration;

fn main() {
  println!("--- Read-Through Data Loader ---");
  let table = cache::<String, String>("myCache");

  // Every miss is handed to the loader, which synthesizes a permanent item.
  table.set_data_loader(|key| {
    let value = format!("This is a test with key {}", key);
    println!("[Loader] key not found, producing: '{}'", value);
    Some((value, Duration::ZERO))
  });

  for i in 0..10 {
    let key = format!("someKey_{}", i);
    match table.value(&key) {
      Ok(item) => println!("Found value in cache: {}", item.data()),
      Err(err) => println!("Error retrieving value from cache: {}", err),
    }
  }

  println!("\nCached {} items, loader ran {} times.", table.count(), table.metrics().loads);
  println!("All done!");
}
