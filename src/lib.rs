//! An in-process, generic key/value cache with per-item TTL expiration,
//! lazy loading on miss, and lifecycle callbacks.
//!
//! # Features
//! - **Named tables**: a process-wide [`cache`] registry hands out one
//!   shared [`CacheTable`] per name, created at most once under contention.
//! - **Per-item TTL**: every item carries its own lifespan; a lifespan of
//!   zero means the item never expires. Expiration is adaptive: one
//!   one-shot timer armed for the soonest deadline, re-evaluated whenever a
//!   shorter-lived item is added.
//! - **Read-through loading**: a table-level data loader turns `value` into
//!   a read-through cache for missing keys.
//! - **Lifecycle callbacks**: added-item and about-to-delete hooks per
//!   table, about-to-expire hooks per item, all invoked with the table
//!   lock released so callbacks may re-enter the table.
//! - **Observability**: state changes log through the `log` facade, and
//!   every table exposes operational counters via [`MetricsSnapshot`].

// Public modules that form the API
pub mod callbacks;
pub mod error;
pub mod item;
pub mod loader;
pub mod metrics;
pub mod registry;
pub mod table;

// Internal, crate-only modules
mod shared;
mod task;
mod time;

// Re-export the primary user-facing types for convenience
pub use callbacks::{ItemCallback, KeyCallback};
pub use error::CacheError;
pub use item::CacheItem;
pub use loader::DataLoader;
pub use metrics::MetricsSnapshot;
pub use registry::cache;
pub use table::CacheTable;
