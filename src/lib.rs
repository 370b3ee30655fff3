//! # EmberKV - An Embeddable In-Memory Key-Value Store
//!
//! EmberKV is an in-process key/value store with per-key ordered lists,
//! time-based expiry of scalar entries and change-notification callbacks.
//! There is no network surface: the store lives inside your program.
//!
//! ## Features
//!
//! - **Single-Writer Engines**: each engine is one Tokio task that owns its
//!   state, so concurrent callers never need external locking
//! - **TTL Support**: entries can expire; an ordered expiry index is swept
//!   periodically and an expire callback fires once per evicted entry
//! - **Ordered Lists**: lists keep one item per id, sorted by id, and raise a
//!   change callback only when their content actually changes
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                               Store                                 │
//! │            init / close, validation, callback registration          │
//! │                                                                     │
//! │   ┌─────────────────────────────┐   ┌────────────────────────────┐  │
//! │   │        ScalarEngine         │   │         ListEngine         │  │
//! │   │  worker task (mpsc queue)   │   │  worker task (mpsc queue)  │  │
//! │   │  HashMap<key, Item>         │   │  HashMap<list, Ordered-    │  │
//! │   │  ExpiryIndex + sweep tick   │   │           Index<Item>>     │  │
//! │   └──────────────┬──────────────┘   └─────────────┬──────────────┘  │
//! │                  │ on_expire                       │ on_list_change  │
//! │                  ▼                                 ▼                │
//! │            background callback tasks (panics isolated)              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use emberkv::{Item, Store};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> emberkv::Result<()> {
//! let store: Store<String> = Store::new();
//! store.init();
//!
//! store.on_expire(|item| println!("{} expired", item.key));
//! store.put(Item::new("s1", "session", "token".to_string()), Duration::from_secs(60)).await?;
//!
//! assert!(store.get("session").await?.is_some());
//! store.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`store`]: the [`Store`] facade and its lifecycle
//! - [`storage`]: the scalar and list engines and the expiry index
//! - [`index`]: the ordered index used by both engines
//! - [`item`]: the stored record
//! - [`config`]: tunables for the engine workers
//! - [`error`]: the error type

pub mod config;
pub mod error;
pub mod index;
pub mod item;
pub mod storage;
pub mod store;

// Re-export commonly used types for convenience
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use index::OrderedIndex;
pub use item::Item;
pub use storage::{ListEngine, ListStats, ScalarEngine, ScalarStats};
pub use store::{Store, StoreStats};

/// Version of EmberKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
