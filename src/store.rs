//! The Store Facade
//!
//! [`Store`] is the single entry point of EmberKV. It owns the lifecycle of
//! both engines and forwards every operation to the engine that owns the
//! data, after checking that the store is running.
//!
//! ## Lifecycle
//!
//! ```text
//!   Store::new() ──init()──> running ──close()──> closed
//!        │                      │                   │
//!   ops: NotInitialized    ops: dispatched     ops: NotInitialized
//! ```
//!
//! Callbacks can be registered in any state; they live in the store and are
//! shared with the engines when they start.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::item::Item;
use crate::storage::callback::CallbackSlot;
use crate::storage::{
    ExpireCallback, ListChangeCallback, ListEngine, ListStats, ScalarEngine, ScalarStats,
};
use bytes::Bytes;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Combined statistics of both engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub scalar: ScalarStats,
    pub lists: ListStats,
}

/// The running engines, present between `init` and `close`.
struct Engines<V> {
    scalar: ScalarEngine<V>,
    lists: ListEngine<V>,
    shutdown: watch::Sender<bool>,
}

/// An embedded key/value store with ordered lists, expiry and change callbacks.
///
/// # Example
///
/// ```
/// use emberkv::{Item, Store};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> emberkv::Result<()> {
/// let store: Store<String> = Store::new();
/// store.init();
///
/// store.put(Item::new("1", "greeting", "hello".to_string()), Duration::ZERO).await?;
/// let item = store.get("greeting").await?.unwrap();
/// assert_eq!(item.value, "hello");
///
/// store.list_push("todo", Item::member("b", "second".to_string())).await?;
/// store.list_push("todo", Item::member("a", "first".to_string())).await?;
/// let (items, found) = store.list_get("todo").await?;
/// assert!(found);
/// assert_eq!(items[0].id, "a");
///
/// store.close();
/// # Ok(())
/// # }
/// ```
pub struct Store<V = Bytes> {
    config: StoreConfig,
    engines: RwLock<Option<Engines<V>>>,
    on_expire: Arc<CallbackSlot<ExpireCallback<V>>>,
    on_list_change: Arc<CallbackSlot<ListChangeCallback<V>>>,
}

impl<V> std::fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}

impl<V> Default for Store<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Store<V> {
    /// Returns true between `init` and `close`.
    pub fn is_running(&self) -> bool {
        self.engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stops both engine workers.
    ///
    /// Returns immediately; requests already queued may fail with
    /// [`StoreError::Closed`] or time out. Closing a store that was never
    /// initialized, or closing twice, does nothing.
    pub fn close(&self) {
        let engines = self
            .engines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(engines) = engines {
            let _ = engines.shutdown.send(true);
            info!("Store closed");
        }
    }
}

impl<V> Store<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates an uninitialized store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an uninitialized store with a custom configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            engines: RwLock::new(None),
            on_expire: Arc::new(CallbackSlot::new()),
            on_list_change: Arc::new(CallbackSlot::new()),
        }
    }

    /// Starts both engine workers. Does nothing if the store is already running.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn init(&self) {
        let mut engines = self
            .engines
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if engines.is_some() {
            debug!("Store already initialized");
            return;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        *engines = Some(Engines {
            scalar: ScalarEngine::spawn(
                &self.config,
                Arc::clone(&self.on_expire),
                shutdown_rx.clone(),
            ),
            lists: ListEngine::spawn(&self.config, Arc::clone(&self.on_list_change), shutdown_rx),
            shutdown,
        });
        info!("Store initialized");
    }

    fn scalar(&self) -> Result<ScalarEngine<V>> {
        self.engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|e| e.scalar.clone())
            .ok_or(StoreError::NotInitialized)
    }

    fn lists(&self) -> Result<ListEngine<V>> {
        self.engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|e| e.lists.clone())
            .ok_or(StoreError::NotInitialized)
    }

    /// Stores `item` under `item.key`; a zero `ttl` means it never expires.
    pub async fn put(&self, item: Item<V>, ttl: Duration) -> Result<()> {
        self.scalar()?.put(item, ttl).await
    }

    /// Returns the item stored under `key`, or `None`.
    pub async fn get(&self, key: &str) -> Result<Option<Item<V>>> {
        self.scalar()?.get(key).await
    }

    /// Deletes the item stored under `key`. Succeeds if there is none.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.scalar()?.delete(key).await
    }

    /// Adds `item` to the list at `list_key`, replacing an item with the same id.
    pub async fn list_push(&self, list_key: &str, item: Item<V>) -> Result<()> {
        self.lists()?.push(list_key, item).await
    }

    /// Removes the item with `item.id` from the list at `list_key`.
    pub async fn list_delete(&self, list_key: &str, item: &Item<V>) -> Result<()> {
        self.lists()?.delete(list_key, item).await
    }

    /// Returns the list's items ordered by id, and whether the list exists.
    pub async fn list_get(&self, list_key: &str) -> Result<(Vec<Item<V>>, bool)> {
        self.lists()?.get(list_key).await
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        let scalar = self.scalar()?.stats().await?;
        let lists = self.lists()?.stats().await?;
        Ok(StoreStats { scalar, lists })
    }

    /// Registers the callback invoked once for each expired entry.
    ///
    /// Replaces any previously registered expire callback.
    pub fn on_expire<F>(&self, callback: F)
    where
        F: Fn(Item<V>) + Send + Sync + 'static,
    {
        self.on_expire.set(Arc::new(callback));
    }

    /// Registers the callback invoked with `(list_key, items)` whenever a list changes.
    ///
    /// Replaces any previously registered list callback.
    pub fn on_list_change<F>(&self, callback: F)
    where
        F: Fn(String, Vec<Item<V>>) + Send + Sync + 'static,
    {
        self.on_list_change.set(Arc::new(callback));
    }
}

impl<V> Drop for Store<V> {
    fn drop(&mut self) {
        self.close();
    }
}
