//! Scalar Storage Engine with Expiry Support
//!
//! This module implements the key/value half of EmberKV: a map from key to
//! [`Item`] plus an [`ExpiryIndex`] of the entries stored with a ttl.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────┐   mpsc (bounded)   ┌──────────────────────────────┐
//! │ ScalarEngine │ ─────────────────> │        worker task           │
//! │   (handle)   │ <───────────────── │  entries: HashMap<Item>      │
//! └──────────────┘   oneshot reply    │  expiry:  ExpiryIndex        │
//!                                     │  ticker:  sweep interval     │
//!                                     └──────────────────────────────┘
//! ```
//!
//! The worker is the only code that touches `entries` and `expiry`, so a put
//! updates both in one step and a sweep can never race with a put, get or
//! delete: the sweep is just one more branch of the same `select!` loop.

use crate::config::{StoreConfig, MIN_SWEEP_INTERVAL};
use crate::error::{Result, StoreError};
use crate::item::Item;
use crate::storage::callback::{dispatch, CallbackSlot, ExpireCallback};
use crate::storage::expiry::ExpiryIndex;
use crate::storage::{await_reply, send_request};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

/// Scalar engine statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalarStats {
    /// Number of keys currently stored
    pub keys: u64,
    /// Number of stored keys carrying a ttl
    pub expiring: u64,
    /// Total entries evicted by the sweep since the engine started
    pub expired: u64,
}

/// Messages understood by the scalar worker.
enum Request<V> {
    Put {
        item: Item<V>,
        reply: oneshot::Sender<()>,
    },
    Get {
        key: String,
        reply: oneshot::Sender<Option<Item<V>>>,
    },
    Delete {
        key: String,
        reply: oneshot::Sender<()>,
    },
    Stats {
        reply: oneshot::Sender<ScalarStats>,
    },
}

/// Handle to a running scalar engine.
///
/// Cloning the handle is cheap; all clones talk to the same worker.
pub struct ScalarEngine<V> {
    tx: mpsc::Sender<Request<V>>,
    request_timeout: Duration,
    on_expire: Arc<CallbackSlot<ExpireCallback<V>>>,
}

impl<V> Clone for ScalarEngine<V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            request_timeout: self.request_timeout,
            on_expire: Arc::clone(&self.on_expire),
        }
    }
}

impl<V> std::fmt::Debug for ScalarEngine<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalarEngine")
            .field("request_timeout", &self.request_timeout)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<V> ScalarEngine<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Spawns the worker task and returns a handle to it.
    ///
    /// The worker stops when `shutdown` flips to `true` or its sender is
    /// dropped. Must be called from within a Tokio runtime.
    pub fn start(config: &StoreConfig, shutdown: watch::Receiver<bool>) -> Self {
        Self::spawn(config, Arc::new(CallbackSlot::new()), shutdown)
    }

    pub(crate) fn spawn(
        config: &StoreConfig,
        on_expire: Arc<CallbackSlot<ExpireCallback<V>>>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let worker = Worker {
            entries: HashMap::new(),
            expiry: ExpiryIndex::new(),
            expired_total: 0,
            on_expire: Arc::clone(&on_expire),
        };
        let sweep_interval = config.sweep_interval.max(MIN_SWEEP_INTERVAL);
        tokio::spawn(worker.run(rx, shutdown, sweep_interval));

        Self {
            tx,
            request_timeout: config.request_timeout,
            on_expire,
        }
    }

    /// Stores `item` under its key, replacing any existing entry.
    ///
    /// A non-zero `ttl` makes the entry expire `ttl` from now; a zero `ttl`
    /// stores it without expiry. The entry is visible to every later `get`
    /// once this returns.
    pub async fn put(&self, mut item: Item<V>, ttl: Duration) -> Result<()> {
        if item.key.is_empty() {
            return Err(StoreError::InvalidItem("missing key"));
        }
        if item.id.is_empty() {
            return Err(StoreError::InvalidItem("missing id"));
        }
        item.stamp_ttl(ttl);

        let (reply, rx) = oneshot::channel();
        send_request(&self.tx, Request::Put { item, reply }, self.request_timeout, "put")
            .await?;
        await_reply(rx, self.request_timeout, "put").await
    }

    /// Returns a copy of the entry for `key`, or `None` if there is none.
    pub async fn get(&self, key: &str) -> Result<Option<Item<V>>> {
        let (reply, rx) = oneshot::channel();
        let request = Request::Get {
            key: key.to_string(),
            reply,
        };
        send_request(&self.tx, request, self.request_timeout, "get").await?;
        await_reply(rx, self.request_timeout, "get").await
    }

    /// Removes the entry for `key`. Deleting an absent key succeeds.
    pub async fn delete(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey);
        }
        let (reply, rx) = oneshot::channel();
        let request = Request::Delete {
            key: key.to_string(),
            reply,
        };
        send_request(&self.tx, request, self.request_timeout, "delete").await?;
        await_reply(rx, self.request_timeout, "delete").await
    }

    pub async fn stats(&self) -> Result<ScalarStats> {
        let (reply, rx) = oneshot::channel();
        send_request(&self.tx, Request::Stats { reply }, self.request_timeout, "stats").await?;
        await_reply(rx, self.request_timeout, "stats").await
    }

    /// Registers the callback invoked once for every expired entry.
    ///
    /// Only one callback is active at a time; a new one replaces the old.
    pub fn on_expire<F>(&self, callback: F)
    where
        F: Fn(Item<V>) + Send + Sync + 'static,
    {
        self.on_expire.set(Arc::new(callback));
    }
}

/// State owned by the worker task.
struct Worker<V> {
    entries: HashMap<String, Item<V>>,
    expiry: ExpiryIndex,
    expired_total: u64,
    on_expire: Arc<CallbackSlot<ExpireCallback<V>>>,
}

impl<V> Worker<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// The main worker loop.
    async fn run(
        mut self,
        mut rx: mpsc::Receiver<Request<V>>,
        mut shutdown: watch::Receiver<bool>,
        sweep_interval: Duration,
    ) {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            sweep_interval_ms = sweep_interval.as_millis(),
            "Scalar engine worker started"
        );

        loop {
            tokio::select! {
                request = rx.recv() => match request {
                    Some(request) => self.handle(request),
                    None => break,
                },
                _ = ticker.tick() => {
                    self.sweep(Instant::now());
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        debug!("Scalar engine received shutdown signal");
                        break;
                    }
                }
            }
        }

        info!(keys = self.entries.len(), "Scalar engine worker stopped");
    }

    fn handle(&mut self, request: Request<V>) {
        match request {
            Request::Put { item, reply } => {
                trace!(key = %item.key, id = %item.id, "put");
                self.insert(item);
                let _ = reply.send(());
            }
            Request::Get { key, reply } => {
                trace!(key = %key, "get");
                let _ = reply.send(self.entries.get(&key).cloned());
            }
            Request::Delete { key, reply } => {
                trace!(key = %key, "delete");
                self.remove(&key);
                let _ = reply.send(());
            }
            Request::Stats { reply } => {
                let _ = reply.send(ScalarStats {
                    keys: self.entries.len() as u64,
                    expiring: self.expiry.len() as u64,
                    expired: self.expired_total,
                });
            }
        }
    }

    /// Stores `item`, keeping the expiry index in step with the new entry.
    fn insert(&mut self, item: Item<V>) {
        self.expiry.track(&item.key, item.expires_at());
        self.entries.insert(item.key.clone(), item);
    }

    fn remove(&mut self, key: &str) -> Option<Item<V>> {
        self.expiry.forget(key);
        self.entries.remove(key)
    }

    /// Evicts every entry whose deadline has passed at `now`.
    ///
    /// # Returns
    /// The number of entries evicted.
    fn sweep(&mut self, now: Instant) -> usize {
        let due = self.expiry.due(now);
        if due.is_empty() {
            return 0;
        }

        let callback = self.on_expire.current();
        let mut evicted = 0;
        for key in due {
            let Some(item) = self.remove(&key) else {
                continue;
            };
            evicted += 1;
            if let Some(callback) = &callback {
                let callback = Arc::clone(callback);
                dispatch("on_expire", move || callback(item));
            }
        }

        self.expired_total += evicted as u64;
        debug!(
            expired = evicted,
            keys_remaining = self.entries.len(),
            "Expired keys cleaned up"
        );
        evicted
    }
}
