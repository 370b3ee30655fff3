//! List Storage Engine
//!
//! Each list key owns an [`OrderedIndex`] of items sorted by item id, so a
//! list is always read back in id order and an id appears at most once.
//! Pushing an id that is already present replaces that entry in place.
//!
//! A list is created by the first push to its key and is never removed
//! afterwards: a drained list still reports `found = true`, while a key that
//! was never pushed to reports `found = false`.
//!
//! Every push or delete that actually changes a list raises the change
//! callback with the list key and the full ordered list. Re-pushing an item
//! whose value is unchanged, or deleting an id that is not there, stays
//! silent.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::index::OrderedIndex;
use crate::item::Item;
use crate::storage::callback::{dispatch, CallbackSlot, ListChangeCallback};
use crate::storage::{await_reply, send_request};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace};

/// List engine statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListStats {
    /// Number of lists ever created
    pub lists: u64,
    /// Total items across all lists
    pub items: u64,
}

enum ListRequest<V> {
    Push {
        list_key: String,
        item: Item<V>,
        reply: oneshot::Sender<()>,
    },
    Delete {
        list_key: String,
        id: String,
        reply: oneshot::Sender<()>,
    },
    Get {
        list_key: String,
        reply: oneshot::Sender<Option<Vec<Item<V>>>>,
    },
    Stats {
        reply: oneshot::Sender<ListStats>,
    },
}

/// Handle to a running list engine.
pub struct ListEngine<V> {
    tx: mpsc::Sender<ListRequest<V>>,
    request_timeout: Duration,
    on_change: Arc<CallbackSlot<ListChangeCallback<V>>>,
}

impl<V> Clone for ListEngine<V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            request_timeout: self.request_timeout,
            on_change: Arc::clone(&self.on_change),
        }
    }
}

impl<V> std::fmt::Debug for ListEngine<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListEngine")
            .field("request_timeout", &self.request_timeout)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

fn validate(list_key: &str, id: &str) -> Result<()> {
    if list_key.is_empty() {
        return Err(StoreError::InvalidInput("missing list key"));
    }
    if id.is_empty() {
        return Err(StoreError::InvalidInput("missing item id"));
    }
    Ok(())
}

impl<V> ListEngine<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Spawns the worker task and returns a handle to it.
    pub fn start(config: &StoreConfig, shutdown: watch::Receiver<bool>) -> Self {
        Self::spawn(config, Arc::new(CallbackSlot::new()), shutdown)
    }

    pub(crate) fn spawn(
        config: &StoreConfig,
        on_change: Arc<CallbackSlot<ListChangeCallback<V>>>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let worker = ListWorker {
            lists: HashMap::new(),
            on_change: Arc::clone(&on_change),
        };
        tokio::spawn(worker.run(rx, shutdown));

        Self {
            tx,
            request_timeout: config.request_timeout,
            on_change,
        }
    }

    /// Adds `item` to the list at `list_key`, or replaces the item with the same id.
    pub async fn push(&self, list_key: &str, item: Item<V>) -> Result<()> {
        validate(list_key, &item.id)?;
        let (reply, rx) = oneshot::channel();
        let request = ListRequest::Push {
            list_key: list_key.to_string(),
            item,
            reply,
        };
        send_request(&self.tx, request, self.request_timeout, "list_push").await?;
        await_reply(rx, self.request_timeout, "list_push").await
    }

    /// Removes the item with `item.id` from the list. Absent ids are a no-op.
    pub async fn delete(&self, list_key: &str, item: &Item<V>) -> Result<()> {
        validate(list_key, &item.id)?;
        let (reply, rx) = oneshot::channel();
        let request = ListRequest::Delete {
            list_key: list_key.to_string(),
            id: item.id.clone(),
            reply,
        };
        send_request(&self.tx, request, self.request_timeout, "list_delete").await?;
        await_reply(rx, self.request_timeout, "list_delete").await
    }

    /// Returns the items of the list in id order and whether the list exists.
    pub async fn get(&self, list_key: &str) -> Result<(Vec<Item<V>>, bool)> {
        let (reply, rx) = oneshot::channel();
        let request = ListRequest::Get {
            list_key: list_key.to_string(),
            reply,
        };
        send_request(&self.tx, request, self.request_timeout, "list_get").await?;
        Ok(match await_reply(rx, self.request_timeout, "list_get").await? {
            Some(items) => (items, true),
            None => (Vec::new(), false),
        })
    }

    pub async fn stats(&self) -> Result<ListStats> {
        let (reply, rx) = oneshot::channel();
        send_request(&self.tx, ListRequest::Stats { reply }, self.request_timeout, "stats")
            .await?;
        await_reply(rx, self.request_timeout, "stats").await
    }

    /// Registers the list change callback, replacing any earlier one.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(String, Vec<Item<V>>) + Send + Sync + 'static,
    {
        self.on_change.set(Arc::new(callback));
    }
}

struct ListWorker<V> {
    lists: HashMap<String, OrderedIndex<Item<V>>>,
    on_change: Arc<CallbackSlot<ListChangeCallback<V>>>,
}

impl<V> ListWorker<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    async fn run(
        mut self,
        mut rx: mpsc::Receiver<ListRequest<V>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("List engine worker started");

        loop {
            tokio::select! {
                request = rx.recv() => match request {
                    Some(request) => self.handle(request),
                    None => break,
                },
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        debug!("List engine received shutdown signal");
                        break;
                    }
                }
            }
        }

        info!(lists = self.lists.len(), "List engine worker stopped");
    }

    fn handle(&mut self, request: ListRequest<V>) {
        match request {
            ListRequest::Push {
                list_key,
                item,
                reply,
            } => {
                trace!(list = %list_key, id = %item.id, "list push");
                if self.push(&list_key, item) {
                    self.notify(list_key);
                }
                let _ = reply.send(());
            }
            ListRequest::Delete {
                list_key,
                id,
                reply,
            } => {
                trace!(list = %list_key, id = %id, "list delete");
                if self.delete(&list_key, &id) {
                    self.notify(list_key);
                }
                let _ = reply.send(());
            }
            ListRequest::Get { list_key, reply } => {
                trace!(list = %list_key, "list get");
                let _ = reply.send(self.lists.get(&list_key).map(OrderedIndex::values));
            }
            ListRequest::Stats { reply } => {
                let _ = reply.send(ListStats {
                    lists: self.lists.len() as u64,
                    items: self.lists.values().map(|l| l.len() as u64).sum(),
                });
            }
        }
    }

    /// Upserts `item`, creating the list on first use.
    ///
    /// # Returns
    /// `true` unless an item with the same id and an equal value was already there.
    fn push(&mut self, list_key: &str, item: Item<V>) -> bool {
        let list = self.lists.entry(list_key.to_string()).or_default();
        let unchanged = list
            .get(&item.id)
            .is_some_and(|existing| existing.value == item.value);
        list.upsert(item.id.clone(), item);
        !unchanged
    }

    /// Removes `id` from the list. Never creates the list.
    fn delete(&mut self, list_key: &str, id: &str) -> bool {
        self.lists
            .get_mut(list_key)
            .and_then(|list| list.delete(id))
            .is_some()
    }

    fn notify(&self, list_key: String) {
        let Some(callback) = self.on_change.current() else {
            return;
        };
        let items = self
            .lists
            .get(&list_key)
            .map(OrderedIndex::values)
            .unwrap_or_default();
        dispatch("on_list_change", move || callback(list_key, items));
    }
}
