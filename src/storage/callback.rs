//! Callback slots and isolated dispatch.
//!
//! A slot holds at most one callback; registering replaces the previous one.
//! Callbacks are run on Tokio's blocking pool so a slow or panicking callback
//! can never stall or unwind into an engine worker.

use crate::item::Item;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::warn;

/// Called with a snapshot of every entry that expires.
pub type ExpireCallback<V> = dyn Fn(Item<V>) + Send + Sync;

/// Called with the list key and the full ordered list after a change.
pub type ListChangeCallback<V> = dyn Fn(String, Vec<Item<V>>) + Send + Sync;

/// A single-subscriber callback registration.
pub struct CallbackSlot<F: ?Sized> {
    slot: RwLock<Option<Arc<F>>>,
}

impl<F: ?Sized> Default for CallbackSlot<F> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<F: ?Sized> CallbackSlot<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback`, replacing any earlier one.
    pub fn set(&self, callback: Arc<F>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    /// Returns the active callback, if any.
    pub fn current(&self) -> Option<Arc<F>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<F: ?Sized> std::fmt::Debug for CallbackSlot<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("registered", &self.current().is_some())
            .finish()
    }
}

/// Runs `job` in the background, logging instead of propagating a panic.
pub(crate) fn dispatch<J>(kind: &'static str, job: J)
where
    J: FnOnce() + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(job);
    tokio::spawn(async move {
        if let Err(e) = handle.await {
            if e.is_panic() {
                warn!(callback = kind, "Callback panicked");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[test]
    fn test_last_registration_wins() {
        let slot: CallbackSlot<dyn Fn() -> u32 + Send + Sync> = CallbackSlot::new();
        assert!(slot.current().is_none());

        slot.set(Arc::new(|| 1));
        slot.set(Arc::new(|| 2));
        assert_eq!((slot.current().unwrap())(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_survives_panic() {
        dispatch("test", || panic!("boom"));

        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatch("test", move || {
            let _ = tx.send(7);
        });

        let got = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
        assert_eq!(got.unwrap(), Some(7));
    }
}
