//! Storage Engine Module
//!
//! This module provides the two engines behind a [`Store`](crate::Store):
//! the scalar key/value engine (with expiry) and the list engine.
//!
//! ## Architecture
//!
//! ```text
//!   caller ──request──> ┌──────────────────────────┐
//!          <──reply──── │  ScalarEngine worker     │<── interval tick (sweep)
//!                       │  HashMap + ExpiryIndex   │
//!                       └──────────────────────────┘
//!   caller ──request──> ┌──────────────────────────┐
//!          <──reply──── │  ListEngine worker       │
//!                       │  HashMap<OrderedIndex>   │
//!                       └──────────────────────────┘
//! ```
//!
//! Each engine is a single Tokio task that owns its state outright and
//! handles one request at a time from a bounded queue, so the maps and
//! indices need no locks. Callers talk to it through a cheap cloneable
//! handle: every call is one request and one `oneshot` reply, both bounded
//! by the configured request timeout.

pub mod callback;
pub mod engine;
pub mod expiry;
pub mod list;

pub use callback::{ExpireCallback, ListChangeCallback};
pub use engine::{ScalarEngine, ScalarStats};
pub use expiry::ExpiryIndex;
pub use list::{ListEngine, ListStats};

use crate::error::{Result, StoreError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Places `request` on a worker queue, waiting at most `timeout` for room.
pub(crate) async fn send_request<R>(
    tx: &mpsc::Sender<R>,
    request: R,
    timeout: Duration,
    op: &'static str,
) -> Result<()> {
    match tokio::time::timeout(timeout, tx.send(request)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err(StoreError::Closed),
        Err(_) => {
            warn!(op, "Worker did not accept request in time");
            Err(StoreError::Timeout { op })
        }
    }
}

/// Waits at most `timeout` for the worker's answer.
pub(crate) async fn await_reply<T>(
    rx: oneshot::Receiver<T>,
    timeout: Duration,
    op: &'static str,
) -> Result<T> {
    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(StoreError::Closed),
        Err(_) => {
            warn!(op, "Worker did not answer in time");
            Err(StoreError::Timeout { op })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_full_queue_times_out() {
        let (tx, _rx) = mpsc::channel::<u32>(1);
        send_request(&tx, 1, Duration::from_millis(20), "put")
            .await
            .unwrap();

        // Nobody drains the queue, so the second send cannot be accepted
        let err = send_request(&tx, 2, Duration::from_millis(20), "put")
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Timeout { op: "put" });
    }

    #[tokio::test]
    async fn test_send_to_stopped_worker() {
        let (tx, rx) = mpsc::channel::<u32>(1);
        drop(rx);
        let err = send_request(&tx, 1, Duration::from_millis(20), "get")
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Closed);
    }

    #[tokio::test]
    async fn test_dropped_reply_is_closed() {
        let (reply, rx) = oneshot::channel::<u32>();
        drop(reply);
        let err = await_reply(rx, Duration::from_millis(20), "get")
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Closed);
    }

    #[tokio::test]
    async fn test_silent_worker_times_out() {
        let (_reply, rx) = oneshot::channel::<u32>();
        let err = await_reply(rx, Duration::from_millis(20), "get")
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Timeout { op: "get" });
    }
}
