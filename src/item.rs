//! The stored record.

use bytes::Bytes;
use tokio::time::{Duration, Instant};

/// A value stored in EmberKV.
///
/// Scalar entries are identified by `key`, list members by `id`. The store
/// never looks inside `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Item<V = Bytes> {
    /// Unique item id (identity within a list)
    pub id: String,
    /// Key in the scalar store (unused for list members)
    pub key: String,
    /// The opaque payload
    pub value: V,
    /// When this entry expires (None = never expires). Set by the store.
    expires_at: Option<Instant>,
}

impl<V> Item<V> {
    /// Creates an item for the scalar store.
    pub fn new(id: impl Into<String>, key: impl Into<String>, value: V) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            value,
            expires_at: None,
        }
    }

    /// Creates an item meant for a list, where only `id` matters.
    pub fn member(id: impl Into<String>, value: V) -> Self {
        Self::new(id, String::new(), value)
    }

    /// When the store will evict this entry, if it was stored with a ttl.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Stamps the expiry `ttl` from now.
    ///
    /// A zero ttl clears it, and so does a ttl too large to represent as an
    /// instant: such an entry never expires.
    pub(crate) fn stamp_ttl(&mut self, ttl: Duration) {
        self.expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_ttl() {
        let mut item = Item::new("1", "k", Bytes::from("v"));
        assert!(item.expires_at().is_none());

        item.stamp_ttl(Duration::from_secs(5));
        let at = item.expires_at().unwrap();
        assert!(at > Instant::now());

        item.stamp_ttl(Duration::ZERO);
        assert!(item.expires_at().is_none());
    }

    #[test]
    fn test_stamp_huge_ttl_never_expires() {
        let mut item = Item::new("1", "k", Bytes::from("v"));
        item.stamp_ttl(Duration::MAX);
        assert!(item.expires_at().is_none());
    }

    #[test]
    fn test_member_has_no_key() {
        let item = Item::member("a", "a data");
        assert_eq!(item.id, "a");
        assert!(item.key.is_empty());
    }
}
