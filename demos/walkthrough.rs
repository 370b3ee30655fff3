//! EmberKV walkthrough
//!
//! Runs a short session against an embedded store and logs what happens.
//!
//! ```text
//! RUST_LOG=emberkv=debug cargo run --example walkthrough
//! ```

use emberkv::{Item, Store, StoreConfig};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("EmberKV v{}", emberkv::VERSION);

    let config = StoreConfig::default().with_sweep_interval(Duration::from_millis(100));
    let store: Store<String> = Store::with_config(config);

    store.on_expire(|item| info!(key = %item.key, value = %item.value, "Item expired"));
    store.on_list_change(|key, items| {
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        info!(list = %key, ?ids, "List changed");
    });

    store.init();

    store
        .put(Item::new("s1", "session", "token123".to_string()), Duration::from_millis(300))
        .await?;
    store
        .put(Item::new("u1", "user", "ariz".to_string()), Duration::ZERO)
        .await?;

    for (id, value) in [("b", "second"), ("a", "first"), ("c", "third")] {
        store.list_push("todo", Item::member(id, value.to_string())).await?;
    }
    // Same id and value: replaced silently
    store.list_push("todo", Item::member("a", "first".to_string())).await?;
    store.list_delete("todo", &Item::member("b", String::new())).await?;

    tokio::time::sleep(Duration::from_millis(600)).await;

    let session = store.get("session").await?;
    info!(found = session.is_some(), "Looked up session after its ttl");

    let (items, found) = store.list_get("todo").await?;
    info!(found, len = items.len(), "Read todo list");

    let stats = store.stats().await?;
    info!(?stats, "Store statistics");

    store.close();
    Ok(())
}
