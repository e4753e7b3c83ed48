//! Demo: drive a queue store over a scratch base directory.
//!
//! Usage: `spool-cli [base-dir]` (defaults to `./spool_data`).

use spool_core::{Area, FsStore, Item, QueueStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("spool_core=debug")),
        )
        .init();

    let base = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./spool_data".to_string());

    // (A) open the store; the five top-level areas are created if absent
    let store = FsStore::open(&base)?;
    println!("store base: {}", store.base().display());

    // (B) seed a few jobs into the "main" queue
    for n in 0..3 {
        let item = Item::from(serde_json::json!({
            "job": format!("render-{n}"),
            "priority": "normal",
        }));
        store.write_item("main", n, &item).await?;
    }
    store
        .write_item("main", 3, &Item::Raw("legacy job card, plain text".into()))
        .await?;
    println!("queues: {:?}", store.queue_lengths().await?);

    // (C) reorder: the newest job jumps the line, then gets demoted again
    let front = store.send_to_front("main", 3, None).await?;
    println!("job 3 moved to front, now at position {front}");
    let back = store.send_to_back("main", front, None).await?;
    println!("...and back to the rear, position {back}");

    // (D) swap the two oldest and print the result
    store.swap_items("main", 0, "main", 1).await?;
    for (position, item) in store.read_items("main").await? {
        println!("  main/{position}: {}", item.to_text());
    }

    // (E) clean up through the delete path (waiting area, every position)
    if let Some((min, max)) = store.queue_range("main").await? {
        for position in min..=max {
            store.delete_item(&Area::waiting("main"), position).await?;
        }
    }
    println!("after cleanup: {:?}", store.queue_range("main").await?);

    Ok(())
}
