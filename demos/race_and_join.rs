//! # Example: race_and_join
//!
//! Walks through every combinator on one engine with the stdout [`LogWriter`].
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► sequence: load config, then connect
//!   ├─► fork {"mirrors": [eu, us], "cache": warm} ──► join (same shape)
//!   ├─► race [slow-primary, fast-replica] ──► winner, loser keeps running
//!   ├─► subscribe "query" latest_only ──► send 3 queries, only the last one completes
//!   └─► shutdown (cancel everything, wait for grace)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example race_and_join --features logging
//! ```

use std::{sync::Arc, time::Duration};

use taskweave::{
    Config, Effect, FlowError, LogWriter, Node, Observe, SubscribeSpec, TokioEngine, fork, join,
    race, sequence, subscribe,
};

fn after(name: &'static str, ms: u64, value: &'static str) -> Node<Effect<String>> {
    Node::leaf(Effect::new(name, move |_cx| async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(value.to_string())
    }))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== race_and_join example ===\n");

    let cfg = Config {
        grace: Duration::from_secs(2),
        ..Config::default()
    };
    let observers: Vec<Arc<dyn Observe>> = vec![Arc::new(LogWriter)];
    let engine = TokioEngine::<String>::builder(cfg).with_observers(observers).build();
    let cx = engine.context();

    let steps = sequence(
        &cx,
        Node::ordered([after("load-config", 20, "config"), after("connect", 10, "conn")]),
    )
    .await?;
    println!("sequence → {steps:?}\n");

    let handles = fork(
        &cx,
        Node::keyed([
            ("mirrors", Node::ordered([after("eu", 30, "eu-ok"), after("us", 10, "us-ok")])),
            ("cache", after("warm", 5, "warm")),
        ]),
    )
    .await?;
    let values = join(&cx, handles).await?;
    println!("fork+join → {values:?}\n");

    let (key, value) = race(
        &cx,
        Node::ordered([after("primary", 200, "primary"), after("replica", 20, "replica")]),
    )
    .await?;
    println!("race → winner {key} = {value} (primary keeps running)\n");

    let spec = SubscribeSpec::new("query", |q: String| {
        Effect::new(format!("search({q})"), move |cx| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if cx.is_cancelled() {
                return Err(FlowError::Canceled);
            }
            println!("[search] results for {q:?}");
            Ok(q)
        })
    })
    .latest_only(true);
    let sub = subscribe(&cx, spec)?;

    for q in ["r", "ru", "rust"] {
        cx.send("query", q.to_string());
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    cx.cancel(&sub).await;

    engine.shutdown().await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    println!("\n=== done ===");
    Ok(())
}
