//! # taskweave
//!
//! **Taskweave** is a small structured-concurrency library for Rust.
//!
//! It composes effects (named, one-shot async requests) described as nested
//! trees: run them one after another, fork them as concurrent tasks, join the
//! handles back into values, race them, or subscribe a handler to keyed messages.
//! Every combinator preserves the shape of its input tree.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌────────────────────────────┐       ┌──────────────────────────────┐
//!     │ Descriptor = Node<Effect>  │       │ HandleTree = Node<Handle>    │
//!     │  Leaf | Ordered | Keyed    │       │  (same shape as descriptor)  │
//!     └──────────────┬─────────────┘       └───────────────┬──────────────┘
//!                    ▼                                     ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  Combinators (recursive interpreters, one per combinator)             │
//! │  - sequence : invoke leaves strictly in order                         │
//! │  - fork     : fork every leaf, return handles unjoined                │
//! │  - join     : handles → values (short-circuit finished handles)       │
//! │  - race     : fork competitors, first finisher wins                   │
//! │  - subscribe: receive loop + dispatch policy                          │
//! └───────────────────────────────────┬───────────────────────────────────┘
//!                                     │ Context<V> (task view of the engine)
//!                                     ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  Engine trait: fork / send / listen / first / cancel / publish        │
//! │  TokioEngine:                                                         │
//! │  - eager first poll, then tokio::spawn                                │
//! │  - CancellationToken tree (child token per forked task)               │
//! │  - Registry (live tasks), Mailbox (keyed broadcast) + Inbox           │
//! └───────────────────────────────────┬───────────────────────────────────┘
//!                                     │ publish(Event)
//!                                     ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                        │
//! │                   (capacity: Config::bus_capacity)                    │
//! └───────────────────────────────────┬───────────────────────────────────┘
//!                                     ▼
//!                        ┌────────────────────────┐
//!                        │   observer_listener    │
//!                        │   (in TokioEngine)     │
//!                        └───────────┬────────────┘
//!                                    ▼
//!                              ObserverSet
//!                            (per-obs queues)
//!                          ┌─────────┼─────────┐
//!                          ▼         ▼         ▼
//!                       worker1   worker2   workerN
//! ```
//!
//! ### Task lifecycle
//! ```text
//! Context::fork(effect)
//!   ├─► publish TaskForked{ task, parent }
//!   ├─► poll once on the issuing task (Config::eager_fork)
//!   │     └─ Ready ──► settle handle now (fork returns a finished handle)
//!   └─► tokio::spawn(select! { token.cancelled(), body.catch_unwind() })
//!         ├─ Ok(v)      ──► publish TaskCompleted ──► handle = Ok(v)
//!         ├─ Err(e)     ──► publish TaskFailed    ──► handle = Err(e)
//!         ├─ panic      ──► publish TaskFailed    ──► handle = Err(Panicked)
//!         └─ cancelled  ──► body dropped ──► publish TaskCanceled ──► handle = Err(Canceled)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / functions                          |
//! |-------------------|----------------------------------------------------------|------------------------------------------------|
//! | **Combinators**   | Shape-preserving composition of effects and handles.     | [`sequence`], [`fork`], [`join`], [`race`], [`subscribe`] |
//! | **Tasks**         | Effects, task contexts and handles.                      | [`Effect`], [`Context`], [`Handle`]            |
//! | **Trees**         | Descriptor / handle / result trees.                      | [`Node`], [`Key`]                              |
//! | **Engine**        | Primitive operations and the tokio implementation.       | [`Engine`], [`TokioEngine`]                    |
//! | **Observer API**  | Hook into runtime events (logging, metrics).             | [`Observe`], [`Event`]                         |
//! | **Errors**        | Typed errors for flows and the runtime.                  | [`FlowError`], [`RuntimeError`]                |
//! | **Configuration** | Centralize runtime settings.                             | [`Config`]                                     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use taskweave::{Config, Effect, Key, Node, TokioEngine, fork, join, race, sequence};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build observers (optional)
//!     #[cfg(feature = "logging")]
//!     let observers: Vec<Arc<dyn taskweave::Observe>> = vec![Arc::new(taskweave::LogWriter)];
//!     #[cfg(not(feature = "logging"))]
//!     let observers: Vec<Arc<dyn taskweave::Observe>> = Vec::new();
//!
//!     let engine = TokioEngine::<u64>::builder(Config::default())
//!         .with_observers(observers)
//!         .build();
//!     let cx = engine.context();
//!
//!     let sleepy = |name: &'static str, ms: u64| {
//!         Node::leaf(Effect::new(name, move |_cx| async move {
//!             tokio::time::sleep(Duration::from_millis(ms)).await;
//!             Ok(ms)
//!         }))
//!     };
//!
//!     // Strictly one after the other.
//!     let steps = sequence(&cx, Node::ordered([sleepy("a", 2), sleepy("b", 1)])).await?;
//!     assert_eq!(steps.leaves(), vec![&2, &1]);
//!
//!     // Concurrently, then join back in the same shape.
//!     let handles = fork(&cx, Node::keyed([("x", sleepy("x", 3)), ("y", sleepy("y", 1))])).await?;
//!     let values = join(&cx, handles).await?;
//!     assert_eq!(values.get(&Key::from("x")), Some(&Node::leaf(3)));
//!
//!     // First finisher wins (losers keep running).
//!     let (winner, _) = race(&cx, Node::ordered([sleepy("slow", 50), sleepy("fast", 1)])).await?;
//!     assert_eq!(winner, Key::Index(1));
//!
//!     engine.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod combinators;
mod config;
mod engine;
mod error;
mod events;
mod observers;
mod policies;
mod tasks;
mod tree;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use combinators::{Handler, SubscribeSpec, fork, join, join_one, race, sequence, subscribe};
pub use config::Config;
pub use engine::{Engine, EngineBuilder, EngineRef, Inbox, TokioEngine};
pub use error::{FlowError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use observers::{Observe, ObserverSet};
pub use policies::DispatchPolicy;
pub use tasks::{BoxFlow, Context, Effect, Handle, Payload, Predicate};
pub use tree::{Key, Node};

/// A (possibly nested) structural request for work.
pub type Descriptor<V, T = V> = Node<Effect<V, T>>;

/// Handles in the shape of the descriptor they were forked from.
pub type HandleTree<V> = Node<Handle<V>>;

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
