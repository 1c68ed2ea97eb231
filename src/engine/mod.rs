//! Engine: the primitive effect set and its tokio implementation.
//!
//! The combinators only talk to the [`Engine`] trait. The crate ships
//! [`TokioEngine`]; tests and embedders can wrap or replace it (e.g. to count
//! wait-for-first calls or to record the order of fork/cancel requests).
//!
//! Internal modules:
//! - [`runtime`]: `TokioEngine`, fork/cancel/first/send/listen on tokio;
//! - [`runner`]: drives one forked task to a settled outcome;
//! - [`registry`]: live forked tasks by id;
//! - [`mailbox`]: keyed broadcast channel behind send/listen;
//! - [`inbox`]: persistent per-key receiver returned by `listen`;
//! - [`builder`]: engine construction with observers.

mod builder;
mod inbox;
mod mailbox;
mod registry;
mod runner;
mod runtime;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FlowError;
use crate::events::Event;
use crate::tasks::{Context, Effect, Handle, Payload, Predicate};

pub use builder::EngineBuilder;
pub use inbox::Inbox;
pub use runtime::TokioEngine;

/// Shared reference to an engine, as held by every [`Context`].
pub type EngineRef<V> = Arc<dyn Engine<V>>;

/// # Primitive operations of the external scheduler.
///
/// Invoke is not part of the trait: it runs an effect inside the current task
/// (see [`Context::invoke`]).
///
/// ### Contract
/// - `fork` never suspends the caller and returns a handle that settles exactly once.
/// - `listen` registers its receiver before returning; every later `send` on the
///   key is queued in the inbox until read.
/// - `first` over an empty slice is an invariant violation.
/// - `cancel` must not return before the target's teardown is complete and its
///   handle reports done (`latest_only` subscriptions rely on this).
#[async_trait]
pub trait Engine<V: Payload>: Send + Sync + 'static {
    /// Starts `effect` as an independent task; the child inherits a child token of `parent`.
    fn fork(&self, parent: &Context<V>, effect: Effect<V>) -> Handle<V>;

    /// Delivers `value` to receivers matching `key`.
    fn send(&self, key: &str, value: V);

    /// Registers a receiver for messages on `key` accepted by `predicate`.
    fn listen(&self, cx: &Context<V>, key: &str, predicate: Option<Predicate<V>>) -> Inbox<V>;

    /// Suspends until a message on `key` accepted by `predicate` arrives.
    async fn receive(
        &self,
        cx: &Context<V>,
        key: &str,
        predicate: Option<&Predicate<V>>,
    ) -> Result<V, FlowError> {
        self.listen(cx, key, predicate.cloned()).next().await
    }

    /// Suspends until one of `handles` is finished; returns its position and value.
    /// A failed winner propagates its failure.
    async fn first(&self, cx: &Context<V>, handles: &[Handle<V>]) -> Result<(usize, V), FlowError>;

    /// Requests termination of `handle` and waits until its teardown is observed.
    async fn cancel(&self, cx: &Context<V>, handle: &Handle<V>);

    /// Publishes an observability event. Default: dropped.
    fn publish(&self, _event: Event) {}
}
