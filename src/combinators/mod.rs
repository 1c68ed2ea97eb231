//! # Structured-concurrency combinators.
//!
//! Each combinator is one recursive interpreter over a [`Node`](crate::Node) tree and
//! talks to the scheduler only through the primitives on [`Context`]:
//!
//! | Combinator | Input | Output | Primitives used |
//! |------------|-------|--------|-----------------|
//! | [`sequence`] | `Node<Effect<V, T>>` | `Node<T>` | invoke |
//! | [`join`] / [`join_one`] | `Node<Handle<V>>` / `Handle<V>` | `Node<V>` / `V` | first (+ sequence) |
//! | [`fork`] | `Node<Effect<V>>` | `Node<Handle<V>>` | fork (+ sequence) |
//! | [`race`] | `Node<Effect<V>>` | `(Key, V)` | fork, first |
//! | [`subscribe`] | [`SubscribeSpec`] | `Handle<V>` | fork, receive, invoke, cancel |
//!
//! Combinators returning [`BoxFlow`](crate::BoxFlow) are lazy: nothing is invoked or
//! forked until the returned future is polled.
//!
//! Contract breaches are reported as [`FlowError::Invariant`] and published as
//! `InvariantViolated` events; task failures propagate unchanged.

mod fork;
mod join;
mod race;
mod sequence;
mod subscribe;

pub use fork::fork;
pub use join::{join, join_one};
pub use race::race;
pub use sequence::sequence;
pub use subscribe::{Handler, SubscribeSpec, subscribe};

pub(crate) use fork::fork_request;

use crate::error::FlowError;
use crate::events::{Event, EventKind};
use crate::tasks::{Context, Payload};

/// Publishes `InvariantViolated` for the current task and returns the matching error.
pub(crate) fn violation<V: Payload>(cx: &Context<V>, what: String) -> FlowError {
    cx.publish(
        Event::new(EventKind::InvariantViolated)
            .with_task(cx.task_name())
            .with_reason(what.as_str()),
    );
    FlowError::invariant(what)
}
