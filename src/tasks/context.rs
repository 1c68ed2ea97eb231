//! # Task context.
//!
//! Every effect body receives a [`Context`]: the running task's view of the engine.
//! It carries the engine reference, the task's [`CancellationToken`] and its name,
//! and forwards the primitive operations:
//!
//! | Primitive | Suspends? | Method |
//! |-----------|-----------|--------|
//! | Invoke    | yes       | [`Context::invoke`] |
//! | Fork      | no        | [`Context::fork`] |
//! | Send      | no        | [`Context::send`] |
//! | Listen    | no        | [`Context::listen`] |
//! | Receive   | yes       | [`Context::receive`] |
//! | First     | yes       | [`Context::first`] |
//! | Cancel    | yes       | [`Context::cancel`] |
//!
//! Forked tasks get a child token of the issuing task's token, so cancelling a task
//! also tears down everything it forked.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::engine::{EngineRef, Inbox};
use crate::error::FlowError;
use crate::events::{Event, EventKind};
use crate::tasks::{Effect, Handle, Payload, Predicate};

/// The running task's handle on the engine.
#[derive(Clone)]
pub struct Context<V> {
    engine: EngineRef<V>,
    token: CancellationToken,
    task: Arc<str>,
}

impl<V: Payload> Context<V> {
    /// Creates a context for a task named `task` running on `engine`.
    ///
    /// Engines create contexts for the tasks they fork; callers only need this to
    /// drive combinators on a custom [`Engine`](crate::Engine).
    pub fn new(engine: EngineRef<V>, token: CancellationToken, task: impl Into<Arc<str>>) -> Self {
        Self {
            engine,
            token,
            task: task.into(),
        }
    }

    /// The engine this task runs on.
    pub fn engine(&self) -> &EngineRef<V> {
        &self.engine
    }

    /// The task's cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// True once this task (or an ancestor) was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Name of the running task.
    pub fn task_name(&self) -> &str {
        &self.task
    }

    /// Invoke: runs `effect` as a sub-task of the current task and waits for its
    /// value or failure.
    pub async fn invoke<T: Send + 'static>(&self, effect: Effect<V, T>) -> Result<T, FlowError> {
        self.publish(
            Event::new(EventKind::EffectInvoked)
                .with_task(effect.name())
                .with_parent(self.task.clone()),
        );
        effect.run(self.clone()).await
    }

    /// Fork: starts `effect` as an independent task and returns its handle without
    /// suspending.
    pub fn fork(&self, effect: Effect<V>) -> Handle<V> {
        self.engine.fork(self, effect)
    }

    /// Send: delivers `value` to inboxes registered on `key`.
    pub fn send(&self, key: &str, value: V) {
        self.engine.send(key, value);
    }

    /// Listen: registers an inbox for `key` that queues every matching message sent
    /// from now on.
    pub fn listen(&self, key: &str, predicate: Option<Predicate<V>>) -> Inbox<V> {
        self.engine.listen(self, key, predicate)
    }

    /// Receive: waits for the next message on `key` accepted by `predicate`.
    pub async fn receive(&self, key: &str, predicate: Option<&Predicate<V>>) -> Result<V, FlowError> {
        self.engine.receive(self, key, predicate).await
    }

    /// First: waits until one of `handles` has finished; returns its position and value.
    pub async fn first(&self, handles: &[Handle<V>]) -> Result<(usize, V), FlowError> {
        self.engine.first(self, handles).await
    }

    /// Cancel: requests termination of `handle` and returns once its teardown is observed.
    pub async fn cancel(&self, handle: &Handle<V>) {
        self.engine.cancel(self, handle).await;
    }

    /// Publishes an event through the engine (no-op for engines without a bus).
    pub fn publish(&self, event: Event) {
        self.engine.publish(event);
    }
}
